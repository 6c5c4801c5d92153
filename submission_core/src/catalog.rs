//! Static catalogue of open positions
//!
//! Entries carry translation keys; the careers page resolves them.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    pub id: &'static str,
    pub title_key: &'static str,
    pub location_key: &'static str,
    pub type_key: &'static str,
    pub description_key: &'static str,
    pub requirements_keys: &'static [&'static str],
    pub nice_to_have_keys: &'static [&'static str],
}

static OPEN_POSITIONS: &[OpenPosition] = &[OpenPosition {
    id: "senior-backend-engineer",
    title_key: "seniorBackendEngineer.title",
    location_key: "seniorBackendEngineer.location",
    type_key: "seniorBackendEngineer.type",
    description_key: "seniorBackendEngineer.description",
    requirements_keys: &[
        "seniorBackendEngineer.requirements.1",
        "seniorBackendEngineer.requirements.2",
        "seniorBackendEngineer.requirements.3",
        "seniorBackendEngineer.requirements.4",
        "seniorBackendEngineer.requirements.5",
    ],
    nice_to_have_keys: &[
        "seniorBackendEngineer.niceToHave.1",
        "seniorBackendEngineer.niceToHave.2",
    ],
}];

pub fn open_positions() -> &'static [OpenPosition] {
    OPEN_POSITIONS
}

pub fn find_position(id: &str) -> Option<&'static OpenPosition> {
    OPEN_POSITIONS.iter().find(|p| p.id == id)
}
