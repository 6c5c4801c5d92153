//! Honeypot and fill-time heuristics
//!
//! Flagged submissions are answered exactly like delivered ones; the only
//! difference is that nothing leaves the server.

use crate::config::SpamConfig;
use crate::forms::SpamSignals;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_MIN_SUBMIT_MS: i64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpamReason {
    Honeypot,
    TooFast,
}

impl fmt::Display for SpamReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpamReason::Honeypot => f.write_str("honeypot filled"),
            SpamReason::TooFast => f.write_str("submitted too fast"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    Deliver,
    Discard(SpamReason),
}

impl SpamVerdict {
    pub fn is_spam(&self) -> bool {
        matches!(self, SpamVerdict::Discard(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpamGuard {
    min_submit_ms: i64,
}

impl Default for SpamGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SUBMIT_MS)
    }
}

impl SpamGuard {
    pub fn new(min_submit_ms: i64) -> Self {
        Self { min_submit_ms }
    }

    pub fn from_config(config: &SpamConfig) -> Self {
        Self::new(config.min_submit_ms)
    }

    pub fn min_submit_ms(&self) -> i64 {
        self.min_submit_ms
    }

    /// Pure decision, so a page can run the same check before posting.
    pub fn evaluate(&self, honeypot: Option<&str>, rendered_at: i64, now: i64) -> SpamVerdict {
        if honeypot.map_or(false, |value| !value.is_empty()) {
            return SpamVerdict::Discard(SpamReason::Honeypot);
        }

        // timestamps from the future count as too fast
        if now.saturating_sub(rendered_at) < self.min_submit_ms {
            return SpamVerdict::Discard(SpamReason::TooFast);
        }

        SpamVerdict::Deliver
    }

    pub fn inspect<S: SpamSignals>(&self, submission: &S, now: i64) -> SpamVerdict {
        self.evaluate(submission.honeypot(), submission.rendered_at(), now)
    }
}
