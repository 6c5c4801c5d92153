//! Layered application configuration

mod settings;

pub use settings::*;
