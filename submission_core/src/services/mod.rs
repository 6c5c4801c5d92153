//! Business logic services

pub mod submission;

pub use submission::{SubmissionOutcome, SubmissionService};
