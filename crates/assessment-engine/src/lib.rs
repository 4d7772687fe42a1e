//! Behavioral-assessment scoring engine.
//!
//! Converts Likert answers to a fixed questionnaire into normalized facet scores and manages
//! the resumable, multi-session lifecycle of taking that questionnaire.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
