//! Core engine for the Somnia sleep-health assessment.
//!
//! The crate owns the quiz state machine, the scoring and risk classification
//! rules, the submission coordination across the anonymous-to-authenticated
//! login redirect, and the resolution of results views. Remote collaborators
//! (content catalog, assessment service, identity) are abstracted behind
//! traits in [`assessment::repository`] so the engine can be exercised in
//! isolation.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
