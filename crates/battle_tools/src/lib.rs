//! # Battle Tools
//!
//! Command-line support around the battle engine:
//! - Scenario files (RON) describing a battle location
//! - Parallel batch runs and determinism checks
//! - Player-facing battle reports
//! - Data validators

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod messages;
pub mod scenario;
pub mod validate;
