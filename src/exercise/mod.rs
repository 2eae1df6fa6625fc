//! Exercise configuration: per-exercise profiles and the catalog that serves them
//!
//! # Components
//! - `profile.rs`: ExerciseProfile, safe ranges, phase thresholds and cues
//! - `catalog.rs`: Built-in and JSON-loaded profile registry

pub mod catalog;
pub mod profile;

pub use catalog::ExerciseCatalog;
pub use profile::{ExerciseProfile, PhaseCues, PhaseThresholds, SafeRange};
