//! Exercise catalog: id → shared profile lookup
//!
//! Handles:
//! - Built-in profiles for the supported shoulder/elbow exercises
//! - Loading custom profiles from a JSON file
//! - Case-insensitive lookup with a distinct unknown-exercise error

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::profile::{ExerciseProfile, PhaseCues, PhaseThresholds, SafeRange};
use crate::angles::AngleName;
use crate::error::{CoachError, Result};

#[derive(Deserialize)]
struct CatalogFile {
    exercises: Vec<ExerciseProfile>,
}

/// Registry of exercise profiles keyed by lowercase id
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    profiles: FxHashMap<String, Arc<ExerciseProfile>>,
}

impl ExerciseCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        ExerciseCatalog {
            profiles: FxHashMap::default(),
        }
    }

    /// Catalog with the three built-in exercises
    pub fn builtin() -> Self {
        let mut catalog = ExerciseCatalog::new();
        for profile in [arm_raise(), shoulder_rotation(), elbow_flexion()] {
            catalog.profiles.insert(profile.id.clone(), Arc::new(profile));
        }
        catalog
    }

    /// Load profiles from a JSON file of the form `{"exercises": [...]}`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let file: CatalogFile = serde_json::from_str(&content)?;

        let mut catalog = ExerciseCatalog::new();
        for profile in file.exercises {
            catalog.insert(profile)?;
        }

        info!(
            path = %path.as_ref().display(),
            exercises = catalog.len(),
            "Loaded exercise catalog"
        );
        Ok(catalog)
    }

    /// Add or replace a profile after validating it
    pub fn insert(&mut self, profile: ExerciseProfile) -> Result<()> {
        profile.check()?;
        self.profiles
            .insert(profile.id.to_lowercase(), Arc::new(profile));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Arc<ExerciseProfile>> {
        self.profiles
            .get(&id.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| CoachError::UnknownExercise(id.to_string()))
    }

    /// Sorted exercise ids
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn cue(text: &str) -> Option<String> {
    Some(text.to_string())
}

fn arm_raise() -> ExerciseProfile {
    ExerciseProfile {
        id: "arm_raise".to_string(),
        name: "Arm Raise".to_string(),
        description: "Lateral arm raise to shoulder height with a straight elbow".to_string(),
        angle_ranges: [
            (AngleName::ShoulderAbduction, SafeRange::new(0.0, 150.0)),
            (AngleName::ElbowFlexion, SafeRange::new(0.0, 15.0)),
        ]
        .into_iter()
        .collect(),
        phase_thresholds: [(AngleName::ShoulderAbduction, PhaseThresholds::new(80.0, 30.0))]
            .into_iter()
            .collect(),
        cues: PhaseCues {
            raise: cue("Raise your arm out to the side"),
            hold: cue("Hold at shoulder height"),
            hold_complete: cue("Good hold, now lower slowly"),
            hold_target_frames: 30,
            lower_midway: cue("Lower your arm with control"),
            lower_finished: cue("Relax your arm at your side"),
            lower_cue_angle: 50.0,
        },
    }
}

fn shoulder_rotation() -> ExerciseProfile {
    ExerciseProfile {
        id: "shoulder_rotation".to_string(),
        name: "Shoulder Rotation".to_string(),
        description: "Internal and external shoulder rotation with the elbow at the side"
            .to_string(),
        angle_ranges: [
            (AngleName::ShoulderInternalRotation, SafeRange::new(0.0, 70.0)),
            (AngleName::ShoulderExternalRotation, SafeRange::new(0.0, 90.0)),
        ]
        .into_iter()
        .collect(),
        phase_thresholds: [(
            AngleName::ShoulderExternalRotation,
            PhaseThresholds::new(60.0, 15.0),
        )]
        .into_iter()
        .collect(),
        cues: PhaseCues {
            raise: cue("Rotate your forearm outward"),
            hold: cue("Hold the rotation"),
            hold_complete: cue("Now rotate back slowly"),
            hold_target_frames: 20,
            lower_midway: cue("Rotate back with control"),
            lower_finished: cue("Return to the neutral position"),
            lower_cue_angle: 50.0,
        },
    }
}

fn elbow_flexion() -> ExerciseProfile {
    ExerciseProfile {
        id: "elbow_flexion".to_string(),
        name: "Elbow Flexion".to_string(),
        description: "Elbow curl from full extension".to_string(),
        angle_ranges: [(AngleName::ElbowFlexion, SafeRange::new(0.0, 145.0))]
            .into_iter()
            .collect(),
        phase_thresholds: [(AngleName::ElbowFlexion, PhaseThresholds::new(120.0, 30.0))]
            .into_iter()
            .collect(),
        cues: PhaseCues {
            raise: cue("Curl your forearm up"),
            hold: cue("Squeeze and hold"),
            hold_complete: cue("Now straighten slowly"),
            hold_target_frames: 15,
            lower_midway: cue("Lower your forearm with control"),
            lower_finished: cue("Fully extend your arm"),
            lower_cue_angle: 50.0,
        },
    }
}
