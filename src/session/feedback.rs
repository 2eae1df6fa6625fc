//! Corrective feedback for the current frame
//!
//! Combines:
//! - One direction message per out-of-range angle, in fixed angle order
//! - An optional phase cue, prepended and tagged with the phase name
//! - "Good form" when nothing else applies

use std::sync::Arc;

use super::phase::{Phase, PhaseInfo};
use crate::angles::{AngleMap, AngleName};
use crate::exercise::{ExerciseCatalog, ExerciseProfile, SafeRange};
use crate::error::Result;

pub const GOOD_FORM: &str = "Good form";

/// Direction phrases: (below min, above max)
fn direction_phrases(angle: AngleName) -> (&'static str, &'static str) {
    match angle {
        AngleName::ShoulderAbduction => ("Raise arm higher", "Lower arm"),
        AngleName::ElbowFlexion => ("Bend elbow more", "Straighten elbow"),
        AngleName::ShoulderInternalRotation => {
            ("Rotate shoulder internally more", "Reduce internal rotation")
        }
        AngleName::ShoulderExternalRotation => {
            ("Rotate shoulder externally more", "Reduce external rotation")
        }
    }
}

/// Message for one angle, `None` when inside its safe range
pub fn angle_feedback(angle: AngleName, value: f64, range: SafeRange) -> Option<String> {
    if range.contains(value) {
        return None;
    }

    let (increase, decrease) = direction_phrases(angle);
    let (direction, deviation) = if value < range.min {
        (increase, range.min - value)
    } else {
        (decrease, value - range.max)
    };

    let message = if deviation > 30.0 {
        format!("significantly {}", direction)
    } else if deviation > 15.0 {
        direction.to_string()
    } else {
        format!("slightly {}", direction)
    };
    Some(message)
}

/// Stateless feedback generator bound to one exercise
#[derive(Clone, Debug)]
pub struct FeedbackGenerator {
    profile: Arc<ExerciseProfile>,
}

impl FeedbackGenerator {
    pub fn new(profile: Arc<ExerciseProfile>) -> Self {
        FeedbackGenerator { profile }
    }

    pub fn for_exercise(catalog: &ExerciseCatalog, id: &str) -> Result<Self> {
        Ok(Self::new(catalog.get(id)?))
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    /// Ordered feedback for one frame; never empty
    pub fn generate(&self, angles: &AngleMap<f64>, phase: Option<&PhaseInfo>) -> Vec<String> {
        let mut feedback: Vec<String> = AngleName::ALL
            .into_iter()
            .filter_map(|angle| {
                let range = self.profile.range(angle)?;
                let value = angles.value(angle)?;
                angle_feedback(angle, value, range)
            })
            .collect();

        if let Some(info) = phase {
            if let Some(cue) = self.phase_cue(info, angles) {
                feedback.insert(0, format!("[{}] {}", info.phase, cue));
            }
        }

        if feedback.is_empty() {
            feedback.push(GOOD_FORM.to_string());
        }
        feedback
    }

    fn phase_cue(&self, info: &PhaseInfo, angles: &AngleMap<f64>) -> Option<&str> {
        let cues = &self.profile.cues;
        let cue = match info.phase {
            Phase::Raise => cues.raise.as_ref(),
            Phase::Hold if info.hold_frame_count < cues.hold_target_frames => cues.hold.as_ref(),
            Phase::Hold => cues.hold_complete.as_ref(),
            Phase::Lower => {
                let (driving, _) = self.profile.driving_angle()?;
                let value = angles.value(driving)?;
                if value > cues.lower_cue_angle {
                    cues.lower_midway.as_ref()
                } else {
                    cues.lower_finished.as_ref()
                }
            }
            Phase::Neutral => None,
        };
        cue.map(String::as_str)
    }
}
