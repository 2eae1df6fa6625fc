//! Exercise profiles: safe ranges, phase thresholds and phase cues
//!
//! A profile is loaded once and shared read-only (behind an `Arc`) by every
//! component of every session running that exercise.

use serde::{Deserialize, Serialize};

use crate::angles::{AngleMap, AngleName};
use crate::error::{CoachError, Result};

/// Inclusive safe range for one angle, in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SafeRange {
    pub min: f64,
    pub max: f64,
}

impl SafeRange {
    pub fn new(min: f64, max: f64) -> Self {
        SafeRange { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Distance to the nearest bound
    pub fn deviation(&self, value: f64) -> f64 {
        (value - self.min).abs().min((value - self.max).abs())
    }
}

/// Driving-angle thresholds for the phase state machine
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseThresholds {
    pub raise_complete: f64,
    pub lower_complete: f64,
}

impl PhaseThresholds {
    pub fn new(raise_complete: f64, lower_complete: f64) -> Self {
        PhaseThresholds {
            raise_complete,
            lower_complete,
        }
    }
}

/// Phase-aware coaching messages for one exercise
///
/// Missing cues simply produce no phase message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseCues {
    pub raise: Option<String>,
    /// Shown while the hold is shorter than `hold_target_frames`
    pub hold: Option<String>,
    pub hold_complete: Option<String>,
    pub hold_target_frames: u32,
    /// Shown while lowering with the driving angle above `lower_cue_angle`
    pub lower_midway: Option<String>,
    pub lower_finished: Option<String>,
    pub lower_cue_angle: f64,
}

impl Default for PhaseCues {
    fn default() -> Self {
        PhaseCues {
            raise: None,
            hold: None,
            hold_complete: None,
            hold_target_frames: 30,
            lower_midway: None,
            lower_finished: None,
            lower_cue_angle: 50.0,
        }
    }
}

/// Static configuration for one exercise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub angle_ranges: AngleMap<SafeRange>,
    #[serde(default)]
    pub phase_thresholds: AngleMap<PhaseThresholds>,
    #[serde(default)]
    pub cues: PhaseCues,
}

impl ExerciseProfile {
    pub fn range(&self, angle: AngleName) -> Option<SafeRange> {
        self.angle_ranges.value(angle)
    }

    /// Safe-flag for a single reading; `None` when the angle has no range
    pub fn is_angle_safe(&self, angle: AngleName, value: f64) -> Option<bool> {
        self.range(angle).map(|range| range.contains(value))
    }

    /// Safe-flags for every ranged angle present in `angles`
    pub fn validate(&self, angles: &AngleMap<f64>) -> AngleMap<bool> {
        angles
            .iter()
            .filter_map(|(angle, &value)| {
                self.is_angle_safe(angle, value).map(|safe| (angle, safe))
            })
            .collect()
    }

    /// First angle, in fixed order, that carries phase thresholds
    pub fn driving_angle(&self) -> Option<(AngleName, PhaseThresholds)> {
        self.phase_thresholds
            .iter()
            .next()
            .map(|(angle, &thresholds)| (angle, thresholds))
    }

    /// Reject configurations the per-frame core cannot run with
    pub fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CoachError::invalid_profile(&self.name, "empty exercise id"));
        }
        if self.angle_ranges.is_empty() {
            return Err(CoachError::invalid_profile(&self.id, "no angle ranges"));
        }

        for (angle, range) in self.angle_ranges.iter() {
            if !(range.min <= range.max) {
                return Err(CoachError::invalid_profile(
                    &self.id,
                    format!("{} range {}-{} is inverted", angle, range.min, range.max),
                ));
            }
        }

        for (angle, thresholds) in self.phase_thresholds.iter() {
            if !(thresholds.raise_complete > thresholds.lower_complete) {
                return Err(CoachError::invalid_profile(
                    &self.id,
                    format!(
                        "{} raise threshold {} must exceed lower threshold {}",
                        angle, thresholds.raise_complete, thresholds.lower_complete
                    ),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ExerciseProfile {
        ExerciseProfile {
            id: "arm_raise".to_string(),
            name: "Arm Raise".to_string(),
            description: String::new(),
            angle_ranges: [
                (AngleName::ShoulderAbduction, SafeRange::new(0.0, 150.0)),
                (AngleName::ElbowFlexion, SafeRange::new(0.0, 15.0)),
            ]
            .into_iter()
            .collect(),
            phase_thresholds: [(AngleName::ShoulderAbduction, PhaseThresholds::new(80.0, 30.0))]
                .into_iter()
                .collect(),
            cues: PhaseCues::default(),
        }
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let range = SafeRange::new(10.0, 20.0);
        assert!(range.contains(10.0));
        assert!(range.contains(20.0));
        assert!(!range.contains(20.001));
        assert!((range.deviation(5.0) - 5.0).abs() < 1e-9);
        assert!((range.deviation(26.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_matches_ranges() {
        let profile = profile();
        let angles: AngleMap<f64> = [
            (AngleName::ShoulderAbduction, 160.0),
            (AngleName::ElbowFlexion, 15.0),
            (AngleName::ShoulderInternalRotation, 500.0),
        ]
        .into_iter()
        .collect();

        let flags = profile.validate(&angles);
        assert_eq!(flags.value(AngleName::ShoulderAbduction), Some(false));
        assert_eq!(flags.value(AngleName::ElbowFlexion), Some(true));
        // No range configured for internal rotation
        assert_eq!(flags.value(AngleName::ShoulderInternalRotation), None);
    }

    #[test]
    fn test_driving_angle() {
        let profile = profile();
        let (angle, thresholds) = profile.driving_angle().unwrap();
        assert_eq!(angle, AngleName::ShoulderAbduction);
        assert_eq!(thresholds.raise_complete, 80.0);
    }

    #[test]
    fn test_check_rejects_inverted_thresholds() {
        let mut profile = profile();
        assert!(profile.check().is_ok());

        profile
            .phase_thresholds
            .insert(AngleName::ShoulderAbduction, PhaseThresholds::new(30.0, 80.0));
        let err = profile.check().unwrap_err();
        assert!(err.is_config());
    }
}
