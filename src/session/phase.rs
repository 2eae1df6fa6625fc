//! Movement phase detection
//!
//! Maintains:
//! - Current phase (raise, hold, lower, neutral)
//! - Hold frame counter
//! - Frame at which the current phase started

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::exercise::{ExerciseProfile, PhaseThresholds};

/// Coarse movement-cycle stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Raise,
    Hold,
    Lower,
    Neutral,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Raise => "RAISE",
            Phase::Hold => "HOLD",
            Phase::Lower => "LOWER",
            Phase::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Read-only view of the detector state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PhaseInfo {
    pub phase: Phase,
    pub hold_frame_count: u32,
    pub phase_duration: u32,
}

/// Phase state machine driven by one angle per frame
#[derive(Clone, Debug)]
pub struct PhaseDetector {
    thresholds: Option<PhaseThresholds>,
    phase: Phase,
    hold_frame_count: u32,
    phase_start_frame: u64,
}

impl PhaseDetector {
    /// Detector bound to fixed thresholds; `None` always reports neutral
    pub fn new(thresholds: Option<PhaseThresholds>) -> Self {
        PhaseDetector {
            thresholds,
            phase: Phase::Neutral,
            hold_frame_count: 0,
            phase_start_frame: 0,
        }
    }

    /// Detector bound to the profile's driving angle
    pub fn for_profile(profile: &ExerciseProfile) -> Self {
        Self::new(profile.driving_angle().map(|(_, thresholds)| thresholds))
    }

    /// Feed one driving-angle reading
    pub fn update(&mut self, value: f64, frame_index: u64) -> Phase {
        let Some(thresholds) = self.thresholds else {
            return Phase::Neutral;
        };

        let previous = self.phase;
        let in_motion = matches!(previous, Phase::Raise | Phase::Hold);

        if value >= thresholds.raise_complete {
            if in_motion {
                self.phase = Phase::Hold;
                self.hold_frame_count += 1;
            } else {
                self.phase = Phase::Raise;
                self.hold_frame_count = 0;
                self.phase_start_frame = frame_index;
            }
        } else if value <= thresholds.lower_complete {
            self.phase = Phase::Lower;
            self.hold_frame_count = 0;
            self.phase_start_frame = frame_index;
        } else {
            match previous {
                Phase::Lower => {
                    self.phase = Phase::Raise;
                    self.phase_start_frame = frame_index;
                }
                Phase::Raise | Phase::Hold => {
                    self.phase = Phase::Hold;
                    self.hold_frame_count += 1;
                }
                Phase::Neutral => {}
            }
        }

        if self.phase != previous {
            debug!(
                from = %previous,
                to = %self.phase,
                frame = frame_index,
                value,
                "Phase transition"
            );
        }

        self.phase
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_start_frame(&self) -> u64 {
        self.phase_start_frame
    }

    pub fn info(&self) -> PhaseInfo {
        PhaseInfo {
            phase: self.phase,
            hold_frame_count: self.hold_frame_count,
            phase_duration: self.hold_frame_count,
        }
    }
}
