//! Single-owner session handle
//!
//! Validates each raw angle frame against the exercise profile, then runs
//! phase detection, safety escalation and feedback on that same frame.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::feedback::FeedbackGenerator;
use super::phase::{PhaseDetector, PhaseInfo};
use super::safety::{SafetyConfig, SafetyStatus, SafetyViolation, WarningLevel};
use super::scoring::{SessionScorer, SessionSummary};
use crate::angles::{AngleMap, AngleName};
use crate::exercise::{ExerciseCatalog, ExerciseProfile};
use crate::error::Result;

/// Everything the display layer needs for one frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame_number: u64,
    pub angles: AngleMap<f64>,
    pub validity: AngleMap<bool>,
    pub phase: PhaseInfo,
    pub feedback: Vec<String>,
    pub warning_level: WarningLevel,
    pub new_violations: Vec<SafetyViolation>,
}

/// Phase detector, scorer and feedback generator for one exercise stream
#[derive(Clone, Debug)]
pub struct Session {
    profile: Arc<ExerciseProfile>,
    detector: PhaseDetector,
    scorer: SessionScorer,
    feedback: FeedbackGenerator,
}

impl Session {
    pub fn new(profile: Arc<ExerciseProfile>, config: SafetyConfig) -> Self {
        info!(exercise = %profile.id, name = %profile.name, "Starting session");
        Session {
            detector: PhaseDetector::for_profile(&profile),
            scorer: SessionScorer::new(Arc::clone(&profile), config),
            feedback: FeedbackGenerator::new(Arc::clone(&profile)),
            profile,
        }
    }

    pub fn for_exercise(catalog: &ExerciseCatalog, id: &str, config: SafetyConfig) -> Result<Self> {
        Ok(Self::new(catalog.get(id)?, config))
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    pub fn process(&mut self, angles: AngleMap<f64>) -> FrameReport {
        self.process_with_alerts(angles, &[])
    }

    /// Process one frame; `critical` carries explicit critical events from the pose layer
    pub fn process_with_alerts(
        &mut self,
        angles: AngleMap<f64>,
        critical: &[AngleName],
    ) -> FrameReport {
        let validity = self.profile.validate(&angles);
        let frame_number = self.scorer.frame_count() as u64 + 1;

        // A missing driving angle leaves the phase where it was
        if let Some((driving, _)) = self.profile.driving_angle() {
            if let Some(value) = angles.value(driving) {
                self.detector.update(value, frame_number);
            }
        }
        let phase = self.detector.info();
        let feedback = self.feedback.generate(&angles, Some(&phase));

        let update = self.scorer.add_frame_with_alerts(
            angles.clone(),
            validity.clone(),
            &self.profile.angle_ranges,
            critical,
        );

        FrameReport {
            frame_number,
            angles,
            validity,
            phase,
            feedback,
            warning_level: update.warning_level,
            new_violations: update.new_violations,
        }
    }

    pub fn phase_info(&self) -> PhaseInfo {
        self.detector.info()
    }

    pub fn safety_status(&self) -> SafetyStatus {
        self.scorer.safety_status()
    }

    pub fn scorer(&self) -> &SessionScorer {
        &self.scorer
    }

    pub fn summary(&self) -> SessionSummary {
        let summary = self.scorer.summary();
        info!(
            exercise = %summary.exercise,
            frames = summary.total_frames,
            safe_frames = summary.safe_frames,
            score = summary.score,
            "Session summary"
        );
        summary
    }
}
