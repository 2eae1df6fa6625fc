//! Session scoring: frame history, completion quality and consistency
//!
//! Combines:
//! - Completion quality (0.5): share of frames with every angle safe
//! - Consistency (0.3): low variance of each angle across the session
//! - Safety (0.2): 100 minus a capped penalty per escalation event

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::safety::{SafetyConfig, SafetyStatus, SafetySummary, SafetyTracker, SafetyUpdate};
use crate::angles::{AngleMap, AngleName};
use crate::exercise::{ExerciseCatalog, ExerciseProfile, SafeRange};
use crate::error::Result;

/// Weights for the score components
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
    pub completion: f64,
    pub consistency: f64,
    pub safety: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            completion: 0.5,
            consistency: 0.3,
            safety: 0.2,
        }
    }
}

/// Penalty points per escalation event, and their cap
const PENALTY_PER_EVENT: f64 = 2.0;
const MAX_PENALTY: f64 = 30.0;

/// One recorded observation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
    pub angles: AngleMap<f64>,
    pub validity: AngleMap<bool>,
}

impl Frame {
    /// True when every flagged angle is within range
    pub fn is_safe(&self) -> bool {
        self.validity.values().all(|&safe| safe)
    }
}

/// End-of-session report
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub exercise: String,
    pub total_frames: usize,
    pub safe_frames: usize,
    pub score: f64,
    pub safety: SafetySummary,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sample variance; `None` below two samples
fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(squares / (n - 1.0))
}

/// Frame history plus safety escalation for one exercise session
#[derive(Clone, Debug)]
pub struct SessionScorer {
    profile: Arc<ExerciseProfile>,
    frames: Vec<Frame>,
    tracker: SafetyTracker,
    weights: ScoreWeights,
}

impl SessionScorer {
    pub fn new(profile: Arc<ExerciseProfile>, config: SafetyConfig) -> Self {
        SessionScorer {
            profile,
            frames: Vec::new(),
            tracker: SafetyTracker::new(config),
            weights: ScoreWeights::default(),
        }
    }

    pub fn for_exercise(catalog: &ExerciseCatalog, id: &str, config: SafetyConfig) -> Result<Self> {
        Ok(Self::new(catalog.get(id)?, config))
    }

    /// Replace the default 0.5 / 0.3 / 0.2 component weights
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn exercise_id(&self) -> &str {
        &self.profile.id
    }

    /// Record a frame and run safety escalation on it
    pub fn add_frame(
        &mut self,
        angles: AngleMap<f64>,
        validity: AngleMap<bool>,
        ranges: &AngleMap<SafeRange>,
    ) -> SafetyUpdate {
        self.add_frame_with_alerts(angles, validity, ranges, &[])
    }

    /// Like `add_frame`, with angles flagged critical by the pose layer
    pub fn add_frame_with_alerts(
        &mut self,
        angles: AngleMap<f64>,
        validity: AngleMap<bool>,
        ranges: &AngleMap<SafeRange>,
        critical: &[AngleName],
    ) -> SafetyUpdate {
        let number = self.frames.len() as u64 + 1;
        let update = self
            .tracker
            .update(&angles, &validity, ranges, critical, number);

        self.frames.push(Frame {
            number,
            timestamp: Utc::now(),
            angles,
            validity,
        });
        update
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn safe_frames(&self) -> usize {
        self.frames.iter().filter(|frame| frame.is_safe()).count()
    }

    pub fn tracker(&self) -> &SafetyTracker {
        &self.tracker
    }

    /// Consistency for one angle: `max(0, 100 - variance)`, 100 with one sample
    pub fn consistency(&self, angle: AngleName) -> f64 {
        let values: Vec<f64> = self
            .frames
            .iter()
            .filter_map(|frame| frame.angles.value(angle))
            .collect();

        match sample_variance(&values) {
            Some(variance) => (100.0 - variance).max(0.0),
            None => 100.0,
        }
    }

    /// Score in [0, 100], rounded to two decimals; 0 for an empty session
    pub fn calculate_score(&self) -> f64 {
        let Some(first) = self.frames.first() else {
            return 0.0;
        };

        let total = self.frames.len() as f64;
        let completion_quality = self.safe_frames() as f64 / total * 100.0;

        let consistencies: Vec<f64> = first
            .angles
            .keys()
            .map(|angle| self.consistency(angle))
            .collect();
        let average_consistency = if consistencies.is_empty() {
            100.0
        } else {
            consistencies.iter().sum::<f64>() / consistencies.len() as f64
        };

        let violation_penalty =
            (self.tracker.escalation_events() as f64 * PENALTY_PER_EVENT).min(MAX_PENALTY);

        let score = self.weights.completion * completion_quality
            + self.weights.consistency * average_consistency
            + self.weights.safety * (100.0 - violation_penalty);

        round2(score.clamp(0.0, 100.0))
    }

    pub fn safety_status(&self) -> SafetyStatus {
        self.tracker.status()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            exercise: self.profile.id.clone(),
            total_frames: self.frames.len(),
            safe_frames: self.safe_frames(),
            score: self.calculate_score(),
            safety: self.tracker.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoachError;

    fn scorer() -> SessionScorer {
        SessionScorer::for_exercise(
            &ExerciseCatalog::builtin(),
            "arm_raise",
            SafetyConfig::default(),
        )
        .unwrap()
    }

    fn add(scorer: &mut SessionScorer, abduction: f64, elbow: f64) -> SafetyUpdate {
        let profile = ExerciseCatalog::builtin().get("arm_raise").unwrap();
        let angles: AngleMap<f64> = [
            (AngleName::ShoulderAbduction, abduction),
            (AngleName::ElbowFlexion, elbow),
        ]
        .into_iter()
        .collect();
        let validity = profile.validate(&angles);
        scorer.add_frame(angles, validity, &profile.angle_ranges)
    }

    #[test]
    fn test_sample_variance() {
        assert_eq!(sample_variance(&[]), None);
        assert_eq!(sample_variance(&[4.0]), None);
        let variance = sample_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((variance - 32.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_session_scores_zero() {
        let scorer = scorer();
        assert_eq!(scorer.calculate_score(), 0.0);

        let summary = scorer.summary();
        assert_eq!(summary.total_frames, 0);
        assert_eq!(summary.safe_frames, 0);
        assert_eq!(summary.score, 0.0);
        assert_eq!(summary.safety.total_violations, 0);
    }

    #[test]
    fn test_constant_safe_session_scores_full_marks() {
        let mut scorer = scorer();
        for _ in 0..20 {
            add(&mut scorer, 90.0, 5.0);
        }
        assert_eq!(scorer.calculate_score(), 100.0);
    }

    #[test]
    fn test_single_frame_is_fully_consistent() {
        let mut scorer = scorer();
        add(&mut scorer, 90.0, 5.0);
        assert_eq!(scorer.consistency(AngleName::ShoulderAbduction), 100.0);
        assert_eq!(scorer.calculate_score(), 100.0);
    }

    #[test]
    fn test_frame_numbers_are_sequential() {
        let mut scorer = scorer();
        for _ in 0..3 {
            add(&mut scorer, 90.0, 5.0);
        }
        let numbers: Vec<u64> = scorer.frames().iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_mixed_session_score() {
        let mut scorer = scorer();
        // 4 high violations (2 escalation events) then 6 safe frames
        for _ in 0..4 {
            add(&mut scorer, 190.0, 5.0);
        }
        for _ in 0..6 {
            add(&mut scorer, 190.0 - 100.0, 5.0);
        }

        assert_eq!(scorer.safe_frames(), 6);
        assert_eq!(scorer.tracker().escalation_events(), 2);

        // Abduction values: 4 x 190, 6 x 90 -> variance 2666.67, consistency 0
        assert_eq!(scorer.consistency(AngleName::ShoulderAbduction), 0.0);
        assert_eq!(scorer.consistency(AngleName::ElbowFlexion), 100.0);

        // 0.5 * 60 + 0.3 * 50 + 0.2 * 96
        assert_eq!(scorer.calculate_score(), 64.2);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights {
            completion: 1.0,
            consistency: 0.0,
            safety: 0.0,
        };
        let mut scorer = scorer().with_weights(weights);
        assert_eq!(scorer.weights(), weights);

        for _ in 0..4 {
            add(&mut scorer, 190.0, 5.0);
        }
        for _ in 0..6 {
            add(&mut scorer, 90.0, 5.0);
        }
        // Only the 6/10 safe frames count
        assert_eq!(scorer.calculate_score(), 60.0);
    }

    #[test]
    fn test_penalty_is_capped() {
        let mut scorer = scorer();
        for _ in 0..40 {
            add(&mut scorer, 190.0, 5.0);
        }
        assert_eq!(scorer.tracker().escalation_events(), 38);
        // completion 0, consistency 100, penalty capped at 30
        assert_eq!(scorer.calculate_score(), 44.0);
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        let values = [10.0, 170.0, 95.0, -30.0, 140.0, 200.0, 60.0];
        let run = || {
            let mut scorer = scorer();
            for (i, &value) in values.iter().cycle().take(50).enumerate() {
                add(&mut scorer, value, (i % 25) as f64);
            }
            scorer.calculate_score()
        };

        let first = run();
        assert_eq!(first, run());
        assert!((0.0..=100.0).contains(&first));
    }

    #[test]
    fn test_summary_serializes_contract_fields() {
        let mut scorer = scorer();
        for _ in 0..3 {
            add(&mut scorer, 190.0, 5.0);
        }

        let json = serde_json::to_value(scorer.summary()).unwrap();
        assert_eq!(json["exercise"], "arm_raise");
        assert_eq!(json["total_frames"], 3);
        assert_eq!(json["safe_frames"], 0);
        assert_eq!(json["safety"]["total_violations"], 1);
        assert_eq!(json["safety"]["by_severity"]["high"], 1);
        assert_eq!(json["safety"]["by_severity"]["critical"], 0);
        assert_eq!(json["safety"]["by_angle"]["shoulder_abduction"], 1);
        assert_eq!(json["safety"]["escalation_events"], 1);
        assert_eq!(json["safety"]["highest_warning_level"], 3);
    }

    #[test]
    fn test_unknown_exercise_is_an_error() {
        let err = SessionScorer::for_exercise(
            &ExerciseCatalog::builtin(),
            "deadlift",
            SafetyConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoachError::UnknownExercise(_)));
    }
}
