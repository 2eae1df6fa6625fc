//! Safety escalation: turn repeated unsafe angles into warnings
//!
//! Detects:
//! - Consecutive out-of-range readings per angle, bucketed by severity
//! - Threshold crossings that escalate the session warning level
//! - Explicit critical signals from the pose layer (falls, leaving the frame)

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

use crate::angles::{AngleMap, AngleName, ANGLE_COUNT};
use crate::exercise::SafeRange;

/// Number of violations reported by `SafetyTracker::status`
pub const RECENT_VIOLATIONS: usize = 5;

const SEVERITY_COUNT: usize = 4;

/// Deviation bucket for an unsafe angle
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; SEVERITY_COUNT] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Classify by distance outside the safe range; never yields `Critical`
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation > 30.0 {
            Severity::High
        } else if deviation > 15.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn escalation_level(self) -> WarningLevel {
        WarningLevel(self.index() as u8 + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Session-wide warning level, 0 (safe) to 4 (stop)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WarningLevel(u8);

impl WarningLevel {
    pub const SAFE: WarningLevel = WarningLevel(0);
    pub const CAUTION: WarningLevel = WarningLevel(1);
    pub const WARNING: WarningLevel = WarningLevel(2);
    pub const HIGH: WarningLevel = WarningLevel(3);
    pub const CRITICAL: WarningLevel = WarningLevel(4);

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn text(self) -> &'static str {
        match self.0 {
            0 => "SAFE",
            1 => "CAUTION: Minor deviation detected",
            2 => "WARNING: Moderate deviation - adjust position",
            3 => "HIGH WARNING: Significant deviation - slow down",
            _ => "CRITICAL: Stop exercise immediately",
        }
    }

    pub fn is_safe(self) -> bool {
        self < WarningLevel::WARNING
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Consecutive frames required before each severity escalates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EscalationThresholds {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl EscalationThresholds {
    pub fn for_severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        EscalationThresholds {
            low: 10,
            medium: 5,
            high: 3,
            critical: 1,
        }
    }
}

/// Tracker tuning, fixed for the lifetime of a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SafetyConfig {
    pub thresholds: EscalationThresholds,
    /// Clear an angle's streaks whenever it reads safe. Off by default: an
    /// isolated safe frame does not break a violation streak.
    pub reset_streaks_on_safe_frame: bool,
}

fn round2<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_some(&((value * 100.0).round() / 100.0)),
        None => serializer.serialize_none(),
    }
}

/// One escalation event
///
/// `angle_value` is `None` when a critical signal arrived for an angle the
/// frame has no reading for; the bounds are `None` when the angle has no range.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SafetyViolation {
    pub timestamp: DateTime<Utc>,
    pub angle_name: AngleName,
    #[serde(serialize_with = "round2")]
    pub angle_value: Option<f64>,
    pub min_safe: Option<f64>,
    pub max_safe: Option<f64>,
    pub severity: Severity,
    pub frame_count: u64,
    pub escalated: bool,
    pub escalation_level: WarningLevel,
}

impl fmt::Display for SafetyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.severity.as_str().to_uppercase(), self.angle_name)?;
        match self.angle_value {
            Some(value) => write!(f, "{:.1}°", value)?,
            None => f.write_str("not visible")?,
        }
        if let (Some(min), Some(max)) = (self.min_safe, self.max_safe) {
            write!(f, " (safe: {}-{}°)", min, max)?;
        }
        Ok(())
    }
}

/// Result of feeding one frame to the tracker
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SafetyUpdate {
    pub warning_level: WarningLevel,
    pub new_violations: Vec<SafetyViolation>,
}

/// Runtime safety status for display
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SafetyStatus {
    pub warning_level: WarningLevel,
    pub warning_text: &'static str,
    pub recent_violations: Vec<SafetyViolation>,
    pub is_safe: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl SeverityCounts {
    fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }
}

/// Aggregate view of the violation log
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SafetySummary {
    pub total_violations: usize,
    pub by_severity: SeverityCounts,
    pub by_angle: AngleMap<u32>,
    pub highest_warning_level: WarningLevel,
    pub escalation_events: usize,
}

/// Per-angle, per-severity consecutive violation tracker
#[derive(Clone, Debug)]
pub struct SafetyTracker {
    config: SafetyConfig,
    /// Consecutive violation counters: [angle][severity]
    streaks: [[u32; SEVERITY_COUNT]; ANGLE_COUNT],
    warning_level: WarningLevel,
    violations: Vec<SafetyViolation>,
}

impl SafetyTracker {
    pub fn new(config: SafetyConfig) -> Self {
        SafetyTracker {
            config,
            streaks: [[0; SEVERITY_COUNT]; ANGLE_COUNT],
            warning_level: WarningLevel::SAFE,
            violations: Vec::new(),
        }
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Feed one frame. `critical` lists angles the pose layer flagged with an
    /// explicit critical event this frame.
    pub fn update(
        &mut self,
        angles: &AngleMap<f64>,
        validity: &AngleMap<bool>,
        ranges: &AngleMap<SafeRange>,
        critical: &[AngleName],
        frame_number: u64,
    ) -> SafetyUpdate {
        let mut new_violations = Vec::new();
        let mut flagged = [false; ANGLE_COUNT];

        // Critical signals count whether or not the angle has a reading
        for &angle in critical {
            if std::mem::replace(&mut flagged[angle.index()], true) {
                continue;
            }
            if self.record(angle, Severity::Critical) {
                new_violations.push(self.escalate(
                    angle,
                    angles.value(angle),
                    ranges.value(angle),
                    Severity::Critical,
                    frame_number,
                ));
            }
        }

        for (angle, &is_safe) in validity.iter() {
            if flagged[angle.index()] {
                continue;
            }
            let (Some(range), Some(value)) = (ranges.value(angle), angles.value(angle)) else {
                continue;
            };

            if is_safe {
                if self.config.reset_streaks_on_safe_frame {
                    self.streaks[angle.index()] = [0; SEVERITY_COUNT];
                }
                continue;
            }

            let severity = Severity::from_deviation(range.deviation(value));
            if self.record(angle, severity) {
                new_violations.push(self.escalate(
                    angle,
                    Some(value),
                    Some(range),
                    severity,
                    frame_number,
                ));
            }
        }

        SafetyUpdate {
            warning_level: self.warning_level,
            new_violations,
        }
    }

    /// Extend the streak for `severity`; true once it meets its threshold
    fn record(&mut self, angle: AngleName, severity: Severity) -> bool {
        let streaks = &mut self.streaks[angle.index()];
        streaks[severity.index()] += 1;
        // A worsening deviation starts its own streak
        for lower in &mut streaks[..severity.index()] {
            *lower = 0;
        }
        streaks[severity.index()] >= self.config.thresholds.for_severity(severity)
    }

    fn escalate(
        &mut self,
        angle: AngleName,
        value: Option<f64>,
        range: Option<SafeRange>,
        severity: Severity,
        frame_number: u64,
    ) -> SafetyViolation {
        let level = severity.escalation_level();
        self.warning_level = self.warning_level.max(level);

        let violation = SafetyViolation {
            timestamp: Utc::now(),
            angle_name: angle,
            angle_value: value,
            min_safe: range.map(|range| range.min),
            max_safe: range.map(|range| range.max),
            severity,
            frame_count: frame_number,
            escalated: true,
            escalation_level: level,
        };

        warn!(
            frame = frame_number,
            angle = %angle,
            severity = %severity,
            level = %self.warning_level,
            "{}",
            violation
        );

        self.violations.push(violation.clone());
        violation
    }

    /// Current streak length for one angle and severity
    pub fn streak(&self, angle: AngleName, severity: Severity) -> u32 {
        self.streaks[angle.index()][severity.index()]
    }

    pub fn warning_level(&self) -> WarningLevel {
        self.warning_level
    }

    pub fn violations(&self) -> &[SafetyViolation] {
        &self.violations
    }

    pub fn escalation_events(&self) -> usize {
        self.violations.iter().filter(|v| v.escalated).count()
    }

    pub fn status(&self) -> SafetyStatus {
        let start = self.violations.len().saturating_sub(RECENT_VIOLATIONS);
        SafetyStatus {
            warning_level: self.warning_level,
            warning_text: self.warning_level.text(),
            recent_violations: self.violations[start..].to_vec(),
            is_safe: self.warning_level.is_safe(),
        }
    }

    pub fn summary(&self) -> SafetySummary {
        let mut by_severity = SeverityCounts::default();
        let mut by_angle = AngleMap::new();

        for violation in &self.violations {
            by_severity.bump(violation.severity);
            let count = by_angle.value(violation.angle_name).unwrap_or(0);
            by_angle.insert(violation.angle_name, count + 1);
        }

        SafetySummary {
            total_violations: self.violations.len(),
            by_severity,
            by_angle,
            highest_warning_level: self.warning_level,
            escalation_events: self.escalation_events(),
        }
    }
}

impl Default for SafetyTracker {
    fn default() -> Self {
        Self::new(SafetyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANGLE: AngleName = AngleName::ShoulderAbduction;

    fn ranges() -> AngleMap<SafeRange> {
        [(ANGLE, SafeRange::new(0.0, 150.0))].into_iter().collect()
    }

    fn feed(tracker: &mut SafetyTracker, value: f64, frame: u64) -> SafetyUpdate {
        let range = SafeRange::new(0.0, 150.0);
        let angles: AngleMap<f64> = [(ANGLE, value)].into_iter().collect();
        let validity: AngleMap<bool> = [(ANGLE, range.contains(value))].into_iter().collect();
        tracker.update(&angles, &validity, &ranges(), &[], frame)
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(Severity::from_deviation(5.0), Severity::Low);
        assert_eq!(Severity::from_deviation(15.0), Severity::Low);
        assert_eq!(Severity::from_deviation(15.1), Severity::Medium);
        assert_eq!(Severity::from_deviation(30.0), Severity::Medium);
        assert_eq!(Severity::from_deviation(30.1), Severity::High);
    }

    #[test]
    fn test_escalates_exactly_at_threshold() {
        let cases = [
            (155.0, 10, Severity::Low),
            (170.0, 5, Severity::Medium),
            (190.0, 3, Severity::High),
        ];

        for (value, threshold, severity) in cases {
            let mut tracker = SafetyTracker::default();
            for frame in 1..threshold {
                let update = feed(&mut tracker, value, frame);
                assert!(update.new_violations.is_empty(), "{} escalated early", severity);
            }
            assert_eq!(tracker.warning_level(), WarningLevel::SAFE);

            let update = feed(&mut tracker, value, threshold);
            assert_eq!(update.new_violations.len(), 1);
            assert_eq!(update.new_violations[0].severity, severity);
            assert_eq!(update.warning_level, severity.escalation_level());
        }
    }

    #[test]
    fn test_repeats_escalation_while_streak_continues() {
        let mut tracker = SafetyTracker::default();
        for frame in 1..=5 {
            feed(&mut tracker, 190.0, frame);
        }
        // frames 3, 4 and 5 all meet the high threshold
        assert_eq!(tracker.violations().len(), 3);
        assert_eq!(tracker.escalation_events(), 3);
    }

    #[test]
    fn test_worsening_resets_lower_streaks() {
        let mut tracker = SafetyTracker::default();
        for frame in 1..=4 {
            feed(&mut tracker, 160.0, frame);
        }
        assert_eq!(tracker.streak(ANGLE, Severity::Low), 4);

        feed(&mut tracker, 175.0, 5);
        assert_eq!(tracker.streak(ANGLE, Severity::Low), 0);
        assert_eq!(tracker.streak(ANGLE, Severity::Medium), 1);

        // Improving again does not touch the medium streak
        feed(&mut tracker, 160.0, 6);
        assert_eq!(tracker.streak(ANGLE, Severity::Medium), 1);
        assert_eq!(tracker.streak(ANGLE, Severity::Low), 1);
    }

    #[test]
    fn test_safe_frame_keeps_streak_by_default() {
        let mut tracker = SafetyTracker::default();
        feed(&mut tracker, 190.0, 1);
        feed(&mut tracker, 190.0, 2);
        feed(&mut tracker, 100.0, 3);
        assert_eq!(tracker.streak(ANGLE, Severity::High), 2);

        let update = feed(&mut tracker, 190.0, 4);
        assert_eq!(update.new_violations.len(), 1);
        assert_eq!(update.warning_level, WarningLevel::HIGH);
    }

    #[test]
    fn test_safe_frame_resets_streak_when_configured() {
        let mut tracker = SafetyTracker::new(SafetyConfig {
            reset_streaks_on_safe_frame: true,
            ..SafetyConfig::default()
        });
        feed(&mut tracker, 190.0, 1);
        feed(&mut tracker, 190.0, 2);
        feed(&mut tracker, 100.0, 3);
        assert_eq!(tracker.streak(ANGLE, Severity::High), 0);

        let update = feed(&mut tracker, 190.0, 4);
        assert!(update.new_violations.is_empty());
    }

    #[test]
    fn test_warning_level_never_decreases() {
        let mut tracker = SafetyTracker::default();
        for frame in 1..=3 {
            feed(&mut tracker, 190.0, frame);
        }
        assert_eq!(tracker.warning_level(), WarningLevel::HIGH);

        for frame in 4..=30 {
            feed(&mut tracker, 155.0, frame);
        }
        assert_eq!(tracker.warning_level(), WarningLevel::HIGH);
        assert!(!tracker.status().is_safe);
    }

    #[test]
    fn test_critical_signal_escalates_immediately() {
        let mut tracker = SafetyTracker::default();
        let angles: AngleMap<f64> = [(ANGLE, 90.0)].into_iter().collect();
        let validity: AngleMap<bool> = [(ANGLE, true)].into_iter().collect();

        let update = tracker.update(&angles, &validity, &ranges(), &[ANGLE], 1);
        assert_eq!(update.new_violations.len(), 1);
        assert_eq!(update.new_violations[0].severity, Severity::Critical);
        assert_eq!(update.warning_level, WarningLevel::CRITICAL);
        assert_eq!(tracker.status().warning_text, "CRITICAL: Stop exercise immediately");
    }

    #[test]
    fn test_critical_signal_without_reading() {
        let mut tracker = SafetyTracker::default();
        // The flagged angle left the frame, only the elbow is visible
        let angles: AngleMap<f64> = [(AngleName::ElbowFlexion, 5.0)].into_iter().collect();
        let validity: AngleMap<bool> = [(AngleName::ElbowFlexion, true)].into_iter().collect();

        let update = tracker.update(&angles, &validity, &ranges(), &[ANGLE, ANGLE], 1);
        assert_eq!(update.warning_level, WarningLevel::CRITICAL);
        assert_eq!(update.new_violations.len(), 1);

        let violation = &update.new_violations[0];
        assert_eq!(violation.angle_name, ANGLE);
        assert_eq!(violation.angle_value, None);
        assert_eq!(violation.max_safe, Some(150.0));
        assert_eq!(
            violation.to_string(),
            "[CRITICAL] shoulder_abduction: not visible (safe: 0-150°)"
        );
        assert!(serde_json::to_value(violation).unwrap()["angle_value"].is_null());

        // No range configured for the flagged angle
        let update = tracker.update(&angles, &validity, &ranges(), &[AngleName::ElbowFlexion], 2);
        assert_eq!(update.new_violations.len(), 1);
        assert_eq!(update.new_violations[0].angle_value, Some(5.0));
        assert_eq!(update.new_violations[0].min_safe, None);
        assert_eq!(tracker.summary().by_severity.critical, 2);
    }

    #[test]
    fn test_missing_value_or_range_is_skipped() {
        let mut tracker = SafetyTracker::default();
        let validity: AngleMap<bool> = [(ANGLE, false), (AngleName::ElbowFlexion, false)]
            .into_iter()
            .collect();
        let angles: AngleMap<f64> = [(AngleName::ElbowFlexion, 90.0)].into_iter().collect();

        for frame in 1..=20 {
            let update = tracker.update(&angles, &validity, &ranges(), &[], frame);
            assert!(update.new_violations.is_empty());
        }
        assert_eq!(tracker.streak(ANGLE, Severity::Low), 0);
    }

    #[test]
    fn test_status_and_summary() {
        let mut tracker = SafetyTracker::default();
        for frame in 1..=9 {
            feed(&mut tracker, 200.0, frame);
        }

        let status = tracker.status();
        assert_eq!(status.recent_violations.len(), RECENT_VIOLATIONS);
        assert_eq!(status.recent_violations.last().unwrap().frame_count, 9);
        assert_eq!(status.warning_text, "HIGH WARNING: Significant deviation - slow down");

        let summary = tracker.summary();
        assert_eq!(summary.total_violations, 7);
        assert_eq!(summary.by_severity.high, 7);
        assert_eq!(summary.by_angle.value(ANGLE), Some(7));
        assert_eq!(summary.highest_warning_level, WarningLevel::HIGH);
    }

    #[test]
    fn test_violation_display_and_json() {
        let mut tracker = SafetyTracker::default();
        for frame in 1..=3 {
            feed(&mut tracker, 195.456, frame);
        }
        let violation = &tracker.violations()[0];
        assert_eq!(
            violation.to_string(),
            "[HIGH] shoulder_abduction: 195.5° (safe: 0-150°)"
        );

        let json = serde_json::to_value(violation).unwrap();
        assert_eq!(json["angle_value"], 195.46);
        assert_eq!(json["severity"], "high");
        assert_eq!(json["escalation_level"], 3);
    }
}
