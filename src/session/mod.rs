//! Session Management: phase tracking, safety escalation, feedback and scoring
//!
//! # Components
//! - `phase.rs`: PhaseDetector state machine over the driving angle
//! - `safety.rs`: SafetyTracker consecutive-violation escalation
//! - `feedback.rs`: FeedbackGenerator corrective messages
//! - `scoring.rs`: SessionScorer frame history and final score
//! - `handle.rs`: Session, the single-owner handle tying them together

pub mod feedback;
pub mod handle;
pub mod phase;
pub mod safety;
pub mod scoring;

pub use feedback::FeedbackGenerator;
pub use handle::{FrameReport, Session};
pub use phase::{Phase, PhaseDetector, PhaseInfo};
pub use safety::{
    EscalationThresholds, SafetyConfig, SafetyStatus, SafetySummary, SafetyTracker,
    SafetyUpdate, SafetyViolation, Severity, WarningLevel,
};
pub use scoring::{Frame, ScoreWeights, SessionScorer, SessionSummary};
