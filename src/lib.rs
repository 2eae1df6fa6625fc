//! Physio Coach - real-time exercise form feedback and safety escalation
//!
//! Consumes one frame of joint angles at a time and produces the movement
//! phase, corrective feedback, an escalating safety warning level and, at the
//! end, a session score.

pub mod angles;
pub mod cli;
pub mod error;
pub mod exercise;
pub mod pose;
pub mod session;

pub use angles::{AngleMap, AngleName};
pub use error::{CoachError, Result};
pub use exercise::{ExerciseCatalog, ExerciseProfile};
pub use session::{FrameReport, Session, SessionSummary};
