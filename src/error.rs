use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Invalid profile for {exercise}: {reason}")]
    InvalidProfile { exercise: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoachError {
    pub fn invalid_profile(exercise: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            exercise: exercise.into(),
            reason: reason.into(),
        }
    }

    /// Configuration errors are raised while loading profiles, never mid-stream.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidProfile { .. } | Self::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, CoachError>;
