/// Errors raised while playing a scene script.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Every variant is fatal to the run that produced it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    #[error("dangling node reference: {0}")]
    DanglingReference(String),

    #[error("unknown cue: '{0}' is not defined in the cue table")]
    UnknownCue(String),

    #[error("invalid duration {duration} for {context}")]
    InvalidDuration { duration: f64, context: String },

    #[error("conflicting transitions on {node}.{property} in one group")]
    ConflictingTransition { node: String, property: String },

    #[error("property '{property}' cannot take value {value}")]
    PropertyMismatch { property: String, value: String },

    #[error("player halted at step {step}: {source}")]
    Halted {
        step: usize,
        #[source]
        source: Box<PlayerError>,
    },
}

impl PlayerError {
    pub fn invalid_duration(duration: f64, context: impl Into<String>) -> Self {
        PlayerError::InvalidDuration {
            duration,
            context: context.into(),
        }
    }

    /// Unwrap the error that originally stopped the player.
    pub fn root(&self) -> &PlayerError {
        match self {
            PlayerError::Halted { source, .. } => source.root(),
            other => other,
        }
    }
}
