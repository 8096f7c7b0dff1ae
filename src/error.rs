use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::warn;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed wall-clock components (month 13, hour 25, ...).
    #[error("invalid wall-clock time: {message}")]
    InvalidWallClock { message: String },

    /// The caller supplied a timezone name the IANA database does not know.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// A proposed schedule failed structural validation. `index` points at
    /// the offending block when the failure is block-scoped.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        index: Option<usize>,
        details: Option<JsonValue>,
    },

    /// The injected assistant reported a transport or shape failure. Always
    /// recoverable: the planner degrades to the sequential fallback.
    #[error("assistant failure: {message}")]
    Assistant { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid_wall_clock(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "engine::tz", %message, "invalid wall-clock input");
        EngineError::InvalidWallClock { message }
    }

    pub fn unknown_timezone(name: impl Into<String>) -> Self {
        let name = name.into();
        warn!(target: "engine::tz", timezone = %name, "unknown timezone identifier");
        EngineError::UnknownTimezone(name)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "engine::validation", %message, "validation error");
        EngineError::Validation {
            message,
            index: None,
            details: None,
        }
    }

    pub fn validation_at(index: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "engine::validation", block = index, %message, "block validation error");
        EngineError::Validation {
            message,
            index: Some(index),
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "engine::validation", %message, details = %details, "validation error with details");
        EngineError::Validation {
            message,
            index: None,
            details: Some(details),
        }
    }

    /// Attach a structured details payload to a validation error. Other
    /// variants pass through unchanged.
    pub fn with_details(mut self, payload: JsonValue) -> Self {
        if let EngineError::Validation { details, .. } = &mut self {
            *details = Some(payload);
        }
        self
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "engine::assistant", %message, "assistant error");
        EngineError::Assistant { message }
    }

    /// True when the planner may degrade to the deterministic fallback
    /// instead of surfacing the error to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Validation { .. }
                | EngineError::Assistant { .. }
                | EngineError::Serialization(_)
        )
    }

    pub fn block_index(&self) -> Option<usize> {
        match self {
            EngineError::Validation { index, .. } => *index,
            _ => None,
        }
    }
}
