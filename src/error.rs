//! Error types for the SlimVita funnel engine

use crate::funnel::Stage;
use thiserror::Error;

/// Errors that can occur while driving the funnel
#[derive(Debug, Error)]
pub enum FunnelError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Option '{value}' is not offered by question '{question}'")]
    UnknownOption { question: String, value: String },

    #[error("Question '{question}' does not accept {kind} answers")]
    AnswerKindMismatch { question: String, kind: &'static str },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Please enter a valid email address: {0:?}")]
    InvalidEmail(String),

    #[error("Questionnaire already completed")]
    AlreadyCompleted,

    #[error("Funnel is at {actual:?}, expected {expected:?}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
