//! Error types for lyra-engine
//!
//! Error severity:
//! - **Hard failures** (empty input, segmentation, base emotion extraction)
//!   abort the request; the caller receives `ok=false` with an error code.
//! - **Stage failures** (optional sub-engines, translation) are recovered
//!   locally with a documented default and recorded as a [`StageDiagnostic`].
//! - **Rejected override values** (`InvalidInput`) are skipped in favour of
//!   the next precedence layer and recorded the same way.

use serde::Serialize;
use thiserror::Error;

/// Analysis error type
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input is empty after trimming
    #[error("Input text is empty")]
    EmptyInput,

    /// An override or hint value could not be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Segmentation produced no usable sections
    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    /// Base emotion extraction failed
    #[error("Emotion extraction failed: {0}")]
    EmotionExtraction(String),

    /// An optional stage failed
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: &'static str, message: String },

    /// Injected translator failed
    #[error("Translation failed: {0}")]
    Translation(String),

    /// Engine configuration rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// lyra-common error
    #[error("Common error: {0}")]
    Common(#[from] lyra_common::Error),
}

/// Machine-readable error code carried in failed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EmptyInput,
    InvalidInput,
    SegmentationFailed,
    EmotionExtractionFailed,
    StageFailed,
    TranslationFailed,
    ConfigError,
}

impl AnalysisError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyInput => ErrorCode::EmptyInput,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Segmentation(_) => ErrorCode::SegmentationFailed,
            Self::EmotionExtraction(_) => ErrorCode::EmotionExtractionFailed,
            Self::Stage { .. } => ErrorCode::StageFailed,
            Self::Translation(_) => ErrorCode::TranslationFailed,
            Self::Config(_) | Self::Common(_) => ErrorCode::ConfigError,
        }
    }

    /// Whether this error aborts the whole request
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::Segmentation(_)
                | Self::EmotionExtraction(_)
        )
    }

    pub fn stage(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }
}

/// A recovered stage failure recorded in the result diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDiagnostic {
    pub stage: String,
    pub code: ErrorCode,
    pub message: String,
    /// What was used instead
    pub fallback: String,
}

impl StageDiagnostic {
    pub fn new(stage: &str, error: &AnalysisError, fallback: impl Into<String>) -> Self {
        Self {
            stage: stage.to_string(),
            code: error.code(),
            message: error.to_string(),
            fallback: fallback.into(),
        }
    }
}

/// Result type for engine operations
pub type AnalysisOutcome<T> = Result<T, AnalysisError>;
