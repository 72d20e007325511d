use thiserror::Error;

/// Errors raised by the fit engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("No size data available for garment {0}")]
    NoSizeData(String),

    #[error("Invalid feedback category: {0}")]
    InvalidFeedbackCategory(String),

    #[error("Layer {0} is used by more than one garment")]
    DuplicateLayer(u32),

    #[error("Layer positions start at 1, got {0}")]
    InvalidLayer(u32),
}
