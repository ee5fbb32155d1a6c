/// Convenience result type used across yoyplot.
pub type YoyResult<T> = Result<T, YoyError>;

/// Top-level error taxonomy used by the library APIs.
#[derive(thiserror::Error, Debug)]
pub enum YoyError {
    /// Invalid user-provided configuration or series data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while reading or parsing the input dataset.
    #[error("data error: {0}")]
    Data(String),

    /// Errors while composing or exporting a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while assembling frames into a video or muxing audio.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl YoyError {
    /// Build a [`YoyError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`YoyError::Data`] value.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Build a [`YoyError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`YoyError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
