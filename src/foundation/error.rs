/// Convenience result type used across wrapreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by reel APIs.
///
/// Every variant is recoverable: callers retry the user-initiated action or fall back to another
/// export path.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The runtime lacks a required capability (for example, no usable video encoder).
    #[error("unsupported capability: {0}")]
    Unsupported(String),

    /// A video or image encoder reported a failure mid-operation.
    #[error("encoder failure: {0}")]
    Encoder(String),

    /// A lazily-loaded encoder backend could not be made available.
    #[error("resource load failure: {0}")]
    ResourceLoad(String),

    /// Errors while driving playback or rendering a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`ReelError::Encoder`] value.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Build a [`ReelError::ResourceLoad`] value.
    pub fn resource_load(msg: impl Into<String>) -> Self {
        Self::ResourceLoad(msg.into())
    }

    /// Build a [`ReelError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
