/// Convenience result type used across strata.
pub type StrataResult<T> = Result<T, StrataError>;

/// Top-level error taxonomy used by tree and host APIs.
///
/// Draw aborts and scroll outcomes are not errors; they are reported through
/// [`crate::DrawResult`] and [`crate::ScrollStatus`].
#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    /// Invalid caller-provided values (sizes, scales, settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// Structural violations of the layer hierarchy: cycles, duplicate ids,
    /// unknown ids, or attaching a layer that is already owned elsewhere.
    #[error("structure error: {0}")]
    Structure(String),

    /// Errors when serializing or deserializing tree descriptions or settings.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    /// Build a [`StrataError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StrataError::Structure`] value.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Build a [`StrataError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
