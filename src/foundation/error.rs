/// Convenience result type used across the crate.
pub type MosaicResult<T> = Result<T, MosaicError>;

/// Top-level error taxonomy used by rendering APIs.
///
/// Only [`MosaicError::Validation`] is raised before any tile work starts; every other variant
/// aborts a render call in progress.
#[derive(thiserror::Error, Debug)]
pub enum MosaicError {
    /// Invalid request, canvas, or tile parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed, unresolved, or degenerate coordinate transforms.
    #[error("transform error: {0}")]
    Transform(String),

    /// Source images or masks that cannot be located or decoded.
    #[error("resource error: {0}")]
    Resource(String),

    /// Mesh construction or resampling failures.
    #[error("resample error: {0}")]
    Resample(String),

    /// Errors when serializing or deserializing tile specs and requests.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MosaicError {
    /// Build a [`MosaicError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MosaicError::Transform`] value.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build a [`MosaicError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`MosaicError::Resample`] value.
    pub fn resample(msg: impl Into<String>) -> Self {
        Self::Resample(msg.into())
    }

    /// Build a [`MosaicError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for MosaicError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
