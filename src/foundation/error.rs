/// Convenience result type used across svgview.
pub type ViewResult<T> = Result<T, ViewError>;

/// Top-level error taxonomy used by the staging and presentation APIs.
///
/// Rasterizer failures are not part of this enum: a nonzero status code is reported as
/// [`crate::RenderResult::Failed`], not as an `Err`.
#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    /// Invalid caller-provided data (for example a zero target dimension).
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O failure while copying the bundled asset into writable storage.
    #[error("staging error: {context}")]
    Staging {
        /// What the stager was doing when the failure happened.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The rendered raster could not be read back or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ViewError {
    /// Build a [`ViewError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ViewError::Staging`] value.
    pub fn staging(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Staging {
            context: context.into(),
            source,
        }
    }

    /// Build a [`ViewError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Return `true` for errors raised by the asset stager.
    pub fn is_staging(&self) -> bool {
        matches!(self, Self::Staging { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
