/// Convenience result type used across stripline.
pub type StriplineResult<T> = Result<T, StriplineError>;

/// Top-level error taxonomy used by editing APIs.
///
/// Every variant is produced before the first strip mutation of a non-modal operation, so an
/// `Err` always means the timeline was left untouched.
#[derive(thiserror::Error, Debug)]
pub enum StriplineError {
    /// Operation cannot run in the current state (no active strip, wrong strip type, ...).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Selection does not match what the operation needs (too many or too few strips).
    #[error("selection error: {0}")]
    Selection(String),

    /// Mutation would break a structural invariant, such as an effect input cycle.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Invalid user-provided or timeline data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StriplineError {
    /// Build a [`StriplineError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`StriplineError::Selection`] value.
    pub fn selection(msg: impl Into<String>) -> Self {
        Self::Selection(msg.into())
    }

    /// Build a [`StriplineError::Integrity`] value.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    /// Build a [`StriplineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StriplineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
