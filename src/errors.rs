use std::borrow::Cow;

use thiserror::Error;

/// Boxed error type returned by transformation functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type returned by the canonicalization engine.
#[derive(Debug, Error)]
pub enum CanonicalError {
    /// A descriptor was invoked without a source attribute configured.
    #[error("canonical field (target {target:?}) has no source attribute configured")]
    MissingSource { target: Option<String> },

    /// A custom callback or named transformation failed.
    #[error("transformation '{name}' failed")]
    Transform {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The record store failed during attribute access or an existence probe.
    #[error("record store error")]
    Store(#[from] StoreError),
}

/// Error raised by a `CanonicalRecord` adapter when the underlying store fails.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: Cow<'static, str>,
}

impl StoreError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
