//! Runtime errors and reporting
//!
//! Nothing in the apply loop is fatal. Failures are turned into
//! [`ConfiguratorError`]s, handed to an [`ErrorReporter`] and the runtime
//! keeps the last good state.

use thiserror::Error;

use crate::assets::AssetError;
use crate::foundation::collections::GenerationTag;

/// Errors raised while applying host messages
#[derive(Error, Debug)]
pub enum ConfiguratorError {
    /// A selection is not in its catalog or a payload is out of range
    #[error("Rejected {field}: '{key}' is not valid")]
    Validation {
        /// Catalog or field the value was checked against
        field: &'static str,
        /// Offending value
        key: String,
    },

    /// An asset fetch or decode failed
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// A fetch resolved after a newer one was issued
    #[error("Discarded stale response {tag:?} (current {current:?})")]
    StaleResponse {
        /// Tag the response carried
        tag: GenerationTag,
        /// Tag currently expected
        current: GenerationTag,
    },

    /// A host message could not be understood
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Sink for non-fatal errors
pub trait ErrorReporter {
    /// Report an error; must not panic
    fn report(&mut self, error: ConfiguratorError);
}

/// Reports errors through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&mut self, error: ConfiguratorError) {
        match error {
            ConfiguratorError::StaleResponse { .. } => log::debug!("{}", error),
            _ => log::warn!("{}", error),
        }
    }
}

impl<F: FnMut(ConfiguratorError)> ErrorReporter for F {
    fn report(&mut self, error: ConfiguratorError) {
        self(error);
    }
}
