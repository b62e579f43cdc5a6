//! Registry error types

use thiserror::Error;

/// Errors surfaced by registry operations.
///
/// Duplicate registration is the only recoverable failure at this layer;
/// every other registry operation is total.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// `register` was called for a name that already holds a metric.
    /// The existing entry is left untouched.
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),
}
