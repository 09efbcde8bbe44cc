//! Error types for queryspec.
//!
//! [`SpecError`] covers the three failure families of the evaluation layer:
//! configuration errors (a specification that can never be evaluated),
//! search-pattern errors, and expression errors raised while interpreting or
//! translating an expression tree. None of them are retried.

use thiserror::Error;

/// The error type for every queryspec operation.
#[derive(Error, Debug)]
pub enum SpecError {
    // ── Configuration ────────────────────────────────────────────────

    /// More than one primary ordering (`order_by` / `order_by_descending`)
    /// was declared on one specification.
    #[error("The specification contains more than one OrderBy/OrderByDescending expression")]
    DuplicateOrderChain,

    /// A secondary ordering was declared before any primary ordering.
    #[error("ThenBy/ThenByDescending used without a preceding OrderBy/OrderByDescending")]
    MissingPrimaryOrder,

    /// Both `selector` and `selector_many` were set.
    #[error("Concurrent specification selector transforms defined. Ensure only one of select() or select_many() is used")]
    ConcurrentSelectors,

    /// An in-memory projection was requested but no selector was set.
    #[error("The specification must have a selector defined for in-memory projection")]
    SelectorNotFound,

    /// A projected query was requested with no selector and no projection provider.
    #[error("Projection to '{0}' is unavailable: no selector and no projection provider configured")]
    ProjectionUnavailable(String),

    /// An update specification carried no update instructions.
    #[error("The update specification contains no update expressions")]
    EmptyUpdateInstructions,

    /// A settings value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Search ───────────────────────────────────────────────────────

    /// A search pattern could not be parsed.
    #[error("Invalid search pattern: {0}")]
    InvalidSearchPattern(String),

    // ── Expressions ──────────────────────────────────────────────────

    /// An expression referenced a parameter that is not bound in scope.
    #[error("Unbound expression parameter: {0}")]
    UnboundParameter(String),

    /// An expression could not be evaluated against a value.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// A query operation cannot be translated by the target backend.
    #[error("Unsupported query operation: {0}")]
    Unsupported(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SpecError {
    /// Returns `true` for programmer errors detected while evaluating a
    /// specification (conflicting selectors, duplicate ordering, ...).
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateOrderChain
                | Self::MissingPrimaryOrder
                | Self::ConcurrentSelectors
                | Self::SelectorNotFound
                | Self::ProjectionUnavailable(_)
                | Self::EmptyUpdateInstructions
                | Self::ConfigurationError(_)
        )
    }
}

/// A convenience type alias for `Result<T, SpecError>`.
pub type SpecResult<T> = Result<T, SpecError>;
