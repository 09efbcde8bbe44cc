//! # queryspec-core
//!
//! Core types shared by every queryspec crate: the error taxonomy, the
//! settings model with its file/environment loaders, and tracing setup.
//! This crate has no queryspec dependencies.
//!
//! ## Modules
//!
//! - [`error`] - [`SpecError`] and the [`SpecResult`] alias
//! - [`settings`] - Evaluator settings and the global [`SETTINGS`] instance
//! - [`settings_loader`] - TOML / JSON / environment loading
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{SpecError, SpecResult};
pub use settings::{CacheExpirationMode, Settings, SqlBackend, SETTINGS};
