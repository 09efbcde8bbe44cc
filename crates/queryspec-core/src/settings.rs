//! Settings for the queryspec evaluation layer.
//!
//! This module provides the [`Settings`] struct, which holds the knobs the
//! evaluator pipeline reads at construction time, and [`LazySettings`], a
//! globally-accessible, lazily-initialized settings instance.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a cached query result expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheExpirationMode {
    /// The entry expires a fixed time after it was stored.
    #[default]
    Absolute,
    /// The entry expires after a period without access.
    Sliding,
}

/// The SQL dialect targeted by the SQL compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlBackend {
    /// PostgreSQL (uses `$1, $2, ...` placeholders).
    #[default]
    PostgreSQL,
    /// SQLite (uses `?` placeholders).
    SQLite,
    /// MySQL (uses `?` placeholders).
    MySQL,
}

/// The complete set of queryspec settings.
///
/// # Examples
///
/// ```
/// use queryspec_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.cache_include_paths);
/// assert_eq!(settings.default_cache_timeout_secs, 300);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level or `EnvFilter` directive (e.g. "info", "queryspec_db=debug").
    pub log_level: String,

    // ── Evaluation ───────────────────────────────────────────────────

    /// Whether the include evaluator memoizes resolved navigation paths.
    pub cache_include_paths: bool,

    // ── Result caching ───────────────────────────────────────────────

    /// Cache timeout used when a specification enables caching without one.
    pub default_cache_timeout_secs: u64,
    /// Expiration mode used when a specification enables caching without one.
    pub default_cache_expiration: CacheExpirationMode,

    // ── SQL ──────────────────────────────────────────────────────────

    /// The dialect used by the SQL compiler when none is given explicitly.
    pub sql_backend: SqlBackend,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Settings {
    /// Returns the default cache timeout as a [`Duration`].
    pub const fn default_cache_timeout(&self) -> Duration {
        Duration::from_secs(self.default_cache_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            cache_include_paths: true,
            default_cache_timeout_secs: 300,
            default_cache_expiration: CacheExpirationMode::Absolute,
            sql_backend: SqlBackend::PostgreSQL,
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup; later reads
/// go through [`get`](LazySettings::get) or [`get_or_default`](LazySettings::get_or_default).
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, installing the defaults if nothing
    /// was configured yet.
    pub fn get_or_default(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
