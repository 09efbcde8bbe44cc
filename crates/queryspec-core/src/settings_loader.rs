//! Settings loading from configuration files and the environment.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `QUERYSPEC_DEBUG` | `debug` |
//! | `QUERYSPEC_LOG_LEVEL` | `log_level` |
//! | `QUERYSPEC_CACHE_INCLUDE_PATHS` | `cache_include_paths` |
//! | `QUERYSPEC_CACHE_TIMEOUT_SECS` | `default_cache_timeout_secs` |
//! | `QUERYSPEC_CACHE_EXPIRATION` | `default_cache_expiration` (`absolute` / `sliding`) |
//! | `QUERYSPEC_SQL_BACKEND` | `sql_backend` (`postgresql` / `sqlite` / `mysql`) |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use queryspec_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/queryspec.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::SpecError;
use crate::settings::{CacheExpirationMode, Settings, SqlBackend};

/// Loads settings from a TOML string.
///
/// Keys not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, SpecError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| SpecError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_into_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, SpecError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        SpecError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SpecError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, SpecError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| SpecError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_into_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, SpecError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        SpecError::ConfigurationError(format!(
            "Failed to read JSON file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `QUERYSPEC_*` environment variable overrides to a settings struct.
///
/// Unparseable values are ignored and the current value is kept.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("QUERYSPEC_DEBUG") {
        settings.debug = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("QUERYSPEC_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("QUERYSPEC_CACHE_INCLUDE_PATHS") {
        settings.cache_include_paths = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("QUERYSPEC_CACHE_TIMEOUT_SECS") {
        if let Ok(secs) = val.trim().parse::<u64>() {
            settings.default_cache_timeout_secs = secs;
        }
    }

    if let Ok(val) = std::env::var("QUERYSPEC_CACHE_EXPIRATION") {
        match val.trim().to_lowercase().as_str() {
            "absolute" => settings.default_cache_expiration = CacheExpirationMode::Absolute,
            "sliding" => settings.default_cache_expiration = CacheExpirationMode::Sliding,
            _ => {}
        }
    }

    if let Ok(val) = std::env::var("QUERYSPEC_SQL_BACKEND") {
        match val.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => settings.sql_backend = SqlBackend::PostgreSQL,
            "sqlite" => settings.sql_backend = SqlBackend::SQLite,
            "mysql" => settings.sql_backend = SqlBackend::MySQL,
            _ => {}
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn merge_into_defaults(value: serde_json::Value, format: &str) -> Result<Settings, SpecError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        SpecError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        SpecError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "queryspec_db=trace"
            cache_include_paths = false
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "queryspec_db=trace");
        assert!(!settings.cache_include_paths);
        // Defaults preserved
        assert_eq!(settings.default_cache_timeout_secs, 300);
    }

    #[test]
    fn test_from_toml_str_enums() {
        let toml = r#"
            default_cache_expiration = "sliding"
            sql_backend = "mysql"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.default_cache_expiration, CacheExpirationMode::Sliding);
        assert_eq!(settings.sql_backend, SqlBackend::MySQL);
    }

    #[test]
    fn test_from_toml_str_extra() {
        let toml = r#"
            [extra]
            tenant = "acme"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.extra["tenant"], "acme");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert!(settings.cache_include_paths);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(SpecError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_bad_enum_value() {
        let result = from_toml_str(r#"sql_backend = "oracle""#);
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "default_cache_timeout_secs": 60
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.default_cache_timeout_secs, 60);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    // ── Files ───────────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file_roundtrip() {
        let dir = std::env::temp_dir().join("queryspec_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("queryspec.toml");
        std::fs::write(&path, "sql_backend = \"sqlite\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.sql_backend, SqlBackend::SQLite);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = from_json_file("/nonexistent/queryspec.json");
        assert!(matches!(result, Err(SpecError::ConfigurationError(_))));
    }

    // ── Environment ─────────────────────────────────────────────────

    #[test]
    fn test_apply_env_overrides_cache_timeout() {
        let mut settings = Settings::default();
        std::env::set_var("QUERYSPEC_CACHE_TIMEOUT_SECS", "45");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.default_cache_timeout_secs, 45);
        std::env::remove_var("QUERYSPEC_CACHE_TIMEOUT_SECS");
    }

    #[test]
    fn test_apply_env_overrides_sql_backend() {
        let mut settings = Settings::default();
        std::env::set_var("QUERYSPEC_SQL_BACKEND", "SQLite");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.sql_backend, SqlBackend::SQLite);
        std::env::remove_var("QUERYSPEC_SQL_BACKEND");
    }

    #[test]
    fn test_apply_env_overrides_cache_expiration_invalid_is_ignored() {
        let mut settings = Settings::default();
        std::env::set_var("QUERYSPEC_CACHE_EXPIRATION", "forever");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.default_cache_expiration, CacheExpirationMode::Absolute);
        std::env::remove_var("QUERYSPEC_CACHE_EXPIRATION");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("nope"));
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"outer": {"a": 1, "b": 2}});
        let over = serde_json::json!({"outer": {"b": 3}});
        let merged = merge_json(base, over);
        assert_eq!(merged["outer"]["a"], 1);
        assert_eq!(merged["outer"]["b"], 3);
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            items = [1, 2, 3]
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["items"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["nested"]["key"], "value");
    }
}
