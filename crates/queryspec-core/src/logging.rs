//! Logging integration for queryspec.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-evaluation spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise structured JSON. Installing a
/// subscriber twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span covering one specification evaluation.
///
/// # Examples
///
/// ```
/// use queryspec_core::logging::evaluation_span;
///
/// let span = evaluation_span("customers", "query");
/// let _guard = span.enter();
/// tracing::debug!("folding evaluators");
/// ```
pub fn evaluation_span(entity: &str, mode: &'static str) -> tracing::Span {
    tracing::debug_span!("evaluate", entity = entity, mode = mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let mut settings = Settings::default();
        settings.debug = false;
        settings.log_level = "not a valid directive [".to_string();
        setup_logging(&settings);
        setup_logging(&settings);
    }

    #[test]
    fn test_evaluation_span_enters() {
        let span = evaluation_span("orders", "in_memory");
        let _guard = span.enter();
        tracing::debug!("inside span");
    }
}
