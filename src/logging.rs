//! Tracing subscriber setup.

use std::env;

use tracing_subscriber::{fmt, EnvFilter};

use crate::options::ConfigError;

/// Filter used when neither the caller nor [`LOG_ENV`] names one.
pub const DEFAULT_LOG_FILTER: &str = "followgraph=info";

/// Environment variable overriding the default log filter.
pub const LOG_ENV: &str = "FOLLOWGRAPH_LOG";

/// Picks the filter directive: `explicit`, else [`LOG_ENV`], else
/// [`DEFAULT_LOG_FILTER`]. Blank values are skipped.
pub fn resolve_log_filter(explicit: Option<&str>) -> String {
    explicit
        .filter(|filter| !filter.trim().is_empty())
        .map(str::to_string)
        .or_else(|| env::var(LOG_ENV).ok().filter(|filter| !filter.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Installs a global fmt subscriber for the relation indexes.
///
/// `filter` takes `EnvFilter` directives such as `"followgraph=debug"`; `None`
/// falls back to [`resolve_log_filter`].
pub fn init_logging(filter: Option<&str>) -> Result<(), ConfigError> {
    let directive = resolve_log_filter(filter);
    let env_filter = EnvFilter::try_new(&directive)
        .map_err(|e| ConfigError::InvalidLogFilter(format!("{directive}: {e}")))?;
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| ConfigError::LoggingInitialized)
}
