use crate::error::ConfigError;
use tracing_subscriber::EnvFilter;

/// Installs a compact fmt subscriber filtered by `RUST_LOG`, falling back
/// to `filter`.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_logging(filter: &str) -> Result<bool, ConfigError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(filter).map_err(|e| ConfigError::InvalidLogFilter {
            filter: filter.to_string(),
            reason: e.to_string(),
        })?,
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok())
}
