use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Environment variable naming a log file, overriding `[log] file`
pub const LOG_FILE_ENV: &str = "TAB_JUMP_LOG";

/// Resolve where log output goes; `None` disables logging
pub fn log_path(config: &LogConfig, env_override: Option<PathBuf>) -> Option<PathBuf> {
    env_override
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| config.file.clone())
}

/// Build the event filter, preferring `RUST_LOG` over the configured directive
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to the configured log file
///
/// The terminal belongs to the editor, so nothing is installed unless a file
/// is configured. Returns the file in use.
pub fn init(config: &LogConfig) -> miette::Result<Option<PathBuf>> {
    let env_override = std::env::var_os(LOG_FILE_ENV).map(PathBuf::from);
    let Some(path) = log_path(config, env_override) else {
        return Ok(None);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| miette::miette!("Failed to open log file {}: {}", path.display(), e))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| miette::miette!("Failed to install logger: {}", e))?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_disables_logging() {
        let config = LogConfig::default();
        assert_eq!(log_path(&config, None), None);
        assert_eq!(log_path(&config, Some(PathBuf::new())), None);
    }

    #[test]
    fn test_env_overrides_config_file() {
        let config = LogConfig {
            file: Some(PathBuf::from("/tmp/config.log")),
            ..LogConfig::default()
        };
        assert_eq!(
            log_path(&config, None),
            Some(PathBuf::from("/tmp/config.log"))
        );
        assert_eq!(
            log_path(&config, Some(PathBuf::from("/tmp/env.log"))),
            Some(PathBuf::from("/tmp/env.log"))
        );
    }

    #[test]
    fn test_invalid_filter_falls_back() {
        let config = LogConfig {
            file: None,
            filter: "tab_jump=[".to_string(),
        };
        // Only checks that building a filter never panics
        let _ = env_filter(&config);
    }
}
