use std::path::{Path, PathBuf};

use crate::config::schema::{Config, CredentialsConfig};
use crate::error::ConfigError;
use crate::matcher::MatchMethod;
use crate::secrets::SecretSource;

const SUPPORTED_VERSION: &str = "1.0";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// `<config dir>/jobscout/config.json`, e.g. `~/.config/jobscout/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jobscout").join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

/// Checks everything that can be checked without touching secrets.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != SUPPORTED_VERSION {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    let matching = &config.matching;
    let method: MatchMethod = matching.method.parse()?;
    if !(0..=100).contains(&matching.threshold) {
        return Err(ConfigError::InvalidThreshold(matching.threshold));
    }
    if matching.description.trim().is_empty() {
        return Err(invalid("matching.description must not be empty"));
    }
    if method == MatchMethod::Llm && matching.llm.model.trim().is_empty() {
        return Err(invalid("matching.llm.model must not be empty"));
    }

    if config.browser.timeout_secs == 0 {
        return Err(invalid("browser.timeout_secs must be at least 1"));
    }
    if config.browser.page_size == Some(0) {
        return Err(invalid("browser.page_size must be at least 1"));
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(invalid(format!(
            "Unknown log level '{}' (expected one of: {})",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if let Some(credentials) = &config.credentials {
        validate_credentials(credentials)?;
    }

    for key in config.search.filters.keys() {
        if key.trim().is_empty() {
            return Err(invalid("search.filters keys must not be empty"));
        }
    }

    Ok(())
}

fn validate_credentials(credentials: &CredentialsConfig) -> Result<(), ConfigError> {
    let username = SecretSource::new(
        credentials.username.as_deref(),
        None,
        credentials.username_env_var.as_deref(),
    );
    if !username.is_configured() {
        return Err(invalid(
            "credentials need 'username' or 'username_env_var'",
        ));
    }

    let password = SecretSource::new(
        credentials.password.as_deref(),
        credentials.password_file.as_deref(),
        credentials.password_env_var.as_deref(),
    );
    if !password.is_configured() {
        return Err(invalid(
            "credentials need one of 'password', 'password_file', or 'password_env_var'",
        ));
    }

    Ok(())
}
