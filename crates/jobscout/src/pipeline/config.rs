use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::config::{validate_config, Config, CredentialsConfig};
use crate::error::ConfigError;
use crate::matcher::MatchMethod;
use crate::portal::Portal;
use crate::search::SearchQuery;
use crate::secrets::SecretSource;
use crate::session::Credentials;

/// Where and how to reach the text generation model.
#[derive(Debug)]
pub struct LlmSettings {
    pub model: String,
    pub endpoint: Option<String>,
    pub api_key: SecretString,
}

/// A checked, fully resolved run configuration.
#[derive(Debug)]
pub struct PipelineConfig {
    pub portal: Portal,
    /// `None` runs as a guest.
    pub credentials: Option<Credentials>,
    pub query: SearchQuery,
    pub limit: Option<usize>,
    pub method: MatchMethod,
    pub threshold: i64,
    pub wanted_description: String,
    /// Set only for the `llm` method.
    pub llm: Option<LlmSettings>,
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub output_path: PathBuf,
}

fn secret_error(name: &'static str) -> impl FnOnce(crate::secrets::SecretError) -> ConfigError {
    move |source| ConfigError::Secret { name, source }
}

fn resolve_credentials(credentials: &CredentialsConfig) -> Result<Credentials, ConfigError> {
    let username = SecretSource::new(
        credentials.username.as_deref(),
        None,
        credentials.username_env_var.as_deref(),
    )
    .resolve()
    .map_err(secret_error("username"))?;

    let password = SecretSource::new(
        credentials.password.as_deref(),
        credentials.password_file.as_deref(),
        credentials.password_env_var.as_deref(),
    )
    .resolve()
    .map_err(secret_error("password"))?;

    Ok(Credentials {
        username: username.expose_secret().to_string(),
        password,
    })
}

impl PipelineConfig {
    /// Validates `config` and resolves its secrets. The first problem found
    /// is returned.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate_config(config)?;

        let mut portal = Portal::for_kind(config.portal);
        if let Some(page_size) = config.browser.page_size {
            portal = portal.with_page_size(page_size);
        }

        let credentials = config
            .credentials
            .as_ref()
            .map(resolve_credentials)
            .transpose()?;

        let method: MatchMethod = config.matching.method.parse()?;
        let llm = match method {
            MatchMethod::Fuzz => None,
            MatchMethod::Llm => {
                let settings = &config.matching.llm;
                let api_key = SecretSource::new(
                    settings.api_key.as_deref(),
                    settings.api_key_file.as_deref(),
                    settings.api_key_env_var.as_deref(),
                )
                .resolve()
                .map_err(secret_error("LLM API key"))?;

                Some(LlmSettings {
                    model: settings.model.clone(),
                    endpoint: settings.endpoint.clone(),
                    api_key,
                })
            }
        };

        let search = &config.search;
        let query = SearchQuery {
            keywords: search.keywords.clone(),
            location: search.location.clone(),
            recency_seconds: search.recency_seconds,
            filters: search.filters.clone(),
        };

        Ok(Self {
            portal,
            credentials,
            query,
            limit: search.limit,
            method,
            threshold: config.matching.threshold,
            wanted_description: config.matching.description.clone(),
            llm,
            timeout: Duration::from_secs(config.browser.timeout_secs),
            user_agent: config.browser.user_agent.clone(),
            output_path: config.output.path.clone(),
        })
    }
}
