use tracing::{debug, info, info_span, warn};

use crate::driver::{HtmlDriver, PageDriver};
use crate::error::{ConfigError, JobscoutError};
use crate::job::Job;
use crate::llm::{GeminiClient, TextGenerator};
use crate::matcher::{DescriptionMatcher, MatchingError};
use crate::sanitize::{truncate_for_log, LOG_TEXT_LIMIT};
use crate::search::{JobSearch, SearchError};
use crate::session::{Authenticator, FormLogin, LoginError, SessionGate, SessionState};

use super::config::PipelineConfig;

/// Outcome of one discover-and-qualify pass.
#[derive(Debug)]
pub struct RunReport {
    /// `None` for guest runs.
    pub session: Option<SessionState>,
    pub discovered: usize,
    pub qualified: Vec<Job>,
}

pub struct Pipeline<D: PageDriver> {
    config: PipelineConfig,
    driver: D,
    matcher: DescriptionMatcher,
    authenticator: Option<Box<dyn Authenticator>>,
}

impl Pipeline<HtmlDriver> {
    /// Production constructor: HTTP page driver, and a Gemini client for `llm`.
    pub fn from_config(config: PipelineConfig) -> Result<Self, JobscoutError> {
        let driver = HtmlDriver::new(config.timeout, config.user_agent.as_deref())?
            .with_detail_link(config.portal.locators.link.clone());

        let generator: Option<Box<dyn TextGenerator>> = match &config.llm {
            Some(llm) => {
                let client = GeminiClient::new(
                    llm.api_key.clone(),
                    llm.model.clone(),
                    llm.endpoint.as_deref(),
                    config.timeout,
                )
                .map_err(|e| ConfigError::Validation {
                    message: format!("cannot create LLM client: {e}"),
                })?;
                Some(Box::new(client))
            }
            None => None,
        };

        Ok(Self::new(config, driver, generator)?)
    }
}

impl<D: PageDriver> Pipeline<D> {
    /// The matcher follows `config.method` and `config.threshold`; `generator`
    /// is required for the `llm` method.
    pub fn new(
        config: PipelineConfig,
        driver: D,
        generator: Option<Box<dyn TextGenerator>>,
    ) -> Result<Self, ConfigError> {
        let matcher = DescriptionMatcher::new(config.method, config.threshold, generator)?;
        Ok(Self {
            config,
            driver,
            matcher,
            authenticator: None,
        })
    }

    /// Replaces the portal's form login.
    pub fn with_authenticator(mut self, authenticator: Box<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Signs in unless already authenticated. Guest runs skip this.
    pub fn login(&mut self) -> Result<Option<SessionState>, LoginError> {
        let Some(credentials) = &self.config.credentials else {
            debug!("No credentials configured, browsing as guest");
            return Ok(None);
        };

        let form_login = FormLogin::new(&self.config.portal);
        let authenticator: &dyn Authenticator = match &self.authenticator {
            Some(custom) => custom.as_ref(),
            None => &form_login,
        };

        let state = SessionGate::new(&self.config.portal).ensure_session(
            &mut self.driver,
            authenticator,
            credentials,
        )?;
        Ok(Some(state))
    }

    pub fn search_jobs(&mut self) -> Result<Vec<Job>, SearchError> {
        JobSearch::new(&self.config.portal).search_jobs(
            &mut self.driver,
            &self.config.query,
            self.config.limit,
        )
    }

    /// Jobs whose description matches the wanted description. Jobs without a
    /// description cannot be judged and are dropped.
    pub fn filter_jobs(&self, jobs: Vec<Job>) -> Result<Vec<Job>, MatchingError> {
        let wanted = &self.config.wanted_description;
        let mut qualified = Vec::new();

        for job in jobs {
            let Some(description) = job.description() else {
                debug!(job = %job, "No description, not matched");
                continue;
            };

            let score = self.matcher.score(description, wanted)?;
            if score >= self.matcher.threshold() {
                info!(job = %job, score, "Job qualifies");
                qualified.push(job);
            } else {
                debug!(
                    job = %job,
                    score,
                    description = %truncate_for_log(description, LOG_TEXT_LIMIT),
                    "Job below threshold"
                );
            }
        }

        Ok(qualified)
    }

    /// Session gate, then search, then matching.
    pub fn run(&mut self) -> Result<RunReport, JobscoutError> {
        let _span = info_span!(
            "pipeline",
            portal = %self.config.portal.kind,
            method = %self.matcher.method(),
            threshold = self.matcher.threshold(),
        )
        .entered();

        let session = self.login()?;
        let jobs = self.search_jobs()?;
        let discovered = jobs.len();
        if discovered == 0 {
            warn!("Search returned no jobs");
        }

        let qualified = self.filter_jobs(jobs)?;
        info!(discovered, qualified = qualified.len(), "Run complete");

        Ok(RunReport {
            session,
            discovered,
            qualified,
        })
    }
}
