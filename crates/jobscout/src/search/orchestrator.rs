use tracing::{debug, error, info, info_span, warn};

use super::error::{SearchError, SearchStage};
use super::paginator::Paginator;
use super::query::SearchQuery;
use crate::driver::{DriverError, Locator, PageDriver};
use crate::job::Job;
use crate::portal::{Portal, RecencyControl};
use crate::sanitize::redact_url;

/// Runs one search on a portal: navigate, narrow by recency, extract.
pub struct JobSearch<'a> {
    portal: &'a Portal,
}

impl<'a> JobSearch<'a> {
    pub fn new(portal: &'a Portal) -> Self {
        Self { portal }
    }

    /// Jobs found for `query`. With no `limit`, the page's result total is used.
    pub fn search_jobs(
        &self,
        driver: &mut dyn PageDriver,
        query: &SearchQuery,
        limit: Option<usize>,
    ) -> Result<Vec<Job>, SearchError> {
        let span = info_span!("search", portal = %self.portal.kind);
        let _enter = span.enter();

        info!(
            keywords = ?query.keywords,
            location = ?query.location,
            "Searching for jobs"
        );

        match self.run(driver, query, limit) {
            Ok(jobs) => {
                info!(count = jobs.len(), "Found jobs");
                Ok(jobs)
            }
            Err(e) => {
                error!(error = %e, "Job search failed");
                Err(e)
            }
        }
    }

    fn run(
        &self,
        driver: &mut dyn PageDriver,
        query: &SearchQuery,
        limit: Option<usize>,
    ) -> Result<Vec<Job>, SearchError> {
        let url = query
            .build_url(self.portal)
            .map_err(|e| SearchError::new(SearchStage::BuildingQuery, e))?;
        debug!(url = %redact_url(url.as_str()), "Built search URL");

        driver
            .navigate(url.as_str())
            .map_err(|e| SearchError::new(SearchStage::Navigating, e))?;

        let applied = match &self.portal.recency {
            // user filters may override the window, so read what was sent
            RecencyControl::QueryParam { key } => url
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned()),
            RecencyControl::Interactive { .. } => match query.recency_token(self.portal) {
                Some(token) => match self.apply_recency(driver, &token) {
                    Ok(()) => Some(token),
                    Err(e) => {
                        warn!(error = %e, token, "Could not apply recency filter, continuing without it");
                        None
                    }
                },
                None => None,
            },
        };

        let paginator = Paginator::new(self.portal);
        let jobs = paginator
            .resolve_limit(driver, limit)
            .and_then(|limit| paginator.extract(driver, limit))
            .map_err(|e| SearchError::new(SearchStage::Extracting, e))?;

        Ok(jobs
            .into_iter()
            .map(|job| job.with_recency_filter(applied.clone()))
            .collect())
    }

    /// Narrows the shown results to the recency window `token`.
    ///
    /// Portals that take the window as a query parameter already have it in
    /// the URL, so this is a no-op for them.
    pub fn apply_recency(&self, driver: &mut dyn PageDriver, token: &str) -> Result<(), DriverError> {
        match &self.portal.recency {
            RecencyControl::QueryParam { .. } => Ok(()),
            RecencyControl::Interactive {
                open,
                option_prefix,
                confirm,
            } => {
                debug!(token, "Selecting recency window");
                driver.click(open)?;
                driver.click(&Locator::new(format!("{option_prefix}{token}']")))?;
                driver.click(confirm)
            }
        }
    }
}
