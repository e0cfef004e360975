//! Reads the focused listing into a [`Job`].

use tracing::{debug, info, warn};
use url::Url;

use crate::driver::{DriverError, Locator, PageDriver};
use crate::job::{Job, JobCandidate};
use crate::portal::Locators;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither apply control is shown, which portals do after applying.
    AlreadyApplied,
    InvalidData { missing: Vec<&'static str> },
}

#[derive(Debug)]
pub enum ListingOutcome {
    Extracted(Job),
    Skipped(SkipReason),
}

/// Absolute form of `href`, resolved against `base`, without fragment.
pub fn canonical_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut url = Url::parse(href)
        .or_else(|_| Url::parse(base).and_then(|b| b.join(href)))
        .ok()?;
    url.set_fragment(None);
    Some(url.into())
}

/// `Ok(false)` when the driver times out waiting for `locator`.
fn is_shown(driver: &dyn PageDriver, locator: &Locator) -> Result<bool, DriverError> {
    match driver.wait_for(locator) {
        Ok(()) => Ok(true),
        Err(e) if e.is_timeout() => Ok(false),
        Err(e) => Err(e),
    }
}

pub struct RecordExtractor<'a> {
    locators: &'a Locators,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(locators: &'a Locators) -> Self {
        Self { locators }
    }

    /// Reads every field of the focused listing without judging it.
    pub fn read_candidate(&self, driver: &dyn PageDriver) -> Result<JobCandidate, DriverError> {
        let l = self.locators;
        let url = match driver.attribute_of(&l.link, "href")? {
            Some(href) => canonical_url(&driver.current_url()?, &href),
            None => None,
        };

        let candidate = JobCandidate {
            title: driver.text_of(&l.title)?,
            company: driver.text_of(&l.company)?,
            location: driver.text_of(&l.location)?,
            url,
            description: driver.text_of(&l.description)?,
            easy_apply: is_shown(driver, &l.easy_apply)?,
        };
        debug!(?candidate, "Read listing");
        Ok(candidate)
    }

    pub fn extract(&self, driver: &dyn PageDriver) -> Result<ListingOutcome, DriverError> {
        let candidate = self.read_candidate(driver)?;
        let title = candidate.title.clone().unwrap_or_default();

        if !candidate.easy_apply && !is_shown(driver, &self.locators.apply)? {
            info!(title = %title, "Already applied to job, skipping");
            return Ok(ListingOutcome::Skipped(SkipReason::AlreadyApplied));
        }

        match Job::try_from(candidate) {
            Ok(job) => {
                info!(title = %job.title(), company = %job.company(), "Job added");
                Ok(ListingOutcome::Extracted(job))
            }
            Err(invalid) => {
                let c = &invalid.candidate;
                warn!(
                    missing = ?invalid.missing,
                    title = ?c.title,
                    company = ?c.company,
                    location = ?c.location,
                    url = ?c.url,
                    "Missing information for a job listing, skipping"
                );
                Ok(ListingOutcome::Skipped(SkipReason::InvalidData {
                    missing: invalid.missing,
                }))
            }
        }
    }
}
