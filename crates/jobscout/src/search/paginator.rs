//! Walks result pages until enough listings have been processed.
//!
//! Every listing handed to the extractor advances the cursor, whether it
//! produced a job or was skipped. A failed attempt (the driver erroring
//! while focusing or reading a listing, or while turning the page) leaves the
//! cursor where it was and is retried on the next iteration. Iterations are
//! capped at ten per requested listing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use super::error::{ExtractionError, LimitResolutionError};
use super::extractor::{ListingOutcome, RecordExtractor};
use crate::driver::{ListingHandle, PageDriver};
use crate::job::Job;
use crate::portal::Portal;
use crate::sanitize::redact_url;

static RE_LEADING_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,3}(?:,\d{3})+|\d+)").unwrap());

const ATTEMPTS_PER_LISTING: usize = 10;

/// Leading integer of a result-count text such as `"1,234 results"`.
pub fn resolve_limit(text: &str) -> Result<usize, LimitResolutionError> {
    let unresolved = || LimitResolutionError {
        text: text.trim().to_string(),
    };

    let digits = RE_LEADING_TOTAL
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or_else(unresolved)?
        .as_str()
        .replace(',', "");
    digits.parse().map_err(|_| unresolved())
}

/// URL of the page after `current`: adds `param=step` when the offset is
/// absent, otherwise adds `step` to it. Other parameters are kept in order.
pub fn next_page_url(current: &str, param: &str, step: usize) -> Result<String, ExtractionError> {
    let address_error = |reason: String| ExtractionError::PageAddress {
        url: redact_url(current),
        reason,
    };

    let mut url = Url::parse(current).map_err(|e| address_error(e.to_string()))?;
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut found = false;

    for (key, value) in url.query_pairs() {
        if key == param && !found {
            let offset: usize = value
                .parse()
                .map_err(|_| address_error(format!("'{param}={value}' is not an integer offset")))?;
            let next = offset
                .checked_add(step)
                .ok_or_else(|| address_error(format!("offset {offset} overflows")))?;
            pairs.push((key.into_owned(), next.to_string()));
            found = true;
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !found {
        pairs.push((param.to_string(), step.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.into())
}

/// Position of the extraction loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub page_index: usize,
    pub within_page: usize,
    pub total_processed: usize,
}

impl Cursor {
    /// One more listing handled.
    pub fn advance(self) -> Self {
        Self {
            within_page: self.within_page + 1,
            total_processed: self.total_processed + 1,
            ..self
        }
    }

    /// Start of the following page; the running total carries over.
    pub fn next_page(self) -> Self {
        Self {
            page_index: self.page_index + 1,
            within_page: 0,
            ..self
        }
    }
}

pub struct Paginator<'a> {
    portal: &'a Portal,
    extractor: RecordExtractor<'a>,
}

impl<'a> Paginator<'a> {
    pub fn new(portal: &'a Portal) -> Self {
        Self {
            portal,
            extractor: RecordExtractor::new(&portal.locators),
        }
    }

    /// `limit` if given, else the total shown on the current results page.
    pub fn resolve_limit(
        &self,
        driver: &dyn PageDriver,
        limit: Option<usize>,
    ) -> Result<usize, ExtractionError> {
        if let Some(limit) = limit {
            return Ok(limit);
        }

        let text = driver
            .text_of(&self.portal.locators.result_count)?
            .unwrap_or_default();
        let total = resolve_limit(&text)?;
        debug!(total, "Resolved limit from result count");
        Ok(total)
    }

    /// Extracts up to `limit` jobs starting from the page the driver is on.
    pub fn extract(&self, driver: &mut dyn PageDriver, limit: usize) -> Result<Vec<Job>, ExtractionError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let listing = &self.portal.locators.listing;
        let full_page = self.portal.page_size;
        let cap = limit.saturating_mul(ATTEMPTS_PER_LISTING);

        let mut handles = driver.find_all(listing)?;
        let mut cursor = Cursor::default();
        let mut pending_page: Option<String> = None;
        let mut jobs = Vec::new();
        let mut attempts = 0;

        info!(limit, listings = handles.len(), "Extracting jobs from search results");

        while cursor.total_processed < limit {
            if attempts >= cap {
                return Err(ExtractionError::SafetyCapExceeded { attempts, limit });
            }
            attempts += 1;

            if cursor.within_page >= handles.len() {
                if handles.len() < full_page {
                    debug!(
                        page = cursor.page_index,
                        listings = handles.len(),
                        "Short page, no further results"
                    );
                    break;
                }

                match self.turn_page(driver, &mut pending_page) {
                    Ok(next) => {
                        handles = next;
                        cursor = cursor.next_page();
                        debug!(page = cursor.page_index, listings = handles.len(), "Turned page");
                    }
                    Err(e) => warn!(error = %e, page = cursor.page_index, "Failed to load next results page"),
                }
                continue;
            }

            let handle = handles[cursor.within_page];
            match self.attempt(driver, handle) {
                Ok(ListingOutcome::Extracted(job)) => {
                    jobs.push(job);
                    cursor = cursor.advance();
                }
                Ok(ListingOutcome::Skipped(reason)) => {
                    debug!(?reason, "Listing skipped");
                    cursor = cursor.advance();
                }
                Err(e) => warn!(
                    error = %e,
                    page = cursor.page_index,
                    index = cursor.within_page,
                    "Failed processing job listing"
                ),
            }
        }

        info!(count = jobs.len(), processed = cursor.total_processed, "Extracted jobs in total");
        Ok(jobs)
    }

    fn attempt(
        &self,
        driver: &mut dyn PageDriver,
        handle: ListingHandle,
    ) -> Result<ListingOutcome, ExtractionError> {
        driver.activate(handle)?;
        Ok(self.extractor.extract(driver)?)
    }

    /// Navigates to the next page. A failed turn leaves its target in
    /// `pending` so the retry goes to the same page.
    fn turn_page(
        &self,
        driver: &mut dyn PageDriver,
        pending: &mut Option<String>,
    ) -> Result<Vec<ListingHandle>, ExtractionError> {
        let target = match pending.take() {
            Some(url) => url,
            None => next_page_url(
                &driver.current_url()?,
                self.portal.offset_param,
                self.portal.page_size,
            )?,
        };
        *pending = Some(target.clone());

        driver.navigate(&target)?;
        let handles = driver.find_all(&self.portal.locators.listing)?;
        *pending = None;
        Ok(handles)
    }
}
