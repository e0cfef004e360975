//! Per-portal constants: where to go, which query keys to use, and how to
//! find things on the page.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::driver::Locator;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalKind {
    LinkedIn,
    Indeed,
}

impl fmt::Display for PortalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalKind::LinkedIn => write!(f, "linkedin"),
            PortalKind::Indeed => write!(f, "indeed"),
        }
    }
}

impl FromStr for PortalKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(PortalKind::LinkedIn),
            "indeed" => Ok(PortalKind::Indeed),
            other => Err(ConfigError::Validation {
                message: format!("unknown portal '{other}' (expected 'linkedin' or 'indeed')"),
            }),
        }
    }
}

/// Selectors for one portal's result, detail and login pages.
#[derive(Debug, Clone)]
pub struct Locators {
    pub listing: Locator,
    pub title: Locator,
    pub company: Locator,
    pub location: Locator,
    /// Element whose `href` is the listing's URL.
    pub link: Locator,
    pub description: Locator,
    pub easy_apply: Locator,
    pub apply: Locator,
    /// Text starting with the total number of results, e.g. "1,234 results".
    pub result_count: Locator,
    pub username_input: Locator,
    pub password_input: Locator,
    pub login_submit: Locator,
}

/// How a recency window reaches the portal.
#[derive(Debug, Clone)]
pub enum RecencyControl {
    /// Picked through on-page controls once the results are shown.
    /// `option_prefix` plus the portal token gives the option's locator.
    Interactive {
        open: Locator,
        option_prefix: String,
        confirm: Locator,
    },
    /// Sent as a query parameter holding the window in whole days.
    QueryParam { key: &'static str },
}

#[derive(Debug, Clone)]
pub struct Portal {
    pub kind: PortalKind,
    pub login_url: String,
    /// Where an authenticated session lands.
    pub feed_url: String,
    pub search_url: String,
    pub keywords_key: &'static str,
    pub location_key: &'static str,
    /// Query parameter carrying the result offset.
    pub offset_param: &'static str,
    /// Listings on a full results page; also the offset step.
    pub page_size: usize,
    /// Sent before any user filter, which may override them.
    pub default_filters: Vec<(String, String)>,
    pub recency: RecencyControl,
    pub locators: Locators,
}

const SECONDS_PER_DAY: u64 = 86_400;

impl Portal {
    pub fn for_kind(kind: PortalKind) -> Self {
        match kind {
            PortalKind::LinkedIn => Self::linkedin(),
            PortalKind::Indeed => Self::indeed(),
        }
    }

    pub fn linkedin() -> Self {
        Self {
            kind: PortalKind::LinkedIn,
            login_url: "https://www.linkedin.com/login".to_string(),
            feed_url: "https://www.linkedin.com/feed/".to_string(),
            search_url: "https://www.linkedin.com/jobs/search/".to_string(),
            keywords_key: "keywords",
            location_key: "location",
            offset_param: "start",
            page_size: 25,
            default_filters: Vec::new(),
            recency: RecencyControl::Interactive {
                open: Locator::from("button[aria-label*='Date posted']"),
                option_prefix: "label[for='timePostedRange-".to_string(),
                confirm: Locator::from("button[aria-label*='Apply current filter']"),
            },
            locators: Locators {
                listing: Locator::from("li.occludable-update"),
                title: Locator::from("a.job-card-list__title"),
                company: Locator::from("div[class*='company-name']"),
                location: Locator::from("div[class*='primary-description']"),
                link: Locator::from("a.job-card-list__title"),
                description: Locator::from("div#job-details"),
                easy_apply: Locator::from("button.jobs-apply-button[aria-label*='Easy Apply']"),
                apply: Locator::from("button.jobs-apply-button"),
                result_count: Locator::from("div.jobs-search-results-list__subtitle span"),
                username_input: Locator::from("input#username"),
                password_input: Locator::from("input#password"),
                login_submit: Locator::from("button[data-litms-control-urn='login-submit']"),
            },
        }
    }

    pub fn indeed() -> Self {
        Self {
            kind: PortalKind::Indeed,
            login_url: "https://secure.indeed.com/auth".to_string(),
            feed_url: "https://www.indeed.com/".to_string(),
            search_url: "https://www.indeed.com/jobs".to_string(),
            keywords_key: "q",
            location_key: "l",
            offset_param: "start",
            page_size: 10,
            default_filters: vec![("sort".to_string(), "date".to_string())],
            recency: RecencyControl::QueryParam { key: "fromage" },
            locators: Locators {
                listing: Locator::from("div#mosaic-provider-jobcards ul > li"),
                title: Locator::from("h2.jobTitle"),
                company: Locator::from("[data-testid='company-name']"),
                location: Locator::from("[data-testid='text-location']"),
                link: Locator::from("h2.jobTitle a"),
                description: Locator::from("div.jobsearch-JobComponent-description"),
                easy_apply: Locator::from("span[data-testid='indeedApply']"),
                apply: Locator::from("button[aria-label*='Apply now']"),
                result_count: Locator::from("div.jobsearch-JobCountAndSortPane-jobCount"),
                username_input: Locator::from("input#login-email-input"),
                password_input: Locator::from("input#login-password-input"),
                login_submit: Locator::from("button#login-submit-button"),
            },
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The portal's own spelling of a recency window of `seconds`.
    ///
    /// LinkedIn takes `r<seconds>`; Indeed takes whole days, rounded up,
    /// never less than one.
    pub fn recency_token(&self, seconds: u64) -> String {
        match self.recency {
            RecencyControl::Interactive { .. } => format!("r{seconds}"),
            RecencyControl::QueryParam { .. } => {
                seconds.div_ceil(SECONDS_PER_DAY).max(1).to_string()
            }
        }
    }
}
