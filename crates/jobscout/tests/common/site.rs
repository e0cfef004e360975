//! An in-memory website behind the real `HtmlDriver`.
//!
//! Only the transport is replaced: pages are parsed, clicked and submitted
//! exactly as fetched pages would be.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use url::Url;

use jobscout::driver::{DriverError, FetchedPage, HtmlDriver, Transport};
use jobscout::portal::Portal;

fn normalize(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };
    parsed.set_fragment(None);
    parsed.to_string()
}

/// One request as the site received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub form: Vec<(String, String)>,
}

#[derive(Default)]
pub struct StaticSite {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    requests: RefCell<Vec<Request>>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), html.into());
        self
    }

    /// Requests to `from` land on `to`, as after a 302.
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(normalize(from), normalize(to));
        self
    }

    /// A driver over this site that opens listings through the portal's
    /// title link.
    pub fn driver(self, portal: &Portal) -> HtmlDriver<StaticSite> {
        HtmlDriver::with_transport(self).with_detail_link(portal.locators.link.clone())
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    /// Every URL requested, in order, including failed ones.
    pub fn visits(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }

    pub fn visited(&self, url: &str) -> bool {
        let url = normalize(url);
        self.requests.borrow().iter().any(|r| r.url == url)
    }

    fn respond(
        &self,
        method: &'static str,
        url: &Url,
        form: &[(String, String)],
    ) -> Result<FetchedPage, DriverError> {
        let requested = normalize(url.as_str());
        self.requests.borrow_mut().push(Request {
            method,
            url: requested.clone(),
            form: form.to_vec(),
        });

        let target = self.redirects.get(&requested).cloned().unwrap_or(requested);
        let body = self.pages.get(&target).cloned().ok_or_else(|| DriverError::Navigation {
            url: target.clone(),
            reason: "HTTP 404 Not Found".to_string(),
        })?;
        let url = Url::parse(&target).map_err(|e| DriverError::Navigation {
            url: target.clone(),
            reason: e.to_string(),
        })?;
        Ok(FetchedPage { url, body })
    }
}

impl Transport for StaticSite {
    fn get(&self, url: &Url) -> Result<FetchedPage, DriverError> {
        self.respond("GET", url, &[])
    }

    fn post_form(&self, url: &Url, fields: &[(String, String)]) -> Result<FetchedPage, DriverError> {
        self.respond("POST", url, fields)
    }
}
