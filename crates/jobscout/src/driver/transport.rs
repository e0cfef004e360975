//! How [`HtmlDriver`](super::HtmlDriver) gets its pages.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::debug;
use url::Url;

use super::DriverError;
use crate::sanitize::redact_url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A page as received, after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

pub trait Transport {
    fn get(&self, url: &Url) -> Result<FetchedPage, DriverError>;

    /// Sends `fields` as an `application/x-www-form-urlencoded` body.
    fn post_form(&self, url: &Url, fields: &[(String, String)]) -> Result<FetchedPage, DriverError>;
}

/// Blocking HTTP with a cookie store, so a login carries over to later pages.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, DriverError> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| DriverError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    fn read(url: &Url, sent: reqwest::Result<Response>) -> Result<FetchedPage, DriverError> {
        let shown = redact_url(url.as_str());
        let failed = |reason: String| DriverError::Navigation {
            url: shown.clone(),
            reason,
        };

        let response = sent.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {status}")));
        }

        let final_url = response.url().clone();
        let body = response.text().map_err(|e| failed(e.to_string()))?;
        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<FetchedPage, DriverError> {
        debug!(url = %redact_url(url.as_str()), "GET");
        Self::read(url, self.client.get(url.clone()).send())
    }

    fn post_form(&self, url: &Url, fields: &[(String, String)]) -> Result<FetchedPage, DriverError> {
        debug!(url = %redact_url(url.as_str()), fields = fields.len(), "POST form");
        Self::read(url, self.client.post(url.clone()).form(fields).send())
    }
}
