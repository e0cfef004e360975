//! Search parameters and their translation into a portal URL.

use indexmap::IndexMap;
use url::Url;

use crate::portal::{Portal, RecencyControl};

/// What to search for. Unset or blank fields are left out of the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: Option<String>,
    pub location: Option<String>,
    /// Only jobs posted within this many seconds.
    pub recency_seconds: Option<u64>,
    /// Extra query parameters, in insertion order; a repeated key keeps the
    /// last value.
    pub filters: IndexMap<String, String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn posted_within(mut self, seconds: u64) -> Self {
        self.recency_seconds = Some(seconds);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// The portal's token for the requested recency window, if any.
    pub fn recency_token(&self, portal: &Portal) -> Option<String> {
        self.recency_seconds.map(|s| portal.recency_token(s))
    }

    /// Search URL: keywords, location, portal defaults, URL-borne recency,
    /// then user filters. Later entries override earlier ones with the same key.
    pub fn build_url(&self, portal: &Portal) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&portal.search_url)?;
        let mut params: IndexMap<&str, String> = IndexMap::new();

        if let Some(keywords) = present(&self.keywords) {
            params.insert(portal.keywords_key, keywords.to_string());
        }
        if let Some(location) = present(&self.location) {
            params.insert(portal.location_key, location.to_string());
        }
        for (key, value) in &portal.default_filters {
            params.insert(key, value.clone());
        }
        if let (RecencyControl::QueryParam { key }, Some(token)) =
            (&portal.recency, self.recency_token(portal))
        {
            params.insert(key, token);
        }
        for (key, value) in &self.filters {
            params.insert(key, value.clone());
        }

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(url)
    }
}
