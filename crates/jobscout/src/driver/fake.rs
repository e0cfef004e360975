//! Scripted in-memory driver for unit tests.

use std::collections::{HashMap, HashSet};

use super::{DriverError, ListingHandle, Locator, PageDriver};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeListing {
    texts: HashMap<String, String>,
    attrs: HashMap<(String, String), String>,
    present: HashSet<String>,
    /// Number of `activate` calls that fail before one succeeds.
    activate_failures: usize,
}

impl FakeListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, locator: &Locator, value: &str) -> Self {
        self.texts.insert(locator.to_string(), value.to_string());
        self
    }

    pub fn attr(mut self, locator: &Locator, name: &str, value: &str) -> Self {
        self.attrs
            .insert((locator.to_string(), name.to_string()), value.to_string());
        self
    }

    pub fn present(mut self, locator: &Locator) -> Self {
        self.present.insert(locator.to_string());
        self
    }

    pub fn failing_activations(mut self, count: usize) -> Self {
        self.activate_failures = count;
        self
    }

    fn has(&self, locator: &Locator) -> bool {
        let key = locator.as_str();
        self.present.contains(key)
            || self.texts.contains_key(key)
            || self.attrs.keys().any(|(l, _)| l == key)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    listing_locator: Option<String>,
    listings: Vec<FakeListing>,
    /// Page-level elements, visible whatever listing is focused.
    chrome: FakeListing,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listings(mut self, locator: &Locator, listings: Vec<FakeListing>) -> Self {
        self.listing_locator = Some(locator.to_string());
        self.listings = listings;
        self
    }

    pub fn text(mut self, locator: &Locator, value: &str) -> Self {
        self.chrome = self.chrome.text(locator, value);
        self
    }

    pub fn present(mut self, locator: &Locator) -> Self {
        self.chrome = self.chrome.present(locator);
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeDriver {
    pages: HashMap<String, FakePage>,
    redirects: HashMap<String, String>,
    click_targets: HashMap<String, String>,
    failing_urls: HashSet<String>,
    current: Option<String>,
    focus: Option<usize>,
    pub visits: Vec<String>,
    pub clicks: Vec<String>,
    pub fills: Vec<(String, String)>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Navigating to `from` lands on `to`.
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Clicking `locator` navigates to `url`.
    pub fn click_leads_to(mut self, locator: &Locator, url: &str) -> Self {
        self.click_targets.insert(locator.to_string(), url.to_string());
        self
    }

    pub fn failing_url(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// Starts the driver on `url` without recording a visit.
    pub fn starting_at(mut self, url: &str) -> Self {
        self.current = Some(url.to_string());
        self
    }

    fn current_page(&self) -> Result<&FakePage, DriverError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .ok_or(DriverError::NoPage)
    }

    fn focused_listing(&self) -> Result<Option<&FakeListing>, DriverError> {
        let page = self.current_page()?;
        Ok(self.focus.and_then(|i| page.listings.get(i)))
    }
}

impl PageDriver for FakeDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.visits.push(url.to_string());
        if self.failing_urls.contains(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        let landed = self.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        if !self.pages.contains_key(&landed) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            });
        }
        self.current = Some(landed);
        self.focus = None;
        Ok(())
    }

    fn current_url(&self) -> Result<String, DriverError> {
        Ok(self
            .current
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    fn text_of(&self, locator: &Locator) -> Result<Option<String>, DriverError> {
        let page = self.current_page()?;
        let key = locator.as_str();
        if let Some(text) = self.focused_listing()?.and_then(|l| l.texts.get(key)) {
            return Ok(Some(text.clone()));
        }
        Ok(page.chrome.texts.get(key).cloned())
    }

    fn attribute_of(&self, locator: &Locator, name: &str) -> Result<Option<String>, DriverError> {
        let page = self.current_page()?;
        let key = (locator.to_string(), name.to_string());
        if let Some(value) = self.focused_listing()?.and_then(|l| l.attrs.get(&key)) {
            return Ok(Some(value.clone()));
        }
        Ok(page.chrome.attrs.get(&key).cloned())
    }

    fn wait_for(&self, locator: &Locator) -> Result<(), DriverError> {
        let page = self.current_page()?;
        let in_listing = self.focused_listing()?.is_some_and(|l| l.has(locator));
        if in_listing || page.chrome.has(locator) {
            Ok(())
        } else {
            Err(DriverError::Timeout {
                locator: locator.clone(),
            })
        }
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ListingHandle>, DriverError> {
        let page = self.current_page()?;
        let count = match &page.listing_locator {
            Some(l) if l == locator.as_str() => page.listings.len(),
            _ => 0,
        };
        self.focus = None;
        Ok((0..count).map(ListingHandle::new).collect())
    }

    fn activate(&mut self, handle: ListingHandle) -> Result<(), DriverError> {
        let url = self.current.clone().ok_or(DriverError::NoPage)?;
        let listing = self
            .pages
            .get_mut(&url)
            .and_then(|p| p.listings.get_mut(handle.id()))
            .ok_or(DriverError::StaleHandle(handle))?;

        if listing.activate_failures > 0 {
            listing.activate_failures -= 1;
            return Err(DriverError::Unsupported("listing detached".to_string()));
        }
        self.focus = Some(handle.id());
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.wait_for(locator)?;
        self.clicks.push(locator.to_string());
        match self.click_targets.get(locator.as_str()).cloned() {
            Some(target) => self.navigate(&target),
            None => Ok(()),
        }
    }

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError> {
        self.wait_for(locator)?;
        self.fills.push((locator.to_string(), value.to_string()));
        Ok(())
    }
}
