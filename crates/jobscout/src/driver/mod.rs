//! Page-automation contract used by the search and login components.
//!
//! Every call is blocking from the caller's point of view. Waiting and
//! timeouts are the driver's business; callers only see `DriverError::Timeout`.

pub mod html;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;

use thiserror::Error;

pub use html::HtmlDriver;
pub use transport::{FetchedPage, HttpTransport, Transport};

/// A CSS selector identifying elements on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}

/// Opaque reference to one element returned by [`PageDriver::find_all`].
///
/// Handles are only meaningful to the driver that produced them and only
/// until the next navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListingHandle(usize);

impl ListingHandle {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn id(self) -> usize {
        self.0
    }
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out waiting for '{locator}'")]
    Timeout { locator: Locator },

    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: Locator, reason: String },

    #[error("Unsupported interaction: {0}")]
    Unsupported(String),

    #[error("Unknown listing handle {0:?}")]
    StaleHandle(ListingHandle),

    #[error("No page loaded")]
    NoPage,

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl DriverError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

/// The browsing session the pipeline drives.
pub trait PageDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    fn current_url(&self) -> Result<String, DriverError>;

    /// Text of the first element matching `locator`, `None` when absent.
    fn text_of(&self, locator: &Locator) -> Result<Option<String>, DriverError>;

    fn attribute_of(&self, locator: &Locator, name: &str) -> Result<Option<String>, DriverError>;

    /// Blocks until `locator` is present; fails with `DriverError::Timeout`.
    fn wait_for(&self, locator: &Locator) -> Result<(), DriverError>;

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ListingHandle>, DriverError>;

    /// Brings a listing into focus so its details can be read.
    fn activate(&mut self, handle: ListingHandle) -> Result<(), DriverError>;

    fn click(&mut self, locator: &Locator) -> Result<(), DriverError>;

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError>;
}
