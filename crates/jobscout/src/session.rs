//! Portal sign-in, skipped when the session is already authenticated.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::driver::{DriverError, PageDriver};
use crate::portal::Portal;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Login rejected: {reason}")]
    Rejected { reason: String },

    #[error("Login timed out: {0}")]
    Timeout(#[source] DriverError),

    #[error("Page driver failed during login: {0}")]
    Driver(#[source] DriverError),
}

impl From<DriverError> for LoginError {
    fn from(e: DriverError) -> Self {
        if e.is_timeout() {
            LoginError::Timeout(e)
        } else {
            LoginError::Driver(e)
        }
    }
}

pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// A way of signing in that leaves the driver on the portal's feed page.
pub trait Authenticator {
    fn login(&self, driver: &mut dyn PageDriver, credentials: &Credentials) -> Result<(), LoginError>;
}

/// Trailing slashes do not make two locations different.
fn same_location(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

fn on_feed(driver: &dyn PageDriver, feed_url: &str) -> Result<bool, DriverError> {
    Ok(same_location(&driver.current_url()?, feed_url))
}

/// Username/password form sign-in.
pub struct FormLogin<'a> {
    portal: &'a Portal,
}

impl<'a> FormLogin<'a> {
    pub fn new(portal: &'a Portal) -> Self {
        Self { portal }
    }

    fn submit_form(&self, driver: &mut dyn PageDriver, credentials: &Credentials) -> Result<(), DriverError> {
        let l = &self.portal.locators;
        driver.fill(&l.username_input, &credentials.username)?;
        driver.fill(&l.password_input, credentials.password.expose_secret())?;
        driver.click(&l.login_submit)?;
        driver.wait_for(&l.listing).or_else(|e| {
            // a feed without job cards still counts, checked below
            if e.is_timeout() {
                Ok(())
            } else {
                Err(e)
            }
        })
    }
}

impl Authenticator for FormLogin<'_> {
    fn login(&self, driver: &mut dyn PageDriver, credentials: &Credentials) -> Result<(), LoginError> {
        let feed = &self.portal.feed_url;
        info!(portal = %self.portal.kind, "Starting login");
        driver.navigate(&self.portal.login_url)?;

        if on_feed(driver, feed)? {
            info!("Session already authenticated");
            return Ok(());
        }

        debug!(username = %credentials.username, "Submitting login form");
        if let Err(e) = self.submit_form(driver, credentials) {
            if e.is_timeout() && on_feed(driver, feed)? {
                warn!(error = %e, "Login form timed out but the feed is loaded");
                return Ok(());
            }
            return Err(e.into());
        }

        if on_feed(driver, feed)? {
            info!("Login successful");
            Ok(())
        } else {
            Err(LoginError::Rejected {
                reason: format!("expected the feed after submitting, got '{}'", driver.current_url()?),
            })
        }
    }
}

/// Whether the current session already needed a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AlreadyAuthenticated,
    LoggedIn,
}

/// Checks the current location before delegating to an [`Authenticator`].
pub struct SessionGate<'a> {
    feed_url: &'a str,
}

impl<'a> SessionGate<'a> {
    pub fn new(portal: &'a Portal) -> Self {
        Self {
            feed_url: &portal.feed_url,
        }
    }

    pub fn is_authenticated(&self, driver: &dyn PageDriver) -> Result<bool, LoginError> {
        Ok(on_feed(driver, self.feed_url)?)
    }

    /// Logs in unless the driver is already on the feed. Errors from the
    /// authenticator are returned unchanged.
    pub fn ensure_session(
        &self,
        driver: &mut dyn PageDriver,
        authenticator: &dyn Authenticator,
        credentials: &Credentials,
    ) -> Result<SessionState, LoginError> {
        if self.is_authenticated(driver)? {
            debug!("Already on the feed, skipping login");
            return Ok(SessionState::AlreadyAuthenticated);
        }

        authenticator.login(driver, credentials)?;
        Ok(SessionState::LoggedIn)
    }
}
