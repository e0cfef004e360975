//! Shared test utilities for jobscout integration tests.
//!
//! - `StaticSite` is an in-memory transport for the real `HtmlDriver`
//! - builders render portal pages, detail pages and configs

pub mod builders;
pub mod site;

pub use builders::*;
pub use site::StaticSite;
