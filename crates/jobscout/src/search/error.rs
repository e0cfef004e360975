use std::fmt;

use thiserror::Error;

use crate::driver::DriverError;

/// Where in a search the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    BuildingQuery,
    Navigating,
    Extracting,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            SearchStage::BuildingQuery => "building query",
            SearchStage::Navigating => "navigating to results",
            SearchStage::Extracting => "extracting jobs",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Error)]
#[error("No result total in '{text}'")]
pub struct LimitResolutionError {
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Gave up after {attempts} attempts without reaching {limit} listings")]
    SafetyCapExceeded { attempts: usize, limit: usize },

    #[error("Could not determine how many jobs to extract: {0}")]
    LimitUnresolved(#[from] LimitResolutionError),

    #[error("Cannot compute next page from '{url}': {reason}")]
    PageAddress { url: String, reason: String },

    #[error("Page driver failed: {0}")]
    Driver(#[from] DriverError),
}

/// The original cause of a [`SearchError`].
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error(transparent)]
    Query(#[from] url::ParseError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Any failure during a search, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("Failed to perform job search while {stage}: {source}")]
pub struct SearchError {
    pub stage: SearchStage,
    #[source]
    pub source: SearchFailure,
}

impl SearchError {
    pub fn new(stage: SearchStage, source: impl Into<SearchFailure>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
