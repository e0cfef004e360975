//! Job discovery: query building, pagination, and per-listing extraction.

pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod paginator;
pub mod query;

pub use error::{ExtractionError, LimitResolutionError, SearchError, SearchFailure, SearchStage};
pub use extractor::{ListingOutcome, RecordExtractor, SkipReason};
pub use orchestrator::JobSearch;
pub use paginator::{Cursor, Paginator};
pub use query::SearchQuery;
