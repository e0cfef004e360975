pub mod config;
pub mod driver;
pub mod error;
pub mod job;
pub mod llm;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod portal;
pub mod sanitize;
pub mod search;
pub mod secrets;
pub mod session;
pub mod storage;

pub use config::{load_config, Config};
pub use driver::{DriverError, HtmlDriver, ListingHandle, Locator, PageDriver};
pub use error::{ConfigError, JobscoutError, Result, StorageError};
pub use job::{ApplicationStatus, Job, JobCandidate};
pub use matcher::{DescriptionMatcher, MatchMethod, MatchingError};
pub use pipeline::{Pipeline, PipelineConfig, RunReport};
pub use portal::{Portal, PortalKind};
pub use search::{JobSearch, SearchError, SearchQuery};
pub use secrets::{SecretError, SecretSource};
pub use session::{Authenticator, Credentials, FormLogin, LoginError, SessionGate, SessionState};
pub use storage::ResultWriter;
