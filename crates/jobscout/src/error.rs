use std::path::PathBuf;
use thiserror::Error;

use crate::driver::DriverError;
use crate::matcher::MatchingError;
use crate::search::SearchError;
use crate::secrets::SecretError;
use crate::session::LoginError;

#[derive(Error, Debug)]
pub enum JobscoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Login error: {0}")]
    Login(#[from] LoginError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Matching error: {0}")]
    Matching(#[from] MatchingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Browser error: {0}")]
    Driver(#[from] DriverError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid matching method '{0}' (expected 'fuzz' or 'llm')")]
    UnknownMatchingMethod(String),

    #[error("Matching threshold {0} is outside 0-100")]
    InvalidThreshold(i64),

    #[error("The 'llm' matching method requires a text generator")]
    MissingTextGenerator,

    #[error("Failed to resolve {name}: {source}")]
    Secret {
        name: &'static str,
        #[source]
        source: SecretError,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("File already exists: {0}")]
    FileExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, JobscoutError>;
