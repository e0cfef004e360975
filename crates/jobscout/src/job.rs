//! Job records discovered on a portal.
//!
//! A [`Job`] can only be built from a [`JobCandidate`] whose required fields
//! are all present, so every `Job` in the pipeline has a title, company,
//! location, and URL.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Application state of a job, set by whoever acts on the qualified jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    #[serde(rename = "Not Applied")]
    NotApplied,
    Failed,
}

/// Unvalidated fields read from one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCandidate {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub easy_apply: bool,
}

impl JobCandidate {
    /// Names of the required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("url", &self.url),
        ]
        .into_iter()
        .filter(|(_, value)| !is_present(value))
        .map(|(name, _)| name)
        .collect()
    }

    /// The fields exactly as they were read, for `Job::raw_data`.
    fn raw_data(&self) -> Map<String, Value> {
        let mut raw = Map::new();
        for (name, value) in [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("url", &self.url),
            ("description", &self.description),
        ] {
            let value = value.clone().map(Value::String).unwrap_or(Value::Null);
            raw.insert(name.to_string(), value);
        }
        raw.insert("easy_apply".to_string(), Value::Bool(self.easy_apply));
        raw
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn required(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

#[derive(Error, Debug)]
#[error("Missing required job fields: {}", missing.join(", "))]
pub struct InvalidJob {
    pub missing: Vec<&'static str>,
    pub candidate: JobCandidate,
}

/// A validated job listing. Fields are fixed once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    title: String,
    company: String,
    location: String,
    url: String,
    easy_apply: bool,
    /// Some listings only render a description once opened.
    description: Option<String>,
    recency_filter: Option<String>,
    application_status: Option<ApplicationStatus>,
    raw_data: Option<Map<String, Value>>,
}

impl TryFrom<JobCandidate> for Job {
    type Error = InvalidJob;

    fn try_from(candidate: JobCandidate) -> Result<Self, Self::Error> {
        let missing = candidate.missing_fields();
        if !missing.is_empty() {
            return Err(InvalidJob { missing, candidate });
        }

        let raw_data = candidate.raw_data();
        let description = candidate
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            title: required(candidate.title),
            company: required(candidate.company),
            location: required(candidate.location),
            url: required(candidate.url),
            easy_apply: candidate.easy_apply,
            description,
            recency_filter: None,
            application_status: None,
            raw_data: Some(raw_data),
        })
    }
}

impl Job {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn easy_apply(&self) -> bool {
        self.easy_apply
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn recency_filter(&self) -> Option<&str> {
        self.recency_filter.as_deref()
    }

    pub fn application_status(&self) -> Option<ApplicationStatus> {
        self.application_status
    }

    pub fn raw_data(&self) -> Option<&Map<String, Value>> {
        self.raw_data.as_ref()
    }

    /// Records the recency window token the job was found under.
    pub fn with_recency_filter(mut self, token: Option<String>) -> Self {
        self.recency_filter = token;
        self
    }

    pub fn with_application_status(mut self, status: ApplicationStatus) -> Self {
        self.application_status = Some(status);
        self
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job: {} at {} ({})",
            self.title, self.company, self.location
        )
    }
}
