use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::error::StorageError;
use crate::job::Job;

const MAX_VARIANTS: usize = 1000;

/// Writes one dated JSON array of jobs per run.
///
/// A prefix of `data/jobs` produces `data/jobs_2024-05-01.json`; later runs
/// on the same day get `data/jobs_2024-05-01_2.json` and so on. Existing
/// files are never overwritten.
pub struct ResultWriter {
    directory: PathBuf,
    stem: String,
}

impl ResultWriter {
    pub fn new<P: AsRef<Path>>(prefix: P) -> Self {
        let prefix = prefix.as_ref();
        let directory = prefix
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = prefix
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("jobs")
            .to_string();

        Self { directory, stem }
    }

    pub fn write_today(&self, jobs: &[Job]) -> Result<PathBuf, StorageError> {
        self.write(jobs, Local::now().date_naive())
    }

    pub fn write(&self, jobs: &[Job], date: NaiveDate) -> Result<PathBuf, StorageError> {
        let content = serde_json::to_vec_pretty(jobs)?;
        self.ensure_directory()?;

        let base = format!("{}_{}", self.stem, date.format("%Y-%m-%d"));
        let path = self.create_exclusive(&base, &content)?;
        info!(path = %path.display(), count = jobs.len(), "Saved results");
        Ok(path)
    }

    fn ensure_directory(&self) -> Result<(), StorageError> {
        if self.directory.as_os_str().is_empty() || self.directory.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.directory).map_err(|e| StorageError::CreateDirectory {
            path: self.directory.clone(),
            source: e,
        })
    }

    /// Creates `<base>.json`, or the first free `<base>_<n>.json`, with
    /// `create_new` so a concurrent run cannot clobber it.
    fn create_exclusive(&self, base: &str, content: &[u8]) -> Result<PathBuf, StorageError> {
        for counter in 1..=MAX_VARIANTS {
            let filename = if counter == 1 {
                format!("{base}.json")
            } else {
                format!("{base}_{counter}.json")
            };
            let path = self.directory.join(filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .map_err(|e| StorageError::WriteFile {
                            path: path.clone(),
                            source: e,
                        })?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StorageError::WriteFile { path, source: e }),
            }
        }

        Err(StorageError::FileExists(
            self.directory.join(format!("{base}.json")),
        ))
    }
}
