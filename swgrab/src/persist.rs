//! Appending result records to local storage.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::PersistError;
use crate::record::ResultRecord;

/// Default location of the output file.
pub const DEFAULT_OUTPUT_PATH: &str = "db/output_data.txt";

/// Stores a final record.
pub trait Persister {
    fn persist(&mut self, record: &ResultRecord) -> Result<(), PersistError>;
}

/// Appends each record as one JSON line.
#[derive(Debug, Clone)]
pub struct JsonLinesFile {
    path: PathBuf,
}

impl JsonLinesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persister for JsonLinesFile {
    fn persist(&mut self, record: &ResultRecord) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        debug!("Appended {} bytes to {}", line.len(), self.path.display());
        Ok(())
    }
}
