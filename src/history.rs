//! History of past extractions.
//!
//! The history is a JSON array stored in the configured history file, oldest entry first.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Extraction of one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Path of the package.
    pub apk: PathBuf,
    /// Output folder.
    pub output: PathBuf,
    /// Date of the extraction.
    pub date: DateTime<Local>,
    /// Whether the extraction finished.
    pub success: bool,
    /// Files in the category folders.
    pub total_files: usize,
    /// Error that stopped the extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Entry {
    /// Creates the entry of a finished extraction.
    pub fn success<A: Into<PathBuf>, O: Into<PathBuf>>(apk: A, output: O, total_files: usize) -> Self {
        Self {
            apk: apk.into(),
            output: output.into(),
            date: Local::now(),
            success: true,
            total_files,
            error: None,
        }
    }

    /// Creates the entry of a failed extraction.
    pub fn failure<A: Into<PathBuf>, O: Into<PathBuf>, S: Into<String>>(
        apk: A,
        output: O,
        error: S,
    ) -> Self {
        Self {
            apk: apk.into(),
            output: output.into(),
            date: Local::now(),
            success: false,
            total_files: 0,
            error: Some(error.into()),
        }
    }
}

/// History of extractions, limited to a number of entries.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    limit: usize,
    entries: Vec<Entry>,
}

impl History {
    /// Loads the history from the given file. A missing file is an empty history.
    pub fn load<P: Into<PathBuf>>(path: P, limit: usize) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)
                .with_context(|| format!("the history file `{}` is corrupted", path.display()))?,
            Err(ref e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("could not read the history file `{}`", path.display()))
            }
        };

        let mut history = Self {
            path,
            limit,
            entries,
        };
        history.trim();
        Ok(history)
    }

    /// Path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries of the history, oldest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Adds an entry, dropping the oldest ones above the limit.
    pub fn record(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.trim();
    }

    fn trim(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            let _ = self.entries.drain(..excess);
        }
    }

    /// Writes the history file.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("could not write the history file `{}`", self.path.display()))
    }
}
