//! JSON report generation module.

use crate::{
    config::Config,
    results::{report::Generator, Results},
};
use anyhow::{Context, Result};
use log::debug;
use serde_json::ser;
use std::{
    fs::File,
    io::{BufWriter, Write},
};

/// Name of the JSON report file.
pub const JSON_REPORT: &str = "extraction_report.json";

/// JSON report generator.
pub struct Json;

impl Json {
    /// Creates a new JSON report generator.
    pub fn new() -> Self {
        Self
    }
}

impl Generator for Json {
    fn generate(&mut self, _config: &Config, results: &Results) -> Result<()> {
        let path = results.output_directory().join(JSON_REPORT);
        debug!("starting JSON report generation at `{}`", path.display());
        let mut f = BufWriter::new(
            File::create(&path).with_context(|| format!("could not create `{}`", path.display()))?,
        );
        ser::to_writer_pretty(&mut f, results)?;
        f.flush()
            .with_context(|| format!("could not write `{}`", path.display()))?;

        Ok(())
    }
}
