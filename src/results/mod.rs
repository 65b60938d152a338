//! Extraction results and report generation.

mod handlebars_helpers;
mod report;
mod utils;

pub use self::report::{Generator, HandlebarsReport, Json, HTML_REPORT, JSON_REPORT};
pub use self::utils::{folder_tree, html_escape, FingerPrint, TreeLine};

use crate::{
    category::Category,
    decompression::{NestedPackage, UnpackStats},
    print_warning,
    resources::CategoryCounts,
    unity::ContainerSummary,
    Config,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::crate_version;
use log::debug;
use serde::{
    ser::{SerializeStruct, Serializer},
    Serialize,
};
use std::{
    path::{Path, PathBuf},
    result::Result as StdResult,
};

/// Outcome of the apktool decompilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decompilation {
    /// Disabled in the configuration.
    Disabled,
    /// apktool is not installed.
    NotInstalled,
    /// The package was decompiled.
    Done,
    /// apktool failed.
    Failed(String),
}

/// Results of the extraction of one package.
pub struct Results {
    apk_name: String,
    extraction_date: DateTime<Local>,
    output_directory: PathBuf,
    fingerprint: FingerPrint,
    unpack: UnpackStats,
    nested_packages: Vec<NestedPackage>,
    collected: CategoryCounts,
    summary: CategoryCounts,
    unity_containers: Vec<ContainerSummary>,
    decompiled: Decompilation,
}

impl Results {
    /// Initializes the results of the given package, fingerprinting it.
    pub fn init<P: AsRef<Path>, O: Into<PathBuf>>(package: P, output_directory: O) -> Result<Self> {
        let package = package.as_ref();
        let fingerprint = FingerPrint::new(package).with_context(|| {
            format!(
                "an error occurred when trying to fingerprint `{}`",
                package.display()
            )
        })?;
        debug!("the results struct has been created");

        Ok(Self {
            apk_name: package
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extraction_date: Local::now(),
            output_directory: output_directory.into(),
            fingerprint,
            unpack: UnpackStats::default(),
            nested_packages: Vec::new(),
            collected: CategoryCounts::new(),
            summary: CategoryCounts::new(),
            unity_containers: Vec::new(),
            decompiled: Decompilation::Disabled,
        })
    }

    /// Gets the file name of the package.
    pub fn apk_name(&self) -> &str {
        &self.apk_name
    }

    /// Gets the output folder of the extraction.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn set_unpack(&mut self, unpack: UnpackStats) {
        self.unpack = unpack;
    }

    pub fn unpack(&self) -> UnpackStats {
        self.unpack
    }

    pub fn set_nested_packages(&mut self, nested_packages: Vec<NestedPackage>) {
        self.nested_packages = nested_packages;
    }

    pub fn nested_packages(&self) -> &[NestedPackage] {
        &self.nested_packages
    }

    pub fn set_collected(&mut self, collected: CategoryCounts) {
        self.collected = collected;
    }

    pub fn set_summary(&mut self, summary: CategoryCounts) {
        self.summary = summary;
    }

    /// Gets the number of files per category folder.
    pub fn summary(&self) -> &CategoryCounts {
        &self.summary
    }

    /// Gets the total number of files in the category folders.
    pub fn total_files(&self) -> usize {
        self.summary.values().sum()
    }

    /// Gets the number of files in the folder of the given category.
    pub fn category_count(&self, category: Category) -> usize {
        self.summary.get(&category).copied().unwrap_or(0)
    }

    pub fn set_unity_containers(&mut self, unity_containers: Vec<ContainerSummary>) {
        self.unity_containers = unity_containers;
    }

    pub fn unity_containers(&self) -> &[ContainerSummary] {
        &self.unity_containers
    }

    pub fn set_decompiled(&mut self, decompiled: Decompilation) {
        self.decompiled = decompiled;
    }

    pub fn decompiled(&self) -> &Decompilation {
        &self.decompiled
    }

    /// Generates the configured reports in the output folder.
    ///
    /// Returns the path of the generated reports. A failing report is logged and the rest are
    /// still generated.
    pub fn generate_report(&self, config: &Config) -> Vec<PathBuf> {
        let mut reports = Vec::new();

        if config.has_to_generate_json() {
            let mut json_reporter = Json::new();
            match json_reporter.generate(config, self) {
                Ok(()) => reports.push(self.output_directory.join(JSON_REPORT)),
                Err(e) => print_warning(format!(
                    "there was an error generating the JSON report: {:#}",
                    e
                )),
            }
        }

        if config.has_to_generate_html() {
            let generated =
                HandlebarsReport::for_config(config).and_then(|mut r| r.generate(config, self));
            match generated {
                Ok(()) => reports.push(self.output_directory.join(HTML_REPORT)),
                Err(e) => print_warning(format!(
                    "there was an error generating the HTML report: {:#}",
                    e
                )),
            }
        }

        reports
    }
}

impl Serialize for Results {
    fn serialize<S>(&self, serializer: S) -> StdResult<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser_struct = serializer.serialize_struct("Results", 12)?;

        ser_struct.serialize_field("apk_name", &self.apk_name)?;
        ser_struct.serialize_field("extraction_date", &self.extraction_date.to_rfc3339())?;
        ser_struct.serialize_field("output_directory", &self.output_directory)?;
        ser_struct.serialize_field("summary", &self.summary)?;
        ser_struct.serialize_field("total_files", &self.total_files())?;
        ser_struct.serialize_field("tool_version", crate_version!())?;
        ser_struct.serialize_field("fingerprint", &self.fingerprint)?;
        ser_struct.serialize_field("unpack", &self.unpack)?;
        ser_struct.serialize_field("collected", &self.collected)?;
        ser_struct.serialize_field("nested_packages", &self.nested_packages)?;
        ser_struct.serialize_field("unity_containers", &self.unity_containers)?;
        ser_struct.serialize_field("decompiled", &self.decompiled)?;

        ser_struct.end()
    }
}

#[cfg(test)]
mod tests;
