//! Configuration module.
//!
//! Handles and configures the initial settings and variables needed to run the program. The
//! configuration is loaded from a `config.toml` file, if any, and then decorated with the command
//! line options.

use crate::{error, print_warning};
use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::Deserialize;
use std::{
    cmp::min,
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

/// Largest allowed depth of nested packages.
const MAX_NESTED_DEPTH: u32 = 64;

/// Config structure.
///
/// Contains configuration related fields. It is used for storing the configuration parameters and
/// checking their values.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Boolean to represent `--verbose` mode.
    #[serde(skip)]
    verbose: bool,
    /// Boolean to represent `--quiet` mode.
    #[serde(skip)]
    quiet: bool,
    /// Boolean to represent `--force` mode.
    #[serde(skip)]
    force: bool,
    /// Boolean to represent `--bench` mode.
    #[serde(skip)]
    bench: bool,
    /// Boolean to represent `--open` mode.
    #[serde(skip)]
    open: bool,
    /// Output folder given in the command line.
    #[serde(skip)]
    output: Option<PathBuf>,
    /// Number of threads used to read Unity containers.
    threads: u8,
    /// Maximum depth of nested packages to unpack.
    max_depth: u32,
    /// Whether to decompile the package with apktool.
    decompile: bool,
    /// Path to the apktool executable.
    apktool: PathBuf,
    /// Whether to generate the JSON report.
    json: bool,
    /// Whether to generate the HTML report.
    html: bool,
    /// Folder with a template overriding the built-in HTML report.
    template: Option<PathBuf>,
    /// File storing the history of past extractions.
    history_file: PathBuf,
    /// Number of extractions kept in the history.
    history_limit: usize,
    /// Configuration files loaded, in order.
    #[serde(skip)]
    loaded_files: Vec<PathBuf>,
}

impl Config {
    /// Creates a new `Config` struct from the given TOML file.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();
        let toml = fs::read_to_string(path)
            .with_context(|| format!("could not read `{}`", path.display()))?;

        let mut config = Self::from_toml(&toml)
            .with_context(|| format!("invalid configuration in `{}`", path.display()))?;
        config.loaded_files.push(path.to_path_buf());

        Ok(config)
    }

    /// Parses and validates a TOML configuration.
    fn from_toml(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).map_err(|e| error::Kind::Config {
            message: e.to_string(),
        })?;

        if config.threads == 0 {
            return Err(error::Kind::Config {
                message: "`threads` must be an integer between 1 and 255".to_owned(),
            }
            .into());
        }
        if config.max_depth > MAX_NESTED_DEPTH {
            return Err(error::Kind::Config {
                message: format!("`max_depth` must be at most {}", MAX_NESTED_DEPTH),
            }
            .into());
        }
        if config.history_limit == 0 {
            return Err(error::Kind::Config {
                message: "`history_limit` must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(config)
    }

    /// Modifies the options from the CLI.
    pub fn decorate_with_cli(&mut self, cli: &ArgMatches<'_>) -> Result<()> {
        self.verbose = cli.is_present("verbose");
        self.quiet = cli.is_present("quiet");
        self.force = cli.is_present("force");
        self.bench = cli.is_present("bench");
        self.open = cli.is_present("open");

        if let Some(output) = cli.value_of("output") {
            self.output = Some(PathBuf::from(output));
        }
        if cli.is_present("no-decompile") {
            self.decompile = false;
        }
        if let Some(apktool) = cli.value_of("apktool") {
            self.apktool = PathBuf::from(apktool);
        }
        if let Some(threads) = cli.value_of("threads") {
            self.threads = match threads.parse() {
                Ok(t) if t > 0_u8 => t,
                _ => {
                    return Err(error::Kind::Config {
                        message: format!(
                            "the threads option must be an integer between 1 and {}",
                            u8::MAX
                        ),
                    }
                    .into());
                }
            };
        }
        if let Some(depth) = cli.value_of("max-depth") {
            self.max_depth = match depth.parse() {
                Ok(d) if d <= MAX_NESTED_DEPTH => d,
                _ => {
                    return Err(error::Kind::Config {
                        message: format!(
                            "the max-depth option must be an integer between 0 and {}",
                            MAX_NESTED_DEPTH
                        ),
                    }
                    .into());
                }
            };
        }
        if cli.is_present("json") || cli.is_present("html") {
            self.json = cli.is_present("json");
            self.html = cli.is_present("html");
        }
        if let Some(template) = cli.value_of("template") {
            self.template = Some(PathBuf::from(template));
        }

        Ok(())
    }

    /// Checks that the configured paths exist.
    pub fn check(&self) -> bool {
        self.errors().is_empty()
    }

    /// Returns the configuration errors found.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(template) = &self.template {
            if !template.join("report.hbs").is_file() {
                errors.push(format!(
                    "the template folder `{}` does not contain a `report.hbs` file",
                    template.display()
                ));
            }
        }
        if let Some(parent) = self.history_file.parent() {
            if parent != Path::new("") && !parent.is_dir() {
                errors.push(format!(
                    "the folder of the history file `{}` does not exist",
                    self.history_file.display()
                ));
            }
        }
        errors
    }

    /// Returns the folder where the given package will be extracted.
    ///
    /// When several packages are extracted, the `--output` folder contains one folder per
    /// package.
    pub fn output_folder_for<P: AsRef<Path>>(&self, package: P, package_count: usize) -> PathBuf {
        let default_name = format!("extracted_{}", crate::get_package_name(package));
        match &self.output {
            Some(output) if package_count > 1 => output.join(default_name),
            Some(output) => output.clone(),
            None => PathBuf::from(default_name),
        }
    }

    /// Returns the output folder of every package of the run, in the same order.
    ///
    /// Packages with the same file stem would share a folder, so every repeated folder gets a
    /// `_<n>` suffix and a warning is printed.
    pub fn output_folders<P: AsRef<Path>>(&self, packages: &[P]) -> Vec<PathBuf> {
        let mut used = HashSet::new();
        packages
            .iter()
            .map(|package| {
                let folder = self.output_folder_for(package, packages.len());
                if used.insert(folder.clone()) {
                    return folder;
                }

                let mut n = 2;
                let unique = loop {
                    let mut name = folder.clone().into_os_string();
                    name.push(format!("_{}", n));
                    let candidate = PathBuf::from(name);
                    if used.insert(candidate.clone()) {
                        break candidate;
                    }
                    n += 1;
                };
                print_warning(format!(
                    "`{}` has the same name as another package, it will be extracted in `{}`",
                    package.as_ref().display(),
                    unique.display()
                ));
                unique
            })
            .collect()
    }

    /// Returns the loaded configuration files.
    pub fn loaded_config_files(&self) -> impl Iterator<Item = &Path> {
        self.loaded_files.iter().map(PathBuf::as_path)
    }

    /// Returns true if the application is running in `--verbose` mode, false otherwise.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Returns true if the application is running in `--quiet` mode, false otherwise.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Returns true if the application is running in `--force` mode, false otherwise.
    pub fn is_force(&self) -> bool {
        self.force
    }

    /// Returns true if the application is running in `--bench` mode, false otherwise.
    pub fn is_bench(&self) -> bool {
        self.bench
    }

    /// Returns true if the report has to be opened at the end.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the number of threads used to read Unity containers.
    pub fn threads(&self) -> u8 {
        self.threads
    }

    /// Returns the maximum depth of nested packages.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns true if the package has to be decompiled with apktool.
    pub fn has_to_decompile(&self) -> bool {
        self.decompile
    }

    /// Returns the path to the apktool executable.
    pub fn apktool(&self) -> &Path {
        &self.apktool
    }

    /// Returns true if the JSON report has to be generated.
    pub fn has_to_generate_json(&self) -> bool {
        self.json
    }

    /// Returns true if the HTML report has to be generated.
    pub fn has_to_generate_html(&self) -> bool {
        self.html
    }

    /// Returns the folder of the template overriding the built-in HTML report.
    pub fn template_path(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    /// Returns the path of the history file.
    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    /// Returns the number of extractions kept in the history.
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            force: false,
            bench: false,
            open: false,
            output: None,
            threads: min(num_cpus::get(), usize::from(u8::MAX)) as u8,
            max_depth: 8,
            decompile: true,
            apktool: PathBuf::from("apktool"),
            json: true,
            html: true,
            template: None,
            history_file: PathBuf::from("extraction_history.json"),
            history_limit: 50,
            loaded_files: Vec::new(),
        }
    }
}
