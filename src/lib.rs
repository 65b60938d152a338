//! APK Extractor
//!
//! Unpacks Android packages, including the packages nested inside them, and sorts their
//! resources into category folders: textures, models, audio, icons and Unity asset containers,
//! whose objects are listed and partially exported. Every extraction ends with JSON and HTML
//! reports.

#![forbid(anonymous_parameters, unused_import_braces,
    while_true
)]
#![deny(unused_extern_crates)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_results,
    trivial_casts
)]

pub mod category;
pub mod cli;
pub mod config;
pub mod decompression;
mod error;
pub mod history;
pub mod layout;
pub mod resources;
pub mod results;
#[cfg(test)]
mod test_utils;
pub mod unity;
mod utils;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use env_logger::Builder;
use log::{info, Level, LevelFilter};
use std::{
    collections::BTreeMap,
    env, fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

pub use crate::{
    config::Config,
    error::Kind as ErrorKind,
    layout::OutputLayout,
    results::{Decompilation, Results},
    utils::{format_duration, get_package_name, print_error, print_warning},
};

/// Initialize the config with the config files and command line options.
///
/// On UNIX, if the local file (`config.toml`) does not exist, but the global one does
/// (`/etc/apk-extractor/config.toml`), the latter is used. Otherwise, the local file is used.
/// Finally, if none of the files could be loaded, the default config is used.
pub fn initialize_config(cli: &ArgMatches<'static>) -> Result<Config> {
    let config_path = PathBuf::from("config.toml");
    let global_config_path = PathBuf::from("/etc/apk-extractor/config.toml");

    let mut config =
        if cfg!(target_family = "unix") && !config_path.exists() && global_config_path.exists() {
            Config::from_file(&global_config_path).context(
                "there was an error when reading the /etc/apk-extractor/config.toml file",
            )?
        } else if config_path.exists() {
            Config::from_file(&config_path)
                .context("there was an error when reading the config.toml file")?
        } else {
            print_warning("config file not found. Using default configuration");
            Config::default()
        };

    config
        .decorate_with_cli(cli)
        .context("there was an error reading config from CLI")?;

    Ok(config)
}

/// Initializes the logger.
///
/// The `RUST_LOG` environment variable overrides the verbosity given by the flags.
pub fn initialize_logger(is_verbose: bool, is_quiet: bool) {
    let mut builder = Builder::new();
    let _ = builder.format(|buf, record| {
        let message = match record.level() {
            Level::Warn => format!(
                "{}{}",
                "Warning: ".bold().yellow(),
                record.args().to_string().yellow()
            ),
            Level::Error => format!(
                "{}{}",
                "Error: ".bold().red(),
                record.args().to_string().red()
            ),
            Level::Debug => format!("{}{}", "Debug: ".bold(), record.args().to_string().bold()),
            Level::Info => format!("{}", record.args()),
            _ => format!("{}: {}", record.level(), record.args()),
        };
        writeln!(buf, "{}", message)
    });

    if let Ok(env_log) = env::var("RUST_LOG") {
        let _ = builder.parse_filters(&env_log);
    } else {
        let log_level = if is_verbose {
            LevelFilter::Debug
        } else if is_quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        };
        let _ = builder
            .filter(Some("apk_extractor"), log_level)
            .filter(Some("apk_extractor_core"), log_level);
    }

    if let Err(e) = builder.try_init() {
        eprintln!("could not initialize logger: {}", e);
    }
}

/// Extracts the given package into the `output` folder with the given config.
///
/// The package is fingerprinted before the output folder is touched, so a missing or unreadable
/// package never removes a previous extraction.
pub fn extract_package<P: AsRef<Path>, O: AsRef<Path>>(
    package: P,
    config: &Config,
    output: O,
    benchmarks: &mut BTreeMap<String, Vec<Benchmark>>,
) -> Result<Results> {
    let package = package.as_ref();
    let package_name = get_package_name(package);
    let layout = OutputLayout::new(output.as_ref());
    let mut timings = Vec::new();

    info!(
        "Starting extraction of {} into {}.",
        package_name.italic(),
        layout.root().display()
    );
    let start_time = Instant::now();

    let mut results = Results::init(package, layout.root())?;
    if config.is_force() {
        layout.remove()?;
    }
    layout
        .create()
        .context("the output folder could not be created")?;

    // Package decompression
    let stage_start = Instant::now();
    let unpack = decompression::decompress(package, layout.temp())
        .context("package decompression failed")?;
    if unpack.skipped > 0 {
        print_warning(format!(
            "{} entries of the package could not be extracted",
            unpack.skipped
        ));
    }
    info!("{} files unpacked.", unpack.extracted);
    results.set_unpack(unpack);
    timings.push(Benchmark::new("Package decompression", stage_start.elapsed()));

    // Nested packages
    let stage_start = Instant::now();
    let nested = decompression::unpack_nested(layout.temp(), config.max_depth());
    if !nested.is_empty() {
        info!("{} nested packages found.", nested.len());
    }
    results.set_nested_packages(nested);
    timings.push(Benchmark::new("Nested packages", stage_start.elapsed()));

    // Unity containers
    let stage_start = Instant::now();
    let containers = unity::process_containers(&layout, config);
    if !containers.is_empty() {
        info!("{} Unity containers processed.", containers.len());
    }
    results.set_unity_containers(containers);
    timings.push(Benchmark::new("Unity containers", stage_start.elapsed()));

    // Loose resources
    let stage_start = Instant::now();
    results.set_collected(resources::collect(&layout));
    timings.push(Benchmark::new("Resource collection", stage_start.elapsed()));

    // Decompilation
    let stage_start = Instant::now();
    let decompiled = if config.has_to_decompile() {
        match decompression::decompile(config, package, layout.decompiled()) {
            Ok(true) => Decompilation::Done,
            Ok(false) => Decompilation::NotInstalled,
            Err(e) => {
                print_warning(format!("the decompilation failed: {:#}", e));
                Decompilation::Failed(format!("{:#}", e))
            }
        }
    } else {
        Decompilation::Disabled
    };
    results.set_decompiled(decompiled);
    timings.push(Benchmark::new("Decompilation (apktool)", stage_start.elapsed()));

    results.set_summary(resources::count_category_files(&layout));

    // Reports
    let stage_start = Instant::now();
    let reports = results.generate_report(config);
    timings.push(Benchmark::new("Report generation", stage_start.elapsed()));
    timings.push(Benchmark::new(
        format!("Total time for {}", package_name),
        start_time.elapsed(),
    ));

    info!(
        "{}",
        format!(
            "Extraction of {} finished: {} files in {}.",
            package_name,
            results.total_files(),
            layout.root().display()
        )
        .green()
    );

    if config.is_bench() {
        benchmarks
            .entry(package_name)
            .or_insert_with(Vec::new)
            .extend(timings);
    }

    if config.is_open() {
        // The HTML report is generated last, so it is preferred.
        let open_path = reports
            .last()
            .cloned()
            .unwrap_or_else(|| layout.root().to_path_buf());
        match open::that(&open_path) {
            Ok(status) if status.success() => {}
            Ok(status) => print_warning(format!(
                "report opening errored with status code: {}",
                status
            )),
            Err(e) => print_warning(format!("report could not be opened automatically: {}", e)),
        }
    }

    Ok(results)
}

/// Copies the contents of `from` to `to`.
///
/// If the destination folder doesn't exist it is created. If files in the destination folder
/// exist with the same name as in the origin folder, they will be overwritten.
pub fn copy_folder<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<()> {
    let to = to.as_ref();
    if !to.exists() {
        fs::create_dir_all(to)?;
    }

    for f in fs::read_dir(from)? {
        let f = f?;
        let dest = to.join(f.file_name());
        if f.file_type()?.is_dir() {
            copy_folder(f.path(), &dest)?;
        } else {
            let _ = fs::copy(f.path(), &dest)?;
        }
    }
    Ok(())
}

/// Structure to store a benchmark information.
#[derive(Debug, Clone)]
pub struct Benchmark {
    label: String,
    duration: Duration,
}

impl Benchmark {
    /// Creates a new benchmark.
    pub fn new<L: Into<String>>(label: L, duration: Duration) -> Self {
        Self {
            label: label.into(),
            duration,
        }
    }

    /// Gets the measured duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, format_duration(self.duration))
    }
}
