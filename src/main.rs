//! APK Extractor binary.

use anyhow::{bail, Result};
use apk_extractor_core::{
    cli, extract_package,
    history::{Entry, History},
    initialize_config, initialize_logger, print_error, print_warning, Benchmark,
};
use colored::Colorize;
use log::info;
use std::{collections::BTreeMap, path::Path, process};

fn main() {
    if let Err(e) = run() {
        print_error(format!("{}", e));
        for cause in e.chain().skip(1) {
            eprintln!("\t{}{}", "Caused by: ".bold(), cause);
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::generate_cli().get_matches();
    initialize_logger(cli.is_present("verbose"), cli.is_present("quiet"));

    let config = initialize_config(&cli)?;
    for file in config.loaded_config_files() {
        info!("Loaded config from {}.", file.display());
    }

    if !config.check() {
        for error in config.errors() {
            print_error(error);
        }
        bail!("configuration errors were found, the extraction cannot continue");
    }

    let mut history = History::load(config.history_file(), config.history_limit())?;

    if cli.is_present("history") {
        print_history(&history);
        return Ok(());
    }

    let packages: Vec<&Path> = cli
        .values_of("packages")
        .map(|values| values.map(Path::new).collect())
        .unwrap_or_default();
    let outputs = config.output_folders(&packages);
    let mut benchmarks: BTreeMap<String, Vec<Benchmark>> = BTreeMap::new();
    let mut failed = 0;

    for (&package, output) in packages.iter().zip(outputs) {
        let entry = match extract_package(package, &config, &output, &mut benchmarks) {
            Ok(results) => Entry::success(package, output, results.total_files()),
            Err(e) => {
                print_error(format!(
                    "the extraction of `{}` failed: {:#}",
                    package.display(),
                    e
                ));
                failed += 1;
                Entry::failure(package, output, format!("{:#}", e))
            }
        };

        history.record(entry);
        if let Err(e) = history.save() {
            print_warning(format!("{:#}", e));
        }
    }

    if config.is_bench() {
        for (package, package_benchmarks) in &benchmarks {
            println!();
            println!("{}", format!("Benchmarks for {}:", package).bold());
            for benchmark in package_benchmarks {
                println!("{}", benchmark);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} packages could not be extracted", failed, packages.len());
    }
    Ok(())
}

/// Prints the past extractions, the most recent last.
fn print_history(history: &History) {
    if history.entries().is_empty() {
        println!("No extractions recorded in {}.", history.path().display());
        return;
    }

    for entry in history.entries() {
        let status = if entry.success {
            format!("{} files", entry.total_files).green()
        } else {
            entry
                .error
                .as_deref()
                .unwrap_or("failed")
                .to_owned()
                .red()
        };
        println!(
            "{}  {} -> {}  {}",
            entry.date.format("%Y-%m-%d %H:%M:%S"),
            entry.apk.display(),
            entry.output.display(),
            status
        );
    }
}
