//! Command line interface definition.
//!
//! This module is also compiled by the build script to generate the shell completion scripts, so
//! it can only depend on `clap`.

use clap::{crate_version, App, Arg};

/// Generates the command line interface.
pub fn generate_cli() -> App<'static, 'static> {
    App::new("APK Extractor")
        .version(crate_version!())
        .about(
            "Unpacks Android packages and extracts their textures, models, audio, icons and Unity \
             asset containers",
        )
        .arg(
            Arg::with_name("packages")
                .help("The APK files to extract")
                .value_name("APK")
                .multiple(true)
                .required_unless("history")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .takes_value(true)
                .help(
                    "Output folder (by default extracted_<apk name>). When extracting several \
                     packages, the folder that will contain one folder per package",
                ),
        )
        .arg(
            Arg::with_name("no-decompile")
                .long("no-decompile")
                .help("Does not decompile the package with apktool"),
        )
        .arg(
            Arg::with_name("apktool")
                .long("apktool")
                .value_name("PATH")
                .takes_value(true)
                .help("Sets the apktool executable to use"),
        )
        .arg(
            Arg::with_name("threads")
                .short("t")
                .long("threads")
                .value_name("THREADS")
                .takes_value(true)
                .help("Sets the number of threads used to read Unity asset containers"),
        )
        .arg(
            Arg::with_name("max-depth")
                .long("max-depth")
                .value_name("DEPTH")
                .takes_value(true)
                .help("Sets the maximum depth of nested packages to unpack"),
        )
        .arg(
            Arg::with_name("force")
                .long("force")
                .help("Removes the output folder before extracting, if it exists"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Generates the JSON report"),
        )
        .arg(
            Arg::with_name("html")
                .long("html")
                .help("Generates the HTML report"),
        )
        .arg(
            Arg::with_name("template")
                .long("template")
                .value_name("DIR")
                .takes_value(true)
                .help("Folder with a report.hbs template replacing the built-in HTML report"),
        )
        .arg(
            Arg::with_name("open")
                .long("open")
                .help("Opens the report after the extraction"),
        )
        .arg(
            Arg::with_name("history")
                .long("history")
                .help("Prints the history of past extractions and exits"),
        )
        .arg(
            Arg::with_name("bench")
                .long("bench")
                .help("Shows benchmarks for the extraction"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .conflicts_with("quiet")
                .help("If you'd like the extractor to be verbose"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .conflicts_with("verbose")
                .help("If you'd like a quiet output, only warnings and errors"),
        )
}
