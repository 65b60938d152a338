//! Utilities module.

use log::{error, warn};
use std::{path::Path, time::Duration};

/// Prints an error through the logger.
pub fn print_error<S: AsRef<str>>(error: S) {
    error!("{}", error.as_ref());
}

/// Prints a warning through the logger.
pub fn print_warning<S: AsRef<str>>(warning: S) {
    warn!("{}", warning.as_ref());
}

/// Gets the file name of the package without its extension.
pub fn get_package_name<P: AsRef<Path>>(package: P) -> String {
    package
        .as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("package"))
}

/// Formats a duration as seconds with millisecond precision.
pub fn format_duration(duration: Duration) -> String {
    format!("{}.{:03}s", duration.as_secs(), duration.subsec_millis())
}
