//! Report generation module.

mod handlebars;
mod json;

use crate::{config::Config, results::Results};
use anyhow::Result;

pub use self::handlebars::{Report as HandlebarsReport, HTML_REPORT};
pub use self::json::{Json, JSON_REPORT};

/// Trait that represents a type that can generate a report.
pub trait Generator {
    /// Generates an actual report.
    fn generate(&mut self, config: &Config, results: &Results) -> Result<()>;
}
