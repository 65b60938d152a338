//! Handlebars report generation module.

use crate::{
    config::Config,
    error,
    results::{
        handlebars_helpers::{CategoryTitle, Indent},
        report::Generator,
        utils::{folder_tree, html_escape},
        Results,
    },
};
use anyhow::{Context, Result};
use handlebars::Handlebars;
use log::debug;
use serde_json::value::Value;
use std::{fs::File, io::Write, path::Path};

/// Name of the HTML report file.
pub const HTML_REPORT: &str = "report.html";
/// Name of the report template, both registered and on disk.
const TEMPLATE_NAME: &str = "report";
/// Built-in report template.
const BUILT_IN_TEMPLATE: &str = include_str!("../../../templates/report.hbs");
/// Files listed per folder in the folder tree.
const TREE_FILES_PER_FOLDER: usize = 10;

/// Handlebars report generator.
pub struct Report<'r> {
    /// Handlebars template structure.
    handler: Handlebars<'r>,
}

impl<'r> Report<'r> {
    /// Creates a new handlebars report generator with the built-in template.
    pub fn new() -> Result<Self> {
        let mut handler = Self::handler();
        handler
            .register_template_string(TEMPLATE_NAME, BUILT_IN_TEMPLATE)
            .context("error registering the built-in template")?;
        Ok(Self { handler })
    }

    /// Creates a new handlebars report generator with the `report.hbs` template of the given
    /// folder.
    pub fn from_path<P: AsRef<Path>>(template_path: P) -> Result<Self> {
        let template_file = template_path
            .as_ref()
            .join(format!("{}.hbs", TEMPLATE_NAME));
        if !template_file.is_file() {
            return Err(error::Kind::TemplateName {
                message: format!(
                    "the template folder `{}` has no `{}.hbs` file",
                    template_path.as_ref().display(),
                    TEMPLATE_NAME
                ),
            }
            .into());
        }

        let mut handler = Self::handler();
        handler
            .register_template_file(TEMPLATE_NAME, &template_file)
            .context("error registering template file")?;
        Ok(Self { handler })
    }

    /// Creates the generator for the configured template.
    pub fn for_config(config: &Config) -> Result<Self> {
        match config.template_path() {
            Some(path) => Self::from_path(path),
            None => Self::new(),
        }
    }

    /// Creates the handlebars registry, with the escape function and the helpers.
    fn handler() -> Handlebars<'r> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(|s| html_escape(s).into_owned());
        handlebars.register_helper("category_title", Box::new(CategoryTitle));
        handlebars.register_helper("indent", Box::new(Indent));
        handlebars
    }

    /// Renders the report for the given results.
    pub fn render(&self, results: &Results) -> Result<String> {
        let mut data = serde_json::to_value(results)?;
        if let Value::Object(ref mut map) = data {
            let tree = folder_tree(results.output_directory(), TREE_FILES_PER_FOLDER);
            let _ = map.insert("tree".to_owned(), serde_json::to_value(tree)?);
        }
        Ok(self.handler.render(TEMPLATE_NAME, &data)?)
    }
}

impl<'r> Generator for Report<'r> {
    fn generate(&mut self, _config: &Config, results: &Results) -> Result<()> {
        let path = results.output_directory().join(HTML_REPORT);
        debug!("starting HTML report generation at `{}`", path.display());

        let html = self.render(results)?;
        let mut f =
            File::create(&path).with_context(|| format!("could not create `{}`", path.display()))?;
        f.write_all(html.as_bytes())?;

        Ok(())
    }
}
