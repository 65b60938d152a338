//! Handlebars helpers of the HTML report.

use handlebars::handlebars_helper;

handlebars_helper!(CategoryTitle: |folder: str| category_title(folder));
handlebars_helper!(Indent: |depth: u64| " ".repeat(depth as usize * 4));

/// Converts a category folder name into a title: `unity_assets` becomes `Unity Assets`.
fn category_title(folder: &str) -> String {
    folder
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
