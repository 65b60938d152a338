//! Loose resource collection.
//!
//! Walks the decompressed package and copies every file with a known resource extension to the
//! folder of its category, keeping its relative path.

use crate::{
    category::{is_icon, Category},
    layout::OutputLayout,
};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};
use walkdir::WalkDir;

/// Number of files copied per category.
pub type CategoryCounts = BTreeMap<Category, usize>;

/// Copies the categorized files of the working folder into the category folders.
pub fn collect(layout: &OutputLayout) -> CategoryCounts {
    let temp = layout.temp();
    let mut counts = CategoryCounts::new();
    let mut icons = BTreeSet::new();

    let walker = WalkDir::new(&temp).sort_by_file_name().into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("there was an error reading the working folder: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = match path.strip_prefix(&temp) {
            Ok(r) => r,
            Err(_) => continue,
        };

        if let Some(category) = Category::for_path(path) {
            let dest = layout.category(category).join(relative);
            match copy_file(path, &dest) {
                Ok(()) => *counts.entry(category).or_insert(0) += 1,
                Err(e) => warn!("could not copy `{}`: {:#}", relative.display(), e),
            }
        }

        if is_icon(path) {
            if let Some(name) = path.file_name() {
                let dest = layout.category(Category::Icons).join(name);
                if icons.contains(name) {
                    debug!(
                        "the icon `{}` replaces a previous icon with the same name",
                        relative.display()
                    );
                }
                match copy_file(path, &dest) {
                    Ok(()) => {
                        let _ = icons.insert(name.to_os_string());
                    }
                    Err(e) => warn!("could not copy the icon `{}`: {:#}", relative.display(), e),
                }
            }
        }
    }

    if !icons.is_empty() {
        let _ = counts.insert(Category::Icons, icons.len());
    }
    counts
}

/// Copies a file, creating the parent folders of the destination.
fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create `{}`", parent.display()))?;
    }
    let _ = fs::copy(from, to)?;
    Ok(())
}

/// Counts the files in each category folder, recursively.
pub fn count_category_files(layout: &OutputLayout) -> CategoryCounts {
    Category::all()
        .iter()
        .map(|category| {
            let count = WalkDir::new(layout.category(*category))
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .count();
            (*category, count)
        })
        .collect()
}
