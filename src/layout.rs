//! Output folder structure of an extraction.

use crate::category::Category;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Name of the working folder holding the decompressed package.
const TEMP_FOLDER: &str = "temp";
/// Name of the folder where apktool decompiles the package.
const DECOMPILED_FOLDER: &str = "decompiled";

/// Folders of the extraction of one package.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Creates the layout rooted at the given output folder. Nothing is created on disk.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Creates every folder of the layout. Existing folders are kept.
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(self.temp())
            .with_context(|| format!("could not create `{}`", self.temp().display()))?;
        for category in Category::all() {
            let folder = self.category(*category);
            fs::create_dir_all(&folder)
                .with_context(|| format!("could not create `{}`", folder.display()))?;
        }
        Ok(())
    }

    /// Removes the whole output folder, if it exists.
    pub fn remove(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)
                .with_context(|| format!("could not remove `{}`", self.root.display()))?;
        }
        Ok(())
    }

    /// Output folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working folder with the decompressed package.
    pub fn temp(&self) -> PathBuf {
        self.root.join(TEMP_FOLDER)
    }

    /// Output folder of the given category.
    pub fn category(&self, category: Category) -> PathBuf {
        self.root.join(category.folder_name())
    }

    /// Folder where apktool decompiles the package.
    pub fn decompiled(&self) -> PathBuf {
        self.root.join(DECOMPILED_FOLDER)
    }
}
