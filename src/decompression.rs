//! Package decompression, nested package unpacking and decompilation.

use crate::{copy_folder, error, Config};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use serde::Serialize;
use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
    process::Command,
};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Signature of a ZIP local file header.
const ZIP_SIGNATURE: &[u8; 4] = b"PK\x03\x04";

/// Extensions of packages that are unpacked when found inside another package.
const NESTED_EXTENSIONS: &[&str] = &["apk", "xapk", "apks"];

/// Prefix of the folder where nested packages are unpacked before merging them.
const STAGING_PREFIX: &str = ".nested-";

/// Separator between the path of a nested package and the path inside it.
const NESTED_SEPARATOR: &str = "!/";

/// Statistics of the decompression of an archive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnpackStats {
    /// Files written.
    pub extracted: usize,
    /// Entries that could not be extracted.
    pub skipped: usize,
}

/// Package found inside another package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedPackage {
    /// Path of the package, relative to the working folder. Packages inside nested packages are
    /// separated by `!/`.
    pub path: String,
    /// Nesting depth, 1 for packages inside the extracted package.
    pub depth: u32,
    /// Decompression statistics.
    pub unpack: UnpackStats,
    /// Error that prevented unpacking it, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decompresses the given ZIP package into `dest`.
///
/// Entries that cannot be extracted, or whose name would place them outside `dest`, are skipped.
pub fn decompress<P: AsRef<Path>, D: AsRef<Path>>(package: P, dest: D) -> Result<UnpackStats> {
    let package = package.as_ref();
    let dest = dest.as_ref();

    let file =
        File::open(package).with_context(|| format!("could not open `{}`", package.display()))?;
    let mut zip = ZipArchive::new(file).map_err(|_| error::Kind::NotAnArchive {
        path: package.display().to_string(),
    })?;
    fs::create_dir_all(dest).with_context(|| format!("could not create `{}`", dest.display()))?;

    let total = zip.len();
    let mut stats = UnpackStats::default();
    let mut last_print = 0;
    for i in 0..total {
        if let Err(e) = extract_entry(&mut zip, i, dest, &mut stats) {
            debug!("skipping entry {} of `{}`: {}", i, package.display(), e);
            stats.skipped += 1;
        }

        if total >= 10 && i - last_print >= total / 10 {
            last_print = i;
            debug!("{} of {} entries decompressed", i + 1, total);
        }
    }

    Ok(stats)
}

/// Extracts one entry of the archive.
fn extract_entry(
    zip: &mut ZipArchive<File>,
    index: usize,
    dest: &Path,
    stats: &mut UnpackStats,
) -> Result<()> {
    let mut entry = zip.by_index(index)?;
    let relative = match entry.enclosed_name() {
        Some(p) => p.to_path_buf(),
        None => bail!("unsafe entry name `{}`", entry.name()),
    };
    let out_path = dest.join(relative);

    if entry.is_dir() {
        fs::create_dir_all(&out_path)?;
    } else {
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)?;
        let _ = io::copy(&mut entry, &mut out_file)?;
        stats.extracted += 1;
    }

    Ok(())
}

/// Checks if the file starts with a ZIP local file header.
pub fn has_zip_signature<P: AsRef<Path>>(path: P) -> bool {
    let mut signature = [0_u8; 4];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut signature))
        .map(|_| &signature == ZIP_SIGNATURE)
        .unwrap_or(false)
}

/// Unpacks the packages nested in `work_dir` and merges their contents into it.
///
/// Nested packages are searched before anything is merged, so packages coming from a merge are
/// not unpacked twice. Each package is decompressed in a staging folder next to `work_dir`, its
/// own nested packages are unpacked there, and the result is merged into `work_dir`, overwriting
/// existing files.
pub fn unpack_nested<P: AsRef<Path>>(work_dir: P, max_depth: u32) -> Vec<NestedPackage> {
    let work_dir = work_dir.as_ref();
    let mut found = Vec::new();
    let packages = find_nested_packages(work_dir);
    if packages.is_empty() {
        return found;
    }

    let staging_parent = work_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staging_root = match tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(staging_parent)
    {
        Ok(dir) => dir,
        Err(e) => {
            warn!(
                "could not create a staging folder in `{}`, nested packages will not be \
                 unpacked: {}",
                staging_parent.display(),
                e
            );
            return found;
        }
    };

    unpack_packages(
        work_dir,
        packages,
        staging_root.path(),
        "",
        1,
        max_depth,
        &mut found,
    );

    if let Err(e) = staging_root.close() {
        warn!("could not remove the staging folder: {}", e);
    }
    found
}

fn unpack_packages(
    work_dir: &Path,
    packages: Vec<PathBuf>,
    staging_root: &Path,
    prefix: &str,
    depth: u32,
    max_depth: u32,
    found: &mut Vec<NestedPackage>,
) {
    for package in packages {
        let relative = package.strip_prefix(work_dir).unwrap_or(&package);
        let path = format!("{}{}", prefix, relative.to_string_lossy().replace('\\', "/"));

        if depth > max_depth {
            warn!(
                "the nested package `{}` exceeds the maximum depth ({}), it will not be unpacked",
                path, max_depth
            );
            found.push(NestedPackage {
                path,
                depth,
                unpack: UnpackStats::default(),
                error: Some(format!("maximum nesting depth ({}) reached", max_depth)),
            });
            continue;
        }

        info!("Unpacking nested package {}…", path.italic());
        let index = found.len();
        let staging = staging_root.join(index.to_string());
        found.push(NestedPackage {
            path: path.clone(),
            depth,
            unpack: UnpackStats::default(),
            error: None,
        });

        let result = decompress(&package, &staging).and_then(|stats| {
            found[index].unpack = stats;
            let inner_prefix = format!("{}{}", path, NESTED_SEPARATOR);
            let inner_packages = find_nested_packages(&staging);
            unpack_packages(
                &staging,
                inner_packages,
                staging_root,
                &inner_prefix,
                depth + 1,
                max_depth,
                found,
            );
            copy_folder(&staging, work_dir)
                .with_context(|| format!("could not merge the contents of `{}`", path))
        });

        if let Err(e) = result {
            warn!("could not unpack the nested package `{}`: {:#}", path, e);
            found[index].error = Some(format!("{:#}", e));
        }

        if staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!(
                    "could not remove the staging folder `{}`: {}",
                    staging.display(),
                    e
                );
            }
        }
    }
}

/// Finds the packages inside the given folder, sorted by path.
fn find_nested_packages(work_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(work_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("there was an error reading the working folder: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(OsStr::to_str)
                .map(str::to_lowercase)
                .map_or(false, |e| NESTED_EXTENSIONS.contains(&e.as_str()))
        })
        .filter(|p| has_zip_signature(p))
        .collect()
}

/// Decompiles the package with apktool into `dest`.
///
/// Returns `false` if apktool is not installed.
pub fn decompile<P: AsRef<Path>, D: AsRef<Path>>(
    config: &Config,
    package: P,
    dest: D,
) -> Result<bool> {
    let dest = dest.as_ref();
    info!("Decompiling the package with apktool…");

    let output = Command::new(config.apktool())
        .arg("d")
        .arg(package.as_ref())
        .arg("-o")
        .arg(dest)
        .arg("-f")
        .output();

    let output = match output {
        Ok(o) => o,
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                "apktool was not found at `{}`, the decompilation will be skipped",
                config.apktool().display()
            );
            return Ok(false);
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "there was an error when executing `{}`",
                    config.apktool().display()
                )
            });
        }
    };

    if !output.status.success() {
        bail!(
            "the decompilation command returned an error. More info: {}",
            String::from_utf8_lossy(&output.stderr[..])
        );
    }

    if config.is_verbose() {
        info!(
            "{}",
            format!("The package has been decompiled in {}.", dest.display()).green()
        );
    } else {
        info!("Package decompiled.");
    }

    Ok(true)
}
