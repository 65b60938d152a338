//! Unity container module.
//!
//! Finds the Unity containers of the decompressed package (asset bundles and the serialized
//! files of the `assets/bin/Data` folder), lists their objects and exports the ones with a
//! known layout into the `unity_assets` folder.

pub mod bundle;
pub mod class_id;
pub mod export;
pub mod serialized;
#[cfg(test)]
mod tests;

use crate::{
    category::{has_unity_container_extension, Category},
    layout::OutputLayout,
    Config,
};
use anyhow::{Context, Result};
use class_id::{class_name, GAME_OBJECT, TEXT_ASSET};
use log::{debug, info, warn};
use serde::Serialize;
use serialized::{is_serialized_file, SerializedFile};
use std::{
    fmt,
    fs::{self, File},
    io::Read,
    mem,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    thread,
};
use walkdir::WalkDir;

/// Bytes read from the start of a file to detect its kind.
const HEAD_LEN: u64 = 64;

/// Kind of Unity container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContainerKind {
    /// Current asset bundle format.
    UnityFS,
    /// LZMA compressed web bundle.
    UnityWeb,
    /// Uncompressed legacy bundle.
    UnityRaw,
    /// Serialized file, outside of any bundle.
    SerializedFile,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnityFS => "UnityFS",
            Self::UnityWeb => "UnityWeb",
            Self::UnityRaw => "UnityRaw",
            Self::SerializedFile => "SerializedFile",
        };
        write!(f, "{}", name)
    }
}

/// Detects the kind of container from the first bytes of a file of `len` bytes.
pub fn detect(head: &[u8], len: u64) -> Option<ContainerKind> {
    let signature = |s: &[u8]| head.starts_with(s) && head.get(s.len()) == Some(&0);

    if signature(bundle::UNITY_FS) {
        Some(ContainerKind::UnityFS)
    } else if signature(bundle::UNITY_WEB) {
        Some(ContainerKind::UnityWeb)
    } else if signature(bundle::UNITY_RAW) {
        Some(ContainerKind::UnityRaw)
    } else if is_serialized_file(head, len) {
        Some(ContainerKind::SerializedFile)
    } else {
        None
    }
}

/// Detects the kind of container of a file.
pub fn sniff<P: AsRef<Path>>(path: P) -> Result<Option<ContainerKind>> {
    let file = File::open(path.as_ref())?;
    let len = file.metadata()?.len();
    let mut head = Vec::with_capacity(HEAD_LEN as usize);
    let _ = file.take(HEAD_LEN).read_to_end(&mut head)?;
    Ok(detect(&head, len))
}

/// Candidate container found in the working folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path of the file.
    pub path: PathBuf,
    /// Path relative to the working folder.
    pub relative: PathBuf,
    /// Kind of container, `None` if the file has a container extension but is not one.
    pub kind: Option<ContainerKind>,
}

/// Checks if the path is inside an `assets/bin/Data` folder.
fn is_in_data_folder(relative: &Path) -> bool {
    let components: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();
    components
        .windows(3)
        .any(|w| w == [Some("assets"), Some("bin"), Some("Data")])
}

/// Finds the Unity containers of the working folder.
///
/// Files with a container extension are always returned, so that the ones that are not
/// containers get reported. Other files are returned only if they are containers.
pub fn find_containers<P: AsRef<Path>>(work_dir: P) -> Vec<Candidate> {
    let work_dir = work_dir.as_ref();
    let walker = WalkDir::new(work_dir).sort_by_file_name().into_iter();

    let mut candidates = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = match path.strip_prefix(work_dir) {
            Ok(r) => r,
            Err(_) => continue,
        };

        let by_extension = has_unity_container_extension(path);
        if !by_extension && !is_in_data_folder(relative) {
            continue;
        }

        let kind = match sniff(path) {
            Ok(k) => k,
            Err(e) => {
                warn!("could not read `{}`: {}", relative.display(), e);
                None
            }
        };
        if kind.is_some() || by_extension {
            candidates.push(Candidate {
                path: path.to_path_buf(),
                relative: relative.to_path_buf(),
                kind,
            });
        }
    }
    candidates
}

/// Object listed in a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Class name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Object name, empty if the class has no name.
    pub name: String,
    /// Identifier of the object in its file.
    pub path_id: i64,
    /// Whether a file was written for the object.
    pub exported: bool,
    /// Error reading or exporting the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// File stored in a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub size: usize,
    pub serialized: bool,
}

/// Information of a container, written next to its export folder as `<file name>_info.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub name: String,
    pub path: String,
    pub kind: ContainerKind,
    pub unity_version: String,
    pub objects_count: usize,
    pub objects: Vec<ObjectInfo>,
    pub files: Vec<FileInfo>,
}

/// Summary of the processing of a container, for the reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    /// Path relative to the working folder.
    pub path: String,
    /// Kind of container, if it is one.
    pub kind: Option<ContainerKind>,
    /// Number of objects found.
    pub objects: usize,
    /// Number of objects exported.
    pub exported: usize,
    /// Path of the information file, relative to the output folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_file: Option<String>,
    /// Error processing the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Lists and exports the objects of a serialized file.
fn read_objects(file: &SerializedFile<'_>, dir: &Path) -> Vec<ObjectInfo> {
    file.objects
        .iter()
        .map(|object| {
            let mut info = ObjectInfo {
                type_name: class_name(object.class_id),
                name: String::new(),
                path_id: object.path_id,
                exported: false,
                error: None,
            };

            match file.object_name(object) {
                Ok(name) => info.name = name.unwrap_or_default(),
                Err(e) => {
                    info.error = Some(format!("{:#}", e));
                    return info;
                }
            }

            let exported = match object.class_id {
                TEXT_ASSET => file
                    .text_asset(object)
                    .and_then(|asset| export::export_text_asset(dir, &asset, object.path_id))
                    .map(|_| true),
                // The summary is written, but the object is not counted as exported.
                GAME_OBJECT => file
                    .game_object(object)
                    .and_then(|go| export::export_game_object(dir, file, &go, object.path_id))
                    .map(|_| false),
                _ => Ok(false),
            };
            match exported {
                Ok(exported) => info.exported = exported,
                Err(e) => info.error = Some(format!("{:#}", e)),
            }
            info
        })
        .collect()
}

/// Reads a container, exporting its objects into `dir`.
pub fn read_container(data: &[u8], kind: ContainerKind, dir: &Path) -> Result<ContainerInfo> {
    let mut info = ContainerInfo {
        name: String::new(),
        path: String::new(),
        kind,
        unity_version: String::new(),
        objects_count: 0,
        objects: Vec::new(),
        files: Vec::new(),
    };

    if kind == ContainerKind::SerializedFile {
        let file = SerializedFile::parse(data)?;
        info.unity_version = file.unity_version.clone();
        info.objects = read_objects(&file, dir);
    } else {
        let bundle = bundle::read(data)?;
        info.unity_version = bundle.unity_revision.clone();

        for entry in &bundle.entries {
            let serialized = is_serialized_file(&entry.data, entry.data.len() as u64);
            info.files.push(FileInfo {
                path: entry.path.clone(),
                size: entry.data.len(),
                serialized,
            });
            if !serialized {
                continue;
            }

            match SerializedFile::parse(&entry.data) {
                Ok(file) => info.objects.extend(read_objects(&file, dir)),
                Err(e) => warn!("could not read `{}` of the bundle: {:#}", entry.path, e),
            }
        }
    }

    info.objects_count = info.objects.len();
    Ok(info)
}

/// Path of the information file of a container, relative to the Unity assets folder.
///
/// The objects of `assets/data.unity3d` are exported into `assets/data.unity3d/` and its
/// information is written to `assets/data.unity3d_info.json`.
fn info_file_path(relative: &Path) -> PathBuf {
    let mut name = relative.as_os_str().to_os_string();
    name.push("_info.json");
    PathBuf::from(name)
}

/// Processes one container, writing its information file.
fn process_container(candidate: &Candidate, layout: &OutputLayout) -> Result<ContainerInfo> {
    let kind = candidate.kind.ok_or_else(|| crate::error::Kind::UnsupportedContainer {
        message: String::from("the file is not a Unity container"),
    })?;

    let unity_assets = layout.category(Category::UnityAssets);
    let dir = unity_assets.join(&candidate.relative);
    fs::create_dir_all(&dir).with_context(|| format!("could not create `{}`", dir.display()))?;

    let data = fs::read(&candidate.path)?;
    let mut info = read_container(&data, kind, &dir)?;
    info.name = candidate
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info.path = candidate.relative.display().to_string();

    let info_path = unity_assets.join(info_file_path(&candidate.relative));
    fs::write(&info_path, serde_json::to_string_pretty(&info)?)
        .with_context(|| format!("could not write `{}`", info_path.display()))?;

    Ok(info)
}

/// Finds and processes every Unity container of the package with `threads` workers.
pub fn process_containers(layout: &OutputLayout, config: &Config) -> Vec<ContainerSummary> {
    let mut candidates = find_containers(layout.temp());
    if candidates.is_empty() {
        debug!("no Unity containers were found");
        return Vec::new();
    }

    let total = candidates.len();
    let threads = usize::from(config.threads()).min(total).max(1);
    info!(
        "processing {} Unity containers with {} threads",
        total, threads
    );

    // Workers pop from the back.
    candidates.reverse();
    let queue = Arc::new(Mutex::new(candidates));
    let summaries: Arc<Mutex<Vec<ContainerSummary>>> = Arc::new(Mutex::new(Vec::new()));
    let layout = Arc::new(layout.clone());

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let thread_queue = Arc::clone(&queue);
            let thread_summaries = Arc::clone(&summaries);
            let thread_layout = Arc::clone(&layout);

            thread::spawn(move || {
                while let Some(candidate) = thread_queue.lock().ok().and_then(|mut q| q.pop()) {
                    let path = candidate.relative.display().to_string();
                    let summary = match process_container(&candidate, &thread_layout) {
                        Ok(info) => {
                            debug!(
                                "`{}` processed: {} objects found",
                                path, info.objects_count
                            );
                            let info_file = Path::new(Category::UnityAssets.folder_name())
                                .join(info_file_path(&candidate.relative));
                            ContainerSummary {
                                path,
                                kind: candidate.kind,
                                objects: info.objects_count,
                                exported: info.objects.iter().filter(|o| o.exported).count(),
                                info_file: Some(info_file.display().to_string()),
                                error: None,
                            }
                        }
                        Err(e) => {
                            warn!(
                                "could not process the Unity container `{}`. The extraction \
                                 will continue, though. Error: {:#}",
                                path, e
                            );
                            ContainerSummary {
                                path,
                                kind: candidate.kind,
                                objects: 0,
                                exported: 0,
                                info_file: None,
                                error: Some(format!("{:#}", e)),
                            }
                        }
                    };
                    if let Ok(mut summaries) = thread_summaries.lock() {
                        summaries.push(summary);
                    }
                }
            })
        })
        .collect();

    for t in handles {
        if let Err(e) = t.join() {
            warn!(
                "an error occurred when joining the Unity container threads: Error: {:?}",
                e
            );
        }
    }

    let mut summaries = match summaries.lock() {
        Ok(mut s) => mem::take(&mut *s),
        Err(e) => mem::take(&mut *e.into_inner()),
    };
    summaries.sort_by(|a, b| a.path.cmp(&b.path));
    summaries
}
