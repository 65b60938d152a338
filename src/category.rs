//! Resource categories and the file extensions belonging to them.

use crate::error;
use serde::{Serialize, Serializer};
use std::{ffi::OsStr, fmt, path::Path, str::FromStr};

/// Extensions of texture files.
const TEXTURES: &[&str] = &["png", "jpg", "jpeg", "tga", "dds", "bmp", "tiff"];
/// Extensions of 3D model files.
const MODELS: &[&str] = &["obj", "fbx", "dae", "3ds", "blend", "max", "mb", "ma"];
/// Extensions of audio files.
const AUDIO: &[&str] = &["mp3", "wav", "ogg", "aac", "flac", "m4a"];
/// Extensions of animation files.
const ANIMATIONS: &[&str] = &["anim", "controller", "bvh"];
/// Extensions of script and managed code files.
const SCRIPTS: &[&str] = &["dll", "lua", "js", "cs"];
/// Extensions of files that may hold a Unity asset container.
const UNITY_CONTAINERS: &[&str] = &["assetbundle", "bundle", "unity3d", "assets"];

/// Patterns in the file name of PNG images that make them application icons.
const ICON_PATTERNS: &[&str] = &["icon", "ic_launcher", "app_icon", "logo"];

/// Output category of an extracted resource.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub enum Category {
    /// 3D models.
    Models,
    /// Textures and images.
    Textures,
    /// Audio clips.
    Audio,
    /// Animations.
    Animations,
    /// Scripts and managed code.
    Scripts,
    /// Application icons.
    Icons,
    /// XML files.
    Xml,
    /// Unity asset containers.
    UnityAssets,
    /// Anything else.
    Other,
}

impl Category {
    /// Returns every category, in the order of the output folders.
    pub fn all() -> &'static [Self] {
        &[
            Self::Models,
            Self::Textures,
            Self::Audio,
            Self::Animations,
            Self::Scripts,
            Self::Icons,
            Self::Xml,
            Self::UnityAssets,
            Self::Other,
        ]
    }

    /// Name of the output folder of the category.
    pub fn folder_name(self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::Textures => "textures",
            Self::Audio => "audio",
            Self::Animations => "animations",
            Self::Scripts => "scripts",
            Self::Icons => "icons",
            Self::Xml => "xml",
            Self::UnityAssets => "unity_assets",
            Self::Other => "other",
        }
    }

    /// Category of a loose file, by its extension.
    ///
    /// Icons are also textures, so they are reported as such. Unity containers and unknown files
    /// are not copied, so they get no category.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = lowercase_extension(path.as_ref())?;
        let extension = extension.as_str();

        if TEXTURES.contains(&extension) {
            Some(Self::Textures)
        } else if MODELS.contains(&extension) {
            Some(Self::Models)
        } else if AUDIO.contains(&extension) {
            Some(Self::Audio)
        } else if ANIMATIONS.contains(&extension) {
            Some(Self::Animations)
        } else if SCRIPTS.contains(&extension) {
            Some(Self::Scripts)
        } else if extension == "xml" {
            Some(Self::Xml)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder_name())
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.folder_name())
    }
}

impl FromStr for Category {
    type Err = error::Kind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(' ', "_").as_str() {
            "models" => Ok(Self::Models),
            "textures" => Ok(Self::Textures),
            "audio" => Ok(Self::Audio),
            "animations" => Ok(Self::Animations),
            "scripts" => Ok(Self::Scripts),
            "icons" => Ok(Self::Icons),
            "xml" => Ok(Self::Xml),
            "unity_assets" => Ok(Self::UnityAssets),
            "other" => Ok(Self::Other),
            _ => Err(error::Kind::Parse),
        }
    }
}

/// Checks if the file is an application icon.
pub fn is_icon<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if lowercase_extension(path).as_deref() != Some("png") {
        return false;
    }

    path.file_stem()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
        .map_or(false, |stem| {
            ICON_PATTERNS.iter().any(|pattern| stem.contains(pattern))
        })
}

/// Checks if the file extension is one used by Unity asset containers.
pub fn has_unity_container_extension<P: AsRef<Path>>(path: P) -> bool {
    lowercase_extension(path.as_ref())
        .map_or(false, |extension| UNITY_CONTAINERS.contains(&extension.as_str()))
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
}
