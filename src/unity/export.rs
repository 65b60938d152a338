//! Export of the Unity objects whose layout is known.

use super::{
    class_id::class_name,
    serialized::{GameObject, SerializedFile, TextAsset},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Longest file name stem written.
const MAX_NAME_LEN: usize = 128;

/// Replaces the characters that are not valid in file names.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .take(MAX_NAME_LEN)
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        String::from("unnamed")
    } else {
        sanitized
    }
}

/// Gets the stem of the exported file, falling back to `<prefix>_<path_id>` for unnamed objects.
fn export_stem(name: &str, prefix: &str, path_id: i64) -> String {
    if name.trim().is_empty() {
        format!("{}_{}", prefix, path_id)
    } else {
        sanitize_file_name(name)
    }
}

/// Writes the script of a text asset as `<name>.txt`.
pub fn export_text_asset(dir: &Path, asset: &TextAsset, path_id: i64) -> Result<PathBuf> {
    let path = dir.join(format!("{}.txt", export_stem(&asset.name, "text", path_id)));
    fs::write(&path, String::from_utf8_lossy(&asset.script).as_bytes())
        .with_context(|| format!("could not write `{}`", path.display()))?;
    Ok(path)
}

#[derive(Debug, Serialize)]
struct ComponentInfo {
    #[serde(rename = "type")]
    type_name: String,
    file_id: i32,
    path_id: i64,
}

#[derive(Debug, Serialize)]
struct GameObjectInfo<'o> {
    name: &'o str,
    layer: u32,
    components: Vec<ComponentInfo>,
}

/// Writes the summary of a game object as `<name>_info.json`.
///
/// Components stored in the same file are resolved to their class name, the ones in other
/// files are listed as `External`.
pub fn export_game_object(
    dir: &Path,
    file: &SerializedFile<'_>,
    game_object: &GameObject,
    path_id: i64,
) -> Result<PathBuf> {
    let components = game_object
        .components
        .iter()
        .map(|component| {
            let type_name = if component.file_id == 0 {
                file.object(component.path_id)
                    .map_or_else(|| String::from("Missing"), |o| class_name(o.class_id))
            } else {
                String::from("External")
            };
            ComponentInfo {
                type_name,
                file_id: component.file_id,
                path_id: component.path_id,
            }
        })
        .collect();

    let info = GameObjectInfo {
        name: &game_object.name,
        layer: game_object.layer,
        components,
    };

    let path = dir.join(format!(
        "{}_info.json",
        export_stem(&game_object.name, "go", path_id)
    ));
    let json = serde_json::to_string_pretty(&info)?;
    fs::write(&path, json).with_context(|| format!("could not write `{}`", path.display()))?;
    Ok(path)
}
