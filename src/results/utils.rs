use std::{
    borrow::Cow,
    fs::{self, File},
    io::Read,
    path::Path,
    result::Result as StdResult,
};

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{
    ser::{SerializeStruct, Serializer},
    Serialize,
};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Structure to store the hashes of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerPrint {
    md5: md5::Digest,
    sha1: Vec<u8>,
    sha256: Vec<u8>,
}

impl FingerPrint {
    /// Creates a new fingerprint.
    pub fn new<P: AsRef<Path>>(package: P) -> Result<Self> {
        let mut file = File::open(package)?;
        let mut buffer = Vec::with_capacity(file.metadata()?.len() as usize);
        let _ = file.read_to_end(&mut buffer)?;

        Ok(Self {
            md5: md5::compute(&buffer),
            sha1: Sha1::digest(&buffer).to_vec(),
            sha256: Sha256::digest(&buffer).to_vec(),
        })
    }
}

impl Serialize for FingerPrint {
    fn serialize<S>(&self, serializer: S) -> StdResult<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser_struct = serializer.serialize_struct("fingerprint", 3)?;
        ser_struct.serialize_field("md5", &format!("{:x}", self.md5))?;
        ser_struct.serialize_field("sha1", &hex::encode(&self.sha1))?;
        ser_struct.serialize_field("sha256", &hex::encode(&self.sha256))?;
        ser_struct.end()
    }
}

/// Escapes the given input's HTML special characters.
///
/// It changes the following characters:
///  - `<` => `&lt;`
///  - `>` => `&gt;`
///  - `&` => `&amp;`
///  - `"` => `&quot;`
pub fn html_escape<'a, S: Into<Cow<'a, str>>>(input: S) -> Cow<'a, str> {
    lazy_static! {
        static ref REGEX: Regex = Regex::new("[<>&\"]").unwrap();
    }
    let input = input.into();
    let mut last_match = 0;

    if REGEX.is_match(&input) {
        let matches = REGEX.find_iter(&input);
        let mut output = String::with_capacity(input.len());
        for m in matches {
            output.push_str(&input[last_match..m.start()]);
            match &input[m.start()..m.end()] {
                "<" => output.push_str("&lt;"),
                ">" => output.push_str("&gt;"),
                "&" => output.push_str("&amp;"),
                "\"" => output.push_str("&quot;"),
                _ => unreachable!(),
            }
            last_match = m.end();
        }
        output.push_str(&input[last_match..]);
        Cow::Owned(output)
    } else {
        input
    }
}

/// Line of the folder tree listing of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    /// Nesting level, 0 for the output folder.
    pub depth: usize,
    /// File or folder name. Folders end with `/`.
    pub name: String,
}

impl TreeLine {
    /// Gets the line indented with 4 spaces per level.
    pub fn indented(&self) -> String {
        format!("{}{}", " ".repeat(self.depth * 4), self.name)
    }
}

/// Lists the given folder recursively, showing at most `max_files` files per folder.
///
/// Each folder is listed before its files, and its subfolders after them. Entries are sorted by
/// name.
pub fn folder_tree<P: AsRef<Path>>(root: P, max_files: usize) -> Vec<TreeLine> {
    let mut lines = Vec::new();
    add_folder(root.as_ref(), 0, max_files, &mut lines);
    lines
}

fn add_folder(folder: &Path, depth: usize, max_files: usize, lines: &mut Vec<TreeLine>) {
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    lines.push(TreeLine {
        depth,
        name: format!("{}/", name),
    });

    let mut entries: Vec<_> = match fs::read_dir(folder) {
        Ok(entries) => entries.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };
    entries.sort_by_key(|e| e.file_name());

    let (folders, files): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false));

    for file in files.iter().take(max_files) {
        lines.push(TreeLine {
            depth: depth + 1,
            name: file.file_name().to_string_lossy().into_owned(),
        });
    }
    for sub_folder in folders {
        add_folder(&sub_folder.path(), depth + 1, max_files, lines);
    }
}
