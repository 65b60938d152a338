//! Unity serialized files.
//!
//! Serialized files store the objects of a scene or an asset bundle. They start with a big
//! endian header, followed by the metadata (types and object table) and the object data, both
//! in the endianness given by the header.

use super::class_id::{self, GAME_OBJECT, MONO_BEHAVIOUR};
use crate::error;
use anyhow::{Context, Result};
use binrw::{BinRead, BinReaderExt, BinResult, Endian, NullString};
use serde::Serialize;
use std::{convert::TryFrom, io::Cursor};

/// Oldest format version recognized.
const MIN_VERSION: u32 = 5;
/// Newest format version recognized.
const MAX_VERSION: u32 = 50;
/// Oldest format version whose metadata can be read.
const MIN_METADATA_VERSION: u32 = 9;
/// Largest number of types, nodes, objects or components accepted.
const MAX_ENTRIES: i32 = 1 << 20;
/// Longest length prefixed array accepted.
const MAX_ARRAY_LEN: i32 = 1 << 30;

#[derive(BinRead, Debug)]
#[br(big)]
struct LargeHeader {
    _metadata_size: u32,
    file_size: i64,
    data_offset: i64,
    _unknown: i64,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct RawHeader {
    _metadata_size: u32,
    file_size: u32,
    version: u32,
    data_offset: u32,
    #[br(if(version >= 9))]
    endianness: Option<u8>,
    #[br(if(version >= 9))]
    _reserved: Option<[u8; 3]>,
    #[br(if(version >= 22))]
    large: Option<LargeHeader>,
}

/// Header of a serialized file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format version.
    pub version: u32,
    /// Size of the whole file.
    pub file_size: u64,
    /// Offset of the object data.
    pub data_offset: u64,
    /// Whether the metadata and objects are big endian.
    pub big_endian: bool,
    /// Offset of the metadata.
    metadata_offset: u64,
}

impl Header {
    /// Reads the header at the start of the data.
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let raw: RawHeader = cursor.read_be().context("invalid serialized file header")?;

        let (file_size, data_offset) = match raw.large {
            Some(large) => {
                if large.file_size < 0 || large.data_offset < 0 {
                    return Err(error::Kind::UnsupportedContainer {
                        message: "negative sizes in the serialized file header".to_owned(),
                    }
                    .into());
                }
                (large.file_size as u64, large.data_offset as u64)
            }
            None => (u64::from(raw.file_size), u64::from(raw.data_offset)),
        };

        Ok(Self {
            version: raw.version,
            file_size,
            data_offset,
            big_endian: raw.endianness.map_or(true, |e| e != 0),
            metadata_offset: cursor.position(),
        })
    }
}

/// Checks if the first bytes of a file of `len` bytes look like a serialized file header.
pub fn is_serialized_file(head: &[u8], len: u64) -> bool {
    match Header::read(head) {
        Ok(header) => {
            (MIN_VERSION..=MAX_VERSION).contains(&header.version)
                && header.file_size == len
                && header.data_offset <= header.file_size
        }
        Err(_) => false,
    }
}

/// Reads an object identifier, stored in 64 bits by the newer versions.
#[binrw::parser(reader, endian)]
fn read_path_id(wide: bool) -> BinResult<i64> {
    if wide {
        i64::read_options(reader, endian, ())
    } else {
        i32::read_options(reader, endian, ()).map(i64::from)
    }
}

/// Checks a count that is only present in some versions.
fn optional_len(len: Option<i32>, max: i32) -> bool {
    len.map_or(true, |n| (0..=max).contains(&n))
}

/// Script types carry the hash of their script: negative class ids before version 16,
/// `MonoBehaviour` from then on.
fn has_script_id(version: u32, class_id: i32) -> bool {
    if version < 16 {
        class_id < 0
    } else {
        class_id == MONO_BEHAVIOUR
    }
}

/// Length prefixed byte array, aligned to 4 bytes afterwards.
#[derive(BinRead, Debug)]
struct AlignedBytes {
    #[br(assert((0..=MAX_ARRAY_LEN).contains(&len), "invalid array length {}", len))]
    len: i32,
    #[br(count = len as usize, align_after = 4)]
    bytes: Vec<u8>,
}

impl AlignedBytes {
    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Type tree of a type, in the blob layout. Only its size matters.
#[derive(BinRead, Debug)]
#[br(import(version: u32, enabled: bool))]
struct TypeTree {
    #[br(if(enabled))]
    #[br(assert(optional_len(node_count, MAX_ENTRIES), "invalid node count {:?}", node_count))]
    node_count: Option<i32>,
    #[br(if(enabled))]
    #[br(assert(
        optional_len(string_buffer_size, MAX_ARRAY_LEN),
        "invalid string buffer size {:?}",
        string_buffer_size
    ))]
    string_buffer_size: Option<i32>,
    #[br(count = node_count.unwrap_or(0) as usize * if version >= 19 { 32 } else { 24 }
        + string_buffer_size.unwrap_or(0) as usize)]
    _nodes: Vec<u8>,
    #[br(if(enabled && version >= 21))]
    #[br(assert(
        optional_len(dependency_count, MAX_ENTRIES),
        "invalid dependency count {:?}",
        dependency_count
    ))]
    dependency_count: Option<i32>,
    #[br(count = dependency_count.unwrap_or(0) as usize * 4)]
    _dependencies: Vec<u8>,
}

/// Entry of the type table.
#[derive(BinRead, Debug)]
#[br(import(version: u32, enable_type_tree: bool))]
struct SerializedType {
    class_id: i32,
    #[br(if(version >= 16))]
    _stripped: Option<u8>,
    #[br(if(version >= 17))]
    _script_type_index: Option<i16>,
    #[br(if(version >= 13 && has_script_id(version, class_id)))]
    _script_id: Option<[u8; 16]>,
    #[br(if(version >= 13))]
    _old_type_hash: Option<[u8; 16]>,
    #[br(args(version, enable_type_tree))]
    _type_tree: TypeTree,
}

/// Entry of the object table, as stored.
#[derive(BinRead, Debug)]
#[br(import(version: u32, big_id_enabled: bool))]
struct RawObject {
    #[br(align_before = if version >= 14 { 4 } else { 1 })]
    #[br(parse_with = read_path_id, args(big_id_enabled || version >= 14))]
    path_id: i64,
    #[br(if(version >= 22))]
    large_byte_start: Option<i64>,
    #[br(if(version < 22))]
    byte_start: Option<u32>,
    size: u32,
    type_id: i32,
    #[br(if(version < 16))]
    class_id: Option<u16>,
    #[br(if(version < 17))]
    _script_type_index: Option<i16>,
    #[br(if(version == 15 || version == 16))]
    _stripped: Option<u8>,
}

/// Metadata of a serialized file, after the header.
#[derive(BinRead, Debug)]
#[br(import(version: u32))]
struct Metadata {
    #[br(map = |s: NullString| String::from_utf8_lossy(&s.0).into_owned())]
    unity_version: String,
    target_platform: i32,
    #[br(if(version >= 13))]
    enable_type_tree: Option<u8>,
    #[br(assert((0..=MAX_ENTRIES).contains(&type_count), "invalid type count {}", type_count))]
    type_count: i32,
    #[br(args {
        count: type_count as usize,
        inner: (version, enable_type_tree.map_or(true, |e| e != 0)),
    })]
    types: Vec<SerializedType>,
    #[br(if(version < 14))]
    big_id_enabled: Option<i32>,
    #[br(assert(
        (0..=MAX_ENTRIES).contains(&object_count),
        "invalid object count {}",
        object_count
    ))]
    object_count: i32,
    #[br(args {
        count: object_count as usize,
        inner: (version, big_id_enabled.map_or(false, |b| b != 0)),
    })]
    objects: Vec<RawObject>,
}

/// Entry of the object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Identifier of the object in the file.
    pub path_id: i64,
    /// Class ID of the object.
    pub class_id: i32,
    /// Absolute offset of the object data.
    pub offset: u64,
    /// Size of the object data.
    pub size: u32,
}

/// Reference to an object, maybe in another file.
#[derive(BinRead, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[br(import(version: u32))]
pub struct PPtr {
    /// Index of the file, 0 for the file containing the reference.
    pub file_id: i32,
    /// Identifier of the object in the file.
    #[br(parse_with = read_path_id, args(version >= 14))]
    pub path_id: i64,
}

#[derive(BinRead, Debug)]
#[br(import(version: u32))]
struct Component {
    #[br(if(version < 17))]
    _class_id: Option<i32>,
    #[br(args(version))]
    pptr: PPtr,
}

#[derive(BinRead, Debug)]
#[br(import(version: u32))]
struct RawGameObject {
    #[br(assert(
        (0..=MAX_ENTRIES).contains(&component_count),
        "invalid component count {}",
        component_count
    ))]
    component_count: i32,
    #[br(args { count: component_count as usize, inner: (version,) })]
    components: Vec<Component>,
    layer: u32,
    name: AlignedBytes,
}

/// Start of a `MonoBehaviour`, up to its name.
#[derive(BinRead, Debug)]
#[br(import(version: u32))]
struct MonoBehaviourHeader {
    #[br(args(version))]
    _game_object: PPtr,
    _enabled: u8,
    #[br(align_before = 4, args(version))]
    _script: PPtr,
    name: AlignedBytes,
}

#[derive(BinRead, Debug)]
struct RawTextAsset {
    name: AlignedBytes,
    script: AlignedBytes,
}

/// Decoded `GameObject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObject {
    pub name: String,
    pub layer: u32,
    pub components: Vec<PPtr>,
}

/// Decoded `TextAsset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAsset {
    pub name: String,
    pub script: Vec<u8>,
}

/// Serialized file with its object table.
#[derive(Debug, Clone)]
pub struct SerializedFile<'a> {
    data: &'a [u8],
    header: Header,
    /// Unity version that built the file.
    pub unity_version: String,
    /// Platform the file was built for.
    pub target_platform: i32,
    /// Objects of the file, in table order.
    pub objects: Vec<ObjectEntry>,
}

impl<'a> SerializedFile<'a> {
    /// Parses the header and the metadata of a serialized file.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = Header::read(data)?;
        let version = header.version;
        if version < MIN_METADATA_VERSION || version > MAX_VERSION {
            return Err(error::Kind::UnsupportedContainer {
                message: format!("serialized file version {} is not supported", version),
            }
            .into());
        }
        // Older type trees are stored recursively, not as a blob.
        if version < 12 && version != 10 {
            return Err(error::Kind::UnsupportedContainer {
                message: format!("type trees of version {} are not supported", version),
            }
            .into());
        }

        let mut cursor = Cursor::new(data);
        cursor.set_position(header.metadata_offset);
        let metadata: Metadata = cursor
            .read_type_args(endian(&header), (version,))
            .context("invalid serialized file metadata")?;

        let types: Vec<i32> = metadata.types.iter().map(|t| t.class_id).collect();
        let objects = metadata
            .objects
            .iter()
            .map(|raw| -> Result<ObjectEntry> {
                let byte_start = match (raw.large_byte_start, raw.byte_start) {
                    (Some(start), _) => u64::try_from(start).map_err(|_| {
                        error::Kind::UnsupportedContainer {
                            message: format!("object {} has a negative offset", raw.path_id),
                        }
                    })?,
                    (None, start) => u64::from(start.unwrap_or(0)),
                };
                let class_id = match raw.class_id {
                    Some(class_id) => i32::from(class_id),
                    None => usize::try_from(raw.type_id)
                        .ok()
                        .and_then(|index| types.get(index))
                        .copied()
                        .ok_or_else(|| error::Kind::UnsupportedContainer {
                            message: format!(
                                "object {} has an invalid type index {}",
                                raw.path_id, raw.type_id
                            ),
                        })?,
                };

                Ok(ObjectEntry {
                    path_id: raw.path_id,
                    class_id,
                    offset: byte_start.saturating_add(header.data_offset),
                    size: raw.size,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            data,
            header,
            unity_version: metadata.unity_version,
            target_platform: metadata.target_platform,
            objects,
        })
    }

    /// Format version of the file.
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Finds an object by its identifier.
    pub fn object(&self, path_id: i64) -> Option<&ObjectEntry> {
        self.objects.iter().find(|o| o.path_id == path_id)
    }

    /// Gets the data of an object.
    pub fn object_data(&self, object: &ObjectEntry) -> Result<&'a [u8]> {
        let end = object
            .offset
            .checked_add(u64::from(object.size))
            .filter(|end| *end <= self.data.len() as u64)
            .ok_or(error::Kind::Truncated {
                offset: object.offset,
                needed: u64::from(object.size),
            })?;
        Ok(&self.data[object.offset as usize..end as usize])
    }

    fn object_cursor(&self, object: &ObjectEntry) -> Result<Cursor<&'a [u8]>> {
        Ok(Cursor::new(self.object_data(object)?))
    }

    /// Reads the name of an object, for the classes that have one.
    pub fn object_name(&self, object: &ObjectEntry) -> Result<Option<String>> {
        let endian = endian(&self.header);
        match object.class_id {
            GAME_OBJECT => Ok(Some(self.game_object(object)?.name)),
            MONO_BEHAVIOUR => {
                let mono_behaviour: MonoBehaviourHeader = self
                    .object_cursor(object)?
                    .read_type_args(endian, (self.version(),))?;
                Ok(Some(mono_behaviour.name.into_string()))
            }
            id if class_id::is_named(id) => {
                let name: AlignedBytes = self.object_cursor(object)?.read_type(endian)?;
                Ok(Some(name.into_string()))
            }
            _ => Ok(None),
        }
    }

    /// Reads a `GameObject`.
    pub fn game_object(&self, object: &ObjectEntry) -> Result<GameObject> {
        let raw: RawGameObject = self
            .object_cursor(object)?
            .read_type_args(endian(&self.header), (self.version(),))
            .context("invalid GameObject")?;

        Ok(GameObject {
            name: raw.name.into_string(),
            layer: raw.layer,
            components: raw.components.into_iter().map(|c| c.pptr).collect(),
        })
    }

    /// Reads a `TextAsset`.
    pub fn text_asset(&self, object: &ObjectEntry) -> Result<TextAsset> {
        let raw: RawTextAsset = self
            .object_cursor(object)?
            .read_type(endian(&self.header))
            .context("invalid TextAsset")?;

        Ok(TextAsset {
            name: raw.name.into_string(),
            script: raw.script.bytes,
        })
    }
}

/// Endianness of the metadata and objects.
fn endian(header: &Header) -> Endian {
    if header.big_endian {
        Endian::Big
    } else {
        Endian::Little
    }
}
