//! Unity asset bundles: `UnityFS`, `UnityWeb` and `UnityRaw` archives.
//!
//! A bundle is a small archive of files, usually one serialized file (`CAB-<hash>`) and its
//! resource streams (`.resS`). `UnityFS` bundles split their contents into blocks, each one
//! stored raw or compressed with LZMA or LZ4. The older `UnityWeb` bundles compress their whole
//! body with LZMA, while `UnityRaw` bundles are not compressed at all.

use crate::error;
use anyhow::{Context, Result};
use binrw::{BinRead, BinReaderExt, NullString};
use lzma_rs::decompress::{Options as LzmaOptions, UnpackedSize};
use std::{convert::TryFrom, io::Cursor};

/// Signature of the current bundle format.
pub const UNITY_FS: &[u8] = b"UnityFS";
/// Signature of LZMA compressed web bundles.
pub const UNITY_WEB: &[u8] = b"UnityWeb";
/// Signature of uncompressed bundles.
pub const UNITY_RAW: &[u8] = b"UnityRaw";

/// Largest size accepted for the decompressed contents of a bundle.
const MAX_BUNDLE_SIZE: u64 = 1 << 32;
/// Largest number of blocks, nodes or levels accepted.
const MAX_ENTRIES: u32 = 1 << 20;

/// The compression flags are in the lowest 6 bits.
const COMPRESSION_MASK: u32 = 0x3F;
/// The blocks information is at the end of the file.
const BLOCKS_INFO_AT_THE_END: u32 = 0x80;
/// The data blocks start aligned to 16 bytes.
const BLOCK_INFO_NEED_PADDING_AT_START: u32 = 0x200;

/// Common start of every bundle.
#[derive(BinRead, Debug)]
#[br(big)]
struct BundleHeader {
    signature: NullString,
    format_version: u32,
    unity_version: NullString,
    unity_revision: NullString,
}

/// Rest of the header of `UnityFS` bundles.
#[derive(BinRead, Debug)]
#[br(big)]
struct FsHeader {
    size: i64,
    compressed_blocks_info_size: u32,
    uncompressed_blocks_info_size: u32,
    flags: u32,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct StorageBlock {
    uncompressed_size: u32,
    compressed_size: u32,
    flags: u16,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct Node {
    offset: i64,
    size: i64,
    _flags: u32,
    path: NullString,
}

/// Table of blocks and files of `UnityFS` bundles, usually compressed.
#[derive(BinRead, Debug)]
#[br(big)]
struct BlocksInfo {
    _hash: [u8; 16],
    #[br(assert(block_count <= MAX_ENTRIES))]
    block_count: u32,
    #[br(count = block_count as usize)]
    blocks: Vec<StorageBlock>,
    #[br(assert(node_count <= MAX_ENTRIES))]
    node_count: u32,
    #[br(count = node_count as usize)]
    nodes: Vec<Node>,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct LevelSize {
    _compressed: u32,
    _uncompressed: u32,
}

/// Rest of the header of `UnityWeb` and `UnityRaw` bundles.
#[derive(BinRead, Debug)]
#[br(big, import(format_version: u32))]
struct LegacyHeader {
    #[br(if(format_version >= 4))]
    _hash: Option<[u8; 16]>,
    #[br(if(format_version >= 4))]
    _crc: Option<u32>,
    _minimum_streamed_bytes: u32,
    header_size: u32,
    _levels_before_streaming: u32,
    #[br(assert(level_count <= MAX_ENTRIES))]
    level_count: u32,
    #[br(count = level_count as usize)]
    _levels: Vec<LevelSize>,
    #[br(if(format_version >= 2))]
    _complete_file_size: Option<u32>,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct LegacyFile {
    path: NullString,
    offset: u32,
    size: u32,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct LegacyDirectory {
    #[br(assert(file_count <= MAX_ENTRIES))]
    file_count: u32,
    #[br(count = file_count as usize)]
    files: Vec<LegacyFile>,
}

/// Compression used by a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Stored as is.
    None,
    /// LZMA, with the 5 byte properties header and no size.
    Lzma,
    /// LZ4 block.
    Lz4,
    /// LZ4 block, compressed with the high compression mode.
    Lz4Hc,
}

impl Compression {
    /// Gets the compression from the flags of a header or a block.
    pub fn from_flags(flags: u32) -> Result<Self> {
        match flags & COMPRESSION_MASK {
            0 => Ok(Self::None),
            1 => Ok(Self::Lzma),
            2 => Ok(Self::Lz4),
            3 => Ok(Self::Lz4Hc),
            other => Err(error::Kind::UnsupportedContainer {
                message: format!("unknown compression type {}", other),
            }
            .into()),
        }
    }

    /// Decompresses the data, which must expand to `uncompressed_size` bytes.
    pub fn decompress(self, data: &[u8], uncompressed_size: u32) -> Result<Vec<u8>> {
        let decompressed = match self {
            Self::None => data.to_vec(),
            Self::Lzma => {
                let mut output = Vec::with_capacity(uncompressed_size as usize);
                let options = LzmaOptions {
                    unpacked_size: UnpackedSize::UseProvided(Some(u64::from(uncompressed_size))),
                    ..LzmaOptions::default()
                };
                lzma_rs::lzma_decompress_with_options(
                    &mut Cursor::new(data),
                    &mut output,
                    &options,
                )
                .map_err(|e| error::Kind::UnsupportedContainer {
                    message: format!("invalid LZMA data: {:?}", e),
                })?;
                output
            }
            Self::Lz4 | Self::Lz4Hc => {
                let size = i32::try_from(uncompressed_size).map_err(|_| {
                    error::Kind::UnsupportedContainer {
                        message: format!("LZ4 block of {} bytes is too big", uncompressed_size),
                    }
                })?;
                lz4::block::decompress(data, Some(size)).context("invalid LZ4 data")?
            }
        };

        if decompressed.len() != uncompressed_size as usize {
            return Err(error::Kind::UnsupportedContainer {
                message: format!(
                    "block decompressed to {} bytes instead of {}",
                    decompressed.len(),
                    uncompressed_size
                ),
            }
            .into());
        }
        Ok(decompressed)
    }
}

/// File stored in a bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Path of the file inside the bundle.
    pub path: String,
    /// Contents.
    pub data: Vec<u8>,
}

/// Decoded bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Bundle signature.
    pub signature: String,
    /// Version of the bundle format.
    pub format_version: u32,
    /// Unity version that built the bundle.
    pub unity_version: String,
    /// Unity revision that built the bundle.
    pub unity_revision: String,
    /// Files of the bundle.
    pub entries: Vec<BundleEntry>,
}

fn lossy(string: &NullString) -> String {
    String::from_utf8_lossy(&string.0).into_owned()
}

fn truncated(offset: u64, needed: u64) -> error::Kind {
    error::Kind::Truncated { offset, needed }
}

/// Returns `data[start..start + len]`, checking the bounds.
fn slice(data: &[u8], start: u64, len: u64) -> Result<&[u8]> {
    let end = start
        .checked_add(len)
        .filter(|end| *end <= data.len() as u64)
        .ok_or_else(|| truncated(start, len))?;
    Ok(&data[start as usize..end as usize])
}

fn align(position: u64, alignment: u64) -> u64 {
    (position + alignment - 1) / alignment * alignment
}

/// Reads a bundle.
pub fn read(data: &[u8]) -> Result<Bundle> {
    let mut cursor = Cursor::new(data);
    let header: BundleHeader = cursor.read_be().context("invalid bundle header")?;

    let mut bundle = Bundle {
        signature: lossy(&header.signature),
        format_version: header.format_version,
        unity_version: lossy(&header.unity_version),
        unity_revision: lossy(&header.unity_revision),
        entries: Vec::new(),
    };

    bundle.entries = match header.signature.0.as_slice() {
        UNITY_FS => read_fs(data, &mut cursor, header.format_version)?,
        UNITY_WEB | UNITY_RAW => {
            let legacy: LegacyHeader = cursor
                .read_be_args((header.format_version,))
                .context("invalid legacy bundle header")?;
            let compressed = header.signature.0.as_slice() == UNITY_WEB;
            read_legacy(data, &legacy, compressed)?
        }
        _ => {
            return Err(error::Kind::UnsupportedContainer {
                message: format!("unknown bundle signature `{}`", bundle.signature),
            }
            .into());
        }
    };

    Ok(bundle)
}

/// Reads the contents of a `UnityFS` bundle, with the cursor after the common header.
fn read_fs(data: &[u8], cursor: &mut Cursor<&[u8]>, format_version: u32) -> Result<Vec<BundleEntry>> {
    let header: FsHeader = cursor.read_be().context("invalid UnityFS header")?;
    if header.size < 0 || header.size as u64 > data.len() as u64 {
        return Err(truncated(0, header.size.max(0) as u64).into());
    }

    let mut position = cursor.position();
    if format_version >= 7 {
        position = align(position, 16);
    }

    let info_size = u64::from(header.compressed_blocks_info_size);
    let info_bytes = if header.flags & BLOCKS_INFO_AT_THE_END != 0 {
        let start = (data.len() as u64)
            .checked_sub(info_size)
            .ok_or_else(|| truncated(0, info_size))?;
        slice(data, start, info_size)?
    } else {
        let bytes = slice(data, position, info_size)?;
        position += info_size;
        bytes
    };

    let info_data = Compression::from_flags(header.flags)?
        .decompress(info_bytes, header.uncompressed_blocks_info_size)
        .context("could not decompress the blocks information")?;
    let info: BlocksInfo = Cursor::new(info_data.as_slice())
        .read_be()
        .context("invalid blocks information")?;

    if header.flags & BLOCK_INFO_NEED_PADDING_AT_START != 0 {
        position = align(position, 16);
    }

    let total_size: u64 = info
        .blocks
        .iter()
        .map(|b| u64::from(b.uncompressed_size))
        .sum();
    if total_size > MAX_BUNDLE_SIZE {
        return Err(error::Kind::UnsupportedContainer {
            message: format!("bundle contents of {} bytes are too big", total_size),
        }
        .into());
    }

    let mut storage = Vec::with_capacity(total_size as usize);
    for (i, block) in info.blocks.iter().enumerate() {
        let compressed = slice(data, position, u64::from(block.compressed_size))?;
        position += u64::from(block.compressed_size);

        let decompressed = Compression::from_flags(u32::from(block.flags))?
            .decompress(compressed, block.uncompressed_size)
            .with_context(|| format!("could not decompress block {}", i))?;
        storage.extend_from_slice(&decompressed);
    }

    info.nodes
        .iter()
        .map(|node| {
            if node.offset < 0 || node.size < 0 {
                return Err(error::Kind::UnsupportedContainer {
                    message: format!("invalid node `{}`", lossy(&node.path)),
                }
                .into());
            }
            Ok(BundleEntry {
                path: lossy(&node.path),
                data: slice(&storage, node.offset as u64, node.size as u64)?.to_vec(),
            })
        })
        .collect()
}

/// Reads the contents of a `UnityWeb` or `UnityRaw` bundle.
fn read_legacy(data: &[u8], header: &LegacyHeader, compressed: bool) -> Result<Vec<BundleEntry>> {
    let header_size = u64::from(header.header_size);
    let body = slice(data, header_size, data.len() as u64 - header_size.min(data.len() as u64))?;

    let body = if compressed {
        let mut output = Vec::new();
        lzma_rs::lzma_decompress(&mut Cursor::new(body), &mut output).map_err(|e| {
            error::Kind::UnsupportedContainer {
                message: format!("invalid LZMA data: {:?}", e),
            }
        })?;
        output
    } else {
        body.to_vec()
    };

    let directory: LegacyDirectory = Cursor::new(body.as_slice())
        .read_be()
        .context("invalid bundle directory")?;

    directory
        .files
        .iter()
        .map(|file| {
            Ok(BundleEntry {
                path: lossy(&file.path),
                data: slice(&body, u64::from(file.offset), u64::from(file.size))?.to_vec(),
            })
        })
        .collect()
}
