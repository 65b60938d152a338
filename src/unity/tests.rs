//! Tests for the Unity container reader.

use super::{
    bundle::{self, Compression},
    class_id, detect, find_containers, process_containers, read_container,
    serialized::SerializedFile,
    ContainerKind,
};
use crate::{category::Category, layout::OutputLayout, Config};
use std::{fs, io::Cursor, path::Path};

/// Byte writer for the fixtures.
struct Writer {
    buf: Vec<u8>,
    big_endian: bool,
}

impl Writer {
    fn new(big_endian: bool) -> Self {
        Self {
            buf: Vec::new(),
            big_endian,
        }
    }

    fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes(&[value])
    }

    fn u16(&mut self, value: u16) -> &mut Self {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.bytes(&bytes)
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.bytes(&bytes)
    }

    fn i32(&mut self, value: i32) -> &mut Self {
        self.u32(value as u32)
    }

    fn i64(&mut self, value: i64) -> &mut Self {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.bytes(&bytes)
    }

    fn cstring(&mut self, value: &str) -> &mut Self {
        self.bytes(value.as_bytes()).u8(0)
    }

    fn align(&mut self, alignment: usize) -> &mut Self {
        while self.buf.len() % alignment != 0 {
            let _ = self.u8(0);
        }
        self
    }

    fn aligned_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.i32(value.len() as i32).bytes(value).align(4)
    }

    fn aligned_string(&mut self, value: &str) -> &mut Self {
        self.aligned_bytes(value.as_bytes())
    }
}

const TRANSFORM: i32 = 4;
const TEXTURE_2D: i32 = 28;

/// Writes a reference to an object, with 32 bit identifiers before version 14.
fn pptr(writer: &mut Writer, version: u32, file_id: i32, path_id: i64) {
    let _ = writer.i32(file_id);
    if version >= 14 {
        let _ = writer.i64(path_id);
    } else {
        let _ = writer.i32(path_id as i32);
    }
}

/// Object data of the test serialized files, in their version and endianness.
fn objects(version: u32, big_endian: bool) -> Vec<(i64, i32, Vec<u8>)> {
    let mut game_object = Writer::new(big_endian);
    let _ = game_object.i32(1);
    if version < 17 {
        let _ = game_object.i32(TRANSFORM);
    }
    pptr(&mut game_object, version, 0, 3);
    let _ = game_object.u32(5).aligned_string("Player");

    let mut text_asset = Writer::new(big_endian);
    let _ = text_asset
        .aligned_string("readme")
        .aligned_bytes(b"hello unity");

    let mut texture = Writer::new(big_endian);
    let _ = texture.aligned_string("skin").i32(256).i32(256);

    let mut mono_behaviour = Writer::new(big_endian);
    pptr(&mut mono_behaviour, version, 0, 1);
    let _ = mono_behaviour.u8(1).align(4);
    pptr(&mut mono_behaviour, version, 1, 77);
    let _ = mono_behaviour.aligned_string("PlayerController").i32(3);

    vec![
        (1, class_id::GAME_OBJECT, game_object.buf),
        (2, class_id::TEXT_ASSET, text_asset.buf),
        (3, TRANSFORM, vec![0; 8]),
        (4, TEXTURE_2D, texture.buf),
        (5, class_id::MONO_BEHAVIOUR, mono_behaviour.buf),
    ]
}

/// Builds a serialized file of the given version, from 13 on.
fn serialized_file(version: u32, big_endian: bool) -> Vec<u8> {
    serialized_file_with_ids(version, big_endian, false)
}

/// Builds a serialized file, with 64 bit object identifiers in the table of versions before 14
/// if `big_ids` is set.
fn serialized_file_with_ids(version: u32, big_endian: bool, big_ids: bool) -> Vec<u8> {
    let objects = objects(version, big_endian);
    let classes = [
        class_id::GAME_OBJECT,
        class_id::TEXT_ASSET,
        TRANSFORM,
        TEXTURE_2D,
        class_id::MONO_BEHAVIOUR,
    ];
    let header_len = if version >= 22 { 48 } else { 20 };

    // Metadata, with its offsets relative to the start of the file.
    let mut metadata = Writer::new(big_endian);
    let _ = metadata.bytes(&vec![0; header_len]);
    let _ = metadata.cstring("2021.3.0f1").i32(13);
    if version >= 13 {
        let _ = metadata.u8(0);
    }
    let _ = metadata.i32(classes.len() as i32);
    for class in &classes {
        let _ = metadata.i32(*class);
        if version >= 16 {
            let _ = metadata.u8(0);
        }
        if version >= 17 {
            let _ = metadata.u16(0xFFFF);
        }
        if version >= 16 && *class == class_id::MONO_BEHAVIOUR {
            let _ = metadata.bytes(&[0; 16]);
        }
        let _ = metadata.bytes(&[0; 16]);
    }
    if version < 14 {
        let _ = metadata.i32(big_ids as i32);
    }
    let _ = metadata.i32(objects.len() as i32);

    let mut data = Vec::new();
    let mut table = Vec::new();
    for (path_id, class, bytes) in &objects {
        while data.len() % 8 != 0 {
            data.push(0);
        }
        let type_id = classes.iter().position(|c| c == class).unwrap() as i32;
        table.push((*path_id, *class, data.len(), bytes.len(), type_id));
        data.extend_from_slice(bytes);
    }
    for (path_id, class, start, size, type_id) in table {
        if version >= 14 {
            let _ = metadata.align(4).i64(path_id);
        } else if big_ids {
            let _ = metadata.i64(path_id);
        } else {
            let _ = metadata.i32(path_id as i32);
        }
        if version >= 22 {
            let _ = metadata.i64(start as i64);
        } else {
            let _ = metadata.u32(start as u32);
        }
        let _ = metadata.u32(size as u32);
        if version >= 16 {
            let _ = metadata.i32(type_id);
        } else {
            let _ = metadata.i32(class).u16(class as u16);
        }
        if version < 17 {
            let _ = metadata.u16(0xFFFF);
        }
        if version == 15 || version == 16 {
            let _ = metadata.u8(0);
        }
    }
    let _ = metadata.align(16);

    let data_offset = metadata.buf.len();
    let metadata_size = data_offset - header_len;
    let file_size = data_offset + data.len();

    let mut header = Writer::new(true);
    if version >= 22 {
        let _ = header
            .u32(0)
            .u32(0)
            .u32(version)
            .u32(0)
            .u8(big_endian as u8)
            .bytes(&[0; 3])
            .u32(metadata_size as u32)
            .i64(file_size as i64)
            .i64(data_offset as i64)
            .i64(0);
    } else {
        let _ = header
            .u32(metadata_size as u32)
            .u32(file_size as u32)
            .u32(version)
            .u32(data_offset as u32)
            .u8(big_endian as u8)
            .bytes(&[0; 3]);
    }

    let mut file = metadata.buf;
    file[..header_len].copy_from_slice(&header.buf);
    file.extend_from_slice(&data);
    file
}

/// Compresses a `UnityFS` block or blocks information, returning it with its flags.
fn compress_block(data: &[u8], compression: Compression) -> (Vec<u8>, u16) {
    match compression {
        Compression::None => (data.to_vec(), 0),
        Compression::Lzma => {
            // Raw LZMA: the 5 properties bytes, without the size.
            let options = lzma_rs::compress::Options {
                unpacked_size: lzma_rs::compress::UnpackedSize::SkipWritingToHeader,
            };
            let mut compressed = Vec::new();
            lzma_rs::lzma_compress_with_options(&mut Cursor::new(data), &mut compressed, &options)
                .unwrap();
            (compressed, 1)
        }
        Compression::Lz4 => (lz4::block::compress(data, None, false).unwrap(), 2),
        Compression::Lz4Hc => (lz4::block::compress(data, None, false).unwrap(), 3),
    }
}

/// Builds a `UnityFS` bundle with the given files in a single block.
///
/// `flags` are added to the compression flags of the header.
fn unity_fs(
    format: u32,
    files: &[(&str, &[u8])],
    compression: Compression,
    flags: u32,
) -> Vec<u8> {
    let mut storage = Vec::new();
    let mut nodes = Vec::new();
    for (path, data) in files {
        nodes.push((*path, storage.len(), data.len()));
        storage.extend_from_slice(data);
    }

    let (block, block_flags) = compress_block(&storage, compression);

    let mut info = Writer::new(true);
    let _ = info
        .bytes(&[0; 16])
        .u32(1)
        .u32(storage.len() as u32)
        .u32(block.len() as u32)
        .u16(block_flags)
        .u32(nodes.len() as u32);
    for (path, offset, size) in &nodes {
        let _ = info.i64(*offset as i64).i64(*size as i64).u32(4).cstring(path);
    }
    let (compressed_info, info_flags) = compress_block(&info.buf, compression);

    let mut bundle = Writer::new(true);
    let _ = bundle
        .cstring("UnityFS")
        .u32(format)
        .cstring("5.x.x")
        .cstring("2021.3.0f1");
    let size_position = bundle.buf.len();
    let _ = bundle
        .i64(0)
        .u32(compressed_info.len() as u32)
        .u32(info.buf.len() as u32)
        .u32(u32::from(info_flags) | flags);
    if format >= 7 {
        let _ = bundle.align(16);
    }
    if flags & INFO_AT_END == 0 {
        let _ = bundle.bytes(&compressed_info);
    }
    if flags & PADDING_AT_START != 0 {
        let _ = bundle.align(16);
    }
    let _ = bundle.bytes(&block);
    if flags & INFO_AT_END != 0 {
        let _ = bundle.bytes(&compressed_info);
    }

    let size = (bundle.buf.len() as i64).to_be_bytes();
    bundle.buf[size_position..size_position + 8].copy_from_slice(&size);
    bundle.buf
}

const INFO_AT_END: u32 = 0x80;
const PADDING_AT_START: u32 = 0x200;

/// Builds a `UnityWeb` (LZMA compressed) or `UnityRaw` bundle with the given files.
fn legacy_bundle(signature: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let directory_len: usize = 4 + files.iter().map(|(p, _)| p.len() + 1 + 8).sum::<usize>();
    let mut body = Writer::new(true);
    let _ = body.u32(files.len() as u32);
    let mut offset = directory_len;
    for (path, data) in files {
        let _ = body.cstring(path).u32(offset as u32).u32(data.len() as u32);
        offset += data.len();
    }
    for (_, data) in files {
        let _ = body.bytes(data);
    }

    let stored = if signature == "UnityWeb" {
        let mut compressed = Vec::new();
        lzma_rs::lzma_compress(&mut Cursor::new(body.buf.as_slice()), &mut compressed).unwrap();
        compressed
    } else {
        body.buf.clone()
    };

    let mut header = Writer::new(true);
    let _ = header
        .cstring(signature)
        .u32(3)
        .cstring("3.x.x")
        .cstring("5.6.7f1");
    // Header size, levels and complete file size.
    let header_size = header.buf.len() + 4 * 7;
    let _ = header
        .u32(0)
        .u32(header_size as u32)
        .u32(1)
        .u32(1)
        .u32(stored.len() as u32)
        .u32(body.buf.len() as u32)
        .u32((header_size + stored.len()) as u32)
        .bytes(&stored);
    header.buf
}

#[test]
fn it_detect() {
    let bundle = unity_fs(6, &[("CAB-1", b"data")], Compression::None, 0);
    let file = serialized_file(22, false);

    assert_eq!(detect(&bundle, bundle.len() as u64), Some(ContainerKind::UnityFS));
    assert_eq!(detect(b"UnityWeb\0\0\0\0\x03", 100), Some(ContainerKind::UnityWeb));
    assert_eq!(detect(b"UnityRaw\0\0\0\0\x03", 100), Some(ContainerKind::UnityRaw));
    assert_eq!(
        detect(&file[..64], file.len() as u64),
        Some(ContainerKind::SerializedFile)
    );

    // Declared size differs from the real one.
    assert_eq!(detect(&file[..64], file.len() as u64 + 1), None);
    assert_eq!(detect(b"UnityFSX", 100), None);
    assert_eq!(detect(b"PK\x03\x04", 4), None);
    assert_eq!(detect(&[], 0), None);
}

/// Checks the objects of a file built by `serialized_file`.
fn assert_objects(file: &SerializedFile<'_>) {
    assert_eq!(file.unity_version, "2021.3.0f1");
    assert_eq!(file.target_platform, 13);

    let ids: Vec<_> = file.objects.iter().map(|o| o.path_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    let classes: Vec<_> = file.objects.iter().map(|o| o.class_id).collect();
    assert_eq!(
        classes,
        vec![
            class_id::GAME_OBJECT,
            class_id::TEXT_ASSET,
            TRANSFORM,
            TEXTURE_2D,
            class_id::MONO_BEHAVIOUR,
        ]
    );

    let names: Vec<_> = file
        .objects
        .iter()
        .map(|o| file.object_name(o).unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            Some(String::from("Player")),
            Some(String::from("readme")),
            None,
            Some(String::from("skin")),
            Some(String::from("PlayerController")),
        ]
    );

    let text = file.text_asset(&file.objects[1]).unwrap();
    assert_eq!(text.name, "readme");
    assert_eq!(text.script, b"hello unity");

    let game_object = file.game_object(&file.objects[0]).unwrap();
    assert_eq!(game_object.layer, 5);
    assert_eq!(game_object.components.len(), 1);
    assert_eq!(game_object.components[0].file_id, 0);
    assert_eq!(game_object.components[0].path_id, 3);
    assert_eq!(file.object(3).map(|o| o.class_id), Some(TRANSFORM));
}

#[test]
fn it_parse_serialized_file() {
    let data = serialized_file(22, false);
    let file = SerializedFile::parse(&data).unwrap();

    assert_eq!(file.version(), 22);
    assert_objects(&file);
}

#[test]
fn it_parse_serialized_file_big_endian() {
    let data = serialized_file(17, true);
    let file = SerializedFile::parse(&data).unwrap();

    assert_eq!(file.version(), 17);
    assert_objects(&file);
}

#[test]
fn it_parse_serialized_file_old_versions() {
    // 16 reads the class from the type table, 15 and 14 from the object table, and 13 also
    // uses 32 bit identifiers.
    let versions = [(16, false), (15, true), (14, false), (13, false), (13, true)];
    for &(version, big_endian) in &versions {
        let data = serialized_file(version, big_endian);
        let file = SerializedFile::parse(&data)
            .unwrap_or_else(|e| panic!("version {}: {:#}", version, e));

        assert_eq!(file.version(), version);
        assert_objects(&file);
    }
}

#[test]
fn it_parse_serialized_file_big_ids() {
    let data = serialized_file_with_ids(13, false, true);
    let file = SerializedFile::parse(&data).unwrap();

    assert_objects(&file);

    // Read with 32 bit identifiers, the table would be misaligned.
    let mut narrow = data.clone();
    let flag = narrow
        .windows(8)
        .position(|w| w == [1, 0, 0, 0, 5, 0, 0, 0])
        .unwrap();
    narrow[flag] = 0;
    let misread = SerializedFile::parse(&narrow).map(|f| {
        f.objects.iter().map(|o| o.path_id).collect::<Vec<_>>()
    });
    assert!(misread.map_or(true, |ids| ids != vec![1, 2, 3, 4, 5]));
}

#[test]
fn it_parse_serialized_file_unsupported_version() {
    for &version in &[8, 11] {
        let mut data = serialized_file(13, false);
        data[8..12].copy_from_slice(&(version as u32).to_be_bytes());
        assert!(SerializedFile::parse(&data).is_err());
    }
}

#[test]
fn it_parse_serialized_file_truncated() {
    let data = serialized_file(22, false);

    assert!(SerializedFile::parse(&data[..60]).is_err());
    assert!(SerializedFile::parse(&[]).is_err());
}

#[test]
fn it_read_bundle() {
    let file = serialized_file(22, false);
    let files: &[(&str, &[u8])] = &[("CAB-1234", &file), ("CAB-1234.resS", b"stream")];

    let layouts = [
        (6, Compression::None, 0),
        (7, Compression::Lz4, 0),
        (7, Compression::Lz4Hc, INFO_AT_END),
        (6, Compression::Lzma, 0),
        (7, Compression::Lzma, INFO_AT_END),
        (7, Compression::None, PADDING_AT_START),
        (6, Compression::Lz4, PADDING_AT_START | INFO_AT_END),
    ];
    for &(format, compression, flags) in &layouts {
        let data = unity_fs(format, files, compression, flags);
        let bundle = bundle::read(&data)
            .unwrap_or_else(|e| panic!("{:?} with flags {:#x}: {:#}", compression, flags, e));

        assert_eq!(bundle.signature, "UnityFS");
        assert_eq!(bundle.format_version, format);
        assert_eq!(bundle.unity_revision, "2021.3.0f1");
        assert_eq!(bundle.entries.len(), 2);
        assert_eq!(bundle.entries[0].path, "CAB-1234");
        assert_eq!(bundle.entries[0].data, file);
        assert_eq!(bundle.entries[1].data, b"stream");
    }
}

#[test]
fn it_read_bundle_padding_at_start() {
    let file = serialized_file(22, false);
    let data = unity_fs(6, &[("CAB-1", &file)], Compression::None, PADDING_AT_START);

    // Without the flag, the padding would be read as the start of the block.
    let mut unpadded = data.clone();
    let flags_position = "UnityFS\0".len() + 4 + "5.x.x\0".len() + "2021.3.0f1\0".len() + 16;
    unpadded[flags_position..flags_position + 4].copy_from_slice(&0_u32.to_be_bytes());

    assert_eq!(bundle::read(&data).unwrap().entries[0].data, file);
    assert!(bundle::read(&unpadded).map_or(true, |b| b.entries[0].data != file));
}

#[test]
fn it_read_bundle_legacy() {
    let file = serialized_file(17, true);
    let files: &[(&str, &[u8])] = &[("CAB-web", &file), ("readme.txt", b"text")];

    for signature in &["UnityWeb", "UnityRaw"] {
        let data = legacy_bundle(signature, files);
        let bundle = bundle::read(&data).unwrap();

        assert_eq!(bundle.signature, *signature);
        assert_eq!(bundle.format_version, 3);
        assert_eq!(bundle.unity_revision, "5.6.7f1");
        assert_eq!(bundle.entries.len(), 2);
        assert_eq!(bundle.entries[0].data, file);
        assert_eq!(bundle.entries[1].path, "readme.txt");
        assert_eq!(bundle.entries[1].data, b"text");
    }
}

#[test]
fn it_read_bundle_corrupted() {
    let file = serialized_file(22, false);
    let mut data = unity_fs(7, &[("CAB-1", &file)], Compression::Lz4, 0);
    let len = data.len();
    data.truncate(len - 10);

    assert!(bundle::read(&data).is_err());
    assert!(bundle::read(b"UnityFS\0").is_err());
    assert!(bundle::read(b"Unknown\0\0\0\0\x06").is_err());
}

#[test]
fn it_read_container() {
    let dir = tempfile::tempdir().unwrap();
    let file = serialized_file(22, false);
    let data = unity_fs(
        6,
        &[("CAB-1", &file), ("CAB-1.resS", b"stream")],
        Compression::None,
        0,
    );

    let info = read_container(&data, ContainerKind::UnityFS, dir.path()).unwrap();

    assert_eq!(info.unity_version, "2021.3.0f1");
    assert_eq!(info.objects_count, 5);
    assert_eq!(info.files.len(), 2);
    assert!(info.files[0].serialized);
    assert!(!info.files[1].serialized);

    let exported: Vec<_> = info.objects.iter().map(|o| o.exported).collect();
    assert_eq!(exported, vec![false, true, false, false, false]);
    assert_eq!(info.objects[2].type_name, "Transform");
    assert_eq!(info.objects[3].type_name, "Texture2D");
    assert_eq!(info.objects[4].type_name, "MonoBehaviour");
    assert_eq!(info.objects[4].name, "PlayerController");

    assert_eq!(
        fs::read_to_string(dir.path().join("readme.txt")).unwrap(),
        "hello unity"
    );
    let game_object: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("Player_info.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(game_object["name"], "Player");
    assert_eq!(game_object["components"][0]["type"], "Transform");
}

#[test]
fn it_read_container_raw_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let file = serialized_file(15, false);
    let data = legacy_bundle("UnityRaw", &[("CAB-raw", &file)]);

    let info = read_container(&data, ContainerKind::UnityRaw, dir.path()).unwrap();

    assert_eq!(info.unity_version, "5.6.7f1");
    assert_eq!(info.objects_count, 5);
    assert!(dir.path().join("readme.txt").is_file());
}

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn it_process_containers() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path().join("out"));
    layout.create().unwrap();
    let temp = layout.temp();

    let file = serialized_file(22, false);
    write(
        &temp.join("assets/bin/Data/data.unity3d"),
        &unity_fs(7, &[("CAB-1", &file)], Compression::Lz4, 0),
    );
    write(&temp.join("assets/bin/Data/level0"), &serialized_file(17, true));
    write(&temp.join("assets/bin/Data/Managed/Game.dll"), b"MZ");
    write(&temp.join("assets/fake.bundle"), b"not a bundle");
    write(&temp.join("res/raw/notes.txt"), b"notes");

    let candidates = find_containers(&temp);
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[2].kind, None);

    let summaries = process_containers(&layout, &Config::default());

    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[0].path, "assets/bin/Data/data.unity3d");
    assert_eq!(summaries[0].kind, Some(ContainerKind::UnityFS));
    assert_eq!(summaries[0].objects, 5);
    assert_eq!(summaries[0].exported, 1);
    assert_eq!(
        summaries[0].info_file.as_deref().map(Path::new),
        Some(Path::new("unity_assets/assets/bin/Data/data.unity3d_info.json"))
    );
    assert_eq!(summaries[1].path, "assets/bin/Data/level0");
    assert_eq!(summaries[1].kind, Some(ContainerKind::SerializedFile));
    assert!(summaries[1].error.is_none());
    assert_eq!(summaries[2].path, "assets/fake.bundle");
    assert!(summaries[2].error.is_some());
    assert!(summaries[2].info_file.is_none());

    let unity_assets = layout.category(Category::UnityAssets);
    let info: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(unity_assets.join("assets/bin/Data/data.unity3d_info.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(info["name"], "data.unity3d");
    assert_eq!(info["path"], "assets/bin/Data/data.unity3d");
    assert_eq!(info["objects_count"], 5);
    assert_eq!(info["objects"][1]["type"], "TextAsset");
    assert_eq!(info["objects"][1]["exported"], true);
    assert!(unity_assets.join("assets/bin/Data/level0_info.json").is_file());
    assert!(unity_assets.join("assets/bin/Data/data.unity3d/readme.txt").is_file());
    assert!(unity_assets.join("assets/bin/Data/level0/readme.txt").is_file());
    assert!(!unity_assets.join("assets/fake.bundle_info.json").exists());
}

#[test]
fn it_process_containers_separate_exports() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path().join("out"));
    layout.create().unwrap();
    let temp = layout.temp();

    // Same stem, and a GameObject called like the container.
    let file = serialized_file(22, false);
    write(
        &temp.join("assets/Player.bundle"),
        &unity_fs(6, &[("CAB-1", &file)], Compression::None, 0),
    );
    write(
        &temp.join("assets/Player.unity3d"),
        &unity_fs(6, &[("CAB-2", &file)], Compression::None, 0),
    );

    let summaries = process_containers(&layout, &Config::default());
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.error.is_none()));

    let assets = layout.category(Category::UnityAssets).join("assets");
    for container in &["Player.bundle", "Player.unity3d"] {
        let info: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(assets.join(format!("{}_info.json", container))).unwrap(),
        )
        .unwrap();
        assert_eq!(info["name"], *container);
        assert_eq!(info["objects_count"], 5);

        let game_object: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(assets.join(container).join("Player_info.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(game_object["name"], "Player");
    }
}
