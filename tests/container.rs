use binary_reader::{BinaryReader, Endian};

use libreshockwave::director::chunks::config::{unprotect_config_body, ConfigChunk};
use libreshockwave::director::file::{
    read_container_map, unprotect_movie, write_plain_container,
};
use libreshockwave::director::utils::{fourcc_to_string, FOURCC};
use libreshockwave::io::reader::ReaderExt;
use libreshockwave::io::writer::BinaryWriter;
use libreshockwave::io::DecodeError;

fn reader_for(bytes: &[u8]) -> BinaryReader {
    let mut reader = BinaryReader::from_u8(bytes);
    reader.set_endian(Endian::Big);
    reader
}

#[test]
fn var_int_reads_msb_first_groups() {
    assert_eq!(reader_for(&[0x00]).read_var_int().unwrap(), 0);
    assert_eq!(reader_for(&[0x7F]).read_var_int().unwrap(), 127);
    assert_eq!(reader_for(&[0x81, 0x00]).read_var_int().unwrap(), 128);
    assert_eq!(reader_for(&[0x81, 0x80, 0x00]).read_var_int().unwrap(), 16384);
}

#[test]
fn var_int_longer_than_five_bytes_is_rejected() {
    let result = reader_for(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]).read_var_int();
    assert!(matches!(result, Err(DecodeError::BadVarInt)));
}

fn encode_var_int(mut value: u32) -> Vec<u8> {
    let mut groups = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value != 0 {
        groups.push(((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    groups.reverse();
    groups
}

#[test]
fn var_int_round_trips_across_the_range() {
    for value in [0u32, 1, 127, 128, 16383, 16384, 0xFFFFF, (1 << 28) - 1] {
        let encoded = encode_var_int(value);
        let decoded = reader_for(&encoded).read_var_int().unwrap();
        assert_eq!(decoded as u32, value, "value {value}");
    }
}

#[test]
fn plain_big_endian_container_smoke_test() {
    let bytes = write_plain_container(Endian::Big, FOURCC("MV93"), &[(FOURCC("free"), vec![0; 4])]);

    // Spec'd 12-byte header: RIFX, length, MV93.
    assert_eq!(&bytes[0..4], b"RIFX");
    assert_eq!(&bytes[8..12], b"MV93");

    let map = read_container_map(&bytes).unwrap();
    assert!(matches!(map.endian, Endian::Big));
    assert_eq!(map.codec, FOURCC("MV93"));
    assert!(!map.after_burned);

    // RIFX + imap + mmap + free: four chunks enumerated.
    assert_eq!(map.entries.len(), 4);
    assert_eq!(fourcc_to_string(map.entries[0].fourcc), "RIFX");
    assert_eq!(fourcc_to_string(map.entries[1].fourcc), "imap");
    assert_eq!(fourcc_to_string(map.entries[2].fourcc), "mmap");
    assert_eq!(fourcc_to_string(map.entries[3].fourcc), "free");

    // Offsets point at real chunk headers.
    for entry in &map.entries[1..] {
        let fourcc_on_disk = &bytes[entry.offset..entry.offset + 4];
        assert_eq!(fourcc_to_string(entry.fourcc).as_bytes(), fourcc_on_disk);
    }
}

#[test]
fn little_endian_containers_reverse_fourccs_on_disk() {
    let bytes = write_plain_container(Endian::Little, FOURCC("MV93"), &[(FOURCC("free"), vec![0; 2])]);
    assert_eq!(&bytes[0..4], b"XFIR");
    assert_eq!(&bytes[8..12], b"39VM");

    // Reading recovers the logical values.
    let map = read_container_map(&bytes).unwrap();
    assert!(matches!(map.endian, Endian::Little));
    assert_eq!(map.codec, FOURCC("MV93"));
    assert_eq!(fourcc_to_string(map.entries[3].fourcc), "free");
}

#[test]
fn bad_magic_is_rejected() {
    let result = read_container_map(b"NOPExxxxMV93");
    assert!(matches!(result, Err(DecodeError::BadMagic(_))));
}

/// A minimal pre-Director-7 config body (68 bytes, no remnants).
fn make_config_body(file_version: u16, director_version: u16, protection: u16) -> Vec<u8> {
    let mut writer = BinaryWriter::new(Endian::Big);
    writer.write_u16(68); // len
    writer.write_u16(file_version);
    writer.write_u16(10); // movie_top
    writer.write_u16(20); // movie_left
    writer.write_u16(250); // movie_bottom
    writer.write_u16(340); // movie_right
    writer.write_u16(1); // min_member
    writer.write_u16(12); // max_member
    writer.write_u8(0); // field9
    writer.write_u8(0); // field10
    writer.write_u16(0); // pre-D7 field11
    writer.write_u16(0); // comment_font
    writer.write_u16(12); // comment_size
    writer.write_u16(0); // comment_style
    writer.write_u16(255); // pre-D7 stage color
    writer.write_u16(8); // bit_depth
    writer.write_u8(0); // field17
    writer.write_u8(0); // field18
    writer.write_u32(0); // field19
    writer.write_u16(director_version);
    writer.write_u16(0); // field21
    writer.write_u32(0); // field22
    writer.write_u32(0); // field23
    writer.write_u32(0); // field24
    writer.write_u8(0); // field25
    writer.write_u8(0); // field26
    writer.write_u16(30); // frame_rate
    writer.write_u16(1); // platform
    writer.write_u16(protection);
    writer.write_u32(0); // field29
    writer.write_u32(0); // checksum placeholder
    writer.into_bytes()
}

#[test]
fn unprotect_rewrites_version_and_protection() {
    let body = make_config_body(0, 1200, 46);
    let unprotected = unprotect_config_body(&body, Endian::Big).unwrap();
    assert_eq!(unprotected.len(), body.len());

    let mut reader = BinaryReader::from_vec(&unprotected);
    let config = ConfigChunk::from_reader(&mut reader, Endian::Big).unwrap();
    assert_eq!(config.file_version, 1200);
    assert_eq!(config.protection, 47);
    assert_eq!(config.checksum, config.compute_checksum(Endian::Big));
}

#[test]
fn unprotect_is_idempotent() {
    let body = make_config_body(0, 1200, 46);
    let once = unprotect_config_body(&body, Endian::Big).unwrap();
    let twice = unprotect_config_body(&once, Endian::Big).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn unprotect_movie_rewrites_the_config_in_place() {
    let body = make_config_body(0, 1200, 23);
    let container = write_plain_container(Endian::Big, FOURCC("MV93"), &[(FOURCC("DRCF"), body)]);
    let once = unprotect_movie(&container).unwrap();
    let twice = unprotect_movie(&once).unwrap();
    assert_eq!(once, twice);
    assert_ne!(once, container);

    // Everything outside the config body is untouched.
    assert_eq!(once.len(), container.len());
    assert_eq!(&once[..12], &container[..12]);
}

#[test]
fn zlib_round_trip_respects_the_allocation_bound() {
    use std::io::Write;

    let payload = vec![7u8; 4096];
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&payload).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut reader = reader_for(&compressed);
    let inflated = reader.read_zlib_bytes(compressed.len()).unwrap();
    assert_eq!(inflated, payload);

    let mut reader = reader_for(&compressed);
    let result = reader.read_zlib_bytes_capped(compressed.len(), 1024);
    assert!(matches!(result, Err(DecodeError::CorruptCompression(_))));
}

#[test]
fn apple_extended_floats_decode() {
    // 1.0 in SANE extended: exponent 0x3FFF, mantissa MSB set.
    let bytes = [0x3F, 0xFF, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let mut reader = reader_for(&bytes);
    let value = reader.read_apple_float_80().unwrap();
    assert!((value - 1.0).abs() < 1e-12);
}
