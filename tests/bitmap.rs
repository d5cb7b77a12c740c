use libreshockwave::player::bitmap::palette::{BuiltInPalette, PaletteRef};
use libreshockwave::player::bitmap::{decode_bitmap, rle_expand};

#[test]
fn rle_literal_runs_copy_count_plus_one() {
    // [2, a, b, c] copies three bytes.
    let out = rle_expand(&[0x02, 0xAA, 0xBB, 0xCC], 3);
    assert_eq!(out, vec![0xAA, 0xBB, 0xCC]);
}

#[test]
fn rle_repeat_runs_emit_257_minus_control() {
    // [0xFE, v] emits three copies of v.
    let out = rle_expand(&[0xFE, 0x42], 3);
    assert_eq!(out, vec![0x42, 0x42, 0x42]);
}

#[test]
fn rle_0x80_is_a_no_op() {
    let out = rle_expand(&[0x80, 0x00, 0x55], 1);
    assert_eq!(out, vec![0x55]);
}

#[test]
fn rle_expansion_is_clamped_to_the_expected_length() {
    let out = rle_expand(&[0xF0, 0x11], 4);
    assert_eq!(out.len(), 4);
    assert!(out.iter().all(|&b| b == 0x11));
}

#[test]
fn one_bit_rows_are_padded_to_the_alignment() {
    // 6 pixels wide at 1 bpp, alignment 4 -> 8-pixel scanlines, one
    // byte per row. Two rows: 0b10101000, 0b01010100.
    let data = [0b1010_1000u8, 0b0101_0100u8];
    let image = decode_bitmap(
        &data,
        6,
        2,
        1,
        PaletteRef::BuiltIn(BuiltInPalette::GrayScale),
        500,
        None,
    )
    .unwrap();
    assert_eq!(image.width, 6);
    assert_eq!(image.height, 2);
    assert_eq!(image.data.len(), 12);
    assert_eq!(&image.data[..6], &[1, 0, 1, 0, 1, 0]);
    assert_eq!(&image.data[6..], &[0, 1, 0, 1, 0, 1]);
}

#[test]
fn four_bit_pixels_widen_to_indices() {
    // 2 pixels wide at 4 bpp: one byte 0xAB -> indices 10, 11.
    let data = [0xABu8];
    let image = decode_bitmap(
        &data,
        2,
        1,
        4,
        PaletteRef::BuiltIn(BuiltInPalette::GrayScale),
        500,
        None,
    )
    .unwrap();
    assert_eq!(image.data, vec![0x0A, 0x0B]);
}

#[test]
fn eight_bit_scanline_padding_is_trimmed() {
    // Width 3 at 8 bpp, alignment 2 -> scan width 4. Rows carry one pad
    // byte that must not reach the output.
    let data = [1u8, 2, 3, 99, 4, 5, 6, 99];
    let image = decode_bitmap(
        &data,
        3,
        2,
        8,
        PaletteRef::BuiltIn(BuiltInPalette::GrayScale),
        500,
        None,
    )
    .unwrap();
    assert_eq!(image.data, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn uncompressed_sixteen_bit_pixels_stay_interleaved() {
    // One scanline, two pixels, full-size input: no RLE, no planes.
    let raw = [0x7C, 0x00, 0x03, 0xE0];
    let image = decode_bitmap(
        &raw,
        2,
        1,
        16,
        PaletteRef::BuiltIn(BuiltInPalette::GrayScale),
        500,
        None,
    )
    .unwrap();
    assert_eq!(image.data, vec![0x7C, 0x00, 0x03, 0xE0]);
}

#[test]
fn compressed_thirty_two_bit_scanlines_are_planar_argb() {
    // One scanline, four pixels wide. Each plane is a uniform run, so
    // the RLE form is shorter than the raw 16 bytes and the decoder
    // takes the compressed (planar) path: A A A A R R R R G G G G B B
    // B B.
    let rle = [0xFD, 0x10, 0xFD, 0x20, 0xFD, 0x30, 0xFD, 0x40];
    let image = decode_bitmap(
        &rle,
        4,
        1,
        32,
        PaletteRef::BuiltIn(BuiltInPalette::GrayScale),
        500,
        None,
    )
    .unwrap();
    // Every pixel interleaves to the same ARGB tuple.
    for pixel in image.data.chunks_exact(4) {
        assert_eq!(pixel, &[0x10, 0x20, 0x30, 0x40]);
    }
}

#[test]
fn palette_ids_map_to_builtins() {
    assert_eq!(BuiltInPalette::from_id(-1), Some(BuiltInPalette::SystemMac));
    assert_eq!(BuiltInPalette::from_id(-3), Some(BuiltInPalette::GrayScale));
    assert_eq!(BuiltInPalette::from_id(-101), Some(BuiltInPalette::SystemWin));
    assert_eq!(BuiltInPalette::from_id(5), None);
    assert!(matches!(
        PaletteRef::from_id(2, 1),
        PaletteRef::Member(_)
    ));
}
