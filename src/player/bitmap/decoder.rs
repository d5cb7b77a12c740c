use log::warn;

use super::palette::PaletteRef;

/// A decoded bitmap: one byte per pixel up to 8 bpp (palette indices),
/// two bytes per pixel at 16 bpp (RGB555, big-endian), four at 32 bpp
/// (ARGB).
pub struct BitmapImage {
    pub width: u16,
    pub height: u16,
    pub bit_depth: u8,
    pub palette_ref: PaletteRef,
    pub data: Vec<u8>,
}

/// PackBits expansion. A literal run `[n, b0..bn]` with `n < 0x80` copies
/// `n + 1` bytes; a repeat run `[c, b]` with `c > 0x80` emits `257 - c`
/// copies of `b`; `0x80` is a no-op.
pub fn rle_expand(data: &[u8], expected_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(expected_len);
    let mut i = 0;
    while i < data.len() && out.len() < expected_len {
        let control = data[i];
        i += 1;
        if control == 0x80 {
            continue;
        }
        if control < 0x80 {
            let count = control as usize + 1;
            let end = (i + count).min(data.len());
            out.extend_from_slice(&data[i..end]);
            i = end;
        } else {
            let count = 257 - control as usize;
            if i < data.len() {
                let value = data[i];
                i += 1;
                out.extend(std::iter::repeat(value).take(count));
            }
        }
    }
    out.truncate(expected_len);
    out
}

/// Scanline pixel alignment per depth.
fn alignment_width(bit_depth: u8) -> Option<u16> {
    match bit_depth {
        1 | 4 | 32 => Some(4),
        2 | 8 => Some(2),
        16 => Some(1),
        _ => None,
    }
}

fn bytes_per_scanline(scan_width: u16, bit_depth: u8) -> usize {
    match bit_depth {
        1 => (scan_width as usize).div_ceil(8),
        2 => (scan_width as usize).div_ceil(4),
        4 => (scan_width as usize).div_ceil(2),
        8 => scan_width as usize,
        16 => scan_width as usize * 2,
        32 => scan_width as usize * 4,
        _ => 0,
    }
}

/// Decodes raw `BITD` bytes into pixels. The input is RLE-expanded when
/// shorter than the expected raw size; 16-bit and 32-bit data arriving
/// from the compressor is planar per scanline and gets interleaved here.
pub fn decode_bitmap(
    data: &[u8],
    width: u16,
    height: u16,
    bit_depth: u8,
    palette_ref: PaletteRef,
    dir_version: u16,
    pitch_hint: Option<u16>,
) -> Result<BitmapImage, String> {
    let alignment = alignment_width(bit_depth)
        .ok_or_else(|| format!("unsupported bitmap depth {bit_depth}"))?;
    let scan_width = pitch_hint.unwrap_or_else(|| {
        if width % alignment == 0 {
            width
        } else {
            alignment * width.div_ceil(alignment)
        }
    });

    let expected = bytes_per_scanline(scan_width, bit_depth) * height as usize;
    let was_compressed = data.len() < expected;
    let raw = if was_compressed {
        rle_expand(data, expected)
    } else {
        data[..expected.min(data.len())].to_vec()
    };
    if raw.len() < expected {
        warn!(
            "bitmap data short: expected {} bytes, have {}",
            expected,
            raw.len()
        );
    }

    let data = match bit_depth {
        1 => unpack_indexed(&raw, width, height, scan_width, 1),
        2 => unpack_indexed(&raw, width, height, scan_width, 2),
        4 => unpack_indexed(&raw, width, height, scan_width, 4),
        8 => unpack_indexed(&raw, width, height, scan_width, 8),
        16 => unpack_16(&raw, width, height, scan_width, was_compressed),
        32 => unpack_32(&raw, width, height, scan_width, was_compressed, dir_version),
        _ => unreachable!(),
    };

    Ok(BitmapImage {
        width,
        height,
        bit_depth,
        palette_ref,
        data,
    })
}

/// Widens 1/2/4-bit indices to one byte per pixel and trims scanline
/// padding.
fn unpack_indexed(raw: &[u8], width: u16, height: u16, scan_width: u16, bit_depth: u8) -> Vec<u8> {
    let row_bytes = bytes_per_scanline(scan_width, bit_depth);
    let pixels_per_byte = 8 / bit_depth as usize;
    let mask = ((1u16 << bit_depth) - 1) as u8;

    let mut out = vec![0u8; width as usize * height as usize];
    for y in 0..height as usize {
        let row = &raw[(y * row_bytes).min(raw.len())..((y + 1) * row_bytes).min(raw.len())];
        for x in 0..width as usize {
            let index = if bit_depth == 8 {
                row.get(x).copied().unwrap_or(0)
            } else {
                let byte = row.get(x / pixels_per_byte).copied().unwrap_or(0);
                let shift = 8 - bit_depth as usize * (x % pixels_per_byte + 1);
                (byte >> shift) & mask
            };
            out[y * width as usize + x] = index;
        }
    }
    out
}

/// 16-bit pixels: planar per scanline when the stream was compressed
/// (all high bytes, then all low bytes), interleaved otherwise.
fn unpack_16(raw: &[u8], width: u16, height: u16, scan_width: u16, planar: bool) -> Vec<u8> {
    let row_bytes = scan_width as usize * 2;
    let mut out = vec![0u8; width as usize * height as usize * 2];
    for y in 0..height as usize {
        let row_start = y * row_bytes;
        for x in 0..width as usize {
            let (hi, lo) = if planar {
                (
                    raw.get(row_start + x).copied().unwrap_or(0),
                    raw.get(row_start + scan_width as usize + x).copied().unwrap_or(0),
                )
            } else {
                (
                    raw.get(row_start + x * 2).copied().unwrap_or(0),
                    raw.get(row_start + x * 2 + 1).copied().unwrap_or(0),
                )
            };
            let o = (y * width as usize + x) * 2;
            out[o] = hi;
            out[o + 1] = lo;
        }
    }
    out
}

/// 32-bit pixels: one A, R, G, B plane per scanline from Director 4 on,
/// interleaved ARGB before that.
fn unpack_32(
    raw: &[u8],
    width: u16,
    height: u16,
    scan_width: u16,
    compressed: bool,
    dir_version: u16,
) -> Vec<u8> {
    let planar = compressed && dir_version >= 400;
    let row_bytes = scan_width as usize * 4;
    let mut out = vec![0u8; width as usize * height as usize * 4];
    for y in 0..height as usize {
        let row_start = y * row_bytes;
        for x in 0..width as usize {
            let o = (y * width as usize + x) * 4;
            for c in 0..4 {
                let source = if planar {
                    row_start + scan_width as usize * c + x
                } else {
                    row_start + x * 4 + c
                };
                out[o + c] = raw.get(source).copied().unwrap_or(0);
            }
        }
    }
    out
}
