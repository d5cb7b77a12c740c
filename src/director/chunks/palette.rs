use binary_reader::{BinaryReader, Endian};

use crate::io::{reader::ReaderExt, DecodeError};

/// `CLUT`: 256 colors, six bytes each, with the color value duplicated in
/// each 16-bit word's high byte.
pub struct PaletteChunk {
    pub colors: Vec<(u8, u8, u8)>,
}

impl PaletteChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<PaletteChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        let count = (reader.bytes_left() / 6).min(256);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let r = reader.read_u8()?;
            reader.read_u8()?;
            let g = reader.read_u8()?;
            reader.read_u8()?;
            let b = reader.read_u8()?;
            reader.read_u8()?;
            colors.push((r, g, b));
        }

        Ok(PaletteChunk { colors })
    }
}
