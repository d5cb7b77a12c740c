use binary_reader::BinaryReader;

use crate::io::DecodeError;

/// `BITD`: raw, possibly run-length-compressed pixel data. Expansion and
/// depth unpacking happen in the player's bitmap decoder, which also knows
/// the member's dimensions.
pub struct BitmapChunk {
    pub data: Vec<u8>,
}

impl BitmapChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<BitmapChunk, DecodeError> {
        let data = reader.read_bytes(reader.length - reader.pos)?.to_vec();
        Ok(BitmapChunk { data })
    }
}
