use binary_reader::{BinaryReader, Endian};

use crate::io::{reader::ReaderExt, DecodeError};

/// `STXT`: styled text. The style runs are retained raw; only the plain
/// text matters to the runtime.
pub struct TextChunk {
    pub text: String,
    pub style_data: Vec<u8>,
}

impl TextChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<TextChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        let offset = reader.read_u32()? as usize;
        if offset != 12 {
            return Err(DecodeError::BadChunk(format!(
                "text chunk header offset {offset}, expected 12"
            )));
        }
        let text_length = reader.read_u32()? as usize;
        let data_length = reader.read_u32()? as usize;

        Ok(TextChunk {
            text: reader.read_string(text_length)?,
            style_data: reader.read_bytes(data_length)?.to_vec(),
        })
    }
}
