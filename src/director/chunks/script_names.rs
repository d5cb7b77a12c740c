use binary_reader::{BinaryReader, Endian};

use crate::io::{reader::ReaderExt, DecodeError};

/// `Lnam`: the shared identifier table every script in a context indexes
/// into. Big-endian.
pub struct ScriptNamesChunk {
    pub names: Vec<String>,
}

impl ScriptNamesChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<ScriptNamesChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        let _unknown0 = reader.read_u32()?;
        let _unknown1 = reader.read_u32()?;
        let _len1 = reader.read_u32()?;
        let _len2 = reader.read_u32()?;
        let names_offset = reader.read_u16()? as usize;
        let names_count = reader.read_u16()?;

        reader.jmp(names_offset);
        let names = (0..names_count)
            .map(|_| reader.read_pascal_string())
            .collect::<Result<Vec<_>, DecodeError>>()?;

        Ok(ScriptNamesChunk { names })
    }
}
