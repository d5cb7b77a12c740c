use binary_reader::{BinaryReader, Endian};

use crate::io::DecodeError;

/// `Lctx`/`LctX`: maps context slots to `Lscr` chunk ids. Big-endian.
pub struct ScriptContextChunk {
    pub entry_count: u32,
    pub lnam_section_id: u32,
    pub valid_count: u16,
    pub flags: u16,
    pub free_pointer: u16,
    pub section_map: Vec<ScriptContextMapEntry>,
}

pub struct ScriptContextMapEntry {
    pub unknown0: u32,
    /// `Lscr` chunk id, or negative for an invalid slot that must be
    /// skipped.
    pub section_id: i32,
    pub unknown1: u16,
    pub unknown2: u16,
}

impl ScriptContextChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<ScriptContextChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        let _unknown0 = reader.read_u32()?;
        let _unknown1 = reader.read_u32()?;
        let entry_count = reader.read_u32()?;
        let _entry_count2 = reader.read_u32()?;
        let entries_offset = reader.read_u16()? as usize;
        let _unknown2 = reader.read_u16()?;
        let _unknown3 = reader.read_u32()?;
        let _unknown4 = reader.read_u32()?;
        let _unknown5 = reader.read_u32()?;
        let lnam_section_id = reader.read_u32()?;
        let valid_count = reader.read_u16()?;
        let flags = reader.read_u16()?;
        let free_pointer = reader.read_u16()?;

        reader.jmp(entries_offset);
        let section_map = (0..entry_count)
            .map(|_| {
                Ok(ScriptContextMapEntry {
                    unknown0: reader.read_u32()?,
                    section_id: reader.read_i32()?,
                    unknown1: reader.read_u16()?,
                    unknown2: reader.read_u16()?,
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        Ok(ScriptContextChunk {
            entry_count,
            lnam_section_id,
            valid_count,
            flags,
            free_pointer,
            section_map,
        })
    }
}
