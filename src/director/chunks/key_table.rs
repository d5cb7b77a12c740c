use binary_reader::BinaryReader;

use crate::io::DecodeError;

/// One ownership triple: chunk `section_id` (e.g. a `BITD`) belongs to the
/// `CASt` chunk with id `owner_id`.
pub struct KeyTableEntry {
    pub section_id: u32,
    pub owner_id: u32,
    pub fourcc: u32,
}

pub struct KeyTableChunk {
    pub entry_size: u16,
    pub entry_size2: u16,
    pub entry_count: u32,
    pub used_count: u32,
    pub entries: Vec<KeyTableEntry>,
}

impl KeyTableChunk {
    pub fn empty() -> KeyTableChunk {
        KeyTableChunk {
            entry_size: 12,
            entry_size2: 12,
            entry_count: 0,
            used_count: 0,
            entries: Vec::new(),
        }
    }

    pub fn from_reader(reader: &mut BinaryReader) -> Result<KeyTableChunk, DecodeError> {
        let entry_size = reader.read_u16()?;
        let entry_size2 = reader.read_u16()?;
        let entry_count = reader.read_u32()?;
        let used_count = reader.read_u32()?;

        let entries = (0..entry_count)
            .map(|_| {
                Ok(KeyTableEntry {
                    section_id: reader.read_u32()?,
                    owner_id: reader.read_u32()?,
                    fourcc: reader.read_u32()?,
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        Ok(KeyTableChunk {
            entry_size,
            entry_size2,
            entry_count,
            used_count,
            entries,
        })
    }

    pub fn find_owned(&self, owner_id: u32, fourcc: u32) -> Option<&KeyTableEntry> {
        self.entries
            .iter()
            .take(self.used_count as usize)
            .find(|e| e.owner_id == owner_id && e.fourcc == fourcc)
    }

    pub fn owned_by(&self, owner_id: u32) -> impl Iterator<Item = &KeyTableEntry> {
        self.entries
            .iter()
            .take(self.used_count as usize)
            .filter(move |e| e.owner_id == owner_id)
    }
}
