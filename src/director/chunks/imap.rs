use binary_reader::BinaryReader;

use crate::director::utils::FOURCC;
use crate::io::DecodeError;

/// `imap`: points at the live memory map. 24-byte body.
pub struct InitialMapChunk {
    pub mmap_count: u32,
    pub mmap_offset: usize,
    pub mmap_version: u32,
    pub reserved: [u32; 3],
}

impl InitialMapChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<InitialMapChunk, DecodeError> {
        Ok(InitialMapChunk {
            mmap_count: reader.read_u32()?,
            mmap_offset: reader.read_u32()? as usize,
            mmap_version: reader.read_u32()?,
            reserved: [reader.read_u32()?, reader.read_u32()?, reader.read_u32()?],
        })
    }
}

/// One 20-byte `mmap` resource slot.
pub struct MemoryMapEntry {
    pub fourcc: u32,
    pub len: u32,
    pub offset: u32,
    pub flags: u16,
    pub unk0: u16,
    pub next: u32,
}

impl MemoryMapEntry {
    pub fn is_free(&self) -> bool {
        self.fourcc == FOURCC("free") || self.fourcc == FOURCC("junk")
    }
}

/// `mmap`: a 24-byte header followed by fixed-size entries indexing every
/// chunk in the container. Entries 0/1/2 are the container, `imap` and
/// `mmap` themselves.
pub struct MemoryMapChunk {
    pub header_len: u16,
    pub entry_len: u16,
    pub max_entry_count: u32,
    pub used_entry_count: u32,
    pub junk_head: i32,
    pub junk_head2: i32,
    pub free_head: i32,
    pub entries: Vec<MemoryMapEntry>,
}

impl MemoryMapChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<MemoryMapChunk, DecodeError> {
        let header_len = reader.read_u16()?;
        let entry_len = reader.read_u16()?;
        let max_entry_count = reader.read_u32()?;
        let used_entry_count = reader.read_u32()?;
        let junk_head = reader.read_i32()?;
        let junk_head2 = reader.read_i32()?;
        let free_head = reader.read_i32()?;

        if entry_len < 20 {
            return Err(DecodeError::BadChunk(format!(
                "mmap entry length {entry_len} below the 20-byte record"
            )));
        }

        let mut entries = Vec::with_capacity(used_entry_count as usize);
        for _ in 0..used_entry_count {
            let entry_start = reader.pos;
            entries.push(MemoryMapEntry {
                fourcc: reader.read_u32()?,
                len: reader.read_u32()?,
                offset: reader.read_u32()?,
                flags: reader.read_u16()?,
                unk0: reader.read_u16()?,
                next: reader.read_u32()?,
            });
            // Tolerate padded records.
            reader.jmp(entry_start + entry_len as usize);
        }

        Ok(MemoryMapChunk {
            header_len,
            entry_len,
            max_entry_count,
            used_entry_count,
            junk_head,
            junk_head2,
            free_head,
            entries,
        })
    }
}
