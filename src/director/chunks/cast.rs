use binary_reader::BinaryReader;

use crate::io::{reader::ReaderExt, DecodeError};

/// `CAS*`: the member table of one cast library. Each slot holds the chunk
/// id of a `CASt` chunk, ordered by member number; zero means an empty
/// slot.
pub struct CastChunk {
    pub member_ids: Vec<u32>,
}

impl CastChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<CastChunk, DecodeError> {
        let mut member_ids = Vec::with_capacity(reader.bytes_left() / 4);
        while reader.bytes_left() >= 4 {
            member_ids.push(reader.read_u32()?);
        }
        Ok(CastChunk { member_ids })
    }
}
