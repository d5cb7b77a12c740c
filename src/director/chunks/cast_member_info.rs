use binary_reader::BinaryReader;

use super::list::ListChunkItems;
use crate::io::DecodeError;

pub struct CastMemberInfoHeader {
    pub data_offset: usize,
    pub unk1: u32,
    pub unk2: u32,
    pub flags: u32,
    pub script_id: u32,
}

/// The common info area of a `CASt` chunk. Item 0 is the member's script
/// source text, item 1 its name.
pub struct CastMemberInfoChunk {
    pub header: CastMemberInfoHeader,
    pub script_src_text: String,
    pub name: String,
}

impl CastMemberInfoChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<CastMemberInfoChunk, DecodeError> {
        let header = CastMemberInfoHeader {
            data_offset: reader.read_u32()? as usize,
            unk1: reader.read_u32()?,
            unk2: reader.read_u32()?,
            flags: reader.read_u32()?,
            script_id: reader.read_u32()?,
        };
        let items = ListChunkItems::from_reader(reader, header.data_offset)?;

        Ok(CastMemberInfoChunk {
            script_src_text: items.item_string(0),
            name: items.item_pascal_string(1),
            header,
        })
    }
}
