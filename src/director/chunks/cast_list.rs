use binary_reader::{BinaryReader, Endian};

use super::list::ListChunkItems;
use crate::io::DecodeError;

/// `MCsL`: the movie's cast library table (Director 5+).
pub struct CastListChunk {
    pub entries: Vec<CastListEntry>,
}

pub struct CastListEntry {
    pub name: String,
    pub file_path: String,
    pub preload_settings: u16,
    pub min_member: u16,
    pub max_member: u16,
    pub id: u32,
}

impl CastListChunk {
    pub fn from_reader(
        reader: &mut BinaryReader,
        _dir_version: u16,
    ) -> Result<CastListChunk, DecodeError> {
        let item_endian = reader.endian;
        reader.set_endian(Endian::Big);

        let data_offset = reader.read_u32()? as usize;
        reader.read_u16()?; // unk0
        let cast_count = reader.read_u16()?;
        let items_per_cast = reader.read_u16()?;
        reader.read_u16()?; // unk1

        let items = ListChunkItems::from_reader(reader, data_offset)?;

        let entries = (0..cast_count as usize)
            .map(|i| {
                let base = i * items_per_cast as usize;
                let name = if items_per_cast >= 1 {
                    items.item_pascal_string(base + 1)
                } else {
                    String::new()
                };
                let file_path = if items_per_cast >= 2 {
                    items.item_pascal_string(base + 2)
                } else {
                    String::new()
                };
                let preload_settings = if items_per_cast >= 3 {
                    items.item_u16(base + 3, item_endian)
                } else {
                    0
                };
                let (min_member, max_member, id) = if items_per_cast >= 4 {
                    let mut item_reader = BinaryReader::from_u8(items.item(base + 4));
                    item_reader.set_endian(Endian::Big);
                    (
                        item_reader.read_u16().unwrap_or(0),
                        item_reader.read_u16().unwrap_or(0),
                        item_reader.read_u32().unwrap_or(0),
                    )
                } else {
                    (0, 0, 0)
                };

                CastListEntry {
                    name,
                    file_path,
                    preload_settings,
                    min_member,
                    max_member,
                    id,
                }
            })
            .collect();

        Ok(CastListChunk { entries })
    }
}
