use binary_reader::{BinaryReader, Endian};

use crate::io::{reader::ReaderExt, DecodeError};

/// The shared "list chunk" layout: a 32-bit data offset, then at that
/// offset a 16-bit item count, `count` 32-bit item offsets, a 32-bit
/// payload length and the concatenated payloads.
pub struct ListChunkItems {
    pub items: Vec<Vec<u8>>,
}

impl ListChunkItems {
    pub fn read_offset_table(
        reader: &mut BinaryReader,
        data_offset: usize,
    ) -> Result<Vec<usize>, DecodeError> {
        reader.jmp(data_offset);
        let count = reader.read_u16()?;
        (0..count)
            .map(|_| Ok(reader.read_u32()? as usize))
            .collect()
    }

    pub fn read_items(
        reader: &mut BinaryReader,
        offset_table: &[usize],
    ) -> Result<Vec<Vec<u8>>, DecodeError> {
        let items_len = reader.read_u32()? as usize;
        let list_offset = reader.pos;

        offset_table
            .iter()
            .enumerate()
            .map(|(i, &offset)| {
                let next_offset = offset_table.get(i + 1).copied().unwrap_or(items_len);
                reader.jmp(list_offset + offset);
                Ok(reader.read_bytes(next_offset.saturating_sub(offset))?.to_vec())
            })
            .collect()
    }

    pub fn from_reader(reader: &mut BinaryReader, data_offset: usize) -> Result<ListChunkItems, DecodeError> {
        let offset_table = Self::read_offset_table(reader, data_offset)?;
        let items = Self::read_items(reader, &offset_table)?;
        Ok(ListChunkItems { items })
    }

    pub fn item(&self, index: usize) -> &[u8] {
        self.items.get(index).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn item_string(&self, index: usize) -> String {
        self.item(index).iter().map(|&b| b as char).collect()
    }

    pub fn item_pascal_string(&self, index: usize) -> String {
        let item = self.item(index);
        match item.split_first() {
            Some((&len, rest)) => rest
                .iter()
                .take(len as usize)
                .map(|&b| b as char)
                .collect(),
            None => String::new(),
        }
    }

    pub fn item_u16(&self, index: usize, endian: Endian) -> u16 {
        let item = self.item(index);
        if item.len() < 2 {
            return 0;
        }
        match endian {
            Endian::Big => u16::from_be_bytes([item[0], item[1]]),
            _ => u16::from_le_bytes([item[0], item[1]]),
        }
    }
}
