use binary_reader::BinaryReader;
use num_derive::FromPrimitive;

use crate::director::lingo::datum::Datum;
use crate::io::{reader::ReaderExt, DecodeError};

#[derive(Copy, Clone, FromPrimitive)]
pub enum LiteralType {
    Invalid = 0,
    String = 1,
    Int = 4,
    Float = 9,
}

pub struct LiteralRecord {
    pub literal_type: LiteralType,
    pub offset: usize,
}

impl LiteralRecord {
    pub fn read_record(
        reader: &mut BinaryReader,
        dir_version: u16,
    ) -> Result<LiteralRecord, DecodeError> {
        let type_id = if dir_version >= 500 {
            reader.read_u32()?
        } else {
            reader.read_u16()? as u32
        };
        let literal_type =
            num::FromPrimitive::from_u32(type_id).unwrap_or(LiteralType::Invalid);
        let offset = reader.read_u32()? as usize;
        Ok(LiteralRecord {
            literal_type,
            offset,
        })
    }

    /// Int literals carry their value in the offset word; string and float
    /// literals point into the literal data pool.
    pub fn read_data(
        &self,
        reader: &mut BinaryReader,
        pool_offset: usize,
    ) -> Result<Datum, DecodeError> {
        match self.literal_type {
            LiteralType::Int => Ok(Datum::Int(self.offset as i32)),
            LiteralType::String => {
                reader.jmp(pool_offset + self.offset);
                let length = reader.read_u32()? as usize;
                // Stored with a trailing NUL.
                Ok(Datum::String(reader.read_string(length.saturating_sub(1))?))
            }
            LiteralType::Float => {
                reader.jmp(pool_offset + self.offset);
                let length = reader.read_u32()? as usize;
                let value = match length {
                    8 => {
                        let bytes = reader.read_bytes(8)?;
                        f64::from_be_bytes([
                            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6],
                            bytes[7],
                        ])
                    }
                    10 => reader.read_apple_float_80()?,
                    _ => 0.0,
                };
                Ok(Datum::Float(value))
            }
            LiteralType::Invalid => Ok(Datum::Void),
        }
    }
}
