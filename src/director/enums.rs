use binary_reader::BinaryReader;
use num_derive::FromPrimitive;

use crate::io::{reader::ReaderExt, DecodeError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum MemberType {
    Null = 0,
    Bitmap = 1,
    FilmLoop = 2,
    Text = 3,
    Palette = 4,
    Picture = 5,
    Sound = 6,
    Button = 7,
    Shape = 8,
    Movie = 9,
    DigitalVideo = 10,
    Script = 11,
    Rte = 12,
    Font = 15,
}

impl MemberType {
    pub fn from_wire(val: u32) -> MemberType {
        num::FromPrimitive::from_u32(val).unwrap_or(MemberType::Null)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum ScriptType {
    Invalid = 0,
    /// Attached to a score location (behavior).
    Score = 1,
    Movie = 3,
    Parent = 7,
}

impl ScriptType {
    pub fn from_wire(val: u16) -> ScriptType {
        num::FromPrimitive::from_u16(val).unwrap_or(ScriptType::Invalid)
    }
}

#[derive(Clone, Debug)]
pub struct BitmapMemberInfo {
    pub width: u16,
    pub height: u16,
    pub reg_x: i16,
    pub reg_y: i16,
    pub bit_depth: u8,
    pub palette_id: i16,
}

impl BitmapMemberInfo {
    pub fn from_bytes(bytes: &[u8]) -> Result<BitmapMemberInfo, DecodeError> {
        let mut reader = BinaryReader::from_u8(bytes);
        reader.set_endian(binary_reader::Endian::Big);

        reader.read_u16()?; // pitch word
        reader.read_u32()?;
        let height = reader.read_u16()?;
        let width = reader.read_u16()?;
        reader.read_u32()?;
        reader.read_u32()?;
        let reg_y = reader.read_i16()?;
        let reg_x = reader.read_i16()?;
        reader.read_u8()?;
        let (bit_depth, palette_id) = if reader.eof() {
            (1, 0)
        } else {
            let depth = reader.read_u8()?;
            reader.read_i16()?;
            // Palette slots are stored one-based.
            (depth, reader.read_i16()? - 1)
        };

        Ok(BitmapMemberInfo {
            width,
            height,
            reg_x,
            reg_y,
            bit_depth,
            palette_id,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum ShapeType {
    Rect = 1,
    RoundRect = 2,
    Oval = 3,
    Line = 4,
}

#[derive(Clone, Debug)]
pub struct ShapeMemberInfo {
    pub shape_type: Option<ShapeType>,
    pub width: u16,
    pub height: u16,
    pub pattern: u16,
    pub fore_color: u8,
    pub filled: bool,
}

impl ShapeMemberInfo {
    pub fn from_bytes(bytes: &[u8]) -> Result<ShapeMemberInfo, DecodeError> {
        let mut reader = BinaryReader::from_u8(bytes);
        reader.set_endian(binary_reader::Endian::Big);

        let shape_type = num::FromPrimitive::from_u16(reader.read_u16()?);
        reader.read_u32()?;
        let height = reader.read_u16()?;
        let width = reader.read_u16()?;
        let pattern = reader.read_u16()?;
        let fore_color = reader.read_u8()?;
        let filled = if reader.bytes_left() >= 2 {
            reader.read_u8()?;
            reader.read_u8()? & 1 != 0
        } else {
            false
        };

        Ok(ShapeMemberInfo {
            shape_type,
            width,
            height,
            pattern,
            fore_color,
            filled,
        })
    }
}
