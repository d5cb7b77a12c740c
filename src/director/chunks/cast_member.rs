use binary_reader::{BinaryReader, Endian};

use crate::director::enums::{BitmapMemberInfo, MemberType, ScriptType, ShapeMemberInfo};
use crate::io::DecodeError;

use super::cast_member_info::CastMemberInfoChunk;

/// `CASt`: one cast member. The header layout changed with Director 5;
/// both variants are handled. The specific area is interpreted per member
/// type and also retained raw.
pub struct CastMemberChunk {
    pub member_type: MemberType,
    pub specific: CastMemberSpecificData,
    pub specific_raw: Vec<u8>,
    pub info: Option<CastMemberInfoChunk>,
}

pub enum CastMemberSpecificData {
    Script(ScriptType),
    Bitmap(BitmapMemberInfo),
    Shape(ShapeMemberInfo),
    None,
}

impl CastMemberChunk {
    pub fn from_reader(
        reader: &mut BinaryReader,
        dir_version: u16,
    ) -> Result<CastMemberChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        let mut info = None;
        let member_type;
        let specific_data: Vec<u8>;

        if dir_version >= 500 {
            member_type = MemberType::from_wire(reader.read_u32()?);
            let info_len = reader.read_u32()? as usize;
            let specific_len = reader.read_u32()? as usize;

            if info_len != 0 {
                let mut info_reader = BinaryReader::from_u8(reader.read_bytes(info_len)?);
                info_reader.set_endian(reader.endian);
                info = Some(CastMemberInfoChunk::from_reader(&mut info_reader)?);
            }
            specific_data = reader.read_bytes(specific_len)?.to_vec();
        } else {
            let specific_len = reader.read_u16()? as usize;
            let info_len = reader.read_u32()? as usize;

            // The type byte and an optional flags byte live inside the
            // specific area in the old layout.
            let mut specific_left = specific_len;
            member_type = MemberType::from_wire(reader.read_u8()? as u32);
            specific_left = specific_left.saturating_sub(1);
            if specific_left != 0 {
                reader.read_u8()?; // flags1
                specific_left -= 1;
            }
            specific_data = reader.read_bytes(specific_left)?.to_vec();

            if info_len != 0 {
                let mut info_reader = BinaryReader::from_u8(reader.read_bytes(info_len)?);
                info_reader.set_endian(reader.endian);
                info = Some(CastMemberInfoChunk::from_reader(&mut info_reader)?);
            }
        }

        let specific = match member_type {
            MemberType::Script => {
                let mut specific_reader = BinaryReader::from_vec(&specific_data);
                specific_reader.set_endian(Endian::Big);
                CastMemberSpecificData::Script(ScriptType::from_wire(specific_reader.read_u16()?))
            }
            MemberType::Bitmap => {
                CastMemberSpecificData::Bitmap(BitmapMemberInfo::from_bytes(&specific_data)?)
            }
            MemberType::Shape => {
                CastMemberSpecificData::Shape(ShapeMemberInfo::from_bytes(&specific_data)?)
            }
            _ => CastMemberSpecificData::None,
        };

        Ok(CastMemberChunk {
            member_type,
            specific,
            specific_raw: specific_data,
            info,
        })
    }

    pub fn name(&self) -> &str {
        self.info.as_ref().map(|i| i.name.as_str()).unwrap_or("")
    }

    pub fn script_type(&self) -> Option<ScriptType> {
        match &self.specific {
            CastMemberSpecificData::Script(t) => Some(*t),
            _ => None,
        }
    }

    pub fn bitmap_info(&self) -> Option<&BitmapMemberInfo> {
        match &self.specific {
            CastMemberSpecificData::Bitmap(info) => Some(info),
            _ => None,
        }
    }
}
