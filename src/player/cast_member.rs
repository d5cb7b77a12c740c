use crate::director::enums::{BitmapMemberInfo, ScriptType, ShapeMemberInfo};
use crate::director::lingo::datum::Datum;

use super::bitmap::BitmapImage;
use super::cast_lib::CastMemberRef;

pub struct CastMember {
    pub number: u32,
    pub member_ref: CastMemberRef,
    pub name: String,
    pub member_type: CastMemberType,
}

pub enum CastMemberType {
    Bitmap(BitmapMember),
    Field(FieldMember),
    Text(TextMember),
    Script(ScriptMember),
    Sound(SoundMember),
    Palette(PaletteMember),
    Shape(ShapeMember),
    Unknown,
}

pub struct BitmapMember {
    pub info: BitmapMemberInfo,
    pub image: Option<BitmapImage>,
}

pub struct FieldMember {
    pub text: String,
}

pub struct TextMember {
    pub text: String,
}

pub struct ScriptMember {
    pub script_type: ScriptType,
    /// Slot in the cast's script context map.
    pub script_id: u32,
    pub source_text: String,
}

pub struct SoundMember {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub sample_count: u32,
    pub data: Vec<u8>,
    pub looping: bool,
}

pub struct PaletteMember {
    pub colors: Vec<(u8, u8, u8)>,
}

pub struct ShapeMember {
    pub info: ShapeMemberInfo,
}

impl CastMemberType {
    pub fn type_symbol(&self) -> &'static str {
        match self {
            CastMemberType::Bitmap(_) => "bitmap",
            CastMemberType::Field(_) => "field",
            CastMemberType::Text(_) => "text",
            CastMemberType::Script(_) => "script",
            CastMemberType::Sound(_) => "sound",
            CastMemberType::Palette(_) => "palette",
            CastMemberType::Shape(_) => "shape",
            CastMemberType::Unknown => "empty",
        }
    }

    pub fn as_script(&self) -> Option<&ScriptMember> {
        match self {
            CastMemberType::Script(script) => Some(script),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldMember> {
        match self {
            CastMemberType::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut FieldMember> {
        match self {
            CastMemberType::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextMember> {
        match self {
            CastMemberType::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextMember> {
        match self {
            CastMemberType::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bitmap(&self) -> Option<&BitmapMember> {
        match self {
            CastMemberType::Bitmap(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    pub fn as_sound(&self) -> Option<&SoundMember> {
        match self {
            CastMemberType::Sound(sound) => Some(sound),
            _ => None,
        }
    }

    pub fn as_palette(&self) -> Option<&PaletteMember> {
        match self {
            CastMemberType::Palette(palette) => Some(palette),
            _ => None,
        }
    }
}

impl CastMember {
    /// The text a member contributes when read as a string.
    pub fn text_value(&self) -> Option<String> {
        match &self.member_type {
            CastMemberType::Field(field) => Some(field.text.clone()),
            CastMemberType::Text(text) => Some(text.text.clone()),
            _ => None,
        }
    }

    pub fn prop(&self, prop: &str) -> Option<Datum> {
        match prop {
            "name" => Some(Datum::String(self.name.clone())),
            "number" => Some(Datum::Int(self.member_ref.slot_number())),
            "memberNum" => Some(Datum::Int(self.number as i32)),
            "castLibNum" => Some(Datum::Int(self.member_ref.cast_lib as i32)),
            "type" => Some(Datum::Symbol(self.member_type.type_symbol().to_string())),
            "text" => self.text_value().map(Datum::String),
            "width" => match &self.member_type {
                CastMemberType::Bitmap(b) => Some(Datum::Int(b.info.width as i32)),
                CastMemberType::Shape(s) => Some(Datum::Int(s.info.width as i32)),
                _ => None,
            },
            "height" => match &self.member_type {
                CastMemberType::Bitmap(b) => Some(Datum::Int(b.info.height as i32)),
                CastMemberType::Shape(s) => Some(Datum::Int(s.info.height as i32)),
                _ => None,
            },
            _ => None,
        }
    }
}
