use super::super::cast_lib::CastMemberRef;

/// Built-in palette ids are small negative numbers; anything else names a
/// palette cast member in the active cast.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PaletteRef {
    BuiltIn(BuiltInPalette),
    Member(CastMemberRef),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BuiltInPalette {
    GrayScale,
    Pastels,
    Rainbow,
    SystemMac,
    SystemWin,
    SystemWinDir4,
    Metallic,
    Ntsc,
    Vivid,
    Web216,
}

impl BuiltInPalette {
    pub fn from_id(id: i16) -> Option<BuiltInPalette> {
        match id {
            -1 => Some(BuiltInPalette::SystemMac),
            -2 => Some(BuiltInPalette::Rainbow),
            -3 => Some(BuiltInPalette::GrayScale),
            -4 => Some(BuiltInPalette::Pastels),
            -5 => Some(BuiltInPalette::Vivid),
            -6 => Some(BuiltInPalette::Ntsc),
            -7 => Some(BuiltInPalette::Metallic),
            -8 => Some(BuiltInPalette::Web216),
            -101 => Some(BuiltInPalette::SystemWin),
            -102 => Some(BuiltInPalette::SystemWinDir4),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BuiltInPalette::GrayScale => "grayscale",
            BuiltInPalette::Pastels => "pastels",
            BuiltInPalette::Rainbow => "rainbow",
            BuiltInPalette::SystemMac => "systemMac",
            BuiltInPalette::SystemWin => "systemWin",
            BuiltInPalette::SystemWinDir4 => "systemWinDir4",
            BuiltInPalette::Metallic => "metallic",
            BuiltInPalette::Ntsc => "ntsc",
            BuiltInPalette::Vivid => "vivid",
            BuiltInPalette::Web216 => "web216",
        }
    }
}

impl PaletteRef {
    pub fn from_id(palette_id: i16, cast_lib: u16) -> PaletteRef {
        match BuiltInPalette::from_id(palette_id) {
            Some(builtin) => PaletteRef::BuiltIn(builtin),
            None => PaletteRef::Member(CastMemberRef::new(
                cast_lib,
                palette_id.max(0) as u16 + 1,
            )),
        }
    }
}

/// Colors for a palette reference. Member palettes resolve through the
/// caller-supplied lookup; built-ins fall back to a neutral gray ramp,
/// which is all the renderer-less core needs for identity decoding.
pub fn resolve_palette<F>(palette_ref: &PaletteRef, lookup_member: F) -> Vec<(u8, u8, u8)>
where
    F: Fn(&CastMemberRef) -> Option<Vec<(u8, u8, u8)>>,
{
    match palette_ref {
        PaletteRef::Member(member_ref) => {
            lookup_member(member_ref).unwrap_or_else(grayscale_ramp)
        }
        PaletteRef::BuiltIn(_) => grayscale_ramp(),
    }
}

fn grayscale_ramp() -> Vec<(u8, u8, u8)> {
    (0..=255u8).rev().map(|v| (v, v, v)).collect()
}
