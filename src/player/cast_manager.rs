use std::collections::HashMap;
use std::rc::Rc;

use itertools::Itertools;
use log::warn;

use crate::director::cast::{CastDef, CastMemberDef};
use crate::director::enums::{MemberType, ScriptType};
use crate::director::file::MovieFile;
use crate::director::lingo::script::ScriptContext;

use super::bitmap::{decode_bitmap, PaletteRef};
use super::cast_lib::{CastLib, CastMemberRef};
use super::cast_member::{
    BitmapMember, CastMember, CastMemberType, FieldMember, PaletteMember, ScriptMember,
    ShapeMember, SoundMember, TextMember,
};
use super::script::Script;
use super::ScriptError;

/// Owns every mounted cast library and resolves members and scripts
/// across them.
pub struct CastManager {
    pub casts: Vec<CastLib>,
}

impl CastManager {
    pub fn empty() -> CastManager {
        CastManager { casts: Vec::new() }
    }

    pub fn load_from_movie(&mut self, file: &mut MovieFile) {
        let cast_defs = std::mem::take(&mut file.casts);
        self.casts = cast_defs
            .into_iter()
            .enumerate()
            .map(|(i, def)| build_cast_lib(def, i as u32 + 1))
            .collect();
    }

    /// Replaces the members of an external cast slot once its file has
    /// been fetched. The slot keeps its number and name.
    pub fn attach_external_cast(&mut self, number: u32, file: &mut MovieFile) {
        let cast_defs = std::mem::take(&mut file.casts);
        let Some(slot) = self.casts.iter_mut().find(|c| c.number == number) else {
            warn!("no cast slot {number} to attach an external cast to");
            return;
        };
        let Some(def) = cast_defs.into_iter().next() else {
            warn!("external cast file for slot {number} carries no casts");
            return;
        };
        let mut built = build_cast_lib(def, number);
        built.name = slot.name.clone();
        built.file_path = slot.file_path.clone();
        built.is_loaded = true;
        *slot = built;
    }

    pub fn get_cast(&self, number: u32) -> Result<&CastLib, ScriptError> {
        self.casts
            .iter()
            .find(|c| c.number == number)
            .ok_or_else(|| ScriptError::TypeMismatch(format!("no castLib {number}")))
    }

    pub fn get_cast_by_name(&self, name: &str) -> Option<&CastLib> {
        self.casts.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn find_member_by_ref(&self, member_ref: &CastMemberRef) -> Option<&CastMember> {
        self.casts
            .iter()
            .find(|c| c.number == member_ref.cast_lib as u32)
            .and_then(|c| c.member(member_ref.cast_member as u32))
    }

    pub fn find_mut_member_by_ref(&mut self, member_ref: &CastMemberRef) -> Option<&mut CastMember> {
        self.casts
            .iter_mut()
            .find(|c| c.number == member_ref.cast_lib as u32)
            .and_then(|c| c.members.get_mut(&(member_ref.cast_member as u32)))
    }

    /// Resolves a member by name across every cast, first match wins.
    pub fn find_member_ref_by_name(&self, name: &str) -> Option<CastMemberRef> {
        self.casts
            .iter()
            .find_map(|c| c.member_by_name(name).map(|m| m.member_ref))
    }

    /// Resolves a packed slot number (or a bare member number for
    /// pre-Director-5 movies).
    pub fn find_member_ref_by_slot_number(&self, slot: i32) -> Option<CastMemberRef> {
        if slot <= 0 {
            return None;
        }
        let member_ref = CastMemberRef::from_slot_number(slot);
        if member_ref.cast_lib > 0 {
            return Some(member_ref);
        }
        // Bare member number: find the first cast holding it.
        self.casts
            .iter()
            .find(|c| c.members.contains_key(&(slot as u32)))
            .map(|c| CastMemberRef::new(c.number as u16, slot as u16))
    }

    pub fn get_script_by_ref(&self, member_ref: &CastMemberRef) -> Option<&Rc<Script>> {
        self.casts
            .iter()
            .find(|c| c.number == member_ref.cast_lib as u32)
            .and_then(|c| c.script_for_member(member_ref.cast_member as u32))
    }

    /// Every movie script, main cast first, then external casts in load
    /// order; within a cast, member order.
    pub fn movie_scripts(&self) -> Vec<Rc<Script>> {
        self.casts
            .iter()
            .flat_map(|cast| {
                cast.scripts
                    .iter()
                    .sorted_by_key(|(number, _)| **number)
                    .filter(|(_, script)| script.script_type == ScriptType::Movie)
                    .map(|(_, script)| script.clone())
                    .collect_vec()
            })
            .collect()
    }

    pub fn field_text(&self, member_ref: &CastMemberRef) -> Option<String> {
        self.find_member_by_ref(member_ref).and_then(|m| m.text_value())
    }
}

fn build_cast_lib(def: CastDef, number: u32) -> CastLib {
    let lctx = def.lctx;
    let empty_lctx = ScriptContext::empty();
    let lctx_ref = lctx.as_ref().unwrap_or(&empty_lctx);

    let mut members = HashMap::new();
    let mut scripts = HashMap::new();

    for (member_number, member_def) in def.members {
        let member_ref = CastMemberRef::new(number as u16, member_number as u16);
        let member = build_member(member_number, member_ref, &member_def, def.dir_version);

        if let Some(script_member) = member.member_type.as_script() {
            if let Some(chunk) = lctx_ref.scripts.get(&script_member.script_id) {
                scripts.insert(
                    member_number,
                    Rc::new(Script::new(
                        member_ref,
                        member.name.clone(),
                        script_member.script_type,
                        chunk.clone(),
                        lctx_ref,
                    )),
                );
            } else {
                warn!(
                    "script member {} names missing context slot {}",
                    member_number, script_member.script_id
                );
            }
        }
        members.insert(member_number, member);
    }

    let is_loaded = !members.is_empty() || def.file_path.is_empty();
    CastLib {
        number,
        name: def.name,
        file_path: def.file_path,
        members,
        scripts,
        lctx,
        capital_x: def.capital_x,
        dir_version: def.dir_version,
        is_loaded,
    }
}

fn build_member(
    member_number: u32,
    member_ref: CastMemberRef,
    member_def: &CastMemberDef,
    dir_version: u16,
) -> CastMember {
    let chunk = &member_def.chunk;
    let name = chunk.name().to_string();
    let children = &member_def.children;

    let member_type = match chunk.member_type {
        MemberType::Bitmap => {
            let info = chunk.bitmap_info().cloned();
            match info {
                Some(info) => {
                    let image = children.iter().flatten().find_map(|c| c.as_bitmap()).map(|bitd| {
                        decode_bitmap(
                            &bitd.data,
                            info.width,
                            info.height,
                            info.bit_depth,
                            PaletteRef::from_id(info.palette_id, member_ref.cast_lib),
                            dir_version,
                            None,
                        )
                    });
                    let image = match image {
                        Some(Ok(image)) => Some(image),
                        Some(Err(err)) => {
                            warn!("failed to decode bitmap member {member_number}: {err}");
                            None
                        }
                        None => None,
                    };
                    CastMemberType::Bitmap(BitmapMember { info, image })
                }
                None => CastMemberType::Unknown,
            }
        }
        MemberType::Text | MemberType::Button => {
            let text = children
                .iter()
                .flatten()
                .find_map(|c| c.as_text())
                .map(|t| t.text.clone())
                .unwrap_or_default();
            CastMemberType::Field(FieldMember { text })
        }
        MemberType::Rte => {
            let text = children
                .iter()
                .flatten()
                .find_map(|c| c.as_text())
                .map(|t| t.text.clone())
                .unwrap_or_default();
            CastMemberType::Text(TextMember { text })
        }
        MemberType::Script => CastMemberType::Script(ScriptMember {
            script_type: chunk.script_type().unwrap_or(ScriptType::Invalid),
            script_id: chunk.info.as_ref().map(|i| i.header.script_id).unwrap_or(0),
            source_text: chunk
                .info
                .as_ref()
                .map(|i| i.script_src_text.clone())
                .unwrap_or_default(),
        }),
        MemberType::Sound => match children.iter().flatten().find_map(|c| c.as_sound()) {
            Some(sound) => CastMemberType::Sound(SoundMember {
                channels: sound.channels,
                sample_rate: sound.sample_rate,
                bits_per_sample: sound.bits_per_sample,
                sample_count: sound.sample_count,
                data: sound.data.clone(),
                looping: false,
            }),
            None => CastMemberType::Unknown,
        },
        MemberType::Palette => match children.iter().flatten().find_map(|c| c.as_palette()) {
            Some(palette) => CastMemberType::Palette(PaletteMember {
                colors: palette.colors.clone(),
            }),
            None => CastMemberType::Unknown,
        },
        MemberType::Shape => match &chunk.specific {
            crate::director::chunks::cast_member::CastMemberSpecificData::Shape(info) => {
                CastMemberType::Shape(ShapeMember { info: info.clone() })
            }
            _ => CastMemberType::Unknown,
        },
        _ => CastMemberType::Unknown,
    };

    CastMember {
        number: member_number,
        member_ref,
        name,
        member_type,
    }
}
