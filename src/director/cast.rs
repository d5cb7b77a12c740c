use std::collections::HashMap;

use log::warn;

use crate::director::utils::fourcc_to_string;
use crate::io::DecodeError;

use super::chunks::cast_member::CastMemberChunk;
use super::chunks::script::ScriptChunk;
use super::chunks::Chunk;
use super::file::ContainerState;
use super::lingo::script::ScriptContext;
use super::utils::FOURCC;

/// A member together with the chunks the key table says it owns
/// (`BITD`, `STXT`, `snd `, `CLUT`, ...).
pub struct CastMemberDef {
    pub chunk: CastMemberChunk,
    pub children: Vec<Option<Chunk>>,
}

/// One mounted cast library: members keyed by member number plus the
/// cast's script context.
pub struct CastDef {
    pub id: u32,
    pub name: String,
    pub file_path: String,
    pub min_member: u16,
    pub members: HashMap<u32, CastMemberDef>,
    pub lctx: Option<ScriptContext>,
    pub capital_x: bool,
    pub dir_version: u16,
}

impl CastDef {
    pub fn read(
        name: String,
        file_path: String,
        id: u32,
        min_member: u16,
        member_ids: &[u32],
        state: &mut ContainerState,
    ) -> Result<CastDef, DecodeError> {
        let lctx_entry = state
            .key_table
            .entries
            .iter()
            .find(|e| {
                e.owner_id == id
                    && (e.fourcc == FOURCC("Lctx") || e.fourcc == FOURCC("LctX"))
            })
            .map(|e| (e.fourcc, e.section_id));
        let capital_x = lctx_entry.map(|(fourcc, _)| fourcc == FOURCC("LctX")).unwrap_or(false);

        let lctx_chunk = match lctx_entry {
            Some((fourcc, section_id)) => match state.chunk(fourcc, section_id)? {
                Chunk::ScriptContext(lctx) => Some(lctx),
                _ => None,
            },
            None => None,
        };

        let names = match &lctx_chunk {
            Some(lctx) => match state.chunk(FOURCC("Lnam"), lctx.lnam_section_id) {
                Ok(Chunk::ScriptNames(names)) => names.names,
                _ => Vec::new(),
            },
            None => Vec::new(),
        };

        let mut members = HashMap::new();
        for (i, &section_id) in member_ids.iter().enumerate() {
            if section_id == 0 {
                continue;
            }
            let member_number = i as u32 + min_member as u32;
            let member = match state.chunk(FOURCC("CASt"), section_id)? {
                Chunk::CastMember(member) => member,
                _ => continue,
            };

            let child_entries: Vec<(u32, u32)> = state
                .key_table
                .owned_by(section_id)
                .map(|e| (e.fourcc, e.section_id))
                .collect();
            let children = child_entries
                .iter()
                .map(|&(fourcc, child_id)| match state.chunk(fourcc, child_id) {
                    Ok(chunk) => Some(chunk),
                    Err(err) => {
                        warn!(
                            "skipping unreadable {} chunk {} of member {}: {}",
                            fourcc_to_string(fourcc),
                            child_id,
                            member_number,
                            err
                        );
                        None
                    }
                })
                .collect();

            members.insert(
                member_number,
                CastMemberDef {
                    chunk: member,
                    children,
                },
            );
        }

        let lctx = match lctx_chunk {
            Some(lctx) => {
                let mut scripts: HashMap<u32, ScriptChunk> = HashMap::new();
                for (i, section) in lctx.section_map.iter().enumerate() {
                    // Invalid slots carry a negative id and are skipped.
                    if section.section_id < 0 {
                        continue;
                    }
                    match state.chunk(FOURCC("Lscr"), section.section_id as u32) {
                        Ok(Chunk::Script(script)) => {
                            scripts.insert(i as u32 + 1, script);
                        }
                        Ok(_) => {}
                        Err(err) => {
                            warn!("skipping unreadable script chunk {}: {}", section.section_id, err);
                        }
                    }
                }
                Some(ScriptContext { names, scripts })
            }
            None => None,
        };

        Ok(CastDef {
            id,
            name,
            file_path,
            min_member,
            members,
            lctx,
            capital_x,
            dir_version: state.rifx.dir_version,
        })
    }
}
