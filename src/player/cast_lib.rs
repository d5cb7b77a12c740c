use std::collections::HashMap;
use std::rc::Rc;

use crate::director::lingo::script::ScriptContext;

use super::cast_member::CastMember;
use super::script::Script;

/// Identifies a cast member by library and member number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CastMemberRef {
    pub cast_lib: u16,
    pub cast_member: u16,
}

pub const NULL_CAST_MEMBER_REF: CastMemberRef = CastMemberRef {
    cast_lib: 0,
    cast_member: 0,
};

impl CastMemberRef {
    pub fn new(cast_lib: u16, cast_member: u16) -> CastMemberRef {
        CastMemberRef {
            cast_lib,
            cast_member,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.cast_lib > 0 && self.cast_member > 0
    }

    /// Director 5+ packs a member reference into one number: library in
    /// the high word, member in the low.
    pub fn slot_number(&self) -> i32 {
        ((self.cast_lib as i32) << 16) | (self.cast_member as i32)
    }

    pub fn from_slot_number(slot: i32) -> CastMemberRef {
        CastMemberRef {
            cast_lib: ((slot >> 16) & 0xFFFF) as u16,
            cast_member: (slot & 0xFFFF) as u16,
        }
    }
}

/// A mounted cast library at runtime.
pub struct CastLib {
    /// 1-based library number, in mount order.
    pub number: u32,
    pub name: String,
    pub file_path: String,
    pub members: HashMap<u32, CastMember>,
    pub scripts: HashMap<u32, Rc<Script>>,
    pub lctx: Option<ScriptContext>,
    pub capital_x: bool,
    pub dir_version: u16,
    /// External casts start unloaded; the resource loader fills them in.
    pub is_loaded: bool,
}

impl CastLib {
    pub fn member(&self, number: u32) -> Option<&CastMember> {
        self.members.get(&number)
    }

    pub fn member_by_name(&self, name: &str) -> Option<&CastMember> {
        self.members
            .values()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn script_for_member(&self, member_number: u32) -> Option<&Rc<Script>> {
        self.scripts.get(&member_number)
    }

    pub fn max_member_number(&self) -> u32 {
        self.members.keys().copied().max().unwrap_or(0)
    }
}
