use std::collections::HashMap;

use crate::director::chunks::handler::HandlerDef;
use crate::director::chunks::script::ScriptChunk;
use crate::director::enums::ScriptType;
use crate::director::lingo::script::ScriptContext;

use super::allocator::{DatumAllocator, DatumRef, VOID_DATUM_REF};
use super::cast_lib::CastMemberRef;

/// A script bound to its cast member, with handler lookup by
/// case-insensitive name.
pub struct Script {
    pub member_ref: CastMemberRef,
    pub name: String,
    pub script_type: ScriptType,
    pub chunk: ScriptChunk,
    pub handler_names: Vec<String>,
    handler_index: HashMap<String, usize>,
}

/// `(script, handler name)` — enough to re-resolve the handler later.
pub type ScriptHandlerRef = (CastMemberRef, String);

impl Script {
    pub fn new(
        member_ref: CastMemberRef,
        name: String,
        script_type: ScriptType,
        chunk: ScriptChunk,
        lctx: &ScriptContext,
    ) -> Script {
        let handler_names: Vec<String> = chunk
            .handlers
            .iter()
            .map(|h| lctx.name(h.name_id))
            .collect();
        let handler_index = handler_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_ascii_lowercase(), i))
            .collect();
        Script {
            member_ref,
            name,
            script_type,
            chunk,
            handler_names,
            handler_index,
        }
    }

    pub fn handler_index_of(&self, name: &str) -> Option<usize> {
        self.handler_index.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn get_own_handler(&self, name: &str) -> Option<&HandlerDef> {
        self.handler_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.chunk.handlers[i])
    }

    pub fn get_own_handler_at(&self, index: usize) -> Option<&HandlerDef> {
        self.chunk.handlers.get(index)
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handler_index.contains_key(&name.to_ascii_lowercase())
    }

    pub fn handler_name(&self, handler: &HandlerDef) -> String {
        self.handler_names
            .iter()
            .zip(&self.chunk.handlers)
            .find(|(_, h)| h.name_id == handler.name_id)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| format!("#{}", handler.name_id))
    }
}

pub type InstanceId = u32;

/// How many ancestor hops property and method resolution will follow.
/// Cyclic ancestor chains terminate here instead of spinning.
pub const MAX_ANCESTOR_DEPTH: usize = 32;

/// A live object: one script plus its property bag and optional ancestor.
pub struct ScriptInstance {
    pub instance_id: InstanceId,
    pub script: CastMemberRef,
    pub ancestor: Option<InstanceId>,
    /// Insertion-ordered property map; names compare case-insensitively.
    pub properties: Vec<(String, DatumRef)>,
}

impl ScriptInstance {
    /// A fresh instance with every declared property set to void.
    pub fn new(script_ref: CastMemberRef, script: &Script, lctx: &ScriptContext) -> ScriptInstance {
        let properties = script
            .chunk
            .property_name_ids
            .iter()
            .map(|&name_id| (lctx.name(name_id), VOID_DATUM_REF))
            .collect();
        ScriptInstance {
            instance_id: 0,
            script: script_ref,
            ancestor: None,
            properties,
        }
    }

    pub fn get_own_prop(&self, name: &str) -> Option<DatumRef> {
        self.properties
            .iter()
            .find(|(prop, _)| prop.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    pub fn set_own_prop(&mut self, name: &str, value: DatumRef) -> bool {
        for (prop, slot) in self.properties.iter_mut() {
            if prop.eq_ignore_ascii_case(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    pub fn add_prop(&mut self, name: String, value: DatumRef) {
        if !self.set_own_prop(&name, value) {
            self.properties.push((name, value));
        }
    }
}

/// Walks the ancestor chain looking for `prop_name`, visiting at most
/// `MAX_ANCESTOR_DEPTH` instances. Callers resolve the `ancestor`
/// pseudo-property themselves before calling this.
pub fn instance_get_prop_opt(
    allocator: &DatumAllocator,
    instance_id: InstanceId,
    prop_name: &str,
) -> Option<DatumRef> {
    let mut current = Some(instance_id);
    for _ in 0..MAX_ANCESTOR_DEPTH {
        let instance = allocator.get_instance(current?)?;
        if let Some(value) = instance.get_own_prop(prop_name) {
            return Some(value);
        }
        current = instance.ancestor;
    }
    None
}

/// Sets `prop_name` on the first instance along the chain that declares
/// it; returns false when no instance does.
pub fn instance_set_prop_opt(
    allocator: &mut DatumAllocator,
    instance_id: InstanceId,
    prop_name: &str,
    value: DatumRef,
) -> bool {
    let mut current = Some(instance_id);
    for _ in 0..MAX_ANCESTOR_DEPTH {
        let id = match current {
            Some(id) => id,
            None => return false,
        };
        let instance = match allocator.get_instance_mut(id) {
            Some(instance) => instance,
            None => return false,
        };
        if instance.set_own_prop(prop_name, value) {
            return true;
        }
        current = instance.ancestor;
    }
    false
}
