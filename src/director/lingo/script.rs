use std::collections::HashMap;

use crate::director::chunks::script::ScriptChunk;

/// A cast's script context: the shared name table plus every live script
/// chunk keyed by its slot in the context map.
pub struct ScriptContext {
    pub names: Vec<String>,
    pub scripts: HashMap<u32, ScriptChunk>,
}

impl ScriptContext {
    pub fn empty() -> ScriptContext {
        ScriptContext {
            names: Vec::new(),
            scripts: HashMap::new(),
        }
    }

    /// Missing ids resolve to a synthetic placeholder rather than failing;
    /// protected movies routinely ship without a name table.
    pub fn name(&self, id: u16) -> String {
        self.names
            .get(id as usize)
            .cloned()
            .unwrap_or_else(|| format!("#{id}"))
    }
}
