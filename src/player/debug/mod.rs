use serde::{Deserialize, Serialize};

const STORE_VERSION: u32 = 3;

fn default_enabled() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    #[serde(rename = "scriptId")]
    pub script_id: u32,
    #[serde(rename = "handlerName", default)]
    pub handler_name: String,
    pub offset: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Serialize, Deserialize)]
struct BreakpointStore {
    version: u32,
    breakpoints: Vec<Breakpoint>,
}

pub struct BreakpointManager {
    pub breakpoints: Vec<Breakpoint>,
}

impl BreakpointManager {
    pub fn new() -> BreakpointManager {
        BreakpointManager {
            breakpoints: Vec::new(),
        }
    }

    pub fn add_breakpoint(&mut self, script_id: u32, handler_name: String, offset: u32) {
        if !self.has_breakpoint(script_id, &handler_name, offset) {
            self.breakpoints.push(Breakpoint {
                script_id,
                handler_name,
                offset,
                enabled: true,
            });
        }
    }

    pub fn remove_breakpoint(&mut self, script_id: u32, handler_name: &str, offset: u32) {
        self.breakpoints.retain(|bp| {
            bp.script_id != script_id || bp.handler_name != handler_name || bp.offset != offset
        });
    }

    pub fn toggle_breakpoint(&mut self, script_id: u32, handler_name: String, offset: u32) {
        if self.has_breakpoint(script_id, &handler_name, offset) {
            self.remove_breakpoint(script_id, &handler_name, offset);
        } else {
            self.add_breakpoint(script_id, handler_name, offset);
        }
    }

    pub fn has_breakpoint(&self, script_id: u32, handler_name: &str, offset: u32) -> bool {
        self.breakpoints.iter().any(|bp| {
            bp.enabled
                && bp.script_id == script_id
                && bp.handler_name == handler_name
                && bp.offset == offset
        })
    }

    pub fn serialize(&self) -> String {
        serialize_breakpoints(&self.breakpoints)
    }

    pub fn load(&mut self, stored: &str) {
        self.breakpoints = deserialize_breakpoints(stored);
    }
}

impl Default for BreakpointManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn serialize_breakpoints(breakpoints: &[Breakpoint]) -> String {
    let store = BreakpointStore {
        version: STORE_VERSION,
        breakpoints: breakpoints.to_vec(),
    };
    serde_json::to_string(&store).unwrap_or_else(|_| "{}".to_string())
}

/// Reads any historical store format: the current JSON, the v2 JSON that
/// predates handler names, or the original `"scriptId:offset,offset;"`
/// string.
pub fn deserialize_breakpoints(stored: &str) -> Vec<Breakpoint> {
    let trimmed = stored.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('{') {
        return serde_json::from_str::<BreakpointStore>(trimmed)
            .map(|store| store.breakpoints)
            .unwrap_or_default();
    }
    parse_legacy_breakpoints(trimmed)
}

fn parse_legacy_breakpoints(stored: &str) -> Vec<Breakpoint> {
    let mut breakpoints = Vec::new();
    for entry in stored.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((script_part, offsets_part)) = entry.split_once(':') else {
            continue;
        };
        let Ok(script_id) = script_part.trim().parse::<u32>() else {
            continue;
        };
        for offset in offsets_part.split(',') {
            if let Ok(offset) = offset.trim().parse::<u32>() {
                breakpoints.push(Breakpoint {
                    script_id,
                    handler_name: String::new(),
                    offset,
                    enabled: true,
                });
            }
        }
    }
    breakpoints
}
