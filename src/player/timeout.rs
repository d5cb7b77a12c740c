use std::collections::HashMap;

use super::script::InstanceId;

/// One scheduled timeout: fires `handler` on `target` (or globally) every
/// `period_ms` of playback time.
pub struct Timeout {
    pub name: String,
    pub period_ms: u32,
    pub handler: String,
    pub target: Option<InstanceId>,
    pub elapsed_ms: u32,
}

/// Named timeouts, advanced by the player on every frame tick. Firing is
/// collected here and dispatched by the player so no handler runs while
/// the manager is borrowed.
pub struct TimeoutManager {
    timeouts: HashMap<String, Timeout>,
}

impl TimeoutManager {
    pub fn new() -> TimeoutManager {
        TimeoutManager {
            timeouts: HashMap::new(),
        }
    }

    pub fn schedule(
        &mut self,
        name: String,
        period_ms: u32,
        handler: String,
        target: Option<InstanceId>,
    ) {
        self.timeouts.insert(
            name.to_ascii_lowercase(),
            Timeout {
                name,
                period_ms: period_ms.max(1),
                handler,
                target,
                elapsed_ms: 0,
            },
        );
    }

    pub fn forget(&mut self, name: &str) {
        self.timeouts.remove(&name.to_ascii_lowercase());
    }

    pub fn get(&self, name: &str) -> Option<&Timeout> {
        self.timeouts.get(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.timeouts.is_empty()
    }

    pub fn clear(&mut self) {
        self.timeouts.clear();
    }

    /// Advances every timeout by `delta_ms` and returns the
    /// `(handler, target, timeout name)` triples now due.
    pub fn advance(&mut self, delta_ms: u32) -> Vec<(String, Option<InstanceId>, String)> {
        let mut due = Vec::new();
        for timeout in self.timeouts.values_mut() {
            timeout.elapsed_ms += delta_ms;
            while timeout.elapsed_ms >= timeout.period_ms {
                timeout.elapsed_ms -= timeout.period_ms;
                due.push((
                    timeout.handler.clone(),
                    timeout.target,
                    timeout.name.clone(),
                ));
            }
        }
        due
    }
}

impl Default for TimeoutManager {
    fn default() -> Self {
        Self::new()
    }
}
