use std::rc::Rc;

use super::allocator::{DatumRef, VOID_DATUM_REF};
use super::script::{InstanceId, Script};

/// One call frame. Locals and parameters are slot-indexed; the evaluation
/// stack and tell-target stack are frame-local.
pub struct Scope {
    pub script: Rc<Script>,
    pub handler_index: usize,
    pub receiver: Option<InstanceId>,
    pub args: Vec<DatumRef>,
    pub locals: Vec<DatumRef>,
    pub bytecode_index: usize,
    pub stack: Vec<DatumRef>,
    pub tell_targets: Vec<DatumRef>,
    pub return_value: DatumRef,
    pub passed: bool,
}

/// What a finished handler hands back to its caller.
pub struct ScopeResult {
    pub return_value: DatumRef,
    pub passed: bool,
}

impl Scope {
    pub fn new(
        script: Rc<Script>,
        handler_index: usize,
        receiver: Option<InstanceId>,
        args: Vec<DatumRef>,
    ) -> Scope {
        let locals_count = script
            .get_own_handler_at(handler_index)
            .map(|h| h.local_name_ids.len())
            .unwrap_or(0);
        Scope {
            script,
            handler_index,
            receiver,
            args,
            locals: vec![VOID_DATUM_REF; locals_count],
            bytecode_index: 0,
            stack: Vec::new(),
            tell_targets: Vec::new(),
            return_value: VOID_DATUM_REF,
            passed: false,
        }
    }

    pub fn pop_n(&mut self, n: usize) -> Vec<DatumRef> {
        let at = self.stack.len().saturating_sub(n);
        self.stack.split_off(at)
    }

    pub fn tell_target(&self) -> Option<&DatumRef> {
        self.tell_targets.last()
    }
}
