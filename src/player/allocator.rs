use fxhash::FxHashMap;

use crate::director::lingo::datum::Datum;

use super::script::{InstanceId, ScriptInstance};

/// Index into the player-owned datum heap. Lists, property lists and
/// other containers hold these instead of nested values, which gives
/// Lingo its reference semantics for mutable collections.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DatumRef(u32);

pub const VOID_DATUM_REF: DatumRef = DatumRef(0);

impl DatumRef {
    pub fn is_void(&self) -> bool {
        self.0 == 0
    }
}

/// The engine-owned heap for datums and script instances. Slot 0 is
/// always `Void`. Instances live behind plain ids, so cyclic ancestor
/// chains cannot leak through reference counting; traversals are bounded
/// instead.
pub struct DatumAllocator {
    datums: Vec<Datum>,
    instances: FxHashMap<InstanceId, ScriptInstance>,
    next_instance_id: InstanceId,
}

impl DatumAllocator {
    pub fn new() -> DatumAllocator {
        DatumAllocator {
            datums: vec![Datum::Void],
            instances: FxHashMap::default(),
            next_instance_id: 1,
        }
    }

    pub fn alloc_datum(&mut self, datum: Datum) -> DatumRef {
        if let Datum::Void = datum {
            return VOID_DATUM_REF;
        }
        self.datums.push(datum);
        DatumRef((self.datums.len() - 1) as u32)
    }

    pub fn get_datum(&self, datum_ref: &DatumRef) -> &Datum {
        self.datums.get(datum_ref.0 as usize).unwrap_or(&Datum::Void)
    }

    pub fn get_datum_mut(&mut self, datum_ref: &DatumRef) -> &mut Datum {
        // Slot 0 stays void; writes through a void ref are author errors
        // that must not corrupt the shared slot.
        if datum_ref.0 == 0 {
            self.datums[0] = Datum::Void;
        }
        &mut self.datums[datum_ref.0 as usize]
    }

    pub fn alloc_instance(&mut self, mut instance: ScriptInstance) -> InstanceId {
        let id = self.next_instance_id;
        self.next_instance_id += 1;
        instance.instance_id = id;
        self.instances.insert(id, instance);
        id
    }

    pub fn get_instance(&self, id: InstanceId) -> Option<&ScriptInstance> {
        self.instances.get(&id)
    }

    pub fn get_instance_mut(&mut self, id: InstanceId) -> Option<&mut ScriptInstance> {
        self.instances.get_mut(&id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn reset(&mut self) {
        self.datums.clear();
        self.datums.push(Datum::Void);
        self.instances.clear();
        self.next_instance_id = 1;
    }
}

impl Default for DatumAllocator {
    fn default() -> Self {
        Self::new()
    }
}
