#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;

use fxhash::FxHashMap;

use libreshockwave::director::chunks::handler::{Bytecode, HandlerDef};
use libreshockwave::director::chunks::script::ScriptChunk;
use libreshockwave::director::enums::ScriptType;
use libreshockwave::director::lingo::datum::Datum;
use libreshockwave::director::lingo::opcode::OpCode;
use libreshockwave::director::lingo::script::ScriptContext;
use libreshockwave::player::cast_lib::{CastLib, CastMemberRef};
use libreshockwave::player::script::Script;
use libreshockwave::player::Player;

/// Assembles a bytecode sequence the way the script decoder would have
/// produced it: positions account for the operand width implied by the
/// base opcode.
pub fn assemble(ops: &[(OpCode, i64)]) -> (Vec<Bytecode>, FxHashMap<usize, usize>) {
    let mut bytecode_array = Vec::new();
    let mut index_map = FxHashMap::default();
    let mut pos = 0usize;
    for (i, &(opcode, obj)) in ops.iter().enumerate() {
        let raw = opcode as u8;
        bytecode_array.push(Bytecode {
            opcode,
            raw_opcode: raw,
            obj,
            pos,
        });
        index_map.insert(pos, i);
        pos += 1 + if raw >= 0xc0 {
            4
        } else if raw >= 0x80 {
            2
        } else if raw >= 0x40 {
            1
        } else {
            0
        };
    }
    (bytecode_array, index_map)
}

/// Byte offset of instruction `index` in an assembled sequence.
pub fn offset_of(ops: &[(OpCode, i64)], index: usize) -> i64 {
    let (bytecode, _) = assemble(ops);
    bytecode[index].pos as i64
}

pub fn make_handler(name_id: u16, argument_name_ids: Vec<u16>, ops: &[(OpCode, i64)]) -> HandlerDef {
    let (bytecode_array, bytecode_index_map) = assemble(ops);
    HandlerDef {
        name_id,
        bytecode_array,
        bytecode_index_map,
        argument_name_ids,
        local_name_ids: vec![],
        global_name_ids: vec![],
    }
}

pub fn make_script_chunk(handlers: Vec<HandlerDef>, literals: Vec<Datum>) -> ScriptChunk {
    ScriptChunk {
        script_number: 0,
        parent_number: 0,
        script_flags: 0,
        cast_id: 0,
        factory_name_id: 0,
        literals,
        handlers,
        property_name_ids: vec![],
        global_name_ids: vec![],
    }
}

pub struct TestScript {
    pub member_number: u32,
    pub name: &'static str,
    pub script_type: ScriptType,
    pub handlers: Vec<HandlerDef>,
    pub literals: Vec<Datum>,
}

/// Mounts a cast library holding the given scripts, sharing one name
/// table.
pub fn install_cast(player: &mut Player, names: &[&str], scripts: Vec<TestScript>) {
    let lctx = ScriptContext {
        names: names.iter().map(|n| n.to_string()).collect(),
        scripts: HashMap::new(),
    };

    let mut script_map = HashMap::new();
    for test_script in scripts {
        let member_ref = CastMemberRef::new(1, test_script.member_number as u16);
        let chunk = make_script_chunk(test_script.handlers, test_script.literals);
        let script = Script::new(
            member_ref,
            test_script.name.to_string(),
            test_script.script_type,
            chunk,
            &lctx,
        );
        script_map.insert(test_script.member_number, Rc::new(script));
    }

    player.movie.cast_manager.casts.push(CastLib {
        number: 1,
        name: "Internal".to_string(),
        file_path: String::new(),
        members: HashMap::new(),
        scripts: script_map,
        lctx: Some(lctx),
        capital_x: true,
        dir_version: 500,
        is_loaded: true,
    });
}

pub fn name_id(names: &[&str], name: &str) -> i64 {
    names
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .expect("name not in table") as i64
}

pub fn global_int(player: &Player, name: &str) -> Option<i32> {
    let datum_ref = player.globals.get(name)?;
    player.get_datum(datum_ref).int_value().ok()
}
