mod common;

use common::*;
use libreshockwave::director::enums::ScriptType;
use libreshockwave::director::lingo::datum::Datum;
use libreshockwave::director::lingo::opcode::OpCode;
use libreshockwave::player::handlers;
use libreshockwave::player::{Player, ScriptError};

fn run_handler(player: &mut Player, ops: &[(OpCode, i64)]) -> Result<Datum, ScriptError> {
    run_handler_named(player, &["test"], ops)
}

fn run_handler_named(
    player: &mut Player,
    names: &[&str],
    ops: &[(OpCode, i64)],
) -> Result<Datum, ScriptError> {
    install_cast(
        player,
        names,
        vec![TestScript {
            member_number: 1,
            name: "test script",
            script_type: ScriptType::Movie,
            handlers: vec![make_handler(0, vec![], ops)],
            literals: vec![],
        }],
    );
    let script = player
        .movie
        .cast_manager
        .get_script_by_ref(&libreshockwave::player::cast_lib::CastMemberRef::new(1, 1))
        .unwrap()
        .clone();
    let result = player.call_handler_on_script(script, names[0], None, vec![])?;
    Ok(player.get_datum(&result.return_value).clone())
}

#[test]
fn div_widens_inexact_quotients() {
    let mut player = Player::new();
    let result = run_handler(
        &mut player,
        &[
            (OpCode::PushInt8, 10),
            (OpCode::PushInt8, 3),
            (OpCode::Div, 0),
            (OpCode::Ret, 0),
        ],
    )
    .unwrap();
    match result {
        Datum::Float(f) => assert!((f - 10.0 / 3.0).abs() < 1e-9),
        other => panic!("expected float, got {other:?}"),
    }
}

#[test]
fn div_keeps_exact_quotients_integral() {
    let mut player = Player::new();
    let result = run_handler(
        &mut player,
        &[
            (OpCode::PushInt8, 9),
            (OpCode::PushInt8, 3),
            (OpCode::Div, 0),
            (OpCode::Ret, 0),
        ],
    )
    .unwrap();
    assert!(matches!(result, Datum::Int(3)));
}

#[test]
fn div_by_zero_is_a_script_error() {
    let mut player = Player::new();
    let result = run_handler(
        &mut player,
        &[
            (OpCode::PushInt8, 10),
            (OpCode::PushZero, 0),
            (OpCode::Div, 0),
            (OpCode::Ret, 0),
        ],
    );
    assert!(matches!(result, Err(ScriptError::DivideByZero)));
}

#[test]
fn addition_commutes() {
    let mut player = Player::new();
    let pairs = [
        (Datum::Int(1), Datum::Int(2)),
        (Datum::Int(-5), Datum::Float(9.5)),
        (Datum::Float(0.25), Datum::Int(100)),
    ];
    for (a, b) in pairs {
        let left = libreshockwave::player::datum_operations::add_datums(
            &mut player,
            a.clone(),
            b.clone(),
        )
        .unwrap();
        let right = libreshockwave::player::datum_operations::add_datums(&mut player, b, a).unwrap();
        assert!(libreshockwave::player::compare::datum_equals(
            &player.allocator,
            &left,
            &right
        ));
    }
}

#[test]
fn add_zero_is_identity() {
    let mut player = Player::new();
    for value in [Datum::Int(7), Datum::Float(2.5)] {
        let sum = libreshockwave::player::datum_operations::add_datums(
            &mut player,
            value.clone(),
            Datum::Int(0),
        )
        .unwrap();
        assert!(libreshockwave::player::compare::datum_equals(
            &player.allocator,
            &sum,
            &value
        ));
    }
}

#[test]
fn bad_branch_target_is_reported() {
    let mut player = Player::new();
    // Jump lands between instructions.
    let result = run_handler(
        &mut player,
        &[(OpCode::Jmp, 1), (OpCode::PushZero, 0), (OpCode::Ret, 0)],
    );
    assert!(matches!(result, Err(ScriptError::BadBranchTarget(_))));
}

#[test]
fn jump_targets_resolve_by_byte_offset() {
    let mut player = Player::new();
    let ops = [
        (OpCode::PushInt8, 42), // pos 0, 2 bytes
        (OpCode::Jmp, 2),       // pos 2, jumps to pos 4
        (OpCode::Ret, 0),       // pos 4
    ];
    let result = run_handler(&mut player, &ops).unwrap();
    assert!(matches!(result, Datum::Int(42)));
}

#[test]
fn step_budget_bounds_infinite_loops() {
    let mut player = Player::new();
    player.step_budget = 10_000;
    // A jump to itself never terminates on its own.
    let result = run_handler(&mut player, &[(OpCode::Jmp, 0)]);
    assert!(matches!(result, Err(ScriptError::StepLimit(10_000))));
}

#[test]
fn unknown_opcode_is_recoverable() {
    let mut player = Player::new();
    let result = run_handler(&mut player, &[(OpCode::Invalid, 0)]);
    assert!(matches!(result, Err(ScriptError::UnknownOpcode(_))));
}

#[test]
fn integer_builtin_keeps_unparsable_strings() {
    let mut player = Player::new();
    let arg = player.alloc_datum(Datum::String("abc".to_string()));
    let result = handlers::call_builtin(&mut player, "integer", &[arg]).unwrap();
    match player.get_datum(&result) {
        Datum::String(s) => assert_eq!(s, "abc"),
        other => panic!("expected the string back, got {other:?}"),
    }

    let arg = player.alloc_datum(Datum::String("3.7".to_string()));
    let result = handlers::call_builtin(&mut player, "integer", &[arg]).unwrap();
    assert!(matches!(player.get_datum(&result), Datum::Int(3)));
}

#[test]
fn float_builtin_keeps_unparsable_strings() {
    let mut player = Player::new();
    let arg = player.alloc_datum(Datum::String("hello".to_string()));
    let result = handlers::call_builtin(&mut player, "float", &[arg]).unwrap();
    match player.get_datum(&result) {
        Datum::String(s) => assert_eq!(s, "hello"),
        other => panic!("expected the string back, got {other:?}"),
    }
    // floatp(float(x)) as a numeric probe
    let probe = handlers::call_builtin(&mut player, "floatP", &[result]).unwrap();
    assert!(matches!(player.get_datum(&probe), Datum::Int(0)));
}

#[test]
fn set_at_pads_with_void() {
    let mut player = Player::new();
    let one = player.alloc_datum(Datum::Int(1));
    let list = handlers::call_builtin(&mut player, "list", &[one]).unwrap();
    let index = player.alloc_datum(Datum::Int(4));
    let value = player.alloc_datum(Datum::Int(99));
    handlers::call_builtin(&mut player, "setAt", &[list, index, value]).unwrap();

    let count = handlers::call_builtin(&mut player, "count", &[list]).unwrap();
    assert!(matches!(player.get_datum(&count), Datum::Int(4)));

    let second = player.alloc_datum(Datum::Int(2));
    let got = handlers::call_builtin(&mut player, "getAt", &[list, second]).unwrap();
    assert!(player.get_datum(&got).is_void());

    let fourth = player.alloc_datum(Datum::Int(4));
    let got = handlers::call_builtin(&mut player, "getAt", &[list, fourth]).unwrap();
    assert!(matches!(player.get_datum(&got), Datum::Int(99)));
}

#[test]
fn get_at_out_of_range_yields_void() {
    let mut player = Player::new();
    let a = player.alloc_datum(Datum::Int(10));
    let list = handlers::call_builtin(&mut player, "list", &[a]).unwrap();
    for index in [0, 2, 5] {
        let index_ref = player.alloc_datum(Datum::Int(index));
        let got = handlers::call_builtin(&mut player, "getAt", &[list, index_ref]).unwrap();
        assert!(player.get_datum(&got).is_void(), "index {index}");
    }
}

#[test]
fn lists_share_structure_through_references() {
    let mut player = Player::new();
    let a = player.alloc_datum(Datum::Int(1));
    let list = handlers::call_builtin(&mut player, "list", &[a]).unwrap();
    let alias = list; // same heap slot
    let index = player.alloc_datum(Datum::Int(1));
    let value = player.alloc_datum(Datum::Int(77));
    handlers::call_builtin(&mut player, "setAt", &[alias, index, value]).unwrap();
    let got = handlers::call_builtin(&mut player, "getAt", &[list, index]).unwrap();
    assert!(matches!(player.get_datum(&got), Datum::Int(77)));
}

#[test]
fn delete_one_removes_first_structural_match() {
    let mut player = Player::new();
    let a = player.alloc_datum(Datum::String("x".to_string()));
    let b = player.alloc_datum(Datum::Int(5));
    let c = player.alloc_datum(Datum::String("X".to_string()));
    let list = handlers::call_builtin(&mut player, "list", &[a, b, c]).unwrap();
    // case-insensitive structural match removes the first "x"
    let needle = player.alloc_datum(Datum::String("X".to_string()));
    handlers::call_builtin(&mut player, "deleteOne", &[list, needle]).unwrap();
    let count = handlers::call_builtin(&mut player, "count", &[list]).unwrap();
    assert!(matches!(player.get_datum(&count), Datum::Int(2)));
    let first = player.alloc_datum(Datum::Int(1));
    let got = handlers::call_builtin(&mut player, "getAt", &[list, first]).unwrap();
    assert!(matches!(player.get_datum(&got), Datum::Int(5)));
}

#[test]
fn chunk_with_last_below_first_selects_single_unit() {
    let mut player = Player::new();
    let first = player.alloc_datum(Datum::Int(3));
    let last = player.alloc_datum(Datum::Int(1));
    let text = player.alloc_datum(Datum::String("a,b,c,d".to_string()));
    let got = handlers::call_builtin(&mut player, "item", &[first, last, text]).unwrap();
    assert_eq!(player.get_datum(&got).string_value().unwrap(), "c");
}

#[test]
fn chunk_out_of_range_yields_empty_string() {
    let mut player = Player::new();
    let index = player.alloc_datum(Datum::Int(9));
    let text = player.alloc_datum(Datum::String("one two".to_string()));
    let got = handlers::call_builtin(&mut player, "word", &[index, text]).unwrap();
    assert_eq!(player.get_datum(&got).string_value().unwrap(), "");
}

#[test]
fn count_matches_partition_size() {
    let mut player = Player::new();
    let cases = [
        ("a,b,c", "item", 3),
        ("one two  three", "word", 3),
        ("ab", "char", 2),
        ("l1\nl2\nl3", "line", 3),
        ("", "item", 1),
    ];
    for (text, kind, expected) in cases {
        let text_ref = player.alloc_datum(Datum::String(text.to_string()));
        let kind_ref = player.alloc_datum(Datum::Symbol(kind.to_string()));
        let got = handlers::call_builtin(&mut player, "count", &[text_ref, kind_ref]).unwrap();
        match player.get_datum(&got) {
            Datum::Int(n) => assert_eq!(*n, expected, "{text} by {kind}"),
            other => panic!("expected int, got {other:?}"),
        }
    }
}

#[test]
fn split_then_join_round_trips() {
    let mut player = Player::new();
    let text = "alpha,beta,gamma";
    let chunks = libreshockwave::player::string_chunk::split_chunks(
        text,
        libreshockwave::director::lingo::datum::StringChunkKind::Item,
        player.movie.item_delimiter,
    );
    assert_eq!(chunks.join(","), text);
}

#[test]
fn prop_list_parse_idiom() {
    // "name=John,age=30" split on the item delimiter, each item split
    // on the first '=' into a property list.
    let mut player = Player::new();
    let source = "name=John,age=30";

    let plist = player.alloc_datum(Datum::PropList(vec![], false));
    let items = libreshockwave::player::string_chunk::split_chunks(
        source,
        libreshockwave::director::lingo::datum::StringChunkKind::Item,
        ',',
    );
    for item in items {
        let (key, value) = item.split_once('=').unwrap();
        let key_ref = player.alloc_datum(Datum::Symbol(key.to_string()));
        let value_ref = player.alloc_datum(Datum::String(value.to_string()));
        handlers::call_builtin(&mut player, "addProp", &[plist, key_ref, value_ref]).unwrap();
    }

    let count = handlers::call_builtin(&mut player, "count", &[plist]).unwrap();
    assert!(matches!(player.get_datum(&count), Datum::Int(2)));

    let name_key = player.alloc_datum(Datum::Symbol("name".to_string()));
    let pos = handlers::call_builtin(&mut player, "findPos", &[plist, name_key]).unwrap();
    assert!(matches!(player.get_datum(&pos), Datum::Int(1)));

    let got = handlers::call_builtin(&mut player, "getProp", &[plist, name_key]).unwrap();
    assert_eq!(player.get_datum(&got).string_value().unwrap(), "John");

    let age_key = player.alloc_datum(Datum::Symbol("age".to_string()));
    let got = handlers::call_builtin(&mut player, "getProp", &[plist, age_key]).unwrap();
    assert_eq!(player.get_datum(&got).string_value().unwrap(), "30");
}

#[test]
fn global_variables_flow_between_opcodes() {
    let mut player = Player::new();
    let names = ["test", "gCounter"];
    let result = run_handler_named(
        &mut player,
        &names,
        &[
            (OpCode::PushInt8, 12),
            (OpCode::SetGlobal, 1),
            (OpCode::GetGlobal, 1),
            (OpCode::PushInt8, 30),
            (OpCode::Add, 0),
            (OpCode::Ret, 0),
        ],
    )
    .unwrap();
    assert!(matches!(result, Datum::Int(42)));
    assert_eq!(global_int(&player, "gCounter"), Some(12));
}

#[test]
fn symbols_compare_case_insensitively() {
    let mut player = Player::new();
    let a = Datum::Symbol("Hello".to_string());
    let b = Datum::Symbol("hello".to_string());
    assert!(libreshockwave::player::compare::datum_equals(
        &player.allocator,
        &a,
        &b
    ));
    let _ = &mut player;
}

#[test]
fn ancestor_chain_resolution_is_bounded() {
    use libreshockwave::player::script::{instance_get_prop_opt, ScriptInstance};

    let mut player = Player::new();
    let member_ref = libreshockwave::player::cast_lib::CastMemberRef::new(1, 1);

    // Two instances pointing at each other: a cycle the resolver must
    // survive.
    let first = player.allocator.alloc_instance(ScriptInstance {
        instance_id: 0,
        script: member_ref,
        ancestor: None,
        properties: vec![],
    });
    let second = player.allocator.alloc_instance(ScriptInstance {
        instance_id: 0,
        script: member_ref,
        ancestor: Some(first),
        properties: vec![],
    });
    player.allocator.get_instance_mut(first).unwrap().ancestor = Some(second);

    assert!(instance_get_prop_opt(&player.allocator, first, "missing").is_none());
}
