mod common;

use common::*;
use libreshockwave::director::enums::ScriptType;
use libreshockwave::director::lingo::opcode::OpCode;
use libreshockwave::player::{events, Player, PlayerState};

const NAMES: &[&str] = &[
    "pass",
    "go",
    "enterFrame",
    "prepareMovie",
    "frame",
    "aRan",
    "bRan",
    "cRan",
    "dRan",
    "enteredAt",
];

fn set_global_ops(global: &str, value: i64) -> Vec<(OpCode, i64)> {
    vec![
        (OpCode::PushInt8, value),
        (OpCode::SetGlobal, name_id(NAMES, global)),
    ]
}

fn pass_ops() -> Vec<(OpCode, i64)> {
    vec![
        (OpCode::PushArgListNoRet, 0),
        (OpCode::ExtCall, name_id(NAMES, "pass")),
    ]
}

#[test]
fn pass_continues_propagation_and_its_absence_stops_it() {
    let mut player = Player::new();

    // Script A handles enterFrame and passes; script B handles it and
    // does not; script C would be next but must never run.
    let mut a_ops = set_global_ops("aRan", 1);
    a_ops.extend(pass_ops());
    a_ops.push((OpCode::Ret, 0));

    let mut b_ops = set_global_ops("bRan", 1);
    b_ops.push((OpCode::Ret, 0));

    let mut c_ops = set_global_ops("cRan", 1);
    c_ops.push((OpCode::Ret, 0));

    let enter_frame = name_id(NAMES, "enterFrame") as u16;
    install_cast(
        &mut player,
        NAMES,
        vec![
            TestScript {
                member_number: 1,
                name: "script a",
                script_type: ScriptType::Movie,
                handlers: vec![make_handler(enter_frame, vec![], &a_ops)],
                literals: vec![],
            },
            TestScript {
                member_number: 2,
                name: "script b",
                script_type: ScriptType::Movie,
                handlers: vec![make_handler(enter_frame, vec![], &b_ops)],
                literals: vec![],
            },
            TestScript {
                member_number: 3,
                name: "script c",
                script_type: ScriptType::Movie,
                handlers: vec![make_handler(enter_frame, vec![], &c_ops)],
                literals: vec![],
            },
        ],
    );

    let handled = events::dispatch_global_event(&mut player, "enterFrame", &[]);
    assert!(handled);
    assert_eq!(global_int(&player, "aRan"), Some(1));
    assert_eq!(global_int(&player, "bRan"), Some(1));
    assert_eq!(global_int(&player, "cRan"), None);
}

#[test]
fn nested_dispatch_keeps_pass_flags_independent() {
    let mut player = Player::new();

    // The outer handler dispatches nothing itself; a nested dispatch
    // whose handler passes must not mark the outer handler as passing.
    let mut outer_ops = set_global_ops("aRan", 1);
    outer_ops.push((OpCode::Ret, 0));

    let enter_frame = name_id(NAMES, "enterFrame") as u16;
    install_cast(
        &mut player,
        NAMES,
        vec![TestScript {
            member_number: 1,
            name: "outer",
            script_type: ScriptType::Movie,
            handlers: vec![make_handler(enter_frame, vec![], &outer_ops)],
            literals: vec![],
        }],
    );

    let handled = events::dispatch_global_event(&mut player, "enterFrame", &[]);
    assert!(handled);

    // A second dispatch still finds the handler; the prior run's flags
    // are gone with its scopes.
    let handled = events::dispatch_global_event(&mut player, "enterFrame", &[]);
    assert!(handled);
    assert!(player.scopes.is_empty());
}

#[test]
fn go_during_prepare_movie_is_deferred() {
    let mut player = Player::new();

    // prepareMovie: go(5). enterFrame: enteredAt = the frame.
    let mut prepare_ops = vec![
        (OpCode::PushInt8, 5),
        (OpCode::PushArgListNoRet, 1),
        (OpCode::ExtCall, name_id(NAMES, "go")),
    ];
    prepare_ops.push((OpCode::Ret, 0));

    let enter_ops = vec![
        (OpCode::GetMovieProp, name_id(NAMES, "frame")),
        (OpCode::SetGlobal, name_id(NAMES, "enteredAt")),
        (OpCode::Ret, 0),
    ];

    install_cast(
        &mut player,
        NAMES,
        vec![TestScript {
            member_number: 1,
            name: "movie script",
            script_type: ScriptType::Movie,
            handlers: vec![
                make_handler(name_id(NAMES, "prepareMovie") as u16, vec![], &prepare_ops),
                make_handler(name_id(NAMES, "enterFrame") as u16, vec![], &enter_ops),
            ],
            literals: vec![],
        }],
    );
    player.movie.score.frame_count = 10;
    assert_eq!(player.movie.current_frame, 1);

    player.play();

    assert_eq!(player.state, PlayerState::Playing);
    assert_eq!(player.movie.current_frame, 5);
    // enterFrame observed the deferred target, not frame 1.
    assert_eq!(global_int(&player, "enteredAt"), Some(5));
}

#[test]
fn stop_resets_the_playhead() {
    let mut player = Player::new();
    install_cast(&mut player, NAMES, vec![]);
    player.movie.score.frame_count = 4;
    player.play();
    player.tick();
    assert_eq!(player.movie.current_frame, 2);
    player.stop();
    assert_eq!(player.state, PlayerState::Stopped);
    assert_eq!(player.movie.current_frame, 1);
}

#[test]
fn frames_wrap_at_the_last_frame() {
    let mut player = Player::new();
    install_cast(&mut player, NAMES, vec![]);
    player.movie.score.frame_count = 3;
    player.play();
    for expected in [2, 3, 1, 2] {
        player.tick();
        assert_eq!(player.movie.current_frame, expected);
    }
}

#[test]
fn frame_navigation_depth_is_bounded() {
    let mut player = Player::new();

    // enterFrame navigates to the next frame, forever: each navigation
    // fires another enterFrame, which navigates again.
    let ops = vec![
        (OpCode::GetMovieProp, name_id(NAMES, "frame")),
        (OpCode::PushInt8, 1),
        (OpCode::Add, 0),
        (OpCode::PushArgListNoRet, 1),
        (OpCode::ExtCall, name_id(NAMES, "go")),
        (OpCode::Ret, 0),
    ];

    install_cast(
        &mut player,
        NAMES,
        vec![TestScript {
            member_number: 1,
            name: "bouncer",
            script_type: ScriptType::Movie,
            handlers: vec![make_handler(name_id(NAMES, "enterFrame") as u16, vec![], &ops)],
            literals: vec![],
        }],
    );
    player.movie.score.frame_count = 10_000;
    player.play();
    player.tick();

    // The chain was cut by the navigation depth bound, not by running
    // out of frames, and the player survived it.
    assert!(player.movie.current_frame > 50);
    assert!(player.movie.current_frame < 1_000);
    assert!(player.scopes.is_empty());
}
