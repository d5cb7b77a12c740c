use itertools::Itertools;
use log::{info, warn};

use crate::director::lingo::datum::Datum;

use super::super::allocator::{DatumRef, VOID_DATUM_REF};
use super::super::cast_lib::CastMemberRef;
use super::super::datum_formatting::format_datum;
use super::super::{Player, PlayerState, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

fn arg<'a>(player: &'a Player, args: &[DatumRef], index: usize) -> &'a Datum {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
}

/// `go frame`, `go "label"`, `go #next`/`#previous`/`#loop`. Navigation
/// during dispatch is deferred until the outermost dispatch unwinds.
pub fn go(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let Some(target_ref) = args.first() else {
        return Ok(VOID_DATUM_REF);
    };
    let frame = resolve_frame_target(player, target_ref)?;
    if let Some(frame) = frame {
        player.queue_navigation(frame)?;
    }
    Ok(VOID_DATUM_REF)
}

fn resolve_frame_target(
    player: &Player,
    target_ref: &DatumRef,
) -> Result<Option<u32>, ScriptError> {
    let current = player.movie.current_frame;
    let score = &player.movie.score;
    match player.get_datum(target_ref) {
        Datum::Int(frame) => Ok(Some((*frame).max(1) as u32)),
        Datum::Float(frame) => Ok(Some((*frame as i32).max(1) as u32)),
        Datum::String(name) | Datum::Symbol(name) => {
            match name.to_ascii_lowercase().as_str() {
                "next" => Ok(Some(current + 1)),
                "previous" => Ok(Some(current.saturating_sub(1).max(1))),
                "loop" => Ok(Some(current)),
                _ => match score.frame_for_label(name) {
                    Some(frame) => Ok(Some(frame)),
                    None => {
                        warn!("go: no frame label \"{name}\"");
                        Ok(None)
                    }
                },
            }
        }
        other => Err(ScriptError::TypeMismatch(format!(
            "go target must be a frame or label, got {}",
            other.type_str()
        ))),
    }
}

/// `play` without arguments resumes; with a target it navigates like
/// `go`.
pub fn play(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    if args.is_empty() {
        player.state = PlayerState::Playing;
        return Ok(VOID_DATUM_REF);
    }
    go(player, args)
}

pub fn stop(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    player.stop_requested = true;
    Ok(VOID_DATUM_REF)
}

pub fn halt(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    player.stop_requested = true;
    Ok(VOID_DATUM_REF)
}

pub fn pause(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    player.state = PlayerState::Paused;
    Ok(VOID_DATUM_REF)
}

/// `delay ticks` holds the playhead; sixty ticks to the second.
pub fn delay(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let ticks = arg(player, args, 0).int_value()?;
    player.delay_ticks = ticks.max(0) as u32;
    Ok(VOID_DATUM_REF)
}

pub fn puppet_tempo(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let tempo = arg(player, args, 0).int_value()?;
    player.movie.puppet_tempo = tempo.max(0) as u32;
    Ok(VOID_DATUM_REF)
}

pub fn puppet_sprite(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let number = arg(player, args, 0).int_value()?;
    let puppet = args
        .get(1)
        .map(|r| player.get_datum(r).bool_value())
        .unwrap_or(true);
    if let Some(sprite) = player.movie.score.get_sprite_mut(number) {
        sprite.puppet = puppet;
    } else {
        warn!("puppetSprite: no sprite {number}");
    }
    Ok(VOID_DATUM_REF)
}

/// Rendering is an external collaborator; the stage is always current
/// from the core's point of view.
pub fn update_stage(_player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    Ok(VOID_DATUM_REF)
}

pub fn frame(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    Ok(player.alloc_datum(Datum::Int(player.movie.current_frame as i32)))
}

/// `marker(n)` / `label("name")`: label navigation helpers.
pub fn label(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let result = match arg(player, args, 0) {
        Datum::String(name) | Datum::Symbol(name) => player
            .movie
            .score
            .frame_for_label(name)
            .map(|f| f as i32)
            .unwrap_or(0),
        other => {
            // marker(0) is the current label's frame, marker(n) counts
            // label boundaries forward or backward.
            let delta = other.int_value()?;
            marker_frame(player, delta)
        }
    };
    Ok(player.alloc_datum(Datum::Int(result)))
}

fn marker_frame(player: &Player, delta: i32) -> i32 {
    let current = player.movie.current_frame as i32;
    let mut frames: Vec<i32> = player
        .movie
        .score
        .frame_labels
        .iter()
        .map(|l| l.frame_num)
        .collect();
    frames.sort_unstable();
    let at_or_before = frames.iter().rposition(|&f| f <= current);
    match at_or_before {
        Some(index) => {
            let target = index as i32 + delta;
            if target < 0 || target as usize >= frames.len() {
                0
            } else {
                frames[target as usize]
            }
        }
        None => 0,
    }
}

/// `put` prints to the message window; the runtime logs it.
pub fn put(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let text = args
        .iter()
        .map(|r| format_datum(&player.allocator, r))
        .join(" ");
    info!("-- {text}");
    Ok(VOID_DATUM_REF)
}

pub fn alert(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let text = args
        .first()
        .map(|r| player.get_datum(r).string_value())
        .transpose()?
        .unwrap_or_default();
    warn!("alert: {text}");
    Ok(VOID_DATUM_REF)
}

pub fn nothing(_player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    Ok(VOID_DATUM_REF)
}

/// `pass` flags the current handler so the dispatcher keeps propagating
/// the event after it returns.
pub fn pass(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    player.current_scope_mut()?.passed = true;
    Ok(VOID_DATUM_REF)
}

pub fn cursor(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let cursor = arg(player, args, 0).int_value()?;
    player.cursor = cursor;
    Ok(VOID_DATUM_REF)
}

/// `member(nameOrNum[, castLib])` — a cast member reference.
pub fn member(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let member_ref = resolve_member_ref(player, args)?;
    Ok(player.alloc_datum(
        member_ref
            .map(Datum::CastMember)
            .unwrap_or(Datum::Void),
    ))
}

pub fn resolve_member_ref(
    player: &Player,
    args: &[DatumRef],
) -> Result<Option<CastMemberRef>, ScriptError> {
    let cast_manager = &player.movie.cast_manager;
    let cast_number = match args.get(1).map(|r| player.get_datum(r)) {
        Some(Datum::Int(n)) if *n > 0 => Some(*n as u16),
        Some(Datum::String(name)) => cast_manager.get_cast_by_name(name).map(|c| c.number as u16),
        _ => None,
    };
    let Some(first) = args.first() else {
        return Ok(None);
    };
    match player.get_datum(first) {
        Datum::CastMember(member_ref) => Ok(Some(*member_ref)),
        Datum::Int(n) => match cast_number {
            Some(cast) => Ok(Some(CastMemberRef::new(cast, *n as u16))),
            None => Ok(cast_manager.find_member_ref_by_slot_number(*n)),
        },
        Datum::String(name) | Datum::Symbol(name) => match cast_number {
            Some(cast) => Ok(cast_manager
                .get_cast(cast as u32)
                .ok()
                .and_then(|c| c.member_by_name(name))
                .map(|m| m.member_ref)),
            None => Ok(cast_manager.find_member_ref_by_name(name)),
        },
        other => Err(ScriptError::TypeMismatch(format!(
            "bad member identifier of type {}",
            other.type_str()
        ))),
    }
}

/// `script(nameOrNum)` — a script reference usable with `new`.
pub fn script(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let member_ref = resolve_member_ref(player, args)?;
    let result = member_ref
        .filter(|r| player.movie.cast_manager.get_script_by_ref(r).is_some())
        .map(Datum::ScriptRef)
        .unwrap_or(Datum::Void);
    Ok(player.alloc_datum(result))
}

pub fn sprite(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let number = arg(player, args, 0).int_value()?;
    Ok(player.alloc_datum(Datum::SpriteRef(number.max(0) as u16)))
}

/// `castLib(nameOrNum)` — the library's number.
pub fn cast_lib(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let number = match arg(player, args, 0) {
        Datum::Int(n) => *n,
        Datum::String(name) | Datum::Symbol(name) => player
            .movie
            .cast_manager
            .get_cast_by_name(name)
            .map(|c| c.number as i32)
            .unwrap_or(0),
        other => {
            return Err(ScriptError::TypeMismatch(format!(
                "bad castLib identifier of type {}",
                other.type_str()
            )))
        }
    };
    Ok(player.alloc_datum(Datum::Int(number)))
}

/// Global `new(script "Name", ...)` / `new(script(...), ...)`.
pub fn new(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let Some(first) = args.first() else {
        return Err(ScriptError::BadReceiver("new without a script".to_string()));
    };
    let rest = args[1..].to_vec();
    match player.get_datum(first).clone() {
        Datum::ScriptRef(member_ref) => player.new_script_instance(member_ref, &rest),
        Datum::String(name) | Datum::Symbol(name) => {
            player.new_script_instance_by_name(&name, &rest)
        }
        other => Err(ScriptError::BadReceiver(format!(
            "cannot instantiate {}",
            other.type_str()
        ))),
    }
}

/// `timeout("name")` — a reference that scripts call `new`/`forget` on.
pub fn timeout(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let name = arg(player, args, 0).string_value()?;
    Ok(player.alloc_datum(Datum::TimeoutRef(name)))
}
