use log::debug;

use crate::director::lingo::datum::{datum_bool, Datum};

use super::super::allocator::{DatumRef, VOID_DATUM_REF};
use super::super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

/// `sound(n)`: a channel reference, 1-based.
pub fn sound(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let channel = args
        .first()
        .map(|r| player.get_datum(r).int_value())
        .transpose()?
        .unwrap_or(1);
    Ok(player.alloc_datum(Datum::SoundChannel(channel.clamp(1, 255) as u8)))
}

fn resolve_sound_member(
    player: &Player,
    datum: &Datum,
) -> Result<Option<super::super::cast_lib::CastMemberRef>, ScriptError> {
    match datum {
        Datum::CastMember(member_ref) => Ok(Some(*member_ref)),
        Datum::Int(0) | Datum::Void => Ok(None),
        Datum::Int(n) => Ok(player.movie.cast_manager.find_member_ref_by_slot_number(*n)),
        Datum::String(name) | Datum::Symbol(name) => {
            Ok(player.movie.cast_manager.find_member_ref_by_name(name))
        }
        other => Err(ScriptError::TypeMismatch(format!(
            "not a sound member: {}",
            other.type_str()
        ))),
    }
}

/// `puppetSound [channel,] member` — member 0 releases the channel.
pub fn puppet_sound(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let (channel, member_arg) = if args.len() >= 2 {
        (player.get_datum(&args[0]).int_value()?, &args[1])
    } else if args.len() == 1 {
        (1, &args[0])
    } else {
        return Ok(VOID_DATUM_REF);
    };
    let member = {
        let datum = player.get_datum(member_arg).clone();
        resolve_sound_member(player, &datum)?
    };
    match member {
        Some(member_ref) => player.sound_play(channel, Some(member_ref)),
        None => player.sound_stop(channel),
    }
    Ok(VOID_DATUM_REF)
}

pub fn play_sound(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    puppet_sound(player, args)
}

/// `stopSound [channel]` — without a channel every channel stops.
pub fn stop_sound(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    match args.first() {
        Some(arg) => {
            let channel = player.get_datum(arg).int_value()?;
            player.sound_stop(channel);
        }
        None => {
            for channel in 1..=player.sound_channels.len() as i32 {
                player.sound_stop(channel);
            }
        }
    }
    Ok(VOID_DATUM_REF)
}

pub fn sound_busy(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let channel = args
        .first()
        .map(|r| player.get_datum(r).int_value())
        .transpose()?
        .unwrap_or(0);
    let busy = player.sound_channel(channel).map(|c| c.playing).unwrap_or(false);
    Ok(player.alloc_datum(datum_bool(busy)))
}

/// `soundLevel` reads or, with an argument, sets the 0-7 master level.
pub fn sound_level(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    if let Some(arg) = args.first() {
        let level = player.get_datum(arg).int_value()?;
        player.sound_level = level.clamp(0, 7) as u8;
        Ok(VOID_DATUM_REF)
    } else {
        Ok(player.alloc_datum(Datum::Int(player.sound_level as i32)))
    }
}

/// The mixer is an external collaborator; a beep is a log line here.
pub fn beep(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let times = args
        .first()
        .map(|r| player.get_datum(r).int_value())
        .transpose()?
        .unwrap_or(1);
    debug!("beep x{times}");
    Ok(VOID_DATUM_REF)
}
