use rand::Rng;

use crate::director::lingo::datum::Datum;

use super::super::allocator::DatumRef;
use super::super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

fn arg_datum<'a>(player: &'a Player, args: &[DatumRef], index: usize) -> &'a Datum {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
}

pub fn abs(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let result = match arg_datum(player, args, 0) {
        Datum::Int(n) => Datum::Int(n.abs()),
        other => Datum::Float(other.float_value()?.abs()),
    };
    Ok(player.alloc_datum(result))
}

pub fn sqrt(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let value = arg_datum(player, args, 0).float_value()?;
    Ok(player.alloc_datum(Datum::Float(value.sqrt())))
}

pub fn sin(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let value = arg_datum(player, args, 0).float_value()?;
    Ok(player.alloc_datum(Datum::Float(value.sin())))
}

pub fn cos(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let value = arg_datum(player, args, 0).float_value()?;
    Ok(player.alloc_datum(Datum::Float(value.cos())))
}

pub fn tan(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let value = arg_datum(player, args, 0).float_value()?;
    Ok(player.alloc_datum(Datum::Float(value.tan())))
}

pub fn atan(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let value = arg_datum(player, args, 0).float_value()?;
    Ok(player.alloc_datum(Datum::Float(value.atan())))
}

pub fn exp(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let value = arg_datum(player, args, 0).float_value()?;
    Ok(player.alloc_datum(Datum::Float(value.exp())))
}

pub fn log(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let value = arg_datum(player, args, 0).float_value()?;
    Ok(player.alloc_datum(Datum::Float(value.ln())))
}

pub fn power(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let base = arg_datum(player, args, 0).float_value()?;
    let exponent = arg_datum(player, args, 1).float_value()?;
    Ok(player.alloc_datum(Datum::Float(base.powf(exponent))))
}

pub fn pi(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    Ok(player.alloc_datum(Datum::Float(std::f64::consts::PI)))
}

/// `random(n)` yields 1..=n; a non-positive bound yields 1.
pub fn random(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let bound = arg_datum(player, args, 0).int_value()?;
    let value = if bound <= 1 {
        1
    } else {
        player.rng.random_range(1..=bound)
    };
    Ok(player.alloc_datum(Datum::Int(value)))
}

pub fn max(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    extremum(player, args, true)
}

pub fn min(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    extremum(player, args, false)
}

fn extremum(player: &mut Player, args: &[DatumRef], want_max: bool) -> BuiltinResult {
    // Accepts either a single list or a flat argument run.
    let refs: Vec<DatumRef> = match args.first().map(|r| player.get_datum(r)) {
        Some(Datum::List(_, items, _)) if args.len() == 1 => items.clone(),
        _ => args.to_vec(),
    };
    let mut best: Option<DatumRef> = None;
    for datum_ref in refs {
        let replace = match &best {
            None => true,
            Some(current) => {
                let ordering = super::super::compare::datum_compare(
                    &player.allocator,
                    player.get_datum(&datum_ref),
                    player.get_datum(current),
                );
                if want_max {
                    ordering == std::cmp::Ordering::Greater
                } else {
                    ordering == std::cmp::Ordering::Less
                }
            }
        };
        if replace {
            best = Some(datum_ref);
        }
    }
    Ok(best.unwrap_or(super::super::allocator::VOID_DATUM_REF))
}
