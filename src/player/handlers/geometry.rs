use crate::director::lingo::datum::{datum_bool, Datum};

use super::super::allocator::DatumRef;
use super::super::geometry::{
    point_inside, point_map, rect_intersect, rect_map, rect_offset, rect_union,
};
use super::super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

fn arg_datum<'a>(player: &'a Player, args: &[DatumRef], index: usize) -> &'a Datum {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
}

fn arg_int(player: &Player, args: &[DatumRef], index: usize) -> Result<i32, ScriptError> {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
        .int_value()
}

pub fn point(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let x = arg_int(player, args, 0)?;
    let y = arg_int(player, args, 1)?;
    Ok(player.alloc_datum(Datum::IntPoint((x, y))))
}

pub fn rect(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    // rect(l, t, r, b) or rect(topLeftPoint, bottomRightPoint)
    if args.len() == 2 {
        let tl = arg_datum(player, args, 0).to_int_point()?;
        let br = arg_datum(player, args, 1).to_int_point()?;
        return Ok(player.alloc_datum(Datum::IntRect((tl.0, tl.1, br.0, br.1))));
    }
    let l = arg_int(player, args, 0)?;
    let t = arg_int(player, args, 1)?;
    let r = arg_int(player, args, 2)?;
    let b = arg_int(player, args, 3)?;
    Ok(player.alloc_datum(Datum::IntRect((l, t, r, b))))
}

pub fn union(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let a = arg_datum(player, args, 0).to_int_rect()?;
    let b = arg_datum(player, args, 1).to_int_rect()?;
    Ok(player.alloc_datum(Datum::IntRect(rect_union(&a, &b))))
}

pub fn intersect(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let a = arg_datum(player, args, 0).to_int_rect()?;
    let b = arg_datum(player, args, 1).to_int_rect()?;
    Ok(player.alloc_datum(Datum::IntRect(rect_intersect(&a, &b))))
}

pub fn inside(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let point = arg_datum(player, args, 0).to_int_point()?;
    let rect = arg_datum(player, args, 1).to_int_rect()?;
    Ok(player.alloc_datum(datum_bool(point_inside(&point, &rect))))
}

/// `map(target, srcRect, dstRect)` for points and rects.
pub fn map(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let src = arg_datum(player, args, 1).to_int_rect()?;
    let dst = arg_datum(player, args, 2).to_int_rect()?;
    let result = match arg_datum(player, args, 0) {
        Datum::IntPoint(p) => Datum::IntPoint(point_map(p, &src, &dst)),
        Datum::IntRect(r) => Datum::IntRect(rect_map(r, &src, &dst)),
        other => {
            return Err(ScriptError::TypeMismatch(format!(
                "map needs a point or rect, got {}",
                other.type_str()
            )))
        }
    };
    Ok(player.alloc_datum(result))
}

/// `offset(rect, dh, dv)`; the string `offset` lives with the string
/// builtins and dispatches here when it sees a rect.
pub fn offset_rect(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let rect = arg_datum(player, args, 0).to_int_rect()?;
    let dh = arg_int(player, args, 1)?;
    let dv = arg_int(player, args, 2)?;
    Ok(player.alloc_datum(Datum::IntRect(rect_offset(&rect, dh, dv))))
}
