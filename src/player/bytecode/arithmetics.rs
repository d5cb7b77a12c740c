use super::super::datum_operations::{
    add_datums, divide_datums, mod_datums, multiply_datums, negate_datum, subtract_datums,
};
use super::super::{Player, ScriptError};
use super::handler_manager::{BytecodeCtx, HandlerExecutionResult};

type OpResult = Result<HandlerExecutionResult, ScriptError>;

fn binary_op(
    player: &mut Player,
    op: fn(
        &mut Player,
        crate::director::lingo::datum::Datum,
        crate::director::lingo::datum::Datum,
    ) -> Result<crate::director::lingo::datum::Datum, ScriptError>,
) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let left = player.get_datum(&left_ref).clone();
    let right = player.get_datum(&right_ref).clone();
    let result = op(player, left, right)?;
    let result_ref = player.alloc_datum(result);
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn add(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    binary_op(player, add_datums)
}

pub fn sub(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    binary_op(player, subtract_datums)
}

pub fn mul(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    binary_op(player, multiply_datums)
}

pub fn div(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    binary_op(player, divide_datums)
}

pub fn modulo(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    binary_op(player, mod_datums)
}

pub fn inv(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let value_ref = player.pop_stack()?;
    let value = player.get_datum(&value_ref).clone();
    let result = negate_datum(value)?;
    let result_ref = player.alloc_datum(result);
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}
