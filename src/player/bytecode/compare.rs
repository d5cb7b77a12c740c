use crate::director::lingo::datum::datum_bool;

use super::super::compare::{datum_compare, datum_equals};
use super::super::{Player, ScriptError};
use super::handler_manager::{BytecodeCtx, HandlerExecutionResult};

type OpResult = Result<HandlerExecutionResult, ScriptError>;

fn compare_op(player: &mut Player, test: fn(std::cmp::Ordering) -> bool) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let ordering = {
        let left = player.get_datum(&left_ref);
        let right = player.get_datum(&right_ref);
        datum_compare(&player.allocator, left, right)
    };
    let result_ref = player.alloc_datum(datum_bool(test(ordering)));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn lt(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    compare_op(player, |o| o == std::cmp::Ordering::Less)
}

pub fn lt_eq(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    compare_op(player, |o| o != std::cmp::Ordering::Greater)
}

pub fn gt(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    compare_op(player, |o| o == std::cmp::Ordering::Greater)
}

pub fn gt_eq(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    compare_op(player, |o| o != std::cmp::Ordering::Less)
}

pub fn eq(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let equal = {
        let left = player.get_datum(&left_ref);
        let right = player.get_datum(&right_ref);
        datum_equals(&player.allocator, left, right)
    };
    let result_ref = player.alloc_datum(datum_bool(equal));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn nt_eq(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let equal = {
        let left = player.get_datum(&left_ref);
        let right = player.get_datum(&right_ref);
        datum_equals(&player.allocator, left, right)
    };
    let result_ref = player.alloc_datum(datum_bool(!equal));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn and(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let value =
        player.get_datum(&left_ref).bool_value() && player.get_datum(&right_ref).bool_value();
    let result_ref = player.alloc_datum(datum_bool(value));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn or(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let value =
        player.get_datum(&left_ref).bool_value() || player.get_datum(&right_ref).bool_value();
    let result_ref = player.alloc_datum(datum_bool(value));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn not(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let value_ref = player.pop_stack()?;
    let value = player.get_datum(&value_ref).bool_value();
    let result_ref = player.alloc_datum(datum_bool(!value));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}
