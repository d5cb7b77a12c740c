use crate::director::lingo::datum::{Datum, ListKind};

use super::super::{Player, ScriptError};
use super::handler_manager::{BytecodeCtx, HandlerExecutionResult};

type OpResult = Result<HandlerExecutionResult, ScriptError>;

pub fn push_zero(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let datum_ref = player.alloc_datum(Datum::Int(0));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn push_int(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let datum_ref = player.alloc_datum(Datum::Int(ctx.bytecode.obj as i32));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn push_f32(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let value = f32::from_bits(ctx.bytecode.obj as u32) as f64;
    let datum_ref = player.alloc_datum(Datum::Float(value));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn push_cons(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let literal_id = ctx.bytecode.obj as u32 / player.ctx_variable_multiplier(ctx);
    let literal = ctx
        .script
        .chunk
        .literals
        .get(literal_id as usize)
        .cloned()
        .unwrap_or(Datum::Void);
    let datum_ref = player.alloc_datum(literal);
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn push_symb(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let datum_ref = player.alloc_datum(Datum::Symbol(name));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn push_var_ref(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let datum_ref = player.alloc_datum(Datum::VarRef(name));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn push_arglist(player: &mut Player, ctx: &BytecodeCtx, no_ret: bool) -> OpResult {
    let count = ctx.bytecode.obj as usize;
    let scope = player.current_scope_mut()?;
    if scope.stack.len() < count {
        return Err(ScriptError::StackUnderflow);
    }
    let items = scope.pop_n(count);
    let kind = if no_ret {
        ListKind::ArgListNoRet
    } else {
        ListKind::ArgList
    };
    let datum_ref = player.alloc_datum(Datum::List(kind, items, false));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

/// The compiler pushes an arg-list first; `PushList` retags it as a
/// plain list value.
pub fn push_list(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let list_ref = player.pop_stack()?;
    let items = player.get_datum(&list_ref).to_list()?.clone();
    let datum_ref = player.alloc_datum(Datum::List(ListKind::List, items, false));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

/// Builds a property list from an arg-list of alternating keys and
/// values.
pub fn push_prop_list(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let list_ref = player.pop_stack()?;
    let items = player.get_datum(&list_ref).to_list()?.clone();
    if items.len() % 2 != 0 {
        return Err(ScriptError::TypeMismatch(
            "property list literal needs an even number of values".to_string(),
        ));
    }
    let entries = items
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    let datum_ref = player.alloc_datum(Datum::PropList(entries, false));
    player.push_stack(datum_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn peek(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let offset = ctx.bytecode.obj as usize;
    let scope = player.current_scope_mut()?;
    if scope.stack.len() <= offset {
        return Err(ScriptError::StackUnderflow);
    }
    let datum_ref = scope.stack[scope.stack.len() - 1 - offset];
    scope.stack.push(datum_ref);
    Ok(HandlerExecutionResult::Advance)
}

pub fn pop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let count = ctx.bytecode.obj as usize;
    player.current_scope_mut()?.pop_n(count);
    Ok(HandlerExecutionResult::Advance)
}

pub fn swap(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let a = player.pop_stack()?;
    let b = player.pop_stack()?;
    player.push_stack(a)?;
    player.push_stack(b)?;
    Ok(HandlerExecutionResult::Advance)
}
