use crate::director::lingo::datum::{Datum, ListKind};

use super::super::allocator::{DatumRef, VOID_DATUM_REF};
use super::super::{Player, ScriptError};
use super::handler_manager::{jump_to, BytecodeCtx, HandlerExecutionResult};

type OpResult = Result<HandlerExecutionResult, ScriptError>;

pub fn ret(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let scope = player.current_scope_mut()?;
    // A value left on the stack is the handler's result, unless an
    // explicit `return` already set one.
    if scope.return_value.is_void() {
        if let Some(top) = scope.stack.last() {
            scope.return_value = *top;
        }
    }
    scope.stack.clear();
    Ok(HandlerExecutionResult::Stop)
}

/// Factory-style return: the receiver instance is the result.
pub fn ret_factory(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let scope = player.current_scope_mut()?;
    let receiver = scope.receiver;
    scope.stack.clear();
    if let Some(instance_id) = receiver {
        let value = player.alloc_datum(Datum::ScriptInstance(instance_id));
        player.current_scope_mut()?.return_value = value;
    }
    Ok(HandlerExecutionResult::Stop)
}

pub fn jmp(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let dest = ctx.bytecode.pos as i64 + ctx.bytecode.obj;
    jump_to(player, ctx, dest as usize)
}

pub fn jmp_if_zero(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let value_ref = player.pop_stack()?;
    let truthy = player.get_datum(&value_ref).bool_value();
    if truthy {
        Ok(HandlerExecutionResult::Advance)
    } else {
        let dest = ctx.bytecode.pos as i64 + ctx.bytecode.obj;
        jump_to(player, ctx, dest as usize)
    }
}

/// Loop back-edge: the operand is a byte distance backwards.
pub fn end_repeat(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let dest = ctx.bytecode.pos as i64 - ctx.bytecode.obj;
    jump_to(player, ctx, dest as usize)
}

fn pop_arg_list(player: &mut Player) -> Result<(Vec<DatumRef>, bool), ScriptError> {
    let list_ref = player.pop_stack()?;
    match player.get_datum(&list_ref) {
        Datum::List(kind, items, _) => Ok((
            items.clone(),
            matches!(kind, ListKind::ArgListNoRet),
        )),
        other => Err(ScriptError::TypeMismatch(format!(
            "call expected an argument list, got {}",
            other.type_str()
        ))),
    }
}

/// Call a handler in the current script by index.
pub fn local_call(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let (args, no_ret) = pop_arg_list(player)?;
    let handler_index = ctx.bytecode.obj as usize;
    let receiver = player.current_scope_mut()?.receiver;

    let result = player.call_script_handler_at(ctx.script.clone(), handler_index, receiver, args)?;
    if result.passed {
        player.current_scope_mut()?.passed = true;
    }
    player.last_handler_result = result.return_value;
    if !no_ret {
        player.push_stack(result.return_value)?;
    }
    Ok(HandlerExecutionResult::Advance)
}

/// Call by name: user handlers anywhere in scope first, then the
/// builtin library. `return` is folded into this opcode by the compiler.
pub fn ext_call(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let (args, no_ret) = pop_arg_list(player)?;

    if name.eq_ignore_ascii_case("return") {
        let value = args.first().copied().unwrap_or(VOID_DATUM_REF);
        let scope = player.current_scope_mut()?;
        scope.return_value = value;
        scope.stack.clear();
        return Ok(HandlerExecutionResult::Stop);
    }

    let result = player.call_global_handler(&name, &args)?;
    player.last_handler_result = result;
    if !no_ret {
        player.push_stack(result)?;
    }
    Ok(HandlerExecutionResult::Advance)
}

/// Method call: the first argument is the receiver.
pub fn obj_call(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let (args, no_ret) = pop_arg_list(player)?;
    if args.is_empty() {
        return Err(ScriptError::BadReceiver(format!(
            "method call {name} without a receiver"
        )));
    }
    let obj_ref = args[0];
    let rest = args[1..].to_vec();
    let result = player.call_datum_handler(&obj_ref, &name, &rest)?;
    player.last_handler_result = result;
    if !no_ret {
        player.push_stack(result)?;
    }
    Ok(HandlerExecutionResult::Advance)
}

/// `new script(...)`: builds an instance of a named parent script.
pub fn new_obj(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let obj_type = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    if !obj_type.eq_ignore_ascii_case("script") {
        return Err(ScriptError::TypeMismatch(format!(
            "cannot instantiate {obj_type}"
        )));
    }
    let (args, _) = pop_arg_list(player)?;
    if args.is_empty() {
        return Err(ScriptError::BadReceiver(
            "new script() without a script name".to_string(),
        ));
    }
    let script_name = player.get_datum(&args[0]).string_value()?;
    let extra_args = args[1..].to_vec();
    let result = player.new_script_instance_by_name(&script_name, &extra_args)?;
    player.push_stack(result)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn start_tell(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let target = player.pop_stack()?;
    player.current_scope_mut()?.tell_targets.push(target);
    Ok(HandlerExecutionResult::Advance)
}

pub fn end_tell(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    player.current_scope_mut()?.tell_targets.pop();
    Ok(HandlerExecutionResult::Advance)
}

/// Call dispatched at the current tell target.
pub fn tell_call(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let (args, no_ret) = pop_arg_list(player)?;
    let target = player
        .current_scope_mut()?
        .tell_target()
        .copied();
    let result = match target {
        Some(target_ref) => player.call_datum_handler(&target_ref, &name, &args)?,
        None => player.call_global_handler(&name, &args)?,
    };
    player.last_handler_result = result;
    if !no_ret {
        player.push_stack(result)?;
    }
    Ok(HandlerExecutionResult::Advance)
}
