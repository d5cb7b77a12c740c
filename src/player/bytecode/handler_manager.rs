use std::rc::Rc;

use crate::director::chunks::handler::{Bytecode, HandlerDef};
use crate::director::lingo::opcode::OpCode;
use crate::director::rifx::variable_multiplier;

use super::super::scope::Scope;
use super::super::script::Script;
use super::super::{Player, ScriptError};
use super::{arithmetics, compare, flow_control, get_set, stack, string};

/// How one instruction leaves the instruction pointer.
pub enum HandlerExecutionResult {
    Advance,
    Jump,
    Stop,
}

/// Everything an opcode handler needs besides the player itself. The
/// script is held by `Rc`, so no borrow of the player survives into the
/// handler body.
pub struct BytecodeCtx {
    pub bytecode: Bytecode,
    pub script: Rc<Script>,
    pub handler_index: usize,
}

impl BytecodeCtx {
    pub fn handler_def(&self) -> Result<&HandlerDef, ScriptError> {
        self.script
            .get_own_handler_at(self.handler_index)
            .ok_or(ScriptError::StackUnderflow)
    }
}

impl Player {
    /// Resolves a name-table id through the current script's cast
    /// context. Missing tables produce a `#<id>` placeholder.
    pub fn ctx_name(&self, ctx: &BytecodeCtx, id: u16) -> String {
        self.movie
            .cast_manager
            .get_cast(ctx.script.member_ref.cast_lib as u32)
            .ok()
            .and_then(|cast| cast.lctx.as_ref())
            .map(|lctx| lctx.name(id))
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn ctx_variable_multiplier(&self, ctx: &BytecodeCtx) -> u32 {
        self.movie
            .cast_manager
            .get_cast(ctx.script.member_ref.cast_lib as u32)
            .map(|cast| variable_multiplier(cast.capital_x, cast.dir_version))
            .unwrap_or(1)
    }
}

/// Redirects the instruction pointer to the instruction at byte offset
/// `dest_pos` within the current handler.
pub fn jump_to(
    player: &mut Player,
    ctx: &BytecodeCtx,
    dest_pos: usize,
) -> Result<HandlerExecutionResult, ScriptError> {
    let index = *ctx
        .handler_def()?
        .bytecode_index_map
        .get(&dest_pos)
        .ok_or(ScriptError::BadBranchTarget(dest_pos))?;
    player.current_scope_mut()?.bytecode_index = index;
    Ok(HandlerExecutionResult::Jump)
}

fn dispatch(
    player: &mut Player,
    ctx: &BytecodeCtx,
) -> Result<HandlerExecutionResult, ScriptError> {
    match ctx.bytecode.opcode {
        // stack
        OpCode::PushZero => stack::push_zero(player, ctx),
        OpCode::PushInt8 | OpCode::PushInt16 | OpCode::PushInt32 => stack::push_int(player, ctx),
        OpCode::PushFloat32 => stack::push_f32(player, ctx),
        OpCode::PushCons => stack::push_cons(player, ctx),
        OpCode::PushSymb => stack::push_symb(player, ctx),
        OpCode::PushVarRef => stack::push_var_ref(player, ctx),
        OpCode::PushList => stack::push_list(player, ctx),
        OpCode::PushPropList => stack::push_prop_list(player, ctx),
        OpCode::PushArgList => stack::push_arglist(player, ctx, false),
        OpCode::PushArgListNoRet => stack::push_arglist(player, ctx, true),
        OpCode::Peek => stack::peek(player, ctx),
        OpCode::Pop => stack::pop(player, ctx),
        OpCode::Swap => stack::swap(player, ctx),

        // arithmetic
        OpCode::Add => arithmetics::add(player, ctx),
        OpCode::Sub => arithmetics::sub(player, ctx),
        OpCode::Mul => arithmetics::mul(player, ctx),
        OpCode::Div => arithmetics::div(player, ctx),
        OpCode::Mod => arithmetics::modulo(player, ctx),
        OpCode::Inv => arithmetics::inv(player, ctx),

        // comparison and logic
        OpCode::Lt => compare::lt(player, ctx),
        OpCode::LtEq => compare::lt_eq(player, ctx),
        OpCode::Gt => compare::gt(player, ctx),
        OpCode::GtEq => compare::gt_eq(player, ctx),
        OpCode::Eq => compare::eq(player, ctx),
        OpCode::NtEq => compare::nt_eq(player, ctx),
        OpCode::And => compare::and(player, ctx),
        OpCode::Or => compare::or(player, ctx),
        OpCode::Not => compare::not(player, ctx),

        // strings
        OpCode::JoinStr => string::join_str(player, ctx),
        OpCode::JoinPadStr => string::join_pad_str(player, ctx),
        OpCode::ContainsStr => string::contains_str(player, ctx),
        OpCode::Contains0Str => string::contains_0str(player, ctx),
        OpCode::GetChunk => string::get_chunk(player, ctx),
        OpCode::PutChunk => string::put_chunk(player, ctx),
        OpCode::DeleteChunk => string::delete_chunk(player, ctx),
        OpCode::Put => string::put(player, ctx),

        // variables and properties
        OpCode::GetGlobal | OpCode::GetGlobal2 => get_set::get_global(player, ctx),
        OpCode::SetGlobal | OpCode::SetGlobal2 => get_set::set_global(player, ctx),
        OpCode::GetLocal => get_set::get_local(player, ctx),
        OpCode::SetLocal => get_set::set_local(player, ctx),
        OpCode::GetParam => get_set::get_param(player, ctx),
        OpCode::SetParam => get_set::set_param(player, ctx),
        OpCode::GetProp => get_set::get_prop(player, ctx),
        OpCode::SetProp => get_set::set_prop(player, ctx),
        OpCode::GetObjProp => get_set::get_obj_prop(player, ctx),
        OpCode::SetObjProp => get_set::set_obj_prop(player, ctx),
        OpCode::GetChainedProp => get_set::get_chained_prop(player, ctx),
        OpCode::GetMovieProp => get_set::get_movie_prop(player, ctx),
        OpCode::SetMovieProp => get_set::set_movie_prop(player, ctx),
        OpCode::GetTopLevelProp => get_set::get_top_level_prop(player, ctx),
        OpCode::TheBuiltin => get_set::the_built_in(player, ctx),
        OpCode::GetField => get_set::get_field(player, ctx),

        // control flow
        OpCode::Ret => flow_control::ret(player, ctx),
        OpCode::RetFactory => flow_control::ret_factory(player, ctx),
        OpCode::Jmp => flow_control::jmp(player, ctx),
        OpCode::JmpIfZ => flow_control::jmp_if_zero(player, ctx),
        OpCode::EndRepeat => flow_control::end_repeat(player, ctx),
        OpCode::LocalCall => flow_control::local_call(player, ctx),
        OpCode::ExtCall => flow_control::ext_call(player, ctx),
        OpCode::ObjCall | OpCode::ObjCallV4 => flow_control::obj_call(player, ctx),
        OpCode::NewObj => flow_control::new_obj(player, ctx),
        OpCode::StartTell => flow_control::start_tell(player, ctx),
        OpCode::EndTell => flow_control::end_tell(player, ctx),
        OpCode::TellCall => flow_control::tell_call(player, ctx),

        _ => Err(ScriptError::UnknownOpcode(ctx.bytecode.raw_opcode)),
    }
}

/// Runs the scope on top of the call stack to completion. The caller
/// pushes and pops the scope; the step budget is shared across the whole
/// top-level call.
pub fn execute_current_scope(player: &mut Player) -> Result<(), ScriptError> {
    loop {
        let ctx = {
            let scope = player.scopes.last().ok_or(ScriptError::StackUnderflow)?;
            let Some(handler) = scope.script.get_own_handler_at(scope.handler_index) else {
                return Ok(());
            };
            match handler.bytecode_array.get(scope.bytecode_index) {
                Some(bytecode) => BytecodeCtx {
                    bytecode: bytecode.clone(),
                    script: scope.script.clone(),
                    handler_index: scope.handler_index,
                },
                // Fell off the end of the bytecode: an implicit return.
                None => return Ok(()),
            }
        };

        if player.steps_remaining == 0 {
            return Err(ScriptError::StepLimit(player.step_budget));
        }
        player.steps_remaining -= 1;

        match dispatch(player, &ctx)? {
            HandlerExecutionResult::Advance => {
                player.current_scope_mut()?.bytecode_index += 1;
            }
            HandlerExecutionResult::Jump => {}
            HandlerExecutionResult::Stop => return Ok(()),
        }
    }
}

/// Pushes a scope for `(script, handler_index)` and runs it.
pub fn call_handler_scope(
    player: &mut Player,
    script: Rc<Script>,
    handler_index: usize,
    receiver: Option<crate::player::script::InstanceId>,
    args: Vec<crate::player::allocator::DatumRef>,
) -> Result<crate::player::scope::ScopeResult, ScriptError> {
    if player.scopes.len() >= super::super::MAX_SCOPE_DEPTH {
        return Err(ScriptError::CallDepthExceeded);
    }
    player
        .scopes
        .push(Scope::new(script, handler_index, receiver, args));
    let run_result = execute_current_scope(player);
    let scope = player.scopes.pop().ok_or(ScriptError::StackUnderflow)?;
    run_result.map(|_| crate::player::scope::ScopeResult {
        return_value: scope.return_value,
        passed: scope.passed,
    })
}
