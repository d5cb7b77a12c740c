use log::warn;

use crate::director::lingo::datum::Datum;

use super::super::allocator::VOID_DATUM_REF;
use super::super::context_vars::resolve_field_ref;
use super::super::script::{instance_get_prop_opt, instance_set_prop_opt};
use super::super::{Player, ScriptError};
use super::handler_manager::{BytecodeCtx, HandlerExecutionResult};

type OpResult = Result<HandlerExecutionResult, ScriptError>;

pub fn get_global(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = player.globals.get(&name).copied().unwrap_or(VOID_DATUM_REF);
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn set_global(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = player.pop_stack()?;
    player.globals.insert(name, value);
    Ok(HandlerExecutionResult::Advance)
}

fn slot_index(player: &Player, ctx: &BytecodeCtx) -> usize {
    (ctx.bytecode.obj as u32 / player.ctx_variable_multiplier(ctx)) as usize
}

pub fn get_local(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let index = slot_index(player, ctx);
    let scope = player.current_scope_mut()?;
    let value = scope.locals.get(index).copied().unwrap_or(VOID_DATUM_REF);
    scope.stack.push(value);
    Ok(HandlerExecutionResult::Advance)
}

pub fn set_local(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let index = slot_index(player, ctx);
    let value = player.pop_stack()?;
    let scope = player.current_scope_mut()?;
    if index >= scope.locals.len() {
        scope.locals.resize(index + 1, VOID_DATUM_REF);
    }
    scope.locals[index] = value;
    Ok(HandlerExecutionResult::Advance)
}

pub fn get_param(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let index = slot_index(player, ctx);
    let scope = player.current_scope_mut()?;
    let value = scope.args.get(index).copied().unwrap_or(VOID_DATUM_REF);
    scope.stack.push(value);
    Ok(HandlerExecutionResult::Advance)
}

pub fn set_param(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let index = slot_index(player, ctx);
    let value = player.pop_stack()?;
    let scope = player.current_scope_mut()?;
    if index >= scope.args.len() {
        scope.args.resize(index + 1, VOID_DATUM_REF);
    }
    scope.args[index] = value;
    Ok(HandlerExecutionResult::Advance)
}

/// Property access with an implicit receiver: the behavior instance when
/// one is bound, the script's static property bag otherwise.
pub fn get_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let receiver = player.current_scope_mut()?.receiver;
    let value = match receiver {
        Some(instance_id) => player.instance_get_prop(instance_id, &name)?,
        None => player.script_static_prop(&ctx.script.member_ref, &name),
    };
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn set_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = player.pop_stack()?;
    let receiver = player.current_scope_mut()?.receiver;
    match receiver {
        Some(instance_id) => player.instance_set_prop(instance_id, &name, value)?,
        None => player.set_script_static_prop(ctx.script.member_ref, &name, value),
    }
    Ok(HandlerExecutionResult::Advance)
}

pub fn get_obj_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let obj_ref = player.pop_stack()?;
    let value = player.get_obj_prop(&obj_ref, &name)?;
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn set_obj_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = player.pop_stack()?;
    let obj_ref = player.pop_stack()?;
    player.set_obj_prop(&obj_ref, &name, value)?;
    Ok(HandlerExecutionResult::Advance)
}

/// Like `get_obj_prop` but used for `a.b.c` chains; unknown links give
/// void so the chain keeps evaluating.
pub fn get_chained_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let obj_ref = player.pop_stack()?;
    let value = match player.get_obj_prop(&obj_ref, &name) {
        Ok(value) => value,
        Err(err) => {
            warn!("chained property {name} failed: {err}");
            VOID_DATUM_REF
        }
    };
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn get_movie_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = player.get_movie_prop(&name)?;
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn set_movie_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = player.pop_stack()?;
    player.set_movie_prop(&name, value)?;
    Ok(HandlerExecutionResult::Advance)
}

/// Director 8 top-level objects (`_movie`, `_player`, ...). The movie
/// surface covers what the core exposes.
pub fn get_top_level_prop(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = player.get_movie_prop(&name)?;
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

/// `the <something>` reads that are neither movie nor sprite scoped.
pub fn the_built_in(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let name = player.ctx_name(ctx, ctx.bytecode.obj as u16);
    let value = match name.as_str() {
        "paramCount" => {
            let count = player.current_scope_mut()?.args.len() as i32;
            player.alloc_datum(Datum::Int(count))
        }
        "result" => player.last_handler_result,
        _ => player.get_movie_prop(&name)?,
    };
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn get_field(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let cast_id_ref = if player.movie.dir_version >= 500 {
        Some(player.pop_stack()?)
    } else {
        None
    };
    let id_ref = player.pop_stack()?;
    let member_ref = resolve_field_ref(player, &id_ref, cast_id_ref.as_ref())?;
    let text = player
        .movie
        .cast_manager
        .field_text(&member_ref)
        .unwrap_or_default();
    let value = player.alloc_datum(Datum::String(text));
    player.push_stack(value)?;
    Ok(HandlerExecutionResult::Advance)
}

impl Player {
    /// Instance property read, `ancestor` included.
    pub fn instance_get_prop(
        &mut self,
        instance_id: super::super::script::InstanceId,
        name: &str,
    ) -> Result<super::super::allocator::DatumRef, ScriptError> {
        if name.eq_ignore_ascii_case("ancestor") {
            let ancestor = self
                .allocator
                .get_instance(instance_id)
                .and_then(|i| i.ancestor);
            return Ok(match ancestor {
                Some(id) => self.alloc_datum(Datum::ScriptInstance(id)),
                None => VOID_DATUM_REF,
            });
        }
        match instance_get_prop_opt(&self.allocator, instance_id, name) {
            Some(value) => Ok(value),
            None => {
                warn!("instance {instance_id} has no property {name}");
                Ok(VOID_DATUM_REF)
            }
        }
    }

    /// Instance property write; undeclared names are added to the
    /// instance itself, and `ancestor` rewires the chain.
    pub fn instance_set_prop(
        &mut self,
        instance_id: super::super::script::InstanceId,
        name: &str,
        value: super::super::allocator::DatumRef,
    ) -> Result<(), ScriptError> {
        if name.eq_ignore_ascii_case("ancestor") {
            let ancestor = match self.get_datum(&value) {
                Datum::ScriptInstance(id) => Some(*id),
                Datum::Void => None,
                other => {
                    return Err(ScriptError::TypeMismatch(format!(
                        "ancestor must be a script instance, got {}",
                        other.type_str()
                    )))
                }
            };
            if let Some(instance) = self.allocator.get_instance_mut(instance_id) {
                instance.ancestor = ancestor;
            }
            return Ok(());
        }
        if !instance_set_prop_opt(&mut self.allocator, instance_id, name, value) {
            if let Some(instance) = self.allocator.get_instance_mut(instance_id) {
                instance.add_prop(name.to_string(), value);
            }
        }
        Ok(())
    }
}
