use crate::director::lingo::datum::Datum;

use super::allocator::{DatumRef, VOID_DATUM_REF};
use super::bytecode::handler_manager::BytecodeCtx;
use super::script::{instance_get_prop_opt, instance_set_prop_opt};
use super::{Player, ScriptError};

/// How `put` writes: replacing, prepending or appending.
#[derive(Copy, Clone)]
pub enum PutType {
    Into,
    Before,
    After,
}

impl PutType {
    pub fn from_wire(value: u8) -> Result<PutType, ScriptError> {
        match value {
            0x01 => Ok(PutType::Into),
            0x02 => Ok(PutType::After),
            0x03 => Ok(PutType::Before),
            other => Err(ScriptError::TypeMismatch(format!(
                "bad put variant {other:#04x}"
            ))),
        }
    }
}

/// Variable classes addressed by the `Put`/`PutChunk`/`DeleteChunk`
/// opcodes' low nibble.
const VAR_GLOBAL: u32 = 0x1;
const VAR_GLOBAL2: u32 = 0x2;
const VAR_PROPERTY: u32 = 0x3;
const VAR_PARAM: u32 = 0x4;
const VAR_LOCAL: u32 = 0x5;
const VAR_FIELD: u32 = 0x6;

/// Pops the identifier operand(s) a context-var access carries: the id,
/// plus a cast id for field access in Director 5 and later.
pub fn read_context_var_args(
    player: &mut Player,
    var_type: u32,
) -> Result<(DatumRef, Option<DatumRef>), ScriptError> {
    let cast_id = if var_type == VAR_FIELD && player.movie.dir_version >= 500 {
        Some(player.pop_stack()?)
    } else {
        None
    };
    let id = player.pop_stack()?;
    Ok((id, cast_id))
}

fn var_name(player: &Player, id_ref: &DatumRef) -> Result<String, ScriptError> {
    match player.get_datum(id_ref) {
        Datum::VarRef(name) => Ok(name.clone()),
        Datum::Symbol(name) => Ok(name.clone()),
        other => other.string_value(),
    }
}

pub fn get_context_var(
    player: &mut Player,
    ctx: &BytecodeCtx,
    id_ref: &DatumRef,
    cast_id_ref: Option<&DatumRef>,
    var_type: u32,
) -> Result<DatumRef, ScriptError> {
    match var_type {
        VAR_GLOBAL | VAR_GLOBAL2 => {
            let name = var_name(player, id_ref)?;
            Ok(player.globals.get(&name).copied().unwrap_or(VOID_DATUM_REF))
        }
        VAR_PROPERTY => {
            let name = var_name(player, id_ref)?;
            let receiver = player.current_scope_mut()?.receiver;
            match receiver {
                Some(instance_id) => Ok(instance_get_prop_opt(&player.allocator, instance_id, &name)
                    .unwrap_or(VOID_DATUM_REF)),
                None => Ok(VOID_DATUM_REF),
            }
        }
        VAR_PARAM => {
            let multiplier = player.ctx_variable_multiplier(ctx);
            let index = (player.get_datum(id_ref).int_value()? as u32 / multiplier) as usize;
            let scope = player.current_scope_mut()?;
            Ok(scope.args.get(index).copied().unwrap_or(VOID_DATUM_REF))
        }
        VAR_LOCAL => {
            let multiplier = player.ctx_variable_multiplier(ctx);
            let index = (player.get_datum(id_ref).int_value()? as u32 / multiplier) as usize;
            let scope = player.current_scope_mut()?;
            Ok(scope.locals.get(index).copied().unwrap_or(VOID_DATUM_REF))
        }
        VAR_FIELD => {
            let member_ref = resolve_field_ref(player, id_ref, cast_id_ref)?;
            let text = player
                .movie
                .cast_manager
                .field_text(&member_ref)
                .unwrap_or_default();
            Ok(player.alloc_datum(Datum::String(text)))
        }
        other => Err(ScriptError::TypeMismatch(format!(
            "bad context variable class {other}"
        ))),
    }
}

pub fn set_context_var(
    player: &mut Player,
    ctx: &BytecodeCtx,
    id_ref: &DatumRef,
    cast_id_ref: Option<&DatumRef>,
    var_type: u32,
    value_ref: DatumRef,
) -> Result<(), ScriptError> {
    match var_type {
        VAR_GLOBAL | VAR_GLOBAL2 => {
            let name = var_name(player, id_ref)?;
            player.globals.insert(name, value_ref);
            Ok(())
        }
        VAR_PROPERTY => {
            let name = var_name(player, id_ref)?;
            let receiver = player.current_scope_mut()?.receiver;
            if let Some(instance_id) = receiver {
                if !instance_set_prop_opt(&mut player.allocator, instance_id, &name, value_ref) {
                    if let Some(instance) = player.allocator.get_instance_mut(instance_id) {
                        instance.add_prop(name, value_ref);
                    }
                }
            }
            Ok(())
        }
        VAR_PARAM => {
            let multiplier = player.ctx_variable_multiplier(ctx);
            let index = (player.get_datum(id_ref).int_value()? as u32 / multiplier) as usize;
            let scope = player.current_scope_mut()?;
            if index < scope.args.len() {
                scope.args[index] = value_ref;
            }
            Ok(())
        }
        VAR_LOCAL => {
            let multiplier = player.ctx_variable_multiplier(ctx);
            let index = (player.get_datum(id_ref).int_value()? as u32 / multiplier) as usize;
            let scope = player.current_scope_mut()?;
            if index < scope.locals.len() {
                scope.locals[index] = value_ref;
            }
            Ok(())
        }
        VAR_FIELD => {
            let member_ref = resolve_field_ref(player, id_ref, cast_id_ref)?;
            let text = player.get_datum(&value_ref).string_value()?;
            let member = player
                .movie
                .cast_manager
                .find_mut_member_by_ref(&member_ref)
                .ok_or_else(|| ScriptError::TypeMismatch("field member not found".to_string()))?;
            if let Some(field) = member.member_type.as_field_mut() {
                field.text = text;
            } else if let Some(text_member) = member.member_type.as_text_mut() {
                text_member.text = text;
            } else {
                return Err(ScriptError::TypeMismatch(
                    "member is not a field".to_string(),
                ));
            }
            Ok(())
        }
        other => Err(ScriptError::TypeMismatch(format!(
            "bad context variable class {other}"
        ))),
    }
}

/// Resolves a field identifier (member number, name or reference) to a
/// concrete member, honoring an explicit cast id when present.
pub fn resolve_field_ref(
    player: &Player,
    id_ref: &DatumRef,
    cast_id_ref: Option<&DatumRef>,
) -> Result<super::cast_lib::CastMemberRef, ScriptError> {
    let id = player.get_datum(id_ref);
    let cast_manager = &player.movie.cast_manager;

    if let Datum::CastMember(member_ref) = id {
        return Ok(*member_ref);
    }

    let cast_number = match cast_id_ref.map(|r| player.get_datum(r)) {
        Some(Datum::Int(n)) if *n > 0 => Some(*n as u32),
        Some(Datum::String(name)) => cast_manager.get_cast_by_name(name).map(|c| c.number),
        _ => None,
    };

    match id {
        Datum::Int(number) => {
            if let Some(cast_number) = cast_number {
                Ok(super::cast_lib::CastMemberRef::new(
                    cast_number as u16,
                    *number as u16,
                ))
            } else {
                cast_manager
                    .find_member_ref_by_slot_number(*number)
                    .ok_or_else(|| {
                        ScriptError::TypeMismatch(format!("no field member {number}"))
                    })
            }
        }
        Datum::String(name) | Datum::Symbol(name) => cast_manager
            .find_member_ref_by_name(name)
            .ok_or_else(|| ScriptError::TypeMismatch(format!("no field member named {name}"))),
        other => Err(ScriptError::TypeMismatch(format!(
            "bad field identifier of type {}",
            other.type_str()
        ))),
    }
}
