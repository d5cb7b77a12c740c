use crate::director::lingo::datum::{
    datum_bool, Datum, StringChunkExpr, StringChunkKind, StringChunkSource,
};

use super::super::context_vars::{
    get_context_var, read_context_var_args, set_context_var, PutType,
};
use super::super::datum_formatting::datum_to_display_string;
use super::super::string_chunk::{resolve_chunk_expr, string_with_chunk_deleted};
use super::super::{Player, ScriptError};
use super::handler_manager::{BytecodeCtx, HandlerExecutionResult};

type OpResult = Result<HandlerExecutionResult, ScriptError>;

fn concat_value(player: &Player, datum: &Datum) -> String {
    datum_to_display_string(&player.allocator, datum)
}

pub fn join_str(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let joined = format!(
        "{}{}",
        concat_value(player, player.get_datum(&left_ref)),
        concat_value(player, player.get_datum(&right_ref))
    );
    let result_ref = player.alloc_datum(Datum::String(joined));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn join_pad_str(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let right_ref = player.pop_stack()?;
    let left_ref = player.pop_stack()?;
    let joined = format!(
        "{} {}",
        concat_value(player, player.get_datum(&left_ref)),
        concat_value(player, player.get_datum(&right_ref))
    );
    let result_ref = player.alloc_datum(Datum::String(joined));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

/// `a contains b`: case-insensitive substring test; against a list it
/// tests each string element.
pub fn contains_str(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let search_ref = player.pop_stack()?;
    let subject_ref = player.pop_stack()?;
    let search = player
        .get_datum(&search_ref)
        .string_value()?
        .to_ascii_lowercase();
    let subject = player.get_datum(&subject_ref);

    let contains = if subject.is_list() {
        let mut found = false;
        for item_ref in subject.to_list()?.clone() {
            let item = player.get_datum(&item_ref);
            if item.is_string() && item.string_value()?.to_ascii_lowercase().contains(&search) {
                found = true;
                break;
            }
        }
        found
    } else if subject.is_string() {
        subject
            .string_value()?
            .to_ascii_lowercase()
            .contains(&search)
    } else {
        false
    };

    let result_ref = player.alloc_datum(datum_bool(contains));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

/// `a starts b`: case-insensitive prefix test.
pub fn contains_0str(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let search_ref = player.pop_stack()?;
    let subject_ref = player.pop_stack()?;
    let subject = player.get_datum(&subject_ref);
    let result = if subject.is_void() {
        false
    } else {
        let search = player
            .get_datum(&search_ref)
            .string_value()?
            .to_ascii_lowercase();
        subject
            .string_value()?
            .to_ascii_lowercase()
            .starts_with(&search)
    };
    let result_ref = player.alloc_datum(datum_bool(result));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

/// The chunk opcodes carry four first/last pairs, one per chunk kind;
/// the innermost non-zero pair selects the kind.
fn pop_chunk_expr(player: &mut Player) -> Result<StringChunkExpr, ScriptError> {
    let last_line = pop_int(player)?;
    let first_line = pop_int(player)?;
    let last_item = pop_int(player)?;
    let first_item = pop_int(player)?;
    let last_word = pop_int(player)?;
    let first_word = pop_int(player)?;
    let last_char = pop_int(player)?;
    let first_char = pop_int(player)?;

    let item_delimiter = player.movie.item_delimiter;
    let (kind, start, end) = if first_line != 0 || last_line != 0 {
        (StringChunkKind::Line, first_line, last_line)
    } else if first_item != 0 || last_item != 0 {
        (StringChunkKind::Item, first_item, last_item)
    } else if first_word != 0 || last_word != 0 {
        (StringChunkKind::Word, first_word, last_word)
    } else if first_char != 0 || last_char != 0 {
        (StringChunkKind::Char, first_char, last_char)
    } else {
        return Err(ScriptError::TypeMismatch(
            "chunk expression selects no range".to_string(),
        ));
    };

    Ok(StringChunkExpr {
        kind,
        start,
        end,
        item_delimiter,
    })
}

fn pop_int(player: &mut Player) -> Result<i32, ScriptError> {
    let datum_ref = player.pop_stack()?;
    player.get_datum(&datum_ref).int_value()
}

pub fn get_chunk(player: &mut Player, _ctx: &BytecodeCtx) -> OpResult {
    let string_ref = player.pop_stack()?;
    let chunk_expr = pop_chunk_expr(player)?;
    let text = player.get_datum(&string_ref).string_value()?;
    let resolved = resolve_chunk_expr(&text, &chunk_expr);
    let result_ref = player.alloc_datum(Datum::StringChunk(
        StringChunkSource::Datum(string_ref),
        chunk_expr,
        resolved,
    ));
    player.push_stack(result_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

/// `put value into/before/after <var or chunk>`.
pub fn put(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let put_type = PutType::from_wire(((ctx.bytecode.obj >> 4) & 0xF) as u8)?;
    let var_type = (ctx.bytecode.obj & 0xF) as u32;
    let (id_ref, cast_id_ref) = read_context_var_args(player, var_type)?;
    let value_ref = player.pop_stack()?;

    match put_type {
        PutType::Into => set_context_var(player, ctx, &id_ref, cast_id_ref.as_ref(), var_type, value_ref)?,
        PutType::Before | PutType::After => {
            let current_ref = get_context_var(player, ctx, &id_ref, cast_id_ref.as_ref(), var_type)?;
            let current = player.get_datum(&current_ref).string_value().unwrap_or_default();
            let addition = player.get_datum(&value_ref).string_value()?;
            let combined = match put_type {
                PutType::Before => format!("{addition}{current}"),
                _ => format!("{current}{addition}"),
            };
            let combined_ref = player.alloc_datum(Datum::String(combined));
            set_context_var(player, ctx, &id_ref, cast_id_ref.as_ref(), var_type, combined_ref)?;
        }
    }
    Ok(HandlerExecutionResult::Advance)
}

/// Writes through a chunk expression into a variable or field, resizing
/// the underlying string as needed.
pub fn put_chunk(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let put_type = PutType::from_wire(((ctx.bytecode.obj >> 4) & 0xF) as u8)?;
    let var_type = (ctx.bytecode.obj & 0xF) as u32;
    let (id_ref, cast_id_ref) = read_context_var_args(player, var_type)?;
    let value_ref = player.pop_stack()?;
    let chunk_expr = pop_chunk_expr(player)?;

    let target_ref = get_context_var(player, ctx, &id_ref, cast_id_ref.as_ref(), var_type)?;
    let original = player.get_datum(&target_ref).string_value().unwrap_or_default();
    let new_value = player.get_datum(&value_ref).string_value()?;

    let selected = resolve_chunk_expr(&original, &chunk_expr);
    let replacement = match put_type {
        PutType::Into => new_value,
        PutType::Before => format!("{new_value}{selected}"),
        PutType::After => format!("{selected}{new_value}"),
    };
    let updated = super::super::string_chunk::string_with_chunk_replaced(
        &original,
        &chunk_expr,
        &replacement,
    );
    let updated_ref = player.alloc_datum(Datum::String(updated));
    set_context_var(player, ctx, &id_ref, cast_id_ref.as_ref(), var_type, updated_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

pub fn delete_chunk(player: &mut Player, ctx: &BytecodeCtx) -> OpResult {
    let var_type = (ctx.bytecode.obj & 0xF) as u32;
    let (id_ref, cast_id_ref) = read_context_var_args(player, var_type)?;
    let chunk_expr = pop_chunk_expr(player)?;

    let target_ref = get_context_var(player, ctx, &id_ref, cast_id_ref.as_ref(), var_type)?;
    let original = player.get_datum(&target_ref).string_value().unwrap_or_default();
    let updated = string_with_chunk_deleted(&original, &chunk_expr);
    let updated_ref = player.alloc_datum(Datum::String(updated));
    set_context_var(player, ctx, &id_ref, cast_id_ref.as_ref(), var_type, updated_ref)?;
    Ok(HandlerExecutionResult::Advance)
}

/// Applies a chunk-expression write back to its source, used by the
/// `setContents`-style datum handlers.
pub fn write_chunk_source(
    player: &mut Player,
    source: &StringChunkSource,
    expr: &StringChunkExpr,
    new_text: String,
) -> Result<(), ScriptError> {
    match source {
        StringChunkSource::Datum(target_ref) => {
            let original = player.get_datum(target_ref).string_value()?;
            let updated =
                super::super::string_chunk::string_with_chunk_replaced(&original, expr, &new_text);
            *player.get_datum_mut(target_ref).to_string_mut()? = updated;
            Ok(())
        }
        StringChunkSource::Member(member_ref) => {
            let original = player
                .movie
                .cast_manager
                .field_text(member_ref)
                .unwrap_or_default();
            let updated =
                super::super::string_chunk::string_with_chunk_replaced(&original, expr, &new_text);
            let member = player
                .movie
                .cast_manager
                .find_mut_member_by_ref(member_ref)
                .ok_or_else(|| {
                    ScriptError::TypeMismatch("chunk target member not found".to_string())
                })?;
            if let Some(field) = member.member_type.as_field_mut() {
                field.text = updated;
            } else if let Some(text) = member.member_type.as_text_mut() {
                text.text = updated;
            } else {
                return Err(ScriptError::TypeMismatch(
                    "chunk target member holds no text".to_string(),
                ));
            }
            Ok(())
        }
    }
}
