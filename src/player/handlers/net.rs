use itertools::Itertools;

use crate::director::lingo::datum::{datum_bool, Datum};

use super::super::allocator::{DatumRef, VOID_DATUM_REF};
use super::super::net_task::{ResourceKind, TaskId};
use super::super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

fn task_id_arg(player: &Player, args: &[DatumRef]) -> Result<Option<TaskId>, ScriptError> {
    match args.first() {
        Some(datum_ref) => {
            let datum = player.get_datum(datum_ref);
            if datum.is_void() {
                Ok(None)
            } else {
                Ok(Some(datum.int_value()? as TaskId))
            }
        }
        None => Ok(None),
    }
}

pub fn preload_net_thing(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let url = args
        .first()
        .map(|r| player.get_datum(r).string_value())
        .transpose()?
        .unwrap_or_default();
    let task_id = player.net_manager.preload(&url, ResourceKind::Generic);
    Ok(player.alloc_datum(Datum::Int(task_id as i32)))
}

/// `postNetText(url, form)` where form is a string or a property list
/// url-encoded key=value&... by the runtime.
pub fn post_net_text(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let url = args
        .first()
        .map(|r| player.get_datum(r).string_value())
        .transpose()?
        .unwrap_or_default();
    let body = match args.get(1).map(|r| player.get_datum(r)) {
        Some(Datum::PropList(entries, _)) => {
            let entries = entries.clone();
            entries
                .iter()
                .map(|(k, v)| {
                    let key = player
                        .get_datum(k)
                        .string_value()
                        .unwrap_or_default();
                    let value = player
                        .get_datum(v)
                        .string_value()
                        .unwrap_or_default();
                    format!("{key}={value}")
                })
                .join("&")
        }
        Some(other) => other.string_value()?,
        None => String::new(),
    };
    let task_id = player.net_manager.post(&url, body);
    Ok(player.alloc_datum(Datum::Int(task_id as i32)))
}

pub fn net_done(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let task_id = task_id_arg(player, args)?;
    let done = player.net_manager.is_done(task_id);
    Ok(player.alloc_datum(datum_bool(done)))
}

pub fn net_text_result(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let task_id = task_id_arg(player, args)?;
    let text = player.net_manager.result_text(task_id).unwrap_or_default();
    Ok(player.alloc_datum(Datum::String(text)))
}

pub fn net_error(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let task_id = task_id_arg(player, args)?;
    let code = player.net_manager.error_code(task_id).unwrap_or(0);
    Ok(player.alloc_datum(Datum::Int(code)))
}

/// `getStreamStatus(id)` -> `[#URL:..., #state:..., #bytesSoFar:...,
/// #bytesTotal:..., #error:...]`.
pub fn get_stream_status(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let task_id = task_id_arg(player, args)?;
    let state = player.net_manager.task_state(task_id);
    let Some(state) = state else {
        return Ok(VOID_DATUM_REF);
    };

    let url = player.alloc_datum(Datum::String(state.url.clone()));
    let phase = player.alloc_datum(Datum::String(state.phase.status_str().to_string()));
    let bytes_so_far = player.alloc_datum(Datum::Int(state.bytes_so_far as i32));
    let bytes_total = player.alloc_datum(Datum::Int(state.bytes_total.unwrap_or(0) as i32));
    let error = player.alloc_datum(Datum::Int(state.error_code()));

    let entries = [
        ("URL", url),
        ("state", phase),
        ("bytesSoFar", bytes_so_far),
        ("bytesTotal", bytes_total),
        ("error", error),
    ]
    .into_iter()
    .map(|(key, value)| {
        let key_ref = player.alloc_datum(Datum::Symbol(key.to_string()));
        (key_ref, value)
    })
    .collect();
    Ok(player.alloc_datum(Datum::PropList(entries, false)))
}

/// Cast member preloading: everything is decoded at mount time in this
/// runtime, so preload succeeds immediately.
pub fn preload(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    Ok(player.alloc_datum(Datum::Int(1)))
}
