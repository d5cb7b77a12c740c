use crate::director::lingo::datum::{Datum, StringChunkKind};

use super::super::allocator::DatumRef;
use super::super::string_chunk::chunk_count;
use super::super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

fn arg_string(player: &Player, args: &[DatumRef], index: usize) -> Result<String, ScriptError> {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
        .string_value()
}

fn arg_int(player: &Player, args: &[DatumRef], index: usize) -> Result<i32, ScriptError> {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
        .int_value()
}

pub fn length(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let text = arg_string(player, args, 0)?;
    Ok(player.alloc_datum(Datum::Int(text.chars().count() as i32)))
}

/// `chars(string, first, last)`, 1-based inclusive.
pub fn chars(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let text = arg_string(player, args, 0)?;
    let first = arg_int(player, args, 1)?;
    let last = if args.len() > 2 {
        arg_int(player, args, 2)?
    } else {
        first
    };
    let result = chunk_range(&text, StringChunkKind::Char, first, last, player.movie.item_delimiter);
    Ok(player.alloc_datum(Datum::String(result)))
}

fn chunk_range(text: &str, kind: StringChunkKind, first: i32, last: i32, delim: char) -> String {
    let expr = crate::director::lingo::datum::StringChunkExpr {
        kind,
        start: first,
        end: last,
        item_delimiter: delim,
    };
    super::super::string_chunk::resolve_chunk_expr(text, &expr)
}

fn single_chunk(
    player: &mut Player,
    args: &[DatumRef],
    kind: StringChunkKind,
) -> BuiltinResult {
    // Accepts both (index[, last], string) and (string, index[, last]).
    let delim = player.movie.item_delimiter;
    let string_first = args
        .first()
        .map(|r| player.get_datum(r).is_string())
        .unwrap_or(false);
    let (text, first, last) = if string_first {
        let text = arg_string(player, args, 0)?;
        let first = arg_int(player, args, 1)?;
        let last = if args.len() > 2 {
            arg_int(player, args, 2)?
        } else {
            first
        };
        (text, first, last)
    } else if args.len() >= 3 {
        let first = arg_int(player, args, 0)?;
        let last = arg_int(player, args, 1)?;
        (arg_string(player, args, 2)?, first, last)
    } else {
        let index = arg_int(player, args, 0)?;
        (arg_string(player, args, 1)?, index, index)
    };
    let result = chunk_range(&text, kind, first, last, delim);
    Ok(player.alloc_datum(Datum::String(result)))
}

pub fn char_chunk(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    single_chunk(player, args, StringChunkKind::Char)
}

pub fn word_chunk(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    single_chunk(player, args, StringChunkKind::Word)
}

pub fn item_chunk(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    single_chunk(player, args, StringChunkKind::Item)
}

pub fn line_chunk(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    single_chunk(player, args, StringChunkKind::Line)
}

/// `count(target, #kind)` for strings, or `count(list)` for containers.
pub fn count(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target = args
        .first()
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void);
    let result = match target {
        Datum::List(_, items, _) => items.len() as i32,
        Datum::PropList(entries, _) => entries.len() as i32,
        other => {
            let text = other.string_value()?;
            let kind_name = match args.get(1).map(|r| player.get_datum(r)) {
                Some(Datum::Symbol(s)) => s.clone(),
                Some(other) => other.string_value()?,
                None => {
                    return Err(ScriptError::TypeMismatch(
                        "count of a string needs a chunk kind".to_string(),
                    ))
                }
            };
            let kind = StringChunkKind::from_name(&kind_name).ok_or_else(|| {
                ScriptError::TypeMismatch(format!("unknown chunk kind #{kind_name}"))
            })?;
            chunk_count(&text, kind, player.movie.item_delimiter) as i32
        }
    };
    Ok(player.alloc_datum(Datum::Int(result)))
}

/// `offset(needle, haystack)`: 1-based position of the first
/// case-insensitive match, 0 when absent.
pub fn offset(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    // rect offset shares the name; dispatch on the argument shape.
    if let Some(Datum::IntRect(_)) = args.first().map(|r| player.get_datum(r)) {
        return super::geometry::offset_rect(player, args);
    }
    let needle = arg_string(player, args, 0)?.to_ascii_lowercase();
    let haystack = arg_string(player, args, 1)?.to_ascii_lowercase();
    let position = if needle.is_empty() {
        0
    } else {
        haystack
            .find(&needle)
            .map(|byte_index| haystack[..byte_index].chars().count() as i32 + 1)
            .unwrap_or(0)
    };
    Ok(player.alloc_datum(Datum::Int(position)))
}

pub fn char_to_num(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let text = arg_string(player, args, 0)?;
    let code = text.chars().next().map(|c| c as i32).unwrap_or(0);
    Ok(player.alloc_datum(Datum::Int(code)))
}

pub fn num_to_char(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let code = arg_int(player, args, 0)?;
    let text = char::from_u32((code as u32) & 0xFF)
        .map(|c| c.to_string())
        .unwrap_or_default();
    Ok(player.alloc_datum(Datum::String(text)))
}

pub fn space(player: &mut Player, _args: &[DatumRef]) -> BuiltinResult {
    Ok(player.alloc_datum(Datum::String(" ".to_string())))
}
