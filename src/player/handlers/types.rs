use crate::director::lingo::datum::{datum_bool, Datum};

use super::super::allocator::{DatumRef, VOID_DATUM_REF};
use super::super::datum_formatting::datum_to_display_string;
use super::super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

fn arg<'a>(player: &'a Player, args: &[DatumRef], index: usize) -> &'a Datum {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
}

/// `integer(x)`. A string that does not parse comes back unchanged,
/// which is what `integer(value)`-style probing code relies on.
pub fn integer(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let datum = arg(player, args, 0).clone();
    match datum {
        Datum::Int(_) | Datum::Void => Ok(args.first().copied().unwrap_or(VOID_DATUM_REF)),
        Datum::Float(f) => Ok(player.alloc_datum(Datum::Int(f as i32))),
        Datum::String(s) | Datum::StringChunk(_, _, s) => match s.trim().parse::<f64>() {
            Ok(parsed) => Ok(player.alloc_datum(Datum::Int(parsed as i32))),
            Err(_) => Ok(args[0]),
        },
        _ => Ok(args[0]),
    }
}

/// `float(x)`; unparsable strings come back unchanged, same as
/// `integer`.
pub fn float(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let datum = arg(player, args, 0).clone();
    match datum {
        Datum::Float(_) => Ok(args[0]),
        Datum::Int(n) => Ok(player.alloc_datum(Datum::Float(n as f64))),
        Datum::String(s) | Datum::StringChunk(_, _, s) => match s.trim().parse::<f64>() {
            Ok(parsed) => Ok(player.alloc_datum(Datum::Float(parsed))),
            Err(_) => Ok(args[0]),
        },
        _ => Ok(args.first().copied().unwrap_or(VOID_DATUM_REF)),
    }
}

pub fn string(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let text = datum_to_display_string(&player.allocator, arg(player, args, 0));
    Ok(player.alloc_datum(Datum::String(text)))
}

pub fn symbol(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let name = match arg(player, args, 0) {
        Datum::Symbol(s) => s.clone(),
        other => other.string_value()?,
    };
    Ok(player.alloc_datum(Datum::Symbol(name)))
}

/// `value("...")`: parses a literal back out of a string. Numbers,
/// symbols and bracketed lists are understood; anything else evaluates
/// to the string itself.
pub fn value(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let datum = arg(player, args, 0);
    if !datum.is_string() {
        return Ok(args.first().copied().unwrap_or(VOID_DATUM_REF));
    }
    let text = datum.string_value()?;
    let parsed = parse_value(player, text.trim());
    Ok(parsed.unwrap_or_else(|| player.alloc_datum(Datum::String(text))))
}

fn parse_value(player: &mut Player, text: &str) -> Option<DatumRef> {
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i32>() {
        return Some(player.alloc_datum(Datum::Int(n)));
    }
    if let Ok(f) = text.parse::<f64>() {
        return Some(player.alloc_datum(Datum::Float(f)));
    }
    if let Some(symbol) = text.strip_prefix('#') {
        if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some(player.alloc_datum(Datum::Symbol(symbol.to_string())));
        }
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Some(player.alloc_datum(Datum::String(text[1..text.len() - 1].to_string())));
    }
    if text.starts_with('[') && text.ends_with(']') {
        return parse_list_literal(player, &text[1..text.len() - 1]);
    }
    None
}

fn parse_list_literal(player: &mut Player, inner: &str) -> Option<DatumRef> {
    let inner = inner.trim();
    if inner == ":" {
        return Some(player.alloc_datum(Datum::PropList(Vec::new(), false)));
    }
    let parts = split_top_level(inner);
    let is_prop_list = parts
        .iter()
        .all(|p| p.contains(':') && !p.trim_start().starts_with('"'));

    if is_prop_list && !parts.is_empty() && !inner.is_empty() {
        let mut entries = Vec::new();
        for part in parts {
            let (key, value) = part.split_once(':')?;
            let key_ref = parse_value(player, key.trim())
                .unwrap_or_else(|| player.alloc_datum(Datum::String(key.trim().to_string())));
            let value_ref = parse_value(player, value.trim())
                .unwrap_or_else(|| player.alloc_datum(Datum::String(value.trim().to_string())));
            entries.push((key_ref, value_ref));
        }
        return Some(player.alloc_datum(Datum::PropList(entries, false)));
    }

    let mut items = Vec::new();
    if !inner.is_empty() {
        for part in parts {
            let item = parse_value(player, part.trim())
                .unwrap_or_else(|| player.alloc_datum(Datum::String(part.trim().to_string())));
            items.push(item);
        }
    }
    Some(player.alloc_datum(Datum::List(
        crate::director::lingo::datum::ListKind::List,
        items,
        false,
    )))
}

fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut in_string = false;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            '[' | '(' if !in_string => {
                depth += 1;
                current.push(c);
            }
            ']' | ')' if !in_string => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 && !in_string => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

pub fn ilk(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let kind = arg(player, args, 0).ilk().to_string();
    if args.len() > 1 {
        let expected = match player.get_datum(&args[1]) {
            Datum::Symbol(s) => s.clone(),
            other => other.string_value()?,
        };
        return Ok(player.alloc_datum(datum_bool(kind.eq_ignore_ascii_case(&expected))));
    }
    Ok(player.alloc_datum(Datum::Symbol(kind)))
}

pub fn object_p(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let is_object = matches!(
        arg(player, args, 0),
        Datum::ScriptInstance(_) | Datum::ScriptRef(_) | Datum::List(..) | Datum::PropList(..)
    );
    Ok(player.alloc_datum(datum_bool(is_object)))
}

pub fn list_p(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let is_list = matches!(arg(player, args, 0), Datum::List(..) | Datum::PropList(..));
    Ok(player.alloc_datum(datum_bool(is_list)))
}

pub fn string_p(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let result = arg(player, args, 0).is_string();
    Ok(player.alloc_datum(datum_bool(result)))
}

pub fn symbol_p(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let result = arg(player, args, 0).is_symbol();
    Ok(player.alloc_datum(datum_bool(result)))
}

pub fn integer_p(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let result = arg(player, args, 0).is_int();
    Ok(player.alloc_datum(datum_bool(result)))
}

pub fn float_p(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let result = arg(player, args, 0).is_float();
    Ok(player.alloc_datum(datum_bool(result)))
}

pub fn void_p(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let result = arg(player, args, 0).is_void();
    Ok(player.alloc_datum(datum_bool(result)))
}
