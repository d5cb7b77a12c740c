use itertools::Itertools;

use crate::director::lingo::datum::{format_float, Datum};

use super::allocator::{DatumAllocator, DatumRef};

/// Renders a value the way the message window would print it: strings
/// quoted, symbols hashed, containers recursively.
pub fn format_datum(allocator: &DatumAllocator, datum_ref: &DatumRef) -> String {
    format_concrete_datum(allocator, allocator.get_datum(datum_ref))
}

pub fn format_concrete_datum(allocator: &DatumAllocator, datum: &Datum) -> String {
    match datum {
        Datum::Void => "<Void>".to_string(),
        Datum::Int(n) => n.to_string(),
        Datum::Float(n) => format_float(*n),
        Datum::String(s) => format!("\"{s}\""),
        Datum::StringChunk(_, _, s) => format!("\"{s}\""),
        Datum::Symbol(s) => format!("#{s}"),
        Datum::List(_, items, _) => format!(
            "[{}]",
            items.iter().map(|r| format_datum(allocator, r)).join(", ")
        ),
        Datum::PropList(entries, _) => {
            if entries.is_empty() {
                "[:]".to_string()
            } else {
                format!(
                    "[{}]",
                    entries
                        .iter()
                        .map(|(k, v)| format!(
                            "{}: {}",
                            format_datum(allocator, k),
                            format_datum(allocator, v)
                        ))
                        .join(", ")
                )
            }
        }
        Datum::IntPoint((x, y)) => format!("point({x}, {y})"),
        Datum::IntRect((l, t, r, b)) => format!("rect({l}, {t}, {r}, {b})"),
        Datum::Color(r, g, b) => format!("rgb( {r}, {g}, {b} )"),
        Datum::SpriteRef(n) => format!("sprite {n}"),
        Datum::CastMember(member_ref) => format!(
            "(member {} of castLib {})",
            member_ref.cast_member, member_ref.cast_lib
        ),
        Datum::SoundChannel(n) => format!("sound {n}"),
        Datum::ScriptRef(member_ref) => format!(
            "(script member {} of castLib {})",
            member_ref.cast_member, member_ref.cast_lib
        ),
        Datum::ScriptInstance(id) => format!("<offspring {id}>"),
        Datum::TimeoutRef(name) => format!("timeout(\"{name}\")"),
        Datum::VarRef(name) => format!("<var {name}>"),
    }
}

/// The `string(x)` coercion: like the message-window form but without
/// quoting or hashing.
pub fn datum_to_display_string(allocator: &DatumAllocator, datum: &Datum) -> String {
    match datum {
        Datum::String(s) => s.clone(),
        Datum::StringChunk(_, _, s) => s.clone(),
        Datum::Symbol(s) => s.clone(),
        Datum::Void => "".to_string(),
        other => format_concrete_datum(allocator, other),
    }
}
