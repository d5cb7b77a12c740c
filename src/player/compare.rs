use std::cmp::Ordering;

use crate::director::lingo::datum::Datum;

use super::allocator::DatumAllocator;

/// Lingo equality: numbers by value, strings and symbols
/// case-insensitively, containers by structural recursion, void only
/// equal to void.
pub fn datum_equals(allocator: &DatumAllocator, left: &Datum, right: &Datum) -> bool {
    match (left, right) {
        (Datum::Void, Datum::Void) => true,
        (Datum::Void, _) | (_, Datum::Void) => false,
        (Datum::Int(a), Datum::Int(b)) => a == b,
        (Datum::Int(a), Datum::Float(b)) => (*a as f64) == *b,
        (Datum::Float(a), Datum::Int(b)) => *a == (*b as f64),
        (Datum::Float(a), Datum::Float(b)) => a == b,
        (Datum::Int(a), Datum::String(b)) | (Datum::Int(a), Datum::StringChunk(_, _, b)) => {
            b.trim().parse::<f64>().map(|n| n == *a as f64).unwrap_or(false)
        }
        (Datum::String(a), Datum::Int(b)) | (Datum::StringChunk(_, _, a), Datum::Int(b)) => {
            a.trim().parse::<f64>().map(|n| n == *b as f64).unwrap_or(false)
        }
        (Datum::Float(a), Datum::String(b)) | (Datum::Float(a), Datum::StringChunk(_, _, b)) => {
            b.trim().parse::<f64>().map(|n| n == *a).unwrap_or(false)
        }
        (Datum::String(a), Datum::Float(b)) | (Datum::StringChunk(_, _, a), Datum::Float(b)) => {
            a.trim().parse::<f64>().map(|n| n == *b).unwrap_or(false)
        }
        (a, b) if a.is_string() && b.is_string() => {
            let a = a.string_value().unwrap_or_default();
            let b = b.string_value().unwrap_or_default();
            a.eq_ignore_ascii_case(&b)
        }
        (Datum::Symbol(a), Datum::Symbol(b)) => a.eq_ignore_ascii_case(b),
        (Datum::Symbol(a), b) if b.is_string() => {
            b.string_value().map(|s| s.eq_ignore_ascii_case(a)).unwrap_or(false)
        }
        (a, Datum::Symbol(b)) if a.is_string() => {
            a.string_value().map(|s| s.eq_ignore_ascii_case(b)).unwrap_or(false)
        }
        (Datum::List(_, a, _), Datum::List(_, b, _)) => {
            a.len() == b.len()
                && a.iter().zip(b.iter()).all(|(x, y)| {
                    datum_equals(allocator, allocator.get_datum(x), allocator.get_datum(y))
                })
        }
        (Datum::PropList(a, _), Datum::PropList(b, _)) => {
            a.len() == b.len()
                && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| {
                    datum_equals(allocator, allocator.get_datum(ka), allocator.get_datum(kb))
                        && datum_equals(allocator, allocator.get_datum(va), allocator.get_datum(vb))
                })
        }
        (Datum::IntPoint(a), Datum::IntPoint(b)) => a == b,
        (Datum::IntRect(a), Datum::IntRect(b)) => a == b,
        (Datum::Color(r1, g1, b1), Datum::Color(r2, g2, b2)) => {
            r1 == r2 && g1 == g2 && b1 == b2
        }
        (Datum::SpriteRef(a), Datum::SpriteRef(b)) => a == b,
        (Datum::SoundChannel(a), Datum::SoundChannel(b)) => a == b,
        (Datum::CastMember(a), Datum::CastMember(b)) => a.slot_number() == b.slot_number(),
        (Datum::ScriptRef(a), Datum::ScriptRef(b)) => a == b,
        (Datum::ScriptInstance(a), Datum::ScriptInstance(b)) => a == b,
        (Datum::TimeoutRef(a), Datum::TimeoutRef(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Ordering for the relational operators and `sort`. Values that do not
/// order (mixed containers and such) compare equal, which keeps sorts
/// stable.
pub fn datum_compare(allocator: &DatumAllocator, left: &Datum, right: &Datum) -> Ordering {
    match (left, right) {
        (a, b) if a.is_number() && b.is_number() => {
            let a = a.float_value().unwrap_or(0.0);
            let b = b.float_value().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (a, b) if a.is_number() && b.is_string() => {
            match b.string_value().unwrap_or_default().trim().parse::<f64>() {
                Ok(n) => a
                    .float_value()
                    .unwrap_or(0.0)
                    .partial_cmp(&n)
                    .unwrap_or(Ordering::Equal),
                // Numbers sort before non-numeric strings.
                Err(_) => Ordering::Less,
            }
        }
        (a, b) if a.is_string() && b.is_number() => {
            datum_compare(allocator, b, a).reverse()
        }
        (a, b) if (a.is_string() || a.is_symbol()) && (b.is_string() || b.is_symbol()) => {
            let a = match a {
                Datum::Symbol(s) => s.clone(),
                other => other.string_value().unwrap_or_default(),
            };
            let b = match b {
                Datum::Symbol(s) => s.clone(),
                other => other.string_value().unwrap_or_default(),
            };
            a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
        }
        (Datum::IntPoint(a), Datum::IntPoint(b)) => a.cmp(b),
        (Datum::IntRect(a), Datum::IntRect(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

pub fn datum_less_than(allocator: &DatumAllocator, left: &Datum, right: &Datum) -> bool {
    datum_compare(allocator, left, right) == Ordering::Less
}

pub fn datum_greater_than(allocator: &DatumAllocator, left: &Datum, right: &Datum) -> bool {
    datum_compare(allocator, left, right) == Ordering::Greater
}
