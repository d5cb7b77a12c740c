use crate::director::lingo::datum::{Datum, ListKind};

use super::{Player, ScriptError};

/// Binary arithmetic with Lingo's coercion rules: a float on either side
/// makes the result float, void acts as the identity, points, rects and
/// lists distribute elementwise.
pub fn add_datums(player: &mut Player, left: Datum, right: Datum) -> Result<Datum, ScriptError> {
    numeric_op(player, left, right, "add")
}

pub fn subtract_datums(
    player: &mut Player,
    left: Datum,
    right: Datum,
) -> Result<Datum, ScriptError> {
    numeric_op(player, left, right, "sub")
}

pub fn multiply_datums(
    player: &mut Player,
    left: Datum,
    right: Datum,
) -> Result<Datum, ScriptError> {
    numeric_op(player, left, right, "mul")
}

pub fn divide_datums(
    player: &mut Player,
    left: Datum,
    right: Datum,
) -> Result<Datum, ScriptError> {
    numeric_op(player, left, right, "div")
}

pub fn mod_datums(player: &mut Player, left: Datum, right: Datum) -> Result<Datum, ScriptError> {
    numeric_op(player, left, right, "mod")
}

fn scalar_op(op: &str, a: &Datum, b: &Datum) -> Result<Datum, ScriptError> {
    let float_result = a.is_float() || b.is_float();
    if float_result {
        let a = a.float_value()?;
        let b = b.float_value()?;
        let value = match op {
            "add" => a + b,
            "sub" => a - b,
            "mul" => a * b,
            "div" => {
                if b == 0.0 {
                    return Err(ScriptError::DivideByZero);
                }
                a / b
            }
            "mod" => {
                if b == 0.0 {
                    return Err(ScriptError::DivideByZero);
                }
                a % b
            }
            _ => unreachable!(),
        };
        Ok(Datum::Float(value))
    } else {
        let a = a.int_value()?;
        let b = b.int_value()?;
        match op {
            "add" => Ok(Datum::Int(a.wrapping_add(b))),
            "sub" => Ok(Datum::Int(a.wrapping_sub(b))),
            "mul" => Ok(Datum::Int(a.wrapping_mul(b))),
            "div" => {
                if b == 0 {
                    return Err(ScriptError::DivideByZero);
                }
                // Exact quotients stay integral, everything else widens.
                if a % b == 0 {
                    Ok(Datum::Int(a / b))
                } else {
                    Ok(Datum::Float(a as f64 / b as f64))
                }
            }
            "mod" => {
                if b == 0 {
                    return Err(ScriptError::DivideByZero);
                }
                Ok(Datum::Int(a % b))
            }
            _ => unreachable!(),
        }
    }
}

fn apply_scalar(op: &str, a: i32, b: i32) -> Result<i32, ScriptError> {
    match op {
        "add" => Ok(a.wrapping_add(b)),
        "sub" => Ok(a.wrapping_sub(b)),
        "mul" => Ok(a.wrapping_mul(b)),
        "div" => {
            if b == 0 {
                Err(ScriptError::DivideByZero)
            } else {
                Ok(a / b)
            }
        }
        "mod" => {
            if b == 0 {
                Err(ScriptError::DivideByZero)
            } else {
                Ok(a % b)
            }
        }
        _ => unreachable!(),
    }
}

fn numeric_op(
    player: &mut Player,
    left: Datum,
    right: Datum,
    op: &str,
) -> Result<Datum, ScriptError> {
    match (&left, &right) {
        (Datum::Void, other) if op == "add" => Ok(other.clone()),
        (other, Datum::Void) if op == "add" || op == "sub" => Ok(other.clone()),
        (a, b) if a.is_number() && b.is_number() => scalar_op(op, a, b),
        (a, b) if (a.is_number() || a.is_string()) && (b.is_number() || b.is_string()) => {
            // Strings coerce numerically in arithmetic contexts.
            scalar_op(op, a, b)
        }
        (Datum::IntPoint(a), Datum::IntPoint(b)) => Ok(Datum::IntPoint((
            apply_scalar(op, a.0, b.0)?,
            apply_scalar(op, a.1, b.1)?,
        ))),
        (Datum::IntPoint(a), b) if b.is_number() => {
            let n = b.int_value()?;
            Ok(Datum::IntPoint((
                apply_scalar(op, a.0, n)?,
                apply_scalar(op, a.1, n)?,
            )))
        }
        (a, Datum::IntPoint(b)) if a.is_number() => {
            let n = a.int_value()?;
            Ok(Datum::IntPoint((
                apply_scalar(op, n, b.0)?,
                apply_scalar(op, n, b.1)?,
            )))
        }
        (Datum::IntRect(a), Datum::IntRect(b)) => Ok(Datum::IntRect((
            apply_scalar(op, a.0, b.0)?,
            apply_scalar(op, a.1, b.1)?,
            apply_scalar(op, a.2, b.2)?,
            apply_scalar(op, a.3, b.3)?,
        ))),
        (Datum::IntRect(a), b) if b.is_number() => {
            let n = b.int_value()?;
            Ok(Datum::IntRect((
                apply_scalar(op, a.0, n)?,
                apply_scalar(op, a.1, n)?,
                apply_scalar(op, a.2, n)?,
                apply_scalar(op, a.3, n)?,
            )))
        }
        (Datum::List(_, items_a, _), Datum::List(_, items_b, _)) => {
            let count = items_a.len().min(items_b.len());
            let pairs: Vec<(Datum, Datum)> = (0..count)
                .map(|i| {
                    (
                        player.get_datum(&items_a[i]).clone(),
                        player.get_datum(&items_b[i]).clone(),
                    )
                })
                .collect();
            let mut result = Vec::with_capacity(count);
            for (a, b) in pairs {
                let datum = numeric_op(player, a, b, op)?;
                result.push(player.alloc_datum(datum));
            }
            Ok(Datum::List(ListKind::List, result, false))
        }
        (Datum::List(_, items, _), b) if b.is_number() => {
            let elements: Vec<Datum> = items
                .iter()
                .map(|r| player.get_datum(r).clone())
                .collect();
            let mut result = Vec::with_capacity(elements.len());
            for a in elements {
                let datum = numeric_op(player, a, right.clone(), op)?;
                result.push(player.alloc_datum(datum));
            }
            Ok(Datum::List(ListKind::List, result, false))
        }
        _ => Err(ScriptError::TypeMismatch(format!(
            "cannot {} {} and {}",
            op,
            left.type_str(),
            right.type_str()
        ))),
    }
}

/// Unary minus.
pub fn negate_datum(datum: Datum) -> Result<Datum, ScriptError> {
    match datum {
        Datum::Int(n) => Ok(Datum::Int(-n)),
        Datum::Float(n) => Ok(Datum::Float(-n)),
        Datum::IntPoint((x, y)) => Ok(Datum::IntPoint((-x, -y))),
        Datum::IntRect((l, t, r, b)) => Ok(Datum::IntRect((-l, -t, -r, -b))),
        other => Err(ScriptError::TypeMismatch(format!(
            "cannot negate {}",
            other.type_str()
        ))),
    }
}
