use crate::director::lingo::datum::{Datum, ListKind};

use super::super::allocator::{DatumRef, VOID_DATUM_REF};
use super::super::compare::{datum_compare, datum_equals};
use super::super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

/// Owned snapshot of a container argument. Element refs are plain ids,
/// so cloning the spine is cheap and releases the allocator borrow
/// before any mutation.
enum Container {
    List(Vec<DatumRef>, bool),
    Prop(Vec<(DatumRef, DatumRef)>, bool),
}

fn snapshot(player: &Player, target_ref: &DatumRef, who: &str) -> Result<Container, ScriptError> {
    match player.get_datum(target_ref) {
        Datum::List(_, items, sorted) => Ok(Container::List(items.clone(), *sorted)),
        Datum::PropList(entries, sorted) => Ok(Container::Prop(entries.clone(), *sorted)),
        other => Err(ScriptError::TypeMismatch(format!(
            "{who} needs a list, got {}",
            other.type_str()
        ))),
    }
}

fn write_back_list(player: &mut Player, target_ref: &DatumRef, items: Vec<DatumRef>, sorted: bool) -> Result<(), ScriptError> {
    let (slot, sorted_slot) = player.get_datum_mut(target_ref).to_list_mut()?;
    *slot = items;
    *sorted_slot = sorted;
    Ok(())
}

fn write_back_prop(
    player: &mut Player,
    target_ref: &DatumRef,
    entries: Vec<(DatumRef, DatumRef)>,
    sorted: bool,
) -> Result<(), ScriptError> {
    let (slot, sorted_slot) = player.get_datum_mut(target_ref).to_prop_list_mut()?;
    *slot = entries;
    *sorted_slot = sorted;
    Ok(())
}

fn first_arg(args: &[DatumRef]) -> Result<DatumRef, ScriptError> {
    args.first().copied().ok_or(ScriptError::StackUnderflow)
}

fn arg_or_void(args: &[DatumRef], index: usize) -> DatumRef {
    args.get(index).copied().unwrap_or(VOID_DATUM_REF)
}

fn arg_int(player: &Player, args: &[DatumRef], index: usize) -> Result<i32, ScriptError> {
    args.get(index)
        .map(|r| player.get_datum(r))
        .unwrap_or(&Datum::Void)
        .int_value()
}

/// Zero-based position of the first structural match.
fn position_of(player: &Player, items: &[DatumRef], value_ref: &DatumRef) -> Option<usize> {
    let value = player.get_datum(value_ref);
    items
        .iter()
        .position(|item| datum_equals(&player.allocator, player.get_datum(item), value))
}

fn prop_position(
    player: &Player,
    entries: &[(DatumRef, DatumRef)],
    key_ref: &DatumRef,
) -> Option<usize> {
    let key = player.get_datum(key_ref);
    entries
        .iter()
        .position(|(k, _)| datum_equals(&player.allocator, player.get_datum(k), key))
}

pub fn list(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    Ok(player.alloc_datum(Datum::List(ListKind::List, args.to_vec(), false)))
}

/// 1-indexed element read; out-of-range yields void, never an error.
pub fn get_at(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let index = arg_int(player, args, 1)?;
    match snapshot(player, &target_ref, "getAt")? {
        Container::List(items, _) => Ok(index_or_void(&items, index)),
        Container::Prop(entries, _) => {
            if index >= 1 && (index as usize) <= entries.len() {
                Ok(entries[index as usize - 1].1)
            } else {
                Ok(VOID_DATUM_REF)
            }
        }
    }
}

fn index_or_void(items: &[DatumRef], index: i32) -> DatumRef {
    if index >= 1 && (index as usize) <= items.len() {
        items[index as usize - 1]
    } else {
        VOID_DATUM_REF
    }
}

/// 1-indexed element write. Writing past the end pads the gap with
/// voids.
pub fn set_at(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let index = arg_int(player, args, 1)?;
    let value = arg_or_void(args, 2);
    if index < 1 {
        return Err(ScriptError::TypeMismatch(format!(
            "setAt index {index} out of range"
        )));
    }
    match snapshot(player, &target_ref, "setAt")? {
        Container::List(mut items, sorted) => {
            let index = index as usize;
            while items.len() < index {
                items.push(VOID_DATUM_REF);
            }
            items[index - 1] = value;
            write_back_list(player, &target_ref, items, sorted)?;
            Ok(VOID_DATUM_REF)
        }
        Container::Prop(mut entries, sorted) => {
            let index = index as usize;
            if index <= entries.len() {
                entries[index - 1].1 = value;
                write_back_prop(player, &target_ref, entries, sorted)?;
                Ok(VOID_DATUM_REF)
            } else {
                Err(ScriptError::TypeMismatch(format!(
                    "setAt index {index} past the property list"
                )))
            }
        }
    }
}

/// `add` honors sort order on sorted lists; `append` never does.
pub fn add(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let value = arg_or_void(args, 1);
    let Container::List(mut items, sorted) = snapshot(player, &target_ref, "add")? else {
        return Err(ScriptError::TypeMismatch("add needs a linear list".to_string()));
    };
    let insert_at = if sorted {
        let value_datum = player.get_datum(&value);
        items
            .iter()
            .position(|item| {
                datum_compare(&player.allocator, player.get_datum(item), value_datum)
                    == std::cmp::Ordering::Greater
            })
            .unwrap_or(items.len())
    } else {
        items.len()
    };
    items.insert(insert_at, value);
    write_back_list(player, &target_ref, items, sorted)?;
    Ok(VOID_DATUM_REF)
}

pub fn append(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let value = arg_or_void(args, 1);
    let Container::List(mut items, _) = snapshot(player, &target_ref, "append")? else {
        return Err(ScriptError::TypeMismatch("append needs a linear list".to_string()));
    };
    items.push(value);
    write_back_list(player, &target_ref, items, false)?;
    Ok(VOID_DATUM_REF)
}

pub fn add_at(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let index = arg_int(player, args, 1)?;
    let value = arg_or_void(args, 2);
    let Container::List(mut items, _) = snapshot(player, &target_ref, "addAt")? else {
        return Err(ScriptError::TypeMismatch("addAt needs a linear list".to_string()));
    };
    let index = (index.max(1) as usize - 1).min(items.len());
    items.insert(index, value);
    write_back_list(player, &target_ref, items, false)?;
    Ok(VOID_DATUM_REF)
}

pub fn delete_at(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let index = arg_int(player, args, 1)?;
    match snapshot(player, &target_ref, "deleteAt")? {
        Container::List(mut items, sorted) => {
            if index >= 1 && (index as usize) <= items.len() {
                items.remove(index as usize - 1);
            }
            write_back_list(player, &target_ref, items, sorted)?;
        }
        Container::Prop(mut entries, sorted) => {
            if index >= 1 && (index as usize) <= entries.len() {
                entries.remove(index as usize - 1);
            }
            write_back_prop(player, &target_ref, entries, sorted)?;
        }
    }
    Ok(VOID_DATUM_REF)
}

/// Removes the first structural match.
pub fn delete_one(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let value_ref = arg_or_void(args, 1);
    let Container::List(mut items, sorted) = snapshot(player, &target_ref, "deleteOne")? else {
        return Err(ScriptError::TypeMismatch(
            "deleteOne needs a linear list".to_string(),
        ));
    };
    if let Some(index) = position_of(player, &items, &value_ref) {
        items.remove(index);
        write_back_list(player, &target_ref, items, sorted)?;
    }
    Ok(VOID_DATUM_REF)
}

pub fn delete_all(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    match snapshot(player, &target_ref, "deleteAll")? {
        Container::List(_, sorted) => write_back_list(player, &target_ref, Vec::new(), sorted)?,
        Container::Prop(_, sorted) => write_back_prop(player, &target_ref, Vec::new(), sorted)?,
    }
    Ok(VOID_DATUM_REF)
}

/// `getOne(list, value)`: 1-based position, 0 when absent. On property
/// lists it answers the key of the first entry holding `value`.
pub fn get_one(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let value_ref = arg_or_void(args, 1);
    match snapshot(player, &target_ref, "getOne")? {
        Container::List(items, _) => {
            let position = position_of(player, &items, &value_ref)
                .map(|i| i as i32 + 1)
                .unwrap_or(0);
            Ok(player.alloc_datum(Datum::Int(position)))
        }
        Container::Prop(entries, _) => {
            let value = player.get_datum(&value_ref);
            let key = entries
                .iter()
                .find(|(_, v)| datum_equals(&player.allocator, player.get_datum(v), value))
                .map(|(k, _)| *k);
            Ok(key.unwrap_or(VOID_DATUM_REF))
        }
    }
}

pub fn get_pos(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let value_ref = arg_or_void(args, 1);
    let Container::List(items, _) = snapshot(player, &target_ref, "getPos")? else {
        return Err(ScriptError::TypeMismatch("getPos needs a linear list".to_string()));
    };
    let position = position_of(player, &items, &value_ref)
        .map(|i| i as i32 + 1)
        .unwrap_or(0);
    Ok(player.alloc_datum(Datum::Int(position)))
}

pub fn sort(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    match snapshot(player, &target_ref, "sort")? {
        Container::List(mut items, _) => {
            items.sort_by(|a, b| {
                datum_compare(&player.allocator, player.get_datum(a), player.get_datum(b))
            });
            write_back_list(player, &target_ref, items, true)?;
        }
        Container::Prop(mut entries, _) => {
            entries.sort_by(|(a, _), (b, _)| {
                datum_compare(&player.allocator, player.get_datum(a), player.get_datum(b))
            });
            write_back_prop(player, &target_ref, entries, true)?;
        }
    }
    Ok(VOID_DATUM_REF)
}

pub fn duplicate(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    Ok(player.duplicate_datum(&target_ref))
}

pub fn get_last(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    match snapshot(player, &target_ref, "getLast")? {
        Container::List(items, _) => Ok(items.last().copied().unwrap_or(VOID_DATUM_REF)),
        Container::Prop(entries, _) => {
            Ok(entries.last().map(|(_, v)| *v).unwrap_or(VOID_DATUM_REF))
        }
    }
}

pub fn delete_last(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    match snapshot(player, &target_ref, "deleteLast")? {
        Container::List(mut items, sorted) => {
            items.pop();
            write_back_list(player, &target_ref, items, sorted)?;
        }
        Container::Prop(mut entries, sorted) => {
            entries.pop();
            write_back_prop(player, &target_ref, entries, sorted)?;
        }
    }
    Ok(VOID_DATUM_REF)
}

/// Strict keyed read: missing keys are an error (`getaProp` is the
/// forgiving variant). On plain lists this is an index read.
pub fn get_prop(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    match snapshot(player, &target_ref, "getProp")? {
        Container::Prop(entries, _) => match prop_position(player, &entries, &key_ref) {
            Some(index) => Ok(entries[index].1),
            None => {
                let key = player.get_datum(&key_ref).string_value().unwrap_or_default();
                Err(ScriptError::TypeMismatch(format!(
                    "property #{key} not found in list"
                )))
            }
        },
        Container::List(..) => get_at(player, args),
    }
}

pub fn get_a_prop(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    match snapshot(player, &target_ref, "getaProp") {
        Ok(Container::Prop(entries, _)) => Ok(prop_position(player, &entries, &key_ref)
            .map(|index| entries[index].1)
            .unwrap_or(VOID_DATUM_REF)),
        Ok(Container::List(..)) => get_at(player, args),
        Err(_) => Ok(VOID_DATUM_REF),
    }
}

/// Strict keyed write: the key must already exist.
pub fn set_prop(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    let value = arg_or_void(args, 2);
    let Container::Prop(mut entries, sorted) = snapshot(player, &target_ref, "setProp")? else {
        return Err(ScriptError::TypeMismatch(
            "setProp needs a property list".to_string(),
        ));
    };
    match prop_position(player, &entries, &key_ref) {
        Some(index) => {
            entries[index].1 = value;
            write_back_prop(player, &target_ref, entries, sorted)?;
            Ok(VOID_DATUM_REF)
        }
        None => {
            let key = player.get_datum(&key_ref).string_value().unwrap_or_default();
            Err(ScriptError::TypeMismatch(format!(
                "property #{key} not found in list"
            )))
        }
    }
}

/// Keyed write that adds missing keys.
pub fn set_a_prop(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    let value = arg_or_void(args, 2);
    let Container::Prop(mut entries, sorted) = snapshot(player, &target_ref, "setaProp")? else {
        return Err(ScriptError::TypeMismatch(
            "setaProp needs a property list".to_string(),
        ));
    };
    match prop_position(player, &entries, &key_ref) {
        Some(index) => entries[index].1 = value,
        None => entries.push((key_ref, value)),
    }
    write_back_prop(player, &target_ref, entries, sorted)?;
    Ok(VOID_DATUM_REF)
}

/// Appends an entry; duplicate keys are allowed. Sorted lists keep key
/// order.
pub fn add_prop(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    let value = arg_or_void(args, 2);
    let Container::Prop(mut entries, sorted) = snapshot(player, &target_ref, "addProp")? else {
        return Err(ScriptError::TypeMismatch(
            "addProp needs a property list".to_string(),
        ));
    };
    let insert_at = if sorted {
        let key = player.get_datum(&key_ref);
        entries
            .iter()
            .position(|(k, _)| {
                datum_compare(&player.allocator, player.get_datum(k), key)
                    == std::cmp::Ordering::Greater
            })
            .unwrap_or(entries.len())
    } else {
        entries.len()
    };
    entries.insert(insert_at, (key_ref, value));
    write_back_prop(player, &target_ref, entries, sorted)?;
    Ok(VOID_DATUM_REF)
}

pub fn delete_prop(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    match snapshot(player, &target_ref, "deleteProp")? {
        Container::Prop(mut entries, sorted) => {
            if let Some(index) = prop_position(player, &entries, &key_ref) {
                entries.remove(index);
                write_back_prop(player, &target_ref, entries, sorted)?;
            }
            Ok(VOID_DATUM_REF)
        }
        Container::List(..) => delete_at(player, args),
    }
}

/// 1-based key position; void when absent.
pub fn find_pos(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    let Container::Prop(entries, _) = snapshot(player, &target_ref, "findPos")? else {
        return Err(ScriptError::TypeMismatch(
            "findPos needs a property list".to_string(),
        ));
    };
    match prop_position(player, &entries, &key_ref) {
        Some(index) => Ok(player.alloc_datum(Datum::Int(index as i32 + 1))),
        None => Ok(VOID_DATUM_REF),
    }
}

/// On a sorted property list: the position the key holds or would take.
pub fn find_pos_near(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let key_ref = arg_or_void(args, 1);
    let Container::Prop(entries, _) = snapshot(player, &target_ref, "findPosNear")? else {
        return Err(ScriptError::TypeMismatch(
            "findPosNear needs a property list".to_string(),
        ));
    };
    let position = {
        let key = player.get_datum(&key_ref);
        entries
            .iter()
            .position(|(k, _)| {
                datum_compare(&player.allocator, player.get_datum(k), key)
                    != std::cmp::Ordering::Less
            })
            .unwrap_or(entries.len())
    };
    Ok(player.alloc_datum(Datum::Int(position as i32 + 1)))
}

pub fn get_prop_at(player: &mut Player, args: &[DatumRef]) -> BuiltinResult {
    let target_ref = first_arg(args)?;
    let index = arg_int(player, args, 1)?;
    let Container::Prop(entries, _) = snapshot(player, &target_ref, "getPropAt")? else {
        return Err(ScriptError::TypeMismatch(
            "getPropAt needs a property list".to_string(),
        ));
    };
    if index >= 1 && (index as usize) <= entries.len() {
        Ok(entries[index as usize - 1].0)
    } else {
        Ok(VOID_DATUM_REF)
    }
}
