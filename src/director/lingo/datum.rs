use crate::player::allocator::DatumRef;
use crate::player::cast_lib::CastMemberRef;
use crate::player::script::InstanceId;
use crate::player::ScriptError;

/// Distinguishes plain lists from the argument-list markers the call
/// opcodes push.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ListKind {
    List,
    ArgList,
    ArgListNoRet,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StringChunkKind {
    Char,
    Word,
    Item,
    Line,
}

impl StringChunkKind {
    pub fn from_name(name: &str) -> Option<StringChunkKind> {
        match name.to_ascii_lowercase().as_str() {
            "char" => Some(StringChunkKind::Char),
            "word" => Some(StringChunkKind::Word),
            "item" => Some(StringChunkKind::Item),
            "line" => Some(StringChunkKind::Line),
            _ => None,
        }
    }

    /// The wire encoding used by the `GetChunk` opcode family.
    pub fn from_wire(value: i32) -> Option<StringChunkKind> {
        match value {
            0x01 => Some(StringChunkKind::Item),
            0x02 => Some(StringChunkKind::Word),
            0x03 => Some(StringChunkKind::Char),
            0x04 => Some(StringChunkKind::Line),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StringChunkKind::Char => "char",
            StringChunkKind::Word => "word",
            StringChunkKind::Item => "item",
            StringChunkKind::Line => "line",
        }
    }
}

/// A resolved chunk expression: 1-based inclusive unit range plus the
/// delimiter that was current when it was built.
#[derive(Clone, Debug)]
pub struct StringChunkExpr {
    pub kind: StringChunkKind,
    pub start: i32,
    pub end: i32,
    pub item_delimiter: char,
}

/// Where a chunk expression reads from and writes back to.
#[derive(Clone, Debug)]
pub enum StringChunkSource {
    Datum(DatumRef),
    Member(CastMemberRef),
}

/// Every Lingo runtime value.
#[derive(Clone, Debug)]
pub enum Datum {
    Void,
    Int(i32),
    Float(f64),
    String(String),
    StringChunk(StringChunkSource, StringChunkExpr, String),
    Symbol(String),
    List(ListKind, Vec<DatumRef>, bool),
    PropList(Vec<(DatumRef, DatumRef)>, bool),
    IntPoint((i32, i32)),
    IntRect((i32, i32, i32, i32)),
    Color(u8, u8, u8),
    SpriteRef(u16),
    CastMember(CastMemberRef),
    SoundChannel(u8),
    ScriptRef(CastMemberRef),
    ScriptInstance(InstanceId),
    TimeoutRef(String),
    VarRef(String),
}

pub const DATUM_TRUE: Datum = Datum::Int(1);
pub const DATUM_FALSE: Datum = Datum::Int(0);

pub fn datum_bool(val: bool) -> Datum {
    if val {
        DATUM_TRUE
    } else {
        DATUM_FALSE
    }
}

impl Datum {
    pub fn type_str(&self) -> &'static str {
        match self {
            Datum::Void => "void",
            Datum::Int(_) => "integer",
            Datum::Float(_) => "float",
            Datum::String(_) => "string",
            Datum::StringChunk(..) => "string_chunk",
            Datum::Symbol(_) => "symbol",
            Datum::List(ListKind::List, ..) => "list",
            Datum::List(..) => "arg_list",
            Datum::PropList(..) => "prop_list",
            Datum::IntPoint(_) => "point",
            Datum::IntRect(_) => "rect",
            Datum::Color(..) => "color",
            Datum::SpriteRef(_) => "sprite",
            Datum::CastMember(_) => "member",
            Datum::SoundChannel(_) => "sound",
            Datum::ScriptRef(_) => "script",
            Datum::ScriptInstance(_) => "instance",
            Datum::TimeoutRef(_) => "timeout",
            Datum::VarRef(_) => "var_ref",
        }
    }

    /// The `ilk` symbol for this value.
    pub fn ilk(&self) -> &'static str {
        match self {
            Datum::Void => "void",
            Datum::Int(_) => "integer",
            Datum::Float(_) => "float",
            Datum::String(_) | Datum::StringChunk(..) => "string",
            Datum::Symbol(_) => "symbol",
            Datum::List(ListKind::List, ..) => "list",
            Datum::List(..) => "list",
            Datum::PropList(..) => "proplist",
            Datum::IntPoint(_) => "point",
            Datum::IntRect(_) => "rect",
            Datum::Color(..) => "color",
            Datum::SpriteRef(_) => "sprite",
            Datum::CastMember(_) => "member",
            Datum::SoundChannel(_) => "sound",
            Datum::ScriptRef(_) => "script",
            Datum::ScriptInstance(_) => "instance",
            Datum::TimeoutRef(_) => "timeout",
            Datum::VarRef(_) => "void",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Datum::Int(_) | Datum::Float(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Datum::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Datum::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Datum::String(_) | Datum::StringChunk(..))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Datum::Symbol(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Datum::List(..))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Datum::Void)
    }

    /// Truthiness: false iff void, numeric zero, or the empty string.
    pub fn bool_value(&self) -> bool {
        match self {
            Datum::Void => false,
            Datum::Int(n) => *n != 0,
            Datum::Float(n) => *n != 0.0,
            Datum::String(s) => !s.is_empty(),
            Datum::StringChunk(_, _, s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn int_value(&self) -> Result<i32, ScriptError> {
        match self {
            Datum::Int(n) => Ok(*n),
            Datum::Float(n) => Ok(*n as i32),
            Datum::String(s) | Datum::StringChunk(_, _, s) => {
                Ok(s.trim().parse::<f64>().map(|f| f as i32).unwrap_or(0))
            }
            Datum::SpriteRef(n) => Ok(*n as i32),
            Datum::SoundChannel(n) => Ok(*n as i32),
            Datum::CastMember(member_ref) => Ok(member_ref.cast_member as i32),
            Datum::Void => Ok(0),
            _ => Err(ScriptError::TypeMismatch(format!(
                "cannot convert {} to integer",
                self.type_str()
            ))),
        }
    }

    pub fn float_value(&self) -> Result<f64, ScriptError> {
        match self {
            Datum::Float(n) => Ok(*n),
            Datum::Int(n) => Ok(*n as f64),
            Datum::String(s) | Datum::StringChunk(_, _, s) => {
                Ok(s.trim().parse::<f64>().unwrap_or(0.0))
            }
            Datum::Void => Ok(0.0),
            _ => Err(ScriptError::TypeMismatch(format!(
                "cannot convert {} to float",
                self.type_str()
            ))),
        }
    }

    pub fn string_value(&self) -> Result<String, ScriptError> {
        match self {
            Datum::String(s) => Ok(s.clone()),
            Datum::StringChunk(_, _, s) => Ok(s.clone()),
            Datum::Int(n) => Ok(n.to_string()),
            Datum::Float(n) => Ok(format_float(*n)),
            Datum::Symbol(s) => Ok(s.clone()),
            Datum::Void => Ok("".to_string()),
            _ => Err(ScriptError::TypeMismatch(format!(
                "cannot convert {} to string",
                self.type_str()
            ))),
        }
    }

    pub fn symbol_value(&self) -> Result<String, ScriptError> {
        match self {
            Datum::Symbol(s) => Ok(s.clone()),
            _ => Err(ScriptError::TypeMismatch(format!(
                "cannot convert {} to symbol",
                self.type_str()
            ))),
        }
    }

    pub fn to_list(&self) -> Result<&Vec<DatumRef>, ScriptError> {
        match self {
            Datum::List(_, items, _) => Ok(items),
            _ => Err(ScriptError::TypeMismatch(format!(
                "expected list, got {}",
                self.type_str()
            ))),
        }
    }

    pub fn to_list_mut(&mut self) -> Result<(&mut Vec<DatumRef>, &mut bool), ScriptError> {
        match self {
            Datum::List(_, items, sorted) => Ok((items, sorted)),
            _ => Err(ScriptError::TypeMismatch("expected list".to_string())),
        }
    }

    pub fn to_prop_list(&self) -> Result<&Vec<(DatumRef, DatumRef)>, ScriptError> {
        match self {
            Datum::PropList(entries, _) => Ok(entries),
            _ => Err(ScriptError::TypeMismatch(format!(
                "expected property list, got {}",
                self.type_str()
            ))),
        }
    }

    pub fn to_prop_list_mut(
        &mut self,
    ) -> Result<(&mut Vec<(DatumRef, DatumRef)>, &mut bool), ScriptError> {
        match self {
            Datum::PropList(entries, sorted) => Ok((entries, sorted)),
            _ => Err(ScriptError::TypeMismatch(
                "expected property list".to_string(),
            )),
        }
    }

    pub fn to_int_point(&self) -> Result<(i32, i32), ScriptError> {
        match self {
            Datum::IntPoint(p) => Ok(*p),
            _ => Err(ScriptError::TypeMismatch(format!(
                "expected point, got {}",
                self.type_str()
            ))),
        }
    }

    pub fn to_int_rect(&self) -> Result<(i32, i32, i32, i32), ScriptError> {
        match self {
            Datum::IntRect(r) => Ok(*r),
            _ => Err(ScriptError::TypeMismatch(format!(
                "expected rect, got {}",
                self.type_str()
            ))),
        }
    }

    pub fn to_member_ref(&self) -> Result<CastMemberRef, ScriptError> {
        match self {
            Datum::CastMember(member_ref) | Datum::ScriptRef(member_ref) => Ok(*member_ref),
            _ => Err(ScriptError::TypeMismatch(format!(
                "expected cast member, got {}",
                self.type_str()
            ))),
        }
    }

    pub fn to_instance_id(&self) -> Result<InstanceId, ScriptError> {
        match self {
            Datum::ScriptInstance(id) => Ok(*id),
            _ => Err(ScriptError::TypeMismatch(format!(
                "expected script instance, got {}",
                self.type_str()
            ))),
        }
    }

    pub fn to_sprite_ref(&self) -> Result<u16, ScriptError> {
        match self {
            Datum::SpriteRef(n) => Ok(*n),
            Datum::Int(n) if *n >= 0 => Ok(*n as u16),
            _ => Err(ScriptError::TypeMismatch(format!(
                "expected sprite, got {}",
                self.type_str()
            ))),
        }
    }

    pub fn to_string_mut(&mut self) -> Result<&mut String, ScriptError> {
        match self {
            Datum::String(s) => Ok(s),
            _ => Err(ScriptError::TypeMismatch("expected string".to_string())),
        }
    }
}

/// Lingo prints whole floats with a trailing `.0000` by default; keep the
/// short round-trip form here and let `floatPrecision` formatting live
/// with the player.
pub fn format_float(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{:.4}", value)
    } else {
        value.to_string()
    }
}
