use num_derive::{FromPrimitive, ToPrimitive};

/// Lingo bytecode opcodes. The raw byte's top two bits select the operand
/// width (0 none, 1 one byte, 2 two bytes, 3 four bytes); the base opcode
/// is `0x40 + raw % 0x40` for multi-byte forms.
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
pub enum OpCode {
    // single-byte
    Invalid = 0x00,
    Ret = 0x01,
    RetFactory = 0x02,
    PushZero = 0x03,
    Mul = 0x04,
    Add = 0x05,
    Sub = 0x06,
    Div = 0x07,
    Mod = 0x08,
    Inv = 0x09,
    JoinStr = 0x0a,
    JoinPadStr = 0x0b,
    Lt = 0x0c,
    LtEq = 0x0d,
    NtEq = 0x0e,
    Eq = 0x0f,
    Gt = 0x10,
    GtEq = 0x11,
    And = 0x12,
    Or = 0x13,
    Not = 0x14,
    ContainsStr = 0x15,
    Contains0Str = 0x16,
    GetChunk = 0x17,
    HiliteChunk = 0x18,
    OntoSpr = 0x19,
    IntoSpr = 0x1a,
    GetField = 0x1b,
    StartTell = 0x1c,
    EndTell = 0x1d,
    PushList = 0x1e,
    PushPropList = 0x1f,
    Swap = 0x21,

    // multi-byte
    PushInt8 = 0x41,
    PushArgListNoRet = 0x42,
    PushArgList = 0x43,
    PushCons = 0x44,
    PushSymb = 0x45,
    PushVarRef = 0x46,
    GetGlobal2 = 0x48,
    GetGlobal = 0x49,
    GetProp = 0x4a,
    GetParam = 0x4b,
    GetLocal = 0x4c,
    SetGlobal2 = 0x4e,
    SetGlobal = 0x4f,
    SetProp = 0x50,
    SetParam = 0x51,
    SetLocal = 0x52,
    Jmp = 0x53,
    EndRepeat = 0x54,
    JmpIfZ = 0x55,
    LocalCall = 0x56,
    ExtCall = 0x57,
    ObjCallV4 = 0x58,
    Put = 0x59,
    PutChunk = 0x5a,
    DeleteChunk = 0x5b,
    Get = 0x5c,
    Set = 0x5d,
    GetMovieProp = 0x5f,
    SetMovieProp = 0x60,
    GetObjProp = 0x61,
    SetObjProp = 0x62,
    TellCall = 0x63,
    Peek = 0x64,
    Pop = 0x65,
    TheBuiltin = 0x66,
    ObjCall = 0x67,
    PushChunkVarRef = 0x6d,
    PushInt16 = 0x6e,
    PushInt32 = 0x6f,
    GetChainedProp = 0x70,
    PushFloat32 = 0x71,
    GetTopLevelProp = 0x72,
    NewObj = 0x73,
}

impl OpCode {
    /// Maps a raw instruction byte to its base opcode, or `None` for bytes
    /// no known opcode claims.
    pub fn from_raw(raw: u8) -> Option<OpCode> {
        let base: u16 = if raw >= 0x40 {
            0x40 + (raw as u16) % 0x40
        } else {
            raw as u16
        };
        num::FromPrimitive::from_u16(base)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Invalid => "invalid",
            OpCode::Ret => "ret",
            OpCode::RetFactory => "retfactory",
            OpCode::PushZero => "pushzero",
            OpCode::Mul => "mul",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Div => "div",
            OpCode::Mod => "mod",
            OpCode::Inv => "inv",
            OpCode::JoinStr => "joinstr",
            OpCode::JoinPadStr => "joinpadstr",
            OpCode::Lt => "lt",
            OpCode::LtEq => "lteq",
            OpCode::NtEq => "nteq",
            OpCode::Eq => "eq",
            OpCode::Gt => "gt",
            OpCode::GtEq => "gteq",
            OpCode::And => "and",
            OpCode::Or => "or",
            OpCode::Not => "not",
            OpCode::ContainsStr => "containsstr",
            OpCode::Contains0Str => "contains0str",
            OpCode::GetChunk => "getchunk",
            OpCode::HiliteChunk => "hilitechunk",
            OpCode::OntoSpr => "ontospr",
            OpCode::IntoSpr => "intospr",
            OpCode::GetField => "getfield",
            OpCode::StartTell => "starttell",
            OpCode::EndTell => "endtell",
            OpCode::PushList => "pushlist",
            OpCode::PushPropList => "pushproplist",
            OpCode::Swap => "swap",
            OpCode::PushInt8 => "pushint8",
            OpCode::PushArgListNoRet => "pusharglistnoret",
            OpCode::PushArgList => "pusharglist",
            OpCode::PushCons => "pushcons",
            OpCode::PushSymb => "pushsymb",
            OpCode::PushVarRef => "pushvarref",
            OpCode::GetGlobal2 => "getglobal2",
            OpCode::GetGlobal => "getglobal",
            OpCode::GetProp => "getprop",
            OpCode::GetParam => "getparam",
            OpCode::GetLocal => "getlocal",
            OpCode::SetGlobal2 => "setglobal2",
            OpCode::SetGlobal => "setglobal",
            OpCode::SetProp => "setprop",
            OpCode::SetParam => "setparam",
            OpCode::SetLocal => "setlocal",
            OpCode::Jmp => "jmp",
            OpCode::EndRepeat => "endrepeat",
            OpCode::JmpIfZ => "jmpifz",
            OpCode::LocalCall => "localcall",
            OpCode::ExtCall => "extcall",
            OpCode::ObjCallV4 => "objcallv4",
            OpCode::Put => "put",
            OpCode::PutChunk => "putchunk",
            OpCode::DeleteChunk => "deletechunk",
            OpCode::Get => "get",
            OpCode::Set => "set",
            OpCode::GetMovieProp => "getmovieprop",
            OpCode::SetMovieProp => "setmovieprop",
            OpCode::GetObjProp => "getobjprop",
            OpCode::SetObjProp => "setobjprop",
            OpCode::TellCall => "tellcall",
            OpCode::Peek => "peek",
            OpCode::Pop => "pop",
            OpCode::TheBuiltin => "thebuiltin",
            OpCode::ObjCall => "objcall",
            OpCode::PushChunkVarRef => "pushchunkvarref",
            OpCode::PushInt16 => "pushint16",
            OpCode::PushInt32 => "pushint32",
            OpCode::GetChainedProp => "getchainedprop",
            OpCode::PushFloat32 => "pushfloat32",
            OpCode::GetTopLevelProp => "gettoplevelprop",
            OpCode::NewObj => "newobj",
        }
    }
}
