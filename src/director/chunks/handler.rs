use binary_reader::BinaryReader;
use fxhash::FxHashMap;

use crate::director::lingo::opcode::OpCode;
use crate::io::DecodeError;

/// One decoded instruction. `pos` is the byte offset branch targets refer
/// to; `obj` is the operand, sign-extended where the opcode calls for it.
#[derive(Clone)]
pub struct Bytecode {
    pub opcode: OpCode,
    pub raw_opcode: u8,
    pub obj: i64,
    pub pos: usize,
}

pub struct HandlerRecord {
    pub name_id: u16,
    pub vector_pos: u16,
    pub compiled_len: usize,
    pub compiled_offset: usize,
    pub argument_count: u16,
    pub argument_offset: usize,
    pub locals_count: u16,
    pub locals_offset: usize,
    pub globals_count: u16,
    pub globals_offset: usize,
    pub unknown1: u32,
    pub unknown2: u16,
    pub line_count: u16,
    pub line_offset: u32,
}

/// A fully decoded handler: bytecode plus its name tables. The
/// position→index map makes branch-target resolution O(1).
#[derive(Clone)]
pub struct HandlerDef {
    pub name_id: u16,
    pub bytecode_array: Vec<Bytecode>,
    pub bytecode_index_map: FxHashMap<usize, usize>,
    pub argument_name_ids: Vec<u16>,
    pub local_name_ids: Vec<u16>,
    pub global_name_ids: Vec<u16>,
}

impl HandlerRecord {
    pub fn read_record(
        reader: &mut BinaryReader,
        capital_x: bool,
    ) -> Result<HandlerRecord, DecodeError> {
        let record = HandlerRecord {
            name_id: reader.read_u16()?,
            vector_pos: reader.read_u16()?,
            compiled_len: reader.read_u32()? as usize,
            compiled_offset: reader.read_u32()? as usize,
            argument_count: reader.read_u16()?,
            argument_offset: reader.read_u32()? as usize,
            locals_count: reader.read_u16()?,
            locals_offset: reader.read_u32()? as usize,
            globals_count: reader.read_u16()?,
            globals_offset: reader.read_u32()? as usize,
            unknown1: reader.read_u32()?,
            unknown2: reader.read_u16()?,
            line_count: reader.read_u16()?,
            line_offset: reader.read_u32()?,
        };
        if capital_x {
            reader.read_u32()?; // stack height
        }
        Ok(record)
    }

    pub fn read_data(&self, reader: &mut BinaryReader) -> Result<HandlerDef, DecodeError> {
        let mut bytecode_array: Vec<Bytecode> = Vec::new();
        let mut bytecode_index_map: FxHashMap<usize, usize> = FxHashMap::default();

        reader.jmp(self.compiled_offset);
        while reader.pos < self.compiled_offset + self.compiled_len {
            let pos = reader.pos - self.compiled_offset;
            let raw = reader.read_u8()?;
            let opcode = OpCode::from_raw(raw).unwrap_or(OpCode::Invalid);

            // Operand width from the raw byte's top two bits; the push-int
            // family is signed, everything else unsigned.
            let obj: i64 = if raw >= 0xc0 {
                reader.read_i32()? as i64
            } else if raw >= 0x80 {
                match opcode {
                    // pushint8 may carry a 16-bit value in older movies
                    OpCode::PushInt16 | OpCode::PushInt8 => reader.read_i16()? as i64,
                    _ => reader.read_u16()? as i64,
                }
            } else if raw >= 0x40 {
                match opcode {
                    OpCode::PushInt8 => reader.read_i8()? as i64,
                    _ => reader.read_u8()? as i64,
                }
            } else {
                0
            };

            bytecode_array.push(Bytecode {
                opcode,
                raw_opcode: raw,
                obj,
                pos,
            });
            bytecode_index_map.insert(pos, bytecode_array.len() - 1);
        }

        let argument_name_ids =
            read_varnames_table(reader, self.argument_count as usize, self.argument_offset)?;
        let local_name_ids =
            read_varnames_table(reader, self.locals_count as usize, self.locals_offset)?;
        let global_name_ids =
            read_varnames_table(reader, self.globals_count as usize, self.globals_offset)?;

        Ok(HandlerDef {
            name_id: self.name_id,
            bytecode_array,
            bytecode_index_map,
            argument_name_ids,
            local_name_ids,
            global_name_ids,
        })
    }
}

pub fn read_varnames_table(
    reader: &mut BinaryReader,
    count: usize,
    offset: usize,
) -> Result<Vec<u16>, DecodeError> {
    reader.jmp(offset);
    (0..count).map(|_| Ok(reader.read_u16()?)).collect()
}
