use binary_reader::{BinaryReader, Endian};

use crate::director::lingo::datum::Datum;
use crate::io::DecodeError;

use super::handler::{read_varnames_table, HandlerDef, HandlerRecord};
use super::literal::LiteralRecord;

/// `Lscr`: one compiled script. Always big-endian regardless of the
/// container's byte order.
#[derive(Clone)]
pub struct ScriptChunk {
    pub script_number: u16,
    pub parent_number: u16,
    pub script_flags: u32,
    pub cast_id: u32,
    pub factory_name_id: u16,
    pub literals: Vec<Datum>,
    pub handlers: Vec<HandlerDef>,
    pub property_name_ids: Vec<u16>,
    pub global_name_ids: Vec<u16>,
}

impl ScriptChunk {
    pub fn from_reader(
        reader: &mut BinaryReader,
        dir_version: u16,
        capital_x: bool,
    ) -> Result<ScriptChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        reader.jmp(8);
        let _total_length = reader.read_u32()?;
        let _total_length2 = reader.read_u32()?;
        let _header_length = reader.read_u16()?;
        let script_number = reader.read_u16()?;
        let _unk20 = reader.read_u16()?;
        let parent_number = reader.read_u16()?;

        reader.jmp(38);
        let script_flags = reader.read_u32()?;
        let _unk42 = reader.read_u16()?;
        let cast_id = reader.read_u32()?;
        let factory_name_id = reader.read_u16()?;
        let _handler_vectors_count = reader.read_u16()?;
        let _handler_vectors_offset = reader.read_u32()?;
        let _handler_vectors_size = reader.read_u32()?;
        let properties_count = reader.read_u16()? as usize;
        let properties_offset = reader.read_u32()? as usize;
        let globals_count = reader.read_u16()? as usize;
        let globals_offset = reader.read_u32()? as usize;
        let handlers_count = reader.read_u16()?;
        let handlers_offset = reader.read_u32()? as usize;
        let literals_count = reader.read_u16()?;
        let literals_offset = reader.read_u32()? as usize;
        let _literals_data_count = reader.read_u32()?;
        let literals_data_offset = reader.read_u32()? as usize;

        let property_name_ids = read_varnames_table(reader, properties_count, properties_offset)?;
        let global_name_ids = read_varnames_table(reader, globals_count, globals_offset)?;

        reader.jmp(handlers_offset);
        let handler_records = (0..handlers_count)
            .map(|_| HandlerRecord::read_record(reader, capital_x))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let handlers = handler_records
            .iter()
            .map(|record| record.read_data(reader))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        reader.jmp(literals_offset);
        let literal_records = (0..literals_count)
            .map(|_| LiteralRecord::read_record(reader, dir_version))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let literals = literal_records
            .iter()
            .map(|record| record.read_data(reader, literals_data_offset))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        Ok(ScriptChunk {
            script_number,
            parent_number,
            script_flags,
            cast_id,
            factory_name_id,
            literals,
            handlers,
            property_name_ids,
            global_name_ids,
        })
    }
}
