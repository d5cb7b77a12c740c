pub mod bitmap;
pub mod cast;
pub mod cast_list;
pub mod cast_member;
pub mod cast_member_info;
pub mod config;
pub mod handler;
pub mod imap;
pub mod key_table;
pub mod lctx;
pub mod list;
pub mod literal;
pub mod palette;
pub mod score;
pub mod script;
pub mod script_names;
pub mod sound;
pub mod text;

use std::collections::HashMap;

use binary_reader::{BinaryReader, Endian};

use self::bitmap::BitmapChunk;
use self::cast::CastChunk;
use self::cast_list::CastListChunk;
use self::cast_member::CastMemberChunk;
use self::config::ConfigChunk;
use self::imap::{InitialMapChunk, MemoryMapChunk};
use self::key_table::KeyTableChunk;
use self::lctx::ScriptContextChunk;
use self::palette::PaletteChunk;
use self::score::{FrameLabelsChunk, ScoreChunk};
use self::script::ScriptChunk;
use self::script_names::ScriptNamesChunk;
use self::sound::SoundChunk;
use self::text::TextChunk;

use super::guid::MoaId;
use super::rifx::RifxReaderContext;
use super::utils::{fourcc_to_string, FOURCC};
use crate::io::DecodeError;

pub enum Chunk {
    Cast(CastChunk),
    CastList(CastListChunk),
    CastMember(CastMemberChunk),
    Config(ConfigChunk),
    InitialMap(InitialMapChunk),
    MemoryMap(MemoryMapChunk),
    KeyTable(KeyTableChunk),
    Script(ScriptChunk),
    ScriptContext(ScriptContextChunk),
    ScriptNames(ScriptNamesChunk),
    FrameLabels(FrameLabelsChunk),
    Score(ScoreChunk),
    Text(TextChunk),
    Bitmap(BitmapChunk),
    Palette(PaletteChunk),
    Sound(SoundChunk),
}

impl Chunk {
    pub fn as_text(&self) -> Option<&TextChunk> {
        match self {
            Self::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_bitmap(&self) -> Option<&BitmapChunk> {
        match self {
            Self::Bitmap(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_palette(&self) -> Option<&PaletteChunk> {
        match self {
            Self::Palette(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_sound(&self) -> Option<&SoundChunk> {
        match self {
            Self::Sound(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_score(&self) -> Option<&ScoreChunk> {
        match self {
            Self::Score(data) => Some(data),
            _ => None,
        }
    }
}

/// Location and compression metadata for one resource in the container.
pub struct ChunkInfo {
    pub id: u32,
    pub fourcc: u32,
    pub len: usize,
    pub uncompressed_len: usize,
    pub offset: usize,
    pub compression_id: MoaId,
}

pub struct ChunkContainer {
    pub chunk_info: HashMap<u32, ChunkInfo>,
    pub cached_chunk_views: HashMap<u32, Vec<u8>>,
}

impl ChunkContainer {
    pub fn new() -> ChunkContainer {
        ChunkContainer {
            chunk_info: HashMap::new(),
            cached_chunk_views: HashMap::new(),
        }
    }
}

impl Default for ChunkContainer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn make_chunk(
    endian: Endian,
    rifx: &mut RifxReaderContext,
    fourcc: u32,
    view: &[u8],
) -> Result<Chunk, DecodeError> {
    let version = rifx.dir_version;
    let mut reader = BinaryReader::from_u8(view);
    reader.set_endian(endian);

    match fourcc_to_string(fourcc).as_str() {
        "imap" => Ok(Chunk::InitialMap(InitialMapChunk::from_reader(&mut reader)?)),
        "mmap" => Ok(Chunk::MemoryMap(MemoryMapChunk::from_reader(&mut reader)?)),
        "DRCF" | "VWCF" => Ok(Chunk::Config(ConfigChunk::from_reader(&mut reader, endian)?)),
        "KEY*" => Ok(Chunk::KeyTable(KeyTableChunk::from_reader(&mut reader)?)),
        "CAS*" => Ok(Chunk::Cast(CastChunk::from_reader(&mut reader)?)),
        "MCsL" => Ok(Chunk::CastList(CastListChunk::from_reader(&mut reader, version)?)),
        "CASt" => Ok(Chunk::CastMember(CastMemberChunk::from_reader(&mut reader, version)?)),
        "Lctx" | "LctX" => {
            rifx.lctx_capital_x = fourcc == FOURCC("LctX");
            Ok(Chunk::ScriptContext(ScriptContextChunk::from_reader(&mut reader)?))
        }
        "Lnam" => Ok(Chunk::ScriptNames(ScriptNamesChunk::from_reader(&mut reader)?)),
        "Lscr" => Ok(Chunk::Script(ScriptChunk::from_reader(
            &mut reader,
            version,
            rifx.lctx_capital_x,
        )?)),
        "VWSC" | "SCVW" => Ok(Chunk::Score(ScoreChunk::from_reader(&mut reader)?)),
        "VWLB" => Ok(Chunk::FrameLabels(FrameLabelsChunk::from_reader(&mut reader)?)),
        "STXT" => Ok(Chunk::Text(TextChunk::from_reader(&mut reader)?)),
        "snd " => Ok(Chunk::Sound(SoundChunk::from_reader(&mut reader)?)),
        "BITD" => Ok(Chunk::Bitmap(BitmapChunk::from_reader(&mut reader)?)),
        "CLUT" => Ok(Chunk::Palette(PaletteChunk::from_reader(&mut reader)?)),
        _ => Err(DecodeError::UnknownChunk(fourcc_to_string(fourcc))),
    }
}
