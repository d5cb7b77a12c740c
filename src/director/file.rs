use std::collections::HashMap;

use binary_reader::{BinaryReader, Endian};
use log::{debug, warn};

use crate::io::reader::ReaderExt;
use crate::io::writer::BinaryWriter;
use crate::io::DecodeError;

use super::cast::CastDef;
use super::chunks::cast_list::CastListEntry;
use super::chunks::config::ConfigChunk;
use super::chunks::imap::{InitialMapChunk, MemoryMapChunk};
use super::chunks::key_table::KeyTableChunk;
use super::chunks::score::{FrameLabelsChunk, ScoreChunk};
use super::chunks::{make_chunk, Chunk, ChunkContainer, ChunkInfo};
use super::guid::{MoaId, NULL_COMPRESSION_ID};
use super::rifx::RifxReaderContext;
use super::utils::{fourcc_to_string, human_version, FOURCC};

/// One slot of the container's resource map, as enumerated. Freed slots
/// are included here but excluded from lookups.
#[derive(Clone)]
pub struct ChunkEntry {
    pub id: u32,
    pub fourcc: u32,
    pub len: u32,
    pub offset: usize,
}

/// Parsing state shared by the chunk decoders: the raw file bytes, the
/// id-indexed resource map, per-chunk byte caches and the key table.
pub struct ContainerState {
    pub reader: BinaryReader,
    pub container: ChunkContainer,
    pub rifx: RifxReaderContext,
    pub key_table: KeyTableChunk,
}

impl ContainerState {
    fn first_info(&self, fourcc: u32) -> Option<(u32, u32)> {
        self.container
            .chunk_info
            .values()
            .filter(|info| info.fourcc == fourcc)
            .min_by_key(|info| info.id)
            .map(|info| (info.fourcc, info.id))
    }

    /// Raw (decompressed) bytes of chunk `id`, fetched and cached.
    pub fn chunk_data(&mut self, fourcc: u32, id: u32) -> Result<Vec<u8>, DecodeError> {
        let info = match self.container.chunk_info.get(&id) {
            Some(info) => info,
            None => {
                return Err(DecodeError::BadChunk(format!(
                    "no chunk {} #{id} in the container",
                    fourcc_to_string(fourcc)
                )))
            }
        };
        if info.fourcc != fourcc {
            return Err(DecodeError::BadChunk(format!(
                "expected chunk #{id} to be '{}', found '{}'",
                fourcc_to_string(fourcc),
                fourcc_to_string(info.fourcc)
            )));
        }

        if let Some(cached) = self.container.cached_chunk_views.get(&id) {
            return Ok(cached.clone());
        }

        let bytes = if self.rifx.after_burned {
            self.reader.jmp(info.offset + self.rifx.ils_body_offset);
            if info.len == 0 && info.uncompressed_len == 0 {
                Vec::new()
            } else if info.compression_id.is_zlib() && info.len != info.uncompressed_len {
                let inflated = self.reader.read_zlib_bytes(info.len)?;
                if inflated.len() != info.uncompressed_len {
                    return Err(DecodeError::CorruptCompression(format!(
                        "chunk #{id}: expected {} inflated bytes, got {}",
                        info.uncompressed_len,
                        inflated.len()
                    )));
                }
                inflated
            } else {
                if info.compression_id != NULL_COMPRESSION_ID && !info.compression_id.is_zlib() {
                    warn!(
                        "chunk #{id}: unhandled compression type {}, reading raw",
                        info.compression_id
                    );
                }
                self.reader.read_bytes(info.len)?.to_vec()
            }
        } else {
            // Validate the on-disk chunk header against the map entry.
            self.reader.jmp(info.offset);
            let disk_fourcc = self.reader.read_u32()?;
            let disk_len = self.reader.read_u32()? as usize;
            if disk_fourcc != info.fourcc || disk_len != info.len {
                return Err(DecodeError::BadChunk(format!(
                    "at offset {} expected '{}' of {} bytes, found '{}' of {} bytes",
                    info.offset,
                    fourcc_to_string(info.fourcc),
                    info.len,
                    fourcc_to_string(disk_fourcc),
                    disk_len
                )));
            }
            self.reader.read_bytes(disk_len)?.to_vec()
        };

        self.container.cached_chunk_views.insert(id, bytes.clone());
        Ok(bytes)
    }

    /// Typed chunk `id`.
    pub fn chunk(&mut self, fourcc: u32, id: u32) -> Result<Chunk, DecodeError> {
        let view = self.chunk_data(fourcc, id)?;
        make_chunk(self.reader.endian, &mut self.rifx, fourcc, &view)
    }

    pub fn first_chunk(&mut self, fourcc: u32) -> Option<Chunk> {
        let (fourcc, id) = self.first_info(fourcc)?;
        match self.chunk(fourcc, id) {
            Ok(chunk) => Some(chunk),
            Err(err) => {
                warn!("failed to read {} chunk #{id}: {err}", fourcc_to_string(fourcc));
                None
            }
        }
    }
}

/// A fully parsed movie or cast file.
pub struct MovieFile {
    pub file_name: String,
    pub base_path: String,
    pub endian: Endian,
    pub after_burned: bool,
    pub codec: u32,
    /// Lingo-scale version number (`human_version` of the config word).
    pub version: u16,
    pub config: ConfigChunk,
    pub cast_entries: Vec<CastListEntry>,
    pub casts: Vec<CastDef>,
    pub score: Option<ScoreChunk>,
    pub frame_labels: Option<FrameLabelsChunk>,
    /// Raw enumeration of the resource map, freed slots included.
    pub entries: Vec<ChunkEntry>,
    pub state: ContainerState,
}

impl MovieFile {
    pub fn key_table(&self) -> &KeyTableChunk {
        &self.state.key_table
    }

    /// Resolves the chunk a key-table join says `owner_id` owns.
    pub fn owned_chunk(&mut self, owner_id: u32, fourcc: u32) -> Option<Chunk> {
        let section_id = self.state.key_table.find_owned(owner_id, fourcc)?.section_id;
        self.state.chunk(fourcc, section_id).ok()
    }
}

/// Container-level view: byte order, codec and the raw resource
/// enumeration, without decoding any chunk contents.
pub struct ContainerMap {
    pub endian: Endian,
    pub codec: u32,
    pub after_burned: bool,
    pub entries: Vec<ChunkEntry>,
}

pub fn read_container_map(bytes: &[u8]) -> Result<ContainerMap, DecodeError> {
    let mut reader = BinaryReader::from_u8(bytes);
    reader.set_endian(Endian::Big);

    let meta_fourcc = reader.read_u32()?;
    let endian = if meta_fourcc == FOURCC("RIFX") {
        Endian::Big
    } else if meta_fourcc == FOURCC("XFIR") {
        Endian::Little
    } else {
        return Err(DecodeError::BadMagic(meta_fourcc));
    };
    reader.set_endian(endian);
    let _meta_length = reader.read_u32()?;
    let codec = reader.read_u32()?;

    let mut container = ChunkContainer::new();
    let mut entries = Vec::new();
    let after_burned;
    if codec == FOURCC("MV93") || codec == FOURCC("MC95") {
        after_burned = false;
        read_memory_map(&mut reader, &mut container, &mut entries, meta_fourcc)?;
    } else if codec == FOURCC("FGDM") || codec == FOURCC("FGDC") {
        after_burned = true;
        read_afterburner_map(&mut reader, &mut container)?;
        let mut infos: Vec<&ChunkInfo> = container.chunk_info.values().collect();
        infos.sort_by_key(|info| info.id);
        for info in infos {
            entries.push(ChunkEntry {
                id: info.id,
                fourcc: info.fourcc,
                len: info.len as u32,
                offset: info.offset,
            });
        }
    } else {
        return Err(DecodeError::BadMagic(codec));
    }

    Ok(ContainerMap {
        endian,
        codec,
        after_burned,
        entries,
    })
}

pub fn read_movie_file_bytes(
    bytes: &[u8],
    file_name: &str,
    base_path: &str,
) -> Result<MovieFile, DecodeError> {
    let mut reader = BinaryReader::from_u8(bytes);
    reader.set_endian(Endian::Big);

    let meta_fourcc = reader.read_u32()?;
    let endian = if meta_fourcc == FOURCC("RIFX") {
        Endian::Big
    } else if meta_fourcc == FOURCC("XFIR") {
        Endian::Little
    } else {
        return Err(DecodeError::BadMagic(meta_fourcc));
    };
    reader.set_endian(endian);

    let _meta_length = reader.read_u32()?;
    let codec = reader.read_u32()?;

    let mut container = ChunkContainer::new();
    let mut entries = Vec::new();
    let after_burned;
    let mut ils_body_offset = 0;

    if codec == FOURCC("MV93") || codec == FOURCC("MC95") {
        after_burned = false;
        read_memory_map(&mut reader, &mut container, &mut entries, meta_fourcc)?;
    } else if codec == FOURCC("FGDM") || codec == FOURCC("FGDC") {
        after_burned = true;
        ils_body_offset = read_afterburner_map(&mut reader, &mut container)?;
    } else {
        return Err(DecodeError::BadMagic(codec));
    }

    let mut state = ContainerState {
        reader,
        container,
        rifx: RifxReaderContext::new(after_burned, ils_body_offset),
        key_table: KeyTableChunk::empty(),
    };

    // Key table first: every other cross-chunk join goes through it.
    state.key_table = match state.first_chunk(FOURCC("KEY*")) {
        Some(Chunk::KeyTable(key_table)) => key_table,
        _ => return Err(DecodeError::BadChunk("container has no key table".to_string())),
    };

    let config = match state
        .first_chunk(FOURCC("DRCF"))
        .or_else(|| state.first_chunk(FOURCC("VWCF")))
    {
        Some(Chunk::Config(config)) => config,
        _ => return Err(DecodeError::BadChunk("container has no config chunk".to_string())),
    };
    state.rifx.dir_version = human_version(config.director_version);

    let (cast_entries, casts) = read_casts(&mut state, &config)?;

    let score = state.first_chunk(FOURCC("VWSC")).and_then(|c| match c {
        Chunk::Score(score) => Some(score),
        _ => None,
    });
    let frame_labels = state.first_chunk(FOURCC("VWLB")).and_then(|c| match c {
        Chunk::FrameLabels(labels) => Some(labels),
        _ => None,
    });

    Ok(MovieFile {
        file_name: file_name.to_string(),
        base_path: base_path.to_string(),
        endian,
        after_burned,
        codec,
        version: state.rifx.dir_version,
        config,
        cast_entries,
        casts,
        score,
        frame_labels,
        entries,
        state,
    })
}

fn read_casts(
    state: &mut ContainerState,
    config: &ConfigChunk,
) -> Result<(Vec<CastListEntry>, Vec<CastDef>), DecodeError> {
    let mut casts = Vec::new();

    if state.rifx.dir_version >= 500 {
        if let Some(Chunk::CastList(cast_list)) = state.first_chunk(FOURCC("MCsL")) {
            for entry in &cast_list.entries {
                let cast_chunk = state
                    .key_table
                    .find_owned(entry.id, FOURCC("CAS*"))
                    .map(|e| e.section_id)
                    .and_then(|section_id| match state.chunk(FOURCC("CAS*"), section_id) {
                        Ok(Chunk::Cast(cast)) => Some(cast),
                        _ => None,
                    });
                if let Some(cast_chunk) = cast_chunk {
                    casts.push(CastDef::read(
                        entry.name.clone(),
                        entry.file_path.clone(),
                        entry.id,
                        entry.min_member,
                        &cast_chunk.member_ids,
                        state,
                    )?);
                } else if !entry.file_path.is_empty() {
                    // External cast: mounted later by the resource loader.
                    casts.push(CastDef {
                        id: entry.id,
                        name: entry.name.clone(),
                        file_path: entry.file_path.clone(),
                        min_member: entry.min_member,
                        members: HashMap::new(),
                        lctx: None,
                        capital_x: false,
                        dir_version: state.rifx.dir_version,
                    });
                }
            }
            return Ok((cast_list.entries, casts));
        }
    }

    // Single-cast movies store a bare CAS* table.
    if let Some(Chunk::Cast(cast_chunk)) = state.first_chunk(FOURCC("CAS*")) {
        casts.push(CastDef::read(
            "Internal".to_string(),
            String::new(),
            DEFAULT_CAST_LIB_ID,
            config.min_member,
            &cast_chunk.member_ids,
            state,
        )?);
    } else {
        debug!("container has no cast table");
    }

    Ok((Vec::new(), casts))
}

/// The id Director assigns a movie's sole internal cast.
pub const DEFAULT_CAST_LIB_ID: u32 = 1024;

fn read_memory_map(
    reader: &mut BinaryReader,
    container: &mut ChunkContainer,
    entries: &mut Vec<ChunkEntry>,
    _meta_fourcc: u32,
) -> Result<(), DecodeError> {
    // `imap` sits immediately after the 12-byte container header.
    let imap_fourcc = reader.read_u32()?;
    if imap_fourcc != FOURCC("imap") {
        return Err(DecodeError::BadChunk(format!(
            "expected imap after the container header, found '{}'",
            fourcc_to_string(imap_fourcc)
        )));
    }
    let _imap_len = reader.read_u32()?;
    let imap = InitialMapChunk::from_reader(reader)?;

    reader.jmp(imap.mmap_offset);
    let mmap_fourcc = reader.read_u32()?;
    if mmap_fourcc != FOURCC("mmap") {
        return Err(DecodeError::BadChunk(format!(
            "expected mmap at offset {}, found '{}'",
            imap.mmap_offset,
            fourcc_to_string(mmap_fourcc)
        )));
    }
    let _mmap_len = reader.read_u32()?;
    let mmap = MemoryMapChunk::from_reader(reader)?;

    for (i, entry) in mmap.entries.iter().enumerate() {
        let id = i as u32;
        entries.push(ChunkEntry {
            id,
            fourcc: entry.fourcc,
            len: entry.len,
            offset: entry.offset as usize,
        });
        if entry.is_free() {
            continue;
        }
        container.chunk_info.insert(
            id,
            ChunkInfo {
                id,
                fourcc: entry.fourcc,
                len: entry.len as usize,
                uncompressed_len: entry.len as usize,
                offset: entry.offset as usize,
                compression_id: NULL_COMPRESSION_ID,
            },
        );
    }
    Ok(())
}

fn read_afterburner_map(
    reader: &mut BinaryReader,
    container: &mut ChunkContainer,
) -> Result<usize, DecodeError> {
    // Fver
    if reader.read_u32()? != FOURCC("Fver") {
        return Err(DecodeError::BadChunk("Fver expected but not found".to_string()));
    }
    let fver_length = reader.read_var_int()? as usize;
    let fver_start = reader.pos;
    let fver_version = reader.read_var_int()?;
    if fver_version >= 0x401 {
        let _imap_version = reader.read_var_int()?;
        let _director_version = reader.read_var_int()?;
    }
    if fver_version >= 0x501 {
        let len = reader.read_u8()? as usize;
        let _version_string = reader.read_string(len)?;
    }
    if reader.pos - fver_start != fver_length {
        debug!(
            "Fver declared {} bytes but {} were read",
            fver_length,
            reader.pos - fver_start
        );
        reader.jmp(fver_start + fver_length);
    }

    // Fcdr: compression type table
    if reader.read_u32()? != FOURCC("Fcdr") {
        return Err(DecodeError::BadChunk("Fcdr expected but not found".to_string()));
    }
    let fcdr_length = reader.read_var_int()? as usize;
    let fcdr_uncomp = reader.read_zlib_bytes(fcdr_length)?;
    let mut fcdr_reader = BinaryReader::from_vec(&fcdr_uncomp);
    fcdr_reader.set_endian(reader.endian);

    let compression_type_count = fcdr_reader.read_u16()?;
    let compression_ids = (0..compression_type_count)
        .map(|_| MoaId::from_reader(&mut fcdr_reader))
        .collect::<Result<Vec<_>, DecodeError>>()?;
    for _ in 0..compression_type_count {
        let _desc = fcdr_reader.read_cstr()?;
    }
    if fcdr_reader.pos != fcdr_reader.length {
        debug!(
            "Fcdr: {} of {} bytes consumed",
            fcdr_reader.pos, fcdr_reader.length
        );
    }

    // ABMP: the resource map
    if reader.read_u32()? != FOURCC("ABMP") {
        return Err(DecodeError::BadChunk("ABMP expected but not found".to_string()));
    }
    let abmp_length = reader.read_var_int()? as usize;
    let abmp_end = reader.pos + abmp_length;
    let _abmp_compression_type = reader.read_var_int()?;
    let abmp_uncomp_length = reader.read_var_int()? as usize;
    let abmp_uncomp = reader.read_zlib_bytes(abmp_end - reader.pos)?;
    if abmp_uncomp.len() != abmp_uncomp_length {
        debug!(
            "ABMP: expected {} inflated bytes, got {}",
            abmp_uncomp_length,
            abmp_uncomp.len()
        );
    }
    let mut abmp_reader = BinaryReader::from_vec(&abmp_uncomp);
    abmp_reader.set_endian(reader.endian);

    let _abmp_unk1 = abmp_reader.read_var_int()?;
    let _abmp_unk2 = abmp_reader.read_var_int()?;
    let res_count = abmp_reader.read_var_int()?;

    let mut prev_end: i64 = 0;
    for _ in 0..res_count {
        let res_id = abmp_reader.read_var_int()? as u32;
        let mut offset = abmp_reader.read_var_int()? as i64;
        let comp_size = abmp_reader.read_var_int()? as usize;
        let uncomp_size = abmp_reader.read_var_int()? as usize;
        let compression_type = abmp_reader.read_var_int()? as usize;
        let tag = abmp_reader.read_u32()?;

        // -1 chains the entry directly after the previous one.
        if offset == -1 {
            offset = prev_end;
        }
        prev_end = offset + comp_size as i64;

        let compression_id = compression_ids
            .get(compression_type)
            .copied()
            .unwrap_or(NULL_COMPRESSION_ID);
        container.chunk_info.insert(
            res_id,
            ChunkInfo {
                id: res_id,
                fourcc: tag,
                len: comp_size,
                uncompressed_len: uncomp_size,
                offset: offset as usize,
                compression_id,
            },
        );
    }

    // FGEI: the initial load segment
    let ils_info_len = match container.chunk_info.get(&2) {
        Some(info) if info.fourcc == FOURCC("ILS ") => info.len,
        _ => {
            return Err(DecodeError::BadChunk(
                "Afterburner map has no ILS entry".to_string(),
            ))
        }
    };
    if reader.read_u32()? != FOURCC("FGEI") {
        return Err(DecodeError::BadChunk("FGEI expected but not found".to_string()));
    }
    let _fgei_unk = reader.read_var_int()?;
    let ils_body_offset = reader.pos;

    let ils_uncomp = reader.read_zlib_bytes(ils_info_len)?;
    let mut ils_reader = BinaryReader::from_vec(&ils_uncomp);
    ils_reader.set_endian(reader.endian);

    while !ils_reader.eof() {
        let res_id = ils_reader.read_var_int()? as u32;
        let info = container.chunk_info.get(&res_id).ok_or_else(|| {
            DecodeError::BadChunk(format!("ILS carries unmapped resource #{res_id}"))
        })?;
        let bytes = ils_reader.read_bytes(info.len)?.to_vec();
        container.cached_chunk_views.insert(res_id, bytes);
    }

    Ok(ils_body_offset)
}

/// Assembles a plain (non-Afterburner) container around the given chunk
/// bodies. Field layouts match what `read_movie_file_bytes` consumes.
pub fn write_plain_container(endian: Endian, codec: u32, chunks: &[(u32, Vec<u8>)]) -> Vec<u8> {
    const HEADER_LEN: usize = 12;
    const IMAP_OFFSET: usize = HEADER_LEN;
    const IMAP_BODY_LEN: usize = 24;
    const MMAP_OFFSET: usize = IMAP_OFFSET + 8 + IMAP_BODY_LEN;
    const MMAP_HEADER_LEN: usize = 24;
    const ENTRY_LEN: usize = 20;

    let entry_count = 3 + chunks.len();
    let mmap_body_len = MMAP_HEADER_LEN + entry_count * ENTRY_LEN;
    let first_chunk_offset = MMAP_OFFSET + 8 + mmap_body_len;

    // Chunk offsets, each padded to an even boundary.
    let mut offsets = Vec::with_capacity(chunks.len());
    let mut cursor = first_chunk_offset;
    for (_, body) in chunks {
        offsets.push(cursor);
        cursor += 8 + body.len();
        if cursor % 2 == 1 {
            cursor += 1;
        }
    }
    let total_len = cursor;

    let mut writer = BinaryWriter::new(endian);
    writer.write_fourcc(if matches!(endian, Endian::Big) {
        FOURCC("RIFX")
    } else {
        FOURCC("XFIR")
    });
    writer.write_u32((total_len - 8) as u32);
    writer.write_fourcc(codec);

    writer.write_fourcc(FOURCC("imap"));
    writer.write_u32(IMAP_BODY_LEN as u32);
    writer.write_u32(1); // one memory map
    writer.write_u32(MMAP_OFFSET as u32);
    writer.write_u32(0); // map version
    writer.write_u32(0);
    writer.write_u32(0);
    writer.write_u32(0);

    writer.write_fourcc(FOURCC("mmap"));
    writer.write_u32(mmap_body_len as u32);
    writer.write_u16(MMAP_HEADER_LEN as u16);
    writer.write_u16(ENTRY_LEN as u16);
    writer.write_u32(entry_count as u32);
    writer.write_u32(entry_count as u32);
    writer.write_i32(-1);
    writer.write_i32(-1);
    writer.write_i32(-1);

    let mut write_entry = |writer: &mut BinaryWriter, fourcc: u32, len: u32, offset: u32| {
        writer.write_fourcc(fourcc);
        writer.write_u32(len);
        writer.write_u32(offset);
        writer.write_u16(0);
        writer.write_u16(0);
        writer.write_u32(0);
    };

    write_entry(&mut writer, FOURCC("RIFX"), (total_len - 8) as u32, 0);
    write_entry(&mut writer, FOURCC("imap"), IMAP_BODY_LEN as u32, IMAP_OFFSET as u32);
    write_entry(&mut writer, FOURCC("mmap"), mmap_body_len as u32, MMAP_OFFSET as u32);
    for ((fourcc, body), offset) in chunks.iter().zip(&offsets) {
        write_entry(&mut writer, *fourcc, body.len() as u32, *offset as u32);
    }

    for ((fourcc, body), offset) in chunks.iter().zip(&offsets) {
        writer.jmp(*offset);
        writer.write_fourcc(*fourcc);
        writer.write_u32(body.len() as u32);
        writer.write_buf(body);
    }
    if writer.len() < total_len {
        writer.jmp(total_len - 1);
        writer.write_u8(0);
    }

    writer.into_bytes()
}

/// Rewrites a plain container's config chunk so authoring tools reopen
/// the movie. Byte-for-byte idempotent.
pub fn unprotect_movie(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut reader = BinaryReader::from_u8(bytes);
    reader.set_endian(Endian::Big);

    let meta_fourcc = reader.read_u32()?;
    let endian = if meta_fourcc == FOURCC("RIFX") {
        Endian::Big
    } else if meta_fourcc == FOURCC("XFIR") {
        Endian::Little
    } else {
        return Err(DecodeError::BadMagic(meta_fourcc));
    };
    reader.set_endian(endian);
    let _len = reader.read_u32()?;
    let codec = reader.read_u32()?;
    if codec != FOURCC("MV93") && codec != FOURCC("MC95") {
        return Err(DecodeError::BadChunk(
            "only plain containers can be unprotected".to_string(),
        ));
    }

    let mut container = ChunkContainer::new();
    let mut entries = Vec::new();
    read_memory_map(&mut reader, &mut container, &mut entries, meta_fourcc)?;

    let config_info = container
        .chunk_info
        .values()
        .find(|info| info.fourcc == FOURCC("DRCF") || info.fourcc == FOURCC("VWCF"))
        .ok_or_else(|| DecodeError::BadChunk("container has no config chunk".to_string()))?;

    let body_start = config_info.offset + 8;
    let body_end = body_start + config_info.len;
    if body_end > bytes.len() {
        return Err(DecodeError::BadChunk("config chunk overruns the file".to_string()));
    }

    let new_body = super::chunks::config::unprotect_config_body(&bytes[body_start..body_end], endian)?;
    let mut out = bytes.to_vec();
    out[body_start..body_start + new_body.len().min(config_info.len)]
        .copy_from_slice(&new_body[..new_body.len().min(config_info.len)]);
    Ok(out)
}
