use binary_reader::{BinaryReader, Endian};

use crate::io::DecodeError;

/// Sprite state for one channel in one frame of the expanded frame-delta
/// stream.
#[derive(Clone, Default)]
pub struct FrameSpriteData {
    pub flags: u16,
    pub cast_lib: u16,
    pub cast_member: u16,
    pub pos_y: i16,
    pub pos_x: i16,
    pub height: i16,
    pub width: i16,
}

impl FrameSpriteData {
    fn read(reader: &mut BinaryReader) -> Result<FrameSpriteData, DecodeError> {
        let flags = reader.read_u16()?;
        let _unk0 = reader.read_u16()?;
        let cast_lib = reader.read_u16()?;
        let cast_member = reader.read_u16()?;
        let _unk1 = reader.read_u16()?;
        let pos_y = reader.read_i16()?;
        let pos_x = reader.read_i16()?;
        let height = reader.read_i16()?;
        let width = reader.read_i16()?;
        Ok(FrameSpriteData {
            flags,
            cast_lib,
            cast_member,
            pos_y,
            pos_x,
            height,
            width,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cast_member == 0 && self.cast_lib == 0
    }
}

pub struct ScoreFrameDataHeader {
    pub frame_count: u32,
    pub sprite_record_size: u16,
    pub num_channels: u16,
}

/// The frame-delta stream of score entry 0: per-frame patches against a
/// rolling channel-data buffer.
pub struct ScoreFrameData {
    pub header: ScoreFrameDataHeader,
    pub uncompressed_data: Vec<u8>,
    /// Frame-major expanded sprite records, `frame_count` rows of
    /// `num_channels` each.
    pub channel_sprites: Vec<Vec<FrameSpriteData>>,
}

impl ScoreFrameData {
    pub fn read(reader: &mut BinaryReader) -> Result<ScoreFrameData, DecodeError> {
        let header = Self::read_header(reader)?;

        let mut channel_data = vec![
            0u8;
            header.frame_count as usize
                * header.num_channels as usize
                * header.sprite_record_size as usize
        ];

        while reader.pos < reader.length {
            let length = reader.read_u16()?;
            if length == 0 {
                break;
            }
            let frame_length = (length - 2) as usize;
            if frame_length > 0 {
                let chunk_data = reader.read_bytes(frame_length)?;
                let mut frame_reader = BinaryReader::from_u8(chunk_data);
                frame_reader.set_endian(Endian::Big);

                while frame_reader.pos < frame_reader.length {
                    let channel_size = frame_reader.read_u16()? as usize;
                    let channel_offset = frame_reader.read_u16()? as usize;
                    let delta = frame_reader.read_bytes(channel_size)?;
                    if channel_offset + channel_size <= channel_data.len() {
                        channel_data[channel_offset..channel_offset + channel_size]
                            .copy_from_slice(delta);
                    }
                }
            }
        }

        let mut channel_sprites = Vec::with_capacity(header.frame_count as usize);
        let mut channel_reader = BinaryReader::from_vec(&channel_data);
        channel_reader.set_endian(Endian::Big);
        for _ in 0..header.frame_count {
            let mut row = Vec::with_capacity(header.num_channels as usize);
            for _ in 0..header.num_channels {
                let pos = channel_reader.pos;
                row.push(FrameSpriteData::read(&mut channel_reader)?);
                channel_reader.jmp(pos + header.sprite_record_size as usize);
            }
            channel_sprites.push(row);
        }

        Ok(ScoreFrameData {
            header,
            uncompressed_data: channel_data,
            channel_sprites,
        })
    }

    fn read_header(reader: &mut BinaryReader) -> Result<ScoreFrameDataHeader, DecodeError> {
        let _actual_length = reader.read_u32()?;
        let _unk1 = reader.read_u32()?;
        let frame_count = reader.read_u32()?;
        let _frames_version = reader.read_u16()?;
        let sprite_record_size = reader.read_u16()?;
        let num_channels = reader.read_u16()?;
        // Channel-display count: explicit from version 14 on, implied
        // before.
        reader.read_u16()?;

        Ok(ScoreFrameDataHeader {
            frame_count,
            sprite_record_size,
            num_channels,
        })
    }
}

/// One span in a score channel. `channel` 0 carries the frame script,
/// channels >= 1 are sprites.
pub struct FrameIntervalPrimary {
    pub start_frame: u32,
    pub end_frame: u32,
    pub unk0: u32,
    pub unk1: u32,
    pub channel: u32,
    pub unk2: u16,
    pub unk3: u32,
    pub unk4: u16,
    pub unk5: u32,
    pub unk6: u32,
    pub unk7: u32,
    pub unk8: u32,
}

impl FrameIntervalPrimary {
    fn read(reader: &mut BinaryReader) -> Result<FrameIntervalPrimary, DecodeError> {
        Ok(FrameIntervalPrimary {
            start_frame: reader.read_u32()?,
            end_frame: reader.read_u32()?,
            unk0: reader.read_u32()?,
            unk1: reader.read_u32()?,
            channel: reader.read_u32()?,
            unk2: reader.read_u16()?,
            unk3: reader.read_u32()?,
            unk4: reader.read_u16()?,
            unk5: reader.read_u32()?,
            unk6: reader.read_u32()?,
            unk7: reader.read_u32()?,
            unk8: reader.read_u32()?,
        })
    }
}

/// The behavior reference attached to a span.
pub struct FrameIntervalSecondary {
    pub cast_lib: u16,
    pub cast_member: u16,
    pub unk0: u32,
}

impl FrameIntervalSecondary {
    fn read(reader: &mut BinaryReader) -> Result<FrameIntervalSecondary, DecodeError> {
        Ok(FrameIntervalSecondary {
            cast_lib: reader.read_u16()?,
            cast_member: reader.read_u16()?,
            unk0: reader.read_u32()?,
        })
    }
}

pub struct ScoreChunkHeader {
    pub total_length: u32,
    pub unk1: u32,
    pub unk2: u32,
    pub entry_count: u32,
    pub unk3: u32,
    pub entry_size_sum: u32,
}

/// `VWSC`: the movie timeline. Big-endian. Entries 0-2 are the frame
/// delta stream and two reserved tables; the rest cycle primary /
/// secondary / tertiary interval records. Tertiary records are kept
/// opaque.
pub struct ScoreChunk {
    pub header: ScoreChunkHeader,
    pub frame_interval_primaries: Vec<FrameIntervalPrimary>,
    pub frame_interval_secondaries: Vec<FrameIntervalSecondary>,
    pub frame_data: ScoreFrameData,
}

impl ScoreChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<ScoreChunk, DecodeError> {
        reader.set_endian(Endian::Big);
        let header = ScoreChunkHeader {
            total_length: reader.read_u32()?,
            unk1: reader.read_u32()?,
            unk2: reader.read_u32()?,
            entry_count: reader.read_u32()?,
            unk3: reader.read_u32()?,
            entry_size_sum: reader.read_u32()?,
        };

        let offsets = (0..header.entry_count + 1)
            .map(|_| Ok(reader.read_u32()? as usize))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let entries = (0..header.entry_count as usize)
            .map(|i| {
                let length = offsets[i + 1].saturating_sub(offsets[i]);
                Ok(reader.read_bytes(length)?.to_vec())
            })
            .collect::<Result<Vec<Vec<u8>>, DecodeError>>()?;

        if entries.is_empty() {
            return Err(DecodeError::BadChunk("score chunk with no entries".to_string()));
        }

        let mut delta_reader = BinaryReader::from_vec(&entries[0]);
        delta_reader.set_endian(Endian::Big);
        let frame_data = ScoreFrameData::read(&mut delta_reader)?;

        let mut frame_interval_primaries = vec![];
        let mut frame_interval_secondaries = vec![];
        for (i, entry) in entries.iter().skip(3).enumerate() {
            if entry.is_empty() {
                continue;
            }
            let mut interval_reader = BinaryReader::from_u8(entry);
            interval_reader.set_endian(Endian::Big);
            match i % 3 {
                0 => frame_interval_primaries.push(FrameIntervalPrimary::read(&mut interval_reader)?),
                1 => frame_interval_secondaries.push(FrameIntervalSecondary::read(&mut interval_reader)?),
                _ => {} // tertiary, opaque
            }
        }

        Ok(ScoreChunk {
            header,
            frame_interval_primaries,
            frame_interval_secondaries,
            frame_data,
        })
    }
}

#[derive(Clone)]
pub struct FrameLabel {
    pub frame_num: i32,
    pub label: String,
}

/// `VWLB`: the frame-label map.
pub struct FrameLabelsChunk {
    pub labels: Vec<FrameLabel>,
}

impl FrameLabelsChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<FrameLabelsChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        let count = reader.read_u16()? as usize;
        let mut heads = Vec::with_capacity(count);
        for _ in 0..count {
            let frame_num = reader.read_u16()? as i32;
            let text_offset = reader.read_u16()? as usize;
            heads.push((frame_num, text_offset));
        }

        let text_len = reader.read_u32()? as usize;
        let text_base = reader.pos;
        let mut labels = Vec::with_capacity(count);
        for (i, &(frame_num, offset)) in heads.iter().enumerate() {
            let end = heads
                .get(i + 1)
                .map(|&(_, next)| next)
                .unwrap_or(text_len);
            reader.jmp(text_base + offset);
            let bytes = reader.read_bytes(end.saturating_sub(offset))?;
            labels.push(FrameLabel {
                frame_num,
                label: bytes.iter().map(|&b| b as char).collect(),
            });
        }

        Ok(FrameLabelsChunk { labels })
    }
}
