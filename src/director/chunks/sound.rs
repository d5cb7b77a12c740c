use binary_reader::{BinaryReader, Endian};

use crate::io::DecodeError;

/// `snd `: a classic Mac sound resource. Both format-1 and format-2
/// headers are accepted; the embedded standard sound header supplies the
/// sample parameters.
pub struct SoundChunk {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub sample_count: u32,
    pub data: Vec<u8>,
}

impl SoundChunk {
    pub fn from_reader(reader: &mut BinaryReader) -> Result<SoundChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        let format = reader.read_u16()?;
        match format {
            1 => {
                let data_format_count = reader.read_u16()?;
                for _ in 0..data_format_count {
                    reader.read_u16()?; // data format id
                    reader.read_u32()?; // init option
                }
            }
            2 => {
                reader.read_u16()?; // reference count
            }
            _ => {
                return Err(DecodeError::BadChunk(format!(
                    "unknown snd resource format {format}"
                )))
            }
        }

        let command_count = reader.read_u16()?;
        let mut header_offset = None;
        for _ in 0..command_count {
            let cmd = reader.read_u16()?;
            let _param1 = reader.read_u16()?;
            let param2 = reader.read_u32()?;
            // bufferCmd / soundCmd with the data-offset bit set
            if cmd & 0x8000 != 0 {
                header_offset = Some(param2 as usize);
            }
        }

        let header_offset = header_offset
            .ok_or_else(|| DecodeError::BadChunk("snd resource without a buffer command".to_string()))?;

        reader.jmp(header_offset);
        let _data_pointer = reader.read_u32()?;
        let length = reader.read_u32()?;
        let sample_rate_fixed = reader.read_u32()?;
        let _loop_start = reader.read_u32()?;
        let _loop_end = reader.read_u32()?;
        let encode = reader.read_u8()?;
        let _base_frequency = reader.read_u8()?;

        let (channels, bits_per_sample, sample_count, data_len) = match encode {
            // standard header: mono 8-bit samples
            0x00 => (1u16, 8u16, length, length as usize),
            // extended header: the length field held the channel count
            0xFF | 0xFE => {
                let channels = length as u16;
                let frames = reader.read_u32()?;
                reader.read_bytes(10)?; // extended-precision sample rate
                reader.read_u32()?; // marker chunk
                reader.read_u32()?; // instrument chunks
                reader.read_u32()?; // AES recording
                let sample_size = reader.read_u16()?;
                reader.read_bytes(14)?; // reserved
                let byte_len =
                    frames as usize * channels as usize * (sample_size as usize / 8).max(1);
                (channels, sample_size, frames, byte_len)
            }
            _ => {
                return Err(DecodeError::BadChunk(format!(
                    "unsupported snd encode option {encode:#04x}"
                )))
            }
        };

        let available = reader.length - reader.pos;
        let data = reader.read_bytes(data_len.min(available))?.to_vec();

        Ok(SoundChunk {
            channels,
            sample_rate: sample_rate_fixed >> 16,
            bits_per_sample,
            sample_count,
            data,
        })
    }
}
