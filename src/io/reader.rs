use std::io::Read;

use binary_reader::BinaryReader;

use super::{DecodeError, MAX_INFLATED_LEN};

pub trait ReaderExt {
    /// MSB-first variable-length integer: seven value bits per byte, high
    /// bit set on every byte except the last. At most five bytes.
    fn read_var_int(&mut self) -> Result<i32, DecodeError>;
    fn read_zlib_bytes(&mut self, length: usize) -> Result<Vec<u8>, DecodeError>;
    fn read_zlib_bytes_capped(
        &mut self,
        length: usize,
        max_out: usize,
    ) -> Result<Vec<u8>, DecodeError>;
    fn read_pascal_string(&mut self) -> Result<String, DecodeError>;
    fn read_string(&mut self, len: usize) -> Result<String, DecodeError>;
    fn read_apple_float_80(&mut self) -> Result<f64, DecodeError>;
    fn eof(&self) -> bool;
    fn bytes_left(&self) -> usize;
}

impl ReaderExt for BinaryReader {
    fn read_var_int(&mut self) -> Result<i32, DecodeError> {
        let mut val: i32 = 0;
        for _ in 0..5 {
            let b = self.read_u8()?;
            val = (val << 7) | ((b & 0x7f) as i32);
            if b >> 7 == 0 {
                return Ok(val);
            }
        }
        Err(DecodeError::BadVarInt)
    }

    fn read_zlib_bytes(&mut self, length: usize) -> Result<Vec<u8>, DecodeError> {
        self.read_zlib_bytes_capped(length, MAX_INFLATED_LEN)
    }

    fn read_zlib_bytes_capped(
        &mut self,
        length: usize,
        max_out: usize,
    ) -> Result<Vec<u8>, DecodeError> {
        let compressed = self.read_bytes(length)?;
        let mut decoder = flate2::read::ZlibDecoder::new(compressed).take(max_out as u64 + 1);
        let mut inflated = Vec::new();
        decoder
            .read_to_end(&mut inflated)
            .map_err(|e| DecodeError::CorruptCompression(e.to_string()))?;
        if inflated.len() > max_out {
            return Err(DecodeError::CorruptCompression(format!(
                "inflated stream exceeds the {max_out} byte bound"
            )));
        }
        Ok(inflated)
    }

    fn read_pascal_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u8()? as usize;
        self.read_string(len)
    }

    fn read_string(&mut self, len: usize) -> Result<String, DecodeError> {
        let bytes = self.read_bytes(len)?;
        // Director strings are single-byte MacRoman-ish text.
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    fn read_apple_float_80(&mut self) -> Result<f64, DecodeError> {
        // SANE Extended: 1 sign bit, 15 exponent bits, 64 fraction bits.
        let data = self.read_bytes(10)?;
        let exponent = u16::from_be_bytes([data[0], data[1]]);
        let f64sign: u64 = ((exponent & 0x8000) as u64) << 48;
        let exponent = exponent & 0x7fff;

        let mut fraction = u64::from_be_bytes([
            data[2], data[3], data[4], data[5], data[6], data[7], data[8], data[9],
        ]);
        fraction &= 0x7fffffffffffffff;

        let f64exp: u64 = if exponent == 0 {
            0
        } else if exponent == 0x7fff {
            0x7ff
        } else {
            let normexp = exponent as i64 - 0x3fff;
            if !(-0x3fe..0x3ff).contains(&normexp) {
                return Err(DecodeError::BadChunk(
                    "extended-precision exponent out of double range".to_string(),
                ));
            }
            (normexp + 0x3ff) as u64
        };

        let f64bin = f64sign | (f64exp << 52) | (fraction >> 11);
        Ok(f64::from_bits(f64bin))
    }

    fn eof(&self) -> bool {
        self.pos >= self.length
    }

    fn bytes_left(&self) -> usize {
        self.length.saturating_sub(self.pos)
    }
}
