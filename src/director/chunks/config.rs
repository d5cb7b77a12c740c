use binary_reader::{BinaryReader, Endian};
use log::debug;

use crate::director::utils::{human_version, FOURCC};
use crate::io::writer::BinaryWriter;
use crate::io::DecodeError;

/// The `DRCF`/`VWCF` movie configuration record. Fields are stored
/// big-endian regardless of the container's byte order. The unknown
/// numbered fields take part in the checksum and must survive a rewrite
/// untouched.
pub struct ConfigChunk {
    /*  0 */ pub len: u16,
    /*  2 */ pub file_version: u16,
    /*  4 */ pub movie_top: u16,
    /*  6 */ pub movie_left: u16,
    /*  8 */ pub movie_bottom: u16,
    /* 10 */ pub movie_right: u16,
    /* 12 */ pub min_member: u16,
    /* 14 */ pub max_member: u16,
    /* 16 */ pub field9: u8,
    /* 17 */ pub field10: u8,

    // Director 6 and below
    /* 18 */ pub pre_d7_field11: u16,
    // Director 7 and above
    /* 18 */ pub d7_stage_color_g: u8,
    /* 19 */ pub d7_stage_color_b: u8,

    /* 20 */ pub comment_font: u16,
    /* 22 */ pub comment_size: u16,
    /* 24 */ pub comment_style: u16,

    // Director 6 and below
    /* 26 */ pub pre_d7_stage_color: u16,
    // Director 7 and above
    /* 26 */ pub d7_stage_color_is_rgb: u8,
    /* 27 */ pub d7_stage_color_r: u8,

    /* 28 */ pub bit_depth: u16,
    /* 30 */ pub field17: u8,
    /* 31 */ pub field18: u8,
    /* 32 */ pub field19: u32,
    /* 36 */ pub director_version: u16,
    /* 38 */ pub field21: u16,
    /* 40 */ pub field22: u32,
    /* 44 */ pub field23: u32,
    /* 48 */ pub field24: u32,
    /* 52 */ pub field25: u8,
    /* 53 */ pub field26: u8,
    /* 54 */ pub frame_rate: u16,
    /* 56 */ pub platform: u16,
    /* 58 */ pub protection: u16,
    /* 60 */ pub field29: u32,
    /* 64 */ pub checksum: u32,
    /* 68 */ pub remnants: Vec<u8>,
}

impl ConfigChunk {
    pub fn from_reader(reader: &mut BinaryReader, dir_endian: Endian) -> Result<ConfigChunk, DecodeError> {
        reader.set_endian(Endian::Big);

        reader.jmp(36);
        let raw_version = reader.read_u16()?;
        let ver = human_version(raw_version);
        reader.jmp(0);

        let len = reader.read_u16()?;
        let file_version = reader.read_u16()?;
        let movie_top = reader.read_u16()?;
        let movie_left = reader.read_u16()?;
        let movie_bottom = reader.read_u16()?;
        let movie_right = reader.read_u16()?;
        let min_member = reader.read_u16()?;
        let max_member = reader.read_u16()?;
        let field9 = reader.read_u8()?;
        let field10 = reader.read_u8()?;
        let mut pre_d7_field11 = 0;
        let mut d7_stage_color_g = 0;
        let mut d7_stage_color_b = 0;
        if ver < 700 {
            pre_d7_field11 = reader.read_u16()?;
        } else {
            d7_stage_color_g = reader.read_u8()?;
            d7_stage_color_b = reader.read_u8()?;
        }
        let comment_font = reader.read_u16()?;
        let comment_size = reader.read_u16()?;
        let comment_style = reader.read_u16()?;
        let mut pre_d7_stage_color = 0;
        let mut d7_stage_color_is_rgb = 0;
        let mut d7_stage_color_r = 0;
        if ver < 700 {
            pre_d7_stage_color = reader.read_u16()?;
        } else {
            d7_stage_color_is_rgb = reader.read_u8()?;
            d7_stage_color_r = reader.read_u8()?;
        }
        let bit_depth = reader.read_u16()?;
        let field17 = reader.read_u8()?;
        let field18 = reader.read_u8()?;
        let field19 = reader.read_u32()?;
        reader.read_u16()?; // director_version, read above
        let field21 = reader.read_u16()?;
        let field22 = reader.read_u32()?;
        let field23 = reader.read_u32()?;
        let field24 = reader.read_u32()?;
        let field25 = reader.read_u8()?;
        let field26 = reader.read_u8()?;
        let frame_rate = reader.read_u16()?;
        let platform = reader.read_u16()?;
        let protection = reader.read_u16()?;
        let field29 = reader.read_u32()?;
        let checksum = reader.read_u32()?;
        let remnants = reader.read_bytes((len as usize).saturating_sub(reader.pos))?.to_vec();

        let config = ConfigChunk {
            len,
            file_version,
            movie_top,
            movie_left,
            movie_bottom,
            movie_right,
            min_member,
            max_member,
            field9,
            field10,
            pre_d7_field11,
            d7_stage_color_g,
            d7_stage_color_b,
            comment_font,
            comment_size,
            comment_style,
            pre_d7_stage_color,
            d7_stage_color_is_rgb,
            d7_stage_color_r,
            bit_depth,
            field17,
            field18,
            field19,
            director_version: raw_version,
            field21,
            field22,
            field23,
            field24,
            field25,
            field26,
            frame_rate,
            platform,
            protection,
            field29,
            checksum,
            remnants,
        };

        let computed = config.compute_checksum(dir_endian);
        if checksum != computed {
            debug!("config checksum mismatch: stored {checksum}, computed {computed}");
        }

        Ok(config)
    }

    pub fn human_version(&self) -> u16 {
        human_version(self.director_version)
    }

    pub fn stage_color(&self) -> (u8, u8, u8) {
        if self.human_version() < 700 {
            let idx = (self.pre_d7_stage_color & 0xFF) as u8;
            (idx, idx, idx)
        } else {
            (self.d7_stage_color_r, self.d7_stage_color_g, self.d7_stage_color_b)
        }
    }

    /// The published checksum chain over the config fields, mixed with the
    /// literal `"ralf"`. Must stay bit-exact so rewritten movies validate.
    pub fn compute_checksum(&self, dir_endian: Endian) -> u32 {
        let ver = self.human_version();

        let mut check: i64 = self.len as i64 + 1;
        check = check.wrapping_mul(self.file_version as i64 + 2);
        check = check.wrapping_div(self.movie_top as i64 + 3);
        check = check.wrapping_mul(self.movie_left as i64 + 4);
        check = check.wrapping_div(self.movie_bottom as i64 + 5);
        check = check.wrapping_mul(self.movie_right as i64 + 6);
        check = check.wrapping_sub(self.min_member as i64 + 7);
        check = check.wrapping_mul(self.max_member as i64 + 8);
        check = check.wrapping_sub(self.field9 as i64 + 9);
        check = check.wrapping_sub(self.field10 as i64 + 10);

        let operand11 = if ver < 700 {
            self.pre_d7_field11 as i64
        } else if let Endian::Little = dir_endian {
            ((self.d7_stage_color_b as i64) << 8 | self.d7_stage_color_g as i64) & 0xFFFF
        } else {
            ((self.d7_stage_color_g as i64) << 8 | self.d7_stage_color_b as i64) & 0xFFFF
        };

        check = check.wrapping_add(operand11 + 11);
        check = check.wrapping_mul(self.comment_font as i64 + 12);
        check = check.wrapping_add(self.comment_size as i64 + 13);

        let operand14 = if ver < 800 {
            (self.comment_size as i64 >> 8) & 0xFF
        } else {
            self.comment_style as i64
        };
        check = check.wrapping_mul(operand14 + 14);

        let operand15 = if ver < 700 {
            self.pre_d7_stage_color as i64
        } else {
            self.d7_stage_color_r as i64
        };
        check = check.wrapping_add(operand15 + 15);
        check = check.wrapping_add(self.bit_depth as i64 + 16);
        check = check.wrapping_add(self.field17 as i64 + 17);
        check = check.wrapping_mul(self.field18 as i64 + 18);
        check = check.wrapping_add(self.field19 as i64 + 19);
        check = check.wrapping_mul(self.director_version as i64 + 20);
        check = check.wrapping_add(self.field21 as i64 + 21);
        check = check.wrapping_add(self.field22 as i64 + 22);
        check = check.wrapping_add(self.field23 as i64 + 23);
        check = check.wrapping_add(self.field24 as i64 + 24);
        check = check.wrapping_mul(self.field25 as i64 + 25);
        check = check.wrapping_add(self.frame_rate as i64 + 26);
        check = check.wrapping_mul(self.platform as i64 + 27);
        check = check.wrapping_mul(self.protection as i64 * 0xE06);
        check = check.wrapping_add(0xFF450000u32 as i64);
        check ^= FOURCC("ralf") as i64;

        (check & 0xFFFFFFFF) as u32
    }

    /// Clears the protection markers so authoring tools reopen the movie:
    /// file version mirrors the director version, a protection word on the
    /// 23-boundary is nudged off it, and the checksum is recomputed.
    pub fn unprotect(&mut self, dir_endian: Endian) {
        self.file_version = self.director_version;
        if self.protection % 23 == 0 {
            self.protection += 1;
        }
        self.checksum = self.compute_checksum(dir_endian);
    }

    /// Serializes the record back to the exact byte layout `from_reader`
    /// consumes.
    pub fn write_body(&self) -> Vec<u8> {
        let ver = self.human_version();
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_u16(self.len);
        writer.write_u16(self.file_version);
        writer.write_u16(self.movie_top);
        writer.write_u16(self.movie_left);
        writer.write_u16(self.movie_bottom);
        writer.write_u16(self.movie_right);
        writer.write_u16(self.min_member);
        writer.write_u16(self.max_member);
        writer.write_u8(self.field9);
        writer.write_u8(self.field10);
        if ver < 700 {
            writer.write_u16(self.pre_d7_field11);
        } else {
            writer.write_u8(self.d7_stage_color_g);
            writer.write_u8(self.d7_stage_color_b);
        }
        writer.write_u16(self.comment_font);
        writer.write_u16(self.comment_size);
        writer.write_u16(self.comment_style);
        if ver < 700 {
            writer.write_u16(self.pre_d7_stage_color);
        } else {
            writer.write_u8(self.d7_stage_color_is_rgb);
            writer.write_u8(self.d7_stage_color_r);
        }
        writer.write_u16(self.bit_depth);
        writer.write_u8(self.field17);
        writer.write_u8(self.field18);
        writer.write_u32(self.field19);
        writer.write_u16(self.director_version);
        writer.write_u16(self.field21);
        writer.write_u32(self.field22);
        writer.write_u32(self.field23);
        writer.write_u32(self.field24);
        writer.write_u8(self.field25);
        writer.write_u8(self.field26);
        writer.write_u16(self.frame_rate);
        writer.write_u16(self.platform);
        writer.write_u16(self.protection);
        writer.write_u32(self.field29);
        writer.write_u32(self.checksum);
        writer.write_buf(&self.remnants);
        writer.into_bytes()
    }
}

/// Rewrites a raw config body in place: unprotects and re-serializes.
/// Running it twice yields identical bytes.
pub fn unprotect_config_body(body: &[u8], dir_endian: Endian) -> Result<Vec<u8>, DecodeError> {
    let mut reader = BinaryReader::from_u8(body);
    let mut config = ConfigChunk::from_reader(&mut reader, dir_endian)?;
    config.unprotect(dir_endian);
    Ok(config.write_body())
}
