use binary_reader::Endian;

/// Seekable byte-buffer writer, symmetric with the reader. Writing past the
/// current end grows the buffer; `len()` is the high-water mark.
pub struct BinaryWriter {
    data: Vec<u8>,
    pos: usize,
    endian: Endian,
}

impl BinaryWriter {
    pub fn new(endian: Endian) -> BinaryWriter {
        BinaryWriter {
            data: Vec::new(),
            pos: 0,
            endian,
        }
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn jmp(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn write_buf(&mut self, buf: &[u8]) {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write_buf(&[v]);
    }

    pub fn write_u16(&mut self, v: u16) {
        match self.endian {
            Endian::Big => self.write_buf(&v.to_be_bytes()),
            _ => self.write_buf(&v.to_le_bytes()),
        }
    }

    pub fn write_u32(&mut self, v: u32) {
        match self.endian {
            Endian::Big => self.write_buf(&v.to_be_bytes()),
            _ => self.write_buf(&v.to_le_bytes()),
        }
    }

    pub fn write_i16(&mut self, v: i16) {
        self.write_u16(v as u16);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write_u32(v as u32);
    }

    /// FourCCs carry a logical big-endian value; a little-endian container
    /// stores the four bytes reversed.
    pub fn write_fourcc(&mut self, fourcc: u32) {
        match self.endian {
            Endian::Big => self.write_buf(&fourcc.to_be_bytes()),
            _ => self.write_buf(&fourcc.to_le_bytes()),
        }
    }
}
