// ---------------------------------------------------------------------------
// data_serializer – big-endian primitive reader/writer and container framing
// ---------------------------------------------------------------------------
//
// Container format:
//   [0..4]  serializer version (u32, big-endian)
//   [4..]   container payload
//
// Unique strings are a u16 byte length followed by UTF-8 bytes; a length of
// 0xFFFF encodes "no string".

use crate::save_error::SaveError;

const NO_STRING: u16 = u16::MAX;

/// Append-only big-endian writer.
#[derive(Debug, Default, Clone)]
pub struct DataWriter {
    bytes: Vec<u8>,
}

impl DataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Writes the low 24 bits of `value`.
    pub fn write_u24(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes()[1..]);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// Strings longer than 0xFFFE bytes are truncated at a char boundary.
    pub fn write_unique_string(&mut self, value: Option<&str>) {
        match value {
            None => self.write_u16(NO_STRING),
            Some(s) => {
                let mut end = s.len().min(NO_STRING as usize - 1);
                while !s.is_char_boundary(end) {
                    end -= 1;
                }
                self.write_u16(end as u16);
                self.write_bytes(&s.as_bytes()[..end]);
            }
        }
    }
}

/// Bounds-checked big-endian cursor over a borrowed blob.
#[derive(Debug, Clone)]
pub struct DataReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DataReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], SaveError> {
        if n > self.remaining() {
            return Err(SaveError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SaveError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, SaveError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SaveError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u24(&mut self) -> Result<u32, SaveError> {
        let [a, b, c] = self.read_array::<3>()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn read_u32(&mut self) -> Result<u32, SaveError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, SaveError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, SaveError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, SaveError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Invalid UTF-8 is replaced rather than rejected; names are only used
    /// for prefab lookup.
    pub fn read_unique_string(&mut self) -> Result<Option<String>, SaveError> {
        let len = self.read_u16()?;
        if len == NO_STRING {
            return Ok(None);
        }
        let bytes = self.read_bytes(len as usize)?;
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }
}

/// Frames a container payload with its serializer version.
pub fn serialize_container(version: u32, write: impl FnOnce(&mut DataWriter)) -> Vec<u8> {
    let mut writer = DataWriter::new();
    writer.write_u32(version);
    write(&mut writer);
    writer.into_bytes()
}

/// Splits a framed container into its serializer version and payload reader.
pub fn open_container(blob: &[u8]) -> Result<(u32, DataReader<'_>), SaveError> {
    let mut reader = DataReader::new(blob);
    let version = reader.read_u32()?;
    Ok((version, reader))
}
