// ---------------------------------------------------------------------------
// encoded_array – run-length coded value columns
// ---------------------------------------------------------------------------
//
// Column format:
//   u32 value count
//   one PackBits stream per byte plane, most significant plane first
//
// PackBits control byte `c`:
//   c < 128   literal run, the next c + 1 bytes are copied
//   c >= 128  repeat run, the next byte is repeated c - 125 times (3..=130)
//
// Splitting values into planes lets the mostly-constant high bytes of flags
// and positions collapse into long repeat runs.

use crate::data_serializer::{DataReader, DataWriter};
use crate::save_error::SaveError;

const MAX_LITERAL: usize = 128;
const MIN_REPEAT: usize = 3;
const MAX_REPEAT: usize = 130;
const REPEAT_BIAS: usize = 125;

/// A fixed-width value that can be stored in an encoded column.
pub trait ColumnValue: Copy + Default {
    const WIDTH: usize;

    /// Byte `plane` of the big-endian representation.
    fn plane_byte(self, plane: usize) -> u8;

    /// Rebuilds a value from its big-endian bytes.
    fn from_be_slice(bytes: &[u8]) -> Self;
}

impl ColumnValue for u16 {
    const WIDTH: usize = 2;

    fn plane_byte(self, plane: usize) -> u8 {
        self.to_be_bytes()[plane]
    }

    fn from_be_slice(bytes: &[u8]) -> Self {
        u16::from_be_bytes([bytes[0], bytes[1]])
    }
}

impl ColumnValue for i16 {
    const WIDTH: usize = 2;

    fn plane_byte(self, plane: usize) -> u8 {
        self.to_be_bytes()[plane]
    }

    fn from_be_slice(bytes: &[u8]) -> Self {
        i16::from_be_bytes([bytes[0], bytes[1]])
    }
}

impl ColumnValue for f32 {
    const WIDTH: usize = 4;

    fn plane_byte(self, plane: usize) -> u8 {
        self.to_bits().to_be_bytes()[plane]
    }

    fn from_be_slice(bytes: &[u8]) -> Self {
        f32::from_bits(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

pub fn write_column<T: ColumnValue>(writer: &mut DataWriter, values: &[T]) {
    writer.write_u32(values.len() as u32);
    let mut plane = Vec::with_capacity(values.len());
    for p in 0..T::WIDTH {
        plane.clear();
        plane.extend(values.iter().map(|v| v.plane_byte(p)));
        pack_bits(&plane, writer);
    }
}

pub fn read_column<T: ColumnValue>(reader: &mut DataReader<'_>) -> Result<Vec<T>, SaveError> {
    let count = reader.read_u32()? as usize;
    let mut planes = Vec::with_capacity(T::WIDTH);
    for _ in 0..T::WIDTH {
        planes.push(unpack_bits(reader, count)?);
    }

    let mut values = Vec::with_capacity(count);
    let mut scratch = vec![0u8; T::WIDTH];
    for i in 0..count {
        for (p, plane) in planes.iter().enumerate() {
            scratch[p] = plane[i];
        }
        values.push(T::from_be_slice(&scratch));
    }
    Ok(values)
}

fn flush_literal(chunk: &[u8], writer: &mut DataWriter) {
    if chunk.is_empty() {
        return;
    }
    writer.write_u8((chunk.len() - 1) as u8);
    writer.write_bytes(chunk);
}

fn repeat_len(data: &[u8], start: usize) -> usize {
    let byte = data[start];
    data[start..]
        .iter()
        .take(MAX_REPEAT)
        .take_while(|&&b| b == byte)
        .count()
}

fn pack_bits(data: &[u8], writer: &mut DataWriter) {
    let mut i = 0;
    let mut literal_start = 0;
    while i < data.len() {
        let run = repeat_len(data, i);
        if run >= MIN_REPEAT {
            flush_literal(&data[literal_start..i], writer);
            writer.write_u8((run + REPEAT_BIAS) as u8);
            writer.write_u8(data[i]);
            i += run;
            literal_start = i;
        } else {
            i += 1;
            if i - literal_start == MAX_LITERAL {
                flush_literal(&data[literal_start..i], writer);
                literal_start = i;
            }
        }
    }
    flush_literal(&data[literal_start..], writer);
}

fn unpack_bits(reader: &mut DataReader<'_>, count: usize) -> Result<Vec<u8>, SaveError> {
    // The declared count is untrusted; never reserve more than the remaining
    // input could expand to.
    let mut out = Vec::with_capacity(count.min(reader.remaining().saturating_mul(MAX_REPEAT)));
    while out.len() < count {
        let control = reader.read_u8()? as usize;
        if control < MAX_LITERAL {
            out.extend_from_slice(reader.read_bytes(control + 1)?);
        } else {
            let byte = reader.read_u8()?;
            out.resize(out.len() + control - REPEAT_BIAS, byte);
        }
    }
    if out.len() != count {
        return Err(SaveError::size(
            "encoded column",
            format!("run overflows column: decoded {} of {count}", out.len()),
        ));
    }
    Ok(out)
}

/// Sequential access to a decoded column, failing once it is exhausted.
#[derive(Debug, Clone)]
pub struct ColumnReader<T> {
    values: Vec<T>,
    pos: usize,
    container: &'static str,
}

impl<T: ColumnValue> ColumnReader<T> {
    pub fn begin(reader: &mut DataReader<'_>, container: &'static str) -> Result<Self, SaveError> {
        Ok(Self {
            values: read_column(reader)?,
            pos: 0,
            container,
        })
    }

    pub fn read(&mut self) -> Result<T, SaveError> {
        let value = self.values.get(self.pos).copied().ok_or_else(|| {
            SaveError::size(
                self.container,
                format!("column holds only {} values", self.values.len()),
            )
        })?;
        self.pos += 1;
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn consumed(&self) -> usize {
        self.pos
    }
}
