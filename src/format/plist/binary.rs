//! Binary property list (`bplist00`) reader.
//!
//! Layout: 8-byte magic, object table, offset table, 32-byte trailer. Every
//! multi-byte field is big-endian.

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Utc};

use super::FORMAT;
use crate::document::{Dictionary, Value};
use crate::error::{ConvertError, Result};

const MAGIC: &[u8] = b"bplist00";
const TRAILER_LEN: usize = 32;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// Deepest container nesting accepted.
const MAX_DEPTH: usize = 128;

/// Upper bound on decoded nodes once shared references are expanded.
const MAX_EXPANDED_OBJECTS: usize = 1 << 20;

pub(super) fn is_binary(input: &[u8]) -> bool {
    input.starts_with(MAGIC)
}

fn error(message: impl Into<String>) -> ConvertError {
    ConvertError::decode(FORMAT, message)
}

pub(super) struct BinaryReader<'a> {
    input: &'a [u8],
    ref_size: usize,
    top_object: u64,
    offsets: Vec<usize>,
    /// Objects on the current decode path, indexed by object number.
    visiting: Vec<bool>,
    /// Decoded containers and their node counts, reused for shared references.
    decoded: Vec<Option<(Value, usize)>>,
    depth: usize,
    expanded: usize,
    budget: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(input: &'a [u8]) -> Result<Self> {
        if input.len() < MAGIC.len() + TRAILER_LEN {
            return Err(error("binary plist is truncated"));
        }
        let trailer_start = input.len() - TRAILER_LEN;
        let trailer = &input[trailer_start..];

        let offset_size = usize::from(trailer[6]);
        let ref_size = usize::from(trailer[7]);
        let num_objects = BigEndian::read_u64(&trailer[8..16]);
        let top_object = BigEndian::read_u64(&trailer[16..24]);
        let table_offset = BigEndian::read_u64(&trailer[24..32]);

        if !(1..=8).contains(&offset_size) || !(1..=8).contains(&ref_size) {
            return Err(error("binary plist trailer has invalid integer sizes"));
        }
        if top_object >= num_objects {
            return Err(error("binary plist top object is out of range"));
        }

        let table_start = usize::try_from(table_offset)
            .map_err(|_| error("binary plist offset table is out of range"))?;
        let table_len = usize::try_from(num_objects)
            .ok()
            .and_then(|n| n.checked_mul(offset_size))
            .ok_or_else(|| error("binary plist object count is out of range"))?;
        let table_end = table_start
            .checked_add(table_len)
            .filter(|&end| table_start >= MAGIC.len() && end <= trailer_start)
            .ok_or_else(|| error("binary plist offset table is out of range"))?;

        let offsets = input[table_start..table_end]
            .chunks(offset_size)
            .map(|chunk| {
                let offset = BigEndian::read_uint(chunk, offset_size);
                usize::try_from(offset)
                    .ok()
                    .filter(|&o| o >= MAGIC.len() && o < table_start)
                    .ok_or_else(|| error(format!("binary plist object offset {offset} is out of range")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            input,
            ref_size,
            top_object,
            visiting: vec![false; offsets.len()],
            decoded: vec![None; offsets.len()],
            offsets,
            depth: 0,
            expanded: 0,
            budget: MAX_EXPANDED_OBJECTS,
        })
    }

    pub fn read(mut self) -> Result<Value> {
        self.read_object(self.top_object)
    }

    fn read_object(&mut self, index: u64) -> Result<Value> {
        let slot = usize::try_from(index)
            .ok()
            .filter(|&i| i < self.offsets.len())
            .ok_or_else(|| error(format!("object reference {index} is out of range")))?;

        if let Some(count) = self.decoded[slot].as_ref().map(|(_, count)| *count) {
            self.charge(count)?;
        }
        if let Some((value, _)) = &self.decoded[slot] {
            return Ok(value.clone());
        }
        if self.visiting[slot] {
            return Err(error(format!("object {index} references itself")));
        }
        if self.depth >= MAX_DEPTH {
            return Err(error(format!("nesting exceeds {MAX_DEPTH} levels")));
        }

        let before = self.expanded;
        self.visiting[slot] = true;
        self.depth += 1;
        let result = self.parse_object(self.offsets[slot]);
        self.depth -= 1;
        self.visiting[slot] = false;

        let value = result?;
        self.charge(1)?;
        if matches!(value, Value::Array(_) | Value::Dictionary(_)) {
            self.decoded[slot] = Some((value.clone(), self.expanded - before));
        }
        Ok(value)
    }

    fn charge(&mut self, count: usize) -> Result<()> {
        self.expanded = self.expanded.saturating_add(count);
        if self.expanded > self.budget {
            return Err(error(format!(
                "binary plist expands to more than {} objects",
                self.budget
            )));
        }
        Ok(())
    }

    fn bytes(&self, start: usize, len: usize) -> Result<&'a [u8]> {
        start
            .checked_add(len)
            .and_then(|end| self.input.get(start..end))
            .ok_or_else(|| error(format!("object at offset {start} runs past the end of the input")))
    }

    fn parse_object(&mut self, offset: usize) -> Result<Value> {
        let marker = self.bytes(offset, 1)?[0];
        let info = marker & 0x0F;
        match marker >> 4 {
            0x0 => match info {
                0x0 => Ok(Value::Null),
                0x8 => Ok(Value::Boolean(false)),
                0x9 => Ok(Value::Boolean(true)),
                _ => Err(error(format!("unsupported singleton marker 0x{marker:02X}"))),
            },
            0x1 => {
                let size = 1usize << info;
                let raw = self.bytes(offset + 1, size)?;
                read_integer(raw).map(Value::Integer)
            }
            0x2 => {
                let size = 1usize << info;
                let raw = self.bytes(offset + 1, size)?;
                match size {
                    4 => Ok(Value::Real(f64::from(BigEndian::read_f32(raw)))),
                    8 => Ok(Value::Real(BigEndian::read_f64(raw))),
                    _ => Err(error(format!("unsupported real width {size}"))),
                }
            }
            0x3 if info == 0x3 => {
                let raw = self.bytes(offset + 1, 8)?;
                apple_date(BigEndian::read_f64(raw)).map(Value::Date)
            }
            0x4 => {
                let (len, start) = self.length(info, offset)?;
                Ok(Value::Data(self.bytes(start, len)?.to_vec()))
            }
            0x5 => {
                let (len, start) = self.length(info, offset)?;
                let raw = self.bytes(start, len)?;
                std::str::from_utf8(raw)
                    .map(|s| Value::String(s.to_string()))
                    .map_err(|err| error(format!("invalid ASCII string: {err}")))
            }
            0x6 => {
                let (len, start) = self.length(info, offset)?;
                let byte_len = len
                    .checked_mul(2)
                    .ok_or_else(|| error("UTF-16 string length overflows"))?;
                let raw = self.bytes(start, byte_len)?;
                let units: Vec<u16> = raw.chunks(2).map(BigEndian::read_u16).collect();
                String::from_utf16(&units)
                    .map(Value::String)
                    .map_err(|err| error(format!("invalid UTF-16 string: {err}")))
            }
            0x8 => Err(error("UID objects have no document representation")),
            0xA => {
                let (len, start) = self.length(info, offset)?;
                let refs = self.refs(start, len)?;
                refs.into_iter()
                    .map(|r| self.read_object(r))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            0xC => Err(error("set objects have no document representation")),
            0xD => {
                let (len, start) = self.length(info, offset)?;
                let keys = self.refs(start, len)?;
                let values = self.refs(start + len * self.ref_size, len)?;
                let mut dict = Dictionary::new();
                for (key_ref, value_ref) in keys.into_iter().zip(values) {
                    let key = match self.read_object(key_ref)? {
                        Value::String(s) => s,
                        other => {
                            return Err(error(format!(
                                "dictionary key must be a string, found {}",
                                other.kind()
                            )));
                        }
                    };
                    let value = self.read_object(value_ref)?;
                    dict.insert(key, value);
                }
                Ok(Value::Dictionary(dict))
            }
            _ => Err(error(format!("unknown object marker 0x{marker:02X}"))),
        }
    }

    /// Element count and payload start for variable-length objects.
    fn length(&self, info: u8, offset: usize) -> Result<(usize, usize)> {
        if info != 0x0F {
            return Ok((usize::from(info), offset + 1));
        }
        let int_marker = self.bytes(offset + 1, 1)?[0];
        if int_marker >> 4 != 0x1 {
            return Err(error(format!("expected length integer at offset {}", offset + 1)));
        }
        let size = 1usize << (int_marker & 0x0F);
        let raw = self.bytes(offset + 2, size)?;
        let len = read_integer(raw)?;
        let len = usize::try_from(len).map_err(|_| error(format!("invalid length {len}")))?;
        Ok((len, offset + 2 + size))
    }

    fn refs(&self, start: usize, count: usize) -> Result<Vec<u64>> {
        let total = count
            .checked_mul(self.ref_size)
            .ok_or_else(|| error("object reference list overflows"))?;
        let raw = self.bytes(start, total)?;
        Ok(raw
            .chunks(self.ref_size)
            .map(|chunk| BigEndian::read_uint(chunk, self.ref_size))
            .collect())
    }
}

/// 1, 2 and 4 byte integers are unsigned; 8 and 16 byte integers are signed.
fn read_integer(raw: &[u8]) -> Result<i64> {
    match raw.len() {
        1 | 2 | 4 => Ok(BigEndian::read_uint(raw, raw.len()) as i64),
        8 => Ok(BigEndian::read_i64(raw)),
        16 => {
            let wide = BigEndian::read_i128(raw);
            i64::try_from(wide).map_err(|_| error(format!("integer {wide} does not fit in 64 bits")))
        }
        width => Err(error(format!("unsupported integer width {width}"))),
    }
}

fn apple_date(seconds: f64) -> Result<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(error("date is not a finite number of seconds"));
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    APPLE_EPOCH_OFFSET
        .checked_add(whole as i64)
        .and_then(|secs| DateTime::from_timestamp(secs, nanos))
        .ok_or_else(|| error(format!("date {seconds} is out of range")))
}
