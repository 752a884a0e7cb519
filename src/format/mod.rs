//! Codec registry for the supported serialization formats.
//!
//! - **plist** - Apple property list (XML; binary is decode-only)
//! - **yaml** - YAML, safe subset
//! - **json** - JSON
//!
//! ## Architecture
//!
//! The set of formats is closed: [`Format`] is a plain enum and every
//! format-specific behavior is reached through an exhaustive `match`, so a
//! new variant cannot be added without wiring its codec.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │    Plist     │     │     Yaml     │     │     Json     │
//! └──────┬───────┘     └──────┬───────┘     └──────┬───────┘
//!        │                    │                    │
//!        ▼                    ▼                    ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Codec trait                          │
//! │  - decode_slice(&[u8]) -> Result<Value>                  │
//! │  - encode_vec(&Value) -> Result<Vec<u8>>                 │
//! │  - decode_reader / encode_writer (provided)              │
//! └──────────────────────────────────────────────────────────┘
//!        ▲
//!        │ match
//! ┌──────────────────────────────────────────────────────────┐
//! │          Format { Plist, Yaml, Json }  (REGISTRY order)   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use propli::{Format, format_for_extension};
//!
//! let format = format_for_extension("RECIPE").unwrap();
//! assert_eq!(format, Format::Plist);
//! assert_eq!(format.canonical_extension(), ".plist");
//! ```

mod json;
mod plist;
mod yaml;

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use crate::document::Value;
use crate::error::{ConvertError, Result};

pub use json::Json;
pub use plist::Plist;
pub use yaml::Yaml;

/// Behavior bundle for one serialization format.
///
/// The stream operations are the buffer operations applied to the whole
/// stream, so both paths always agree.
pub trait Codec {
    /// Decode a complete in-memory buffer.
    fn decode_slice(&self, input: &[u8]) -> Result<Value>;

    /// Encode a document into a fresh buffer.
    fn encode_vec(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode the full contents of a stream.
    fn decode_reader<R: Read>(&self, mut reader: R) -> Result<Value>
    where
        Self: Sized,
    {
        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;
        self.decode_slice(&input)
    }

    /// Encode a document and write it to a stream.
    fn encode_writer<W: Write>(&self, value: &Value, mut writer: W) -> Result<()>
    where
        Self: Sized,
    {
        let output = self.encode_vec(value)?;
        writer.write_all(&output)?;
        writer.flush()?;
        Ok(())
    }
}

/// A supported serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Plist,
    Yaml,
    Json,
}

/// All formats in registration order. Extension lookup scans this order.
pub const REGISTRY: [Format; 3] = [Format::Plist, Format::Yaml, Format::Json];

impl Format {
    /// Canonical name, as accepted by [`format_for_name`].
    pub fn name(self) -> &'static str {
        match self {
            Format::Plist => "plist",
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }

    /// Recognized extensions, lowercase with a leading dot. The first entry
    /// is the canonical extension.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Plist => &[".plist", ".recipe", ".mobileconfig"],
            Format::Yaml => &[".yaml", ".yml"],
            Format::Json => &[".json"],
        }
    }

    pub fn canonical_extension(self) -> &'static str {
        self.extensions()[0]
    }

    /// The default conversion partner: yaml goes to plist, everything else to yaml.
    pub fn opposite(self) -> Format {
        match self {
            Format::Yaml => Format::Plist,
            Format::Plist | Format::Json => Format::Yaml,
        }
    }

    pub fn decode_slice(self, input: &[u8]) -> Result<Value> {
        match self {
            Format::Plist => Plist.decode_slice(input),
            Format::Yaml => Yaml.decode_slice(input),
            Format::Json => Json.decode_slice(input),
        }
    }

    pub fn decode_reader<R: Read>(self, reader: R) -> Result<Value> {
        match self {
            Format::Plist => Plist.decode_reader(reader),
            Format::Yaml => Yaml.decode_reader(reader),
            Format::Json => Json.decode_reader(reader),
        }
    }

    pub fn encode_vec(self, value: &Value) -> Result<Vec<u8>> {
        match self {
            Format::Plist => Plist.encode_vec(value),
            Format::Yaml => Yaml.encode_vec(value),
            Format::Json => Json.encode_vec(value),
        }
    }

    pub fn encode_writer<W: Write>(self, value: &Value, writer: W) -> Result<()> {
        match self {
            Format::Plist => Plist.encode_writer(value, writer),
            Format::Yaml => Yaml.encode_writer(value, writer),
            Format::Json => Json.encode_writer(value, writer),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        format_for_name(s)
    }
}

/// Normalize an extension to lowercase with exactly one leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let bare = ext.strip_prefix('.').unwrap_or(ext);
    format!(".{}", bare.to_lowercase())
}

/// Resolve a file extension (with or without the leading dot, any case).
///
/// Formats are scanned in [`REGISTRY`] order and the first claimant wins.
pub fn format_for_extension(ext: &str) -> Result<Format> {
    let normalized = normalize_extension(ext);
    first_claimant(&REGISTRY, &normalized)
        .ok_or_else(|| ConvertError::unknown_extension(normalized))
}

fn first_claimant(formats: &[Format], normalized: &str) -> Option<Format> {
    formats
        .iter()
        .copied()
        .find(|format| format.extensions().contains(&normalized))
}

/// Resolve a canonical format name. Matching is case-sensitive.
pub fn format_for_name(name: &str) -> Result<Format> {
    REGISTRY
        .iter()
        .copied()
        .find(|format| format.name() == name)
        .ok_or_else(|| ConvertError::unknown_name(name))
}
