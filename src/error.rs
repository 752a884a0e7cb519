//! Error types for conversion operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// 1-based line and column of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Compute the line/column of a byte offset into `input`.
    pub fn from_offset(input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let consumed = &input[..offset];
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = consumed
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        Self {
            line,
            column: offset - line_start + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors that can occur while resolving, reading, or writing a resource.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Extension or name does not map to any registered format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// An explicit format hint could not be resolved.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Read attempted on a path that does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Content failed to parse under the resolved format.
    #[error("{format} decode error{}: {message}", at_location(.location))]
    Decode {
        format: &'static str,
        message: String,
        location: Option<Location>,
    },

    /// Document holds a value the target format cannot represent.
    #[error("{format} encode error: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn at_location(location: &Option<Location>) -> String {
    location.map(|loc| format!(" at {loc}")).unwrap_or_default()
}

impl ConvertError {
    /// Create a decode error without position information.
    pub fn decode(format: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            format,
            message: message.into(),
            location: None,
        }
    }

    /// Create a decode error pointing at a line/column.
    pub fn decode_at(format: &'static str, message: impl Into<String>, location: Location) -> Self {
        Self::Decode {
            format,
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create an encode error.
    pub fn encode(format: &'static str, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }

    /// Create an unknown-format error for an extension.
    pub fn unknown_extension(ext: impl Into<String>) -> Self {
        Self::UnknownFormat(format!("unrecognized file extension '{}'", ext.into()))
    }

    /// Create an unknown-format error for a name.
    pub fn unknown_name(name: impl Into<String>) -> Self {
        Self::UnknownFormat(format!("no format named '{}'", name.into()))
    }
}
