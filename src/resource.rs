//! Resource resolution: binding a file target to a format.
//!
//! A [`Resource`] is a [`FileTarget`] plus the [`Format`] used to read or
//! write it. The format is fixed at construction with this precedence:
//!
//! ```text
//! explicit hint  →  Format used as-is, or name looked up (InvalidFormat on miss)
//! standard stream →  DEFAULT_STREAM_FORMAT (yaml)
//! file path       →  final extension looked up (UnknownFormat on miss)
//! ```

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::document::Value;
use crate::error::{ConvertError, Result};
use crate::format::{Format, format_for_extension, format_for_name, normalize_extension};

/// Format assumed for stdin/stdout when no hint is given.
pub const DEFAULT_STREAM_FORMAT: Format = Format::Yaml;

/// Where a resource lives: a filesystem path or the process's standard streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTarget {
    Path(PathBuf),
    /// Standard input for reads, standard output for writes.
    Standard,
}

impl FileTarget {
    /// Command-line spelling of [`FileTarget::Standard`].
    pub const SENTINEL: &'static str = "-";

    pub fn path(&self) -> Option<&Path> {
        match self {
            FileTarget::Path(path) => Some(path),
            FileTarget::Standard => None,
        }
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, FileTarget::Standard)
    }
}

impl From<PathBuf> for FileTarget {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str() == Self::SENTINEL {
            FileTarget::Standard
        } else {
            FileTarget::Path(path)
        }
    }
}

impl From<&Path> for FileTarget {
    fn from(path: &Path) -> Self {
        path.to_path_buf().into()
    }
}

impl From<&str> for FileTarget {
    fn from(path: &str) -> Self {
        PathBuf::from(path).into()
    }
}

impl From<String> for FileTarget {
    fn from(path: String) -> Self {
        PathBuf::from(path).into()
    }
}

impl fmt::Display for FileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTarget::Path(path) => write!(f, "{}", path.display()),
            FileTarget::Standard => f.write_str(Self::SENTINEL),
        }
    }
}

/// An explicit format choice supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatHint {
    Format(Format),
    /// Canonical format name, resolved case-sensitively.
    Name(String),
}

impl FormatHint {
    /// Resolve to a registered format, failing with `InvalidFormat`.
    pub fn resolve(self) -> Result<Format> {
        match self {
            FormatHint::Format(format) => Ok(format),
            FormatHint::Name(name) => format_for_name(&name)
                .map_err(|_| ConvertError::InvalidFormat(format!("'{name}' is not a known format"))),
        }
    }
}

impl From<Format> for FormatHint {
    fn from(format: Format) -> Self {
        FormatHint::Format(format)
    }
}

impl From<&str> for FormatHint {
    fn from(name: &str) -> Self {
        FormatHint::Name(name.to_string())
    }
}

impl From<String> for FormatHint {
    fn from(name: String) -> Self {
        FormatHint::Name(name)
    }
}

/// A file target bound to the format used to read and write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    target: FileTarget,
    format: Format,
}

impl Resource {
    /// Bind `target` to a format, using `hint` when given.
    pub fn new(target: impl Into<FileTarget>, hint: Option<FormatHint>) -> Result<Self> {
        let target = target.into();
        let format = match hint {
            Some(hint) => hint.resolve()?,
            None => match &target {
                FileTarget::Standard => DEFAULT_STREAM_FORMAT,
                FileTarget::Path(path) => format_for_path(path)?,
            },
        };
        tracing::debug!(%target, %format, "resolved resource format");
        Ok(Self { target, format })
    }

    /// Bind `target` by inference alone.
    pub fn infer(target: impl Into<FileTarget>) -> Result<Self> {
        Self::new(target, None)
    }

    /// Bind `target` to a known format. Never fails.
    pub fn with_format(target: impl Into<FileTarget>, format: Format) -> Self {
        Self {
            target: target.into(),
            format,
        }
    }

    pub fn target(&self) -> &FileTarget {
        &self.target
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Whether the path exists on disk. Always `false` for standard streams,
    /// which are treated as always writable.
    pub fn exists(&self) -> bool {
        match &self.target {
            FileTarget::Path(path) => path.exists(),
            FileTarget::Standard => false,
        }
    }

    /// Read and decode the resource, using the process's stdin for the
    /// standard stream.
    pub fn read(&self) -> Result<Value> {
        match &self.target {
            FileTarget::Standard => self.read_stream(io::stdin().lock()),
            FileTarget::Path(path) => self.read_path(path),
        }
    }

    /// Read and decode the resource, using `stdin` for the standard stream.
    pub fn read_from<R: Read>(&self, stdin: R) -> Result<Value> {
        match &self.target {
            FileTarget::Standard => self.read_stream(stdin),
            FileTarget::Path(path) => self.read_path(path),
        }
    }

    fn read_stream<R: Read>(&self, mut stdin: R) -> Result<Value> {
        let mut input = Vec::new();
        stdin.read_to_end(&mut input)?;
        tracing::trace!(bytes = input.len(), format = %self.format, "read standard input");
        self.format.decode_slice(&input)
    }

    fn read_path(&self, path: &Path) -> Result<Value> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConvertError::NotFound(path.to_path_buf()),
            _ => ConvertError::Io(err),
        })?;
        tracing::trace!(path = %path.display(), format = %self.format, "reading file");
        self.format.decode_reader(BufReader::new(file))
    }

    /// Encode and write `document`, using the process's stdout for the
    /// standard stream.
    pub fn write(&self, document: &Value) -> Result<()> {
        match &self.target {
            FileTarget::Standard => self.write_stream(document, io::stdout().lock()),
            FileTarget::Path(path) => self.write_path(document, path),
        }
    }

    /// Encode and write `document`, using `stdout` for the standard stream.
    ///
    /// Files are created or truncated before encoding starts; an encode
    /// failure can leave a partially written file behind.
    pub fn write_to<W: Write>(&self, document: &Value, stdout: W) -> Result<()> {
        match &self.target {
            FileTarget::Standard => self.write_stream(document, stdout),
            FileTarget::Path(path) => self.write_path(document, path),
        }
    }

    fn write_stream<W: Write>(&self, document: &Value, mut stdout: W) -> Result<()> {
        let encoded = self.format.encode_vec(document)?;
        let mut text = String::from_utf8(encoded).map_err(|_| {
            ConvertError::encode(
                self.format.name(),
                "encoded output is not text and cannot be written to standard output",
            )
        })?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        tracing::trace!(bytes = text.len(), format = %self.format, "wrote standard output");
        Ok(())
    }

    fn write_path(&self, document: &Value, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        tracing::trace!(path = %path.display(), format = %self.format, "writing file");
        self.format.encode_writer(document, BufWriter::new(file))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target, self.format)
    }
}

fn format_for_path(path: &Path) -> Result<Format> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            ConvertError::UnknownFormat(format!(
                "cannot infer a format for '{}' without a file extension",
                path.display()
            ))
        })?;
    format_for_extension(ext)
}

/// Derive the default conversion target for `source`.
///
/// The target format is `format` if given, else the format claiming
/// `extension`, else the opposite of the source format. The target path swaps
/// the source's canonical extension for the new one, or appends the new one
/// when the source uses a secondary extension (`file.recipe` →
/// `file.recipe.yaml`). Standard-stream sources derive a standard-stream
/// target. The filesystem is never consulted.
pub fn derive_target(source: &Resource, format: Option<Format>, extension: Option<&str>) -> Resource {
    let extension = extension.filter(|ext| !ext.is_empty());
    let target_format = match (format, extension) {
        (Some(format), _) => format,
        (None, Some(ext)) => format_for_extension(ext).unwrap_or_else(|_| {
            tracing::debug!(ext, "extension names no format, using the opposite of the source");
            source.format.opposite()
        }),
        (None, None) => source.format.opposite(),
    };

    let target = match &source.target {
        FileTarget::Standard => FileTarget::Standard,
        FileTarget::Path(path) => {
            let new_ext = match extension {
                Some(ext) if ext.starts_with('.') => ext.to_string(),
                Some(ext) => format!(".{ext}"),
                None => target_format.canonical_extension().to_string(),
            };
            FileTarget::Path(swap_extension(path, source.format, &new_ext))
        }
    };

    tracing::debug!(%target, format = %target_format, "derived conversion target");
    Resource::with_format(target, target_format)
}

fn swap_extension(path: &Path, source_format: Format, new_ext: &str) -> PathBuf {
    let current = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(normalize_extension);
    let mut stem: OsString = if current.as_deref() == Some(source_format.canonical_extension()) {
        path.with_extension("").into_os_string()
    } else {
        path.as_os_str().to_owned()
    };
    stem.push(new_ext);
    PathBuf::from(stem)
}
