//! # propli
//!
//! Lossless conversion between property-list, YAML, and JSON files.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! convert   → read → pass-through → write pipeline
//!   ↓
//! resource  → FileTarget (path or stdin/stdout), format inference, target derivation
//!   ↓
//! format    → Closed Format registry, Codec trait, plist/yaml/json codecs
//!   ↓
//! document  → Format-agnostic Value tree
//!   ↓
//! error     → ConvertError taxonomy
//! ```

// ============================================================================
// MODULES (dependency order: error → document → format → resource → convert)
// ============================================================================

/// Error taxonomy shared by every layer
mod error;

/// Decoded document: the format-agnostic value tree
pub mod document;

/// Codec registry: Format enum, extension inference, codecs
pub mod format;

/// Resource resolver: path/stream binding and target derivation
pub mod resource;

/// Read → write conversion pipeline
mod convert;

pub use convert::convert;
pub use document::{Dictionary, Value};
pub use error::{ConvertError, Location, Result};
pub use format::{Codec, Format, format_for_extension, format_for_name};
pub use resource::{FileTarget, FormatHint, Resource, derive_target};
