//! One-shot conversion pipeline.

use crate::document::Value;
use crate::error::Result;
use crate::resource::Resource;

/// Read `source`, pass the document through unchanged, and write `target`.
///
/// Returns the converted document. Does not check whether `target` already
/// exists; callers that must not overwrite should consult
/// [`Resource::exists`] first.
pub fn convert(source: &Resource, target: &Resource) -> Result<Value> {
    let document = source.read()?;
    tracing::debug!(%source, %target, kind = document.kind(), "converting");
    target.write(&document)?;
    Ok(document)
}
