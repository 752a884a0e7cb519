//! YAML format support.
//!
//! Only the safe subset is accepted: plain scalars, sequences, mappings, and
//! the two standard tags that carry document types YAML has no plain syntax
//! for.
//!
//! ```yaml
//! Identifier: com.example.recipe
//! Input:
//!   NAME: Widget
//! Icon: !binary iVBORw0KGgo=
//! Modified: !timestamp 2023-04-05T06:07:08Z
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Number};

use super::Codec;
use crate::document::{Dictionary, Value};
use crate::error::{ConvertError, Location, Result};

const FORMAT: &str = "yaml";

const BINARY_TAG: &str = "binary";
const TIMESTAMP_TAG: &str = "timestamp";

/// YAML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl Codec for Yaml {
    fn decode_slice(&self, input: &[u8]) -> Result<Value> {
        let value: serde_yaml::Value = serde_yaml::from_slice(input).map_err(|err| {
            let message = format!("YAML parse error: {err}");
            match err.location() {
                Some(loc) => {
                    ConvertError::decode_at(FORMAT, message, Location::new(loc.line(), loc.column()))
                }
                None => ConvertError::decode(FORMAT, message),
            }
        })?;
        from_yaml(value)
    }

    fn encode_vec(&self, value: &Value) -> Result<Vec<u8>> {
        serde_yaml::to_string(&to_yaml(value))
            .map(String::into_bytes)
            .map_err(|err| ConvertError::encode(FORMAT, format!("YAML serialization error: {err}")))
    }
}

// ============================================================================
// YAML → DOCUMENT
// ============================================================================

fn from_yaml(value: serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Y;

    match value {
        Y::Null => Ok(Value::Null),
        Y::Bool(b) => Ok(Value::Boolean(b)),
        Y::Number(n) => from_number(&n),
        Y::String(s) => Ok(Value::String(s)),
        Y::Sequence(seq) => seq
            .into_iter()
            .map(from_yaml)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Y::Mapping(map) => {
            let mut dict = Dictionary::with_capacity(map.len());
            for (key, item) in map {
                dict.insert(mapping_key(key)?, from_yaml(item)?);
            }
            Ok(Value::Dictionary(dict))
        }
        Y::Tagged(tagged) => from_tagged(*tagged),
    }
}

fn from_number(n: &Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        Ok(Value::Integer(i))
    } else if n.is_u64() {
        Err(ConvertError::decode(
            FORMAT,
            format!("integer {n} does not fit in 64 bits"),
        ))
    } else {
        n.as_f64()
            .map(Value::Real)
            .ok_or_else(|| ConvertError::decode(FORMAT, format!("unsupported number {n}")))
    }
}

/// Scalar keys become strings; collection keys have no document form.
fn mapping_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value as Y;

    match key {
        Y::String(s) => Ok(s),
        Y::Bool(b) => Ok(b.to_string()),
        Y::Number(n) => Ok(n.to_string()),
        Y::Null => Ok("null".to_string()),
        other => Err(ConvertError::decode(
            FORMAT,
            format!("mapping keys must be scalars, found {}", yaml_kind(&other)),
        )),
    }
}

fn from_tagged(tagged: TaggedValue) -> Result<Value> {
    let TaggedValue { tag, value } = tagged;
    let text = match &value {
        serde_yaml::Value::String(s) => s.as_str(),
        _ => {
            return Err(ConvertError::decode(
                FORMAT,
                format!("tag {tag} must annotate a scalar string"),
            ));
        }
    };

    if is_tag(&tag, BINARY_TAG) {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        BASE64
            .decode(compact)
            .map(Value::Data)
            .map_err(|err| ConvertError::decode(FORMAT, format!("invalid !!binary payload: {err}")))
    } else if is_tag(&tag, TIMESTAMP_TAG) {
        DateTime::parse_from_rfc3339(text.trim())
            .map(|date| Value::Date(date.with_timezone(&Utc)))
            .map_err(|err| ConvertError::decode(FORMAT, format!("invalid !!timestamp '{text}': {err}")))
    } else {
        Err(ConvertError::decode(FORMAT, format!("unsupported tag {tag}")))
    }
}

/// Matches both the local form (`!binary`) and the resolved core-schema form
/// (`tag:yaml.org,2002:binary`).
fn is_tag(tag: &Tag, name: &str) -> bool {
    let rendered = tag.to_string();
    let bare = rendered.trim_start_matches('!');
    bare == name || bare.strip_suffix(name).is_some_and(|prefix| prefix.ends_with(':'))
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value as Y;

    match value {
        Y::Null => "null",
        Y::Bool(_) => "boolean",
        Y::Number(_) => "number",
        Y::String(_) => "string",
        Y::Sequence(_) => "sequence",
        Y::Mapping(_) => "mapping",
        Y::Tagged(_) => "tagged value",
    }
}

// ============================================================================
// DOCUMENT → YAML
// ============================================================================

fn to_yaml(value: &Value) -> serde_yaml::Value {
    use serde_yaml::Value as Y;

    match value {
        Value::Null => Y::Null,
        Value::Boolean(b) => Y::Bool(*b),
        Value::Integer(i) => Y::Number(Number::from(*i)),
        Value::Real(r) => Y::Number(Number::from(*r)),
        Value::String(s) => Y::String(s.clone()),
        Value::Data(bytes) => tagged(BINARY_TAG, BASE64.encode(bytes)),
        Value::Date(date) => tagged(
            TIMESTAMP_TAG,
            date.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ),
        Value::Array(items) => Y::Sequence(items.iter().map(to_yaml).collect()),
        Value::Dictionary(map) => {
            let mut mapping = Mapping::with_capacity(map.len());
            for (key, item) in map {
                mapping.insert(Y::String(key.clone()), to_yaml(item));
            }
            Y::Mapping(mapping)
        }
    }
}

fn tagged(tag: &str, text: String) -> serde_yaml::Value {
    serde_yaml::Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag),
        value: serde_yaml::Value::String(text),
    }))
}
