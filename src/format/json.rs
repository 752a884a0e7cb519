//! JSON format support.
//!
//! Output is pretty-printed with two-space indentation and sorted keys.

use serde_json::{Map, Number};

use super::Codec;
use crate::document::{Dictionary, Value};
use crate::error::{ConvertError, Location, Result};

const FORMAT: &str = "json";

/// JSON format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Codec for Json {
    fn decode_slice(&self, input: &[u8]) -> Result<Value> {
        let value: serde_json::Value = serde_json::from_slice(input).map_err(|err| {
            ConvertError::decode_at(
                FORMAT,
                format!("JSON parse error: {err}"),
                Location::new(err.line(), err.column()),
            )
        })?;
        from_json(value)
    }

    fn encode_vec(&self, value: &Value) -> Result<Vec<u8>> {
        let json = to_json(value)?;
        let mut output = serde_json::to_vec_pretty(&json)
            .map_err(|err| ConvertError::encode(FORMAT, format!("JSON serialization error: {err}")))?;
        output.push(b'\n');
        Ok(output)
    }
}

fn from_json(value: serde_json::Value) -> Result<Value> {
    use serde_json::Value as J;

    match value {
        J::Null => Ok(Value::Null),
        J::Bool(b) => Ok(Value::Boolean(b)),
        J::Number(n) => {
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
        J::String(s) => Ok(Value::String(s)),
        J::Array(items) => items
            .into_iter()
            .map(from_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        J::Object(map) => {
            let mut dict = Dictionary::with_capacity(map.len());
            for (key, item) in map {
                dict.insert(key, from_json(item)?);
            }
            Ok(Value::Dictionary(dict))
        }
    }
}

fn to_json(value: &Value) -> Result<serde_json::Value> {
    use serde_json::Value as J;

    Ok(match value {
        Value::Null => J::Null,
        Value::Boolean(b) => J::Bool(*b),
        Value::Integer(i) => J::Number(Number::from(*i)),
        Value::Real(r) => J::Number(Number::from_f64(*r).ok_or_else(|| {
            ConvertError::encode(FORMAT, format!("{r} has no JSON representation"))
        })?),
        Value::String(s) => J::String(s.clone()),
        Value::Data(_) | Value::Date(_) => {
            return Err(ConvertError::encode(
                FORMAT,
                format!("{} values have no JSON representation", value.kind()),
            ));
        }
        Value::Array(items) => J::Array(items.iter().map(to_json).collect::<Result<Vec<_>>>()?),
        Value::Dictionary(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut object = Map::new();
            for (key, item) in entries {
                object.insert(key.clone(), to_json(item)?);
            }
            J::Object(object)
        }
    })
}
