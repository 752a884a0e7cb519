//! Property list format support.
//!
//! Decoding accepts both plist encodings, told apart by the `bplist00`
//! magic. Encoding always produces the XML form:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
//! <plist version="1.0">
//! 	<dict>
//! 		<key>Identifier</key>
//! 		<string>com.example.recipe</string>
//! 	</dict>
//! </plist>
//! ```

mod binary;
mod xml;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::Codec;
use crate::document::Value;
use crate::error::Result;

const FORMAT: &str = "plist";

/// `<date>` text layout. Whole seconds only.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Property list format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plist;

impl Codec for Plist {
    fn decode_slice(&self, input: &[u8]) -> Result<Value> {
        if binary::is_binary(input) {
            tracing::trace!(bytes = input.len(), "decoding binary plist");
            binary::BinaryReader::new(input)?.read()
        } else {
            tracing::trace!(bytes = input.len(), "decoding XML plist");
            xml::XmlReader::new(input).read()
        }
    }

    fn encode_vec(&self, value: &Value) -> Result<Vec<u8>> {
        xml::XmlWriter::new().write(value)
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .map(|date| date.with_timezone(&Utc))
                .ok()
        })
}
