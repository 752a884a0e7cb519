//! XML property list reader and writer.

use std::fmt::Display;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{FORMAT, format_date, parse_date};
use crate::document::{Dictionary, Value};
use crate::error::{ConvertError, Location, Result};

/// Deepest `<dict>`/`<array>` nesting accepted.
const MAX_DEPTH: usize = 128;

const DOCTYPE: &str = r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

// ============================================================================
// XML PLIST READER
// ============================================================================

/// Pull-parser over an XML plist.
pub(super) struct XmlReader<'a> {
    input: &'a [u8],
    reader: Reader<&'a [u8]>,
    depth: usize,
}

impl<'a> XmlReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            reader: Reader::from_reader(input),
            depth: 0,
        }
    }

    pub fn read(mut self) -> Result<Value> {
        match self.next_event()? {
            Event::Start(e) if e.name().as_ref() == b"plist" => {}
            Event::Eof => return Err(self.error("empty document")),
            _ => return Err(self.error("expected <plist> root element")),
        }

        let first = self.next_event()?;
        let value = self.parse_value(first)?;

        match self.next_event()? {
            Event::End(e) if e.name().as_ref() == b"plist" => {}
            _ => return Err(self.error("expected </plist> after the root value")),
        }
        match self.next_event()? {
            Event::Eof => Ok(value),
            _ => Err(self.error("unexpected content after </plist>")),
        }
    }

    fn error(&self, message: impl Into<String>) -> ConvertError {
        let offset = self.reader.buffer_position() as usize;
        ConvertError::decode_at(FORMAT, message, Location::from_offset(self.input, offset))
    }

    fn raw_event(&mut self) -> Result<Event<'a>> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(err) => {
                let offset = self.reader.error_position() as usize;
                Err(ConvertError::decode_at(
                    FORMAT,
                    format!("XML parse error: {err}"),
                    Location::from_offset(self.input, offset),
                ))
            }
        }
    }

    /// Next structural event: skips prolog, comments, and inter-element whitespace.
    fn next_event(&mut self) -> Result<Event<'a>> {
        loop {
            match self.raw_event()? {
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
                Event::Text(e) if e.iter().all(u8::is_ascii_whitespace) => {}
                event => return Ok(event),
            }
        }
    }

    fn parse_value(&mut self, event: Event<'a>) -> Result<Value> {
        match event {
            Event::Start(e) => {
                let tag = tag_name(&e);
                match tag.as_str() {
                    "dict" => self.nested(Self::parse_dict),
                    "array" => self.nested(Self::parse_array),
                    "string" => self.read_text("string").map(Value::String),
                    "integer" => {
                        let text = self.read_text("integer")?;
                        self.parse_integer(text.trim())
                    }
                    "real" => {
                        let text = self.read_text("real")?;
                        text.trim()
                            .parse::<f64>()
                            .map(Value::Real)
                            .map_err(|_| self.error(format!("invalid real '{}'", text.trim())))
                    }
                    "date" => {
                        let text = self.read_text("date")?;
                        parse_date(text.trim())
                            .map(Value::Date)
                            .ok_or_else(|| self.error(format!("invalid date '{}'", text.trim())))
                    }
                    "data" => {
                        let text = self.read_text("data")?;
                        let compact: String =
                            text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                        BASE64
                            .decode(compact)
                            .map(Value::Data)
                            .map_err(|err| self.error(format!("invalid base64 data: {err}")))
                    }
                    "true" | "false" => {
                        self.read_text(&tag)?;
                        Ok(Value::Boolean(tag == "true"))
                    }
                    other => Err(self.error(format!("unexpected element <{other}>"))),
                }
            }
            Event::Empty(e) => match tag_name(&e).as_str() {
                "dict" => Ok(Value::Dictionary(Dictionary::new())),
                "array" => Ok(Value::Array(Vec::new())),
                "string" => Ok(Value::String(String::new())),
                "data" => Ok(Value::Data(Vec::new())),
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                other => Err(self.error(format!("unexpected empty element <{other}/>"))),
            },
            Event::End(_) => Err(self.error("expected a value, found a closing tag")),
            Event::Eof => Err(self.error("unexpected end of document")),
            _ => Err(self.error("expected a value element")),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Result<Value>) -> Result<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting exceeds {MAX_DEPTH} levels")));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_dict(&mut self) -> Result<Value> {
        let mut dict = Dictionary::new();
        loop {
            let key = match self.next_event()? {
                Event::End(e) if e.name().as_ref() == b"dict" => {
                    return Ok(Value::Dictionary(dict));
                }
                Event::Start(e) if e.name().as_ref() == b"key" => self.read_text("key")?,
                Event::Empty(e) if e.name().as_ref() == b"key" => String::new(),
                _ => return Err(self.error("expected <key> or </dict>")),
            };
            let event = self.next_event()?;
            let value = self.parse_value(event)?;
            dict.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            match self.next_event()? {
                Event::End(e) if e.name().as_ref() == b"array" => {
                    return Ok(Value::Array(items));
                }
                event => items.push(self.parse_value(event)?),
            }
        }
    }

    fn parse_integer(&self, text: &str) -> Result<Value> {
        let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16),
            None => text.parse::<i64>(),
        };
        parsed
            .map(Value::Integer)
            .map_err(|err| self.error(format!("invalid integer '{text}': {err}")))
    }

    /// Collect character data up to the matching end tag.
    fn read_text(&mut self, tag: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.raw_event()? {
                Event::Text(e) => {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| self.error(format!("invalid character data: {err}")))?;
                    text.push_str(&unescaped);
                }
                Event::CData(e) => {
                    let raw = std::str::from_utf8(&e)
                        .map_err(|err| self.error(format!("invalid UTF-8 in CDATA: {err}")))?;
                    text.push_str(raw);
                }
                Event::Comment(_) => {}
                Event::End(e) if e.name().as_ref() == tag.as_bytes() => return Ok(text),
                _ => return Err(self.error(format!("expected text content inside <{tag}>"))),
            }
        }
    }
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

// ============================================================================
// XML PLIST WRITER
// ============================================================================

/// Writes a document as a tab-indented XML plist with sorted keys.
pub(super) struct XmlWriter;

impl XmlWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, value: &Value) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        writer
            .write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))
            .map_err(write_error)?;

        let mut plist = BytesStart::new("plist");
        plist.push_attribute(("version", "1.0"));
        writer.write_event(Event::Start(plist)).map_err(write_error)?;

        self.write_value(&mut writer, value)?;

        writer
            .write_event(Event::End(BytesEnd::new("plist")))
            .map_err(write_error)?;

        let mut output = writer.into_inner();
        output.push(b'\n');
        Ok(output)
    }

    fn write_value(&self, writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<()> {
        match value {
            Value::Null => Err(ConvertError::encode(
                FORMAT,
                "null has no property list representation",
            )),
            Value::Boolean(b) => {
                let tag = if *b { "true" } else { "false" };
                writer
                    .write_event(Event::Empty(BytesStart::new(tag)))
                    .map_err(write_error)
            }
            Value::Integer(i) => write_text_element(writer, "integer", &i.to_string()),
            Value::Real(r) => write_text_element(writer, "real", &format_real(*r)),
            Value::String(s) => {
                check_xml_text(s)?;
                write_text_element(writer, "string", s)
            }
            Value::Data(bytes) => write_text_element(writer, "data", &BASE64.encode(bytes)),
            Value::Date(date) => write_text_element(writer, "date", &format_date(date)),
            Value::Array(items) => {
                if items.is_empty() {
                    return writer
                        .write_event(Event::Empty(BytesStart::new("array")))
                        .map_err(write_error);
                }
                writer
                    .write_event(Event::Start(BytesStart::new("array")))
                    .map_err(write_error)?;
                for item in items {
                    self.write_value(writer, item)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new("array")))
                    .map_err(write_error)
            }
            Value::Dictionary(map) => {
                if map.is_empty() {
                    return writer
                        .write_event(Event::Empty(BytesStart::new("dict")))
                        .map_err(write_error);
                }
                writer
                    .write_event(Event::Start(BytesStart::new("dict")))
                    .map_err(write_error)?;
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (key, item) in entries {
                    check_xml_text(key)?;
                    write_text_element(writer, "key", key)?;
                    self.write_value(writer, item)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new("dict")))
                    .map_err(write_error)
            }
        }
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(write_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(write_error)
}

/// XML 1.0 cannot carry most C0 control characters, even escaped.
fn check_xml_text(text: &str) -> Result<()> {
    match text
        .chars()
        .find(|c| (*c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r'))
    {
        Some(c) => Err(ConvertError::encode(
            FORMAT,
            format!("strings cannot contain control character U+{:04X}", c as u32),
        )),
        None => Ok(()),
    }
}

fn format_real(r: f64) -> String {
    if r.is_nan() {
        "nan".to_string()
    } else if r.is_infinite() {
        if r > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{r:?}")
    }
}

fn write_error(err: impl Display) -> ConvertError {
    ConvertError::encode(FORMAT, format!("write error: {err}"))
}
