//! Sample documents and file helpers.

use std::fs;
use std::path::{Path, PathBuf};

use propli::{Dictionary, Value};

/// A document every codec can represent: nested maps, sequences, strings,
/// integers, booleans, and reals.
pub fn portable_document() -> Value {
    let mut input = Dictionary::new();
    input.insert("NAME".to_string(), Value::from("Firefox"));
    input.insert("DOWNLOAD_ARCH".to_string(), Value::from("universal"));

    let mut step = Dictionary::new();
    step.insert("Processor".to_string(), Value::from("URLDownloader"));
    step.insert("Retries".to_string(), Value::Integer(3));
    step.insert("Verify".to_string(), Value::Boolean(true));

    let mut root = Dictionary::new();
    root.insert("Identifier".to_string(), Value::from("com.example.download.Firefox"));
    root.insert("MinimumVersion".to_string(), Value::from("2.3"));
    root.insert("Input".to_string(), Value::Dictionary(input));
    root.insert("Process".to_string(), Value::Array(vec![Value::Dictionary(step)]));
    root.insert("Weight".to_string(), Value::Real(0.75));
    root.insert("Offline".to_string(), Value::Boolean(false));
    Value::Dictionary(root)
}

/// [`portable_document`] plus a null, which plist cannot represent.
pub fn document_with_null() -> Value {
    let mut value = portable_document();
    if let Value::Dictionary(map) = &mut value {
        map.insert("Comment".to_string(), Value::Null);
    }
    value
}

/// [`portable_document`] plus a binary blob.
pub fn document_with_data() -> Value {
    let mut value = portable_document();
    if let Value::Dictionary(map) = &mut value {
        map.insert("Icon".to_string(), Value::Data(vec![0x89, b'P', b'N', b'G', 0, 0xFF]));
    }
    value
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

pub const SAMPLE_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Identifier</key>
	<string>com.example.recipe</string>
	<key>Input</key>
	<dict>
		<key>NAME</key>
		<string>Widget</string>
	</dict>
	<key>Versions</key>
	<array>
		<integer>1</integer>
		<integer>2</integer>
	</array>
</dict>
</plist>
"#;

pub const SAMPLE_YAML: &str = "Identifier: com.example.recipe\nInput:\n  NAME: Widget\nVersions:\n- 1\n- 2\n";
