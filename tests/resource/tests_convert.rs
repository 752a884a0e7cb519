#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end conversions through files.

use std::fs;

use propli::{ConvertError, Format, Resource, convert, derive_target};
use tempfile::TempDir;

use crate::helpers::fixtures::{SAMPLE_PLIST, SAMPLE_YAML, write_file};

#[test]
fn test_convert_plist_to_derived_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source_path = write_file(temp_dir.path(), "sample.plist", SAMPLE_PLIST);
    let source = Resource::infer(source_path).unwrap();
    let target = derive_target(&source, None, None);

    convert(&source, &target).unwrap();

    let written = fs::read_to_string(temp_dir.path().join("sample.yaml")).unwrap();
    assert_eq!(written, SAMPLE_YAML);
}

#[test]
fn test_convert_yaml_back_to_plist_preserves_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let yaml_path = write_file(temp_dir.path(), "sample.yaml", SAMPLE_YAML);
    let source = Resource::infer(yaml_path).unwrap();
    let target = derive_target(&source, None, None);

    let document = convert(&source, &target).unwrap();

    assert_eq!(target.format(), Format::Plist);
    assert_eq!(target.read().unwrap(), document);
    assert_eq!(
        document,
        Format::Plist.decode_slice(SAMPLE_PLIST.as_bytes()).unwrap()
    );
}

#[test]
fn test_convert_json_to_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source_path = write_file(temp_dir.path(), "data.json", "{\"b\": [1, 2], \"a\": null}");
    let source = Resource::infer(source_path).unwrap();
    let target = Resource::infer(temp_dir.path().join("data.yml")).unwrap();

    convert(&source, &target).unwrap();

    let written = fs::read_to_string(temp_dir.path().join("data.yml")).unwrap();
    assert_eq!(written, "a: null\nb:\n- 1\n- 2\n");
}

#[test]
fn test_convert_null_into_plist_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source_path = write_file(temp_dir.path(), "data.yaml", "key: ~\n");
    let source = Resource::infer(source_path).unwrap();
    let target = derive_target(&source, None, None);

    let err = convert(&source, &target).unwrap_err();
    assert!(matches!(err, ConvertError::Encode { format: "plist", .. }), "got {err:?}");
}

#[test]
fn test_convert_missing_source_leaves_no_target() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source = Resource::infer(temp_dir.path().join("absent.plist")).unwrap();
    let target = derive_target(&source, None, None);

    let err = convert(&source, &target).unwrap_err();
    assert!(matches!(err, ConvertError::NotFound(_)));
    assert!(!target.exists());
}
