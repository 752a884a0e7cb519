#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Codec round trips, determinism, and representability errors.

use propli::{ConvertError, Format, Value};
use rstest::rstest;

use crate::helpers::fixtures::{
    SAMPLE_PLIST, SAMPLE_YAML, document_with_data, document_with_null, portable_document,
};

// ============================================================================
// Format-local round trips
// ============================================================================

#[rstest]
#[case(Format::Plist)]
#[case(Format::Yaml)]
#[case(Format::Json)]
fn test_roundtrip_portable_document(#[case] format: Format) {
    let document = portable_document();
    let bytes = format.encode_vec(&document).expect("encode should succeed");
    let decoded = format.decode_slice(&bytes).expect("decode should succeed");
    assert_eq!(decoded, document);
}

#[rstest]
#[case(Format::Yaml)]
#[case(Format::Json)]
fn test_roundtrip_with_null(#[case] format: Format) {
    let document = document_with_null();
    let bytes = format.encode_vec(&document).unwrap();
    assert_eq!(format.decode_slice(&bytes).unwrap(), document);
}

#[rstest]
#[case(Format::Plist)]
#[case(Format::Yaml)]
fn test_roundtrip_with_data(#[case] format: Format) {
    let document = document_with_data();
    let bytes = format.encode_vec(&document).unwrap();
    assert_eq!(format.decode_slice(&bytes).unwrap(), document);
}

#[rstest]
#[case(Format::Plist)]
#[case(Format::Yaml)]
#[case(Format::Json)]
fn test_roundtrip_scalar_root(#[case] format: Format) {
    let document = Value::Array(vec![Value::Integer(i64::MIN), Value::Integer(i64::MAX)]);
    let bytes = format.encode_vec(&document).unwrap();
    assert_eq!(format.decode_slice(&bytes).unwrap(), document);
}

// ============================================================================
// Determinism and stream/buffer symmetry
// ============================================================================

#[rstest]
#[case(Format::Plist)]
#[case(Format::Yaml)]
#[case(Format::Json)]
fn test_encoding_is_deterministic(#[case] format: Format) {
    let document = portable_document();
    assert_eq!(
        format.encode_vec(&document).unwrap(),
        format.encode_vec(&document).unwrap()
    );
}

#[rstest]
#[case(Format::Plist)]
#[case(Format::Yaml)]
#[case(Format::Json)]
fn test_stream_and_buffer_agree(#[case] format: Format) {
    let document = portable_document();
    let buffered = format.encode_vec(&document).unwrap();

    let mut streamed = Vec::new();
    format.encode_writer(&document, &mut streamed).unwrap();
    assert_eq!(streamed, buffered);

    assert_eq!(
        format.decode_reader(buffered.as_slice()).unwrap(),
        format.decode_slice(&buffered).unwrap()
    );
}

#[test]
fn test_plist_keys_are_sorted_regardless_of_insertion_order() {
    let forward: Value = [("a", 1i64), ("b", 2i64)].into_iter().collect();
    let reverse: Value = [("b", 2i64), ("a", 1i64)].into_iter().collect();
    assert_eq!(
        Format::Plist.encode_vec(&forward).unwrap(),
        Format::Plist.encode_vec(&reverse).unwrap()
    );
}

// ============================================================================
// Representability
// ============================================================================

#[test]
fn test_plist_rejects_null() {
    let err = Format::Plist.encode_vec(&document_with_null()).unwrap_err();
    assert!(matches!(err, ConvertError::Encode { format: "plist", .. }), "got {err:?}");
}

#[test]
fn test_json_rejects_data() {
    let err = Format::Json.encode_vec(&document_with_data()).unwrap_err();
    assert!(matches!(err, ConvertError::Encode { format: "json", .. }), "got {err:?}");
}

// ============================================================================
// Cross-format
// ============================================================================

#[test]
fn test_plist_and_yaml_samples_decode_to_the_same_document() {
    let from_plist = Format::Plist.decode_slice(SAMPLE_PLIST.as_bytes()).unwrap();
    let from_yaml = Format::Yaml.decode_slice(SAMPLE_YAML.as_bytes()).unwrap();
    assert_eq!(from_plist, from_yaml);
}

#[test]
fn test_plist_to_yaml_output() {
    let document = Format::Plist.decode_slice(SAMPLE_PLIST.as_bytes()).unwrap();
    let yaml = String::from_utf8(Format::Yaml.encode_vec(&document).unwrap()).unwrap();
    assert_eq!(yaml, SAMPLE_YAML);
}

#[rstest]
#[case(Format::Plist, "<plist version=\"1.0\"><dict><key>a</key></plist>")]
#[case(Format::Yaml, "a: [1, 2\n")]
#[case(Format::Json, "{\"a\": }")]
fn test_malformed_input_is_a_decode_error(#[case] format: Format, #[case] input: &str) {
    let err = format.decode_slice(input.as_bytes()).unwrap_err();
    assert!(matches!(err, ConvertError::Decode { .. }), "got {err:?}");
}
