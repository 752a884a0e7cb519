#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Extension and name lookup through the format registry.

use propli::format::REGISTRY;
use propli::{ConvertError, Format, format_for_extension, format_for_name};
use rstest::rstest;

// ============================================================================
// Extension lookup
// ============================================================================

#[rstest]
#[case(".plist", Format::Plist)]
#[case(".recipe", Format::Plist)]
#[case(".mobileconfig", Format::Plist)]
#[case(".yaml", Format::Yaml)]
#[case(".yml", Format::Yaml)]
#[case(".json", Format::Json)]
fn test_extension_lookup(#[case] ext: &str, #[case] expected: Format) {
    assert_eq!(format_for_extension(ext).unwrap(), expected);
    assert_eq!(format_for_extension(&ext[1..]).unwrap(), expected);
    assert_eq!(format_for_extension(&ext.to_uppercase()).unwrap(), expected);
    assert_eq!(format_for_extension(&ext[1..].to_uppercase()).unwrap(), expected);
}

#[test]
fn test_every_registered_extension_resolves_to_its_format() {
    for format in REGISTRY {
        for ext in format.extensions() {
            assert_eq!(format_for_extension(ext).unwrap(), format, "extension {ext}");
        }
    }
}

#[rstest]
#[case(".txt")]
#[case("txt")]
#[case("")]
#[case(".")]
#[case(".plist.bak")]
fn test_unregistered_extension_is_unknown(#[case] ext: &str) {
    let err = format_for_extension(ext).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownFormat(_)), "got {err:?}");
}

#[test]
fn test_extensions_are_lowercase_and_dotted() {
    for format in REGISTRY {
        for ext in format.extensions() {
            assert!(ext.starts_with('.'), "{ext} lacks a leading dot");
            assert_eq!(*ext, ext.to_lowercase());
        }
    }
}

#[test]
fn test_canonical_extension_is_first_listed() {
    assert_eq!(Format::Plist.canonical_extension(), ".plist");
    assert_eq!(Format::Yaml.canonical_extension(), ".yaml");
    assert_eq!(Format::Json.canonical_extension(), ".json");
}

// ============================================================================
// Name lookup
// ============================================================================

#[rstest]
#[case("plist", Format::Plist)]
#[case("yaml", Format::Yaml)]
#[case("json", Format::Json)]
fn test_name_lookup(#[case] name: &str, #[case] expected: Format) {
    assert_eq!(format_for_name(name).unwrap(), expected);
    assert_eq!(expected.name(), name);
}

#[rstest]
#[case("YAML")]
#[case("Plist")]
#[case("yml")]
#[case("xml")]
#[case("")]
fn test_name_lookup_is_exact(#[case] name: &str) {
    assert!(matches!(
        format_for_name(name),
        Err(ConvertError::UnknownFormat(_))
    ));
}

#[test]
fn test_registry_order() {
    assert_eq!(REGISTRY, [Format::Plist, Format::Yaml, Format::Json]);
}
