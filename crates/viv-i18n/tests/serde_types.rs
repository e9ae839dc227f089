#![cfg(feature = "serde")]

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use viv_i18n::{CoverageReport, I18nConfig, LanguageTag, Location, TranslationStatus, load};

#[test]
fn config_fills_missing_fields_with_defaults() {
    let config: I18nConfig =
        serde_json::from_str(r#"{"use_system_language": false, "language_code": "cs_CZ"}"#)
            .unwrap();
    assert!(!config.use_system_language);
    assert_eq!(config.language_code, "cs_CZ");
    assert_eq!(config.file_prefixes, I18nConfig::default().file_prefixes);
    assert!(config.validate().is_ok());
}

#[test]
fn language_tag_is_a_plain_string() {
    let tag: LanguageTag = serde_json::from_str(r#""cs-CZ""#).unwrap();
    assert_eq!(serde_json::to_string(&tag).unwrap(), r#""cs_CZ""#);
    assert!(serde_json::from_str::<LanguageTag>(r#""C""#).is_err());
}

#[test]
fn status_uses_marker_names() {
    assert_eq!(
        serde_json::to_string(&TranslationStatus::Vanished).unwrap(),
        r#""vanished""#
    );
    let location: Location =
        serde_json::from_str(r#"{"file": "MainWindow.ui", "line": 48}"#).unwrap();
    assert_eq!(location, Location::new("MainWindow.ui", 48));
}

#[test]
fn coverage_report_serializes() {
    let path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/VookiImageViewer_cs.ts");
    let report = load(path).unwrap().coverage();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["language"], "cs");
    assert_eq!(json["unfinished"], 1);
    assert_eq!(json["contexts"].as_array().unwrap().len(), 4);

    let back: CoverageReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
}
