//! Tests for parsing style requests from client form state.

use std::io::Write;

use sld_common::{Contrast, OptionValue, SldError, StyleRequest, StyleType};

// ============================================================================
// Form state parsing
// ============================================================================

#[test]
fn test_parse_gray_request() {
    let json = r#"{
        "styleType": "gray",
        "opacity": 0.8,
        "bandState": {
            "grayband": {"band": "band1", "contrast": "none"}
        },
        "layer": {"name": "layer1"}
    }"#;

    let request = StyleRequest::from_json(json).unwrap();
    assert_eq!(request.style_type, StyleType::Gray);
    assert_eq!(request.opacity, 0.8);
    assert_eq!(request.layer.name, "layer1");

    let gray = request.band_state.grayband.unwrap();
    assert_eq!(gray.band, "band1");
    assert_eq!(gray.contrast, Contrast::None);
    assert!(!gray.has_contrast());
}

#[test]
fn test_parse_full_form_state_keeps_every_branch() {
    let json = r##"{
        "styleType": "rgb",
        "opacity": 1,
        "bandState": {
            "pseudocolor": {
                "type": "ramp",
                "extended": false,
                "colorMapEntry": [
                    {"color": "#000000", "quantity": 0, "label": "low"},
                    {"color": "#FFFFFF", "quantity": 255, "opacity": 0.5}
                ]
            },
            "pseudoband": {"band": "none", "contrast": "none"},
            "grayband": {"band": "1", "contrast": "Histogram"},
            "redband": {"band": "1", "contrast": "Normalize", "algorithm": "StretchToMinimumMaximum", "min": 10, "max": "250"},
            "greenband": {"band": "2", "contrast": "GammaValue", "gammaValue": 1.5},
            "blueband": {"band": "3", "contrast": "none"}
        },
        "layer": {"name": "sentinel:tci"}
    }"##;

    let request = StyleRequest::from_json(json).unwrap();
    assert_eq!(request.style_type, StyleType::Rgb);

    let pseudocolor = request.band_state.pseudocolor.as_ref().unwrap();
    assert_eq!(pseudocolor.map_type.as_deref(), Some("ramp"));
    assert_eq!(pseudocolor.extended, Some(false));
    assert_eq!(pseudocolor.color_map_entry.len(), 2);
    assert_eq!(pseudocolor.color_map_entry[0].label.as_deref(), Some("low"));
    assert_eq!(pseudocolor.color_map_entry[1].opacity, Some(0.5));

    let red = request.band_state.redband.as_ref().unwrap();
    assert_eq!(red.contrast, Contrast::Normalize);
    assert_eq!(red.min, Some(OptionValue::Number(10.0)));
    assert_eq!(red.max, Some(OptionValue::Text("250".to_string())));

    let green = request.band_state.greenband.as_ref().unwrap();
    assert_eq!(green.contrast, Contrast::GammaValue);
    assert_eq!(green.gamma_value, Some(1.5));

    assert!(request.band_state.pseudoband.as_ref().unwrap().is_none());
}

#[test]
fn test_unknown_style_type_degrades() {
    let json = r#"{"styleType": "hillshade", "opacity": 0.3, "layer": {"name": "dem"}}"#;
    let request = StyleRequest::from_json(json).unwrap();
    assert_eq!(request.style_type, StyleType::Unknown);
    assert_eq!(request.band_state, Default::default());
}

#[test]
fn test_unknown_contrast_method() {
    let json = r#"{
        "styleType": "gray",
        "bandState": {"grayband": {"band": "1", "contrast": "Sigmoid"}},
        "layer": {"name": "dem"}
    }"#;
    let request = StyleRequest::from_json(json).unwrap();
    let gray = request.band_state.grayband.unwrap();
    assert_eq!(gray.contrast, Contrast::Other);
    assert!(gray.has_contrast());
}

#[test]
fn test_opacity_defaults_to_one() {
    let json = r#"{"styleType": "gray", "layer": {"name": "dem"}}"#;
    let request = StyleRequest::from_json(json).unwrap();
    assert_eq!(request.opacity, 1.0);
}

// ============================================================================
// Error cases
// ============================================================================

#[test]
fn test_missing_layer_is_parse_error() {
    let json = r#"{"styleType": "gray", "opacity": 1}"#;
    let err = StyleRequest::from_json(json).unwrap_err();
    assert!(matches!(err, SldError::ParseError(_)));
    assert_eq!(err.http_status_code(), 400);
}

#[test]
fn test_malformed_json() {
    assert!(StyleRequest::from_json("{not json").is_err());
}

// ============================================================================
// File loading
// ============================================================================

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"styleType": "pseudo", "opacity": 0.5, "layer": {{"name": "ndvi"}}}}"#
    )
    .unwrap();

    let request = StyleRequest::from_file(file.path()).unwrap();
    assert_eq!(request.style_type, StyleType::Pseudo);
    assert_eq!(request.layer.name, "ndvi");
}

#[test]
fn test_from_missing_file() {
    let err = StyleRequest::from_file("/nonexistent/style.json").unwrap_err();
    assert!(matches!(err, SldError::IoError(_)));
}
