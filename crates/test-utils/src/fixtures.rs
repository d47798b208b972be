//! Common test fixtures for style encoding tests.
//!
//! This module provides pre-defined style requests that represent common
//! scenarios in the raster style editor.

use sld_common::{
    BandConfig, BandState, ColorMapEntry, LayerRef, PseudoColor, StyleRequest, StyleType,
};

/// Common layer names for testing.
pub mod layers {
    /// Single band elevation model
    pub const DEM: &str = "topp:dem";

    /// Multispectral scene
    pub const SENTINEL: &str = "sentinel:l2a";

    /// Name with characters that must be escaped in XML
    pub const NEEDS_ESCAPING: &str = "ws:a<b&c";
}

/// Common normalize algorithms.
pub mod algorithms {
    pub const STRETCH_MIN_MAX: &str = "StretchToMinimumMaximum";
    pub const CLIP_MIN_MAX: &str = "ClipToMinimumMaximum";
    pub const NONE: &str = "none";
}

/// A band stretched between 0 and 255.
pub fn stretched_band(band: &str) -> BandConfig {
    BandConfig::normalize(band, algorithms::STRETCH_MIN_MAX, 0.0, 255.0)
}

/// Three-stop elevation ramp.
pub fn elevation_ramp() -> PseudoColor {
    PseudoColor {
        map_type: Some("ramp".to_string()),
        extended: Some(false),
        color_map_entry: vec![
            ColorMapEntry::new("#2B83BA", 0.0).with_label("sea level"),
            ColorMapEntry::new("#FFFFBF", 1500.0),
            ColorMapEntry::new("#D7191C", 3000.0)
                .with_label("peaks")
                .with_opacity(0.9),
        ],
    }
}

/// Gray style on `band1` with no contrast enhancement.
pub fn gray_request() -> StyleRequest {
    StyleRequest::new(
        StyleType::Gray,
        0.8,
        BandState::gray(BandConfig::new("band1")),
        LayerRef::new("layer1"),
    )
}

/// Natural color composite with a different enhancement per channel.
pub fn rgb_request() -> StyleRequest {
    StyleRequest::new(
        StyleType::Rgb,
        1.0,
        BandState::rgb(
            stretched_band("4"),
            BandConfig::histogram("3"),
            BandConfig::gamma("2", 1.4),
        ),
        LayerRef::new(layers::SENTINEL),
    )
}

/// Pseudocolor ramp, optionally routed through a gray channel.
pub fn pseudo_request(band: &str) -> StyleRequest {
    StyleRequest::new(
        StyleType::Pseudo,
        0.65,
        BandState::pseudo(elevation_ramp(), BandConfig::new(band)),
        LayerRef::new(layers::DEM),
    )
}

/// JSON form state as sent by the map client for [`gray_request`].
pub const GRAY_REQUEST_JSON: &str = r#"{
    "styleType": "gray",
    "opacity": 0.8,
    "bandState": {
        "grayband": {"band": "band1", "contrast": "none"}
    },
    "layer": {"name": "layer1"}
}"#;

/// JSON form state for an RGB composite with every branch present.
pub const RGB_REQUEST_JSON: &str = r##"{
    "styleType": "rgb",
    "opacity": 0.9,
    "bandState": {
        "pseudocolor": {"type": "ramp", "extended": false, "colorMapEntry": []},
        "pseudoband": {"band": "none", "contrast": "none"},
        "grayband": {"band": "1", "contrast": "none"},
        "redband": {"band": "4", "contrast": "Normalize", "algorithm": "StretchToMinimumMaximum", "min": 0, "max": 3000},
        "greenband": {"band": "3", "contrast": "Histogram"},
        "blueband": {"band": "2", "contrast": "GammaValue", "gammaValue": 0.8}
    },
    "layer": {"name": "sentinel:l2a"}
}"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_json_matches_shape() {
        let request = StyleRequest::from_json(RGB_REQUEST_JSON).unwrap();
        assert_eq!(request.style_type, StyleType::Rgb);
        assert_eq!(request.layer.name, layers::SENTINEL);
    }

    #[test]
    fn test_gray_json_matches_fixture() {
        let request = StyleRequest::from_json(GRAY_REQUEST_JSON).unwrap();
        assert_eq!(request, gray_request());
    }
}
