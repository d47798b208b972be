//! Round-trip tests: encoded documents must read back to equivalent trees.

use sld_common::{OptionValue, StyleRequest};
use sld_protocol::{parse_sld, ChannelRole, ContrastMethod, MarshalContext, SldEncoder};
use test_utils::{assert_approx_eq, fixtures, read_test_file, require_test_file};

fn roundtrip(request: &StyleRequest) {
    let encoder = SldEncoder::global();
    let document = encoder
        .document(
            request.style_type,
            request.opacity,
            &request.band_state,
            &request.layer,
        )
        .unwrap();
    let xml = encoder.encode_request(request).unwrap();

    let parsed = parse_sld(&xml).unwrap();
    assert_eq!(parsed, document, "round-trip mismatch for:\n{}", xml);
}

#[test]
fn test_roundtrip_fixtures() {
    roundtrip(&fixtures::gray_request());
    roundtrip(&fixtures::rgb_request());
    roundtrip(&fixtures::pseudo_request("1"));
    roundtrip(&fixtures::pseudo_request("none"));
}

#[test]
fn test_roundtrip_client_json() {
    roundtrip(&StyleRequest::from_json(fixtures::GRAY_REQUEST_JSON).unwrap());
    roundtrip(&StyleRequest::from_json(fixtures::RGB_REQUEST_JSON).unwrap());
}

#[test]
fn test_opacity_identity() {
    for opacity in [0.0, 0.1, 0.8, 1.0 / 3.0, 0.123456789012345, 1.0] {
        let mut request = fixtures::gray_request();
        request.opacity = opacity;
        let xml = SldEncoder::global().encode_request(&request).unwrap();
        let parsed = parse_sld(&xml).unwrap();
        let value = parsed
            .first_raster_symbolizer()
            .unwrap()
            .opacity
            .as_f64()
            .unwrap();
        assert_eq!(value, opacity);
    }
}

#[test]
fn test_vendor_options_are_string_coerced() {
    let request = StyleRequest::from_json(fixtures::RGB_REQUEST_JSON).unwrap();
    let xml = SldEncoder::global().encode_request(&request).unwrap();
    let parsed = parse_sld(&xml).unwrap();

    let red = parsed
        .first_raster_symbolizer()
        .unwrap()
        .channel_selection
        .as_ref()
        .unwrap()
        .get(ChannelRole::Red)
        .unwrap();
    let Some(ContrastMethod::Normalize(normalize)) = &red.contrast_enhancement.as_ref().unwrap().method
    else {
        panic!("red channel should be normalized");
    };

    let input = request.band_state.redband.as_ref().unwrap();
    assert_eq!(
        normalize.vendor_option("minValue"),
        Some(OptionValue::coerce(input.min.as_ref()).as_str())
    );
    assert_eq!(normalize.vendor_option("maxValue"), Some("3000"));
}

// ============================================================================
// Third-party documents
// ============================================================================

#[test]
fn test_read_geoserver_rgb_style() {
    let path = require_test_file!("geoserver_rgb.sld");
    let xml = std::fs::read_to_string(path).unwrap();
    let doc = parse_sld(&xml).unwrap();

    assert_eq!(doc.layer_names(), vec!["sentinel:l2a"]);
    let raster = doc.first_raster_symbolizer().unwrap();
    assert_approx_eq!(raster.opacity.as_f64().unwrap(), 1.0, 1e-12);

    let cs = raster.channel_selection.as_ref().unwrap();
    assert_eq!(cs.channel_count(), 3);
    let blue = cs.get(ChannelRole::Blue).unwrap();
    assert_eq!(blue.contrast_enhancement.as_ref().unwrap().gamma_value, Some(0.8));
}

#[test]
fn test_geoserver_style_remarshals_to_same_tree() {
    let Some(xml) = read_test_file("geoserver_rgb.sld") else {
        eprintln!("SKIPPED: geoserver_rgb.sld not found");
        return;
    };
    let doc = parse_sld(&xml).unwrap();

    let ctx = MarshalContext::sld_1_0_0().with_indent(Some(2));
    let remarshalled = ctx.marshaller().marshal_string(&doc).unwrap();
    assert_eq!(parse_sld(&remarshalled).unwrap(), doc);
}

#[test]
fn test_read_geoserver_color_map() {
    let path = require_test_file!("geoserver_dem.sld");
    let xml = std::fs::read_to_string(path).unwrap();
    let doc = parse_sld(&xml).unwrap();

    let color_map = doc
        .first_raster_symbolizer()
        .unwrap()
        .color_map
        .as_ref()
        .unwrap();
    assert_eq!(color_map.map_type.as_deref(), Some("intervals"));
    assert_eq!(color_map.extended, Some(true));
    assert_eq!(color_map.entries.len(), 3);
    assert_eq!(color_map.entries[2].label.as_deref(), Some("peaks & ridges"));
    assert_eq!(color_map.entries[2].opacity, Some(0.9));
}
