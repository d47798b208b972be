//! Raster style request to SLD encoding.
//!
//! The `convert_*` functions each build one piece of the schema tree from the
//! client's band settings. [`SldEncoder`] assembles them into a document and
//! marshals it with its context.

use tracing::{debug, warn};

use sld_common::{
    BandConfig, BandState, ColorMapEntry, Contrast, LayerRef, OptionValue, SldError, SldResult,
    StyleRequest, StyleType,
};

use crate::context::MarshalContext;
use crate::schema::{
    ChannelRole, ChannelSelection, ColorMap, ColorMapEntryNode, ContrastEnhancement,
    ContrastMethod, FeatureTypeStyle, NamedLayer, Normalize, ParameterValue, RasterSymbolizer,
    Rule, SchemaNode, SelectedChannel, StyledLayerDescriptor, Symbolizer, UserStyle,
    VendorOption,
};

/// Wrap a raw opacity into a parameter value.
pub fn convert_opacity(opacity: f64) -> ParameterValue {
    ParameterValue::Number(opacity)
}

/// Wrap a band identifier into a selected channel.
pub fn convert_channel(band: &str) -> SelectedChannel {
    SelectedChannel {
        source_channel_name: band.to_string(),
        contrast_enhancement: None,
    }
}

fn convert_vendor_option(name: &str, value: Option<&OptionValue>) -> VendorOption {
    VendorOption {
        name: name.to_string(),
        value: OptionValue::coerce(value),
    }
}

fn convert_algorithm(band: &BandConfig) -> Vec<VendorOption> {
    let algorithm = band.algorithm.clone().map(OptionValue::Text);
    vec![
        convert_vendor_option("algorithm", algorithm.as_ref()),
        convert_vendor_option("minValue", band.min.as_ref()),
        convert_vendor_option("maxValue", band.max.as_ref()),
    ]
}

/// Build the contrast enhancement for a band.
///
/// `Normalize` carries the `algorithm`, `minValue` and `maxValue` vendor
/// options unless the algorithm is `"none"`. `none` and unrecognized methods
/// yield an empty node.
pub fn convert_contrast_enhancement(band: &BandConfig) -> ContrastEnhancement {
    match band.contrast {
        Contrast::Normalize => {
            let mut normalize = Normalize::default();
            if band.has_algorithm() {
                normalize.vendor_options = convert_algorithm(band);
            }
            ContrastEnhancement {
                method: Some(ContrastMethod::Normalize(normalize)),
                gamma_value: None,
            }
        }
        Contrast::Histogram => ContrastEnhancement {
            method: Some(ContrastMethod::Histogram),
            gamma_value: None,
        },
        Contrast::GammaValue => ContrastEnhancement {
            method: None,
            gamma_value: band.gamma_value,
        },
        Contrast::None | Contrast::Other => ContrastEnhancement::default(),
    }
}

/// Route one band to `role`, with its contrast enhancement unless it is `none`.
pub fn convert_single_channel(band: &BandConfig, role: ChannelRole) -> ChannelSelection {
    let mut channel = convert_channel(&band.band);
    if band.has_contrast() {
        channel.contrast_enhancement = Some(convert_contrast_enhancement(band));
    }

    let mut selection = ChannelSelection::default();
    selection.set(role, channel);
    selection
}

/// Route three bands to the red, green and blue channels.
pub fn convert_rgb_channels(
    red: &BandConfig,
    green: &BandConfig,
    blue: &BandConfig,
) -> ChannelSelection {
    convert_single_channel(red, ChannelRole::Red)
        .merge(convert_single_channel(green, ChannelRole::Green))
        .merge(convert_single_channel(blue, ChannelRole::Blue))
}

/// Build a color map, tagging each entry without altering it.
pub fn convert_color_map(
    map_type: Option<&str>,
    extended: Option<bool>,
    entries: &[ColorMapEntry],
) -> ColorMap {
    ColorMap {
        map_type: map_type.map(str::to_string),
        extended,
        entries: entries.iter().cloned().map(ColorMapEntryNode::from).collect(),
    }
}

/// Wrap a symbolizer into the fixed layer/style/feature-type-style/rule nesting.
pub fn build_document(layer: &LayerRef, raster: RasterSymbolizer) -> StyledLayerDescriptor {
    StyledLayerDescriptor {
        version: StyledLayerDescriptor::VERSION.to_string(),
        named_layers: vec![NamedLayer {
            name: layer.name.clone(),
            user_styles: vec![UserStyle {
                feature_type_styles: vec![FeatureTypeStyle {
                    rules: vec![Rule {
                        symbolizers: vec![Symbolizer::Raster(raster)],
                    }],
                }],
            }],
        }],
    }
}

fn require_band<'a>(
    band: &'a Option<BandConfig>,
    style_type: StyleType,
    key: &str,
) -> SldResult<&'a BandConfig> {
    band.as_ref().ok_or_else(|| {
        SldError::schema(
            RasterSymbolizer::TYPE_NAME,
            format!("{} style requires bandState.{}", style_type, key),
        )
    })
}

/// Build the raster symbolizer for a style type.
///
/// Opacity is always set. Unknown style types produce an opacity-only
/// symbolizer.
pub fn build_raster_symbolizer(
    style_type: StyleType,
    opacity: f64,
    band_state: &BandState,
) -> SldResult<RasterSymbolizer> {
    let mut raster = RasterSymbolizer::new(convert_opacity(opacity));

    match style_type {
        StyleType::Pseudo => {
            let pseudocolor = band_state.pseudocolor.as_ref().ok_or_else(|| {
                SldError::schema(
                    RasterSymbolizer::TYPE_NAME,
                    "pseudo style requires bandState.pseudocolor",
                )
            })?;
            raster.color_map = Some(convert_color_map(
                pseudocolor.map_type.as_deref(),
                pseudocolor.extended,
                &pseudocolor.color_map_entry,
            ));

            if let Some(ref pseudoband) = band_state.pseudoband {
                if !pseudoband.is_none() {
                    raster.channel_selection =
                        Some(convert_single_channel(pseudoband, ChannelRole::Gray));
                }
            }
        }
        StyleType::Gray => {
            let gray = require_band(&band_state.grayband, style_type, "grayband")?;
            raster.channel_selection = Some(convert_single_channel(gray, ChannelRole::Gray));
        }
        StyleType::Rgb => {
            let red = require_band(&band_state.redband, style_type, "redband")?;
            let green = require_band(&band_state.greenband, style_type, "greenband")?;
            let blue = require_band(&band_state.blueband, style_type, "blueband")?;
            raster.channel_selection = Some(convert_rgb_channels(red, green, blue));
        }
        StyleType::Unknown => {
            warn!("Unrecognized raster style type, emitting opacity only");
        }
    }

    Ok(raster)
}

/// Encodes raster style requests into SLD documents.
#[derive(Debug, Clone, Copy)]
pub struct SldEncoder<'ctx> {
    ctx: &'ctx MarshalContext,
}

impl SldEncoder<'static> {
    /// Encoder bound to the process-wide context.
    pub fn global() -> Self {
        Self::new(MarshalContext::global())
    }
}

impl<'ctx> SldEncoder<'ctx> {
    pub fn new(ctx: &'ctx MarshalContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &'ctx MarshalContext {
        self.ctx
    }

    /// Build the document tree without serializing it.
    pub fn document(
        &self,
        style_type: StyleType,
        opacity: f64,
        band_state: &BandState,
        layer: &LayerRef,
    ) -> SldResult<StyledLayerDescriptor> {
        let raster = build_raster_symbolizer(style_type, opacity, band_state)?;
        Ok(build_document(layer, raster))
    }

    /// Encode a style to SLD XML text.
    pub fn encode(
        &self,
        style_type: StyleType,
        opacity: f64,
        band_state: &BandState,
        layer: &LayerRef,
    ) -> SldResult<String> {
        debug!(
            layer = %layer.name,
            style_type = %style_type,
            opacity,
            "Encoding raster style"
        );
        let document = self.document(style_type, opacity, band_state, layer)?;
        self.ctx.marshaller().marshal_string(&document)
    }

    pub fn encode_request(&self, request: &StyleRequest) -> SldResult<String> {
        self.encode(
            request.style_type,
            request.opacity,
            &request.band_state,
            &request.layer,
        )
    }
}

/// Encode a style with the process-wide context.
pub fn json_to_sld(
    style_type: StyleType,
    opacity: f64,
    band_state: &BandState,
    layer: &LayerRef,
) -> SldResult<String> {
    SldEncoder::global().encode(style_type, opacity, band_state, layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_opacity() {
        assert_eq!(convert_opacity(0.8), ParameterValue::Number(0.8));
    }

    #[test]
    fn test_normalize_with_algorithm() {
        let band = BandConfig::normalize("1", "StretchToMinimumMaximum", 10.0, "250");
        let ce = convert_contrast_enhancement(&band);

        let Some(ContrastMethod::Normalize(normalize)) = &ce.method else {
            panic!("expected Normalize");
        };
        let names: Vec<_> = normalize.vendor_options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["algorithm", "minValue", "maxValue"]);
        assert_eq!(normalize.vendor_option("algorithm"), Some("StretchToMinimumMaximum"));
        assert_eq!(normalize.vendor_option("minValue"), Some("10"));
        assert_eq!(normalize.vendor_option("maxValue"), Some("250"));
    }

    #[test]
    fn test_normalize_without_algorithm() {
        let band = BandConfig::normalize("1", "none", 0.0, 1.0);
        let ce = convert_contrast_enhancement(&band);
        assert_eq!(
            ce.method,
            Some(ContrastMethod::Normalize(Normalize::default()))
        );
    }

    #[test]
    fn test_histogram_and_gamma() {
        let ce = convert_contrast_enhancement(&BandConfig::histogram("1"));
        assert_eq!(ce.method, Some(ContrastMethod::Histogram));
        assert_eq!(ce.gamma_value, None);

        let ce = convert_contrast_enhancement(&BandConfig::gamma("1", 0.7));
        assert_eq!(ce.method, None);
        assert_eq!(ce.gamma_value, Some(0.7));
    }

    #[test]
    fn test_other_contrast_is_empty() {
        let band = BandConfig::new("1").with_contrast(Contrast::Other);
        assert!(convert_contrast_enhancement(&band).is_empty());

        let cs = convert_single_channel(&band, ChannelRole::Gray);
        let channel = cs.get(ChannelRole::Gray).unwrap();
        assert_eq!(channel.contrast_enhancement, Some(ContrastEnhancement::default()));
    }

    #[test]
    fn test_single_channel_without_contrast() {
        let cs = convert_single_channel(&BandConfig::new("band1"), ChannelRole::Gray);
        assert_eq!(cs.channel_count(), 1);
        let channel = cs.get(ChannelRole::Gray).unwrap();
        assert_eq!(channel.source_channel_name, "band1");
        assert!(channel.contrast_enhancement.is_none());
    }

    #[test]
    fn test_rgb_channels_keep_their_own_contrast() {
        let cs = convert_rgb_channels(
            &BandConfig::histogram("1"),
            &BandConfig::gamma("2", 1.2),
            &BandConfig::new("3"),
        );
        assert_eq!(cs.channel_count(), 3);
        assert!(cs.gray_channel.is_none());
        assert_eq!(
            cs.red_channel.unwrap().contrast_enhancement.unwrap().method,
            Some(ContrastMethod::Histogram)
        );
        assert_eq!(
            cs.green_channel.unwrap().contrast_enhancement.unwrap().gamma_value,
            Some(1.2)
        );
        assert!(cs.blue_channel.unwrap().contrast_enhancement.is_none());
    }

    #[test]
    fn test_color_map_entries_forwarded() {
        let entries = vec![
            ColorMapEntry::new("#000000", 0.0).with_label("low"),
            ColorMapEntry::new("#FFFFFF", 100.0).with_opacity(0.5),
        ];
        let map = convert_color_map(Some("intervals"), Some(true), &entries);
        assert_eq!(map.map_type.as_deref(), Some("intervals"));
        assert_eq!(map.extended, Some(true));
        assert_eq!(map.entries.len(), 2);
        assert_eq!(map.entries[0].0, entries[0]);
        assert_eq!(map.entries[1].0, entries[1]);
    }

    #[test]
    fn test_build_document_nesting() {
        let doc = build_document(
            &LayerRef::new("layer1"),
            RasterSymbolizer::new(convert_opacity(1.0)),
        );
        assert_eq!(doc.version, "1.0.0");
        assert_eq!(doc.named_layers.len(), 1);
        let layer = &doc.named_layers[0];
        assert_eq!(layer.user_styles.len(), 1);
        assert_eq!(layer.user_styles[0].feature_type_styles.len(), 1);
        assert_eq!(layer.user_styles[0].feature_type_styles[0].rules.len(), 1);
        assert_eq!(doc.raster_symbolizers().count(), 1);
    }

    #[test]
    fn test_missing_branch_is_schema_violation() {
        let err = build_raster_symbolizer(StyleType::Gray, 1.0, &BandState::default()).unwrap_err();
        assert!(matches!(err, SldError::SchemaViolation { .. }));
        assert!(err.to_string().contains("grayband"));
    }

    #[test]
    fn test_unknown_style_type_is_opacity_only() {
        let state = BandState::gray(BandConfig::new("1"));
        let raster = build_raster_symbolizer(StyleType::Unknown, 0.4, &state).unwrap();
        assert_eq!(raster.opacity, ParameterValue::Number(0.4));
        assert!(raster.channel_selection.is_none());
        assert!(raster.color_map.is_none());
    }
}
