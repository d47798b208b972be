//! Raster style request model.
//!
//! This module defines the JSON shape of a raster style edit as produced by the
//! map client's style form. The form keeps every band branch around while the
//! user switches display modes, so [`BandState`] carries all of them and the
//! [`StyleType`] decides which are read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{SldError, SldResult};

/// Raster display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleType {
    /// Single band mapped through a color map
    Pseudo,
    /// Single band rendered as grayscale
    Gray,
    /// Three bands mapped to red, green and blue
    Rgb,
    /// Any other value sent by the client
    #[serde(other)]
    Unknown,
}

impl StyleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleType::Pseudo => "pseudo",
            StyleType::Gray => "gray",
            StyleType::Rgb => "rgb",
            StyleType::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for StyleType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pseudo" => StyleType::Pseudo,
            "gray" => StyleType::Gray,
            "rgb" => StyleType::Rgb,
            _ => StyleType::Unknown,
        })
    }
}

impl fmt::Display for StyleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contrast enhancement method selected for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Contrast {
    #[default]
    #[serde(rename = "none")]
    None,
    Normalize,
    Histogram,
    GammaValue,
    /// Unrecognized method; produces an empty enhancement element
    #[serde(other)]
    Other,
}

/// Untyped scalar forwarded into a vendor option.
///
/// The style form does not validate min/max inputs, so they are kept as they
/// arrive and only turned into text at the vendor option boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(b) => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl OptionValue {
    /// Coerce an optional value to vendor option text. Absent values are empty.
    pub fn coerce(value: Option<&OptionValue>) -> String {
        value.map(ToString::to_string).unwrap_or_default()
    }
}

/// Per-band settings from the style form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandConfig {
    /// Source band identifier, or `"none"`
    #[serde(default)]
    pub band: String,

    /// A missing key is not `"none"` and yields an empty enhancement
    #[serde(default = "unset_contrast")]
    pub contrast: Contrast,

    /// Normalize algorithm name, or `"none"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<OptionValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<OptionValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma_value: Option<f64>,
}

fn unset_contrast() -> Contrast {
    Contrast::Other
}

impl BandConfig {
    /// A band with no contrast enhancement.
    pub fn new(band: impl Into<String>) -> Self {
        Self {
            band: band.into(),
            ..Default::default()
        }
    }

    /// A band stretched with the given normalize algorithm and range.
    pub fn normalize(
        band: impl Into<String>,
        algorithm: impl Into<String>,
        min: impl Into<OptionValue>,
        max: impl Into<OptionValue>,
    ) -> Self {
        Self {
            band: band.into(),
            contrast: Contrast::Normalize,
            algorithm: Some(algorithm.into()),
            min: Some(min.into()),
            max: Some(max.into()),
            gamma_value: None,
        }
    }

    pub fn histogram(band: impl Into<String>) -> Self {
        Self {
            contrast: Contrast::Histogram,
            ..Self::new(band)
        }
    }

    pub fn gamma(band: impl Into<String>, gamma_value: f64) -> Self {
        Self {
            contrast: Contrast::GammaValue,
            gamma_value: Some(gamma_value),
            ..Self::new(band)
        }
    }

    pub fn with_contrast(mut self, contrast: Contrast) -> Self {
        self.contrast = contrast;
        self
    }

    /// True when the band is the `"none"` placeholder.
    pub fn is_none(&self) -> bool {
        self.band == "none"
    }

    pub fn has_contrast(&self) -> bool {
        self.contrast != Contrast::None
    }

    /// True unless the algorithm is explicitly `"none"`. A missing algorithm
    /// still emits vendor options.
    pub fn has_algorithm(&self) -> bool {
        self.algorithm.as_deref() != Some("none")
    }
}

/// One entry of a color map, forwarded verbatim into the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorMapEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ColorMapEntry {
    pub fn new(color: impl Into<String>, quantity: f64) -> Self {
        Self {
            color: Some(color.into()),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

/// Pseudocolor settings: the color map applied to a single band.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PseudoColor {
    /// Color map type (`ramp`, `intervals` or `values`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub map_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<bool>,

    #[serde(default)]
    pub color_map_entry: Vec<ColorMapEntry>,
}

/// Band form state. Only the branches selected by the style type are read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BandState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudocolor: Option<PseudoColor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudoband: Option<BandConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grayband: Option<BandConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redband: Option<BandConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greenband: Option<BandConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueband: Option<BandConfig>,
}

impl BandState {
    pub fn pseudo(pseudocolor: PseudoColor, pseudoband: BandConfig) -> Self {
        Self {
            pseudocolor: Some(pseudocolor),
            pseudoband: Some(pseudoband),
            ..Default::default()
        }
    }

    pub fn gray(grayband: BandConfig) -> Self {
        Self {
            grayband: Some(grayband),
            ..Default::default()
        }
    }

    pub fn rgb(redband: BandConfig, greenband: BandConfig, blueband: BandConfig) -> Self {
        Self {
            redband: Some(redband),
            greenband: Some(greenband),
            blueband: Some(blueband),
            ..Default::default()
        }
    }
}

/// Target layer of the style.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerRef {
    #[serde(default)]
    pub name: String,
}

impl LayerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A complete raster style edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRequest {
    pub style_type: StyleType,

    #[serde(default = "default_opacity")]
    pub opacity: f64,

    #[serde(default)]
    pub band_state: BandState,

    pub layer: LayerRef,
}

fn default_opacity() -> f64 {
    1.0
}

impl StyleRequest {
    pub fn new(
        style_type: StyleType,
        opacity: f64,
        band_state: BandState,
        layer: LayerRef,
    ) -> Self {
        Self {
            style_type,
            opacity,
            band_state,
            layer,
        }
    }

    /// Load a style request from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SldResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a style request from a JSON string.
    pub fn from_json(json: &str) -> SldResult<Self> {
        serde_json::from_str(json).map_err(SldError::from)
    }
}
