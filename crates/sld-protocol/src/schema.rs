//! SLD 1.0.0 schema tree for raster styles.
//!
//! Each schema type the encoder produces is an explicit Rust type. The
//! [`SchemaNode::TYPE_NAME`] constant carries the qualified schema type name,
//! which the marshaller reports when a node breaks the schema.

use serde::Serialize;

use sld_common::ColorMapEntry;

/// A node of the SLD schema tree.
pub trait SchemaNode {
    /// Qualified schema type name, e.g. `SLD_1_0_0.RasterSymbolizer`.
    const TYPE_NAME: &'static str;
}

macro_rules! schema_node {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl SchemaNode for $ty {
                const TYPE_NAME: &'static str = $name;
            }
        )+
    };
}

schema_node! {
    StyledLayerDescriptor => "SLD_1_0_0.StyledLayerDescriptor",
    NamedLayer => "SLD_1_0_0.NamedLayer",
    UserStyle => "SLD_1_0_0.UserStyle",
    FeatureTypeStyle => "SLD_1_0_0.FeatureTypeStyle",
    Rule => "SLD_1_0_0.Rule",
    RasterSymbolizer => "SLD_1_0_0.RasterSymbolizer",
    ParameterValue => "SLD_1_0_0.ParameterValueType",
    ChannelSelection => "SLD_1_0_0.ChannelSelection",
    SelectedChannel => "SLD_1_0_0.SelectedChannelType",
    ContrastEnhancement => "SLD_1_0_0.ContrastEnhancement",
    Normalize => "SLD_1_0_0.Normalize",
    VendorOption => "SLD_1_0_0.VendorOption",
    ColorMap => "SLD_1_0_0.ColorMap",
    ColorMapEntryNode => "SLD_1_0_0.ColorMapEntry",
}

/// Document root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledLayerDescriptor {
    pub version: String,
    pub named_layers: Vec<NamedLayer>,
}

impl StyledLayerDescriptor {
    pub const VERSION: &'static str = "1.0.0";

    /// All raster symbolizers in document order.
    pub fn raster_symbolizers(&self) -> impl Iterator<Item = &RasterSymbolizer> {
        self.named_layers
            .iter()
            .flat_map(|layer| layer.user_styles.iter())
            .flat_map(|style| style.feature_type_styles.iter())
            .flat_map(|fts| fts.rules.iter())
            .flat_map(|rule| rule.symbolizers.iter())
            .map(|symbolizer| match symbolizer {
                Symbolizer::Raster(raster) => raster,
            })
    }

    pub fn first_raster_symbolizer(&self) -> Option<&RasterSymbolizer> {
        self.raster_symbolizers().next()
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.named_layers.iter().map(|l| l.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedLayer {
    pub name: String,
    pub user_styles: Vec<UserStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStyle {
    pub feature_type_styles: Vec<FeatureTypeStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureTypeStyle {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Rule {
    pub symbolizers: Vec<Symbolizer>,
}

/// Symbolizers a rule can hold. Only raster styling is produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Symbolizer {
    Raster(RasterSymbolizer),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterSymbolizer {
    pub opacity: ParameterValue,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_selection: Option<ChannelSelection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_map: Option<ColorMap>,
}

impl RasterSymbolizer {
    pub fn new(opacity: ParameterValue) -> Self {
        Self {
            opacity,
            channel_selection: None,
            color_map: None,
        }
    }
}

/// Content of a parameter-valued element such as `Opacity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Literal(String),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Literal(s) => s.trim().parse().ok(),
        }
    }
}

/// Display channel a band is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    Gray,
    Red,
    Green,
    Blue,
}

impl ChannelRole {
    /// Local XML element name of the role.
    pub fn element(&self) -> &'static str {
        match self {
            ChannelRole::Gray => "GrayChannel",
            ChannelRole::Red => "RedChannel",
            ChannelRole::Green => "GreenChannel",
            ChannelRole::Blue => "BlueChannel",
        }
    }

    pub fn from_element(local_name: &str) -> Option<Self> {
        match local_name {
            "GrayChannel" => Some(ChannelRole::Gray),
            "RedChannel" => Some(ChannelRole::Red),
            "GreenChannel" => Some(ChannelRole::Green),
            "BlueChannel" => Some(ChannelRole::Blue),
            _ => None,
        }
    }
}

/// Band to display channel routing.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red_channel: Option<SelectedChannel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_channel: Option<SelectedChannel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue_channel: Option<SelectedChannel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gray_channel: Option<SelectedChannel>,
}

impl ChannelSelection {
    pub fn get(&self, role: ChannelRole) -> Option<&SelectedChannel> {
        self.slot(role).as_ref()
    }

    pub fn set(&mut self, role: ChannelRole, channel: SelectedChannel) {
        *self.slot_mut(role) = Some(channel);
    }

    /// Shallow key union. Roles set in `other` replace those in `self`.
    pub fn merge(mut self, other: ChannelSelection) -> Self {
        for role in [
            ChannelRole::Red,
            ChannelRole::Green,
            ChannelRole::Blue,
            ChannelRole::Gray,
        ] {
            if let Some(channel) = other.slot(role).clone() {
                self.set(role, channel);
            }
        }
        self
    }

    /// Populated roles in schema order.
    pub fn channels(&self) -> Vec<(ChannelRole, &SelectedChannel)> {
        [
            ChannelRole::Red,
            ChannelRole::Green,
            ChannelRole::Blue,
            ChannelRole::Gray,
        ]
        .into_iter()
        .filter_map(|role| self.get(role).map(|c| (role, c)))
        .collect()
    }

    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    fn slot(&self, role: ChannelRole) -> &Option<SelectedChannel> {
        match role {
            ChannelRole::Gray => &self.gray_channel,
            ChannelRole::Red => &self.red_channel,
            ChannelRole::Green => &self.green_channel,
            ChannelRole::Blue => &self.blue_channel,
        }
    }

    fn slot_mut(&mut self, role: ChannelRole) -> &mut Option<SelectedChannel> {
        match role {
            ChannelRole::Gray => &mut self.gray_channel,
            ChannelRole::Red => &mut self.red_channel,
            ChannelRole::Green => &mut self.green_channel,
            ChannelRole::Blue => &mut self.blue_channel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedChannel {
    pub source_channel_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_enhancement: Option<ContrastEnhancement>,
}

/// Contrast enhancement. An empty node (no method, no gamma) is valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastEnhancement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ContrastMethod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma_value: Option<f64>,
}

impl ContrastEnhancement {
    pub fn is_empty(&self) -> bool {
        self.method.is_none() && self.gamma_value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContrastMethod {
    Normalize(Normalize),
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalize {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vendor_options: Vec<VendorOption>,
}

impl Normalize {
    pub fn vendor_option(&self, name: &str) -> Option<&str> {
        self.vendor_options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }
}

/// GeoServer vendor option: a named string hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorMap {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub map_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended: Option<bool>,

    pub entries: Vec<ColorMapEntryNode>,
}

/// A color map entry tagged with its schema type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ColorMapEntryNode(pub ColorMapEntry);

impl From<ColorMapEntry> for ColorMapEntryNode {
    fn from(entry: ColorMapEntry) -> Self {
        ColorMapEntryNode(entry)
    }
}

impl std::ops::Deref for ColorMapEntryNode {
    type Target = ColorMapEntry;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
