//! OGC Styled Layer Descriptor (SLD) 1.0.0 protocol implementation.
//!
//! Supports:
//! - Encoding raster style requests into SLD documents (pseudocolor, gray, RGB)
//! - GeoServer `VendorOption` extensions on `Normalize`
//! - Parsing raster SLD documents back into the schema tree

pub mod context;
pub mod encoder;
pub mod exceptions;
pub mod marshal;
pub mod reader;
pub mod schema;

pub use context::{MarshalContext, NamespaceTable, GML_NS, OGC_NS, SLD_NS};
pub use encoder::{
    build_document, build_raster_symbolizer, convert_channel, convert_color_map,
    convert_contrast_enhancement, convert_opacity, convert_rgb_channels, convert_single_channel,
    json_to_sld, SldEncoder,
};
pub use exceptions::{error_report, service_exception};
pub use marshal::Marshaller;
pub use reader::parse_sld;
pub use schema::{
    ChannelRole, ChannelSelection, ColorMap, ColorMapEntryNode, ContrastEnhancement, ContrastMethod,
    FeatureTypeStyle, NamedLayer, Normalize, ParameterValue, RasterSymbolizer, Rule,
    SchemaNode, SelectedChannel, StyledLayerDescriptor, Symbolizer, UserStyle, VendorOption,
};
