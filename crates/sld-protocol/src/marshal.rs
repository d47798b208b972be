//! XML marshaller for the SLD schema tree.
//!
//! Serialization is a recursive walk over the typed tree. Schema constraints
//! that the type system does not already enforce are checked on the way down;
//! the first violation aborts the whole document and nothing is returned.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use sld_common::{SldError, SldResult};

use crate::context::{MarshalContext, SLD_NS};
use crate::schema::{
    ChannelRole, ChannelSelection, ColorMap, ColorMapEntryNode, ContrastEnhancement,
    ContrastMethod, FeatureTypeStyle, NamedLayer, Normalize, ParameterValue, RasterSymbolizer,
    Rule, SchemaNode, SelectedChannel, StyledLayerDescriptor, Symbolizer, UserStyle,
    VendorOption,
};

/// Serializes [`StyledLayerDescriptor`] trees using a [`MarshalContext`].
#[derive(Debug, Clone, Copy)]
pub struct Marshaller<'ctx> {
    ctx: &'ctx MarshalContext,
}

impl<'ctx> Marshaller<'ctx> {
    pub fn new(ctx: &'ctx MarshalContext) -> Self {
        Self { ctx }
    }

    /// Marshal a document to an XML string.
    pub fn marshal_string(&self, document: &StyledLayerDescriptor) -> SldResult<String> {
        let bytes = self.marshal_bytes(document)?;
        String::from_utf8(bytes)
            .map_err(|e| SldError::InternalError(format!("Marshalled SLD is not UTF-8: {}", e)))
    }

    /// Marshal a document to UTF-8 bytes.
    pub fn marshal_bytes(&self, document: &StyledLayerDescriptor) -> SldResult<Vec<u8>> {
        let writer = match self.ctx.indent() {
            Some(width) if width > 0 => Writer::new_with_indent(Vec::new(), b' ', width),
            _ => Writer::new(Vec::new()),
        };

        let mut sink = XmlSink {
            writer,
            prefix: self.ctx.sld_prefix(),
        };

        if self.ctx.xml_declaration() {
            sink.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        sink.visit_document(document, self.ctx)?;

        let bytes = sink.writer.into_inner();
        debug!(
            layers = document.named_layers.len(),
            bytes = bytes.len(),
            "Marshalled SLD document"
        );
        Ok(bytes)
    }
}

fn xml_error(err: quick_xml::Error) -> SldError {
    SldError::Xml(err.to_string())
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

fn require_finite(type_name: &'static str, field: &str, value: f64) -> SldResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SldError::schema(
            type_name,
            format!("{} must be a finite number, got {}", field, value),
        ))
    }
}

struct XmlSink<'p> {
    writer: Writer<Vec<u8>>,
    prefix: Option<&'p str>,
}

impl<'p> XmlSink<'p> {
    fn qname(&self, local: &str) -> String {
        match self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
            _ => local.to_string(),
        }
    }

    fn write(&mut self, event: Event<'_>) -> SldResult<()> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn start(&mut self, local: &str, attributes: &[(&str, &str)]) -> SldResult<()> {
        let mut element = BytesStart::new(self.qname(local));
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.write(Event::Start(element))
    }

    fn end(&mut self, local: &str) -> SldResult<()> {
        let name = self.qname(local);
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, local: &str, attributes: &[(&str, &str)]) -> SldResult<()> {
        let mut element = BytesStart::new(self.qname(local));
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.write(Event::Empty(element))
    }

    fn text_element(
        &mut self,
        local: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> SldResult<()> {
        self.start(local, attributes)?;
        if !text.is_empty() {
            self.write(Event::Text(BytesText::new(text)))?;
        }
        self.end(local)
    }

    fn visit_document(
        &mut self,
        document: &StyledLayerDescriptor,
        ctx: &MarshalContext,
    ) -> SldResult<()> {
        if document.named_layers.is_empty() {
            return Err(SldError::schema(
                StyledLayerDescriptor::TYPE_NAME,
                "at least one NamedLayer is required",
            ));
        }
        if document.version.is_empty() {
            return Err(SldError::schema(
                StyledLayerDescriptor::TYPE_NAME,
                "missing required attribute version",
            ));
        }

        let mut xmlns: Vec<(String, &str)> = ctx
            .namespaces()
            .iter()
            .map(|(prefix, uri)| match prefix {
                "" => ("xmlns".to_string(), uri),
                _ => (format!("xmlns:{}", prefix), uri),
            })
            .collect();
        // Unprefixed elements still have to land in the SLD namespace
        if self.prefix.is_none() {
            xmlns.push(("xmlns".to_string(), SLD_NS));
        }
        let mut attributes: Vec<(&str, &str)> =
            xmlns.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        attributes.push(("version", document.version.as_str()));

        self.start("StyledLayerDescriptor", &attributes)?;
        for layer in &document.named_layers {
            self.visit_named_layer(layer)?;
        }
        self.end("StyledLayerDescriptor")
    }

    fn visit_named_layer(&mut self, layer: &NamedLayer) -> SldResult<()> {
        if layer.name.trim().is_empty() {
            return Err(SldError::schema(
                NamedLayer::TYPE_NAME,
                "missing required element Name",
            ));
        }

        self.start("NamedLayer", &[])?;
        self.text_element("Name", &[], &layer.name)?;
        for style in &layer.user_styles {
            self.visit_user_style(style)?;
        }
        self.end("NamedLayer")
    }

    fn visit_user_style(&mut self, style: &UserStyle) -> SldResult<()> {
        if style.feature_type_styles.is_empty() {
            return Err(SldError::schema(
                UserStyle::TYPE_NAME,
                "at least one FeatureTypeStyle is required",
            ));
        }

        self.start("UserStyle", &[])?;
        for fts in &style.feature_type_styles {
            self.visit_feature_type_style(fts)?;
        }
        self.end("UserStyle")
    }

    fn visit_feature_type_style(&mut self, fts: &FeatureTypeStyle) -> SldResult<()> {
        if fts.rules.is_empty() {
            return Err(SldError::schema(
                FeatureTypeStyle::TYPE_NAME,
                "at least one Rule is required",
            ));
        }

        self.start("FeatureTypeStyle", &[])?;
        for rule in &fts.rules {
            self.visit_rule(rule)?;
        }
        self.end("FeatureTypeStyle")
    }

    fn visit_rule(&mut self, rule: &Rule) -> SldResult<()> {
        if rule.symbolizers.is_empty() {
            return Err(SldError::schema(
                Rule::TYPE_NAME,
                "at least one Symbolizer is required",
            ));
        }

        self.start("Rule", &[])?;
        for symbolizer in &rule.symbolizers {
            match symbolizer {
                Symbolizer::Raster(raster) => self.visit_raster_symbolizer(raster)?,
            }
        }
        self.end("Rule")
    }

    fn visit_raster_symbolizer(&mut self, raster: &RasterSymbolizer) -> SldResult<()> {
        self.start("RasterSymbolizer", &[])?;
        self.visit_parameter_value("Opacity", &raster.opacity)?;
        if let Some(ref cs) = raster.channel_selection {
            self.visit_channel_selection(cs)?;
        }
        if let Some(ref color_map) = raster.color_map {
            self.visit_color_map(color_map)?;
        }
        self.end("RasterSymbolizer")
    }

    fn visit_parameter_value(&mut self, local: &str, value: &ParameterValue) -> SldResult<()> {
        let text = match value {
            ParameterValue::Number(n) => {
                require_finite(ParameterValue::TYPE_NAME, local, *n)?;
                format_number(*n)
            }
            ParameterValue::Literal(s) => {
                if s.trim().is_empty() {
                    return Err(SldError::schema(
                        ParameterValue::TYPE_NAME,
                        format!("{} has no content", local),
                    ));
                }
                s.clone()
            }
        };
        self.text_element(local, &[], &text)
    }

    fn visit_channel_selection(&mut self, cs: &ChannelSelection) -> SldResult<()> {
        let rgb = [
            cs.red_channel.is_some(),
            cs.green_channel.is_some(),
            cs.blue_channel.is_some(),
        ];
        let rgb_count = rgb.iter().filter(|set| **set).count();

        if rgb_count == 0 && cs.gray_channel.is_none() {
            return Err(SldError::schema(
                ChannelSelection::TYPE_NAME,
                "no channel selected",
            ));
        }
        if rgb_count > 0 && cs.gray_channel.is_some() {
            return Err(SldError::schema(
                ChannelSelection::TYPE_NAME,
                "GrayChannel cannot be combined with RGB channels",
            ));
        }
        if rgb_count > 0 && rgb_count < 3 {
            return Err(SldError::schema(
                ChannelSelection::TYPE_NAME,
                "RedChannel, GreenChannel and BlueChannel must all be present",
            ));
        }

        self.start("ChannelSelection", &[])?;
        for (role, channel) in cs.channels() {
            self.visit_selected_channel(role, channel)?;
        }
        self.end("ChannelSelection")
    }

    fn visit_selected_channel(
        &mut self,
        role: ChannelRole,
        channel: &SelectedChannel,
    ) -> SldResult<()> {
        if channel.source_channel_name.trim().is_empty() {
            return Err(SldError::schema(
                SelectedChannel::TYPE_NAME,
                format!("{} is missing SourceChannelName", role.element()),
            ));
        }

        self.start(role.element(), &[])?;
        self.text_element("SourceChannelName", &[], &channel.source_channel_name)?;
        if let Some(ref ce) = channel.contrast_enhancement {
            self.visit_contrast_enhancement(ce)?;
        }
        self.end(role.element())
    }

    fn visit_contrast_enhancement(&mut self, ce: &ContrastEnhancement) -> SldResult<()> {
        if let Some(gamma) = ce.gamma_value {
            require_finite(ContrastEnhancement::TYPE_NAME, "GammaValue", gamma)?;
        }

        if ce.is_empty() {
            return self.empty("ContrastEnhancement", &[]);
        }

        self.start("ContrastEnhancement", &[])?;
        match ce.method {
            Some(ContrastMethod::Normalize(ref normalize)) => self.visit_normalize(normalize)?,
            Some(ContrastMethod::Histogram) => self.empty("Histogram", &[])?,
            None => {}
        }
        if let Some(gamma) = ce.gamma_value {
            self.text_element("GammaValue", &[], &format_number(gamma))?;
        }
        self.end("ContrastEnhancement")
    }

    fn visit_normalize(&mut self, normalize: &Normalize) -> SldResult<()> {
        if normalize.vendor_options.is_empty() {
            return self.empty("Normalize", &[]);
        }

        self.start("Normalize", &[])?;
        for option in &normalize.vendor_options {
            self.visit_vendor_option(option)?;
        }
        self.end("Normalize")
    }

    fn visit_vendor_option(&mut self, option: &VendorOption) -> SldResult<()> {
        if option.name.is_empty() {
            return Err(SldError::schema(
                VendorOption::TYPE_NAME,
                "missing required attribute name",
            ));
        }
        self.text_element("VendorOption", &[("name", option.name.as_str())], &option.value)
    }

    fn visit_color_map(&mut self, color_map: &ColorMap) -> SldResult<()> {
        let extended = color_map.extended.map(|e| e.to_string());
        let mut attributes: Vec<(&str, &str)> = Vec::new();
        if let Some(ref map_type) = color_map.map_type {
            attributes.push(("type", map_type.as_str()));
        }
        if let Some(ref extended) = extended {
            attributes.push(("extended", extended.as_str()));
        }

        if color_map.entries.is_empty() {
            return self.empty("ColorMap", &attributes);
        }

        self.start("ColorMap", &attributes)?;
        for (index, entry) in color_map.entries.iter().enumerate() {
            self.visit_color_map_entry(index, entry)?;
        }
        self.end("ColorMap")
    }

    fn visit_color_map_entry(&mut self, index: usize, entry: &ColorMapEntryNode) -> SldResult<()> {
        let color = match entry.color.as_deref() {
            Some(color) if !color.trim().is_empty() => color,
            _ => {
                return Err(SldError::schema(
                    ColorMapEntryNode::TYPE_NAME,
                    format!("entry {} is missing required attribute color", index),
                ))
            }
        };

        let opacity = match entry.opacity {
            Some(o) => {
                require_finite(ColorMapEntryNode::TYPE_NAME, "opacity", o)?;
                Some(format_number(o))
            }
            None => None,
        };
        let quantity = match entry.quantity {
            Some(q) => {
                require_finite(ColorMapEntryNode::TYPE_NAME, "quantity", q)?;
                Some(format_number(q))
            }
            None => None,
        };

        let mut attributes: Vec<(&str, &str)> = vec![("color", color)];
        if let Some(ref opacity) = opacity {
            attributes.push(("opacity", opacity.as_str()));
        }
        if let Some(ref quantity) = quantity {
            attributes.push(("quantity", quantity.as_str()));
        }
        if let Some(ref label) = entry.label {
            attributes.push(("label", label.as_str()));
        }

        self.empty("ColorMapEntry", &attributes)
    }
}
