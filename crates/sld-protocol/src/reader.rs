//! SLD 1.0.0 reader for raster styles.
//!
//! Documents are read into a small element tree first and then mapped onto the
//! schema types. Matching uses local names only, so any namespace prefix (or
//! none) is accepted. Elements outside the raster subset are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use sld_common::{ColorMapEntry, SldError, SldResult};

use crate::schema::{
    ChannelRole, ChannelSelection, ColorMap, ColorMapEntryNode, ContrastEnhancement,
    ContrastMethod, FeatureTypeStyle, NamedLayer, Normalize, ParameterValue, RasterSymbolizer,
    Rule, SelectedChannel, StyledLayerDescriptor, Symbolizer, UserStyle, VendorOption,
};

/// Parse an SLD document into the schema tree.
pub fn parse_sld(xml: &str) -> SldResult<StyledLayerDescriptor> {
    let root = read_tree(xml)?;
    if root.name != "StyledLayerDescriptor" {
        return Err(SldError::InvalidDocument(format!(
            "expected StyledLayerDescriptor root, found {}",
            root.name
        )));
    }
    read_document(&root)
}

#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> SldResult<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| SldError::Xml(e.to_string()))?;
            if attr.key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| SldError::Xml(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn text(&self) -> &str {
        self.text.trim()
    }
}

/// Deepest element nesting accepted. Raster styles need about a dozen levels.
const MAX_DEPTH: usize = 64;

fn read_tree(xml: &str) -> SldResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(SldError::InvalidDocument(format!(
                        "element nesting exceeds {} levels",
                        MAX_DEPTH
                    )));
                }
                stack.push(XmlElement::from_start(&e)?)
            }
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| SldError::Xml(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    SldError::InvalidDocument("unexpected closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SldError::Xml(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SldError::InvalidDocument(format!(
            "unclosed element {}",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| SldError::InvalidDocument("empty document".to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> SldResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(SldError::InvalidDocument(
                "multiple root elements".to_string(),
            ))
        }
    }
    Ok(())
}

fn parse_number(context: &str, text: &str) -> SldResult<f64> {
    text.trim().parse().map_err(|_| {
        SldError::InvalidDocument(format!("{}: '{}' is not a number", context, text))
    })
}

fn read_document(root: &XmlElement) -> SldResult<StyledLayerDescriptor> {
    let named_layers = root
        .children_named("NamedLayer")
        .map(read_named_layer)
        .collect::<SldResult<Vec<_>>>()?;

    Ok(StyledLayerDescriptor {
        version: root
            .attribute("version")
            .unwrap_or(StyledLayerDescriptor::VERSION)
            .to_string(),
        named_layers,
    })
}

fn read_named_layer(element: &XmlElement) -> SldResult<NamedLayer> {
    let name = element
        .child("Name")
        .map(|n| n.text().to_string())
        .ok_or_else(|| SldError::InvalidDocument("NamedLayer without Name".to_string()))?;

    let user_styles = element
        .children_named("UserStyle")
        .map(read_user_style)
        .collect::<SldResult<Vec<_>>>()?;

    Ok(NamedLayer { name, user_styles })
}

fn read_user_style(element: &XmlElement) -> SldResult<UserStyle> {
    let feature_type_styles = element
        .children_named("FeatureTypeStyle")
        .map(|fts| {
            let rules = fts
                .children_named("Rule")
                .map(read_rule)
                .collect::<SldResult<Vec<_>>>()?;
            Ok(FeatureTypeStyle { rules })
        })
        .collect::<SldResult<Vec<_>>>()?;

    Ok(UserStyle {
        feature_type_styles,
    })
}

fn read_rule(element: &XmlElement) -> SldResult<Rule> {
    let symbolizers = element
        .children_named("RasterSymbolizer")
        .map(|r| read_raster_symbolizer(r).map(Symbolizer::Raster))
        .collect::<SldResult<Vec<_>>>()?;
    Ok(Rule { symbolizers })
}

fn read_raster_symbolizer(element: &XmlElement) -> SldResult<RasterSymbolizer> {
    let opacity = match element.child("Opacity") {
        Some(opacity) => read_parameter_value(opacity),
        None => ParameterValue::Number(1.0),
    };

    let channel_selection = element
        .child("ChannelSelection")
        .map(read_channel_selection)
        .transpose()?;

    let color_map = element.child("ColorMap").map(read_color_map).transpose()?;

    Ok(RasterSymbolizer {
        opacity,
        channel_selection,
        color_map,
    })
}

/// Literal text, or the text of a nested `ogc:Literal`.
fn read_parameter_value(element: &XmlElement) -> ParameterValue {
    let text = match element.child("Literal") {
        Some(literal) if element.text().is_empty() => literal.text(),
        _ => element.text(),
    };
    match text.parse::<f64>() {
        Ok(number) => ParameterValue::Number(number),
        Err(_) => ParameterValue::Literal(text.to_string()),
    }
}

fn read_channel_selection(element: &XmlElement) -> SldResult<ChannelSelection> {
    let mut selection = ChannelSelection::default();
    for child in &element.children {
        if let Some(role) = ChannelRole::from_element(&child.name) {
            selection.set(role, read_selected_channel(child)?);
        }
    }
    Ok(selection)
}

fn read_selected_channel(element: &XmlElement) -> SldResult<SelectedChannel> {
    let source_channel_name = element
        .child("SourceChannelName")
        .map(|n| n.text().to_string())
        .ok_or_else(|| {
            SldError::InvalidDocument(format!("{} without SourceChannelName", element.name))
        })?;

    let contrast_enhancement = element
        .child("ContrastEnhancement")
        .map(read_contrast_enhancement)
        .transpose()?;

    Ok(SelectedChannel {
        source_channel_name,
        contrast_enhancement,
    })
}

fn read_contrast_enhancement(element: &XmlElement) -> SldResult<ContrastEnhancement> {
    let method = if let Some(normalize) = element.child("Normalize") {
        let vendor_options = normalize
            .children_named("VendorOption")
            .map(|option| VendorOption {
                name: option.attribute("name").unwrap_or_default().to_string(),
                value: option.text().to_string(),
            })
            .collect();
        Some(ContrastMethod::Normalize(Normalize { vendor_options }))
    } else if element.child("Histogram").is_some() {
        Some(ContrastMethod::Histogram)
    } else {
        None
    };

    let gamma_value = element
        .child("GammaValue")
        .map(|g| parse_number("GammaValue", g.text()))
        .transpose()?;

    Ok(ContrastEnhancement {
        method,
        gamma_value,
    })
}

fn read_color_map(element: &XmlElement) -> SldResult<ColorMap> {
    let extended = match element.attribute("extended") {
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(SldError::InvalidDocument(format!(
                "ColorMap extended must be true or false, got '{}'",
                other
            )))
        }
        None => None,
    };

    let entries = element
        .children_named("ColorMapEntry")
        .map(|entry| {
            Ok(ColorMapEntryNode(ColorMapEntry {
                color: entry.attribute("color").map(str::to_string),
                quantity: entry
                    .attribute("quantity")
                    .map(|q| parse_number("ColorMapEntry quantity", q))
                    .transpose()?,
                label: entry.attribute("label").map(str::to_string),
                opacity: entry
                    .attribute("opacity")
                    .map(|o| parse_number("ColorMapEntry opacity", o))
                    .transpose()?,
            }))
        })
        .collect::<SldResult<Vec<_>>>()?;

    Ok(ColorMap {
        map_type: element.attribute("type").map(str::to_string),
        extended,
        entries,
    })
}
