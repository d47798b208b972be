//! Marshalling context: namespace table and output options.
//!
//! A context is built once and only read afterwards, so a single instance can
//! be shared by any number of concurrent encode calls.

use once_cell::sync::Lazy;

use crate::marshal::Marshaller;

pub const SLD_NS: &str = "http://www.opengis.net/sld";
pub const OGC_NS: &str = "http://www.opengis.net/ogc";
pub const GML_NS: &str = "http://www.opengis.net/gml";

/// Process-wide SLD 1.0.0 context.
static GLOBAL_CONTEXT: Lazy<MarshalContext> = Lazy::new(MarshalContext::sld_1_0_0);

/// Ordered prefix to namespace URI bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable {
    bindings: Vec<(String, String)>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind `prefix` to `uri`, replacing an earlier binding of the prefix.
    pub fn bind(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let uri = uri.into();
        match self.bindings.iter_mut().find(|(p, _)| *p == prefix) {
            Some(binding) => binding.1 = uri,
            None => self.bindings.push((prefix, uri)),
        }
        self
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
            .bind("ogc", OGC_NS)
            .bind("gml", GML_NS)
            .bind("sld", SLD_NS)
    }
}

/// Immutable configuration consumed by the [`Marshaller`].
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalContext {
    namespaces: NamespaceTable,

    /// Spaces per nesting level; `None` writes a single line
    indent: Option<usize>,

    /// Emit `<?xml version="1.0" encoding="UTF-8"?>`
    xml_declaration: bool,
}

impl MarshalContext {
    /// Context for SLD 1.0.0 with the `ogc`, `gml` and `sld` prefixes.
    pub fn sld_1_0_0() -> Self {
        Self {
            namespaces: NamespaceTable::default(),
            indent: None,
            xml_declaration: false,
        }
    }

    /// Shared context initialized on first use.
    pub fn global() -> &'static MarshalContext {
        &GLOBAL_CONTEXT
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceTable) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    pub fn indent(&self) -> Option<usize> {
        self.indent
    }

    pub fn xml_declaration(&self) -> bool {
        self.xml_declaration
    }

    /// Prefix used for SLD elements. Falls back to unprefixed names when the
    /// table has no binding for the SLD namespace.
    pub fn sld_prefix(&self) -> Option<&str> {
        self.namespaces.prefix_for(SLD_NS)
    }

    pub fn marshaller(&self) -> Marshaller<'_> {
        Marshaller::new(self)
    }
}

impl Default for MarshalContext {
    fn default() -> Self {
        Self::sld_1_0_0()
    }
}
