//! Key-path access to the client's XML settings documents.
//!
//! A [`NodePath`] names an element by the chain of element names from the
//! document root, e.g. `DCPlusPlus/Settings/Nick`. At each step the first
//! child with the matching name is taken.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::{ShareError, ShareResult};

/// Slash-separated element path starting at the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePath(&'static str);

impl NodePath {
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    pub fn segments(&self) -> impl Iterator<Item = &'static str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Path of the parent element, if any.
    pub fn parent(&self) -> Option<NodePath> {
        self.0.rfind('/').map(|i| NodePath(&self.0[..i]))
    }

    /// Last path segment.
    pub fn leaf(&self) -> &'static str {
        self.0.rsplit('/').next().unwrap_or(self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The narrow capability the patcher needs from a settings document.
pub trait Document {
    /// Text content of the first element at `path`.
    fn text(&self, path: NodePath) -> ShareResult<Option<String>>;

    /// Replace the text content of the first element at `path`.
    fn set_text(&mut self, path: NodePath, value: &str) -> ShareResult<()>;

    /// Value of `name` on the first element at `path`.
    fn attribute(&self, path: NodePath, name: &str) -> ShareResult<Option<String>>;

    /// Set `name` on the first element at `path`, creating it if absent.
    fn set_attribute(&mut self, path: NodePath, name: &str, value: &str) -> ShareResult<()>;

    /// Number of elements matching `path` under its parent's first match.
    fn count(&self, path: NodePath) -> usize;
}

/// In-memory XML document.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    /// Parse a document, dropping whitespace-only text between elements.
    pub fn parse(content: &str) -> ShareResult<Self> {
        let mut root = Element::parse(content.as_bytes())?;
        strip_layout_whitespace(&mut root);
        Ok(Self { root })
    }

    pub fn load(path: &Path) -> ShareResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ShareError::persistence(path, e))?;
        let doc = Self::parse(&content).map_err(|e| match e {
            ShareError::DocumentParse(msg) => {
                ShareError::DocumentParse(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        debug!(path = %path.display(), root = %doc.root.name, "loaded document");
        Ok(doc)
    }

    /// Serialize with a UTF-8 declaration and indentation.
    pub fn to_bytes(&self) -> ShareResult<Vec<u8>> {
        let mut out = Vec::new();
        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("\t")
            .write_document_declaration(true);
        self.root.write_with_config(&mut out, config)?;
        out.push(b'\n');
        Ok(out)
    }

    fn find(&self, path: NodePath) -> ShareResult<&Element> {
        let mut segments = path.segments();
        let root_name = segments.next().unwrap_or_default();
        if self.root.name != root_name {
            return Err(ShareError::NodeNotFound(path.to_string()));
        }
        let mut node = &self.root;
        for name in segments {
            node = node
                .get_child(name)
                .ok_or_else(|| ShareError::NodeNotFound(path.to_string()))?;
        }
        Ok(node)
    }

    fn find_mut(&mut self, path: NodePath) -> ShareResult<&mut Element> {
        let mut segments = path.segments();
        let root_name = segments.next().unwrap_or_default();
        if self.root.name != root_name {
            return Err(ShareError::NodeNotFound(path.to_string()));
        }
        let mut node = &mut self.root;
        for name in segments {
            node = node
                .get_mut_child(name)
                .ok_or_else(|| ShareError::NodeNotFound(path.to_string()))?;
        }
        Ok(node)
    }
}

impl Document for XmlDocument {
    fn text(&self, path: NodePath) -> ShareResult<Option<String>> {
        Ok(self.find(path)?.get_text().map(Cow::into_owned))
    }

    fn set_text(&mut self, path: NodePath, value: &str) -> ShareResult<()> {
        let node = self.find_mut(path)?;
        node.children
            .retain(|c| !matches!(c, XMLNode::Text(_) | XMLNode::CData(_)));
        if !value.is_empty() {
            node.children.push(XMLNode::Text(value.to_string()));
        }
        Ok(())
    }

    fn attribute(&self, path: NodePath, name: &str) -> ShareResult<Option<String>> {
        Ok(self.find(path)?.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, path: NodePath, name: &str, value: &str) -> ShareResult<()> {
        self.find_mut(path)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn count(&self, path: NodePath) -> usize {
        let Some(parent) = path.parent() else {
            return usize::from(self.root.name == path.leaf());
        };
        let leaf = path.leaf();
        match self.find(parent) {
            Ok(node) => node
                .children
                .iter()
                .filter(|c| matches!(c, XMLNode::Element(e) if e.name == leaf))
                .count(),
            Err(_) => 0,
        }
    }
}

fn strip_layout_whitespace(element: &mut Element) {
    let has_elements = element
        .children
        .iter()
        .any(|c| matches!(c, XMLNode::Element(_)));
    if has_elements {
        element
            .children
            .retain(|c| !matches!(c, XMLNode::Text(t) if t.trim().is_empty()));
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(e) = child {
            strip_layout_whitespace(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<DCPlusPlus>
	<Settings>
		<Nick type="string">old</Nick>
		<EMail type="string"></EMail>
		<Description type="string">keep me</Description>
	</Settings>
</DCPlusPlus>
"#;

    const NICK: NodePath = NodePath::new("DCPlusPlus/Settings/Nick");
    const EMAIL: NodePath = NodePath::new("DCPlusPlus/Settings/EMail");

    #[test]
    fn path_parts() {
        assert_eq!(NICK.segments().collect::<Vec<_>>(), ["DCPlusPlus", "Settings", "Nick"]);
        assert_eq!(NICK.parent(), Some(NodePath::new("DCPlusPlus/Settings")));
        assert_eq!(NICK.leaf(), "Nick");
        assert_eq!(NodePath::new("Root").parent(), None);
    }

    #[test]
    fn read_and_write_text() {
        let mut doc = XmlDocument::parse(SETTINGS).unwrap();
        assert_eq!(doc.text(NICK).unwrap().as_deref(), Some("old"));
        assert_eq!(doc.text(EMAIL).unwrap(), None);

        doc.set_text(NICK, "alice").unwrap();
        doc.set_text(EMAIL, "alice@example.com").unwrap();
        assert_eq!(doc.text(NICK).unwrap().as_deref(), Some("alice"));
        assert_eq!(doc.text(EMAIL).unwrap().as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn attributes_survive_text_update() {
        let mut doc = XmlDocument::parse(SETTINGS).unwrap();
        doc.set_text(NICK, "alice").unwrap();
        assert_eq!(doc.attribute(NICK, "type").unwrap().as_deref(), Some("string"));
    }

    #[test]
    fn missing_node_is_an_error() {
        let mut doc = XmlDocument::parse(SETTINGS).unwrap();
        let path = NodePath::new("DCPlusPlus/Settings/Missing");
        assert!(matches!(doc.text(path), Err(ShareError::NodeNotFound(_))));
        assert!(matches!(
            doc.set_text(path, "x"),
            Err(ShareError::NodeNotFound(_))
        ));
        assert!(matches!(
            doc.text(NodePath::new("Favorites/Hubs")),
            Err(ShareError::NodeNotFound(_))
        ));
    }

    #[test]
    fn set_attribute_creates_when_absent() {
        let mut doc = XmlDocument::parse(SETTINGS).unwrap();
        doc.set_attribute(NICK, "extra", "1").unwrap();
        assert_eq!(doc.attribute(NICK, "extra").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn serialization_keeps_untouched_nodes() {
        let mut doc = XmlDocument::parse(SETTINGS).unwrap();
        doc.set_text(NICK, "alice & bob").unwrap();
        let bytes = doc.to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("keep me"));
        assert!(text.contains("alice &amp; bob"));

        let reparsed = XmlDocument::parse(&text).unwrap();
        assert_eq!(reparsed.text(NICK).unwrap().as_deref(), Some("alice & bob"));
        assert_eq!(
            reparsed
                .text(NodePath::new("DCPlusPlus/Settings/Description"))
                .unwrap()
                .as_deref(),
            Some("keep me")
        );
    }

    #[test]
    fn count_siblings() {
        let doc = XmlDocument::parse(
            "<Favorites><Hubs><Hub Name=\"a\"/><Hub Name=\"b\"/></Hubs></Favorites>",
        )
        .unwrap();
        assert_eq!(doc.count(NodePath::new("Favorites/Hubs/Hub")), 2);
        assert_eq!(doc.count(NodePath::new("Favorites/Users/User")), 0);
        assert_eq!(doc.count(NodePath::new("Favorites")), 1);
    }

    #[test]
    fn malformed_xml_is_parse_error() {
        assert!(matches!(
            XmlDocument::parse("<DCPlusPlus><Settings>"),
            Err(ShareError::DocumentParse(_))
        ));
    }
}
