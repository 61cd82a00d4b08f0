//! Parsed XML tree
//!
//! The usage model walks this tree rather than raw parser events so that it
//! can look at parents, siblings and the document root while recording.

mod reader;

pub use reader::XmlError;

pub const ANDROID_URI: &str = "http://schemas.android.com/apk/res/android";
pub const TOOLS_URI: &str = "http://schemas.android.com/tools";
pub const AAPT_URI: &str = "http://schemas.android.com/aapt";
pub const AUTO_URI: &str = "http://schemas.android.com/apk/res-auto";

/// Attribute with its namespace resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: Option<String>,
    pub value: String,
}

impl XmlAttribute {
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

/// A node of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Convenience constructor for an unprefixed element
    pub fn new(local_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            ..Self::default()
        }
    }

    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    /// Attribute by local name, in no namespace
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// Attribute by namespace URI and local name
    #[cfg(test)]
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.is_in(namespace) && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Concatenated text of the direct text and CDATA children
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) | XmlNode::CData(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        let (prefix, local_name) = match name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, name.to_string()),
        };
        let namespace = prefix.as_deref().and_then(well_known_namespace).map(str::to_string);
        self.attributes.push(XmlAttribute {
            prefix,
            local_name,
            namespace,
            value: value.to_string(),
        });
        self
    }

    #[cfg(test)]
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Namespace conventionally bound to a prefix when none is declared
fn well_known_namespace(prefix: &str) -> Option<&'static str> {
    match prefix {
        "android" => Some(ANDROID_URI),
        "tools" => Some(TOOLS_URI),
        "aapt" => Some(AAPT_URI),
        "app" => Some(AUTO_URI),
        _ => None,
    }
}

/// A parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }
}
