use super::{well_known_namespace, XmlAttribute, XmlDocument, XmlElement, XmlNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use thiserror::Error;
use tracing::trace;

/// XML reading errors
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Failed to read XML file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },
    #[error("Document has no root element")]
    NoRoot,
}

/// `xmlns` bindings introduced by one element
type Scope = Vec<(Option<String>, String)>;

impl XmlDocument {
    /// Read and parse a file
    pub fn read(path: &Path) -> Result<Self, XmlError> {
        let contents = std::fs::read_to_string(path)?;
        trace!("Parsing XML: {}", path.display());
        Self::parse(&contents)
    }

    /// Parse a document from a string
    pub fn parse(contents: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(contents);
        reader.trim_text(false);

        let mut open: Vec<XmlElement> = Vec::new();
        let mut scopes: Vec<Scope> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(ref start) => {
                    scopes.push(declared_namespaces(start));
                    let element = build_element(start, &scopes);
                    open.push(element);
                }
                Event::Empty(ref start) => {
                    scopes.push(declared_namespaces(start));
                    let element = build_element(start, &scopes);
                    scopes.pop();
                    attach(&mut open, &mut root, element);
                }
                Event::End(_) => {
                    scopes.pop();
                    if let Some(element) = open.pop() {
                        attach(&mut open, &mut root, element);
                    }
                }
                Event::Text(ref text) => {
                    if let Some(parent) = open.last_mut() {
                        let value = text
                            .unescape()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(text).into_owned());
                        parent.children.push(XmlNode::Text(value));
                    }
                }
                Event::CData(ref data) => {
                    if let Some(parent) = open.last_mut() {
                        let value = String::from_utf8_lossy(data).into_owned();
                        parent.children.push(XmlNode::CData(value));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        root.map(XmlDocument::new).ok_or(XmlError::NoRoot)
    }
}

fn attach(open: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match open.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn split_name(raw: &[u8]) -> (Option<String>, String) {
    let name = String::from_utf8_lossy(raw);
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, name.into_owned()),
    }
}

fn declared_namespaces(start: &BytesStart) -> Scope {
    start
        .attributes()
        .filter_map(|a| a.ok())
        .filter_map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = String::from_utf8_lossy(&attr.value).into_owned();
            if key == "xmlns" {
                Some((None, value))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (Some(prefix.to_string()), value))
            }
        })
        .collect()
}

fn resolve(prefix: Option<&str>, scopes: &[Scope], is_attribute: bool) -> Option<String> {
    // Unprefixed attributes never take the default namespace
    if prefix.is_none() && is_attribute {
        return None;
    }
    if prefix == Some("xml") {
        return Some("http://www.w3.org/XML/1998/namespace".to_string());
    }

    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter())
        .find(|(bound, _)| bound.as_deref() == prefix)
        .map(|(_, uri)| uri.clone())
        .or_else(|| prefix.and_then(well_known_namespace).map(str::to_string))
}

fn build_element(start: &BytesStart, scopes: &[Scope]) -> XmlElement {
    let (prefix, local_name) = split_name(start.name().as_ref());
    let namespace = resolve(prefix.as_deref(), scopes, false);

    let attributes = start
        .attributes()
        .filter_map(|a| a.ok())
        .filter_map(|attr| {
            let (prefix, local_name) = split_name(attr.key.as_ref());
            if prefix.as_deref() == Some("xmlns") || (prefix.is_none() && local_name == "xmlns") {
                return None;
            }
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            let namespace = resolve(prefix.as_deref(), scopes, true);
            Some(XmlAttribute {
                prefix,
                local_name,
                namespace,
                value,
            })
        })
        .collect();

    XmlElement {
        prefix,
        local_name,
        namespace,
        attributes,
        children: Vec::new(),
    }
}
