// Tree walk that turns parsed XML into declarations and references

use super::{DirectiveKind, ResourceUsageModel};
use crate::resource::registry::ReferenceKind;
use crate::resource::url::is_name_char;
use crate::resource::{ResourceFolderType, ResourceId, ResourceType, ResourceUrl};
use crate::scanner::{SourceScanner, SourceToken, StringLiteralHook};
use crate::xml::{XmlDocument, XmlElement, XmlNode, AAPT_URI, TOOLS_URI};
use std::path::Path;
use tracing::{debug, trace};

/// Attribute listing sibling ids, as in `app:constraint_referenced_ids="a,b"`
const ID_LIST_ATTRIBUTES: &[&str] = &["constraint_referenced_ids"];

/// Wearable app descriptor element whose text is a raw resource name
const RAW_PATH_TAG: &str = "rawPathResId";

/// Per-document facts the walk needs at every depth
struct Document<'a> {
    folder: ResourceFolderType,
    path: &'a Path,
    /// Root is `<layout>`: ids are consumed by generated binding classes
    data_binding: bool,
    /// Root is `<navigation>`: action ids are consumed by the nav runtime
    navigation: bool,
}

impl<H: StringLiteralHook> ResourceUsageModel<H> {
    /// Record declarations and references of one parsed resource file
    ///
    /// Whole-file folders declare the file's resource and use it as the
    /// context of everything inside; `values` files declare one resource per
    /// definition element instead.
    pub fn visit_xml_document(
        &mut self,
        folder: ResourceFolderType,
        path: &Path,
        document: &XmlDocument,
    ) {
        self.inline_counter = 0;
        let context = self.declare_file_resource(folder, path);
        let root = &document.root;
        let scope = Document {
            folder,
            path,
            data_binding: root.local_name == "layout",
            navigation: root.local_name == "navigation",
        };
        trace!("Visiting {} ({:?})", path.display(), folder);
        self.record_element(&scope, root, None, context);
    }

    /// Every resource URL in a manifest is a root
    pub fn record_manifest_usages(&mut self, document: &XmlDocument) {
        self.record_manifest_element(&document.root);
    }

    fn record_manifest_element(&mut self, element: &XmlElement) {
        for attribute in &element.attributes {
            self.mark_url_reachable(&attribute.value);
        }
        for child in &element.children {
            match child {
                XmlNode::Element(child) => self.record_manifest_element(child),
                XmlNode::Text(text) | XmlNode::CData(text) => self.mark_url_reachable(text),
            }
        }
    }

    fn mark_url_reachable(&mut self, value: &str) {
        if let Some(url) = ResourceUrl::parse(value) {
            if !url.framework {
                let id = self.registry.get_or_create(url.resource_type, &url.name, None);
                self.registry.get_mut(id).set_reachable(true);
            }
        }
    }

    /// Declare a resource found in `path` and return it
    fn declare(
        &mut self,
        resource_type: ResourceType,
        name: &str,
        value: Option<i32>,
        path: &Path,
    ) -> ResourceId {
        let id = self.registry.get_or_create(resource_type, name, value);
        let resource = self.registry.get_mut(id);
        resource.set_declared(true);
        resource.add_location(path.to_path_buf());
        id
    }

    fn record_element(
        &mut self,
        doc: &Document<'_>,
        element: &XmlElement,
        parent: Option<&XmlElement>,
        context: Option<ResourceId>,
    ) {
        self.capture_directives(element);

        let mut context = context;
        if let Some(decl) = context {
            if element.is_in(AAPT_URI) && element.local_name == "attr" {
                self.record_inline_resources(doc, element, decl);
                return;
            }
            self.record_attributes(doc, element, decl);
            if element.local_name == RAW_PATH_TAG {
                let name = element.text_content();
                let name = name.trim();
                if !name.is_empty() {
                    let target = self.registry.get_or_create(ResourceType::Raw, name, None);
                    self.registry.add_reference(decl, target, ReferenceKind::Attribute);
                }
            }
        }

        if doc.folder.is_values() {
            if let Some((resource_type, declared)) = self.record_definition(doc, element) {
                context = Some(declared);
                match resource_type {
                    // Markup inside a string body is text, not references
                    ResourceType::String => {
                        for child in &element.children {
                            if let XmlNode::Text(text) | XmlNode::CData(text) = child {
                                self.record_text(text, context);
                            }
                        }
                        return;
                    }
                    ResourceType::Style if element.local_name == "style" => {
                        self.record_style_parent(element, declared)
                    }
                    _ => {}
                }
            } else if element.local_name == "item" {
                if let (Some(style), Some(parent)) = (context, parent) {
                    if parent.local_name == "style" {
                        self.record_style_item(element, style);
                    }
                }
            }
        }

        for child in &element.children {
            match child {
                XmlNode::Element(child) => self.record_element(doc, child, Some(element), context),
                XmlNode::Text(text) | XmlNode::CData(text) => self.record_text(text, context),
            }
        }
    }

    /// `tools:keep`, `tools:discard` and `tools:shrinkMode`, anywhere in a document
    fn capture_directives(&mut self, element: &XmlElement) {
        for attribute in element.attributes.iter().filter(|a| a.is_in(TOOLS_URI)) {
            match attribute.local_name.as_str() {
                "keep" => self.record_directive(DirectiveKind::Keep, &attribute.value),
                "discard" => self.record_directive(DirectiveKind::Discard, &attribute.value),
                "shrinkMode" => self.record_shrink_mode(&attribute.value),
                _ => {}
            }
        }
    }

    fn record_attributes(&mut self, doc: &Document<'_>, element: &XmlElement, decl: ResourceId) {
        for attribute in &element.attributes {
            if attribute.is_in(TOOLS_URI) {
                let is_directive = matches!(
                    attribute.local_name.as_str(),
                    "keep" | "discard" | "shrinkMode"
                );
                if is_directive || self.ignore_tools_attributes {
                    continue;
                }
            }

            let value = attribute.value.as_str();
            if value.starts_with("@{") || value.starts_with("@={") {
                self.record_binding_expression(value, decl);
            } else if let Some(url) = ResourceUrl::parse(value) {
                if url.framework {
                    continue;
                }
                if url.create {
                    self.record_declared_id(doc, element, &url.name, decl);
                } else {
                    let target = self.registry.get_or_create(url.resource_type, &url.name, None);
                    self.registry.add_reference(decl, target, ReferenceKind::Attribute);
                }
            } else if ID_LIST_ATTRIBUTES.contains(&attribute.local_name.as_str()) {
                for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                    let id = self.registry.get_or_create(ResourceType::Id, name, None);
                    self.registry.get_mut(id).set_reachable(true);
                }
            }
        }
    }

    /// `@+id/name`: declared where it appears
    fn record_declared_id(
        &mut self,
        doc: &Document<'_>,
        element: &XmlElement,
        name: &str,
        decl: ResourceId,
    ) {
        let id = self.declare(ResourceType::Id, name, None, doc.path);
        let navigation_action = doc.navigation && element.local_name == "action";
        if doc.data_binding || navigation_action {
            self.registry.get_mut(id).set_reachable(true);
        } else {
            self.registry.add_reference(decl, id, ReferenceKind::DeclaredId);
        }
    }

    /// `@type/name` and `R.type.name` tokens inside `@{...}`
    fn record_binding_expression(&mut self, expression: &str, decl: ResourceId) {
        let mut targets = Vec::new();

        for (at, _) in expression.match_indices('@') {
            let rest = &expression[at + 1..];
            let end = rest
                .find(|c: char| !(is_name_char(c) || c == '/' || c == ':'))
                .unwrap_or(rest.len());
            if let Some(url) = ResourceUrl::parse(&expression[at..at + 1 + end]) {
                if !url.framework {
                    targets.push((url.resource_type, url.name));
                }
            }
        }

        for token in SourceScanner::new(expression) {
            if let SourceToken::ResourceField {
                resource_type,
                name,
            } = token
            {
                targets.push((resource_type, name.to_string()));
            }
        }

        for (resource_type, name) in targets {
            let target = self.registry.get_or_create(resource_type, &name, None);
            self.registry.add_reference(decl, target, ReferenceKind::Binding);
        }
    }

    /// Hoist each child of `<aapt:attr>` into its own resource
    fn record_inline_resources(
        &mut self,
        doc: &Document<'_>,
        element: &XmlElement,
        decl: ResourceId,
    ) {
        let attr_name = element.attribute("name").unwrap_or_default();
        let base = self.registry.get(decl).name.clone();

        for child in element.child_elements() {
            let resource_type = inline_resource_type(attr_name, child);
            let name = format!("{}_{}", base, self.inline_counter);
            self.inline_counter += 1;

            let inline = self.declare(resource_type, &name, None, doc.path);
            self.registry.add_reference(decl, inline, ReferenceKind::Inline);
            debug!("Inline resource {}/{}", resource_type, name);

            self.record_element(doc, child, Some(element), Some(inline));
        }
    }

    /// Declare the resource a `values` definition element stands for
    fn record_definition(
        &mut self,
        doc: &Document<'_>,
        element: &XmlElement,
    ) -> Option<(ResourceType, ResourceId)> {
        let tag = element.local_name.as_str();
        let is_public = tag == "public";
        let resource_type = if is_public || tag == "item" {
            element.attribute("type").and_then(ResourceType::from_name)?
        } else {
            ResourceType::from_values_tag(tag)?
        };
        let name = element.attribute("name").filter(|n| !n.is_empty())?;

        let value = if is_public {
            element.attribute("id").and_then(parse_hex_id)
        } else {
            None
        };

        let id = self.declare(resource_type, name, value, doc.path);
        if is_public {
            self.registry.get_mut(id).set_public(true);
        }
        Some((resource_type, id))
    }

    /// Explicit `parent="..."`, or the implicit `Base.Child` chain
    fn record_style_parent(&mut self, element: &XmlElement, style: ResourceId) {
        if let Some(parent) = element.attribute("parent") {
            let parent = parent.trim();
            if parent.is_empty() || parent.starts_with("android:") {
                return;
            }
            let target = if parent.starts_with('@') || parent.starts_with('?') {
                match ResourceUrl::parse(parent) {
                    Some(url) if !url.framework => {
                        Some(self.registry.get_or_create(url.resource_type, &url.name, None))
                    }
                    _ => None,
                }
            } else {
                Some(self.registry.get_or_create(ResourceType::Style, parent, None))
            };
            if let Some(target) = target {
                self.registry.add_reference(style, target, ReferenceKind::StyleParent);
            }
            return;
        }

        let mut name = self.registry.get(style).name.clone();
        while let Some(pos) = name.rfind('_') {
            name.truncate(pos);
            if let Some(target) = self.registry.lookup(ResourceType::Style, &name) {
                self.registry.add_reference(style, target, ReferenceKind::StyleParent);
            }
        }
    }

    /// `<item name="attrName">` inside a style references the attribute
    fn record_style_item(&mut self, element: &XmlElement, style: ResourceId) {
        let Some(name) = element.attribute("name").map(str::trim) else {
            return;
        };
        if name.is_empty() || name.starts_with("android:") {
            return;
        }
        // `app:attr` and `com.example:attr` both name a local attribute
        let name = name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name);
        let attr = self.registry.get_or_create(ResourceType::Attr, name, None);
        self.registry.add_reference(style, attr, ReferenceKind::StyleItem);
    }

    fn record_text(&mut self, text: &str, context: Option<ResourceId>) {
        let Some(decl) = context else {
            return;
        };
        if let Some(url) = ResourceUrl::parse(text) {
            if !url.framework {
                let target = self.registry.get_or_create(url.resource_type, &url.name, None);
                self.registry.add_reference(decl, target, ReferenceKind::Attribute);
            }
        }
    }
}

/// Type of a resource hoisted out of `<aapt:attr name="...">`
fn inline_resource_type(attr_name: &str, child: &XmlElement) -> ResourceType {
    match child.local_name.as_str() {
        "objectAnimator" | "animator" | "propertyValuesHolder" | "set" => ResourceType::Animator,
        "selector" => {
            let attr = attr_name.to_ascii_lowercase();
            if attr.contains("color") || attr.contains("tint") {
                ResourceType::Color
            } else {
                ResourceType::Drawable
            }
        }
        _ => ResourceType::Drawable,
    }
}

/// `0x7f010000` as written in `<public id="...">`
fn parse_hex_id(value: &str) -> Option<i32> {
    let value = value.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    u32::from_str_radix(digits, 16).ok().map(|v| v as i32)
}
