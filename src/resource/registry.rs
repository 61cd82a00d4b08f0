use super::{normalize_name, Resource, ResourceFolderType, ResourceId, ResourceType, ResourceUrl};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap};
use tracing::{trace, warn};

/// Kind of edge between two resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `@type/name` in an attribute value or text node
    Attribute,
    /// Reference found inside a data binding expression
    Binding,
    /// `parent="..."` or an implicit dotted/underscored parent style
    StyleParent,
    /// `<item name="attr">` inside a style
    StyleItem,
    /// Resource hoisted out of an `aapt:attr` element
    Inline,
    /// `@+id/...` declared inside the referencing resource
    DeclaredId,
    /// Path-style reference (`android_res/drawable/bg.png`)
    FilePath,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Attribute => "attribute",
            ReferenceKind::Binding => "binding",
            ReferenceKind::StyleParent => "parent",
            ReferenceKind::StyleItem => "item",
            ReferenceKind::Inline => "inline",
            ReferenceKind::DeclaredId => "id",
            ReferenceKind::FilePath => "path",
        }
    }
}

/// Owner of every resource seen during one analysis run
///
/// Resources are nodes of a directed graph whose edges point from the user to
/// the resource it depends on. Node indices never change, so [`ResourceId`]s
/// stay valid for the lifetime of the registry and double as insertion order.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    inner: DiGraph<Resource, ReferenceKind>,

    /// type -> normalized name -> resource
    by_type: HashMap<ResourceType, HashMap<String, ResourceId>>,

    /// numeric id -> resource
    by_value: HashMap<i32, ResourceId>,

    /// Names exempt from obfuscation
    whitelist: BTreeSet<String>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the resource for `(resource_type, name)`, creating it if needed
    ///
    /// A known `value` is reconciled into an existing resource whose value was
    /// unknown or zero. A conflicting value keeps the first one seen.
    pub fn get_or_create(
        &mut self,
        resource_type: ResourceType,
        name: &str,
        value: Option<i32>,
    ) -> ResourceId {
        let key = normalize_name(name);

        if let Some(id) = self.lookup_normalized(resource_type, &key) {
            if let Some(value) = value {
                self.reconcile_value(id, value);
            }
            return id;
        }

        let resource = Resource::new(resource_type, &key, value);
        let id = ResourceId(self.inner.add_node(resource));
        trace!("Created resource {}/{}", resource_type, key);

        self.by_type
            .entry(resource_type)
            .or_default()
            .insert(key, id);
        if let Some(value) = value.filter(|v| *v != 0) {
            self.by_value.entry(value).or_insert(id);
        }

        id
    }

    fn reconcile_value(&mut self, id: ResourceId, value: i32) {
        let resource = &mut self.inner[id.0];
        match resource.value {
            // Zero is the placeholder id of a not yet assigned resource
            None | Some(0) => {
                if value == 0 {
                    return;
                }
                resource.value = Some(value);
                self.by_value.entry(value).or_insert(id);
            }
            Some(existing) if existing != value => {
                warn!(
                    "Conflicting ids for {}: keeping {:#x}, ignoring {:#x}",
                    resource, existing, value
                );
                debug_assert!(
                    false,
                    "conflicting ids for {}: {:#x} vs {:#x}",
                    resource, existing, value
                );
            }
            Some(_) => {}
        }
    }

    /// Read-only lookup by type and (raw or normalized) name
    pub fn lookup(&self, resource_type: ResourceType, name: &str) -> Option<ResourceId> {
        self.lookup_normalized(resource_type, &normalize_name(name))
    }

    fn lookup_normalized(&self, resource_type: ResourceType, key: &str) -> Option<ResourceId> {
        self.by_type.get(&resource_type)?.get(key).copied()
    }

    pub fn lookup_by_value(&self, value: i32) -> Option<ResourceId> {
        self.by_value.get(&value).copied()
    }

    /// Look up a resource from a `@type/name` or `?type/name` string
    ///
    /// Framework references never resolve.
    pub fn lookup_by_url(&self, url: &str) -> Option<ResourceId> {
        let url = ResourceUrl::parse(url)?;
        if url.framework {
            return None;
        }
        self.lookup_normalized(url.resource_type, &url.name)
    }

    /// Resolve a path such as `file:///android_res/drawable-hdpi/bg.png`
    ///
    /// The folder segment right before the file name decides the type, the
    /// file name up to its first dot is the resource name.
    pub fn lookup_by_file_path(&self, path: &str) -> Option<ResourceId> {
        let (resource_type, name) = parse_file_path(path)?;
        self.lookup(resource_type, name)
    }

    /// Exempt a resource's name from renaming; returns whether it was new
    pub fn add_to_whitelist(&mut self, id: Option<ResourceId>) -> bool {
        let Some(id) = id else {
            return false;
        };
        let name = &self.inner[id.0].name;
        if name.is_empty() {
            return false;
        }
        self.whitelist.insert(name.clone())
    }

    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.whitelist.contains(name)
    }

    pub fn whitelist(&self) -> impl Iterator<Item = &str> {
        self.whitelist.iter().map(String::as_str)
    }

    /// Add an edge `from -> to`; duplicates and self edges are ignored
    pub fn add_reference(&mut self, from: ResourceId, to: ResourceId, kind: ReferenceKind) -> bool {
        if from == to || self.inner.find_edge(from.0, to.0).is_some() {
            return false;
        }
        self.inner.add_edge(from.0, to.0, kind);
        true
    }

    /// Outgoing references of a resource in the order they were recorded
    pub fn references(&self, id: ResourceId) -> Vec<(ResourceId, ReferenceKind)> {
        let mut edges: Vec<_> = self.inner.edges(id.0).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| (ResourceId(edge.target()), *edge.weight()))
            .collect()
    }

    pub fn get(&self, id: ResourceId) -> &Resource {
        &self.inner[id.0]
    }

    pub fn get_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.inner[id.0]
    }

    /// All resources in insertion order
    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        self.inner
            .node_indices()
            .map(move |idx| (ResourceId(idx), &self.inner[idx]))
    }

    /// Ids of every resource of one type, in insertion order
    pub fn ids_of_type(&self, resource_type: ResourceType) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self
            .by_type
            .get(&resource_type)
            .map(|names| names.values().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    pub fn reference_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// The underlying graph, for traversal
    pub fn graph(&self) -> &DiGraph<Resource, ReferenceKind> {
        &self.inner
    }

    pub(crate) fn node(id: NodeIndex) -> ResourceId {
        ResourceId(id)
    }
}

/// Split `…/<folder>/<name>.<ext>` into a resource type and raw name
pub fn parse_file_path(path: &str) -> Option<(ResourceType, &str)> {
    let name_slash = path.rfind('/')?;
    let folder_start = path[..name_slash].rfind('/').map(|i| i + 1).unwrap_or(0);
    let folder = &path[folder_start..name_slash];
    let file_name = &path[name_slash + 1..];
    if file_name.is_empty() {
        return None;
    }

    let resource_type = ResourceFolderType::from_folder_name(folder)?.primary_type()?;
    let name = file_name.split('.').next().unwrap_or(file_name);
    if name.is_empty() {
        return None;
    }

    Some((resource_type, name))
}
