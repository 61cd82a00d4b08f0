//! Resource model
//!
//! Types describing Android-style resources: what kind of resource a node is,
//! which folder kind a file lives in, and the per-resource node stored in the
//! registry.

pub mod glob;
pub mod registry;
pub mod url;

pub use glob::GlobMatcher;
pub use registry::ResourceRegistry;
pub use url::ResourceUrl;

use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::path::PathBuf;

/// Kind of resource, as it appears in the generated `R` class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Anim,
    Animator,
    Array,
    Attr,
    Bool,
    Color,
    Dimen,
    Drawable,
    Font,
    Fraction,
    Id,
    Integer,
    Interpolator,
    Layout,
    Menu,
    Mipmap,
    Navigation,
    Plurals,
    Raw,
    String,
    Style,
    Styleable,
    Transition,
    Xml,
}

impl ResourceType {
    pub const ALL: [ResourceType; 24] = [
        ResourceType::Anim,
        ResourceType::Animator,
        ResourceType::Array,
        ResourceType::Attr,
        ResourceType::Bool,
        ResourceType::Color,
        ResourceType::Dimen,
        ResourceType::Drawable,
        ResourceType::Font,
        ResourceType::Fraction,
        ResourceType::Id,
        ResourceType::Integer,
        ResourceType::Interpolator,
        ResourceType::Layout,
        ResourceType::Menu,
        ResourceType::Mipmap,
        ResourceType::Navigation,
        ResourceType::Plurals,
        ResourceType::Raw,
        ResourceType::String,
        ResourceType::Style,
        ResourceType::Styleable,
        ResourceType::Transition,
        ResourceType::Xml,
    ];

    /// Name used in resource URLs and as the nested `R` class name
    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::Anim => "anim",
            ResourceType::Animator => "animator",
            ResourceType::Array => "array",
            ResourceType::Attr => "attr",
            ResourceType::Bool => "bool",
            ResourceType::Color => "color",
            ResourceType::Dimen => "dimen",
            ResourceType::Drawable => "drawable",
            ResourceType::Font => "font",
            ResourceType::Fraction => "fraction",
            ResourceType::Id => "id",
            ResourceType::Integer => "integer",
            ResourceType::Interpolator => "interpolator",
            ResourceType::Layout => "layout",
            ResourceType::Menu => "menu",
            ResourceType::Mipmap => "mipmap",
            ResourceType::Navigation => "navigation",
            ResourceType::Plurals => "plurals",
            ResourceType::Raw => "raw",
            ResourceType::String => "string",
            ResourceType::Style => "style",
            ResourceType::Styleable => "styleable",
            ResourceType::Transition => "transition",
            ResourceType::Xml => "xml",
        }
    }

    /// Parse the type segment of a resource URL or `R.<type>.<name>` access
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Map a tag inside a `<resources>` document to the type it declares
    pub fn from_values_tag(tag: &str) -> Option<Self> {
        match tag {
            "string-array" | "integer-array" | "array" => Some(ResourceType::Array),
            "declare-styleable" => Some(ResourceType::Styleable),
            "eat-comment" | "skip" | "item" | "public" => None,
            other => Self::from_name(other),
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of folder a resource file lives in (`res/<kind>[-qualifiers]/`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFolderType {
    Anim,
    Animator,
    Color,
    Drawable,
    Font,
    Interpolator,
    Layout,
    Menu,
    Mipmap,
    Navigation,
    Raw,
    Transition,
    Values,
    Xml,
}

impl ResourceFolderType {
    /// Parse a folder name, ignoring configuration qualifiers
    ///
    /// `drawable-hdpi-v21` yields [`ResourceFolderType::Drawable`].
    pub fn from_folder_name(folder: &str) -> Option<Self> {
        let kind = folder.split('-').next()?;
        match kind {
            "anim" => Some(ResourceFolderType::Anim),
            "animator" => Some(ResourceFolderType::Animator),
            "color" => Some(ResourceFolderType::Color),
            "drawable" => Some(ResourceFolderType::Drawable),
            "font" => Some(ResourceFolderType::Font),
            "interpolator" => Some(ResourceFolderType::Interpolator),
            "layout" => Some(ResourceFolderType::Layout),
            "menu" => Some(ResourceFolderType::Menu),
            "mipmap" => Some(ResourceFolderType::Mipmap),
            "navigation" => Some(ResourceFolderType::Navigation),
            "raw" => Some(ResourceFolderType::Raw),
            "transition" => Some(ResourceFolderType::Transition),
            "values" => Some(ResourceFolderType::Values),
            "xml" => Some(ResourceFolderType::Xml),
            _ => None,
        }
    }

    /// Type of the resource a whole file in this folder declares
    ///
    /// `values` files declare many resources of their own and have none.
    pub fn primary_type(&self) -> Option<ResourceType> {
        match self {
            ResourceFolderType::Anim => Some(ResourceType::Anim),
            ResourceFolderType::Animator => Some(ResourceType::Animator),
            ResourceFolderType::Color => Some(ResourceType::Color),
            ResourceFolderType::Drawable => Some(ResourceType::Drawable),
            ResourceFolderType::Font => Some(ResourceType::Font),
            ResourceFolderType::Interpolator => Some(ResourceType::Interpolator),
            ResourceFolderType::Layout => Some(ResourceType::Layout),
            ResourceFolderType::Menu => Some(ResourceType::Menu),
            ResourceFolderType::Mipmap => Some(ResourceType::Mipmap),
            ResourceFolderType::Navigation => Some(ResourceType::Navigation),
            ResourceFolderType::Raw => Some(ResourceType::Raw),
            ResourceFolderType::Transition => Some(ResourceType::Transition),
            ResourceFolderType::Xml => Some(ResourceType::Xml),
            ResourceFolderType::Values => None,
        }
    }

    pub fn is_values(&self) -> bool {
        matches!(self, ResourceFolderType::Values)
    }
}

/// Canonical lookup key for a raw resource name
///
/// Mirrors how resource names become `R` field names: `.`, `-` and `:` all
/// turn into `_`. Case is preserved.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '.' | '-' | ':' => '_',
            other => other,
        })
        .collect()
}

/// Handle to a resource owned by a [`ResourceRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub(crate) NodeIndex);

impl ResourceId {
    /// Position in registry insertion order
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

/// Boolean state of a resource packed into a bitset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceFlags(u8);

impl ResourceFlags {
    pub const DECLARED: u8 = 1 << 0;
    pub const PUBLIC: u8 = 1 << 1;
    pub const KEEP: u8 = 1 << 2;
    pub const DISCARD: u8 = 1 << 3;
    pub const REACHABLE: u8 = 1 << 4;

    pub fn contains(&self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// A declared or referenced resource
#[derive(Debug, Clone)]
pub struct Resource {
    pub resource_type: ResourceType,

    /// Normalized name
    pub name: String,

    /// Numeric id from the generated id table, if known
    pub value: Option<i32>,

    flags: ResourceFlags,

    /// Files this resource was declared in
    pub locations: Vec<PathBuf>,
}

impl Resource {
    pub fn new(resource_type: ResourceType, name: &str, value: Option<i32>) -> Self {
        Self {
            resource_type,
            name: normalize_name(name),
            value,
            flags: ResourceFlags::default(),
            locations: Vec::new(),
        }
    }

    pub fn flags(&self) -> ResourceFlags {
        self.flags
    }

    pub fn is_declared(&self) -> bool {
        self.flags.contains(ResourceFlags::DECLARED)
    }

    pub fn set_declared(&mut self, on: bool) {
        self.flags.set(ResourceFlags::DECLARED, on);
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(ResourceFlags::PUBLIC)
    }

    pub fn set_public(&mut self, on: bool) {
        self.flags.set(ResourceFlags::PUBLIC, on);
    }

    pub fn is_keep(&self) -> bool {
        self.flags.contains(ResourceFlags::KEEP)
    }

    pub fn set_keep(&mut self, on: bool) {
        self.flags.set(ResourceFlags::KEEP, on);
    }

    pub fn is_discard(&self) -> bool {
        self.flags.contains(ResourceFlags::DISCARD)
    }

    pub fn set_discard(&mut self, on: bool) {
        self.flags.set(ResourceFlags::DISCARD, on);
    }

    pub fn is_reachable(&self) -> bool {
        self.flags.contains(ResourceFlags::REACHABLE)
    }

    pub fn set_reachable(&mut self, on: bool) {
        self.flags.set(ResourceFlags::REACHABLE, on);
    }

    /// Record a declaring file, ignoring duplicates
    pub fn add_location(&mut self, file: PathBuf) {
        if !self.locations.contains(&file) {
            self.locations.push(file);
        }
    }

    /// `@type/name` form, used in dumps and reports
    pub fn url(&self) -> String {
        format!("@{}/{}", self.resource_type, self.name)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.name)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type && self.name == other.name
    }
}

impl Eq for Resource {}

impl std::hash::Hash for Resource {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.resource_type.hash(state);
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trips_through_name() {
        for t in ResourceType::ALL {
            assert_eq!(ResourceType::from_name(t.name()), Some(t));
        }
        assert_eq!(ResourceType::from_name("strings"), None);
    }

    #[test]
    fn test_values_tags() {
        assert_eq!(ResourceType::from_values_tag("string-array"), Some(ResourceType::Array));
        assert_eq!(ResourceType::from_values_tag("declare-styleable"), Some(ResourceType::Styleable));
        assert_eq!(ResourceType::from_values_tag("dimen"), Some(ResourceType::Dimen));
        assert_eq!(ResourceType::from_values_tag("item"), None);
        assert_eq!(ResourceType::from_values_tag("resources"), None);
    }

    #[test]
    fn test_folder_with_qualifiers() {
        assert_eq!(
            ResourceFolderType::from_folder_name("drawable-hdpi-v21"),
            Some(ResourceFolderType::Drawable)
        );
        assert_eq!(
            ResourceFolderType::from_folder_name("values-night"),
            Some(ResourceFolderType::Values)
        );
        assert_eq!(ResourceFolderType::from_folder_name("assets"), None);
        assert_eq!(ResourceFolderType::Values.primary_type(), None);
        assert_eq!(ResourceFolderType::Mipmap.primary_type(), Some(ResourceType::Mipmap));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Theme.App.Dark"), "Theme_App_Dark");
        assert_eq!(normalize_name("icon-large"), "icon_large");
        assert_eq!(normalize_name("Icon"), "Icon");
    }

    #[test]
    fn test_flags() {
        let mut resource = Resource::new(ResourceType::Drawable, "icon", None);
        assert!(!resource.is_reachable());
        resource.set_reachable(true);
        resource.set_keep(true);
        assert!(resource.is_reachable());
        assert!(resource.is_keep());
        resource.set_reachable(false);
        assert!(!resource.is_reachable());
        assert!(resource.is_keep());
    }

    #[test]
    fn test_equality_uses_normalized_name() {
        let a = Resource::new(ResourceType::Style, "Theme.App", None);
        let b = Resource::new(ResourceType::Style, "Theme_App", Some(7));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "style/Theme_App");
    }
}
