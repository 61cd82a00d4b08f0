//! Resource usage model
//!
//! [`ResourceUsageModel`] is fed parsed XML documents, non-XML resource files,
//! source code and manifests. It records declarations and references in a
//! [`ResourceRegistry`], collects keep/discard directives, and finally
//! computes which declared resources nothing reaches.
//!
//! Feeding happens in two phases: every file is visited first, then
//! [`ResourceUsageModel::resolve_directives`] runs once so that glob
//! directives see the complete set of names.

pub mod builder;
pub mod directives;
pub mod reachability;
mod recorder;

pub use builder::{BuildStats, ParallelUsageBuilder, UsageBuilder};
pub use directives::{Directive, DirectiveKind, ShrinkMode};
pub use reachability::{is_service_key, ReachabilityAnalyzer};

use crate::resource::registry::ReferenceKind;
use crate::resource::{Resource, ResourceFolderType, ResourceId, ResourceRegistry};
use crate::scanner::{
    CssScanner, HtmlScanner, JsScanner, MarkerScanner, NoopHook, SourceScanner, SourceToken,
    StringLiteralHook, WebToken,
};
use std::path::Path;
use tracing::{debug, trace};

/// Collects resource declarations and references for one analysis run
pub struct ResourceUsageModel<H = NoopHook> {
    registry: ResourceRegistry,

    /// Directives captured while visiting, applied by `resolve_directives`
    directives: Vec<Directive>,

    shrink_mode: ShrinkMode,

    /// Skip `tools:` attributes once directives have been captured from them
    ignore_tools_attributes: bool,

    /// Suffix for resources hoisted out of `aapt:attr`, reset per document
    inline_counter: usize,

    hook: H,
}

impl ResourceUsageModel<NoopHook> {
    pub fn new() -> Self {
        Self {
            registry: ResourceRegistry::new(),
            directives: Vec::new(),
            shrink_mode: ShrinkMode::default(),
            ignore_tools_attributes: true,
            inline_counter: 0,
            hook: NoopHook,
        }
    }
}

impl Default for ResourceUsageModel<NoopHook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: StringLiteralHook> ResourceUsageModel<H> {
    /// Replace the hook that receives unresolved string literals
    pub fn with_hook<T: StringLiteralHook>(self, hook: T) -> ResourceUsageModel<T> {
        ResourceUsageModel {
            registry: self.registry,
            directives: self.directives,
            shrink_mode: self.shrink_mode,
            ignore_tools_attributes: self.ignore_tools_attributes,
            inline_counter: self.inline_counter,
            hook,
        }
    }

    pub fn with_ignore_tools_attributes(mut self, ignore: bool) -> Self {
        self.ignore_tools_attributes = ignore;
        self
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        self.registry.get(id)
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn shrink_mode(&self) -> ShrinkMode {
        self.shrink_mode
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Queue a keep/discard directive until `resolve_directives`
    pub fn record_directive(&mut self, kind: DirectiveKind, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        trace!("Recorded {:?} directive: {}", kind, text);
        self.directives.push(Directive::new(kind, text));
    }

    /// Switch shrink mode; unrecognized values are ignored
    pub fn record_shrink_mode(&mut self, value: &str) {
        match ShrinkMode::parse(value) {
            Some(mode) => self.shrink_mode = mode,
            None => debug!("Ignoring unknown shrink mode '{}'", value),
        }
    }

    /// Apply every queued directive to the registry
    pub fn resolve_directives(&mut self) {
        directives::resolve(&mut self.registry, &self.directives);
    }

    /// Declare the resource a whole file in `folder` stands for
    ///
    /// Returns `None` for `values` files and for file names without a base name.
    pub fn declare_file_resource(
        &mut self,
        folder: ResourceFolderType,
        path: &Path,
    ) -> Option<ResourceId> {
        let resource_type = folder.primary_type()?;
        let file_name = path.file_name()?.to_str()?;
        let name = file_name.split('.').next().filter(|n| !n.is_empty())?;

        let id = self.registry.get_or_create(resource_type, name, None);
        let resource = self.registry.get_mut(id);
        resource.set_declared(true);
        resource.add_location(path.to_path_buf());
        Some(id)
    }

    /// Record a non-XML resource file (images, fonts, raw assets)
    ///
    /// Web documents, style sheets and scripts under `raw/` are scanned with
    /// the matching scanner, everything else for embedded resource paths.
    pub fn visit_binary_resource(&mut self, folder: ResourceFolderType, path: &Path, bytes: &[u8]) {
        let context = self.declare_file_resource(folder, path);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "html" | "htm" => self.scan_web_content(&String::from_utf8_lossy(bytes), context),
            "css" => self.scan_css(&String::from_utf8_lossy(bytes), context),
            "js" => self.scan_js(&String::from_utf8_lossy(bytes), context),
            _ => self.scan_binary(bytes, context),
        }
    }

    /// Resolve a path-style reference; returns whether it named a resource
    fn record_path_reference(&mut self, path: &str, context: Option<ResourceId>) -> bool {
        let Some(target) = self.registry.lookup_by_file_path(path) else {
            return false;
        };
        match context {
            Some(from) => {
                self.registry.add_reference(from, target, ReferenceKind::FilePath);
            }
            None => self.registry.get_mut(target).set_reachable(true),
        }
        true
    }

    /// Java or Kotlin source: `R.type.name` marks the resource reachable
    pub fn scan_source(&mut self, text: &str) {
        for token in SourceScanner::new(text) {
            match token {
                SourceToken::ResourceField {
                    resource_type,
                    name,
                } => {
                    let id = self.registry.get_or_create(resource_type, name, None);
                    self.registry.get_mut(id).set_reachable(true);
                }
                SourceToken::StringLiteral(value) => {
                    self.hook.on_unresolved_string_literal(value);
                }
            }
        }
    }

    /// HTML-like markup with embedded scripts and style sheets
    pub fn scan_web_content(&mut self, text: &str, context: Option<ResourceId>) {
        for token in HtmlScanner::new(text) {
            match token {
                WebToken::Url(value) => {
                    if !self.record_path_reference(value, context) {
                        self.hook.on_unresolved_string_literal(value);
                    }
                }
                WebToken::StringLiteral(value) => self.hook.on_unresolved_string_literal(value),
            }
        }
    }

    /// Style sheet `url(...)` references
    pub fn scan_css(&mut self, text: &str, context: Option<ResourceId>) {
        for value in CssScanner::new(text) {
            if !self.record_path_reference(value, context) {
                self.hook.on_unresolved_string_literal(value);
            }
        }
    }

    /// Script string literals go to the hook
    pub fn scan_js(&mut self, text: &str, _context: Option<ResourceId>) {
        for value in JsScanner::new(text) {
            self.hook.on_unresolved_string_literal(value);
        }
    }

    /// Embedded `android_res/...` paths in arbitrary bytes
    pub fn scan_binary(&mut self, bytes: &[u8], context: Option<ResourceId>) {
        for path in MarkerScanner::new(bytes) {
            self.record_path_reference(path, context);
        }
    }

    /// Embedded `android_res/...` paths in text of unknown format
    pub fn scan_text(&mut self, text: &str, context: Option<ResourceId>) {
        for path in MarkerScanner::from_text(text) {
            self.record_path_reference(path, context);
        }
    }

    /// Read a file and scan it like [`scan_binary`](Self::scan_binary)
    ///
    /// A file that cannot be read contributes nothing.
    pub fn scan_binary_file(&mut self, path: &Path, context: Option<ResourceId>) {
        match std::fs::read(path) {
            Ok(bytes) => self.scan_binary(&bytes, context),
            Err(e) => debug!("Could not read {}: {}", path.display(), e),
        }
    }

    /// Run the reachability closure and list declared, unreachable resources
    pub fn find_unused(&mut self) -> Vec<ResourceId> {
        ReachabilityAnalyzer::new().find_unused(&mut self.registry)
    }

    /// Every resource with its flags and outgoing references
    pub fn dump_resource_model(&self) -> String {
        let mut out = String::new();
        for (id, resource) in self.registry.resources() {
            let mut flags = Vec::new();
            if resource.is_declared() {
                flags.push("declared");
            }
            if resource.is_public() {
                flags.push("public");
            }
            if resource.is_keep() {
                flags.push("keep");
            }
            if resource.is_discard() {
                flags.push("discard");
            }
            if resource.is_reachable() {
                flags.push("reachable");
            }

            out.push_str(&resource.to_string());
            if let Some(value) = resource.value {
                out.push_str(&format!(" ({:#x})", value));
            }
            out.push_str(&format!(" [{}]\n", flags.join(", ")));

            for (target, kind) in self.registry.references(id) {
                out.push_str(&format!(
                    "    -> {} ({})\n",
                    self.registry.get(target),
                    kind.as_str()
                ));
            }
        }
        out
    }

    /// One `type/name#action,...` line per declared resource with any action
    pub fn dump_actions(&self) -> String {
        let mut out = String::new();
        for (_, resource) in self.registry.resources() {
            if !resource.is_declared() {
                continue;
            }
            let mut actions = Vec::new();
            if !resource.is_reachable() {
                actions.push("remove");
            }
            if self.registry.is_whitelisted(&resource.name) {
                actions.push("no_obfuscate");
            }
            if !actions.is_empty() {
                out.push_str(&format!("{}#{}\n", resource, actions.join(",")));
            }
        }
        out
    }

    /// Whitelisted names joined with commas
    pub fn dump_whitelist(&self) -> String {
        self.registry.whitelist().collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;
    use crate::scanner::StringPool;
    use std::path::PathBuf;

    fn declare<H: StringLiteralHook>(
        model: &mut ResourceUsageModel<H>,
        t: ResourceType,
        name: &str,
    ) -> ResourceId {
        let id = model.registry_mut().get_or_create(t, name, None);
        model.registry_mut().get_mut(id).set_declared(true);
        id
    }

    #[test]
    fn test_code_reference_marks_reachable() {
        let mut model = ResourceUsageModel::new();
        model.scan_source("int x = R.string.hello;");
        let id = model.registry().lookup(ResourceType::String, "hello").unwrap();
        assert!(model.resource(id).is_reachable());
    }

    #[test]
    fn test_css_reference_with_and_without_context() {
        let mut model = ResourceUsageModel::new();
        let bg = declare(&mut model, ResourceType::Drawable, "bg");
        let page = declare(&mut model, ResourceType::Raw, "page");
        let css = ".bg { background: url('android_res/drawable/bg.png'); }";

        model.scan_css(css, Some(page));
        assert_eq!(model.registry().references(page), vec![(bg, ReferenceKind::FilePath)]);
        assert!(!model.resource(bg).is_reachable());

        model.scan_css(css, None);
        assert!(model.resource(bg).is_reachable());
    }

    #[test]
    fn test_declare_file_resource() {
        let mut model = ResourceUsageModel::new();
        let path = PathBuf::from("res/drawable-hdpi/ic_launcher.9.png");
        let id = model
            .declare_file_resource(ResourceFolderType::Drawable, &path)
            .unwrap();
        assert_eq!(model.resource(id).to_string(), "drawable/ic_launcher");
        assert_eq!(model.resource(id).locations, vec![path]);
        assert!(model
            .declare_file_resource(ResourceFolderType::Values, Path::new("res/values/strings.xml"))
            .is_none());
    }

    #[test]
    fn test_binary_resource_dispatch() {
        let mut model = ResourceUsageModel::new().with_hook(StringPool::new());
        let bg = declare(&mut model, ResourceType::Drawable, "bg");

        let html = b"<img src=\"file:///android_res/drawable/bg.png\"><script>load('intro');</script>";
        model.visit_binary_resource(ResourceFolderType::Raw, Path::new("res/raw/help.html"), html);
        let help = model.registry().lookup(ResourceType::Raw, "help").unwrap();
        assert_eq!(model.registry().references(help), vec![(bg, ReferenceKind::FilePath)]);
        assert_eq!(model.hook().strings().collect::<Vec<_>>(), vec!["intro"]);

        let blob = b"\x00\x01android_res/drawable/bg.png\x00";
        model.visit_binary_resource(ResourceFolderType::Raw, Path::new("res/raw/data.bin"), blob);
        let data = model.registry().lookup(ResourceType::Raw, "data").unwrap();
        assert_eq!(model.registry().references(data), vec![(bg, ReferenceKind::FilePath)]);
    }

    #[test]
    fn test_scan_binary_file_missing() {
        let mut model = ResourceUsageModel::new();
        model.scan_binary_file(Path::new("/definitely/not/here.bin"), None);
        assert!(model.registry().is_empty());
    }

    #[test]
    fn test_shrink_mode_last_recognized_wins() {
        let mut model = ResourceUsageModel::new();
        model.record_shrink_mode("strict");
        model.record_shrink_mode("bogus");
        assert_eq!(model.shrink_mode(), ShrinkMode::Strict);
        model.record_shrink_mode("safe");
        assert_eq!(model.shrink_mode(), ShrinkMode::Safe);
    }

    #[test]
    fn test_dumps() {
        let mut model = ResourceUsageModel::new();
        let main = declare(&mut model, ResourceType::Layout, "main");
        let icon = declare(&mut model, ResourceType::Drawable, "icon");
        declare(&mut model, ResourceType::Drawable, "unused");
        model.registry_mut().add_reference(main, icon, ReferenceKind::Attribute);
        model.record_directive(DirectiveKind::Keep, "@layout/main");
        model.resolve_directives();
        model.find_unused();

        let dump = model.dump_resource_model();
        assert!(dump.contains("layout/main [declared, keep, reachable]\n    -> drawable/icon (attribute)\n"));
        assert_eq!(
            model.dump_actions(),
            "layout/main#no_obfuscate\ndrawable/unused#remove\n"
        );
        assert_eq!(model.dump_whitelist(), "main");
    }

    #[test]
    fn test_scan_text_markers() {
        let mut model = ResourceUsageModel::new();
        let font = declare(&mut model, ResourceType::Font, "brand");
        let notes = declare(&mut model, ResourceType::Raw, "notes");

        model.scan_text("see android_res/font/brand.ttf and android_res/font/missing.ttf", Some(notes));
        assert_eq!(model.registry().references(notes), vec![(font, ReferenceKind::FilePath)]);
        assert!(model.registry().lookup(ResourceType::Font, "missing").is_none());
    }
}
