//! shrinkres - unused resource detection for Android projects
//!
//! This library builds a graph of resource declarations and references from
//! resource XML, web assets, binary files, manifests and Kotlin/Java source,
//! then reports the declared resources that nothing reaches.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find manifests, `res/` files and sources
//! 2. **Recording** - Walk XML trees and scan other content into a [`ResourceUsageModel`]
//! 3. **Directives** - Apply `tools:keep` / `tools:discard` once every name is known
//! 4. **Reachability Analysis** - Propagate reachability from the roots
//! 5. **Reporting** - Output the unused resources

pub mod config;
pub mod discovery;
pub mod report;
pub mod resource;
pub mod scanner;
pub mod usage;
pub mod xml;

pub use config::Config;
pub use discovery::{FileFinder, FileType, SourceFile};
pub use report::{ReportFormat, Reporter, UnusedResource};
pub use resource::{Resource, ResourceFolderType, ResourceId, ResourceRegistry, ResourceType};
pub use scanner::{NoopHook, StringLiteralHook, StringPool};
pub use usage::{
    DirectiveKind, ParallelUsageBuilder, ReachabilityAnalyzer, ResourceUsageModel, ShrinkMode,
    UsageBuilder,
};
pub use xml::XmlDocument;
