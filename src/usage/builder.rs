// Feeding discovered files into a usage model, sequentially or with rayon

use super::ResourceUsageModel;
use crate::discovery::{FileType, SourceFile};
use crate::resource::ResourceFolderType;
use crate::scanner::StringLiteralHook;
use crate::xml::XmlDocument;
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// File contents ready to be recorded
enum LoadedFile {
    Source(String),
    Manifest(XmlDocument),
    /// Parsed resource XML
    Document(ResourceFolderType, XmlDocument),
    /// Anything else in a resource folder, including XML that failed to parse
    Binary(ResourceFolderType, Vec<u8>),
}

/// Counts of what was recorded
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub source_files: usize,
    pub manifests: usize,
    pub xml_documents: usize,
    pub binary_resources: usize,
    pub failed: usize,
}

impl BuildStats {
    pub fn total(&self) -> usize {
        self.source_files + self.manifests + self.xml_documents + self.binary_resources
    }
}

fn load(file: &SourceFile) -> Result<LoadedFile> {
    match file.file_type {
        FileType::Kotlin | FileType::Java => Ok(LoadedFile::Source(file.read_contents()?)),
        FileType::Manifest => XmlDocument::read(&file.path)
            .map(LoadedFile::Manifest)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to load manifest {}", file.path.display())),
        FileType::Resource(folder) => {
            let bytes = file.read_bytes()?;
            if !file.is_xml() {
                return Ok(LoadedFile::Binary(folder, bytes));
            }
            match std::str::from_utf8(&bytes).map(XmlDocument::parse) {
                Ok(Ok(document)) => Ok(LoadedFile::Document(folder, document)),
                Ok(Err(e)) => {
                    warn!("Malformed XML in {}: {}", file.path.display(), e);
                    Ok(LoadedFile::Binary(folder, bytes))
                }
                Err(_) => Ok(LoadedFile::Binary(folder, bytes)),
            }
        }
    }
}

/// Declare every whole-file resource up front
///
/// Path-style references only resolve against declared files, so this makes
/// the result independent of the order files are visited in.
fn declare_files<H: StringLiteralHook>(model: &mut ResourceUsageModel<H>, files: &[SourceFile]) {
    for file in files {
        if let FileType::Resource(folder) = file.file_type {
            model.declare_file_resource(folder, &file.path);
        }
    }
}

fn record<H: StringLiteralHook>(
    model: &mut ResourceUsageModel<H>,
    file: &SourceFile,
    loaded: LoadedFile,
    stats: &mut BuildStats,
) {
    match loaded {
        LoadedFile::Source(text) => {
            debug!("Scanning source: {}", file.path.display());
            model.scan_source(&text);
            stats.source_files += 1;
        }
        LoadedFile::Manifest(document) => {
            debug!("Recording manifest: {}", file.path.display());
            model.record_manifest_usages(&document);
            stats.manifests += 1;
        }
        LoadedFile::Document(folder, document) => {
            model.visit_xml_document(folder, &file.path, &document);
            stats.xml_documents += 1;
        }
        LoadedFile::Binary(folder, bytes) => {
            model.visit_binary_resource(folder, &file.path, &bytes);
            stats.binary_resources += 1;
        }
    }
}

/// Sequential builder: reads, parses and records one file at a time
pub struct UsageBuilder;

impl UsageBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Record every file into `model`; unreadable files are skipped
    pub fn build<H: StringLiteralHook>(
        &self,
        model: &mut ResourceUsageModel<H>,
        files: &[SourceFile],
    ) -> BuildStats {
        self.build_with_progress(model, files, |_| {})
    }

    /// Like [`build`](Self::build), calling `on_file` after each file
    pub fn build_with_progress<H, F>(
        &self,
        model: &mut ResourceUsageModel<H>,
        files: &[SourceFile],
        mut on_file: F,
    ) -> BuildStats
    where
        H: StringLiteralHook,
        F: FnMut(&SourceFile),
    {
        let mut stats = BuildStats::default();
        declare_files(model, files);

        for file in files {
            on_file(file);
            match load(file) {
                Ok(loaded) => record(model, file, loaded, &mut stats),
                Err(e) => {
                    warn!("Skipping {}: {}", file.path.display(), e);
                    stats.failed += 1;
                }
            }
        }

        info!("Recorded {} files ({} skipped)", stats.total(), stats.failed);
        stats
    }
}

impl Default for UsageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parallel builder: reads and parses on the rayon pool, records in order
pub struct ParallelUsageBuilder;

impl ParallelUsageBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build<H: StringLiteralHook>(
        &self,
        model: &mut ResourceUsageModel<H>,
        files: &[SourceFile],
    ) -> BuildStats {
        info!("Loading {} files in parallel...", files.len());

        let loaded: Vec<Result<LoadedFile>> = files.par_iter().map(load).collect();

        let mut stats = BuildStats::default();
        declare_files(model, files);

        for (file, result) in files.iter().zip(loaded) {
            match result {
                Ok(loaded) => record(model, file, loaded, &mut stats),
                Err(e) => {
                    warn!("Skipping {}: {}", file.path.display(), e);
                    stats.failed += 1;
                }
            }
        }

        info!("Recorded {} files ({} skipped)", stats.total(), stats.failed);
        stats
    }
}

impl Default for ParallelUsageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
