mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::resource::{Resource, ResourceType};
use miette::{miette, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "terminal" | "text" => Ok(ReportFormat::Terminal),
            "json" => Ok(ReportFormat::Json),
            other => Err(miette!("Unknown report format '{}' (expected terminal or json)", other)),
        }
    }
}

/// A declared resource nothing reaches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedResource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    /// Files the resource is declared in
    pub files: Vec<PathBuf>,
}

impl UnusedResource {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            resource_type: resource.resource_type,
            name: resource.name.clone(),
            files: resource.locations.clone(),
        }
    }

    /// `@type/name`
    pub fn url(&self) -> String {
        format!("@{}/{}", self.resource_type, self.name)
    }
}

/// Reporter for unused resource results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
        }
    }

    pub fn report(&self, unused: &[UnusedResource]) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new();
                reporter.report(unused)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone());
                reporter.report(unused)
            }
        }
    }
}
