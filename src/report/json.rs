use super::UnusedResource;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn render(&self, unused: &[UnusedResource]) -> Result<String> {
        let report = JsonReport::from_unused(unused);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }

    pub fn report(&self, unused: &[UnusedResource]) -> Result<()> {
        let json = self.render(unused)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_unused: usize,
    resources: Vec<JsonResource<'a>>,
    /// type name -> count
    by_type: BTreeMap<&'static str, usize>,
}

#[derive(Serialize)]
struct JsonResource<'a> {
    url: String,
    #[serde(flatten)]
    resource: &'a UnusedResource,
}

impl<'a> JsonReport<'a> {
    fn from_unused(unused: &'a [UnusedResource]) -> Self {
        let mut by_type = BTreeMap::new();
        let resources = unused
            .iter()
            .map(|resource| {
                *by_type.entry(resource.resource_type.name()).or_insert(0) += 1;
                JsonResource {
                    url: resource.url(),
                    resource,
                }
            })
            .collect();

        Self {
            version: "1.0",
            total_unused: unused.len(),
            resources,
            by_type,
        }
    }
}
