use super::UnusedResource;
use crate::resource::ResourceType;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;

/// Terminal reporter with colored output, grouped by resource type
///
/// Each resource is followed by the files that declare it.
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, unused: &[UnusedResource]) -> Result<()> {
        print!("{}", self.render(unused));
        Ok(())
    }

    pub fn render(&self, unused: &[UnusedResource]) -> String {
        let mut out = String::new();

        if unused.is_empty() {
            out.push_str(&format!("{}\n", "No unused resources found!".green().bold()));
            return out;
        }

        let mut by_type: BTreeMap<ResourceType, Vec<&UnusedResource>> = BTreeMap::new();
        for item in unused {
            by_type.entry(item.resource_type).or_default().push(item);
        }

        out.push('\n');
        out.push_str(&format!(
            "{}\n\n",
            format!("Found {} unused resources:", unused.len())
                .yellow()
                .bold()
        ));

        for (resource_type, items) in &by_type {
            out.push_str(&format!(
                "{} {}\n",
                resource_type.name().cyan().bold(),
                format!("({})", items.len()).dimmed()
            ));
            for item in items {
                out.push_str(&format!("  {}\n", item.url()));
                for file in &item.files {
                    out.push_str(&format!(
                        "    {} {}\n",
                        "→".dimmed(),
                        file.display().to_string().dimmed()
                    ));
                }
            }
            out.push('\n');
        }

        out.push_str(&format!("{}\n", "─".repeat(60).dimmed()));
        let summary: Vec<String> = by_type
            .iter()
            .map(|(resource_type, items)| format!("{} {}", items.len(), resource_type))
            .collect();
        out.push_str(&format!("Summary: {}\n", summary.join(", ")));
        out
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
