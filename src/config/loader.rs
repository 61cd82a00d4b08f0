use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a shrinkres run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories to scan, relative to the project root
    pub targets: Vec<PathBuf>,

    /// Path patterns skipped during discovery
    pub exclude: Vec<String>,

    /// Extra keep directives, same syntax as `tools:keep`
    pub keep: Vec<String>,

    /// Extra discard directives, same syntax as `tools:discard`
    pub discard: Vec<String>,

    /// `safe` or `strict`, same as `tools:shrinkMode`
    pub shrink_mode: Option<String>,

    /// Skip `tools:` attributes other than directives
    pub ignore_tools_attributes: bool,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec![],
            exclude: vec![
                "**/build/**".to_string(),
                "**/.gradle/**".to_string(),
                "**/.idea/**".to_string(),
            ],
            keep: vec![],
            discard: vec![],
            shrink_mode: None,
            ignore_tools_attributes: true,
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".shrinkres.yml",
            ".shrinkres.yaml",
            ".shrinkres.toml",
            "shrinkres.yml",
            "shrinkres.yaml",
            "shrinkres.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check whether a path matches one of the exclusion patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude
            .iter()
            .any(|pattern| glob_match(pattern, &path_str))
    }
}

/// Path matching for patterns like `**/build/**`, `**/*.png` or `res/raw/**`
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern.contains("**") {
        // `**/name/**`: `name` is a whole directory somewhere in the path
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern.trim_start_matches("**/").trim_end_matches("/**");
            let dir_pattern = format!("/{}/", dir_name);
            return text.contains(&dir_pattern) || text.starts_with(&dir_pattern[1..]);
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            let prefix_ok = prefix.is_empty()
                || text.starts_with(prefix)
                || text.contains(&format!("/{}/", prefix));
            let suffix_ok = suffix.is_empty() || suffix_match(suffix, text);
            return prefix_ok && suffix_ok;
        }
    }

    text == pattern
}

/// `*.png` matches any file name with that extension, anything else a path tail
fn suffix_match(suffix: &str, text: &str) -> bool {
    match suffix.strip_prefix('*') {
        Some(tail) if !tail.contains('/') => text.ends_with(tail),
        _ => text.ends_with(suffix) || text.contains(&format!("/{}", suffix)),
    }
}
