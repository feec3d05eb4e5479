//! `.depstage.toml` configuration.
//!
//! ```toml
//! [build]
//! dangling = "fail"      # or "ignore" (default)
//!
//! [output]
//! format = "text"        # pretty | text | json
//!
//! [report]
//! fan_in_threshold = 2
//! ```
//!
//! Every section and key is optional. Command-line flags override the file.

use anyhow::{Context, Result};
use depstage_core::graph::{BuildOptions, FAN_IN_THRESHOLD};
use serde::Deserialize;
use std::path::Path;

use crate::output::OutputMode;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = ".depstage.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub build: BuildOptions,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: Option<OutputMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Nodes with more dependencies than this are flagged in reports.
    #[serde(default = "default_fan_in_threshold")]
    pub fan_in_threshold: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fan_in_threshold: default_fan_in_threshold(),
        }
    }
}

const fn default_fan_in_threshold() -> usize {
    FAN_IN_THRESHOLD
}

/// Load configuration.
///
/// An explicit path must exist. Without one, `.depstage.toml` in
/// `working_dir` is used when present, else defaults.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = working_dir.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(Config::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<Config>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
