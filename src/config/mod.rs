//! Configuration
//!
//! Project settings for scanning: which files to visit and how many
//! workers to use. Loaded from `.goanno.config.json`.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".goanno.config.json";

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// File patterns to include (glob syntax, relative to the scan root)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// File patterns to exclude (glob syntax, relative to the scan root)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Skip `_test.go` files
    #[serde(default)]
    pub skip_tests: bool,

    /// Number of parallel workers (default: one per core)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            skip_tests: false,
            workers: None,
        }
    }
}

impl Config {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` when it exists, defaults otherwise. A present but
    /// unreadable or malformed file is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_include() -> Vec<String> {
    vec!["**/*.go".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        "vendor/**".to_string(),
        "**/vendor/**".to_string(),
        "**/testdata/**".to_string(),
        "**/.git/**".to_string(),
    ]
}
