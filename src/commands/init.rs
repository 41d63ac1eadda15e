//! `goanno init`: write a config file with the default settings,
//! optionally overridden from the command line.

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;

use crate::config::{Config, CONFIG_FILE};

/// Options for the init command
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Where to write the config
    pub path: PathBuf,
    /// Force overwrite existing config
    pub force: bool,
    /// File patterns to include
    pub include: Vec<String>,
    /// File patterns to exclude
    pub exclude: Vec<String>,
    /// Skip `_test.go` files
    pub skip_tests: bool,
    /// Number of parallel workers
    pub workers: Option<usize>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(CONFIG_FILE),
            force: false,
            include: Vec::new(),
            exclude: Vec::new(),
            skip_tests: false,
            workers: None,
        }
    }
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<Config> {
    if options.path.exists() && !options.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            options.path.display()
        );
    }

    let mut config = Config::default();
    if !options.include.is_empty() {
        config.include = options.include;
    }
    if !options.exclude.is_empty() {
        config.exclude = options.exclude;
    }
    config.skip_tests = options.skip_tests;
    config.workers = options.workers;

    config.save(&options.path)?;
    println!(
        "{} Created {}",
        style("✓").green(),
        options.path.display()
    );
    Ok(config)
}
