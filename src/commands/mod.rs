//! CLI command implementations
//!
//! Each command is in its own submodule.

pub mod extract;
pub mod init;

pub use extract::{execute_extract, render, ExtractOptions, ExtractSummary};
pub use init::{execute_init, InitOptions};
