//! Directory scanning
//!
//! Walks a project, picks Go files by the configured globs, and runs the
//! annotation visitor over each file. Files are processed in parallel, one
//! parser and one traversal per file.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use glob::Pattern;
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::annotation::Annotations;
use crate::ast::{GoParser, NodeKind, SourceFile};
use crate::config::Config;
use crate::error::Result;
use crate::visit::{annotate, Handlers};

/// Annotations dispatched for one node, tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAnnotations {
    pub kind: NodeKind,
    pub annotations: Annotations,
}

/// Everything found in one file, in traversal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub nodes: Vec<NodeAnnotations>,
}

impl FileReport {
    pub fn of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Annotations> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.kind == kind)
            .map(|n| &n.annotations)
    }

    /// Total annotation entries across all nodes
    pub fn annotation_count(&self) -> usize {
        self.nodes.iter().map(|n| n.annotations.len()).sum()
    }
}

/// Collect every annotation set the visitor dispatches for `file`
pub fn collect(file: &SourceFile) -> Vec<NodeAnnotations> {
    let found = RefCell::new(Vec::new());
    let record = |kind: NodeKind| {
        let found = &found;
        move |_: tree_sitter::Node<'_>, annotations: Annotations| {
            found
                .borrow_mut()
                .push(NodeAnnotations { kind, annotations });
        }
    };
    let handlers = Handlers::new()
        .on_file(record(NodeKind::File))
        .on_field(record(NodeKind::Field))
        .on_func_decl(record(NodeKind::FuncDecl))
        .on_type(record(NodeKind::Type));
    annotate(file, handlers);
    found.into_inner()
}

/// Parse in-memory source and collect its annotations
pub fn extract_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Result<FileReport> {
    let mut parser = GoParser::new()?;
    let file = parser.parse(source)?;
    Ok(FileReport {
        path: path.into(),
        nodes: collect(&file),
    })
}

/// Project scanner with parallel file processing
pub struct Scanner {
    config: Config,
}

impl Scanner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scan a directory, or a single file, and report the annotations of
    /// every file that has any. Reports are sorted by path.
    pub fn scan<P: AsRef<Path>>(&self, root: P) -> Result<Vec<FileReport>> {
        let root = root.as_ref();
        let files = self.find_files(root)?;
        debug!(root = %root.display(), files = files.len(), "scanning");

        // Fail early on a broken grammar instead of once per file
        GoParser::new()?;

        let run = || {
            files
                .par_iter()
                .map_init(GoParser::new, |parser, path| {
                    let parser = parser.as_mut().ok()?;
                    scan_file(parser, path)
                })
                .flatten()
                .collect::<Vec<_>>()
        };

        let mut reports = match self.config.workers {
            Some(workers) => rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()?
                .install(run),
            None => run(),
        };

        reports.retain(|report| !report.nodes.is_empty());
        reports.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(reports)
    }

    /// Files under `root` matching include patterns and no exclude pattern.
    /// A file given directly as `root` is returned as is.
    pub fn find_files<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let include_patterns = compile(&self.config.include)?;
        let exclude_patterns = compile(&self.config.exclude)?;
        let match_opts = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                // Patterns match against the path relative to root
                let relative_path = e
                    .path()
                    .strip_prefix(root)
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|_| e.path().to_string_lossy().to_string());

                let included = include_patterns.is_empty()
                    || include_patterns
                        .iter()
                        .any(|p| p.matches_with(&relative_path, match_opts));
                let excluded = exclude_patterns
                    .iter()
                    .any(|p| p.matches_with(&relative_path, match_opts));
                let skipped_test = self.config.skip_tests && relative_path.ends_with("_test.go");

                if included && !excluded && !skipped_test {
                    Some(e.into_path())
                } else {
                    None
                }
            })
            .collect();

        files.sort();
        Ok(files)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(Into::into))
        .collect()
}

fn scan_file(parser: &mut GoParser, path: &Path) -> Option<FileReport> {
    let file = match parser.parse_file(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };
    if file.has_errors() {
        debug!(path = %path.display(), "syntax errors, extracting from recovered tree");
    }
    Some(FileReport {
        path: path.to_path_buf(),
        nodes: collect(&file),
    })
}
