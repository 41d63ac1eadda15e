//! `goanno extract`: print the annotations found under one or more paths.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::annotation::Annotation;
use crate::ast::NodeKind;
use crate::config::Config;
use crate::scan::{FileReport, NodeAnnotations, Scanner};

/// Options for the extract command
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Files or directories to scan
    pub paths: Vec<PathBuf>,
    /// Only show these node kinds (empty: all)
    pub kinds: Vec<NodeKind>,
    /// Only show these annotation keys (empty: all)
    pub keys: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            kinds: Vec::new(),
            keys: Vec::new(),
        }
    }
}

impl ExtractOptions {
    fn wants_kind(&self, kind: NodeKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    fn wants_key(&self, key: &str) -> bool {
        self.keys.is_empty() || self.keys.iter().any(|k| k == key)
    }

    /// Entries of `node` that pass the filters, `None` when nothing is left
    fn select<'a>(&self, node: &'a NodeAnnotations) -> Option<Vec<&'a Annotation>> {
        if !self.wants_kind(node.kind) {
            return None;
        }
        let entries: Vec<_> = node
            .annotations
            .iter()
            .filter(|a| self.wants_key(&a.key))
            .collect();
        // A documented node without annotations is still worth listing when unfiltered
        if entries.is_empty() && !self.keys.is_empty() {
            return None;
        }
        Some(entries)
    }
}

/// Totals printed after an extract run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub nodes: usize,
    pub annotations: usize,
}

/// Execute the extract command
pub fn execute_extract(options: ExtractOptions, config: Config) -> Result<ExtractSummary> {
    let scanner = Scanner::new(config);
    let mut summary = ExtractSummary::default();

    for path in &options.paths {
        println!("{} Scanning {}...", style("→").cyan(), path.display());
        for report in scanner.scan(path)? {
            let Some(rendered) = render(&report, &options, &mut summary) else {
                continue;
            };
            print!("{}", rendered);
        }
    }

    println!(
        "{} {} annotations on {} nodes in {} files",
        style("✓").green(),
        summary.annotations,
        summary.nodes,
        summary.files
    );
    Ok(summary)
}

/// Render one file report, or `None` when the filters leave nothing
pub fn render(
    report: &FileReport,
    options: &ExtractOptions,
    summary: &mut ExtractSummary,
) -> Option<String> {
    let mut out = String::new();
    let mut nodes = 0;
    let mut annotations = 0;

    for node in &report.nodes {
        let Some(entries) = options.select(node) else {
            continue;
        };
        let target = &node.annotations.node;
        let _ = writeln!(
            out,
            "  {} {} ({})",
            style(node.kind).cyan(),
            target.name.as_deref().unwrap_or("_"),
            target.start
        );
        for annotation in &entries {
            write_annotation(&mut out, annotation);
        }
        nodes += 1;
        annotations += entries.len();
    }

    if nodes == 0 {
        return None;
    }
    summary.files += 1;
    summary.nodes += nodes;
    summary.annotations += annotations;
    Some(format!("{}\n{}", style(report.path.display()).bold(), out))
}

/// `@key value`, continuation lines of multi-line values aligned under
/// the first value character
fn write_annotation(out: &mut String, annotation: &Annotation) {
    let indent = " ".repeat(4 + 1 + annotation.key.len() + 1);
    let value = annotation.value.replace('\n', &format!("\n{}", indent));
    let _ = writeln!(
        out,
        "    {} {}",
        style(format!("@{}", annotation.key)).green(),
        value
    );
}
