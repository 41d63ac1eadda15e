//! Go syntax layer
//!
//! Wraps the tree-sitter Go grammar: parsing, node classification, and
//! attaching doc comment groups to declarations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tree_sitter::{Node, Parser, Point, Tree};

use crate::error::{AnnotationError, Result};

/// Declaration category that decides which handler receives a node's annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// The file itself, documented by the comment above `package`
    File,
    /// Struct field or interface element
    Field,
    /// Function or method declaration
    FuncDecl,
    /// Type specification, alias included
    Type,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::File,
        NodeKind::Field,
        NodeKind::FuncDecl,
        NodeKind::Type,
    ];

    /// Classify a tree-sitter node, `None` for kinds that carry no annotations
    pub fn of(node: Node<'_>) -> Option<Self> {
        match node.kind() {
            "source_file" => Some(NodeKind::File),
            "field_declaration" | "method_elem" | "method_spec" | "type_elem" => {
                Some(NodeKind::Field)
            }
            "function_declaration" | "method_declaration" => Some(NodeKind::FuncDecl),
            "type_spec" | "type_alias" => Some(NodeKind::Type),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Field => "field",
            NodeKind::FuncDecl => "func",
            NodeKind::Type => "type",
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(NodeKind::File),
            "field" => Ok(NodeKind::Field),
            "func" | "funcdecl" | "function" => Ok(NodeKind::FuncDecl),
            "type" => Ok(NodeKind::Type),
            _ => Err(format!("Unknown node kind: {}", s)),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 1-based line and column, as Go tooling reports them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Owned description of the node an annotation set was built from.
///
/// Holds no borrow of the tree, so it outlives the traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Grammar kind, e.g. `type_spec`
    pub kind: &'static str,
    /// Declared name, package name for files
    pub name: Option<String>,
    pub start: Position,
    pub end: Position,
}

impl NodeRef {
    pub fn new(node: Node<'_>, source: &str) -> Self {
        Self {
            kind: node.kind(),
            name: node_name(node, source),
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }
}

/// One raw comment token, delimiters included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Comment {
    /// Comment detached from any source, used when building groups by hand
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: Position::default(),
            end: Position::default(),
        }
    }

    fn from_node(node: Node<'_>, source: &str) -> Self {
        let raw = node_text(node, source).unwrap_or_default();
        // Carriage returns never reach comment text, same as the Go scanner
        let text = if raw.contains('\r') {
            raw.replace('\r', "")
        } else {
            raw.to_string()
        };
        Self {
            text,
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }
}

/// Contiguous run of comments directly above a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    pub list: Vec<Comment>,
}

impl CommentGroup {
    pub fn new(list: Vec<Comment>) -> Self {
        Self { list }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Comment> {
        self.list.iter()
    }
}

impl FromIterator<Comment> for CommentGroup {
    fn from_iter<I: IntoIterator<Item = Comment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Parsed Go source together with the text it was parsed from
pub struct SourceFile {
    path: Option<PathBuf>,
    source: String,
    tree: Tree,
}

impl SourceFile {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// True when tree-sitter had to recover from syntax errors
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Tree-sitter parser loaded with the Go grammar.
///
/// Not `Sync`; parallel callers keep one per worker.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parse in-memory Go source
    pub fn parse(&mut self, source: impl Into<String>) -> Result<SourceFile> {
        self.parse_with_path(None, source.into())
    }

    /// Read and parse a Go file
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<SourceFile> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AnnotationError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_with_path(Some(path.to_path_buf()), source)
    }

    fn parse_with_path(&mut self, path: Option<PathBuf>, source: String) -> Result<SourceFile> {
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| AnnotationError::Parse {
                path: path.clone().unwrap_or_else(|| PathBuf::from("<source>")),
            })?;
        Ok(SourceFile { path, source, tree })
    }
}

/// Find the doc comment group of a declaration node.
///
/// Files take the group above their `package` clause. A type spec written
/// without parentheses takes the group above its `type` keyword.
pub fn doc_comment(node: Node<'_>, source: &str) -> Option<CommentGroup> {
    match node.kind() {
        "source_file" => {
            let mut cursor = node.walk();
            let package = node
                .children(&mut cursor)
                .find(|child| child.kind() == "package_clause")?;
            lead_comment(package, source)
        }
        "type_spec" | "type_alias" => match node.parent() {
            Some(decl) if decl.kind() == "type_declaration" && !is_parenthesized(decl) => {
                lead_comment(decl, source)
            }
            _ => lead_comment(node, source),
        },
        _ => lead_comment(node, source),
    }
}

/// Comments ending on the line right above `node`, plus the earlier ones
/// chained to them without a blank line in between.
fn lead_comment(node: Node<'_>, source: &str) -> Option<CommentGroup> {
    let mut list = Vec::new();
    // Row the next comment (walking upwards) must touch
    let mut next_row = node.start_position().row;
    let mut current = preceding(node);

    while let Some(sibling) = current {
        if sibling.kind() != "comment" {
            break;
        }
        let end_row = sibling.end_position().row;
        let adjacent = if list.is_empty() {
            end_row + 1 == next_row
        } else {
            end_row + 1 >= next_row
        };
        if !adjacent || is_trailing(sibling) {
            break;
        }
        list.push(Comment::from_node(sibling, source));
        next_row = sibling.start_position().row;
        current = preceding(sibling);
    }

    if list.is_empty() {
        return None;
    }
    list.reverse();
    Some(CommentGroup::new(list))
}

/// A comment sharing its line with preceding code belongs to that code
fn is_trailing(comment: Node<'_>) -> bool {
    let row = comment.start_position().row;
    let mut current = preceding(comment);
    while let Some(sibling) = current {
        // Newline terminators end on the following row
        if sibling.kind() == "comment" || sibling.kind() == "\n" {
            current = preceding(sibling);
            continue;
        }
        return sibling.end_position().row == row;
    }
    false
}

/// Previous sibling, stepping out of a `statement_list` at its first
/// statement: comments opening a block sit before the list, not in it.
fn preceding(node: Node<'_>) -> Option<Node<'_>> {
    node.prev_sibling().or_else(|| {
        let parent = node.parent()?;
        if parent.kind() == "statement_list" {
            parent.prev_sibling()
        } else {
            None
        }
    })
}

fn is_parenthesized(decl: Node<'_>) -> bool {
    let mut cursor = decl.walk();
    let found = decl.children(&mut cursor).any(|child| child.kind() == "(");
    found
}

/// Declared name of a node: package name for files, identifiers for
/// declarations and fields, the type text for embedded fields.
pub fn node_name(node: Node<'_>, source: &str) -> Option<String> {
    let text = |n: Node<'_>| node_text(n, source).map(str::to_string);
    match node.kind() {
        "source_file" => {
            let mut cursor = node.walk();
            let package = node
                .children(&mut cursor)
                .find(|child| child.kind() == "package_clause")?;
            package.named_child(0).and_then(text)
        }
        "field_declaration" => {
            let mut cursor = node.walk();
            let names: Vec<String> = node
                .children_by_field_name("name", &mut cursor)
                .filter_map(text)
                .collect();
            if names.is_empty() {
                node.child_by_field_name("type").and_then(text)
            } else {
                Some(names.join(", "))
            }
        }
        "type_elem" => text(node),
        _ => node.child_by_field_name("name").and_then(text),
    }
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    source.get(node.byte_range())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceFile {
        GoParser::new().unwrap().parse(source).unwrap()
    }

    /// First node of `kind` in pre-order
    fn find<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        children.into_iter().find_map(|child| find(child, kind))
    }

    fn doc_texts(file: &SourceFile, kind: &str) -> Option<Vec<String>> {
        let node = find(file.root(), kind).expect("node kind present");
        doc_comment(node, file.source())
            .map(|group| group.list.into_iter().map(|c| c.text).collect())
    }

    #[test]
    fn test_node_kind_parse() {
        assert_eq!("file".parse::<NodeKind>(), Ok(NodeKind::File));
        assert_eq!("FUNC".parse::<NodeKind>(), Ok(NodeKind::FuncDecl));
        assert_eq!("function".parse::<NodeKind>(), Ok(NodeKind::FuncDecl));
        assert!("struct".parse::<NodeKind>().is_err());
        assert_eq!(NodeKind::Type.to_string(), "type");
    }

    #[test]
    fn test_package_doc() {
        let file = parse("// Package demo\n// @author Deng Ming\npackage demo\n");
        let root = file.root();
        assert_eq!(NodeKind::of(root), Some(NodeKind::File));
        assert_eq!(
            doc_texts(&file, "source_file"),
            Some(vec!["// Package demo".to_string(), "// @author Deng Ming".to_string()])
        );
        assert_eq!(node_name(root, file.source()), Some("demo".to_string()));
    }

    #[test]
    fn test_blank_line_splits_group() {
        let file = parse("// license header\n\n// @author Deng Ming\npackage demo\n");
        assert_eq!(
            doc_texts(&file, "source_file"),
            Some(vec!["// @author Deng Ming".to_string()])
        );
    }

    #[test]
    fn test_detached_comment_is_not_doc() {
        let file = parse("package demo\n\n// @orphan yes\n\nfunc F() {}\n");
        assert_eq!(doc_texts(&file, "function_declaration"), None);
    }

    #[test]
    fn test_block_comment_in_group() {
        let file = parse("package demo\n\n/* @multiple first line\nsecond line*/\n// @date 2022/04/02\nfunc F() {}\n");
        assert_eq!(
            doc_texts(&file, "function_declaration"),
            Some(vec![
                "/* @multiple first line\nsecond line*/".to_string(),
                "// @date 2022/04/02".to_string(),
            ])
        );
    }

    #[test]
    fn test_trailing_comment_excluded() {
        let source = "package demo\n\ntype T struct {\n\tA int // @trailing a\n\t// @type int\n\tB int\n}\n";
        let file = parse(source);
        let list = find(file.root(), "field_declaration_list").unwrap();
        let mut cursor = list.walk();
        let fields: Vec<_> = list
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
            .collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(doc_comment(fields[0], source), None);
        let doc = doc_comment(fields[1], source).unwrap();
        assert_eq!(doc.list.len(), 1);
        assert_eq!(doc.list[0].text, "// @type int");
        assert_eq!(node_name(fields[1], source), Some("B".to_string()));
    }

    #[test]
    fn test_trailing_comment_alone_is_not_doc() {
        let source = "package demo\n\ntype T struct {\n\tA int // @trailing a\n\tB int\n}\n";
        let file = parse(source);
        let list = find(file.root(), "field_declaration_list").unwrap();
        let mut cursor = list.walk();
        let last = list
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
            .last()
            .unwrap();
        assert_eq!(doc_comment(last, source), None);
    }

    #[test]
    fn test_unparenthesized_type_uses_declaration_doc() {
        let file = parse("package demo\n\n// @kind struct\ntype T struct{}\n");
        assert_eq!(
            doc_texts(&file, "type_spec"),
            Some(vec!["// @kind struct".to_string()])
        );
    }

    #[test]
    fn test_grouped_type_uses_spec_doc() {
        let source = "package demo\n\n// group doc\ntype (\n\t// @kind first\n\tA int\n\tB string\n)\n";
        let file = parse(source);
        let decl = find(file.root(), "type_declaration").unwrap();
        let mut cursor = decl.walk();
        let specs: Vec<_> = decl
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "type_spec")
            .collect();
        assert_eq!(specs.len(), 2);
        let first = doc_comment(specs[0], source).unwrap();
        assert_eq!(first.list[0].text, "// @kind first");
        assert_eq!(doc_comment(specs[1], source), None);
    }

    #[test]
    fn test_carriage_returns_removed() {
        let file = parse("// @author Deng Ming\r\npackage demo\r\n");
        assert_eq!(
            doc_texts(&file, "source_file"),
            Some(vec!["// @author Deng Ming".to_string()])
        );
    }

    #[test]
    fn test_node_ref_positions() {
        let file = parse("package demo\n\n// doc\nfunc Hello() {}\n");
        let func = find(file.root(), "function_declaration").unwrap();
        let node = NodeRef::new(func, file.source());
        assert_eq!(node.kind, "function_declaration");
        assert_eq!(node.name.as_deref(), Some("Hello"));
        assert_eq!(node.start, Position { line: 4, column: 1 });
        assert_eq!(node.start.to_string(), "4:1");
    }

    #[test]
    fn test_field_names_joined() {
        let source = "package demo\n\ntype P struct {\n\tX, Y int\n\tio.Reader\n}\n";
        let file = parse(source);
        let list = find(file.root(), "field_declaration_list").unwrap();
        let mut cursor = list.walk();
        let names: Vec<_> = list
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
            .map(|n| node_name(n, source))
            .collect();
        assert_eq!(
            names,
            vec![Some("X, Y".to_string()), Some("io.Reader".to_string())]
        );
    }
}
