//! Tree traversal and per-kind dispatch
//!
//! [`walk`] drives any [`Visitor`] over a tree-sitter tree in pre-order.
//! [`AnnotationVisitor`] is the visitor that finds documented declarations
//! and hands their annotations to the matching entry of a [`Handlers`] set.

use tracing::debug;
use tree_sitter::Node;

use crate::annotation::{new_annotations, Annotations};
use crate::ast::{doc_comment, NodeKind, NodeRef, SourceFile};

/// What the walker does after visiting a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into the node's children
    Continue,
    /// Leave the node's children unvisited
    Skip,
}

pub trait Visitor<'tree> {
    fn visit(&mut self, node: Node<'tree>) -> Walk;
}

/// Visit `root` and its descendants in pre-order, each node exactly once
pub fn walk<'tree, V>(visitor: &mut V, root: Node<'tree>)
where
    V: Visitor<'tree> + ?Sized,
{
    let mut cursor = root.walk();
    loop {
        let descend = visitor.visit(cursor.node()) == Walk::Continue;
        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Callback receiving the annotations of one node kind
pub type Handler<'h> = Box<dyn for<'tree> FnMut(Node<'tree>, Annotations) + 'h>;

fn ignore(_: Node<'_>, _: Annotations) {}

/// One handler per node kind. Kinds left unset are ignored.
pub struct Handlers<'h> {
    file: Handler<'h>,
    field: Handler<'h>,
    func_decl: Handler<'h>,
    type_spec: Handler<'h>,
}

impl Default for Handlers<'_> {
    fn default() -> Self {
        Self {
            file: Box::new(ignore),
            field: Box::new(ignore),
            func_decl: Box::new(ignore),
            type_spec: Box::new(ignore),
        }
    }
}

impl<'h> Handlers<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_file<F>(mut self, handler: F) -> Self
    where
        F: FnMut(Node<'_>, Annotations) + 'h,
    {
        self.file = Box::new(handler);
        self
    }

    pub fn on_field<F>(mut self, handler: F) -> Self
    where
        F: FnMut(Node<'_>, Annotations) + 'h,
    {
        self.field = Box::new(handler);
        self
    }

    pub fn on_func_decl<F>(mut self, handler: F) -> Self
    where
        F: FnMut(Node<'_>, Annotations) + 'h,
    {
        self.func_decl = Box::new(handler);
        self
    }

    pub fn on_type<F>(mut self, handler: F) -> Self
    where
        F: FnMut(Node<'_>, Annotations) + 'h,
    {
        self.type_spec = Box::new(handler);
        self
    }

    /// Route a set to the handler registered for `kind`
    pub fn dispatch(&mut self, kind: NodeKind, node: Node<'_>, annotations: Annotations) {
        let handler = match kind {
            NodeKind::File => &mut self.file,
            NodeKind::Field => &mut self.field,
            NodeKind::FuncDecl => &mut self.func_decl,
            NodeKind::Type => &mut self.type_spec,
        };
        handler(node, annotations);
    }
}

/// Visitor that dispatches the annotations of every documented
/// file, field, function, and type spec. Never prunes the tree.
pub struct AnnotationVisitor<'src, 'h> {
    source: &'src str,
    handlers: Handlers<'h>,
}

impl<'src, 'h> AnnotationVisitor<'src, 'h> {
    /// `source` must be the text the visited tree was parsed from
    pub fn new(source: &'src str, handlers: Handlers<'h>) -> Self {
        Self { source, handlers }
    }

    pub fn into_handlers(self) -> Handlers<'h> {
        self.handlers
    }
}

impl<'tree> Visitor<'tree> for AnnotationVisitor<'_, '_> {
    fn visit(&mut self, node: Node<'tree>) -> Walk {
        let Some(kind) = NodeKind::of(node) else {
            return Walk::Continue;
        };
        if let Some(doc) = doc_comment(node, self.source) {
            let annotations = new_annotations(NodeRef::new(node, self.source), Some(&doc));
            debug!(
                kind = %kind,
                name = annotations.node.name.as_deref().unwrap_or("_"),
                line = annotations.node.start.line,
                entries = annotations.len(),
                "dispatching annotations"
            );
            self.handlers.dispatch(kind, node, annotations);
        }
        Walk::Continue
    }
}

/// Run an [`AnnotationVisitor`] over a parsed file
pub fn annotate(file: &SourceFile, handlers: Handlers<'_>) {
    let mut visitor = AnnotationVisitor::new(file.source(), handlers);
    walk(&mut visitor, file.root());
}
