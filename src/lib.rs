#![forbid(unsafe_code)]

//! # go-annotation
//!
//! Extracts `@key value` annotations from the doc comments of Go
//! declarations.
//!
//! A Go file is parsed with tree-sitter, then walked once. Every file,
//! field, function, and type spec that carries a doc comment gets its
//! annotations built and handed to the handler registered for its kind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use annotation::{annotate, GoParser, Handlers};
//!
//! fn main() -> annotation::Result<()> {
//!     let mut parser = GoParser::new()?;
//!     let file = parser.parse("// @author Deng Ming\npackage demo\n")?;
//!
//!     annotate(
//!         &file,
//!         Handlers::new().on_file(|_, ans| {
//!             println!("author: {:?}", ans.value("author"));
//!         }),
//!     );
//!     Ok(())
//! }
//! ```

pub mod annotation;
pub mod ast;
pub mod commands;
pub mod comment;
pub mod config;
pub mod error;
pub mod scan;
pub mod visit;

// Re-exports
pub use annotation::{new_annotations, parse_annotation, Annotation, Annotations};
pub use ast::{
    doc_comment, Comment, CommentGroup, GoParser, NodeKind, NodeRef, Position, SourceFile,
};
pub use comment::extract_content;
pub use config::Config;
pub use error::{AnnotationError, Result};
pub use scan::{extract_source, FileReport, NodeAnnotations, Scanner};
pub use visit::{annotate, walk, AnnotationVisitor, Handler, Handlers, Visitor, Walk};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
