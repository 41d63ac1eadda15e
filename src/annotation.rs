//! Annotation building
//!
//! Scans the comments of one doc group for `@key value` lines.

use std::collections::HashMap;

use tracing::trace;

use crate::ast::{CommentGroup, NodeRef};
use crate::comment::extract_content;

/// A `@key value` pair taken from one comment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}

impl Annotation {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Annotations of a single node.
///
/// Entries keep source order and duplicates. Keyed lookups see the last
/// entry written for a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub node: NodeRef,
    entries: Vec<Annotation>,
}

impl Annotations {
    /// Set with no entries, for nodes without doc comments
    pub fn empty(node: NodeRef) -> Self {
        Self {
            node,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Annotation] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Annotation> {
        self.entries
    }

    /// Last annotation recorded under `key`
    pub fn get(&self, key: &str) -> Option<&Annotation> {
        self.entries.iter().rev().find(|a| a.key == key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(|a| a.value.as_str())
    }

    /// Every annotation recorded under `key`, in source order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.entries.iter().filter(move |a| a.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|a| a.key == key)
    }

    /// Distinct keys in order of first appearance
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for annotation in &self.entries {
            if !keys.contains(&annotation.key.as_str()) {
                keys.push(&annotation.key);
            }
        }
        keys
    }

    /// Key to value view where later duplicates replace earlier ones
    pub fn to_map(&self) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .map(|a| (a.key.as_str(), a.value.as_str()))
            .collect()
    }

    fn push(&mut self, annotation: Annotation) {
        self.entries.push(annotation);
    }
}

impl<'a> IntoIterator for &'a Annotations {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Match one extracted comment text against `@key value`.
///
/// The key runs from after `@` to the first space and must not be empty;
/// the value is the rest, untouched. A bare `@key` has no value and is
/// rejected.
pub fn parse_annotation(text: &str) -> Option<Annotation> {
    let rest = text.strip_prefix('@')?;
    let (key, value) = rest.split_once(' ')?;
    if key.is_empty() {
        return None;
    }
    Some(Annotation::new(key, value))
}

/// Build the annotation set of `node` from its doc comment group.
///
/// Comments with unknown delimiters and lines that are not annotations
/// are dropped without error.
pub fn new_annotations(node: NodeRef, group: Option<&CommentGroup>) -> Annotations {
    let mut annotations = Annotations::empty(node);
    let Some(group) = group else {
        return annotations;
    };

    for comment in group.iter() {
        let Some(text) = extract_content(&comment.text) else {
            trace!(comment = %comment.text, "skipping comment with unsupported delimiters");
            continue;
        };
        if !text.starts_with('@') {
            continue;
        }
        match parse_annotation(text) {
            Some(annotation) => annotations.push(annotation),
            None => trace!(line = comment.start.line, "skipping annotation without value"),
        }
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Comment;
    use pretty_assertions::assert_eq;

    fn group(comments: &[&str]) -> CommentGroup {
        comments.iter().map(|c| Comment::new(*c)).collect()
    }

    #[test]
    fn test_parse_annotation() {
        assert_eq!(
            parse_annotation("@author Deng Ming"),
            Some(Annotation::new("author", "Deng Ming"))
        );
        assert_eq!(
            parse_annotation("@multiple first line\nsecond line"),
            Some(Annotation::new("multiple", "first line\nsecond line"))
        );
        assert_eq!(parse_annotation("@key "), Some(Annotation::new("key", "")));
    }

    #[test]
    fn test_parse_annotation_rejects() {
        assert_eq!(parse_annotation("@noval"), None);
        assert_eq!(parse_annotation("author Deng Ming"), None);
        assert_eq!(parse_annotation("@ value"), None);
        assert_eq!(parse_annotation(" @author Deng Ming"), None);
    }

    #[test]
    fn test_no_group_is_empty() {
        let ans = new_annotations(NodeRef::default(), None);
        assert!(ans.is_empty());
        assert_eq!(ans.len(), 0);

        let ans = new_annotations(NodeRef::default(), Some(&CommentGroup::default()));
        assert!(ans.is_empty());
    }

    #[test]
    fn test_builds_from_group() {
        let doc = group(&[
            "// annotation walks the source and extracts annotations",
            "// @author Deng Ming",
            "/* @multiple first line\nsecond line*/",
            "// @date 2022/04/02",
        ]);
        let ans = new_annotations(NodeRef::default(), Some(&doc));
        assert_eq!(
            ans.entries(),
            &[
                Annotation::new("author", "Deng Ming"),
                Annotation::new("multiple", "first line\nsecond line"),
                Annotation::new("date", "2022/04/02"),
            ]
        );
    }

    #[test]
    fn test_malformed_lines_dropped() {
        let doc = group(&[
            "//",
            "//@tight no-space-after-marker",
            "// @noval",
            "/*@tight*/",
            "// plain text @not-at-start",
            "// @type string",
        ]);
        let ans = new_annotations(NodeRef::default(), Some(&doc));
        assert_eq!(ans.entries(), &[Annotation::new("type", "string")]);
    }

    #[test]
    fn test_duplicates_kept_last_wins_lookup() {
        let doc = group(&[
            "// @parameter arg1 int",
            "// @parameter arg2 int32",
            "// @return string",
        ]);
        let ans = new_annotations(NodeRef::default(), Some(&doc));
        assert_eq!(ans.len(), 3);
        assert_eq!(ans.value("parameter"), Some("arg2 int32"));
        let all: Vec<_> = ans.get_all("parameter").map(|a| a.value.as_str()).collect();
        assert_eq!(all, vec!["arg1 int", "arg2 int32"]);
        assert_eq!(ans.keys(), vec!["parameter", "return"]);

        let map = ans.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["parameter"], "arg2 int32");
        assert!(ans.contains_key("return"));
        assert!(!ans.contains_key("author"));
    }

    #[test]
    fn test_value_whitespace_preserved() {
        let doc = group(&["// @sql  SELECT *\tFROM t "]);
        let ans = new_annotations(NodeRef::default(), Some(&doc));
        assert_eq!(ans.value("sql"), Some(" SELECT *\tFROM t "));
    }
}
