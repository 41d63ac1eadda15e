//! Comment delimiter stripping
//!
//! Turns one raw comment token, delimiters included, into the text an
//! annotation line is matched against.

/// Strip the delimiters from a raw comment.
///
/// `// text` yields `text`. `/* text */` yields `text ` with everything
/// between the opening `"/* "` and the closing `"*/"` kept verbatim,
/// newlines included. Any other shape, including `//text` and `/*text*/`,
/// yields `None` and the comment is skipped by callers.
pub fn extract_content(raw: &str) -> Option<&str> {
    if let Some(rest) = raw.strip_prefix("// ") {
        return Some(rest);
    }
    raw.strip_prefix("/* ")?.strip_suffix("*/")
}
