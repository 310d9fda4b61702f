//! Wildcard to regular expression translation
//!
//! `**` matches across directory boundaries, `*` stays within one path
//! segment. Everything else is matched literally.

use crate::errors::ExpandError;
use regex::Regex;

/// Translate a wildcard pattern into regex source.
///
/// The result is not anchored; callers wrap it as needed.
pub fn translate_wildcard(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2);
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '*' {
            literal.push(c);
            continue;
        }

        regex.push_str(&regex::escape(&literal));
        literal.clear();
        if chars.peek() == Some(&'*') {
            chars.next();
            regex.push_str(".*");
        } else {
            regex.push_str("[^/]*");
        }
    }
    regex.push_str(&regex::escape(&literal));
    regex
}

/// A `**` search: the directory to start walking from and the regex every
/// candidate file path is matched against.
#[derive(Debug, Clone)]
pub struct RecursivePattern {
    pub root: String,
    pub regex: Regex,
}

impl RecursivePattern {
    /// Split `path` at the last `/` before its first `**`.
    ///
    /// The prefix becomes the walk root; the remainder is translated.
    /// `default_file` is appended when the translated pattern ends in a
    /// directory separator.
    pub fn new(path: &str, default_file: &str) -> Result<Self, ExpandError> {
        let star = path.find("**").unwrap_or(path.len());
        let cut = path[..star].rfind('/').unwrap_or(0);

        let (prefix, remainder) = path.split_at(cut);
        let root = if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        };

        let mut source = String::from("^");
        source.push_str(&regex::escape(prefix));
        source.push_str(&translate_wildcard(remainder));
        if source.ends_with('/') {
            source.push_str(&regex::escape(default_file));
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|source| ExpandError::InvalidPattern {
            pattern: path.to_string(),
            source,
        })?;
        Ok(RecursivePattern { root, regex })
    }
}
