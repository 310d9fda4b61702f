//! Reading `plugInfo.json` manifest files
//!
//! A manifest is JSON with one extension: lines whose first non-blank
//! character is `#` are comments. Comment lines are blanked rather than
//! dropped so JSON error positions still point at the right line.

use crate::errors::ManifestError;
use crate::paths::merge_paths;
use serde_json::Value;
use std::fs;
use tracing::{error, warn};

const PLUGINS_KEY: &str = "Plugins";
const INCLUDES_KEY: &str = "Includes";

/// The two recognised sections of one manifest file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestFile {
    pub path: String,
    /// Raw `Plugins` entries, validated later one by one
    pub plugins: Vec<Value>,
    /// `Includes` entries exactly as written
    pub includes: Vec<String>,
}

impl ManifestFile {
    /// Diagnostic location of `Plugins[index]`
    pub fn plugin_location(&self, index: usize) -> String {
        format!("{}[{}][{}]", self.path, PLUGINS_KEY, index)
    }

    /// Includes resolved against this manifest, trailing slashes kept
    pub fn include_paths(&self) -> Vec<String> {
        self.includes
            .iter()
            .map(|include| merge_paths(&self.path, include, true))
            .collect()
    }
}

/// Blank every line whose first non-whitespace character is `#`
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read and parse the manifest at `path`
pub fn read_manifest(path: &str) -> Result<ManifestFile, ManifestError> {
    let bytes = fs::read(path).map_err(|source| ManifestError::Unreadable {
        path: path.to_string(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| ManifestError::Encoding {
        path: path.to_string(),
        source,
    })?;
    parse_manifest(path, &text)
}

/// Parse manifest text that was loaded from `path`.
///
/// Syntax errors and a non-object top level fail the whole file. A
/// malformed `Plugins` or `Includes` section is logged and skipped, and
/// unknown top-level keys are logged and ignored.
pub fn parse_manifest(path: &str, text: &str) -> Result<ManifestFile, ManifestError> {
    let stripped = strip_comments(text);
    let value: Value = serde_json::from_str(&stripped).map_err(|err| ManifestError::Syntax {
        path: path.to_string(),
        line: err.line(),
        column: err.column(),
        message: err.to_string(),
    })?;

    let Value::Object(top) = value else {
        return Err(ManifestError::NotAnObject {
            path: path.to_string(),
        });
    };

    let mut manifest = ManifestFile {
        path: path.to_string(),
        ..ManifestFile::default()
    };

    for (key, value) in top {
        match key.as_str() {
            PLUGINS_KEY => match value {
                Value::Array(entries) => manifest.plugins = entries,
                _ => error!(
                    "Plugin info file {} key '{}' doesn't hold an array",
                    path, key
                ),
            },
            INCLUDES_KEY => {
                if let Some(includes) = string_array(path, &key, value) {
                    manifest.includes = includes;
                }
            }
            _ => warn!("Plugin info file {} unknown key {} (ignoring)", path, key),
        }
    }

    Ok(manifest)
}

fn string_array(path: &str, key: &str, value: Value) -> Option<Vec<String>> {
    let Value::Array(entries) = value else {
        error!(
            "Plugin info file {} key '{}' doesn't hold an array",
            path, key
        );
        return None;
    };

    let mut strings = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::String(s) => strings.push(s),
            _ => {
                error!(
                    "Plugin info file {} key '{}' index {} doesn't hold a string",
                    path, key, index
                );
                return None;
            }
        }
    }
    Some(strings)
}

#[cfg(test)]
mod tests {
    use crate::reader::*;
    use serde_json::json;
    use tempfile::TempDir;

    const PATH: &str = "/plugins/usd/plugInfo.json";

    #[test]
    fn test_strip_comments_keeps_line_count() {
        let text = "# header\n{\n  # indented comment\n  \"a\": \"#not a comment\"\n}\n";
        let stripped = strip_comments(text);
        assert_eq!(stripped.lines().count(), text.lines().count());
        assert_eq!(stripped, "\n{\n\n  \"a\": \"#not a comment\"\n}");
    }

    #[test]
    fn test_comment_stripping_preserves_error_line() {
        let text = "# one\n# two\n   # three\n# four\n{ \"Plugins\": [ }\n";
        let result = parse_manifest(PATH, text);
        assert!(
            matches!(result, Err(ManifestError::Syntax { line: 5, .. })),
            "expected syntax error on line 5, got {result:?}"
        );
    }

    #[test]
    fn test_parse_plugins_and_includes() {
        let text = r#"
# Plugins shipped with this package
{
    "Includes": ["sub/", "../other/plugInfo.json", "/abs/*/"],
    "Plugins": [
        {"Type": "resource", "Name": "r1", "Info": {}}
    ]
}
"#;
        let result = parse_manifest(PATH, text);
        assert!(result.is_ok(), "manifest should parse");
        let manifest = result.unwrap_or_default();
        assert_eq!(manifest.plugins.len(), 1);
        assert_eq!(manifest.plugins[0]["Name"], json!("r1"));
        assert_eq!(
            manifest.include_paths(),
            vec![
                "/plugins/usd/sub/".to_string(),
                "/plugins/other/plugInfo.json".to_string(),
                "/abs/*/".to_string(),
            ]
        );
        assert_eq!(
            manifest.plugin_location(0),
            "/plugins/usd/plugInfo.json[Plugins][0]"
        );
    }

    #[test]
    fn test_non_object_top_level() {
        let result = parse_manifest(PATH, "[1, 2, 3]");
        assert!(matches!(result, Err(ManifestError::NotAnObject { .. })));
    }

    #[test]
    fn test_malformed_sections_are_skipped() {
        let text = r#"{
            "Plugins": {"Type": "python"},
            "Includes": ["ok/", 7],
            "Extra": 1
        }"#;
        let result = parse_manifest(PATH, text);
        assert!(result.is_ok(), "shape problems are not fatal");
        let manifest = result.unwrap_or_default();
        assert!(manifest.plugins.is_empty());
        assert!(manifest.includes.is_empty());
    }

    #[test]
    fn test_read_missing_file_is_unreadable() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let missing = temp_dir.path().join("plugInfo.json");
        let result = read_manifest(&missing.to_string_lossy());
        assert!(result.as_ref().is_err_and(ManifestError::is_expected_absence));
    }

    #[test]
    fn test_invalid_utf8_is_not_an_absence() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("plugInfo.json");
        let mut content = b"{\"Plugins\": [], \"X\": \"".to_vec();
        content.extend_from_slice(&[0xff, 0xfe]);
        content.extend_from_slice(b"\"}");
        if let Err(err) = fs::write(&path, content) {
            assert!(err.to_string().is_empty(), "Failed to write manifest: {err}");
            return;
        }

        let result = read_manifest(&path.to_string_lossy());
        assert!(matches!(result, Err(ManifestError::Encoding { .. })));
        assert!(result
            .as_ref()
            .is_err_and(|err| !err.is_expected_absence()));
    }

    #[test]
    fn test_read_from_disk() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("plugInfo.json");
        let content = "# comment\n{\"Plugins\": [{\"Type\": \"python\", \"Name\": \"p\", \"Info\": {}}]}\n";
        if let Err(err) = fs::write(&path, content) {
            assert!(err.to_string().is_empty(), "Failed to write manifest: {err}");
            return;
        }

        let result = read_manifest(&path.to_string_lossy());
        assert!(result.is_ok_and(|m| m.plugins.len() == 1 && m.includes.is_empty()));
    }
}
