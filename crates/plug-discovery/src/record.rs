//! Plugin records extracted from a manifest's `Plugins` array
//!
//! A record is built from one JSON object plus the path of the manifest
//! that contained it. Relative `Root`, `LibraryPath` and `ResourcePath`
//! values are resolved against that manifest, so every path on a valid
//! record is absolute.

use crate::errors::RecordError;
use crate::paths::{append_to_root, dirname, merge_paths};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{error, warn};

const TYPE_KEY: &str = "Type";
const NAME_KEY: &str = "Name";
const ROOT_KEY: &str = "Root";
const LIBRARY_PATH_KEY: &str = "LibraryPath";
const RESOURCE_PATH_KEY: &str = "ResourcePath";
const INFO_KEY: &str = "Info";
const TYPES_KEY: &str = "Types";

const KNOWN_KEYS: [&str; 6] = [
    TYPE_KEY,
    NAME_KEY,
    ROOT_KEY,
    LIBRARY_PATH_KEY,
    RESOURCE_PATH_KEY,
    INFO_KEY,
];

/// What a plugin provides. `Unknown` marks a record that failed validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Library,
    Python,
    Resource,
    #[default]
    Unknown,
}

impl PluginKind {
    /// Parse a manifest `Type` value; anything unrecognised is `Unknown`
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "library" => PluginKind::Library,
            "python" => PluginKind::Python,
            "resource" => PluginKind::Resource,
            _ => PluginKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Library => "library",
            PluginKind::Python => "python",
            PluginKind::Resource => "resource",
            PluginKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated plugin description
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PluginRecord {
    pub kind: PluginKind,
    pub name: String,
    pub root_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub library_path: String,
    pub resource_path: String,
    /// The manifest's `Info` object, uninterpreted
    pub info: Map<String, Value>,
}

impl PluginRecord {
    /// Build a record, reporting the first validation failure.
    ///
    /// Unknown keys on an otherwise valid record are logged and ignored.
    pub fn from_json(value: &Value, manifest_path: &str, location: &str) -> Result<Self, RecordError> {
        let Some(top) = value.as_object() else {
            return Err(RecordError::NotAnObject {
                location: location.to_string(),
            });
        };

        let type_name = top
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| RecordError::MissingType {
                location: location.to_string(),
            })?;
        let kind = PluginKind::from_type_name(type_name);
        if kind == PluginKind::Unknown {
            return Err(RecordError::InvalidType {
                location: location.to_string(),
                value: type_name.to_string(),
            });
        }

        let name = top
            .get(NAME_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| RecordError::MissingName {
                location: location.to_string(),
            })?;
        if name.is_empty() {
            return Err(RecordError::EmptyName {
                location: location.to_string(),
            });
        }

        let root_path = match optional_string(top, ROOT_KEY, location)? {
            Some(root) => merge_paths(manifest_path, root, false),
            None => dirname(manifest_path).to_string(),
        };

        let library_path = match optional_string(top, LIBRARY_PATH_KEY, location)? {
            Some(library) => append_to_root(&root_path, library),
            None if kind == PluginKind::Library => {
                return Err(RecordError::MissingLibraryPath {
                    location: location.to_string(),
                });
            }
            None => String::new(),
        };

        let resource_path = match optional_string(top, RESOURCE_PATH_KEY, location)? {
            Some(resource) => append_to_root(&root_path, resource),
            None => root_path.clone(),
        };

        let info = top
            .get(INFO_KEY)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| RecordError::MissingInfo {
                location: location.to_string(),
            })?;

        for key in top.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("Plugin info {} unknown key {} (ignoring)", location, key);
            }
        }

        Ok(PluginRecord {
            kind,
            name: name.to_string(),
            root_path,
            library_path,
            resource_path,
            info,
        })
    }

    /// Records with `Unknown` kind are never registered
    pub fn is_valid(&self) -> bool {
        self.kind != PluginKind::Unknown
    }

    /// Library path for library plugins, resource path otherwise
    pub fn primary_path(&self) -> &str {
        if self.kind == PluginKind::Library {
            &self.library_path
        } else {
            &self.resource_path
        }
    }

    /// Type names declared under `Info.Types`, sorted
    pub fn declared_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .info
            .get(TYPES_KEY)
            .and_then(Value::as_object)
            .map(|types| types.keys().map(String::as_str).collect())
            .unwrap_or_default();
        types.sort_unstable();
        types
    }

    /// The metadata object declared for `type_name` under `Info.Types`
    pub fn metadata_for_type(&self, type_name: &str) -> Option<&Map<String, Value>> {
        self.info
            .get(TYPES_KEY)?
            .as_object()?
            .get(type_name)?
            .as_object()
    }
}

/// Parse a `Plugins` entry, never failing.
///
/// Validation errors are logged and produce a record of kind `Unknown`.
pub fn parse_record(value: &Value, manifest_path: &str, location: &str) -> PluginRecord {
    match PluginRecord::from_json(value, manifest_path, location) {
        Ok(record) => record,
        Err(err) => {
            error!("{}", err);
            PluginRecord::default()
        }
    }
}

fn optional_string<'a>(
    top: &'a Map<String, Value>,
    key: &'static str,
    location: &str,
) -> Result<Option<&'a str>, RecordError> {
    match top.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(RecordError::InvalidPath {
            location: location.to_string(),
            key,
        }),
    }
}
