use std::io;
use thiserror::Error;

/// Failures reading a single manifest file
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to open plugin info {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Plugin info file {path} is not valid UTF-8: {source}")]
    Encoding {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Plugin info file {path} couldn't be read: {message}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Plugin info file {path} did not contain a JSON object")]
    NotAnObject { path: String },
}

impl ManifestError {
    /// Files that can't be opened are expected while probing search paths
    pub fn is_expected_absence(&self) -> bool {
        matches!(self, ManifestError::Unreadable { .. })
    }
}

/// Reasons a `Plugins` entry is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Plugin info {location} is not an object")]
    NotAnObject { location: String },

    #[error("Plugin info {location} key 'Type' doesn't hold a string")]
    MissingType { location: String },

    #[error("Plugin info {location} key 'Type' has unknown value '{value}'")]
    InvalidType { location: String, value: String },

    #[error("Plugin info {location} key 'Name' doesn't hold a string")]
    MissingName { location: String },

    #[error("Plugin info {location} key 'Name' is empty")]
    EmptyName { location: String },

    #[error("Plugin info {location} key '{key}' doesn't hold a string")]
    InvalidPath { location: String, key: &'static str },

    #[error("Plugin info {location} is missing 'LibraryPath' for library plugin")]
    MissingLibraryPath { location: String },

    #[error("Plugin info {location} key 'Info' doesn't hold an object")]
    MissingInfo { location: String },
}

/// Problems with a search path or include before any file is read
#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("Plugin info file {0} is not absolute")]
    NotAbsolute(String),

    #[error("Failed to compile wildcard pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] glob::PatternError),
}

/// Worker pool construction failure
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}
