//! One level of a recursive (`**`) manifest search
//!
//! Each directory is scanned on its own; recursion happens by scheduling
//! a new scan per subdirectory, so deep trees never grow the call stack.
//! The first file in a directory whose full path matches the pattern ends
//! the search below that directory.

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

/// Outcome of scanning one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryScan {
    /// A matching file; siblings and subdirectories are not searched
    Manifest(String),
    /// No file matched; these subdirectories should be scanned next
    Subdirectories(Vec<String>),
}

/// Scan the immediate entries of `dir`.
///
/// Entries are visited in file-name order, so "first match" is
/// deterministic. Symlinks to files are treated as files; symlinked
/// directories are not followed.
pub fn scan_directory(dir: &str, pattern: &Regex) -> Result<DirectoryScan, walkdir::Error> {
    let mut subdirectories = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err),
            Err(err) => {
                debug!("Skipping unreadable entry in {}: {}", dir, err);
                continue;
            }
        };

        let Some(path) = entry.path().to_str() else {
            debug!("Skipping non UTF-8 path {:?}", entry.path());
            continue;
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            subdirectories.push(path.to_string());
            continue;
        }

        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if is_file && pattern.is_match(path) {
            debug!("Found plugin info {} matching {}", path, pattern.as_str());
            return Ok(DirectoryScan::Manifest(path.to_string()));
        }
    }

    Ok(DirectoryScan::Subdirectories(subdirectories))
}
