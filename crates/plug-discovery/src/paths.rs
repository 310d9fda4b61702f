//! String path helpers for manifest locations
//!
//! Manifest paths are `/`-separated strings rather than `PathBuf`s: a
//! trailing slash is meaningful (it marks a directory reference) and must
//! survive joining.

/// True for paths rooted at `/`
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Directory part of `path`, without a trailing slash.
///
/// `dirname("/a/b/plugInfo.json") == "/a/b"`, `dirname("/plugInfo.json") == "/"`.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Lexically normalize a path: collapse repeated separators and resolve
/// `.` and `..` segments. A trailing slash is not preserved.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let absolute = is_absolute(path);
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Join two path fragments and normalize the result
pub fn cat_paths(prefix: &str, suffix: &str) -> String {
    if prefix.is_empty() {
        return normalize_path(suffix);
    }
    normalize_path(&format!("{prefix}/{suffix}"))
}

/// Resolve `sub` relative to the directory containing `owner`.
///
/// Empty or absolute `sub` is returned unchanged. With
/// `keep_trailing_slash`, a slash ending `sub` is carried over to the
/// result so directory references stay directory references.
pub fn merge_paths(owner: &str, sub: &str, keep_trailing_slash: bool) -> String {
    if sub.is_empty() || is_absolute(sub) {
        return sub.to_string();
    }

    let mut merged = cat_paths(dirname(owner), sub);
    if keep_trailing_slash && sub.ends_with('/') && !merged.ends_with('/') {
        merged.push('/');
    }
    merged
}

/// Resolve `sub` against a plugin root directory
pub fn append_to_root(root: &str, sub: &str) -> String {
    if sub.is_empty() {
        return root.to_string();
    }
    if is_absolute(sub) {
        return sub.to_string();
    }
    cat_paths(root, sub)
}

#[cfg(test)]
mod tests {
    use crate::paths::*;

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/a/b/plugInfo.json"), "/a/b");
        assert_eq!(dirname("/plugInfo.json"), "/");
        assert_eq!(dirname("plugInfo.json"), "");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a//b/./c/"), "/a/b/c");
        assert_eq!(normalize_path("/a/b/../plugInfo.json"), "/a/plugInfo.json");
        assert_eq!(normalize_path("/../x"), "/x");
        assert_eq!(normalize_path("../x/./y"), "../x/y");
        assert_eq!(normalize_path("a/.."), ".");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_merge_paths() {
        let owner = "/a/b/plugInfo.json";
        assert_eq!(merge_paths(owner, "", false), "");
        assert_eq!(merge_paths(owner, "/abs/dir/", true), "/abs/dir/");
        assert_eq!(merge_paths(owner, "sub/", true), "/a/b/sub/");
        assert_eq!(merge_paths(owner, "sub/", false), "/a/b/sub");
        assert_eq!(merge_paths(owner, "../c/plugInfo.json", true), "/a/c/plugInfo.json");
        assert_eq!(merge_paths(owner, ".", false), "/a/b");
    }

    #[test]
    fn test_append_to_root() {
        assert_eq!(append_to_root("/a/b", ""), "/a/b");
        assert_eq!(append_to_root("/a/b", "/opt/libfoo.so"), "/opt/libfoo.so");
        assert_eq!(append_to_root("/a/b", "lib/libfoo.so"), "/a/b/lib/libfoo.so");
        assert_eq!(append_to_root("/a/b", "../resources"), "/a/resources");
    }
}
