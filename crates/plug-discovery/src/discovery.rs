//! Manifest discovery across a set of search paths
//!
//! Every unit of work (expanding a path, walking one directory, reading
//! one manifest, validating one record) is scheduled on a [`Dispatcher`].
//! Reading a manifest schedules its records and its includes, so the
//! whole transitive closure runs in the same group and [`discover_with`]
//! returns once it has drained.
//!
//! Nothing here fails outward. Problems are logged and the affected
//! branch is dropped.

use crate::dispatcher::{DispatchHandle, Dispatcher};
use crate::errors::ExpandError;
use crate::paths::{is_absolute, normalize_path};
use crate::reader::{read_manifest, ManifestFile};
use crate::record::{parse_record, PluginRecord};
use crate::walker::{scan_directory, DirectoryScan};
use crate::wildcard::RecursivePattern;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// File name looked up when a path refers to a directory
pub const DEFAULT_MANIFEST_NAME: &str = "plugInfo.json";

/// The caller's side of a discovery run.
///
/// Both methods may be called concurrently from worker threads.
pub trait DiscoverySink: Send + Sync {
    /// Record `manifest_path` as visited; false if it already was
    fn is_unvisited(&self, manifest_path: &str) -> bool;

    /// Take ownership of a validated record
    fn accept(&self, record: PluginRecord);
}

/// [`DiscoverySink`] built from two closures
pub struct CallbackSink<V, A> {
    is_unvisited: V,
    accept: A,
}

impl<V, A> CallbackSink<V, A>
where
    V: Fn(&str) -> bool + Send + Sync,
    A: Fn(PluginRecord) + Send + Sync,
{
    pub fn new(is_unvisited: V, accept: A) -> Self {
        CallbackSink {
            is_unvisited,
            accept,
        }
    }
}

impl<V, A> DiscoverySink for CallbackSink<V, A>
where
    V: Fn(&str) -> bool + Send + Sync,
    A: Fn(PluginRecord) + Send + Sync,
{
    fn is_unvisited(&self, manifest_path: &str) -> bool {
        (self.is_unvisited)(manifest_path)
    }

    fn accept(&self, record: PluginRecord) {
        (self.accept)(record);
    }
}

/// Per-run state shared by every scheduled task
struct SearchState {
    dispatcher: DispatchHandle,
    sink: Arc<dyn DiscoverySink>,
}

/// Concurrent dispatcher on the shared pool, or a synchronous one if the
/// pool can't be built.
pub fn default_dispatcher() -> Dispatcher {
    Dispatcher::concurrent().unwrap_or_else(|err| {
        error!("{}; discovering plugins synchronously", err);
        Dispatcher::synchronous()
    })
}

/// Discover manifests under `search_paths`, blocking until done.
///
/// `is_unvisited` guards every manifest read; `accept` receives each
/// valid record, in no particular order.
pub fn discover<S, V, A>(search_paths: &[S], is_unvisited: V, accept: A)
where
    S: AsRef<str>,
    V: Fn(&str) -> bool + Send + Sync + 'static,
    A: Fn(PluginRecord) + Send + Sync + 'static,
{
    let dispatcher = default_dispatcher();
    discover_with(
        &dispatcher,
        search_paths,
        Arc::new(CallbackSink::new(is_unvisited, accept)),
    );
}

/// [`discover`] on an explicit dispatcher and sink.
///
/// A non-empty search path without a trailing slash is taken to be a
/// directory. Includes found inside manifests don't get that treatment.
pub fn discover_with<S: AsRef<str>>(
    dispatcher: &Dispatcher,
    search_paths: &[S],
    sink: Arc<dyn DiscoverySink>,
) {
    let state = Arc::new(SearchState {
        dispatcher: dispatcher.handle(),
        sink,
    });

    debug!("Looking for plugins in {} search path(s)", search_paths.len());
    for path in search_paths {
        let mut path = path.as_ref().to_string();
        if !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        dispatch_expand(&state, path);
    }

    dispatcher.wait();
    debug!("Plugin discovery finished");
}

fn dispatch_expand(state: &Arc<SearchState>, path: String) {
    let task_state = Arc::clone(state);
    state.dispatcher.run(move || expand_and_read(&task_state, &path));
}

fn dispatch_read(state: &Arc<SearchState>, path: String) {
    let task_state = Arc::clone(state);
    state.dispatcher.run(move || read_plugin_info(&task_state, &path));
}

fn dispatch_walk(state: &Arc<SearchState>, dir: String, pattern: Arc<Regex>) {
    let task_state = Arc::clone(state);
    state
        .dispatcher
        .run(move || walk_directory(&task_state, &dir, &pattern));
}

fn dispatch_record(
    state: &Arc<SearchState>,
    value: Value,
    manifest_path: Arc<str>,
    location: String,
) {
    let task_state = Arc::clone(state);
    state.dispatcher.run(move || {
        let record = parse_record(&value, &manifest_path, &location);
        if record.is_valid() {
            debug!("Accepting {} plugin '{}' from {}", record.kind, record.name, location);
            task_state.sink.accept(record);
        }
    });
}

fn expand_and_read(state: &Arc<SearchState>, path: &str) {
    if path.is_empty() {
        return;
    }
    if let Err(err) = expand(state, path) {
        error!("{}", err);
    }
}

fn expand(state: &Arc<SearchState>, path: &str) -> Result<(), ExpandError> {
    if !is_absolute(path) {
        return Err(ExpandError::NotAbsolute(path.to_string()));
    }

    let mut pathname = path.to_string();
    if pathname.ends_with('/') {
        pathname.push_str(DEFAULT_MANIFEST_NAME);
    }
    let pathname = normalize_path(&pathname);

    if !pathname.contains('*') {
        read_plugin_info(state, &pathname);
        return Ok(());
    }

    if !pathname.contains("**") {
        let options = glob::MatchOptions {
            require_literal_separator: true,
            require_literal_leading_dot: true,
            ..glob::MatchOptions::new()
        };
        for entry in glob::glob_with(&pathname, options)? {
            match entry {
                Ok(found) => match found.to_str() {
                    Some(found) => dispatch_read(state, found.to_string()),
                    None => debug!("Skipping non UTF-8 match {:?}", found),
                },
                Err(err) => debug!("Skipping unreadable match for {}: {}", pathname, err),
            }
        }
        return Ok(());
    }

    let pattern = RecursivePattern::new(&pathname, DEFAULT_MANIFEST_NAME)?;
    debug!(
        "Walking {} for plugin info matching {}",
        pattern.root,
        pattern.regex.as_str()
    );
    dispatch_walk(state, pattern.root, Arc::new(pattern.regex));
    Ok(())
}

fn walk_directory(state: &Arc<SearchState>, dir: &str, pattern: &Arc<Regex>) {
    match scan_directory(dir, pattern) {
        Ok(DirectoryScan::Manifest(path)) => dispatch_read(state, path),
        Ok(DirectoryScan::Subdirectories(subdirectories)) => {
            for subdirectory in subdirectories {
                dispatch_walk(state, subdirectory, Arc::clone(pattern));
            }
        }
        Err(err) => debug!("Cannot list directory {}: {}", dir, err),
    }
}

fn read_plugin_info(state: &Arc<SearchState>, path: &str) {
    if !state.sink.is_unvisited(path) {
        debug!("Ignoring already read plugin info {}", path);
        return;
    }

    let manifest = match read_manifest(path) {
        Ok(manifest) => manifest,
        Err(err) if err.is_expected_absence() => {
            debug!("{}", err);
            return;
        }
        Err(err) => {
            error!("{}", err);
            return;
        }
    };
    debug!(
        "Read plugin info {}: {} plugin(s), {} include(s)",
        path,
        manifest.plugins.len(),
        manifest.includes.len()
    );

    let include_paths = manifest.include_paths();
    let manifest_path: Arc<str> = Arc::from(manifest.path.as_str());
    let locations: Vec<String> = (0..manifest.plugins.len())
        .map(|index| manifest.plugin_location(index))
        .collect();

    let ManifestFile { plugins, .. } = manifest;
    for (value, location) in plugins.into_iter().zip(locations) {
        dispatch_record(state, value, Arc::clone(&manifest_path), location);
    }

    for include in include_paths {
        dispatch_expand(state, include);
    }
}
