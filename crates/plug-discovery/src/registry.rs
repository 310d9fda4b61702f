//! Plugin registry
//!
//! Owns the visited-manifest set and the registered records. Registration
//! runs discovery with the registry as the sink; a path read by one
//! registration is never read again by a later one.

use crate::discovery::{default_dispatcher, discover_with, DiscoverySink};
use crate::dispatcher::Dispatcher;
use crate::record::{PluginKind, PluginRecord};
use ahash::{AHashMap, AHashSet};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct PluginRegistry {
    visited: Mutex<AHashSet<String>>,
    plugins: RwLock<AHashMap<String, Arc<PluginRecord>>>,
}

/// Sink for one registration call, collecting what it added
struct Registration {
    registry: Arc<PluginRegistry>,
    added: Mutex<Vec<Arc<PluginRecord>>>,
}

impl DiscoverySink for Registration {
    fn is_unvisited(&self, manifest_path: &str) -> bool {
        self.registry.mark_visited(manifest_path)
    }

    fn accept(&self, record: PluginRecord) {
        if let Some(added) = self.registry.insert(record) {
            self.added.lock().push(added);
        }
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover and register plugins below `search_paths`.
    ///
    /// Returns the plugins added by this call, sorted by name.
    pub fn register_plugins<S: AsRef<str>>(
        self: &Arc<Self>,
        search_paths: &[S],
    ) -> Vec<Arc<PluginRecord>> {
        let dispatcher = default_dispatcher();
        self.register_plugins_with(&dispatcher, search_paths)
    }

    /// [`register_plugins`](Self::register_plugins) on an explicit dispatcher
    pub fn register_plugins_with<S: AsRef<str>>(
        self: &Arc<Self>,
        dispatcher: &Dispatcher,
        search_paths: &[S],
    ) -> Vec<Arc<PluginRecord>> {
        let registration = Arc::new(Registration {
            registry: Arc::clone(self),
            added: Mutex::new(Vec::new()),
        });

        discover_with(
            dispatcher,
            search_paths,
            Arc::clone(&registration) as Arc<dyn DiscoverySink>,
        );

        let mut added = std::mem::take(&mut *registration.added.lock());
        added.sort_by(|a, b| a.name.cmp(&b.name));
        info!("Registered {} new plugin(s)", added.len());
        added
    }

    /// Mark `manifest_path` visited; false if it already was
    pub fn mark_visited(&self, manifest_path: &str) -> bool {
        self.visited.lock().insert(manifest_path.to_string())
    }

    pub fn is_visited(&self, manifest_path: &str) -> bool {
        self.visited.lock().contains(manifest_path)
    }

    /// Register `record` unless its name is taken.
    fn insert(&self, record: PluginRecord) -> Option<Arc<PluginRecord>> {
        let mut plugins = self.plugins.write();
        if let Some(existing) = plugins.get(&record.name) {
            if existing.kind == record.kind && existing.primary_path() == record.primary_path() {
                debug!("Plugin '{}' already registered", record.name);
            } else {
                warn!(
                    "Already registered {} plugin '{}' at {}; ignoring {} plugin at {}",
                    existing.kind,
                    existing.name,
                    existing.primary_path(),
                    record.kind,
                    record.primary_path()
                );
            }
            return None;
        }

        debug!("Registering {} plugin '{}'", record.kind, record.name);
        let record = Arc::new(record);
        plugins.insert(record.name.clone(), Arc::clone(&record));
        Some(record)
    }

    pub fn plugin(&self, name: &str) -> Option<Arc<PluginRecord>> {
        self.plugins.read().get(name).cloned()
    }

    /// All registered plugins, sorted by name
    pub fn plugins(&self) -> Vec<Arc<PluginRecord>> {
        let mut all: Vec<Arc<PluginRecord>> = self.plugins.read().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn plugins_of_kind(&self, kind: PluginKind) -> Vec<Arc<PluginRecord>> {
        self.plugins()
            .into_iter()
            .filter(|plugin| plugin.kind == kind)
            .collect()
    }

    /// First plugin (by name) declaring `type_name` under `Info.Types`
    pub fn plugin_for_type(&self, type_name: &str) -> Option<Arc<PluginRecord>> {
        self.plugins()
            .into_iter()
            .find(|plugin| plugin.metadata_for_type(type_name).is_some())
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}
