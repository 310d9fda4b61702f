//! Plugin manifest discovery
//!
//! Finds `plugInfo.json` manifests below a set of search paths, follows
//! their `Includes`, and turns each `Plugins` entry into a validated
//! [`PluginRecord`]. Search paths may be exact files or directories, `*`
//! globs, or `**` patterns that walk a directory tree.
//!
//! Work is spread over a rayon pool through [`Dispatcher`]; a synchronous
//! dispatcher runs the same steps inline. Callers either supply their own
//! [`DiscoverySink`] or use [`PluginRegistry`], which keeps the visited set
//! and the registered plugins.

pub mod discovery;
pub mod dispatcher;
pub mod errors;
pub mod paths;
pub mod reader;
pub mod record;
pub mod registry;
pub mod walker;
pub mod wildcard;

pub use discovery::{
    default_dispatcher, discover, discover_with, CallbackSink, DiscoverySink,
    DEFAULT_MANIFEST_NAME,
};
pub use dispatcher::{DispatchHandle, Dispatcher};
pub use errors::{DispatchError, ExpandError, ManifestError, RecordError};
pub use reader::{read_manifest, ManifestFile};
pub use record::{parse_record, PluginKind, PluginRecord};
pub use registry::PluginRegistry;
pub use wildcard::translate_wildcard;
