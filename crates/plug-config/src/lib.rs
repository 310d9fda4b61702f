//! Configuration for plugin manifest discovery
//!
//! Settings are read from a TOML file (see [`Settings::path`]) with a small
//! number of environment overrides. The only value the discovery engine
//! itself consumes is the process-wide worker thread limit.

pub mod settings;
pub mod work;

pub use settings::{ConfigError, LoggingSettings, Settings, WorkSettings};
pub use work::{resolve_thread_limit, set_thread_limit, thread_limit, THREAD_LIMIT_ENV};
