//! Process-wide worker thread limit
//!
//! Resolution order: [`set_thread_limit`] override, then the
//! `PLUG_WORK_THREAD_LIMIT` environment variable, then `work.thread_limit`
//! from the settings file, then all available cores.

use crate::settings::Settings;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Environment variable overriding the configured thread limit
pub const THREAD_LIMIT_ENV: &str = "PLUG_WORK_THREAD_LIMIT";

/// 0 means "no override"
static THREAD_LIMIT_OVERRIDE: AtomicUsize = AtomicUsize::new(0);

/// Override the thread limit for the rest of the process.
///
/// Passing 0 clears the override.
pub fn set_thread_limit(limit: usize) {
    THREAD_LIMIT_OVERRIDE.store(limit, Ordering::SeqCst);
}

/// Current effective thread limit (always at least 1).
pub fn thread_limit() -> usize {
    let forced = THREAD_LIMIT_OVERRIDE.load(Ordering::SeqCst);
    if forced > 0 {
        return forced;
    }

    let env_value = std::env::var(THREAD_LIMIT_ENV).ok();
    let configured = Settings::load()
        .ok()
        .and_then(|settings| settings.work.thread_limit);
    resolve_thread_limit(env_value.as_deref(), configured, available_cores())
}

/// Resolve a thread limit from an environment string and a configured value.
///
/// An unparsable environment value is ignored. 0 selects every core and a
/// negative value leaves that many cores free, never going below 1.
pub fn resolve_thread_limit(env_value: Option<&str>, configured: Option<i64>, cores: usize) -> usize {
    let requested = env_value
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .or(configured);

    let cores = cores.max(1);
    match requested {
        None | Some(0) => cores,
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(cores),
        Some(n) => {
            let spare = usize::try_from(n.unsigned_abs()).unwrap_or(cores);
            cores.saturating_sub(spare).max(1)
        }
    }
}

fn available_cores() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}
