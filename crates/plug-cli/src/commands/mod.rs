pub mod config;
pub mod discover;
pub mod show;

use crate::common::absolute_search_path;
use crate::errors::CliError;
use plug_discovery::Dispatcher;

/// Dispatcher selected by the `--sync` and `--threads` flags.
///
/// Without either flag the process-wide shared pool is used.
pub fn build_dispatcher(sync: bool, threads: Option<usize>) -> Result<Dispatcher, CliError> {
    if sync {
        return Ok(Dispatcher::synchronous());
    }
    match threads {
        Some(n) if n > 0 => Ok(Dispatcher::with_thread_limit(n)?),
        _ => Ok(Dispatcher::concurrent()?),
    }
}

/// Command line paths made absolute against the working directory
pub fn resolve_search_paths(paths: &[String]) -> Result<Vec<String>, CliError> {
    let cwd = std::env::current_dir().map_err(CliError::CurrentDir)?;
    Ok(paths
        .iter()
        .map(|path| absolute_search_path(path, &cwd))
        .collect())
}
