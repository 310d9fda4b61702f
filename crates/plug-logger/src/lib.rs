//! Logging for the plug tools
//!
//! Library crates only emit `tracing` events. This crate installs the
//! subscriber that routes them to stderr and to a log file, and counts
//! warnings and errors so callers can report a diagnostic summary.

mod counter;

pub use counter::{DiagnosticCounter, DiagnosticCounts};

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "plug.log";

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);
static DIAGNOSTICS: Mutex<Option<DiagnosticCounter>> = Mutex::new(None);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Failed to prepare log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid log filter '{0}'")]
    Filter(String),

    #[error("Failed to install logger: {0}")]
    Install(String),
}

/// How the subscriber should be assembled
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// 0 = default level, 1 = debug (-v), 2+ = trace (-vv)
    pub verbosity: u8,
    /// Suppress the stderr layer
    pub no_stdout: bool,
    /// Filter used at verbosity 0 when `RUST_LOG` is unset
    pub default_level: String,
    /// Directory receiving `plug.log`; `None` disables the file layer
    pub log_dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        LogOptions {
            verbosity: 0,
            no_stdout: false,
            default_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init(options: &LogOptions) -> Result<(), LoggerError> {
    VERBOSITY.store(options.verbosity, Ordering::Relaxed);

    let filter = build_filter(options)?;

    let console = (!options.no_stdout).then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stderr)
    });

    let file_layer = match &options.log_dir {
        Some(dir) => {
            let file = open_log_file(dir)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_names(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let counter = DiagnosticCounter::new();
    if let Ok(mut guard) = DIAGNOSTICS.lock() {
        *guard = Some(counter.clone());
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .with(counter)
        .try_init()
        .map_err(|e| LoggerError::Install(e.to_string()))
}

fn build_filter(options: &LogOptions) -> Result<EnvFilter, LoggerError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = match options.verbosity {
        0 => options.default_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(directive).map_err(|_| LoggerError::Filter(directive.to_string()))
}

/// Create (truncating) the log file and remember its path
fn open_log_file(dir: &Path) -> Result<File, LoggerError> {
    let io_err = |source| LoggerError::Io {
        path: dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let log_file = dir.join(LOG_FILE_NAME);
    let mut file = File::create(&log_file).map_err(|source| LoggerError::Io {
        path: log_file.clone(),
        source,
    })?;
    let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let _ = writeln!(file, "# plug log started {}", started);

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(log_file.clone());
    }

    OpenOptions::new()
        .append(true)
        .open(&log_file)
        .map_err(|source| LoggerError::Io {
            path: log_file,
            source,
        })
}

/// Warning/error counts observed since [`init`]
pub fn diagnostic_counts() -> DiagnosticCounts {
    DIAGNOSTICS
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(DiagnosticCounter::snapshot))
        .unwrap_or_default()
}

/// Path of the active log file, if any
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Kind of user-facing message printed outside `tracing`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Info,
    Warn,
    Error,
    Success,
}

impl Notice {
    fn tag(self) -> &'static str {
        match self {
            Notice::Info => "INFO",
            Notice::Warn => "WARN",
            Notice::Error => "ERROR",
            Notice::Success => "OK",
        }
    }

    fn prefix(self) -> Option<ColoredString> {
        match self {
            Notice::Info => None,
            Notice::Warn => Some("warning:".yellow().bold()),
            Notice::Error => Some("error:".red().bold()),
            Notice::Success => Some("\u{2714}".green().bold()),
        }
    }
}

/// Record `message` in the log file and print it to stderr, keeping any
/// running spinner intact.
fn notify(notice: Notice, message: &str) {
    if let Some(log_path) = get_log_path() {
        if let Ok(mut file) = OpenOptions::new().append(true).open(log_path) {
            let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(file, "[{}] {:<5} {}", stamp, notice.tag(), message);
        }
    }

    if notice == Notice::Info && get_verbosity() == 0 {
        return;
    }
    let line = match notice.prefix() {
        Some(prefix) => format!("{} {}", prefix, message),
        None => message.to_string(),
    };
    with_spinner_suspended(|| eprintln!("{}", line));
}

/// Shown on stderr only with `-v`; always written to the log file
pub fn info(message: &str) {
    notify(Notice::Info, message);
}

pub fn warn(message: &str) {
    notify(Notice::Warn, message);
}

pub fn error(message: &str) {
    notify(Notice::Error, message);
}

pub fn success(message: &str) {
    notify(Notice::Success, message);
}

fn with_spinner_suspended<F: FnOnce()>(print: F) {
    let active = SPINNER.lock().ok().and_then(|guard| guard.clone());
    match active {
        Some(spinner) => spinner.suspend(print),
        None => print(),
    }
}

/// Show a spinner on stderr until [`spinner_stop`]. Skipped when verbose,
/// since log lines would interleave with it.
pub fn spinner_start(message: &str) {
    if get_verbosity() > 0 {
        return;
    }

    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .map(|style| style.tick_chars("-\\|/ "));
    let spinner = ProgressBar::new_spinner().with_message(message.to_string());
    if let Ok(style) = style {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut guard) = SPINNER.lock() {
        if let Some(previous) = guard.replace(spinner) {
            previous.finish_and_clear();
        }
    }
}

pub fn spinner_stop() {
    let finished = SPINNER.lock().ok().and_then(|mut guard| guard.take());
    if let Some(spinner) = finished {
        spinner.finish_and_clear();
    }
}
