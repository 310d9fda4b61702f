use crate::commands::{build_dispatcher, resolve_search_paths};
use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Args;
use colored::Colorize;
use plug_discovery::{PluginKind, PluginRecord, PluginRegistry};
use plug_logger as logger;
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct DiscoverArgs {
    /// Search paths: manifest files, directories, `*` globs or `**` patterns
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Run every step on the calling thread
    #[arg(long, conflicts_with = "threads")]
    pub sync: bool,

    /// Use a dedicated pool with this many worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Only list plugins of this kind (library, python, resource)
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<PluginKind>,

    /// Print the records as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_kind(value: &str) -> Result<PluginKind, String> {
    match PluginKind::from_type_name(value) {
        PluginKind::Unknown => Err(format!(
            "unknown plugin kind '{}' (expected library, python or resource)",
            value
        )),
        kind => Ok(kind),
    }
}

pub fn handle_discover(args: DiscoverArgs, opts: &GlobalOpts) -> Result<(), CliError> {
    let dispatcher = build_dispatcher(args.sync, args.threads)?;
    let paths = resolve_search_paths(&args.paths)?;
    debug!("Search paths: {:?}", paths);

    logger::spinner_start("Discovering plugins...");
    let registry = Arc::new(PluginRegistry::new());
    let found = registry.register_plugins_with(&dispatcher, &paths);
    logger::spinner_stop();

    let plugins: Vec<Arc<PluginRecord>> = found
        .into_iter()
        .filter(|plugin| args.kind.is_none() || args.kind == Some(plugin.kind))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
    } else {
        print_plugins(&plugins, opts.verbosity_level());
    }

    report_summary(plugins.len(), opts);
    Ok(())
}

fn print_plugins(plugins: &[Arc<PluginRecord>], verbosity: u8) {
    if plugins.is_empty() {
        println!("{}", "No plugins found.".yellow());
        return;
    }

    println!("{}", "Plugins:".bold().green());
    for plugin in plugins {
        println!(
            "  {} {} {}",
            plugin.name.bold(),
            format!("[{}]", plugin.kind).cyan(),
            plugin.primary_path().dimmed()
        );
        if verbosity > 0 {
            for type_name in plugin.declared_types() {
                println!("      {}", type_name);
            }
        }
    }
}

fn report_summary(found: usize, opts: &GlobalOpts) {
    let counts = logger::diagnostic_counts();
    if counts.is_clean() {
        if !opts.quiet {
            logger::success(&format!("Found {} plugin(s)", found));
        }
        return;
    }

    logger::warn(&format!(
        "Found {} plugin(s) with {} warning(s) and {} error(s)",
        found, counts.warnings, counts.errors
    ));
    if let Some(log_path) = logger::get_log_path() {
        logger::info(&format!("Details in {}", log_path.display()));
    }
}
