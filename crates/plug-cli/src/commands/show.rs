use crate::commands::{build_dispatcher, resolve_search_paths};
use crate::errors::CliError;
use clap::Args;
use plug_discovery::PluginRegistry;
use std::sync::Arc;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Plugin name
    pub name: String,

    /// Search paths to discover from
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Run every step on the calling thread
    #[arg(long)]
    pub sync: bool,
}

/// Print one plugin's record as JSON
pub fn handle_show(args: ShowArgs) -> Result<(), CliError> {
    let dispatcher = build_dispatcher(args.sync, None)?;
    let paths = resolve_search_paths(&args.paths)?;

    let registry = Arc::new(PluginRegistry::new());
    registry.register_plugins_with(&dispatcher, &paths);

    let plugin = registry
        .plugin(&args.name)
        .ok_or_else(|| CliError::PluginNotFound(args.name.clone()))?;
    println!("{}", serde_json::to_string_pretty(&*plugin)?);
    Ok(())
}
