//! Error types for the plug command line

use plug_config::ConfigError;
use plug_discovery::DispatchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot start discovery workers: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot resolve the working directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Plugin '{0}' not found")]
    PluginNotFound(String),
}

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_plugin_not_found_display() {
        let err = CliError::PluginNotFound("usdGeom".to_string());
        assert_eq!(err.to_string(), "Plugin 'usdGeom' not found");
    }
}
