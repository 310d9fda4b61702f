//! Common types and utilities shared across commands

use clap::Parser;
use std::path::Path;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only report errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: configured level (warn by default)
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Filter used when no `-v` is given
    pub fn default_level(&self, configured: &str) -> String {
        if self.quiet {
            "error".to_string()
        } else {
            configured.to_string()
        }
    }
}

/// Make a command line search path absolute against `cwd`.
///
/// Trailing slashes are kept since they select directory lookups.
pub fn absolute_search_path(path: &str, cwd: &Path) -> String {
    if path.is_empty() || path.starts_with('/') {
        return path.to_string();
    }
    let base = cwd.to_string_lossy();
    let base = base.trim_end_matches('/');
    let relative = path.trim_start_matches("./");
    format!("{}/{}", base, relative)
}

#[cfg(test)]
mod tests {
    use crate::common::*;

    #[test]
    fn test_quiet_overrides_verbose() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
        };
        assert_eq!(opts.verbosity_level(), 0);
        assert_eq!(opts.default_level("warn"), "error");

        let opts = GlobalOpts {
            quiet: false,
            verbose: 1,
        };
        assert_eq!(opts.verbosity_level(), 1);
        assert_eq!(opts.default_level("info"), "info");
    }

    #[test]
    fn test_absolute_search_path() {
        let cwd = Path::new("/work/");
        assert_eq!(absolute_search_path("/usr/lib", cwd), "/usr/lib");
        assert_eq!(absolute_search_path("plugins/", cwd), "/work/plugins/");
        assert_eq!(absolute_search_path("./share", cwd), "/work/share");
        assert_eq!(absolute_search_path("", cwd), "");
    }
}
