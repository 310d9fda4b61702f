use clap::{Parser, Subcommand};
use plug::{
    commands::{
        config,
        discover::{self, DiscoverArgs},
        show::{self, ShowArgs},
    },
    GlobalOpts,
};
use plug_config::Settings;
use plug_logger::{self as logger, LogOptions};

#[derive(Parser)]
#[command(name = "plug")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Plugin manifest discovery",
    long_about = "plug finds plugInfo.json manifests, follows their includes and reports the plugins they declare."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover plugins under one or more search paths
    Discover(DiscoverArgs),
    /// Show a single plugin's record
    Show(ShowArgs),
    /// Show the active configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    let (settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    let options = LogOptions {
        verbosity: cli.global.verbosity_level(),
        no_stdout: false,
        default_level: cli.global.default_level(&settings.logging.level),
        log_dir: settings
            .logging
            .file
            .then(Settings::config_dir)
            .flatten(),
    };
    if let Err(e) = logger::init(&options) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    if let Some(e) = settings_error {
        logger::warn(&format!("Using default settings: {}", e));
    }

    let result = match cli.command {
        Commands::Discover(args) => discover::handle_discover(args, &cli.global),
        Commands::Show(args) => show::handle_show(args),
        Commands::Config => config::handle_config(&cli.global),
    };

    if let Err(e) = result {
        logger::error(&e.to_string());
        std::process::exit(1);
    }
}
