use crate::errors::CliError;
use crate::GlobalOpts;
use colored::Colorize;
use plug_config::{thread_limit, Settings, THREAD_LIMIT_ENV};
use plug_logger as logger;

/// Print where settings come from and the values discovery will use
pub fn handle_config(opts: &GlobalOpts) -> Result<(), CliError> {
    let path = Settings::path();
    let settings = Settings::load()?;

    println!("{}", "Configuration:".bold().green());
    println!("  {}: {}", "settings file".cyan(), path.display());
    if opts.verbosity_level() > 0 && !path.exists() {
        println!("  {}", "(file not found, using defaults)".yellow());
    }
    println!("  {}: {}", "thread limit".cyan(), thread_limit());
    if let Ok(raw) = std::env::var(THREAD_LIMIT_ENV) {
        println!("  {}: {}", THREAD_LIMIT_ENV.cyan(), raw);
    }
    println!("  {}: {}", "log level".cyan(), settings.logging.level);
    match logger::get_log_path() {
        Some(log_path) => println!("  {}: {}", "log file".cyan(), log_path.display()),
        None => println!("  {}: {}", "log file".cyan(), "disabled".dimmed()),
    }
    Ok(())
}
