use colored::Colorize;
use interactor::{cli::Cli, cli::Commands, config::Config, init_logging, AppResult};

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load_or_default(&cli.config_file);

    // Initialize logging; the guard keeps the file appender alive
    let _log_guard = init_logging(&cli.effective_log_level(), Some(&config.log.file_path))?;

    tracing::info!("Interactor component session engine starting...");
    tracing::debug!("CLI arguments: {:?}", cli);

    match cli.command() {
        Commands::Config { action } => {
            Config::handle_command(&action)?;
        }
        Commands::Demo => {
            if cli.is_dry_run_mode() {
                println!("{}", "Dry-run mode configuration:".bold());
                println!("Config file: {}", cli.config_file);
                println!("Log level: {}", cli.effective_log_level());
                config.display_summary()?;
            } else {
                interactor::platform::demo::run_demo(&config).await?;
            }
        }
    }

    Ok(())
}
