//! Vigil CLI entry point.

use clap::Parser;

use vigil::cli::{Cli, Commands};
use vigil::infrastructure::config::ConfigLoader;
use vigil::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli
        .config
        .as_ref()
        .map_or_else(ConfigLoader::load, ConfigLoader::load_from_file)
    {
        Ok(config) => config,
        Err(err) => vigil::cli::handle_error(&err, cli.json),
    };

    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(err) => vigil::cli::handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Review(args) => {
            vigil::cli::commands::review::execute(args, cli.json, &config).await
        }
        Commands::Record(args) => vigil::cli::commands::record::execute(&args, cli.json, &config),
        Commands::History => vigil::cli::commands::history::execute(cli.json, &config),
    };

    if let Err(err) = result {
        vigil::cli::handle_error(&err, cli.json);
    }
}
