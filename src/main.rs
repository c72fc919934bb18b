use clap::Parser;

use batchcheck::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();

    let settings = match cli::load_and_merge_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::init_logger_from_settings(&settings) {
        eprintln!("Logger initialization error: {e}");
        std::process::exit(1);
    }

    if let Err(e) = cli::execute_command(&cli, settings) {
        tracing::error!(error = %e, "run aborted");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
