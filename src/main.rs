use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use zcrm::configuration::Configuration;

mod cli;
use cli::execute_command;

/// Main entry point for the program
#[tokio::main]
async fn main() {
    // The configuration decides where log output goes, so it is loaded
    // before the logging subsystem comes up.
    let configuration = match Configuration::load_or_create_default() {
        Ok(configuration) => configuration,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ::std::process::exit(exitcode::CONFIG);
        }
    };

    // Initialize the logging subsystem
    match &configuration.application_log_file_path {
        Some(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("ERROR: cannot open log file {}: {}", path.display(), e);
                    ::std::process::exit(exitcode::CANTCREAT);
                }
            };
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
    }

    // Parse and execute the CLI command
    if let Err(e) = execute_command(configuration).await {
        eprintln!("ERROR: {}", e);
        ::std::process::exit(e.exit_code().code());
    }
}
