//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using
//! the clap crate. Command and parameter names live in `params` so the
//! dispatch code can refer to them by constant.

use clap::{Arg, ArgAction, ArgMatches, Command};

pub mod auth;
pub mod config;
pub mod params;

pub use params::{
    COMMAND_AUTH, COMMAND_CONFIG, COMMAND_EXPORT, COMMAND_GENERATE_ACCESS_TOKEN, COMMAND_GET,
    COMMAND_PATH, COMMAND_REFRESH_ACCESS_TOKEN, PARAMETER_FORMAT, PARAMETER_GRANT_TOKEN,
    PARAMETER_OUTPUT, PARAMETER_PRETTY, PARAMETER_WITH_HEADERS,
};

/// Create and configure all CLI commands and their arguments.
///
/// # Returns
///
/// An `ArgMatches` instance containing the parsed command-line arguments.
pub fn create_cli_commands() -> ArgMatches {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable verbose output for debugging"),
        )
        .subcommand(auth::auth_command())
        .subcommand(config::config_command())
        .get_matches()
}
