//! Configuration command definitions.

use crate::commands::params::{
    format_parameter, format_pretty_parameter, format_with_headers_parameter, output_parameter,
    COMMAND_CONFIG, COMMAND_EXPORT, COMMAND_GET, COMMAND_PATH,
};
use clap::Command;

/// Create the configuration command with all its subcommands.
pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Configuration operations")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Print the current configuration")
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
        .subcommand(Command::new(COMMAND_PATH).about("Print the configuration file location"))
        .subcommand(
            Command::new(COMMAND_EXPORT)
                .about("Write the current configuration to a file")
                .arg(output_parameter()),
        )
}
