//! Authentication command definitions.
//!
//! This module defines the CLI commands that drive the OAuth token
//! operations.

use crate::commands::params::{
    format_parameter, format_pretty_parameter, format_with_headers_parameter,
    grant_token_parameter, COMMAND_AUTH, COMMAND_GENERATE_ACCESS_TOKEN,
    COMMAND_REFRESH_ACCESS_TOKEN,
};
use clap::Command;

/// Create the authentication command with all its subcommands.
pub fn auth_command() -> Command {
    Command::new(COMMAND_AUTH)
        .about("OAuth token operations")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GENERATE_ACCESS_TOKEN)
                .about("Exchange a grant token for access and refresh tokens")
                .arg(grant_token_parameter())
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_REFRESH_ACCESS_TOKEN)
                .about("Show the stored access token for the configured user, refreshing it when expired")
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
}
