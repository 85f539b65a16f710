//! Command and parameter name constants plus shared argument builders.
//!
//! Keeping the names in one place ensures the command definitions and
//! the dispatch code cannot drift apart.

use crate::format;
use clap::{Arg, ArgAction};
use std::path::PathBuf;

// Command name constants
pub const COMMAND_AUTH: &str = "auth";
pub const COMMAND_GENERATE_ACCESS_TOKEN: &str = "generate-access-token";
pub const COMMAND_REFRESH_ACCESS_TOKEN: &str = "refresh-access-token";
pub const COMMAND_CONFIG: &str = "config";
pub const COMMAND_GET: &str = "get";
pub const COMMAND_PATH: &str = "path";
pub const COMMAND_EXPORT: &str = "export";

// Parameter name constants
pub const PARAMETER_GRANT_TOKEN: &str = "grant-token";
pub const PARAMETER_FORMAT: &str = "format";
pub const PARAMETER_OUTPUT: &str = "output";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_WITH_HEADERS: &str = "headers";

pub fn grant_token_parameter() -> Arg {
    Arg::new(PARAMETER_GRANT_TOKEN)
        .value_name("GRANT_TOKEN")
        .required(true)
        .help("Grant token generated in the Zoho developer console")
}

pub fn format_parameter() -> Arg {
    Arg::new(PARAMETER_FORMAT)
        .short('f')
        .long("format")
        .default_value(format::JSON)
        .value_parser(["json", "csv"])
        .help("Output format")
}

pub fn format_pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long("pretty")
        .action(ArgAction::SetTrue)
        .help("Pretty-print JSON output")
}

pub fn format_with_headers_parameter() -> Arg {
    Arg::new(PARAMETER_WITH_HEADERS)
        .long("headers")
        .action(ArgAction::SetTrue)
        .help("Include a header row in CSV output")
}

pub fn output_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT)
        .short('o')
        .long("output")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Output file path")
}
