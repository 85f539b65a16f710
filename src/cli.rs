use clap::ArgMatches;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use zcrm::commands::{
    create_cli_commands, COMMAND_AUTH, COMMAND_CONFIG, COMMAND_EXPORT,
    COMMAND_GENERATE_ACCESS_TOKEN, COMMAND_GET, COMMAND_PATH, COMMAND_REFRESH_ACCESS_TOKEN,
    PARAMETER_FORMAT, PARAMETER_GRANT_TOKEN, PARAMETER_OUTPUT, PARAMETER_PRETTY,
    PARAMETER_WITH_HEADERS,
};
use zcrm::configuration::{Configuration, ConfigurationError};
use zcrm::exit_codes::ZcrmExitCode;
use zcrm::format::{self, Formattable, FormattingError, OutputFormat, OutputFormatOptions};
use zcrm::oauth::OAuthError;
use zcrm::zoho_v2::{ApiError, ZohoClient};

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand")]
    UnsupportedSubcommand(String),
    /// Error related to configuration loading or management
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    /// Error related to data formatting
    #[error("Formatting error: {0}")]
    FormattingError(#[from] FormattingError),
    /// Error raised by the remote API or its transport
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    /// Error raised by the OAuth token operations
    #[error("Authentication error: {0}")]
    OAuthError(#[from] OAuthError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ZcrmExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) => ZcrmExitCode::UsageError,
            CliError::ConfigurationError(_) => ZcrmExitCode::ConfigError,
            CliError::FormattingError(_) => ZcrmExitCode::DataError,
            CliError::OAuthError(_) => ZcrmExitCode::AuthError,
            CliError::ApiError(e) => match e {
                ApiError::Auth(_) => ZcrmExitCode::AuthError,
                ApiError::HttpError(_) => ZcrmExitCode::NetworkError,
                _ => ZcrmExitCode::ApiError,
            },
        }
    }
}

fn extract_subcommand_name(sub_matches: &ArgMatches) -> String {
    let message = match sub_matches.subcommand() {
        Some(m) => m.0,
        None => "unknown",
    };

    message.to_string()
}

fn output_format(matches: &ArgMatches) -> OutputFormat {
    let format_str = matches
        .get_one::<String>(PARAMETER_FORMAT)
        .map(String::as_str)
        .unwrap_or(format::JSON);
    let options = OutputFormatOptions {
        with_headers: matches.get_flag(PARAMETER_WITH_HEADERS),
        pretty: matches.get_flag(PARAMETER_PRETTY),
    };
    OutputFormat::from_string_with_options(format_str, options).unwrap_or_default()
}

pub async fn execute_command(configuration: Configuration) -> Result<(), CliError> {
    let commands = create_cli_commands();

    match commands.subcommand() {
        // OAuth tokens
        Some((COMMAND_AUTH, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_GENERATE_ACCESS_TOKEN, sub_matches)) => {
                let grant_token = sub_matches.get_one::<String>(PARAMETER_GRANT_TOKEN).unwrap(); // safe, the argument is mandatory and Clap enforces it before this point
                let format = output_format(sub_matches);

                let client = ZohoClient::new(&configuration)?;
                info!("Start - generate access token");
                let tokens = client.generate_access_token(grant_token).await?;
                println!("{}", tokens.format(&format)?);
                info!("End - generate access token");

                Ok(())
            }
            Some((COMMAND_REFRESH_ACCESS_TOKEN, sub_matches)) => {
                let format = output_format(sub_matches);

                let client = ZohoClient::new(&configuration)?;
                match client.stored_access_token()? {
                    None => {
                        warn!(
                            "No token stored for user {:?}; run 'auth generate-access-token' first",
                            configuration.current_user_email
                        );
                        Ok(())
                    }
                    Some(tokens) if tokens.is_expired() && tokens.refresh_token.is_some() => {
                        info!("Start - refresh access token");
                        let tokens = client.refresh_access_token().await?;
                        println!("{}", tokens.format(&format)?);
                        info!("End - refresh access token");
                        Ok(())
                    }
                    Some(tokens) => {
                        println!("{}", tokens.format(&format)?);
                        Ok(())
                    }
                }
            }
            None => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
            _ => unreachable!(),
        },
        // Configuration
        Some((COMMAND_CONFIG, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_GET, sub_matches)) => {
                let format = output_format(sub_matches);
                println!("{}", configuration.format(&format)?);
                Ok(())
            }
            Some((COMMAND_PATH, _)) => {
                let path = Configuration::get_default_configuration_file_path()?;
                println!("{}", path.display());
                Ok(())
            }
            Some((COMMAND_EXPORT, sub_matches)) => {
                let path = sub_matches.get_one::<PathBuf>(PARAMETER_OUTPUT).unwrap(); // safe, the argument is mandatory
                configuration.save(path)?;
                Ok(())
            }
            None => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
            _ => unreachable!(),
        },
        None => Err(CliError::UnsupportedSubcommand(String::from("unknown"))),
        _ => unreachable!(),
    }
}
