use crate::format::{Formattable, FormattingError, OutputFormat};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};
use tracing::debug;
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "zcrm";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const DEFAULT_TOKEN_FILE_NAME: &str = "tokens.json";
pub const CONFIG_DIR_ENV_VAR: &str = "ZCRM_CONFIG_DIR";

pub const DEFAULT_API_BASE_URL: &str = "https://www.zohoapis.com";
pub const DEFAULT_SANDBOX_API_BASE_URL: &str = "https://sandbox.zohoapis.com";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.zoho.com";
pub const DEFAULT_API_VERSION: &str = "v2";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause:?}")]
    FailedToLoadData { cause: Box<dyn std::error::Error> },
    #[error("failed to write configuration data to file, because of: {cause:?}")]
    FailedToWriteData { cause: Box<dyn std::error::Error> },
    #[error("{cause:?}")]
    FormattingError {
        #[from]
        cause: FormattingError,
    },
}

/// Which backend keeps the OAuth token set between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceHandler {
    #[default]
    File,
    Keyring,
}

/// Connection configuration for the Zoho CRM API.
///
/// Credential and behavioral values are opaque and passed through
/// verbatim; presence is the only invariant enforced here. Optional keys
/// fall back to the production Zoho endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub current_user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_log_file_path: Option<PathBuf>,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_url: Option<Url>,
    #[serde(default)]
    pub persistence_handler: PersistenceHandler,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_persistence_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Configuration {
    /// The base URL all CRM request paths are appended to, including the
    /// API version segment. The sandbox flag switches hosts unless an
    /// explicit base URL overrides both.
    pub fn resolved_api_base_url(&self) -> String {
        let base = match &self.api_base_url {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None if self.sandbox => DEFAULT_SANDBOX_API_BASE_URL.to_string(),
            None => DEFAULT_API_BASE_URL.to_string(),
        };
        let version = self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION);
        format!("{}/crm/{}", base, version)
    }

    pub fn resolved_accounts_url(&self) -> String {
        match &self.accounts_url {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => DEFAULT_ACCOUNTS_URL.to_string(),
        }
    }

    pub fn resolved_token_persistence_path(&self) -> Result<PathBuf, ConfigurationError> {
        if let Some(path) = &self.token_persistence_path {
            return Ok(path.clone());
        }
        let mut path = Self::configuration_directory()?;
        path.push(DEFAULT_TOKEN_FILE_NAME);
        Ok(path)
    }

    fn configuration_directory() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV_VAR) {
            return Ok(PathBuf::from(config_dir_str));
        }

        match config_dir() {
            Some(mut configuration_directory) => {
                configuration_directory.push(DEFAULT_APPLICATION_ID);
                Ok(configuration_directory)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        let mut path = Self::configuration_directory()?;
        path.push(DEFAULT_CONFIGURATION_FILE_NAME);
        Ok(path)
    }

    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading configuration from {}...", default_file_path.display());
        Configuration::load_from_file(default_file_path)
    }

    /// Load the default configuration, creating a default one if none
    /// exists yet. This is more user-friendly for first-time users.
    pub fn load_or_create_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!(
            "Loading or creating configuration from {}...",
            default_file_path.display()
        );

        match Configuration::load_from_file(default_file_path.clone()) {
            Ok(configuration) => Ok(configuration),
            Err(e) => {
                let not_found = match &e {
                    ConfigurationError::FailedToLoadData { cause } => cause
                        .downcast_ref::<std::io::Error>()
                        .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                        .unwrap_or(false),
                    _ => false,
                };
                if !not_found {
                    return Err(e);
                }

                debug!("Configuration file not found, creating default configuration");
                let default_configuration = Configuration::default();
                default_configuration.save(&default_file_path)?;
                Ok(default_configuration)
            }
        }
    }

    pub fn load_from_file(path: PathBuf) -> Result<Configuration, ConfigurationError> {
        match fs::read_to_string(path) {
            Ok(configuration) => {
                let configuration = serde_yaml::from_str(&configuration);
                match configuration {
                    Ok(configuration) => Ok(configuration),
                    Err(cause) => Err(ConfigurationError::FailedToLoadData {
                        cause: Box::new(cause),
                    }),
                }
            }
            Err(cause) => Err(ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            }),
        }
    }

    pub fn write(&self, writer: Box<dyn Write>) -> Result<(), ConfigurationError> {
        match serde_yaml::to_writer(writer, self) {
            Ok(()) => Ok(()),
            Err(e) => Err(ConfigurationError::FailedToWriteData { cause: Box::new(e) }),
        }
    }

    pub fn save(&self, path: &PathBuf) -> Result<(), ConfigurationError> {
        // the parent directory may not exist yet on first run
        let configuration_directory = path.parent();
        match configuration_directory {
            Some(path) => match fs::create_dir_all(path) {
                Ok(()) => (),
                Err(_) => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
            },
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        let file = File::create(path);
        match file {
            Ok(file) => {
                let writer: Box<dyn Write> = Box::new(file);
                self.write(writer)
            }
            Err(e) => Err(ConfigurationError::FailedToWriteData { cause: Box::new(e) }),
        }
    }

    pub fn save_to_default(&self) -> Result<(), ConfigurationError> {
        self.save(&Self::get_default_configuration_file_path()?)
    }
}

impl Formattable for Configuration {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => {
                if options.pretty {
                    Ok(serde_json::to_string_pretty(self)?)
                } else {
                    Ok(serde_json::to_string(self)?)
                }
            }
            OutputFormat::Csv(options) => {
                let mut wtr = csv::Writer::from_writer(vec![]);

                if options.with_headers {
                    wtr.serialize((
                        "CLIENT_ID",
                        "CURRENT_USER_EMAIL",
                        "SANDBOX",
                        "API_BASE_URL",
                        "ACCOUNTS_URL",
                    ))?;
                }

                wtr.serialize((
                    &self.client_id,
                    &self.current_user_email,
                    self.sandbox,
                    self.resolved_api_base_url(),
                    self.resolved_accounts_url(),
                ))?;

                let data = wtr.into_inner()?;
                String::from_utf8(data).map_err(FormattingError::Utf8Error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_configuration() -> Configuration {
        Configuration {
            client_id: "1000.SAMPLECLIENTID".to_string(),
            client_secret: "samplesecret".to_string(),
            redirect_uri: "https://example.com/oauth/callback".to_string(),
            current_user_email: "crm@example.com".to_string(),
            ..Configuration::default()
        }
    }

    #[test]
    fn resolves_the_production_api_base_url_by_default() {
        let configuration = sample_configuration();
        assert_eq!(
            configuration.resolved_api_base_url(),
            "https://www.zohoapis.com/crm/v2"
        );
    }

    #[test]
    fn sandbox_flag_switches_the_api_host() {
        let configuration = Configuration {
            sandbox: true,
            ..sample_configuration()
        };
        assert_eq!(
            configuration.resolved_api_base_url(),
            "https://sandbox.zohoapis.com/crm/v2"
        );
    }

    #[test]
    fn explicit_base_url_and_version_override_the_defaults() {
        let configuration = Configuration {
            api_base_url: Some(Url::parse("https://www.zohoapis.eu/").unwrap()),
            api_version: Some("v2.1".to_string()),
            ..sample_configuration()
        };
        assert_eq!(
            configuration.resolved_api_base_url(),
            "https://www.zohoapis.eu/crm/v2.1"
        );
    }

    #[test]
    fn resolves_the_default_accounts_url() {
        assert_eq!(
            sample_configuration().resolved_accounts_url(),
            "https://accounts.zoho.com"
        );
    }

    #[test]
    fn explicit_token_persistence_path_wins() {
        let configuration = Configuration {
            token_persistence_path: Some(PathBuf::from("/tmp/zoho-tokens.json")),
            ..sample_configuration()
        };
        assert_eq!(
            configuration.resolved_token_persistence_path().unwrap(),
            PathBuf::from("/tmp/zoho-tokens.json")
        );
    }

    #[test]
    fn saves_and_reloads_a_configuration() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join(DEFAULT_CONFIGURATION_FILE_NAME);

        let configuration = sample_configuration();
        configuration.save(&path).unwrap();

        let reloaded = Configuration::load_from_file(path).unwrap();
        assert_eq!(reloaded, configuration);
    }

    #[test]
    fn parses_a_configuration_document() {
        let document = r#"
client_id: "1000.SAMPLECLIENTID"
client_secret: "samplesecret"
redirect_uri: "https://example.com/oauth/callback"
current_user_email: "crm@example.com"
application_log_file_path: "/var/log/zcrm.log"
sandbox: true
api_version: "v2.1"
persistence_handler: keyring
timezone: "Europe/Paris"
"#;
        let configuration: Configuration = serde_yaml::from_str(document).unwrap();
        assert_eq!(configuration.client_id, "1000.SAMPLECLIENTID");
        assert!(configuration.sandbox);
        assert_eq!(
            configuration.application_log_file_path,
            Some(PathBuf::from("/var/log/zcrm.log"))
        );
        assert_eq!(configuration.api_version.as_deref(), Some("v2.1"));
        assert_eq!(
            configuration.persistence_handler,
            PersistenceHandler::Keyring
        );
        assert_eq!(configuration.timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let configuration: Configuration = serde_yaml::from_str("client_id: abc").unwrap();
        assert_eq!(configuration.client_id, "abc");
        assert!(!configuration.sandbox);
        assert_eq!(configuration.persistence_handler, PersistenceHandler::File);
        assert!(configuration.api_base_url.is_none());
    }
}
