//! OAuth token operations against the Zoho accounts server.
//!
//! The accounts server issues an access/refresh token pair in exchange
//! for a grant token generated in the developer console, and fresh
//! access tokens in exchange for the refresh token. Issued token sets
//! are persisted through the configured [`TokenStore`].

use crate::configuration::{Configuration, ConfigurationError};
use crate::model::TokenSet;
use crate::token_store::{self, TokenStore, TokenStoreError};
use chrono::Utc;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

pub const OAUTH_TOKEN_PATH: &str = "/oauth/v2/token";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),
    #[error("no token stored for user {user:?}")]
    NoStoredToken { user: String },
    #[error("stored token for user {user:?} has no refresh token")]
    MissingRefreshToken { user: String },
    #[error("token store error: {0}")]
    StoreError(#[from] TokenStoreError),
    #[error("configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
}

pub struct OAuthClient {
    accounts_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    current_user_email: String,
    access_type: Option<String>,
    client: reqwest::Client,
    store: Box<dyn TokenStore>,
}

impl OAuthClient {
    pub fn new_with_configuration(configuration: &Configuration) -> Result<OAuthClient, OAuthError> {
        let client = reqwest::Client::builder().user_agent("zcrm").build()?;
        Ok(OAuthClient {
            accounts_url: configuration.resolved_accounts_url(),
            client_id: configuration.client_id.clone(),
            client_secret: configuration.client_secret.clone(),
            redirect_uri: configuration.redirect_uri.clone(),
            current_user_email: configuration.current_user_email.clone(),
            access_type: configuration.access_type.clone(),
            client,
            store: token_store::from_configuration(configuration)?,
        })
    }

    pub fn current_user_email(&self) -> &str {
        &self.current_user_email
    }

    /// Exchanges a grant token for an access/refresh token pair and
    /// persists the result for the configured user.
    pub async fn generate_access_token(&self, grant_token: &str) -> Result<TokenSet, OAuthError> {
        let url = self.token_url();
        debug!("Exchanging grant token at {}...", url);

        let mut params: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", grant_token),
        ];
        if let Some(access_type) = &self.access_type {
            params.push(("access_type", access_type.as_str()));
        }

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();
        debug!("Token endpoint response status: {}", status);
        let body = response.text().await?;

        let tokens = parse_token_response(status, &body)?.with_obtained_at(Utc::now());
        self.store.put(&self.current_user_email, &tokens)?;
        Ok(tokens)
    }

    /// Exchanges the stored refresh token for a fresh access token and
    /// persists the result.
    pub async fn refresh_access_token(&self) -> Result<TokenSet, OAuthError> {
        let stored = self
            .stored_token()?
            .ok_or_else(|| OAuthError::NoStoredToken {
                user: self.current_user_email.clone(),
            })?;
        self.refresh_with(&stored).await
    }

    async fn refresh_with(&self, stored: &TokenSet) -> Result<TokenSet, OAuthError> {
        let refresh_token =
            stored
                .refresh_token
                .clone()
                .ok_or_else(|| OAuthError::MissingRefreshToken {
                    user: self.current_user_email.clone(),
                })?;

        let url = self.token_url();
        debug!("Refreshing access token at {}...", url);

        let params: Vec<(&str, &str)> = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();
        debug!("Token endpoint response status: {}", status);
        let body = response.text().await?;

        let mut tokens = parse_token_response(status, &body)?.with_obtained_at(Utc::now());
        // the refresh grant does not echo the refresh token back
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token);
        }
        self.store.put(&self.current_user_email, &tokens)?;
        Ok(tokens)
    }

    /// The token set currently persisted for the configured user.
    pub fn stored_token(&self) -> Result<Option<TokenSet>, OAuthError> {
        Ok(self.store.get(&self.current_user_email)?)
    }

    /// A usable access token for the configured user, refreshing the
    /// stored set through its refresh token when it has expired.
    pub async fn access_token(&self) -> Result<String, OAuthError> {
        let stored = self
            .stored_token()?
            .ok_or_else(|| OAuthError::NoStoredToken {
                user: self.current_user_email.clone(),
            })?;

        if stored.is_expired() && stored.refresh_token.is_some() {
            debug!(
                "Stored access token for {} has expired, refreshing...",
                self.current_user_email
            );
            let refreshed = self.refresh_with(&stored).await?;
            return Ok(refreshed.access_token);
        }

        Ok(stored.access_token)
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.accounts_url, OAUTH_TOKEN_PATH)
    }
}

/// Interprets a token endpoint response body.
///
/// The accounts server reports failures as `error` fields in otherwise
/// successful responses, so the body has to be inspected before the
/// HTTP status.
pub(crate) fn parse_token_response(status: StatusCode, body: &str) -> Result<TokenSet, OAuthError> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Token endpoint returned a non-JSON body: {}", body);
            return Err(OAuthError::JsonError(e));
        }
    };

    if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
        return Err(OAuthError::TokenExchangeFailed(format!(
            "{}: {}",
            error,
            exchange_failure_hint(error)
        )));
    }

    if !status.is_success() {
        return Err(OAuthError::TokenExchangeFailed(format!(
            "HTTP {}: {}",
            status, body
        )));
    }

    Ok(serde_json::from_value(value)?)
}

fn exchange_failure_hint(error: &str) -> &'static str {
    match error {
        "invalid_code" => "the grant token is invalid, expired, or already used",
        "invalid_client" => "the client id or client secret does not match the registered client",
        "invalid_redirect_uri" => "the redirect URI does not match the registered client",
        "access_denied" => "the request was rejected by the accounts server",
        _ => "the accounts server rejected the token request",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_successful_token_response() {
        let body = r#"{
            "access_token": "1000.8cb99dxxxxxxxxxxxxx9be93.9b8xxxxxxxxxxxxxxxf",
            "refresh_token": "1000.8cb99dxxxxxxxxxxxxx9be93.9b8xxxxxxxxxxxxxxxf",
            "api_domain": "https://www.zohoapis.com",
            "token_type": "Bearer",
            "expires_in": 3600
        }"#;
        let tokens = parse_token_response(StatusCode::OK, body).unwrap();
        assert!(tokens.access_token.starts_with("1000."));
        assert!(tokens.refresh_token.is_some());
        assert_eq!(tokens.expires_in, Some(3600));
        assert_eq!(tokens.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn error_field_in_a_successful_response_is_a_failure() {
        let body = r#"{"error": "invalid_code"}"#;
        let error = parse_token_response(StatusCode::OK, body).unwrap_err();
        match error {
            OAuthError::TokenExchangeFailed(message) => {
                assert!(message.contains("invalid_code"));
                assert!(message.contains("grant token"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unsuccessful_status_without_error_field_is_a_failure() {
        let body = r#"{"status": "down"}"#;
        let error = parse_token_response(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        assert!(matches!(error, OAuthError::TokenExchangeFailed(_)));
    }

    #[test]
    fn non_json_body_is_reported_as_a_parse_failure() {
        let error = parse_token_response(StatusCode::OK, "<html>gateway</html>").unwrap_err();
        assert!(matches!(error, OAuthError::JsonError(_)));
    }
}
