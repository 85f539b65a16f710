//! Low-level REST transport for the Zoho CRM API.
//!
//! This module provides common HTTP request handling to keep the API
//! client methods small and consistent: base URL and timeout handling,
//! the `Zoho-oauthtoken` authorization header, decoding of the JSON
//! error envelope, and the mapping of `204 No Content` responses to
//! [`ApiError::NoContent`].

use crate::configuration::Configuration;
use crate::zoho_v2::{normalize_error_code, ApiError};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, trace};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Configuration for HTTP requests with common settings
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL for the API, including the version segment
    pub base_url: String,
    /// Default headers to include with all requests
    pub default_headers: HashMap<String, String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), "zcrm".to_string());

        Self {
            base_url: "https://www.zohoapis.com/crm/v2".to_string(),
            default_headers,
            timeout: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl RestConfig {
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self {
            base_url: configuration.resolved_api_base_url(),
            ..Self::default()
        }
    }
}

/// HTTP client wrapper with common request handling logic
#[derive(Clone)]
pub struct RestClient {
    client: Arc<Client>,
    config: RestConfig,
}

impl RestClient {
    pub fn new(config: RestConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Make a GET request to the specified path with automatic error handling
    pub async fn get<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        headers: &[(&str, String)],
        token: &str,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(self.url(path)).query(query);
        self.execute_request(self.apply_headers(request, headers, token))
            .await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T, B>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
        token: &str,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let request = self.client.post(self.url(path)).query(query).json(body);
        self.execute_request(self.apply_headers(request, &[], token))
            .await
    }

    /// Make a PUT request with a JSON body
    pub async fn put<T, B>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
        token: &str,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let request = self.client.put(self.url(path)).query(query).json(body);
        self.execute_request(self.apply_headers(request, &[], token))
            .await
    }

    /// Make a DELETE request to the specified path
    pub async fn delete<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.client.delete(self.url(path)).query(query);
        self.execute_request(self.apply_headers(request, &[], token))
            .await
    }

    /// Make a multipart POST request (file uploads)
    pub async fn post_multipart<T>(&self, path: &str, form: Form, token: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).multipart(form);
        self.execute_request(self.apply_headers(request, &[], token))
            .await
    }

    /// Make a GET request for a raw payload, returning the response
    /// headers alongside the bytes (file downloads).
    pub async fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<(reqwest::header::HeaderMap, Vec<u8>), ApiError> {
        let request = self.client.get(self.url(path)).query(query);
        let response = self.apply_headers(request, &[], token).send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(ApiError::NoContent);
        }
        if !status.is_success() {
            let body = response.text().await?;
            return Err(parse_error_body(status, &body));
        }

        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        Ok((headers, bytes.to_vec()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn apply_headers(
        &self,
        mut request: RequestBuilder,
        extra: &[(&str, String)],
        token: &str,
    ) -> RequestBuilder {
        request = request.header("Authorization", format!("Zoho-oauthtoken {}", token));
        for (key, value) in &self.config.default_headers {
            request = request.header(key.as_str(), value.as_str());
        }
        for (key, value) in extra {
            request = request.header(*key, value.as_str());
        }
        request
    }

    /// Execute an HTTP request with common error handling
    async fn execute_request<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(ApiError::NoContent);
        }

        let response_text = response.text().await?;
        if status.is_success() {
            trace!("Raw response text for deserialization: {}", response_text);
            match serde_json::from_str::<T>(&response_text) {
                Ok(result) => Ok(result),
                Err(e) => {
                    error!(
                        "Failed to deserialize response: {}. Raw response: {}",
                        e, response_text
                    );
                    Err(ApiError::JsonError(e))
                }
            }
        } else {
            Err(parse_error_body(status, &response_text))
        }
    }
}

/// Decodes the Zoho error envelope (`{"code": ..., "message": ...,
/// "details": ..., "status": "error"}`) carried by failed responses.
pub(crate) fn parse_error_body(status: StatusCode, body: &str) -> ApiError {
    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        code: String,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        details: Option<serde_json::Value>,
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::ApiResponse {
            code: normalize_error_code(&envelope.code),
            message: envelope.message.unwrap_or_default(),
            details: envelope.details,
            http_status: status,
        },
        Err(_) => ApiError::UnexpectedResponse(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_config_default() {
        let config = RestConfig::default();
        assert_eq!(config.base_url, "https://www.zohoapis.com/crm/v2");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.default_headers.get("User-Agent").unwrap(), "zcrm");
    }

    #[test]
    fn rest_config_follows_the_configuration() {
        let configuration = Configuration {
            sandbox: true,
            ..Configuration::default()
        };
        let config = RestConfig::from_configuration(&configuration);
        assert_eq!(config.base_url, "https://sandbox.zohoapis.com/crm/v2");
    }

    #[test]
    fn decodes_the_zoho_error_envelope() {
        let body = r#"{
            "code": "INVALID_DATA",
            "details": {"api_name": "Last_Name"},
            "message": "the data format is invalid",
            "status": "error"
        }"#;
        let error = parse_error_body(StatusCode::BAD_REQUEST, body);
        match error {
            ApiError::ApiResponse {
                code,
                message,
                http_status,
                ..
            } => {
                assert_eq!(code, "invalid_data");
                assert_eq!(message, "the data format is invalid");
                assert_eq!(http_status, StatusCode::BAD_REQUEST);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unparseable_error_body_falls_back_to_the_status() {
        let error = parse_error_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(
            error,
            ApiError::UnexpectedResponse(status) if status == StatusCode::BAD_GATEWAY
        ));
    }
}
