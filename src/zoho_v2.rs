//! Zoho CRM V2 API client implementation.
//!
//! [`ZohoClient`] exposes one method per API operation. Every method
//! follows the same pattern: build the request, invoke the REST
//! transport, and on failure log the operation context before
//! propagating the original error. Read paths for which an empty result
//! is a meaningful answer (deleted records, related records, field
//! metadata) translate the server's `no content` error into an empty
//! result instead.

use crate::configuration::Configuration;
use crate::model::{
    ActionResponse, BulkPage, ConvertLeadResponse, ConvertLeadResult, EntityResponse, Field,
    FieldListResponse, FileDownload, ModuleListResponse, Record, RecordPageResponse, SearchQuery,
    TokenSet, TrashPageResponse, TrashRecord, TrashType, User, UserFilter, UserListResponse,
    ZohoModule,
};
use crate::oauth::{OAuthClient, OAuthError};
use crate::rest::{RestClient, RestConfig};
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::error;

/// The error code the server uses for queries that match no data.
pub const ERROR_CODE_NO_CONTENT: &str = "no_content";

/// Normalizes a server-reported error code for comparison: lower-cased,
/// spaces replaced with underscores.
pub fn normalize_error_code(code: &str) -> String {
    code.to_lowercase().replace(' ', "_")
}

/// True when the given error code is the `no content` sentinel, in any
/// of the spellings the server uses for it.
pub fn is_no_content_code(code: &str) -> bool {
    normalize_error_code(code) == ERROR_CODE_NO_CONTENT
}

/// Error emitted by the Zoho V2 API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Zoho API error {code} ({http_status}): {message}")]
    ApiResponse {
        code: String,
        message: String,
        details: Option<Value>,
        http_status: StatusCode,
    },
    #[error("no content")]
    NoContent,
    #[error("authentication error: {0}")]
    Auth(#[from] OAuthError),
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(StatusCode),
}

impl ApiError {
    /// True when the error means "no data for this query" rather than a
    /// real failure.
    pub fn is_no_content(&self) -> bool {
        match self {
            ApiError::NoContent => true,
            ApiError::ApiResponse { code, .. } => is_no_content_code(code),
            _ => false,
        }
    }
}

/// Maps a `no content` failure to an empty page, passing everything
/// else through untouched.
pub(crate) fn empty_page_on_no_content<T>(
    result: Result<BulkPage<T>, ApiError>,
) -> Result<BulkPage<T>, ApiError> {
    match result {
        Err(e) if e.is_no_content() => Ok(BulkPage::empty()),
        other => other,
    }
}

/// Parameters of a bulk record listing.
#[derive(Debug, Clone)]
pub struct GetRecordsParams {
    pub cvid: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: u32,
    pub per_page: u32,
    /// Sent as an `If-Modified-Since` header when present.
    pub modified_since: Option<DateTime<Utc>>,
}

impl Default for GetRecordsParams {
    fn default() -> Self {
        GetRecordsParams {
            cvid: None,
            sort_by: None,
            sort_order: None,
            page: 1,
            per_page: 200,
            modified_since: None,
        }
    }
}

pub struct ZohoClient {
    rest: RestClient,
    oauth: OAuthClient,
}

impl ZohoClient {
    pub fn new(configuration: &Configuration) -> Result<ZohoClient, ApiError> {
        let rest = RestClient::new(RestConfig::from_configuration(configuration))?;
        let oauth = OAuthClient::new_with_configuration(configuration)?;
        Ok(ZohoClient { rest, oauth })
    }

    pub fn from_parts(rest: RestClient, oauth: OAuthClient) -> ZohoClient {
        ZohoClient { rest, oauth }
    }

    /// Authentication failures are logged here and always propagated,
    /// never suppressed.
    async fn access_token(&self) -> Result<String, ApiError> {
        match self.oauth.access_token().await {
            Ok(token) => Ok(token),
            Err(e) => {
                error!(
                    "Authentication failed for user {}: {}",
                    self.oauth.current_user_email(),
                    e
                );
                Err(ApiError::Auth(e))
            }
        }
    }

    /// One page of records of a module.
    pub async fn get_records(
        &self,
        module: &str,
        params: GetRecordsParams,
    ) -> Result<BulkPage<Record>, ApiError> {
        let token = self.access_token().await?;

        let mut query: Vec<(&str, String)> = vec![
            ("page", params.page.to_string()),
            ("per_page", params.per_page.to_string()),
        ];
        if let Some(cvid) = &params.cvid {
            query.push(("cvid", cvid.clone()));
        }
        if let Some(sort_by) = &params.sort_by {
            query.push(("sort_by", sort_by.clone()));
        }
        if let Some(sort_order) = &params.sort_order {
            query.push(("sort_order", sort_order.clone()));
        }

        let mut headers: Vec<(&str, String)> = Vec::new();
        if let Some(modified_since) = &params.modified_since {
            headers.push(("If-Modified-Since", modified_since.to_rfc3339()));
        }

        let path = format!("/{}", module);
        match self
            .rest
            .get::<RecordPageResponse>(&path, &query, &headers, &token)
            .await
        {
            Ok(response) => Ok(record_page(module, response)),
            Err(e) => {
                error!("Failed to get records for module {}: {}", module, e);
                Err(e)
            }
        }
    }

    /// A single record by entity id.
    pub async fn get_record_by_id(&self, module: &str, id: &str) -> Result<Record, ApiError> {
        let token = self.access_token().await?;
        let path = format!("/{}/{}", module, id);
        match self
            .rest
            .get::<RecordPageResponse>(&path, &[], &[], &token)
            .await
        {
            Ok(response) => response
                .data
                .into_iter()
                .next()
                .map(|value| Record::from_value(module, value))
                .ok_or(ApiError::NoContent),
            Err(e) => {
                error!("Failed to get record {} from module {}: {}", id, module, e);
                Err(e)
            }
        }
    }

    /// One page of records matching a search query.
    pub async fn search_records(
        &self,
        module: &str,
        search: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<BulkPage<Record>, ApiError> {
        let token = self.access_token().await?;
        let (key, term) = search.query_param();
        let query: Vec<(&str, String)> = vec![
            (key, term.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];

        let path = format!("/{}/search", module);
        match self
            .rest
            .get::<RecordPageResponse>(&path, &query, &[], &token)
            .await
        {
            Ok(response) => Ok(record_page(module, response)),
            Err(e) => {
                error!(
                    "Failed to search records in module {} by {}: {}",
                    module, key, e
                );
                Err(e)
            }
        }
    }

    /// Inserts new records into a module.
    pub async fn insert_records(
        &self,
        module: &str,
        records: &[Record],
        trigger: Option<&[String]>,
    ) -> Result<Vec<EntityResponse>, ApiError> {
        let token = self.access_token().await?;
        let body = records_write_body(records, trigger, None);
        let path = format!("/{}", module);
        match self
            .rest
            .post::<ActionResponse, _>(&path, &[], &body, &token)
            .await
        {
            Ok(response) => Ok(response.data),
            Err(e) => {
                error!(
                    "Failed to insert {} records into module {}: {}",
                    records.len(),
                    module,
                    e
                );
                Err(e)
            }
        }
    }

    /// Updates existing records of a module. Each record must carry its
    /// entity id.
    pub async fn update_records(
        &self,
        module: &str,
        records: &[Record],
        trigger: Option<&[String]>,
    ) -> Result<Vec<EntityResponse>, ApiError> {
        let token = self.access_token().await?;
        let body = records_write_body(records, trigger, None);
        let path = format!("/{}", module);
        match self
            .rest
            .put::<ActionResponse, _>(&path, &[], &body, &token)
            .await
        {
            Ok(response) => Ok(response.data),
            Err(e) => {
                error!(
                    "Failed to update {} records in module {}: {}",
                    records.len(),
                    module,
                    e
                );
                Err(e)
            }
        }
    }

    /// Inserts or updates records depending on whether a duplicate
    /// already exists.
    pub async fn upsert_records(
        &self,
        module: &str,
        records: &[Record],
        duplicate_check_fields: Option<&[String]>,
    ) -> Result<Vec<EntityResponse>, ApiError> {
        let token = self.access_token().await?;
        let body = records_write_body(records, None, duplicate_check_fields);
        let path = format!("/{}/upsert", module);
        match self
            .rest
            .post::<ActionResponse, _>(&path, &[], &body, &token)
            .await
        {
            Ok(response) => Ok(response.data),
            Err(e) => {
                error!(
                    "Failed to upsert {} records into module {}: {}",
                    records.len(),
                    module,
                    e
                );
                Err(e)
            }
        }
    }

    /// Deletes records by entity id.
    pub async fn delete_records(
        &self,
        module: &str,
        ids: &[String],
    ) -> Result<Vec<EntityResponse>, ApiError> {
        let token = self.access_token().await?;
        let query: Vec<(&str, String)> = vec![("ids", ids.join(","))];
        let path = format!("/{}", module);
        match self
            .rest
            .delete::<ActionResponse>(&path, &query, &token)
            .await
        {
            Ok(response) => Ok(response.data),
            Err(e) => {
                error!(
                    "Failed to delete records [{}] from module {}: {}",
                    ids.join(","),
                    module,
                    e
                );
                Err(e)
            }
        }
    }

    /// One page of deleted records of a module. A `no content` answer is
    /// an empty page, not a failure.
    pub async fn get_deleted_records(
        &self,
        module: &str,
        trash_type: TrashType,
        modified_since: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> Result<BulkPage<TrashRecord>, ApiError> {
        let token = self.access_token().await?;
        let query: Vec<(&str, String)> = vec![
            ("type", trash_type.as_query_value().to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let mut headers: Vec<(&str, String)> = Vec::new();
        if let Some(modified_since) = &modified_since {
            headers.push(("If-Modified-Since", modified_since.to_rfc3339()));
        }

        let path = format!("/{}/deleted", module);
        let result = self
            .rest
            .get::<TrashPageResponse>(&path, &query, &headers, &token)
            .await
            .map(|response| BulkPage {
                data: response.data,
                info: response.info,
            });
        match empty_page_on_no_content(result) {
            Ok(page) => Ok(page),
            Err(e) => {
                error!("Failed to get deleted records for module {}: {}", module, e);
                Err(e)
            }
        }
    }

    /// One page of a record's related list. A `no content` answer is an
    /// empty page, not a failure.
    pub async fn get_related_records(
        &self,
        module: &str,
        record_id: &str,
        relation: &str,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<BulkPage<Record>, ApiError> {
        let token = self.access_token().await?;
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(sort_by) = sort_by {
            query.push(("sort_by", sort_by.to_string()));
        }
        if let Some(sort_order) = sort_order {
            query.push(("sort_order", sort_order.to_string()));
        }

        let path = format!("/{}/{}/{}", module, record_id, relation);
        let result = self
            .rest
            .get::<RecordPageResponse>(&path, &query, &[], &token)
            .await
            .map(|response| record_page(relation, response));
        match empty_page_on_no_content(result) {
            Ok(page) => Ok(page),
            Err(e) => {
                error!(
                    "Failed to get related {} records of record {} in module {}: {}",
                    relation, record_id, module, e
                );
                Err(e)
            }
        }
    }

    /// Links a record to a related record, attaching field values to the
    /// relation.
    pub async fn update_related_records(
        &self,
        module: &str,
        record_id: &str,
        related_module: &str,
        related_record_id: &str,
        field_values: &Map<String, Value>,
    ) -> Result<Vec<EntityResponse>, ApiError> {
        let token = self.access_token().await?;
        let body = related_record_body(related_record_id, field_values);
        let path = format!(
            "/{}/{}/{}/{}",
            module, record_id, related_module, related_record_id
        );
        match self
            .rest
            .put::<ActionResponse, _>(&path, &[], &body, &token)
            .await
        {
            Ok(response) => Ok(response.data),
            Err(e) => {
                error!(
                    "Failed to relate record {} of module {} to record {} of module {}: {}",
                    related_record_id, related_module, record_id, module, e
                );
                Err(e)
            }
        }
    }

    /// Converts a lead into an account/contact pair, optionally attached
    /// to an existing deal and assigned to a user.
    pub async fn convert_lead(
        &self,
        lead_id: &str,
        deal_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<ConvertLeadResult, ApiError> {
        let token = self.access_token().await?;
        let body = convert_lead_body(deal_id, user_id);
        let path = format!("/Leads/{}/actions/convert", lead_id);
        match self
            .rest
            .post::<ConvertLeadResponse, _>(&path, &[], &body, &token)
            .await
        {
            Ok(response) => response.data.into_iter().next().ok_or(ApiError::NoContent),
            Err(e) => {
                error!("Failed to convert lead {}: {}", lead_id, e);
                Err(e)
            }
        }
    }

    /// Field metadata of a module. A `no content` answer is an empty
    /// list, not a failure.
    pub async fn get_fields(&self, module: &str) -> Result<Vec<Field>, ApiError> {
        let token = self.access_token().await?;
        let query: Vec<(&str, String)> = vec![("module", module.to_string())];
        match self
            .rest
            .get::<FieldListResponse>("/settings/fields", &query, &[], &token)
            .await
        {
            Ok(response) => Ok(response.fields),
            Err(e) if e.is_no_content() => Ok(Vec::new()),
            Err(e) => {
                error!("Failed to get fields for module {}: {}", module, e);
                Err(e)
            }
        }
    }

    /// The modules of the organization.
    pub async fn get_modules(&self) -> Result<Vec<ZohoModule>, ApiError> {
        let token = self.access_token().await?;
        match self
            .rest
            .get::<ModuleListResponse>("/settings/modules", &[], &[], &token)
            .await
        {
            Ok(response) => Ok(response.modules),
            Err(e) => {
                error!("Failed to get modules: {}", e);
                Err(e)
            }
        }
    }

    /// The organization users matching a filter.
    pub async fn get_users(&self, filter: UserFilter) -> Result<Vec<User>, ApiError> {
        let token = self.access_token().await?;
        let query: Vec<(&str, String)> = vec![("type", filter.as_type_param().to_string())];
        match self
            .rest
            .get::<UserListResponse>("/users", &query, &[], &token)
            .await
        {
            Ok(response) => Ok(response.users),
            Err(e) => {
                error!(
                    "Failed to get users of type {}: {}",
                    filter.as_type_param(),
                    e
                );
                Err(e)
            }
        }
    }

    /// A single organization user by id.
    pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        let token = self.access_token().await?;
        let path = format!("/users/{}", user_id);
        match self
            .rest
            .get::<UserListResponse>(&path, &[], &[], &token)
            .await
        {
            Ok(response) => response.users.into_iter().next().ok_or(ApiError::NoContent),
            Err(e) => {
                error!("Failed to get user {}: {}", user_id, e);
                Err(e)
            }
        }
    }

    /// Uploads a file as an attachment of a record.
    pub async fn upload_file(
        &self,
        module: &str,
        record_id: &str,
        file_path: &Path,
    ) -> Result<EntityResponse, ApiError> {
        let token = self.access_token().await?;

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "attachment".to_string());
        let content = std::fs::read(file_path)?;
        let form = Form::new().part("file", Part::bytes(content).file_name(file_name));

        let path = format!("/{}/{}/Attachments", module, record_id);
        match self
            .rest
            .post_multipart::<ActionResponse>(&path, form, &token)
            .await
        {
            Ok(response) => response.data.into_iter().next().ok_or(ApiError::NoContent),
            Err(e) => {
                error!(
                    "Failed to upload {} to record {} of module {}: {}",
                    file_path.display(),
                    record_id,
                    module,
                    e
                );
                Err(e)
            }
        }
    }

    /// Downloads an attachment of a record.
    pub async fn download_file(
        &self,
        module: &str,
        record_id: &str,
        attachment_id: &str,
    ) -> Result<FileDownload, ApiError> {
        let token = self.access_token().await?;
        let path = format!("/{}/{}/Attachments/{}", module, record_id, attachment_id);
        match self.rest.get_bytes(&path, &[], &token).await {
            Ok((headers, content)) => Ok(FileDownload {
                file_name: attachment_file_name(&headers),
                content,
            }),
            Err(e) => {
                error!(
                    "Failed to download attachment {} of record {} in module {}: {}",
                    attachment_id, record_id, module, e
                );
                Err(e)
            }
        }
    }

    /// Exchanges a grant token for an access/refresh token pair.
    pub async fn generate_access_token(&self, grant_token: &str) -> Result<TokenSet, ApiError> {
        match self.oauth.generate_access_token(grant_token).await {
            Ok(tokens) => Ok(tokens),
            Err(e) => {
                error!("Failed to generate access token: {}", e);
                Err(ApiError::Auth(e))
            }
        }
    }

    /// Exchanges the stored refresh token for a fresh access token.
    pub async fn refresh_access_token(&self) -> Result<TokenSet, ApiError> {
        match self.oauth.refresh_access_token().await {
            Ok(tokens) => Ok(tokens),
            Err(e) => {
                error!("Failed to refresh access token: {}", e);
                Err(ApiError::Auth(e))
            }
        }
    }

    /// The token set currently persisted for the configured user.
    pub fn stored_access_token(&self) -> Result<Option<TokenSet>, ApiError> {
        match self.oauth.stored_token() {
            Ok(tokens) => Ok(tokens),
            Err(e) => {
                error!("Failed to read the stored access token: {}", e);
                Err(ApiError::Auth(e))
            }
        }
    }

    pub fn current_user_email(&self) -> &str {
        self.oauth.current_user_email()
    }
}

fn record_page(module: &str, response: RecordPageResponse) -> BulkPage<Record> {
    BulkPage {
        data: response
            .data
            .into_iter()
            .map(|value| Record::from_value(module, value))
            .collect(),
        info: response.info,
    }
}

pub(crate) fn records_write_body(
    records: &[Record],
    trigger: Option<&[String]>,
    duplicate_check_fields: Option<&[String]>,
) -> Value {
    let mut body = Map::new();
    body.insert(
        "data".to_string(),
        Value::Array(records.iter().map(Record::to_payload).collect()),
    );
    if let Some(trigger) = trigger {
        body.insert("trigger".to_string(), json!(trigger));
    }
    if let Some(fields) = duplicate_check_fields {
        body.insert("duplicate_check_fields".to_string(), json!(fields));
    }
    Value::Object(body)
}

pub(crate) fn related_record_body(
    related_record_id: &str,
    field_values: &Map<String, Value>,
) -> Value {
    let mut entry = field_values.clone();
    entry.insert(
        "id".to_string(),
        Value::String(related_record_id.to_string()),
    );
    json!({ "data": [entry] })
}

pub(crate) fn convert_lead_body(deal_id: Option<&str>, user_id: Option<&str>) -> Value {
    let mut entry = Map::new();
    if let Some(user_id) = user_id {
        entry.insert("assign_to".to_string(), json!({ "id": user_id }));
    }
    if let Some(deal_id) = deal_id {
        entry.insert("Deals".to_string(), json!({ "id": deal_id }));
    }
    json!({ "data": [entry] })
}

fn attachment_file_name(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let value = headers
        .get(reqwest::header::CONTENT_DISPOSITION)?
        .to_str()
        .ok()?;
    file_name_from_content_disposition(value)
}

pub(crate) fn file_name_from_content_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_codes_normalize_to_a_canonical_form() {
        assert_eq!(normalize_error_code("NO CONTENT"), "no_content");
        assert_eq!(normalize_error_code("No Content"), "no_content");
        assert_eq!(normalize_error_code("no_content"), "no_content");
        assert_eq!(normalize_error_code("INVALID_DATA"), "invalid_data");
    }

    #[test]
    fn normalization_is_insensitive_to_case_and_separator() {
        for code in ["NO CONTENT", "Invalid Token", "DUPLICATE_DATA", "success"] {
            let reformatted = code.to_uppercase().replace('_', " ");
            assert_eq!(normalize_error_code(code), normalize_error_code(&reformatted));
        }
    }

    #[test]
    fn recognizes_the_no_content_sentinel() {
        assert!(is_no_content_code("No Content"));
        assert!(is_no_content_code("NO_CONTENT"));
        assert!(!is_no_content_code("INVALID_DATA"));
    }

    fn no_content_api_response() -> ApiError {
        ApiError::ApiResponse {
            code: "NO CONTENT".to_string(),
            message: String::new(),
            details: None,
            http_status: StatusCode::NO_CONTENT,
        }
    }

    #[test]
    fn api_errors_classify_no_content() {
        assert!(ApiError::NoContent.is_no_content());
        assert!(no_content_api_response().is_no_content());
        assert!(!ApiError::UnexpectedResponse(StatusCode::BAD_GATEWAY).is_no_content());
        assert!(!ApiError::ApiResponse {
            code: "INVALID_DATA".to_string(),
            message: String::new(),
            details: None,
            http_status: StatusCode::BAD_REQUEST,
        }
        .is_no_content());
    }

    #[test]
    fn no_content_failures_become_empty_pages() {
        let suppressed = empty_page_on_no_content::<Record>(Err(ApiError::NoContent)).unwrap();
        assert!(suppressed.data.is_empty());
        assert!(suppressed.info.is_none());

        let suppressed =
            empty_page_on_no_content::<Record>(Err(no_content_api_response())).unwrap();
        assert!(suppressed.data.is_empty());
    }

    #[test]
    fn successful_pages_pass_through_the_suppression_helper() {
        let page = BulkPage {
            data: vec![1, 2, 3],
            info: None,
        };
        let passed = empty_page_on_no_content(Ok(page)).unwrap();
        assert_eq!(passed.data, vec![1, 2, 3]);
    }

    #[test]
    fn other_failures_pass_through_the_suppression_helper_unchanged() {
        let result = empty_page_on_no_content::<Record>(Err(ApiError::ApiResponse {
            code: "invalid_token".to_string(),
            message: "the token is not valid".to_string(),
            details: None,
            http_status: StatusCode::UNAUTHORIZED,
        }));
        match result {
            Err(ApiError::ApiResponse { code, message, .. }) => {
                assert_eq!(code, "invalid_token");
                assert_eq!(message, "the token is not valid");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn write_body_includes_only_the_requested_keys() {
        let mut record = Record::new("Leads");
        record.set_field_value("Last_Name", json!("Daly"));

        let plain = records_write_body(std::slice::from_ref(&record), None, None);
        assert!(plain.get("trigger").is_none());
        assert!(plain.get("duplicate_check_fields").is_none());
        assert_eq!(plain["data"][0]["Last_Name"], json!("Daly"));

        let triggers = vec!["workflow".to_string()];
        let with_trigger = records_write_body(std::slice::from_ref(&record), Some(&triggers), None);
        assert_eq!(with_trigger["trigger"], json!(["workflow"]));

        let fields = vec!["Email".to_string()];
        let with_fields = records_write_body(std::slice::from_ref(&record), None, Some(&fields));
        assert_eq!(with_fields["duplicate_check_fields"], json!(["Email"]));
    }

    #[test]
    fn related_record_body_carries_the_id_and_relation_fields() {
        let mut field_values = Map::new();
        field_values.insert("Unit_Price".to_string(), json!(42));
        let body = related_record_body("410888000000698006", &field_values);
        assert_eq!(body["data"][0]["id"], json!("410888000000698006"));
        assert_eq!(body["data"][0]["Unit_Price"], json!(42));
    }

    #[test]
    fn convert_lead_body_includes_only_the_provided_targets() {
        let bare = convert_lead_body(None, None);
        assert_eq!(bare["data"][0], json!({}));

        let full = convert_lead_body(Some("deal-1"), Some("user-1"));
        assert_eq!(full["data"][0]["Deals"]["id"], json!("deal-1"));
        assert_eq!(full["data"][0]["assign_to"]["id"], json!("user-1"));
    }

    #[test]
    fn extracts_the_file_name_from_a_content_disposition_header() {
        assert_eq!(
            file_name_from_content_disposition("attachment; filename=\"quote.pdf\""),
            Some("quote.pdf".to_string())
        );
        assert_eq!(
            file_name_from_content_disposition("attachment; filename=quote.pdf"),
            Some("quote.pdf".to_string())
        );
        assert_eq!(file_name_from_content_disposition("inline"), None);
    }
}
