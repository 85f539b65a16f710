//! Data models for Zoho CRM entities.
//!
//! The structs in this module mirror the JSON shapes returned by the
//! Zoho CRM V2 API: records, bulk response pages, entity responses,
//! trash records, users, modules, fields, and OAuth token sets.

use crate::format::{Formattable, FormattingError, OutputFormat};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Allowance for clock skew when deciding whether a stored access token
/// is still usable.
const TOKEN_EXPIRY_SKEW_SECONDS: i64 = 60;

/// A record of a CRM module, identified by its entity id once it exists
/// on the server. Field values are carried verbatim as JSON values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    module: String,
    id: Option<String>,
    field_values: Map<String, Value>,
}

impl Record {
    pub fn new(module: &str) -> Record {
        Record {
            module: module.to_string(),
            id: None,
            field_values: Map::new(),
        }
    }

    pub fn with_id(module: &str, id: &str) -> Record {
        Record {
            module: module.to_string(),
            id: Some(id.to_string()),
            field_values: Map::new(),
        }
    }

    /// Build a record from one element of a bulk response `data` array.
    /// The `id` key is lifted out of the field map into the entity id.
    pub fn from_value(module: &str, value: Value) -> Record {
        let mut field_values = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = field_values
            .remove("id")
            .and_then(|v| v.as_str().map(|s| s.to_string()));
        Record {
            module: module.to_string(),
            id,
            field_values,
        }
    }

    pub fn module_api_name(&self) -> &str {
        &self.module
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_field_value(&mut self, name: &str, value: Value) {
        self.field_values.insert(name.to_string(), value);
    }

    pub fn field_value(&self, name: &str) -> Option<&Value> {
        self.field_values.get(name)
    }

    pub fn field_values(&self) -> &Map<String, Value> {
        &self.field_values
    }

    /// The JSON object sent in insert/update/upsert bodies. The entity id
    /// is included when present, which is what update requires.
    pub fn to_payload(&self) -> Value {
        let mut map = self.field_values.clone();
        if let Some(id) = &self.id {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        Value::Object(map)
    }
}

/// Pagination metadata attached to a bulk response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub more_records: Option<bool>,
}

impl PageInfo {
    /// True when the server reported a non-zero record count for the page.
    pub fn has_count(&self) -> bool {
        self.count.unwrap_or(0) > 0
    }

    /// True when the server indicated that another page is available.
    pub fn has_more(&self) -> bool {
        self.more_records.unwrap_or(false)
    }
}

/// One page of a bulk query: the items plus the pagination metadata the
/// server attached to them, when any.
#[derive(Debug, Clone)]
pub struct BulkPage<T> {
    pub data: Vec<T>,
    pub info: Option<PageInfo>,
}

impl<T> BulkPage<T> {
    pub fn empty() -> BulkPage<T> {
        BulkPage {
            data: Vec::new(),
            info: None,
        }
    }
}

/// Per-entity outcome of a write operation (insert, update, upsert,
/// delete, upload).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityResponse {
    pub code: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl EntityResponse {
    pub fn is_success(&self) -> bool {
        self.code == "SUCCESS"
    }

    /// The id of the affected entity, when the server reported one.
    pub fn entity_id(&self) -> Option<String> {
        self.details
            .as_ref()
            .and_then(|details| details.get("id"))
            .and_then(|id| id.as_str())
            .map(|id| id.to_string())
    }
}

/// A reference to a named entity, as embedded in owner/creator fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A soft- or hard-deleted record surfaced by the deleted-records query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrashRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub trash_type: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub deleted_time: Option<String>,
    #[serde(default)]
    pub deleted_by: Option<NamedRef>,
    #[serde(default)]
    pub created_by: Option<NamedRef>,
}

/// An organization user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub confirm: Option<bool>,
    #[serde(default)]
    pub role: Option<NamedRef>,
    #[serde(default)]
    pub profile: Option<NamedRef>,
}

/// Metadata of a CRM module (Leads, Accounts, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZohoModule {
    pub api_name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub singular_label: Option<String>,
    #[serde(default)]
    pub plural_label: Option<String>,
}

/// Metadata of a module field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Field {
    pub api_name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub field_label: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub custom_field: Option<bool>,
    #[serde(default)]
    pub length: Option<u32>,
}

/// The outcome of converting a lead: ids of the entities it became.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvertLeadResult {
    #[serde(rename = "Accounts", default)]
    pub accounts: Option<String>,
    #[serde(rename = "Contacts", default)]
    pub contacts: Option<String>,
    #[serde(rename = "Deals", default)]
    pub deals: Option<String>,
}

/// A downloaded attachment: the file name reported by the server, when
/// any, and the raw content.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDownload {
    pub file_name: Option<String>,
    pub content: Vec<u8>,
}

/// An OAuth token set as issued by the Zoho accounts server, stamped with
/// the time it was obtained so expiry can be computed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obtained_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    pub fn with_obtained_at(mut self, obtained_at: DateTime<Utc>) -> TokenSet {
        self.obtained_at = Some(obtained_at);
        self
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match (self.obtained_at, self.expires_in) {
            (Some(obtained_at), Some(expires_in)) => {
                Some(obtained_at + Duration::seconds(expires_in))
            }
            _ => None,
        }
    }

    /// A token of unknown age or lifetime is assumed usable; the server
    /// rejects it if not.
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => at + Duration::seconds(TOKEN_EXPIRY_SKEW_SECONDS) >= expires_at,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl Formattable for TokenSet {
    fn format(&self, format: &OutputFormat) -> Result<String, FormattingError> {
        match format {
            OutputFormat::Json(options) => {
                let json = if options.pretty {
                    serde_json::to_string_pretty(self)
                } else {
                    serde_json::to_string(self)
                };
                json.map_err(FormattingError::JsonSerializationError)
            }
            OutputFormat::Csv(options) => {
                let mut wtr = csv::Writer::from_writer(vec![]);

                if options.with_headers {
                    wtr.serialize((
                        "ACCESS_TOKEN",
                        "REFRESH_TOKEN",
                        "EXPIRES_IN",
                        "API_DOMAIN",
                        "TOKEN_TYPE",
                    ))?;
                }

                wtr.serialize((
                    &self.access_token,
                    self.refresh_token.clone().unwrap_or_default(),
                    self.expires_in.map(|v| v.to_string()).unwrap_or_default(),
                    self.api_domain.clone().unwrap_or_default(),
                    self.token_type.clone().unwrap_or_default(),
                ))?;

                let data = wtr.into_inner()?;
                String::from_utf8(data).map_err(FormattingError::Utf8Error)
            }
        }
    }
}

/// How to match records in a search query. Each variant maps to the
/// query parameter the search endpoint expects.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    Word(String),
    Phone(String),
    Email(String),
    Criteria(String),
}

impl SearchQuery {
    pub fn query_param(&self) -> (&'static str, &str) {
        match self {
            SearchQuery::Word(term) => ("word", term),
            SearchQuery::Phone(term) => ("phone", term),
            SearchQuery::Email(term) => ("email", term),
            SearchQuery::Criteria(term) => ("criteria", term),
        }
    }
}

/// Which kind of deleted records to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashType {
    #[default]
    All,
    Recycle,
    Permanent,
}

impl TrashType {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TrashType::All => "all",
            TrashType::Recycle => "recycle",
            TrashType::Permanent => "permanent",
        }
    }
}

/// Which subset of organization users to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserFilter {
    #[default]
    AllUsers,
    ActiveUsers,
    DeactiveUsers,
    AdminUsers,
    ActiveConfirmedAdmins,
}

impl UserFilter {
    pub fn as_type_param(&self) -> &'static str {
        match self {
            UserFilter::AllUsers => "AllUsers",
            UserFilter::ActiveUsers => "ActiveUsers",
            UserFilter::DeactiveUsers => "DeactiveUsers",
            UserFilter::AdminUsers => "AdminUsers",
            UserFilter::ActiveConfirmedAdmins => "ActiveConfirmedAdmins",
        }
    }
}

// Response envelopes. Each endpoint wraps its payload in a different
// top-level key; `#[serde(default)]` keeps decoding tolerant of the
// envelope arriving without the array at all.

#[derive(Debug, Clone, Deserialize)]
pub struct RecordPageResponse {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrashPageResponse {
    #[serde(default)]
    pub data: Vec<TrashRecord>,
    #[serde(default)]
    pub info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub data: Vec<EntityResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertLeadResponse {
    #[serde(default)]
    pub data: Vec<ConvertLeadResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserListResponse {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleListResponse {
    #[serde(default)]
    pub modules: Vec<ZohoModule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldListResponse {
    #[serde(default)]
    pub fields: Vec<Field>,
}
