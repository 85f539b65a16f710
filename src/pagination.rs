//! Bulk pagination helpers.
//!
//! The bulk endpoints return at most one page per call, together with a
//! record count and a more-records flag. [`fetch_all_pages`] drives a
//! page-fetching closure until the server stops reporting more records,
//! accumulating every page that carried a record count. A `no content`
//! failure counts as an empty page and terminates the loop normally;
//! any other failure aborts it.
//!
//! The accumulated result is fully materialized, so very large modules
//! translate into proportionally large memory use.

use crate::model::{BulkPage, Record, TrashRecord, TrashType};
use crate::zoho_v2::{ApiError, GetRecordsParams, ZohoClient};
use chrono::{DateTime, Utc};
use std::future::Future;
use tracing::debug;

pub const DEFAULT_START_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Accumulates every page produced by `fetch_page(page, per_page)`,
/// starting from `start_page`, until the server reports no more records.
pub async fn fetch_all_pages<T, F, Fut>(
    mut fetch_page: F,
    start_page: u32,
    per_page: u32,
) -> Result<Vec<T>, ApiError>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<BulkPage<T>, ApiError>>,
{
    let mut records = Vec::new();
    let mut page = start_page;
    loop {
        let response = match fetch_page(page, per_page).await {
            Ok(response) => Some(response),
            Err(e) if e.is_no_content() => None,
            Err(e) => return Err(e),
        };

        let info = response.as_ref().and_then(|r| r.info.clone());
        if let Some(response) = response {
            if info.as_ref().map(|i| i.has_count()).unwrap_or(false) {
                records.extend(response.data);
            }
        }

        if !info.as_ref().map(|i| i.has_more()).unwrap_or(false) {
            break;
        }
        page += 1;
    }
    Ok(records)
}

/// All records of a module, fetched page by page. The page fields of
/// `params` seed the loop; the remaining fields are applied to every
/// page request.
pub async fn get_all_records(
    client: &ZohoClient,
    module: &str,
    params: &GetRecordsParams,
) -> Result<Vec<Record>, ApiError> {
    fetch_all_pages(
        |page, per_page| {
            debug!("Getting records for module {} and page {}...", module, page);
            let mut page_params = params.clone();
            page_params.page = page;
            page_params.per_page = per_page;
            client.get_records(module, page_params)
        },
        params.page,
        params.per_page,
    )
    .await
}

/// All deleted records of a module, fetched page by page.
pub async fn get_all_deleted_records(
    client: &ZohoClient,
    module: &str,
    trash_type: TrashType,
    modified_since: Option<DateTime<Utc>>,
) -> Result<Vec<TrashRecord>, ApiError> {
    fetch_all_pages(
        |page, per_page| {
            debug!(
                "Getting deleted records for module {} and page {}...",
                module, page
            );
            client.get_deleted_records(module, trash_type, modified_since, page, per_page)
        },
        DEFAULT_START_PAGE,
        DEFAULT_PAGE_SIZE,
    )
    .await
}
