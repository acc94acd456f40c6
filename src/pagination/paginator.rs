//! Page-number paginator
//!
//! Walks `page_size:<n>,page_number:<m>` pages of one endpoint until a
//! short page, a singleton body, or a failed request ends the fetch.

use super::types::{
    EndpointSpec, FetchFailure, FetchOutcome, Page, PageBody, PaginationMode, DEFAULT_PAGE_SIZE,
};
use crate::http::{HttpClient, RequestConfig};
use crate::types::{JsonObject, JsonValue, Method};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// Anything that can produce the full record set of an endpoint
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every page of the endpoint
    async fn fetch_all(&self, endpoint: &EndpointSpec) -> FetchOutcome;

    /// Fetch one item by id from a path containing a placeholder
    async fn fetch_item(
        &self,
        path_template: &str,
        placeholder: &str,
        id: &str,
    ) -> crate::Result<JsonObject>;
}

/// Sequential paginator over the LMS API
#[derive(Debug, Clone)]
pub struct Paginator {
    client: HttpClient,
    default_page_size: u32,
    method: Method,
}

impl Paginator {
    /// Create a paginator issuing POST requests
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            default_page_size: DEFAULT_PAGE_SIZE,
            method: Method::POST,
        }
    }

    /// Set the page size used when an endpoint has no override
    #[must_use]
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        if page_size > 0 {
            self.default_page_size = page_size;
        }
        self
    }

    /// Set the HTTP method used for page requests
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Default page size
    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Fetch and decode a single page
    pub async fn fetch_page(
        &self,
        endpoint: &EndpointSpec,
        page_size: u32,
        page_number: u32,
    ) -> Result<Page, FetchFailure> {
        let path = endpoint.page_path(page_size, page_number);
        debug!("Fetching page {} from: {}", page_number, path);

        let response = self
            .client
            .request(self.method, &path, RequestConfig::default())
            .await
            .map_err(|e| FetchFailure::transport(page_number, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::status(page_number, status.as_u16(), &body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchFailure::transport(page_number, e.to_string()))?;

        let body: JsonValue = serde_json::from_str(&text).map_err(|e| {
            FetchFailure::decode(page_number, status.as_u16(), format!("invalid JSON: {e}"))
        })?;

        Ok(Page {
            number: page_number,
            body: PageBody::from(body),
            status: status.as_u16(),
        })
    }

    /// Fetch every page of an endpoint
    ///
    /// Never fails: transport and decode problems stop the loop and are
    /// reported through [`FetchOutcome::failure`], with the records of the
    /// pages fetched before the failure kept.
    pub async fn fetch_all(&self, endpoint: &EndpointSpec) -> FetchOutcome {
        let page_size = endpoint.effective_page_size(self.default_page_size);
        let mut outcome = FetchOutcome::new(page_size);
        let mut page_number = 1;

        info!("Starting fetch for endpoint: {}", endpoint.path);

        loop {
            let page = match self.fetch_page(endpoint, page_size, page_number).await {
                Ok(page) => page,
                Err(failure) => {
                    error!("Error fetching {}: {}", endpoint.path, failure);
                    outcome.fail(failure);
                    break;
                }
            };

            match (endpoint.mode, page.body) {
                (PaginationMode::Singleton, PageBody::Object(record)) => {
                    debug!("Singleton response for {}; storing as-is", endpoint.path);
                    outcome.records.push(record);
                    outcome.record_page(page.status);
                    break;
                }
                (PaginationMode::Singleton, PageBody::List(items)) => {
                    outcome.records.extend(items);
                    outcome.record_page(page.status);
                    break;
                }
                (PaginationMode::List, PageBody::List(items)) => {
                    let count = items.len();
                    debug!("Page {}: fetched {} records", page.number, count);
                    outcome.records.extend(items);
                    outcome.record_page(page.status);
                    if count < page_size as usize {
                        debug!("No more pages.");
                        break;
                    }
                    page_number += 1;
                }
                (PaginationMode::List, PageBody::Object(_)) => {
                    warn!(
                        "Page {} of {} is not a JSON array",
                        page.number, endpoint.path
                    );
                    outcome.fail(FetchFailure::decode(
                        page.number,
                        page.status,
                        "expected a JSON array of records",
                    ));
                    break;
                }
            }
        }

        info!(
            "Total pages fetched for {}: {} ({} records)",
            endpoint.path,
            outcome.page_count,
            outcome.records.len()
        );
        outcome
    }

    /// Fetch a single item, keeping only its non-list fields
    pub async fn fetch_item(
        &self,
        path_template: &str,
        placeholder: &str,
        id: &str,
    ) -> crate::Result<JsonObject> {
        let path = path_template.replace(placeholder, id);
        info!("Fetching item {} from: {}", id, path);

        let item: JsonValue = self.client.get_json(&path).await?;
        match item {
            JsonValue::Object(map) => Ok(map
                .into_iter()
                .filter(|(_, value)| !value.is_array())
                .collect()),
            other => Err(crate::Error::decode(format!(
                "expected a JSON object for item {id}, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl RecordSource for Paginator {
    async fn fetch_all(&self, endpoint: &EndpointSpec) -> FetchOutcome {
        Paginator::fetch_all(self, endpoint).await
    }

    async fn fetch_item(
        &self,
        path_template: &str,
        placeholder: &str,
        id: &str,
    ) -> crate::Result<JsonObject> {
        Paginator::fetch_item(self, path_template, placeholder, id).await
    }
}
