//! Pagination types
//!
//! Endpoint identity, per-page results and the accumulated outcome of a
//! paginated fetch.

use crate::error::{Error, ErrorKind, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Default number of records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 250;

/// How an endpoint pages its results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Returns a list per page; a short page is the last one
    #[default]
    List,
    /// Returns one aggregate object; a single fetch is the whole result
    Singleton,
}

/// Identity of one remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    /// Logical endpoint key (e.g. `USERS`)
    pub key: String,
    /// Path fragment appended to the base URL (e.g. `users`)
    pub path: String,
    /// Pagination mode
    pub mode: PaginationMode,
    /// Page size override
    pub page_size: Option<u32>,
}

impl EndpointSpec {
    /// Create a list-mode endpoint
    pub fn list(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            mode: PaginationMode::List,
            page_size: None,
        }
    }

    /// Create a singleton-mode endpoint
    pub fn singleton(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            mode: PaginationMode::Singleton,
            page_size: None,
        }
    }

    /// Set the page size override
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the pagination mode
    #[must_use]
    pub fn with_mode(mut self, mode: PaginationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Page size to request, falling back to the given default
    pub fn effective_page_size(&self, default: u32) -> u32 {
        self.page_size.filter(|size| *size > 0).unwrap_or(default)
    }

    /// Path of one page, relative to the base URL
    pub fn page_path(&self, page_size: u32, page_number: u32) -> String {
        format!(
            "{}/page_size:{page_size},page_number:{page_number}",
            self.path.trim_end_matches('/')
        )
    }
}

/// Decoded body of one page
#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    /// A list of records
    List(Vec<JsonValue>),
    /// Anything that is not a list
    Object(JsonValue),
}

impl PageBody {
    /// Number of records carried by this body
    pub fn len(&self) -> usize {
        match self {
            PageBody::List(items) => items.len(),
            PageBody::Object(_) => 1,
        }
    }

    /// Check if the body carries no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<JsonValue> for PageBody {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => PageBody::List(items),
            other => PageBody::Object(other),
        }
    }
}

/// One fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number
    pub number: u32,
    /// Decoded body
    pub body: PageBody,
    /// HTTP status observed
    pub status: u16,
}

/// Ordered records accumulated across all pages of one endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<JsonValue>,
}

impl RecordSet {
    /// Create an empty record set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record
    pub fn push(&mut self, record: JsonValue) {
        self.records.push(record);
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in fetch order
    pub fn iter(&self) -> std::slice::Iter<'_, JsonValue> {
        self.records.iter()
    }

    /// Borrow the records
    pub fn as_slice(&self) -> &[JsonValue] {
        &self.records
    }

    /// Consume into the underlying records
    pub fn into_inner(self) -> Vec<JsonValue> {
        self.records
    }
}

impl Extend<JsonValue> for RecordSet {
    fn extend<I: IntoIterator<Item = JsonValue>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl From<Vec<JsonValue>> for RecordSet {
    fn from(records: Vec<JsonValue>) -> Self {
        Self { records }
    }
}

impl FromIterator<JsonValue> for RecordSet {
    fn from_iter<I: IntoIterator<Item = JsonValue>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = JsonValue;
    type IntoIter = std::vec::IntoIter<JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a JsonValue;
    type IntoIter = std::slice::Iter<'a, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Why a paginated fetch stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Page number whose fetch failed
    pub page: u32,
    /// Transport or decode
    pub kind: ErrorKind,
    /// HTTP status of the failed page, if a response arrived
    pub status: Option<u16>,
    /// Human-readable description
    pub message: String,
}

impl FetchFailure {
    /// A request that produced no response
    pub fn transport(page: u32, message: impl Into<String>) -> Self {
        Self {
            page,
            kind: ErrorKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    /// A non-2xx response
    pub fn status(page: u32, status: u16, body: &str) -> Self {
        let mut message = format!("HTTP {status}");
        let body = body.trim();
        if !body.is_empty() {
            let snippet: String = body.chars().take(200).collect();
            message = format!("{message}: {snippet}");
        }
        Self {
            page,
            kind: ErrorKind::Transport,
            status: Some(status),
            message,
        }
    }

    /// A response whose body could not be decoded
    pub fn decode(page: u32, status: u16, message: impl Into<String>) -> Self {
        Self {
            page,
            kind: ErrorKind::Decode,
            status: Some(status),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failure on page {}: {}", self.kind, self.page, self.message)
    }
}

/// Result of fetching every page of one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Records in fetch order
    pub records: RecordSet,
    /// Number of pages fetched successfully
    pub page_count: u32,
    /// Page size that was requested
    pub page_size: u32,
    /// Status of the final response observed
    pub last_status: Option<u16>,
    /// Set when the fetch stopped on an error
    pub failure: Option<FetchFailure>,
}

impl FetchOutcome {
    /// Create an empty outcome for the given page size
    pub fn new(page_size: u32) -> Self {
        Self {
            records: RecordSet::new(),
            page_count: 0,
            page_size,
            last_status: None,
            failure: None,
        }
    }

    /// Record a successfully fetched page's status
    pub fn record_page(&mut self, status: u16) {
        self.page_count += 1;
        self.last_status = Some(status);
    }

    /// Stop with a failure
    pub fn fail(&mut self, failure: FetchFailure) {
        self.last_status = failure.status;
        self.failure = Some(failure);
    }

    /// Check whether every page was fetched
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.last_status.is_some_and(|s| (200..300).contains(&s))
    }

    /// Convert into the record set, or an error when the fetch was incomplete
    pub fn into_records(self, endpoint: &str) -> Result<RecordSet> {
        if self.is_complete() {
            return Ok(self.records);
        }
        match self.failure {
            Some(failure) if failure.kind == ErrorKind::Decode => Err(Error::decode(format!(
                "endpoint '{endpoint}': {failure}"
            ))),
            Some(failure) => Err(Error::IncompleteFetch {
                endpoint: endpoint.to_string(),
                message: failure.to_string(),
            }),
            None => Err(Error::IncompleteFetch {
                endpoint: endpoint.to_string(),
                message: "no successful response".to_string(),
            }),
        }
    }
}
