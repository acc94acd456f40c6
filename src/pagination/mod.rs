//! Pagination module
//!
//! Supports the path-style `page_size:<n>,page_number:<m>` pagination used by
//! TalentLMS-like APIs, in two modes:
//!
//! - **List**: keep requesting pages until one comes back shorter than the
//!   page size
//! - **Singleton**: the endpoint returns one aggregate object (e.g. rate
//!   limit status); one fetch is the whole result
//!
//! A non-2xx response or an undecodable body stops the loop. Records from
//! earlier pages are kept and the failure is reported on the outcome.

mod paginator;
mod types;

pub use paginator::{Paginator, RecordSource};
pub use types::{
    EndpointSpec, FetchFailure, FetchOutcome, Page, PageBody, PaginationMode, RecordSet,
    DEFAULT_PAGE_SIZE,
};

#[cfg(test)]
mod tests;
