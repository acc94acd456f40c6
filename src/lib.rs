// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # lms-etl
//!
//! Extracts resources from a paginated LMS REST API and loads them into CSV
//! files or relational tables.
//!
//! ## Features
//!
//! - **Page-number pagination**: `page_size:<n>,page_number:<m>` paths walked
//!   until a short page, with failures reported instead of raised
//! - **Flattening**: list-valued fields collapsed into comma-joined columns
//! - **Declared column types**: `int`, `datetime` and `varchar` coercion from
//!   a schema description file
//! - **Destinations**: CSV files, or MySQL / PostgreSQL / DuckDB tables via
//!   DuckDB, replacing or appending rows
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lms_etl::engine::{Dispatcher, ProcessDescriptor, ProcessKind};
//! use lms_etl::http::{HttpClient, HttpClientConfig};
//! use lms_etl::load::Loader;
//! use lms_etl::pagination::Paginator;
//! use lms_etl::schema::ColumnTypeMap;
//! use lms_etl::settings::load_settings;
//!
//! #[tokio::main]
//! async fn main() -> lms_etl::Result<()> {
//!     let settings = load_settings(None, "TALENT")?;
//!     let client = HttpClient::with_config(
//!         HttpClientConfig::builder()
//!             .base_url(&settings.base_url)
//!             .api_key(&settings.api_key)
//!             .build(),
//!     )?;
//!
//!     let mut dispatcher = Dispatcher::new(
//!         Paginator::new(client),
//!         settings,
//!         Loader::new(),
//!         ColumnTypeMap::new(),
//!     );
//!
//!     let mut descriptor = ProcessDescriptor::with_defaults(ProcessKind::Users);
//!     descriptor.params.use_csv = true;
//!     let outcome = dispatcher.dispatch(&descriptor).await;
//!     println!("{} rows written", outcome.rows_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Process Dispatcher                    │
//! │   process name -> {EndpointSpec, Flattener, LoadTarget}  │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴───────┬─────────────────────┐
//! │  Paginator   │      Flattener      │       Loader        │
//! ├──────────────┼─────────────────────┼─────────────────────┤
//! │ POST pages   │ branches -> csv     │ coercion            │
//! │ short page   │ join other lists    │ CSV file            │
//! │ singleton    │                     │ replace / append    │
//! └──────────────┴─────────────────────┴─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client
pub mod http;

/// Page-number pagination
pub mod pagination;

/// Nested field flattening
pub mod flatten;

/// Declared column types and coercion
pub mod schema;

/// Tabular data and CSV output
pub mod output;

/// Relational destinations via DuckDB
pub mod database;

/// Loading record sets into a target
pub mod load;

/// Settings and batch files
pub mod settings;

/// Process dispatch
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use engine::{Dispatcher, ProcessDescriptor, ProcessKind, ProcessOutcome};
pub use settings::{load_settings, IntegrationSettings};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
