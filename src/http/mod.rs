//! HTTP client module
//!
//! Provides the HTTP client used to talk to the LMS API.
//!
//! # Features
//!
//! - **Basic Auth**: API key as username, empty password
//! - **Timeouts**: A request timeout is always in force (30s default)
//! - **No Retries**: A failed request is reported once and never repeated

mod client;

pub use client::{
    BasicAuth, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig,
    DEFAULT_TIMEOUT,
};
