//! HTTP resource client adapter.
//!
//! A thin implementation of the `ResourceClient` port over the backend's
//! `/api/<collection>` endpoints.

mod client;

pub use client::{HttpClientError, HttpResourceClient};
