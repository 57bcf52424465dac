//! Outbound adapters implementing domain ports.
//!
//! - **http**: `reqwest`-backed resource client speaking JSON to the REST
//!   backend.
//!
//! Adapters translate between wire representations and domain types. They
//! contain no synchronization logic.

pub mod http;
