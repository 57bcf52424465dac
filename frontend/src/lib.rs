//! Entity synchronization core for the rental management front end.
//!
//! The crate is laid out as a small hexagon:
//!
//! - [`domain`]: entity schemas, the collection cache, mutation coordinator,
//!   edit session state machine, and the screens that compose them.
//! - [`outbound`]: the `reqwest` adapter implementing the resource client
//!   port against the REST backend.
//! - [`inbound`]: the `rental-console` command-line front end.

pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
