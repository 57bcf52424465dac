//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod resource_client;

pub use resource_client::{ResourceClient, ResourceClientError};
