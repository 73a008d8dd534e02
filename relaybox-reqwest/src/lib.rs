#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod transport;

pub use transport::ReqwestTransport;

// Re-export the seam types for convenience in type annotations.
pub use relaybox::{Transport, TransportError, TransportResponse};
