//! HTTP transport used by the GraphQL client.

pub mod http;

pub use http::{HttpReply, HttpTransport, TransportConfig, TransportError};
