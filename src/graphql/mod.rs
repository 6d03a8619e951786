//! GraphQL wire envelopes.
//!
//! The request side is a thin serializable value; the response side keeps
//! `data`, `extensions` and unknown keys as raw JSON so consumers can decode
//! them into whatever shape they need, and keeps `errors` alongside `data`
//! rather than folding one into the other. A response may carry data,
//! errors, or both.

mod request;
mod response;

pub use request::GraphQLRequest;
pub use response::{ExtraFields, GraphQLError, GraphQLResponse, Location, PathSegment};
