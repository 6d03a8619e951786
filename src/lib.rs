//! # linctl
//!
//! Command-line client for Linear's GraphQL API.
//!
//! ## Overview
//!
//! The library half of `linctl` is a small, schema-agnostic GraphQL execution
//! layer: it sends whatever query text and variables it is given, and hands
//! back the response envelope with `data` and `errors` kept apart. The binary
//! wraps it with argument parsing, credential lookup and output rendering.
//!
//! Two failure channels never mix:
//!
//! - **Call failures** ([`Error`]): the request could not be made, the server
//!   answered with a non-2xx status, or the body was not a GraphQL envelope.
//! - **GraphQL-level errors** ([`GraphQLResponse::errors`]): part of a
//!   successful response, possibly alongside partial `data`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linctl::GraphQLClient;
//!
//! #[tokio::main]
//! async fn main() -> linctl::Result<()> {
//!     let client = GraphQLClient::builder()
//!         .auth_header("lin_api_xxx")
//!         .build()?;
//!
//!     let response = client.execute("{ viewer { id name } }", None).await?;
//!     for err in response.errors() {
//!         eprintln!("GraphQL error: {err}");
//!     }
//!     let data: Option<serde_json::Value> = response.data_as()?;
//!     println!("{data:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | GraphQL client and builder |
//! | [`graphql`] | Request/response envelopes |
//! | [`transport`] | HTTP transport and its configuration |
//! | [`resolve`] | Query and variable resolution from CLI input |
//! | [`auth`] | Credential providers |
//! | [`output`] | Rendering for the CLI |
//! | [`cli`], [`commands`] | Argument parsing and subcommands |

pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod graphql;
pub mod output;
pub mod resolve;
pub mod transport;

pub use client::{GraphQLClient, GraphQLClientBuilder};
pub use graphql::{ExtraFields, GraphQLError, GraphQLRequest, GraphQLResponse, Location, PathSegment};
pub use resolve::{resolve_query, resolve_variables, QueryInput};
pub use tokio_util::sync::CancellationToken;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, QueryOrigin};
pub use transport::TransportError;
