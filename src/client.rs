//! GraphQL client: one configured endpoint, one credential, one HTTP round
//! trip per `execute`.
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;

pub use builder::{GraphQLClientBuilder, DEFAULT_ENDPOINT};
pub use core::GraphQLClient;
