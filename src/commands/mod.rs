//! Subcommand implementations.

pub mod auth;
pub mod graphql;

pub use auth::AuthCommand;
pub use graphql::GraphqlCommand;

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// The response was printed but carried this many GraphQL errors
    /// (only reported under `--strict`).
    GraphQLErrors(usize),
    /// `auth status` found no credential.
    Unauthenticated,
}

impl CommandStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::Unauthenticated => 1,
            CommandStatus::GraphQLErrors(_) => 2,
        }
    }
}
