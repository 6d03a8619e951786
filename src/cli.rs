//! Command-line argument parsing with clap.

use clap::{Args, Parser, Subcommand};

use crate::client::DEFAULT_ENDPOINT;

/// linctl - Linear from the command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "linctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print output (including errors) as JSON.
    #[arg(long, global = true, conflicts_with = "plaintext")]
    pub json: bool,

    /// Print plain text without decoration.
    #[arg(long, global = true)]
    pub plaintext: bool,

    /// GraphQL endpoint URL.
    #[arg(long, global = true, env = "LINCTL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds (overrides LINCTL_HTTP_TIMEOUT_SECS).
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// GraphQL query
    #[command(
        visible_aliases = ["gql", "gl"],
        long_about = "Run a GraphQL query against Linear's API.\n\n\
            Examples:\n  \
            linctl graphql '{ viewer { id name } }'\n  \
            cat query.graphql | linctl graphql --vars '{\"teamKey\":\"ENG\"}'"
    )]
    Graphql(GraphqlArgs),

    /// Manage the stored credential.
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

/// Arguments for `graphql`.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphqlArgs {
    /// Query text; read from stdin when omitted.
    pub query: Vec<String>,

    /// JSON object of GraphQL variables
    #[arg(long)]
    pub vars: Option<String>,

    /// operationName to send with the request.
    #[arg(long)]
    pub operation_name: Option<String>,

    /// Exit with status 2 when the response carries GraphQL errors.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommands {
    /// Store an API key or OAuth token in the OS keyring.
    Login {
        /// Token to store; read from stdin when omitted.
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove the stored credential.
    Logout,
    /// Show whether a credential is available and where it comes from.
    Status,
}
