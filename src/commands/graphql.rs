//! `linctl graphql`: run an arbitrary query and print the response envelope.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::GraphqlArgs;
use crate::client::GraphQLClient;
use crate::commands::CommandStatus;
use crate::graphql::GraphQLRequest;
use crate::output;
use crate::resolve::{resolve_query, resolve_variables, QueryInput};
use crate::Result;

pub struct GraphqlCommand {
    client: GraphQLClient,
}

impl GraphqlCommand {
    pub fn new(client: GraphQLClient) -> Self {
        Self { client }
    }

    /// Resolve the query and variables, execute, and print the envelope
    /// unaltered. GraphQL-level errors only change the outcome under
    /// `--strict`.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        args: &GraphqlArgs,
        input: &mut dyn QueryInput,
        cancel: &CancellationToken,
    ) -> Result<CommandStatus> {
        let query = resolve_query(args.query.as_slice(), input)?;
        let variables = resolve_variables(args.vars.as_deref())?;

        let request = GraphQLRequest::new(query)?
            .with_variables(variables)
            .with_operation_name(args.operation_name.clone());

        let response = self
            .client
            .execute_request_with_cancel(&request, cancel)
            .await?;

        output::write_response(writer, &response)?;

        if args.strict && response.has_errors() {
            let count = response.errors().len();
            warn!(errors = count, "response carried GraphQL errors");
            return Ok(CommandStatus::GraphQLErrors(count));
        }
        Ok(CommandStatus::Success)
    }
}
