//! linctl: Linear from the command line.
//!
//! Usage:
//!   linctl graphql '{ viewer { id name } }'
//!   cat query.graphql | linctl gql --vars '{"teamKey":"ENG"}'
//!   linctl auth status

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use linctl::auth::{ChainAuth, KeyringAuth};
use linctl::cli::{Cli, Commands};
use linctl::commands::{AuthCommand, CommandStatus, GraphqlCommand};
use linctl::output::{self, OutputFormat};
use linctl::{Error, GraphQLClient};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("LINCTL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_cli(&cli);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            report_error(format, &Error::Io(e));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, format)) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            report_error(format, &e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, format: OutputFormat) -> linctl::Result<CommandStatus> {
    let mut stdout = io::stdout().lock();
    let mut stdin = io::stdin();

    match cli.command {
        Commands::Graphql(args) => {
            // Credential check comes first: without it the query is never resolved.
            let auth_header = ChainAuth::from_env().require()?;

            let mut builder = GraphQLClient::builder()
                .endpoint(cli.endpoint.clone())
                .auth_header(auth_header);
            if let Some(secs) = cli.timeout {
                builder = builder.timeout(Duration::from_secs(secs));
            }
            let client = builder.build()?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            GraphqlCommand::new(client)
                .execute(&mut stdout, &args, &mut stdin, &cancel)
                .await
        }
        Commands::Auth { command } => {
            AuthCommand::new(KeyringAuth::default(), ChainAuth::from_env()).execute(
                &mut stdout,
                format,
                &command,
                &mut stdin,
            )
        }
    }
}

/// JSON errors go to stdout so scripts parsing stdout see them; text goes to stderr.
fn report_error(format: OutputFormat, err: &Error) {
    let message = err.to_string();
    let written = if format.is_json() {
        output::write_error(&mut io::stdout().lock(), format, &message)
    } else {
        output::write_error(&mut io::stderr().lock(), format, &message)
    };
    if written.is_err() {
        let _ = writeln!(io::stderr(), "{message}");
    }
}
