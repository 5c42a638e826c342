mod check;
mod cli;
mod error;
mod invocation;
mod report;
mod runner;
mod verdict;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cli::{CheckCommand, Cli};
use runner::ProcessRunner;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        CheckCommand::Check(args) => {
            let invocation = args.invocation();
            let markers = args.markers();

            let cancel = CancellationToken::new();
            let interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted, terminating the tool");
                    interrupt.cancel();
                }
            });

            tracing::info!(
                program = %invocation.program(),
                timeout_secs = invocation.timeout.as_secs(),
                "running drift check"
            );

            let runner = ProcessRunner::new();
            let outcome = check::check_with_cancel(&runner, &invocation, &markers, &cancel).await;
            let verdict_report = report::report(&outcome, &args.report_options());

            if args.json {
                let payload = serde_json::json!({
                    "verdict": outcome.verdict,
                    "exit_code": verdict_report.exit_code,
                    "result": outcome.result,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", verdict_report.message);
            }

            tracing::info!(
                verdict = ?outcome.verdict,
                exit_code = verdict_report.exit_code,
                "drift check complete"
            );

            std::process::exit(verdict_report.exit_code);
        }
    }
}
