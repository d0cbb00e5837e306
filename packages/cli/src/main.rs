use std::process::ExitCode;

use clap::Parser;
use post_office::{Cli, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(report) => {
            tracing::info!(
                "Wrote {} events to {:?} in {} ms",
                report.events,
                cli.output,
                report.duration_ms()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
