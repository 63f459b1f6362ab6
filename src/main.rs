use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use getman_probe::cli::{Args, exit_code};
use getman_probe::http::request::ProbeRequest;
use getman_probe::report::Reporter;
use getman_probe::{Canceller, run_probe};

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.log_level())?;

    let mut reporter = Reporter::new(io::stdout(), io::stderr(), args.format, !args.raw);

    let prepared = args.to_config().and_then(|config| {
        let request = ProbeRequest::from_config(&config)?;
        Ok((config, request))
    });
    let (config, request) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            reporter.error(&err)?;
            return Ok(exit_code(&Err(err)));
        }
    };

    // One request, one connection: a single-threaded runtime is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let canceller = Canceller::new();
        let mut token = canceller.token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received interrupt, cancelling probe");
                canceller.cancel();
            }
        });

        reporter.banner(&request)?;
        anyhow::Ok(run_probe(&config, &mut reporter, &mut token).await)
    })?;

    match &result {
        Ok(outcome) => reporter.outcome(outcome)?,
        Err(err) => {
            tracing::debug!(kind = ?err.kind(), error = ?err, "probe failed");
            reporter.error(err)?;
        }
    }

    Ok(exit_code(&result))
}

/// Logs go to stderr so stdout carries only probe output.
fn init_logging(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}
