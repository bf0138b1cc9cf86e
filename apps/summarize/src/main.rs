use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpSummaryTransport, SubmissionOrchestrator, SubmitOutcome, TokioSleeper};
use shared::domain::WorkflowState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod selection;

/// Upload one document (PDF, DOCX or TXT) and print its summary.
#[derive(Parser, Debug)]
#[command(name = "summarize", version)]
struct Args {
    /// Document to summarize. Selecting more than one is rejected.
    files: Vec<PathBuf>,
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    max_retries: Option<u32>,
    #[arg(long)]
    retry_delay_ms: Option<u64>,
    #[arg(long)]
    max_file_bytes: Option<u64>,
    /// Print the final workflow state as JSON.
    #[arg(long)]
    json: bool,
    /// Also write the summary to this file.
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = config::load_settings(&args.config);
    if let Some(v) = args.endpoint.clone() {
        settings.endpoint = v;
    }
    if let Some(v) = args.timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = args.max_retries {
        settings.max_retries = v;
    }
    if let Some(v) = args.retry_delay_ms {
        settings.retry_delay_ms = v;
    }
    if args.max_file_bytes.is_some() {
        settings.max_file_bytes = args.max_file_bytes;
    }

    let transport =
        HttpSummaryTransport::new(settings.endpoint.clone(), settings.request_timeout())
            .context("failed to set up summary client")?;
    let orchestrator = Arc::new(SubmissionOrchestrator::new_with_dependencies(
        Arc::new(transport),
        Arc::new(TokioSleeper),
        settings.intake_policy(),
        settings.retry_policy(),
    ));
    info!(endpoint = %orchestrator.endpoint(), "summarizer ready");

    let selection = selection::candidates_from_paths(&args.files)?;

    tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, resetting workflow");
                orchestrator.reset();
            }
        }
    });

    let outcome = orchestrator.submit_selection(selection).await;

    if args.json {
        println!("{}", render::render_json(&outcome)?);
    } else {
        let rendered = render::render_text(&outcome);
        for line in &rendered.stderr {
            eprintln!("{line}");
        }
        if let Some(stdout) = rendered.stdout {
            println!("{stdout}");
        }
    }

    if let (Some(path), Some(summary)) = (&args.output, orchestrator.state().summary()) {
        tokio::fs::write(path, summary)
            .await
            .with_context(|| format!("failed to write summary to '{}'", path.display()))?;
        info!(path = %path.display(), "summary written");
    }

    Ok(ExitCode::from(exit_status(&outcome)))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_status(outcome: &SubmitOutcome) -> u8 {
    match outcome {
        SubmitOutcome::NoSelection => 0,
        SubmitOutcome::Completed {
            state: WorkflowState::Succeeded { .. },
            ..
        } => 0,
        SubmitOutcome::Rejected(_) => 2,
        SubmitOutcome::Superseded => 130,
        SubmitOutcome::Ignored | SubmitOutcome::Completed { .. } => 1,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use shared::domain::ErrorKind;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn accepts_multiple_paths_so_intake_can_reject_them() {
        let args =
            Args::try_parse_from(["summarize", "a.pdf", "b.pdf", "--json"]).expect("parse");
        assert_eq!(args.files.len(), 2);
        assert!(args.json);
    }

    #[test]
    fn exit_codes_follow_outcome() {
        let failed = SubmitOutcome::Completed {
            state: WorkflowState::Failed {
                message: "boom".into(),
                kind: ErrorKind::ServerFailure,
            },
            attempts: 3,
        };
        assert_eq!(exit_status(&failed), 1);
        assert_eq!(exit_status(&SubmitOutcome::NoSelection), 0);
        assert_eq!(exit_status(&SubmitOutcome::Superseded), 130);
    }
}
