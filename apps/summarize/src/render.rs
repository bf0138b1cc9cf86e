//! Text and JSON rendering of workflow outcomes.

use client_core::SubmitOutcome;
use serde_json::{json, Value};
use shared::{domain::WorkflowState, error::RejectionReason};

/// Machine readable report; terminal workflow states keep their own fields.
pub fn report(outcome: &SubmitOutcome) -> serde_json::Result<Value> {
    let value = match outcome {
        SubmitOutcome::NoSelection => json!({ "state": "no_selection" }),
        SubmitOutcome::Rejected(reason) => json!({
            "state": "rejected",
            "reasons": reason.messages(),
        }),
        SubmitOutcome::Ignored => json!({ "state": "ignored" }),
        SubmitOutcome::Superseded => json!({ "state": "cancelled" }),
        SubmitOutcome::Completed { state, attempts } => {
            let mut value = serde_json::to_value(state)?;
            value["attempts"] = json!(attempts);
            value
        }
    };
    Ok(value)
}

/// Lines for stdout and stderr respectively.
pub struct Rendered {
    pub stdout: Option<String>,
    pub stderr: Vec<String>,
}

pub fn render_text(outcome: &SubmitOutcome) -> Rendered {
    match outcome {
        SubmitOutcome::NoSelection => Rendered {
            stdout: None,
            stderr: vec!["No file selected.".to_string()],
        },
        SubmitOutcome::Rejected(reason) => Rendered {
            stdout: None,
            stderr: rejection_lines(reason),
        },
        SubmitOutcome::Ignored => Rendered {
            stdout: None,
            stderr: vec!["A document is already being processed.".to_string()],
        },
        SubmitOutcome::Superseded => Rendered {
            stdout: None,
            stderr: vec!["Submission cancelled.".to_string()],
        },
        SubmitOutcome::Completed { state, attempts } => match state {
            WorkflowState::Succeeded { summary } => Rendered {
                stdout: Some(summary.clone()),
                stderr: Vec::new(),
            },
            WorkflowState::Failed { message, kind } => Rendered {
                stdout: None,
                stderr: vec![
                    format!("Error: {message}"),
                    format!("Technical details: kind={kind}, attempts={attempts}"),
                ],
            },
            WorkflowState::Idle | WorkflowState::Pending => Rendered {
                stdout: None,
                stderr: Vec::new(),
            },
        },
    }
}

fn rejection_lines(reason: &RejectionReason) -> Vec<String> {
    std::iter::once("File rejected:".to_string())
        .chain(reason.messages().into_iter().map(|m| format!("  - {m}")))
        .collect()
}

pub fn render_json(outcome: &SubmitOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&report(outcome)?)
}
