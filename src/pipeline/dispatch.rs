//! Fan-out dispatch stage.
//!
//! Consumer units are CPU/I/O-heavy and independent, so each runs on the
//! blocking thread pool for real parallelism. A fault inside one unit is
//! converted into a `Failure` outcome at the unit boundary; it never reaches
//! its siblings or the dispatcher itself.

use crate::pipeline::work::{error_kind, panic_message, SinkUnit};
use std::fmt;
use tracing::{debug, warn};

/// Outcome of one dispatched sink unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success {
        unit: String,
        summary: String,
    },
    Failure {
        unit: String,
        kind: String,
        message: String,
    },
}

impl TaskOutcome {
    pub fn unit(&self) -> &str {
        match self {
            TaskOutcome::Success { unit, .. } | TaskOutcome::Failure { unit, .. } => unit,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success { .. })
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Success { unit, summary } => write!(f, "{}: {}", unit, summary),
            TaskOutcome::Failure {
                unit,
                kind,
                message,
            } => write!(f, "{}: ERROR -> {}: {}", unit, kind, message),
        }
    }
}

/// Run every sink unit to completion, collecting one outcome per unit in
/// submission order. Execution order is unspecified; the await loop is the
/// stage's only barrier, and no unit is cancelled because a sibling failed.
pub async fn dispatch(units: Vec<SinkUnit>) -> Vec<TaskOutcome> {
    let mut handles = Vec::with_capacity(units.len());
    for unit in units {
        let name = unit.name().to_string();
        debug!("starting sink unit '{}'", name);
        handles.push((name, tokio::task::spawn_blocking(unit.run)));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (unit, handle) in handles {
        let outcome = match handle.await {
            Ok(Ok(summary)) => TaskOutcome::Success { unit, summary },
            Ok(Err(err)) => {
                warn!("sink unit '{}' failed: {:#}", unit, err);
                TaskOutcome::Failure {
                    kind: error_kind(&err).to_string(),
                    message: format!("{:#}", err),
                    unit,
                }
            }
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic().as_ref());
                warn!("sink unit '{}' panicked: {}", unit, message);
                TaskOutcome::Failure {
                    kind: "panic".to_string(),
                    message,
                    unit,
                }
            }
            Err(join_err) => {
                warn!("sink unit '{}' was cancelled: {}", unit, join_err);
                TaskOutcome::Failure {
                    kind: "task".to_string(),
                    message: join_err.to_string(),
                    unit,
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}
