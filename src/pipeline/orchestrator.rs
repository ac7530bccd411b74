//! Run lifecycle: gather, validate, dispatch, report.
//!
//! The orchestrator walks a linear state machine and is single-use; the only
//! branch is the validation step, which aborts the run before any sink is
//! even constructed when required data is missing.

use crate::pipeline::bag::ResultBag;
use crate::pipeline::dispatch::{dispatch, TaskOutcome};
use crate::pipeline::gather::gather;
use crate::pipeline::work::{FetchUnit, SinkUnit};
use thiserror::Error;
use tracing::{debug, info};

/// Run-level errors. Unit-level faults never surface here; they are recorded
/// in the bag or the outcome list instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required data: {missing:?} (gathered keys: {present:?})")]
    MissingRequiredData {
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("orchestrator already ran (state: {0:?})")]
    AlreadyRan(RunState),
}

/// Lifecycle states. `Done` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Gathering,
    Validating,
    Dispatching,
    Reporting,
    Done,
    Aborted,
}

/// Final report of a completed run: one outcome per sink unit, in submission
/// order. Partial failure is a normal terminal state.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<TaskOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Check that every required field is present as a fetched value.
pub fn validate(bag: &ResultBag, required: &[&str]) -> Result<(), PipelineError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !bag.contains_value(name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingRequiredData {
            missing,
            present: bag.keys(),
        })
    }
}

/// Single-use driver of the Idle -> Done lifecycle.
pub struct Orchestrator {
    state: RunState,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState) {
        debug!("run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run the full pipeline. `make_sinks` builds the consumer units from the
    /// read-only bag and is invoked only after validation passes, so an
    /// aborted run has zero dispatch side effects.
    pub async fn run<F>(
        &mut self,
        fetch_units: Vec<FetchUnit>,
        required: &[&str],
        make_sinks: F,
    ) -> Result<RunReport, PipelineError>
    where
        F: FnOnce(&ResultBag) -> Vec<SinkUnit>,
    {
        if self.state != RunState::Idle {
            return Err(PipelineError::AlreadyRan(self.state));
        }

        self.advance(RunState::Gathering);
        let bag = gather(fetch_units).await;
        info!("gather stage complete: {} entr(ies)", bag.len());

        self.advance(RunState::Validating);
        if let Err(err) = validate(&bag, required) {
            self.advance(RunState::Aborted);
            return Err(err);
        }

        self.advance(RunState::Dispatching);
        let sinks = make_sinks(&bag);
        let outcomes = dispatch(sinks).await;

        self.advance(RunState::Reporting);
        for outcome in &outcomes {
            info!("{}", outcome);
        }

        self.advance(RunState::Done);
        Ok(RunReport { outcomes })
    }
}
