//! Two-stage concurrent pipeline core.
//!
//! The gather stage fans out independent fetch units and fans their results
//! back into a single [`ResultBag`]; the dispatch stage fans out independent
//! sink units against that bag and collects one [`TaskOutcome`] per unit.
//! Failures are contained at the unit boundary in both stages and converted
//! to data instead of propagating across stage boundaries.

mod bag;
mod dispatch;
mod gather;
mod orchestrator;
mod work;

pub use bag::{Entry, Field, FieldValue, ResultBag};
pub use dispatch::{dispatch, TaskOutcome};
pub use gather::gather;
pub use orchestrator::{validate, Orchestrator, PipelineError, RunReport, RunState};
pub use work::{FetchUnit, SinkUnit};
