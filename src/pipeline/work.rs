//! Work units: the atomic, independently-failable operations the two stages
//! schedule.
//!
//! A fetch unit is an async producer of named fields; a sink unit is a
//! blocking consumer returning a short summary. Units own their inputs at
//! construction time and share no mutable state with their siblings.

use crate::pipeline::bag::Field;
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;

/// A named fetch operation for the gather stage.
pub struct FetchUnit {
    name: String,
    pub(crate) task: BoxFuture<'static, Result<Vec<Field>>>,
}

impl FetchUnit {
    /// Wrap an async operation. The future must own everything it needs;
    /// inputs (URLs, clients, credentials) are bound here, not read from the
    /// environment inside the operation.
    pub fn new<F>(name: impl Into<String>, task: F) -> Self
    where
        F: Future<Output = Result<Vec<Field>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            task: task.boxed(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FetchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchUnit").field("name", &self.name).finish()
    }
}

/// A named consumer operation for the dispatch stage.
///
/// Sinks do blocking work (filesystem, database, rendering), so the closure
/// runs on the blocking thread pool and must be `Send`.
pub struct SinkUnit {
    name: String,
    pub(crate) run: Box<dyn FnOnce() -> Result<String> + Send + 'static>,
}

impl SinkUnit {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: FnOnce() -> Result<String> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SinkUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkUnit").field("name", &self.name).finish()
    }
}

/// Classify an error chain into a short failure kind, the label recorded in
/// bag entries and task outcomes.
pub(crate) fn error_kind(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.downcast_ref::<reqwest::Error>().is_some() {
            return "http";
        }
        if cause.downcast_ref::<rusqlite::Error>().is_some() {
            return "database";
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return "io";
        }
        if cause.downcast_ref::<serde_json::Error>().is_some()
            || cause.downcast_ref::<chrono::ParseError>().is_some()
            || cause.downcast_ref::<std::num::ParseFloatError>().is_some()
        {
            return "decode";
        }
    }
    "task"
}

/// Best-effort extraction of a panic payload's message.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_kind_io() {
        let err = anyhow::Error::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ))
        .context("writing description");
        assert_eq!(error_kind(&err), "io");
    }

    #[test]
    fn test_error_kind_decode() {
        let err: anyhow::Error = serde_json::from_str::<serde_json::Value>("not json")
            .map_err(anyhow::Error::new)
            .unwrap_err()
            .context("decoding response");
        assert_eq!(error_kind(&err), "decode");
    }

    #[test]
    fn test_error_kind_fallback() {
        let err = anyhow!("no description heading found");
        assert_eq!(error_kind(&err), "task");
    }

    #[test]
    fn test_panic_message_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new("kaboom".to_string());
        assert_eq!(panic_message(payload.as_ref()), "kaboom");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
