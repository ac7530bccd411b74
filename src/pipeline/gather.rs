//! Fan-out/fan-in gather stage.
//!
//! All fetch units start concurrently; the single await loop below is the
//! stage's join barrier. The bag is filled sequentially by this collecting
//! owner as each unit settles, so no locking is needed on the merge target.

use crate::pipeline::bag::ResultBag;
use crate::pipeline::work::{error_kind, panic_message, FetchUnit};
use tracing::{debug, warn};

/// Run every fetch unit to completion and merge results into one bag.
///
/// Never fails as a whole: a unit that errors or panics contributes a single
/// failure entry under its own name, and its siblings keep running. The first
/// failure does not cancel anything.
pub async fn gather(units: Vec<FetchUnit>) -> ResultBag {
    let mut handles = Vec::with_capacity(units.len());
    for unit in units {
        let name = unit.name().to_string();
        debug!("starting fetch unit '{}'", name);
        handles.push((name, tokio::spawn(unit.task)));
    }

    let mut bag = ResultBag::new();
    for (name, handle) in handles {
        match handle.await {
            Ok(Ok(fields)) => {
                debug!("fetch unit '{}' produced {} field(s)", name, fields.len());
                for field in fields {
                    bag.insert_value(field);
                }
            }
            Ok(Err(err)) => {
                let kind = error_kind(&err);
                warn!("fetch unit '{}' failed: {:#}", name, err);
                bag.insert_failure(name.as_str(), kind, format!("{:#}", err));
            }
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic().as_ref());
                warn!("fetch unit '{}' panicked: {}", name, message);
                bag.insert_failure(name.as_str(), "panic", message);
            }
            Err(join_err) => {
                // Cancellation is not part of this design; record it like any
                // other fault so the unit still contributes exactly one entry.
                warn!("fetch unit '{}' was cancelled: {}", name, join_err);
                bag.insert_failure(name.as_str(), "task", join_err.to_string());
            }
        }
    }

    bag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::bag::Field;
    use anyhow::anyhow;

    #[tokio::test]
    async fn test_gather_merges_all_units() {
        let units = vec![
            FetchUnit::new("company-profile", async {
                Ok(vec![
                    Field::text("description", "Co. Inc."),
                    Field::text("tagline", "Tag"),
                ])
            }),
            FetchUnit::new("logo", async { Ok(vec![Field::asset("logo_path", None)]) }),
        ];

        let bag = gather(units).await;

        assert_eq!(bag.len(), 3);
        assert_eq!(bag.text("description"), Some("Co. Inc."));
        assert_eq!(bag.text("tagline"), Some("Tag"));
        assert!(bag.contains_value("logo_path"));
    }

    #[tokio::test]
    async fn test_failing_unit_does_not_block_siblings() {
        let units = vec![
            FetchUnit::new("a", async { Ok(vec![Field::text("a_value", "1")]) }),
            FetchUnit::new("broken", async { Err(anyhow!("connection refused")) }),
            FetchUnit::new("b", async { Ok(vec![Field::text("b_value", "2")]) }),
        ];

        let bag = gather(units).await;

        assert_eq!(bag.text("a_value"), Some("1"));
        assert_eq!(bag.text("b_value"), Some("2"));
        let failure = bag.failure("broken").unwrap();
        assert!(failure.starts_with("task: "));
        assert!(failure.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_one_entry_per_unit() {
        let units = vec![
            FetchUnit::new("ok", async { Ok(vec![Field::text("ok_value", "x")]) }),
            FetchUnit::new("bad", async { Err(anyhow!("nope")) }),
        ];

        let bag = gather(units).await;

        // One contribution each: a value entry and a failure entry.
        assert_eq!(bag.len(), 2);
        assert!(bag.contains_value("ok_value"));
        assert!(bag.failure("bad").is_some());
    }

    #[tokio::test]
    async fn test_panicking_unit_is_recorded_as_failure() {
        let units = vec![
            FetchUnit::new("steady", async { Ok(vec![Field::text("steady_value", "y")]) }),
            FetchUnit::new("wild", async { panic!("fetch blew up") }),
        ];

        let bag = gather(units).await;

        assert_eq!(bag.text("steady_value"), Some("y"));
        assert_eq!(
            bag.failure("wild"),
            Some("panic: fetch blew up".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_unit_list_yields_empty_bag() {
        let bag = gather(Vec::new()).await;
        assert!(bag.is_empty());
    }
}
