//! The keyed result bag the gather stage merges into.
//!
//! Field keys never collide by construction (each fetch unit owns its own
//! field names), so the bag is filled by a single collecting owner and needs
//! no locking. After the gather stage the bag is read-only.

use crate::models::PriceSeries;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A value produced by a fetch unit.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Free text (company description, tagline).
    Text(String),
    /// A downloaded asset on disk; `None` means the fetch succeeded but
    /// found nothing to download.
    Asset(Option<PathBuf>),
    /// An adjusted-close price series.
    Series(PriceSeries),
}

/// One named field returned by a fetch unit. A single unit may yield
/// several fields.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn asset(name: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Asset(path),
        }
    }

    pub fn series(name: impl Into<String>, series: PriceSeries) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Series(series),
        }
    }
}

/// One entry in the bag: either a fetched value or a recorded failure.
///
/// A key that was never written stays absent from the bag entirely, which is
/// a third, distinct state ("never produced") downstream consumers can
/// observe.
#[derive(Debug, Clone)]
pub enum Entry {
    Value(FieldValue),
    Failed { kind: String, message: String },
}

impl Entry {
    /// Human-readable `{kind}: {message}` description for failed entries.
    pub fn failure_description(&self) -> Option<String> {
        match self {
            Entry::Value(_) => None,
            Entry::Failed { kind, message } => Some(format!("{}: {}", kind, message)),
        }
    }
}

/// Keyed merge target of the gather stage.
#[derive(Debug, Clone, Default)]
pub struct ResultBag {
    entries: HashMap<String, Entry>,
}

impl ResultBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched field. Keys are disjoint by construction; should two
    /// units ever claim the same key, the first write wins and the collision
    /// is logged.
    pub fn insert_value(&mut self, field: Field) {
        match self.entries.entry(field.name) {
            std::collections::hash_map::Entry::Occupied(occupied) => {
                warn!("duplicate field '{}' ignored", occupied.key());
            }
            std::collections::hash_map::Entry::Vacant(vacant) => {
                vacant.insert(Entry::Value(field.value));
            }
        }
    }

    /// Record a unit failure under the unit's own name.
    pub fn insert_failure(
        &mut self,
        unit: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) {
        let unit = unit.into();
        match self.entries.entry(unit) {
            std::collections::hash_map::Entry::Occupied(occupied) => {
                warn!("duplicate failure entry '{}' ignored", occupied.key());
            }
            std::collections::hash_map::Entry::Vacant(vacant) => {
                vacant.insert(Entry::Failed {
                    kind: kind.into(),
                    message: message.into(),
                });
            }
        }
    }

    /// Raw entry lookup.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// True when `name` is present as a successfully fetched value.
    pub fn contains_value(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Entry::Value(_)))
    }

    /// Text field accessor.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(Entry::Value(FieldValue::Text(s))) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Asset field accessor; flattens "fetched but nothing found" to `None`.
    pub fn asset(&self, name: &str) -> Option<&Path> {
        match self.entries.get(name) {
            Some(Entry::Value(FieldValue::Asset(path))) => path.as_deref(),
            _ => None,
        }
    }

    /// Series field accessor.
    pub fn series(&self, name: &str) -> Option<&PriceSeries> {
        match self.entries.get(name) {
            Some(Entry::Value(FieldValue::Series(s))) => Some(s),
            _ => None,
        }
    }

    /// Failure description for `name`, when that entry is a recorded failure.
    pub fn failure(&self, name: &str) -> Option<String> {
        self.entries
            .get(name)
            .and_then(|entry| entry.failure_description())
    }

    /// All keys currently in the bag, sorted for stable reporting.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
