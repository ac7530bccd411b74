//! Fetch units for the gather stage.
//!
//! Each submodule wraps one independent fetch operation as a
//! [`crate::pipeline::FetchUnit`], with its inputs bound at construction.

pub mod logo;
pub mod prices;
pub mod profile;

/// Field names the fetch units write into the result bag.
pub const DESCRIPTION: &str = "description";
pub const TAGLINE: &str = "tagline";
pub const LOGO_PATH: &str = "logo_path";
pub const PRICE_SERIES: &str = "price_series";

/// Fields a run cannot proceed without; the rest are optional gaps.
pub const REQUIRED_FIELDS: &[&str] = &[DESCRIPTION, PRICE_SERIES];
