//! Students-by-street report aggregation and export hand-off.
//!
//! # Responsibility
//! - Group flattened report rows by street name for export.
//! - Derive per-street shares of the total.
//! - Define the renderer seam consumed by document exporters.
//!
//! # Invariants
//! - Read-only: aggregation never touches the store.
//! - Grouping key is the street display name; streets sharing a name
//!   collapse into one group.
//! - Row order inside a group is the query order; nothing is re-sorted.

pub mod aggregate;
pub mod render;

pub use aggregate::{group_by_street, share_percent, ReportDocument, StreetGroup};
pub use render::{PlainTextRenderer, ReportRenderer};
