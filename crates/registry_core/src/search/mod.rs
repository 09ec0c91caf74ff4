//! Client-side ranking over already-fetched student rows.
//!
//! # Responsibility
//! - Pick the single row a UI should highlight for a typed search text.
//!
//! # Invariants
//! - Ranking never re-queries the store and never reorders the input.

pub mod best_match;

pub use best_match::{best_match, match_score};
