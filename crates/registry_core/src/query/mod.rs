//! Query composition for registry operations.
//!
//! # Responsibility
//! - Turn typed filters and inputs into SQL text plus bound parameters.
//! - Keep every ordering explicit and every value bound.
//!
//! # Invariants
//! - Pure: building a statement never touches the store.
//! - One present filter field yields exactly one clause and one parameter.
//! - No present field yields no `WHERE` clause.

pub mod builder;
pub mod filters;
pub mod statements;

pub use builder::{contains_pattern, SelectBuilder, Statement};
pub use filters::{ApartmentFilter, HouseFilter, ReportFilter, StudentFilter};
