//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one data-access method per registry operation.
//! - Isolate SQLite row mapping from service/outcome handling.
//!
//! # Invariants
//! - Every repository method performs exactly one store round trip.
//! - Write paths validate inputs before SQL mutations.
//! - Store errors are returned unchanged, never retried.

pub mod registry_repo;
