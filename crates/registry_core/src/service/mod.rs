//! Core use-case services.
//!
//! # Responsibility
//! - Run one repository call per operation on a pooled connection.
//! - Convert every result into the uniform `Outcome` envelope.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod outcome;
pub mod registry_service;
