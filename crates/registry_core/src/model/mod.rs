//! Street → House → Apartment → Student domain model.
//!
//! # Responsibility
//! - Define read models returned to callers and write inputs accepted by them.
//! - Own input normalization and validation rules.
//!
//! # Invariants
//! - The hierarchy is strictly tree-shaped: each child has exactly one parent.
//! - Write inputs are validated before any store interaction.
//! - Display names are trimmed and inner whitespace is collapsed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod address;
pub mod student;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

pub type StreetId = i64;
pub type HouseId = i64;
pub type ApartmentId = i64;
pub type StudentId = i64;

/// Local validation failure, raised before any round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankStreetName,
    BlankHouseNumber,
    BlankFullName,
    BlankGender,
    BlankSearchPattern,
    /// Identifier must be a positive store key.
    InvalidId {
        field: &'static str,
        value: i64,
    },
    InvalidDateOfBirth(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankStreetName => write!(f, "street name must not be blank"),
            Self::BlankHouseNumber => write!(f, "house number must not be blank"),
            Self::BlankFullName => write!(f, "student full name must not be blank"),
            Self::BlankGender => write!(f, "student gender must not be blank"),
            Self::BlankSearchPattern => write!(f, "street name pattern must not be blank"),
            Self::InvalidId { field, value } => {
                write!(f, "{field} must be a positive identifier, got {value}")
            }
            Self::InvalidDateOfBirth(value) => {
                write!(f, "date of birth `{value}` must use the YYYY-MM-DD format")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and collapses inner whitespace runs into single spaces.
pub fn normalize_display_name(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Rejects non-positive identifiers.
pub fn ensure_id(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidId { field, value })
    }
}
