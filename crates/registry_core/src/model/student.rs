//! Student records and the flattened ancestor-chain row.

use super::{
    ensure_id, normalize_display_name, ApartmentId, HouseId, StreetId, StudentId, ValidationError,
};
use chrono::NaiveDate;
use serde::Serialize;

const DATE_OF_BIRTH_FORMAT: &str = "%Y-%m-%d";

/// Student joined with its full ancestor chain.
///
/// Produced by both the filtered student listing and the report view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRow {
    #[serde(rename = "StudentID")]
    pub student_id: StudentId,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "DateOfBirth")]
    pub date_of_birth: NaiveDate,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Comments")]
    pub comments: Option<String>,
    #[serde(rename = "StreetID")]
    pub street_id: StreetId,
    #[serde(rename = "NameStreet")]
    pub name_street: String,
    #[serde(rename = "HouseID")]
    pub house_id: HouseId,
    #[serde(rename = "HouseNumber")]
    pub house_number: String,
    #[serde(rename = "ApartmentID")]
    pub apartment_id: ApartmentId,
    #[serde(rename = "ApartmentNumber")]
    pub apartment_number: i64,
}

/// Insert input for a student living in one apartment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    /// Blank comments are stored as `NULL`.
    pub comments: Option<String>,
    pub apartment_id: ApartmentId,
}

impl NewStudent {
    /// Builds a normalized insert input.
    pub fn new(
        full_name: &str,
        date_of_birth: NaiveDate,
        gender: &str,
        comments: Option<&str>,
        apartment_id: ApartmentId,
    ) -> Self {
        Self {
            full_name: normalize_display_name(full_name),
            date_of_birth,
            gender: gender.trim().to_string(),
            comments: comments
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            apartment_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::BlankFullName);
        }
        if self.gender.trim().is_empty() {
            return Err(ValidationError::BlankGender);
        }
        ensure_id("apartment_id", self.apartment_id)?;
        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` date of birth as typed into a form.
pub fn parse_date_of_birth(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_OF_BIRTH_FORMAT)
        .map_err(|_| ValidationError::InvalidDateOfBirth(trimmed.to_string()))
}
