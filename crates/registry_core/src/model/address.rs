//! Street, house and apartment records.
//!
//! # Invariants
//! - Street names are non-empty and unique in the store.
//! - House numbers are free-form strings ("12", "12А"); apartment numbers
//!   are integers.

use super::{ensure_id, normalize_display_name, ApartmentId, HouseId, StreetId, ValidationError};
use serde::Serialize;

/// Street read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Street {
    #[serde(rename = "StreetID")]
    pub street_id: StreetId,
    #[serde(rename = "NameStreet")]
    pub name: String,
}

/// House read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct House {
    #[serde(rename = "HouseID")]
    pub house_id: HouseId,
    #[serde(rename = "HouseNumber")]
    pub number: String,
    #[serde(rename = "StreetID")]
    pub street_id: StreetId,
}

/// Apartment read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Apartment {
    #[serde(rename = "ApartmentID")]
    pub apartment_id: ApartmentId,
    #[serde(rename = "ApartmentNumber")]
    pub number: i64,
    #[serde(rename = "HouseID")]
    pub house_id: HouseId,
}

/// House joined with its street, for directory listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseDirectoryRow {
    #[serde(rename = "HouseID")]
    pub house_id: HouseId,
    #[serde(rename = "HouseNumber")]
    pub house_number: String,
    #[serde(rename = "StreetID")]
    pub street_id: StreetId,
    #[serde(rename = "StreetName")]
    pub street_name: String,
}

/// Apartment joined with its house and street, for directory listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApartmentDirectoryRow {
    #[serde(rename = "ApartmentID")]
    pub apartment_id: ApartmentId,
    #[serde(rename = "ApartmentNumber")]
    pub apartment_number: i64,
    #[serde(rename = "HouseID")]
    pub house_id: HouseId,
    #[serde(rename = "HouseNumber")]
    pub house_number: String,
    #[serde(rename = "StreetID")]
    pub street_id: StreetId,
    #[serde(rename = "StreetName")]
    pub street_name: String,
}

/// Insert input for a street.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStreet {
    pub name: String,
}

impl NewStreet {
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_display_name(name),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankStreetName);
        }
        Ok(())
    }
}

/// Insert input for a house under one street.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHouse {
    pub number: String,
    pub street_id: StreetId,
}

impl NewHouse {
    pub fn new(number: &str, street_id: StreetId) -> Self {
        Self {
            number: normalize_display_name(number),
            street_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.number.trim().is_empty() {
            return Err(ValidationError::BlankHouseNumber);
        }
        ensure_id("street_id", self.street_id)?;
        Ok(())
    }
}

/// Insert input for an apartment under one house.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewApartment {
    pub number: i64,
    pub house_id: HouseId,
}

impl NewApartment {
    pub fn new(number: i64, house_id: HouseId) -> Self {
        Self { number, house_id }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id("house_id", self.house_id)?;
        Ok(())
    }
}
