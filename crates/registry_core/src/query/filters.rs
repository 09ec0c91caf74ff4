//! Optional filter inputs for listing operations.
//!
//! Every field is optional; `None` means "no constraint on this field".
//! Field names deserialize from the camelCase keys UI forms send.

use crate::model::{HouseId, StreetId};
use serde::Deserialize;

/// Filter for the student listing; both fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentFilter {
    pub street_id: Option<StreetId>,
    /// Substring of the student's full name.
    pub search_text: Option<String>,
}

/// Filter for the house directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseFilter {
    pub street_id: Option<StreetId>,
}

/// Filter for the apartment directory; both fields combine with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApartmentFilter {
    pub street_id: Option<StreetId>,
    pub house_id: Option<HouseId>,
}

/// Filter for the students-by-street report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFilter {
    /// Substring of the street name.
    pub street_name: Option<String>,
}
