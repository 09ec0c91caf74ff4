//! Core data-access logic for the street/house/apartment/student registry.
//! This crate is the single source of truth for query composition, entity
//! mapping and outcome normalization.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod report;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, DatabaseLocation, RegistryConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::address::{
    Apartment, ApartmentDirectoryRow, House, HouseDirectoryRow, NewApartment, NewHouse,
    NewStreet, Street,
};
pub use model::student::{parse_date_of_birth, NewStudent, StudentRow};
pub use model::{ApartmentId, HouseId, StreetId, StudentId, ValidationError};
pub use query::{ApartmentFilter, HouseFilter, ReportFilter, StudentFilter};
pub use report::{
    group_by_street, share_percent, PlainTextRenderer, ReportDocument, ReportRenderer,
    StreetGroup,
};
pub use repo::registry_repo::{
    RegistryRepository, RepoError, RepoResult, SqliteRegistryRepository,
};
pub use search::{best_match, match_score};
pub use service::outcome::Outcome;
pub use service::registry_service::RegistryService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
