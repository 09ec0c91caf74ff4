//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose registry operations to Dart via FRB as sync calls.
//! - Flatten core `Outcome` values into FRB-friendly envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every envelope carries `ok`; on failure `error` holds a non-empty message.
//! - Listing payloads are JSON arrays whose keys match store column names.

use log::{error, info};
use registry_core::{
    best_match, core_version as core_version_inner, init_logging as init_logging_inner,
    parse_date_of_birth, ping as ping_inner, ApartmentFilter, HouseFilter, NewStudent, Outcome,
    PlainTextRenderer, RegistryConfig, RegistryService, ReportRenderer, StudentFilter,
};
use serde::Serialize;
use std::sync::OnceLock;

static REGISTRY_SERVICE: OnceLock<Result<RegistryService, String>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result envelope for commands without payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub error: Option<String>,
}

/// Result envelope for the house count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountResponse {
    pub ok: bool,
    pub count: Option<i64>,
    pub error: Option<String>,
}

/// Result envelope for listings, serialized as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    pub ok: bool,
    pub data_json: Option<String>,
    pub error: Option<String>,
}

/// Student listing plus the row the UI should highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSearchResponse {
    pub ok: bool,
    pub data_json: Option<String>,
    /// `StudentID` of the best name match; `None` without search text or hits.
    pub best_match_id: Option<i64>,
    pub error: Option<String>,
}

/// Rendered report export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTextResponse {
    pub ok: bool,
    pub text: Option<String>,
    pub error: Option<String>,
}

impl From<Outcome<()>> for ActionResponse {
    fn from(outcome: Outcome<()>) -> Self {
        Self {
            ok: outcome.ok,
            error: outcome.error,
        }
    }
}

impl From<Outcome<i64>> for CountResponse {
    fn from(outcome: Outcome<i64>) -> Self {
        Self {
            ok: outcome.ok,
            count: outcome.data,
            error: outcome.error,
        }
    }
}

impl From<Outcome<()>> for CountResponse {
    fn from(outcome: Outcome<()>) -> Self {
        Self {
            ok: false,
            count: None,
            error: outcome.error,
        }
    }
}

impl<T: Serialize> From<Outcome<T>> for ListResponse {
    fn from(outcome: Outcome<T>) -> Self {
        match encode(outcome) {
            Ok(data_json) => Self {
                ok: true,
                data_json: Some(data_json),
                error: None,
            },
            Err(message) => Self {
                ok: false,
                data_json: None,
                error: Some(message),
            },
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_streets() -> ListResponse {
    with_service(|service| service.list_streets().into())
}

#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_houses(street_id: i64) -> ListResponse {
    with_service(|service| service.list_houses(street_id).into())
}

#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_apartments(house_id: i64) -> ListResponse {
    with_service(|service| service.list_apartments(house_id).into())
}

/// Lists houses with street names, optionally for one street.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_house_directory(street_id: Option<i64>) -> ListResponse {
    let filter = HouseFilter { street_id };
    with_service(|service| service.list_house_directory(&filter).into())
}

/// Lists apartments with house and street context.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_apartment_directory(
    street_id: Option<i64>,
    house_id: Option<i64>,
) -> ListResponse {
    let filter = ApartmentFilter {
        street_id,
        house_id,
    };
    with_service(|service| service.list_apartment_directory(&filter).into())
}

/// Lists students filtered by street and name substring.
///
/// # FFI contract
/// - Absent, blank or non-positive filters are ignored.
/// - `best_match_id` is computed over the returned rows only.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_students(
    street_id: Option<i64>,
    search_text: Option<String>,
) -> StudentSearchResponse {
    let filter = StudentFilter {
        street_id,
        search_text,
    };
    with_service(|service| match service.list_students(&filter).into_result() {
        Ok(rows) => {
            let best_match_id = filter
                .search_text
                .as_deref()
                .and_then(|text| best_match(&rows, text))
                .map(|row| row.student_id);
            match serde_json::to_string(&rows) {
                Ok(data_json) => StudentSearchResponse {
                    ok: true,
                    data_json: Some(data_json),
                    best_match_id,
                    error: None,
                },
                Err(err) => student_search_failure(format!("payload encoding failed: {err}")),
            }
        }
        Err(message) => student_search_failure(message),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn registry_insert_street(name: String) -> ActionResponse {
    with_service(|service| service.insert_street(&name).into())
}

#[flutter_rust_bridge::frb(sync)]
pub fn registry_insert_house(number: String, street_id: i64) -> ActionResponse {
    with_service(|service| service.insert_house(&number, street_id).into())
}

#[flutter_rust_bridge::frb(sync)]
pub fn registry_insert_apartment(number: i64, house_id: i64) -> ActionResponse {
    with_service(|service| service.insert_apartment(number, house_id).into())
}

/// Inserts one student.
///
/// Input semantics:
/// - `date_of_birth`: calendar date as `YYYY-MM-DD`.
/// - `comments`: blank text is stored as absent.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_insert_student(
    full_name: String,
    date_of_birth: String,
    gender: String,
    comments: Option<String>,
    apartment_id: i64,
) -> ActionResponse {
    let date_of_birth = match parse_date_of_birth(&date_of_birth) {
        Ok(date) => date,
        Err(err) => return Outcome::<()>::failure(err.to_string()).into(),
    };
    let student = NewStudent::new(
        &full_name,
        date_of_birth,
        &gender,
        comments.as_deref(),
        apartment_id,
    );
    with_service(|service| service.insert_student(&student).into())
}

#[flutter_rust_bridge::frb(sync)]
pub fn registry_delete_student(student_id: i64) -> ActionResponse {
    with_service(|service| service.delete_student(student_id).into())
}

/// Counts houses on every street whose name contains `name_pattern`.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_count_houses_matching(name_pattern: String) -> CountResponse {
    with_service(|service| service.count_houses_matching(&name_pattern).into())
}

/// Flattened report rows, optionally restricted by street name substring.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_list_students_report(street_name: Option<String>) -> ListResponse {
    with_service(|service| {
        service
            .list_students_report(street_name.as_deref())
            .into()
    })
}

/// Report grouped by street with per-street shares, as JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_build_students_report(street_name: Option<String>) -> ListResponse {
    with_service(|service| {
        service
            .build_students_report(street_name.as_deref())
            .into()
    })
}

/// Report rendered as plain text for export.
#[flutter_rust_bridge::frb(sync)]
pub fn registry_export_students_report(street_name: Option<String>) -> ReportTextResponse {
    with_service(|service| {
        let outcome = service
            .build_students_report(street_name.as_deref())
            .map(|document| PlainTextRenderer::default().render(&document));
        ReportTextResponse {
            ok: outcome.ok,
            text: outcome.data,
            error: outcome.error,
        }
    })
}

fn with_service<R>(f: impl FnOnce(&RegistryService) -> R) -> R
where
    R: From<Outcome<()>>,
{
    match registry_service() {
        Ok(service) => f(service),
        Err(message) => R::from(Outcome::<()>::failure(message.clone())),
    }
}

fn registry_service() -> &'static Result<RegistryService, String> {
    REGISTRY_SERVICE.get_or_init(|| match RegistryConfig::from_env() {
        Ok(config) => {
            info!(
                "event=ffi_service_init module=ffi status=ok pool_max_size={}",
                config.pool_max_size
            );
            Ok(RegistryService::new(&config))
        }
        Err(err) => {
            error!("event=ffi_service_init module=ffi status=error error={err}");
            Err(format!("registry configuration invalid: {err}"))
        }
    })
}

fn encode<T: Serialize>(outcome: Outcome<T>) -> Result<String, String> {
    let data = outcome.into_result()?;
    serde_json::to_string(&data).map_err(|err| format!("payload encoding failed: {err}"))
}

fn student_search_failure(message: String) -> StudentSearchResponse {
    StudentSearchResponse {
        ok: false,
        data_json: None,
        best_match_id: None,
        error: Some(message),
    }
}

impl From<Outcome<()>> for StudentSearchResponse {
    fn from(outcome: Outcome<()>) -> Self {
        student_search_failure(
            outcome
                .error
                .unwrap_or_else(|| "unknown error".to_string()),
        )
    }
}

impl From<Outcome<()>> for ReportTextResponse {
    fn from(outcome: Outcome<()>) -> Self {
        Self {
            ok: false,
            text: None,
            error: outcome.error,
        }
    }
}
