//! Registry use-case service.
//!
//! # Responsibility
//! - Expose the registry operation surface to UI/FFI callers.
//! - Validate inputs locally before any store interaction.
//! - Acquire one pooled connection per operation and release it on every
//!   exit path.
//! - Normalize every result into `Outcome`.
//!
//! # Invariants
//! - No operation panics or returns a raw error; failures become
//!   `Outcome::failure` with the underlying message verbatim.
//! - Failures are never retried.
//! - Logs carry operation names, status and timing only; no student data.

use super::outcome::Outcome;
use crate::config::RegistryConfig;
use crate::db::ConnectionPool;
use crate::model::address::{
    Apartment, ApartmentDirectoryRow, House, HouseDirectoryRow, NewApartment, NewHouse,
    NewStreet, Street,
};
use crate::model::student::{NewStudent, StudentRow};
use crate::model::{ensure_id, HouseId, StreetId, StudentId, ValidationError};
use crate::query::{ApartmentFilter, HouseFilter, ReportFilter, StudentFilter};
use crate::report::{group_by_street, ReportDocument};
use crate::repo::registry_repo::{
    RegistryRepository, RepoError, RepoResult, SqliteRegistryRepository,
};
use log::{error, info, warn};
use std::time::Instant;

/// Operation facade over a connection pool.
pub struct RegistryService {
    pool: ConnectionPool,
}

impl RegistryService {
    /// Creates a service with its own pool for `config`.
    ///
    /// Does not touch the store; connectivity failures surface per operation.
    pub fn new(config: &RegistryConfig) -> Self {
        Self::with_pool(ConnectionPool::new(config))
    }

    /// Creates a service over an existing pool.
    pub fn with_pool(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Lists all streets ordered by name.
    pub fn list_streets(&self) -> Outcome<Vec<Street>> {
        self.run("list_streets", |repo| repo.list_streets())
    }

    /// Lists houses of one street; a street without houses yields an empty list.
    pub fn list_houses(&self, street_id: StreetId) -> Outcome<Vec<House>> {
        const OP: &str = "list_houses";
        if let Err(err) = ensure_id("street_id", street_id) {
            return reject(OP, err);
        }
        self.run(OP, |repo| repo.list_houses(street_id))
    }

    /// Lists apartments of one house; a house without apartments yields an empty list.
    pub fn list_apartments(&self, house_id: HouseId) -> Outcome<Vec<Apartment>> {
        const OP: &str = "list_apartments";
        if let Err(err) = ensure_id("house_id", house_id) {
            return reject(OP, err);
        }
        self.run(OP, |repo| repo.list_apartments(house_id))
    }

    /// Lists students matching every supplied filter field, ordered by name.
    pub fn list_students(&self, filter: &StudentFilter) -> Outcome<Vec<StudentRow>> {
        self.run("list_students", |repo| repo.list_students(filter))
    }

    /// Lists houses with their street names.
    pub fn list_house_directory(&self, filter: &HouseFilter) -> Outcome<Vec<HouseDirectoryRow>> {
        self.run("list_house_directory", |repo| {
            repo.list_house_directory(filter)
        })
    }

    /// Lists apartments with their house numbers and street names.
    pub fn list_apartment_directory(
        &self,
        filter: &ApartmentFilter,
    ) -> Outcome<Vec<ApartmentDirectoryRow>> {
        self.run("list_apartment_directory", |repo| {
            repo.list_apartment_directory(filter)
        })
    }

    pub fn insert_street(&self, name: &str) -> Outcome<()> {
        const OP: &str = "insert_street";
        let street = NewStreet::new(name);
        if let Err(err) = street.validate() {
            return reject(OP, err);
        }
        self.run(OP, |repo| repo.insert_street(&street))
    }

    pub fn insert_house(&self, number: &str, street_id: StreetId) -> Outcome<()> {
        const OP: &str = "insert_house";
        let house = NewHouse::new(number, street_id);
        if let Err(err) = house.validate() {
            return reject(OP, err);
        }
        self.run(OP, |repo| repo.insert_house(&house))
    }

    pub fn insert_apartment(&self, number: i64, house_id: HouseId) -> Outcome<()> {
        const OP: &str = "insert_apartment";
        let apartment = NewApartment::new(number, house_id);
        if let Err(err) = apartment.validate() {
            return reject(OP, err);
        }
        self.run(OP, |repo| repo.insert_apartment(&apartment))
    }

    pub fn insert_student(&self, student: &NewStudent) -> Outcome<()> {
        const OP: &str = "insert_student";
        if let Err(err) = student.validate() {
            return reject(OP, err);
        }
        self.run(OP, |repo| repo.insert_student(student))
    }

    /// Deletes one student; a missing student is reported by the store as a failure.
    pub fn delete_student(&self, student_id: StudentId) -> Outcome<()> {
        const OP: &str = "delete_student";
        if let Err(err) = ensure_id("student_id", student_id) {
            return reject(OP, err);
        }
        self.run(OP, |repo| repo.delete_student(student_id))
    }

    /// Counts houses on every street whose name contains `name_pattern`.
    pub fn count_houses_matching(&self, name_pattern: &str) -> Outcome<i64> {
        const OP: &str = "count_houses_matching";
        if name_pattern.trim().is_empty() {
            return reject(OP, ValidationError::BlankSearchPattern);
        }
        self.run(OP, |repo| repo.count_houses_matching(name_pattern))
    }

    /// Flattened report rows ordered by street, house, apartment and student.
    ///
    /// `street_name` restricts rows to streets whose name contains it.
    pub fn list_students_report(&self, street_name: Option<&str>) -> Outcome<Vec<StudentRow>> {
        let filter = ReportFilter {
            street_name: street_name.map(str::to_string),
        };
        self.run("list_students_report", |repo| {
            repo.list_students_report(&filter)
        })
    }

    /// Report rows grouped by street name, ready for an export renderer.
    pub fn build_students_report(&self, street_name: Option<&str>) -> Outcome<ReportDocument> {
        self.list_students_report(street_name).map(group_by_street)
    }

    fn run<T>(
        &self,
        operation: &'static str,
        work: impl FnOnce(&SqliteRegistryRepository<'_>) -> RepoResult<T>,
    ) -> Outcome<T> {
        let started_at = Instant::now();
        let result = self
            .pool
            .acquire()
            .map_err(RepoError::from)
            .and_then(|conn| work(&SqliteRegistryRepository::new(&conn)));

        match result {
            Ok(data) => {
                info!(
                    "event={} module=service status=ok duration_ms={}",
                    operation,
                    started_at.elapsed().as_millis()
                );
                Outcome::success(data)
            }
            Err(err) => {
                error!(
                    "event={} module=service status=error duration_ms={} error_code={} error={}",
                    operation,
                    started_at.elapsed().as_millis(),
                    error_code(&err),
                    err
                );
                Outcome::failure(err.to_string())
            }
        }
    }
}

fn reject<T>(operation: &'static str, err: ValidationError) -> Outcome<T> {
    warn!(
        "event={} module=service status=rejected error_code=validation error={}",
        operation, err
    );
    Outcome::failure(err.to_string())
}

fn error_code(err: &RepoError) -> &'static str {
    use crate::db::DbError;

    match err {
        RepoError::Validation(_) => "validation",
        RepoError::Db(DbError::Sqlite(_)) => "store_error",
        RepoError::Db(DbError::UnsupportedSchemaVersion { .. }) => "unsupported_schema",
        RepoError::Db(DbError::PoolExhausted { .. }) => "pool_exhausted",
        RepoError::Db(DbError::UnknownProcedure(_)) => "unknown_procedure",
        RepoError::Db(DbError::ProcedureFailed { .. }) => "procedure_failed",
        RepoError::UninitializedConnection { .. } => "uninitialized_connection",
        RepoError::InvalidData(_) => "invalid_data",
    }
}
