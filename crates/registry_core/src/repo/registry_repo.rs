//! Registry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Execute statements produced by `query::statements` and map rows into
//!   read models.
//! - Invoke store procedures for deletion and house counting.
//!
//! # Invariants
//! - The connection must be migrated to the latest schema version.
//! - Read paths reject malformed persisted values instead of masking them.
//! - Empty results are successes, never errors.

use crate::db::migrations::latest_version;
use crate::db::procedures::execute_procedure;
use crate::db::{DbError, ProcedureOutput};
use crate::model::address::{
    Apartment, ApartmentDirectoryRow, House, HouseDirectoryRow, NewApartment, NewHouse,
    NewStreet, Street,
};
use crate::model::student::{NewStudent, StudentRow};
use crate::model::{HouseId, StreetId, StudentId, ValidationError};
use crate::query::statements;
use crate::query::{ApartmentFilter, HouseFilter, ReportFilter, Statement, StudentFilter};
use chrono::NaiveDate;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error from registry repository operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "registry repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted registry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract for the Street → House → Apartment → Student tree.
pub trait RegistryRepository {
    /// All streets ordered by name.
    fn list_streets(&self) -> RepoResult<Vec<Street>>;
    /// Houses of one street ordered by number.
    fn list_houses(&self, street_id: StreetId) -> RepoResult<Vec<House>>;
    /// Apartments of one house ordered by number.
    fn list_apartments(&self, house_id: HouseId) -> RepoResult<Vec<Apartment>>;
    /// Students matching the AND of supplied filters, ordered by full name.
    fn list_students(&self, filter: &StudentFilter) -> RepoResult<Vec<StudentRow>>;
    /// Houses with street names, optionally restricted to one street.
    fn list_house_directory(&self, filter: &HouseFilter) -> RepoResult<Vec<HouseDirectoryRow>>;
    /// Apartments with house/street context, optionally filtered.
    fn list_apartment_directory(
        &self,
        filter: &ApartmentFilter,
    ) -> RepoResult<Vec<ApartmentDirectoryRow>>;
    /// Report view rows ordered by street, house, apartment, student.
    fn list_students_report(&self, filter: &ReportFilter) -> RepoResult<Vec<StudentRow>>;
    fn insert_street(&self, street: &NewStreet) -> RepoResult<()>;
    fn insert_house(&self, house: &NewHouse) -> RepoResult<()>;
    fn insert_apartment(&self, apartment: &NewApartment) -> RepoResult<()>;
    fn insert_student(&self, student: &NewStudent) -> RepoResult<()>;
    /// Deletes one student through the guarded store procedure.
    fn delete_student(&self, student_id: StudentId) -> RepoResult<()>;
    /// Counts houses on streets whose name contains `name_pattern`.
    fn count_houses_matching(&self, name_pattern: &str) -> RepoResult<i64>;
}

/// SQLite-backed registry repository borrowing one connection.
pub struct SqliteRegistryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistryRepository<'conn> {
    /// Wraps a connection already bootstrapped by `ConnectionPool`.
    ///
    /// Skips the schema check so each operation stays one round trip.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates a repository from an arbitrary connection, checking that it
    /// is migrated to the latest schema version.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_registry_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_rows<T>(
        &self,
        statement: &Statement,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(&statement.sql)?;
        let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }

    fn execute(&self, statement: &Statement) -> RepoResult<()> {
        self.conn
            .execute(&statement.sql, params_from_iter(statement.params.iter()))?;
        Ok(())
    }
}

impl RegistryRepository for SqliteRegistryRepository<'_> {
    fn list_streets(&self) -> RepoResult<Vec<Street>> {
        self.query_rows(&statements::list_streets(), parse_street_row)
    }

    fn list_houses(&self, street_id: StreetId) -> RepoResult<Vec<House>> {
        self.query_rows(&statements::list_houses(street_id), parse_house_row)
    }

    fn list_apartments(&self, house_id: HouseId) -> RepoResult<Vec<Apartment>> {
        self.query_rows(&statements::list_apartments(house_id), parse_apartment_row)
    }

    fn list_students(&self, filter: &StudentFilter) -> RepoResult<Vec<StudentRow>> {
        self.query_rows(&statements::list_students(filter), parse_student_row)
    }

    fn list_house_directory(&self, filter: &HouseFilter) -> RepoResult<Vec<HouseDirectoryRow>> {
        self.query_rows(
            &statements::list_house_directory(filter),
            parse_house_directory_row,
        )
    }

    fn list_apartment_directory(
        &self,
        filter: &ApartmentFilter,
    ) -> RepoResult<Vec<ApartmentDirectoryRow>> {
        self.query_rows(
            &statements::list_apartment_directory(filter),
            parse_apartment_directory_row,
        )
    }

    fn list_students_report(&self, filter: &ReportFilter) -> RepoResult<Vec<StudentRow>> {
        self.query_rows(&statements::list_students_report(filter), parse_student_row)
    }

    fn insert_street(&self, street: &NewStreet) -> RepoResult<()> {
        street.validate()?;
        self.execute(&statements::insert_street(street))
    }

    fn insert_house(&self, house: &NewHouse) -> RepoResult<()> {
        house.validate()?;
        self.execute(&statements::insert_house(house))
    }

    fn insert_apartment(&self, apartment: &NewApartment) -> RepoResult<()> {
        apartment.validate()?;
        self.execute(&statements::insert_apartment(apartment))
    }

    fn insert_student(&self, student: &NewStudent) -> RepoResult<()> {
        student.validate()?;
        self.execute(&statements::insert_student(student))
    }

    fn delete_student(&self, student_id: StudentId) -> RepoResult<()> {
        match execute_procedure(self.conn, &statements::delete_student(student_id))? {
            ProcedureOutput::Deleted(_) => Ok(()),
            other => Err(RepoError::InvalidData(format!(
                "unexpected delete procedure output {other:?}"
            ))),
        }
    }

    fn count_houses_matching(&self, name_pattern: &str) -> RepoResult<i64> {
        match execute_procedure(self.conn, &statements::count_houses_matching(name_pattern))? {
            ProcedureOutput::Count(count) => Ok(count),
            other => Err(RepoError::InvalidData(format!(
                "unexpected count procedure output {other:?}"
            ))),
        }
    }
}

fn parse_street_row(row: &Row<'_>) -> RepoResult<Street> {
    Ok(Street {
        street_id: row.get("street_id")?,
        name: row.get("name_street")?,
    })
}

fn parse_house_row(row: &Row<'_>) -> RepoResult<House> {
    Ok(House {
        house_id: row.get("house_id")?,
        number: row.get("house_number")?,
        street_id: row.get("street_id")?,
    })
}

fn parse_apartment_row(row: &Row<'_>) -> RepoResult<Apartment> {
    Ok(Apartment {
        apartment_id: row.get("apartment_id")?,
        number: row.get("apartment_number")?,
        house_id: row.get("house_id")?,
    })
}

fn parse_house_directory_row(row: &Row<'_>) -> RepoResult<HouseDirectoryRow> {
    Ok(HouseDirectoryRow {
        house_id: row.get("house_id")?,
        house_number: row.get("house_number")?,
        street_id: row.get("street_id")?,
        street_name: row.get("street_name")?,
    })
}

fn parse_apartment_directory_row(row: &Row<'_>) -> RepoResult<ApartmentDirectoryRow> {
    Ok(ApartmentDirectoryRow {
        apartment_id: row.get("apartment_id")?,
        apartment_number: row.get("apartment_number")?,
        house_id: row.get("house_id")?,
        house_number: row.get("house_number")?,
        street_id: row.get("street_id")?,
        street_name: row.get("street_name")?,
    })
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<StudentRow> {
    let student_id: StudentId = row.get("student_id")?;
    let dob_text: String = row.get("date_of_birth")?;
    let date_of_birth = NaiveDate::parse_from_str(&dob_text, "%Y-%m-%d").map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date_of_birth `{dob_text}` for student {student_id}"
        ))
    })?;

    Ok(StudentRow {
        student_id,
        full_name: row.get("full_name")?,
        date_of_birth,
        gender: row.get("gender")?,
        comments: row.get("comments")?,
        street_id: row.get("street_id")?,
        name_street: row.get("name_street")?,
        house_id: row.get("house_id")?,
        house_number: row.get("house_number")?,
        apartment_id: row.get("apartment_id")?,
        apartment_number: row.get("apartment_number")?,
    })
}

fn ensure_registry_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
