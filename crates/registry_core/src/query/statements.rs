//! Per-operation statements.
//!
//! Each function maps one registry operation to exactly one statement or
//! procedure call. Orderings are part of the operation contract; names sort
//! with the `REGISTRY_NOCASE` collation registered on every connection.

use super::builder::{contains_pattern, SelectBuilder, Statement};
use super::filters::{ApartmentFilter, HouseFilter, ReportFilter, StudentFilter};
use crate::db::procedures::{COUNT_HOUSES_ON_STREET, DELETE_STUDENT};
use crate::db::ProcedureCall;
use crate::model::address::{NewApartment, NewHouse, NewStreet};
use crate::model::student::NewStudent;
use crate::model::{HouseId, StreetId, StudentId};
use rusqlite::types::Value;

const STREET_SELECT_SQL: &str = "SELECT street_id, name_street FROM streets";

const HOUSE_SELECT_SQL: &str = "SELECT house_id, house_number, street_id FROM houses";

const APARTMENT_SELECT_SQL: &str =
    "SELECT apartment_id, apartment_number, house_id FROM apartments";

const STUDENT_SELECT_SQL: &str = "SELECT
    st.student_id AS student_id,
    st.full_name AS full_name,
    st.date_of_birth AS date_of_birth,
    st.gender AS gender,
    st.comments AS comments,
    s.street_id AS street_id,
    s.name_street AS name_street,
    h.house_id AS house_id,
    h.house_number AS house_number,
    a.apartment_id AS apartment_id,
    a.apartment_number AS apartment_number
FROM students st
INNER JOIN apartments a ON a.apartment_id = st.apartment_id
INNER JOIN houses h ON h.house_id = a.house_id
INNER JOIN streets s ON s.street_id = h.street_id";

const REPORT_SELECT_SQL: &str = "SELECT
    student_id,
    full_name,
    date_of_birth,
    gender,
    comments,
    street_id,
    name_street,
    house_id,
    house_number,
    apartment_id,
    apartment_number
FROM vw_students_by_street";

const HOUSE_DIRECTORY_SELECT_SQL: &str = "SELECT
    h.house_id AS house_id,
    h.house_number AS house_number,
    s.street_id AS street_id,
    s.name_street AS street_name
FROM houses h
INNER JOIN streets s ON s.street_id = h.street_id";

const APARTMENT_DIRECTORY_SELECT_SQL: &str = "SELECT
    a.apartment_id AS apartment_id,
    a.apartment_number AS apartment_number,
    h.house_id AS house_id,
    h.house_number AS house_number,
    s.street_id AS street_id,
    s.name_street AS street_name
FROM apartments a
INNER JOIN houses h ON h.house_id = a.house_id
INNER JOIN streets s ON s.street_id = h.street_id";

pub fn list_streets() -> Statement {
    SelectBuilder::new(STREET_SELECT_SQL)
        .order_by("name_street COLLATE REGISTRY_NOCASE ASC, street_id ASC")
}

pub fn list_houses(street_id: StreetId) -> Statement {
    SelectBuilder::new(HOUSE_SELECT_SQL)
        .require_id("street_id", street_id)
        .order_by("house_number ASC, house_id ASC")
}

pub fn list_apartments(house_id: HouseId) -> Statement {
    SelectBuilder::new(APARTMENT_SELECT_SQL)
        .require_id("house_id", house_id)
        .order_by("apartment_number ASC, apartment_id ASC")
}

pub fn list_students(filter: &StudentFilter) -> Statement {
    SelectBuilder::new(STUDENT_SELECT_SQL)
        .filter_id("s.street_id", filter.street_id)
        .filter_contains("st.full_name", filter.search_text.as_deref())
        .order_by("st.full_name COLLATE REGISTRY_NOCASE ASC, st.student_id ASC")
}

pub fn list_house_directory(filter: &HouseFilter) -> Statement {
    SelectBuilder::new(HOUSE_DIRECTORY_SELECT_SQL)
        .filter_id("s.street_id", filter.street_id)
        .order_by(
            "s.name_street COLLATE REGISTRY_NOCASE ASC, h.house_number ASC, h.house_id ASC",
        )
}

pub fn list_apartment_directory(filter: &ApartmentFilter) -> Statement {
    SelectBuilder::new(APARTMENT_DIRECTORY_SELECT_SQL)
        .filter_id("s.street_id", filter.street_id)
        .filter_id("h.house_id", filter.house_id)
        .order_by(
            "s.name_street COLLATE REGISTRY_NOCASE ASC, h.house_number ASC, \
             a.apartment_number ASC, a.apartment_id ASC",
        )
}

pub fn list_students_report(filter: &ReportFilter) -> Statement {
    SelectBuilder::new(REPORT_SELECT_SQL)
        .filter_contains("name_street", filter.street_name.as_deref())
        .order_by(
            "name_street COLLATE REGISTRY_NOCASE ASC, house_number ASC, apartment_number ASC, \
             full_name COLLATE REGISTRY_NOCASE ASC, student_id ASC",
        )
}

pub fn insert_street(street: &NewStreet) -> Statement {
    Statement::insert(
        "streets",
        &["name_street"],
        vec![Value::Text(street.name.clone())],
    )
}

pub fn insert_house(house: &NewHouse) -> Statement {
    Statement::insert(
        "houses",
        &["house_number", "street_id"],
        vec![
            Value::Text(house.number.clone()),
            Value::Integer(house.street_id),
        ],
    )
}

pub fn insert_apartment(apartment: &NewApartment) -> Statement {
    Statement::insert(
        "apartments",
        &["apartment_number", "house_id"],
        vec![
            Value::Integer(apartment.number),
            Value::Integer(apartment.house_id),
        ],
    )
}

pub fn insert_student(student: &NewStudent) -> Statement {
    Statement::insert(
        "students",
        &[
            "full_name",
            "date_of_birth",
            "gender",
            "comments",
            "apartment_id",
        ],
        vec![
            Value::Text(student.full_name.clone()),
            Value::Text(student.date_of_birth.format("%Y-%m-%d").to_string()),
            Value::Text(student.gender.clone()),
            student
                .comments
                .clone()
                .map_or(Value::Null, Value::Text),
            Value::Integer(student.apartment_id),
        ],
    )
}

pub fn delete_student(student_id: StudentId) -> ProcedureCall {
    ProcedureCall {
        name: DELETE_STUDENT,
        params: vec![Value::Integer(student_id)],
    }
}

/// Counts houses on streets whose name contains `name_pattern`.
pub fn count_houses_matching(name_pattern: &str) -> ProcedureCall {
    ProcedureCall {
        name: COUNT_HOUSES_ON_STREET,
        params: vec![Value::Text(contains_pattern(name_pattern.trim()))],
    }
}
