//! Store-side named procedures.
//!
//! # Responsibility
//! - Encapsulate logic the core must not re-implement: guarded student
//!   deletion and pattern-based house counting.
//! - Dispatch a `ProcedureCall` by name, the way a server-side stored
//!   procedure would be executed.
//!
//! # Invariants
//! - Each procedure runs exactly one SQL statement.
//! - `sp_DeleteStudent` removes only the student row; it never touches the
//!   apartment, house or street it belonged to.
//! - `sp_DeleteStudent` signals failure when the student does not exist.
//! - Arguments are always bound, never interpolated.

use super::{DbError, DbResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::Connection;

/// Guarded student deletion.
pub const DELETE_STUDENT: &str = "sp_DeleteStudent";
/// House count for streets whose name matches a LIKE pattern.
pub const COUNT_HOUSES_ON_STREET: &str = "sp_CountHousesOnStreet";

type ProcedureFn = fn(&Connection, &[Value]) -> DbResult<ProcedureOutput>;

const PROCEDURES: &[(&str, ProcedureFn)] = &[
    (DELETE_STUDENT, delete_student),
    (COUNT_HOUSES_ON_STREET, count_houses_on_street),
];

/// Named procedure invocation with positional bound arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub name: &'static str,
    pub params: Vec<Value>,
}

/// Result reported by a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureOutput {
    /// Number of rows the procedure removed.
    Deleted(usize),
    /// Aggregate count produced by the procedure.
    Count(i64),
}

/// Executes one registered procedure on `conn`.
///
/// # Errors
/// - `DbError::UnknownProcedure` when `call.name` is not registered.
/// - `DbError::ProcedureFailed` when the procedure rejects its arguments or
///   signals a domain failure.
/// - `DbError::Sqlite` for store errors.
pub fn execute_procedure(conn: &Connection, call: &ProcedureCall) -> DbResult<ProcedureOutput> {
    let (_, procedure) = PROCEDURES
        .iter()
        .find(|(name, _)| *name == call.name)
        .ok_or_else(|| DbError::UnknownProcedure(call.name.to_string()))?;

    debug!(
        "event=procedure_exec module=db procedure={} arg_count={}",
        call.name,
        call.params.len()
    );
    procedure(conn, &call.params)
}

fn delete_student(conn: &Connection, params: &[Value]) -> DbResult<ProcedureOutput> {
    let student_id = integer_arg(DELETE_STUDENT, params, 0)?;
    let deleted = conn.execute("DELETE FROM students WHERE student_id = ?1;", [student_id])?;
    if deleted == 0 {
        return Err(DbError::ProcedureFailed {
            procedure: DELETE_STUDENT,
            message: format!("student {student_id} does not exist"),
        });
    }
    Ok(ProcedureOutput::Deleted(deleted))
}

fn count_houses_on_street(conn: &Connection, params: &[Value]) -> DbResult<ProcedureOutput> {
    let pattern = text_arg(COUNT_HOUSES_ON_STREET, params, 0)?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(h.house_id)
         FROM houses h
         INNER JOIN streets s ON s.street_id = h.street_id
         WHERE registry_fold(s.name_street) LIKE registry_fold(?1) ESCAPE '\\';",
        [pattern],
        |row| row.get(0),
    )?;
    Ok(ProcedureOutput::Count(count))
}

fn integer_arg(procedure: &'static str, params: &[Value], index: usize) -> DbResult<i64> {
    match params.get(index) {
        Some(Value::Integer(value)) => Ok(*value),
        other => Err(argument_error(procedure, index, "integer", other)),
    }
}

fn text_arg<'a>(procedure: &'static str, params: &'a [Value], index: usize) -> DbResult<&'a str> {
    match params.get(index) {
        Some(Value::Text(value)) => Ok(value.as_str()),
        other => Err(argument_error(procedure, index, "text", other)),
    }
}

fn argument_error(
    procedure: &'static str,
    index: usize,
    expected: &str,
    actual: Option<&Value>,
) -> DbError {
    let actual = match actual {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Integer(_)) => "integer",
        Some(Value::Real(_)) => "real",
        Some(Value::Text(_)) => "text",
        Some(Value::Blob(_)) => "blob",
    };
    DbError::ProcedureFailed {
        procedure,
        message: format!("argument {index} must be {expected}, got {actual}"),
    }
}
