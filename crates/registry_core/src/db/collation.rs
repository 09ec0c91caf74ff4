//! Case-insensitive Cyrillic-aware text comparison for the store.
//!
//! SQLite's built-in `NOCASE` and `LIKE` only fold ASCII, and `BINARY`
//! orders `І`, `Є`, `Ґ` by code point, ahead of `А`. Every registry
//! connection gets:
//! - collation `REGISTRY_NOCASE`: Ukrainian/Russian alphabet order, case
//!   ignored, ties broken by exact text;
//! - scalar `registry_fold(text)`: lowercase fold used on both sides of
//!   `LIKE` predicates.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::cmp::Ordering;

/// Collation name used in `ORDER BY ... COLLATE` clauses.
pub const NAME_COLLATION: &str = "REGISTRY_NOCASE";
/// Scalar function folding text case for substring matching.
pub const FOLD_FUNCTION: &str = "registry_fold";

const CYRILLIC_ALPHABET: &str = "абвгґдеёєжзиіїйклмнопрстуфхцчшщъыьэюя";
const CYRILLIC_WEIGHT_BASE: u32 = 0x0430;

/// Registers the collation and fold function on one connection.
pub(crate) fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_collation(NAME_COLLATION, compare_names)?;
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| fold_case(&text)))
        },
    )?;
    Ok(())
}

/// Lowercase fold shared by SQL matching and in-process search.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Orders names alphabetically ignoring case; equal folds fall back to
/// exact text so the order stays total.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    let left_weights = left.chars().flat_map(char::to_lowercase).map(weight);
    let right_weights = right.chars().flat_map(char::to_lowercase).map(weight);
    left_weights.cmp(right_weights).then_with(|| left.cmp(right))
}

/// Alphabet letters share the `а` code point slot and order by their
/// alphabet position; everything else orders by code point.
fn weight(ch: char) -> (u32, u32) {
    match CYRILLIC_ALPHABET.chars().position(|letter| letter == ch) {
        Some(index) => (CYRILLIC_WEIGHT_BASE, index as u32),
        None => (u32::from(ch), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::{compare_names, fold_case, register, FOLD_FUNCTION, NAME_COLLATION};
    use rusqlite::Connection;
    use std::cmp::Ordering;

    #[test]
    fn ukrainian_letters_follow_alphabet_order() {
        let mut names = vec![
            "Іван Петров",
            "Юлія Бойко",
            "Андрій Мельник",
            "Єва Гнатюк",
            "Ґанна Лис",
            "Їжак",
            "Дмитро",
        ];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(
            names,
            [
                "Андрій Мельник",
                "Ґанна Лис",
                "Дмитро",
                "Єва Гнатюк",
                "Іван Петров",
                "Їжак",
                "Юлія Бойко",
            ]
        );
    }

    #[test]
    fn case_is_ignored_before_exact_tiebreak() {
        assert_eq!(compare_names("іван", "Ігор"), Ordering::Less);
        assert_eq!(compare_names("Іван", "іван"), Ordering::Less);
        assert_eq!(compare_names("Іван", "Іван"), Ordering::Equal);
        assert_eq!(compare_names("Zeta", "Альфа"), Ordering::Less);
    }

    #[test]
    fn fold_lowercases_cyrillic() {
        assert_eq!(fold_case("ШЕВЧЕНКА Ї"), "шевченка ї");
    }

    #[test]
    fn registered_helpers_are_usable_from_sql() {
        let conn = Connection::open_in_memory().unwrap();
        register(&conn).unwrap();

        let matched: bool = conn
            .query_row(
                &format!("SELECT {FOLD_FUNCTION}('Тараса Шевченка') LIKE {FOLD_FUNCTION}('%шевч%');"),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(matched);

        let first: String = conn
            .query_row(
                &format!(
                    "SELECT name FROM (SELECT 'Івана Франка' AS name UNION ALL SELECT 'Андріївська')
                     ORDER BY name COLLATE {NAME_COLLATION} LIMIT 1;"
                ),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(first, "Андріївська");
    }
}
