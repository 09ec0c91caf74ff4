//! Command-line front end for the registry core.
//!
//! # Responsibility
//! - Map subcommands onto `RegistryService` operations.
//! - Print each `Outcome` as one JSON document on stdout.
//!
//! # Invariants
//! - Exit status is 0 exactly when the outcome is `ok`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use registry_core::config::ENV_DB_PATH;
use registry_core::{
    default_log_level, init_logging, ApartmentFilter, HouseFilter, NewStudent, Outcome,
    PlainTextRenderer, RegistryConfig, RegistryService, ReportRenderer, StudentFilter,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "registry",
    version,
    about = "Query and edit the street/house/apartment/student registry."
)]
struct Cli {
    /// Database file; `:memory:` for a throwaway store. Defaults to REGISTRY_DB_PATH.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<String>,

    /// Directory for rolling log files. Logging stays off when omitted.
    #[arg(long = "log-dir", global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log level used with --log-dir.
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all streets.
    Streets,
    /// List houses of one street.
    Houses { street_id: i64 },
    /// List apartments of one house.
    Apartments { house_id: i64 },
    /// List students, optionally by street and name substring.
    Students {
        #[arg(long)]
        street: Option<i64>,
        #[arg(long)]
        search: Option<String>,
    },
    /// List houses with their street names.
    HouseDirectory {
        #[arg(long)]
        street: Option<i64>,
    },
    /// List apartments with house numbers and street names.
    ApartmentDirectory {
        #[arg(long)]
        street: Option<i64>,
        #[arg(long)]
        house: Option<i64>,
    },
    AddStreet { name: String },
    AddHouse { number: String, street_id: i64 },
    AddApartment { number: i64, house_id: i64 },
    AddStudent {
        full_name: String,
        /// Date of birth as YYYY-MM-DD.
        date_of_birth: NaiveDate,
        gender: String,
        apartment_id: i64,
        #[arg(long)]
        comments: Option<String>,
    },
    DeleteStudent { student_id: i64 },
    /// Count houses on streets whose name contains PATTERN.
    CountHouses { pattern: String },
    /// Flattened report rows ordered by street, house and apartment.
    Report {
        #[arg(long)]
        street: Option<String>,
    },
    /// Report grouped by street, rendered as plain text.
    Export {
        #[arg(long)]
        street: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = absolute_dir(log_dir);
        if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config = match resolve_config(cli.db.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    info!("event=cli_start module=cli status=ok");

    if run(&RegistryService::new(&config), cli.command) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Executes one command and reports whether it succeeded.
fn run(service: &RegistryService, command: Command) -> bool {
    match command {
        Command::Streets => print_outcome(service.list_streets()),
        Command::Houses { street_id } => print_outcome(service.list_houses(street_id)),
        Command::Apartments { house_id } => print_outcome(service.list_apartments(house_id)),
        Command::Students { street, search } => print_outcome(service.list_students(
            &StudentFilter {
                street_id: street,
                search_text: search,
            },
        )),
        Command::HouseDirectory { street } => {
            print_outcome(service.list_house_directory(&HouseFilter { street_id: street }))
        }
        Command::ApartmentDirectory { street, house } => {
            print_outcome(service.list_apartment_directory(&ApartmentFilter {
                street_id: street,
                house_id: house,
            }))
        }
        Command::AddStreet { name } => print_outcome(service.insert_street(&name)),
        Command::AddHouse { number, street_id } => {
            print_outcome(service.insert_house(&number, street_id))
        }
        Command::AddApartment { number, house_id } => {
            print_outcome(service.insert_apartment(number, house_id))
        }
        Command::AddStudent {
            full_name,
            date_of_birth,
            gender,
            apartment_id,
            comments,
        } => print_outcome(service.insert_student(&NewStudent::new(
            &full_name,
            date_of_birth,
            &gender,
            comments.as_deref(),
            apartment_id,
        ))),
        Command::DeleteStudent { student_id } => print_outcome(service.delete_student(student_id)),
        Command::CountHouses { pattern } => print_outcome(service.count_houses_matching(&pattern)),
        Command::Report { street } => {
            print_outcome(service.list_students_report(street.as_deref()))
        }
        Command::Export { street } => {
            match service.build_students_report(street.as_deref()).into_result() {
                Ok(document) => {
                    print!("{}", PlainTextRenderer::default().render(&document));
                    true
                }
                Err(message) => print_outcome(Outcome::<()>::failure(message)),
            }
        }
    }
}

/// `--db` wins over `REGISTRY_DB_PATH`; other settings still come from the environment.
fn resolve_config(db: Option<&str>) -> Result<RegistryConfig, String> {
    RegistryConfig::from_lookup(|key| match db {
        Some(value) if key == ENV_DB_PATH => Some(value.to_string()),
        _ => std::env::var(key).ok(),
    })
    .map_err(|err| format!("invalid configuration: {err}"))
}

fn print_outcome<T: Serialize>(outcome: Outcome<T>) -> bool {
    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to encode outcome: {err}");
            return false;
        }
    }
    outcome.ok
}

fn absolute_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}
