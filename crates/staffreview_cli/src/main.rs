//! Command-line front end for seeding and inspecting a staffreview database.
//!
//! # Responsibility
//! - Map subcommands onto `staffreview_core` repositories and services.
//! - Keep output stable: one line per record, or pretty JSON with `--json`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use staffreview_core::db::open_db;
use staffreview_core::{
    default_log_level, init_logging, Department, DepartmentId, DepartmentRepository, Employee,
    EmployeeId, EmployeeRepository, Review, ReviewChanges, ReviewId, ReviewService, SharedReview,
    SqliteDepartmentRepository, SqliteEmployeeRepository, SqliteReviewRepository,
};
use std::cell::Ref;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "staffreview",
    version = staffreview_core::core_version(),
    about = "Record and inspect employee performance reviews"
)]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "STAFFREVIEW_DB", default_value = "staffreview.db", global = true)]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "STAFFREVIEW_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "STAFFREVIEW_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Print records as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the reviews table if missing.
    Init,
    /// Drop and recreate the reviews table.
    Reset,
    AddDepartment {
        name: String,
        location: String,
    },
    AddEmployee {
        name: String,
        job_title: String,
        #[arg(long)]
        department: Option<DepartmentId>,
    },
    AddReview {
        #[arg(long)]
        year: i64,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        employee: EmployeeId,
    },
    ListReviews {
        #[arg(long)]
        employee: Option<EmployeeId>,
    },
    ShowReview {
        id: ReviewId,
    },
    /// Change one or more fields of a stored review.
    SetReview {
        id: ReviewId,
        #[arg(long)]
        year: Option<i64>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        employee: Option<EmployeeId>,
    },
    DeleteReview {
        id: ReviewId,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let json = cli.json;

    match cli.command {
        Command::AddDepartment { name, location } => {
            let department = SqliteDepartmentRepository::try_new(&conn)?.create(&name, &location)?;
            print_department(&department, json)
        }
        Command::AddEmployee {
            name,
            job_title,
            department,
        } => {
            let employee =
                SqliteEmployeeRepository::try_new(&conn)?.create(&name, &job_title, department)?;
            print_employee(&employee, json)
        }
        Command::Init => {
            review_service(&conn)?;
            info!("event=cli_init module=cli status=ok");
            println!("reviews table ready");
            Ok(())
        }
        Command::Reset => {
            review_service(&conn)?.reset_schema()?;
            println!("reviews table reset");
            Ok(())
        }
        Command::AddReview {
            year,
            summary,
            employee,
        } => {
            let review = review_service(&conn)?.record_review(year, &summary, employee)?;
            let printed = print_review(&review.borrow(), json);
            printed
        }
        Command::ListReviews { employee } => {
            let reviews = review_service(&conn)?.list_reviews(employee)?;
            print_reviews(&reviews, json)
        }
        Command::ShowReview { id } => match review_service(&conn)?.get_review(id)? {
            Some(review) => print_review(&review.borrow(), json),
            None => bail!("review {id} not found"),
        },
        Command::SetReview {
            id,
            year,
            summary,
            employee,
        } => {
            let changes = ReviewChanges {
                year,
                summary,
                employee_id: employee,
            };
            if changes.is_empty() {
                bail!("nothing to change; pass --year, --summary or --employee");
            }
            let review = review_service(&conn)?.revise_review(id, &changes)?;
            let printed = print_review(&review.borrow(), json);
            printed
        }
        Command::DeleteReview { id } => {
            review_service(&conn)?.remove_review(id)?;
            println!("deleted review {id}");
            Ok(())
        }
    }
}

/// Builds the review service, creating `reviews` on first use.
fn review_service(conn: &Connection) -> Result<ReviewService<SqliteReviewRepository<'_>>> {
    let service = ReviewService::new(SqliteReviewRepository::try_new(conn)?);
    service.prepare_schema()?;
    Ok(service)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_review(review: &Review, json: bool) -> Result<()> {
    if json {
        return print_json(review);
    }
    println!("{review}");
    Ok(())
}

fn print_reviews(reviews: &[SharedReview], json: bool) -> Result<()> {
    if json {
        println!("{}", reviews_json(reviews)?);
        return Ok(());
    }
    for review in reviews {
        println!("{}", review.borrow());
    }
    Ok(())
}

/// Serializes reviews in place; the handles are borrowed, never copied.
fn reviews_json(reviews: &[SharedReview]) -> Result<String> {
    let guards: Vec<Ref<'_, Review>> = reviews.iter().map(|review| review.borrow()).collect();
    let snapshot: Vec<&Review> = guards.iter().map(|review| &**review).collect();
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

fn print_department(department: &Department, json: bool) -> Result<()> {
    if json {
        return print_json(department);
    }
    println!(
        "<Department {}: {}, {}>",
        department.id, department.name, department.location
    );
    Ok(())
}

fn print_employee(employee: &Employee, json: bool) -> Result<()> {
    if json {
        return print_json(employee);
    }
    let department = employee
        .department_id
        .map_or_else(|| "none".to_string(), |id| id.to_string());
    println!(
        "<Employee {}: {}, {}, Department: {}>",
        employee.id, employee.name, employee.job_title, department
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{reviews_json, Cli, Command};
    use clap::{CommandFactory, Parser};
    use staffreview_core::db::open_db_in_memory;
    use staffreview_core::{
        EmployeeRepository, ReviewRepository, SqliteEmployeeRepository, SqliteReviewRepository,
    };

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn set_review_parses_optional_fields() {
        let cli = Cli::try_parse_from([
            "staffreview",
            "--db",
            "/tmp/reviews.db",
            "set-review",
            "4",
            "--year",
            "2024",
        ])
        .unwrap();

        match cli.command {
            Command::SetReview {
                id,
                year,
                summary,
                employee,
            } => {
                assert_eq!(id, 4);
                assert_eq!(year, Some(2024));
                assert_eq!(summary, None);
                assert_eq!(employee, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_review_requires_all_fields() {
        let result = Cli::try_parse_from(["staffreview", "add-review", "--year", "2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn reviews_json_serializes_shared_reviews_in_order() {
        let conn = open_db_in_memory().unwrap();
        let employee = SqliteEmployeeRepository::try_new(&conn)
            .unwrap()
            .create("Ada", "Engineer", None)
            .unwrap();
        let repo = SqliteReviewRepository::try_new(&conn).unwrap();
        repo.create_table().unwrap();
        repo.create(2022, "steady", employee.id).unwrap();
        repo.create(2023, "improved", employee.id).unwrap();

        let reviews = repo.get_all().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&reviews_json(&reviews).unwrap()).unwrap();

        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["year"], 2022);
        assert_eq!(rows[0]["summary"], "steady");
        assert_eq!(rows[1]["year"], 2023);
        assert_eq!(rows[1]["employee_id"], employee.id);
        assert_eq!(repo.cached_len(), 2);
    }
}
