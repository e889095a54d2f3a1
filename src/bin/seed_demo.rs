use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use finlytics::{
    PasswordHash, Transaction, TransactionKind, ValidatedPassword, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a demo database for the REST API server of finlytics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("correct horse battery staple"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("demo@example.com".parse()?, password_hash, &conn)?;

    println!("Creating demo transactions...");

    let builders = [
        Transaction::build(4_000.0, TransactionKind::Income, user.id)
            .category("gifts")
            .date(date!(2025 - 08 - 01)),
        Transaction::build(1_700.0, TransactionKind::Expense, user.id)
            .category("food")
            .date(date!(2025 - 07 - 04))
            .note(Some("groceries for the month".to_owned())),
        Transaction::build(56_000.0, TransactionKind::Income, user.id)
            .category("business")
            .date(date!(2025 - 05 - 19)),
    ];

    for builder in builders {
        create_transaction(builder, &conn)?;
    }

    println!("Success! Log in as demo@example.com with the password 'correct horse battery staple'.");

    Ok(())
}
