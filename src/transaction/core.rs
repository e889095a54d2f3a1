//! Defines the core data model and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, user::UserID};

/// A newtype-free alias for integer transaction IDs.
pub type TransactionId = i64;

/// Whether a transaction records money being spent or earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl TransactionKind {
    /// The kind as the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(std::io::Error::other(format!(
                "{error}"
            )))))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns this transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// A user-defined label that describes what the money was spent on or
    /// earned from, e.g. "food" or "salary".
    pub category: String,
    /// Whether the transaction is an expense or income.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    /// An optional free-text note.
    pub note: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, kind: TransactionKind, user_id: UserID) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            kind,
            user_id,
            category: String::new(),
            date: OffsetDateTime::now_utc().date(),
            note: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Finalize the builder with [create_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction.
    pub amount: f64,
    /// Whether the transaction is an expense or income.
    pub kind: TransactionKind,
    /// The ID of the user the transaction belongs to.
    pub user_id: UserID,
    /// A user-defined label that describes the transaction.
    pub category: String,
    /// When the transaction happened. Defaults to today (UTC).
    pub date: Date,
    /// An optional free-text note.
    pub note: Option<String>,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the date for the transaction.
    pub fn date(mut self, date: Date) -> Self {
        self.date = date;
        self
    }

    /// Set the note for the transaction.
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

/// Create the transaction table.
///
/// Note that the table has a foreign key on the user table, so the user table
/// must be created first.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                kind TEXT NOT NULL,
                date TEXT NOT NULL,
                note TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidAmount] if the builder's amount is not a finite number,
/// - [Error::NotFound] if the builder's user ID does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.amount.is_finite() {
        return Err(Error::InvalidAmount);
    }

    connection
        .execute(
            "INSERT INTO \"transaction\" (user_id, amount, category, kind, date, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                builder.user_id.as_i64(),
                builder.amount,
                &builder.category,
                builder.kind,
                builder.date,
                &builder.note,
            ),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            // The client tried to add a transaction for a nonexistent user.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::NotFound
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id: builder.user_id,
        amount: builder.amount,
        category: builder.category,
        kind: builder.kind,
        date: builder.date,
        note: builder.note,
    })
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, category, kind, date, note FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Delete the transaction with `id` owned by `user_id`.
///
/// Transactions owned by other users cannot be deleted and are reported as
/// missing, so the caller cannot tell whether a transaction exists for
/// another user.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        category: row.get(3)?,
        kind: row.get(4)?,
        date: row.get(5)?,
        note: row.get(6)?,
    })
}
