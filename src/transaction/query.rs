//! Queries for listing a user's transactions, with optional filters.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    transaction::{Transaction, TransactionKind, core::map_transaction_row},
    user::UserID,
};

/// Narrows down which of a user's transactions are returned by
/// [get_transactions] and included in a summary.
///
/// The default filter matches every transaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionFilter {
    /// Only include transactions on or after this date.
    pub from: Option<Date>,
    /// Only include transactions on or before this date.
    pub to: Option<Date>,
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
}

/// Retrieve the transactions owned by `user_id` that match `filter`, most
/// recent first. Transactions on the same date are ordered by descending ID so
/// the most recently created comes first.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query = String::from(
        "SELECT id, user_id, amount, category, kind, date, note FROM \"transaction\"
         WHERE user_id = ?",
    );
    let mut params: Vec<Value> = vec![Value::Integer(user_id.as_i64())];

    if let Some(from) = filter.from {
        query.push_str(" AND date >= ?");
        params.push(Value::Text(from.to_string()));
    }

    if let Some(to) = filter.to {
        query.push_str(" AND date <= ?");
        params.push(Value::Text(to.to_string()));
    }

    if let Some(kind) = filter.kind {
        query.push_str(" AND kind = ?");
        params.push(Value::Text(kind.as_str().to_owned()));
    }

    query.push_str(" ORDER BY date DESC, id DESC");

    let mut statement = connection.prepare(&query)?;
    let transactions = statement
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect();

    transactions
}
