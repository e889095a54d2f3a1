//! Computes income and expense totals over a user's transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};

use crate::{Error, transaction::TransactionFilter, user::UserID};

/// Total income, expenses and the balance between them for a set of
/// transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts.
    pub expense: f64,
    /// Income minus expenses.
    pub net: f64,
}

/// Sum the income and expense transactions owned by `user_id` that fall
/// within the date range of `filter`.
///
/// Any kind set on `filter` is ignored since the summary always reports both
/// kinds.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn summarize_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Summary, Error> {
    let mut query = String::from(
        "SELECT
            COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0 END), 0)
         FROM \"transaction\" WHERE user_id = ?",
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

    let (income, expense) = connection.prepare(&query)?.query_row(
        params_from_iter(params),
        |row| Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?)),
    )?;

    Ok(Summary {
        income,
        expense,
        net: income - expense,
    })
}
