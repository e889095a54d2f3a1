//! Route handlers for creating, listing, deleting and summarizing
//! transactions.
//!
//! All handlers expect the auth middleware to have placed the caller's
//! [UserID] into the request extensions.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    transaction::{
        Transaction, TransactionFilter, TransactionId, TransactionKind, create_transaction,
        delete_transaction, get_transactions, summarize_transactions,
    },
    user::UserID,
};

/// The request body for creating a transaction.
///
/// `kind` is taken as a plain string so that an unknown kind can be rejected
/// with a 400 response instead of axum's default 422.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionData {
    /// The monetary amount of the transaction.
    pub amount: f64,
    /// A label describing the transaction, e.g. "food".
    pub category: String,
    /// Either "expense" or "income".
    pub kind: String,
    /// When the transaction happened. Defaults to today (UTC) when omitted.
    pub date: Option<Date>,
    /// An optional free-text note.
    pub note: Option<String>,
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<CreateTransactionData>,
) -> Result<Response, Error> {
    let kind: TransactionKind = data.kind.parse()?;

    let builder = Transaction::build(data.amount, kind, user_id)
        .category(&data.category)
        .note(data.note);
    let builder = match data.date {
        Some(date) => builder.date(date),
        None => builder,
    };

    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");
    let transaction = create_transaction(builder, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// A route handler for listing the transactions of the logged in user, most
/// recent first.
pub async fn get_transactions_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");
    let transactions = get_transactions(user_id, &filter, &connection)?;

    Ok(Json(transactions).into_response())
}

/// A route handler for deleting one of the logged in user's transactions.
///
/// Responds with a 404 if the transaction does not exist or belongs to
/// another user.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");
    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(StatusCode::OK.into_response())
}

/// A route handler for summarizing the logged in user's income and expenses.
pub async fn get_summary_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");
    let summary = summarize_transactions(user_id, &filter, &connection)?;

    Ok(Json(summary).into_response())
}
