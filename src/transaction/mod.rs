//! Everything to do with transactions, the record of money being spent or
//! earned.

mod core;
mod endpoint;
mod query;
mod summary;

pub use self::core::{
    Transaction, TransactionBuilder, TransactionId, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transaction,
};
pub use endpoint::{
    CreateTransactionData, create_transaction_endpoint, delete_transaction_endpoint,
    get_summary_endpoint, get_transactions_endpoint,
};
pub use query::{TransactionFilter, get_transactions};
pub use summary::{Summary, summarize_transactions};
