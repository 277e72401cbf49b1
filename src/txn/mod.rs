pub mod generate;
pub mod grammar;
pub mod source;
pub mod worker;

pub use grammar::{Grammar, Token};
pub use source::{TransactionSource, TransactionStream};
pub use worker::{SharedBalance, SharedState, TransactionWorker, WorkerReport, WorkerState};
