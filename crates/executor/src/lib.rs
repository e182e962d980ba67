//! Write surface of the money market
//!
//! Features:
//! - ABI-encoded deposit / withdraw / approve calldata
//! - Submission through `eth_sendTransaction`, signed by the node or wallet
//! - Session checks before anything leaves the process

pub mod builder;
pub mod submitter;

pub use builder::{BuiltTransaction, TransactionBuilder, TxAction};
pub use submitter::{transaction_request, RpcTransactionSender, SubmittedTransaction, TransactionSender, TransactionSubmitter};
