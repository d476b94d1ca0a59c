//! Rejection taxonomy for transaction and block validation
//!
//! Every variant is a verdict on submitted data, never a fault in the node
//! itself. Callers log the rejection and keep serving.

use crate::types::{BlockId, OutPoint};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("input spends unknown outpoint {0}")]
    UnknownOutpoint(OutPoint),

    #[error("outpoint {0} is already spent by a pending transaction")]
    DoubleSpend(OutPoint),

    #[error("signature does not authorize spending input {index}")]
    BadSignature { index: usize },

    // Sums are wider than the amounts so an overflowing output list is
    // reported with its true total
    #[error("inputs sum to {inputs} but outputs sum to {outputs}")]
    ValueMismatch { inputs: u128, outputs: u128 },

    #[error("block id does not meet the proof-of-work target")]
    InsufficientWork,

    #[error("block does not extend the current tip {expected}")]
    ChainMismatch { expected: BlockId },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
