//! Block validation: the proof-of-work gate, chain linkage, and
//! per-transaction checks against a rolling UTXO snapshot

use crate::error::{LedgerError, Result};
use crate::mempool::Mempool;
use crate::pow::{self, Target};
use crate::transaction::validate_transaction;
use crate::types::{Block, BlockId};
use crate::utxo::UtxoStore;

/// Validate a block as a strict extension of the given tip:
///
/// 1. The block id must be strictly below the proof-of-work target.
/// 2. `prev_id` must name the current tip; there is no fork choice.
/// 3. Every transaction must validate against a snapshot of the UTXO store
///    advanced transaction-by-transaction, so a later transaction may spend
///    outputs created earlier in the same block. The first failure rejects
///    the whole block.
///
/// Pure check; the chain applies the block only after this passes, making
/// acceptance all-or-nothing.
pub fn validate_block(block: &Block, tip: BlockId, utxo: &UtxoStore, target: &Target) -> Result<()> {
    if !pow::meets_target(&block.id(), target) {
        return Err(LedgerError::InsufficientWork);
    }
    if block.prev_id != Some(tip) {
        return Err(LedgerError::ChainMismatch { expected: tip });
    }

    let mut snapshot = utxo.clone();
    let no_pending = Mempool::new();
    for tx in &block.txns {
        validate_transaction(tx, &snapshot, &no_pending)?;
        snapshot.apply(tx);
    }
    Ok(())
}
