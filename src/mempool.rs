//! Unconfirmed transactions awaiting inclusion in a block

use crate::error::Result;
use crate::transaction::validate_transaction;
use crate::types::{Block, OutPoint, Transaction, TxId};
use crate::utxo::UtxoStore;
use std::collections::HashSet;

/// Pool of validated but unconfirmed transactions, in arrival order.
/// Entries leave only when a block confirming them is accepted.
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    txns: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Mempool { txns: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.txns.iter().any(|tx| tx.id == *id)
    }

    /// Every outpoint referenced by a pending transaction. The validator
    /// treats these as contested.
    pub fn spent_outpoints(&self) -> HashSet<OutPoint> {
        self.txns
            .iter()
            .flat_map(|tx| tx.inputs.iter().map(|input| input.outpoint))
            .collect()
    }

    /// Validate against the current UTXO store and, on success, buffer the
    /// transaction. A rejection leaves the pool untouched.
    pub fn submit(&mut self, tx: Transaction, utxo: &UtxoStore) -> Result<()> {
        validate_transaction(&tx, utxo, self)?;
        self.txns.push(tx);
        Ok(())
    }

    /// Current contents, for block assembly.
    pub fn take_snapshot(&self) -> Vec<Transaction> {
        self.txns.clone()
    }

    /// Drop every transaction the given block confirmed.
    pub fn remove_confirmed(&mut self, block: &Block) {
        let confirmed: HashSet<TxId> = block.txns.iter().map(|tx| tx.id).collect();
        self.txns.retain(|tx| !confirmed.contains(&tx.id));
    }
}
