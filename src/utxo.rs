//! The unspent-transaction-output store

use crate::types::{OutPoint, Transaction, TxOutput};
use secp256k1::PublicKey;
use std::collections::HashMap;

/// Map from outpoint to the unspent output it identifies. Holds exactly the
/// outputs created by the accepted chain (plus issuance) and not yet spent
/// by it. All balance questions reduce to scans of this map.
#[derive(Debug, Clone, Default)]
pub struct UtxoStore {
    map: HashMap<OutPoint, TxOutput>,
}

impl UtxoStore {
    pub fn new() -> Self {
        UtxoStore {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TxOutput> {
        self.map.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.map.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert a single output, keyed by its own outpoint. Used for issuance
    /// and by `apply`.
    pub fn insert(&mut self, output: TxOutput) {
        self.map.insert(output.outpoint(), output);
    }

    /// Apply a validated transaction: consume its inputs, create its
    /// outputs. The caller must have validated first; there is no error
    /// path here.
    pub fn apply(&mut self, tx: &Transaction) {
        for input in &tx.inputs {
            self.map.remove(&input.outpoint);
        }
        for output in &tx.outputs {
            self.insert(output.clone());
        }
    }

    pub fn balance_of(&self, owner: &PublicKey) -> u64 {
        self.map
            .values()
            .filter(|output| output.owner == *owner)
            .map(|output| output.amount)
            .sum()
    }

    pub fn utxos_for(&self, owner: &PublicKey) -> Vec<TxOutput> {
        self.map
            .values()
            .filter(|output| output.owner == *owner)
            .cloned()
            .collect()
    }

    /// Total value across all unspent outputs. Constant under `apply`
    /// because validated transactions conserve value.
    pub fn total_value(&self) -> u64 {
        self.map.values().map(|output| output.amount).sum()
    }
}
