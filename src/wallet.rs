//! Key management and transaction construction
//!
//! Sits outside the consensus core: nothing here is trusted, it only has
//! to produce transactions the validator will accept.

use crate::types::{Transaction, TxId, TxInput, TxOutput};
use anyhow::{bail, Result};
use secp256k1::{PublicKey, Secp256k1, SecretKey};

pub fn new_keypair() -> (SecretKey, PublicKey) {
    let secp = Secp256k1::new();
    secp.generate_keypair(&mut rand::thread_rng())
}

/// Build and sign a payment: greedily select from `utxos` until the amount
/// is covered, pay the recipient at output 0, and return the change to the
/// sender at output 1.
pub fn prepare_simple_tx(
    utxos: &[TxOutput],
    sender_key: &SecretKey,
    recipient: &PublicKey,
    amount: u64,
) -> Result<Transaction> {
    let secp = Secp256k1::new();
    let sender = PublicKey::from_secret_key(&secp, sender_key);

    let mut inputs = Vec::new();
    let mut selected: u64 = 0;
    for utxo in utxos {
        if selected >= amount {
            break;
        }
        inputs.push(TxInput {
            outpoint: utxo.outpoint(),
            signature: None,
        });
        selected = match selected.checked_add(utxo.amount) {
            Some(total) => total,
            None => bail!("selected outputs overflow a 64-bit amount"),
        };
    }
    if selected < amount {
        bail!("insufficient funds: have {selected}, need {amount}");
    }

    let id = TxId::fresh();
    let outputs = vec![
        TxOutput {
            txid: id,
            index: 0,
            amount,
            owner: *recipient,
        },
        TxOutput {
            txid: id,
            index: 1,
            amount: selected - amount,
            owner: sender,
        },
    ];

    let mut tx = Transaction {
        id,
        inputs,
        outputs,
    };
    for index in 0..tx.inputs.len() {
        tx.sign_input(index, sender_key);
    }
    Ok(tx)
}

/// An input-less issuance transaction granting the given allocations.
/// Only `Ledger::airdrop` will take it; the validator rejects it.
pub fn issuance_tx(allocations: &[(PublicKey, u64)]) -> Transaction {
    let id = TxId::fresh();
    let outputs = allocations
        .iter()
        .enumerate()
        .map(|(index, (owner, amount))| TxOutput {
            txid: id,
            index: index as u32,
            amount: *amount,
            owner: *owner,
        })
        .collect();
    Transaction {
        id,
        inputs: Vec::new(),
        outputs,
    }
}
