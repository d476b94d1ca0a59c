//! Transaction validation against the UTXO store and mempool

use crate::error::{LedgerError, Result};
use crate::mempool::Mempool;
use crate::types::Transaction;
use crate::utxo::UtxoStore;
use std::collections::HashSet;

/// A transaction is valid when every input spends an existing, uncontested
/// outpoint with a signature from its owner, and no value is created or
/// destroyed:
///
/// 1. Each input's outpoint is present in the UTXO store and is not
///    referenced by any pending transaction, nor by an earlier input of
///    this transaction.
/// 2. Each input's signature verifies over the spend message against the
///    public key owning the spent output.
/// 3. Input amounts and output amounts sum to the same value.
///
/// Pure check: no state is mutated on either outcome, and the first
/// violation decides the error.
pub fn validate_transaction(tx: &Transaction, utxo: &UtxoStore, mempool: &Mempool) -> Result<()> {
    let pending = mempool.spent_outpoints();
    let mut seen = HashSet::new();
    // u128 accumulators: a hostile output list summing past u64::MAX must
    // not wrap into a passing conservation check
    let mut input_sum: u128 = 0;

    for (index, input) in tx.inputs.iter().enumerate() {
        let spent = utxo
            .get(&input.outpoint)
            .ok_or(LedgerError::UnknownOutpoint(input.outpoint))?;

        if pending.contains(&input.outpoint) || !seen.insert(input.outpoint) {
            return Err(LedgerError::DoubleSpend(input.outpoint));
        }

        if !tx.verify_input(index, &spent.owner) {
            return Err(LedgerError::BadSignature { index });
        }

        input_sum += u128::from(spent.amount);
    }

    let output_sum: u128 = tx
        .outputs
        .iter()
        .map(|output| u128::from(output.amount))
        .sum();
    if input_sum != output_sum {
        return Err(LedgerError::ValueMismatch {
            inputs: input_sum,
            outputs: output_sum,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OutPoint, TxId, TxInput, TxOutput};
    use crate::wallet::new_keypair;
    use secp256k1::{PublicKey, SecretKey};

    fn seeded_store(owner: PublicKey, amount: u64) -> (UtxoStore, OutPoint) {
        let output = TxOutput {
            txid: TxId::fresh(),
            index: 0,
            amount,
            owner,
        };
        let outpoint = output.outpoint();
        let mut store = UtxoStore::new();
        store.insert(output);
        (store, outpoint)
    }

    fn spend(outpoint: OutPoint, key: &SecretKey, recipient: PublicKey, amount: u64) -> Transaction {
        let id = TxId::fresh();
        let mut tx = Transaction {
            id,
            inputs: vec![TxInput {
                outpoint,
                signature: None,
            }],
            outputs: vec![TxOutput {
                txid: id,
                index: 0,
                amount,
                owner: recipient,
            }],
        };
        tx.sign_input(0, key);
        tx
    }

    #[test]
    fn accepts_a_well_formed_spend() {
        let (alice_key, alice) = new_keypair();
        let (_, bob) = new_keypair();
        let (store, coin) = seeded_store(alice, 100);

        let tx = spend(coin, &alice_key, bob, 100);
        assert!(validate_transaction(&tx, &store, &Mempool::new()).is_ok());
    }

    #[test]
    fn rejects_unknown_outpoint() {
        let (alice_key, alice) = new_keypair();
        let (store, _) = seeded_store(alice, 100);

        let missing = OutPoint {
            txid: TxId::fresh(),
            index: 9,
        };
        let tx = spend(missing, &alice_key, alice, 100);
        assert!(matches!(
            validate_transaction(&tx, &store, &Mempool::new()),
            Err(LedgerError::UnknownOutpoint(outpoint)) if outpoint == missing
        ));
    }

    #[test]
    fn rejects_outpoint_contested_by_mempool() {
        let (alice_key, alice) = new_keypair();
        let (_, bob) = new_keypair();
        let (store, coin) = seeded_store(alice, 100);

        let mut mempool = Mempool::new();
        let first = spend(coin, &alice_key, bob, 100);
        mempool.submit(first, &store).unwrap();

        let second = spend(coin, &alice_key, alice, 100);
        assert!(matches!(
            validate_transaction(&second, &store, &mempool),
            Err(LedgerError::DoubleSpend(outpoint)) if outpoint == coin
        ));
    }

    #[test]
    fn rejects_duplicate_input_within_one_transaction() {
        let (alice_key, alice) = new_keypair();
        let (store, coin) = seeded_store(alice, 100);

        let id = TxId::fresh();
        let mut tx = Transaction {
            id,
            inputs: vec![
                TxInput {
                    outpoint: coin,
                    signature: None,
                },
                TxInput {
                    outpoint: coin,
                    signature: None,
                },
            ],
            outputs: vec![TxOutput {
                txid: id,
                index: 0,
                amount: 200,
                owner: alice,
            }],
        };
        tx.sign_input(0, &alice_key);
        tx.sign_input(1, &alice_key);

        assert!(matches!(
            validate_transaction(&tx, &store, &Mempool::new()),
            Err(LedgerError::DoubleSpend(outpoint)) if outpoint == coin
        ));
    }

    #[test]
    fn rejects_signature_from_the_wrong_key() {
        let (_, alice) = new_keypair();
        let (mallory_key, _) = new_keypair();
        let (store, coin) = seeded_store(alice, 100);

        let tx = spend(coin, &mallory_key, alice, 100);
        assert!(matches!(
            validate_transaction(&tx, &store, &Mempool::new()),
            Err(LedgerError::BadSignature { index: 0 })
        ));
    }

    #[test]
    fn rejects_tampered_outputs() {
        let (alice_key, alice) = new_keypair();
        let (_, bob) = new_keypair();
        let (store, coin) = seeded_store(alice, 100);

        let mut tx = spend(coin, &alice_key, bob, 100);
        tx.outputs[0].owner = alice;
        assert!(matches!(
            validate_transaction(&tx, &store, &Mempool::new()),
            Err(LedgerError::BadSignature { index: 0 })
        ));
    }

    #[test]
    fn rejects_output_sums_that_wrap_64_bits() {
        let (alice_key, alice) = new_keypair();
        let (store, coin) = seeded_store(alice, 100);

        // Two outputs whose u64 sum wraps back to the input amount
        let id = TxId::fresh();
        let mut tx = Transaction {
            id,
            inputs: vec![TxInput {
                outpoint: coin,
                signature: None,
            }],
            outputs: vec![
                TxOutput {
                    txid: id,
                    index: 0,
                    amount: u64::MAX,
                    owner: alice,
                },
                TxOutput {
                    txid: id,
                    index: 1,
                    amount: 101,
                    owner: alice,
                },
            ],
        };
        tx.sign_input(0, &alice_key);

        assert!(matches!(
            validate_transaction(&tx, &store, &Mempool::new()),
            Err(LedgerError::ValueMismatch { inputs: 100, outputs })
                if outputs == u128::from(u64::MAX) + 101
        ));
    }

    #[test]
    fn rejects_value_mismatch() {
        let (alice_key, alice) = new_keypair();
        let (_, bob) = new_keypair();
        let (store, coin) = seeded_store(alice, 100);

        let tx = spend(coin, &alice_key, bob, 99);
        assert!(matches!(
            validate_transaction(&tx, &store, &Mempool::new()),
            Err(LedgerError::ValueMismatch {
                inputs: 100,
                outputs: 99
            })
        ));
    }
}
