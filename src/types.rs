//! Core ledger entities: transactions, outputs, blocks and their identifiers

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Transaction identifier: 16 random bytes assigned at construction time,
/// so a transaction's outputs can embed the id of the transaction creating
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId([u8; 16]);

impl TxId {
    pub fn fresh() -> Self {
        TxId(*uuid::Uuid::new_v4().as_bytes())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        TxId(bytes)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Block identifier: SHA-256 of the serialized block. Ordering compares the
/// digest as a big-endian 256-bit integer, which is exactly the comparison
/// the proof-of-work target check needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub [u8; 32]);

impl BlockId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Reference to a specific output: the id of the transaction that created
/// it plus its position in that transaction's output list. Globally unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: TxId,
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A unit of spendable value, owned by a public key. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub txid: TxId,
    pub index: u32,
    pub amount: u64,
    pub owner: PublicKey,
}

impl TxOutput {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            index: self.index,
        }
    }
}

/// Spend of exactly one prior output. The signature is filled in by the
/// owner of the referenced output; it covers the spend message, not the
/// whole transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    pub outpoint: OutPoint,
    pub signature: Option<Signature>,
}

/// A signed transfer of value from a set of unspent outputs to a new set of
/// outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// The digest an input's owner signs: the outpoint being spent plus the
    /// full ordered output list. Binding the outputs means any change to
    /// the allocation after signing invalidates every signature.
    pub fn spend_message(&self, index: usize) -> [u8; 32] {
        let payload = (&self.inputs[index].outpoint, &self.outputs);
        let encoded = serde_json::to_vec(&payload).expect("spend message serializes");
        Sha256::digest(&encoded).into()
    }

    pub fn sign_input(&mut self, index: usize, key: &SecretKey) {
        let secp = Secp256k1::new();
        let message =
            Message::from_digest_slice(&self.spend_message(index)).expect("32-byte digest");
        self.inputs[index].signature = Some(secp.sign_ecdsa(&message, key));
    }

    /// Check the input's signature against the claimed owner. A missing or
    /// malformed signature fails the same way a wrong one does.
    pub fn verify_input(&self, index: usize, owner: &PublicKey) -> bool {
        let signature = match &self.inputs[index].signature {
            Some(signature) => signature,
            None => return false,
        };
        let message = match Message::from_digest_slice(&self.spend_message(index)) {
            Ok(message) => message,
            Err(_) => return false,
        };
        let secp = Secp256k1::verification_only();
        secp.verify_ecdsa(&message, signature, owner).is_ok()
    }
}

/// A mined batch of transactions extending the block identified by
/// `prev_id`. Genesis is the one block with `prev_id: None` and no
/// transactions, mined like any other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub txns: Vec<Transaction>,
    pub prev_id: Option<BlockId>,
    pub nonce: u64,
}

impl Block {
    /// Serialized form hashed into the block id: the full block contents,
    /// nonce included, so every nonce increment yields a fresh id.
    pub fn header_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("block serializes")
    }

    pub fn id(&self) -> BlockId {
        BlockId(Sha256::digest(self.header_bytes()).into())
    }
}
