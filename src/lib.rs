//! # powcoin
//!
//! A minimal proof-of-work cryptocurrency ledger: UTXO accounting, signed
//! value transfer, a linear hash-linked chain, and a cancellable miner.
//!
//! ## Architecture
//!
//! The crate is split along trust lines:
//! - Pure validation (`transaction`, `block`, `pow`): deterministic checks
//!   with no side effects. Every rejection is a [`LedgerError`] verdict on
//!   the submitted data, never a node fault.
//! - Guarded state (`utxo`, `mempool`, `node`): the chain, the UTXO store
//!   and the mempool mutate together under one lock, so a block is applied
//!   all-or-nothing and only one block can extend a given tip.
//! - Collaborators (`mining`, `network`, `wallet`): the background miner,
//!   the message dispatch driven by an external transport, and the
//!   untrusted transaction builder.
//!
//! There is no fork choice and no reorganization: the first valid block at
//! each height wins, everything else is ignored.
//!
//! ## Usage
//!
//! ```rust
//! use powcoin::node::Node;
//! use powcoin::wallet::{issuance_tx, new_keypair, prepare_simple_tx};
//!
//! let node = Node::new();
//! let (alice_key, alice) = new_keypair();
//! let (_, bob) = new_keypair();
//!
//! node.airdrop(&issuance_tx(&[(alice, 500_000)]));
//!
//! let tx = prepare_simple_tx(&node.get_utxos(&alice), &alice_key, &bob, 10)?;
//! node.submit_transaction(tx)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod block;
pub mod error;
pub mod mempool;
pub mod mining;
pub mod network;
pub mod node;
pub mod pow;
pub mod transaction;
pub mod types;
pub mod utxo;
pub mod wallet;

pub use error::{LedgerError, Result};
pub use mempool::Mempool;
pub use mining::{CancelSignal, Miner};
pub use network::{handle_message, Message, NoTransport, Transport};
pub use node::{Ledger, Node};
pub use types::{Block, BlockId, OutPoint, Transaction, TxId, TxInput, TxOutput};
pub use utxo::UtxoStore;
