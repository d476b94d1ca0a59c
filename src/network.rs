//! Peer protocol: decoded messages and the dispatch between a node and its
//! peers. Byte-level framing and socket handling belong to the transport;
//! the node sees whole messages and answers with at most one response.

use crate::error::LedgerError;
use crate::node::Node;
use crate::types::{Block, Transaction, TxOutput};
use log::{debug, info, warn};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

/// One request/response pair per exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Ping,
    Pong,
    Tx(Transaction),
    Block(Block),
    Balance(PublicKey),
    BalanceResponse(u64),
    Utxos(PublicKey),
    UtxosResponse(Vec<TxOutput>),
}

impl Message {
    pub fn command(&self) -> &'static str {
        match self {
            Message::Ping => "ping",
            Message::Pong => "pong",
            Message::Tx(_) => "tx",
            Message::Block(_) => "block",
            Message::Balance(_) => "balance",
            Message::BalanceResponse(_) => "balance-response",
            Message::Utxos(_) => "utxos",
            Message::UtxosResponse(_) => "utxos-response",
        }
    }
}

/// The "send one message to a peer" primitive. Implementations are
/// fire-and-forget: an unreachable peer is skipped, never retried.
pub trait Transport: Send + Sync {
    fn send(&self, peer: &str, message: &Message);
}

/// Transport for a node with no one to talk to.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransport;

impl Transport for NoTransport {
    fn send(&self, _peer: &str, _message: &Message) {}
}

/// Dispatch one decoded message against the node, returning the response
/// to write back, if the protocol defines one. Rejections are logged and
/// swallowed; a malformed or hostile message never takes the node down.
pub fn handle_message(node: &Node, message: Message) -> Option<Message> {
    info!("received {}", message.command());

    match message {
        Message::Ping => Some(Message::Pong),
        Message::Tx(tx) => {
            if let Err(err) = node.submit_transaction(tx) {
                warn!("rejected transaction: {err}");
            }
            None
        }
        Message::Block(block) => {
            match node.accept_block(block) {
                Ok(()) => {}
                Err(LedgerError::ChainMismatch { .. }) => {
                    // Already have a block at this height, or the peer is
                    // on a chain we never adopt
                    debug!("ignoring block that does not extend the tip");
                }
                Err(err) => warn!("rejected block: {err}"),
            }
            None
        }
        Message::Balance(owner) => Some(Message::BalanceResponse(node.get_balance(&owner))),
        Message::Utxos(owner) => Some(Message::UtxosResponse(node.get_utxos(&owner))),
        Message::Pong | Message::BalanceResponse(_) | Message::UtxosResponse(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{issuance_tx, new_keypair};

    #[test]
    fn ping_answers_pong() {
        let node = Node::configure(8, Vec::new(), std::sync::Arc::new(NoTransport));
        assert_eq!(handle_message(&node, Message::Ping), Some(Message::Pong));
    }

    #[test]
    fn balance_query_reads_the_utxo_store() {
        let (_, alice) = new_keypair();
        let node = Node::configure(8, Vec::new(), std::sync::Arc::new(NoTransport));
        node.airdrop(&issuance_tx(&[(alice, 1234)]));

        assert_eq!(
            handle_message(&node, Message::Balance(alice)),
            Some(Message::BalanceResponse(1234))
        );
        match handle_message(&node, Message::Utxos(alice)) {
            Some(Message::UtxosResponse(utxos)) => {
                assert_eq!(utxos.len(), 1);
                assert_eq!(utxos[0].amount, 1234);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn off_tip_block_is_ignored_without_a_response() {
        let node = Node::configure(8, Vec::new(), std::sync::Arc::new(NoTransport));
        let stale = Block {
            txns: vec![],
            prev_id: None,
            nonce: 0,
        };

        assert_eq!(handle_message(&node, Message::Block(stale)), None);
        assert_eq!(node.height(), 0);
    }

    #[test]
    fn invalid_transaction_is_swallowed() {
        let (_, alice) = new_keypair();
        let node = Node::configure(8, Vec::new(), std::sync::Arc::new(NoTransport));

        // Input-less issuance is not valid through the network path
        let tx = issuance_tx(&[(alice, 10)]);
        assert_eq!(handle_message(&node, Message::Tx(tx)), None);
        assert_eq!(node.mempool_len(), 0);
    }
}
