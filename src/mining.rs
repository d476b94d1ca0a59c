//! The nonce search and the background mining loop

use crate::node::Node;
use crate::pow::{self, Target};
use crate::types::Block;
use log::{debug, info};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag, raised whenever a block is accepted so an
/// in-flight nonce search abandons its now-stale candidate.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        CancelSignal(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Search for a nonce that puts the block id strictly below the target.
/// The signal is polled on every attempt; `None` means the search was
/// cancelled before a solution was found.
pub fn mine(mut block: Block, target: &Target, cancel: &CancelSignal) -> Option<Block> {
    while !pow::meets_target(&block.id(), target) {
        if cancel.is_set() {
            info!("mining interrupted");
            return None;
        }
        block.nonce = block.nonce.wrapping_add(1);
    }
    Some(block)
}

/// One-attempt-at-a-time mining loop. Each attempt snapshots the mempool
/// and tip under the node's lock, searches from a random starting nonce,
/// and hands any solution back to the node. A stale tip (a peer's block
/// landed first) is a normal restart, not an error.
pub struct Miner {
    node: Node,
}

impl Miner {
    pub fn new(node: Node) -> Self {
        Miner { node }
    }

    pub fn run(&self) -> ! {
        info!("miner starting");
        loop {
            self.mine_once();
        }
    }

    /// A single candidate search against the current snapshot.
    pub fn mine_once(&self) {
        let (txns, prev_id, target) = self.node.mining_snapshot();
        let candidate = Block {
            txns,
            prev_id: Some(prev_id),
            nonce: rand::thread_rng().gen(),
        };

        if let Some(block) = mine(candidate, &target, self.node.cancel_signal()) {
            info!("mined block {}", block.id());
            if let Err(err) = self.node.accept_block(block) {
                debug!("discarding stale mined block: {err}");
            }
        }
        self.node.cancel_signal().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::target_for;
    use crate::types::BlockId;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn finds_a_nonce_at_low_difficulty() {
        let target = target_for(8);
        let block = Block {
            txns: vec![],
            prev_id: Some(BlockId([1; 32])),
            nonce: 0,
        };

        let mined = mine(block, &target, &CancelSignal::new()).unwrap();
        assert!(pow::meets_target(&mined.id(), &target));
    }

    #[test]
    fn cancellation_aborts_the_search() {
        // Effectively unreachable target keeps the search spinning
        let target = target_for(255);
        let cancel = CancelSignal::new();
        let block = Block {
            txns: vec![],
            prev_id: Some(BlockId([1; 32])),
            nonce: 0,
        };

        let flag = cancel.clone();
        let setter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag.set();
        });

        assert!(mine(block, &target, &cancel).is_none());
        setter.join().unwrap();
        assert!(cancel.is_set());
    }
}
