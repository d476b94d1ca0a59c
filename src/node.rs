//! Ledger state and the shared node handle that serializes mutation

use crate::block::validate_block;
use crate::error::Result;
use crate::mempool::Mempool;
use crate::mining::{mine, CancelSignal, Miner};
use crate::network::{Message, NoTransport, Transport};
use crate::pow::{self, Target, DIFFICULTY_BITS};
use crate::types::{Block, BlockId, Transaction, TxOutput};
use crate::utxo::UtxoStore;
use log::info;
use secp256k1::PublicKey;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// The ledger proper: the accepted chain, the UTXO store it defines, and
/// the pool of unconfirmed transactions. Constructed with its genesis block
/// already mined, so the chain is never empty. All concurrent mutation
/// funnels through the owning `Node`'s lock.
#[derive(Debug)]
pub struct Ledger {
    blocks: Vec<Block>,
    utxo: UtxoStore,
    mempool: Mempool,
    target: Target,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_difficulty(DIFFICULTY_BITS)
    }

    /// Tests run with fewer difficulty bits so blocks mine in microseconds.
    pub fn with_difficulty(bits: u32) -> Self {
        let target = pow::target_for(bits);
        let genesis = mine(
            Block {
                txns: Vec::new(),
                prev_id: None,
                nonce: 0,
            },
            &target,
            &CancelSignal::new(),
        )
        .expect("genesis mining is never cancelled");

        Ledger {
            blocks: vec![genesis],
            utxo: UtxoStore::new(),
            mempool: Mempool::new(),
            target,
        }
    }

    pub fn tip(&self) -> &Block {
        self.blocks.last().expect("chain always holds genesis")
    }

    /// Height of the tip; genesis is height 0.
    pub fn height(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn utxo_store(&self) -> &UtxoStore {
        &self.utxo
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// Validate a block against the tip and, on success, apply it as one
    /// unit: update the UTXO store transaction by transaction, drop
    /// confirmed mempool entries, append. A rejected block changes nothing.
    pub fn accept_block(&mut self, block: Block) -> Result<()> {
        validate_block(&block, self.tip().id(), &self.utxo, &self.target)?;
        for tx in &block.txns {
            self.utxo.apply(tx);
        }
        self.mempool.remove_confirmed(&block);
        self.blocks.push(block);
        info!("accepted block at height {}", self.height());
        Ok(())
    }

    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<()> {
        self.mempool.submit(tx, &self.utxo)
    }

    /// Issue value outside consensus: insert an input-less transaction's
    /// outputs directly into the UTXO store. There is no coinbase reward;
    /// this is how a deployment seeds its initial balances.
    pub fn airdrop(&mut self, tx: &Transaction) {
        for output in &tx.outputs {
            self.utxo.insert(output.clone());
        }
    }

    pub fn balance_of(&self, owner: &PublicKey) -> u64 {
        self.utxo.balance_of(owner)
    }

    pub fn utxos_for(&self, owner: &PublicKey) -> Vec<TxOutput> {
        self.utxo.utxos_for(owner)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle shared by the network handler and the miner. One lock
/// guards chain, UTXO store and mempool as a unit; it is held only for the
/// validate-and-mutate step, never across I/O.
#[derive(Clone)]
pub struct Node {
    ledger: Arc<Mutex<Ledger>>,
    cancel: CancelSignal,
    peers: Vec<String>,
    transport: Arc<dyn Transport>,
}

impl Node {
    pub fn new() -> Self {
        Self::configure(DIFFICULTY_BITS, Vec::new(), Arc::new(NoTransport))
    }

    pub fn configure(difficulty_bits: u32, peers: Vec<String>, transport: Arc<dyn Transport>) -> Self {
        Node {
            ledger: Arc::new(Mutex::new(Ledger::with_difficulty(difficulty_bits))),
            cancel: CancelSignal::new(),
            peers,
            transport,
        }
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().expect("ledger lock poisoned")
    }

    /// Validate and apply a block, then interrupt any in-flight mining
    /// attempt and flood the block to every peer. Both the network handler
    /// and the miner land here; the lock makes the two paths mutually
    /// exclusive, so only one block can ever extend a given tip. The
    /// broadcast happens after the lock is released.
    pub fn accept_block(&self, block: Block) -> Result<()> {
        self.lock().accept_block(block.clone())?;
        self.cancel.set();

        let message = Message::Block(block);
        for peer in &self.peers {
            self.transport.send(peer, &message);
        }
        Ok(())
    }

    pub fn submit_transaction(&self, tx: Transaction) -> Result<()> {
        self.lock().submit_transaction(tx)
    }

    pub fn airdrop(&self, tx: &Transaction) {
        self.lock().airdrop(tx)
    }

    pub fn get_balance(&self, owner: &PublicKey) -> u64 {
        self.lock().balance_of(owner)
    }

    pub fn get_utxos(&self, owner: &PublicKey) -> Vec<TxOutput> {
        self.lock().utxos_for(owner)
    }

    pub fn tip_id(&self) -> BlockId {
        self.lock().tip().id()
    }

    pub fn height(&self) -> usize {
        self.lock().height()
    }

    pub fn mempool_len(&self) -> usize {
        self.lock().mempool().len()
    }

    /// Everything a mining attempt needs, read under one lock so the
    /// transaction set and the tip belong to the same chain state.
    pub fn mining_snapshot(&self) -> (Vec<Transaction>, BlockId, Target) {
        let ledger = self.lock();
        (
            ledger.mempool().take_snapshot(),
            ledger.tip().id(),
            ledger.target(),
        )
    }

    /// Spawn the background miner. Genesis is already in place from
    /// construction; message handling is driven externally through
    /// `network::handle_message`.
    pub fn start(&self) -> std::io::Result<()> {
        let miner = Miner::new(self.clone());
        thread::Builder::new()
            .name("miner".into())
            .spawn(move || miner.run())?;
        Ok(())
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
