//! Proof-of-work target arithmetic

use crate::types::BlockId;

/// Leading zero bits a block id must carry on the main network.
pub const DIFFICULTY_BITS: u32 = 20;

/// 256-bit big-endian threshold. A block id wins by being strictly below it.
pub type Target = [u8; 32];

/// The target for a difficulty of `bits` leading zero bits: 2^(256 - bits)
/// as a big-endian byte array.
pub fn target_for(bits: u32) -> Target {
    assert!(
        (1..=256).contains(&bits),
        "difficulty must be between 1 and 256 bits, got {bits}"
    );
    let mut target = [0u8; 32];
    let bit = 256 - bits;
    target[31 - (bit / 8) as usize] = 1 << (bit % 8);
    target
}

/// Strictly-below comparison; an id equal to the target is not enough work.
pub fn meets_target(id: &BlockId, target: &Target) -> bool {
    id.as_bytes() < target
}
