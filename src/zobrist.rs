//! Zobrist hash material for the position hash.
//!
//! The position hash combines four contributions: stone occupancy, the ko
//! vertex, the side to move, and the pass counter. Each contribution has its
//! own key table so the incremental updates in
//! [`GameState::play_move`](crate::state::GameState::play_move) can XOR a
//! field out and back in around its mutation.

use std::sync::LazyLock;

use crate::constants::{MAX_PASSES, MAX_VERTICES};

/// Fixed seed so hashes are reproducible across runs and processes.
const ZOBRIST_SEED: u64 = 0x1fb7_35a9_c3d1_88e5;

pub struct ZobristKeys {
    /// Per-color, per-vertex stone keys (index 0 = black, 1 = white).
    pub stones: [[u64; MAX_VERTICES]; 2],
    /// Per-vertex ko keys; index 0 is the "no ko" key.
    pub ko: [u64; MAX_VERTICES],
    /// Pass counter keys for counts 0..=4.
    pub passes: [u64; MAX_PASSES + 1],
    /// XORed into the hash whenever black is to move.
    pub black_to_move: u64,
}

pub static KEYS: LazyLock<ZobristKeys> = LazyLock::new(|| {
    let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);
    let mut keys = ZobristKeys {
        stones: [[0; MAX_VERTICES]; 2],
        ko: [0; MAX_VERTICES],
        passes: [0; MAX_PASSES + 1],
        black_to_move: rng.u64(..),
    };
    for table in &mut keys.stones {
        for key in table.iter_mut() {
            *key = rng.u64(..);
        }
    }
    for key in &mut keys.ko {
        *key = rng.u64(..);
    }
    for key in &mut keys.passes {
        *key = rng.u64(..);
    }
    keys
});
