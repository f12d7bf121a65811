//! Constants for board geometry, game limits, and protocol conventions.
//!
//! # Board Size Configuration
//!
//! The board size driven by a session is controlled by Cargo features:
//! - `board19x19` (default): 19x19 board
//! - `board13x13`: 13x13 board
//! - `board9x9`: 9x9 board
//!
//! To compile for a specific board size:
//! ```sh
//! cargo build                                                # 19x19 (default)
//! cargo build --no-default-features --features board9x9      # 9x9
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Standard Go sizes are 9, 13, or 19.
#[cfg(feature = "board9x9")]
pub const N: usize = 9;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

#[cfg(feature = "board19x19")]
pub const N: usize = 19;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(any(
    all(feature = "board9x9", feature = "board13x13"),
    all(feature = "board9x9", feature = "board19x19"),
    all(feature = "board13x13", feature = "board19x19")
))]
compile_error!("Only one board size feature may be enabled at a time");

#[cfg(not(any(feature = "board9x9", feature = "board13x13", feature = "board19x19")))]
compile_error!("Must enable exactly one board size feature: 'board9x9', 'board13x13' or 'board19x19'");

/// Number of playable cells on the session board.
pub const NUM_CELLS: usize = N * N;

/// Largest board edge the runtime board supports.
pub const MAX_BOARD: usize = 19;

/// Upper bound on padded vertex indices, used to size the zobrist tables.
/// The padded board is (size + 2) x (size + 2).
pub const MAX_VERTICES: usize = (MAX_BOARD + 2) * (MAX_BOARD + 2);

/// Hard ceiling on game length: twice the cell count. A safety valve
/// against runaway games, not a rule of Go.
pub const MAX_GAME_MOVES: usize = 2 * NUM_CELLS;

// =============================================================================
// Special Move Values
// =============================================================================

/// Pass move marker (index 0 is padding, so safe to use).
pub const PASS_MOVE: usize = 0;

/// Resign move marker.
pub const RESIGN_MOVE: usize = usize::MAX;

/// "No ko point" marker; shares the padding index with [`PASS_MOVE`]
/// since a pass can never be a ko target.
pub const NO_VERTEX: usize = 0;

/// Pass counter values run 0..=4, so five zobrist keys are needed.
pub const MAX_PASSES: usize = 4;

// =============================================================================
// Protocol Conventions
// =============================================================================

/// Marker beginning every successful GTP reply line.
pub const GTP_SUCCESS: &str = "= ";

/// Sentinel returned in place of a reply when the engine process died.
pub const PROCESS_DIED: &str = "PROCESS_DIED";

/// Minimum engine version accepted at startup (major, minor, patch).
pub const MIN_ENGINE_VERSION: (u32, u32, u32) = (0, 17, 0);

/// pi / sqrt(3), the logistic-to-normal scale used to turn a score
/// estimate into a win probability.
pub const PI_OVER_SQRT3: f32 = 1.813_799_4;
