//! Autogo: a self-play game driver for GTP Go engines.
//!
//! This crate runs unattended self-play games against an external
//! move-generation engine over the Go Text Protocol, producing game
//! records and training artifacts, and separately maintains an
//! authoritative in-memory game-state model for code that must enforce or
//! replay Go rules locally.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, game limits, protocol conventions
//! - [`board`] - Board primitive (stones, captures, scoring, coordinates)
//! - [`zobrist`] - Hash material for the position hash
//! - [`state`] - Game state model (ko, pass counting, score dispatch)
//! - [`gtp`] - Line transport and protocol client for the engine process
//! - [`session`] - Per-game session driver and result determination
//! - [`sgf`] - Position-record post-processing
//! - [`error`] - Driver error kinds
//!
//! ## Example
//!
//! ```no_run
//! use autogo::constants::MIN_ENGINE_VERSION;
//! use autogo::gtp::EngineCommand;
//! use autogo::session::Session;
//!
//! # fn main() -> autogo::error::Result<()> {
//! let command = EngineCommand::new("./leelaz").args(["-g", "-w", "weights.gz"]);
//! let mut session = Session::start(&command, MIN_ENGINE_VERSION)?;
//! loop {
//!     session.request_move()?;
//!     if !session.read_move()? {
//!         break;
//!     }
//!     if !session.advance_turn() {
//!         break;
//!     }
//! }
//! let outcome = session.compute_result(false)?;
//! println!("Result: {}", outcome.margin);
//! session.quit()?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod gtp;
pub mod session;
pub mod sgf;
pub mod state;
pub mod zobrist;
