//! Error kinds for the session driver and protocol client.
//!
//! The library never decides which of these are fatal to the whole run;
//! that policy belongs to the binary. `VersionTooOld`, `VersionUnparsable`
//! and `EngineNotFound` are treated as unrecoverable environment errors
//! there, while `EngineCrashed` and `ProtocolViolation` abandon only the
//! current session.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("engine binary not found or failed to launch: {0}")]
    EngineNotFound(#[source] std::io::Error),

    #[error("the engine process died unexpectedly")]
    EngineCrashed,

    #[error("error in GTP response: {0:?}")]
    ProtocolViolation(String),

    #[error("engine version is too old, saw {seen} but expected {required}")]
    VersionTooOld { seen: String, required: String },

    #[error("unexpected engine version string: {0:?}")]
    VersionUnparsable(String),

    #[error("no winner could be determined")]
    NoResult,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;
