//! Crate error type
//!
//! Invalid runtime input (unknown ids, empty magazines, state conflicts)
//! deliberately does not surface here: those calls log and return a
//! no-effect result so a fault never escapes the frame loop. The typed
//! error covers load-time and tooling failures only.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
