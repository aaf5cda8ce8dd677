//! Sway (and i3) specific implementations.
//!
//! This module provides concrete backends for the
//! [`TreeProvider`](crate::traits::TreeProvider),
//! [`CommandSender`](crate::traits::CommandSender) and
//! [`EventSource`](crate::traits::EventSource) traits, speaking the i3 IPC
//! protocol directly over the Unix socket named by `$SWAYSOCK` (or
//! `$I3SOCK`).
//!
//! Nothing outside this module should reference sway directly.

pub mod client;
pub mod events;
pub(crate) mod ipc;

use std::path::PathBuf;

/// Errors that can occur when talking to sway.
#[derive(Debug, thiserror::Error)]
pub enum SwayError {
    #[error("sway socket not found: neither SWAYSOCK nor I3SOCK is set")]
    NoSocket,
    #[error("sway IPC io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sway IPC json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sway IPC protocol error: {0}")]
    Protocol(String),
    #[error("sway command failed: {0}")]
    Command(String),
}

/// Resolve the IPC socket path from the environment.
pub fn socket_path() -> Result<PathBuf, SwayError> {
    ["SWAYSOCK", "I3SOCK"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or(SwayError::NoSocket)
}
