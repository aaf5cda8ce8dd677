//! [`TreeProvider`] and [`CommandSender`] backed by sway IPC.
//!
//! Each request opens its own short-lived connection to the IPC socket, so
//! a `SwayClient` holds no connection state and can be shared freely.

use super::ipc::{self, GET_TREE, GET_WORKSPACES, RUN_COMMAND};
use super::{socket_path, SwayError};
use crate::traits::{CommandSender, TreeProvider};
use crate::tree::Node;
use serde::Deserialize;
use std::collections::HashMap;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Read/write timeout on request connections.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Sway-backed window manager handle.
#[derive(Debug, Clone)]
pub struct SwayClient {
    socket: PathBuf,
}

impl SwayClient {
    /// Create a handle for the socket named in the environment.
    ///
    /// No connection is opened eagerly.
    pub fn new() -> Result<Self, SwayError> {
        Ok(Self::with_socket(socket_path()?))
    }

    pub fn with_socket(socket: impl AsRef<Path>) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Send one request and return the raw reply payload.
    fn request(&self, msg_type: u32, payload: &[u8]) -> Result<Vec<u8>, SwayError> {
        let mut stream = UnixStream::connect(&self.socket)?;
        stream.set_read_timeout(Some(REQUEST_TIMEOUT))?;
        stream.set_write_timeout(Some(REQUEST_TIMEOUT))?;

        ipc::write_message(&mut stream, msg_type, payload)?;
        let (reply_type, reply) = ipc::read_message(&mut stream)?;
        if reply_type != msg_type {
            return Err(SwayError::Protocol(format!(
                "expected reply type {}, got {}",
                msg_type, reply_type
            )));
        }
        Ok(reply)
    }
}

//  Minimal serde structs for the replies we care about

/// Subset of one entry of the `GET_WORKSPACES` reply.
#[derive(Deserialize)]
struct WorkspaceJson {
    num: i64,
    name: String,
}

/// One entry of the `RUN_COMMAND` reply; there is one per command.
#[derive(Deserialize)]
struct CommandOutcome {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl TreeProvider for SwayClient {
    type Error = SwayError;

    fn tree(&self) -> Result<Node, SwayError> {
        let reply = self.request(GET_TREE, b"")?;
        Ok(serde_json::from_slice(&reply)?)
    }

    fn workspace_numbers(&self) -> Result<HashMap<String, i64>, SwayError> {
        let reply = self.request(GET_WORKSPACES, b"")?;
        let workspaces: Vec<WorkspaceJson> = serde_json::from_slice(&reply)?;
        Ok(workspaces.into_iter().map(|ws| (ws.name, ws.num)).collect())
    }
}

impl CommandSender for SwayClient {
    type Error = SwayError;

    fn run_command(&self, command: &str) -> Result<(), SwayError> {
        let reply = self.request(RUN_COMMAND, command.as_bytes())?;
        let outcomes: Vec<CommandOutcome> = serde_json::from_slice(&reply)?;
        let errors: Vec<String> = outcomes
            .into_iter()
            .filter(|o| !o.success)
            .map(|o| o.error.unwrap_or_else(|| "unknown error".into()))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SwayError::Command(errors.join("; ")))
        }
    }
}
