//! Capability traits that decouple the icon pipeline from sway, from
//! `/proc`, and from the configuration file.
//!
//! Every concrete backend (sway IPC, a Linux process table, a YAML file, a
//! test harness, …) implements one of these traits.  The
//! [`Daemon`](crate::daemon::Daemon) and the
//! [`IconResolver`](crate::resolver::IconResolver) only depend on these
//! abstractions.

use crate::config::{Config, ConfigError};
use crate::tree::{Node, WindowEvent};
use std::collections::HashMap;
use std::sync::mpsc;

/// Read access to the window manager's current state.
pub trait TreeProvider {
    /// The error type produced by this provider.
    type Error: std::error::Error + Send + 'static;

    /// Return the full window tree.
    fn tree(&self) -> Result<Node, Self::Error>;

    /// Map every workspace name to its number.
    ///
    /// Workspace nodes in the tree carry a name but not reliably a number,
    /// so the number is looked up separately.
    fn workspace_numbers(&self) -> Result<HashMap<String, i64>, Self::Error>;
}

/// Write access to the window manager.
pub trait CommandSender {
    /// The error type produced by this sender.
    type Error: std::error::Error + Send + 'static;

    /// Send one (possibly `;`-joined) command string.
    ///
    /// Failures are reported, never retried.
    fn run_command(&self, command: &str) -> Result<(), Self::Error>;
}

/// A source of window events.
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received event is sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`WindowEvent`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<WindowEvent>) -> Result<(), Self::Error>;
}

/// Resolves a process id to the base name of its executable.
pub trait ExecutableLookup: Send + Sync {
    /// Must return an error (never panic) for a process that has exited or
    /// cannot be inspected.
    fn executable_name(&self, pid: u32) -> std::io::Result<String>;
}

/// Produces a fresh [`Config`] each time it is asked, e.g. on reload.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<Config, ConfigError>;
}
