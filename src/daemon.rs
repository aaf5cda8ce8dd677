//! The per-event pipeline.
//!
//! [`Daemon`] owns the window manager handle and reacts to
//! [`WindowEvent`]s: fetch the tree, resolve every window to an icon,
//! format the candidate names and send one batched rename request.

use crate::formatter::NameFormatter;
use crate::reconcile::rename_batch;
use crate::reload::ActiveConfig;
use crate::resolver::IconResolver;
use crate::traits::{CommandSender, TreeProvider};
use crate::tree::WindowEvent;
use crate::workspace::collect_workspaces;
use log::{debug, error, info};
use std::sync::{mpsc, Arc};

/// Possible errors while processing an event.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),
}

/// Drives the rename pipeline.
///
/// Generic over any window manager that can both report its tree and run
/// commands, so it never refers to sway directly.
pub struct Daemon<W: TreeProvider + CommandSender> {
    wm: W,
    resolver: Arc<IconResolver>,
    active: Arc<ActiveConfig>,
}

impl<W: TreeProvider + CommandSender> Daemon<W> {
    pub fn new(wm: W, resolver: Arc<IconResolver>, active: Arc<ActiveConfig>) -> Self {
        Self {
            wm,
            resolver,
            active,
        }
    }

    /// Handle one window event.  Changes that cannot alter any workspace
    /// name are ignored.
    pub fn handle(&self, event: &WindowEvent) -> Result<(), DaemonError> {
        if !event.change.affects_names() {
            debug!("ignoring window event: {}", event.change);
            return Ok(());
        }
        debug!("processing window event: {}", event.change);
        self.process_workspaces()
    }

    /// Rename every workspace whose name is out of date.
    pub fn process_workspaces(&self) -> Result<(), DaemonError> {
        let numbers = self
            .wm
            .workspace_numbers()
            .map_err(|e| DaemonError::WindowManager(e.to_string()))?;
        let tree = self
            .wm
            .tree()
            .map_err(|e| DaemonError::WindowManager(e.to_string()))?;

        let mut workspaces = collect_workspaces(&tree, &numbers);
        self.resolver.add_icons(&mut workspaces);

        let formatter = NameFormatter::new(self.active.current().format.clone());
        let Some(batch) = rename_batch(&workspaces, &formatter) else {
            debug!("all workspace names up to date");
            return Ok(());
        };
        self.wm
            .run_command(&batch)
            .map_err(|e| DaemonError::WindowManager(e.to_string()))
    }

    /// Process events until every sender is gone.
    ///
    /// Errors abort only the event they occurred in.
    pub fn run(&self, events: mpsc::Receiver<WindowEvent>) {
        for event in events {
            if let Err(e) = self.handle(&event) {
                error!("failed to update workspace names: {}", e);
            }
        }
        info!("event channel closed");
    }
}
