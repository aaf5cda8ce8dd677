//! Window event subscription.
//!
//! [`SwayEventSource`] opens a dedicated connection, subscribes to the
//! `window` event class and forwards every decoded [`WindowEvent`] into the
//! daemon's channel.  The connection carries no read timeout: it sits idle
//! for as long as nothing happens on screen.

use super::ipc::{self, EVENT_BIT, EVENT_WINDOW, SUBSCRIBE};
use super::{socket_path, SwayError};
use crate::traits::EventSource;
use crate::tree::WindowEvent;
use log::{debug, info, warn};
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// An [`EventSource`] fed by sway's `window` events.
pub struct SwayEventSource {
    socket: PathBuf,
}

impl SwayEventSource {
    pub fn new() -> Result<Self, SwayError> {
        Ok(Self::with_socket(socket_path()?))
    }

    pub fn with_socket(socket: impl AsRef<Path>) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
        }
    }
}

#[derive(Deserialize)]
struct SubscribeReply {
    success: bool,
}

/// Subscribe `stream` to window events.
fn subscribe<S: Read + Write>(stream: &mut S) -> Result<(), SwayError> {
    ipc::write_message(stream, SUBSCRIBE, br#"["window"]"#)?;
    let (reply_type, reply) = ipc::read_message(stream)?;
    if reply_type != SUBSCRIBE {
        return Err(SwayError::Protocol(format!(
            "expected subscribe reply, got type {}",
            reply_type
        )));
    }
    let reply: SubscribeReply = serde_json::from_slice(&reply)?;
    if !reply.success {
        return Err(SwayError::Protocol("subscription refused".into()));
    }
    Ok(())
}

/// Read events from an already subscribed stream until it fails or the
/// receiving side goes away.
fn forward_events<R: Read>(stream: &mut R, sink: &mpsc::Sender<WindowEvent>) -> Result<(), SwayError> {
    loop {
        let (msg_type, payload) = ipc::read_message(stream)?;
        if msg_type & EVENT_BIT == 0 {
            debug!("ignoring non-event message of type {}", msg_type);
            continue;
        }
        if msg_type != EVENT_WINDOW {
            debug!("ignoring event of type {:#x}", msg_type);
            continue;
        }

        let event: WindowEvent = match serde_json::from_slice(&payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("malformed window event: {}", e);
                continue;
            }
        };
        debug!("window event: {}", event.change);
        if sink.send(event).is_err() {
            info!("event receiver dropped, stopping");
            return Ok(());
        }
    }
}

impl EventSource for SwayEventSource {
    type Error = SwayError;

    fn run(&mut self, sink: mpsc::Sender<WindowEvent>) -> Result<(), SwayError> {
        let mut stream = UnixStream::connect(&self.socket)?;
        subscribe(&mut stream)?;
        info!("subscribed to window events on {}", self.socket.display());
        forward_events(&mut stream, &sink)
    }
}
