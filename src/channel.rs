//! Transport between the host and the embedded renderer.
//!
//! Frames are JSON text. The host side is [`HostEndpoint`]; the renderer side
//! is [`RendererEnd`]. A host endpoint may exist without a renderer behind it
//! (before the renderer is created or after it went away), in which case
//! sending fails with [`ChannelError::Unavailable`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use thiserror::Error;
use tracing::{debug, trace};

use crate::protocol::{self, HostCommand, RendererEvent};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("renderer channel is not established")]
    Unavailable,
    #[error("renderer channel disconnected")]
    Disconnected,
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Host side of a renderer channel.
pub trait RendererChannel {
    /// Whether a renderer is attached.
    fn is_established(&self) -> bool;

    /// Send one raw frame.
    fn send_frame(&mut self, frame: String) -> Result<(), ChannelError>;

    /// Take the next pending frame, if any, without blocking.
    fn try_recv_frame(&mut self) -> Result<Option<String>, ChannelError>;

    /// Encode and send a command.
    fn send(&mut self, command: &HostCommand) -> Result<(), ChannelError> {
        if !self.is_established() {
            return Err(ChannelError::Unavailable);
        }
        let frame = protocol::encode(command)?;
        trace!(%frame, "host -> renderer");
        self.send_frame(frame)
    }
}

/// mpsc-backed host endpoint.
#[derive(Debug, Default)]
pub struct HostEndpoint {
    link: Option<(Sender<String>, Receiver<String>)>,
}

impl HostEndpoint {
    /// An endpoint with no renderer behind it.
    pub const fn detached() -> Self {
        Self { link: None }
    }

    /// Drop the link to the renderer.
    pub fn detach(&mut self) {
        if self.link.take().is_some() {
            debug!("renderer channel detached");
        }
    }
}

impl RendererChannel for HostEndpoint {
    fn is_established(&self) -> bool {
        self.link.is_some()
    }

    fn send_frame(&mut self, frame: String) -> Result<(), ChannelError> {
        let Some((tx, _)) = &self.link else {
            return Err(ChannelError::Unavailable);
        };
        if tx.send(frame).is_err() {
            self.detach();
            return Err(ChannelError::Disconnected);
        }
        Ok(())
    }

    fn try_recv_frame(&mut self) -> Result<Option<String>, ChannelError> {
        let Some((_, rx)) = &self.link else {
            return Err(ChannelError::Unavailable);
        };
        match rx.try_recv() {
            Ok(frame) => {
                trace!(%frame, "renderer -> host");
                Ok(Some(frame))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.detach();
                Err(ChannelError::Disconnected)
            }
        }
    }
}

/// Renderer side of a channel.
#[derive(Debug)]
pub struct RendererEnd {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl RendererEnd {
    /// Wait up to `timeout` for the next frame from the host.
    ///
    /// Returns `Ok(None)` on timeout.
    #[cfg(test)]
    pub(crate) fn recv_frame(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Option<String>, ChannelError> {
        use std::sync::mpsc::RecvTimeoutError;

        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ChannelError::Disconnected),
        }
    }

    /// Block until the next frame from the host.
    pub fn recv_frame_blocking(&self) -> Result<String, ChannelError> {
        self.rx.recv().map_err(|_| ChannelError::Disconnected)
    }

    /// Send an event to the host.
    pub fn emit(&self, event: &RendererEvent) -> Result<(), ChannelError> {
        self.emit_frame(protocol::encode(event)?)
    }

    /// Send a raw frame to the host.
    pub fn emit_frame(&self, frame: String) -> Result<(), ChannelError> {
        self.tx.send(frame).map_err(|_| ChannelError::Disconnected)
    }
}

/// Create a connected host/renderer pair.
pub fn pair() -> (HostEndpoint, RendererEnd) {
    let (host_tx, renderer_rx) = mpsc::channel();
    let (renderer_tx, host_rx) = mpsc::channel();
    (
        HostEndpoint {
            link: Some((host_tx, host_rx)),
        },
        RendererEnd {
            tx: renderer_tx,
            rx: renderer_rx,
        },
    )
}
