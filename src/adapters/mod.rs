//! Rendering adapters: one per pane.
//!
//! Each adapter turns the authoritative text into what its pane shows and
//! remembers the revision it last delivered, so a pane that missed changes
//! while hidden can be brought up to date when it is shown again.

mod preview;
mod raw;
mod wysiwyg;

pub use preview::PreviewAdapter;
pub use raw::{RawAdapter, RawMode};
pub use wysiwyg::{AdapterSignal, RequestKind, WysiwygAdapter};

use thiserror::Error;

use crate::bridge::Pane;
use crate::channel::ChannelError;
use crate::protocol::ProtocolError;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("editor is not ready yet")]
    NotReady,
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Text at a given revision, as handed to an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot<'a> {
    pub text: &'a str,
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The pane now shows the snapshot.
    Delivered,
    /// The pane cannot take content yet; it will be replayed later.
    Deferred,
    /// The pane already had this revision.
    Unchanged,
}

/// Common contract of the three pane adapters.
pub trait RenderAdapter {
    fn pane(&self) -> Pane;

    /// Bring the pane up to `snapshot`.
    fn push(&mut self, snapshot: Snapshot<'_>) -> Result<PushOutcome, AdapterError>;

    /// Revision the pane last received, if any.
    fn synced_revision(&self) -> Option<u64>;

    /// Record that the pane produced `revision` itself.
    fn mark_synced(&mut self, revision: u64);

    /// Whether the pane is behind `revision`.
    fn is_behind(&self, revision: u64) -> bool {
        self.synced_revision().is_none_or(|synced| synced < revision)
    }
}
