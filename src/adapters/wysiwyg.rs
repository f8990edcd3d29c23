use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::{AdapterError, PushOutcome, RenderAdapter, Snapshot};
use crate::bridge::{Edit, Pane, Replay};
use crate::channel::{ChannelError, HostEndpoint, RendererChannel};
use crate::protocol::{self, EditorKey, FormatCommand, HostCommand, LogLevel, Mark, RendererEvent};

/// What an outstanding request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    SetContent,
    Sync,
    Command(FormatCommand),
    Marks,
    Input,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    kind: RequestKind,
    sent_at: Instant,
}

/// A decoded renderer event, as far as the host cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterSignal {
    /// The renderer's text changed (typed, formatted, or sent on request).
    Edit(Edit),
    /// The renderer finished initializing.
    Ready { message: Option<String> },
    /// The renderer reported an error.
    Failed(String),
    /// A request was acknowledged.
    Settled {
        id: u64,
        kind: Option<RequestKind>,
    },
    /// Cursor or active marks changed.
    Redraw,
    /// A renderer log line was relayed.
    Logged,
}

/// Host side of the rich editor pane.
#[derive(Debug)]
pub struct WysiwygAdapter<C = HostEndpoint> {
    channel: C,
    ready: bool,
    next_id: u64,
    in_flight: BTreeMap<u64, InFlight>,
    synced: Option<u64>,
    content: String,
    cursor: (usize, usize),
    marks: Vec<Mark>,
}

impl Default for WysiwygAdapter<HostEndpoint> {
    fn default() -> Self {
        Self::new(HostEndpoint::detached())
    }
}

impl<C: RendererChannel> WysiwygAdapter<C> {
    pub const fn new(channel: C) -> Self {
        Self {
            channel,
            ready: false,
            next_id: 1,
            in_flight: BTreeMap::new(),
            synced: None,
            content: String::new(),
            cursor: (0, 0),
            marks: Vec::new(),
        }
    }

    /// Swap in a new channel. Readiness and outstanding requests are
    /// forgotten.
    pub fn replace_channel(&mut self, channel: C) {
        debug!(dropped = self.in_flight.len(), "replacing renderer channel");
        self.channel = channel;
        self.ready = false;
        self.in_flight.clear();
        self.synced = None;
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_established()
    }

    /// Last text known to be in the renderer.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Renderer cursor as (line, byte column).
    pub const fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Deliver the pending-content replay once the renderer is ready.
    pub fn on_ready(&mut self, replay: &Replay) -> Result<PushOutcome, AdapterError> {
        self.ready = true;
        self.synced = None;
        self.push(Snapshot {
            text: &replay.text,
            revision: replay.revision,
        })
    }

    /// Push `snapshot` even if the renderer claims to have its revision.
    pub fn resync(&mut self, snapshot: Snapshot<'_>) -> Result<PushOutcome, AdapterError> {
        self.synced = None;
        self.push(snapshot)
    }

    /// Ask the renderer to apply a formatting command.
    pub fn execute(&mut self, command: FormatCommand) -> Result<u64, AdapterError> {
        self.request(RequestKind::Command(command), |id| HostCommand::ExecuteCommand {
            id,
            command,
        })
    }

    /// Ask the renderer to send its current content.
    pub fn request_sync(&mut self) -> Result<u64, AdapterError> {
        self.request(RequestKind::Sync, |id| HostCommand::SyncContent { id })
    }

    /// Ask the renderer which marks are active at its cursor.
    pub fn request_marks(&mut self) -> Result<u64, AdapterError> {
        self.request(RequestKind::Marks, |id| HostCommand::GetActiveMarks { id })
    }

    /// Forward a key press to the renderer.
    pub fn send_key(&mut self, key: EditorKey) -> Result<u64, AdapterError> {
        self.request(RequestKind::Input, |id| HostCommand::Input { id, key })
    }

    /// Ask the renderer to stop. Errors are ignored.
    pub fn shutdown(&mut self) {
        if self.channel.is_established() {
            let _ = self.channel.send(&HostCommand::Shutdown);
        }
        self.ready = false;
    }

    /// Take every frame the renderer has sent so far.
    pub fn drain_frames(&mut self) -> Result<Vec<String>, ChannelError> {
        let mut frames = Vec::new();
        if !self.channel.is_established() {
            return Ok(frames);
        }
        while let Some(frame) = self.channel.try_recv_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Decode one renderer frame and update the pane's view of the renderer.
    pub fn handle_frame(&mut self, frame: &str) -> Result<AdapterSignal, AdapterError> {
        let event = protocol::decode_event(frame).inspect_err(|err| {
            warn!(%err, "rejected renderer message");
        })?;
        Ok(self.handle_event(event))
    }

    fn handle_event(&mut self, event: RendererEvent) -> AdapterSignal {
        match event {
            RendererEvent::ContentChanged {
                content,
                base_revision,
            }
            | RendererEvent::SyncRequested {
                content,
                base_revision,
            } => {
                content.clone_into(&mut self.content);
                AdapterSignal::Edit(Edit {
                    text: content,
                    origin: Pane::Wysiwyg,
                    base: base_revision,
                })
            }
            RendererEvent::EditorReady { message } => AdapterSignal::Ready { message },
            RendererEvent::Error { error } => {
                error!(%error, "renderer reported an error");
                AdapterSignal::Failed(error)
            }
            RendererEvent::Ack { id } => {
                let kind = self.in_flight.remove(&id).map(|req| req.kind);
                if kind.is_none() {
                    debug!(id, "ack for unknown request");
                }
                AdapterSignal::Settled { id, kind }
            }
            RendererEvent::ActiveMarks { marks, .. } => {
                self.marks = marks;
                AdapterSignal::Redraw
            }
            RendererEvent::CursorMoved { line, column } => {
                self.cursor = (line, column);
                AdapterSignal::Redraw
            }
            RendererEvent::ConsoleLog { level, message } => {
                match level {
                    LogLevel::Debug => debug!(target: "tripane::renderer", "{message}"),
                    LogLevel::Info => info!(target: "tripane::renderer", "{message}"),
                    LogLevel::Warn => warn!(target: "tripane::renderer", "{message}"),
                    LogLevel::Error => error!(target: "tripane::renderer", "{message}"),
                }
                AdapterSignal::Logged
            }
        }
    }

    /// Drop and report requests older than `timeout`.
    pub fn expire_unacknowledged(&mut self, timeout: Duration) -> Vec<(u64, RequestKind)> {
        let now = Instant::now();
        let expired: Vec<(u64, RequestKind)> = self
            .in_flight
            .iter()
            .filter(|(_, req)| now.duration_since(req.sent_at) >= timeout)
            .map(|(id, req)| (*id, req.kind))
            .collect();
        for (id, kind) in &expired {
            warn!(id, ?kind, "renderer never acknowledged request");
            self.in_flight.remove(id);
        }
        expired
    }

    fn request(
        &mut self,
        kind: RequestKind,
        build: impl FnOnce(u64) -> HostCommand,
    ) -> Result<u64, AdapterError> {
        if !self.channel.is_established() {
            return Err(ChannelError::Unavailable.into());
        }
        if !self.ready {
            return Err(AdapterError::NotReady);
        }
        self.send_tracked(kind, build)
    }

    fn send_tracked(
        &mut self,
        kind: RequestKind,
        build: impl FnOnce(u64) -> HostCommand,
    ) -> Result<u64, AdapterError> {
        let id = self.next_id;
        self.next_id += 1;
        self.channel.send(&build(id))?;
        self.in_flight.insert(
            id,
            InFlight {
                kind,
                sent_at: Instant::now(),
            },
        );
        Ok(id)
    }
}

impl<C: RendererChannel> RenderAdapter for WysiwygAdapter<C> {
    fn pane(&self) -> Pane {
        Pane::Wysiwyg
    }

    fn push(&mut self, snapshot: Snapshot<'_>) -> Result<PushOutcome, AdapterError> {
        if !self.channel.is_established() {
            return Err(ChannelError::Unavailable.into());
        }
        if !self.ready {
            debug!(revision = snapshot.revision, "editor not ready, deferring push");
            return Ok(PushOutcome::Deferred);
        }
        if self.synced == Some(snapshot.revision) {
            return Ok(PushOutcome::Unchanged);
        }
        let markdown = snapshot.text.to_string();
        let revision = snapshot.revision;
        self.send_tracked(RequestKind::SetContent, |id| HostCommand::SetContent {
            id,
            revision,
            markdown,
        })?;
        snapshot.text.clone_into(&mut self.content);
        self.synced = Some(revision);
        Ok(PushOutcome::Delivered)
    }

    fn synced_revision(&self) -> Option<u64> {
        self.synced
    }

    fn mark_synced(&mut self, revision: u64) {
        self.synced = Some(revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_command;

    /// Channel that records frames and replays scripted replies.
    #[derive(Debug, Default)]
    struct Recording {
        detached: bool,
        sent: Vec<String>,
        inbox: Vec<String>,
    }

    impl RendererChannel for Recording {
        fn is_established(&self) -> bool {
            !self.detached
        }

        fn send_frame(&mut self, frame: String) -> Result<(), ChannelError> {
            self.sent.push(frame);
            Ok(())
        }

        fn try_recv_frame(&mut self) -> Result<Option<String>, ChannelError> {
            if self.inbox.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.inbox.remove(0)))
            }
        }
    }

    fn sent(adapter: &WysiwygAdapter<Recording>) -> Vec<HostCommand> {
        adapter
            .channel()
            .sent
            .iter()
            .map(|f| decode_command(f).unwrap())
            .collect()
    }

    fn ready_adapter() -> WysiwygAdapter<Recording> {
        let mut adapter = WysiwygAdapter::new(Recording::default());
        adapter
            .on_ready(&Replay {
                text: "start".to_string(),
                revision: 1,
            })
            .unwrap();
        adapter
    }

    #[test]
    fn test_push_before_ready_is_deferred() {
        let mut adapter = WysiwygAdapter::new(Recording::default());
        let outcome = adapter
            .push(Snapshot {
                text: "# Hi",
                revision: 2,
            })
            .unwrap();
        assert_eq!(outcome, PushOutcome::Deferred);
        assert!(sent(&adapter).is_empty());
        assert_eq!(adapter.synced_revision(), None);
    }

    #[test]
    fn test_ready_replays_content() {
        let adapter = ready_adapter();
        assert_eq!(
            sent(&adapter),
            vec![HostCommand::SetContent {
                id: 1,
                revision: 1,
                markdown: "start".to_string(),
            }]
        );
        assert_eq!(adapter.synced_revision(), Some(1));
        assert_eq!(adapter.pending_requests(), 1);
    }

    #[test]
    fn test_push_same_revision_is_unchanged() {
        let mut adapter = ready_adapter();
        let outcome = adapter
            .push(Snapshot {
                text: "start",
                revision: 1,
            })
            .unwrap();
        assert_eq!(outcome, PushOutcome::Unchanged);
        assert_eq!(sent(&adapter).len(), 1);
    }

    #[test]
    fn test_commands_require_readiness() {
        let mut adapter = WysiwygAdapter::new(Recording::default());
        assert!(matches!(
            adapter.execute(FormatCommand::ToggleBold),
            Err(AdapterError::NotReady)
        ));
        assert!(matches!(adapter.request_sync(), Err(AdapterError::NotReady)));
    }

    #[test]
    fn test_detached_channel_is_unavailable() {
        let mut adapter = WysiwygAdapter::new(Recording {
            detached: true,
            ..Recording::default()
        });
        assert!(matches!(
            adapter.execute(FormatCommand::ToggleBold),
            Err(AdapterError::Channel(ChannelError::Unavailable))
        ));
        assert!(matches!(
            adapter.push(Snapshot {
                text: "x",
                revision: 1
            }),
            Err(AdapterError::Channel(ChannelError::Unavailable))
        ));
    }

    #[test]
    fn test_ack_settles_request() {
        let mut adapter = ready_adapter();
        let id = adapter.execute(FormatCommand::ToggleItalic).unwrap();
        assert_eq!(adapter.pending_requests(), 2);

        let signal = adapter
            .handle_frame(&format!(r#"{{"action":"ack","id":{id}}}"#))
            .unwrap();
        assert_eq!(
            signal,
            AdapterSignal::Settled {
                id,
                kind: Some(RequestKind::Command(FormatCommand::ToggleItalic)),
            }
        );
        assert_eq!(adapter.pending_requests(), 1);
    }

    #[test]
    fn test_content_changed_becomes_edit() {
        let mut adapter = ready_adapter();
        let signal = adapter
            .handle_frame(r##"{"action":"contentChanged","content":"# Hello","baseRevision":1}"##)
            .unwrap();
        assert_eq!(
            signal,
            AdapterSignal::Edit(Edit {
                text: "# Hello".to_string(),
                origin: Pane::Wysiwyg,
                base: Some(1),
            })
        );
        assert_eq!(adapter.content(), "# Hello");
    }

    #[test]
    fn test_marks_and_cursor_are_tracked() {
        let mut adapter = ready_adapter();
        adapter
            .handle_frame(r#"{"action":"activeMarks","id":4,"marks":["italic"]}"#)
            .unwrap();
        adapter
            .handle_frame(r#"{"action":"cursorMoved","line":2,"column":5}"#)
            .unwrap();
        assert_eq!(adapter.marks(), &[Mark::Italic]);
        assert_eq!(adapter.cursor(), (2, 5));
    }

    #[test]
    fn test_unknown_action_is_protocol_error() {
        let mut adapter = ready_adapter();
        let err = adapter.handle_frame(r#"{"action":"dance"}"#).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Protocol(crate::protocol::ProtocolError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_error_event_is_failure_signal() {
        let mut adapter = ready_adapter();
        let signal = adapter
            .handle_frame(r#"{"action":"error","error":"boom"}"#)
            .unwrap();
        assert_eq!(signal, AdapterSignal::Failed("boom".to_string()));
    }

    #[test]
    fn test_expire_unacknowledged_reports_old_requests() {
        let mut adapter = ready_adapter();
        adapter.request_marks().unwrap();
        let expired = adapter.expire_unacknowledged(Duration::ZERO);
        assert_eq!(expired.len(), 2);
        assert_eq!(adapter.pending_requests(), 0);
        assert!(adapter.expire_unacknowledged(Duration::ZERO).is_empty());
    }

    #[test]
    fn test_drain_frames_collects_inbox() {
        let mut adapter = WysiwygAdapter::new(Recording {
            inbox: vec!["a".to_string(), "b".to_string()],
            ..Recording::default()
        });
        assert_eq!(adapter.drain_frames().unwrap(), vec!["a", "b"]);
        assert!(adapter.drain_frames().unwrap().is_empty());
    }

    #[test]
    fn test_replace_channel_forgets_readiness() {
        let mut adapter = ready_adapter();
        adapter.replace_channel(Recording::default());
        assert!(!adapter.is_ready());
        assert_eq!(adapter.pending_requests(), 0);
        assert_eq!(adapter.synced_revision(), None);
    }
}
