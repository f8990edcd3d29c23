//! In-process embedded renderer.
//!
//! Owns the rich editing surface on its own thread and talks to the host only
//! through the message channel. It announces readiness after its
//! initialization delay and acknowledges every request it handles.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::channel::{ChannelError, RendererEnd};
use crate::editor::{EditorBuffer, format};
use crate::protocol::{self, HostCommand, LogLevel, RendererEvent};

#[derive(Debug, Clone, Copy, Default)]
pub struct RendererOptions {
    /// Time spent "loading" before `editorReady` is sent.
    pub init_delay: Duration,
}

/// Start the renderer on a background thread.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn(end: RendererEnd, options: RendererOptions) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tripane-renderer".to_string())
        .spawn(move || {
            let mut surface = Surface::new(end);
            match surface.run(options) {
                Ok(()) => debug!("renderer stopped"),
                Err(err) => debug!(%err, "renderer channel closed"),
            }
        })
}

enum Flow {
    Continue,
    Stop,
}

struct Surface {
    end: RendererEnd,
    buffer: EditorBuffer,
    /// Revision of the last `setContent`.
    base: Option<u64>,
}

impl Surface {
    fn new(end: RendererEnd) -> Self {
        Self {
            end,
            buffer: EditorBuffer::from_text(""),
            base: None,
        }
    }

    fn run(&mut self, options: RendererOptions) -> Result<(), ChannelError> {
        if !options.init_delay.is_zero() {
            thread::sleep(options.init_delay);
        }
        self.log(LogLevel::Info, "editing surface initialized")?;
        self.end.emit(&RendererEvent::EditorReady {
            message: Some("editor ready".to_string()),
        })?;
        info!("renderer ready");

        loop {
            let frame = self.end.recv_frame_blocking()?;
            let command = match protocol::decode_command(&frame) {
                Ok(command) => command,
                Err(err) => {
                    warn!(%err, "renderer rejected message");
                    self.end.emit(&RendererEvent::Error {
                        error: err.to_string(),
                    })?;
                    continue;
                }
            };
            if let Flow::Stop = self.handle(command)? {
                return Ok(());
            }
        }
    }

    fn handle(&mut self, command: HostCommand) -> Result<Flow, ChannelError> {
        match command {
            HostCommand::SetContent {
                id,
                revision,
                markdown,
            } => {
                self.buffer.set_text(&markdown);
                self.base = Some(revision);
                self.cursor_moved()?;
                self.ack(id)?;
            }
            HostCommand::SyncContent { id } => {
                self.end.emit(&RendererEvent::SyncRequested {
                    content: self.buffer.text(),
                    base_revision: self.base,
                })?;
                self.ack(id)?;
            }
            HostCommand::ExecuteCommand { id, command } => {
                if format::apply(&mut self.buffer, command) {
                    self.content_changed()?;
                }
                self.cursor_moved()?;
                self.ack(id)?;
            }
            HostCommand::GetActiveMarks { id } => {
                self.end.emit(&RendererEvent::ActiveMarks {
                    id,
                    marks: format::active_marks(&self.buffer),
                })?;
                self.ack(id)?;
            }
            HostCommand::Input { id, key } => {
                if self.buffer.apply_key(key) {
                    self.content_changed()?;
                }
                self.cursor_moved()?;
                self.ack(id)?;
            }
            HostCommand::Shutdown => {
                self.log(LogLevel::Debug, "shutting down")?;
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }

    fn content_changed(&self) -> Result<(), ChannelError> {
        self.end.emit(&RendererEvent::ContentChanged {
            content: self.buffer.text(),
            base_revision: self.base,
        })
    }

    fn cursor_moved(&self) -> Result<(), ChannelError> {
        let cursor = self.buffer.cursor();
        self.end.emit(&RendererEvent::CursorMoved {
            line: cursor.line,
            column: cursor.col,
        })
    }

    fn ack(&self, id: u64) -> Result<(), ChannelError> {
        self.end.emit(&RendererEvent::Ack { id })
    }

    fn log(&self, level: LogLevel, message: &str) -> Result<(), ChannelError> {
        self.end.emit(&RendererEvent::ConsoleLog {
            level,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{self, HostEndpoint, RendererChannel};
    use crate::protocol::{EditorKey, FormatCommand, Mark, decode_event};
    use std::time::Instant;

    fn next_event(host: &mut HostEndpoint) -> RendererEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(frame) = host.try_recv_frame().unwrap() {
                return decode_event(&frame).unwrap();
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("renderer did not answer");
    }

    fn events_until_ack(host: &mut HostEndpoint, id: u64) -> Vec<RendererEvent> {
        let mut events = Vec::new();
        loop {
            let event = next_event(host);
            if event == (RendererEvent::Ack { id }) {
                return events;
            }
            events.push(event);
        }
    }

    fn started() -> (HostEndpoint, JoinHandle<()>) {
        let (mut host, end) = channel::pair();
        let handle = spawn(end, RendererOptions::default()).unwrap();
        assert!(matches!(next_event(&mut host), RendererEvent::ConsoleLog { .. }));
        assert!(matches!(next_event(&mut host), RendererEvent::EditorReady { .. }));
        (host, handle)
    }

    #[test]
    fn test_typing_reports_content_with_base_revision() {
        let (mut host, handle) = started();
        host.send(&HostCommand::SetContent {
            id: 1,
            revision: 4,
            markdown: String::new(),
        })
        .unwrap();
        events_until_ack(&mut host, 1);

        host.send(&HostCommand::Input {
            id: 2,
            key: EditorKey::Char('x'),
        })
        .unwrap();
        let events = events_until_ack(&mut host, 2);
        assert!(events.contains(&RendererEvent::ContentChanged {
            content: "x".to_string(),
            base_revision: Some(4),
        }));
        assert!(events.contains(&RendererEvent::CursorMoved { line: 0, column: 1 }));

        host.send(&HostCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_navigation_does_not_report_content() {
        let (mut host, _handle) = started();
        host.send(&HostCommand::Input {
            id: 1,
            key: EditorKey::Left,
        })
        .unwrap();
        let events = events_until_ack(&mut host, 1);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, RendererEvent::ContentChanged { .. }))
        );
    }

    #[test]
    fn test_format_command_and_marks() {
        let (mut host, _handle) = started();
        host.send(&HostCommand::SetContent {
            id: 1,
            revision: 1,
            markdown: "Title".to_string(),
        })
        .unwrap();
        events_until_ack(&mut host, 1);

        host.send(&HostCommand::ExecuteCommand {
            id: 2,
            command: FormatCommand::ToggleHeading1,
        })
        .unwrap();
        let events = events_until_ack(&mut host, 2);
        assert!(events.contains(&RendererEvent::ContentChanged {
            content: "# Title".to_string(),
            base_revision: Some(1),
        }));

        host.send(&HostCommand::GetActiveMarks { id: 3 }).unwrap();
        let events = events_until_ack(&mut host, 3);
        assert_eq!(
            events,
            vec![RendererEvent::ActiveMarks {
                id: 3,
                marks: vec![Mark::Heading1],
            }]
        );
    }

    #[test]
    fn test_sync_returns_current_content() {
        let (mut host, _handle) = started();
        host.send(&HostCommand::SetContent {
            id: 1,
            revision: 9,
            markdown: "# Doc".to_string(),
        })
        .unwrap();
        events_until_ack(&mut host, 1);
        host.send(&HostCommand::SyncContent { id: 2 }).unwrap();
        let events = events_until_ack(&mut host, 2);
        assert_eq!(
            events,
            vec![RendererEvent::SyncRequested {
                content: "# Doc".to_string(),
                base_revision: Some(9),
            }]
        );
    }

    #[test]
    fn test_garbage_frame_reports_error_and_keeps_running() {
        let (mut host, _handle) = started();
        host.send_frame(r#"{"action":"explode"}"#.to_string()).unwrap();
        assert!(matches!(next_event(&mut host), RendererEvent::Error { .. }));

        host.send(&HostCommand::SyncContent { id: 7 }).unwrap();
        events_until_ack(&mut host, 7);
    }
}
