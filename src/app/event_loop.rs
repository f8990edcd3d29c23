use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{debug, info, trace, warn};

use crate::adapters::WysiwygAdapter;
use crate::app::{App, Message, Model, update};
use crate::channel;
use crate::renderer::{self, RendererOptions};
use crate::watcher::DirWatcher;

/// How long the renderer may leave a request unacknowledged.
pub(super) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer cannot be started, the terminal
    /// cannot be initialized, or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let (host, end) = channel::pair();
        let options = RendererOptions {
            init_delay: self.renderer_init_delay(),
        };
        let renderer =
            renderer::spawn(end, options).context("Failed to start the editor renderer")?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; tripane requires an interactive terminal")?;
        let size = terminal.size()?;
        let mut model = self.initial_model(WysiwygAdapter::new(host), (size.width, size.height));
        model.renderer_options = Some(options);
        model.renderer_thread = Some(renderer);

        let result = execute!(stdout(), EnableMouseCapture)
            .context("Failed to enable mouse capture")
            .and_then(|()| Self::event_loop(&mut terminal, &mut model));

        model.wysiwyg.shutdown();
        let renderer = model.renderer_thread.take();
        // Dropping the model closes the channel so the renderer thread exits.
        drop(model);
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        if let Some(renderer) = renderer
            && renderer.join().is_err()
        {
            warn!("renderer thread panicked");
        }

        result
    }

    fn make_dir_watcher(dir: &std::path::Path) -> Option<DirWatcher> {
        match DirWatcher::new(dir, WATCH_DEBOUNCE) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                warn!(dir = %dir.display(), %err, "directory watch unavailable");
                None
            }
        }
    }

    fn dispatch(model: &mut Model, msg: Message) {
        trace!(?msg, "message");
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, &side_msg);
    }

    /// Turn everything the renderer sent since the last pass into messages.
    pub(super) fn drain_renderer(model: &mut Model) -> bool {
        let mut handled = false;
        match model.wysiwyg.drain_frames() {
            Ok(frames) => {
                for frame in frames {
                    Self::dispatch(model, Message::RendererFrame(frame));
                    handled = true;
                }
            }
            Err(err) => {
                Self::dispatch(model, Message::RendererLost(err.to_string()));
                handled = true;
            }
        }
        let expired = model.wysiwyg.expire_unacknowledged(REQUEST_TIMEOUT);
        if !expired.is_empty() {
            Self::dispatch(model, Message::RequestsExpired(expired.len()));
            handled = true;
        }
        handled
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut watched_dir: PathBuf = model.store.last_dir().to_path_buf();
        let mut dir_watcher = Self::make_dir_watcher(&watched_dir);
        let mut needs_render = true;

        loop {
            // Follow the browser to a new directory
            if model.store.last_dir() != watched_dir {
                watched_dir = model.store.last_dir().to_path_buf();
                debug!(dir = %watched_dir.display(), "rewatching directory");
                dir_watcher = Self::make_dir_watcher(&watched_dir);
            }

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if Self::drain_renderer(model) {
                needs_render = true;
            }

            if dir_watcher
                .as_mut()
                .is_some_and(DirWatcher::take_change_ready)
            {
                Self::dispatch(model, Message::DirectoryChanged);
                needs_render = true;
            }

            if needs_render {
                terminal.draw(|frame| Self::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                info!("quitting");
                break;
            }

            // Renderer replies arrive on the channel, so keep polling briskly
            // while it is loading or requests are outstanding.
            let loading = model.wysiwyg.is_connected() && !model.wysiwyg.is_ready();
            let poll_ms = if loading || model.wysiwyg.pending_requests() > 0 {
                10
            } else {
                100
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                if let Some(msg) = Self::handle_event(&event::read()?, model) {
                    Self::dispatch(model, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        Self::dispatch(model, msg);
                        needs_render = true;
                    }
                }
            }
        }
        Ok(())
    }
}
