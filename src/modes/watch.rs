//! Watch mode: follow the planner in a terminal UI
//!
//! The episode loop runs on its own blocking thread and is the only code that
//! mutates the board. It sends immutable snapshots over a channel; this task
//! keeps the latest one and redraws it at a fixed frame rate.
//!
//! # Controls
//!
//! - Q/Esc/Ctrl+C: Quit

use std::io::{stderr, Stderr};
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::interval;

use super::headless::SimulationConfig;
use crate::episode::{ChannelObserver, RunSummary, ViewEvent};
use crate::input::{InputHandler, KeyAction};
use crate::render::{Renderer, ViewState};

pub struct WatchMode {
    config: SimulationConfig,
    view: ViewState,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl WatchMode {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            view: ViewState::default(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        // Build before touching the terminal so config errors print normally
        let mut runner = self.config.build_runner()?;
        let (tx, rx) = unbounded_channel();
        runner.add_observer(Box::new(ChannelObserver::new(tx)));
        let stop = runner.stop_handle();
        let simulation = tokio::task::spawn_blocking(move || runner.run());

        let mut terminal = match setup_terminal() {
            Ok(terminal) => terminal,
            Err(err) => {
                stop.store(true, Ordering::Relaxed);
                return Err(err);
            }
        };

        let result = self.run_view_loop(&mut terminal, rx, &simulation).await;

        self.cleanup_terminal(&mut terminal)?;

        stop.store(true, Ordering::Relaxed);
        let summary = simulation.await.context("Episode loop panicked")?;
        result.map(|_| summary)
    }

    async fn run_view_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        mut rx: UnboundedReceiver<ViewEvent>,
        simulation: &JoinHandle<RunSummary>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS
        let mut render_timer = interval(Duration::from_millis(33));
        let mut channel_open = true;

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                maybe_view_event = rx.recv(), if channel_open => {
                    match maybe_view_event {
                        Some(view_event) => self.apply_view_event(view_event),
                        None => channel_open = false,
                    }
                }

                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.view);
                    }).context("Failed to draw frame")?;
                }
            }

            // leave once every episode has played and the last frame is drawn
            if self.should_quit || (!channel_open && simulation.is_finished()) {
                break;
            }
        }

        Ok(())
    }

    fn apply_view_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Created { rows, columns } => {
                self.view.dimensions = Some((rows, columns));
            }
            ViewEvent::Updated(snapshot) => {
                self.view.snapshot = Some(snapshot);
            }
            ViewEvent::EpisodeEnded(result) => {
                self.view.stats.record_episode(result.score, result.ticks);
                self.view.last_result = Some(result);
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stderr>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}
