use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::runner::EpisodeResult;
use crate::game::Grid;

/// Read-only view of one tick, shared with observers
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub episode: usize,
    pub tick: u32,
    pub score: u32,
    pub grid: Arc<Grid>,
}

/// Receives the board after every tick.
///
/// Observers only ever see immutable snapshots; the episode loop stays the
/// sole mutator of the board.
pub trait GridObserver: Send {
    /// Called once before the first episode
    fn on_create(&mut self, rows: usize, columns: usize);

    /// Called at the start of every tick
    fn on_update(&mut self, snapshot: &Snapshot);

    /// Called when an episode ends
    fn on_episode_end(&mut self, _result: &EpisodeResult) {}
}

/// Messages sent to a rendering task
#[derive(Debug, Clone)]
pub enum ViewEvent {
    Created { rows: usize, columns: usize },
    Updated(Snapshot),
    EpisodeEnded(EpisodeResult),
}

/// Forwards every notification over a channel to another task
pub struct ChannelObserver {
    tx: UnboundedSender<ViewEvent>,
}

impl ChannelObserver {
    pub fn new(tx: UnboundedSender<ViewEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: ViewEvent) {
        // the receiver is gone once the view has shut down
        let _ = self.tx.send(event);
    }
}

impl GridObserver for ChannelObserver {
    fn on_create(&mut self, rows: usize, columns: usize) {
        self.send(ViewEvent::Created { rows, columns });
    }

    fn on_update(&mut self, snapshot: &Snapshot) {
        self.send(ViewEvent::Updated(snapshot.clone()));
    }

    fn on_episode_end(&mut self, result: &EpisodeResult) {
        self.send(ViewEvent::EpisodeEnded(result.clone()));
    }
}
