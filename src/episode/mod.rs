//! Episode orchestration
//!
//! The runner is the only component that touches both the environment and the
//! planner. Observers get read-only snapshots of the board.

pub mod config;
pub mod observer;
pub mod runner;

pub use config::RunConfig;
pub use observer::{ChannelObserver, GridObserver, Snapshot, ViewEvent};
pub use runner::{
    resolve_action, EpisodeEnd, EpisodePhase, EpisodeResult, EpisodeRunner, RunSummary,
};
