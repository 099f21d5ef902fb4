//! Episode loop coupling the environment and the planner
//!
//! Each episode goes `Resetting -> Running -> Terminated`. A running tick
//! snapshots the board for observers, asks the planner for a move among the
//! legal actions, applies it, and checks for termination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::config::RunConfig;
use super::observer::{GridObserver, Snapshot};
use crate::game::{Action, CollisionType, Environment};
use crate::metrics::EpisodeStats;
use crate::planner::Planner;

/// Direction the snake is laid out in at reset, used as the first fallback
const INITIAL_HEADING: Action = Action::East;

/// Where an episode is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    Resetting,
    Running,
    Terminated,
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeEnd {
    Collision(CollisionType),
    BoardFull,
    TickLimit,
    Interrupted,
}

/// Outcome of a single episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeResult {
    pub episode: usize,
    pub score: u32,
    pub ticks: u32,
    pub length: usize,
    pub end: EpisodeEnd,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub episodes: Vec<EpisodeResult>,
    pub high_score: u32,
    pub mean_score: f64,
    pub interrupted: bool,
}

/// Pick the move to apply from the planner's proposal.
///
/// No proposal falls back to the previous move. A proposal that would reverse
/// into the neck is also replaced by the previous move, which is not checked
/// again.
pub fn resolve_action(
    proposed: Option<Action>,
    previous: Action,
    is_reversal: impl Fn(Action) -> bool,
) -> Action {
    let action = proposed.unwrap_or(previous);
    if is_reversal(action) {
        previous
    } else {
        action
    }
}

/// Drives episodes of one environment with one planner
pub struct EpisodeRunner<P: Planner, R: Rng = StdRng> {
    env: Environment<R>,
    planner: P,
    observers: Vec<Box<dyn GridObserver>>,
    config: RunConfig,
    stats: EpisodeStats,
    stop: Arc<AtomicBool>,
    phase: EpisodePhase,
    episode: usize,
    tick: u32,
    previous_action: Action,
}

impl<P: Planner, R: Rng> EpisodeRunner<P, R> {
    pub fn new(env: Environment<R>, mut planner: P, config: RunConfig) -> Self {
        let grid = env.grid();
        planner.create(grid.rows(), grid.columns());

        Self {
            env,
            planner,
            observers: Vec::new(),
            config,
            stats: EpisodeStats::default(),
            stop: Arc::new(AtomicBool::new(false)),
            phase: EpisodePhase::Resetting,
            episode: 0,
            tick: 0,
            previous_action: INITIAL_HEADING,
        }
    }

    /// Attach an observer; it is told the board size immediately
    pub fn add_observer(&mut self, mut observer: Box<dyn GridObserver>) {
        let grid = self.env.grid();
        observer.on_create(grid.rows(), grid.columns());
        self.observers.push(observer);
    }

    /// Flag that ends the run at the next tick boundary when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Play the configured number of episodes
    pub fn run(&mut self) -> RunSummary {
        let mut episodes = Vec::with_capacity(self.config.episodes);

        while episodes.len() < self.config.episodes && !self.is_stopped() {
            let result = self.run_episode();
            let interrupted = result.end == EpisodeEnd::Interrupted;
            episodes.push(result);

            let played = self.stats.total_episodes();
            if played > 0 && played % self.config.log_frequency.max(1) == 0 {
                info!("[Episode {}/{}] {}", played, self.config.episodes, self.stats.format_summary());
            }

            if interrupted {
                break;
            }
        }

        // the stats window only covers recent episodes, the summary covers all
        let mean_score = if episodes.is_empty() {
            0.0
        } else {
            episodes.iter().map(|r| f64::from(r.score)).sum::<f64>() / episodes.len() as f64
        };

        RunSummary {
            high_score: self.stats.high_score(),
            mean_score,
            interrupted: self.is_stopped(),
            episodes,
        }
    }

    /// Play one episode from reset to termination
    pub fn run_episode(&mut self) -> EpisodeResult {
        self.begin_episode();

        let end = loop {
            if self.is_stopped() {
                break EpisodeEnd::Interrupted;
            }
            if let Some(end) = self.tick() {
                break end;
            }
            if !self.config.tick_delay.is_zero() {
                thread::sleep(self.config.tick_delay);
            }
        };

        self.finish_episode(end)
    }

    /// Reset the board and hand the fresh grid to the planner
    pub fn begin_episode(&mut self) {
        self.phase = EpisodePhase::Resetting;
        self.env.reset();
        self.planner.update(self.env.grid());
        self.tick = 0;
        self.previous_action = INITIAL_HEADING;
        self.phase = EpisodePhase::Running;
    }

    /// Advance one tick; returns why the episode ended, if it did
    pub fn tick(&mut self) -> Option<EpisodeEnd> {
        if self.phase != EpisodePhase::Running {
            return None;
        }

        self.notify();

        let head = self.env.head();
        let legal_actions = self.env.legal_actions();
        self.planner.update(self.env.grid());
        let proposed = self.planner.get_action(head, &legal_actions);
        let action = resolve_action(proposed, self.previous_action, |a| {
            self.env.is_reversal(a)
        });

        let result = self.env.apply(action);
        self.tick += 1;
        debug!(
            episode = self.episode,
            tick = self.tick,
            ?proposed,
            action = action.as_str(),
            score = self.env.score(),
            "tick"
        );

        if result.is_terminated() {
            self.phase = EpisodePhase::Terminated;
            let end = match result.info.collision {
                Some(collision) => EpisodeEnd::Collision(collision),
                None => EpisodeEnd::BoardFull,
            };
            return Some(end);
        }

        self.previous_action = action;

        if let Some(limit) = self.config.max_ticks_per_episode {
            if self.tick >= limit {
                self.phase = EpisodePhase::Terminated;
                return Some(EpisodeEnd::TickLimit);
            }
        }

        None
    }

    fn finish_episode(&mut self, end: EpisodeEnd) -> EpisodeResult {
        self.phase = EpisodePhase::Terminated;
        let result = EpisodeResult {
            episode: self.episode,
            score: self.env.score(),
            ticks: self.tick,
            length: self.env.snake().len(),
            end,
        };

        info!(
            episode = result.episode,
            score = result.score,
            ticks = result.ticks,
            end = ?result.end,
            "episode finished"
        );

        self.stats.record_episode(result.score, result.ticks);
        for observer in &mut self.observers {
            observer.on_episode_end(&result);
        }
        self.episode += 1;

        result
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }

        let snapshot = Snapshot {
            episode: self.episode,
            tick: self.tick,
            score: self.env.score(),
            grid: self.env.snapshot(),
        };
        for observer in &mut self.observers {
            observer.on_update(&snapshot);
        }
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn environment(&self) -> &Environment<R> {
        &self.env
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn previous_action(&self) -> Action {
        self.previous_action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CellKind, GameConfig, Grid, Position};
    use crate::planner::{PlannerConfig, ValueIterationPlanner};
    use std::sync::Mutex;

    /// Planner that always proposes the same thing
    struct FixedPlanner(Option<Action>);

    impl Planner for FixedPlanner {
        fn create(&mut self, _rows: usize, _columns: usize) {}
        fn update(&mut self, _grid: &Grid) {}
        fn get_action(&mut self, _head: Position, _legal: &[Action]) -> Option<Action> {
            self.0
        }
    }

    #[derive(Default)]
    struct Recorded {
        created: Option<(usize, usize)>,
        snapshots: Vec<Snapshot>,
        results: Vec<EpisodeResult>,
    }

    struct RecordingObserver(Arc<Mutex<Recorded>>);

    impl GridObserver for RecordingObserver {
        fn on_create(&mut self, rows: usize, columns: usize) {
            self.0.lock().unwrap().created = Some((rows, columns));
        }
        fn on_update(&mut self, snapshot: &Snapshot) {
            self.0.lock().unwrap().snapshots.push(snapshot.clone());
        }
        fn on_episode_end(&mut self, result: &EpisodeResult) {
            self.0.lock().unwrap().results.push(result.clone());
        }
    }

    fn env() -> Environment {
        Environment::seeded(GameConfig::small(), 11).unwrap()
    }

    fn value_planner() -> ValueIterationPlanner {
        ValueIterationPlanner::new(PlannerConfig::default()).unwrap()
    }

    #[test]
    fn test_resolve_action_uses_proposal() {
        let action = resolve_action(Some(Action::North), Action::East, |_| false);
        assert_eq!(action, Action::North);
    }

    #[test]
    fn test_resolve_action_falls_back_on_none() {
        let action = resolve_action(None, Action::South, |_| false);
        assert_eq!(action, Action::South);
    }

    #[test]
    fn test_resolve_action_replaces_reversal() {
        let action = resolve_action(Some(Action::West), Action::East, |a| a == Action::West);
        assert_eq!(action, Action::East);
    }

    #[test]
    fn test_double_fallback_is_not_rechecked() {
        // the previous move is used even if it is itself a reversal
        let action = resolve_action(None, Action::West, |a| a == Action::West);
        assert_eq!(action, Action::West);
    }

    #[test]
    fn test_first_tick_with_no_proposal_keeps_heading() {
        let mut runner = EpisodeRunner::new(env(), FixedPlanner(None), RunConfig::new(1));
        runner.begin_episode();

        assert_eq!(runner.tick(), None);
        assert_eq!(runner.environment().head(), Position::new(6, 6));
        assert_eq!(runner.previous_action(), Action::East);
    }

    #[test]
    fn test_reversal_proposal_replaced_by_previous() {
        let mut runner =
            EpisodeRunner::new(env(), FixedPlanner(Some(Action::West)), RunConfig::new(1));
        runner.begin_episode();

        // West would run into the neck, so the snake keeps going East
        for _ in 0..3 {
            assert_eq!(runner.tick(), None);
        }
        assert_eq!(runner.environment().head(), Position::new(6, 8));
    }

    #[test]
    fn test_collision_ends_episode() {
        let mut runner =
            EpisodeRunner::new(env(), FixedPlanner(Some(Action::North)), RunConfig::new(1));
        let result = runner.run_episode();

        assert_eq!(result.end, EpisodeEnd::Collision(CollisionType::Wall));
        assert_eq!(result.ticks, 6);
        assert_eq!(result.score, 0);
        assert_eq!(runner.phase(), EpisodePhase::Terminated);
    }

    #[test]
    fn test_planner_path_never_reverses() {
        let mut runner = EpisodeRunner::new(env(), value_planner(), RunConfig::new(1));
        runner.begin_episode();

        for _ in 0..200 {
            let neck = runner.environment().snake().neck();
            let legal = runner.environment().legal_actions();
            let head = runner.environment().head();
            if runner.tick().is_some() {
                break;
            }
            let moved_to = runner.environment().head();
            assert_ne!(Some(moved_to), neck);
            assert!(legal.iter().any(|a| head.moved_in_direction(*a) == moved_to));
        }
    }

    #[test]
    fn test_planner_eats_first_apple() {
        let mut runner = EpisodeRunner::new(env(), value_planner(), RunConfig::new(1));
        runner.begin_episode();

        for _ in 0..4 {
            assert_eq!(runner.tick(), None);
        }
        assert_eq!(runner.environment().score(), 1);
        assert_eq!(runner.environment().snake().len(), 5);
        assert_eq!(runner.environment().grid().count(CellKind::Apple), 1);
    }

    #[test]
    fn test_tick_limit() {
        let config = RunConfig {
            episodes: 2,
            max_ticks_per_episode: Some(5),
            ..Default::default()
        };
        let mut runner = EpisodeRunner::new(env(), value_planner(), config);
        let summary = runner.run();

        assert_eq!(summary.episodes.len(), 2);
        for result in &summary.episodes {
            assert_eq!(result.end, EpisodeEnd::TickLimit);
            assert_eq!(result.ticks, 5);
        }
        assert_eq!(summary.episodes[1].episode, 1);
        assert!(!summary.interrupted);
    }

    #[test]
    fn test_observers_see_every_tick() {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut runner =
            EpisodeRunner::new(env(), FixedPlanner(Some(Action::North)), RunConfig::new(2));
        runner.add_observer(Box::new(RecordingObserver(Arc::clone(&recorded))));

        runner.run();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.created, Some((13, 13)));
        assert_eq!(recorded.results.len(), 2);
        // six ticks per episode straight into the north wall
        assert_eq!(recorded.snapshots.len(), 12);
        assert_eq!(recorded.snapshots[0].tick, 0);
        assert_eq!(recorded.snapshots[6].episode, 1);
        assert_eq!(
            recorded.snapshots[0].grid.get(Position::new(6, 5)),
            Some(CellKind::Head)
        );
    }

    #[test]
    fn test_mean_score_covers_whole_run() {
        let episodes = EpisodeStats::default().window_size() + 50;
        let config = RunConfig {
            episodes,
            max_ticks_per_episode: Some(60),
            seed: Some(3),
            ..Default::default()
        };
        let env = Environment::seeded(GameConfig::small(), 3).unwrap();
        let mut runner = EpisodeRunner::new(env, value_planner(), config);
        let summary = runner.run();

        assert_eq!(summary.episodes.len(), episodes);
        let total: u32 = summary.episodes.iter().map(|r| r.score).sum();
        let expected = f64::from(total) / episodes as f64;
        assert!(
            (summary.mean_score - expected).abs() < 1e-9,
            "mean {} over {} episodes, expected {}",
            summary.mean_score,
            episodes,
            expected
        );
    }

    #[test]
    fn test_score_resets_between_episodes() {
        let config = RunConfig {
            episodes: 2,
            max_ticks_per_episode: Some(4),
            ..Default::default()
        };
        let mut runner = EpisodeRunner::new(env(), value_planner(), config);
        let summary = runner.run();

        assert_eq!(summary.episodes[0].score, 1);
        assert_eq!(summary.episodes[1].score, 1);
        assert_eq!(runner.stats().total_episodes(), 2);
    }

    #[test]
    fn test_stop_handle_interrupts() {
        let mut runner = EpisodeRunner::new(env(), value_planner(), RunConfig::new(5));
        runner.stop_handle().store(true, Ordering::Relaxed);

        let summary = runner.run();

        assert!(summary.interrupted);
        assert!(summary.episodes.is_empty());
    }
}
