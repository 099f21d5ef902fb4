//! Headless mode: play episodes as fast as the planner allows
//!
//! Progress goes to the log; the run summary is returned to the caller.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::episode::{EpisodeRunner, RunConfig, RunSummary};
use crate::game::{Environment, GameConfig};
use crate::planner::{PlannerConfig, ValueIterationPlanner};

/// Everything needed to start a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationConfig {
    pub game: GameConfig,
    pub planner: PlannerConfig,
    pub run: RunConfig,
}

impl SimulationConfig {
    /// Build the environment, planner and runner.
    ///
    /// Fails before allocating anything if any section is invalid.
    pub fn build_runner(&self) -> Result<EpisodeRunner<ValueIterationPlanner>> {
        self.game.validate().context("Invalid game configuration")?;
        self.planner
            .validate()
            .context("Invalid planner configuration")?;
        self.run.validate().context("Invalid run configuration")?;

        let env = match self.run.seed {
            Some(seed) => Environment::seeded(self.game.clone(), seed),
            None => Environment::new(self.game.clone()),
        }
        .context("Failed to create environment")?;
        let planner = ValueIterationPlanner::new(self.planner.clone())
            .context("Failed to create planner")?;

        Ok(EpisodeRunner::new(env, planner, self.run.clone()))
    }
}

/// Summary printed by `--json`
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub config: &'a SimulationConfig,
    pub summary: &'a RunSummary,
}

pub struct HeadlessMode {
    config: SimulationConfig,
}

impl HeadlessMode {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every configured episode and return the summary
    pub fn run(&self) -> Result<RunSummary> {
        let mut runner = self.config.build_runner()?;

        info!(
            rows = self.config.game.rows,
            columns = self.config.game.columns,
            episodes = self.config.run.episodes,
            discount = self.config.planner.discount,
            threshold = self.config.planner.threshold,
            stopping = ?self.config.planner.stopping,
            "starting headless run"
        );

        let summary = runner.run();

        info!(
            episodes = summary.episodes.len(),
            high_score = summary.high_score,
            mean_score = summary.mean_score,
            "run complete"
        );

        Ok(summary)
    }

    /// Serialize the configuration and summary as pretty JSON
    pub fn report_json(&self, summary: &RunSummary) -> Result<String> {
        let report = RunReport {
            config: &self.config,
            summary,
        };
        serde_json::to_string_pretty(&report).context("Failed to serialize run report")
    }
}
