use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use dp_snake::episode::{RunConfig, RunSummary};
use dp_snake::game::GameConfig;
use dp_snake::modes::{HeadlessMode, SimulationConfig, WatchMode};
use dp_snake::planner::{PlannerConfig, StoppingRule};
use tracing_subscriber::EnvFilter;

/// Pause between ticks in watch mode when `--delay-ms` is not given
const WATCH_TICK_DELAY_MS: u64 = 50;

#[derive(Parser)]
#[command(name = "dp_snake")]
#[command(version, about = "Snake steered by a value-iteration planner")]
struct Cli {
    /// Execution mode
    #[arg(long, value_enum, default_value = "headless")]
    mode: Mode,

    /// Grid rows, border included
    #[arg(long, default_value = "21")]
    rows: usize,

    /// Grid columns, border included
    #[arg(long, default_value = "21")]
    columns: usize,

    /// Number of episodes to play
    #[arg(long, default_value = "100")]
    episodes: usize,

    /// Delay between ticks in milliseconds (watch mode defaults to 50)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Seed for apple placement
    #[arg(long)]
    seed: Option<u64>,

    /// End an episode after this many ticks
    #[arg(long)]
    max_ticks: Option<u32>,

    /// Convergence test used by value iteration
    #[arg(long, value_enum, default_value = "max-delta")]
    stopping: StoppingRule,

    /// Upper bound on sweeps per solve
    #[arg(long, default_value = "10000")]
    max_sweeps: usize,

    /// Log a statistics summary every N episodes
    #[arg(long, default_value = "10")]
    log_frequency: usize,

    /// Print the run report as JSON on stdout (headless only)
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Play episodes without a display, logging progress
    Headless,
    /// Follow the snake in a terminal UI
    Watch,
}

impl Cli {
    fn simulation_config(&self) -> SimulationConfig {
        let delay_ms = self.delay_ms.unwrap_or(match self.mode {
            Mode::Headless => 0,
            Mode::Watch => WATCH_TICK_DELAY_MS,
        });

        SimulationConfig {
            game: GameConfig::new(self.rows, self.columns),
            planner: PlannerConfig {
                stopping: self.stopping,
                max_sweeps: self.max_sweeps,
                ..Default::default()
            },
            run: RunConfig {
                episodes: self.episodes,
                tick_delay: Duration::from_millis(delay_ms),
                max_ticks_per_episode: self.max_ticks,
                log_frequency: self.log_frequency,
                seed: self.seed,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.simulation_config();

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Headless => {
            // The TUI owns stderr in watch mode, so only headless logs
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .with_writer(std::io::stderr)
                .init();

            let json = cli.json;
            let output = tokio::task::spawn_blocking(move || -> Result<String> {
                let headless = HeadlessMode::new(config);
                let summary = headless.run()?;
                if json {
                    headless.report_json(&summary)
                } else {
                    Ok(summary_line(&summary))
                }
            })
            .await??;
            println!("{}", output);
        }
        Mode::Watch => {
            let mut watch_mode = WatchMode::new(config);
            let summary = watch_mode.run().await?;
            println!("{}", summary_line(&summary));
        }
    }

    Ok(())
}

fn summary_line(summary: &RunSummary) -> String {
    format!(
        "Played {} episodes | Best: {} | Mean score: {:.2}{}",
        summary.episodes.len(),
        summary.high_score,
        summary.mean_score,
        if summary.interrupted { " (interrupted)" } else { "" }
    )
}
