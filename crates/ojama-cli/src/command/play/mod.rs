use std::time::Duration;

use ojama_engine::{
    DEFAULT_DROP_INTERVAL, DEFAULT_SOFT_DROP_INTERVAL, GameSession, SessionConfig, SessionSeed,
};
use anyhow::Context as _;
use ratatui_runtime::Runtime;

use crate::util;

use self::app::PlayApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Session seed as 32 hex digits (random when omitted)
    #[clap(long)]
    seed: Option<SessionSeed>,
    /// Gravity interval in milliseconds
    #[clap(long, default_value_t = millis(DEFAULT_DROP_INTERVAL))]
    drop_interval_ms: u64,
    /// Gravity interval while holding the down key, in milliseconds
    #[clap(long, default_value_t = millis(DEFAULT_SOFT_DROP_INTERVAL))]
    soft_drop_interval_ms: u64,
    /// Start a new game immediately after a game over
    #[clap(long)]
    auto_restart: bool,
    /// Game ticks per second
    #[clap(long, default_value_t = 60.0)]
    tick_rate: f64,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            seed: None,
            drop_interval_ms: millis(DEFAULT_DROP_INTERVAL),
            soft_drop_interval_ms: millis(DEFAULT_SOFT_DROP_INTERVAL),
            auto_restart: false,
            tick_rate: 60.0,
        }
    }
}

impl PlayArg {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            drop_interval: Duration::from_millis(self.drop_interval_ms),
            soft_drop_interval: Duration::from_millis(self.soft_drop_interval_ms),
            auto_restart: self.auto_restart,
        }
    }

    fn tick_interval(&self) -> anyhow::Result<Duration> {
        ratatui_runtime::interval_from_rate(self.tick_rate).context("Invalid --tick-rate")
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let tick_interval = arg.tick_interval()?;
    let seed = util::seed_or_random(arg.seed);
    let session = GameSession::new(arg.session_config(), seed);
    let mut app = PlayApp::new(session, tick_interval);
    Runtime::new().run(&mut app)?;

    if let Some(result) = app.last_result() {
        println!(
            "Game over: score {}, lines {} (seed {seed})",
            result.score, result.lines
        );
    }
    Ok(())
}
