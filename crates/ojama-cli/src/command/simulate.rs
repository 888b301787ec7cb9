use std::{path::PathBuf, time::Duration};

use ojama_engine::{GameOver, GameSession, SessionConfig, SessionSeed, SessionSnapshot};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Session seed as 32 hex digits (random when omitted)
    #[clap(long)]
    pub(crate) seed: Option<SessionSeed>,
    /// Maximum number of ticks to run
    #[clap(long, default_value_t = 1000)]
    pub(crate) ticks: u64,
    /// Simulated time per tick, in milliseconds
    #[clap(long, default_value_t = 16)]
    tick_ms: u64,
    /// Hard-drop every piece instead of letting it fall
    #[clap(long)]
    hard_drop: bool,
    /// Output file path (defaults to stdout)
    #[clap(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SimulationReport<'a> {
    ticks_run: u64,
    game_over: Option<GameOver>,
    session: SessionSnapshot<'a>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let seed = util::seed_or_random(arg.seed);
    let mut session = GameSession::spawn(SessionConfig::default(), seed);
    let (ticks_run, game_over) = simulate(
        &mut session,
        arg.ticks,
        Duration::from_millis(arg.tick_ms),
        arg.hard_drop,
    );
    let report = SimulationReport {
        ticks_run,
        game_over,
        session: session.snapshot(),
    };
    Output::save_json(&report, arg.output.clone())
}

/// Ticks the session until it tops out or `max_ticks` have run.
fn simulate(
    session: &mut GameSession,
    max_ticks: u64,
    step: Duration,
    hard_drop: bool,
) -> (u64, Option<GameOver>) {
    for tick in 1..=max_ticks {
        if hard_drop {
            session.request_hard_drop();
        }
        if let Some(result) = session.tick(step) {
            return (tick, Some(result));
        }
    }
    (max_ticks, None)
}
