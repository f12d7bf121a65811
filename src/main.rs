//! Autogo: unattended self-play games against a GTP engine.
//!
//! Each game owns its own engine process and file set, named by the
//! session's artifact identifier. A missing engine binary or an engine
//! older than the required minimum aborts the whole run; a crashed or
//! misbehaving engine abandons only the current game.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use autogo::constants::MIN_ENGINE_VERSION;
use autogo::error::DriverError;
use autogo::gtp::EngineCommand;
use autogo::session::Session;

/// Self-play game driver for GTP Go engines
#[derive(Parser)]
#[command(name = "autogo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the engine binary
    #[arg(short, long, default_value = "./leelaz")]
    engine: PathBuf,

    /// Network weight file, passed to the engine and embedded in the
    /// rewritten game record
    #[arg(short, long)]
    weights: String,

    /// Extra options passed to the engine before the weight file
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    engine_args: Option<Vec<String>>,

    /// Number of games to play
    #[arg(short, long, default_value_t = 1)]
    games: u32,

    /// Komi to set before play starts (engine default when omitted)
    #[arg(short, long)]
    komi: Option<f32>,

    /// Score unfinished games by statistical estimate instead of a final
    /// count
    #[arg(long)]
    score_early: bool,

    /// Also request a diagnostic dump for each game
    #[arg(long)]
    dump_debug: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    for game in 1..=cli.games {
        info!("starting game {game} of {}", cli.games);
        if let Err(err) = run_one_game(&cli) {
            // Environment errors invalidate every further session.
            if is_fatal(&err) {
                error!("{err:#}");
                return ExitCode::FAILURE;
            }
            error!("game {game} abandoned: {err:#}");
        }
    }
    ExitCode::SUCCESS
}

fn is_fatal(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DriverError>(),
        Some(
            DriverError::EngineNotFound(_)
                | DriverError::VersionTooOld { .. }
                | DriverError::VersionUnparsable(_)
        )
    )
}

fn run_one_game(cli: &Cli) -> anyhow::Result<()> {
    let command = EngineCommand::new(&cli.engine)
        .args(cli.engine_args.iter().flatten().cloned())
        .arg(&cli.weights);
    let mut session = Session::start(&command, MIN_ENGINE_VERSION)?;

    if let Some(komi) = cli.komi {
        if !session.set_komi(komi) {
            anyhow::bail!("engine rejected komi {komi}");
        }
    }

    loop {
        session.request_move()?;
        if !session.read_move()? {
            anyhow::bail!("engine returned a malformed move reply");
        }
        if !session.advance_turn() {
            break;
        }
    }

    // Games stopped by the move ceiling have no final count to ask for.
    let state = session.match_state();
    let hit_ceiling = !state.resigned() && state.passes() <= 1;
    let resigned = state.resigned();
    let outcome = session
        .compute_result(cli.score_early || hit_ceiling)?
        .clone();
    info!("game finished after {} moves: {}", session.match_state().move_number(), outcome.margin);

    if !session.write_sgf() {
        anyhow::bail!("engine failed to write the game record");
    }
    session
        .fix_sgf(&cli.weights, resigned)
        .context("rewriting the game record")?;
    if !session.dump_training() {
        anyhow::bail!("engine failed to dump training data");
    }
    if cli.dump_debug && !session.dump_debug() {
        anyhow::bail!("engine failed to dump debug data");
    }

    session.quit()?;
    Ok(())
}
