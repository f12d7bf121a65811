//! Self-play session driver: owns one engine process for the lifetime of
//! one game, drives it move by move over GTP, derives the final result,
//! and extracts the session's artifacts.
//!
//! The driver keeps its own lightweight match counters in [`MatchState`]
//! and trusts the engine's replies for game progress; it does not consult
//! the local [`GameState`](crate::state::GameState), which exists for code
//! paths that must enforce rules themselves.

use std::fs;

use tracing::{error, info};

use crate::constants::{NUM_CELLS, PI_OVER_SQRT3};
use crate::error::{DriverError, Result};
use crate::gtp::{EngineCommand, GtpClient, GtpTransport};
use crate::sgf;

/// Attributed game winner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Winner {
    Black,
    White,
    /// Draw-like outcome a `final_score` of `0` designates under this
    /// ruleset.
    Jigo,
    /// Early statistical scoring gives a projection, not a hard color.
    Undetermined,
}

impl Winner {
    /// Token the engine expects in `dump_training`.
    pub fn token(self) -> &'static str {
        match self {
            Winner::Black => "black",
            Winner::White => "white",
            Winner::Jigo => "jigo",
            Winner::Undetermined => "early",
        }
    }
}

/// Structured outcome of one game.
///
/// The confidence values are presentation conventions carried over from the
/// source data pipeline: 1.0 for a decisive final or resignation outcome,
/// 0.5 for the draw-like outcome, and the logistic win probability for
/// early statistical scoring.
#[derive(Clone, Debug)]
pub struct GameOutcome {
    pub winner: Winner,
    /// Human-readable margin, e.g. "B+3.500" or "W+Resign".
    pub margin: String,
    /// Confidence / win probability in [0, 1].
    pub confidence: f32,
}

impl GameOutcome {
    /// The winner is the color that did not resign.
    pub fn from_resignation(black_resigned: bool) -> GameOutcome {
        if black_resigned {
            GameOutcome {
                winner: Winner::White,
                margin: "W+Resign".into(),
                confidence: 1.0,
            }
        } else {
            GameOutcome {
                winner: Winner::Black,
                margin: "B+Resign".into(),
                confidence: 1.0,
            }
        }
    }

    /// Project a winner from a score-estimate mean and standard deviation
    /// via a logistic transform with scale pi/sqrt(3). A mean of exactly
    /// zero yields an unresolved margin of "0".
    pub fn from_estimate(mean: f32, std_dev: f32) -> GameOutcome {
        let win_rate = 1.0 / (1.0 + (-mean * PI_OVER_SQRT3 / std_dev).exp());
        let confidence = if win_rate.is_finite() { win_rate } else { 0.5 };
        let margin = if mean == 0.0 {
            "0".to_string()
        } else {
            format!("{}{:.3}", if mean > 0.0 { "B+" } else { "W+" }, mean.abs())
        };
        GameOutcome {
            winner: Winner::Undetermined,
            margin,
            confidence,
        }
    }

    /// Attribute a winner from the engine's final score text. The first
    /// character decides: 'B', 'W', or '0' for the draw-like outcome.
    pub fn from_final_score(score: &str) -> Result<GameOutcome> {
        match score.chars().next() {
            Some('B') => Ok(GameOutcome {
                winner: Winner::Black,
                margin: score.to_string(),
                confidence: 1.0,
            }),
            Some('W') => Ok(GameOutcome {
                winner: Winner::White,
                margin: score.to_string(),
                confidence: 1.0,
            }),
            Some('0') => Ok(GameOutcome {
                winner: Winner::Jigo,
                margin: score.to_string(),
                confidence: 0.5,
            }),
            _ => Err(DriverError::NoResult),
        }
    }
}

/// The driver's own per-game counters, independent of any process so the
/// end-of-game and bookkeeping rules stay testable in isolation.
#[derive(Clone, Debug)]
pub struct MatchState {
    move_num: usize,
    passes: u32,
    resigned: bool,
    black_resigned: bool,
    black_to_move: bool,
}

impl Default for MatchState {
    fn default() -> Self {
        MatchState::new()
    }
}

impl MatchState {
    pub fn new() -> MatchState {
        MatchState {
            move_num: 0,
            passes: 0,
            resigned: false,
            black_resigned: false,
            black_to_move: true,
        }
    }

    /// Bump the move number before a `genmove` request goes out.
    pub fn begin_move(&mut self) {
        self.move_num += 1;
    }

    /// Update counters from a move token the engine generated for the side
    /// currently to move. Comparison is case-insensitive.
    pub fn record_generated_move(&mut self, token: &str) {
        if token.eq_ignore_ascii_case("pass") {
            self.passes += 1;
        } else if token.eq_ignore_ascii_case("resign") {
            self.resigned = true;
            self.black_resigned = self.black_to_move;
        } else {
            self.passes = 0;
        }
    }

    /// Update counters from a move supplied by another source and flip the
    /// side to move.
    pub fn record_played_move(&mut self, black: bool, token: &str) {
        if token.eq_ignore_ascii_case("pass") {
            self.passes += 1;
        } else if token.eq_ignore_ascii_case("resign") {
            self.resigned = true;
            self.black_resigned = black;
        } else {
            self.passes = 0;
        }
        self.black_to_move = !self.black_to_move;
    }

    /// Game over on resignation, two or more passes, or the hard move
    /// ceiling of twice the board's cell count.
    pub fn game_over(&self, board_cells: usize) -> bool {
        self.resigned || self.passes > 1 || self.move_num > 2 * board_cells
    }

    /// Flip the side to move; returns false instead when the game is over.
    pub fn advance_turn(&mut self, board_cells: usize) -> bool {
        if self.game_over(board_cells) {
            return false;
        }
        self.black_to_move = !self.black_to_move;
        true
    }

    /// Resume bookkeeping at a given move count; the side to move follows
    /// from parity.
    pub fn set_move_count(&mut self, moves: usize) {
        self.move_num = moves;
        self.black_to_move = moves % 2 == 0;
    }

    pub fn move_number(&self) -> usize {
        self.move_num
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn resigned(&self) -> bool {
        self.resigned
    }

    pub fn black_resigned(&self) -> bool {
        self.black_resigned
    }

    pub fn black_to_move(&self) -> bool {
        self.black_to_move
    }
}

/// One run of the engine process driving exactly one game.
pub struct Session {
    client: GtpClient,
    engine_name: String,
    artifact_id: String,
    match_state: MatchState,
    score_early: bool,
    outcome: Option<GameOutcome>,
    last_move_text: String,
}

impl Session {
    /// Launch the engine, negotiate its version, and disable its clock.
    /// The process is stopped again if startup fails partway.
    pub fn start(command: &EngineCommand, min_version: (u32, u32, u32)) -> Result<Session> {
        let transport = GtpTransport::spawn(command)?;
        let mut client = GtpClient::new(transport);
        let version = match client.check_version(min_version) {
            Ok(version) => version,
            Err(err) => {
                client.terminate();
                return Err(err);
            }
        };
        info!("engine has started, version {version}");
        if !client.set_infinite_time() {
            client.terminate();
            return Err(DriverError::ProtocolViolation(
                "time_settings rejected".into(),
            ));
        }
        info!("infinite thinking time set");
        Ok(Session {
            client,
            engine_name: command.display_name(),
            artifact_id: new_artifact_id(),
            match_state: MatchState::new(),
            score_early: false,
            outcome: None,
            last_move_text: String::new(),
        })
    }

    /// Identifier naming every file this session produces.
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn match_state(&self) -> &MatchState {
        &self.match_state
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Last move token the engine generated.
    pub fn last_move_text(&self) -> &str {
        &self.last_move_text
    }

    pub fn game_over(&self) -> bool {
        self.match_state.game_over(NUM_CELLS)
    }

    /// Issue `genmove` for the side to move without blocking for the
    /// reply; the read happens in [`Self::read_move`].
    pub fn request_move(&mut self) -> Result<()> {
        self.match_state.begin_move();
        let color = if self.match_state.black_to_move() { "b" } else { "w" };
        self.client.write_line(&format!("genmove {color}"))
    }

    /// Read and validate the `genmove` reply, updating pass/resignation
    /// counters from the move token. Returns false (and stops the engine)
    /// on a malformed reply.
    pub fn read_move(&mut self) -> Result<bool> {
        let line = self.client.read_raw_line()?;
        let trimmed = line.trim_end();
        if trimmed.len() < 3 || !trimmed.starts_with('=') {
            error!("error in GTP response: {trimmed:?}");
            self.client.terminate();
            return Ok(false);
        }
        let token = trimmed
            .get(2..)
            .unwrap_or("")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        self.client.eat_terminator()?;
        info!(
            "{} ({} {})",
            self.match_state.move_number(),
            if self.match_state.black_to_move() { "B" } else { "W" },
            token
        );
        self.match_state.record_generated_move(&token);
        self.last_move_text = token;
        Ok(true)
    }

    /// Replay a move supplied by another source, e.g. `play b d4`. The
    /// counters are updated from the command text itself, not from a reply
    /// payload, and the side to move flips.
    pub fn play_external_move(&mut self, move_command: &str) -> bool {
        if !self.client.send_command(move_command) {
            return false;
        }
        let parts: Vec<&str> = move_command.split_whitespace().collect();
        let (Some(color), Some(vertex)) = (parts.get(1), parts.get(2)) else {
            error!("malformed move command: {move_command:?}");
            return false;
        };
        self.match_state.begin_move();
        let black = color.eq_ignore_ascii_case("black") || color.eq_ignore_ascii_case("b");
        self.match_state.record_played_move(black, vertex);
        true
    }

    /// Flip the side to move, or report game over.
    pub fn advance_turn(&mut self) -> bool {
        self.match_state.advance_turn(NUM_CELLS)
    }

    /// Resume the session at a move number (after `loadsgf`).
    pub fn set_move_count(&mut self, moves: usize) {
        self.match_state.set_move_count(moves);
    }

    /// Derive the structured result: resignation first, then an early
    /// statistical estimate when requested, otherwise the engine's final
    /// count. Surfaces [`DriverError::NoResult`] when no branch could
    /// attribute a winner.
    pub fn compute_result(&mut self, score_early: bool) -> Result<&GameOutcome> {
        let outcome = if self.match_state.resigned() {
            GameOutcome::from_resignation(self.match_state.black_resigned())
        } else if score_early {
            self.score_early = true;
            let mean = self.client.estimate_score_mean();
            let std_dev = self.client.estimate_score_standard_deviation();
            GameOutcome::from_estimate(mean, std_dev)
        } else {
            let score = self.client.final_score();
            GameOutcome::from_final_score(&score)?
        };
        info!("score: {} : {:.3}", outcome.margin, outcome.confidence);
        info!("winner: {}", outcome.winner.token());
        Ok(&*self.outcome.insert(outcome))
    }

    /// Ask the engine to write the position record for this session.
    pub fn write_sgf(&mut self) -> bool {
        self.client
            .send_command(&format!("printsgf {}.sgf", self.artifact_id))
    }

    /// Dump training data; requires the winner to be known.
    pub fn dump_training(&mut self) -> bool {
        let Some(outcome) = &self.outcome else {
            error!("dump_training requested before a winner was determined");
            return false;
        };
        let token = outcome.winner.token();
        self.client
            .send_command(&format!("dump_training {token} {}.txt", self.artifact_id))
    }

    /// Dump diagnostic data.
    pub fn dump_debug(&mut self) -> bool {
        self.client
            .send_command(&format!("dump_debug {}.debug.txt", self.artifact_id))
    }

    pub fn save_training(&mut self) -> bool {
        info!("saving {}.train", self.artifact_id);
        self.client
            .send_command(&format!("save_training {}.train", self.artifact_id))
    }

    pub fn load_training(&mut self, file_name: &str) -> bool {
        info!("loading {file_name}.train");
        self.client
            .send_command(&format!("load_training {file_name}.train"))
    }

    /// Load a position record, optionally replaying only a prefix of its
    /// moves.
    pub fn load_sgf(&mut self, file_name: &str, moves: Option<usize>) -> bool {
        match moves {
            Some(moves) => {
                info!("loading {file_name}.sgf with {moves} moves");
                self.client
                    .send_command(&format!("loadsgf {file_name}.sgf {moves}"))
            }
            None => {
                info!("loading {file_name}.sgf");
                self.client.send_command(&format!("loadsgf {file_name}.sgf"))
            }
        }
    }

    pub fn set_komi(&mut self, komi: f32) -> bool {
        info!("setting komi {komi}");
        self.client.send_command(&format!("komi {komi}"))
    }

    /// Post-process the position record in place: embed the weight-file
    /// identifier in the player name and correct the declared result for
    /// resignations and early-scored games.
    pub fn fix_sgf(&mut self, weight_file: &str, resignation: bool) -> Result<()> {
        let path = format!("{}.sgf", self.artifact_id);
        let data = fs::read_to_string(&path)?;
        let mut data = sgf::embed_player_name(&data, &self.engine_name, weight_file);
        if resignation {
            data = sgf::rewrite_resignation(&data);
        } else if self.score_early {
            let mean = self.client.estimate_score_mean();
            data = sgf::rewrite_estimated_result(&data, mean);
        }
        fs::write(&path, data)?;
        Ok(())
    }

    /// Send `quit` and block until the process has fully exited.
    pub fn quit(&mut self) -> Result<()> {
        self.client.quit()
    }
}

/// Collision-resistant random identifier, regenerated once per session and
/// stable for its whole lifetime.
fn new_artifact_id() -> String {
    format!("{:016x}{:016x}", fastrand::u64(..), fastrand::u64(..))
}
