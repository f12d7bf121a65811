//! Authoritative Go game state, independent of any engine process.
//!
//! [`GameState`] layers match-level bookkeeping on top of the board
//! primitive: ko enforcement, rule-dependent pass counting, score dispatch,
//! and an incrementally maintained position hash over (stones, ko point,
//! side to move, pass count). Any code path that must validate or replay
//! moves locally, rather than trusting a remote engine's replies, goes
//! through this type.

use crate::board::{Board, Color, EMPTY, Vertex};
use crate::constants::{MAX_PASSES, NO_VERTEX, PASS_MOVE, RESIGN_MOVE};
use crate::zobrist;

/// Scoring convention in force for a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ruleset {
    /// Stones plus territory; double-pass may enter a dame-filling phase
    /// before truly ending.
    Area,
    /// Territory plus prisoner value; prisoners have ongoing dynamic value.
    Territory,
}

/// Default point value of one prisoner under territory rules.
pub const DEFAULT_PRISONER_VALUE: f32 = 1.0;

pub struct GameState {
    board: Board,
    ruleset: Ruleset,
    komi: f32,
    handicap: usize,
    passes: u32,
    ko_vertex: Vertex,
    move_num: usize,
    last_move: Vertex,
    to_move: Color,
    prisoner_value: f32,
    /// Sticky marker: a low-probability move was forced at this point, so
    /// training data recorded before it should be discarded. Cleared on the
    /// next move.
    blunder: bool,
}

impl GameState {
    pub fn new(size: usize, komi: f32, ruleset: Ruleset) -> GameState {
        let mut state = GameState {
            board: Board::new(size),
            ruleset,
            komi,
            handicap: 0,
            passes: 0,
            ko_vertex: NO_VERTEX,
            move_num: 0,
            last_move: NO_VERTEX,
            to_move: Color::Black,
            prisoner_value: DEFAULT_PRISONER_VALUE,
            blunder: false,
        };
        state.init_game(size, komi);
        state
    }

    /// Reset to an empty position of the given size and clear all match
    /// counters.
    pub fn init_game(&mut self, size: usize, komi: f32) {
        self.board.reset(size);
        self.komi = komi;
        self.handicap = 0;
        self.passes = 0;
        self.ko_vertex = NO_VERTEX;
        self.move_num = 0;
        self.last_move = NO_VERTEX;
        self.to_move = Color::Black;
        self.blunder = false;
        self.seed_hash();
    }

    /// Restart the game, keeping the board geometry and komi.
    pub fn reset_game(&mut self) {
        let size = self.board.size();
        let komi = self.komi;
        self.init_game(size, komi);
    }

    /// Clear the board and rule counters, keeping the geometry, komi, and
    /// handicap.
    pub fn reset_board(&mut self) {
        self.board.reset(self.board.size());
        self.passes = 0;
        self.ko_vertex = NO_VERTEX;
        self.move_num = 0;
        self.last_move = NO_VERTEX;
        self.to_move = Color::Black;
        self.blunder = false;
        self.seed_hash();
    }

    /// XOR the initial ko / pass / to-move contributions into a freshly
    /// reset board hash.
    fn seed_hash(&mut self) {
        let keys = &*zobrist::KEYS;
        self.board.xor_hash(keys.ko[self.ko_vertex]);
        self.board.xor_hash(keys.passes[self.passes as usize]);
        if self.to_move == Color::Black {
            self.board.xor_hash(keys.black_to_move);
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Whether `color` may play at `vertex`. The pass and resign sentinels
    /// are always legal; a board move must target an empty vertex that is
    /// not the ko point and is not suicide.
    pub fn is_move_legal(&self, color: Color, vertex: Vertex) -> bool {
        vertex == PASS_MOVE
            || vertex == RESIGN_MOVE
            || (vertex != self.ko_vertex
                && self.board.get_vertex(vertex) == EMPTY
                && !self.board.is_suicide(color, vertex))
    }

    /// Play a move for the side currently to move.
    pub fn play_to_move(&mut self, vertex: Vertex) {
        self.play_move(self.to_move, vertex);
    }

    /// Play a move, maintaining the position hash incrementally. Each
    /// contributing field (ko, side to move, pass count) is XORed out
    /// before its mutation and back in after it, so the hash after this
    /// call equals one recomputed from the new state tuple.
    pub fn play_move(&mut self, color: Color, vertex: Vertex) {
        debug_assert_ne!(vertex, RESIGN_MOVE, "resignation is not a board move");
        let keys = &*zobrist::KEYS;

        self.board.xor_hash(keys.ko[self.ko_vertex]);
        if vertex == PASS_MOVE {
            self.ko_vertex = NO_VERTEX;
        } else {
            self.ko_vertex = self.board.update_board(color, vertex);
        }
        self.board.xor_hash(keys.ko[self.ko_vertex]);

        self.last_move = vertex;
        self.move_num += 1;
        self.blunder = false;

        // Toggles correctly regardless of who actually moved: the parity
        // bit only changes when the mover was the side to move.
        if self.to_move == color {
            self.board.xor_hash(keys.black_to_move);
        }
        self.to_move = color.opponent();

        self.board.xor_hash(keys.passes[self.passes as usize]);
        if vertex == PASS_MOVE {
            self.increment_passes();
        } else {
            self.passes = 0;
        }
        self.board.xor_hash(keys.passes[self.passes as usize]);
    }

    /// Bump the pass counter. Under area rules the second consecutive pass
    /// flips the board into the post-game dame-filling phase (once) and
    /// resets the counter, so the game continues instead of ending. The
    /// counter is capped at [`MAX_PASSES`] regardless of ruleset.
    pub fn increment_passes(&mut self) {
        self.passes += 1;
        if self.passes == 2 && self.ruleset == Ruleset::Area && !self.board.in_post_game() {
            self.board.mark_post_game();
            self.passes = 0;
        }
        if self.passes > MAX_PASSES as u32 {
            self.passes = MAX_PASSES as u32;
        }
    }

    /// Final score under the game's ruleset; positive favors black.
    pub fn final_score(&self) -> f32 {
        match self.ruleset {
            Ruleset::Area => self.board.area_score(self.komi + self.handicap as f32),
            Ruleset::Territory => self.board.territory_score(self.bonus()),
        }
    }

    /// White's compensation. Under territory rules komi is effectively
    /// dynamic, since prisoners have point value.
    pub fn bonus(&self) -> f32 {
        let prisoner_diff =
            self.board.prisoners(Color::White) as f32 - self.board.prisoners(Color::Black) as f32;
        self.komi + self.handicap as f32 + self.prisoner_value * prisoner_diff
    }

    /// Position hash recomputed from scratch from the current
    /// (stones, ko, to-move, passes) tuple. Always equals [`Self::hash`].
    pub fn compute_hash(&self) -> u64 {
        let keys = &*zobrist::KEYS;
        let mut hash = self.board.stone_hash_from_scratch();
        hash ^= keys.ko[self.ko_vertex];
        hash ^= keys.passes[self.passes as usize];
        if self.to_move == Color::Black {
            hash ^= keys.black_to_move;
        }
        hash
    }

    /// Incrementally maintained position hash.
    pub fn hash(&self) -> u64 {
        self.board.hash()
    }

    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn set_komi(&mut self, komi: f32) {
        self.komi = komi;
    }

    pub fn handicap(&self) -> usize {
        self.handicap
    }

    pub fn set_handicap(&mut self, handicap: usize) {
        self.handicap = handicap;
    }

    pub fn prisoner_value(&self) -> f32 {
        self.prisoner_value
    }

    pub fn set_prisoner_value(&mut self, value: f32) {
        self.prisoner_value = value;
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn set_passes(&mut self, passes: u32) {
        self.passes = passes;
    }

    pub fn ko_vertex(&self) -> Vertex {
        self.ko_vertex
    }

    pub fn move_number(&self) -> usize {
        self.move_num
    }

    pub fn last_move(&self) -> Vertex {
        self.last_move
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn set_to_move(&mut self, color: Color) {
        self.to_move = color;
    }

    pub fn is_blunder(&self) -> bool {
        self.blunder
    }

    pub fn set_blunder(&mut self, blunder: bool) {
        self.blunder = blunder;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_text(state: &mut GameState, coord: &str) {
        let v = state.board().text_to_move(coord).expect("bad coord");
        state.play_to_move(v);
    }

    #[test]
    fn test_init_game() {
        let state = GameState::new(19, 7.5, Ruleset::Area);
        assert_eq!(state.move_number(), 0);
        assert_eq!(state.passes(), 0);
        assert_eq!(state.ko_vertex(), NO_VERTEX);
        assert_eq!(state.to_move(), Color::Black);
        assert_eq!(state.komi(), 7.5);
        assert_eq!(state.hash(), state.compute_hash());
    }

    #[test]
    fn test_pass_legal_everywhere() {
        let mut state = GameState::new(9, 7.5, Ruleset::Area);
        assert!(state.is_move_legal(Color::Black, PASS_MOVE));
        assert!(state.is_move_legal(Color::Black, RESIGN_MOVE));
        play_text(&mut state, "D4");
        let d4 = state.board().text_to_move("D4").unwrap();
        assert!(!state.is_move_legal(Color::White, d4));
    }

    #[test]
    fn test_ko_point_is_illegal_for_one_move() {
        let mut state = GameState::new(9, 7.5, Ruleset::Area);
        // Build the classic ko shape, then have white take the ko.
        for (color, coord) in [
            (Color::Black, "D5"),
            (Color::Black, "C4"),
            (Color::Black, "D3"),
            (Color::Black, "E4"),
            (Color::White, "E5"),
            (Color::White, "F4"),
            (Color::White, "E3"),
        ] {
            state.play_move(color, state.board().text_to_move(coord).unwrap());
        }
        let d4 = state.board().text_to_move("D4").unwrap();
        let e4 = state.board().text_to_move("E4").unwrap();
        state.play_move(Color::White, d4);
        assert_eq!(state.ko_vertex(), e4);
        assert!(!state.is_move_legal(Color::Black, e4));
        // Playing elsewhere lifts the ko.
        state.play_move(Color::Black, state.board().text_to_move("G7").unwrap());
        assert_eq!(state.ko_vertex(), NO_VERTEX);
    }

    #[test]
    fn test_pass_counting_territory() {
        let mut state = GameState::new(9, 6.5, Ruleset::Territory);
        play_text(&mut state, "pass");
        assert_eq!(state.passes(), 1);
        play_text(&mut state, "pass");
        // No dame-filling transition under territory rules.
        assert_eq!(state.passes(), 2);
        assert!(!state.board().in_post_game());
    }

    #[test]
    fn test_pass_counting_area_enters_post_game() {
        let mut state = GameState::new(9, 7.5, Ruleset::Area);
        play_text(&mut state, "pass");
        play_text(&mut state, "pass");
        // The second pass flips into the dame-filling phase and resets the
        // counter instead of ending the game.
        assert_eq!(state.passes(), 0);
        assert!(state.board().in_post_game());
        // The transition happens only once.
        play_text(&mut state, "pass");
        play_text(&mut state, "pass");
        assert_eq!(state.passes(), 2);
    }

    #[test]
    fn test_pass_counter_capped() {
        let mut state = GameState::new(9, 6.5, Ruleset::Territory);
        for _ in 0..7 {
            play_text(&mut state, "pass");
        }
        assert_eq!(state.passes(), MAX_PASSES as u32);
    }

    #[test]
    fn test_non_pass_resets_counter() {
        let mut state = GameState::new(9, 6.5, Ruleset::Territory);
        play_text(&mut state, "pass");
        assert_eq!(state.passes(), 1);
        play_text(&mut state, "C3");
        assert_eq!(state.passes(), 0);
    }

    #[test]
    fn test_hash_matches_recomputation_after_sequence() {
        let mut state = GameState::new(9, 7.5, Ruleset::Area);
        for coord in ["D4", "C3", "pass", "D3", "E3", "pass", "C4"] {
            play_text(&mut state, coord);
            assert_eq!(state.hash(), state.compute_hash(), "after {coord}");
        }
    }

    #[test]
    fn test_hash_includes_capture_resolution() {
        let mut state = GameState::new(9, 7.5, Ruleset::Area);
        for (color, coord) in [
            (Color::White, "D4"),
            (Color::Black, "D3"),
            (Color::Black, "D5"),
            (Color::Black, "C4"),
            (Color::Black, "E4"),
        ] {
            state.play_move(color, state.board().text_to_move(coord).unwrap());
        }
        assert_eq!(state.hash(), state.compute_hash());
    }

    #[test]
    fn test_hash_depends_on_to_move() {
        let mut a = GameState::new(9, 7.5, Ruleset::Area);
        let mut b = GameState::new(9, 7.5, Ruleset::Area);
        let d4 = a.board().text_to_move("D4").unwrap();
        a.play_move(Color::Black, d4);
        b.play_move(Color::White, d4);
        // Same stone, different mover: side-to-move parity differs. The
        // stone keys differ too, so just check both match recomputation.
        assert_eq!(a.hash(), a.compute_hash());
        assert_eq!(b.hash(), b.compute_hash());
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_blunder_flag_clears_on_next_move() {
        let mut state = GameState::new(9, 7.5, Ruleset::Area);
        state.set_blunder(true);
        assert!(state.is_blunder());
        play_text(&mut state, "D4");
        assert!(!state.is_blunder());
    }

    #[test]
    fn test_final_score_dispatch() {
        let mut area = GameState::new(9, 7.5, Ruleset::Area);
        let e5 = area.board().text_to_move("E5").unwrap();
        area.play_move(Color::Black, e5);
        assert_eq!(area.final_score(), 81.0 - 7.5);

        let mut territory = GameState::new(9, 6.5, Ruleset::Territory);
        territory.play_move(Color::Black, e5);
        assert_eq!(territory.final_score(), 80.0 - 6.5);
    }

    #[test]
    fn test_territory_bonus_includes_prisoners() {
        let mut state = GameState::new(9, 6.5, Ruleset::Territory);
        for (color, coord) in [
            (Color::White, "D4"),
            (Color::Black, "D3"),
            (Color::Black, "D5"),
            (Color::Black, "C4"),
            (Color::Black, "E4"),
        ] {
            state.play_move(color, state.board().text_to_move(coord).unwrap());
        }
        // Black holds one prisoner, lowering white's compensation.
        assert_eq!(state.bonus(), 6.5 - DEFAULT_PRISONER_VALUE);
    }

    #[test]
    fn test_reset_game_keeps_geometry_and_komi() {
        let mut state = GameState::new(9, 5.5, Ruleset::Territory);
        play_text(&mut state, "D4");
        play_text(&mut state, "pass");
        state.reset_game();
        assert_eq!(state.board().size(), 9);
        assert_eq!(state.komi(), 5.5);
        assert_eq!(state.move_number(), 0);
        assert_eq!(state.passes(), 0);
        assert_eq!(state.hash(), state.compute_hash());
    }
}
