//! Integration tests for autogo
//!
//! These drive the game-state model and the driver's pure bookkeeping the
//! way a full session would, without a live engine process. Protocol
//! exchanges against a real engine are exercised by the binary, not here.

use autogo::board::Color;
use autogo::constants::{MAX_PASSES, NO_VERTEX, PASS_MOVE};
use autogo::gtp::{parse_version_triple, version_delta};
use autogo::session::{GameOutcome, MatchState, Winner};
use autogo::sgf;
use autogo::state::{GameState, Ruleset};

// =============================================================================
// Helper functions for setting up positions
// =============================================================================

/// Apply a sequence of coordinate strings to a state, alternating colors
/// starting with Black. "pass" can be used to pass.
fn play_sequence(state: &mut GameState, moves: &[&str]) {
    for mv in moves {
        let vertex = state
            .board()
            .text_to_move(mv)
            .unwrap_or_else(|| panic!("bad coordinate {mv}"));
        assert!(
            state.is_move_legal(state.to_move(), vertex),
            "illegal move {mv} in sequence"
        );
        state.play_to_move(vertex);
    }
}

// =============================================================================
// Pass semantics per ruleset
// =============================================================================

#[test]
fn test_double_pass_ends_territory_game() {
    let mut state = GameState::new(9, 6.5, Ruleset::Territory);
    play_sequence(&mut state, &["D4", "F6", "pass", "pass"]);
    assert_eq!(state.passes(), 2);
    assert!(!state.board().in_post_game());

    // The driver's end condition agrees.
    let mut driver = MatchState::new();
    for mv in ["D4", "F6", "pass", "pass"] {
        driver.begin_move();
        driver.record_generated_move(mv);
        if driver.game_over(81) {
            break;
        }
        driver.advance_turn(81);
    }
    assert!(driver.game_over(81));
}

#[test]
fn test_double_pass_enters_dame_filling_under_area_rules() {
    let mut state = GameState::new(9, 7.5, Ruleset::Area);
    play_sequence(&mut state, &["D4", "F6", "pass", "pass"]);
    // Exactly one counter reset into the post-game marking state.
    assert_eq!(state.passes(), 0);
    assert!(state.board().in_post_game());

    // The game can continue filling dame, then truly ends.
    play_sequence(&mut state, &["C3", "G7", "pass", "pass"]);
    assert_eq!(state.passes(), 2);
    assert!(state.board().in_post_game());
}

#[test]
fn test_pass_counter_hard_cap() {
    let mut state = GameState::new(9, 7.5, Ruleset::Area);
    play_sequence(
        &mut state,
        &["pass", "pass", "pass", "pass", "pass", "pass", "pass", "pass"],
    );
    assert_eq!(state.passes(), MAX_PASSES as u32);
}

// =============================================================================
// Position hash invariant
// =============================================================================

#[test]
fn test_hash_invariant_over_full_sequence() {
    let mut state = GameState::new(9, 7.5, Ruleset::Area);
    let moves = [
        "E5", "D3", "C6", "G4", "pass", "E3", "D4", "pass", "pass", "C3", "D5", "B4",
    ];
    for mv in moves {
        let vertex = state.board().text_to_move(mv).unwrap();
        state.play_to_move(vertex);
        assert_eq!(
            state.hash(),
            state.compute_hash(),
            "incremental hash diverged after {mv}"
        );
    }
}

#[test]
fn test_hash_invariant_through_ko_capture() {
    let mut state = GameState::new(9, 7.5, Ruleset::Area);
    for (color, coord) in [
        (Color::Black, "D5"),
        (Color::Black, "C4"),
        (Color::Black, "D3"),
        (Color::Black, "E4"),
        (Color::White, "E5"),
        (Color::White, "F4"),
        (Color::White, "E3"),
        (Color::White, "D4"),
    ] {
        state.play_move(color, state.board().text_to_move(coord).unwrap());
        assert_eq!(state.hash(), state.compute_hash(), "after {coord}");
    }
    assert_ne!(state.ko_vertex(), NO_VERTEX);
}

#[test]
fn test_hash_is_history_independent() {
    // Two different orders reaching the same (stones, ko, to-move, passes)
    // tuple hash identically, enabling transposition use.
    let mut a = GameState::new(9, 7.5, Ruleset::Area);
    let mut b = GameState::new(9, 7.5, Ruleset::Area);
    play_sequence(&mut a, &["D4", "F6", "C3", "G7"]);
    play_sequence(&mut b, &["C3", "G7", "D4", "F6"]);
    assert_eq!(a.hash(), b.hash());
}

// =============================================================================
// Session bookkeeping: end of game and results
// =============================================================================

#[test]
fn test_move_ceiling_on_19x19() {
    // 19x19 has 361 cells; move 723 exceeds twice that.
    let mut driver = MatchState::new();
    driver.set_move_count(722);
    assert!(!driver.game_over(361));
    driver.begin_move();
    driver.record_generated_move("Q16");
    assert!(driver.game_over(361));
}

#[test]
fn test_resignation_attribution() {
    // Black resigns: white wins with full confidence.
    let mut driver = MatchState::new();
    driver.begin_move();
    driver.record_generated_move("resign");
    assert!(driver.resigned());
    assert!(driver.black_resigned());
    let outcome = GameOutcome::from_resignation(driver.black_resigned());
    assert_eq!(outcome.winner, Winner::White);
    assert_eq!(outcome.confidence, 1.0);

    // Symmetric case.
    let outcome = GameOutcome::from_resignation(false);
    assert_eq!(outcome.winner, Winner::Black);
    assert_eq!(outcome.confidence, 1.0);
}

#[test]
fn test_early_scoring_margins() {
    let outcome = GameOutcome::from_estimate(0.0, 4.0);
    assert_eq!(outcome.winner, Winner::Undetermined);
    assert_eq!(outcome.margin, "0");

    let outcome = GameOutcome::from_estimate(3.5, 4.0);
    assert_eq!(outcome.margin, "B+3.500");
    assert!(outcome.confidence > 0.5 && outcome.confidence < 1.0);
}

#[test]
fn test_final_score_first_character_decides() {
    assert_eq!(
        GameOutcome::from_final_score("B+0.5").unwrap().winner,
        Winner::Black
    );
    assert_eq!(
        GameOutcome::from_final_score("W+31.5").unwrap().winner,
        Winner::White
    );
    assert_eq!(
        GameOutcome::from_final_score("0").unwrap().winner,
        Winner::Jigo
    );
    assert!(GameOutcome::from_final_score("draw").is_err());
}

// =============================================================================
// Version negotiation policy
// =============================================================================

#[test]
fn test_version_0_16_rejected_against_0_17_0() {
    let seen = parse_version_triple("0.16").unwrap();
    assert!(version_delta(seen, (0, 17, 0)) < 0);
}

#[test]
fn test_version_0_17_1_accepted_against_0_17_0() {
    let seen = parse_version_triple("0.17.1").unwrap();
    assert!(version_delta(seen, (0, 17, 0)) >= 0);
}

// =============================================================================
// Position-record post-processing
// =============================================================================

#[test]
fn test_resignation_record_rewrite() {
    let record = "(;GM[1]SZ[19]PB[Leela Zero 0.17 1a2b3c4d]PW[Human]\
RE[B+8.5];B[pd];W[dp];W[tt])";
    let fixed = sgf::embed_player_name(record, "leelaz", "58b4af32e9");
    let fixed = sgf::rewrite_resignation(&fixed);
    assert!(fixed.contains("RE[B+Resign] "));
    assert!(fixed.contains("PW[Leela Zero 0.17 58b4af32]"));
    assert!(!fixed.contains(";W[tt])"));
}

#[test]
fn test_early_scored_record_rewrite() {
    let record = "(;GM[1]SZ[19]PW[Human]RE[W+12.5];B[pd];W[dp])";
    let fixed = sgf::rewrite_estimated_result(record, -2.5);
    assert!(fixed.contains("RE[W+2.500] "));
    let fixed = sgf::rewrite_estimated_result(record, 0.0);
    assert!(fixed.contains("RE[0] "));
}

// =============================================================================
// Local rule enforcement (the model an engine reply cannot be trusted for)
// =============================================================================

#[test]
fn test_local_model_rejects_ko_recapture() {
    let mut state = GameState::new(9, 7.5, Ruleset::Area);
    for (color, coord) in [
        (Color::Black, "D5"),
        (Color::Black, "C4"),
        (Color::Black, "D3"),
        (Color::Black, "E4"),
        (Color::White, "E5"),
        (Color::White, "F4"),
        (Color::White, "E3"),
        (Color::White, "D4"),
    ] {
        state.play_move(color, state.board().text_to_move(coord).unwrap());
    }
    let e4 = state.board().text_to_move("E4").unwrap();
    assert!(!state.is_move_legal(Color::Black, e4));
    assert!(state.is_move_legal(Color::Black, PASS_MOVE));
}

#[test]
fn test_scoring_dispatch_matches_ruleset() {
    let mut area = GameState::new(9, 7.5, Ruleset::Area);
    let mut territory = GameState::new(9, 7.5, Ruleset::Territory);
    play_sequence(&mut area, &["E5"]);
    play_sequence(&mut territory, &["E5"]);
    // Area counts the stone; territory does not.
    assert_eq!(area.final_score() - territory.final_score(), 1.0);
}
