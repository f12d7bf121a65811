//! Go board primitive: stone placement, captures, suicide and ko detection,
//! prisoner counts, scoring, and coordinate text conversion.
//!
//! The board is a 1D array with one ring of padding, so every playable
//! vertex has four addressable orthogonal neighbors. Stones carry explicit
//! colors; whose turn it is lives in the [`GameState`](crate::state::GameState)
//! layer, which also owns the ko/pass/to-move contributions to the position
//! hash. This module maintains only the stone-occupancy part of the hash.

use std::fmt;

use crate::constants::{MAX_BOARD, NO_VERTEX, PASS_MOVE, RESIGN_MOVE};
use crate::zobrist;

/// A point on the board, represented as an index into the padded 1D array.
pub type Vertex = usize;

/// Empty point.
pub const EMPTY: u8 = 0;
/// Black stone.
pub const BLACK: u8 = 1;
/// White stone.
pub const WHITE: u8 = 2;
/// Out of bounds (padding).
pub const INVALID: u8 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Index into per-color tables (black = 0, white = 1).
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// Color argument as the wire protocol spells it.
    pub fn gtp(self) -> &'static str {
        match self {
            Color::Black => "b",
            Color::White => "w",
        }
    }

    fn cell(self) -> u8 {
        match self {
            Color::Black => BLACK,
            Color::White => WHITE,
        }
    }
}

/// A Go board with explicit stone colors.
pub struct Board {
    size: usize,
    width: usize,
    cells: Vec<u8>,
    /// Stones captured by each color (black = 0, white = 1).
    prisoners: [usize; 2],
    /// Position hash; this module XORs stone keys, the state layer XORs
    /// the ko / to-move / pass contributions through [`Board::xor_hash`].
    hash: u64,
    /// Snapshot taken when the game enters the post-game dame-filling
    /// phase under area rules.
    post_game: Option<Vec<u8>>,
}

impl Board {
    /// Create an empty board. `size` must be between 2 and [`MAX_BOARD`].
    pub fn new(size: usize) -> Board {
        assert!((2..=MAX_BOARD).contains(&size), "unsupported board size {size}");
        let width = size + 2;
        let mut board = Board {
            size,
            width,
            cells: vec![INVALID; width * width],
            prisoners: [0; 2],
            hash: 0,
            post_game: None,
        };
        board.reset(size);
        board
    }

    /// Reset to an empty position of the given size, clearing prisoners,
    /// the stone hash, and any post-game marker.
    pub fn reset(&mut self, size: usize) {
        assert!((2..=MAX_BOARD).contains(&size), "unsupported board size {size}");
        self.size = size;
        self.width = size + 2;
        self.cells = vec![INVALID; self.width * self.width];
        for y in 0..size {
            for x in 0..size {
                let v = (y + 1) * self.width + (x + 1);
                self.cells[v] = EMPTY;
            }
        }
        self.prisoners = [0; 2];
        self.hash = 0;
        self.post_game = None;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of playable cells.
    pub fn num_cells(&self) -> usize {
        self.size * self.size
    }

    /// Vertex for zero-based board coordinates.
    pub fn vertex(&self, x: usize, y: usize) -> Vertex {
        (y + 1) * self.width + (x + 1)
    }

    /// Cell contents at a vertex: [`EMPTY`], [`BLACK`], [`WHITE`] or [`INVALID`].
    pub fn get_vertex(&self, vertex: Vertex) -> u8 {
        self.cells[vertex]
    }

    pub fn prisoners(&self, color: Color) -> usize {
        self.prisoners[color.index()]
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// XOR an externally owned contribution (ko, to-move, passes) into the
    /// position hash.
    pub(crate) fn xor_hash(&mut self, key: u64) {
        self.hash ^= key;
    }

    /// Recompute the stone-occupancy part of the hash from the board contents.
    pub fn stone_hash_from_scratch(&self) -> u64 {
        let keys = &*zobrist::KEYS;
        let mut hash = 0;
        for (v, &cell) in self.cells.iter().enumerate() {
            match cell {
                BLACK => hash ^= keys.stones[0][v],
                WHITE => hash ^= keys.stones[1][v],
                _ => {}
            }
        }
        hash
    }

    fn neighbors(&self, vertex: Vertex) -> [Vertex; 4] {
        [
            vertex - self.width,
            vertex - 1,
            vertex + 1,
            vertex + self.width,
        ]
    }

    /// Whether every orthogonal neighbor is a stone of `color` or padding.
    /// Used for the ko test: a single-stone capture inside such a shape
    /// creates a ko.
    fn surrounded_by(&self, vertex: Vertex, color: Color) -> bool {
        self.neighbors(vertex)
            .into_iter()
            .all(|n| self.cells[n] == color.cell() || self.cells[n] == INVALID)
    }

    /// Collect all stones in the group containing `start`.
    fn collect_group(&self, start: Vertex, out: &mut Vec<Vertex>) {
        let color = self.cells[start];
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        while let Some(v) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            if self.cells[v] == color {
                out.push(v);
                for n in self.neighbors(v) {
                    if !visited[n] && self.cells[n] == color {
                        stack.push(n);
                    }
                }
            }
        }
    }

    /// Count the liberties of the group containing `start`.
    fn group_liberties(&self, start: Vertex) -> usize {
        let color = self.cells[start];
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut liberty_seen = vec![false; self.cells.len()];
        let mut libs = 0;
        while let Some(v) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            for n in self.neighbors(v) {
                match self.cells[n] {
                    EMPTY => {
                        if !liberty_seen[n] {
                            liberty_seen[n] = true;
                            libs += 1;
                        }
                    }
                    c if c == color && !visited[n] => stack.push(n),
                    _ => {}
                }
            }
        }
        libs
    }

    /// Whether playing `color` at `vertex` would be suicide: the move
    /// captures nothing and the resulting own group has no liberties.
    pub fn is_suicide(&self, color: Color, vertex: Vertex) -> bool {
        let opponent = color.opponent().cell();
        let own = color.cell();
        for n in self.neighbors(vertex) {
            match self.cells[n] {
                EMPTY => return false,
                c if c == opponent => {
                    // Capturing an opponent group in atari gives a liberty.
                    if self.group_liberties(n) == 1 {
                        return false;
                    }
                }
                c if c == own => {
                    if self.group_liberties(n) > 1 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }

    /// Place a stone and resolve captures. The caller is responsible for
    /// legality (empty vertex, not suicide, not the ko point).
    ///
    /// Returns the new ko vertex, or [`NO_VERTEX`] when the move created no
    /// ko. A ko arises when exactly one stone was captured and the move was
    /// played into an opponent eye-shape.
    pub fn update_board(&mut self, color: Color, vertex: Vertex) -> Vertex {
        debug_assert_eq!(self.cells[vertex], EMPTY, "update_board on occupied vertex");
        let keys = &*zobrist::KEYS;
        let in_opponent_eye = self.surrounded_by(vertex, color.opponent());

        self.cells[vertex] = color.cell();
        self.hash ^= keys.stones[color.index()][vertex];

        let opponent = color.opponent();
        let mut captured = 0;
        let mut capture_vertex = NO_VERTEX;
        let mut to_remove: Vec<Vertex> = Vec::new();
        for n in self.neighbors(vertex) {
            if self.cells[n] == opponent.cell()
                && self.group_liberties(n) == 0
                && !to_remove.contains(&n)
            {
                capture_vertex = n;
                self.collect_group(n, &mut to_remove);
            }
        }
        for &r in &to_remove {
            self.cells[r] = EMPTY;
            self.hash ^= keys.stones[opponent.index()][r];
            captured += 1;
        }
        self.prisoners[color.index()] += captured;

        debug_assert!(
            captured > 0 || self.group_liberties(vertex) > 0,
            "update_board played a suicide move"
        );

        if captured == 1 && in_opponent_eye {
            capture_vertex
        } else {
            NO_VERTEX
        }
    }

    /// Mark the position as entering the post-game dame-filling phase,
    /// snapshotting the current stones.
    pub fn mark_post_game(&mut self) {
        self.post_game = Some(self.cells.clone());
    }

    pub fn in_post_game(&self) -> bool {
        self.post_game.is_some()
    }

    /// Flood all empty regions, attributing each region surrounded by a
    /// single color to that color. Returns (black regions, white regions)
    /// in total cells.
    fn count_empty_regions(&self) -> (usize, usize) {
        let mut visited = vec![false; self.cells.len()];
        let mut black = 0;
        let mut white = 0;
        for start in 0..self.cells.len() {
            if self.cells[start] != EMPTY || visited[start] {
                continue;
            }
            let mut stack = vec![start];
            let mut region = 0;
            let mut touches_black = false;
            let mut touches_white = false;
            while let Some(v) = stack.pop() {
                if visited[v] {
                    continue;
                }
                visited[v] = true;
                region += 1;
                for n in self.neighbors(v) {
                    match self.cells[n] {
                        EMPTY => {
                            if !visited[n] {
                                stack.push(n);
                            }
                        }
                        BLACK => touches_black = true,
                        WHITE => touches_white = true,
                        _ => {}
                    }
                }
            }
            match (touches_black, touches_white) {
                (true, false) => black += region,
                (false, true) => white += region,
                _ => {}
            }
        }
        (black, white)
    }

    /// Area score: living stones plus exclusively surrounded empty regions,
    /// black minus white minus `bonus`. Positive favors black.
    pub fn area_score(&self, bonus: f32) -> f32 {
        let (black_territory, white_territory) = self.count_empty_regions();
        let mut black = black_territory;
        let mut white = white_territory;
        for &cell in &self.cells {
            match cell {
                BLACK => black += 1,
                WHITE => white += 1,
                _ => {}
            }
        }
        black as f32 - white as f32 - bonus
    }

    /// Territory score: exclusively surrounded empty regions only, black
    /// minus white minus `bonus`. Prisoner value is folded into `bonus` by
    /// the caller since prisoners carry dynamic value under these rules.
    pub fn territory_score(&self, bonus: f32) -> f32 {
        let (black, white) = self.count_empty_regions();
        black as f32 - white as f32 - bonus
    }

    /// Format a move as coordinate text ("D4", "pass", "resign").
    /// Columns use letters A..T skipping I; rows count from the bottom.
    pub fn move_to_text(&self, vertex: Vertex) -> String {
        if vertex == PASS_MOVE {
            return "pass".into();
        }
        if vertex == RESIGN_MOVE {
            return "resign".into();
        }
        let x = vertex % self.width - 1;
        let y = vertex / self.width - 1;
        let mut column = b'A' + x as u8;
        if column >= b'I' {
            column += 1;
        }
        format!("{}{}", column as char, y + 1)
    }

    /// Parse coordinate text into a move. Returns `None` for text that is
    /// not "pass", "resign", or an on-board coordinate.
    pub fn text_to_move(&self, text: &str) -> Option<Vertex> {
        if text.eq_ignore_ascii_case("pass") {
            return Some(PASS_MOVE);
        }
        if text.eq_ignore_ascii_case("resign") {
            return Some(RESIGN_MOVE);
        }
        let bytes = text.as_bytes();
        if bytes.len() < 2 {
            return None;
        }
        let column = bytes[0].to_ascii_uppercase();
        if !column.is_ascii_uppercase() || column == b'I' {
            return None;
        }
        let mut x = (column - b'A') as usize;
        if column > b'I' {
            x -= 1;
        }
        let row: usize = text[1..].parse().ok()?;
        if row == 0 || row > self.size || x >= self.size {
            return None;
        }
        Some(self.vertex(x, row - 1))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.size).rev() {
            for x in 0..self.size {
                let ch = match self.cells[self.vertex(x, y)] {
                    BLACK => 'X',
                    WHITE => 'O',
                    _ => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
