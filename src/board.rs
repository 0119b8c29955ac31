use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::constants::{
    get_hazard_counts, EASY_SNAKE_REMOVAL_RATIO, FINAL_CELL, LADDER_BOTTOM_MAX,
    LADDER_BOTTOM_MIN, LADDER_RISE_MAX, LADDER_RISE_MIN, LADDER_TOP_MAX, MIN_HAZARD_SPAN,
    PLACEMENT_ATTEMPTS, SNAKE_HEAD_MAX, SNAKE_HEAD_MIN, START_CELL,
};
use crate::maps::{preset, FixedMap, DEFAULT_MAP, HARD_EXTRA_SNAKES};
use crate::rng::Rng;
use crate::types::{Difficulty, Hazard, HazardKind, MapDesign};

/// Snake and ladder layout for one match.
///
/// Every cell plays at most one role (snake head, snake tail, ladder bottom,
/// ladder top) and the start and final cells are never endpoints. The insert
/// methods refuse anything that would break that.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    snakes: BTreeMap<u8, u8>,
    ladders: BTreeMap<u8, u8>,
    #[serde(skip)]
    used: BTreeSet<u8>,
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a board from `(head, tail)` and `(bottom, top)` pairs, snakes
    /// first. Pairs that conflict with earlier ones are dropped.
    pub fn from_pairs(snakes: &[(u8, u8)], ladders: &[(u8, u8)]) -> Self {
        let mut board = Self::empty();
        for &(head, tail) in snakes {
            board.try_add_snake(head, tail);
        }
        for &(bottom, top) in ladders {
            board.try_add_ladder(bottom, top);
        }
        board
    }

    pub fn from_fixed(map: &FixedMap) -> Self {
        Self::from_pairs(map.snakes, map.ladders)
    }

    pub fn is_free(&self, cell: u8) -> bool {
        cell > START_CELL && cell < FINAL_CELL && !self.used.contains(&cell)
    }

    pub fn try_add_snake(&mut self, head: u8, tail: u8) -> bool {
        if head <= tail || !self.is_free(head) || !self.is_free(tail) {
            return false;
        }
        self.snakes.insert(head, tail);
        self.used.insert(head);
        self.used.insert(tail);
        true
    }

    pub fn try_add_ladder(&mut self, bottom: u8, top: u8) -> bool {
        if top <= bottom || !self.is_free(bottom) || !self.is_free(top) {
            return false;
        }
        self.ladders.insert(bottom, top);
        self.used.insert(bottom);
        self.used.insert(top);
        true
    }

    pub fn remove_snake(&mut self, head: u8) -> Option<u8> {
        let tail = self.snakes.remove(&head)?;
        self.used.remove(&head);
        self.used.remove(&tail);
        Some(tail)
    }

    pub fn snake_at(&self, cell: u8) -> Option<u8> {
        self.snakes.get(&cell).copied()
    }

    pub fn ladder_at(&self, cell: u8) -> Option<u8> {
        self.ladders.get(&cell).copied()
    }

    /// The transition triggered by landing on `cell`, if any.
    pub fn hazard_at(&self, cell: u8) -> Option<Hazard> {
        if let Some(tail) = self.snake_at(cell) {
            return Some(Hazard {
                kind: HazardKind::Snake,
                from: cell,
                to: tail,
            });
        }
        self.ladder_at(cell).map(|top| Hazard {
            kind: HazardKind::Ladder,
            from: cell,
            to: top,
        })
    }

    pub fn is_endpoint(&self, cell: u8) -> bool {
        self.used.contains(&cell)
    }

    pub fn snakes(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.snakes.iter().map(|(head, tail)| (*head, *tail))
    }

    pub fn ladders(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.ladders.iter().map(|(bottom, top)| (*bottom, *top))
    }

    pub fn snake_count(&self) -> usize {
        self.snakes.len()
    }

    pub fn ladder_count(&self) -> usize {
        self.ladders.len()
    }
}

pub fn generate_board(difficulty: Difficulty, design: MapDesign, seed: u32) -> Board {
    match design {
        MapDesign::Random => generate_random_board(difficulty, &mut Rng::new(seed)),
        MapDesign::Default => Board::from_fixed(&DEFAULT_MAP),
        MapDesign::Preset(id) => generate_preset_board(id, difficulty),
    }
}

fn generate_random_board(difficulty: Difficulty, rng: &mut Rng) -> Board {
    let (snake_count, ladder_count) = get_hazard_counts(difficulty);
    let mut board = Board::empty();
    place_random_hazards(&mut board, snake_count, ladder_count, rng);
    board
}

/// Adds up to `snake_count` snakes and `ladder_count` ladders onto the free
/// cells of `board`. A hazard that finds no spot within `PLACEMENT_ATTEMPTS`
/// draws is skipped, so a crowded board comes back with fewer. Returns how
/// many of each were placed.
fn place_random_hazards(
    board: &mut Board,
    snake_count: usize,
    ladder_count: usize,
    rng: &mut Rng,
) -> (usize, usize) {
    let span = MIN_HAZARD_SPAN as i32;
    let mut placed_snakes = 0;
    let mut placed_ladders = 0;

    for _ in 0..snake_count {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let head = rng.int(SNAKE_HEAD_MIN, SNAKE_HEAD_MAX);
            let tail = rng.int(START_CELL as i32, head - span);
            if head - tail >= span && board.try_add_snake(head as u8, tail as u8) {
                placed_snakes += 1;
                break;
            }
        }
    }

    for _ in 0..ladder_count {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let bottom = rng.int(LADDER_BOTTOM_MIN, LADDER_BOTTOM_MAX);
            let top = (bottom + rng.int(LADDER_RISE_MIN, LADDER_RISE_MAX)).min(LADDER_TOP_MAX as i32);
            if top - bottom >= span && board.try_add_ladder(bottom as u8, top as u8) {
                placed_ladders += 1;
                break;
            }
        }
    }

    (placed_snakes, placed_ladders)
}

fn generate_preset_board(id: u8, difficulty: Difficulty) -> Board {
    let mut board = Board::from_fixed(preset(id));
    match difficulty {
        Difficulty::Easy => {
            let to_remove =
                (board.snake_count() as f32 * EASY_SNAKE_REMOVAL_RATIO).floor() as usize;
            let heads: Vec<u8> = board.snakes().map(|(head, _)| head).take(to_remove).collect();
            for head in heads {
                board.remove_snake(head);
            }
        }
        Difficulty::Medium => {}
        Difficulty::Hard => {
            for (head, tail) in HARD_EXTRA_SNAKES {
                board.try_add_snake(head, tail);
            }
        }
    }
    board
}
