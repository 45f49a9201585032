//! Endgame digit puzzle
//!
//! Once the last plank is cleared, surviving screws are arranged into rows,
//! numbered, and the player must relocate them so the designated puzzle
//! holes spell the answer to a generated arithmetic question.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use crate::consts::{
    ARRANGE_SETTLE, ARRANGE_STEP, MAX_PUZZLE_HOLES, MAX_VISIBLE_SCREWS, PUZZLE_ROW_Y,
    PUZZLE_SHAKE_INTERVAL, ROW_GAP, SECOND_ROW_Y, TOP_ROW_Y,
};
use crate::sim::assemble::AssembledStage;
use crate::sim::click::{connect_screw, release_screw};
use crate::sim::entities::HoleRef;

/// A generated arithmetic question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub answer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PuzzlePhase {
    Inactive,
    /// Scripted screw/hole arrangement still playing out
    Arranging { remaining: f32 },
    /// Awaiting digits
    Active,
}

/// Signals raised by the puzzle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleSignal {
    Started(String),
    Solved,
    /// Wrong answer; the listed screws get a feedback shake
    FailedAttempt { shaken: Vec<usize> },
    /// Reminder shake for screws not yet moved into puzzle holes
    IdleShake { screws: Vec<usize> },
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Not every slot is filled yet
    Pending,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone)]
pub struct PuzzleEngine {
    phase: PuzzlePhase,
    question: Option<Question>,
    shake_accumulator: f32,
}

impl Default for PuzzleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleEngine {
    pub fn new() -> Self {
        Self {
            phase: PuzzlePhase::Inactive,
            question: None,
            shake_accumulator: 0.0,
        }
    }

    pub fn phase(&self) -> PuzzlePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == PuzzlePhase::Active
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn reset(&mut self) {
        self.phase = PuzzlePhase::Inactive;
        self.question = None;
        self.shake_accumulator = 0.0;
    }

    /// Start the endgame: arrange surviving screws and begin the countdown
    /// to the question reveal
    pub fn begin(&mut self, stage: &mut AssembledStage) {
        stage.selected_screw = None;
        let pairs = arrange(stage);
        self.phase = PuzzlePhase::Arranging {
            remaining: pairs as f32 * ARRANGE_STEP + ARRANGE_SETTLE,
        };
        self.shake_accumulator = 0.0;
    }

    /// Advance the arrangement countdown and the idle shake cadence
    pub fn tick(
        &mut self,
        stage: &AssembledStage,
        dt: f32,
        suppressed: bool,
        rng: &mut Pcg32,
        signals: &mut Vec<PuzzleSignal>,
    ) {
        match self.phase {
            PuzzlePhase::Inactive => {}
            PuzzlePhase::Arranging { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = PuzzlePhase::Arranging { remaining };
                } else {
                    let screw_count = stage.screws.iter().filter(|s| s.alive && s.visible).count();
                    let question = generate_question(screw_count, rng);
                    signals.push(PuzzleSignal::Started(question.text.clone()));
                    self.question = Some(question);
                    self.phase = PuzzlePhase::Active;
                }
            }
            PuzzlePhase::Active => {
                if suppressed {
                    return;
                }
                self.shake_accumulator += dt;
                if self.shake_accumulator >= PUZZLE_SHAKE_INTERVAL {
                    self.shake_accumulator -= PUZZLE_SHAKE_INTERVAL;
                    if has_empty_puzzle_hole(stage) {
                        let screws = screws_outside_puzzle_holes(stage);
                        if !screws.is_empty() {
                            signals.push(PuzzleSignal::IdleShake { screws });
                        }
                    }
                }
            }
        }
    }

    /// Re-check the board after a relocation while the puzzle is live
    pub fn validate(&mut self, stage: &AssembledStage, signals: &mut Vec<PuzzleSignal>) -> bool {
        if self.phase != PuzzlePhase::Active {
            return false;
        }
        let Some(question) = &self.question else {
            return false;
        };

        match check_game_over(stage, question) {
            Validation::Pending => false,
            Validation::Correct => {
                self.phase = PuzzlePhase::Inactive;
                self.shake_accumulator = 0.0;
                signals.push(PuzzleSignal::Solved);
                true
            }
            Validation::Incorrect => {
                let shaken: Vec<usize> = stage
                    .screws
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.alive && s.visible && s.is_placed)
                    .map(|(i, _)| i)
                    .collect();
                signals.push(PuzzleSignal::FailedAttempt { shaken });
                false
            }
        }
    }
}

/// Slot position within the arranged screw rows
fn row_slot(index: usize, total: usize) -> Vec2 {
    let top_count = total / 2;
    let (row_y, row_index, row_len) = if index < top_count {
        (TOP_ROW_Y, index, top_count)
    } else {
        (SECOND_ROW_Y, index - top_count, total - top_count)
    };
    let x = (row_index as f32 - (row_len as f32 - 1.0) / 2.0) * ROW_GAP;
    Vec2::new(x, row_y)
}

/// Slot position within the puzzle hole row
fn puzzle_slot(index: usize, total: usize) -> Vec2 {
    let x = (index as f32 - (total as f32 - 1.0) / 2.0) * ROW_GAP;
    Vec2::new(x, PUZZLE_ROW_Y)
}

/// Pair surviving screws with their nearest holes, lay both out in fixed
/// rows, and designate the leftover holes as puzzle holes.
///
/// Returns the number of visible pairs.
fn arrange(stage: &mut AssembledStage) -> usize {
    let screw_indices: Vec<usize> = stage
        .screws
        .iter()
        .enumerate()
        .filter(|(_, s)| s.alive)
        .map(|(i, _)| i)
        .collect();

    // Nearest unclaimed hole per screw, in screw order
    let mut claimed = vec![false; stage.holes.len()];
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    let mut unpaired: Vec<usize> = Vec::new();
    for &si in &screw_indices {
        let pos = stage.screws[si].position;
        let nearest = stage
            .holes
            .iter()
            .enumerate()
            .filter(|(hi, h)| !claimed[*hi] && !h.locked && h.visible)
            .min_by(|(_, a), (_, b)| {
                (a.position - pos)
                    .length()
                    .total_cmp(&(b.position - pos).length())
            })
            .map(|(hi, _)| hi);
        match nearest {
            Some(hi) => {
                claimed[hi] = true;
                pairs.push((si, hi));
            }
            None => unpaired.push(si),
        }
    }

    pairs.sort_by(|(_, a), (_, b)| {
        let pa = stage.holes[*a].position;
        let pb = stage.holes[*b].position;
        pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
    });

    // Cap visible complexity; excess pairs are reset and hidden
    let excess: Vec<(usize, usize)> = pairs.split_off(pairs.len().min(MAX_VISIBLE_SCREWS));
    for (si, hi) in excess {
        release_screw(stage, si);
        stage.screws[si].visible = false;
        stage.holes[hi].visible = false;
    }
    for si in unpaired {
        release_screw(stage, si);
        stage.screws[si].visible = false;
    }

    let visible = pairs.len();
    for (i, (si, hi)) in pairs.iter().copied().enumerate() {
        release_screw(stage, si);
        stage.screws[si].number = Some(i as u8);
        stage.holes[hi].position = row_slot(i, visible);
        connect_screw(stage, si, vec![HoleRef::Base(hi)]);
    }

    // Leftover holes become the puzzle's digit slots, capped and indexed
    let empties: Vec<usize> = stage
        .holes
        .iter()
        .enumerate()
        .filter(|(hi, h)| !claimed[*hi] && !h.locked && h.visible)
        .map(|(hi, _)| hi)
        .collect();
    let active_count = empties.len().min(MAX_PUZZLE_HOLES);
    for (i, hi) in empties.into_iter().enumerate() {
        let hole = &mut stage.holes[hi];
        if i < active_count {
            hole.puzzle_index = Some(i);
            hole.placed_digit = None;
            hole.occupied = false;
            hole.position = puzzle_slot(i, active_count);
        } else {
            hole.visible = false;
        }
    }

    visible
}

fn has_empty_puzzle_hole(stage: &AssembledStage) -> bool {
    stage
        .holes
        .iter()
        .any(|h| h.visible && h.is_puzzle_hole() && h.placed_digit.is_none())
}

/// Screws not currently seated in a puzzle hole
fn screws_outside_puzzle_holes(stage: &AssembledStage) -> Vec<usize> {
    stage
        .screws
        .iter()
        .enumerate()
        .filter(|(_, s)| s.alive && s.visible)
        .filter(|(_, s)| {
            !s.bridged.iter().any(|hole| match hole {
                HoleRef::Base(i) => stage.holes[*i].is_puzzle_hole(),
                HoleRef::Plank { .. } => false,
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// Generate the target answer and its question text.
///
/// The answer is always rendered as two digits, every digit bounded by the
/// number of surviving screws.
pub fn generate_question(screw_count: usize, rng: &mut Pcg32) -> Question {
    let max_digit = (screw_count.saturating_sub(1)).min(9) as u32;

    let candidates: Vec<u32> = (10..=99)
        .filter(|n| {
            let tens = n / 10;
            let ones = n % 10;
            tens <= max_digit && ones <= max_digit && tens != ones
        })
        .collect();

    let answer = if candidates.is_empty() {
        fallback_answer(max_digit, rng)
    } else {
        candidates[rng.random_range(0..candidates.len())]
    };

    Question {
        text: generate_equation(answer, rng),
        answer,
    }
}

/// Build a two-digit answer from a shuffled digit pool, avoiding a leading
/// zero. Unlike the candidate pool, this path does not forbid a repeated
/// digit; with a single-digit pool there is nothing else to pick.
fn fallback_answer(max_digit: u32, rng: &mut Pcg32) -> u32 {
    let mut digits: Vec<u32> = (0..=max_digit).collect();
    digits.shuffle(rng);

    let tens = digits.iter().copied().find(|d| *d != 0).unwrap_or(0);
    let ones = digits
        .iter()
        .copied()
        .find(|d| *d != tens)
        .unwrap_or(tens);

    tens * 10 + ones
}

/// Derive an addition or subtraction whose result equals `answer`
pub fn generate_equation(answer: u32, rng: &mut Pcg32) -> String {
    if answer == 0 {
        return match rng.random_range(0..3) {
            0 => {
                let a = rng.random_range(1..10);
                format!("{a} - {a} = ?")
            }
            1 => "0 + 0 = ?".to_string(),
            _ => "1 - 1 = ?".to_string(),
        };
    }

    if rng.random_bool(0.5) {
        let b = rng.random_range(0..answer.min(10));
        let a = answer - b;
        format!("{a} + {b} = ?")
    } else {
        let b = rng.random_range(0..10);
        let a = answer + b;
        format!("{a} - {b} = ?")
    }
}

/// Read the puzzle holes in index order and compare against the answer.
///
/// Stays `Pending` while any slot is empty or any visible screw is not
/// seated; a digit string that fails to parse is logged and treated as
/// `Pending` rather than a failure.
pub fn check_game_over(stage: &AssembledStage, question: &Question) -> Validation {
    if has_empty_puzzle_hole(stage) {
        return Validation::Pending;
    }
    if stage
        .screws
        .iter()
        .any(|s| s.alive && s.visible && !s.is_placed)
    {
        return Validation::Pending;
    }

    let mut slots: Vec<(usize, u8)> = stage
        .holes
        .iter()
        .filter(|h| h.visible && h.is_puzzle_hole())
        .filter_map(|h| h.puzzle_index.zip(h.placed_digit))
        .collect();
    if slots.is_empty() {
        return Validation::Pending;
    }
    slots.sort_by_key(|(index, _)| *index);

    let concatenated: String = slots.iter().map(|(_, d)| d.to_string()).collect();
    let value: u32 = match concatenated.parse() {
        Ok(v) => v,
        Err(err) => {
            log::error!("Puzzle digit string {concatenated:?} failed to parse: {err}");
            return Validation::Pending;
        }
    };

    if value == question.answer {
        Validation::Correct
    } else {
        Validation::Incorrect
    }
}
