//! Move availability scanning
//!
//! A dt-driven loop that periodically checks which holes can accept the
//! next screw, drives idle hint blinking, and latches a stalemate signal
//! when nothing is playable for several scans in a row.

use crate::consts::{ALIGN_EPSILON, HINT_IDLE_MAX, HINT_IDLE_MIN, SCAN_INTERVAL, STALEMATE_SCANS};
use crate::sim::assemble::AssembledStage;
use crate::sim::entities::ClickTarget;

/// Conditions that keep hint blinking quiet even when moves exist
#[derive(Debug, Clone, Copy, Default)]
pub struct HintSuppression {
    pub tutorial_active: bool,
    pub puzzle_active: bool,
    pub stage_finished: bool,
    pub input_disabled: bool,
    /// First level only: timer paused means the intro is still up
    pub first_level_timer_paused: bool,
}

impl HintSuppression {
    fn any(&self) -> bool {
        self.tutorial_active
            || self.puzzle_active
            || self.stage_finished
            || self.input_disabled
            || self.first_level_timer_paused
    }
}

/// Signals raised by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanSignal {
    NoMovesAvailable,
    MovesAvailable,
    /// Playable holes that should blink as a hint
    HintBlink(Vec<usize>),
    HintCleared,
}

/// Periodic playability scanner
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    accumulator: f32,
    /// Seconds since the player last touched anything
    idle_time: f32,
    blocked_scans: u32,
    stalemate: bool,
    hint_active: bool,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the idle clock on any player interaction
    pub fn notify_interaction(&mut self) {
        self.idle_time = 0.0;
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    /// Stop scanning and drop any visible hint state
    pub fn cancel(&mut self, signals: &mut Vec<ScanSignal>) {
        if self.hint_active {
            signals.push(ScanSignal::HintCleared);
        }
        *self = Self::default();
    }

    /// Advance by `dt`, scanning on the fixed cadence
    pub fn tick(
        &mut self,
        stage: &AssembledStage,
        dt: f32,
        paused: bool,
        suppression: HintSuppression,
        signals: &mut Vec<ScanSignal>,
    ) {
        if !stage.loaded || paused {
            return;
        }

        if stage.selected_screw.is_some() {
            self.idle_time = 0.0;
        } else {
            self.idle_time += dt;
        }

        self.accumulator += dt;
        while self.accumulator >= SCAN_INTERVAL {
            self.accumulator -= SCAN_INTERVAL;
            self.scan(stage, suppression, signals);
        }
    }

    fn scan(
        &mut self,
        stage: &AssembledStage,
        suppression: HintSuppression,
        signals: &mut Vec<ScanSignal>,
    ) {
        let playable = playable_holes(stage);

        if playable.is_empty() {
            self.blocked_scans += 1;
            if self.blocked_scans >= STALEMATE_SCANS && !self.stalemate {
                self.stalemate = true;
                signals.push(ScanSignal::NoMovesAvailable);
            }
        } else {
            self.blocked_scans = 0;
            if self.stalemate {
                self.stalemate = false;
                signals.push(ScanSignal::MovesAvailable);
            }
        }

        let in_window = self.idle_time >= HINT_IDLE_MIN && self.idle_time < HINT_IDLE_MAX;
        let should_hint = in_window
            && !suppression.any()
            && stage.selected_screw.is_none()
            && !playable.is_empty();

        if should_hint {
            self.hint_active = true;
            signals.push(ScanSignal::HintBlink(playable));
        } else if self.hint_active {
            self.hint_active = false;
            signals.push(ScanSignal::HintCleared);
        }
    }
}

/// Holes that can accept the next screw relocation.
///
/// A hole is playable iff the overlap probe at its trigger radius finds as
/// many aligned plank holes as plank bodies; a misaligned plank hole in
/// range disqualifies the hole outright.
pub fn playable_holes(stage: &AssembledStage) -> Vec<usize> {
    let mut playable = Vec::new();

    for (i, hole) in stage.holes.iter().enumerate() {
        if hole.locked || hole.occupied || !hole.visible {
            continue;
        }

        let radius = hole.trigger_radius(stage.trigger_factor());
        let mut plank_holes: i32 = 0;
        let mut planks: i32 = 0;
        let mut poisoned = false;

        for target in stage.overlap_circle(hole.position, radius) {
            match target {
                ClickTarget::PlankHole { plank, slot } => {
                    let world = stage.planks[plank].hole_world(slot);
                    if (world - hole.position).length() <= ALIGN_EPSILON {
                        plank_holes += 1;
                    } else {
                        poisoned = true;
                    }
                }
                ClickTarget::Plank(_) => planks += 1,
                _ => {}
            }
        }

        if !poisoned && plank_holes == planks {
            playable.push(i);
        }
    }

    playable
}
