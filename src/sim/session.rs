//! Session orchestration
//!
//! `Session` owns the whole game state for one player: catalog, config,
//! progress, the assembled stage, timer, scanner, and puzzle engine. The
//! host drives it with `click_at` and `tick`, and drains domain events;
//! nothing in here calls back into presentation.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::consts::CLICK_RADIUS;
use crate::save::ProgressSave;
use crate::sim::assemble::AssembledStage;
use crate::sim::click::{ClickOutcome, click_screw, process_click};
use crate::sim::entities::ClickTarget;
use crate::sim::puzzle::{PuzzleEngine, PuzzlePhase, PuzzleSignal};
use crate::sim::scanner::{HintSuppression, ScanSignal, Scanner};
use crate::sim::timer::{GameTimer, TimerSignal};

/// Outbound domain events, drained by the host each frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    LevelLoaded {
        display_index: usize,
        real_index: usize,
    },
    LevelLeft,
    /// Last plank destroyed; the endgame puzzle is starting
    StageCleared,
    /// Puzzle solved with more stages remaining in the level
    StageCompleted {
        next_stage: usize,
    },
    LevelCompleted {
        reward: u32,
    },
    LevelFailed,
    ScrewRelocated {
        screw: usize,
        destroyed_planks: Vec<usize>,
    },
    PuzzleStarted(String),
    PuzzleSolved,
    PuzzleFailedAttempt,
    /// Feedback or reminder shake on the listed screws
    ScrewsShaken(Vec<usize>),
    HintBlink(Vec<usize>),
    HintCleared,
    NoMovesAvailable,
    MovesAvailable,
    TimerExpired,
    TimerSeconds(u32),
}

/// One player's live game
pub struct Session {
    catalog: Catalog,
    config: GameConfig,
    pub save: ProgressSave,
    rng: Pcg32,

    pub stage: AssembledStage,
    stage_index: usize,
    display_index: usize,
    real_index: usize,
    level_loaded: bool,

    timer: GameTimer,
    timer_enabled: bool,
    scanner: Scanner,
    puzzle: PuzzleEngine,

    paused: bool,
    input_enabled: bool,
    stage_finished: bool,
    /// Host-controlled: an unfinished tutorial suppresses hints
    pub tutorial_active: bool,

    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(catalog: Catalog, config: GameConfig, save: ProgressSave, seed: u64) -> Self {
        Self {
            catalog,
            config,
            save,
            rng: Pcg32::seed_from_u64(seed),
            stage: AssembledStage::unloaded(),
            stage_index: 0,
            display_index: 0,
            real_index: 0,
            level_loaded: false,
            timer: GameTimer::new(),
            timer_enabled: false,
            scanner: Scanner::new(),
            puzzle: PuzzleEngine::new(),
            paused: false,
            input_enabled: true,
            stage_finished: false,
            tutorial_active: false,
            events: Vec::new(),
        }
    }

    pub fn display_index(&self) -> usize {
        self.display_index
    }

    pub fn is_level_loaded(&self) -> bool {
        self.level_loaded
    }

    pub fn puzzle(&self) -> &PuzzleEngine {
        &self.puzzle
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Load a level by display index, resolving random replay past the end
    /// of the catalog. Returns false if the catalog cannot supply a level.
    pub fn load_level(&mut self, display_index: usize) -> bool {
        if self.level_loaded {
            self.unload_level();
        }

        let Some(real_index) = self.catalog.resolve_level_index(
            display_index,
            self.save.last_played_level_index,
            &mut self.rng,
        ) else {
            log::warn!("No level available for display index {display_index}");
            return false;
        };
        if self
            .catalog
            .get(real_index)
            .is_none_or(|level| level.stages.is_empty())
        {
            log::warn!("Level {real_index} has no stages");
            return false;
        }

        self.display_index = display_index;
        self.real_index = real_index;
        self.save.display_level_index = display_index;
        self.save.real_level_index = real_index;
        self.save.is_playing_random_level = display_index >= self.catalog.len();

        self.level_loaded = true;
        self.load_stage(0);

        self.events.push(GameEvent::LevelLoaded {
            display_index,
            real_index,
        });
        log::info!("Level {display_index} loaded (catalog index {real_index})");
        true
    }

    /// Tear down the current level; safe to call when nothing is loaded
    pub fn unload_level(&mut self) {
        if !self.level_loaded {
            return;
        }
        let mut signals = Vec::new();
        self.scanner.cancel(&mut signals);
        self.forward_scan_signals(signals);

        self.stage.unload();
        self.puzzle.reset();
        self.timer.reset();
        self.timer_enabled = false;
        self.level_loaded = false;
        self.stage_finished = false;
        self.input_enabled = true;
        self.events.push(GameEvent::LevelLeft);
    }

    /// Restart the current stage from its authored data
    pub fn reload_stage(&mut self) {
        if !self.level_loaded {
            return;
        }
        let mut signals = Vec::new();
        self.scanner.cancel(&mut signals);
        self.forward_scan_signals(signals);
        self.stage.unload();
        self.puzzle.reset();
        self.load_stage(self.stage_index);
    }

    fn load_stage(&mut self, stage_index: usize) {
        let level = &self.catalog.levels[self.real_index];
        let stage_data = &level.stages[stage_index];

        self.stage = AssembledStage::load(stage_data, &self.config);
        self.stage_index = stage_index;
        self.stage_finished = false;
        self.input_enabled = true;
        self.scanner = Scanner::new();
        self.puzzle.reset();

        // Early levels play untimed
        self.timer_enabled = self.display_index >= self.config.timer_free_levels;
        if self.timer_enabled {
            let duration = stage_data
                .timer_override
                .unwrap_or(self.config.timer_duration);
            self.timer.set_max_time(duration);
            self.timer.start();
        } else {
            self.timer = GameTimer::new();
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
        if self.timer_enabled {
            self.timer.pause();
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
        if self.timer_enabled {
            self.timer.resume();
        }
    }

    /// Resolve a tap at a world point
    pub fn click_at(&mut self, point: Vec2) {
        if !self.level_loaded || self.paused || !self.input_enabled {
            return;
        }

        let targets = self.stage.overlap_circle(point, CLICK_RADIUS);
        let screw = targets.iter().find_map(|t| match t {
            ClickTarget::Screw(i) => Some(*i),
            _ => None,
        });

        let outcome = match screw {
            Some(si) => click_screw(&mut self.stage, si),
            None => process_click(&mut self.stage, &targets),
        };
        self.apply_outcome(outcome);
    }

    /// Resolve a pre-classified click set (hosts with their own picking)
    pub fn handle_click(&mut self, targets: &[ClickTarget]) {
        if !self.level_loaded || self.paused || !self.input_enabled {
            return;
        }
        let outcome = process_click(&mut self.stage, targets);
        self.apply_outcome(outcome);
    }

    fn apply_outcome(&mut self, outcome: ClickOutcome) {
        match outcome {
            ClickOutcome::Ignored => {}
            ClickOutcome::Selected(_) => {
                self.scanner.notify_interaction();
            }
            ClickOutcome::Reseated(_) => {
                self.scanner.notify_interaction();
                self.run_puzzle_validation();
            }
            ClickOutcome::Relocated { screw, destroyed } => {
                self.scanner.notify_interaction();
                self.events.push(GameEvent::ScrewRelocated {
                    screw,
                    destroyed_planks: destroyed,
                });

                if self.stage.all_planks_cleared()
                    && self.puzzle.phase() == PuzzlePhase::Inactive
                    && !self.stage_finished
                {
                    self.events.push(GameEvent::StageCleared);
                    if self.timer_enabled {
                        self.timer.pause();
                    }
                    self.puzzle.begin(&mut self.stage);
                }

                self.run_puzzle_validation();
            }
        }
    }

    fn run_puzzle_validation(&mut self) {
        let mut signals = Vec::new();
        let solved = self.puzzle.validate(&self.stage, &mut signals);
        self.forward_puzzle_signals(signals);
        if solved {
            self.on_stage_won();
        }
    }

    fn on_stage_won(&mut self) {
        self.stage_finished = true;
        let mut signals = Vec::new();
        self.scanner.cancel(&mut signals);
        self.forward_scan_signals(signals);

        let level = &self.catalog.levels[self.real_index];
        let next_stage = self.stage_index + 1;
        if next_stage < level.stages.len() {
            self.events.push(GameEvent::StageCompleted { next_stage });
            self.stage.unload();
            self.load_stage(next_stage);
            return;
        }

        // Whole level done
        let replayed = self.save.is_playing_random_level
            || self.display_index < self.save.max_reached_level_index;
        let reward = if replayed {
            self.config.replay_reward
        } else {
            level.reward_override.unwrap_or(self.config.level_reward)
        };

        if self.save.is_playing_random_level {
            self.save.last_played_level_index = Some(self.real_index);
            self.save.is_playing_random_level = false;
        }
        self.save.display_level_index = self.display_index + 1;
        self.save.max_reached_level_index = self
            .save
            .max_reached_level_index
            .max(self.display_index + 1);

        self.events.push(GameEvent::LevelCompleted { reward });
        log::info!("Level {} completed, reward {}", self.display_index, reward);
    }

    /// Advance the session by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if !self.level_loaded || self.paused {
            return;
        }

        if self.timer_enabled {
            match self.timer.update(dt) {
                Some(TimerSignal::Finished) => {
                    self.input_enabled = false;
                    self.stage_finished = true;
                    let mut signals = Vec::new();
                    self.scanner.cancel(&mut signals);
                    self.forward_scan_signals(signals);
                    self.events.push(GameEvent::TimerExpired);
                    self.events.push(GameEvent::LevelFailed);
                    log::info!("Timer expired on level {}", self.display_index);
                }
                Some(TimerSignal::SecondsChanged(s)) => {
                    self.events.push(GameEvent::TimerSeconds(s));
                }
                None => {}
            }
        }

        // Scanning stops outright once the stage is won or failed
        if !self.stage_finished {
            let suppression = HintSuppression {
                tutorial_active: self.tutorial_active,
                puzzle_active: self.puzzle.phase() != PuzzlePhase::Inactive,
                stage_finished: false,
                input_disabled: !self.input_enabled,
                first_level_timer_paused: self.display_index == 0
                    && self.timer_enabled
                    && !self.timer.is_active(),
            };
            let mut scan_signals = Vec::new();
            self.scanner
                .tick(&self.stage, dt, self.paused, suppression, &mut scan_signals);
            self.forward_scan_signals(scan_signals);
        }

        let shake_suppressed =
            self.tutorial_active || !self.input_enabled || self.stage_finished;
        let mut puzzle_signals = Vec::new();
        self.puzzle.tick(
            &self.stage,
            dt,
            shake_suppressed,
            &mut self.rng,
            &mut puzzle_signals,
        );
        self.forward_puzzle_signals(puzzle_signals);
    }

    fn forward_scan_signals(&mut self, signals: Vec<ScanSignal>) {
        for signal in signals {
            self.events.push(match signal {
                ScanSignal::NoMovesAvailable => GameEvent::NoMovesAvailable,
                ScanSignal::MovesAvailable => GameEvent::MovesAvailable,
                ScanSignal::HintBlink(holes) => GameEvent::HintBlink(holes),
                ScanSignal::HintCleared => GameEvent::HintCleared,
            });
        }
    }

    fn forward_puzzle_signals(&mut self, signals: Vec<PuzzleSignal>) {
        for signal in signals {
            match signal {
                PuzzleSignal::Started(text) => {
                    self.events.push(GameEvent::PuzzleStarted(text));
                }
                PuzzleSignal::Solved => self.events.push(GameEvent::PuzzleSolved),
                PuzzleSignal::FailedAttempt { shaken } => {
                    self.events.push(GameEvent::PuzzleFailedAttempt);
                    self.events.push(GameEvent::ScrewsShaken(shaken));
                }
                PuzzleSignal::IdleShake { screws } => {
                    self.events.push(GameEvent::ScrewsShaken(screws));
                }
            }
        }
    }
}
