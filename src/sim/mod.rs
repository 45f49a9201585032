//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Driven by explicit `dt` only, no wall clocks
//! - Seeded RNG only
//! - Stable iteration order (by entity index)
//! - No rendering or platform dependencies

pub mod assemble;
pub mod click;
pub mod entities;
pub mod puzzle;
pub mod scanner;
pub mod session;
pub mod shape;
pub mod timer;

pub use assemble::{AssembledStage, LayerGraph, LayerRelation};
pub use click::{ClickOutcome, click_screw, process_click};
pub use entities::{ClickTarget, Hole, HoleRef, Plank, PlankHole, PlankState, Screw};
pub use puzzle::{PuzzleEngine, PuzzlePhase, PuzzleSignal, Question, Validation, check_game_over};
pub use scanner::{HintSuppression, ScanSignal, Scanner, playable_holes};
pub use session::{GameEvent, Session};
pub use shape::{Shape, Transform2, footprint};
pub use timer::{GameTimer, TimerSignal};
