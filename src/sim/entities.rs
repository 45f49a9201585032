//! Runtime stage entities
//!
//! Everything here is plain data owned by the assembled stage. Entities are
//! addressed by index; indices are stable for the stage's lifetime.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::{PlankKind, UnlockKind};
use crate::consts::HOLE_RADIUS;
use crate::sim::shape::{Shape, Transform2};

/// Reference to a hole anywhere on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoleRef {
    Base(usize),
    Plank { plank: usize, slot: usize },
}

/// One clickable entity under a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    BaseHole(usize),
    PlankHole { plank: usize, slot: usize },
    Plank(usize),
    Screw(usize),
}

/// A fixed socket on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hole {
    pub position: Vec2,
    pub locked: bool,
    /// Lock metadata carried for the host; the core only filters on `locked`
    pub unlock: UnlockKind,
    /// A screw is currently seated here
    pub occupied: bool,
    pub visible: bool,
    /// Digit slot index while the endgame puzzle is live
    pub puzzle_index: Option<usize>,
    /// Digit of the screw currently seated, while a puzzle hole
    pub placed_digit: Option<u8>,
}

impl Hole {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            locked: false,
            unlock: UnlockKind::None,
            occupied: false,
            visible: true,
            puzzle_index: None,
            placed_digit: None,
        }
    }

    /// Radius used by playability scans
    pub fn trigger_radius(&self, factor: f32) -> f32 {
        HOLE_RADIUS * factor
    }

    pub fn is_puzzle_hole(&self) -> bool {
        self.puzzle_index.is_some()
    }
}

/// A screw attachment point on a plank
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlankHole {
    /// Position in plank-local space
    pub local: Vec2,
    /// A screw currently passes through this slot
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlankState {
    Alive,
    Destroyed,
}

/// A layered obstacle pinned by screws
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plank {
    pub kind: PlankKind,
    pub layer: i32,
    pub transform: Transform2,
    pub shape: Shape,
    pub holes: Vec<PlankHole>,
    pub state: PlankState,
    pub collider_enabled: bool,
}

impl Plank {
    pub fn is_alive(&self) -> bool {
        self.state == PlankState::Alive
    }

    /// World position of one attachment slot
    pub fn hole_world(&self, slot: usize) -> Vec2 {
        self.transform.apply(self.holes[slot].local)
    }

    pub fn active_hole_count(&self) -> usize {
        self.holes.iter().filter(|h| h.active).count()
    }

    /// Signed distance from a world point to the plank silhouette
    pub fn distance(&self, world: Vec2) -> f32 {
        self.transform.shape_distance(&self.shape, world)
    }
}

/// A movable token bridging aligned holes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screw {
    pub position: Vec2,
    /// Digit assigned during the endgame puzzle
    pub number: Option<u8>,
    /// Resting in a single bare hole with no plank above
    pub is_placed: bool,
    pub alive: bool,
    pub visible: bool,
    pub collider_enabled: bool,
    /// Holes currently bridged, in connect order
    pub bridged: Vec<HoleRef>,
}

impl Screw {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            number: None,
            is_placed: false,
            alive: true,
            visible: true,
            collider_enabled: false,
            bridged: Vec::new(),
        }
    }
}
