//! Stage assembly
//!
//! Turns authored stage data into live holes, planks, and screws. Assembly
//! order matters: holes, planks (sorted by layer), layer relations, hole
//! resets, locked-hole rules, screws, and only then colliders.

use glam::Vec2;

use crate::catalog::Stage;
use crate::config::GameConfig;
use crate::consts::{ALIGN_EPSILON, HOLE_RADIUS, SCREW_RADIUS};
use crate::sim::entities::{ClickTarget, Hole, HoleRef, Plank, PlankHole, PlankState, Screw};
use crate::sim::shape::{Transform2, footprint};

/// Pairwise plank relationship, fixed for the stage's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRelation {
    Collide,
    Ignore,
}

/// Symmetric plank-to-plank relation matrix, computed once at assembly
#[derive(Debug, Clone)]
pub struct LayerGraph {
    n: usize,
    relations: Vec<LayerRelation>,
}

impl LayerGraph {
    pub fn new(planks: &[Plank]) -> Self {
        let n = planks.len();
        let mut relations = vec![LayerRelation::Ignore; n * n];
        for i in 0..n {
            for j in 0..n {
                if planks[i].layer == planks[j].layer {
                    relations[i * n + j] = LayerRelation::Collide;
                }
            }
        }
        Self { n, relations }
    }

    pub fn relation(&self, a: usize, b: usize) -> LayerRelation {
        self.relations[a * self.n + b]
    }
}

/// A fully instantiated stage
#[derive(Debug, Clone)]
pub struct AssembledStage {
    pub holes: Vec<Hole>,
    pub planks: Vec<Plank>,
    pub screws: Vec<Screw>,
    pub layer_graph: LayerGraph,
    pub loaded: bool,
    pub selected_screw: Option<usize>,
    /// Planks destroyed so far this stage
    pub destroyed_planks: usize,
    trigger_factor: f32,
}

impl AssembledStage {
    /// Assemble a stage from authored data
    pub fn load(stage: &Stage, config: &GameConfig) -> Self {
        let mut holes: Vec<Hole> = stage
            .holes
            .iter()
            .map(|spec| Hole::new(spec.position))
            .collect();

        let mut specs = stage.planks.clone();
        specs.sort_by_key(|spec| spec.layer);

        let mut planks: Vec<Plank> = specs
            .iter()
            .map(|spec| Plank {
                kind: spec.kind,
                layer: spec.layer,
                transform: Transform2::new(spec.position, spec.rotation, spec.scale),
                shape: footprint(spec.kind),
                holes: spec
                    .screw_holes
                    .iter()
                    .map(|local| PlankHole {
                        local: *local,
                        active: false,
                    })
                    .collect(),
                state: PlankState::Alive,
                collider_enabled: false,
            })
            .collect();

        let layer_graph = LayerGraph::new(&planks);

        for hole in &mut holes {
            hole.occupied = false;
        }

        // Locked holes apply before any screw can land in them
        for lock in &stage.locked_holes {
            if !lock.enabled {
                continue;
            }
            if lock.hole_index < 0 || lock.hole_index as usize >= holes.len() {
                log::warn!(
                    "Locked hole index {} is out of range ({} holes), skipping",
                    lock.hole_index,
                    holes.len()
                );
                continue;
            }
            let hole = &mut holes[lock.hole_index as usize];
            hole.locked = true;
            hole.visible = false;
            hole.unlock = lock.unlock;
        }

        let mut screws = Vec::new();
        for spec in &stage.holes {
            if !spec.has_screw {
                continue;
            }
            let mut screw = Screw::new(spec.position);
            bridge_at_spawn(&mut screw, &mut holes, &mut planks);
            screws.push(screw);
        }

        for plank in &mut planks {
            plank.collider_enabled = true;
        }
        for screw in &mut screws {
            screw.collider_enabled = true;
        }

        Self {
            holes,
            planks,
            screws,
            layer_graph,
            loaded: true,
            selected_screw: None,
            destroyed_planks: 0,
            trigger_factor: config.hole_trigger_factor,
        }
    }

    /// An empty, unloaded stage
    pub fn unloaded() -> Self {
        Self {
            holes: Vec::new(),
            planks: Vec::new(),
            screws: Vec::new(),
            layer_graph: LayerGraph::new(&[]),
            loaded: false,
            selected_screw: None,
            destroyed_planks: 0,
            trigger_factor: 1.0,
        }
    }

    /// Discard all runtime entities. Idempotent.
    pub fn unload(&mut self) {
        self.holes.clear();
        self.planks.clear();
        self.screws.clear();
        self.layer_graph = LayerGraph::new(&[]);
        self.selected_screw = None;
        self.destroyed_planks = 0;
        self.loaded = false;
    }

    pub fn all_planks_cleared(&self) -> bool {
        !self.planks.is_empty() && self.destroyed_planks >= self.planks.len()
    }

    pub fn trigger_factor(&self) -> f32 {
        self.trigger_factor
    }

    /// World position of any hole reference
    pub fn hole_position(&self, hole: HoleRef) -> Vec2 {
        match hole {
            HoleRef::Base(i) => self.holes[i].position,
            HoleRef::Plank { plank, slot } => self.planks[plank].hole_world(slot),
        }
    }

    /// All clickable entities within `radius` of `center`.
    ///
    /// Screws first, then base holes, plank holes, and plank bodies, so a
    /// caller routing a tap can take the topmost screw without sorting.
    pub fn overlap_circle(&self, center: Vec2, radius: f32) -> Vec<ClickTarget> {
        let mut found = Vec::new();

        for (i, screw) in self.screws.iter().enumerate() {
            if screw.alive
                && screw.visible
                && screw.collider_enabled
                && (screw.position - center).length() <= radius + SCREW_RADIUS
            {
                found.push(ClickTarget::Screw(i));
            }
        }

        for (i, hole) in self.holes.iter().enumerate() {
            if hole.visible && (hole.position - center).length() <= radius + HOLE_RADIUS {
                found.push(ClickTarget::BaseHole(i));
            }
        }

        for (pi, plank) in self.planks.iter().enumerate() {
            if !plank.is_alive() || !plank.collider_enabled {
                continue;
            }
            for slot in 0..plank.holes.len() {
                if (plank.hole_world(slot) - center).length() <= radius + HOLE_RADIUS {
                    found.push(ClickTarget::PlankHole { plank: pi, slot });
                }
            }
            if plank.distance(center) <= radius {
                found.push(ClickTarget::Plank(pi));
            }
        }

        found
    }
}

/// Connect a freshly spawned screw to every hole aligned with it
fn bridge_at_spawn(screw: &mut Screw, holes: &mut [Hole], planks: &mut [Plank]) {
    for (i, hole) in holes.iter_mut().enumerate() {
        if hole.locked {
            continue;
        }
        if (hole.position - screw.position).length() <= ALIGN_EPSILON {
            hole.occupied = true;
            screw.bridged.push(HoleRef::Base(i));
            break;
        }
    }

    for (pi, plank) in planks.iter_mut().enumerate() {
        for slot in 0..plank.holes.len() {
            let world = plank.hole_world(slot);
            if (world - screw.position).length() <= ALIGN_EPSILON {
                plank.holes[slot].active = true;
                screw.bridged.push(HoleRef::Plank { plank: pi, slot });
                break;
            }
        }
    }

    screw.is_placed = screw.bridged.len() == 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HoleSpec, LockedHoleConfig, PlankKind, PlankSpec, UnlockKind};
    use proptest::prelude::*;

    fn hole(x: f32, y: f32, has_screw: bool) -> HoleSpec {
        HoleSpec {
            position: Vec2::new(x, y),
            has_screw,
        }
    }

    fn plank(layer: i32, x: f32, screw_holes: Vec<Vec2>) -> PlankSpec {
        PlankSpec {
            kind: PlankKind::Size2,
            layer,
            position: Vec2::new(x, 0.0),
            rotation: 0.0,
            scale: Vec2::ONE,
            screw_holes,
        }
    }

    fn stage(holes: Vec<HoleSpec>, planks: Vec<PlankSpec>) -> Stage {
        Stage {
            holes,
            planks,
            locked_holes: vec![],
            timer_override: None,
        }
    }

    #[test]
    fn test_planks_sorted_by_layer() {
        let s = stage(
            vec![],
            vec![plank(2, 0.0, vec![]), plank(0, 1.0, vec![]), plank(1, 2.0, vec![])],
        );
        let assembled = AssembledStage::load(&s, &GameConfig::default());
        let layers: Vec<i32> = assembled.planks.iter().map(|p| p.layer).collect();
        assert_eq!(layers, vec![0, 1, 2]);
    }

    #[test]
    fn test_initial_screw_bridges_aligned_holes() {
        let s = stage(
            vec![hole(0.0, 0.0, true), hole(3.0, 0.0, false)],
            vec![plank(0, 0.5, vec![Vec2::new(-0.5, 0.0), Vec2::new(0.5, 0.0)])],
        );
        let assembled = AssembledStage::load(&s, &GameConfig::default());

        assert_eq!(assembled.screws.len(), 1);
        let screw = &assembled.screws[0];
        assert_eq!(screw.bridged.len(), 2);
        assert_eq!(screw.bridged[0], HoleRef::Base(0));
        assert_eq!(screw.bridged[1], HoleRef::Plank { plank: 0, slot: 0 });
        assert!(!screw.is_placed);
        assert!(assembled.holes[0].occupied);
        assert!(assembled.planks[0].holes[0].active);
        assert!(!assembled.planks[0].holes[1].active);
    }

    #[test]
    fn test_screw_in_bare_hole_starts_placed() {
        let s = stage(vec![hole(0.0, 0.0, true)], vec![]);
        let assembled = AssembledStage::load(&s, &GameConfig::default());
        assert!(assembled.screws[0].is_placed);
    }

    #[test]
    fn test_locked_hole_applied_and_out_of_range_skipped() {
        let mut s = stage(vec![hole(0.0, 0.0, false), hole(1.0, 0.0, false)], vec![]);
        s.locked_holes = vec![
            LockedHoleConfig {
                hole_index: 1,
                enabled: true,
                unlock: UnlockKind::RewardedAd,
            },
            LockedHoleConfig {
                hole_index: 9,
                enabled: true,
                unlock: UnlockKind::None,
            },
            LockedHoleConfig {
                hole_index: 0,
                enabled: false,
                unlock: UnlockKind::None,
            },
        ];
        let assembled = AssembledStage::load(&s, &GameConfig::default());

        assert!(assembled.holes[1].locked);
        assert!(!assembled.holes[1].visible);
        assert_eq!(assembled.holes[1].unlock, UnlockKind::RewardedAd);
        // Disabled entry leaves hole 0 untouched
        assert!(!assembled.holes[0].locked);
    }

    #[test]
    fn test_locked_hole_rejects_spawning_screw() {
        let mut s = stage(vec![hole(0.0, 0.0, true)], vec![]);
        s.locked_holes = vec![LockedHoleConfig {
            hole_index: 0,
            enabled: true,
            unlock: UnlockKind::None,
        }];
        let assembled = AssembledStage::load(&s, &GameConfig::default());
        assert!(assembled.screws[0].bridged.is_empty());
        assert!(!assembled.holes[0].occupied);
    }

    #[test]
    fn test_unload_is_idempotent() {
        let s = stage(vec![hole(0.0, 0.0, true)], vec![plank(0, 0.0, vec![])]);
        let mut assembled = AssembledStage::load(&s, &GameConfig::default());
        assert!(assembled.loaded);

        assembled.unload();
        let after_first = (
            assembled.holes.len(),
            assembled.planks.len(),
            assembled.screws.len(),
            assembled.loaded,
        );
        assembled.unload();
        let after_second = (
            assembled.holes.len(),
            assembled.planks.len(),
            assembled.screws.len(),
            assembled.loaded,
        );
        assert_eq!(after_first, (0, 0, 0, false));
        assert_eq!(after_first, after_second);
    }

    proptest! {
        #[test]
        fn test_layer_graph_symmetric(layers in prop::collection::vec(0i32..4, 0..12)) {
            let specs: Vec<PlankSpec> = layers
                .iter()
                .enumerate()
                .map(|(i, layer)| plank(*layer, i as f32 * 3.0, vec![]))
                .collect();
            let s = stage(vec![], specs);
            let assembled = AssembledStage::load(&s, &GameConfig::default());
            let n = assembled.planks.len();
            for a in 0..n {
                for b in 0..n {
                    let rel = assembled.layer_graph.relation(a, b);
                    prop_assert_eq!(rel, assembled.layer_graph.relation(b, a));
                    let same = assembled.planks[a].layer == assembled.planks[b].layer;
                    prop_assert_eq!(rel == LayerRelation::Collide, same);
                }
            }
        }
    }
}
