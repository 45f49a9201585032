//! Click resolution
//!
//! A tap on the board either toggles screw selection or, when a hole stack
//! is clicked while a screw is selected, relocates that screw. Invalid
//! combinations are ignored without error.

use crate::consts::ALIGN_EPSILON;
use crate::sim::assemble::AssembledStage;
use crate::sim::entities::{ClickTarget, HoleRef, PlankState};

/// What a resolved click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Screw moved to a new hole stack
    Relocated {
        screw: usize,
        /// Planks destroyed by losing their last screw
        destroyed: Vec<usize>,
    },
    Selected(usize),
    /// Selected screw was clicked again and seated back in place
    Reseated(usize),
    Ignored,
}

/// Toggle selection for a clicked screw
pub fn click_screw(stage: &mut AssembledStage, screw: usize) -> ClickOutcome {
    if !stage.screws.get(screw).is_some_and(|s| s.alive) {
        return ClickOutcome::Ignored;
    }
    if stage.selected_screw == Some(screw) {
        stage.selected_screw = None;
        let s = &mut stage.screws[screw];
        s.is_placed = matches!(s.bridged.as_slice(), [HoleRef::Base(_)]);
        ClickOutcome::Reseated(screw)
    } else {
        stage.selected_screw = Some(screw);
        ClickOutcome::Selected(screw)
    }
}

/// Resolve a clicked set of holes and planks against the selected screw.
///
/// A relocation needs exactly one more hole than planks, every hole within
/// the alignment epsilon of the first, and a selected screw. Anything else
/// leaves the stage untouched.
pub fn process_click(stage: &mut AssembledStage, targets: &[ClickTarget]) -> ClickOutcome {
    let mut holes: Vec<HoleRef> = Vec::new();
    let mut planks: Vec<usize> = Vec::new();

    // Targets may come from an outside picker; anything referencing an
    // entity that does not exist invalidates the whole click
    for target in targets {
        match *target {
            ClickTarget::BaseHole(i) => {
                let Some(hole) = stage.holes.get(i) else {
                    return ClickOutcome::Ignored;
                };
                if !hole.locked {
                    holes.push(HoleRef::Base(i));
                }
            }
            ClickTarget::PlankHole { plank, slot } => {
                if stage.planks.get(plank).is_none_or(|p| slot >= p.holes.len()) {
                    return ClickOutcome::Ignored;
                }
                holes.push(HoleRef::Plank { plank, slot });
            }
            ClickTarget::Plank(p) => {
                if p >= stage.planks.len() {
                    return ClickOutcome::Ignored;
                }
                if !planks.contains(&p) {
                    planks.push(p);
                }
            }
            // Screw taps are routed through click_screw before this point
            ClickTarget::Screw(_) => {}
        }
    }

    if holes.is_empty() || holes.len() != planks.len() + 1 {
        return ClickOutcome::Ignored;
    }

    let anchor = stage.hole_position(holes[0]);
    for hole in &holes[1..] {
        if (stage.hole_position(*hole) - anchor).length() > ALIGN_EPSILON {
            return ClickOutcome::Ignored;
        }
    }

    let Some(screw) = stage.selected_screw else {
        return ClickOutcome::Ignored;
    };

    // A hole taken by another screw cannot be relocated onto; the selected
    // screw's own holes are fair game (no-move re-click)
    for hole in &holes {
        let taken = match *hole {
            HoleRef::Base(i) => stage.holes[i].occupied,
            HoleRef::Plank { plank, slot } => stage.planks[plank].holes[slot].active,
        };
        if taken && !stage.screws[screw].bridged.contains(hole) {
            return ClickOutcome::Ignored;
        }
    }

    let released = release_screw(stage, screw);
    connect_screw(stage, screw, holes);

    // A plank re-pinned by the same move survives; only planks left with no
    // active hole after the reconnect are gone
    let mut destroyed = Vec::new();
    for plank in released {
        let p = &mut stage.planks[plank];
        if p.is_alive() && p.active_hole_count() == 0 {
            p.state = PlankState::Destroyed;
            stage.destroyed_planks += 1;
            destroyed.push(plank);
        }
    }

    stage.selected_screw = None;

    ClickOutcome::Relocated { screw, destroyed }
}

/// Free the screw from its current holes; returns the planks it was pinning
pub(crate) fn release_screw(stage: &mut AssembledStage, screw: usize) -> Vec<usize> {
    let bridged = std::mem::take(&mut stage.screws[screw].bridged);
    let mut released = Vec::new();

    for hole in bridged {
        match hole {
            HoleRef::Base(i) => {
                let h = &mut stage.holes[i];
                h.occupied = false;
                if h.is_puzzle_hole() {
                    h.placed_digit = None;
                }
            }
            HoleRef::Plank { plank, slot } => {
                stage.planks[plank].holes[slot].active = false;
                released.push(plank);
            }
        }
    }

    stage.screws[screw].is_placed = false;
    released
}

/// Seat the screw in a new hole set
pub(crate) fn connect_screw(stage: &mut AssembledStage, screw: usize, holes: Vec<HoleRef>) {
    let number = stage.screws[screw].number;
    for hole in &holes {
        match *hole {
            HoleRef::Base(i) => {
                let h = &mut stage.holes[i];
                h.occupied = true;
                if h.is_puzzle_hole() {
                    h.placed_digit = number;
                }
            }
            HoleRef::Plank { plank, slot } => {
                stage.planks[plank].holes[slot].active = true;
            }
        }
    }

    let position = stage.hole_position(holes[holes.len() - 1]);
    let s = &mut stage.screws[screw];
    s.position = position;
    s.is_placed = matches!(holes.as_slice(), [HoleRef::Base(_)]);
    s.bridged = holes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HoleSpec, LockedHoleConfig, PlankKind, PlankSpec, Stage, UnlockKind};
    use crate::config::GameConfig;
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    fn hole(x: f32, y: f32, has_screw: bool) -> HoleSpec {
        HoleSpec {
            position: Vec2::new(x, y),
            has_screw,
        }
    }

    /// One screw at the origin pinning two crossed planks:
    /// - plank 0 (layer 0) horizontal, holes at (0,0) and (2,0)
    /// - plank 1 (layer 1) vertical, holes at (0,0) and (0,4)
    /// Base holes under (0,0) and (2,0), plus a bare hole at (5,0).
    fn crossed_stage() -> AssembledStage {
        let stage = Stage {
            holes: vec![
                hole(0.0, 0.0, true),
                hole(2.0, 0.0, false),
                hole(5.0, 0.0, false),
            ],
            planks: vec![
                PlankSpec {
                    kind: PlankKind::Size3,
                    layer: 0,
                    position: Vec2::new(1.0, 0.0),
                    rotation: 0.0,
                    scale: Vec2::ONE,
                    screw_holes: vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)],
                },
                PlankSpec {
                    kind: PlankKind::Size5,
                    layer: 1,
                    position: Vec2::new(0.0, 2.0),
                    rotation: FRAC_PI_2,
                    scale: Vec2::ONE,
                    screw_holes: vec![Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)],
                },
            ],
            locked_holes: vec![],
            timer_override: None,
        };
        AssembledStage::load(&stage, &GameConfig::default())
    }

    #[test]
    fn test_initial_bridge_spans_both_planks() {
        let stage = crossed_stage();
        assert_eq!(
            stage.screws[0].bridged,
            vec![
                HoleRef::Base(0),
                HoleRef::Plank { plank: 0, slot: 0 },
                HoleRef::Plank { plank: 1, slot: 0 },
            ]
        );
    }

    #[test]
    fn test_relocation_replaces_bridged_set() {
        let mut stage = crossed_stage();
        stage.selected_screw = Some(0);

        // Click the stack at (2,0): base hole 1, plank 0's far slot, plank 0
        let outcome = process_click(
            &mut stage,
            &[
                ClickTarget::BaseHole(1),
                ClickTarget::PlankHole { plank: 0, slot: 1 },
                ClickTarget::Plank(0),
            ],
        );

        // Plank 0 was re-pinned through its far hole and survives;
        // plank 1 lost its only screw
        assert_eq!(
            outcome,
            ClickOutcome::Relocated {
                screw: 0,
                destroyed: vec![1],
            }
        );
        assert_eq!(
            stage.screws[0].bridged,
            vec![HoleRef::Base(1), HoleRef::Plank { plank: 0, slot: 1 }]
        );
        assert_eq!(stage.planks[1].state, PlankState::Destroyed);
        assert!(stage.planks[0].is_alive());
        assert!(!stage.holes[0].occupied);
        assert!(stage.holes[1].occupied);
        assert!(!stage.screws[0].is_placed);
        assert_eq!(stage.screws[0].position, Vec2::new(2.0, 0.0));
        assert!(stage.selected_screw.is_none());
    }

    #[test]
    fn test_mismatched_counts_are_ignored() {
        let mut stage = crossed_stage();
        stage.selected_screw = Some(0);
        let before = stage.screws[0].bridged.clone();

        // One hole, one plank: not holes == planks + 1
        let outcome = process_click(
            &mut stage,
            &[
                ClickTarget::PlankHole { plank: 1, slot: 1 },
                ClickTarget::Plank(1),
            ],
        );

        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(stage.screws[0].bridged, before);
        assert_eq!(stage.destroyed_planks, 0);
    }

    #[test]
    fn test_misaligned_holes_are_ignored() {
        let mut stage = crossed_stage();
        stage.selected_screw = Some(0);

        // Base hole 1 at (2,0) and plank 1's far slot at (0,4)
        let outcome = process_click(
            &mut stage,
            &[
                ClickTarget::BaseHole(1),
                ClickTarget::PlankHole { plank: 1, slot: 1 },
                ClickTarget::Plank(1),
            ],
        );

        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_no_selection_is_ignored() {
        let mut stage = crossed_stage();
        let outcome = process_click(&mut stage, &[ClickTarget::BaseHole(2)]);
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_locked_hole_never_accepts_a_screw() {
        let stage_data = Stage {
            holes: vec![hole(0.0, 0.0, true), hole(2.0, 0.0, false)],
            planks: vec![],
            locked_holes: vec![LockedHoleConfig {
                hole_index: 1,
                enabled: true,
                unlock: UnlockKind::None,
            }],
            timer_override: None,
        };
        let mut stage = AssembledStage::load(&stage_data, &GameConfig::default());
        stage.selected_screw = Some(0);

        // Locked hole drops out of the candidate set, leaving zero holes
        let outcome = process_click(&mut stage, &[ClickTarget::BaseHole(1)]);
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert!(!stage.holes[1].occupied);
    }

    #[test]
    fn test_stepwise_unstacking_to_placed() {
        let mut stage = crossed_stage();

        // Move off the crossing point, destroying the vertical plank
        stage.selected_screw = Some(0);
        process_click(
            &mut stage,
            &[
                ClickTarget::BaseHole(1),
                ClickTarget::PlankHole { plank: 0, slot: 1 },
                ClickTarget::Plank(0),
            ],
        );

        // Then into the bare hole: one hole, zero planks, screw is placed
        stage.selected_screw = Some(0);
        let outcome = process_click(&mut stage, &[ClickTarget::BaseHole(2)]);
        assert_eq!(
            outcome,
            ClickOutcome::Relocated {
                screw: 0,
                destroyed: vec![0],
            }
        );
        assert_eq!(stage.screws[0].bridged, vec![HoleRef::Base(2)]);
        assert!(stage.screws[0].is_placed);
        assert!(stage.all_planks_cleared());
    }

    #[test]
    fn test_out_of_range_targets_are_ignored() {
        let mut stage = crossed_stage();
        stage.selected_screw = Some(0);
        let before = stage.screws[0].bridged.clone();

        let malformed: [&[ClickTarget]; 4] = [
            &[ClickTarget::BaseHole(99)],
            &[ClickTarget::PlankHole { plank: 7, slot: 0 }],
            &[ClickTarget::PlankHole { plank: 0, slot: 9 }],
            &[ClickTarget::BaseHole(1), ClickTarget::Plank(5)],
        ];
        for targets in malformed {
            assert_eq!(process_click(&mut stage, targets), ClickOutcome::Ignored);
        }
        assert_eq!(stage.screws[0].bridged, before);
        assert_eq!(click_screw(&mut stage, 42), ClickOutcome::Ignored);
    }

    #[test]
    fn test_screw_click_toggles_selection() {
        let mut stage = crossed_stage();
        assert_eq!(click_screw(&mut stage, 0), ClickOutcome::Selected(0));
        assert_eq!(stage.selected_screw, Some(0));
        assert_eq!(click_screw(&mut stage, 0), ClickOutcome::Reseated(0));
        assert_eq!(stage.selected_screw, None);
    }

    #[test]
    fn test_occupied_hole_rejects_relocation() {
        let stage_data = Stage {
            holes: vec![hole(0.0, 0.0, true), hole(2.0, 0.0, true)],
            planks: vec![],
            locked_holes: vec![],
            timer_override: None,
        };
        let mut stage = AssembledStage::load(&stage_data, &GameConfig::default());
        stage.selected_screw = Some(0);

        let outcome = process_click(&mut stage, &[ClickTarget::BaseHole(1)]);
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(stage.screws[0].bridged, vec![HoleRef::Base(0)]);
    }
}
