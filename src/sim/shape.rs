//! Plank footprints as signed distance fields
//!
//! Overlap queries against plank silhouettes are answered analytically:
//! each plank kind maps to a small SDF tree evaluated in plank-local space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::PlankKind;

/// Signed distance to an axis-aligned box centered at the origin
#[inline]
pub fn sd_box(p: Vec2, half: Vec2) -> f32 {
    let q = p.abs() - half;
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0)
}

/// Signed distance to a circle centered at the origin
#[inline]
pub fn sd_circle(p: Vec2, radius: f32) -> f32 {
    p.length() - radius
}

/// Signed distance to a ring (annulus) centered at the origin
#[inline]
pub fn sd_ring(p: Vec2, radius: f32, thickness: f32) -> f32 {
    (p.length() - radius).abs() - thickness * 0.5
}

#[inline]
fn ndot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.x - a.y * b.y
}

/// Signed distance to a rhombus with half-diagonals `half`
pub fn sd_rhombus(p: Vec2, half: Vec2) -> f32 {
    let p = p.abs();
    let h = (ndot(half - 2.0 * p, half) / half.length_squared()).clamp(-1.0, 1.0);
    let d = (p - 0.5 * half * Vec2::new(1.0 - h, 1.0 + h)).length();
    d * (p.x * half.y + p.y * half.x - half.x * half.y).signum()
}

/// A collision silhouette in local space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half: Vec2 },
    Ring { radius: f32, thickness: f32 },
    Rhombus { half: Vec2 },
    /// Union of offset sub-shapes
    Compound { parts: Vec<(Vec2, Shape)> },
}

impl Shape {
    /// Signed distance from `p` (local space) to the shape boundary
    pub fn distance(&self, p: Vec2) -> f32 {
        match self {
            Shape::Circle { radius } => sd_circle(p, *radius),
            Shape::Box { half } => sd_box(p, *half),
            Shape::Ring { radius, thickness } => sd_ring(p, *radius, *thickness),
            Shape::Rhombus { half } => sd_rhombus(p, *half),
            Shape::Compound { parts } => parts
                .iter()
                .map(|(offset, shape)| shape.distance(p - *offset))
                .fold(f32::MAX, f32::min),
        }
    }
}

/// Position/rotation/scale applied to a plank's local space
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform2 {
    pub position: Vec2,
    /// Radians, counterclockwise
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform2 {
    pub fn new(position: Vec2, rotation: f32, scale: Vec2) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Local point to world space
    pub fn apply(&self, local: Vec2) -> Vec2 {
        let scaled = local * self.scale;
        let (sin, cos) = self.rotation.sin_cos();
        let rotated = Vec2::new(
            scaled.x * cos - scaled.y * sin,
            scaled.x * sin + scaled.y * cos,
        );
        self.position + rotated
    }

    /// World point to local space
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        let offset = world - self.position;
        let (sin, cos) = (-self.rotation).sin_cos();
        let rotated = Vec2::new(
            offset.x * cos - offset.y * sin,
            offset.x * sin + offset.y * cos,
        );
        rotated / self.scale
    }

    /// Conservative distance from a world point to the transformed shape.
    ///
    /// Non-uniform scale distorts the SDF metric; scaling the local distance
    /// by the smaller axis keeps the result usable for overlap tests.
    pub fn shape_distance(&self, shape: &Shape, world: Vec2) -> f32 {
        shape.distance(self.to_local(world)) * self.scale.x.min(self.scale.y)
    }
}

/// Straight plank footprint spanning `holes` attachment points
fn bar(holes: u32) -> Shape {
    Shape::Box {
        half: Vec2::new((holes - 1) as f32 * 0.5 + 0.5, 0.45),
    }
}

/// Local-space collision silhouette for a plank kind
pub fn footprint(kind: PlankKind) -> Shape {
    match kind {
        PlankKind::Size1 => bar(1),
        PlankKind::Size2 => bar(2),
        PlankKind::Size3 => bar(3),
        PlankKind::Size4 => bar(4),
        PlankKind::Size5 => bar(5),
        PlankKind::Size6 => bar(6),
        PlankKind::Circle => Shape::Circle { radius: 1.0 },
        PlankKind::Donut => Shape::Ring {
            radius: 0.9,
            thickness: 0.6,
        },
        PlankKind::Dot => Shape::Circle { radius: 0.4 },
        PlankKind::Rect => Shape::Box {
            half: Vec2::new(1.4, 0.8),
        },
        PlankKind::BigSquare => Shape::Box {
            half: Vec2::new(1.2, 1.2),
        },
        PlankKind::SmallSquare => Shape::Box {
            half: Vec2::new(0.6, 0.6),
        },
        PlankKind::Rhombus => Shape::Rhombus {
            half: Vec2::new(1.0, 0.7),
        },
        // Triangle and star footprints are close enough to a rhombus/disc
        // for hole-overlap purposes
        PlankKind::Triangle => Shape::Rhombus {
            half: Vec2::new(1.0, 0.8),
        },
        PlankKind::Star => Shape::Circle { radius: 0.9 },
        PlankKind::Plus => Shape::Compound {
            parts: vec![
                (
                    Vec2::ZERO,
                    Shape::Box {
                        half: Vec2::new(1.0, 0.35),
                    },
                ),
                (
                    Vec2::ZERO,
                    Shape::Box {
                        half: Vec2::new(0.35, 1.0),
                    },
                ),
            ],
        },
        PlankKind::LShape => Shape::Compound {
            parts: vec![
                (
                    Vec2::new(-0.6, 0.0),
                    Shape::Box {
                        half: Vec2::new(0.35, 1.0),
                    },
                ),
                (
                    Vec2::new(0.2, -0.65),
                    Shape::Box {
                        half: Vec2::new(0.8, 0.35),
                    },
                ),
            ],
        },
        PlankKind::CShape => Shape::Compound {
            parts: vec![
                (
                    Vec2::new(-0.7, 0.0),
                    Shape::Box {
                        half: Vec2::new(0.3, 1.0),
                    },
                ),
                (
                    Vec2::new(0.2, 0.7),
                    Shape::Box {
                        half: Vec2::new(0.6, 0.3),
                    },
                ),
                (
                    Vec2::new(0.2, -0.7),
                    Shape::Box {
                        half: Vec2::new(0.6, 0.3),
                    },
                ),
            ],
        },
        PlankKind::UShape => Shape::Compound {
            parts: vec![
                (
                    Vec2::new(-0.7, 0.0),
                    Shape::Box {
                        half: Vec2::new(0.3, 1.0),
                    },
                ),
                (
                    Vec2::new(0.7, 0.0),
                    Shape::Box {
                        half: Vec2::new(0.3, 1.0),
                    },
                ),
                (
                    Vec2::new(0.0, -0.7),
                    Shape::Box {
                        half: Vec2::new(0.6, 0.3),
                    },
                ),
            ],
        },
        PlankKind::EShape => Shape::Compound {
            parts: vec![
                (
                    Vec2::new(-0.7, 0.0),
                    Shape::Box {
                        half: Vec2::new(0.3, 1.1),
                    },
                ),
                (
                    Vec2::new(0.2, 0.8),
                    Shape::Box {
                        half: Vec2::new(0.6, 0.3),
                    },
                ),
                (
                    Vec2::new(0.2, 0.0),
                    Shape::Box {
                        half: Vec2::new(0.5, 0.3),
                    },
                ),
                (
                    Vec2::new(0.2, -0.8),
                    Shape::Box {
                        half: Vec2::new(0.6, 0.3),
                    },
                ),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_distance_inside_outside() {
        let half = Vec2::new(1.0, 0.5);
        assert!(sd_box(Vec2::ZERO, half) < 0.0);
        assert!((sd_box(Vec2::new(2.0, 0.0), half) - 1.0).abs() < 1e-5);
        assert!(sd_box(Vec2::new(0.9, 0.4), half) < 0.0);
    }

    #[test]
    fn test_ring_has_a_hole() {
        let ring = Shape::Ring {
            radius: 1.0,
            thickness: 0.4,
        };
        assert!(ring.distance(Vec2::ZERO) > 0.0);
        assert!(ring.distance(Vec2::new(1.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_compound_is_union() {
        let shape = footprint(PlankKind::Plus);
        assert!(shape.distance(Vec2::ZERO) < 0.0);
        assert!(shape.distance(Vec2::new(0.9, 0.0)) < 0.0);
        assert!(shape.distance(Vec2::new(0.0, 0.9)) < 0.0);
        assert!(shape.distance(Vec2::new(0.9, 0.9)) > 0.0);
    }

    #[test]
    fn test_rhombus_sign() {
        let half = Vec2::new(1.0, 0.7);
        assert!(sd_rhombus(Vec2::ZERO, half) < 0.0);
        assert!(sd_rhombus(Vec2::new(0.9, 0.6), half) > 0.0);
        assert!(sd_rhombus(Vec2::new(0.95, 0.0), half) < 0.0);
    }

    #[test]
    fn test_transform_round_trip() {
        let t = Transform2::new(Vec2::new(3.0, -1.0), 0.7, Vec2::new(2.0, 1.0));
        let local = Vec2::new(0.4, -0.2);
        let back = t.to_local(t.apply(local));
        assert!((back - local).length() < 1e-5);
    }

    #[test]
    fn test_transformed_distance_moves_with_plank() {
        let t = Transform2::new(Vec2::new(5.0, 5.0), 0.0, Vec2::ONE);
        let shape = footprint(PlankKind::Size2);
        assert!(t.shape_distance(&shape, Vec2::new(5.0, 5.0)) < 0.0);
        assert!(t.shape_distance(&shape, Vec2::ZERO) > 0.0);
    }
}
