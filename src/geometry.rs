//! Shared geometry helpers: axis-aligned bounds, cardinal facings, and safe
//! direction normalisation.
//!
//! Every collision test in the resolver goes through [`Aabb`]; every aim or
//! chase direction goes through [`safe_normalize`] so a zero-length difference
//! can never produce a NaN direction.

use bevy::prelude::*;

/// Fallback unit vector substituted when a direction would be degenerate
/// (aiming at a target exactly on top of the shooter).
pub const FALLBACK_DIRECTION: Vec2 = Vec2::X;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build an AABB from a centre position and a full width/height size.
    #[inline]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Overlap test, inclusive at shared edges.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Whether `point` lies inside the box (inclusive).
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Normalise `v`, substituting [`FALLBACK_DIRECTION`] when the vector is too
/// short to produce a meaningful direction.
#[inline]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    if v.length_squared() > 1e-6 {
        v.normalize()
    } else {
        FALLBACK_DIRECTION
    }
}

/// One of the four cardinal directions an actor can face.
///
/// Drives sprite-sheet row selection in the external renderer; the simulation
/// itself only reads it for patrol direction flips.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    North,
    #[default]
    South,
    East,
    West,
}

impl Facing {
    /// Derive a facing from a movement or aim vector: dominant axis wins,
    /// sign picks the side.  A degenerate vector keeps the current facing,
    /// so callers should skip the update instead of passing zero.
    pub fn from_vector(v: Vec2) -> Option<Self> {
        if v.length_squared() <= 1e-6 {
            return None;
        }
        Some(if v.x.abs() >= v.y.abs() {
            if v.x >= 0.0 {
                Facing::East
            } else {
                Facing::West
            }
        } else if v.y >= 0.0 {
            Facing::North
        } else {
            Facing::South
        })
    }

    /// Unit vector for this facing.
    #[inline]
    pub fn to_vector(self) -> Vec2 {
        match self {
            Facing::North => Vec2::Y,
            Facing::South => Vec2::NEG_Y,
            Facing::East => Vec2::X,
            Facing::West => Vec2::NEG_X,
        }
    }

    /// Horizontal mirror, used by patrol bounce.
    #[inline]
    pub fn flipped_horizontal(self) -> Self {
        match self {
            Facing::East => Facing::West,
            Facing::West => Facing::East,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_overlap_is_inclusive_at_shared_edge() {
        let a = Aabb::from_center_size(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center_size(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_center_size(Vec2::new(10.1, 0.0), Vec2::splat(10.0));
        assert!(a.intersects(&b), "touching edges must count as overlap");
        assert!(!a.intersects(&c));
    }

    #[test]
    fn safe_normalize_substitutes_fallback_for_zero_vector() {
        assert_eq!(safe_normalize(Vec2::ZERO), FALLBACK_DIRECTION);
        let n = safe_normalize(Vec2::new(3.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }

    #[test]
    fn facing_picks_dominant_axis() {
        assert_eq!(Facing::from_vector(Vec2::new(5.0, 1.0)), Some(Facing::East));
        assert_eq!(Facing::from_vector(Vec2::new(-5.0, 1.0)), Some(Facing::West));
        assert_eq!(Facing::from_vector(Vec2::new(1.0, 5.0)), Some(Facing::North));
        assert_eq!(Facing::from_vector(Vec2::new(1.0, -5.0)), Some(Facing::South));
        assert_eq!(Facing::from_vector(Vec2::ZERO), None);
    }
}
