//! Projectile subsystem: spawn, per-tick integration, and end-of-tick purge.
//!
//! Projectiles are range-limited hazards.  They are mutated in exactly two
//! places: their own movement integration here, and deactivation by the
//! combat resolver on hit.  Deactivated projectiles are despawned at the end
//! of the same tick, never lazily.  Projectiles do not interact with each
//! other, and a projectile's faction never changes after spawn.

use crate::config::BalanceConfig;
use crate::geometry::safe_normalize;
use bevy::prelude::*;

/// Which side fired a projectile.  Immutable for the projectile's lifetime.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Hostile,
}

/// Per-projectile state.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    /// Unit travel direction, fixed at spawn.
    pub dir: Vec2,
    /// Speed in units/second.
    pub speed: f32,
    /// Damage applied to the first target hit.
    pub damage: i32,
    /// World position at spawn; range is measured from here.
    pub spawn_pos: Vec2,
    /// Maximum Euclidean displacement from `spawn_pos` before deactivation.
    /// A projectile exactly at this displacement is still live.
    pub max_range: f32,
    /// Cleared on hit, on range exceedance, or on leaving the playfield.
    pub active: bool,
}

impl Projectile {
    /// Displacement from the spawn point at `pos`.
    #[inline]
    pub fn travelled(&self, pos: Vec2) -> f32 {
        pos.distance(self.spawn_pos)
    }
}

/// Spawn a projectile owned by `faction`, travelling along `dir`.
///
/// `dir` is normalised here with the shared degenerate-vector fallback, so
/// callers may pass a raw difference vector.
pub fn fire(
    commands: &mut Commands,
    faction: Faction,
    origin: Vec2,
    dir: Vec2,
    speed: f32,
    damage: i32,
    max_range: f32,
) -> Entity {
    commands
        .spawn((
            Projectile {
                dir: safe_normalize(dir),
                speed,
                damage,
                spawn_pos: origin,
                max_range,
                active: true,
            },
            faction,
            Transform::from_translation(origin.extend(0.2)),
        ))
        .id()
}

/// Integrate projectile movement and deactivate on range or playfield exit.
pub fn projectile_move_system(
    time: Res<Time>,
    config: Res<BalanceConfig>,
    mut q: Query<(&mut Projectile, &mut Transform)>,
) {
    let dt = time.delta_secs();
    let field = config.playfield();
    for (mut projectile, mut transform) in q.iter_mut() {
        if !projectile.active {
            continue;
        }
        let next = transform.translation.truncate() + projectile.dir * projectile.speed * dt;
        transform.translation = next.extend(transform.translation.z);

        if projectile.travelled(next) > projectile.max_range || !field.contains(next) {
            projectile.active = false;
        }
    }
}

/// End-of-tick purge: despawn every projectile deactivated this tick.
///
/// Runs after the combat resolver so a projectile that hit something this
/// tick is removed in the same tick it was deactivated.
pub fn purge_inactive_projectiles_system(
    mut commands: Commands,
    q: Query<(Entity, &Projectile)>,
) {
    for (entity, projectile) in q.iter() {
        if !projectile.active {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile_with_range(range: f32) -> Projectile {
        Projectile {
            dir: Vec2::X,
            speed: 100.0,
            damage: 10,
            spawn_pos: Vec2::ZERO,
            max_range: range,
            active: true,
        }
    }

    #[test]
    fn displacement_exactly_at_range_stays_active() {
        let projectile = projectile_with_range(100.0);
        let at_range = Vec2::new(100.0, 0.0);
        assert!(projectile.travelled(at_range) <= projectile.max_range);
    }

    #[test]
    fn displacement_past_range_deactivates() {
        let projectile = projectile_with_range(100.0);
        let past_range = Vec2::new(100.0 + 1e-3, 0.0);
        assert!(projectile.travelled(past_range) > projectile.max_range);
    }

    #[test]
    fn range_is_euclidean_not_axis_aligned() {
        let projectile = Projectile {
            dir: safe_normalize(Vec2::new(1.0, 1.0)),
            ..projectile_with_range(100.0)
        };
        let diagonal = Vec2::new(80.0, 80.0);
        assert!(
            projectile.travelled(diagonal) > projectile.max_range,
            "80/80 diagonal is ~113 units of displacement"
        );
    }

    #[test]
    fn fire_normalises_degenerate_direction() {
        // Direct check of the helper the spawn path uses.
        let dir = safe_normalize(Vec2::ZERO);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }
}
