//! Generic enemy behaviour.
//!
//! Common enemies only patrol: they bounce between horizontal bounds at a
//! fixed cadence and flip deterministically at the patrol edge or the
//! playfield edge.  No randomness once patrolling, and no firing; bosses are
//! the only actors that fire by default.  A `Chase` state exists on the enum
//! so specialised spawns can opt into pursuit, but the base type never
//! selects it.

use crate::actor::{Health, MoveSpeed};
use crate::actor::TargetSnapshot;
use crate::config::BalanceConfig;
use crate::geometry::Facing;
use bevy::prelude::*;

/// Marker component for generic enemies.
#[derive(Component)]
pub struct Enemy;

/// Behaviour state for a generic enemy.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyState {
    #[default]
    Patrol,
    /// Not selected by the base type; present for specialised spawns.
    Chase,
}

/// Horizontal patrol route, fixed at spawn.
#[derive(Component, Debug, Clone, Copy)]
pub struct PatrolRoute {
    pub min_x: f32,
    pub max_x: f32,
}

/// Advance enemy behaviour one tick.
///
/// Patrol moves along the current east/west facing and flips at the route or
/// playfield edge.  Chase walks straight at the target snapshot.
pub fn enemy_behavior_system(
    time: Res<Time>,
    config: Res<BalanceConfig>,
    target: Res<TargetSnapshot>,
    mut q: Query<
        (
            &mut Transform,
            &mut Facing,
            &EnemyState,
            &PatrolRoute,
            &MoveSpeed,
            &Health,
        ),
        With<Enemy>,
    >,
) {
    let dt = time.delta_secs();
    let field = config.playfield();
    for (mut transform, mut facing, state, route, speed, health) in q.iter_mut() {
        if health.is_dead() {
            continue;
        }
        match state {
            EnemyState::Patrol => {
                // Patrol is horizontal only; restore an east/west facing if a
                // spawn handed us a vertical one.
                if !matches!(*facing, Facing::East | Facing::West) {
                    *facing = Facing::East;
                }
                let step = facing.to_vector().x * speed.0 * dt;
                let mut x = transform.translation.x + step;
                let min_x = route.min_x.max(field.min.x);
                let max_x = route.max_x.min(field.max.x);
                if x <= min_x {
                    x = min_x;
                    *facing = facing.flipped_horizontal();
                } else if x >= max_x {
                    x = max_x;
                    *facing = facing.flipped_horizontal();
                }
                transform.translation.x = x;
            }
            EnemyState::Chase => {
                let pos = transform.translation.truncate();
                let dir = crate::geometry::safe_normalize(target.0 - pos);
                let next = pos + dir * speed.0 * dt;
                transform.translation = next.extend(transform.translation.z);
                if let Some(new_facing) = Facing::from_vector(dir) {
                    *facing = new_facing;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_patrol() {
        assert_eq!(EnemyState::default(), EnemyState::Patrol);
    }

    #[test]
    fn patrol_flip_is_deterministic() {
        // The flip helper alone decides the bounce; no randomness involved.
        assert_eq!(Facing::East.flipped_horizontal(), Facing::West);
        assert_eq!(Facing::West.flipped_horizontal(), Facing::East);
        assert_eq!(Facing::North.flipped_horizontal(), Facing::North);
    }
}
