//! Combat resolver: collision testing, damage application, and reaping.
//!
//! Runs once per tick after all actors and projectiles have moved, in a
//! fixed order: player shots against hostiles, hostile shots against the
//! player, melee contact, then the reap pass.  All cross-actor effects in
//! the simulation happen here; behaviour systems never touch another actor.
//!
//! Reaping is two-phase (mark, then despawn via deferred commands), so no
//! list is mutated while it is being iterated.

use crate::actor::{CollisionBounds, Health, Player, PlayerExperience, TargetSnapshot};
use crate::boss::Boss;
use crate::director::{CurrentMap, Encounters};
use crate::enemy::Enemy;
use crate::geometry::Aabb;
use crate::projectile::{Faction, Projectile};
use crate::stats::SessionStats;
use bevy::prelude::*;

/// Collision box edge length for a projectile; projectiles carry no
/// [`CollisionBounds`] of their own.
const PROJECTILE_HIT_SIZE: f32 = 8.0;

#[inline]
fn projectile_bounds(position: Vec2) -> Aabb {
    Aabb::from_center_size(position, Vec2::splat(PROJECTILE_HIT_SIZE))
}

/// Player projectiles against live enemies and bosses.
///
/// The first target in iteration order wins when several overlap; ties are
/// not specially resolved.  A hit applies damage, records the Stalker's
/// aggro lock, and deactivates the projectile.
pub fn player_projectile_hit_system(
    target: Res<TargetSnapshot>,
    mut q_projectiles: Query<(&mut Projectile, &Faction, &Transform)>,
    mut q_targets: Query<
        (&CollisionBounds, &mut Health, Option<&mut Boss>),
        Or<(With<Enemy>, With<Boss>)>,
    >,
) {
    for (mut projectile, faction, transform) in q_projectiles.iter_mut() {
        if *faction != Faction::Player || !projectile.active {
            continue;
        }
        let shot_bounds = projectile_bounds(transform.translation.truncate());
        for (bounds, mut health, boss) in q_targets.iter_mut() {
            if health.is_dead() || !bounds.0.intersects(&shot_bounds) {
                continue;
            }
            health.damage(projectile.damage);
            if let Some(mut boss) = boss {
                // Remembered position is the target snapshot at the moment
                // of the hit, not wherever the player wanders afterwards.
                boss.record_aggro(target.0);
            }
            projectile.active = false;
            break;
        }
    }
}

/// Hostile projectiles against the player.
pub fn hostile_projectile_hit_system(
    mut q_projectiles: Query<(&mut Projectile, &Faction, &Transform)>,
    mut q_player: Query<(&CollisionBounds, &mut Health), With<Player>>,
) {
    let Ok((bounds, mut health)) = q_player.single_mut() else {
        return;
    };
    for (mut projectile, faction, transform) in q_projectiles.iter_mut() {
        if *faction != Faction::Hostile || !projectile.active {
            continue;
        }
        if health.is_dead() {
            break;
        }
        if bounds.0.intersects(&projectile_bounds(transform.translation.truncate())) {
            health.damage(projectile.damage);
            projectile.active = false;
        }
    }
}

/// Melee contact damage from bosses in their melee phase.
///
/// Damage applies only when the per-boss cooldown has elapsed, and each
/// application resets the cooldown.
pub fn melee_contact_system(
    time: Res<Time>,
    mut q_bosses: Query<(&mut Boss, &CollisionBounds, &Health)>,
    mut q_player: Query<(&CollisionBounds, &mut Health), (With<Player>, Without<Boss>)>,
) {
    let dt = time.delta_secs();
    let player = q_player.single_mut().ok();
    let Some((player_bounds, mut player_health)) = player else {
        return;
    };

    for (mut boss, bounds, health) in q_bosses.iter_mut() {
        if health.is_dead()
            || boss.contact_damage == 0
            || boss.phase != crate::boss::BossPhase::Melee
        {
            continue;
        }
        if player_health.is_dead() {
            break;
        }
        // The cooldown drains only in the melee phase.  A ranged excursion
        // leaves the re-armed timer untouched, so re-closing always waits
        // out the full cooldown.
        boss.melee_timer = (boss.melee_timer - dt).max(0.0);
        if boss.melee_timer <= 0.0 && bounds.0.intersects(&player_bounds.0) {
            player_health.damage(boss.contact_damage);
            boss.melee_timer = boss.archetype.tuning().melee_cooldown;
        }
    }
}

/// Reap pass: remove dead enemies and bosses, crediting kill counters and
/// the boss experience reward exactly once.
pub fn reap_dead_system(
    mut commands: Commands,
    current_map: Res<CurrentMap>,
    mut encounters: ResMut<Encounters>,
    mut stats: ResMut<SessionStats>,
    mut xp: ResMut<PlayerExperience>,
    q_enemies: Query<(Entity, &Health), (With<Enemy>, Without<Boss>)>,
    mut q_bosses: Query<(Entity, &Health, &mut Boss)>,
) {
    let state = encounters.state_mut(current_map.0);

    for (entity, health) in q_enemies.iter() {
        if health.is_dead() {
            commands.entity(entity).despawn();
            state.kills += 1;
            stats.enemies_killed += 1;
        }
    }

    for (entity, health, mut boss) in q_bosses.iter_mut() {
        if !health.is_dead() {
            continue;
        }
        // Reward exactly once, even if the boss lingers dead for a tick.
        if !boss.xp_rewarded {
            boss.xp_rewarded = true;
            xp.total += boss.xp_reward;
            state.boss_kills += 1;
            stats.bosses_killed += 1;
            info!(
                "{} defeated; +{} experience",
                boss.archetype.label(),
                boss.xp_reward
            );
        }
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projectile_bounds_are_centred_on_position() {
        let bounds = projectile_bounds(Vec2::new(10.0, 20.0));
        assert_eq!(bounds.min, Vec2::new(6.0, 16.0));
        assert_eq!(bounds.max, Vec2::new(14.0, 24.0));
    }
}
