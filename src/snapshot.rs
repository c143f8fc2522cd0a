//! Read-only draw snapshot for the external renderer.
//!
//! The renderer never queries the simulation world directly; at the end of
//! each tick it reads [`DrawList`], a flat list of everything drawable with
//! the state the renderer needs for frame selection.  Dead-but-unreaped
//! actors still appear here, which is what keeps them drawable until the
//! reap pass removes them.

use crate::actor::{AnimationClock, Health, Player};
use crate::boss::{Boss, BossArchetype, BossPhase};
use crate::enemy::{Enemy, EnemyState};
use crate::geometry::Facing;
use crate::projectile::{Faction, Projectile};
use bevy::prelude::*;

/// What kind of sprite an entry is, with the per-kind state that picks the
/// sheet row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteKind {
    Player { dead: bool },
    Enemy { state: EnemyState, dead: bool },
    Boss { archetype: BossArchetype, phase: BossPhase },
    Projectile { faction: Faction },
}

/// One drawable entity.
#[derive(Debug, Clone, Copy)]
pub struct SpriteView {
    pub position: Vec2,
    pub facing: Facing,
    pub frame: usize,
    pub kind: SpriteKind,
}

/// Flat draw list rebuilt every tick.
#[derive(Resource, Default, Debug)]
pub struct DrawList(pub Vec<SpriteView>);

/// Rebuild [`DrawList`] from the current world state.
pub fn collect_draw_list_system(
    mut draw_list: ResMut<DrawList>,
    q_player: Query<(&Transform, &Facing, &AnimationClock, &Health), With<Player>>,
    q_enemies: Query<
        (&Transform, &Facing, &AnimationClock, &Health, &EnemyState),
        (With<Enemy>, Without<Player>),
    >,
    q_bosses: Query<(&Transform, &Facing, &AnimationClock, &Boss)>,
    q_projectiles: Query<(&Transform, &Projectile, &Faction)>,
) {
    draw_list.0.clear();

    if let Ok((transform, facing, clock, health)) = q_player.single() {
        draw_list.0.push(SpriteView {
            position: transform.translation.truncate(),
            facing: *facing,
            frame: clock.frame,
            kind: SpriteKind::Player {
                dead: health.is_dead(),
            },
        });
    }

    for (transform, facing, clock, health, state) in q_enemies.iter() {
        draw_list.0.push(SpriteView {
            position: transform.translation.truncate(),
            facing: *facing,
            frame: clock.frame,
            kind: SpriteKind::Enemy {
                state: *state,
                dead: health.is_dead(),
            },
        });
    }

    for (transform, facing, clock, boss) in q_bosses.iter() {
        draw_list.0.push(SpriteView {
            position: transform.translation.truncate(),
            facing: *facing,
            frame: clock.frame,
            kind: SpriteKind::Boss {
                archetype: boss.archetype,
                phase: boss.phase,
            },
        });
    }

    for (transform, projectile, faction) in q_projectiles.iter() {
        if !projectile.active {
            continue;
        }
        // Projectile orientation comes from the dominant axis and sign of
        // the travel direction, same rule as actor facing.
        let facing = Facing::from_vector(projectile.dir).unwrap_or_default();
        draw_list.0.push(SpriteView {
            position: transform.translation.truncate(),
            facing,
            frame: 0,
            kind: SpriteKind::Projectile { faction: *faction },
        });
    }
}
