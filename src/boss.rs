//! Boss archetypes and their finite-state controllers.
//!
//! A boss is one entity whose behaviour is dispatched on a tagged
//! [`BossArchetype`] rather than a type hierarchy: the per-archetype numbers
//! live in a [`BossTuning`] constant table, and phase selection is a pure
//! function of distance to the target (plus the Stalker's aggro lock),
//! re-evaluated every tick with no hysteresis.
//!
//! ## Phase tables
//!
//! | Archetype | Rule |
//! |-----------|------|
//! | Brute     | d > 200 → Walking (chase), else Attack (fires on interval) |
//! | Warden    | d ≥ 250 → Attack (aimed shots), else Melee (periodic contact damage) |
//! | Stalker   | d ≤ shoot range → Attack; d ≤ chase range → Chase; else Patrol. Taking damage locks the remembered target position and forces Attack at it until one shot completes; a lock beyond projectile range is approached before the shot |
//! | Sentinel  | d > 300 → Idle; d > 150 → Walking; else Attack |
//! | Colossus  | identical thresholds to Sentinel, heavier tuning |
//!
//! The Warden's ranged state is represented by the shared `Attack` phase;
//! `Melee` is its own phase.  Phase re-evaluation happens before animation
//! and firing each tick.  Firing compares a time-since-last-shot accumulator
//! against the archetype's interval and resets it to zero on fire.

use crate::actor::{AnimationClock, Health, MoveSpeed};
use crate::actor::TargetSnapshot;
use crate::config::BalanceConfig;
use crate::enemy::PatrolRoute;
use crate::geometry::{safe_normalize, Facing};
use crate::projectile::{self, Faction};
use bevy::prelude::*;

// ── Archetypes and tuning ─────────────────────────────────────────────────────

/// The five boss behaviour templates.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossArchetype {
    /// Melee/ranged hybrid: chases until close, then fires on an interval.
    Brute,
    /// Ranged at distance, closes to periodic contact damage up close.
    Warden,
    /// Patrol/chase/shoot ladder with a sticky aggro lock when damaged.
    Stalker,
    /// Three-tier idle/walk/attack with a fixed collision box.
    Sentinel,
    /// Same shape as Sentinel with heavier per-instance tuning.
    Colossus,
}

/// Per-archetype tuning constants.  One row of the balance table; every
/// field is a snapshot input for spawn-time difficulty scaling.
#[derive(Debug, Clone, Copy)]
pub struct BossTuning {
    pub base_hp: i32,
    pub move_speed: f32,
    /// Seconds between shots while in the Attack phase.
    pub fire_interval: f32,
    pub projectile_speed: f32,
    pub projectile_damage: i32,
    pub projectile_range: f32,
    /// Attack threshold: Brute/Sentinel/Colossus attack at or under this
    /// distance; the Warden goes ranged at or *beyond* it.
    pub attack_range: f32,
    /// Stalker only: chase at or under this distance.
    pub chase_range: f32,
    /// Sentinel/Colossus only: idle beyond this distance.
    pub idle_range: f32,
    /// Damage per melee contact application (Warden).
    pub contact_damage: i32,
    /// Cooldown between melee contact applications (Warden).
    pub melee_cooldown: f32,
    /// Sprite frame size; the default collision box source.
    pub frame_size: f32,
    /// Fixed collision box overriding the frame-derived one.
    pub fixed_bounds: Option<Vec2>,
    /// Animation track lengths; the three tiers animate independently.
    pub idle_frames: usize,
    pub walk_frames: usize,
    pub attack_frames: usize,
    /// Experience granted to the player exactly once on death.
    pub xp_reward: u32,
}

impl BossArchetype {
    pub fn label(self) -> &'static str {
        match self {
            BossArchetype::Brute => "BRUTE",
            BossArchetype::Warden => "WARDEN",
            BossArchetype::Stalker => "STALKER",
            BossArchetype::Sentinel => "SENTINEL",
            BossArchetype::Colossus => "COLOSSUS",
        }
    }

    /// The archetype's row of the balance table.
    pub fn tuning(self) -> BossTuning {
        match self {
            BossArchetype::Brute => BossTuning {
                base_hp: 400,
                move_speed: 110.0,
                fire_interval: 0.9,
                projectile_speed: 320.0,
                projectile_damage: 12,
                projectile_range: 420.0,
                attack_range: 200.0,
                chase_range: 0.0,
                idle_range: 0.0,
                contact_damage: 0,
                melee_cooldown: 0.0,
                frame_size: 64.0,
                fixed_bounds: None,
                idle_frames: 4,
                walk_frames: 6,
                attack_frames: 4,
                xp_reward: 100,
            },
            BossArchetype::Warden => BossTuning {
                base_hp: 500,
                move_speed: 95.0,
                fire_interval: 1.4,
                projectile_speed: 300.0,
                projectile_damage: 15,
                projectile_range: 480.0,
                attack_range: 250.0,
                chase_range: 0.0,
                idle_range: 0.0,
                contact_damage: 18,
                melee_cooldown: 1.2,
                frame_size: 72.0,
                fixed_bounds: None,
                idle_frames: 4,
                walk_frames: 6,
                attack_frames: 5,
                xp_reward: 150,
            },
            BossArchetype::Stalker => BossTuning {
                base_hp: 350,
                move_speed: 130.0,
                fire_interval: 1.1,
                projectile_speed: 360.0,
                projectile_damage: 10,
                projectile_range: 360.0,
                attack_range: 180.0,
                chase_range: 320.0,
                idle_range: 0.0,
                contact_damage: 0,
                melee_cooldown: 0.0,
                frame_size: 56.0,
                fixed_bounds: None,
                idle_frames: 4,
                walk_frames: 6,
                attack_frames: 6,
                xp_reward: 120,
            },
            BossArchetype::Sentinel => BossTuning {
                base_hp: 600,
                move_speed: 70.0,
                fire_interval: 1.6,
                projectile_speed: 280.0,
                projectile_damage: 20,
                projectile_range: 520.0,
                attack_range: 150.0,
                chase_range: 0.0,
                idle_range: 300.0,
                contact_damage: 0,
                melee_cooldown: 0.0,
                frame_size: 112.0,
                fixed_bounds: Some(Vec2::new(88.0, 88.0)),
                idle_frames: 4,
                walk_frames: 6,
                attack_frames: 8,
                xp_reward: 200,
            },
            BossArchetype::Colossus => BossTuning {
                base_hp: 800,
                move_speed: 50.0,
                fire_interval: 2.2,
                projectile_speed: 240.0,
                projectile_damage: 28,
                projectile_range: 560.0,
                attack_range: 150.0,
                chase_range: 0.0,
                idle_range: 300.0,
                contact_damage: 0,
                melee_cooldown: 0.0,
                frame_size: 128.0,
                fixed_bounds: Some(Vec2::new(104.0, 104.0)),
                idle_frames: 6,
                walk_frames: 8,
                attack_frames: 5,
                xp_reward: 300,
            },
        }
    }
}

// ── Phases ────────────────────────────────────────────────────────────────────

/// Shared phase set; each archetype uses a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    Idle,
    Patrol,
    Walking,
    Chase,
    Attack,
    Melee,
    Dead,
}

/// Pure phase selection from scalar distance.  `aggro_locked` only affects
/// the Stalker, which attacks its remembered position regardless of the live
/// distance until one shot completes.
pub fn select_phase(archetype: BossArchetype, distance: f32, aggro_locked: bool) -> BossPhase {
    let tuning = archetype.tuning();
    match archetype {
        BossArchetype::Brute => {
            if distance > tuning.attack_range {
                BossPhase::Walking
            } else {
                BossPhase::Attack
            }
        }
        BossArchetype::Warden => {
            if distance >= tuning.attack_range {
                BossPhase::Attack
            } else {
                BossPhase::Melee
            }
        }
        BossArchetype::Stalker => {
            if aggro_locked {
                BossPhase::Attack
            } else if distance <= tuning.attack_range {
                BossPhase::Attack
            } else if distance <= tuning.chase_range {
                BossPhase::Chase
            } else {
                BossPhase::Patrol
            }
        }
        BossArchetype::Sentinel | BossArchetype::Colossus => {
            if distance > tuning.idle_range {
                BossPhase::Idle
            } else if distance > tuning.attack_range {
                BossPhase::Walking
            } else {
                BossPhase::Attack
            }
        }
    }
}

/// Animation track length for a phase.
fn frames_for(tuning: &BossTuning, phase: BossPhase) -> usize {
    match phase {
        BossPhase::Idle | BossPhase::Patrol => tuning.idle_frames,
        BossPhase::Walking | BossPhase::Chase => tuning.walk_frames,
        BossPhase::Attack | BossPhase::Melee => tuning.attack_frames,
        BossPhase::Dead => 1,
    }
}

/// Whether a phase transition re-arms the Warden's melee cooldown.
///
/// Leaving contact range resets the cooldown, so closing back in never
/// grants an instant hit.
#[inline]
pub fn melee_cooldown_rearms(previous: BossPhase, next: BossPhase) -> bool {
    previous == BossPhase::Melee && next == BossPhase::Attack
}

// ── Boss component ────────────────────────────────────────────────────────────

/// Mutable boss controller state.
///
/// Damage values are snapshots of the difficulty profile taken at spawn
/// time; later profile changes do not touch a live boss.
#[derive(Component, Debug, Clone)]
pub struct Boss {
    pub archetype: BossArchetype,
    pub phase: BossPhase,
    /// Time since the last shot; compared against the fire interval.
    pub fire_timer: f32,
    /// Remaining melee cooldown; only meaningful for the Warden.
    pub melee_timer: f32,
    /// Remembered target position captured when damaged (Stalker only).
    /// Overrides live targeting until one attack completes.
    pub aggro: Option<Vec2>,
    /// Projectile damage after difficulty scaling.
    pub projectile_damage: i32,
    /// Melee contact damage after difficulty scaling.
    pub contact_damage: i32,
    /// Experience granted on death.
    pub xp_reward: u32,
    /// Guard so the reward is applied exactly once even if the boss stays
    /// dead in the world for additional ticks.
    pub xp_rewarded: bool,
}

impl Boss {
    /// Build controller state for `archetype` with damage snapshots already
    /// scaled by the caller.
    pub fn new(archetype: BossArchetype, projectile_damage: i32, contact_damage: i32) -> Self {
        let tuning = archetype.tuning();
        Self {
            archetype,
            phase: BossPhase::Idle,
            // Start ready to fire; the interval gates repeats, not the opener.
            fire_timer: tuning.fire_interval,
            melee_timer: tuning.melee_cooldown,
            aggro: None,
            projectile_damage,
            contact_damage,
            xp_reward: tuning.xp_reward,
            xp_rewarded: false,
        }
    }

    /// Record the remembered target position on taking damage.  Only the
    /// Stalker archetype keeps a lock; others ignore the hint.
    pub fn record_aggro(&mut self, position: Vec2) {
        if self.archetype == BossArchetype::Stalker {
            self.aggro = Some(position);
        }
    }
}

// ── Behaviour system ──────────────────────────────────────────────────────────

/// Advance every boss one tick: re-evaluate the phase, then move, fire, and
/// animate accordingly.
pub fn boss_behavior_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<BalanceConfig>,
    target: Res<TargetSnapshot>,
    mut q: Query<(
        &mut Boss,
        &mut Transform,
        &mut Facing,
        &mut AnimationClock,
        &MoveSpeed,
        &Health,
        Option<&PatrolRoute>,
    )>,
) {
    let dt = time.delta_secs();
    let field = config.playfield();

    for (mut boss, mut transform, mut facing, mut clock, speed, health, route) in q.iter_mut() {
        let tuning = boss.archetype.tuning();
        let pos = transform.translation.truncate();

        // Phase re-evaluation comes first, before animation and firing.
        let previous = boss.phase;
        let next = if health.is_dead() {
            BossPhase::Dead
        } else {
            let distance = pos.distance(target.0);
            select_phase(boss.archetype, distance, boss.aggro.is_some())
        };
        if next != previous {
            boss.phase = next;
            clock.reset_track(frames_for(&tuning, next));
            if melee_cooldown_rearms(previous, next) {
                boss.melee_timer = tuning.melee_cooldown;
            }
        }
        if boss.phase == BossPhase::Dead {
            continue;
        }

        // Accumulators tick regardless of phase.
        boss.fire_timer += dt;

        // The remembered position (when locked) overrides live targeting for
        // both movement and aim.
        let aim_point = boss.aggro.unwrap_or(target.0);

        match boss.phase {
            BossPhase::Walking | BossPhase::Chase => {
                let dir = safe_normalize(aim_point - pos);
                let next_pos = (pos + dir * speed.0 * dt)
                    .clamp(field.min + Vec2::splat(8.0), field.max - Vec2::splat(8.0));
                transform.translation = next_pos.extend(transform.translation.z);
                if let Some(new_facing) = Facing::from_vector(dir) {
                    *facing = new_facing;
                }
            }
            BossPhase::Patrol => {
                // Stalker off-aggro wandering: same deterministic bounce as a
                // generic enemy.
                if !matches!(*facing, Facing::East | Facing::West) {
                    *facing = Facing::East;
                }
                let (min_x, max_x) = route
                    .map(|r| (r.min_x, r.max_x))
                    .unwrap_or((field.min.x + 16.0, field.max.x - 16.0));
                let mut x = transform.translation.x + facing.to_vector().x * speed.0 * dt;
                if x <= min_x {
                    x = min_x;
                    *facing = facing.flipped_horizontal();
                } else if x >= max_x {
                    x = max_x;
                    *facing = facing.flipped_horizontal();
                }
                transform.translation.x = x;
            }
            BossPhase::Attack => {
                let offset = aim_point - pos;
                let aim = safe_normalize(offset);
                if let Some(new_facing) = Facing::from_vector(offset) {
                    *facing = new_facing;
                }
                if boss.aggro.is_some() && offset.length() > tuning.projectile_range {
                    // A locked point beyond shot range is approached first;
                    // the shot (and the lock release) waits until it can
                    // land.
                    let next_pos = (pos + aim * speed.0 * dt)
                        .clamp(field.min + Vec2::splat(8.0), field.max - Vec2::splat(8.0));
                    transform.translation = next_pos.extend(transform.translation.z);
                } else if boss.fire_timer >= tuning.fire_interval {
                    boss.fire_timer = 0.0;
                    let origin = pos + aim * (tuning.frame_size * 0.5 + 4.0);
                    projectile::fire(
                        &mut commands,
                        Faction::Hostile,
                        origin,
                        aim,
                        tuning.projectile_speed,
                        boss.projectile_damage,
                        tuning.projectile_range,
                    );
                    // One attack completed: the Stalker's lock re-arms and
                    // normal distance logic resumes next tick.
                    boss.aggro = None;
                }
            }
            BossPhase::Melee | BossPhase::Idle => {
                // Contact damage is the resolver's job; idle just stands.
            }
            BossPhase::Dead => unreachable!("dead bosses skip the action step"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_walks_beyond_200_and_attacks_at_200() {
        assert_eq!(select_phase(BossArchetype::Brute, 200.1, false), BossPhase::Walking);
        assert_eq!(select_phase(BossArchetype::Brute, 200.0, false), BossPhase::Attack);
        assert_eq!(select_phase(BossArchetype::Brute, 10.0, false), BossPhase::Attack);
    }

    #[test]
    fn warden_goes_ranged_at_exactly_250() {
        assert_eq!(select_phase(BossArchetype::Warden, 250.0, false), BossPhase::Attack);
        assert_eq!(select_phase(BossArchetype::Warden, 249.9, false), BossPhase::Melee);
    }

    #[test]
    fn stalker_ladder_without_lock() {
        assert_eq!(select_phase(BossArchetype::Stalker, 180.0, false), BossPhase::Attack);
        assert_eq!(select_phase(BossArchetype::Stalker, 180.1, false), BossPhase::Chase);
        assert_eq!(select_phase(BossArchetype::Stalker, 320.0, false), BossPhase::Chase);
        assert_eq!(select_phase(BossArchetype::Stalker, 320.1, false), BossPhase::Patrol);
    }

    #[test]
    fn stalker_lock_forces_attack_at_any_distance() {
        assert_eq!(select_phase(BossArchetype::Stalker, 9999.0, true), BossPhase::Attack);
    }

    #[test]
    fn sentinel_thresholds_hold_at_boundaries() {
        assert_eq!(select_phase(BossArchetype::Sentinel, 301.0, false), BossPhase::Idle);
        assert_eq!(select_phase(BossArchetype::Sentinel, 300.0, false), BossPhase::Walking);
        assert_eq!(select_phase(BossArchetype::Sentinel, 151.0, false), BossPhase::Walking);
        assert_eq!(select_phase(BossArchetype::Sentinel, 150.0, false), BossPhase::Attack);
    }

    #[test]
    fn colossus_shares_sentinel_thresholds() {
        for distance in [301.0, 300.0, 151.0, 150.0] {
            assert_eq!(
                select_phase(BossArchetype::Colossus, distance, false),
                select_phase(BossArchetype::Sentinel, distance, false),
            );
        }
    }

    #[test]
    fn melee_cooldown_rearms_only_on_melee_to_ranged() {
        assert!(melee_cooldown_rearms(BossPhase::Melee, BossPhase::Attack));
        assert!(!melee_cooldown_rearms(BossPhase::Attack, BossPhase::Melee));
        assert!(!melee_cooldown_rearms(BossPhase::Walking, BossPhase::Attack));
    }

    #[test]
    fn only_stalker_records_aggro() {
        let mut stalker = Boss::new(BossArchetype::Stalker, 10, 0);
        stalker.record_aggro(Vec2::new(5.0, 5.0));
        assert_eq!(stalker.aggro, Some(Vec2::new(5.0, 5.0)));

        let mut brute = Boss::new(BossArchetype::Brute, 12, 0);
        brute.record_aggro(Vec2::new(5.0, 5.0));
        assert_eq!(brute.aggro, None);
    }

    #[test]
    fn fresh_boss_opens_fire_without_waiting() {
        let boss = Boss::new(BossArchetype::Brute, 12, 0);
        let tuning = boss.archetype.tuning();
        assert!(boss.fire_timer >= tuning.fire_interval);
    }
}
