//! Shared actor components and the player's systems.
//!
//! Every combatant (player, enemy, boss) is an entity carrying the shared
//! components defined here: [`Health`], [`MoveSpeed`], a collision frame, and
//! an [`AnimationClock`].  Cross-actor effects never happen in behaviour
//! systems; damage flows exclusively through [`crate::combat`].
//!
//! The player is driven by [`PlayerIntent`], an aggregated per-tick intent
//! resource.  Input systems write it each frame; tests and scripted scenarios
//! populate it directly to drive the player without a real input device.

use crate::config::BalanceConfig;
use crate::geometry::{Aabb, Facing};
use crate::projectile::{self, Faction};
use crate::stats::SessionStats;
use crate::state::GameState;
use bevy::prelude::*;

// ── Shared components ─────────────────────────────────────────────────────────

/// Integer hit points, clamped at zero.
///
/// Once `current` reaches zero the actor is dead: further damage is a no-op,
/// behaviour and bounds updates stop, and the actor stays inert (but
/// drawable) until the resolver reaps it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Apply `amount` damage, clamping at zero.  Returns `true` only on the
    /// transition into death, so death effects fire exactly once.  Damage to
    /// an already-dead actor is a no-op.
    pub fn damage(&mut self, amount: i32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.current = (self.current - amount).max(0);
        self.is_dead()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    /// Restore to full; used on player respawn.
    #[inline]
    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

/// Movement speed in units/second, snapshotted from the difficulty profile at
/// spawn time.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveSpeed(pub f32);

/// Full width/height of the actor's sprite frame; the default source for its
/// collision bounds.
#[derive(Component, Debug, Clone, Copy)]
pub struct FrameSize(pub Vec2);

/// Fixed-size collision box override.  When present, bounds use this size
/// instead of the sprite frame (used by the large boss archetypes whose
/// sprite sheets overdraw their real silhouette).
#[derive(Component, Debug, Clone, Copy)]
pub struct FixedBounds(pub Vec2);

/// Current world-space AABB used for every collision test this tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct CollisionBounds(pub Aabb);

/// Frame-selection clock, independent of movement.
///
/// `frame_count` is the length of the active animation track; bosses swap it
/// when their phase changes.
#[derive(Component, Debug, Clone)]
pub struct AnimationClock {
    pub timer: f32,
    pub frame: usize,
    pub frame_count: usize,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self {
            timer: 0.0,
            frame: 0,
            frame_count: 4,
        }
    }
}

impl AnimationClock {
    /// Advance the clock by `dt`, wrapping the frame index.
    pub fn advance(&mut self, dt: f32, frame_time: f32) {
        self.timer += dt;
        while self.timer >= frame_time && frame_time > 0.0 {
            self.timer -= frame_time;
            self.frame = (self.frame + 1) % self.frame_count.max(1);
        }
    }

    /// Switch to a track of `frame_count` frames, restarting from frame 0.
    pub fn reset_track(&mut self, frame_count: usize) {
        self.timer = 0.0;
        self.frame = 0;
        self.frame_count = frame_count.max(1);
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Aggregated player intent for the current frame.
///
/// The keyboard system writes this each frame when an input device is
/// present; tests and scripted scenarios populate it directly.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PlayerIntent {
    /// Desired movement direction; normalised before use, zero means idle.
    pub move_dir: Vec2,
    /// Fire request for this tick.
    pub fire: bool,
}

/// Enforces a minimum interval between consecutive player shots.
#[derive(Resource, Default)]
pub struct PlayerFireCooldown {
    /// Remaining cooldown in seconds; decremented each frame, clamped to 0.
    pub timer: f32,
}

/// Lives remaining and the pending respawn countdown.
///
/// `respawn_timer` is `Some(t)` while the player is dead and waiting to
/// respawn; `None` while alive.  Reaching zero lives ends the session.
#[derive(Resource, Debug, Clone)]
pub struct PlayerLives {
    pub remaining: i32,
    pub respawn_timer: Option<f32>,
}

impl Default for PlayerLives {
    fn default() -> Self {
        Self {
            remaining: crate::constants::PLAYER_LIVES,
            respawn_timer: None,
        }
    }
}

/// Experience accumulated from boss kills.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PlayerExperience {
    pub total: u32,
}

/// Player position sampled once at tick start.
///
/// Every enemy and boss aims and measures distance against this snapshot, so
/// actor iteration order cannot produce order-dependent aiming within a tick.
#[derive(Resource, Debug, Clone, Copy)]
pub struct TargetSnapshot(pub Vec2);

impl Default for TargetSnapshot {
    fn default() -> Self {
        Self(Vec2::ZERO)
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Startup system: spawn the player at map centre and bank the configured
/// number of lives.
pub fn spawn_player(
    mut commands: Commands,
    config: Res<BalanceConfig>,
    mut lives: ResMut<PlayerLives>,
) {
    lives.remaining = config.player_lives;
    let frame = Vec2::splat(config.player_frame_size);
    commands.spawn((
        Player,
        Health::new(config.player_max_hp),
        MoveSpeed(config.player_move_speed),
        Facing::default(),
        FrameSize(frame),
        CollisionBounds(Aabb::from_center_size(config.map_center(), frame)),
        AnimationClock::default(),
        Transform::from_translation(config.map_center().extend(0.5)),
    ));
}

/// Sample the player position into [`TargetSnapshot`] at tick start.
///
/// A dead (not yet respawned) player still provides its last position, so
/// bosses keep converging on the corpse rather than snapping to the origin.
pub fn sample_target_system(
    q_player: Query<&Transform, With<Player>>,
    mut snapshot: ResMut<TargetSnapshot>,
) {
    if let Ok(transform) = q_player.single() {
        snapshot.0 = transform.translation.truncate();
    }
}

/// Translate keyboard state into [`PlayerIntent`].
///
/// Gated on the `ButtonInput` resource existing, so headless tests that drive
/// the intent directly are never overwritten.
pub fn player_intent_input_system(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<PlayerIntent>) {
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    intent.move_dir = dir;
    intent.fire = keys.pressed(KeyCode::Space);
}

/// Apply movement intent: translate, clamp to the playfield, update facing.
pub fn player_move_system(
    time: Res<Time>,
    intent: Res<PlayerIntent>,
    config: Res<BalanceConfig>,
    mut q_player: Query<(&mut Transform, &mut Facing, &MoveSpeed, &Health), With<Player>>,
) {
    let Ok((mut transform, mut facing, speed, health)) = q_player.single_mut() else {
        return;
    };
    if health.is_dead() {
        return;
    }
    let dir = intent.move_dir;
    if dir.length_squared() <= 1e-6 {
        return;
    }
    let step = dir.normalize() * speed.0 * time.delta_secs();
    let field = config.playfield();
    let next = (transform.translation.truncate() + step)
        .clamp(field.min + Vec2::splat(8.0), field.max - Vec2::splat(8.0));
    transform.translation = next.extend(transform.translation.z);
    if let Some(new_facing) = Facing::from_vector(dir) {
        *facing = new_facing;
    }
}

/// Fire a player projectile along the current facing when requested and off
/// cooldown.  Counts every shot into the session statistics.
pub fn player_fire_system(
    mut commands: Commands,
    time: Res<Time>,
    intent: Res<PlayerIntent>,
    config: Res<BalanceConfig>,
    mut cooldown: ResMut<PlayerFireCooldown>,
    mut stats: ResMut<SessionStats>,
    q_player: Query<(&Transform, &Facing, &Health), With<Player>>,
) {
    cooldown.timer = (cooldown.timer - time.delta_secs()).max(0.0);

    let Ok((transform, facing, health)) = q_player.single() else {
        return;
    };
    if health.is_dead() || !intent.fire || cooldown.timer > 0.0 {
        return;
    }
    cooldown.timer = config.player_fire_cooldown;

    let dir = facing.to_vector();
    let origin = transform.translation.truncate() + dir * (config.player_frame_size * 0.5 + 4.0);
    projectile::fire(
        &mut commands,
        Faction::Player,
        origin,
        dir,
        config.player_projectile_speed,
        config.player_projectile_damage,
        config.player_projectile_range,
    );
    stats.shots_fired += 1;
}

/// Advance every living actor's animation clock.
pub fn animation_clock_system(
    time: Res<Time>,
    config: Res<BalanceConfig>,
    mut q: Query<(&mut AnimationClock, &Health)>,
) {
    let dt = time.delta_secs();
    for (mut clock, health) in q.iter_mut() {
        if health.is_dead() {
            continue;
        }
        clock.advance(dt, config.animation_frame_time);
    }
}

/// Refresh collision bounds from position and frame size.
///
/// A [`FixedBounds`] component overrides the frame-derived size.  Dead actors
/// keep their last bounds; nothing collides with them again anyway.
pub fn update_bounds_system(
    mut q: Query<(
        &Transform,
        &FrameSize,
        Option<&FixedBounds>,
        &Health,
        &mut CollisionBounds,
    )>,
) {
    for (transform, frame, fixed, health, mut bounds) in q.iter_mut() {
        if health.is_dead() {
            continue;
        }
        let size = fixed.map(|f| f.0).unwrap_or(frame.0);
        bounds.0 = Aabb::from_center_size(transform.translation.truncate(), size);
    }
}

/// Detect player death, spend a life, and arm the respawn countdown.
///
/// Runs in the reap phase so the death is observed the same tick the fatal
/// damage was applied.  Zero lives ends the session.
pub fn player_death_system(
    config: Res<BalanceConfig>,
    mut lives: ResMut<PlayerLives>,
    mut stats: ResMut<SessionStats>,
    mut next_state: ResMut<NextState<GameState>>,
    q_player: Query<&Health, With<Player>>,
) {
    let Ok(health) = q_player.single() else {
        return;
    };
    if !health.is_dead() || lives.respawn_timer.is_some() {
        return;
    }
    lives.remaining -= 1;
    stats.deaths += 1;
    stats.lives_lost += 1;
    if lives.remaining <= 0 {
        info!("Out of lives; ending session");
        next_state.set(GameState::GameOver);
    } else {
        lives.respawn_timer = Some(config.player_respawn_delay);
        info!("Player down; {} lives remaining", lives.remaining);
    }
}

/// Count down the respawn timer and restore the player at map centre.
pub fn player_respawn_system(
    time: Res<Time>,
    config: Res<BalanceConfig>,
    mut lives: ResMut<PlayerLives>,
    mut q_player: Query<(&mut Transform, &mut Health), With<Player>>,
) {
    let Some(timer) = lives.respawn_timer.as_mut() else {
        return;
    };
    *timer -= time.delta_secs();
    if *timer > 0.0 {
        return;
    }
    lives.respawn_timer = None;
    if let Ok((mut transform, mut health)) = q_player.single_mut() {
        transform.translation = config.map_center().extend(transform.translation.z);
        health.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_subtracts_and_clamps_at_zero() {
        let mut health = Health::new(50);
        assert!(!health.damage(20));
        assert_eq!(health.current, 30);
        assert!(health.damage(45), "lethal hit must report the death transition");
        assert_eq!(health.current, 0);
    }

    #[test]
    fn damage_to_dead_actor_is_a_no_op() {
        let mut health = Health::new(10);
        assert!(health.damage(10));
        assert!(!health.damage(99), "second lethal hit must not re-trigger death");
        assert_eq!(health.current, 0);
    }

    #[test]
    fn death_iff_health_reaches_zero() {
        let mut health = Health::new(2);
        health.damage(1);
        assert!(!health.is_dead());
        health.damage(1);
        assert!(health.is_dead());
    }

    #[test]
    fn animation_clock_wraps_frames() {
        let mut clock = AnimationClock {
            timer: 0.0,
            frame: 0,
            frame_count: 3,
        };
        clock.advance(0.25, 0.1);
        assert_eq!(clock.frame, 2);
        clock.advance(0.1, 0.1);
        assert_eq!(clock.frame, 0, "frame index must wrap at frame_count");
    }

    #[test]
    fn reset_track_restarts_from_frame_zero() {
        let mut clock = AnimationClock::default();
        clock.advance(0.5, 0.1);
        clock.reset_track(6);
        assert_eq!(clock.frame, 0);
        assert_eq!(clock.frame_count, 6);
    }
}
