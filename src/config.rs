//! Runtime balance configuration loaded from `assets/balance.toml`.
//!
//! [`BalanceConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_balance_config`] reads
//! `assets/balance.toml` and overwrites the defaults with any values present
//! in the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<BalanceConfig>` to any system parameter list and read
//! values with `config.player_fire_cooldown`, `config.playfield_width`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `BalanceConfig::default()`.

use crate::constants::*;
use crate::error::{validate_interval, validate_playfield_dimension};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable balance configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/balance.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    // ── Playfield ────────────────────────────────────────────────────────────
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub spawn_margin: f32,

    // ── Player ───────────────────────────────────────────────────────────────
    pub player_max_hp: i32,
    pub player_move_speed: f32,
    pub player_projectile_damage: i32,
    pub player_projectile_speed: f32,
    pub player_projectile_range: f32,
    pub player_fire_cooldown: f32,
    pub player_frame_size: f32,
    pub player_lives: i32,
    pub player_respawn_delay: f32,

    // ── Enemies ──────────────────────────────────────────────────────────────
    pub enemy_base_hp: i32,
    pub enemy_base_speed: f32,
    pub enemy_frame_size: f32,
    pub enemy_patrol_span: f32,

    // ── Encounter director ───────────────────────────────────────────────────
    pub min_live_enemies: usize,
    pub enemy_respawn_interval: f32,
    pub boss_kill_threshold: u32,

    // ── Animation ────────────────────────────────────────────────────────────
    pub animation_frame_time: f32,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            // Playfield
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            spawn_margin: SPAWN_MARGIN,
            // Player
            player_max_hp: PLAYER_MAX_HP,
            player_move_speed: PLAYER_MOVE_SPEED,
            player_projectile_damage: PLAYER_PROJECTILE_DAMAGE,
            player_projectile_speed: PLAYER_PROJECTILE_SPEED,
            player_projectile_range: PLAYER_PROJECTILE_RANGE,
            player_fire_cooldown: PLAYER_FIRE_COOLDOWN,
            player_frame_size: PLAYER_FRAME_SIZE,
            player_lives: PLAYER_LIVES,
            player_respawn_delay: PLAYER_RESPAWN_DELAY,
            // Enemies
            enemy_base_hp: ENEMY_BASE_HP,
            enemy_base_speed: ENEMY_BASE_SPEED,
            enemy_frame_size: ENEMY_FRAME_SIZE,
            enemy_patrol_span: ENEMY_PATROL_SPAN,
            // Encounter director
            min_live_enemies: MIN_LIVE_ENEMIES,
            enemy_respawn_interval: ENEMY_RESPAWN_INTERVAL,
            boss_kill_threshold: BOSS_KILL_THRESHOLD,
            // Animation
            animation_frame_time: ANIMATION_FRAME_TIME,
        }
    }
}

impl BalanceConfig {
    /// Centre of the playfield; player spawn and boss spawn point.
    #[inline]
    pub fn map_center(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Playfield rectangle centred on the origin.
    #[inline]
    pub fn playfield(&self) -> crate::geometry::Aabb {
        crate::geometry::Aabb::from_center_size(
            Vec2::ZERO,
            Vec2::new(self.playfield_width, self.playfield_height),
        )
    }
}

/// Startup system: attempt to load `assets/balance.toml` and overwrite the
/// `BalanceConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the simulation.  A missing file is silently ignored
/// (defaults are already in place from `insert_resource`).
pub fn load_balance_config(mut config: ResMut<BalanceConfig>) {
    let path = "assets/balance.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<BalanceConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded balance config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present; defaults are already in place, not an error.
            info!("No {path} found; using compiled defaults");
        }
    }

    // Out-of-range overrides are reported and reverted to the compiled default
    // rather than aborting the session.
    let defaults = BalanceConfig::default();
    if let Err(e) = validate_playfield_dimension("playfield_width", config.playfield_width) {
        warn!("{e}; reverting to default");
        config.playfield_width = defaults.playfield_width;
    }
    if let Err(e) = validate_playfield_dimension("playfield_height", config.playfield_height) {
        warn!("{e}; reverting to default");
        config.playfield_height = defaults.playfield_height;
    }
    if let Err(e) = validate_interval("player_fire_cooldown", config.player_fire_cooldown) {
        warn!("{e}; reverting to default");
        config.player_fire_cooldown = defaults.player_fire_cooldown;
    }
    if let Err(e) = validate_interval("enemy_respawn_interval", config.enemy_respawn_interval) {
        warn!("{e}; reverting to default");
        config.enemy_respawn_interval = defaults.enemy_respawn_interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = BalanceConfig::default();
        assert_eq!(config.player_max_hp, PLAYER_MAX_HP);
        assert_eq!(config.enemy_base_hp, ENEMY_BASE_HP);
        assert_eq!(config.boss_kill_threshold, BOSS_KILL_THRESHOLD);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config: BalanceConfig = toml::from_str("enemy_base_hp = 75\n").unwrap();
        assert_eq!(config.enemy_base_hp, 75);
        assert_eq!(config.player_max_hp, PLAYER_MAX_HP);
    }
}
