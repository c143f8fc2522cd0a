//! Centralised balance and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::BalanceConfig`] mirrors every constant and can override
//! any subset at runtime from `assets/balance.toml`.
//!
//! Boss archetype tuning is the exception: the per-archetype constant tables
//! live next to the state machines in [`crate::boss`].

// ── Playfield ─────────────────────────────────────────────────────────────────

/// Width of the playfield (world units).  Projectiles deactivate and patrol
/// routes flip at the edges.
pub const PLAYFIELD_WIDTH: f32 = 1280.0;

/// Height of the playfield (world units).
pub const PLAYFIELD_HEIGHT: f32 = 720.0;

/// Margin kept clear between the playfield edge and random spawn positions,
/// so freshly spawned actors never start partially out of bounds.
pub const SPAWN_MARGIN: f32 = 64.0;

// ── Player ────────────────────────────────────────────────────────────────────

/// Player hit points at full health.
pub const PLAYER_MAX_HP: i32 = 100;

/// Player movement speed (units/second).
pub const PLAYER_MOVE_SPEED: f32 = 220.0;

/// Damage dealt by one player projectile.
pub const PLAYER_PROJECTILE_DAMAGE: i32 = 50;

/// Player projectile speed (units/second).
pub const PLAYER_PROJECTILE_SPEED: f32 = 480.0;

/// Maximum distance a player projectile travels from its spawn point before
/// deactivating.  Strictly-greater comparison: a projectile exactly at this
/// displacement is still live.
pub const PLAYER_PROJECTILE_RANGE: f32 = 560.0;

/// Minimum interval between consecutive player shots (seconds).
pub const PLAYER_FIRE_COOLDOWN: f32 = 0.25;

/// Side length of the player collision frame (units).
pub const PLAYER_FRAME_SIZE: f32 = 48.0;

/// Lives the player starts a session with.
pub const PLAYER_LIVES: i32 = 3;

/// Delay between player death and respawn at map centre (seconds).
pub const PLAYER_RESPAWN_DELAY: f32 = 2.0;

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Base hit points for a generic enemy before difficulty scaling.
pub const ENEMY_BASE_HP: i32 = 50;

/// Base patrol speed for a generic enemy (units/second).
pub const ENEMY_BASE_SPEED: f32 = 90.0;

/// Side length of the generic enemy collision frame (units).
pub const ENEMY_FRAME_SIZE: f32 = 48.0;

/// Half-width of an enemy's horizontal patrol route around its spawn point.
pub const ENEMY_PATROL_SPAN: f32 = 160.0;

// ── Encounter director ────────────────────────────────────────────────────────

/// Live-enemy floor: the director only respawns while fewer than this many
/// enemies are alive on the current map.
pub const MIN_LIVE_ENEMIES: usize = 2;

/// Base interval between enemy respawns (seconds).  Divided by the difficulty
/// profile's spawn-rate multiplier when the timer is armed.
pub const ENEMY_RESPAWN_INTERVAL: f32 = 3.0;

/// Map kill count at which the map's boss is spawned.  Triggers at most once
/// per map per session.
pub const BOSS_KILL_THRESHOLD: u32 = 10;

// ── Difficulty steps ──────────────────────────────────────────────────────────
//
// Multipliers are recomputed from the discrete level, so they always move in
// exactly these step sizes.  Level 1 is the 1.0 baseline for every multiplier.

/// Enemy/boss health multiplier gained per difficulty level above 1.
pub const DIFFICULTY_HEALTH_STEP: f32 = 0.2;

/// Enemy/boss speed multiplier gained per difficulty level above 1.
pub const DIFFICULTY_SPEED_STEP: f32 = 0.1;

/// Enemy/boss damage multiplier gained per difficulty level above 1.
pub const DIFFICULTY_DAMAGE_STEP: f32 = 0.15;

/// Spawn-rate multiplier gained per difficulty level above 1 (higher means
/// the director respawns faster).
pub const DIFFICULTY_SPAWN_RATE_STEP: f32 = 0.1;

/// Baseline enemy count at difficulty level 1; rises by one per level.
pub const DIFFICULTY_ENEMY_COUNT_BASE: u32 = 4;

// ── Animation ─────────────────────────────────────────────────────────────────

/// Seconds each animation frame is held before advancing to the next.
pub const ANIMATION_FRAME_TIME: f32 = 0.12;
