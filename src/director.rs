//! Encounter director: respawn policy and boss triggers, per map.
//!
//! The director is the only code that spawns actors during play.  It reads
//! the [`DifficultyProfile`] at the moment of each spawn; nothing already in
//! the world is ever rescaled.  Map topology (which maps link where) is an
//! external collaborator; the director only needs to know which map is
//! current and what that map's spawn profile and boss archetype are.

use crate::actor::{AnimationClock, CollisionBounds, FixedBounds, FrameSize, Health, MoveSpeed};
use crate::boss::{Boss, BossArchetype};
use crate::config::BalanceConfig;
use crate::difficulty::DifficultyProfile;
use crate::enemy::{Enemy, EnemyState, PatrolRoute};
use crate::error::SimError;
use crate::geometry::{Aabb, Facing};
use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;

// ── Maps ──────────────────────────────────────────────────────────────────────

/// The five linked maps.  Each carries exactly one boss archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapId {
    Ashgrove,
    Cinderfen,
    Duskmoor,
    Emberpeak,
    Hollowdeep,
}

impl MapId {
    pub fn label(self) -> &'static str {
        match self {
            MapId::Ashgrove => "ASHGROVE",
            MapId::Cinderfen => "CINDERFEN",
            MapId::Duskmoor => "DUSKMOOR",
            MapId::Emberpeak => "EMBERPEAK",
            MapId::Hollowdeep => "HOLLOWDEEP",
        }
    }

    /// The boss archetype fixed to this map.
    pub fn boss_archetype(self) -> BossArchetype {
        match self {
            MapId::Ashgrove => BossArchetype::Brute,
            MapId::Cinderfen => BossArchetype::Warden,
            MapId::Duskmoor => BossArchetype::Stalker,
            MapId::Emberpeak => BossArchetype::Sentinel,
            MapId::Hollowdeep => BossArchetype::Colossus,
        }
    }
}

/// The map the simulation is currently running.  Set by the external
/// transition-zone collaborator.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CurrentMap(pub MapId);

impl Default for CurrentMap {
    fn default() -> Self {
        Self(MapId::Ashgrove)
    }
}

/// Base stats for enemies spawned on one map, before difficulty scaling.
#[derive(Debug, Clone, Copy)]
pub struct EnemySpawnProfile {
    pub base_hp: i32,
    pub base_speed: f32,
    pub frame_size: f32,
    pub patrol_span: f32,
}

/// Per-map enemy spawn profiles.
///
/// A map missing from the catalog simply never respawns enemies; the
/// director logs the skip and carries on.
#[derive(Resource, Debug, Clone)]
pub struct MapCatalog {
    profiles: HashMap<MapId, EnemySpawnProfile>,
}

impl Default for MapCatalog {
    fn default() -> Self {
        Self::from_config(&BalanceConfig::default())
    }
}

impl MapCatalog {
    /// Build the per-map profiles from balance values.  Called again at
    /// startup once the TOML overrides are loaded, so `enemy_base_hp` and
    /// friends in `assets/balance.toml` reach every later spawn.
    pub fn from_config(config: &BalanceConfig) -> Self {
        let base = EnemySpawnProfile {
            base_hp: config.enemy_base_hp,
            base_speed: config.enemy_base_speed,
            frame_size: config.enemy_frame_size,
            patrol_span: config.enemy_patrol_span,
        };
        let mut profiles = HashMap::new();
        profiles.insert(MapId::Ashgrove, base);
        profiles.insert(
            MapId::Cinderfen,
            EnemySpawnProfile {
                base_hp: base.base_hp + 10,
                ..base
            },
        );
        profiles.insert(
            MapId::Duskmoor,
            EnemySpawnProfile {
                base_speed: base.base_speed + 20.0,
                ..base
            },
        );
        profiles.insert(
            MapId::Emberpeak,
            EnemySpawnProfile {
                base_hp: base.base_hp + 25,
                ..base
            },
        );
        profiles.insert(
            MapId::Hollowdeep,
            EnemySpawnProfile {
                base_hp: base.base_hp + 40,
                base_speed: base.base_speed + 10.0,
                ..base
            },
        );
        Self { profiles }
    }

    pub fn profile(&self, map: MapId) -> Option<EnemySpawnProfile> {
        self.profiles.get(&map).copied()
    }

    /// Remove a map's profile; used by scripted scenarios to silence the
    /// director on purpose.
    pub fn clear_profile(&mut self, map: MapId) {
        self.profiles.remove(&map);
    }
}

// ── Encounter state ───────────────────────────────────────────────────────────

/// Mutable per-map encounter bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct EncounterState {
    /// Enemies killed on this map this session.
    pub kills: u32,
    /// Bosses killed on this map this session.
    pub boss_kills: u32,
    /// Set permanently once the map's boss has spawned; a second boss never
    /// spawns on the same map in one session.
    pub boss_spawned: bool,
    /// Seconds accumulated toward the next respawn.
    pub respawn_timer: f32,
}

/// Encounter state for every map visited this session.
#[derive(Resource, Debug, Clone, Default)]
pub struct Encounters {
    states: HashMap<MapId, EncounterState>,
}

impl Encounters {
    pub fn state_mut(&mut self, map: MapId) -> &mut EncounterState {
        self.states.entry(map).or_default()
    }

    pub fn state(&self, map: MapId) -> Option<&EncounterState> {
        self.states.get(&map)
    }
}

// ── Spawn helpers ─────────────────────────────────────────────────────────────

/// Spawn one enemy with stats scaled by the difficulty snapshot taken now.
pub fn spawn_enemy(
    commands: &mut Commands,
    position: Vec2,
    facing: Facing,
    profile: EnemySpawnProfile,
    difficulty: &DifficultyProfile,
) -> Entity {
    let frame = Vec2::splat(profile.frame_size);
    commands
        .spawn((
            Enemy,
            EnemyState::Patrol,
            PatrolRoute {
                min_x: position.x - profile.patrol_span,
                max_x: position.x + profile.patrol_span,
            },
            Health::new(DifficultyProfile::scale_stat(
                profile.base_hp,
                difficulty.enemy_health_mult,
            )),
            MoveSpeed(profile.base_speed * difficulty.speed_mult),
            facing,
            FrameSize(frame),
            CollisionBounds(Aabb::from_center_size(position, frame)),
            AnimationClock::default(),
            Transform::from_translation(position.extend(0.3)),
        ))
        .id()
}

/// Spawn one boss with health and damage scaled by the difficulty snapshot
/// taken now.
pub fn spawn_boss(
    commands: &mut Commands,
    archetype: BossArchetype,
    position: Vec2,
    difficulty: &DifficultyProfile,
) -> Entity {
    let tuning = archetype.tuning();
    let frame = Vec2::splat(tuning.frame_size);
    let boss = Boss::new(
        archetype,
        DifficultyProfile::scale_stat(tuning.projectile_damage, difficulty.damage_mult),
        DifficultyProfile::scale_stat(tuning.contact_damage, difficulty.damage_mult),
    );
    let mut clock = AnimationClock::default();
    clock.reset_track(tuning.idle_frames);

    let entity = commands
        .spawn((
            boss,
            Health::new(DifficultyProfile::scale_stat(
                tuning.base_hp,
                difficulty.boss_health_mult,
            )),
            MoveSpeed(tuning.move_speed * difficulty.speed_mult),
            Facing::default(),
            FrameSize(frame),
            CollisionBounds(Aabb::from_center_size(position, frame)),
            clock,
            Transform::from_translation(position.extend(0.4)),
        ))
        .id();

    if let Some(size) = tuning.fixed_bounds {
        commands.entity(entity).insert(FixedBounds(size));
    }
    if archetype == BossArchetype::Stalker {
        commands.entity(entity).insert(PatrolRoute {
            min_x: position.x - 200.0,
            max_x: position.x + 200.0,
        });
    }
    entity
}

/// Random in-bounds spawn position, kept off the playfield edge.
fn random_spawn_position(config: &BalanceConfig) -> Vec2 {
    let mut rng = rand::thread_rng();
    let half_w = config.playfield_width * 0.5 - config.spawn_margin;
    let half_h = config.playfield_height * 0.5 - config.spawn_margin;
    Vec2::new(rng.gen_range(-half_w..half_w), rng.gen_range(-half_h..half_h))
}

fn random_facing() -> Facing {
    if rand::thread_rng().gen_bool(0.5) {
        Facing::East
    } else {
        Facing::West
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Startup system: rebuild the catalog from the loaded balance config.
///
/// The plugin initialises the catalog from compile-time defaults; this runs
/// after the config file is read so TOML overrides of the enemy base stats
/// take effect before the first spawn.
pub fn init_map_catalog(config: Res<BalanceConfig>, mut catalog: ResMut<MapCatalog>) {
    *catalog = MapCatalog::from_config(&config);
}

/// Startup system: seed the current map with the difficulty profile's
/// baseline enemy population.
pub fn populate_initial_enemies(
    mut commands: Commands,
    config: Res<BalanceConfig>,
    difficulty: Res<DifficultyProfile>,
    current_map: Res<CurrentMap>,
    catalog: Res<MapCatalog>,
) {
    let Some(profile) = catalog.profile(current_map.0) else {
        warn!(
            "{}",
            SimError::MissingSpawnProfile {
                map: current_map.0.label()
            }
        );
        return;
    };
    for _ in 0..difficulty.enemy_count {
        spawn_enemy(
            &mut commands,
            random_spawn_position(&config),
            random_facing(),
            profile,
            &difficulty,
        );
    }
    info!(
        "Seeded {} with {} enemies",
        current_map.0.label(),
        difficulty.enemy_count
    );
}

/// Respawn one enemy when the live count is below the floor and the cooldown
/// has elapsed.  The interval shrinks as the difficulty spawn-rate multiplier
/// grows.
pub fn enemy_respawn_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<BalanceConfig>,
    difficulty: Res<DifficultyProfile>,
    current_map: Res<CurrentMap>,
    catalog: Res<MapCatalog>,
    mut encounters: ResMut<Encounters>,
    q_enemies: Query<(), With<Enemy>>,
) {
    let state = encounters.state_mut(current_map.0);
    state.respawn_timer += time.delta_secs();

    if q_enemies.iter().count() >= config.min_live_enemies {
        return;
    }
    let interval = config.enemy_respawn_interval / difficulty.spawn_rate_mult;
    if state.respawn_timer < interval {
        return;
    }

    let Some(profile) = catalog.profile(current_map.0) else {
        // Not fatal: the map just never respawns until it gets a profile.
        warn!(
            "{}",
            SimError::MissingSpawnProfile {
                map: current_map.0.label()
            }
        );
        return;
    };

    spawn_enemy(
        &mut commands,
        random_spawn_position(&config),
        random_facing(),
        profile,
        &difficulty,
    );
    state.respawn_timer = 0.0;
}

/// Spawn the map's boss once the kill counter reaches the threshold.
///
/// Idempotent: the boss-spawned flag is set permanently for the session, so
/// reaching the threshold again never adds a second boss.
pub fn boss_trigger_system(
    mut commands: Commands,
    config: Res<BalanceConfig>,
    difficulty: Res<DifficultyProfile>,
    current_map: Res<CurrentMap>,
    mut encounters: ResMut<Encounters>,
) {
    let state = encounters.state_mut(current_map.0);
    if state.boss_spawned || state.kills < config.boss_kill_threshold {
        return;
    }
    state.boss_spawned = true;

    let archetype = current_map.0.boss_archetype();
    spawn_boss(&mut commands, archetype, config.map_center(), &difficulty);
    info!(
        "{} rises on {} after {} kills",
        archetype.label(),
        current_map.0.label(),
        state.kills
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_map_has_a_profile_and_a_boss() {
        let catalog = MapCatalog::default();
        for map in [
            MapId::Ashgrove,
            MapId::Cinderfen,
            MapId::Duskmoor,
            MapId::Emberpeak,
            MapId::Hollowdeep,
        ] {
            assert!(catalog.profile(map).is_some(), "{} missing profile", map.label());
            // Distinct archetypes per map; just confirm the lookup exists.
            let _ = map.boss_archetype();
        }
    }

    #[test]
    fn maps_cover_all_five_archetypes() {
        let mut archetypes: Vec<&'static str> = [
            MapId::Ashgrove,
            MapId::Cinderfen,
            MapId::Duskmoor,
            MapId::Emberpeak,
            MapId::Hollowdeep,
        ]
        .iter()
        .map(|m| m.boss_archetype().label())
        .collect();
        archetypes.sort_unstable();
        archetypes.dedup();
        assert_eq!(archetypes.len(), 5);
    }

    #[test]
    fn catalog_profiles_follow_config_overrides() {
        let config = BalanceConfig {
            enemy_base_hp: 75,
            enemy_base_speed: 120.0,
            ..Default::default()
        };
        let catalog = MapCatalog::from_config(&config);
        let ashgrove = catalog.profile(MapId::Ashgrove).unwrap();
        assert_eq!(ashgrove.base_hp, 75);
        assert_eq!(ashgrove.base_speed, 120.0);
        // Per-map variations stay relative to the overridden base.
        assert_eq!(catalog.profile(MapId::Hollowdeep).unwrap().base_hp, 115);
    }

    #[test]
    fn encounter_state_defaults_are_zeroed() {
        let mut encounters = Encounters::default();
        let state = encounters.state_mut(MapId::Ashgrove);
        assert_eq!(state.kills, 0);
        assert!(!state.boss_spawned);
    }
}
