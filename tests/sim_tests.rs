//! Headless end-to-end tests for the simulation schedule.
//!
//! These run the full [`SimulationPlugin`] under [`MinimalPlugins`] with a
//! manual fixed timestep, so every run advances in identical 1/60 s ticks.
//! The director is silenced (its map profile cleared) where a test needs
//! full control over which actors exist; the player entity always comes from
//! the real Startup path.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use emberfall::actor::{
    AnimationClock, CollisionBounds, FrameSize, Health, MoveSpeed, Player, PlayerExperience,
    PlayerIntent, PlayerLives,
};
use emberfall::boss::{Boss, BossArchetype, BossPhase};
use emberfall::config::BalanceConfig;
use emberfall::difficulty::{DifficultyLevel, SetDifficulty};
use emberfall::director::{self, CurrentMap, Encounters, MapCatalog, MapId};
use emberfall::actor;
use emberfall::enemy::{Enemy, EnemyState, PatrolRoute};
use emberfall::geometry::{Aabb, Facing};
use emberfall::projectile::{Faction, Projectile};
use emberfall::sim::SimulationPlugin;
use emberfall::state::GameState;
use emberfall::stats::SessionStats;

const TICK: Duration = Duration::from_nanos(16_666_667);

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Full simulation app with the director silenced: the seeded enemies are
/// removed and the map's spawn profile cleared right after Startup, so every
/// hostile in the test is spawned explicitly.
fn quiet_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .add_plugins(SimulationPlugin);
    app.update(); // Startup: player spawns at centre, director seeds the map
    app.world_mut()
        .resource_mut::<MapCatalog>()
        .clear_profile(MapId::Ashgrove);
    let seeded: Vec<Entity> = app
        .world_mut()
        .query_filtered::<Entity, With<Enemy>>()
        .iter(app.world())
        .collect();
    for entity in seeded {
        // Direct despawn, not the reap pass: no kill counters move.
        app.world_mut().entity_mut(entity).despawn();
    }
    app
}

/// Full simulation app with the director live (initial population and
/// respawns included).
fn directed_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .add_plugins(SimulationPlugin);
    app.update();
    app
}

/// Spawn one enemy with explicit stats, mirroring the director's bundle.
fn spawn_test_enemy(app: &mut App, position: Vec2, hp: i32, facing: Facing) -> Entity {
    let frame = Vec2::splat(48.0);
    app.world_mut()
        .spawn((
            Enemy,
            EnemyState::Patrol,
            PatrolRoute {
                min_x: position.x - 160.0,
                max_x: position.x + 160.0,
            },
            Health::new(hp),
            MoveSpeed(90.0),
            facing,
            FrameSize(frame),
            CollisionBounds(Aabb::from_center_size(position, frame)),
            AnimationClock::default(),
            Transform::from_translation(position.extend(0.3)),
        ))
        .id()
}

/// Spawn a boss with unscaled tuning, mirroring the director's bundle.
fn spawn_test_boss(app: &mut App, archetype: BossArchetype, position: Vec2) -> Entity {
    let tuning = archetype.tuning();
    let frame = Vec2::splat(tuning.frame_size);
    app.world_mut()
        .spawn((
            Boss::new(archetype, tuning.projectile_damage, tuning.contact_damage),
            Health::new(tuning.base_hp),
            MoveSpeed(tuning.move_speed),
            Facing::default(),
            FrameSize(frame),
            CollisionBounds(Aabb::from_center_size(position, frame)),
            AnimationClock::default(),
            Transform::from_translation(position.extend(0.4)),
        ))
        .id()
}

/// Spawn a live projectile directly, bypassing fire cooldowns.
fn spawn_test_projectile(
    app: &mut App,
    faction: Faction,
    origin: Vec2,
    dir: Vec2,
    damage: i32,
    max_range: f32,
) -> Entity {
    app.world_mut()
        .spawn((
            Projectile {
                dir: dir.normalize(),
                speed: 480.0,
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

fn enemy_count(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<(), With<Enemy>>()
        .iter(app.world())
        .count()
}

fn boss_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&Boss>()
        .iter(app.world())
        .count()
}

// ── Combat resolution ─────────────────────────────────────────────────────────

/// A 50-damage player shot kills a 50 hp enemy; the enemy is despawned the
/// same tick and both kill counters move.
#[test]
fn player_shot_kills_enemy_and_counts_the_kill() {
    let mut app = quiet_app();
    spawn_test_enemy(&mut app, Vec2::new(100.0, 0.0), 50, Facing::West);
    spawn_test_projectile(
        &mut app,
        Faction::Player,
        Vec2::new(40.0, 0.0),
        Vec2::X,
        50,
        560.0,
    );

    for _ in 0..30 {
        app.update();
        if enemy_count(&mut app) == 0 {
            break;
        }
    }

    assert_eq!(enemy_count(&mut app), 0, "lethal hit must despawn the enemy");
    let stats = app.world().resource::<SessionStats>();
    assert_eq!(stats.enemies_killed, 1);
    let encounters = app.world().resource::<Encounters>();
    let map = app.world().resource::<CurrentMap>().0;
    assert_eq!(encounters.state(map).map(|s| s.kills), Some(1));
}

/// A projectile that hits nothing deactivates at its range limit and is
/// despawned in the same tick, never lingering inactive.
#[test]
fn spent_projectiles_are_purged_same_tick() {
    let mut app = quiet_app();
    spawn_test_projectile(
        &mut app,
        Faction::Player,
        Vec2::new(200.0, 200.0),
        Vec2::X,
        10,
        10.0,
    );

    app.update(); // travels 8 units, still at or under range
    app.update(); // 16 units, past range: deactivate and purge

    let live = app
        .world_mut()
        .query::<&Projectile>()
        .iter(app.world())
        .count();
    assert_eq!(live, 0, "projectile past its range must be gone");
}

/// A hostile shot damages the player; a lethal one spends a life and arms
/// the respawn countdown, and the player comes back at full health.
#[test]
fn player_death_spends_a_life_and_respawns() {
    let mut app = quiet_app();

    {
        let mut q = app
            .world_mut()
            .query_filtered::<&mut Health, With<Player>>();
        for mut health in q.iter_mut(app.world_mut()) {
            health.current = 0;
        }
    }
    app.update();

    {
        let lives = app.world().resource::<PlayerLives>();
        assert_eq!(lives.remaining, 2);
        assert!(lives.respawn_timer.is_some(), "respawn countdown must be armed");
        assert_eq!(app.world().resource::<SessionStats>().deaths, 1);
    }

    // 2.0 s respawn delay at 60 ticks/s, plus slack.
    for _ in 0..130 {
        app.update();
    }

    let mut q = app.world_mut().query_filtered::<&Health, With<Player>>();
    let health = q.iter(app.world()).next().unwrap();
    assert_eq!(health.current, health.max, "respawn must restore full health");
    assert!(app
        .world()
        .resource::<PlayerLives>()
        .respawn_timer
        .is_none());
}

// ── Boss behaviour ────────────────────────────────────────────────────────────

/// Damaging a patrolling Stalker locks its aggro on the shooter's position.
/// The lock forces the attack phase, the boss closes to projectile range on
/// the remembered point, and the lock clears after exactly one shot.
#[test]
fn stalker_lock_survives_until_one_shot_completes() {
    let mut app = quiet_app();
    // Beyond chase range (320), so the duel starts in Patrol.
    let boss = spawn_test_boss(&mut app, BossArchetype::Stalker, Vec2::new(400.0, 0.0));
    spawn_test_projectile(
        &mut app,
        Faction::Player,
        Vec2::new(340.0, 0.0),
        Vec2::X,
        10,
        560.0,
    );

    let mut locked = false;
    for _ in 0..30 {
        app.update();
        let b = app.world().entity(boss).get::<Boss>().unwrap();
        if b.aggro.is_some() {
            locked = true;
            assert_eq!(
                b.aggro,
                Some(Vec2::ZERO),
                "lock must remember the target snapshot at the hit"
            );
            break;
        }
    }
    assert!(locked, "a hit on the Stalker must record an aggro lock");
    let x_at_lock = app
        .world()
        .entity(boss)
        .get::<Transform>()
        .unwrap()
        .translation
        .x;

    // The remembered point is beyond the 360 unit projectile range, so the
    // boss walks it into range before discharging the lock with one shot.
    let mut cleared = false;
    for _ in 0..120 {
        app.update();
        let b = app.world().entity(boss).get::<Boss>().unwrap();
        assert_eq!(
            b.phase,
            BossPhase::Attack,
            "the lock must hold the attack phase until the shot"
        );
        if b.aggro.is_none() {
            cleared = true;
            break;
        }
    }
    assert!(cleared, "one completed shot must clear the lock");

    let x_at_shot = app
        .world()
        .entity(boss)
        .get::<Transform>()
        .unwrap()
        .translation
        .x;
    assert!(
        x_at_shot < x_at_lock,
        "an out-of-range lock must be approached, not fired at"
    );
    let hostile_shots = app
        .world_mut()
        .query::<(&Projectile, &Faction)>()
        .iter(app.world())
        .filter(|(p, f)| **f == Faction::Hostile && p.active)
        .count();
    assert_eq!(hostile_shots, 1, "the lock must produce exactly one shot");
}

/// Sentinel steps through idle, walking, and attack as the target snapshot
/// closes in.
#[test]
fn sentinel_phases_track_the_sampled_distance() {
    let mut app = quiet_app();
    let boss = spawn_test_boss(&mut app, BossArchetype::Sentinel, Vec2::new(500.0, 0.0));

    // Player is at the origin: distance 500, beyond the 300 idle line.
    app.update();
    assert_eq!(
        app.world().entity(boss).get::<Boss>().unwrap().phase,
        BossPhase::Idle
    );

    // Teleport the player inside the walk band.
    {
        let mut q = app
            .world_mut()
            .query_filtered::<&mut Transform, With<Player>>();
        for mut transform in q.iter_mut(app.world_mut()) {
            transform.translation.x = 250.0;
        }
    }
    app.update();
    assert_eq!(
        app.world().entity(boss).get::<Boss>().unwrap().phase,
        BossPhase::Walking
    );
}

/// The Warden's contact cooldown drains only while in melee range: a long
/// ranged excursion must not bank an instant hit for the next close-in.
#[test]
fn melee_cooldown_survives_ranged_excursions() {
    let mut app = quiet_app();
    let boss = spawn_test_boss(&mut app, BossArchetype::Warden, Vec2::new(10.0, 0.0));
    // Park the fire accumulator far below zero so no ranged shots muddy the
    // health bookkeeping during the excursion.
    app.world_mut()
        .entity_mut(boss)
        .get_mut::<Boss>()
        .unwrap()
        .fire_timer = -1000.0;

    // 1.2 s cooldown at 60 ticks/s: the first contact hit lands inside 80
    // ticks.
    for _ in 0..80 {
        app.update();
    }
    let hp_after_first_hit = {
        let mut q = app.world_mut().query_filtered::<&Health, With<Player>>();
        let health = q.iter(app.world()).next().unwrap();
        assert_eq!(health.current, health.max - 18, "first contact hit lands");
        health.current
    };

    // Leave melee range for well over one cooldown.
    {
        let mut q = app
            .world_mut()
            .query_filtered::<&mut Transform, With<Player>>();
        for mut transform in q.iter_mut(app.world_mut()) {
            transform.translation.x = 400.0;
        }
    }
    for _ in 0..150 {
        app.update();
    }

    // Step back into contact: the re-armed cooldown must hold for a tick.
    {
        let mut q = app
            .world_mut()
            .query_filtered::<&mut Transform, With<Player>>();
        for mut transform in q.iter_mut(app.world_mut()) {
            transform.translation.x = 10.0;
        }
    }
    app.update();
    {
        let mut q = app.world_mut().query_filtered::<&Health, With<Player>>();
        let health = q.iter(app.world()).next().unwrap();
        assert_eq!(
            health.current, hp_after_first_hit,
            "re-closing must never grant an instant contact hit"
        );
    }

    // The full cooldown later, the next hit lands.
    for _ in 0..80 {
        app.update();
    }
    let mut q = app.world_mut().query_filtered::<&Health, With<Player>>();
    let health = q.iter(app.world()).next().unwrap();
    assert_eq!(health.current, hp_after_first_hit - 18);
}

// ── Encounter director ────────────────────────────────────────────────────────

/// Runtime overrides of the enemy base stats and the life count reach the
/// spawn catalog and the lives bank, not just the config resource.
#[test]
fn catalog_and_lives_follow_the_loaded_config() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(BalanceConfig {
        enemy_base_hp: 75,
        player_lives: 5,
        ..Default::default()
    });
    app.init_resource::<MapCatalog>();
    app.init_resource::<PlayerLives>();
    app.add_systems(Startup, (director::init_map_catalog, actor::spawn_player));
    app.update();

    let catalog = app.world().resource::<MapCatalog>();
    assert_eq!(
        catalog.profile(MapId::Ashgrove).map(|p| p.base_hp),
        Some(75),
        "spawn profiles must come from the loaded config"
    );
    assert_eq!(
        app.world().resource::<PlayerLives>().remaining,
        5,
        "the lives bank must come from the loaded config"
    );
}

/// The boss spawns when the kill counter reaches the threshold, and never a
/// second time on the same map, even after it dies.
#[test]
fn boss_trigger_is_idempotent_for_the_session() {
    let mut app = quiet_app();
    let map = app.world().resource::<CurrentMap>().0;
    let threshold = 10;

    app.world_mut()
        .resource_mut::<Encounters>()
        .state_mut(map)
        .kills = threshold;
    app.update();
    assert_eq!(boss_count(&mut app), 1, "threshold must spawn the map boss");

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(boss_count(&mut app), 1, "no second boss while one lives");

    // Kill it and confirm the reward and the permanence of the flag.
    {
        let mut q = app.world_mut().query::<(&mut Health, &Boss)>();
        for (mut health, _) in q.iter_mut(app.world_mut()) {
            health.current = 0;
        }
    }
    app.update();
    assert_eq!(boss_count(&mut app), 0);
    assert_eq!(app.world().resource::<SessionStats>().bosses_killed, 1);
    assert_eq!(
        app.world().resource::<PlayerExperience>().total,
        BossArchetype::Brute.tuning().xp_reward,
        "Ashgrove's Brute grants its reward exactly once"
    );

    app.world_mut()
        .resource_mut::<Encounters>()
        .state_mut(map)
        .kills = threshold * 2;
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(boss_count(&mut app), 0, "the spawn flag must be permanent");
}

/// Raising the difficulty scales actors spawned afterwards and leaves every
/// actor already alive untouched.
#[test]
fn difficulty_change_applies_only_to_new_spawns() {
    let mut app = directed_app();

    // Reduce to a single known survivor so the respawn floor kicks in.
    let enemies: Vec<Entity> = app
        .world_mut()
        .query_filtered::<Entity, With<Enemy>>()
        .iter(app.world())
        .collect();
    assert!(!enemies.is_empty(), "the director must seed the map");
    for entity in &enemies[1..] {
        app.world_mut().entity_mut(*entity).despawn();
    }

    app.world_mut()
        .resource_mut::<Messages<SetDifficulty>>()
        .write(SetDifficulty(DifficultyLevel::Standard));
    app.update();

    // Survivor keeps its spawn-time stats.
    let survivor = app.world().entity(enemies[0]).get::<Health>().unwrap();
    assert_eq!(survivor.max, 50, "live actors are never rescaled");

    // Respawn interval is 3.0 s divided by the 1.1 spawn-rate multiplier.
    for _ in 0..200 {
        app.update();
        if enemy_count(&mut app) >= 2 {
            break;
        }
    }
    assert_eq!(enemy_count(&mut app), 2, "the director must refill to the floor");

    let scaled = app
        .world_mut()
        .query_filtered::<&Health, With<Enemy>>()
        .iter(app.world())
        .any(|h| h.max == 60);
    assert!(scaled, "a post-change spawn must carry 50 x 1.2 = 60 hp");
}

// ── Game flow ─────────────────────────────────────────────────────────────────

/// Pausing freezes movement, timers, and the session clock; resuming picks
/// everything back up.
#[test]
fn pause_freezes_the_simulation() {
    let mut app = quiet_app();
    let enemy = spawn_test_enemy(&mut app, Vec2::new(100.0, 0.0), 50, Facing::East);
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    app.update(); // transition applies

    let frozen_pos = app.world().entity(enemy).get::<Transform>().unwrap().translation;
    let frozen_clock = app.world().resource::<SessionStats>().elapsed_secs;
    for _ in 0..10 {
        app.update();
    }
    assert_eq!(
        app.world().entity(enemy).get::<Transform>().unwrap().translation,
        frozen_pos,
        "no actor may move while paused"
    );
    assert_eq!(
        app.world().resource::<SessionStats>().elapsed_secs,
        frozen_clock,
        "the session clock must freeze while paused"
    );

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
    app.update();
    assert_ne!(
        app.world().entity(enemy).get::<Transform>().unwrap().translation,
        frozen_pos,
        "resuming must restart movement"
    );
}

/// Scripted player intent moves the player without any input device present.
#[test]
fn player_intent_drives_movement_headless() {
    let mut app = quiet_app();

    app.world_mut().resource_mut::<PlayerIntent>().move_dir = Vec2::X;
    for _ in 0..10 {
        app.update();
    }

    let mut q = app
        .world_mut()
        .query_filtered::<(&Transform, &Facing), With<Player>>();
    let (transform, facing) = q.iter(app.world()).next().unwrap();
    assert!(transform.translation.x > 30.0, "ten ticks east at 220 u/s");
    assert_eq!(*facing, Facing::East);
}
