//! Simulation plugin: resources, startup, and the ordered tick.
//!
//! One tick is a fixed sequence of named phases, all synchronous:
//!
//! 1. **snapshot** — sample the target position every actor will see
//! 2. **intent**   — input and difficulty requests
//! 3. **behave**   — player movement, enemy/boss state machines, firing
//! 4. **integrate** — projectile movement, animation, bounds refresh
//! 5. **resolve**  — collision tests and damage (PostUpdate)
//! 6. **reap**     — remove the dead, credit kills and experience
//! 7. **spawn**    — director respawns and boss triggers
//!
//! Phases 1 through 4 run chained in `Update`; 5 through 7 run chained in
//! `PostUpdate`, so every resolver pass observes fully moved actors.  All
//! gameplay systems are gated on [`GameState::Playing`]; a paused tick runs
//! nothing and advances no timers.

use crate::actor::{
    self, PlayerExperience, PlayerFireCooldown, PlayerIntent, PlayerLives, TargetSnapshot,
};
use crate::boss::boss_behavior_system;
use crate::combat;
use crate::config::{self, BalanceConfig};
use crate::difficulty::{
    apply_difficulty_requests_system, difficulty_hotkey_system, DifficultyProfile, SetDifficulty,
};
use crate::director::{self, CurrentMap, Encounters, MapCatalog};
use crate::enemy::enemy_behavior_system;
use crate::projectile::{projectile_move_system, purge_inactive_projectiles_system};
use crate::snapshot::{collect_draw_list_system, DrawList};
use crate::state::{pause_toggle_system, GameState};
use crate::stats::StatsPlugin;
use bevy::prelude::*;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<BalanceConfig>()
            .init_resource::<DifficultyProfile>()
            .init_resource::<PlayerIntent>()
            .init_resource::<PlayerFireCooldown>()
            .init_resource::<PlayerLives>()
            .init_resource::<PlayerExperience>()
            .init_resource::<TargetSnapshot>()
            .init_resource::<Encounters>()
            .init_resource::<CurrentMap>()
            .init_resource::<MapCatalog>()
            .init_resource::<DrawList>()
            .add_message::<SetDifficulty>()
            .add_plugins(StatsPlugin)
            .add_systems(
                Startup,
                (
                    // Load config first so every other startup system sees
                    // the final values.
                    config::load_balance_config,
                    director::init_map_catalog.after(config::load_balance_config),
                    actor::spawn_player.after(config::load_balance_config),
                    director::populate_initial_enemies.after(director::init_map_catalog),
                ),
            )
            .add_systems(
                Update,
                (
                    // snapshot
                    actor::sample_target_system,
                    // intent
                    apply_difficulty_requests_system,
                    // behave
                    actor::player_move_system,
                    enemy_behavior_system,
                    boss_behavior_system,
                    actor::player_fire_system,
                    // integrate
                    projectile_move_system,
                    actor::animation_clock_system,
                    actor::update_bounds_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            // Keyboard-fed systems only run when an input device feeds the
            // ButtonInput resource; headless tests drive the intent and
            // difficulty messages directly.
            .add_systems(
                Update,
                (
                    actor::player_intent_input_system
                        .before(actor::player_move_system)
                        .run_if(in_state(GameState::Playing)),
                    difficulty_hotkey_system.before(apply_difficulty_requests_system),
                    pause_toggle_system,
                )
                    .run_if(resource_exists::<ButtonInput<KeyCode>>),
            )
            .add_systems(
                PostUpdate,
                (
                    // resolve
                    combat::player_projectile_hit_system,
                    combat::hostile_projectile_hit_system,
                    combat::melee_contact_system,
                    // reap
                    combat::reap_dead_system,
                    actor::player_death_system,
                    actor::player_respawn_system,
                    purge_inactive_projectiles_system,
                    // spawn
                    director::enemy_respawn_system,
                    director::boss_trigger_system,
                    // renderer handoff
                    collect_draw_list_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
