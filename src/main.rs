use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use std::env;
use std::time::Duration;

use emberfall::actor;
use emberfall::director;
use emberfall::sim::SimulationPlugin;
use emberfall::snapshot;
use emberfall::testing::{
    self, spawn_test_boss_duel, spawn_test_spawn_starved, DuelObservations, DuelScriptState,
    TestConfig,
};

const TICK: Duration = Duration::from_nanos(16_666_667);

fn main() {
    // Check for test mode
    let test_mode = env::var("EMBERFALL_TEST").ok();

    let mut app = App::new();

    // Headless: the renderer shell is a separate binary that consumes the
    // draw list.  A fixed manual tick keeps every run reproducible.
    app.add_plugins(MinimalPlugins)
        .add_plugins(bevy::log::LogPlugin::default())
        .add_plugins(StatesPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .add_plugins(SimulationPlugin);

    // Add testing systems if in test mode
    if let Some(test_name) = test_mode {
        let test_config = TestConfig {
            enabled: true,
            test_name: test_name.clone(),
            ..Default::default()
        };
        app.insert_resource(test_config);

        match test_name.as_str() {
            "boss_duel" => {
                app.init_resource::<DuelScriptState>()
                    .init_resource::<DuelObservations>()
                    .add_systems(
                        Startup,
                        spawn_test_boss_duel.after(director::populate_initial_enemies),
                    )
                    .add_systems(
                        Update,
                        testing::boss_duel_script_system.before(actor::player_move_system),
                    )
                    .add_systems(
                        PostUpdate,
                        testing::duel_observer_system
                            .after(snapshot::collect_draw_list_system)
                            .before(testing::test_logging_system),
                    );
            }
            "spawn_starved" => {
                app.add_systems(
                    Startup,
                    spawn_test_spawn_starved.after(director::populate_initial_enemies),
                );
            }
            _ => {
                println!("Unknown test {test_name}, running it as a plain sandbox");
            }
        }

        app.add_systems(
            PostUpdate,
            (testing::test_logging_system, testing::test_exit_system)
                .chain()
                .after(snapshot::collect_draw_list_system),
        );

        println!("Running test: {}", test_name);
    } else {
        // Sandbox run: the full director-driven world for a bounded number
        // of frames, then a clean exit with the session counters.
        app.insert_resource(TestConfig {
            enabled: true,
            test_name: "sandbox".into(),
            ..Default::default()
        })
        .add_systems(
            PostUpdate,
            (testing::test_logging_system, testing::test_exit_system)
                .chain()
                .after(snapshot::collect_draw_list_system),
        );
    }

    app.run();
}
