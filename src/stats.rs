//! Session statistics and the end-of-session report.
//!
//! Counters accumulate during play and are emitted exactly once as a
//! [`SessionReport`] message when the session ends.  The external scoreboard
//! collaborator serialises the report; the core never touches files.

use crate::state::GameState;
use bevy::prelude::*;
use serde::Serialize;

/// Counters accumulated over one session.
#[derive(Resource, Default, Debug, Clone, Copy, Serialize)]
pub struct SessionStats {
    pub enemies_killed: u32,
    pub bosses_killed: u32,
    pub shots_fired: u32,
    pub lives_lost: u32,
    pub deaths: u32,
    pub elapsed_secs: f32,
}

/// End-of-session snapshot handed to the external scoreboard collaborator.
#[derive(Message, Debug, Clone, Copy, Serialize)]
pub struct SessionReport(pub SessionStats);

/// Accumulate elapsed play time.  Gated to the Playing state, so pausing
/// freezes the clock along with everything else.
pub fn session_clock_system(time: Res<Time>, mut stats: ResMut<SessionStats>) {
    stats.elapsed_secs += time.delta_secs();
}

/// Emit the session report on entering GameOver.
pub fn emit_session_report_system(
    stats: Res<SessionStats>,
    mut reports: MessageWriter<SessionReport>,
) {
    reports.write(SessionReport(*stats));
    info!(
        "Session over: {} enemies, {} bosses, {} shots, {} deaths, {:.1}s",
        stats.enemies_killed, stats.bosses_killed, stats.shots_fired, stats.deaths, stats.elapsed_secs
    );
}

/// Registers the counters, the report message, and the scheduling around
/// them.
pub struct StatsPlugin;

impl Plugin for StatsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionStats>()
            .add_message::<SessionReport>()
            .add_systems(
                Update,
                session_clock_system.run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::GameOver), emit_session_report_system);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_for_the_scoreboard() {
        let stats = SessionStats {
            enemies_killed: 12,
            bosses_killed: 1,
            shots_fired: 40,
            lives_lost: 2,
            deaths: 2,
            elapsed_secs: 93.5,
        };
        let serialised = toml::to_string(&stats).expect("stats must serialise");
        assert!(serialised.contains("enemies_killed = 12"));
        assert!(serialised.contains("bosses_killed = 1"));
    }
}
