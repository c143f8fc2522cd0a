//! Game flow state.
//!
//! A paused simulation is simply one whose gameplay systems are not invoked:
//! everything is gated on `in_state(GameState::Playing)`, so timers freeze
//! and nothing mutates while paused.

use bevy::prelude::*;

/// Top-level game flow state.  Menus live in the external shell; the
/// simulation only distinguishes running, frozen, and finished.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
    GameOver,
}

/// Toggle pause with Escape.  Runs in both Playing and Paused so the game
/// can always be resumed; GameOver is terminal.
pub fn pause_toggle_system(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }
    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        GameState::GameOver => {}
    }
}
