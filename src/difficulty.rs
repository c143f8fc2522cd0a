//! Runtime difficulty scaling.
//!
//! [`DifficultyProfile`] is the single cross-cutting mutable resource in the
//! simulation: read-many (every spawn), write-rare (explicit level-change
//! requests).  Multipliers are recomputed from the discrete level, so they
//! move monotonically in the documented step sizes and never drift.
//!
//! Changing the profile does **not** rescale actors that are already alive:
//! spawn code reads a snapshot of the multipliers at spawn time, and that is
//! the only binding.

use crate::constants::{
    DIFFICULTY_DAMAGE_STEP, DIFFICULTY_ENEMY_COUNT_BASE, DIFFICULTY_HEALTH_STEP,
    DIFFICULTY_SPAWN_RATE_STEP, DIFFICULTY_SPEED_STEP,
};
use bevy::prelude::*;

/// Discrete difficulty level.  Numeric hotkeys 1 through 5 map onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DifficultyLevel {
    #[default]
    Novice,
    Standard,
    Veteran,
    Brutal,
    Nightmare,
}

impl DifficultyLevel {
    /// 1-indexed numeric rank, matching the hotkey that selects it.
    #[inline]
    pub fn rank(self) -> u32 {
        match self {
            DifficultyLevel::Novice => 1,
            DifficultyLevel::Standard => 2,
            DifficultyLevel::Veteran => 3,
            DifficultyLevel::Brutal => 4,
            DifficultyLevel::Nightmare => 5,
        }
    }

    /// Level for a 1-indexed rank; `None` outside 1..=5.
    pub fn from_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(DifficultyLevel::Novice),
            2 => Some(DifficultyLevel::Standard),
            3 => Some(DifficultyLevel::Veteran),
            4 => Some(DifficultyLevel::Brutal),
            5 => Some(DifficultyLevel::Nightmare),
            _ => None,
        }
    }

    /// Next level up, saturating at [`DifficultyLevel::Nightmare`].
    #[inline]
    pub fn next(self) -> Self {
        Self::from_rank(self.rank() + 1).unwrap_or(self)
    }

    /// Next level down, saturating at [`DifficultyLevel::Novice`].
    #[inline]
    pub fn previous(self) -> Self {
        Self::from_rank(self.rank().saturating_sub(1)).unwrap_or(self)
    }

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            DifficultyLevel::Novice => "NOVICE",
            DifficultyLevel::Standard => "STANDARD",
            DifficultyLevel::Veteran => "VETERAN",
            DifficultyLevel::Brutal => "BRUTAL",
            DifficultyLevel::Nightmare => "NIGHTMARE",
        }
    }
}

/// Current difficulty multipliers, derived entirely from the discrete level.
///
/// | Multiplier  | Step per level |
/// |-------------|----------------|
/// | health      | +0.2           |
/// | speed       | +0.1           |
/// | damage      | +0.15          |
/// | spawn rate  | +0.1           |
/// | enemy count | +1             |
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    level: DifficultyLevel,
    /// Baseline enemy population the director aims for on a map.
    pub enemy_count: u32,
    /// Applied to enemy base health at spawn time.
    pub enemy_health_mult: f32,
    /// Applied to boss base health at spawn time.
    pub boss_health_mult: f32,
    /// Applied to enemy and boss movement speed at spawn time.
    pub speed_mult: f32,
    /// Applied to boss projectile and contact damage at spawn time.
    pub damage_mult: f32,
    /// Divides the director's respawn interval; higher means faster waves.
    pub spawn_rate_mult: f32,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::for_level(DifficultyLevel::default())
    }
}

impl DifficultyProfile {
    /// Compute the full multiplier set for `level`.  Level 1 yields 1.0 for
    /// every multiplier.
    pub fn for_level(level: DifficultyLevel) -> Self {
        let steps = (level.rank() - 1) as f32;
        Self {
            level,
            enemy_count: DIFFICULTY_ENEMY_COUNT_BASE + (level.rank() - 1),
            enemy_health_mult: 1.0 + DIFFICULTY_HEALTH_STEP * steps,
            boss_health_mult: 1.0 + DIFFICULTY_HEALTH_STEP * steps,
            speed_mult: 1.0 + DIFFICULTY_SPEED_STEP * steps,
            damage_mult: 1.0 + DIFFICULTY_DAMAGE_STEP * steps,
            spawn_rate_mult: 1.0 + DIFFICULTY_SPAWN_RATE_STEP * steps,
        }
    }

    #[inline]
    pub fn level(&self) -> DifficultyLevel {
        self.level
    }

    /// Replace the profile with the multipliers for `level`.
    pub fn set_level(&mut self, level: DifficultyLevel) {
        *self = Self::for_level(level);
    }

    /// Step one level up; saturates at the top level.
    pub fn raise_level(&mut self) {
        self.set_level(self.level.next());
    }

    /// Step one level down; saturates at the bottom level.
    pub fn lower_level(&mut self) {
        self.set_level(self.level.previous());
    }

    /// Scale an integer base stat (health, damage) by `mult`, rounding to the
    /// nearest point.
    #[inline]
    pub fn scale_stat(base: i32, mult: f32) -> i32 {
        (base as f32 * mult).round() as i32
    }
}

// ── Level-change requests ─────────────────────────────────────────────────────

/// Request to set the difficulty to a named level.  Emitted by the hotkey
/// system (or tests) and applied by [`apply_difficulty_requests_system`].
#[derive(Message, Debug, Clone, Copy)]
pub struct SetDifficulty(pub DifficultyLevel);

/// Map numeric keys 1 through 5 onto [`SetDifficulty`] requests.
pub fn difficulty_hotkey_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<SetDifficulty>,
) {
    const HOTKEYS: [(KeyCode, DifficultyLevel); 5] = [
        (KeyCode::Digit1, DifficultyLevel::Novice),
        (KeyCode::Digit2, DifficultyLevel::Standard),
        (KeyCode::Digit3, DifficultyLevel::Veteran),
        (KeyCode::Digit4, DifficultyLevel::Brutal),
        (KeyCode::Digit5, DifficultyLevel::Nightmare),
    ];
    for (key, level) in HOTKEYS {
        if keys.just_pressed(key) {
            requests.write(SetDifficulty(level));
        }
    }
}

/// Apply pending level-change requests to the profile.
///
/// Writes take effect only for actors spawned afterwards; nothing already in
/// the world is touched.
pub fn apply_difficulty_requests_system(
    mut requests: MessageReader<SetDifficulty>,
    mut profile: ResMut<DifficultyProfile>,
) {
    for SetDifficulty(level) in requests.read() {
        if *level != profile.level() {
            profile.set_level(*level);
            info!(
                "Difficulty set to {} (hp x{:.1}, dmg x{:.2}, spawn x{:.1})",
                level.label(),
                profile.enemy_health_mult,
                profile.damage_mult,
                profile.spawn_rate_mult
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_one_is_unit_baseline() {
        let profile = DifficultyProfile::for_level(DifficultyLevel::Novice);
        assert_eq!(profile.enemy_health_mult, 1.0);
        assert_eq!(profile.boss_health_mult, 1.0);
        assert_eq!(profile.speed_mult, 1.0);
        assert_eq!(profile.damage_mult, 1.0);
        assert_eq!(profile.spawn_rate_mult, 1.0);
        assert_eq!(profile.enemy_count, DIFFICULTY_ENEMY_COUNT_BASE);
    }

    #[test]
    fn raise_level_moves_health_mult_by_exact_step() {
        let mut profile = DifficultyProfile::default();
        profile.raise_level();
        assert!((profile.enemy_health_mult - 1.2).abs() < 1e-6);
        profile.raise_level();
        assert!((profile.enemy_health_mult - 1.4).abs() < 1e-6);
    }

    #[test]
    fn multipliers_are_monotonic_in_level() {
        let mut prev = DifficultyProfile::for_level(DifficultyLevel::Novice);
        for rank in 2..=5 {
            let next = DifficultyProfile::for_level(DifficultyLevel::from_rank(rank).unwrap());
            assert!(next.enemy_health_mult > prev.enemy_health_mult);
            assert!(next.speed_mult > prev.speed_mult);
            assert!(next.damage_mult > prev.damage_mult);
            assert!(next.spawn_rate_mult > prev.spawn_rate_mult);
            assert!(next.enemy_count > prev.enemy_count);
            prev = next;
        }
    }

    #[test]
    fn raise_and_lower_saturate_at_bounds() {
        let mut profile = DifficultyProfile::for_level(DifficultyLevel::Nightmare);
        profile.raise_level();
        assert_eq!(profile.level(), DifficultyLevel::Nightmare);

        let mut profile = DifficultyProfile::for_level(DifficultyLevel::Novice);
        profile.lower_level();
        assert_eq!(profile.level(), DifficultyLevel::Novice);
    }

    #[test]
    fn scale_stat_rounds_to_nearest() {
        assert_eq!(DifficultyProfile::scale_stat(50, 1.0), 50);
        assert_eq!(DifficultyProfile::scale_stat(50, 1.2), 60);
        assert_eq!(DifficultyProfile::scale_stat(45, 1.15), 52);
    }
}
