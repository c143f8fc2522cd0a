//! Simulation-specific error types.
//!
//! The simulation is a closed system, so the error taxonomy is narrow:
//! recoverable faults are logged and skipped, never propagated out of a tick.
//! Degenerate aim vectors are handled locally in [`crate::geometry`] and do
//! not surface here at all.

use std::fmt;

/// Top-level error enum for the Emberfall simulation.
#[derive(Debug)]
pub enum SimError {
    /// A map has no configured enemy spawn profile.  The director skips the
    /// respawn for that tick; the session continues.
    MissingSpawnProfile {
        /// Display name of the map whose lookup failed.
        map: &'static str,
    },

    /// A balance value is outside its safe operating range.
    /// Returned by validation helpers run after the config file is loaded.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::MissingSpawnProfile { map } => {
                write!(f, "map '{}' has no enemy spawn profile; respawn skipped", map)
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if a playfield dimension is not strictly positive.
pub fn validate_playfield_dimension(name: &'static str, value: f32) -> SimResult<()> {
    if value <= 0.0 {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if a cooldown or interval is negative.
///
/// Zero is allowed: a zero fire cooldown means "fire every tick", which is
/// valid for scripted scenarios.
pub fn validate_interval(name: &'static str, value: f32) -> SimResult<()> {
    if value < 0.0 {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playfield_dimension_rejects_non_positive() {
        assert!(validate_playfield_dimension("PLAYFIELD_WIDTH", 0.0).is_err());
        assert!(validate_playfield_dimension("PLAYFIELD_WIDTH", -10.0).is_err());
        assert!(validate_playfield_dimension("PLAYFIELD_WIDTH", 1280.0).is_ok());
    }

    #[test]
    fn interval_allows_zero_but_not_negative() {
        assert!(validate_interval("PLAYER_FIRE_COOLDOWN", 0.0).is_ok());
        assert!(validate_interval("PLAYER_FIRE_COOLDOWN", -0.1).is_err());
    }
}
