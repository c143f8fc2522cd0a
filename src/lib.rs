//! Emberfall combat & AI simulation core.
//!
//! A top-down wave-combat simulation: a player fights respawning enemies and
//! five boss archetypes across linked maps, parameterised by a runtime
//! difficulty profile.  Rendering, asset loading, scoreboard persistence, and
//! map topology are external collaborators; this crate only simulates and
//! emits read-only draw snapshots and session counters.

pub mod actor;
pub mod boss;
pub mod combat;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod director;
pub mod enemy;
pub mod error;
pub mod geometry;
pub mod projectile;
pub mod sim;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod testing;
