//! Questforge - simulation core for a personalized side-scrolling action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, combat, encounter state machine)
//! - `assets`: Sprite-bundle handles and mirroring flags from the generation pipeline
//! - `tuning`: Data-driven game balance
//! - `settings`, `highscores`: Player preferences and local leaderboard
//!   (persisted to LocalStorage on wasm32)

pub mod assets;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use assets::{SpriteBundle, WeaponKind};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Delta-time clamp: never integrate more than 2x the nominal step,
    /// so a stalled host cannot cause runaway physics
    pub const MAX_DT: f32 = 2.0 * SIM_DT;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Logical world dimensions (the renderer scales to the actual canvas)
    pub const WORLD_WIDTH: f32 = 1280.0;
    pub const WORLD_HEIGHT: f32 = 720.0;
    /// Height of the ground band at the bottom of the world
    pub const GROUND_BAND: f32 = 30.0;

    /// Gravity acceleration for combatants (px/s^2)
    pub const GRAVITY: f32 = 1800.0;
    /// Weaker gravity applied to projectiles for a shallow ballistic arc
    pub const PROJECTILE_GRAVITY: f32 = 180.0;
}

/// Y coordinate of the walkable ground surface
#[inline]
pub fn ground_y() -> f32 {
    consts::WORLD_HEIGHT - consts::GROUND_BAND
}

/// Deterministic integer hash used for cosmetic jitter (particle fans,
/// shake offsets). Same Knuth multiplicative pattern everywhere so replays
/// stay stable without touching the sim RNG.
#[inline]
pub fn cosmetic_hash(seed: u32, salt: u32) -> u32 {
    seed.wrapping_mul(2654435761).wrapping_add(salt.wrapping_mul(7919))
}

/// Map a hash to [0, 1)
#[inline]
pub fn hash_unit(h: u32) -> f32 {
    (h % 1000) as f32 / 1000.0
}
