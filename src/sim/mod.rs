//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combatant;
pub mod effects;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use combatant::{Boss, Companion, Enemy, Player};
pub use effects::{CameraShake, DamageNumber, ParticleSystem};
pub use projectile::Projectile;
pub use snapshot::RenderSnapshot;
pub use state::{ChestReward, EncounterPhase, EncounterState, Platform, Star, WAVE_COUNT};
pub use tick::{TickInput, run_frame, tick};
