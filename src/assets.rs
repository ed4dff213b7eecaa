//! Sprite bundle handed over by the asset/generation pipeline
//!
//! The simulation never fetches or decodes images. It only carries opaque
//! handles plus the per-asset "authored facing left" flags, and resolves the
//! mirror bit the renderer should apply for a given runtime facing.

use serde::{Deserialize, Serialize};

/// Weapon archetype chosen by the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    #[default]
    Melee,
    Ranged,
}

/// One generated sprite: an opaque handle (URL, cache key, texture id) and
/// whether the art was authored facing left and needs a horizontal flip to
/// face right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRef {
    pub handle: String,
    #[serde(default)]
    pub needs_flip: bool,
}

/// The fixed set of sprites one play session consumes. Any entry may be
/// missing; the renderer then falls back to primitive shapes and the
/// simulation is unaffected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteBundle {
    pub hero: Option<SpriteRef>,
    pub weapon: Option<SpriteRef>,
    pub monster: Option<SpriteRef>,
    pub boss: Option<SpriteRef>,
    pub companion: Option<SpriteRef>,
    pub background: Option<SpriteRef>,
    pub ground: Option<SpriteRef>,
    #[serde(default)]
    pub weapon_kind: WeaponKind,
}

/// Whether the renderer should mirror a sprite horizontally.
///
/// `facing` is the entity's runtime direction (+1 right / -1 left);
/// `needs_flip` marks assets authored facing left. XOR keeps art correct
/// regardless of which way it was drawn.
#[inline]
pub fn mirror_for(facing: i8, needs_flip: bool) -> bool {
    (facing < 0) ^ needs_flip
}

impl SpriteBundle {
    /// True when every combat-relevant sprite resolved
    pub fn is_complete(&self) -> bool {
        self.hero.is_some() && self.monster.is_some() && self.boss.is_some()
    }
}
