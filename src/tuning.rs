//! Data-driven game balance
//!
//! Every number a designer might want to touch lives here, with defaults
//! matching the reference behavior. Hosts can ship overrides as JSON.

use serde::{Deserialize, Serialize};

use crate::assets::WeaponKind;

/// Balance constants for one encounter. All speeds are px/s, all damage and
/// health values are hit points, all timers are simulation ticks (60 Hz).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Max health when the generated weapon is melee
    pub player_melee_max_health: f32,
    /// Max health when the generated weapon is ranged
    pub player_ranged_max_health: f32,
    pub player_speed: f32,
    pub player_jump_speed: f32,
    pub player_melee_damage: f32,
    pub player_melee_range: f32,
    pub player_melee_cooldown: u32,
    pub player_attack_window: u32,
    pub player_shoot_cooldown: u32,
    pub player_projectile_speed: f32,
    pub player_projectile_damage: f32,
    /// Ticks between body-contact damage applications
    pub contact_interval: u32,
    pub contact_damage: f32,
    /// Fraction of max health restored at the end of each segment
    pub heal_fraction: f32,

    // === Wave enemies ===
    pub enemy_max_health: f32,
    pub enemy_speed: f32,
    pub enemy_attack_range: f32,
    pub enemy_damage: f32,
    pub enemy_attack_cooldown: u32,
    pub enemy_attack_window: u32,

    // === Boss ===
    pub boss_max_health: f32,
    pub boss_attack_range: f32,
    pub boss_damage: f32,
    pub boss_attack_cooldown: u32,
    pub boss_attack_window: u32,
    pub boss_special_damage: f32,
    pub boss_special_cooldown: u32,
    pub boss_special_window: u32,
    /// Horizontal inflation of the special attack box on each side
    pub boss_special_margin: f32,
    /// Base speed per phase (index 0 = phase 1)
    pub boss_phase_speed: [f32; 3],
    pub boss_projectile_speed: f32,
    pub boss_projectile_damage: f32,
    pub boss_shoot_cooldown: u32,

    // === Companion ===
    pub companion_max_health: f32,
    pub companion_speed: f32,
    pub companion_follow_distance: f32,
    pub companion_attack_range: f32,
    pub companion_shoot_cooldown: u32,
    pub companion_projectile_speed: f32,
    pub companion_projectile_damage: f32,

    // === Scoring ===
    pub kill_score_base: u64,
    pub chest_score: u64,
    pub star_score: u64,
    pub boss_kill_score: u64,
    /// Ticks the combo stays alive after a kill
    pub combo_window: u32,
    /// Multiplier gain per combo step
    pub combo_step: f32,
    /// Multiplier cap
    pub combo_cap: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_melee_max_health: 150.0,
            player_ranged_max_health: 100.0,
            player_speed: 300.0,
            player_jump_speed: 1080.0,
            player_melee_damage: 20.0,
            player_melee_range: 50.0,
            player_melee_cooldown: 30,
            player_attack_window: 18,
            player_shoot_cooldown: 15,
            player_projectile_speed: 600.0,
            player_projectile_damage: 20.0,
            contact_interval: 30,
            contact_damage: 2.0,
            heal_fraction: 0.25,

            enemy_max_health: 40.0,
            enemy_speed: 120.0,
            enemy_attack_range: 30.0,
            enemy_damage: 8.0,
            enemy_attack_cooldown: 60,
            enemy_attack_window: 24,

            boss_max_health: 300.0,
            boss_attack_range: 60.0,
            boss_damage: 5.0,
            boss_attack_cooldown: 80,
            boss_attack_window: 30,
            boss_special_damage: 8.0,
            boss_special_cooldown: 180,
            boss_special_window: 36,
            boss_special_margin: 30.0,
            boss_phase_speed: [90.0, 120.0, 150.0],
            boss_projectile_speed: 480.0,
            boss_projectile_damage: 8.0,
            boss_shoot_cooldown: 30,

            companion_max_health: 50.0,
            companion_speed: 180.0,
            companion_follow_distance: 80.0,
            companion_attack_range: 300.0,
            companion_shoot_cooldown: 40,
            companion_projectile_speed: 420.0,
            companion_projectile_damage: 5.0,

            kill_score_base: 100,
            chest_score: 500,
            star_score: 200,
            boss_kill_score: 2000,
            combo_window: 180,
            combo_step: 0.1,
            combo_cap: 3.0,
        }
    }
}

impl Tuning {
    /// Starting/max player health for the generated weapon type
    pub fn player_max_health(&self, weapon: WeaponKind) -> f32 {
        match weapon {
            WeaponKind::Melee => self.player_melee_max_health,
            WeaponKind::Ranged => self.player_ranged_max_health,
        }
    }

    /// Parse overrides from JSON, falling back to defaults on error
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("invalid tuning JSON, using defaults: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_health_split() {
        let t = Tuning::default();
        assert!(t.player_max_health(WeaponKind::Melee) > t.player_max_health(WeaponKind::Ranged));
    }

    #[test]
    fn test_partial_json_override() {
        let t = Tuning::from_json(r#"{"boss_max_health": 500.0}"#);
        assert_eq!(t.boss_max_health, 500.0);
        assert_eq!(t.enemy_max_health, Tuning::default().enemy_max_health);
    }

    #[test]
    fn test_bad_json_falls_back() {
        let t = Tuning::from_json("not json");
        assert_eq!(t.boss_max_health, Tuning::default().boss_max_health);
    }
}
