//! Combatant entities: Player, wave Enemy, Boss, Companion
//!
//! Each combatant owns its position, velocity, health, cooldown timers and a
//! small behavior routine. Cross-entity combat resolution (who hits whom)
//! happens in `tick`, which keeps scoring and death bookkeeping centralized.
//!
//! All timed behavior (attack windows, cooldowns, cadences) is expressed as
//! countdown fields decremented once per tick; there are no deferred
//! callbacks anywhere in the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, attack_box};
use super::projectile::{Projectile, ProjectileOwner};
use crate::assets::WeaponKind;
use crate::consts::{GRAVITY, WORLD_WIDTH};
use crate::tuning::Tuning;

/// Ledger id used when the player's melee window connects with the boss
pub const BOSS_TARGET_ID: u32 = u32::MAX;

/// Ticks of hurt-flash shown after taking damage (visual feedback only)
const HURT_FLASH_TICKS: u32 = 10;

/// Subtract damage from health, clamping at zero
#[inline]
fn apply_damage(health: &mut f32, amount: f32) {
    *health = (*health - amount).max(0.0);
}

/// A muzzle position + direction, reported so the orchestrator can push the
/// cosmetic flash without entities holding a particle-system reference
#[derive(Debug, Clone, Copy)]
pub struct FireEvent {
    pub pos: Vec2,
    pub facing: i8,
}

/// Movement axis and action triggers for the player, one snapshot per tick
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    /// -1.0..=1.0 horizontal axis
    pub move_axis: f32,
    pub jump: bool,
    pub crouch: bool,
    pub melee: bool,
    pub shoot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub crouch_height: f32,
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub facing: i8,
    pub grounded: bool,
    pub crouching: bool,
    pub weapon: WeaponKind,
    /// Ticks remaining in the open melee window (0 = closed)
    pub attack_window: u32,
    pub attack_cooldown: u32,
    pub shoot_cooldown: u32,
    /// Gate between body-contact damage applications
    pub contact_cooldown: u32,
    pub hurt_flash: u32,
    pub projectiles: Vec<Projectile>,
    /// Targets already struck by the current melee window
    attack_hits: Vec<u32>,
    /// Requires releasing jump between hops
    can_jump: bool,
}

impl Player {
    pub fn new(pos: Vec2, weapon: WeaponKind, tuning: &Tuning) -> Self {
        let max_health = tuning.player_max_health(weapon);
        Self {
            pos,
            size: Vec2::new(40.0, 60.0),
            crouch_height: 30.0,
            vel: Vec2::ZERO,
            health: max_health,
            max_health,
            facing: 1,
            grounded: true,
            crouching: false,
            weapon,
            attack_window: 0,
            attack_cooldown: 0,
            shoot_cooldown: 0,
            contact_cooldown: 0,
            hurt_flash: 0,
            projectiles: Vec::new(),
            attack_hits: Vec::new(),
            can_jump: true,
        }
    }

    /// Current collision box; crouching shrinks it with the bottom anchored
    pub fn bounds(&self) -> Rect {
        let h = if self.crouching { self.crouch_height } else { self.size.y };
        Rect {
            pos: Vec2::new(self.pos.x, self.pos.y + self.size.y - h),
            size: Vec2::new(self.size.x, h),
        }
    }

    /// Melee reach box for the current facing; only meaningful while
    /// `attack_window > 0`
    pub fn attack_box(&self, tuning: &Tuning) -> Rect {
        attack_box(&self.bounds(), self.facing, tuning.player_melee_range)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Whether the open melee window may still strike `target_id` this tick
    pub fn can_strike(&self, target_id: u32) -> bool {
        self.attack_window > 0 && !self.attack_hits.contains(&target_id)
    }

    /// Record a landed melee hit so the same window cannot strike twice
    pub fn mark_struck(&mut self, target_id: u32) {
        self.attack_hits.push(target_id);
    }

    pub fn take_damage(&mut self, amount: f32) {
        apply_damage(&mut self.health, amount);
        self.hurt_flash = HURT_FLASH_TICKS;
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Advance one tick from an input snapshot.
    ///
    /// `ground` is the walkable floor below the player, or `None` during a
    /// platform course where only platforms catch the fall. Returns a fire
    /// event when the ranged trigger produced a projectile.
    pub fn update(
        &mut self,
        input: &PlayerInput,
        ground: Option<f32>,
        tuning: &Tuning,
        dt: f32,
    ) -> Option<FireEvent> {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        self.contact_cooldown = self.contact_cooldown.saturating_sub(1);
        self.hurt_flash = self.hurt_flash.saturating_sub(1);
        if self.attack_window > 0 {
            self.attack_window -= 1;
            if self.attack_window == 0 {
                self.attack_hits.clear();
            }
        }

        self.crouching = input.crouch && self.grounded;

        if input.jump && self.grounded && self.can_jump && !self.crouching {
            self.vel.y = -tuning.player_jump_speed;
            self.grounded = false;
            self.can_jump = false;
        }
        if !input.jump {
            self.can_jump = true;
        }

        if input.melee && self.attack_cooldown == 0 {
            self.attack_window = tuning.player_attack_window;
            self.attack_cooldown = tuning.player_melee_cooldown;
            self.attack_hits.clear();
        }

        let mut fired = None;
        if input.shoot && self.shoot_cooldown == 0 {
            let bounds = self.bounds();
            let muzzle = Vec2::new(
                if self.facing >= 0 { bounds.right() } else { bounds.left() },
                bounds.top() + bounds.size.y / 2.0,
            );
            self.projectiles.push(Projectile::fired(
                muzzle,
                self.facing,
                tuning.player_projectile_speed,
                tuning.player_projectile_damage as u32,
                ProjectileOwner::Player,
            ));
            self.shoot_cooldown = tuning.player_shoot_cooldown;
            fired = Some(FireEvent { pos: muzzle, facing: self.facing });
        }

        // Horizontal movement: direct velocity assignment, capped
        let axis = input.move_axis.clamp(-1.0, 1.0);
        if axis.abs() > f32::EPSILON && self.attack_window == 0 {
            self.facing = if axis > 0.0 { 1 } else { -1 };
            self.pos.x += axis * tuning.player_speed * dt;
        }
        self.pos.x = self.pos.x.clamp(0.0, WORLD_WIDTH - self.size.x);

        // Vertical integration and floor clamp
        self.vel.y += GRAVITY * dt;
        self.pos.y += self.vel.y * dt;

        if let Some(ground_y) = ground {
            // pos.y tracks the standing top-left even while crouched;
            // bounds() anchors the crouch box to the feet
            let standing_top = ground_y - self.size.y;
            if self.pos.y >= standing_top {
                self.pos.y = standing_top;
                self.vel.y = 0.0;
                self.grounded = true;
            }
        } else {
            self.grounded = false;
        }

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        self.projectiles.retain(|p| p.active);

        fired
    }

    /// Land the player on a platform top (platform-course resolution)
    pub fn land_on(&mut self, surface_y: f32) {
        self.pos.y = surface_y - self.size.y;
        self.vel.y = 0.0;
        self.grounded = true;
    }
}

/// Wave minion. Two implicit states: approach when beyond attack range,
/// cooldown-gated attack when inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub facing: i8,
    pub attack_cooldown: u32,
    /// Open attack window; `window_hit` blocks a second hit in the same window
    pub attack_window: u32,
    pub window_hit: bool,
    pub hurt_flash: u32,
    pub contact_timer: u32,
}

impl Enemy {
    pub fn new(id: u32, x: f32, ground_y: f32, tuning: &Tuning) -> Self {
        let size = Vec2::new(35.0, 50.0);
        Self {
            id,
            pos: Vec2::new(x, ground_y - size.y),
            size,
            health: tuning.enemy_max_health,
            max_health: tuning.enemy_max_health,
            facing: -1,
            attack_cooldown: 0,
            attack_window: 0,
            window_hit: false,
            hurt_flash: 0,
            contact_timer: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    pub fn attack_box(&self, tuning: &Tuning) -> Rect {
        attack_box(&self.bounds(), self.facing, tuning.enemy_attack_range)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        apply_damage(&mut self.health, amount);
        self.hurt_flash = HURT_FLASH_TICKS;
    }

    pub fn update(&mut self, player_x: f32, ground_y: f32, tuning: &Tuning, dt: f32) {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.hurt_flash = self.hurt_flash.saturating_sub(1);
        self.contact_timer = self.contact_timer.saturating_sub(1);
        if self.attack_window > 0 {
            self.attack_window -= 1;
            if self.attack_window == 0 {
                self.window_hit = false;
            }
        }

        let distance = player_x - self.pos.x;
        self.facing = if distance >= 0.0 { 1 } else { -1 };

        if distance.abs() > tuning.enemy_attack_range + 10.0 {
            // Approach
            self.pos.x += distance.signum() * tuning.enemy_speed * dt;
        } else if distance.abs() < tuning.enemy_attack_range && self.attack_cooldown == 0 {
            // Attack
            self.attack_window = tuning.enemy_attack_window;
            self.attack_cooldown = tuning.enemy_attack_cooldown;
            self.window_hit = false;
        }

        self.pos.x = self.pos.x.clamp(0.0, WORLD_WIDTH - self.size.x);
        self.pos.y = ground_y - self.size.y;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
    pub health: f32,
    pub max_health: f32,
    pub facing: i8,
    pub grounded: bool,
    pub attack_cooldown: u32,
    pub attack_window: u32,
    pub special_cooldown: u32,
    pub special_window: u32,
    pub shoot_cooldown: u32,
    pub jump_cooldown: u32,
    /// Countdown to the phase-3 double shot's second projectile (0 = none)
    pub pending_double: u32,
    pub hurt_flash: u32,
    pub projectiles: Vec<Projectile>,
    /// One hit per target per window, tracked separately for player/companion
    pub window_hit_player: bool,
    pub window_hit_companion: bool,
    pub special_hit_player: bool,
    pub special_hit_companion: bool,
    move_timer: u32,
    shoot_timer: u32,
}

impl Boss {
    pub fn new(x: f32, ground_y: f32, tuning: &Tuning) -> Self {
        let size = Vec2::new(80.0, 100.0);
        Self {
            pos: Vec2::new(x, ground_y - size.y),
            size,
            vel_y: 0.0,
            health: tuning.boss_max_health,
            max_health: tuning.boss_max_health,
            facing: -1,
            grounded: true,
            attack_cooldown: 0,
            attack_window: 0,
            special_cooldown: 0,
            special_window: 0,
            shoot_cooldown: 0,
            jump_cooldown: 0,
            pending_double: 0,
            hurt_flash: 0,
            projectiles: Vec::new(),
            window_hit_player: false,
            window_hit_companion: false,
            special_hit_player: false,
            special_hit_companion: false,
            move_timer: 0,
            shoot_timer: 0,
        }
    }

    /// Phase is derived from health every tick, never stored: healing or
    /// damage always leaves it consistent.
    pub fn phase(&self) -> u8 {
        let pct = self.health / self.max_health;
        if pct >= 0.6 {
            1
        } else if pct >= 0.3 {
            2
        } else {
            3
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    pub fn attack_box(&self, tuning: &Tuning) -> Rect {
        attack_box(&self.bounds(), self.facing, tuning.boss_attack_range)
    }

    /// Special attack covers the boss body inflated horizontally, full height
    pub fn special_attack_box(&self, tuning: &Tuning) -> Rect {
        Rect::new(
            self.pos.x - tuning.boss_special_margin,
            self.pos.y,
            self.size.x + 2.0 * tuning.boss_special_margin,
            self.size.y,
        )
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        apply_damage(&mut self.health, amount);
        self.hurt_flash = HURT_FLASH_TICKS;
    }

    fn shoot_at(&mut self, target: Vec2, tuning: &Tuning) -> FireEvent {
        let bounds = self.bounds();
        let muzzle = Vec2::new(
            if self.facing >= 0 { bounds.right() } else { bounds.left() },
            bounds.top() + bounds.size.y / 2.0,
        );
        self.projectiles.push(Projectile::aimed(
            muzzle,
            target,
            tuning.boss_projectile_speed,
            tuning.boss_projectile_damage as u32,
            ProjectileOwner::Boss,
        ));
        self.shoot_cooldown = tuning.boss_shoot_cooldown;
        FireEvent { pos: muzzle, facing: self.facing }
    }

    /// Advance one tick of boss AI toward the player's center
    pub fn update(
        &mut self,
        player_center: Vec2,
        ground_y: f32,
        tuning: &Tuning,
        dt: f32,
    ) -> Vec<FireEvent> {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.special_cooldown = self.special_cooldown.saturating_sub(1);
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        self.jump_cooldown = self.jump_cooldown.saturating_sub(1);
        self.hurt_flash = self.hurt_flash.saturating_sub(1);
        if self.attack_window > 0 {
            self.attack_window -= 1;
            if self.attack_window == 0 {
                self.window_hit_player = false;
                self.window_hit_companion = false;
            }
        }
        if self.special_window > 0 {
            self.special_window -= 1;
            if self.special_window == 0 {
                self.special_hit_player = false;
                self.special_hit_companion = false;
            }
        }
        self.move_timer += 1;
        self.shoot_timer += 1;

        let phase = self.phase();
        let speed = tuning.boss_phase_speed[(phase - 1) as usize];
        let distance = player_center.x - (self.pos.x + self.size.x / 2.0);
        let abs_distance = distance.abs();
        self.facing = if distance >= 0.0 { 1 } else { -1 };

        // Movement pattern per phase
        match phase {
            1 => {
                if abs_distance > tuning.boss_attack_range {
                    self.pos.x += distance.signum() * speed * dt;
                }
            }
            2 => {
                if abs_distance > tuning.boss_attack_range {
                    self.pos.x += distance.signum() * speed * dt;
                }
                if self.move_timer % 120 == 0 && self.grounded && self.jump_cooldown == 0 {
                    self.vel_y = -480.0;
                    self.grounded = false;
                    self.jump_cooldown = 60;
                }
            }
            _ => {
                // Zig-zag: lunge forward, then give ground
                if self.move_timer % 60 < 30 {
                    self.pos.x += distance.signum() * speed * 1.2 * dt;
                } else {
                    self.pos.x -= distance.signum() * speed * 0.5 * dt;
                }
                if self.move_timer % 80 == 0 && self.grounded && self.jump_cooldown == 0 {
                    self.vel_y = -600.0;
                    self.grounded = false;
                    self.jump_cooldown = 40;
                }
            }
        }

        // Jump physics and ground contact
        self.vel_y += GRAVITY * dt;
        self.pos.y += self.vel_y * dt;
        let floor = ground_y - self.size.y;
        if self.pos.y >= floor {
            self.pos.y = floor;
            self.vel_y = 0.0;
            self.grounded = true;
        }

        // Melee attacks inside reach; the special replaces the normal swing
        // once phase 3 unlocks it
        if abs_distance <= tuning.boss_attack_range {
            if phase == 3 && self.special_cooldown == 0 {
                self.special_window = tuning.boss_special_window;
                self.special_cooldown = tuning.boss_special_cooldown;
                self.special_hit_player = false;
                self.special_hit_companion = false;
            } else if self.attack_cooldown == 0 {
                self.attack_window = tuning.boss_attack_window;
                self.attack_cooldown = tuning.boss_attack_cooldown;
                self.window_hit_player = false;
                self.window_hit_companion = false;
            }
        }

        // Ranged cadence outside melee reach: none / occasional / frequent
        let mut fired = Vec::new();
        if abs_distance > tuning.boss_attack_range && self.shoot_cooldown == 0 {
            match phase {
                2 if self.shoot_timer % 90 == 0 => {
                    fired.push(self.shoot_at(player_center, tuning));
                }
                3 if self.shoot_timer % 60 == 0 => {
                    fired.push(self.shoot_at(player_center, tuning));
                    // Second shot lands 12 ticks later (was a setTimeout)
                    self.pending_double = 12;
                }
                _ => {}
            }
        }
        if self.pending_double > 0 {
            self.pending_double -= 1;
            if self.pending_double == 0 {
                fired.push(self.shoot_at(player_center, tuning));
            }
        }

        self.pos.x = self.pos.x.clamp(0.0, WORLD_WIDTH - self.size.x);

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        self.projectiles.retain(|p| p.active);

        fired
    }
}

/// Companion granted after the final pre-boss wave. Follows the player and
/// snipes the boss; whether it can die is a settings switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Companion {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub facing: i8,
    pub shoot_cooldown: u32,
    pub hurt_flash: u32,
    pub projectiles: Vec<Projectile>,
}

impl Companion {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            size: Vec2::new(25.0, 25.0),
            health: tuning.companion_max_health,
            max_health: tuning.companion_max_health,
            facing: 1,
            shoot_cooldown: 0,
            hurt_flash: 0,
            projectiles: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        apply_damage(&mut self.health, amount);
        self.hurt_flash = HURT_FLASH_TICKS;
    }

    pub fn update(
        &mut self,
        player_center: Vec2,
        boss_center: Option<Vec2>,
        ground_y: f32,
        tuning: &Tuning,
        dt: f32,
    ) -> Option<FireEvent> {
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        self.hurt_flash = self.hurt_flash.saturating_sub(1);

        // Keep a fixed trailing distance from the player
        let to_player = player_center - self.pos;
        let distance = to_player.length();
        if distance > tuning.companion_follow_distance {
            self.pos += to_player.normalize_or_zero() * tuning.companion_speed * dt;
        } else if distance < tuning.companion_follow_distance - 10.0 {
            self.pos -= to_player.normalize_or_zero() * tuning.companion_speed * 0.5 * dt;
        }
        self.facing = if to_player.x >= 0.0 { 1 } else { -1 };

        self.pos.x = self.pos.x.clamp(0.0, WORLD_WIDTH - self.size.x);
        // Gentle float back down to the ground
        let floor = ground_y - self.size.y;
        if self.pos.y < floor {
            self.pos.y = (self.pos.y + 18.0 * dt).min(floor);
        } else {
            self.pos.y = floor;
        }

        let mut fired = None;
        if let Some(target) = boss_center {
            let range = (target - self.bounds().center()).length();
            if range < tuning.companion_attack_range && self.shoot_cooldown == 0 {
                let muzzle = self.bounds().center();
                self.projectiles.push(Projectile::aimed(
                    muzzle,
                    target,
                    tuning.companion_projectile_speed,
                    tuning.companion_projectile_damage as u32,
                    ProjectileOwner::Companion,
                ));
                self.shoot_cooldown = tuning.companion_shoot_cooldown;
                self.facing = if target.x >= muzzle.x { 1 } else { -1 };
                fired = Some(FireEvent { pos: muzzle, facing: self.facing });
            }
        }

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        self.projectiles.retain(|p| p.active);

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::ground_y;
    use proptest::prelude::*;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    #[test]
    fn test_boss_phase_thresholds() {
        let t = tuning();
        let mut boss = Boss::new(900.0, ground_y(), &t);
        assert_eq!(boss.phase(), 1);
        boss.health = boss.max_health * 0.6;
        assert_eq!(boss.phase(), 1);
        boss.health = boss.max_health * 0.59;
        assert_eq!(boss.phase(), 2);
        boss.health = boss.max_health * 0.3;
        assert_eq!(boss.phase(), 2);
        boss.health = boss.max_health * 0.29;
        assert_eq!(boss.phase(), 3);
    }

    #[test]
    fn test_boss_phase_not_sticky() {
        // Healing back above a threshold must restore the earlier phase
        let t = tuning();
        let mut boss = Boss::new(900.0, ground_y(), &t);
        boss.health = boss.max_health * 0.1;
        assert_eq!(boss.phase(), 3);
        boss.health = boss.max_health;
        assert_eq!(boss.phase(), 1);
    }

    proptest! {
        #[test]
        fn prop_boss_phase_is_pure(pct in 0.0f32..=1.0) {
            let t = tuning();
            let mut boss = Boss::new(900.0, ground_y(), &t);
            boss.health = boss.max_health * pct;
            let expected = if pct >= 0.6 { 1 } else if pct >= 0.3 { 2 } else { 3 };
            prop_assert_eq!(boss.phase(), expected);
        }

        #[test]
        fn prop_damage_clamps_at_zero(start in 0.0f32..=300.0, dmg in 0.0f32..=1000.0) {
            let t = tuning();
            let mut enemy = Enemy::new(1, 500.0, ground_y(), &t);
            enemy.health = start;
            enemy.take_damage(dmg);
            prop_assert!(enemy.health >= 0.0);
            prop_assert!(enemy.health <= enemy.max_health);
        }

        #[test]
        fn prop_heal_clamps_at_max(dmg in 0.0f32..=150.0, heal in 0.0f32..=500.0) {
            let t = tuning();
            let mut player = Player::new(Vec2::new(100.0, 300.0), WeaponKind::Melee, &t);
            player.take_damage(dmg);
            player.heal(heal);
            prop_assert!(player.health >= 0.0);
            prop_assert!(player.health <= player.max_health);
        }
    }

    #[test]
    fn test_enemy_approaches_then_attacks() {
        let t = tuning();
        let mut enemy = Enemy::new(1, 600.0, ground_y(), &t);
        let player_x = 100.0;

        enemy.update(player_x, ground_y(), &t, SIM_DT);
        assert!(enemy.pos.x < 600.0, "moves toward the player");
        assert_eq!(enemy.attack_window, 0);

        // Teleport into range: attack window opens, cooldown resets
        enemy.pos.x = player_x + 10.0;
        enemy.update(player_x, ground_y(), &t, SIM_DT);
        assert!(enemy.attack_window > 0);
        assert_eq!(enemy.attack_cooldown, t.enemy_attack_cooldown);

        // In range but on cooldown: no second window after this one closes
        for _ in 0..t.enemy_attack_window {
            enemy.update(player_x, ground_y(), &t, SIM_DT);
        }
        assert_eq!(enemy.attack_window, 0);
        assert!(enemy.attack_cooldown > 0);
    }

    #[test]
    fn test_player_jump_and_land() {
        let t = tuning();
        let mut player = Player::new(Vec2::new(100.0, ground_y() - 60.0), WeaponKind::Melee, &t);
        let jump = PlayerInput { jump: true, ..Default::default() };

        player.update(&jump, Some(ground_y()), &t, SIM_DT);
        assert!(!player.grounded);
        assert!(player.vel.y < 0.0);

        // Holding jump must not re-trigger mid-air; gravity brings the
        // player back down to a grounded rest
        for _ in 0..300 {
            player.update(&jump, Some(ground_y()), &t, SIM_DT);
        }
        assert!(player.grounded);
        assert_eq!(player.bounds().bottom(), ground_y());
    }

    #[test]
    fn test_player_melee_window_one_hit_per_target() {
        let t = tuning();
        let mut player = Player::new(Vec2::new(100.0, 300.0), WeaponKind::Melee, &t);
        let swing = PlayerInput { melee: true, ..Default::default() };
        player.update(&swing, Some(ground_y()), &t, SIM_DT);
        assert!(player.attack_window > 0);

        assert!(player.can_strike(7));
        player.mark_struck(7);
        assert!(!player.can_strike(7));
        assert!(player.can_strike(8));

        // Window expires and the ledger clears
        for _ in 0..t.player_attack_window {
            player.update(&PlayerInput::default(), Some(ground_y()), &t, SIM_DT);
        }
        assert_eq!(player.attack_window, 0);
        assert!(!player.can_strike(8), "closed window strikes nothing");
    }

    #[test]
    fn test_player_crouch_keeps_feet_planted() {
        let t = tuning();
        let mut player = Player::new(Vec2::new(100.0, ground_y() - 60.0), WeaponKind::Melee, &t);
        player.update(&PlayerInput::default(), Some(ground_y()), &t, SIM_DT);
        let standing_bottom = player.bounds().bottom();

        let crouch = PlayerInput { crouch: true, ..Default::default() };
        player.update(&crouch, Some(ground_y()), &t, SIM_DT);
        assert!(player.crouching);
        assert_eq!(player.bounds().size.y, player.crouch_height);
        assert!((player.bounds().bottom() - standing_bottom).abs() < 0.01);
    }

    #[test]
    fn test_player_shoot_respects_cooldown() {
        let t = tuning();
        let mut player = Player::new(Vec2::new(100.0, 300.0), WeaponKind::Ranged, &t);
        let fire = PlayerInput { shoot: true, ..Default::default() };

        assert!(player.update(&fire, Some(ground_y()), &t, SIM_DT).is_some());
        assert_eq!(player.projectiles.len(), 1);
        assert!(player.update(&fire, Some(ground_y()), &t, SIM_DT).is_none());

        for _ in 0..t.player_shoot_cooldown {
            player.update(&PlayerInput::default(), Some(ground_y()), &t, SIM_DT);
        }
        assert!(player.update(&fire, Some(ground_y()), &t, SIM_DT).is_some());
    }

    #[test]
    fn test_boss_double_shot_in_phase_three() {
        let t = tuning();
        let mut boss = Boss::new(900.0, ground_y(), &t);
        boss.health = boss.max_health * 0.1; // phase 3
        let far_player = Vec2::new(100.0, ground_y() - 30.0);

        let mut shots = 0;
        for _ in 0..140 {
            shots += boss.update(far_player, ground_y(), &t, SIM_DT).len();
        }
        // Volleys at ticks 60 and 120, each doubled 12 ticks later
        assert_eq!(shots, 4);
    }

    #[test]
    fn test_boss_holds_fire_in_phase_one() {
        let t = tuning();
        let mut boss = Boss::new(900.0, ground_y(), &t);
        let far_player = Vec2::new(100.0, ground_y() - 30.0);
        for _ in 0..600 {
            assert!(boss.update(far_player, ground_y(), &t, SIM_DT).is_empty());
        }
        assert!(boss.projectiles.is_empty());
    }

    #[test]
    fn test_companion_keeps_follow_distance() {
        let t = tuning();
        let mut companion = Companion::new(Vec2::new(500.0, ground_y() - 25.0), &t);
        let player_center = Vec2::new(100.0, ground_y() - 30.0);
        for _ in 0..600 {
            companion.update(player_center, None, ground_y(), &t, SIM_DT);
        }
        let distance = (player_center - companion.pos).length();
        assert!(distance < t.companion_follow_distance + 20.0);
        assert!(!companion.is_dead());
    }

    #[test]
    fn test_companion_fires_only_in_range() {
        let t = tuning();
        let mut companion = Companion::new(Vec2::new(100.0, ground_y() - 25.0), &t);
        let player_center = Vec2::new(100.0, ground_y() - 30.0);

        let far_boss = Some(Vec2::new(1000.0, ground_y() - 50.0));
        assert!(companion.update(player_center, far_boss, ground_y(), &t, SIM_DT).is_none());

        let near_boss = Some(Vec2::new(250.0, ground_y() - 50.0));
        assert!(companion.update(player_center, near_boss, ground_y(), &t, SIM_DT).is_some());
        assert_eq!(companion.projectiles.len(), 1);
    }
}
