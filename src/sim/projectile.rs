//! Ballistic projectiles
//!
//! Fired by the player's ranged weapon, the boss and the companion. Each
//! projectile carries its own damage and is consumed on the first valid hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::{PROJECTILE_GRAVITY, WORLD_HEIGHT, WORLD_WIDTH};

/// Who fired a projectile; decides which targets it may hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Boss,
    Companion,
}

/// Trail point for rendering (newest first)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub life: u8,
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: u32,
    pub owner: ProjectileOwner,
    pub active: bool,
    #[serde(skip)]
    pub trail: Vec<TrailPoint>,
}

impl Projectile {
    /// Straight shot along the facing direction with a slight ballistic drop
    pub fn fired(pos: Vec2, facing: i8, speed: f32, damage: u32, owner: ProjectileOwner) -> Self {
        Self {
            pos,
            vel: Vec2::new(facing as f32 * speed, 0.0),
            size: Vec2::new(6.0, 6.0),
            damage,
            owner,
            active: true,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Aimed shot toward a target point (boss and companion fire these)
    pub fn aimed(pos: Vec2, target: Vec2, speed: f32, damage: u32, owner: ProjectileOwner) -> Self {
        let dir = (target - pos).normalize_or_zero();
        Self {
            pos,
            vel: dir * speed,
            size: Vec2::new(6.0, 6.0),
            damage,
            owner,
            active: true,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Integrate one tick: record trail, apply gravity-curved motion,
    /// deactivate once outside world bounds.
    pub fn update(&mut self, dt: f32) {
        self.trail.insert(0, TrailPoint { pos: self.pos, life: TRAIL_LENGTH as u8 });
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
        for point in &mut self.trail {
            point.life = point.life.saturating_sub(1);
        }
        self.trail.retain(|p| p.life > 0);

        self.pos += self.vel * dt;
        self.vel.y += PROJECTILE_GRAVITY * dt;

        if self.pos.x < 0.0 || self.pos.x > WORLD_WIDTH || self.pos.y < 0.0 || self.pos.y > WORLD_HEIGHT
        {
            self.active = false;
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    /// Hit test against a target box; inactive projectiles never hit
    pub fn hits(&self, target: &Rect) -> bool {
        self.active && self.bounds().intersects(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_curves_down() {
        let mut p = Projectile::fired(Vec2::new(100.0, 300.0), 1, 600.0, 10, ProjectileOwner::Player);
        let vy0 = p.vel.y;
        for _ in 0..30 {
            p.update(1.0 / 60.0);
        }
        assert!(p.vel.y > vy0, "gravity must curve the arc downward");
        assert!(p.pos.x > 100.0);
        assert!(p.active);
    }

    #[test]
    fn test_deactivates_out_of_bounds() {
        let mut p = Projectile::fired(Vec2::new(WORLD_WIDTH - 5.0, 300.0), 1, 600.0, 10, ProjectileOwner::Player);
        for _ in 0..10 {
            p.update(1.0 / 60.0);
        }
        assert!(!p.active);
    }

    #[test]
    fn test_inactive_never_hits() {
        let mut p = Projectile::fired(Vec2::new(50.0, 50.0), 1, 0.0, 10, ProjectileOwner::Boss);
        let target = Rect::new(40.0, 40.0, 30.0, 30.0);
        assert!(p.hits(&target));
        p.active = false;
        assert!(!p.hits(&target));
    }

    #[test]
    fn test_aimed_shot_points_at_target() {
        let p = Projectile::aimed(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 100.0),
            420.0,
            5,
            ProjectileOwner::Companion,
        );
        assert!((p.vel.x - p.vel.y).abs() < 0.001);
        assert!((p.vel.length() - 420.0).abs() < 0.01);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut p = Projectile::fired(Vec2::new(600.0, 300.0), 1, 60.0, 10, ProjectileOwner::Player);
        for _ in 0..20 {
            p.update(1.0 / 60.0);
        }
        assert!(p.trail.len() <= TRAIL_LENGTH);
    }
}
