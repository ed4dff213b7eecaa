//! Cosmetic feedback systems: particles, camera shake, damage numbers
//!
//! These are pure event sinks. Combat pushes bursts in; each system ages its
//! own entries and prunes the expired ones. Nothing in here is ever read back
//! by collision or state-transition logic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{cosmetic_hash, hash_unit};

/// Color tags resolved to actual colors by the presentation layer
pub mod color {
    pub const PLAYER_HIT: u32 = 0;
    pub const ENEMY_HIT: u32 = 1;
    pub const DEATH: u32 = 2;
    pub const REWARD: u32 = 3;
    pub const MUZZLE: u32 = 4;
    pub const EXPLOSION: u32 = 5;
    pub const SPECIAL: u32 = 6;
    pub const SCORE: u32 = 7;
    pub const COMPANION: u32 = 8;
}

/// A single cosmetic particle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub color: u32,
    pub size: f32,
}

/// Maximum live particles; oldest are evicted first when full
pub const MAX_PARTICLES: usize = 256;

/// Particle gravity in px/s^2
const PARTICLE_GRAVITY: f32 = 360.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    #[serde(skip)]
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    fn push(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Eight-point ring burst on any damage event
    pub fn hit_burst(&mut self, at: Vec2, color: u32, seed: u32) {
        for i in 0..8 {
            let h = cosmetic_hash(seed, i);
            let angle = std::f32::consts::TAU * i as f32 / 8.0;
            let speed = 120.0 + hash_unit(h) * 120.0;
            self.push(Particle {
                pos: at,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 20,
                max_life: 20,
                color,
                size: 3.0 + hash_unit(h >> 8) * 3.0,
            });
        }
    }

    /// Larger scattered fan when something dies
    pub fn death_burst(&mut self, at: Vec2, seed: u32) {
        for i in 0..15 {
            let h = cosmetic_hash(seed, 100 + i);
            let angle = hash_unit(h) * std::f32::consts::TAU;
            let speed = 60.0 + hash_unit(h >> 6) * 180.0;
            self.push(Particle {
                pos: at,
                // Slight upward bias so debris pops before falling
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - 60.0),
                life: 30,
                max_life: 30,
                color: color::DEATH,
                size: 4.0 + hash_unit(h >> 12) * 4.0,
            });
        }
    }

    /// Golden 20-point fan for chest/star rewards
    pub fn reward_burst(&mut self, at: Vec2, seed: u32) {
        for i in 0..20 {
            let h = cosmetic_hash(seed, 200 + i);
            let angle = std::f32::consts::TAU * i as f32 / 20.0;
            let speed = 60.0 + hash_unit(h) * 120.0;
            self.push(Particle {
                pos: at,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - 30.0),
                life: 40,
                max_life: 40,
                color: color::REWARD,
                size: 3.0 + hash_unit(h >> 8) * 3.0,
            });
        }
    }

    /// Short directional cone at a gun muzzle
    pub fn muzzle_flash(&mut self, at: Vec2, facing: i8, seed: u32) {
        let base = if facing >= 0 { 0.0 } else { std::f32::consts::PI };
        for i in 0..12 {
            let h = cosmetic_hash(seed, 300 + i);
            let angle = base + (hash_unit(h) - 0.5) * 0.5;
            let speed = 180.0 + hash_unit(h >> 6) * 180.0;
            self.push(Particle {
                pos: at,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 8,
                max_life: 8,
                color: color::MUZZLE,
                size: 2.0 + hash_unit(h >> 12) * 3.0,
            });
        }
    }

    /// Big omnidirectional blast (boss death, fall death)
    pub fn explosion(&mut self, at: Vec2, color: u32, seed: u32) {
        for i in 0..25 {
            let h = cosmetic_hash(seed, 400 + i);
            let angle = hash_unit(h) * std::f32::consts::TAU;
            let speed = 120.0 + hash_unit(h >> 6) * 240.0;
            self.push(Particle {
                pos: at,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - 60.0),
                life: 25,
                max_life: 25,
                color,
                size: 4.0 + hash_unit(h >> 12) * 5.0,
            });
        }
    }

    /// Age every particle one tick and drop the expired ones
    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.vel.y += PARTICLE_GRAVITY * dt;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }
}

/// Screen shake driven by impact events, decaying exponentially
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CameraShake {
    pub intensity: f32,
}

impl CameraShake {
    /// Impacts keep the strongest pending shake rather than stacking
    pub fn add(&mut self, intensity: f32) {
        self.intensity = self.intensity.max(intensity);
    }

    pub fn update(&mut self) {
        self.intensity *= 0.9;
        if self.intensity < 0.1 {
            self.intensity = 0.0;
        }
    }

    /// Deterministic per-tick offset for the renderer
    pub fn offset(&self, tick: u64) -> Vec2 {
        if self.intensity == 0.0 {
            return Vec2::ZERO;
        }
        let h = cosmetic_hash(tick as u32, 77);
        Vec2::new(
            (hash_unit(h) - 0.5) * self.intensity,
            (hash_unit(h >> 10) - 0.5) * self.intensity,
        )
    }
}

/// Floating combat text entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub vel: Vec2,
    pub value: u32,
    pub life: u32,
    pub max_life: u32,
    pub color: u32,
}

impl DamageNumber {
    pub fn new(at: Vec2, value: u32, color: u32, seed: u32) -> Self {
        let h = cosmetic_hash(seed, 500);
        Self {
            pos: at,
            vel: Vec2::new((hash_unit(h) - 0.5) * 120.0, -180.0),
            value,
            life: 60,
            max_life: 60,
            color,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel.y += PARTICLE_GRAVITY * dt;
        self.life = self.life.saturating_sub(1);
    }

    pub fn expired(&self) -> bool {
        self.life == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_self_prune() {
        let mut ps = ParticleSystem::new();
        ps.hit_burst(Vec2::new(100.0, 100.0), color::ENEMY_HIT, 1);
        assert_eq!(ps.particles().len(), 8);
        for _ in 0..25 {
            ps.update(1.0 / 60.0);
        }
        assert!(ps.particles().is_empty());
    }

    #[test]
    fn test_particle_cap_evicts_oldest() {
        let mut ps = ParticleSystem::new();
        for i in 0..20 {
            ps.explosion(Vec2::ZERO, color::EXPLOSION, i);
        }
        assert_eq!(ps.particles().len(), MAX_PARTICLES);
    }

    #[test]
    fn test_bursts_are_deterministic() {
        let mut a = ParticleSystem::new();
        let mut b = ParticleSystem::new();
        a.death_burst(Vec2::new(50.0, 50.0), 42);
        b.death_burst(Vec2::new(50.0, 50.0), 42);
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.vel, pb.vel);
            assert_eq!(pa.size, pb.size);
        }
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut shake = CameraShake::default();
        shake.add(10.0);
        shake.add(3.0);
        assert_eq!(shake.intensity, 10.0);
        for _ in 0..60 {
            shake.update();
        }
        assert_eq!(shake.intensity, 0.0);
        assert_eq!(shake.offset(7), Vec2::ZERO);
    }

    #[test]
    fn test_damage_number_lifetime() {
        let mut num = DamageNumber::new(Vec2::new(10.0, 10.0), 20, color::ENEMY_HIT, 9);
        for _ in 0..59 {
            num.update(1.0 / 60.0);
            assert!(!num.expired());
        }
        num.update(1.0 / 60.0);
        assert!(num.expired());
    }
}
