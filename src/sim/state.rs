//! Encounter state: the full simulation snapshot plus phase bookkeeping
//!
//! Everything the tick function reads or writes lives here. The struct is
//! plain data; all evolution happens in `tick`. Constructing with the same
//! seed, weapon and tuning always yields the same playthrough for the same
//! input stream.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::combatant::{Boss, Companion, Enemy, Player};
use super::effects::{CameraShake, DamageNumber, ParticleSystem, color};
use crate::assets::WeaponKind;
use crate::consts::WORLD_WIDTH;
use crate::ground_y;
use crate::tuning::Tuning;

/// Waves fought before the boss chain begins
pub const WAVE_COUNT: u32 = 3;

/// Encounter phases, in play order. `Victory` and `GameOver` are terminal
/// until a restart command arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterPhase {
    /// Short scripted beat before control is handed to the player
    Intro,
    /// Fight the current wave until every enemy is dead
    Wave,
    /// Jumping section; falling into the pit ends the run
    PlatformCourse,
    /// Walk to the chest and collect it
    Chest,
    /// The companion joins after the final wave
    CompanionIntro,
    /// Boss entrance ramp, invulnerable and non-interactive
    BossIntro,
    Boss,
    Victory,
    GameOver,
}

/// One-shot chest contents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChestReward {
    pub score: u64,
    pub heal: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chest {
    pub pos: Vec2,
    pub size: Vec2,
    pub opened: bool,
}

impl Chest {
    pub fn new(x: f32, ground: f32) -> Self {
        let size = Vec2::new(40.0, 30.0);
        Self { pos: Vec2::new(x, ground - size.y), size, opened: false }
    }

    pub fn bounds(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    /// Grant the reward exactly once; later touches return `None`
    pub fn open(&mut self, tuning: &Tuning, player_max_health: f32) -> Option<ChestReward> {
        if self.opened {
            return None;
        }
        self.opened = true;
        Some(ChestReward {
            score: tuning.chest_score,
            heal: player_max_health * tuning.heal_fraction,
        })
    }
}

/// Course-completion pickup sitting near the goal platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: Vec2,
    pub collected: bool,
}

impl Star {
    pub fn new(center: Vec2) -> Self {
        let size = Vec2::new(30.0, 30.0);
        Self { pos: center - size / 2.0, size, collected: false }
    }

    pub fn bounds(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }
}

/// Static course geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub size: Vec2,
    pub goal: bool,
}

impl Platform {
    pub fn bounds(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterState {
    pub seed: u64,
    pub tick: u64,
    pub phase: EncounterPhase,
    /// Phase queued behind `transition_timer` ticks of delay
    pub pending_phase: Option<EncounterPhase>,
    pub transition_timer: u32,
    /// Remaining ticks of the boss entrance ramp (BossIntro only)
    pub boss_intro_timer: u32,
    /// 1-based wave counter
    pub wave: u32,

    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub companion: Option<Companion>,
    pub companion_mortal: bool,
    pub platforms: Vec<Platform>,
    pub star: Option<Star>,
    pub chest: Option<Chest>,

    pub score: u64,
    pub combo: u32,
    pub combo_timer: u32,

    pub next_entity_id: u32,
    pub tuning: Tuning,

    #[serde(skip)]
    pub particles: ParticleSystem,
    #[serde(skip)]
    pub shake: CameraShake,
    #[serde(skip)]
    pub damage_numbers: Vec<DamageNumber>,
}

impl EncounterState {
    pub fn new(seed: u64, weapon: WeaponKind, tuning: Tuning, companion_mortal: bool) -> Self {
        let player = Player::new(
            Vec2::new(100.0, ground_y() - 60.0),
            weapon,
            &tuning,
        );
        Self {
            seed,
            tick: 0,
            phase: EncounterPhase::Intro,
            pending_phase: Some(EncounterPhase::Wave),
            transition_timer: 60,
            boss_intro_timer: 0,
            wave: 0,
            player,
            enemies: Vec::new(),
            boss: None,
            companion: None,
            companion_mortal,
            platforms: Vec::new(),
            star: None,
            chest: None,
            score: 0,
            combo: 0,
            combo_timer: 0,
            next_entity_id: 1,
            tuning,
            particles: ParticleSystem::new(),
            shake: CameraShake::default(),
            damage_numbers: Vec::new(),
        }
    }

    /// Current score multiplier from the live combo
    pub fn multiplier(&self) -> f32 {
        (1.0 + self.tuning.combo_step * self.combo as f32).min(self.tuning.combo_cap)
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Extend the combo, then bank `base * multiplier` at the new standing:
    /// the first kill of a chain already carries the stepped-up multiplier
    pub fn award_kill(&mut self, base: u64, at: Vec2) {
        self.combo += 1;
        self.combo_timer = self.tuning.combo_window;
        let earned = (base as f32 * self.multiplier()).floor() as u64;
        self.score += earned;
        log::debug!("kill: +{earned} (combo {})", self.combo);
        self.damage_numbers.push(DamageNumber::new(
            at,
            earned as u32,
            color::SCORE,
            self.tick as u32,
        ));
    }

    /// Flat score award with a floating number, no combo interaction
    pub fn award_score(&mut self, amount: u64, at: Vec2) {
        self.score += amount;
        log::debug!("pickup: +{amount}");
        self.damage_numbers.push(DamageNumber::new(
            at,
            amount as u32,
            color::SCORE,
            self.tick as u32,
        ));
    }

    /// Queue a phase switch after `delay` ticks of breathing room
    pub fn schedule_phase(&mut self, next: EncounterPhase, delay: u32) {
        self.pending_phase = Some(next);
        self.transition_timer = delay;
    }

    /// End-of-segment heal: a fraction of max health, clamped at max
    pub fn heal_player(&mut self) {
        let amount = self.player.max_health * self.tuning.heal_fraction;
        self.player.heal(amount);
    }

    /// Deterministic per-wave RNG; wave layout never depends on how the
    /// previous wave was played
    fn wave_rng(&self, salt: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ salt.wrapping_mul(2654435761))
    }

    /// Populate `enemies` for the given 1-based wave number.
    ///
    /// Wave 1 spawns everything to the player's right; later waves split the
    /// pack so at least two enemies flank from the left.
    pub fn spawn_wave(&mut self, wave: u32) {
        let mut rng = self.wave_rng(wave as u64);
        let count = 3 + (wave - 1);
        self.enemies.clear();
        for i in 0..count {
            let from_left = wave > 1 && i < 2;
            let x = if from_left {
                rng.random_range(20.0..160.0)
            } else {
                rng.random_range(WORLD_WIDTH - 400.0..WORLD_WIDTH - 60.0)
            };
            let id = self.alloc_id();
            self.enemies.push(Enemy::new(id, x, ground_y(), &self.tuning));
        }
        self.wave = wave;
        log::info!("wave {wave}: {count} enemies");
    }

    /// Lay out the jumping section: a start ledge, 3-5 seeded hop platforms,
    /// and a goal platform carrying the star. The player is moved onto the
    /// start ledge; there is no ground underneath until the course ends.
    pub fn build_platform_course(&mut self) {
        let mut rng = self.wave_rng(1000 + self.wave as u64);
        self.platforms.clear();

        let start = Platform {
            pos: Vec2::new(40.0, ground_y() - 20.0),
            size: Vec2::new(160.0, 20.0),
            goal: false,
        };
        self.player.pos = Vec2::new(100.0, start.top() - self.player.size.y);
        self.player.vel = Vec2::ZERO;
        self.player.grounded = true;

        let hops: u32 = rng.random_range(3..=5);
        let mut x = start.bounds().right();
        let mut y = start.top();
        self.platforms.push(start);

        for _ in 0..hops {
            x += rng.random_range(80.0..160.0);
            y = (y + rng.random_range(-80.0..40.0)).clamp(ground_y() - 240.0, ground_y() - 20.0);
            let width = rng.random_range(80.0..120.0);
            self.platforms.push(Platform {
                pos: Vec2::new(x, y),
                size: Vec2::new(width, 20.0),
                goal: false,
            });
            x += width;
        }

        x += rng.random_range(80.0..140.0);
        let goal = Platform {
            pos: Vec2::new(x.min(WORLD_WIDTH - 180.0), ground_y() - 40.0),
            size: Vec2::new(160.0, 40.0),
            goal: true,
        };
        self.star = Some(Star::new(Vec2::new(
            goal.bounds().center().x,
            goal.top() - 50.0,
        )));
        self.platforms.push(goal);
        log::info!("platform course: {} platforms", self.platforms.len());
    }

    /// Place the chest a short walk from the player
    pub fn spawn_chest(&mut self) {
        let mut rng = self.wave_rng(2000 + self.wave as u64);
        let x = rng.random_range(WORLD_WIDTH * 0.55..WORLD_WIDTH * 0.8);
        self.chest = Some(Chest::new(x, ground_y()));
    }
}
