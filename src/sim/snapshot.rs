//! Read-only presentation view of one simulation tick
//!
//! The renderer never touches `EncounterState` directly; it gets a snapshot
//! of logical geometry with sprite handles and mirror bits already resolved.
//! Capturing is strictly a read: the simulation cannot be influenced from
//! the presentation side.

use glam::Vec2;
use serde::Serialize;

use super::effects::{DamageNumber, Particle};
use super::projectile::{Projectile, ProjectileOwner};
use super::state::{EncounterPhase, EncounterState};
use crate::assets::{SpriteBundle, SpriteRef, mirror_for};

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub pos: Vec2,
    pub size: Vec2,
    pub facing: i8,
    /// 0.0..=1.0 of max health
    pub health_frac: f32,
    /// Ticks of hurt-flash remaining
    pub hurt: u32,
    pub sprite: Option<String>,
    pub mirror: bool,
}

impl EntityView {
    fn new(
        pos: Vec2,
        size: Vec2,
        facing: i8,
        health: f32,
        max_health: f32,
        hurt: u32,
        sprite: Option<&SpriteRef>,
    ) -> Self {
        Self {
            pos,
            size,
            facing,
            health_frac: if max_health > 0.0 { health / max_health } else { 0.0 },
            hurt,
            sprite: sprite.map(|s| s.handle.clone()),
            mirror: mirror_for(facing, sprite.is_some_and(|s| s.needs_flip)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub size: Vec2,
    pub owner: ProjectileOwner,
    pub trail: Vec<Vec2>,
}

impl ProjectileView {
    fn from(projectile: &Projectile) -> Self {
        Self {
            pos: projectile.pos,
            size: projectile.size,
            owner: projectile.owner,
            trail: projectile.trail.iter().map(|t| t.pos).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformView {
    pub pos: Vec2,
    pub size: Vec2,
    pub goal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropView {
    pub pos: Vec2,
    pub size: Vec2,
    /// Opened chest / collected star
    pub spent: bool,
}

/// Everything the HUD displays
#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    pub phase: EncounterPhase,
    pub wave: u32,
    pub score: u64,
    pub combo: u32,
    pub multiplier: f32,
    pub player_health: f32,
    pub player_max_health: f32,
    /// Present during the boss fight only
    pub boss_health_frac: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub camera_offset: Vec2,
    pub player: EntityView,
    pub enemies: Vec<EntityView>,
    pub boss: Option<EntityView>,
    pub companion: Option<EntityView>,
    pub projectiles: Vec<ProjectileView>,
    pub platforms: Vec<PlatformView>,
    pub chest: Option<PropView>,
    pub star: Option<PropView>,
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<DamageNumber>,
    /// 0.0..=1.0 entrance ramp, present during `BossIntro`
    pub boss_intro_progress: Option<f32>,
    pub hud: HudView,
    pub background: Option<String>,
    pub ground_sprite: Option<String>,
}

impl RenderSnapshot {
    pub fn capture(state: &EncounterState, bundle: &SpriteBundle) -> Self {
        let player = &state.player;
        let player_view = {
            let body = player.bounds();
            EntityView::new(
                body.pos,
                body.size,
                player.facing,
                player.health,
                player.max_health,
                player.hurt_flash,
                bundle.hero.as_ref(),
            )
        };

        let enemies = state
            .enemies
            .iter()
            .map(|e| {
                EntityView::new(
                    e.pos,
                    e.size,
                    e.facing,
                    e.health,
                    e.max_health,
                    e.hurt_flash,
                    bundle.monster.as_ref(),
                )
            })
            .collect();

        let boss = state.boss.as_ref().map(|b| {
            EntityView::new(
                b.pos,
                b.size,
                b.facing,
                b.health,
                b.max_health,
                b.hurt_flash,
                bundle.boss.as_ref(),
            )
        });

        let companion = state.companion.as_ref().map(|c| {
            EntityView::new(
                c.pos,
                c.size,
                c.facing,
                c.health,
                c.max_health,
                c.hurt_flash,
                bundle.companion.as_ref(),
            )
        });

        let mut projectiles: Vec<ProjectileView> =
            state.player.projectiles.iter().map(ProjectileView::from).collect();
        if let Some(b) = &state.boss {
            projectiles.extend(b.projectiles.iter().map(ProjectileView::from));
        }
        if let Some(c) = &state.companion {
            projectiles.extend(c.projectiles.iter().map(ProjectileView::from));
        }

        let platforms = state
            .platforms
            .iter()
            .map(|p| PlatformView { pos: p.pos, size: p.size, goal: p.goal })
            .collect();

        let chest = state
            .chest
            .as_ref()
            .map(|c| PropView { pos: c.pos, size: c.size, spent: c.opened });
        let star = state
            .star
            .as_ref()
            .map(|s| PropView { pos: s.pos, size: s.size, spent: s.collected });

        let boss_intro_progress = (state.phase == EncounterPhase::BossIntro)
            .then(|| 1.0 - state.boss_intro_timer as f32 / 120.0);

        Self {
            camera_offset: state.shake.offset(state.tick),
            player: player_view,
            enemies,
            boss,
            companion,
            projectiles,
            platforms,
            chest,
            star,
            particles: state.particles.particles().to_vec(),
            damage_numbers: state.damage_numbers.clone(),
            boss_intro_progress,
            hud: HudView {
                phase: state.phase,
                wave: state.wave,
                score: state.score,
                combo: state.combo,
                multiplier: state.multiplier(),
                player_health: state.player.health,
                player_max_health: state.player.max_health,
                boss_health_frac: state
                    .boss
                    .as_ref()
                    .map(|b| b.health / b.max_health),
            },
            background: bundle.background.as_ref().map(|s| s.handle.clone()),
            ground_sprite: bundle.ground.as_ref().map(|s| s.handle.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::WeaponKind;
    use crate::sim::combatant::Boss;
    use crate::tuning::Tuning;

    fn state() -> EncounterState {
        EncounterState::new(3, WeaponKind::Melee, Tuning::default(), false)
    }

    fn bundle() -> SpriteBundle {
        SpriteBundle {
            hero: Some(SpriteRef { handle: "hero".into(), needs_flip: true }),
            monster: Some(SpriteRef { handle: "monster".into(), needs_flip: false }),
            ..Default::default()
        }
    }

    #[test]
    fn test_capture_resolves_sprites_and_mirror() {
        let mut s = state();
        s.player.facing = 1;
        let snap = RenderSnapshot::capture(&s, &bundle());
        assert_eq!(snap.player.sprite.as_deref(), Some("hero"));
        // Left-authored hero facing right needs the flip
        assert!(snap.player.mirror);
        assert!(snap.boss.is_none());
        assert_eq!(snap.hud.score, 0);
    }

    #[test]
    fn test_missing_sprites_fall_back_to_none() {
        let mut s = state();
        s.spawn_wave(1);
        let snap = RenderSnapshot::capture(&s, &SpriteBundle::default());
        assert_eq!(snap.enemies.len(), 3);
        assert!(snap.enemies.iter().all(|e| e.sprite.is_none()));
    }

    #[test]
    fn test_boss_health_on_hud() {
        let mut s = state();
        let mut boss = Boss::new(900.0, crate::ground_y(), &s.tuning);
        boss.health = boss.max_health / 2.0;
        s.boss = Some(boss);
        let snap = RenderSnapshot::capture(&s, &bundle());
        assert_eq!(snap.hud.boss_health_frac, Some(0.5));
        assert!(snap.boss.is_some());
    }

    #[test]
    fn test_capture_is_read_only() {
        let mut s = state();
        s.spawn_wave(2);
        let json_before = serde_json::to_string(&s).unwrap();
        let _ = RenderSnapshot::capture(&s, &bundle());
        assert_eq!(serde_json::to_string(&s).unwrap(), json_before);
    }
}
