//! Fixed timestep simulation tick
//!
//! Advances one encounter deterministically. All input arrives as an explicit
//! snapshot; nothing in here reads clocks, globals or real randomness.
//!
//! Per-tick ordering is load-bearing: input and movement first, then
//! projectile motion, then combat resolution, then death handling, then
//! cosmetics, then phase transitions. A combatant that dies during combat
//! resolution never acts again in the same tick.

use glam::Vec2;

use super::combatant::{BOSS_TARGET_ID, Boss, Companion, PlayerInput};
use super::effects::{DamageNumber, color};
use super::state::{EncounterPhase, EncounterState, WAVE_COUNT};
use crate::consts::{MAX_DT, MAX_SUBSTEPS, SIM_DT, WORLD_HEIGHT, WORLD_WIDTH};
use crate::ground_y;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// -1.0..=1.0 horizontal movement axis
    pub move_axis: f32,
    pub jump: bool,
    pub crouch: bool,
    /// Melee swing trigger
    pub melee: bool,
    /// Ranged fire trigger
    pub shoot: bool,
    /// Force the current segment to complete (debug/testing)
    pub advance: bool,
    /// Reset the encounter to its initial state
    pub restart: bool,
}

impl TickInput {
    fn player_input(&self) -> PlayerInput {
        PlayerInput {
            move_axis: self.move_axis,
            jump: self.jump,
            crouch: self.crouch,
            melee: self.melee,
            shoot: self.shoot,
        }
    }
}

/// Advance the encounter by one fixed timestep
pub fn tick(state: &mut EncounterState, input: &TickInput, dt: f32) {
    if input.restart {
        *state = EncounterState::new(
            state.seed,
            state.player.weapon,
            state.tuning.clone(),
            state.companion_mortal,
        );
        return;
    }

    state.tick += 1;

    // Cosmetics keep aging on terminal screens so the last burst plays out
    update_cosmetics(state, dt);

    if matches!(state.phase, EncounterPhase::Victory | EncounterPhase::GameOver) {
        return;
    }

    // Combo decays to nothing when no kill lands inside the window
    if state.combo_timer > 0 {
        state.combo_timer -= 1;
        if state.combo_timer == 0 {
            state.combo = 0;
        }
    }

    if let Some(next) = state.pending_phase {
        state.transition_timer = state.transition_timer.saturating_sub(1);
        if state.transition_timer == 0 {
            state.pending_phase = None;
            enter_phase(state, next);
        }
    }

    if input.advance {
        force_advance(state);
    }

    let player_input = input.player_input();
    match state.phase {
        EncounterPhase::Intro => {}
        EncounterPhase::Wave => tick_wave(state, &player_input, dt),
        EncounterPhase::PlatformCourse => tick_course(state, &player_input, dt),
        EncounterPhase::Chest => tick_chest(state, &player_input, dt),
        EncounterPhase::CompanionIntro => tick_companion_intro(state, &player_input, dt),
        EncounterPhase::BossIntro => tick_boss_intro(state, &player_input, dt),
        EncounterPhase::Boss => tick_boss(state, &player_input, dt),
        EncounterPhase::Victory | EncounterPhase::GameOver => {}
    }
}

/// Drive the fixed-step loop from a variable frame delta.
///
/// Clamps runaway deltas and caps catch-up work per frame; when the cap is
/// hit the backlog is dropped rather than spiraling.
pub fn run_frame(state: &mut EncounterState, input: &TickInput, accumulator: &mut f32, frame_dt: f32) {
    *accumulator += frame_dt.min(MAX_DT);
    let mut steps = 0;
    while *accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
        tick(state, input, SIM_DT);
        *accumulator -= SIM_DT;
        steps += 1;
    }
    if steps == MAX_SUBSTEPS {
        *accumulator = 0.0;
    }
}

fn update_cosmetics(state: &mut EncounterState, dt: f32) {
    state.particles.update(dt);
    state.shake.update();
    for number in &mut state.damage_numbers {
        number.update(dt);
    }
    state.damage_numbers.retain(|n| !n.expired());
}

/// Set up the world for a newly entered phase
fn enter_phase(state: &mut EncounterState, next: EncounterPhase) {
    state.phase = next;
    match next {
        EncounterPhase::Wave => {
            state.chest = None;
            let wave = state.wave + 1;
            state.spawn_wave(wave);
        }
        EncounterPhase::PlatformCourse => {
            state.build_platform_course();
        }
        EncounterPhase::Chest => {
            state.platforms.clear();
            state.star = None;
            state.spawn_chest();
        }
        EncounterPhase::CompanionIntro => {
            let at = state.player.pos + Vec2::new(-60.0, -40.0);
            state.companion = Some(Companion::new(at, &state.tuning));
            state.schedule_phase(EncounterPhase::BossIntro, 90);
        }
        EncounterPhase::BossIntro => {
            state.boss = Some(Boss::new(WORLD_WIDTH - 100.0, ground_y(), &state.tuning));
            state.boss_intro_timer = 120;
            state.shake.add(6.0);
        }
        _ => {}
    }
    log::info!("phase -> {next:?}");
}

/// Debug skip: complete the current segment without playing it
fn force_advance(state: &mut EncounterState) {
    match state.phase {
        EncounterPhase::Intro | EncounterPhase::CompanionIntro => {
            state.transition_timer = state.transition_timer.min(1);
        }
        EncounterPhase::Wave => {
            state.enemies.clear();
        }
        EncounterPhase::PlatformCourse => {
            if state.star.take().is_some() {
                let at = state.player.bounds().center();
                state.award_score(state.tuning.star_score, at);
            }
            state.heal_player();
            state.schedule_phase(EncounterPhase::Chest, 1);
        }
        EncounterPhase::Chest => {
            if let Some(chest) = &mut state.chest {
                chest.opened = true;
            }
            state.schedule_phase(EncounterPhase::Wave, 1);
        }
        EncounterPhase::BossIntro => {
            state.boss_intro_timer = state.boss_intro_timer.min(1);
        }
        EncounterPhase::Boss => {
            if let Some(boss) = &mut state.boss {
                boss.health = 0.0;
            }
        }
        _ => {}
    }
}

/// The run ends here: explosion at the player, terminal phase
fn fail_run(state: &mut EncounterState) {
    let at = state.player.bounds().center();
    state.particles.explosion(at, color::PLAYER_HIT, state.tick as u32);
    state.shake.add(12.0);
    state.pending_phase = None;
    state.phase = EncounterPhase::GameOver;
    log::info!("game over at wave {} with score {}", state.wave, state.score);
}

fn tick_wave(state: &mut EncounterState, input: &PlayerInput, dt: f32) {
    let mut killed: Vec<Vec2> = Vec::new();
    {
        let EncounterState {
            player,
            enemies,
            particles,
            shake,
            damage_numbers,
            tuning,
            tick,
            ..
        } = state;
        let seed = *tick as u32;

        if let Some(fire) = player.update(input, Some(ground_y()), tuning, dt) {
            particles.muzzle_flash(fire.pos, fire.facing, seed);
        }
        let player_center_x = player.bounds().center().x;
        for enemy in enemies.iter_mut() {
            enemy.update(player_center_x, ground_y(), tuning, dt);
        }

        for enemy in enemies.iter_mut() {
            if enemy.is_dead() {
                continue;
            }
            let enemy_box = enemy.bounds();

            // Player melee: one hit per target per window
            if player.can_strike(enemy.id) && player.attack_box(tuning).intersects(&enemy_box) {
                enemy.take_damage(tuning.player_melee_damage);
                player.mark_struck(enemy.id);
                particles.hit_burst(enemy_box.center(), color::ENEMY_HIT, seed ^ enemy.id);
                damage_numbers.push(DamageNumber::new(
                    enemy_box.center(),
                    tuning.player_melee_damage as u32,
                    color::ENEMY_HIT,
                    seed ^ enemy.id,
                ));
                shake.add(3.0);
            }

            // Player projectiles are consumed on the first valid hit
            for projectile in player.projectiles.iter_mut() {
                if !enemy.is_dead() && projectile.hits(&enemy.bounds()) {
                    enemy.take_damage(projectile.damage as f32);
                    projectile.active = false;
                    particles.hit_burst(enemy.bounds().center(), color::ENEMY_HIT, seed ^ enemy.id);
                    damage_numbers.push(DamageNumber::new(
                        enemy.bounds().center(),
                        projectile.damage,
                        color::ENEMY_HIT,
                        seed ^ enemy.id,
                    ));
                }
            }
            if enemy.is_dead() {
                continue;
            }

            // Enemy swing connecting with the player
            if enemy.attack_window > 0
                && !enemy.window_hit
                && enemy.attack_box(tuning).intersects(&player.bounds())
            {
                player.take_damage(tuning.enemy_damage);
                enemy.window_hit = true;
                particles.hit_burst(player.bounds().center(), color::PLAYER_HIT, seed ^ 0x5151);
                damage_numbers.push(DamageNumber::new(
                    player.bounds().center(),
                    tuning.enemy_damage as u32,
                    color::PLAYER_HIT,
                    seed,
                ));
                shake.add(4.0);
            }

            // Body-contact nibble while standing inside an enemy
            if enemy.contact_timer == 0 {
                let dx = (enemy.bounds().center().x - player.bounds().center().x).abs();
                if dx < 20.0 && enemy.bounds().intersects(&player.bounds()) {
                    player.take_damage(tuning.contact_damage);
                    enemy.contact_timer = tuning.contact_interval;
                }
            }
        }

        enemies.retain(|enemy| {
            if enemy.is_dead() {
                killed.push(enemy.bounds().center());
                false
            } else {
                true
            }
        });
    }

    // Deaths pay out in collection order so combos grow predictably
    for at in killed {
        state.particles.death_burst(at, state.tick as u32);
        state.shake.add(5.0);
        state.award_kill(state.tuning.kill_score_base, at);
    }

    if state.player.is_dead() {
        fail_run(state);
        return;
    }

    if state.enemies.is_empty() && state.pending_phase.is_none() {
        state.combo = 0;
        state.combo_timer = 0;
        state.heal_player();
        if state.wave >= WAVE_COUNT {
            state.schedule_phase(EncounterPhase::CompanionIntro, 60);
        } else {
            state.schedule_phase(EncounterPhase::PlatformCourse, 60);
        }
    }
}

fn tick_course(state: &mut EncounterState, input: &PlayerInput, dt: f32) {
    {
        let EncounterState { player, platforms, particles, tuning, tick, .. } = state;
        let prev_bottom = player.bounds().bottom();

        // No ground below: only platforms catch the fall
        if let Some(fire) = player.update(input, None, tuning, dt) {
            particles.muzzle_flash(fire.pos, fire.facing, *tick as u32);
        }

        if player.vel.y >= 0.0 {
            for platform in platforms.iter() {
                let body = player.bounds();
                let surface = platform.bounds();
                let crossed = body.bottom() >= surface.top() && prev_bottom <= surface.top() + 1.0;
                let over = body.right() > surface.left() && body.left() < surface.right();
                if crossed && over {
                    player.land_on(surface.top());
                    break;
                }
            }
        }
    }

    let player_box = state.player.bounds();
    let mut collected_at = None;
    if let Some(star) = &mut state.star {
        if !star.collected && star.bounds().intersects(&player_box) {
            star.collected = true;
            collected_at = Some(star.bounds().center());
        }
    }
    if let Some(at) = collected_at {
        state.particles.reward_burst(at, state.tick as u32);
        state.award_score(state.tuning.star_score, at);
        state.heal_player();
        state.schedule_phase(EncounterPhase::Chest, 30);
    }

    // Falling into the pit ends the run no matter how much health remains
    if state.player.pos.y > WORLD_HEIGHT {
        fail_run(state);
    }
}

fn tick_chest(state: &mut EncounterState, input: &PlayerInput, dt: f32) {
    {
        let EncounterState { player, particles, tuning, tick, .. } = state;
        if let Some(fire) = player.update(input, Some(ground_y()), tuning, dt) {
            particles.muzzle_flash(fire.pos, fire.facing, *tick as u32);
        }
    }

    let player_box = state.player.bounds();
    let mut opened = None;
    if let Some(chest) = &mut state.chest {
        if !chest.opened && chest.bounds().intersects(&player_box) {
            let reward = chest.open(&state.tuning, state.player.max_health);
            opened = reward.map(|r| (r, chest.bounds().center()));
        }
    }
    if let Some((reward, at)) = opened {
        state.particles.reward_burst(at, state.tick as u32);
        state.award_score(reward.score, at);
        state.player.heal(reward.heal);
        state.schedule_phase(EncounterPhase::Wave, 120);
    }
}

fn tick_companion_intro(state: &mut EncounterState, input: &PlayerInput, dt: f32) {
    let EncounterState { player, companion, particles, tuning, tick, .. } = state;
    if let Some(fire) = player.update(input, Some(ground_y()), tuning, dt) {
        particles.muzzle_flash(fire.pos, fire.facing, *tick as u32);
    }
    if let Some(companion) = companion.as_mut() {
        companion.update(player.bounds().center(), None, ground_y(), tuning, dt);
    }
}

fn tick_boss_intro(state: &mut EncounterState, input: &PlayerInput, dt: f32) {
    {
        let EncounterState { player, companion, boss, particles, tuning, tick, .. } = state;
        if let Some(fire) = player.update(input, Some(ground_y()), tuning, dt) {
            particles.muzzle_flash(fire.pos, fire.facing, *tick as u32);
        }
        if let Some(companion) = companion.as_mut() {
            companion.update(player.bounds().center(), None, ground_y(), tuning, dt);
        }
        // Stomp in from the right edge; no combat until the ramp ends
        if let Some(boss) = boss.as_mut() {
            let anchor = WORLD_WIDTH - 300.0;
            if boss.pos.x > anchor {
                boss.pos.x -= 150.0 * dt;
            }
        }
    }

    state.boss_intro_timer = state.boss_intro_timer.saturating_sub(1);
    if state.boss_intro_timer % 30 == 0 {
        state.shake.add(4.0);
    }
    if state.boss_intro_timer == 0 {
        state.phase = EncounterPhase::Boss;
        log::info!("phase -> Boss");
    }
}

fn tick_boss(state: &mut EncounterState, input: &PlayerInput, dt: f32) {
    let mut companion_died = None;
    {
        let EncounterState {
            player,
            boss,
            companion,
            companion_mortal,
            particles,
            shake,
            damage_numbers,
            tuning,
            tick,
            ..
        } = state;
        let Some(boss) = boss.as_mut() else {
            return;
        };
        let seed = *tick as u32;

        if let Some(fire) = player.update(input, Some(ground_y()), tuning, dt) {
            particles.muzzle_flash(fire.pos, fire.facing, seed);
        }
        let player_center = player.bounds().center();
        if let Some(companion) = companion.as_mut() {
            // A companion at zero health stops fighting even when immortal
            let target = (!companion.is_dead()).then(|| boss.bounds().center());
            if let Some(fire) = companion.update(player_center, target, ground_y(), tuning, dt) {
                particles.muzzle_flash(fire.pos, fire.facing, seed ^ 0xC0);
            }
        }
        for fire in boss.update(player_center, ground_y(), tuning, dt) {
            particles.muzzle_flash(fire.pos, fire.facing, seed ^ 0xB0);
        }

        // Player melee and projectiles against the boss
        if !boss.is_dead()
            && player.can_strike(BOSS_TARGET_ID)
            && player.attack_box(tuning).intersects(&boss.bounds())
        {
            boss.take_damage(tuning.player_melee_damage);
            player.mark_struck(BOSS_TARGET_ID);
            particles.hit_burst(boss.bounds().center(), color::ENEMY_HIT, seed);
            damage_numbers.push(DamageNumber::new(
                boss.bounds().center(),
                tuning.player_melee_damage as u32,
                color::ENEMY_HIT,
                seed,
            ));
            shake.add(3.0);
        }
        for projectile in player.projectiles.iter_mut() {
            if !boss.is_dead() && projectile.hits(&boss.bounds()) {
                boss.take_damage(projectile.damage as f32);
                projectile.active = false;
                particles.hit_burst(boss.bounds().center(), color::ENEMY_HIT, seed ^ 1);
                damage_numbers.push(DamageNumber::new(
                    boss.bounds().center(),
                    projectile.damage,
                    color::ENEMY_HIT,
                    seed ^ 1,
                ));
            }
        }
        if let Some(companion) = companion.as_mut() {
            for projectile in companion.projectiles.iter_mut() {
                if !boss.is_dead() && projectile.hits(&boss.bounds()) {
                    boss.take_damage(projectile.damage as f32);
                    projectile.active = false;
                    particles.hit_burst(boss.bounds().center(), color::COMPANION, seed ^ 2);
                    damage_numbers.push(DamageNumber::new(
                        boss.bounds().center(),
                        projectile.damage,
                        color::COMPANION,
                        seed ^ 2,
                    ));
                }
            }
        }

        if !boss.is_dead() {
            // Jump-over exemption: a player wholly above the boss takes no
            // melee, special or contact damage
            let exempt = player.bounds().bottom() <= boss.bounds().top();

            if boss.attack_window > 0
                && !boss.window_hit_player
                && !exempt
                && boss.attack_box(tuning).intersects(&player.bounds())
            {
                player.take_damage(tuning.boss_damage);
                boss.window_hit_player = true;
                particles.hit_burst(player.bounds().center(), color::PLAYER_HIT, seed ^ 3);
                damage_numbers.push(DamageNumber::new(
                    player.bounds().center(),
                    tuning.boss_damage as u32,
                    color::PLAYER_HIT,
                    seed ^ 3,
                ));
                shake.add(4.0);
            }
            if boss.special_window > 0
                && !boss.special_hit_player
                && !exempt
                && boss.special_attack_box(tuning).intersects(&player.bounds())
            {
                player.take_damage(tuning.boss_special_damage);
                boss.special_hit_player = true;
                particles.hit_burst(player.bounds().center(), color::SPECIAL, seed ^ 4);
                damage_numbers.push(DamageNumber::new(
                    player.bounds().center(),
                    tuning.boss_special_damage as u32,
                    color::SPECIAL,
                    seed ^ 4,
                ));
                shake.add(8.0);
            }

            for projectile in boss.projectiles.iter_mut() {
                if projectile.hits(&player.bounds()) {
                    player.take_damage(projectile.damage as f32);
                    projectile.active = false;
                    particles.hit_burst(player.bounds().center(), color::PLAYER_HIT, seed ^ 5);
                    damage_numbers.push(DamageNumber::new(
                        player.bounds().center(),
                        projectile.damage,
                        color::PLAYER_HIT,
                        seed ^ 5,
                    ));
                    shake.add(3.0);
                }
            }

            if !exempt && player.contact_cooldown == 0 && boss.bounds().intersects(&player.bounds())
            {
                player.take_damage(tuning.contact_damage);
                player.contact_cooldown = tuning.contact_interval;
            }

            // The companion always takes hits; mortality gates only removal
            if let Some(companion) = companion.as_mut() {
                if boss.attack_window > 0
                    && !boss.window_hit_companion
                    && boss.attack_box(tuning).intersects(&companion.bounds())
                {
                    companion.take_damage(tuning.boss_damage);
                    boss.window_hit_companion = true;
                }
                if boss.special_window > 0
                    && !boss.special_hit_companion
                    && boss.special_attack_box(tuning).intersects(&companion.bounds())
                {
                    companion.take_damage(tuning.boss_special_damage);
                    boss.special_hit_companion = true;
                }
                for projectile in boss.projectiles.iter_mut() {
                    if projectile.hits(&companion.bounds()) {
                        companion.take_damage(projectile.damage as f32);
                        projectile.active = false;
                    }
                }
                if *companion_mortal && companion.is_dead() {
                    companion_died = Some(companion.bounds().center());
                }
            }
        }
    }

    if let Some(at) = companion_died {
        state.particles.death_burst(at, state.tick as u32);
        state.companion = None;
    }

    if state.boss.as_ref().is_some_and(|b| b.is_dead()) {
        let at = state.boss.as_ref().map(|b| b.bounds().center()).unwrap_or_default();
        state.particles.explosion(at, color::EXPLOSION, state.tick as u32);
        state.shake.add(12.0);
        state.award_score(state.tuning.boss_kill_score, at);
        state.boss = None;
        state.phase = EncounterPhase::Victory;
        log::info!("victory with score {}", state.score);
        return;
    }

    if state.player.is_dead() {
        fail_run(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::WeaponKind;
    use crate::sim::combatant::Enemy;
    use crate::tuning::Tuning;

    fn new_state(weapon: WeaponKind) -> EncounterState {
        EncounterState::new(42, weapon, Tuning::default(), false)
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn run(state: &mut EncounterState, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT);
        }
    }

    #[test]
    fn test_intro_hands_off_to_wave_one() {
        let mut state = new_state(WeaponKind::Melee);
        assert_eq!(state.phase, EncounterPhase::Intro);
        run(&mut state, &idle(), 61);
        assert_eq!(state.phase, EncounterPhase::Wave);
        assert_eq!(state.wave, 1);
        assert_eq!(state.enemies.len(), 3);
    }

    #[test]
    fn test_wave_clear_with_combo_scoring() {
        // Four enemies at 40 health, killed by 20-damage melee hits: the
        // clear transition fires only after the fourth death, and each kill
        // pays 100 x the multiplier in combo order.
        let mut state = new_state(WeaponKind::Melee);
        run(&mut state, &idle(), 61);
        state.enemies.clear();
        // Park the pack far from the player so nobody reaches melee range
        for i in 0..4 {
            state.enemies.push(Enemy::new(100 + i, 1100.0 + i as f32 * 40.0, ground_y(), &state.tuning));
        }

        let mut expected = 0u64;
        for kill in 0..4u32 {
            let victim = state.enemies[0].id;
            for enemy in &mut state.enemies {
                if enemy.id == victim {
                    enemy.take_damage(20.0);
                    enemy.take_damage(20.0);
                }
            }
            tick(&mut state, &idle(), SIM_DT);
            expected += (100.0 * (1.0 + 0.1 * (kill + 1) as f32)).floor() as u64;
            assert_eq!(state.score, expected);
            if kill < 3 {
                assert_eq!(state.phase, EncounterPhase::Wave);
                assert!(state.pending_phase.is_none(), "no transition before the 4th kill");
                assert_eq!(state.combo, kill + 1);
            }
        }

        // 110 + 120 + 130 + 140
        assert_eq!(state.score, 500);
        assert_eq!(state.pending_phase, Some(EncounterPhase::PlatformCourse));
        assert_eq!(state.combo, 0, "wave clear resets the combo");
        run(&mut state, &idle(), 61);
        assert_eq!(state.phase, EncounterPhase::PlatformCourse);
    }

    #[test]
    fn test_boss_dies_on_exactly_fifteenth_hit() {
        let mut state = new_state(WeaponKind::Ranged);
        assert_eq!(state.player.health, 100.0);
        state.pending_phase = None;
        state.phase = EncounterPhase::Boss;
        state.boss = Some(Boss::new(900.0, ground_y(), &state.tuning));
        state.player.pos = Vec2::new(100.0, 300.0);

        for hit in 1..=15 {
            if let Some(boss) = &mut state.boss {
                boss.take_damage(20.0);
            }
            tick(&mut state, &idle(), SIM_DT);
            if hit < 15 {
                assert_eq!(state.phase, EncounterPhase::Boss, "alive after hit {hit}");
            }
        }
        assert_eq!(state.phase, EncounterPhase::Victory);
        assert!(state.boss.is_none());
        assert!(state.score >= state.tuning.boss_kill_score);
    }

    #[test]
    fn test_jump_over_exemption() {
        let mut state = new_state(WeaponKind::Melee);
        state.pending_phase = None;
        state.phase = EncounterPhase::Boss;
        let mut boss = Boss::new(500.0, ground_y(), &state.tuning);
        boss.attack_window = 10;
        boss.special_window = 10;
        let boss_top = boss.bounds().top();
        state.boss = Some(boss);

        // Player directly over the boss, bottom well above its top edge
        state.player.pos = Vec2::new(520.0, boss_top - state.player.size.y - 50.0);
        state.player.vel = Vec2::ZERO;
        let full = state.player.health;
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.player.health, full, "airborne overlap must not damage");

        // Same overlap at ground level does connect
        state.player.pos = Vec2::new(520.0, ground_y() - state.player.size.y);
        if let Some(boss) = &mut state.boss {
            boss.attack_window = 10;
            boss.window_hit_player = false;
        }
        tick(&mut state, &idle(), SIM_DT);
        assert!(state.player.health < full);
    }

    fn boss_mid_swing_over_companion(state: &mut EncounterState) {
        state.pending_phase = None;
        state.phase = EncounterPhase::Boss;
        let mut boss = Boss::new(500.0, ground_y(), &state.tuning);
        boss.attack_window = 10;
        state.boss = Some(boss);
        // Inside the swing arc on the player-facing side of the boss
        let mut companion = Companion::new(Vec2::new(450.0, ground_y() - 60.0), &state.tuning);
        companion.health = state.tuning.boss_damage;
        state.companion = Some(companion);
    }

    #[test]
    fn test_immortal_companion_still_takes_hits() {
        let mut state = new_state(WeaponKind::Melee);
        boss_mid_swing_over_companion(&mut state);
        tick(&mut state, &idle(), SIM_DT);
        let companion = state.companion.as_ref().expect("immortal companion is never removed");
        assert_eq!(companion.health, 0.0);
    }

    #[test]
    fn test_mortal_companion_is_removed_at_zero_health() {
        let mut state = EncounterState::new(42, WeaponKind::Melee, Tuning::default(), true);
        boss_mid_swing_over_companion(&mut state);
        tick(&mut state, &idle(), SIM_DT);
        assert!(state.companion.is_none());
    }

    #[test]
    fn test_fall_into_pit_is_game_over() {
        let mut state = new_state(WeaponKind::Melee);
        state.pending_phase = None;
        state.phase = EncounterPhase::PlatformCourse;
        state.build_platform_course();
        assert_eq!(state.player.health, state.player.max_health);

        state.player.pos = Vec2::new(0.0, WORLD_HEIGHT + 1.0);
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, EncounterPhase::GameOver);
        assert!(state.player.health > 0.0, "fall death ignores health");
    }

    #[test]
    fn test_chest_pays_once() {
        let mut state = new_state(WeaponKind::Melee);
        state.pending_phase = None;
        state.phase = EncounterPhase::Chest;
        state.chest = Some(crate::sim::state::Chest::new(state.player.pos.x, ground_y()));

        tick(&mut state, &idle(), SIM_DT);
        let after_open = state.score;
        assert_eq!(after_open, state.tuning.chest_score);
        assert_eq!(state.pending_phase, Some(EncounterPhase::Wave));

        // Standing on the opened chest grants nothing further
        run(&mut state, &idle(), 10);
        assert_eq!(state.score, after_open);
    }

    #[test]
    fn test_combo_resets_when_timer_expires() {
        let mut state = new_state(WeaponKind::Melee);
        run(&mut state, &idle(), 61);
        // Keep one distant enemy alive so the wave never clears
        state.enemies.truncate(1);
        state.enemies[0].pos.x = 1200.0;
        state.award_kill(100, Vec2::new(100.0, 100.0));
        assert_eq!(state.combo, 1);
        assert!(state.multiplier() > 1.0);

        let window = state.tuning.combo_window;
        run(&mut state, &idle(), window + 1);
        assert_eq!(state.combo, 0);
        assert_eq!(state.multiplier(), 1.0);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = new_state(WeaponKind::Melee);
        let initial_pos = state.player.pos;
        run(&mut state, &idle(), 61);
        state.player.take_damage(30.0);
        state.award_kill(100, Vec2::new(100.0, 100.0));
        state.player.projectiles.push(crate::sim::Projectile::fired(
            Vec2::new(100.0, 100.0),
            1,
            600.0,
            20,
            crate::sim::projectile::ProjectileOwner::Player,
        ));

        let restart = TickInput { restart: true, ..Default::default() };
        tick(&mut state, &restart, SIM_DT);
        assert_eq!(state.phase, EncounterPhase::Intro);
        assert_eq!(state.wave, 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert_eq!(state.player.health, state.player.max_health);
        assert_eq!(state.player.pos, initial_pos);
        assert!(state.player.projectiles.is_empty());
        assert!(state.enemies.is_empty());
        assert!(state.particles.particles().is_empty());
        assert!(state.damage_numbers.is_empty());
    }

    #[test]
    fn test_force_advance_skips_a_wave() {
        let mut state = new_state(WeaponKind::Melee);
        run(&mut state, &idle(), 61);
        assert!(!state.enemies.is_empty());

        let skip = TickInput { advance: true, ..Default::default() };
        tick(&mut state, &skip, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.pending_phase, Some(EncounterPhase::PlatformCourse));
    }

    #[test]
    fn test_force_advance_playthrough_reaches_victory() {
        // Holding the debug skip must walk the whole encounter chain:
        // waves, courses, chests, companion, boss intro, boss, victory.
        let mut state = new_state(WeaponKind::Melee);
        let skip = TickInput { advance: true, ..Default::default() };
        let mut saw_companion = false;
        let mut saw_boss = false;
        for _ in 0..5000 {
            tick(&mut state, &skip, SIM_DT);
            saw_companion |= state.companion.is_some();
            saw_boss |= state.phase == EncounterPhase::Boss;
            if state.phase == EncounterPhase::Victory {
                break;
            }
        }
        assert_eq!(state.phase, EncounterPhase::Victory);
        assert!(saw_companion, "companion must join before the boss");
        assert!(saw_boss);
        assert_eq!(state.wave, WAVE_COUNT);
    }

    #[test]
    fn test_wave_clear_heals_quarter() {
        let mut state = new_state(WeaponKind::Melee);
        run(&mut state, &idle(), 61);
        state.player.take_damage(80.0);
        let hurt = state.player.health;
        state.enemies.clear();
        tick(&mut state, &idle(), SIM_DT);
        let healed = state.player.health;
        assert!((healed - hurt - state.player.max_health * 0.25).abs() < 0.001);
    }

    #[test]
    fn test_landing_on_platform_stops_fall() {
        let mut state = new_state(WeaponKind::Melee);
        state.pending_phase = None;
        state.phase = EncounterPhase::PlatformCourse;
        state.build_platform_course();

        // Starts on the first ledge and stays there while idle
        run(&mut state, &idle(), 30);
        assert_eq!(state.phase, EncounterPhase::PlatformCourse);
        let start_top = state.platforms[0].top();
        assert!((state.player.bounds().bottom() - start_top).abs() < 1.0);
        assert!(state.player.grounded);
    }

    #[test]
    fn test_dead_enemy_cannot_strike_same_tick() {
        let mut state = new_state(WeaponKind::Melee);
        run(&mut state, &idle(), 61);
        state.enemies.truncate(1);
        // Enemy mid-swing right next to the player, but already lethal damage
        let px = state.player.pos.x;
        state.enemies[0].pos.x = px + 30.0;
        state.enemies[0].attack_window = 10;
        state.enemies[0].health = 0.0;
        let full = state.player.health;
        tick(&mut state, &idle(), SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.health, full);
    }

    #[test]
    fn test_run_frame_caps_catch_up() {
        let mut state = new_state(WeaponKind::Melee);
        let mut accumulator = 0.0;
        let before = state.tick;
        // A huge stall must not replay the whole backlog
        run_frame(&mut state, &idle(), &mut accumulator, 5.0);
        assert!(state.tick - before <= MAX_SUBSTEPS as u64);
        assert_eq!(accumulator, 0.0);
    }

    #[test]
    fn test_score_never_decreases() {
        let mut state = new_state(WeaponKind::Melee);
        let skip = TickInput { advance: true, ..Default::default() };
        let mut last = 0;
        for _ in 0..2000 {
            tick(&mut state, &skip, SIM_DT);
            assert!(state.score >= last);
            last = state.score;
            if state.phase == EncounterPhase::Victory {
                break;
            }
        }
    }
}
