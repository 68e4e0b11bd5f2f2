//! Общие состояния и хуки (Hurt, Stun, Death, melee swing, patrol)
//!
//! Одни и те же fn pointers стоят в таблицах нескольких archetype.

use bevy::prelude::*;
use rand::Rng;

use crate::actor::GameNotification;
use crate::capabilities::{Block, CollisionSenses, DamageHitBox, EntityDetector, Movement};
use crate::combat::DamageData;
use crate::fsm::{ActorCommand, StateContext, StateHandlers, StateId};

/// Решение "что делать с замеченной целью" (у каждого archetype своё)
pub type EngageFn = fn(&mut StateContext<'_>) -> Option<StateId>;

// ============================================================================
// DoChecks
// ============================================================================

/// Ground / wall / ledge
pub fn surface_checks(ctx: &mut StateContext<'_>) {
    let facing = ctx.facing();
    let Some(senses) = ctx.core.find::<CollisionSenses>() else {
        return;
    };

    ctx.memory.is_grounded = senses.ground(ctx.spatial, ctx.position);
    ctx.memory.is_touching_wall = senses.wall_front(ctx.spatial, ctx.position, facing);
    ctx.memory.is_touching_wall_back = senses.wall_back(ctx.spatial, ctx.position, facing);
    ctx.memory.is_ledge_ahead = senses.ledge_vertical(ctx.spatial, ctx.position, facing);
}

/// surface_checks + детекция цели + attack range
pub fn enemy_checks(ctx: &mut StateContext<'_>) {
    surface_checks(ctx);

    let facing = ctx.facing();
    let Some(detector) = ctx.core.find_mut::<EntityDetector>() else {
        return;
    };

    let detected = detector.entity_in_range(ctx.spatial, ctx.position, facing);
    ctx.memory.is_target_detected = detected;
    if detected {
        ctx.memory.target = detector.target();
        ctx.memory.target_position = detector.target_position();
    }

    let attack_range = ctx.tuning.detection.attack_range;
    ctx.memory.is_target_in_attack_range = detected
        && ctx
            .memory
            .target_position
            .is_some_and(|target| (target.x - ctx.position.x).abs() <= attack_range);
}

// ============================================================================
// Helpers
// ============================================================================

pub fn stop(ctx: &mut StateContext<'_>) {
    if let Some(movement) = ctx.movement() {
        movement.set_velocity_x(0.0);
    }
}

/// Разворот к последней известной позиции цели
pub fn face_target(ctx: &mut StateContext<'_>) {
    let Some(target) = ctx.memory.target_position else {
        return;
    };
    let dx = target.x - ctx.position.x;
    if dx.abs() <= f32::EPSILON {
        return;
    }
    let direction = if dx > 0.0 { 1 } else { -1 };
    if let Some(movement) = ctx.movement() {
        movement.set_facing(direction);
    }
}

pub fn attack_ready(ctx: &StateContext<'_>) -> bool {
    ctx.now >= ctx.memory.cooldown_until
}

/// DamageData атак этого актора
pub fn attack_data(ctx: &StateContext<'_>) -> DamageData {
    let combat = &ctx.tuning.combat;
    DamageData::new(combat.damage, Some(ctx.entity))
        .blockable(combat.blockable)
        .parryable(combat.parryable)
}

fn start_cooldown(ctx: &mut StateContext<'_>) {
    ctx.memory.cooldown_until = ctx.now + ctx.tuning.combat.attack_cooldown;
}

// ============================================================================
// Hurt
// ============================================================================

fn hurt_enter(ctx: &mut StateContext<'_>) {
    stop(ctx);
}

fn hurt_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    let done = ctx.memory.is_animation_finished || ctx.time_in_state() >= ctx.tuning.timing.hurt_time;
    done.then_some(StateId::Idle)
}

/// Knockback lockout держит velocity, пока не истечёт
pub fn hurt() -> StateHandlers {
    StateHandlers::new("hurt")
        .on_enter(hurt_enter)
        .logic(hurt_logic)
        .physics(stop)
}

// ============================================================================
// Stun
// ============================================================================

fn stun_enter(ctx: &mut StateContext<'_>) {
    if let Some(block) = ctx.core.find_mut::<Block>() {
        block.stop();
    }
    stop(ctx);
    crate::logger::log(&format!("💫 {:?} stunned", ctx.entity));
}

fn stun_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    (ctx.time_in_state() >= ctx.tuning.timing.stun_time).then_some(StateId::Idle)
}

pub fn stun() -> StateHandlers {
    StateHandlers::new("stun")
        .on_enter(stun_enter)
        .logic(stun_logic)
        .physics(stop)
}

// ============================================================================
// Death (terminal)
// ============================================================================

fn death_enter(ctx: &mut StateContext<'_>) {
    if let Some(block) = ctx.core.find_mut::<Block>() {
        block.stop();
    }
    if let Some(movement) = ctx.core.find_mut::<Movement>() {
        movement.force_velocity(Vec2::ZERO);
        movement.lock_velocity_forever();
    }

    let despawn_at = ctx.now + ctx.tuning.timing.despawn_delay;
    let killed = GameNotification::EntityKilled {
        entity: ctx.entity,
        kind: ctx.tuning.name.clone(),
    };
    ctx.push(ActorCommand::MarkDead { despawn_at });
    ctx.push(ActorCommand::Notify(killed));

    crate::logger::log_info(&format!("💀 {:?} ({}) died", ctx.entity, ctx.tuning.name));
}

pub fn death() -> StateHandlers {
    StateHandlers::new("death").on_enter(death_enter)
}

// ============================================================================
// Melee swing (удар по AnimationTrigger)
// ============================================================================

fn melee_enter(ctx: &mut StateContext<'_>) {
    ctx.memory.attack_fired = false;
    face_target(ctx);
    stop(ctx);
}

fn melee_exit(ctx: &mut StateContext<'_>) {
    start_cooldown(ctx);
}

/// Один удар на замах: все текущие цели hitbox'а
fn melee_strike(ctx: &mut StateContext<'_>) {
    if ctx.memory.attack_fired {
        return;
    }
    ctx.memory.attack_fired = true;

    let data = attack_data(ctx);
    let knockback = ctx.tuning.combat.knockback_on_hit.then(|| ctx.facing());
    let Some(hitbox) = ctx.core.find::<DamageHitBox>() else {
        return;
    };
    let requests = hitbox.melee_attack(ctx.entity, &data, knockback);

    crate::logger::log(&format!("⚔️ {:?} swing: {} target(s)", ctx.entity, requests.len()));
    for request in requests {
        ctx.push(ActorCommand::Hit(request));
    }
}

/// Melee attack; `logic` решает, куда после замаха
pub fn melee_attack(logic: fn(&mut StateContext<'_>) -> Option<StateId>) -> StateHandlers {
    StateHandlers::new("attack")
        .on_enter(melee_enter)
        .on_exit(melee_exit)
        .logic(logic)
        .physics(stop)
        .on_trigger(melee_strike)
}

/// Ranged / charge / melee cooldown старт на выходе из атаки
pub fn attack_exit(ctx: &mut StateContext<'_>) {
    start_cooldown(ctx);
}

// ============================================================================
// Patrol (Idle → Move → Waiting → Idle) для врагов
// ============================================================================

fn idle_enter(ctx: &mut StateContext<'_>) {
    let timing = &ctx.tuning.timing;
    let (min, max) = (timing.idle_time_min, timing.idle_time_max);
    ctx.memory.idle_duration = if max > min { ctx.rng.gen_range(min..=max) } else { min };
    stop(ctx);
}

pub fn patrol_idle_logic(ctx: &mut StateContext<'_>, engage: EngageFn) -> Option<StateId> {
    if ctx.memory.is_target_detected {
        return engage(ctx);
    }
    if ctx.time_in_state() < ctx.memory.idle_duration {
        return None;
    }

    if ctx.memory.flip_after_idle {
        ctx.memory.flip_after_idle = false;
        if let Some(movement) = ctx.movement() {
            movement.flip();
        }
    }
    Some(StateId::Move)
}

pub fn patrol_move_logic(ctx: &mut StateContext<'_>, engage: EngageFn) -> Option<StateId> {
    if ctx.memory.is_target_detected {
        return engage(ctx);
    }
    (ctx.memory.is_touching_wall || !ctx.memory.is_ledge_ahead).then_some(StateId::Waiting)
}

fn patrol_move_physics(ctx: &mut StateContext<'_>) {
    let speed = ctx.tuning.movement.move_speed;
    let facing = ctx.facing();
    if let Some(movement) = ctx.movement() {
        movement.set_velocity_x(speed * facing as f32);
    }
}

pub fn patrol_waiting_logic(ctx: &mut StateContext<'_>, engage: EngageFn) -> Option<StateId> {
    if ctx.memory.is_target_detected {
        return engage(ctx);
    }
    if ctx.time_in_state() < ctx.tuning.timing.wait_time {
        return None;
    }
    ctx.memory.flip_after_idle = true;
    Some(StateId::Idle)
}

pub fn patrol_idle(logic: fn(&mut StateContext<'_>) -> Option<StateId>) -> StateHandlers {
    StateHandlers::new("idle")
        .on_enter(idle_enter)
        .checks(enemy_checks)
        .logic(logic)
        .physics(stop)
}

pub fn patrol_move(logic: fn(&mut StateContext<'_>) -> Option<StateId>) -> StateHandlers {
    StateHandlers::new("move")
        .checks(enemy_checks)
        .logic(logic)
        .physics(patrol_move_physics)
}

pub fn patrol_waiting(logic: fn(&mut StateContext<'_>) -> Option<StateId>) -> StateHandlers {
    StateHandlers::new("wait")
        .on_enter(stop)
        .checks(enemy_checks)
        .logic(logic)
        .physics(stop)
}

/// Стоим лицом к цели, пока не готова атака
pub fn hold_position(ctx: &mut StateContext<'_>) {
    face_target(ctx);
    stop(ctx);
}

/// Cooldown для стрелков / charger: цель потеряна → Idle, готовы → `attack`
pub fn hold_logic(ctx: &mut StateContext<'_>, attack: StateId) -> Option<StateId> {
    if !ctx.memory.is_target_detected {
        return attack_ready(ctx).then_some(StateId::Idle);
    }
    (ctx.memory.is_target_in_attack_range && attack_ready(ctx)).then_some(attack)
}

pub fn cooldown(logic: fn(&mut StateContext<'_>) -> Option<StateId>) -> StateHandlers {
    StateHandlers::new("cooldown")
        .on_enter(hold_position)
        .checks(enemy_checks)
        .logic(logic)
        .physics(hold_position)
}
