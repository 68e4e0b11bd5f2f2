//! Charger: windup → рывок с контактным уроном → stun об стену

use bevy::prelude::*;
use once_cell::sync::Lazy;

use super::common;
use crate::capabilities::DamageHitBox;
use crate::combat::{pipeline, HitRequest, KnockbackOutcome};
use crate::fsm::{ActorCommand, StateContext, StateHandlers, StateId, StateTable};

pub static TABLE: Lazy<StateTable> = Lazy::new(|| {
    StateTable::new("charger", StateId::Idle)
        .state(StateId::Idle, common::patrol_idle(idle_logic))
        .state(StateId::Move, common::patrol_move(move_logic))
        .state(StateId::Waiting, common::patrol_waiting(waiting_logic))
        .state(
            StateId::Charge,
            StateHandlers::new("charge")
                .on_enter(charge_enter)
                .on_exit(charge_exit)
                .checks(common::enemy_checks)
                .logic(charge_logic)
                .physics(charge_physics),
        )
        .state(StateId::Cooldown, common::cooldown(cooldown_logic))
        .hurt(StateId::Hurt, common::hurt())
        .stun(StateId::Stun, common::stun())
        .death(StateId::Death, common::death())
});

fn engage(ctx: &mut StateContext<'_>) -> Option<StateId> {
    if ctx.memory.is_target_in_attack_range && common::attack_ready(ctx) {
        Some(StateId::Charge)
    } else {
        Some(StateId::Cooldown)
    }
}

fn idle_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    common::patrol_idle_logic(ctx, engage)
}

fn move_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    common::patrol_move_logic(ctx, engage)
}

fn waiting_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    common::patrol_waiting_logic(ctx, engage)
}

fn cooldown_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    common::hold_logic(ctx, StateId::Charge)
}

fn charge_enter(ctx: &mut StateContext<'_>) {
    ctx.memory.struck.clear();
    common::hold_position(ctx);
}

fn charge_exit(ctx: &mut StateContext<'_>) {
    ctx.memory.struck.clear();
    common::attack_exit(ctx);
}

fn is_winding_up(ctx: &StateContext<'_>) -> bool {
    ctx.time_in_state() < ctx.tuning.timing.charge_windup
}

fn charge_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    if is_winding_up(ctx) {
        return None;
    }

    if ctx.memory.is_touching_wall {
        let outcome = pipeline::receive_contact_knockback(ctx.core, ctx.now);
        crate::logger::log(&format!("💥 {:?} charged into wall: {:?}", ctx.entity, outcome));
        if let KnockbackOutcome::Applied { direction, velocity } = outcome {
            ctx.push(ActorCommand::KnockedBack { direction, velocity });
        }
        return Some(StateId::Stun);
    }

    let timing = &ctx.tuning.timing;
    (ctx.time_in_state() >= timing.charge_windup + timing.charge_time).then_some(StateId::Cooldown)
}

fn charge_physics(ctx: &mut StateContext<'_>) {
    if is_winding_up(ctx) {
        common::stop(ctx);
        return;
    }

    let speed = ctx.tuning.movement.charge_speed;
    let facing = ctx.facing();
    if let Some(movement) = ctx.movement() {
        movement.set_velocity_x(speed * facing as f32);
    }
    contact_hits(ctx);
}

/// Каждая цель в hitbox'е получает удар один раз за рывок
fn contact_hits(ctx: &mut StateContext<'_>) {
    let attacker = ctx.entity;
    let knockback = ctx.tuning.combat.knockback_on_hit.then(|| ctx.facing());
    let data = common::attack_data(ctx);

    let Some(hitbox) = ctx.core.find::<DamageHitBox>() else {
        return;
    };
    let fresh: Vec<Entity> = hitbox
        .targets()
        .filter(|target| !ctx.memory.struck.contains(target))
        .collect();

    for target in fresh {
        ctx.memory.struck.push(target);
        ctx.push(ActorCommand::Hit(HitRequest {
            attacker,
            target,
            damage: Some(data.clone()),
            knockback,
            origin: None,
        }));
    }
}
