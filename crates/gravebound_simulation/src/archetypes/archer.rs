//! Archer: patrol, при виде цели — выстрел по AnimationActionTrigger
//!
//! Снаряды неблокируемые. Stun / Block у archer'а нет.

use bevy::prelude::*;
use once_cell::sync::Lazy;

use super::common;
use crate::combat::ProjectileLaunch;
use crate::config::tuning::vec2;
use crate::fsm::{ActorCommand, StateContext, StateHandlers, StateId, StateTable};

pub static TABLE: Lazy<StateTable> = Lazy::new(|| {
    StateTable::new("archer", StateId::Idle)
        .state(StateId::Idle, common::patrol_idle(idle_logic))
        .state(StateId::Move, common::patrol_move(move_logic))
        .state(StateId::Waiting, common::patrol_waiting(waiting_logic))
        .state(
            StateId::RangedAttack,
            StateHandlers::new("ranged_attack")
                .on_enter(ranged_enter)
                .on_exit(common::attack_exit)
                .checks(common::enemy_checks)
                .logic(ranged_logic)
                .physics(common::stop)
                .on_action_trigger(fire),
        )
        .state(StateId::Cooldown, common::cooldown(cooldown_logic))
        .hurt(StateId::Hurt, common::hurt())
        .death(StateId::Death, common::death())
});

fn engage(ctx: &mut StateContext<'_>) -> Option<StateId> {
    if ctx.memory.is_target_in_attack_range && common::attack_ready(ctx) {
        Some(StateId::RangedAttack)
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
    common::hold_logic(ctx, StateId::RangedAttack)
}

fn ranged_enter(ctx: &mut StateContext<'_>) {
    ctx.memory.attack_fired = false;
    common::hold_position(ctx);
}

fn ranged_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    ctx.memory.is_animation_finished.then_some(StateId::Cooldown)
}

/// Один снаряд на выстрел
fn fire(ctx: &mut StateContext<'_>) {
    if ctx.memory.attack_fired {
        return;
    }
    let Some(projectile) = ctx.tuning.combat.projectile.as_ref() else {
        crate::logger::log_warning(&format!("⚠️ {:?}: ranged attack without projectile tuning", ctx.entity));
        return;
    };
    ctx.memory.attack_fired = true;

    let facing = ctx.facing();
    let offset = vec2(projectile.spawn_offset);
    let launch = ProjectileLaunch {
        origin: ctx.position + Vec2::new(offset.x * facing as f32, offset.y),
        direction: facing,
        speed: projectile.speed,
        lifetime: projectile.lifetime,
        size: vec2(projectile.size),
        target_mask: ctx.tuning.target_mask,
    };
    let data = common::attack_data(ctx);

    crate::logger::log(&format!("🏹 {:?} fires (dir {})", ctx.entity, facing));
    ctx.push(ActorCommand::LaunchProjectile { data, launch });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::test_support::Rig;
    use crate::archetypes::Archetype;
    use crate::spatial::LayerMask;

    #[test]
    fn test_fires_one_unblockable_projectile() {
        let mut rig = Rig::new(Archetype::Archer);
        rig.place(9, Vec2::new(6.0, 0.0), LayerMask::PLAYER);
        rig.init(0.0);

        assert!(rig.memory.is_target_in_attack_range);
        assert_eq!(rig.logic(0.1), Some(StateId::RangedAttack));
        assert!(rig.animator.get("ranged_attack"));

        rig.action_trigger(0.5);
        rig.action_trigger(0.55);

        let commands = rig.take_commands();
        assert_eq!(commands.len(), 1);
        let ActorCommand::LaunchProjectile { data, launch } = &commands[0] else {
            panic!("expected projectile, got {:?}", commands[0]);
        };
        assert!(!data.can_block());
        assert!(!data.can_parry());
        assert_eq!(data.amount(), 10.0);
        assert_eq!(data.source(), Some(rig.entity));
        assert_eq!(launch.direction, 1);
        assert_eq!(launch.origin, Vec2::new(0.6, 0.2));
        assert_eq!(launch.target_mask, LayerMask::PLAYER);
    }

    #[test]
    fn test_out_of_range_holds_in_cooldown() {
        let mut rig = Rig::new(Archetype::Archer);
        rig.place(9, Vec2::new(9.0, 0.0), LayerMask::PLAYER);
        rig.init(0.0);

        assert!(rig.memory.is_target_detected);
        assert!(!rig.memory.is_target_in_attack_range);
        assert_eq!(rig.logic(0.1), Some(StateId::Cooldown));
        rig.physics(0.2);
        assert_eq!(rig.logic(0.2), None);
        assert_eq!(rig.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_cooldown_between_shots() {
        let mut rig = Rig::new(Archetype::Archer);
        rig.place(9, Vec2::new(6.0, 0.0), LayerMask::PLAYER);
        rig.init(0.0);

        assert_eq!(rig.logic(0.0), Some(StateId::RangedAttack));
        rig.finish_animation(0.7);
        assert_eq!(rig.logic(0.7), Some(StateId::Cooldown));

        // attack_cooldown 1.5
        assert_eq!(rig.logic(1.5), None);
        assert_eq!(rig.logic(2.3), Some(StateId::RangedAttack));
    }

    #[test]
    fn test_parry_has_no_effect_without_stun() {
        let mut rig = Rig::new(Archetype::Archer);
        rig.init(0.0);

        assert!(!rig.parried_interrupt(0.5));
        assert_eq!(rig.state(), StateId::Idle);
    }
}
