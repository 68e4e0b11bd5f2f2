//! Player: input-driven состояния
//!
//! Idle ⇄ Move, Block пока держится кнопка, MeleeAttack по кнопке и cooldown.

use once_cell::sync::Lazy;

use super::common;
use crate::capabilities::Block;
use crate::fsm::{StateContext, StateHandlers, StateId, StateTable};

pub static TABLE: Lazy<StateTable> = Lazy::new(|| {
    StateTable::new("player", StateId::Idle)
        .state(
            StateId::Idle,
            StateHandlers::new("idle")
                .on_enter(common::stop)
                .checks(common::surface_checks)
                .logic(idle_logic)
                .physics(common::stop),
        )
        .state(
            StateId::Move,
            StateHandlers::new("move")
                .checks(common::surface_checks)
                .logic(move_logic)
                .physics(move_physics),
        )
        .state(
            StateId::Block,
            StateHandlers::new("block")
                .on_enter(block_enter)
                .on_exit(block_exit)
                .checks(common::surface_checks)
                .logic(block_logic)
                .physics(common::stop),
        )
        .state(StateId::MeleeAttack, common::melee_attack(attack_logic))
        .hurt(StateId::Hurt, common::hurt())
        .stun(StateId::Stun, common::stun())
        .death(StateId::Death, common::death())
});

/// Block / attack имеют приоритет над движением
fn combat_input(ctx: &mut StateContext<'_>) -> Option<StateId> {
    if ctx.input.block && ctx.core.contains::<Block>() {
        return Some(StateId::Block);
    }
    if ctx.input.attack && common::attack_ready(ctx) {
        return Some(StateId::MeleeAttack);
    }
    None
}

fn idle_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    combat_input(ctx).or_else(|| (ctx.input.x != 0).then_some(StateId::Move))
}

fn move_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    combat_input(ctx).or_else(|| (ctx.input.x == 0).then_some(StateId::Idle))
}

fn move_physics(ctx: &mut StateContext<'_>) {
    let x = ctx.input.x;
    let speed = ctx.tuning.movement.move_speed;
    if let Some(movement) = ctx.movement() {
        movement.check_if_should_flip(x);
        movement.set_velocity_x(speed * x.signum() as f32);
    }
}

fn block_enter(ctx: &mut StateContext<'_>) {
    common::stop(ctx);
    let now = ctx.now;
    if let Some(block) = ctx.core.find_mut::<Block>() {
        block.start(now);
    }
}

fn block_exit(ctx: &mut StateContext<'_>) {
    if let Some(block) = ctx.core.find_mut::<Block>() {
        block.stop();
    }
}

fn block_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    (!ctx.input.block).then_some(StateId::Idle)
}

fn attack_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    ctx.memory.is_animation_finished.then_some(StateId::Idle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::PlayerInput;
    use crate::archetypes::test_support::Rig;
    use crate::archetypes::Archetype;
    use crate::capabilities::DamageHitBox;
    use crate::fsm::ActorCommand;
    use crate::spatial::LayerMask;
    use bevy::prelude::*;

    #[test]
    fn test_move_input_drives_velocity_and_facing() {
        let mut rig = Rig::new(Archetype::Player);
        rig.init(0.0);

        rig.input = PlayerInput::moving(-1);
        assert_eq!(rig.logic(0.1), Some(StateId::Move));
        rig.physics(0.1);

        assert_eq!(rig.facing(), -1);
        assert_eq!(rig.velocity(), Vec2::new(-6.0, 0.0));

        rig.input = PlayerInput::idle();
        assert_eq!(rig.logic(0.2), Some(StateId::Idle));
        assert_eq!(rig.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_move_speed_ignores_axis_magnitude() {
        let mut rig = Rig::new(Archetype::Player);
        rig.init(0.0);

        rig.input = PlayerInput::moving(4);
        assert_eq!(rig.logic(0.1), Some(StateId::Move));
        rig.physics(0.1);

        assert_eq!(rig.facing(), 1);
        assert_eq!(rig.velocity(), Vec2::new(6.0, 0.0));
    }

    #[test]
    fn test_block_held_then_released() {
        let mut rig = Rig::new(Archetype::Player);
        rig.init(0.0);

        rig.input = PlayerInput::blocking();
        assert_eq!(rig.logic(1.0), Some(StateId::Block));
        let block = rig.core.get::<Block>().unwrap();
        assert!(block.is_blocking());
        assert!(block.in_parry_window(1.1));
        assert!(rig.animator.get("block"));

        rig.input = PlayerInput::idle();
        assert_eq!(rig.logic(1.5), Some(StateId::Idle));
        assert!(!rig.core.get::<Block>().unwrap().is_blocking());
    }

    #[test]
    fn test_attack_strikes_hitbox_targets_once() {
        let mut rig = Rig::new(Archetype::Player);
        rig.init(0.0);
        let grunt = rig.place(5, Vec2::new(1.0, 0.0), LayerMask::ENEMY);
        rig.core.get_mut::<DamageHitBox>().unwrap().on_enter(grunt);

        rig.input = PlayerInput::attacking();
        assert_eq!(rig.logic(0.5), Some(StateId::MeleeAttack));
        rig.trigger(0.65);
        rig.trigger(0.66);

        let commands = rig.take_commands();
        assert_eq!(commands.len(), 1);
        let ActorCommand::Hit(request) = &commands[0] else {
            panic!("expected hit, got {:?}", commands[0]);
        };
        assert_eq!(request.target, grunt);
        assert_eq!(request.damage.as_ref().map(|d| d.amount()), Some(20.0));
        assert_eq!(request.knockback, Some(1));
    }

    #[test]
    fn test_attack_respects_cooldown() {
        let mut rig = Rig::new(Archetype::Player);
        rig.init(0.0);

        rig.input = PlayerInput::attacking();
        assert_eq!(rig.logic(0.0), Some(StateId::MeleeAttack));
        rig.finish_animation(0.35);
        assert_eq!(rig.logic(0.35), Some(StateId::Idle));

        // cooldown 0.3 после выхода из атаки
        assert_eq!(rig.logic(0.5), None);
        assert_eq!(rig.logic(0.7), Some(StateId::MeleeAttack));
    }

    #[test]
    fn test_hurt_exits_after_fallback_time() {
        let mut rig = Rig::new(Archetype::Player);
        rig.init(0.0);

        assert!(rig.damage_interrupt(1.0));
        assert_eq!(rig.state(), StateId::Hurt);
        assert_eq!(rig.logic(1.1), None);
        assert_eq!(rig.logic(1.35), Some(StateId::Idle));
    }

    #[test]
    fn test_hurt_stops_block() {
        let mut rig = Rig::new(Archetype::Player);
        rig.init(0.0);
        rig.input = PlayerInput::blocking();
        rig.logic(0.1);

        assert!(rig.damage_interrupt(0.2));
        assert!(!rig.core.get::<Block>().unwrap().is_blocking());
    }
}
