//! Grunt: patrol → chase → melee swing → cooldown

use once_cell::sync::Lazy;

use super::common;
use crate::fsm::{StateContext, StateHandlers, StateId, StateTable};

pub static TABLE: Lazy<StateTable> = Lazy::new(|| {
    StateTable::new("grunt", StateId::Idle)
        .state(StateId::Idle, common::patrol_idle(idle_logic))
        .state(StateId::Move, common::patrol_move(move_logic))
        .state(StateId::Waiting, common::patrol_waiting(waiting_logic))
        .state(
            StateId::Chase,
            StateHandlers::new("chase")
                .checks(common::enemy_checks)
                .logic(chase_logic)
                .physics(chase_physics),
        )
        .state(StateId::MeleeAttack, common::melee_attack(attack_logic))
        .state(StateId::Cooldown, common::cooldown(cooldown_logic))
        .hurt(StateId::Hurt, common::hurt())
        .stun(StateId::Stun, common::stun())
        .death(StateId::Death, common::death())
});

fn engage(ctx: &mut StateContext<'_>) -> Option<StateId> {
    if ctx.memory.is_target_in_attack_range && common::attack_ready(ctx) {
        Some(StateId::MeleeAttack)
    } else {
        Some(StateId::Chase)
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

fn chase_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    if !ctx.memory.is_target_detected {
        return Some(StateId::Idle);
    }
    (ctx.memory.is_target_in_attack_range && common::attack_ready(ctx)).then_some(StateId::MeleeAttack)
}

/// Бежим к цели; у края / стены или уже в range стоим
fn chase_physics(ctx: &mut StateContext<'_>) {
    common::face_target(ctx);
    let blocked = ctx.memory.is_touching_wall || !ctx.memory.is_ledge_ahead;
    if blocked || ctx.memory.is_target_in_attack_range {
        common::stop(ctx);
        return;
    }

    let speed = ctx.tuning.movement.chase_speed;
    let facing = ctx.facing();
    if let Some(movement) = ctx.movement() {
        movement.set_velocity_x(speed * facing as f32);
    }
}

fn attack_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    ctx.memory.is_animation_finished.then_some(StateId::Cooldown)
}

fn cooldown_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    if !common::attack_ready(ctx) {
        return None;
    }
    if ctx.memory.is_target_detected {
        return engage(ctx);
    }
    Some(StateId::Idle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::test_support::Rig;
    use crate::archetypes::Archetype;
    use crate::capabilities::DamageHitBox;
    use crate::fsm::ActorCommand;
    use crate::spatial::LayerMask;
    use bevy::prelude::*;

    #[test]
    fn test_patrol_stops_at_wall_then_turns() {
        let mut rig = Rig::new(Archetype::Grunt);
        rig.init(0.0);
        rig.wall_at(0.9);

        // Idle держится idle_duration (1..2 сек)
        assert_eq!(rig.logic(0.5), None);
        assert_eq!(rig.logic(2.1), Some(StateId::Move));

        rig.physics(2.1);
        assert!(rig.memory.is_touching_wall);
        assert_eq!(rig.logic(2.2), Some(StateId::Waiting));
        assert_eq!(rig.velocity(), Vec2::ZERO);

        // wait_time 0.5 → Idle с разворотом после idle
        assert_eq!(rig.logic(2.5), None);
        assert_eq!(rig.logic(2.8), Some(StateId::Idle));
        assert!(rig.memory.flip_after_idle);

        assert_eq!(rig.logic(5.0), Some(StateId::Move));
        assert_eq!(rig.facing(), -1);
        rig.physics(5.0);
        assert_eq!(rig.velocity(), Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_patrol_waits_at_ledge() {
        let mut rig = Rig::new(Archetype::Grunt);
        // Край пола сразу справа
        rig.position = Vec2::new(19.8, 0.0);
        rig.init(0.0);

        assert!(!rig.memory.is_ledge_ahead);
        assert_eq!(rig.logic(2.1), Some(StateId::Move));
        assert_eq!(rig.logic(2.2), Some(StateId::Waiting));
    }

    #[test]
    fn test_chases_detected_player() {
        let mut rig = Rig::new(Archetype::Grunt);
        rig.place(9, Vec2::new(4.0, 0.0), LayerMask::PLAYER);
        rig.init(0.0);

        assert!(rig.memory.is_target_detected);
        assert!(!rig.memory.is_target_in_attack_range);
        assert_eq!(rig.logic(0.1), Some(StateId::Chase));

        rig.physics(0.1);
        assert_eq!(rig.velocity(), Vec2::new(3.5, 0.0));
    }

    #[test]
    fn test_swings_in_range_then_cools_down() {
        let mut rig = Rig::new(Archetype::Grunt);
        let player = rig.place(9, Vec2::new(1.0, 0.0), LayerMask::PLAYER);
        rig.init(0.0);
        rig.core.get_mut::<DamageHitBox>().unwrap().on_enter(player);

        assert!(rig.memory.is_target_in_attack_range);
        assert_eq!(rig.logic(0.1), Some(StateId::MeleeAttack));

        rig.trigger(0.4);
        let commands = rig.take_commands();
        assert!(matches!(
            commands.as_slice(),
            [ActorCommand::Hit(request)] if request.target == player && request.knockback == Some(1)
        ));

        rig.finish_animation(0.7);
        assert_eq!(rig.logic(0.7), Some(StateId::Cooldown));
        rig.physics(0.8);
        assert_eq!(rig.logic(1.2), None);
        // cooldown 1.0 от выхода из атаки
        assert_eq!(rig.logic(1.8), Some(StateId::MeleeAttack));
    }

    #[test]
    fn test_loses_target_returns_to_idle() {
        let mut rig = Rig::new(Archetype::Grunt);
        let player = rig.place(9, Vec2::new(4.0, 0.0), LayerMask::PLAYER);
        rig.init(0.0);
        assert_eq!(rig.logic(0.1), Some(StateId::Chase));

        rig.world.remove_dynamic(player);
        rig.physics(0.2);
        assert_eq!(rig.logic(0.2), Some(StateId::Idle));
    }

    #[test]
    fn test_parry_stuns_then_recovers() {
        let mut rig = Rig::new(Archetype::Grunt);
        rig.init(0.0);
        rig.change(StateId::MeleeAttack, 0.1);

        assert!(rig.parried_interrupt(0.2));
        assert_eq!(rig.state(), StateId::Stun);
        assert_eq!(rig.logic(0.8), None);
        assert_eq!(rig.logic(1.3), Some(StateId::Idle));
    }

    #[test]
    fn test_death_is_terminal_and_schedules_despawn() {
        let mut rig = Rig::new(Archetype::Grunt);
        rig.init(0.0);
        rig.take_commands();

        assert!(rig.health_zero_interrupt(1.0));
        assert_eq!(rig.state(), StateId::Death);

        let commands = rig.take_commands();
        assert!(matches!(commands[0], ActorCommand::MarkDead { despawn_at } if despawn_at == 3.0));
        assert!(matches!(
            &commands[1],
            ActorCommand::Notify(crate::actor::GameNotification::EntityKilled { kind, .. }) if kind == "grunt"
        ));

        let movement = rig.core.get::<crate::capabilities::Movement>().unwrap();
        assert!(!movement.can_set_velocity());
        assert!(!rig.damage_interrupt(1.5));
        assert_eq!(rig.logic(10.0), None);
    }
}
