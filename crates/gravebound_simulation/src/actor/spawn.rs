//! Сборка актора: Core + StateMachine + компоненты
//!
//! Все capability создаются здесь, один раз, из ArchetypeTuning.
//! Дальше состав Core не меняется, ссылки между capability не кэшируются.

use bevy::prelude::*;
use std::sync::Arc;

use super::{Actor, AnimatorFlags, HeadlessAnimation, HitboxFeed, Hurtbox, Player, PlayerInput};
use crate::archetypes::Archetype;
use crate::capabilities::{
    Block, CollisionSenses, Core, DamageHitBox, DamageReceiver, EntityDetector, HurtEffect, KnockbackReceiver,
    Movement, Stats,
};
use crate::config::{tuning::vec2, ArchetypeTuning};
use crate::fsm::{StateMachine, StateMemory};
use crate::spatial::LayerMask;

/// Core из tuning (explicit DI вместо lazy lookup'ов)
pub fn build_core(tuning: &ArchetypeTuning) -> Core {
    let senses = &tuning.senses;
    let detection = &tuning.detection;
    let combat = &tuning.combat;
    let knockback = &tuning.knockback;

    let mut knockback_receiver = KnockbackReceiver::new(knockback.magnitude, vec2(knockback.angle), knockback.duration)
        .with_immunity(knockback.immunity_time);
    knockback_receiver.is_knockbackable = knockback.knockbackable;

    let mut core = Core::new()
        .with(Movement::new(tuning.movement.initial_facing))
        .with(CollisionSenses {
            ground_check_offset: vec2(senses.ground_offset),
            ground_check_size: vec2(senses.ground_size),
            wall_check_offset: vec2(senses.wall_offset),
            wall_check_distance: senses.wall_distance,
            ledge_check_offset: vec2(senses.ledge_offset),
            ledge_check_distance: senses.ledge_distance,
            ground_mask: LayerMask::GROUND,
        })
        .with(
            EntityDetector::new(vec2(detection.area_offset), vec2(detection.area_size), tuning.target_mask)
                .with_obstacles(LayerMask::GROUND | LayerMask::OBSTACLE),
        )
        .with(Stats::new(tuning.max_health))
        .with(DamageReceiver::new(combat.immunity_time))
        .with(knockback_receiver)
        .with(DamageHitBox::new(
            vec2(combat.hitbox_offset),
            vec2(combat.hitbox_size),
            tuning.target_mask,
        ));

    if let Some(block) = &tuning.block {
        core.add(Block::new(block.min_angle, block.max_angle).with_parry_window(block.parry_window));
    }
    if let Some(effect) = &tuning.hurt_effect {
        core.add(HurtEffect::new(effect.cue, effect.duration));
    }

    core
}

/// Спавн актора archetype'а с заданным tuning
pub fn spawn_actor(commands: &mut Commands, archetype: Archetype, tuning: Arc<ArchetypeTuning>, position: Vec2) -> Entity {
    let core = build_core(&tuning);
    let hurtbox = Hurtbox {
        size: vec2(tuning.collider_size),
        layers: tuning.layer,
    };
    let facing = if tuning.movement.initial_facing < 0 { -1.0 } else { 1.0 };

    let mut entity = commands.spawn((
        Actor { archetype, tuning },
        core,
        StateMachine::new(archetype.table()),
        StateMemory::default(),
        AnimatorFlags::default(),
        HeadlessAnimation::default(),
        HitboxFeed::default(),
        hurtbox,
        Transform::from_translation(position.extend(0.0)).with_scale(Vec3::new(facing, 1.0, 1.0)),
    ));

    if archetype == Archetype::Player {
        entity.insert((Player, PlayerInput::default()));
    }

    let id = entity.id();
    crate::logger::log_info(&format!("✨ Spawned {:?} {:?} at {:?}", archetype, id, position));
    id
}

/// Спавн с встроенным tuning archetype'а
pub fn spawn_archetype(commands: &mut Commands, archetype: Archetype, position: Vec2) -> Entity {
    spawn_actor(commands, archetype, Arc::new(archetype.default_tuning()), position)
}
