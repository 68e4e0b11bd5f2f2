//! Actor domain — composition root
//!
//! Содержит:
//! - components: Actor, Player, Hurtbox, PlayerInput, HitboxFeed
//! - spawn: сборка Core + StateMachine из ArchetypeTuning
//! - animation: AnimatorFlags (outbound) + AnimationSignal (inbound) + headless clock
//! - notifications: GameNotification sink
//! - systems: logic / physics phase, interrupts, hitbox feed

use bevy::prelude::*;

pub mod animation;
pub mod components;
pub mod notifications;
pub mod spawn;
pub mod systems;

pub use animation::{
    headless_animation_clock, AnimationSignal, AnimationSignalKind, AnimatorFlags, HeadlessAnimation,
};
pub use components::*;
pub use notifications::GameNotification;
pub use spawn::{build_core, spawn_actor, spawn_archetype};
pub use systems::{ActorData, ActorOutbox, HitboxTrigger, TickScope};

use crate::spatial::ColliderWorld;
use crate::{LogicSet, PhysicsSet};

/// Actor Plugin
///
/// Update (logic phase):
/// 1. initialize_state_machines (Spawn)
/// 2. headless_animation_clock (Animation)
/// 3. route_animation_signals (Signals)
/// 4. actor_logic_phase (Logic)
/// 5. deliver_combat_interrupts (Reactions, после Combat)
///
/// FixedUpdate (physics phase):
/// 1. sync_actor_colliders (Sync)
/// 2. actor_physics_phase (States)
/// 3. integrate_motion (Integrate)
/// 4. feed_hitbox_overlaps → apply_hitbox_triggers → prune_stale_hitbox_targets (Triggers)
pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ColliderWorld>()
            .add_event::<AnimationSignal>()
            .add_event::<GameNotification>()
            .add_event::<HitboxTrigger>();

        app.add_systems(
            Update,
            (
                systems::initialize_state_machines.in_set(LogicSet::Spawn),
                headless_animation_clock.in_set(LogicSet::Animation),
                systems::route_animation_signals.in_set(LogicSet::Signals),
                systems::actor_logic_phase.in_set(LogicSet::Logic),
                systems::deliver_combat_interrupts.in_set(LogicSet::Reactions),
            ),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::sync_actor_colliders.in_set(PhysicsSet::Sync),
                systems::actor_physics_phase.in_set(PhysicsSet::States),
                systems::integrate_motion.in_set(PhysicsSet::Integrate),
                (
                    systems::feed_hitbox_overlaps,
                    systems::apply_hitbox_triggers,
                    systems::prune_stale_hitbox_targets,
                )
                    .chain()
                    .in_set(PhysicsSet::Triggers),
            ),
        );
    }
}
