//! Actor systems: двухфазный tick
//!
//! Logic phase (Update):
//! 1. initialize_state_machines — Enter(initial) для новых акторов
//! 2. route_animation_signals — Finished / Trigger / ActionTrigger → активное состояние
//! 3. actor_logic_phase — Core.logic_update (bookkeeping capability), потом State.LogicUpdate
//! 4. deliver_combat_interrupts — HealthDepleted → Death, DamageTaken → Hurt, parried → Stun
//!
//! Physics phase (FixedUpdate):
//! 1. sync_actor_colliders — Transform → ColliderWorld
//! 2. actor_physics_phase — DoChecks + PhysicsUpdate
//! 3. integrate_motion — velocity → Transform (headless замена физ. движка)
//! 4. feed_hitbox_overlaps / apply_hitbox_triggers — Entered/Exited → DamageHitBox,
//!    prune_stale_hitbox_targets — цели, пропавшие без Exited
//!
//! Ошибки одного актора не выходят за frame loop: пропуск + лог.

use bevy::ecs::query::QueryData;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

use super::{
    Actor, AnimationSignal, AnimationSignalKind, AnimatorFlags, GameNotification, HitboxFeed, Hurtbox, Player,
    PlayerInput,
};
use crate::capabilities::{Core, DamageHitBox, Movement};
use crate::combat::{
    spawn_projectile, AttackDeflected, DamageTaken, Dead, DespawnAfter, HealthDepleted, HitRequest, KnockbackApplied,
};
use crate::fsm::{report_invalid_transition, ActorCommand, FsmError, StateContext, StateMachine, StateMemory};
use crate::spatial::{ColliderWorld, LayerMask, SpatialQuery};
use crate::DeterministicRng;

/// Paired trigger callback hitbox'а (headless замена Area enter/exit сигналов)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitboxTrigger {
    Entered { owner: Entity, target: Entity },
    Exited { owner: Entity, target: Entity },
}

/// Всё, что нужно для сборки StateContext актора
#[derive(QueryData)]
#[query_data(mutable)]
pub struct ActorData {
    pub entity: Entity,
    pub actor: &'static Actor,
    pub core: &'static mut Core,
    pub machine: &'static mut StateMachine,
    pub memory: &'static mut StateMemory,
    pub animator: &'static mut AnimatorFlags,
    pub transform: &'static Transform,
    pub input: Option<&'static PlayerInput>,
}

/// Общие для всех акторов данные одного tick'а
pub struct TickScope<'t> {
    pub spatial: &'t dyn SpatialQuery,
    pub rng: &'t mut ChaCha8Rng,
    pub now: f32,
    pub delta: f32,
}

/// StateMachine + StateContext одного актора (непересекающиеся borrow'ы)
fn split<'a>(
    item: &'a mut ActorDataItem<'_>,
    tick: &'a mut TickScope<'_>,
    outbox: &'a mut Vec<ActorCommand>,
) -> (&'a mut StateMachine, StateContext<'a>) {
    let ctx = StateContext {
        entity: item.entity,
        core: &mut *item.core,
        memory: &mut *item.memory,
        tuning: &*item.actor.tuning,
        animator: &mut *item.animator,
        spatial: tick.spatial,
        position: item.transform.translation.truncate(),
        input: item.input.copied().unwrap_or_default(),
        now: tick.now,
        delta: tick.delta,
        commands: outbox,
        rng: &mut *tick.rng,
    };
    (&mut *item.machine, ctx)
}

fn report<T>(entity: Entity, result: Result<T, FsmError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            report_invalid_transition(entity, error);
            None
        }
    }
}

/// Применение ActorCommand outbox'а к миру
#[derive(SystemParam)]
pub struct ActorOutbox<'w, 's> {
    commands: Commands<'w, 's>,
    hits: EventWriter<'w, HitRequest>,
    notifications: EventWriter<'w, GameNotification>,
    knockbacks: EventWriter<'w, KnockbackApplied>,
}

impl ActorOutbox<'_, '_> {
    pub fn apply(&mut self, entity: Entity, command: ActorCommand, now: f32) {
        match command {
            ActorCommand::Hit(request) => {
                self.hits.write(request);
            }
            ActorCommand::LaunchProjectile { data, launch } => {
                spawn_projectile(&mut self.commands, entity, data, launch, now);
            }
            ActorCommand::Notify(notification) => {
                self.notify(notification);
            }
            ActorCommand::KnockedBack { direction, velocity } => {
                self.knockbacks.write(KnockbackApplied {
                    entity,
                    direction,
                    velocity,
                });
            }
            ActorCommand::MarkDead { despawn_at } => {
                if let Ok(mut actor) = self.commands.get_entity(entity) {
                    actor.insert((
                        Dead,
                        DespawnAfter {
                            despawn_time: despawn_at,
                        },
                    ));
                }
            }
        }
    }

    pub fn flush(&mut self, entity: Entity, pending: &mut Vec<ActorCommand>, now: f32) {
        for command in pending.drain(..) {
            self.apply(entity, command, now);
        }
    }

    pub fn notify(&mut self, notification: GameNotification) {
        crate::logger::log(&format!("📣 {:?}", notification));
        self.notifications.write(notification);
    }
}

/// Система: Enter(initial) для акторов с неинициализированной StateMachine
pub fn initialize_state_machines(
    mut actors: Query<ActorData>,
    mut outbox: ActorOutbox,
    world: Res<ColliderWorld>,
    mut rng: ResMut<DeterministicRng>,
    clock: Res<Time<Virtual>>,
) {
    let now = clock.elapsed_secs();
    let mut tick = TickScope {
        spatial: &*world,
        rng: &mut rng.rng,
        now,
        delta: clock.delta_secs(),
    };
    let mut pending = Vec::new();

    for mut item in actors.iter_mut() {
        if item.machine.is_initialized() {
            continue;
        }
        let entity = item.entity;
        {
            let (machine, mut ctx) = split(&mut item, &mut tick, &mut pending);
            report(entity, machine.initialize(&mut ctx));
        }
        outbox.flush(entity, &mut pending, now);
    }
}

/// Система: inbound animation сигналы → активное состояние
pub fn route_animation_signals(
    mut signals: EventReader<AnimationSignal>,
    mut actors: Query<ActorData>,
    mut outbox: ActorOutbox,
    world: Res<ColliderWorld>,
    mut rng: ResMut<DeterministicRng>,
    clock: Res<Time<Virtual>>,
) {
    let now = clock.elapsed_secs();
    let mut tick = TickScope {
        spatial: &*world,
        rng: &mut rng.rng,
        now,
        delta: clock.delta_secs(),
    };
    let mut pending = Vec::new();

    for signal in signals.read() {
        let Ok(mut item) = actors.get_mut(signal.entity) else {
            continue;
        };
        {
            let (machine, mut ctx) = split(&mut item, &mut tick, &mut pending);
            let result = match signal.kind {
                AnimationSignalKind::Finished => machine.animation_finished(&mut ctx),
                AnimationSignalKind::Trigger => machine.animation_trigger(&mut ctx),
                AnimationSignalKind::ActionTrigger => machine.animation_action_trigger(&mut ctx),
            };
            report(signal.entity, result);
        }
        outbox.flush(signal.entity, &mut pending, now);
    }
}

/// Система: logic phase
pub fn actor_logic_phase(
    mut actors: Query<ActorData>,
    mut outbox: ActorOutbox,
    world: Res<ColliderWorld>,
    mut rng: ResMut<DeterministicRng>,
    clock: Res<Time<Virtual>>,
) {
    let now = clock.elapsed_secs();
    let mut tick = TickScope {
        spatial: &*world,
        rng: &mut rng.rng,
        now,
        delta: clock.delta_secs(),
    };
    let mut pending = Vec::new();

    for mut item in actors.iter_mut() {
        if !item.machine.is_initialized() {
            continue;
        }
        let entity = item.entity;

        // Capability bookkeeping до LogicUpdate состояния
        item.core.logic_update(now);

        {
            let (machine, mut ctx) = split(&mut item, &mut tick, &mut pending);
            report(entity, machine.logic_update(&mut ctx));
        }
        outbox.flush(entity, &mut pending, now);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    HealthZero,
    Damage,
    Parried,
}

/// Система: асинхронные interrupts из combat событий
///
/// Порядок: health zero раньше damage, так что смертельный удар ведёт
/// сразу в Death, а damage interrupt в Death уже no-op.
pub fn deliver_combat_interrupts(
    mut depleted: EventReader<HealthDepleted>,
    mut damaged: EventReader<DamageTaken>,
    mut deflected: EventReader<AttackDeflected>,
    mut actors: Query<ActorData>,
    players: Query<(), With<Player>>,
    mut outbox: ActorOutbox,
    world: Res<ColliderWorld>,
    mut rng: ResMut<DeterministicRng>,
    clock: Res<Time<Virtual>>,
) {
    let mut interrupts: Vec<(Entity, Interrupt)> = Vec::new();
    interrupts.extend(depleted.read().map(|e| (e.entity, Interrupt::HealthZero)));
    interrupts.extend(damaged.read().map(|e| (e.entity, Interrupt::Damage)));
    for event in deflected.read() {
        if event.parried {
            interrupts.push((event.attacker, Interrupt::Parried));
        }
        if players.contains(event.defender) {
            outbox.notify(GameNotification::PlayerBlocked {
                attacker: event.attacker,
                parried: event.parried,
            });
        }
    }

    let now = clock.elapsed_secs();
    let mut tick = TickScope {
        spatial: &*world,
        rng: &mut rng.rng,
        now,
        delta: clock.delta_secs(),
    };
    let mut pending = Vec::new();

    for (entity, interrupt) in interrupts {
        let Ok(mut item) = actors.get_mut(entity) else {
            continue;
        };
        if !item.machine.is_initialized() {
            continue;
        }
        {
            let (machine, mut ctx) = split(&mut item, &mut tick, &mut pending);
            let result = match interrupt {
                Interrupt::HealthZero => machine.handle_health_zero(&mut ctx),
                Interrupt::Damage => machine.handle_damage(&mut ctx),
                Interrupt::Parried => machine.handle_parried(&mut ctx),
            };
            if report(entity, result) == Some(true) {
                crate::logger::log(&format!("⚡ {:?} interrupted by {:?}", entity, interrupt));
            }
        }
        outbox.flush(entity, &mut pending, now);
    }
}

/// Система: combat коллайдеры живых акторов → ColliderWorld
pub fn sync_actor_colliders(
    mut world: ResMut<ColliderWorld>,
    actors: Query<(Entity, &Transform, &Hurtbox), Without<Dead>>,
) {
    let mut alive = BTreeSet::new();
    for (entity, transform, hurtbox) in actors.iter() {
        world.set_dynamic(entity, transform.translation.truncate(), hurtbox.size, hurtbox.layers);
        alive.insert(entity);
    }
    world.retain_dynamic(|entity| alive.contains(&entity));
}

/// Система: physics phase
pub fn actor_physics_phase(
    mut actors: Query<ActorData>,
    mut outbox: ActorOutbox,
    world: Res<ColliderWorld>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
    clock: Res<Time<Virtual>>,
) {
    let now = clock.elapsed_secs();
    let mut tick = TickScope {
        spatial: &*world,
        rng: &mut rng.rng,
        now,
        delta: time.delta_secs(),
    };
    let mut pending = Vec::new();

    for mut item in actors.iter_mut() {
        if !item.machine.is_initialized() {
            continue;
        }
        let entity = item.entity;
        {
            let (machine, mut ctx) = split(&mut item, &mut tick, &mut pending);
            report(entity, machine.physics_update(&mut ctx));
        }
        outbox.flush(entity, &mut pending, now);
    }
}

/// Система: горизонтальная интеграция velocity (стены останавливают)
pub fn integrate_motion(
    mut actors: Query<(Entity, &Core, &Hurtbox, &mut Transform), With<Actor>>,
    world: Res<ColliderWorld>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    let solid = LayerMask::GROUND | LayerMask::OBSTACLE;

    for (_entity, core, hurtbox, mut transform) in actors.iter_mut() {
        let Some(movement) = core.find::<Movement>() else {
            continue;
        };

        let facing = movement.facing_direction() as f32;
        transform.scale.x = transform.scale.x.abs() * facing;

        let dx = movement.current_velocity().x * dt;
        if dx == 0.0 {
            continue;
        }

        let half_width = hurtbox.size.x * 0.5;
        let position = transform.translation.truncate();
        let step = match world.raycast(position, Vec2::new(dx, 0.0), dx.abs() + half_width, solid) {
            Some(hit) => dx.signum() * (hit.distance - half_width).max(0.0),
            None => dx,
        };
        transform.translation.x += step;
    }
}

/// Система: diff overlap'ов hitbox'а → HitboxTrigger Entered/Exited
pub fn feed_hitbox_overlaps(
    mut actors: Query<(Entity, &Core, &Transform, &mut HitboxFeed), Without<Dead>>,
    world: Res<ColliderWorld>,
    mut triggers: EventWriter<HitboxTrigger>,
) {
    for (owner, core, transform, mut feed) in actors.iter_mut() {
        let Some(hitbox) = core.find::<DamageHitBox>() else {
            continue;
        };
        let facing = core.find::<Movement>().map_or(1, |m| m.facing_direction());
        let center = hitbox.area_center(transform.translation.truncate(), facing);

        let current: BTreeSet<Entity> = world
            .overlap_all(center, hitbox.size, hitbox.target_mask)
            .into_iter()
            .filter_map(|hit| hit.entity)
            .filter(|target| *target != owner)
            .collect();

        for &target in current.difference(&feed.previous) {
            triggers.write(HitboxTrigger::Entered { owner, target });
        }
        for &target in feed.previous.difference(&current) {
            triggers.write(HitboxTrigger::Exited { owner, target });
        }
        feed.previous = current;
    }
}

/// Система: HitboxTrigger → DamageHitBox target set
pub fn apply_hitbox_triggers(mut triggers: EventReader<HitboxTrigger>, mut cores: Query<&mut Core>) {
    for trigger in triggers.read() {
        let (owner, target, entered) = match *trigger {
            HitboxTrigger::Entered { owner, target } => (owner, target, true),
            HitboxTrigger::Exited { owner, target } => (owner, target, false),
        };
        let Ok(mut core) = cores.get_mut(owner) else {
            continue;
        };
        let Some(hitbox) = core.find_mut::<DamageHitBox>() else {
            continue;
        };
        if entered {
            hitbox.on_enter(target);
        } else {
            hitbox.on_exit(target);
        }
    }
}

/// Система: цели hitbox'а, которые умерли или исчезли без Exited
pub fn prune_stale_hitbox_targets(
    mut cores: Query<(Entity, &mut Core)>,
    living: Query<(), (With<Actor>, Without<Dead>)>,
) {
    for (owner, mut core) in cores.iter_mut() {
        let Some(hitbox) = core.find_mut::<DamageHitBox>() else {
            continue;
        };
        let removed = hitbox.prune(|target| living.contains(target));
        if removed > 0 {
            crate::logger::log_warning(&format!("{:?}: pruned {} stale hitbox target(s)", owner, removed));
        }
    }
}
