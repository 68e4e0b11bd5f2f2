//! GRAVEBOUND Simulation Core
//!
//! ECS-симуляция 2D action-боя на Bevy 0.16 (headless).
//!
//! Слои:
//! - capabilities: Core registry + capability компоненты (movement, senses, health, block...)
//! - fsm: StateMachine, strategy tables состояний, StateContext
//! - archetypes: player / grunt / archer / charger
//! - combat: damage pipeline, knockback, block/parry, projectiles
//! - actor: composition root, animation / notification collaborators, phase systems
//! - spatial: SpatialQuery + in-memory ColliderWorld
//! - config: ArchetypeTuning (RON)
//!
//! Два фазовых цикла:
//! - logic phase (Update, частота кадров) — LogicSet
//! - physics phase (FixedUpdate, 60Hz) — PhysicsSet

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod actor;
pub mod archetypes;
pub mod capabilities;
pub mod combat;
pub mod config;
pub mod fsm;
pub mod logger;
pub mod spatial;

// Re-export для удобства
pub use actor::{
    spawn_actor, spawn_archetype, Actor, ActorPlugin, AnimationSignal, AnimationSignalKind, AnimatorFlags,
    GameNotification, Hurtbox, Player, PlayerInput,
};
pub use archetypes::Archetype;
pub use capabilities::{Block, Core, CoreComponent, CoreError, DamageReceiver, KnockbackReceiver, Movement, Stats};
pub use combat::{
    AttackDeflected, BlockPerformed, CombatPlugin, DamageData, DamageTaken, Dead, DespawnAfter, HealthDepleted,
    HitRequest, InstantKillRequest, KnockbackApplied,
};
pub use config::{ArchetypeTuning, ConfigError};
pub use fsm::{FsmError, StateId, StateMachine, StateMemory};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use spatial::{ColliderWorld, LayerMask, SpatialQuery};

/// Шаг headless симуляции (один app.update())
pub const TICK: f64 = 1.0 / 60.0;

/// Logic phase (Update), порядок фиксирован
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicSet {
    /// Enter(initial) для новых акторов
    Spawn,
    /// Headless animation clock
    Animation,
    /// AnimationSignal → состояния
    Signals,
    /// Core.logic_update + State.LogicUpdate
    Logic,
    /// HitRequest → damage pipeline
    Combat,
    /// Interrupts (Death / Hurt / Stun) по combat событиям
    Reactions,
    /// Despawn мёртвых
    Cleanup,
}

/// Physics phase (FixedUpdate), порядок фиксирован
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    /// Transform → ColliderWorld
    Sync,
    /// DoChecks + PhysicsUpdate
    States,
    /// velocity → Transform
    Integrate,
    /// Hitbox Entered / Exited
    Triggers,
    Projectiles,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для physics phase
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        // Детерминистичный RNG (seed по умолчанию, если host не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            Update,
            (
                LogicSet::Spawn,
                LogicSet::Animation,
                LogicSet::Signals,
                LogicSet::Logic,
                LogicSet::Combat,
                LogicSet::Reactions,
                LogicSet::Cleanup,
            )
                .chain(),
        )
        .configure_sets(
            FixedUpdate,
            (
                PhysicsSet::Sync,
                PhysicsSet::States,
                PhysicsSet::Integrate,
                PhysicsSet::Triggers,
                PhysicsSet::Projectiles,
            )
                .chain(),
        )
        .add_plugins((CombatPlugin, ActorPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает ровно на TICK за app.update(), так что прогон с одним
/// seed повторяем.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(TICK)))
        .add_plugins(SimulationPlugin);

    app
}

/// Snapshot акторов для сравнения детерминизма
///
/// Формат: по строке на актора (по Entity index), archetype, состояние,
/// здоровье и позиция.
pub fn world_snapshot(world: &mut World) -> Vec<String> {
    let mut query = world.query::<(Entity, &Actor, &StateMachine, &Core, &Transform)>();
    let mut actors: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    actors.sort_by_key(|(entity, ..)| entity.index());

    actors
        .into_iter()
        .map(|(entity, actor, machine, core, transform)| {
            let health = core.find::<Stats>().map_or(0.0, |s| s.current_health());
            format!(
                "{} {:?} {:?} hp={:.3} x={:.4}",
                entity.index(),
                actor.archetype,
                machine.current().ok(),
                health,
                transform.translation.x
            )
        })
        .collect()
}
