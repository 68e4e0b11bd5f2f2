//! Combat pipeline module
//!
//! ECS ответственность:
//! - DamageData (value type одной атаки)
//! - pipeline: damage / instant kill / knockback / block / parry над Core защитника
//! - события: HitRequest → DamageTaken, HealthDepleted, BlockPerformed,
//!   AttackDeflected, KnockbackApplied
//! - projectiles (physics phase) и death cleanup
//!
//! Отсутствующая capability у защитника = no-op, не ошибка.

use bevy::prelude::*;

pub mod damage;
pub mod pipeline;
pub mod projectile;
pub mod systems;


pub use damage::{
    AttackDeflected, BlockPerformed, DamageData, DamageTaken, Dead, DespawnAfter, HealthDepleted, HitRequest,
    InstantKillRequest, KnockbackApplied,
};
pub use pipeline::{DamageOutcome, HitContext, HitOutcome, Ignored, KnockbackOutcome};
pub use projectile::{spawn_projectile, Projectile, ProjectileLaunch};

use crate::{LogicSet, PhysicsSet};

/// Combat Plugin
///
/// Update:
/// 1. resolve_hit_requests — HitRequest / InstantKillRequest → pipeline → события
/// 2. despawn_after_timeout — уборка мёртвых
///
/// FixedUpdate:
/// - advance_projectiles — полёт снарядов, попадания → HitRequest
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HitRequest>()
            .add_event::<InstantKillRequest>()
            .add_event::<DamageTaken>()
            .add_event::<HealthDepleted>()
            .add_event::<AttackDeflected>()
            .add_event::<BlockPerformed>()
            .add_event::<KnockbackApplied>();

        app.add_systems(Update, systems::resolve_hit_requests.in_set(LogicSet::Combat))
            .add_systems(Update, systems::despawn_after_timeout.in_set(LogicSet::Cleanup));

        app.add_systems(FixedUpdate, projectile::advance_projectiles.in_set(PhysicsSet::Projectiles));
    }
}
