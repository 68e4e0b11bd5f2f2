//! Combat systems: HitRequest → pipeline → события
//!
//! State interrupts (Hurt / Death / Stun) сюда не входят: их доставляет
//! `actor::systems::deliver_combat_interrupts` по событиям отсюда.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::pipeline::{self, DamageOutcome, HitContext, KnockbackOutcome};
use super::{
    AttackDeflected, BlockPerformed, DamageTaken, DespawnAfter, HealthDepleted, HitRequest,
    InstantKillRequest, KnockbackApplied,
};
use crate::capabilities::Core;

/// Все исходящие combat уведомления одной пачкой
#[derive(SystemParam)]
pub struct CombatEventWriters<'w> {
    pub damage_taken: EventWriter<'w, DamageTaken>,
    pub health_depleted: EventWriter<'w, HealthDepleted>,
    pub deflected: EventWriter<'w, AttackDeflected>,
    pub blocks: EventWriter<'w, BlockPerformed>,
    pub knockbacks: EventWriter<'w, KnockbackApplied>,
}

impl CombatEventWriters<'_> {
    fn damage_outcome(&mut self, entity: Entity, source: Option<Entity>, outcome: DamageOutcome) {
        let DamageOutcome::Applied { amount, health_zero } = outcome else {
            return;
        };

        crate::logger::log_info(&format!("💥 {:?} took {:.1} damage (source {:?})", entity, amount, source));
        self.damage_taken.write(DamageTaken {
            entity,
            amount,
            source,
        });

        if health_zero {
            crate::logger::log_info(&format!("💀 {:?} health depleted (killer {:?})", entity, source));
            self.health_depleted.write(HealthDepleted {
                entity,
                killer: source,
            });
        }
    }

    fn knockback_outcome(&mut self, entity: Entity, outcome: KnockbackOutcome) {
        if let KnockbackOutcome::Applied { direction, velocity } = outcome {
            crate::logger::log_info(&format!("↩️ {:?} knocked back (dir {}, v {:?})", entity, direction, velocity));
            self.knockbacks.write(KnockbackApplied {
                entity,
                direction,
                velocity,
            });
        }
    }

    fn block(&mut self, defender: Entity, attacker: Entity, parried: bool) {
        let kind = if parried { "parried" } else { "blocked" };
        crate::logger::log_info(&format!("🛡️ {:?} {} attack from {:?}", defender, kind, attacker));
        self.blocks.write(BlockPerformed {
            defender,
            attacker,
            parried,
        });
        self.deflected.write(AttackDeflected {
            attacker,
            defender,
            parried,
        });
    }
}

/// Система: разрешение ударов (Update, после logic phase)
///
/// Stale target (entity уже нет) — предупреждение и пропуск,
/// ошибка не выходит за пределы frame loop.
pub fn resolve_hit_requests(
    mut requests: EventReader<HitRequest>,
    mut kills: EventReader<InstantKillRequest>,
    mut actors: Query<(&mut Core, &Transform)>,
    mut events: CombatEventWriters,
    clock: Res<Time<Virtual>>,
) {
    let now = clock.elapsed_secs();

    for request in requests.read() {
        if request.attacker == request.target {
            continue;
        }

        let source_position = request.origin.or_else(|| {
            actors
                .get(request.attacker)
                .ok()
                .map(|(_, transform)| transform.translation.truncate())
        });

        let Ok((mut core, transform)) = actors.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "⚠️ Hit on stale target {:?} from {:?}, skipped",
                request.target, request.attacker
            ));
            continue;
        };

        let ctx = HitContext::new(now, transform.translation.truncate(), source_position);
        let outcome = pipeline::resolve_hit(&mut core, request.damage.as_ref(), request.knockback, &ctx);

        if let Some(damage) = outcome.damage {
            let source = request.damage.as_ref().and_then(|d| d.source());
            events.damage_outcome(request.target, source, damage);
        }
        if let Some(knockback) = outcome.knockback {
            events.knockback_outcome(request.target, knockback);
        }

        if let Some(parried) = outcome.blocked() {
            events.block(request.target, request.attacker, parried);
            if let Ok((mut attacker_core, _)) = actors.get_mut(request.attacker) {
                pipeline::notify_attack_deflected(&mut attacker_core, parried, now);
            }
        }
    }

    for kill in kills.read() {
        let Ok((mut core, _)) = actors.get_mut(kill.target) else {
            continue;
        };
        let outcome = pipeline::instant_kill(&mut core, now);
        events.damage_outcome(kill.target, kill.source, outcome);
    }
}

/// Система: деспавн мёртвых после таймаута
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    clock: Res<Time<Virtual>>,
) {
    let current_time = clock.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
