//! Combat pipeline: damage / instant kill / knockback / block
//!
//! Чистые функции над `Core` одного актора (без ECS доступа).
//! Cross-entity часть (позиция атакующего, уведомления, state interrupts)
//! — в `combat::systems::resolve_hit_requests`.
//!
//! Порядок `damage`:
//! 1. Guards: DamageReceiver.is_damageable, immunity, Stats.is_alive
//! 2. Block: can_block + Block активен + атакующий в угловом окне
//! 3. Stats.decrease_health → damage taken → immunity window
//!
//! Отсутствующая cooperating capability = no-op, не ошибка.

use bevy::prelude::*;
use super::DamageData;
use crate::capabilities::{Block, Core, DamageReceiver, KnockbackReceiver, Movement, Stats};

/// Входные данные удара, не хранящиеся в Core
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitContext {
    pub now: f32,
    /// Позиция защитника
    pub position: Vec2,
    /// Позиция источника удара (None → block angle не вычислить → не блок)
    pub source_position: Option<Vec2>,
}

impl HitContext {
    pub fn new(now: f32, position: Vec2, source_position: Option<Vec2>) -> Self {
        Self {
            now,
            position,
            source_position,
        }
    }
}

/// Почему операция стала no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    NotDamageable,
    NotKnockbackable,
    Immune,
    Dead,
    MissingCapability(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    Ignored(Ignored),
    Blocked { parried: bool },
    Applied { amount: f32, health_zero: bool },
}

impl DamageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DamageOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnockbackOutcome {
    Ignored(Ignored),
    Blocked { parried: bool },
    Applied { direction: i32, velocity: Vec2 },
}

impl KnockbackOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, KnockbackOutcome::Applied { .. })
    }
}

/// Результат комбинированного удара (урон + knockback)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitOutcome {
    pub damage: Option<DamageOutcome>,
    pub knockback: Option<KnockbackOutcome>,
}

impl HitOutcome {
    /// Удар заблокирован (урон или knockback), parried флаг
    pub fn blocked(&self) -> Option<bool> {
        match (self.damage, self.knockback) {
            (Some(DamageOutcome::Blocked { parried }), _) => Some(parried),
            (_, Some(KnockbackOutcome::Blocked { parried })) => Some(parried),
            _ => None,
        }
    }
}

/// Угол источника в локальной системе защитника, градусы (-180, 180]
///
/// 0° = по facing, +90° = сверху. X зеркалится по facing, так что
/// окно блока симметрично для обоих направлений взгляда.
pub fn relative_angle(position: Vec2, facing: i32, source_position: Vec2) -> f32 {
    let to_source = source_position - position;
    let local = Vec2::new(to_source.x * facing.signum() as f32, to_source.y);
    if local.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    local.y.atan2(local.x).to_degrees()
}

/// Block check: Some(parried) если удар блокируется
pub fn check_block(core: &Core, data: &DamageData, ctx: &HitContext) -> Option<bool> {
    if !data.can_block() {
        return None;
    }
    let block = core.find::<Block>()?;
    if !block.is_blocking() {
        return None;
    }
    let source = ctx.source_position?;
    let facing = core.find::<Movement>().map_or(1, |m| m.facing_direction());
    let angle = relative_angle(ctx.position, facing, source);
    if !block.covers_angle(angle) {
        return None;
    }
    Some(data.can_parry() && block.in_parry_window(ctx.now))
}

fn register_block(core: &mut Core, now: f32) {
    if let Some(block) = core.find_mut::<Block>() {
        block.on_blocked(now);
    }
}

fn damage_guard(core: &Core, now: f32) -> Result<(), Ignored> {
    let receiver = core
        .find::<DamageReceiver>()
        .ok_or(Ignored::MissingCapability("DamageReceiver"))?;
    if !receiver.is_damageable {
        return Err(Ignored::NotDamageable);
    }
    if receiver.is_immune(now) {
        return Err(Ignored::Immune);
    }
    let stats = core
        .find::<Stats>()
        .ok_or(Ignored::MissingCapability("Stats"))?;
    if !stats.is_alive() {
        return Err(Ignored::Dead);
    }
    Ok(())
}

fn apply_health_loss(core: &mut Core, amount: f32, now: f32, start_immunity: bool) -> DamageOutcome {
    let Some(stats) = core.find_mut::<Stats>() else {
        return DamageOutcome::Ignored(Ignored::MissingCapability("Stats"));
    };
    let health_zero = stats.decrease_health(amount);

    if let Some(receiver) = core.find_mut::<DamageReceiver>() {
        receiver.record_damage(amount);
        if start_immunity {
            receiver.start_immunity(now);
        }
    }
    core.notify_damage_taken(amount, now);

    DamageOutcome::Applied { amount, health_zero }
}

/// Damage(damageData)
pub fn damage(core: &mut Core, data: &DamageData, ctx: &HitContext) -> DamageOutcome {
    if let Err(reason) = damage_guard(core, ctx.now) {
        return DamageOutcome::Ignored(reason);
    }

    if let Some(parried) = check_block(core, data, ctx) {
        register_block(core, ctx.now);
        return DamageOutcome::Blocked { parried };
    }

    apply_health_loss(core, data.amount(), ctx.now, true)
}

/// InstantKill(): в обход guards/block, урон = текущее здоровье
pub fn instant_kill(core: &mut Core, now: f32) -> DamageOutcome {
    let Some(current) = core.find::<Stats>().map(|s| s.current_health()) else {
        return DamageOutcome::Ignored(Ignored::MissingCapability("Stats"));
    };
    apply_health_loss(core, current, now, false)
}

fn knockback_guard(core: &Core, now: f32, respect_immunity: bool) -> Result<(), Ignored> {
    let receiver = core
        .find::<KnockbackReceiver>()
        .ok_or(Ignored::MissingCapability("KnockbackReceiver"))?;
    if !receiver.is_knockbackable {
        return Err(Ignored::NotKnockbackable);
    }
    if respect_immunity && core.find::<DamageReceiver>().is_some_and(|r| r.is_immune(now)) {
        return Err(Ignored::Immune);
    }
    if core.find::<Stats>().is_some_and(|s| !s.is_alive()) {
        return Err(Ignored::Dead);
    }
    if !core.contains::<Movement>() {
        return Err(Ignored::MissingCapability("Movement"));
    }
    Ok(())
}

fn knock(core: &mut Core, direction: i32, now: f32, respect_immunity: bool) -> KnockbackOutcome {
    if let Err(reason) = knockback_guard(core, now, respect_immunity) {
        return KnockbackOutcome::Ignored(reason);
    }

    let Some(receiver) = core.find_mut::<KnockbackReceiver>() else {
        return KnockbackOutcome::Ignored(Ignored::MissingCapability("KnockbackReceiver"));
    };
    let velocity = receiver.velocity_for(direction);
    let duration = receiver.duration;
    let immunity = receiver.immunity_time;
    receiver.begin(now);

    if let Some(movement) = core.find_mut::<Movement>() {
        movement.force_velocity(velocity);
        movement.lock_velocity(now + duration);
    }
    if let Some(damage_receiver) = core.find_mut::<DamageReceiver>() {
        damage_receiver.extend_immunity(now, immunity);
    }

    KnockbackOutcome::Applied { direction, velocity }
}

/// ApplyKnockback(direction)
pub fn apply_knockback(core: &mut Core, direction: i32, now: f32) -> KnockbackOutcome {
    knock(core, direction, now, true)
}

/// ReceiveKnockback(damageData, direction): block check, потом ApplyKnockback
pub fn receive_knockback(core: &mut Core, data: &DamageData, direction: i32, ctx: &HitContext) -> KnockbackOutcome {
    if let Some(parried) = check_block(core, data, ctx) {
        register_block(core, ctx.now);
        return KnockbackOutcome::Blocked { parried };
    }
    apply_knockback(core, direction, ctx.now)
}

/// ReceiveKnockback(): контактный knockback против собственного facing
pub fn receive_contact_knockback(core: &mut Core, now: f32) -> KnockbackOutcome {
    let facing = core.find::<Movement>().map_or(1, |m| m.facing_direction());
    apply_knockback(core, -facing, now)
}

/// Один удар = guards один раз, потом урон и knockback.
///
/// Knockback после успешного урона не упирается в только что открытое
/// immunity window; заблокированный/проигнорированный урон отменяет и knockback.
pub fn resolve_hit(
    core: &mut Core,
    data: Option<&DamageData>,
    knockback: Option<i32>,
    ctx: &HitContext,
) -> HitOutcome {
    let Some(data) = data else {
        return HitOutcome {
            damage: None,
            knockback: knockback.map(|direction| apply_knockback(core, direction, ctx.now)),
        };
    };

    let damage_outcome = damage(core, data, ctx);
    let knockback_outcome = knockback.map(|direction| match damage_outcome {
        DamageOutcome::Applied { .. } => knock(core, direction, ctx.now, false),
        DamageOutcome::Blocked { parried } => KnockbackOutcome::Blocked { parried },
        DamageOutcome::Ignored(reason) => KnockbackOutcome::Ignored(reason),
    });

    HitOutcome {
        damage: Some(damage_outcome),
        knockback: knockback_outcome,
    }
}

/// Уведомление атакующему, что его удар отбит
pub fn notify_attack_deflected(core: &mut Core, parried: bool, now: f32) {
    if let Some(receiver) = core.find_mut::<DamageReceiver>() {
        receiver.on_attack_deflected(parried, now);
    }
}
