//! DamageData + combat события
//!
//! Поток:
//! - State (melee swing / projectile / charge) → `HitRequest`
//! - `resolve_hit_requests` → pipeline → уведомления:
//!   DamageTaken, HealthDepleted, AttackDeflected, BlockPerformed, KnockbackApplied

use bevy::prelude::*;

/// Описание одной атаки (value type)
///
/// Создаётся заново на каждую атаку, дальше не меняется.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageData {
    amount: f32,
    source: Option<Entity>,
    can_block: bool,
    can_parry: bool,
}

impl DamageData {
    /// Неблокируемая, непарируемая атака; отрицательный урон → 0
    pub fn new(amount: f32, source: Option<Entity>) -> Self {
        Self {
            amount: amount.max(0.0),
            source,
            can_block: false,
            can_parry: false,
        }
    }

    pub fn blockable(mut self, can_block: bool) -> Self {
        self.can_block = can_block;
        self
    }

    pub fn parryable(mut self, can_parry: bool) -> Self {
        self.can_parry = can_parry;
        self
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn source(&self) -> Option<Entity> {
        self.source
    }

    pub fn can_block(&self) -> bool {
        self.can_block
    }

    pub fn can_parry(&self) -> bool {
        self.can_parry
    }
}

/// Запрос на удар: attacker → target
///
/// `origin` переопределяет позицию источника для block angle
/// (projectile бьёт из своей позиции, не из позиции стрелка).
#[derive(Event, Debug, Clone)]
pub struct HitRequest {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: Option<DamageData>,
    /// Направление knockback (±1), None = без knockback
    pub knockback: Option<i32>,
    pub origin: Option<Vec2>,
}

/// Запрос на InstantKill: в обход guards и block, урон = текущее здоровье
#[derive(Event, Debug, Clone)]
pub struct InstantKillRequest {
    pub target: Entity,
    pub source: Option<Entity>,
}

/// Урон применён (amount как в DamageData, либо полное здоровье при instant kill)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageTaken {
    pub entity: Entity,
    pub amount: f32,
    pub source: Option<Entity>,
}

/// Здоровье дошло до нуля
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HealthDepleted {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Атакующему: его удар заблокировали (parried = попали в parry window)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AttackDeflected {
    pub attacker: Entity,
    pub defender: Entity,
    pub parried: bool,
}

/// Защитнику: "этот актор заблокировал"
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BlockPerformed {
    pub defender: Entity,
    pub attacker: Entity,
    pub parried: bool,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct KnockbackApplied {
    pub entity: Entity,
    pub direction: i32,
    pub velocity: Vec2,
}

/// Маркер: актор мёртв (Death state), коллайдер убирается из мира
#[derive(Component, Debug)]
pub struct Dead;

/// Маркер: деспавн после указанного времени
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Время деспавна (секунды от старта)
    pub despawn_time: f32,
}
