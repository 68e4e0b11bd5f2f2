//! DamageHitBox capability: живой набор целей в зоне удара
//!
//! Набор обновляется ТОЛЬКО парными Entered/Exited уведомлениями от
//! physics collaborator (см. `actor::systems::feed_hitbox_overlaps`), не
//! per-tick запросом. Set semantics: повторный Entered не дублирует цель.
//! Пропущенный Exited оставляет stale ссылку — резолвер удара её пропустит.

use bevy::prelude::*;
use std::collections::BTreeSet;
use super::CoreComponent;
use crate::combat::{DamageData, HitRequest};
use crate::spatial::LayerMask;

#[derive(Debug, Clone)]
pub struct DamageHitBox {
    /// Центр зоны относительно актора (для facing = +1)
    pub offset: Vec2,
    pub size: Vec2,
    pub target_mask: LayerMask,
    targets: BTreeSet<Entity>,
}

impl DamageHitBox {
    pub fn new(offset: Vec2, size: Vec2, target_mask: LayerMask) -> Self {
        Self {
            offset,
            size,
            target_mask,
            targets: BTreeSet::new(),
        }
    }

    /// Центр зоны в мире
    pub fn area_center(&self, position: Vec2, facing: i32) -> Vec2 {
        position + Vec2::new(self.offset.x * facing as f32, self.offset.y)
    }

    /// true если цель новая
    pub fn on_enter(&mut self, target: Entity) -> bool {
        self.targets.insert(target)
    }

    /// true если цель была в наборе
    pub fn on_exit(&mut self, target: Entity) -> bool {
        self.targets.remove(&target)
    }

    pub fn contains(&self, target: Entity) -> bool {
        self.targets.contains(&target)
    }

    pub fn targets(&self) -> impl Iterator<Item = Entity> + '_ {
        self.targets.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Удар по всем текущим целям
    pub fn melee_attack(&self, attacker: Entity, data: &DamageData, knockback: Option<i32>) -> Vec<HitRequest> {
        self.targets
            .iter()
            .map(|&target| HitRequest {
                attacker,
                target,
                damage: Some(data.clone()),
                knockback,
                origin: None,
            })
            .collect()
    }

    /// Knockback без урона по всем текущим целям
    pub fn knockback(&self, attacker: Entity, direction: i32) -> Vec<HitRequest> {
        self.targets
            .iter()
            .map(|&target| HitRequest {
                attacker,
                target,
                damage: None,
                knockback: Some(direction),
                origin: None,
            })
            .collect()
    }

    /// Убирает цели, для которых `alive` вернул false. Возвращает число удалённых.
    pub fn prune(&mut self, mut alive: impl FnMut(Entity) -> bool) -> usize {
        let before = self.targets.len();
        self.targets.retain(|&target| alive(target));
        before - self.targets.len()
    }
}

impl CoreComponent for DamageHitBox {
    fn name(&self) -> &'static str {
        "DamageHitBox"
    }
}
