//! ColliderWorld — axis-aligned коллайдеры в памяти
//!
//! Статика (уровень) добавляется один раз, динамика (акторы) пересинхронизируется
//! каждый physics tick из Transform. BTreeMap по Entity → детерминированный порядок
//! обхода (overlap_area возвращает один и тот же "первый" коллайдер между прогонами).

use super::{LayerMask, OverlapHit, RayHit, SpatialQuery};
use bevy::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub owner: Option<Entity>,
    pub bounds: Rect,
    pub layers: LayerMask,
}

#[derive(Resource, Debug, Default)]
pub struct ColliderWorld {
    statics: Vec<Collider>,
    dynamics: BTreeMap<Entity, Collider>,
}

impl ColliderWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Статическая геометрия (пол, стены, препятствия)
    pub fn add_static(&mut self, center: Vec2, size: Vec2, layers: LayerMask) {
        self.statics.push(Collider {
            owner: None,
            bounds: Rect::from_center_size(center, size),
            layers,
        });
    }

    /// Вставка/обновление коллайдера актора
    pub fn set_dynamic(&mut self, entity: Entity, center: Vec2, size: Vec2, layers: LayerMask) {
        self.dynamics.insert(
            entity,
            Collider {
                owner: Some(entity),
                bounds: Rect::from_center_size(center, size),
                layers,
            },
        );
    }

    pub fn remove_dynamic(&mut self, entity: Entity) -> bool {
        self.dynamics.remove(&entity).is_some()
    }

    /// Удаляет динамические коллайдеры, для которых `keep` вернул false
    pub fn retain_dynamic(&mut self, mut keep: impl FnMut(Entity) -> bool) {
        self.dynamics.retain(|entity, _| keep(*entity));
    }

    pub fn dynamic_count(&self) -> usize {
        self.dynamics.len()
    }

    fn colliders(&self) -> impl Iterator<Item = &Collider> {
        self.statics.iter().chain(self.dynamics.values())
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

/// Slab test: параметр входа луча в AABB (0 если origin внутри)
fn ray_enter(origin: Vec2, direction: Vec2, bounds: Rect) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);

        if d.abs() < f32::EPSILON {
            // Луч параллелен граням: промах если origin вне слоя
            if o < lo || o > hi {
                return None;
            }
        } else {
            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(t_min)
}

impl SpatialQuery for ColliderWorld {
    fn overlap_area(&self, center: Vec2, size: Vec2, mask: LayerMask) -> Option<OverlapHit> {
        let area = Rect::from_center_size(center, size);
        self.colliders()
            .find(|c| c.layers.intersects(mask) && overlaps(area, c.bounds))
            .map(|c| OverlapHit {
                entity: c.owner,
                position: c.bounds.center(),
            })
    }

    fn overlap_all(&self, center: Vec2, size: Vec2, mask: LayerMask) -> Vec<OverlapHit> {
        let area = Rect::from_center_size(center, size);
        self.colliders()
            .filter(|c| c.layers.intersects(mask) && overlaps(area, c.bounds))
            .map(|c| OverlapHit {
                entity: c.owner,
                position: c.bounds.center(),
            })
            .collect()
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        self.colliders()
            .filter(|c| c.layers.intersects(mask))
            .filter_map(|c| {
                let t = ray_enter(origin, direction, c.bounds)?;
                (t <= max_distance).then_some((c, t))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(c, t)| RayHit {
                entity: c.owner,
                point: origin + direction * t,
                distance: t,
                fraction: t / max_distance,
            })
    }
}
