//! Spatial query collaborator
//!
//! Core не владеет физикой: CollisionSenses, EntityDetector, hitbox feed и
//! projectiles спрашивают мир только через `SpatialQuery`:
//! - `overlap_area` — первый коллайдер в прямоугольнике (по маске слоёв)
//! - `overlap_all` — все коллайдеры в прямоугольнике (hitbox feed)
//! - `raycast` — ближайшее попадание луча (по маске слоёв)
//!
//! `ColliderWorld` — in-memory реализация для headless режима и тестов.

use bevy::prelude::*;

pub mod layers;
pub mod world;


pub use layers::LayerMask;
pub use world::{Collider, ColliderWorld};

/// Результат overlap запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapHit {
    /// Владелец коллайдера (None для статической геометрии)
    pub entity: Option<Entity>,
    /// Центр найденного коллайдера
    pub position: Vec2,
}

/// Результат raycast запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Option<Entity>,
    pub point: Vec2,
    /// Дистанция от origin до точки попадания
    pub distance: f32,
    /// distance / max_distance (0..=1)
    pub fraction: f32,
}

pub trait SpatialQuery: Send + Sync {
    fn overlap_area(&self, center: Vec2, size: Vec2, mask: LayerMask) -> Option<OverlapHit>;

    fn overlap_all(&self, center: Vec2, size: Vec2, mask: LayerMask) -> Vec<OverlapHit>;

    /// `direction` нормализуется внутри; нулевое направление → None
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;
}
