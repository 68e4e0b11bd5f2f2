//! EntityDetector: area overlap + line-of-sight
//!
//! `entity_in_range` = в области есть entity (entity mask) И луч до неё
//! не задевает obstacle mask. Любое попадание луча, на любой дистанции,
//! считается полной блокировкой.

use bevy::prelude::*;
use super::CoreComponent;
use crate::spatial::{LayerMask, SpatialQuery};

#[derive(Debug, Clone)]
pub struct EntityDetector {
    /// Центр области относительно актора (для facing = +1)
    pub area_offset: Vec2,
    pub area_size: Vec2,
    pub entity_mask: LayerMask,
    pub obstacle_mask: LayerMask,
    entity_to_right: bool,
    target: Option<Entity>,
    target_position: Option<Vec2>,
}

impl Default for EntityDetector {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(8.0, 2.0), LayerMask::PLAYER)
    }
}

impl EntityDetector {
    pub fn new(area_offset: Vec2, area_size: Vec2, entity_mask: LayerMask) -> Self {
        Self {
            area_offset,
            area_size,
            entity_mask,
            obstacle_mask: LayerMask::GROUND | LayerMask::OBSTACLE,
            entity_to_right: false,
            target: None,
            target_position: None,
        }
    }

    pub fn with_obstacles(mut self, obstacle_mask: LayerMask) -> Self {
        self.obstacle_mask = obstacle_mask;
        self
    }

    /// Знак горизонтального смещения до последней обнаруженной цели
    pub fn entity_to_right(&self) -> bool {
        self.entity_to_right
    }

    /// Последняя успешно обнаруженная цель
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn target_position(&self) -> Option<Vec2> {
        self.target_position
    }

    /// Дистанция до последней цели (None если цели не было)
    pub fn distance_to_target(&self, position: Vec2) -> Option<f32> {
        self.target_position.map(|target| target.distance(position))
    }

    /// Есть ли видимая entity в области.
    ///
    /// Неуспех (пусто / заслонено) не трогает `entity_to_right`.
    pub fn entity_in_range(&mut self, spatial: &dyn SpatialQuery, position: Vec2, facing: i32) -> bool {
        let center = position + Vec2::new(self.area_offset.x * facing as f32, self.area_offset.y);
        let Some(hit) = spatial.overlap_area(center, self.area_size, self.entity_mask) else {
            return false;
        };

        let to_target = hit.position - position;
        let distance = to_target.length();
        if distance > f32::EPSILON
            && spatial
                .raycast(position, to_target, distance, self.obstacle_mask)
                .is_some()
        {
            return false;
        }

        self.entity_to_right = to_target.x > 0.0;
        self.target = hit.entity;
        self.target_position = Some(hit.position);
        true
    }
}

impl CoreComponent for EntityDetector {
    fn name(&self) -> &'static str {
        "EntityDetector"
    }
}
