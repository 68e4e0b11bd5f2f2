//! CollisionSenses: ground / wall / ledge queries
//!
//! Stateless: каждый вызов — новый запрос к SpatialQuery, без кэша.
//! Offsets заданы для facing = +1 и зеркалятся по X.

use bevy::prelude::*;
use super::CoreComponent;
use crate::spatial::{LayerMask, SpatialQuery};

#[derive(Debug, Clone)]
pub struct CollisionSenses {
    pub ground_check_offset: Vec2,
    pub ground_check_size: Vec2,
    pub wall_check_offset: Vec2,
    pub wall_check_distance: f32,
    pub ledge_check_offset: Vec2,
    pub ledge_check_distance: f32,
    pub ground_mask: LayerMask,
}

impl Default for CollisionSenses {
    fn default() -> Self {
        Self {
            ground_check_offset: Vec2::new(0.0, -0.5),
            ground_check_size: Vec2::new(0.6, 0.1),
            wall_check_offset: Vec2::ZERO,
            wall_check_distance: 0.6,
            ledge_check_offset: Vec2::new(0.6, -0.4),
            ledge_check_distance: 0.4,
            ground_mask: LayerMask::GROUND,
        }
    }
}

fn mirrored(offset: Vec2, facing: i32) -> Vec2 {
    Vec2::new(offset.x * facing as f32, offset.y)
}

impl CollisionSenses {
    /// Под ногами есть пол (area overlap)
    pub fn ground(&self, spatial: &dyn SpatialQuery, position: Vec2) -> bool {
        spatial
            .overlap_area(position + self.ground_check_offset, self.ground_check_size, self.ground_mask)
            .is_some()
    }

    /// Стена впереди (луч по facing)
    pub fn wall_front(&self, spatial: &dyn SpatialQuery, position: Vec2, facing: i32) -> bool {
        self.wall_ray(spatial, position, facing, facing)
    }

    /// Стена сзади (луч против facing)
    pub fn wall_back(&self, spatial: &dyn SpatialQuery, position: Vec2, facing: i32) -> bool {
        self.wall_ray(spatial, position, facing, -facing)
    }

    /// Пол впереди есть (луч вниз из точки перед актором).
    /// false = край платформы.
    pub fn ledge_vertical(&self, spatial: &dyn SpatialQuery, position: Vec2, facing: i32) -> bool {
        let origin = position + mirrored(self.ledge_check_offset, facing);
        spatial
            .raycast(origin, Vec2::NEG_Y, self.ledge_check_distance, self.ground_mask)
            .is_some()
    }

    fn wall_ray(&self, spatial: &dyn SpatialQuery, position: Vec2, facing: i32, cast: i32) -> bool {
        let origin = position + mirrored(self.wall_check_offset, facing);
        spatial
            .raycast(origin, Vec2::X * cast as f32, self.wall_check_distance, self.ground_mask)
            .is_some()
    }
}

impl CoreComponent for CollisionSenses {
    fn name(&self) -> &'static str {
        "CollisionSenses"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::ColliderWorld;

    /// Платформа x ∈ [-5, 5], верх на y=0; стена x ∈ [3, 4]
    fn arena() -> ColliderWorld {
        let mut world = ColliderWorld::new();
        world.add_static(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0), LayerMask::GROUND);
        world.add_static(Vec2::new(3.5, 1.5), Vec2::new(1.0, 3.0), LayerMask::GROUND);
        world
    }

    #[test]
    fn test_ground_check() {
        let world = arena();
        let senses = CollisionSenses::default();

        assert!(senses.ground(&world, Vec2::new(0.0, 0.5)));
        assert!(!senses.ground(&world, Vec2::new(0.0, 3.0)));
    }

    #[test]
    fn test_wall_front_and_back_follow_facing() {
        let world = arena();
        let senses = CollisionSenses::default();
        let near_wall = Vec2::new(2.6, 0.5);

        assert!(senses.wall_front(&world, near_wall, 1));
        assert!(!senses.wall_back(&world, near_wall, 1));

        assert!(!senses.wall_front(&world, near_wall, -1));
        assert!(senses.wall_back(&world, near_wall, -1));
    }

    #[test]
    fn test_ledge_detection() {
        let world = arena();
        let senses = CollisionSenses::default();

        // Середина платформы: пол впереди есть
        assert!(senses.ledge_vertical(&world, Vec2::new(0.0, 0.5), 1));
        // Левый край, смотрим влево: впереди обрыв
        assert!(!senses.ledge_vertical(&world, Vec2::new(-4.8, 0.5), -1));
        // Тот же край, смотрим вправо: пол есть
        assert!(senses.ledge_vertical(&world, Vec2::new(-4.8, 0.5), 1));
    }
}
