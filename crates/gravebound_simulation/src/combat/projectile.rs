//! Projectile — снаряд ranged атаки
//!
//! Живёт как отдельная entity (без Core): physics phase двигает его,
//! проверяет препятствия raycast'ом по шагу и цели overlap'ом по entity mask.
//! Попадание → `HitRequest` с `origin` = позиция снаряда (block angle
//! считается от снаряда, не от стрелка).

use bevy::prelude::*;
use super::{DamageData, HitRequest};
use crate::spatial::{ColliderWorld, LayerMask, SpatialQuery};

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner: Entity,
    pub data: DamageData,
    pub velocity: Vec2,
    /// Время самоуничтожения (секунды от старта)
    pub expires_at: f32,
    pub target_mask: LayerMask,
    pub obstacle_mask: LayerMask,
    pub size: Vec2,
}

/// Параметры запуска (из ArchetypeTuning стрелка)
#[derive(Debug, Clone, Copy)]
pub struct ProjectileLaunch {
    pub origin: Vec2,
    pub direction: i32,
    pub speed: f32,
    pub lifetime: f32,
    pub size: Vec2,
    pub target_mask: LayerMask,
}

pub fn spawn_projectile(commands: &mut Commands, owner: Entity, data: DamageData, launch: ProjectileLaunch, now: f32) -> Entity {
    let velocity = Vec2::new(launch.speed * launch.direction.signum() as f32, 0.0);

    commands
        .spawn((
            Projectile {
                owner,
                data,
                velocity,
                expires_at: now + launch.lifetime,
                target_mask: launch.target_mask,
                obstacle_mask: LayerMask::GROUND | LayerMask::OBSTACLE,
                size: launch.size,
            },
            Transform::from_translation(launch.origin.extend(0.0)),
        ))
        .id()
}

/// Чем закончился шаг снаряда
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    Flying(Vec2),
    HitTarget { target: Entity, position: Vec2 },
    HitObstacle(Vec2),
    Expired,
}

/// Один шаг снаряда (чистая функция, без ECS)
pub fn step_projectile(projectile: &Projectile, position: Vec2, delta: f32, now: f32, spatial: &dyn SpatialQuery) -> ProjectileStep {
    if now >= projectile.expires_at {
        return ProjectileStep::Expired;
    }

    let travel = projectile.velocity * delta;
    let distance = travel.length();
    if distance > 0.0 {
        if let Some(hit) = spatial.raycast(position, travel, distance, projectile.obstacle_mask) {
            return ProjectileStep::HitObstacle(hit.point);
        }
    }

    let next = position + travel;
    let target = spatial
        .overlap_all(next, projectile.size, projectile.target_mask)
        .into_iter()
        .filter_map(|hit| hit.entity)
        .find(|entity| *entity != projectile.owner);

    match target {
        Some(target) => ProjectileStep::HitTarget {
            target,
            position: next,
        },
        None => ProjectileStep::Flying(next),
    }
}

/// Система: движение снарядов + попадания (FixedUpdate)
pub fn advance_projectiles(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &Projectile, &mut Transform)>,
    mut hit_requests: EventWriter<HitRequest>,
    world: Res<ColliderWorld>,
    time: Res<Time>,
    clock: Res<Time<Virtual>>,
) {
    let delta = time.delta_secs();
    let now = clock.elapsed_secs();

    for (entity, projectile, mut transform) in projectiles.iter_mut() {
        let position = transform.translation.truncate();

        match step_projectile(projectile, position, delta, now, &*world) {
            ProjectileStep::Flying(next) => {
                transform.translation.x = next.x;
                transform.translation.y = next.y;
            }
            ProjectileStep::HitTarget { target, position } => {
                crate::logger::log(&format!(
                    "🏹 Projectile {:?} hit {:?} (owner {:?})",
                    entity, target, projectile.owner
                ));
                hit_requests.write(HitRequest {
                    attacker: projectile.owner,
                    target,
                    damage: Some(projectile.data.clone()),
                    knockback: None,
                    origin: Some(position),
                });
                commands.entity(entity).despawn();
            }
            ProjectileStep::HitObstacle(point) => {
                crate::logger::log(&format!("🧱 Projectile {:?} hit obstacle at {:?}", entity, point));
                commands.entity(entity).despawn();
            }
            ProjectileStep::Expired => {
                commands.entity(entity).despawn();
            }
        }
    }
}
