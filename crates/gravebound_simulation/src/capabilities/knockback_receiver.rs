//! KnockbackReceiver capability: параметры и состояние knockback
//!
//! Активность считается строго по времени: `now < started_at + duration`.

use bevy::prelude::*;
use super::CoreComponent;

#[derive(Debug, Clone)]
pub struct KnockbackReceiver {
    pub is_knockbackable: bool,
    pub magnitude: f32,
    /// Направление для facing = +1 (X зеркалится по direction)
    pub angle: Vec2,
    /// Сколько держим lockout на Movement
    pub duration: f32,
    /// Сколько immunity даёт knockback
    pub immunity_time: f32,
    started_at: Option<f32>,
    applied_count: u32,
}

impl Default for KnockbackReceiver {
    fn default() -> Self {
        Self::new(8.0, Vec2::new(1.0, 1.0), 0.2)
    }
}

impl KnockbackReceiver {
    pub fn new(magnitude: f32, angle: Vec2, duration: f32) -> Self {
        Self {
            is_knockbackable: true,
            magnitude,
            angle,
            duration: duration.max(0.0),
            immunity_time: 0.0,
            started_at: None,
            applied_count: 0,
        }
    }

    pub fn with_immunity(mut self, immunity_time: f32) -> Self {
        self.immunity_time = immunity_time.max(0.0);
        self
    }

    pub fn is_active(&self, now: f32) -> bool {
        self.started_at.is_some_and(|start| now < start + self.duration)
    }

    pub fn started_at(&self) -> Option<f32> {
        self.started_at
    }

    pub fn applied_count(&self) -> u32 {
        self.applied_count
    }

    /// Velocity knockback для направления ±1
    pub fn velocity_for(&self, direction: i32) -> Vec2 {
        let angle = self.angle.normalize_or_zero();
        Vec2::new(angle.x * self.magnitude * direction.signum() as f32, angle.y * self.magnitude)
    }

    pub(crate) fn begin(&mut self, now: f32) {
        self.started_at = Some(now);
        self.applied_count += 1;
    }
}

impl CoreComponent for KnockbackReceiver {
    fn name(&self) -> &'static str {
        "KnockbackReceiver"
    }

    fn logic_update(&mut self, now: f32) {
        if self.started_at.is_some() && !self.is_active(now) {
            self.started_at = None;
        }
    }
}
