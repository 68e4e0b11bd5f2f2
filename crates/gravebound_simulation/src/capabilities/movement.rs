//! Movement capability: velocity + facing
//!
//! Все set_* вызовы игнорируются пока `can_set_velocity == false`
//! (knockback lockout). Knockback сам пишет velocity через `force_velocity`.

use bevy::prelude::*;
use super::CoreComponent;

#[derive(Debug, Clone)]
pub struct Movement {
    current_velocity: Vec2,
    facing_direction: i32,
    can_set_velocity: bool,
    /// Когда снять lockout (None = lockout бессрочный или не активен)
    lockout_until: Option<f32>,
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Movement {
    pub fn new(facing_direction: i32) -> Self {
        Self {
            current_velocity: Vec2::ZERO,
            facing_direction: if facing_direction < 0 { -1 } else { 1 },
            can_set_velocity: true,
            lockout_until: None,
        }
    }

    pub fn current_velocity(&self) -> Vec2 {
        self.current_velocity
    }

    /// +1 вправо, -1 влево
    pub fn facing_direction(&self) -> i32 {
        self.facing_direction
    }

    pub fn can_set_velocity(&self) -> bool {
        self.can_set_velocity
    }

    pub fn set_velocity_zero(&mut self) {
        self.apply(Vec2::ZERO);
    }

    /// velocity = normalize(angle) * speed, X зеркалится по знаку `direction`
    pub fn set_velocity(&mut self, speed: f32, angle: Vec2, direction: i32) {
        let angle = angle.normalize_or_zero();
        self.apply(Vec2::new(angle.x * speed * direction.signum() as f32, angle.y * speed));
    }

    pub fn set_velocity_x(&mut self, x: f32) {
        let y = self.current_velocity.y;
        self.apply(Vec2::new(x, y));
    }

    pub fn set_velocity_y(&mut self, y: f32) {
        let x = self.current_velocity.x;
        self.apply(Vec2::new(x, y));
    }

    /// Запись в обход lockout (knockback, death)
    pub fn force_velocity(&mut self, velocity: Vec2) {
        self.current_velocity = velocity;
    }

    /// Блокирует внешние set_* вызовы до `until`
    pub fn lock_velocity(&mut self, until: f32) {
        self.can_set_velocity = false;
        self.lockout_until = Some(match self.lockout_until {
            Some(current) => current.max(until),
            None => until,
        });
    }

    /// Бессрочный lockout (мёртвые не двигаются)
    pub fn lock_velocity_forever(&mut self) {
        self.can_set_velocity = false;
        self.lockout_until = None;
    }

    pub fn release_velocity(&mut self) {
        self.can_set_velocity = true;
        self.lockout_until = None;
    }

    /// Разворачивает если ввод направлен против facing
    pub fn check_if_should_flip(&mut self, x_input: i32) {
        if x_input != 0 && x_input.signum() != self.facing_direction {
            self.flip();
        }
    }

    pub fn flip(&mut self) {
        self.facing_direction *= -1;
    }

    pub fn set_facing(&mut self, direction: i32) {
        if direction != 0 {
            self.facing_direction = direction.signum();
        }
    }

    fn apply(&mut self, velocity: Vec2) {
        if self.can_set_velocity {
            self.current_velocity = velocity;
        }
    }
}

impl CoreComponent for Movement {
    fn name(&self) -> &'static str {
        "Movement"
    }

    fn logic_update(&mut self, now: f32) {
        if let Some(until) = self.lockout_until {
            if now >= until {
                self.release_velocity();
            }
        }
    }
}
