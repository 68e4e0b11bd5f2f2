//! Stats capability: здоровье актора
//!
//! Инвариант: 0 ≤ current ≤ max

use super::CoreComponent;

#[derive(Debug, Clone)]
pub struct Stats {
    current_health: f32,
    max_health: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Stats {
    pub fn new(max_health: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            current_health: max_health,
            max_health,
        }
    }

    pub fn current_health(&self) -> f32 {
        self.current_health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    /// Уменьшает здоровье (clamp к 0).
    ///
    /// Возвращает true ровно один раз — когда здоровье только что дошло до нуля.
    pub fn decrease_health(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.current_health = (self.current_health - amount.max(0.0)).max(0.0);
        was_alive && !self.is_alive()
    }

    pub fn increase_health(&mut self, amount: f32) {
        self.current_health = (self.current_health + amount.max(0.0)).min(self.max_health);
    }
}

impl CoreComponent for Stats {
    fn name(&self) -> &'static str {
        "Stats"
    }
}
