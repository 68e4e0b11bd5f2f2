//! Block capability: угловое окно блока + parry window
//!
//! Угол атакующего считается в локальной системе актора:
//! 0° = прямо по facing, +90° = сверху, ±180° = сзади.
//!
//! Политика окна:
//! - `max_angle > min_angle` → угол ∈ [min, max]
//! - иначе (wrap-around, например задний конус через ±180°) →
//!   угол ∈ [min, 180] ∪ [-180, max]

use super::CoreComponent;

#[derive(Debug, Clone)]
pub struct Block {
    pub min_angle: f32,
    pub max_angle: f32,
    /// Сколько секунд после начала блока он считается parry
    pub parry_window: f32,
    is_blocking: bool,
    started_at: Option<f32>,
    blocks_performed: u32,
    last_blocked_at: Option<f32>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new(-45.0, 45.0)
    }
}

impl Block {
    pub fn new(min_angle: f32, max_angle: f32) -> Self {
        Self {
            min_angle,
            max_angle,
            parry_window: 0.0,
            is_blocking: false,
            started_at: None,
            blocks_performed: 0,
            last_blocked_at: None,
        }
    }

    pub fn with_parry_window(mut self, parry_window: f32) -> Self {
        self.parry_window = parry_window.max(0.0);
        self
    }

    pub fn start(&mut self, now: f32) {
        if !self.is_blocking {
            self.is_blocking = true;
            self.started_at = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.is_blocking = false;
        self.started_at = None;
    }

    pub fn is_blocking(&self) -> bool {
        self.is_blocking
    }

    pub fn in_parry_window(&self, now: f32) -> bool {
        self.is_blocking
            && self
                .started_at
                .is_some_and(|start| now - start < self.parry_window)
    }

    pub fn covers_angle(&self, angle: f32) -> bool {
        if self.max_angle > self.min_angle {
            angle >= self.min_angle && angle <= self.max_angle
        } else {
            // ±180 попадает в обе половины — оставлено как есть
            (angle >= self.min_angle && angle <= 180.0) || (angle >= -180.0 && angle <= self.max_angle)
        }
    }

    /// Уведомление защитнику: "этот актор заблокировал"
    pub fn on_blocked(&mut self, now: f32) {
        self.blocks_performed += 1;
        self.last_blocked_at = Some(now);
    }

    pub fn blocks_performed(&self) -> u32 {
        self.blocks_performed
    }

    pub fn last_blocked_at(&self) -> Option<f32> {
        self.last_blocked_at
    }
}

impl CoreComponent for Block {
    fn name(&self) -> &'static str {
        "Block"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_window() {
        let block = Block::new(-45.0, 45.0);
        assert!(block.covers_angle(0.0));
        assert!(block.covers_angle(45.0));
        assert!(block.covers_angle(-45.0));
        assert!(!block.covers_angle(46.0));
        assert!(!block.covers_angle(180.0));
    }

    #[test]
    fn test_wrap_around_rear_window() {
        // Задний конус: [135, 180] ∪ [-180, -135]
        let block = Block::new(135.0, -135.0);
        assert!(block.covers_angle(180.0));
        assert!(block.covers_angle(-180.0));
        assert!(block.covers_angle(150.0));
        assert!(block.covers_angle(-150.0));
        assert!(!block.covers_angle(0.0));
        assert!(!block.covers_angle(90.0));
    }

    #[test]
    fn test_parry_window() {
        let mut block = Block::new(-45.0, 45.0).with_parry_window(0.2);
        assert!(!block.in_parry_window(0.0));

        block.start(1.0);
        assert!(block.in_parry_window(1.1));
        assert!(!block.in_parry_window(1.3));

        // Повторный start не сдвигает начало блока
        block.start(1.15);
        assert!(!block.in_parry_window(1.25));

        block.stop();
        assert!(!block.is_blocking());
        assert!(!block.in_parry_window(1.0));
    }
}
