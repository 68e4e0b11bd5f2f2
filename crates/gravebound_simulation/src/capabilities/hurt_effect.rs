//! HurtEffect capability: короткий визуальный cue при получении урона
//!
//! Вместо корутины — таймер (start + duration), продвигается logic phase.
//! Повторный trigger во время проигрывания перезапускает cue с нуля
//! (один активный cue на компонент).

use serde::{Deserialize, Serialize};
use super::CoreComponent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HurtCue {
    /// Тонировка спрайта, линейно уходит в белый
    Color { tint: [f32; 4] },
    /// Мигание видимостью с заданным интервалом
    Flash { interval: f32 },
}

#[derive(Debug, Clone)]
pub struct HurtEffect {
    pub cue: HurtCue,
    pub duration: f32,
    started_at: Option<f32>,
    triggers: u32,
}

impl HurtEffect {
    pub fn color(tint: [f32; 4], duration: f32) -> Self {
        Self::new(HurtCue::Color { tint }, duration)
    }

    pub fn flash(interval: f32, duration: f32) -> Self {
        Self::new(HurtCue::Flash { interval }, duration)
    }

    pub fn new(cue: HurtCue, duration: f32) -> Self {
        Self {
            cue,
            duration: duration.max(0.0),
            started_at: None,
            triggers: 0,
        }
    }

    /// Запуск / перезапуск cue
    pub fn trigger(&mut self, now: f32) {
        self.started_at = Some(now);
        self.triggers += 1;
    }

    pub fn triggers(&self) -> u32 {
        self.triggers
    }

    pub fn started_at(&self) -> Option<f32> {
        self.started_at
    }

    pub fn is_playing(&self, now: f32) -> bool {
        self.progress(now).is_some()
    }

    /// 0.0..1.0 пока cue играет
    pub fn progress(&self, now: f32) -> Option<f32> {
        let start = self.started_at?;
        let elapsed = now - start;
        if elapsed < 0.0 || elapsed >= self.duration {
            return None;
        }
        Some(elapsed / self.duration)
    }

    /// Текущая тонировка (Color cue); None = без тонировки
    pub fn tint(&self, now: f32) -> Option<[f32; 4]> {
        let HurtCue::Color { tint } = self.cue else {
            return None;
        };
        let t = self.progress(now)?;
        let mut color = [1.0; 4];
        for (channel, value) in color.iter_mut().zip(tint) {
            *channel = value + (1.0 - value) * t;
        }
        Some(color)
    }

    /// Видимость спрайта (Flash cue): первый интервал скрыт
    pub fn visible(&self, now: f32) -> bool {
        let HurtCue::Flash { interval } = self.cue else {
            return true;
        };
        let (Some(start), true) = (self.started_at, self.is_playing(now)) else {
            return true;
        };
        if interval <= 0.0 {
            return true;
        }
        ((now - start) / interval) as u32 % 2 == 1
    }
}

impl CoreComponent for HurtEffect {
    fn name(&self) -> &'static str {
        "HurtEffect"
    }

    fn logic_update(&mut self, now: f32) {
        if self.started_at.is_some() && !self.is_playing(now) {
            self.started_at = None;
        }
    }

    fn on_damage_taken(&mut self, _amount: f32, now: f32) {
        self.trigger(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_cue_fades() {
        let mut effect = HurtEffect::color([1.0, 0.0, 0.0, 1.0], 1.0);
        assert_eq!(effect.tint(0.0), None);

        effect.trigger(0.0);
        let start = effect.tint(0.0).expect("playing");
        assert_relative_eq!(start[1], 0.0);

        let half = effect.tint(0.5).expect("playing");
        assert_relative_eq!(half[1], 0.5, epsilon = 1e-5);

        assert_eq!(effect.tint(1.0), None);
    }

    #[test]
    fn test_retrigger_restarts() {
        let mut effect = HurtEffect::flash(0.1, 0.5);
        effect.trigger(0.0);
        effect.trigger(0.4);

        assert_eq!(effect.triggers(), 2);
        assert_eq!(effect.started_at(), Some(0.4));
        // Первый запуск закончился бы в 0.5, перезапущенный играет до 0.9
        assert!(effect.is_playing(0.7));
        assert!(!effect.is_playing(0.95));
    }

    #[test]
    fn test_flash_visibility_toggles() {
        let mut effect = HurtEffect::flash(0.1, 1.0);
        assert!(effect.visible(0.0));

        effect.trigger(0.0);
        assert!(!effect.visible(0.05));
        assert!(effect.visible(0.15));
        assert!(!effect.visible(0.25));
        assert!(effect.visible(2.0));
    }

    #[test]
    fn test_damage_notification_triggers_cue() {
        let mut effect = HurtEffect::color([1.0, 0.2, 0.2, 1.0], 0.3);
        effect.on_damage_taken(12.0, 4.0);
        assert!(effect.is_playing(4.1));

        effect.logic_update(4.5);
        assert_eq!(effect.started_at(), None);
    }
}
