//! DamageReceiver capability: immunity window + флаги приёма урона
//!
//! Immunity истекает строго по времени: `now < immune_until`.
//! Сама логика урона — в `crate::combat::pipeline`.

use super::CoreComponent;

#[derive(Debug, Clone)]
pub struct DamageReceiver {
    pub is_damageable: bool,
    /// Длительность immunity после успешного урона (0 = без immunity)
    pub immunity_time: f32,
    immune_until: Option<f32>,
    last_damage_amount: Option<f32>,
    /// Когда атаку этого актора последний раз заблокировали/спарировали
    last_deflected_at: Option<f32>,
    last_deflect_was_parry: bool,
}

impl Default for DamageReceiver {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl DamageReceiver {
    pub fn new(immunity_time: f32) -> Self {
        Self {
            is_damageable: true,
            immunity_time: immunity_time.max(0.0),
            immune_until: None,
            last_damage_amount: None,
            last_deflected_at: None,
            last_deflect_was_parry: false,
        }
    }

    pub fn is_immune(&self, now: f32) -> bool {
        self.immune_until.is_some_and(|until| now < until)
    }

    pub fn immunity_end_time(&self) -> Option<f32> {
        self.immune_until
    }

    /// Immunity от урона: end = now + immunity_time
    pub fn start_immunity(&mut self, now: f32) {
        self.immune_until = Some(now + self.immunity_time);
    }

    /// Продлевает окно (никогда не укорачивает)
    pub fn extend_immunity(&mut self, now: f32, duration: f32) {
        let until = now + duration.max(0.0);
        self.immune_until = Some(match self.immune_until {
            Some(current) => current.max(until),
            None => until,
        });
    }

    pub fn last_damage_amount(&self) -> Option<f32> {
        self.last_damage_amount
    }

    pub(crate) fn record_damage(&mut self, amount: f32) {
        self.last_damage_amount = Some(amount);
    }

    /// Уведомление атакующему: его удар заблокировали / спарировали
    pub fn on_attack_deflected(&mut self, parried: bool, now: f32) {
        self.last_deflected_at = Some(now);
        self.last_deflect_was_parry = parried;
    }

    pub fn last_deflected_at(&self) -> Option<f32> {
        self.last_deflected_at
    }

    pub fn last_deflect_was_parry(&self) -> bool {
        self.last_deflect_was_parry
    }
}

impl CoreComponent for DamageReceiver {
    fn name(&self) -> &'static str {
        "DamageReceiver"
    }

    fn logic_update(&mut self, now: f32) {
        if self.immune_until.is_some_and(|until| now >= until) {
            self.immune_until = None;
        }
    }
}
