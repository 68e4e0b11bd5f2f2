//! Actor components (composition root данные)

use bevy::prelude::*;
use std::sync::Arc;

use crate::archetypes::Archetype;
use crate::config::ArchetypeTuning;
use crate::spatial::LayerMask;

/// Актор: archetype (таблица состояний) + неизменяемый tuning
#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub archetype: Archetype,
    pub tuning: Arc<ArchetypeTuning>,
}

/// Маркер игрока
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Combat коллайдер актора (синхронизируется в ColliderWorld каждый physics tick)
#[derive(Component, Debug, Clone, Copy)]
pub struct Hurtbox {
    pub size: Vec2,
    pub layers: LayerMask,
}

/// Сырые команды ввода игрока. Пишет host (input polling вне симуляции).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// -1 / 0 / +1
    pub x: i32,
    pub y: i32,
    pub attack: bool,
    pub block: bool,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(x: i32) -> Self {
        Self {
            x: x.signum(),
            ..Self::default()
        }
    }

    pub fn attacking() -> Self {
        Self {
            attack: true,
            ..Self::default()
        }
    }

    pub fn blocking() -> Self {
        Self {
            block: true,
            ..Self::default()
        }
    }
}

/// Предыдущий набор overlap'ов hitbox'а (для diff → Entered/Exited)
#[derive(Component, Debug, Clone, Default)]
pub struct HitboxFeed {
    pub(crate) previous: std::collections::BTreeSet<Entity>,
}
