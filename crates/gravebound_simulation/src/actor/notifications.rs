//! Notification sink: fire-and-forget события для narrative / UI
//!
//! Симуляция их не ждёт и не повторяет.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum GameNotification {
    /// Актор archetype `kind` погиб
    EntityKilled { entity: Entity, kind: String },
    /// Игрок отбил атаку
    PlayerBlocked { attacker: Entity, parried: bool },
}
