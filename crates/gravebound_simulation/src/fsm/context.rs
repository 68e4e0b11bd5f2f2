//! StateContext — всё, что видит state hook за один вызов
//!
//! Собирается actor системой на время одного вызова. Cross-entity эффекты
//! (удары, снаряды, уведомления, death cleanup) не пишутся в мир напрямую:
//! state кладёт `ActorCommand` в outbox, система применяет после.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::actor::{AnimatorFlags, GameNotification, PlayerInput};
use crate::capabilities::{Core, Movement};
use crate::combat::{DamageData, HitRequest, ProjectileLaunch};
use crate::config::ArchetypeTuning;
use crate::spatial::SpatialQuery;

/// Per-entity память состояний: lifecycle флаги + результаты DoChecks
#[derive(Component, Debug, Clone, Default)]
pub struct StateMemory {
    /// Время входа в текущее состояние
    pub start_time: f32,
    pub is_animation_finished: bool,
    pub is_exiting_state: bool,

    // DoChecks
    pub is_grounded: bool,
    pub is_touching_wall: bool,
    pub is_touching_wall_back: bool,
    /// Пол впереди есть (false = край)
    pub is_ledge_ahead: bool,
    pub is_target_detected: bool,
    pub is_target_in_attack_range: bool,
    pub target: Option<Entity>,
    pub target_position: Option<Vec2>,

    // Idle / Waiting
    pub idle_duration: f32,
    pub flip_after_idle: bool,

    /// Удар текущей атаки уже нанесён
    pub attack_fired: bool,
    /// Когда можно атаковать снова
    pub cooldown_until: f32,
    /// Кого charge уже задел (одна цель = один удар за рывок)
    pub struck: Vec<Entity>,
}

impl StateMemory {
    pub(crate) fn reset_for_enter(&mut self, now: f32) {
        self.start_time = now;
        self.is_animation_finished = false;
        self.is_exiting_state = false;
    }
}

/// Отложенный cross-entity эффект
#[derive(Debug, Clone)]
pub enum ActorCommand {
    Hit(HitRequest),
    LaunchProjectile {
        data: DamageData,
        launch: ProjectileLaunch,
    },
    Notify(GameNotification),
    /// Knockback, применённый актором к самому себе (контакт со стеной)
    KnockedBack {
        direction: i32,
        velocity: Vec2,
    },
    /// Death: пометить Dead и запланировать деспавн
    MarkDead {
        despawn_at: f32,
    },
}

pub struct StateContext<'a> {
    pub entity: Entity,
    pub core: &'a mut Core,
    pub memory: &'a mut StateMemory,
    pub tuning: &'a ArchetypeTuning,
    pub animator: &'a mut AnimatorFlags,
    pub spatial: &'a dyn SpatialQuery,
    pub position: Vec2,
    pub input: PlayerInput,
    pub now: f32,
    pub delta: f32,
    pub commands: &'a mut Vec<ActorCommand>,
    pub rng: &'a mut ChaCha8Rng,
}

impl StateContext<'_> {
    /// Сколько секунд актор в текущем состоянии
    pub fn time_in_state(&self) -> f32 {
        self.now - self.memory.start_time
    }

    pub fn facing(&self) -> i32 {
        self.core.find::<Movement>().map_or(1, |m| m.facing_direction())
    }

    /// Movement для команд. None если state уже выходит:
    /// запоздавший LogicUpdate после Exit не должен двигать актора.
    pub fn movement(&mut self) -> Option<&mut Movement> {
        if self.memory.is_exiting_state {
            return None;
        }
        self.core.find_mut::<Movement>()
    }

    pub fn push(&mut self, command: ActorCommand) {
        self.commands.push(command);
    }
}
