//! Animation collaborator
//!
//! Outbound: `AnimatorFlags::set_flag(name, bool)` из State Enter/Exit.
//! Inbound: `AnimationSignal` (Finished / Trigger / ActionTrigger) → активное состояние.
//!
//! Headless режим: `HeadlessAnimation` + `headless_animation_clock` сами
//! генерируют сигналы по таймингам клипов из ArchetypeTuning.

use bevy::prelude::*;
use std::collections::BTreeMap;

use super::Actor;

/// Флаги аниматора (bool параметры animation tree)
#[derive(Component, Debug, Clone, Default)]
pub struct AnimatorFlags {
    flags: BTreeMap<&'static str, bool>,
    active: Option<&'static str>,
    /// Растёт на каждый set_flag(.., true): повторный вход в тот же клип = новый запуск
    generation: u32,
}

impl AnimatorFlags {
    pub fn set_flag(&mut self, name: &'static str, value: bool) {
        self.flags.insert(name, value);
        if value {
            self.active = Some(name);
            self.generation = self.generation.wrapping_add(1);
        } else if self.active == Some(name) {
            self.active = None;
        }
    }

    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Клип, чей флаг был поднят последним и ещё не снят
    pub fn active(&self) -> Option<&'static str> {
        self.active
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSignalKind {
    /// AnimationFinishTrigger
    Finished,
    /// AnimationTrigger (например, момент удара в замахе)
    Trigger,
    /// AnimationActionTrigger (например, выпуск снаряда)
    ActionTrigger,
}

/// Сигнал от animation collaborator'а
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AnimationSignal {
    pub entity: Entity,
    pub kind: AnimationSignalKind,
}

/// Headless проигрыватель клипов
#[derive(Component, Debug, Clone, Default)]
pub struct HeadlessAnimation {
    generation: u32,
    clip: Option<&'static str>,
    started_at: f32,
    trigger_sent: bool,
    action_sent: bool,
    finish_sent: bool,
}

impl HeadlessAnimation {
    pub fn clip(&self) -> Option<&'static str> {
        self.clip
    }

    fn restart(&mut self, generation: u32, clip: Option<&'static str>, now: f32) {
        self.generation = generation;
        self.clip = clip;
        self.started_at = now;
        self.trigger_sent = false;
        self.action_sent = false;
        self.finish_sent = false;
    }
}

/// Система: headless animation clock (Update, до logic phase)
pub fn headless_animation_clock(
    mut players: Query<(Entity, &Actor, &AnimatorFlags, &mut HeadlessAnimation)>,
    mut signals: EventWriter<AnimationSignal>,
    clock: Res<Time<Virtual>>,
) {
    let now = clock.elapsed_secs();

    for (entity, actor, flags, mut playback) in players.iter_mut() {
        if playback.generation != flags.generation() {
            playback.restart(flags.generation(), flags.active(), now);
        }

        let Some(clip) = playback.clip else {
            continue;
        };
        let Some(timing) = actor.tuning.clip(clip) else {
            continue;
        };
        let elapsed = now - playback.started_at;

        if !playback.trigger_sent && timing.trigger.is_some_and(|at| elapsed >= at) {
            playback.trigger_sent = true;
            signals.write(AnimationSignal {
                entity,
                kind: AnimationSignalKind::Trigger,
            });
        }
        if !playback.action_sent && timing.action_trigger.is_some_and(|at| elapsed >= at) {
            playback.action_sent = true;
            signals.write(AnimationSignal {
                entity,
                kind: AnimationSignalKind::ActionTrigger,
            });
        }
        if !playback.finish_sent && timing.length.is_some_and(|length| elapsed >= length) {
            playback.finish_sent = true;
            signals.write(AnimationSignal {
                entity,
                kind: AnimationSignalKind::Finished,
            });
        }
    }
}
