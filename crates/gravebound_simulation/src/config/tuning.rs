//! ArchetypeTuning record + встроенные archetype defaults
//!
//! Векторы хранятся как `[f32; 2]` (без bevy_math serde feature),
//! в Vec2 переводятся через `vec2()` при сборке Core.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ConfigError;
use crate::capabilities::HurtCue;
use crate::spatial::LayerMask;

pub fn vec2(v: [f32; 2]) -> Vec2 {
    Vec2::new(v[0], v[1])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub move_speed: f32,
    pub chase_speed: f32,
    /// Скорость рывка (charger)
    pub charge_speed: f32,
    pub initial_facing: i32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            chase_speed: 3.0,
            charge_speed: 0.0,
            initial_facing: 1,
        }
    }
}

/// Смещения для facing = +1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensesTuning {
    pub ground_offset: [f32; 2],
    pub ground_size: [f32; 2],
    pub wall_offset: [f32; 2],
    pub wall_distance: f32,
    pub ledge_offset: [f32; 2],
    pub ledge_distance: f32,
}

impl Default for SensesTuning {
    fn default() -> Self {
        Self {
            ground_offset: [0.0, -0.5],
            ground_size: [0.8, 0.1],
            wall_offset: [0.0, 0.0],
            wall_distance: 0.6,
            ledge_offset: [0.6, -0.4],
            ledge_distance: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionTuning {
    pub area_offset: [f32; 2],
    pub area_size: [f32; 2],
    /// Горизонтальная дистанция, с которой начинается атака
    pub attack_range: f32,
}

impl Default for DetectionTuning {
    fn default() -> Self {
        Self {
            area_offset: [3.0, 0.0],
            area_size: [6.0, 2.0],
            attack_range: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub lifetime: f32,
    pub size: [f32; 2],
    /// Точка вылета относительно актора (facing = +1)
    pub spawn_offset: [f32; 2],
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 12.0,
            lifetime: 1.5,
            size: [0.3, 0.1],
            spawn_offset: [0.6, 0.2],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub damage: f32,
    /// CanBlock / CanParry у атак этого актора
    pub blockable: bool,
    pub parryable: bool,
    pub hitbox_offset: [f32; 2],
    pub hitbox_size: [f32; 2],
    /// Melee удар дополнительно отбрасывает цель
    pub knockback_on_hit: bool,
    /// Immunity после полученного урона
    pub immunity_time: f32,
    pub attack_cooldown: f32,
    pub projectile: Option<ProjectileTuning>,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            damage: 10.0,
            blockable: true,
            parryable: true,
            hitbox_offset: [0.8, 0.0],
            hitbox_size: [1.2, 1.0],
            knockback_on_hit: false,
            immunity_time: 0.0,
            attack_cooldown: 1.0,
            projectile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackTuning {
    pub knockbackable: bool,
    pub magnitude: f32,
    pub angle: [f32; 2],
    pub duration: f32,
    pub immunity_time: f32,
}

impl Default for KnockbackTuning {
    fn default() -> Self {
        Self {
            knockbackable: true,
            magnitude: 8.0,
            angle: [1.0, 0.5],
            duration: 0.2,
            immunity_time: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockTuning {
    pub min_angle: f32,
    pub max_angle: f32,
    pub parry_window: f32,
}

impl Default for BlockTuning {
    fn default() -> Self {
        Self {
            min_angle: -45.0,
            max_angle: 45.0,
            parry_window: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    pub idle_time_min: f32,
    pub idle_time_max: f32,
    /// Пауза у стены / края перед разворотом
    pub wait_time: f32,
    /// Замах перед рывком (charger)
    pub charge_windup: f32,
    pub charge_time: f32,
    pub stun_time: f32,
    /// Fallback выхода из Hurt, если animation finished не пришёл
    pub hurt_time: f32,
    pub despawn_delay: f32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            idle_time_min: 1.0,
            idle_time_max: 2.0,
            wait_time: 0.5,
            charge_windup: 0.4,
            charge_time: 1.0,
            stun_time: 1.0,
            hurt_time: 0.4,
            despawn_delay: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HurtEffectTuning {
    pub cue: HurtCue,
    pub duration: f32,
}

/// Тайминги клипа для headless animation clock
///
/// `length: None` = зацикленный клип (Finished не приходит).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipTiming {
    pub length: Option<f32>,
    pub trigger: Option<f32>,
    pub action_trigger: Option<f32>,
}

impl ClipTiming {
    pub fn looping() -> Self {
        Self::default()
    }

    pub fn once(length: f32) -> Self {
        Self {
            length: Some(length),
            ..Self::default()
        }
    }

    pub fn with_trigger(mut self, at: f32) -> Self {
        self.trigger = Some(at);
        self
    }

    pub fn with_action_trigger(mut self, at: f32) -> Self {
        self.action_trigger = Some(at);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeTuning {
    pub name: String,
    pub max_health: f32,
    pub collider_size: [f32; 2],
    /// Слой коллайдера актора
    pub layer: LayerMask,
    /// Кого детектим и бьём
    pub target_mask: LayerMask,
    pub movement: MovementTuning,
    pub senses: SensesTuning,
    pub detection: DetectionTuning,
    pub combat: CombatTuning,
    pub knockback: KnockbackTuning,
    /// None = архетип не умеет блокировать (нет Block capability)
    pub block: Option<BlockTuning>,
    pub timing: TimingTuning,
    pub hurt_effect: Option<HurtEffectTuning>,
    pub animations: BTreeMap<String, ClipTiming>,
}

impl Default for ArchetypeTuning {
    fn default() -> Self {
        Self {
            name: "actor".to_string(),
            max_health: 100.0,
            collider_size: [0.8, 1.0],
            layer: LayerMask::ENEMY,
            target_mask: LayerMask::PLAYER,
            movement: MovementTuning::default(),
            senses: SensesTuning::default(),
            detection: DetectionTuning::default(),
            combat: CombatTuning::default(),
            knockback: KnockbackTuning::default(),
            block: None,
            timing: TimingTuning::default(),
            hurt_effect: None,
            animations: BTreeMap::new(),
        }
    }
}

fn clips(entries: &[(&str, ClipTiming)]) -> BTreeMap<String, ClipTiming> {
    entries
        .iter()
        .map(|(name, timing)| (name.to_string(), *timing))
        .collect()
}

impl ArchetypeTuning {
    /// Парсит RON; отсутствующие поля берутся из Default
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Встроенный archetype по имени
    pub fn builtin(name: &str) -> Result<Self, ConfigError> {
        match name {
            "player" => Ok(Self::player()),
            "grunt" => Ok(Self::grunt()),
            "archer" => Ok(Self::archer()),
            "charger" => Ok(Self::charger()),
            other => Err(ConfigError::UnknownArchetype(other.to_string())),
        }
    }

    pub fn clip(&self, name: &str) -> Option<ClipTiming> {
        self.animations.get(name).copied()
    }

    pub fn player() -> Self {
        Self {
            name: "player".to_string(),
            max_health: 100.0,
            layer: LayerMask::PLAYER,
            target_mask: LayerMask::ENEMY,
            movement: MovementTuning {
                move_speed: 6.0,
                chase_speed: 6.0,
                ..MovementTuning::default()
            },
            combat: CombatTuning {
                damage: 20.0,
                knockback_on_hit: true,
                immunity_time: 0.5,
                attack_cooldown: 0.3,
                ..CombatTuning::default()
            },
            block: Some(BlockTuning {
                min_angle: -60.0,
                max_angle: 60.0,
                parry_window: 0.2,
            }),
            timing: TimingTuning {
                hurt_time: 0.3,
                despawn_delay: 3.0,
                ..TimingTuning::default()
            },
            hurt_effect: Some(HurtEffectTuning {
                cue: HurtCue::Flash { interval: 0.08 },
                duration: 0.5,
            }),
            animations: clips(&[
                ("idle", ClipTiming::looping()),
                ("move", ClipTiming::looping()),
                ("block", ClipTiming::looping()),
                ("attack", ClipTiming::once(0.35).with_trigger(0.15)),
                ("hurt", ClipTiming::once(0.25)),
                ("stun", ClipTiming::once(0.6)),
                ("death", ClipTiming::once(0.8)),
            ]),
            ..Self::default()
        }
    }

    /// Melee пехота: patrol → chase → swing → cooldown
    pub fn grunt() -> Self {
        Self {
            name: "grunt".to_string(),
            max_health: 60.0,
            movement: MovementTuning {
                move_speed: 2.0,
                chase_speed: 3.5,
                ..MovementTuning::default()
            },
            combat: CombatTuning {
                damage: 15.0,
                knockback_on_hit: true,
                immunity_time: 0.3,
                attack_cooldown: 1.0,
                ..CombatTuning::default()
            },
            hurt_effect: Some(HurtEffectTuning {
                cue: HurtCue::Color {
                    tint: [1.0, 0.2, 0.2, 1.0],
                },
                duration: 0.3,
            }),
            animations: clips(&[
                ("idle", ClipTiming::looping()),
                ("move", ClipTiming::looping()),
                ("chase", ClipTiming::looping()),
                ("wait", ClipTiming::looping()),
                ("attack", ClipTiming::once(0.6).with_trigger(0.3)),
                ("cooldown", ClipTiming::looping()),
                ("hurt", ClipTiming::once(0.3)),
                ("stun", ClipTiming::once(0.8)),
                ("death", ClipTiming::once(0.6)),
            ]),
            ..Self::default()
        }
    }

    /// Стрелок: неблокируемые снаряды, сам блокировать не умеет
    pub fn archer() -> Self {
        Self {
            name: "archer".to_string(),
            max_health: 40.0,
            movement: MovementTuning {
                move_speed: 1.5,
                chase_speed: 1.5,
                ..MovementTuning::default()
            },
            detection: DetectionTuning {
                area_offset: [5.0, 0.0],
                area_size: [10.0, 2.0],
                attack_range: 8.0,
            },
            combat: CombatTuning {
                damage: 10.0,
                blockable: false,
                parryable: false,
                attack_cooldown: 1.5,
                projectile: Some(ProjectileTuning::default()),
                ..CombatTuning::default()
            },
            block: None,
            animations: clips(&[
                ("idle", ClipTiming::looping()),
                ("move", ClipTiming::looping()),
                ("wait", ClipTiming::looping()),
                ("ranged_attack", ClipTiming::once(0.7).with_action_trigger(0.4)),
                ("cooldown", ClipTiming::looping()),
                ("hurt", ClipTiming::once(0.3)),
                ("death", ClipTiming::once(0.6)),
            ]),
            ..Self::default()
        }
    }

    /// Рывок: windup → charge (контактный урон + knockback) → stun об стену
    pub fn charger() -> Self {
        Self {
            name: "charger".to_string(),
            max_health: 80.0,
            movement: MovementTuning {
                move_speed: 2.0,
                chase_speed: 2.5,
                charge_speed: 9.0,
                ..MovementTuning::default()
            },
            detection: DetectionTuning {
                area_offset: [4.0, 0.0],
                area_size: [8.0, 2.0],
                attack_range: 6.0,
            },
            combat: CombatTuning {
                damage: 25.0,
                parryable: false,
                knockback_on_hit: true,
                hitbox_offset: [0.6, 0.0],
                hitbox_size: [1.0, 1.0],
                attack_cooldown: 1.5,
                ..CombatTuning::default()
            },
            knockback: KnockbackTuning {
                magnitude: 6.0,
                duration: 0.3,
                ..KnockbackTuning::default()
            },
            timing: TimingTuning {
                charge_windup: 0.4,
                charge_time: 1.2,
                stun_time: 1.0,
                ..TimingTuning::default()
            },
            animations: clips(&[
                ("idle", ClipTiming::looping()),
                ("move", ClipTiming::looping()),
                ("wait", ClipTiming::looping()),
                ("charge", ClipTiming::looping()),
                ("cooldown", ClipTiming::looping()),
                ("hurt", ClipTiming::once(0.3)),
                ("stun", ClipTiming::once(1.0)),
                ("death", ClipTiming::once(0.7)),
            ]),
            ..Self::default()
        }
    }
}
