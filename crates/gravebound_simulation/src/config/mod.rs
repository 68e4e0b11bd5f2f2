//! Archetype tuning — неизменяемые числовые параметры акторов
//!
//! - Встроенные defaults: `ArchetypeTuning::player()/grunt()/archer()/charger()`
//! - Data-driven override: `ArchetypeTuning::from_ron(&str)`
//! - В `Actor` хранится как `Arc<ArchetypeTuning>`, симуляция его не меняет

use thiserror::Error;

pub mod tuning;

pub use tuning::{
    ArchetypeTuning, BlockTuning, ClipTiming, CombatTuning, DetectionTuning, HurtEffectTuning, KnockbackTuning,
    MovementTuning, ProjectileTuning, SensesTuning, TimingTuning,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to parse archetype tuning: {0}")]
    Parse(String),
    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),
}
