//! Capability components + Core registry
//!
//! Организация:
//! - registry: Core (per-entity реестр), CoreComponent trait, CoreError
//! - movement: velocity + facing + knockback lockout
//! - collision_senses / entity_detector: запросы к SpatialQuery
//! - stats / damage_receiver / knockback_receiver / block: приём урона
//! - hitbox: набор целей для melee
//! - hurt_effect: визуальный cue на урон
//!
//! Core собирается один раз при спавне актора (`actor::build_core`),
//! состав больше не меняется.

pub mod block;
pub mod collision_senses;
pub mod damage_receiver;
pub mod entity_detector;
pub mod hitbox;
pub mod hurt_effect;
pub mod knockback_receiver;
pub mod movement;
pub mod registry;
pub mod stats;


pub use block::Block;
pub use collision_senses::CollisionSenses;
pub use damage_receiver::DamageReceiver;
pub use entity_detector::EntityDetector;
pub use hitbox::DamageHitBox;
pub use hurt_effect::{HurtCue, HurtEffect};
pub use knockback_receiver::KnockbackReceiver;
pub use movement::Movement;
pub use registry::{AsAny, Core, CoreComponent, CoreError};
pub use stats::Stats;
