//! Archetypes: конкретные наборы состояний
//!
//! Организация:
//! - common: Hurt / Stun / Death, melee swing, patrol, DoChecks
//! - player: input-driven (Idle, Move, Block, MeleeAttack)
//! - grunt: patrol → chase → melee → cooldown
//! - archer: patrol → ranged attack (неблокируемые снаряды)
//! - charger: patrol → charge (контактный урон) → stun об стену
//!
//! Каждая таблица — статическая, StateMachine держит `&'static StateTable`.

use serde::{Deserialize, Serialize};

use crate::config::{ArchetypeTuning, ConfigError};
use crate::fsm::StateTable;

pub mod archer;
pub mod charger;
pub mod common;
pub mod grunt;
pub mod player;

#[cfg(test)]
mod test_support;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Player,
    Grunt,
    Archer,
    Charger,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [Archetype::Player, Archetype::Grunt, Archetype::Archer, Archetype::Charger];

    pub fn table(self) -> &'static StateTable {
        match self {
            Archetype::Player => &*player::TABLE,
            Archetype::Grunt => &*grunt::TABLE,
            Archetype::Archer => &*archer::TABLE,
            Archetype::Charger => &*charger::TABLE,
        }
    }

    pub fn default_tuning(self) -> ArchetypeTuning {
        match self {
            Archetype::Player => ArchetypeTuning::player(),
            Archetype::Grunt => ArchetypeTuning::grunt(),
            Archetype::Archer => ArchetypeTuning::archer(),
            Archetype::Charger => ArchetypeTuning::charger(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Player => "player",
            Archetype::Grunt => "grunt",
            Archetype::Archer => "archer",
            Archetype::Charger => "charger",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|archetype| archetype.name() == name)
            .ok_or_else(|| ConfigError::UnknownArchetype(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::StateId;

    #[test]
    fn test_tables_have_interrupt_targets() {
        for archetype in Archetype::ALL {
            let table = archetype.table();
            assert_eq!(table.initial, StateId::Idle, "{:?}", archetype);
            assert_eq!(table.hurt, Some(StateId::Hurt), "{:?}", archetype);
            assert_eq!(table.death, Some(StateId::Death), "{:?}", archetype);
            assert!(table.contains(StateId::Idle));
        }

        assert_eq!(Archetype::Archer.table().stun, None);
        assert_eq!(Archetype::Charger.table().stun, Some(StateId::Stun));
    }

    #[test]
    fn test_table_animation_flags_exist_in_clips() {
        for archetype in Archetype::ALL {
            let tuning = archetype.default_tuning();
            for id in archetype.table().state_ids() {
                let handlers = archetype.table().handlers(id).unwrap();
                assert!(
                    tuning.clip(handlers.animation).is_some(),
                    "{:?}: clip '{}' missing",
                    archetype,
                    handlers.animation
                );
            }
        }
    }

    #[test]
    fn test_name_round_trip() {
        for archetype in Archetype::ALL {
            assert_eq!(Archetype::from_name(archetype.name()), Ok(archetype));
            assert_eq!(archetype.default_tuning().name, archetype.name());
        }
        assert!(Archetype::from_name("lich").is_err());
    }
}
