//! Test rig: один актор archetype'а без ECS App

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::Archetype;
use crate::actor::{build_core, AnimatorFlags, PlayerInput};
use crate::capabilities::{Core, Movement};
use crate::config::ArchetypeTuning;
use crate::fsm::{ActorCommand, StateContext, StateId, StateMachine, StateMemory};
use crate::spatial::{ColliderWorld, LayerMask};

pub const ACTOR: u32 = 1;

pub struct Rig {
    pub entity: Entity,
    pub machine: StateMachine,
    pub core: Core,
    pub memory: StateMemory,
    pub tuning: ArchetypeTuning,
    pub animator: AnimatorFlags,
    pub world: ColliderWorld,
    pub commands: Vec<ActorCommand>,
    pub rng: ChaCha8Rng,
    pub input: PlayerInput,
    pub position: Vec2,
}

impl Rig {
    /// Актор в (0, 0) на полу шириной 40
    pub fn new(archetype: Archetype) -> Self {
        let tuning = archetype.default_tuning();
        let mut world = ColliderWorld::new();
        world.add_static(Vec2::new(0.0, -1.0), Vec2::new(40.0, 1.0), LayerMask::GROUND);

        Self {
            entity: Entity::from_raw(ACTOR),
            machine: StateMachine::new(archetype.table()),
            core: build_core(&tuning),
            memory: StateMemory::default(),
            tuning,
            animator: AnimatorFlags::default(),
            world,
            commands: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(7),
            input: PlayerInput::default(),
            position: Vec2::ZERO,
        }
    }

    fn split(&mut self, now: f32) -> (&mut StateMachine, StateContext<'_>) {
        let ctx = StateContext {
            entity: self.entity,
            core: &mut self.core,
            memory: &mut self.memory,
            tuning: &self.tuning,
            animator: &mut self.animator,
            spatial: &self.world,
            position: self.position,
            input: self.input,
            now,
            delta: 1.0 / 60.0,
            commands: &mut self.commands,
            rng: &mut self.rng,
        };
        (&mut self.machine, ctx)
    }

    pub fn init(&mut self, now: f32) -> StateId {
        let (machine, mut ctx) = self.split(now);
        machine.initialize(&mut ctx).expect("initialize")
    }

    /// Logic phase: capability bookkeeping + LogicUpdate
    pub fn logic(&mut self, now: f32) -> Option<StateId> {
        self.core.logic_update(now);
        let (machine, mut ctx) = self.split(now);
        machine.logic_update(&mut ctx).expect("logic update")
    }

    pub fn physics(&mut self, now: f32) {
        let (machine, mut ctx) = self.split(now);
        machine.physics_update(&mut ctx).expect("physics update");
    }

    pub fn trigger(&mut self, now: f32) {
        let (machine, mut ctx) = self.split(now);
        machine.animation_trigger(&mut ctx).expect("trigger");
    }

    pub fn action_trigger(&mut self, now: f32) {
        let (machine, mut ctx) = self.split(now);
        machine.animation_action_trigger(&mut ctx).expect("action trigger");
    }

    pub fn finish_animation(&mut self, now: f32) {
        let (machine, mut ctx) = self.split(now);
        machine.animation_finished(&mut ctx).expect("finished");
    }

    pub fn change(&mut self, next: StateId, now: f32) {
        let (machine, mut ctx) = self.split(now);
        machine.change_state(next, &mut ctx).expect("change state");
    }

    pub fn damage_interrupt(&mut self, now: f32) -> bool {
        let (machine, mut ctx) = self.split(now);
        machine.handle_damage(&mut ctx).expect("damage interrupt")
    }

    pub fn health_zero_interrupt(&mut self, now: f32) -> bool {
        let (machine, mut ctx) = self.split(now);
        machine.handle_health_zero(&mut ctx).expect("health zero interrupt")
    }

    pub fn parried_interrupt(&mut self, now: f32) -> bool {
        let (machine, mut ctx) = self.split(now);
        machine.handle_parried(&mut ctx).expect("parried interrupt")
    }

    pub fn state(&self) -> StateId {
        self.machine.current().expect("initialized")
    }

    pub fn velocity(&self) -> Vec2 {
        self.core.get::<Movement>().expect("movement").current_velocity()
    }

    pub fn facing(&self) -> i32 {
        self.core.get::<Movement>().expect("movement").facing_direction()
    }

    /// Коллайдер противника (для детекции и hitbox'а)
    pub fn place(&mut self, id: u32, position: Vec2, layers: LayerMask) -> Entity {
        let entity = Entity::from_raw(id);
        self.world.set_dynamic(entity, position, Vec2::new(0.8, 1.0), layers);
        entity
    }

    /// Стена (GROUND слой) с центром в x
    pub fn wall_at(&mut self, x: f32) {
        self.world.add_static(Vec2::new(x, 0.5), Vec2::new(1.0, 3.0), LayerMask::GROUND);
    }

    pub fn take_commands(&mut self) -> Vec<ActorCommand> {
        std::mem::take(&mut self.commands)
    }
}
