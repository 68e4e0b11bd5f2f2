//! Tests for StateMachine lifecycle.

use super::*;
use crate::actor::{AnimatorFlags, PlayerInput};
use crate::capabilities::{Core, Movement};
use crate::config::ArchetypeTuning;
use crate::spatial::ColliderWorld;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;

thread_local! {
    static TRACE: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn record(event: &str) {
    TRACE.with(|trace| trace.borrow_mut().push(event.to_string()));
}

fn take_trace() -> Vec<String> {
    TRACE.with(|trace| std::mem::take(&mut *trace.borrow_mut()))
}

fn idle_enter(_: &mut StateContext<'_>) {
    record("enter idle");
}

fn idle_exit(_: &mut StateContext<'_>) {
    record("exit idle");
}

fn idle_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    ctx.input.attack.then_some(StateId::MeleeAttack)
}

fn attack_enter(_: &mut StateContext<'_>) {
    record("enter attack");
}

fn attack_exit(_: &mut StateContext<'_>) {
    record("exit attack");
}

fn attack_logic(ctx: &mut StateContext<'_>) -> Option<StateId> {
    ctx.memory.is_animation_finished.then_some(StateId::Idle)
}

fn attack_trigger(_: &mut StateContext<'_>) {
    record("attack trigger");
}

fn attack_checks(_: &mut StateContext<'_>) {
    record("checks attack");
}

fn attack_physics(_: &mut StateContext<'_>) {
    record("physics attack");
}

fn hurt_enter(_: &mut StateContext<'_>) {
    record("enter hurt");
}

fn death_enter(_: &mut StateContext<'_>) {
    record("enter death");
}

fn stun_enter(_: &mut StateContext<'_>) {
    record("enter stun");
}

static TABLE: Lazy<StateTable> = Lazy::new(|| {
    StateTable::new("test", StateId::Idle)
        .state(
            StateId::Idle,
            StateHandlers::new("idle")
                .on_enter(idle_enter)
                .on_exit(idle_exit)
                .logic(idle_logic),
        )
        .state(
            StateId::MeleeAttack,
            StateHandlers::new("attack")
                .on_enter(attack_enter)
                .on_exit(attack_exit)
                .checks(attack_checks)
                .logic(attack_logic)
                .physics(attack_physics)
                .on_trigger(attack_trigger),
        )
        .hurt(StateId::Hurt, StateHandlers::new("hurt").on_enter(hurt_enter))
        .death(StateId::Death, StateHandlers::new("death").on_enter(death_enter))
        .stun(StateId::Stun, StateHandlers::new("stun").on_enter(stun_enter))
});

/// Таблица без interrupt целей
static BARE: Lazy<StateTable> =
    Lazy::new(|| StateTable::new("bare", StateId::Idle).state(StateId::Idle, StateHandlers::new("idle")));

struct Fixture {
    core: Core,
    memory: StateMemory,
    tuning: ArchetypeTuning,
    animator: AnimatorFlags,
    world: ColliderWorld,
    commands: Vec<ActorCommand>,
    rng: ChaCha8Rng,
    input: PlayerInput,
}

impl Fixture {
    fn new() -> Self {
        take_trace();
        Self {
            core: Core::new().with(Movement::new(1)),
            memory: StateMemory::default(),
            tuning: ArchetypeTuning::grunt(),
            animator: AnimatorFlags::default(),
            world: ColliderWorld::new(),
            commands: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(1),
            input: PlayerInput::default(),
        }
    }

    fn ctx(&mut self, now: f32) -> StateContext<'_> {
        StateContext {
            entity: Entity::from_raw(7),
            core: &mut self.core,
            memory: &mut self.memory,
            tuning: &self.tuning,
            animator: &mut self.animator,
            spatial: &self.world,
            position: Vec2::ZERO,
            input: self.input,
            now,
            delta: 1.0 / 60.0,
            commands: &mut self.commands,
            rng: &mut self.rng,
        }
    }
}

fn initialized(fx: &mut Fixture, table: &'static StateTable) -> StateMachine {
    let mut machine = StateMachine::new(table);
    machine.initialize(&mut fx.ctx(0.0)).expect("initialize");
    take_trace();
    machine
}

#[test]
fn test_initialize_enters_initial_state() {
    let mut fx = Fixture::new();
    let mut machine = StateMachine::new(&TABLE);

    let state = machine.initialize(&mut fx.ctx(0.5)).unwrap();

    assert_eq!(state, StateId::Idle);
    assert_eq!(machine.current(), Ok(StateId::Idle));
    assert!(machine.is_subscribed());
    assert_eq!(fx.memory.start_time, 0.5);
    assert!(fx.animator.get("idle"));
    assert_eq!(take_trace(), vec!["enter idle"]);
}

#[test]
fn test_initialize_twice_is_noop() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);

    assert_eq!(machine.initialize(&mut fx.ctx(1.0)), Ok(StateId::Idle));
    assert!(take_trace().is_empty());
    assert_eq!(machine.transitions(), 0);
}

#[test]
fn test_current_before_initialize_fails() {
    let mut fx = Fixture::new();
    let mut machine = StateMachine::new(&TABLE);

    assert_eq!(machine.current(), Err(FsmError::NotInitialized));
    assert_eq!(
        machine.change_state(StateId::Idle, &mut fx.ctx(0.0)),
        Err(FsmError::NotInitialized)
    );
    assert_eq!(machine.logic_update(&mut fx.ctx(0.0)), Err(FsmError::NotInitialized));
}

#[test]
fn test_change_state_exit_then_enter() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);

    machine.change_state(StateId::MeleeAttack, &mut fx.ctx(1.0)).unwrap();

    assert_eq!(machine.current(), Ok(StateId::MeleeAttack));
    assert_eq!(machine.previous(), Some(StateId::Idle));
    assert_eq!(machine.transitions(), 1);
    // DoChecks нового состояния до его Enter
    assert_eq!(take_trace(), vec!["exit idle", "checks attack", "enter attack"]);
    assert!(!fx.animator.get("idle"));
    assert!(fx.animator.get("attack"));
    assert_eq!(fx.memory.start_time, 1.0);
    assert!(!fx.memory.is_exiting_state);
}

#[test]
fn test_change_to_same_state_full_cycle() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);
    fx.memory.is_animation_finished = true;

    machine.change_state(StateId::Idle, &mut fx.ctx(2.0)).unwrap();

    assert_eq!(take_trace(), vec!["exit idle", "enter idle"]);
    assert_eq!(machine.transitions(), 1);
    assert_eq!(fx.memory.start_time, 2.0);
    assert!(!fx.memory.is_animation_finished);
    assert!(fx.animator.get("idle"));
}

#[test]
fn test_unknown_state_rejected() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);

    let err = machine.change_state(StateId::Charge, &mut fx.ctx(1.0)).unwrap_err();

    assert_eq!(err, FsmError::UnknownState(StateId::Charge));
    assert_eq!(machine.current(), Ok(StateId::Idle));
    assert!(take_trace().is_empty());
}

#[test]
fn test_change_state_rejected_while_exiting() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);
    fx.memory.is_exiting_state = true;

    assert_eq!(
        machine.change_state(StateId::MeleeAttack, &mut fx.ctx(1.0)),
        Err(FsmError::TransitionWhileExiting(StateId::MeleeAttack))
    );
    assert_eq!(machine.current(), Ok(StateId::Idle));

    // Запоздавший LogicUpdate после Exit — молча пропускается
    fx.input = PlayerInput::attacking();
    assert_eq!(machine.logic_update(&mut fx.ctx(1.0)), Ok(None));
}

#[test]
fn test_logic_update_follows_state_decision() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);

    assert_eq!(machine.logic_update(&mut fx.ctx(0.1)), Ok(None));

    fx.input = PlayerInput::attacking();
    assert_eq!(machine.logic_update(&mut fx.ctx(0.2)), Ok(Some(StateId::MeleeAttack)));
    assert!(machine.is_in(StateId::MeleeAttack));

    machine.animation_finished(&mut fx.ctx(0.5)).unwrap();
    assert!(fx.memory.is_animation_finished);
    assert_eq!(machine.logic_update(&mut fx.ctx(0.5)), Ok(Some(StateId::Idle)));
    assert!(machine.is_in(StateId::Idle));
}

#[test]
fn test_physics_update_runs_checks_then_physics() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);
    machine.change_state(StateId::MeleeAttack, &mut fx.ctx(0.0)).unwrap();
    take_trace();

    machine.physics_update(&mut fx.ctx(0.1)).unwrap();
    machine.animation_trigger(&mut fx.ctx(0.1)).unwrap();

    assert_eq!(take_trace(), vec!["checks attack", "physics attack", "attack trigger"]);
}

#[test]
fn test_damage_interrupt_enters_hurt_once() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);

    assert_eq!(machine.handle_damage(&mut fx.ctx(1.0)), Ok(true));
    assert!(machine.is_in(StateId::Hurt));
    assert_eq!(take_trace(), vec!["exit idle", "enter hurt"]);

    // Уже в Hurt: второй удар не перезапускает
    assert_eq!(machine.handle_damage(&mut fx.ctx(1.1)), Ok(false));
    assert_eq!(machine.transitions(), 1);
}

#[test]
fn test_health_zero_enters_death_and_blocks_further_interrupts() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);

    assert_eq!(machine.handle_health_zero(&mut fx.ctx(1.0)), Ok(true));
    assert!(machine.is_in(StateId::Death));

    assert_eq!(machine.handle_damage(&mut fx.ctx(1.1)), Ok(false));
    assert_eq!(machine.handle_health_zero(&mut fx.ctx(1.1)), Ok(false));
    assert_eq!(machine.handle_parried(&mut fx.ctx(1.1)), Ok(false));
    assert!(machine.is_in(StateId::Death));
}

#[test]
fn test_parried_interrupt_enters_stun() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &TABLE);
    machine.change_state(StateId::MeleeAttack, &mut fx.ctx(0.0)).unwrap();
    take_trace();

    assert_eq!(machine.handle_parried(&mut fx.ctx(0.3)), Ok(true));
    assert!(machine.is_in(StateId::Stun));
    assert_eq!(take_trace(), vec!["exit attack", "enter stun"]);
}

#[test]
fn test_interrupts_ignored_without_targets() {
    let mut fx = Fixture::new();
    let mut machine = initialized(&mut fx, &BARE);

    assert_eq!(machine.handle_damage(&mut fx.ctx(1.0)), Ok(false));
    assert_eq!(machine.handle_health_zero(&mut fx.ctx(1.0)), Ok(false));
    assert_eq!(machine.handle_parried(&mut fx.ctx(1.0)), Ok(false));
    assert!(machine.is_in(StateId::Idle));
}

#[test]
fn test_interrupt_before_initialize_fails() {
    let mut fx = Fixture::new();
    let mut machine = StateMachine::new(&TABLE);

    // До initialize — ошибка, не переход
    assert_eq!(machine.handle_damage(&mut fx.ctx(0.0)), Err(FsmError::NotInitialized));

    machine.initialize(&mut fx.ctx(0.0)).unwrap();
    assert!(machine.is_subscribed());
}

#[test]
#[cfg(debug_assertions)]
#[should_panic]
fn test_invalid_transition_panics_in_debug() {
    report_invalid_transition(Entity::from_raw(3), FsmError::UnknownState(StateId::Charge));
}
