//! StateId + strategy tables
//!
//! Вместо иерархии State-подклассов: у каждого archetype одна статическая
//! `StateTable` (StateId → набор fn pointers). Общие состояния (Hurt, Death,
//! Stun) — одни и те же функции в нескольких таблицах.

use std::collections::HashMap;

use super::StateContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateId {
    Idle,
    Move,
    Chase,
    Waiting,
    MeleeAttack,
    RangedAttack,
    Cooldown,
    Charge,
    Block,
    Hurt,
    Stun,
    Death,
}

/// Хук без решения о переходе (Enter / Exit / DoChecks / PhysicsUpdate / triggers)
pub type StateHook = fn(&mut StateContext<'_>);

/// LogicUpdate: Some(next) = переход
pub type LogicHook = fn(&mut StateContext<'_>) -> Option<StateId>;

fn noop(_: &mut StateContext<'_>) {}

fn stay(_: &mut StateContext<'_>) -> Option<StateId> {
    None
}

/// Поведение одного состояния
#[derive(Clone, Copy)]
pub struct StateHandlers {
    /// Animation flag (только уведомление animation collaborator'у)
    pub animation: &'static str,
    pub enter: StateHook,
    pub exit: StateHook,
    pub do_checks: StateHook,
    pub logic_update: LogicHook,
    pub physics_update: StateHook,
    pub animation_trigger: StateHook,
    pub animation_action_trigger: StateHook,
}

impl StateHandlers {
    pub fn new(animation: &'static str) -> Self {
        Self {
            animation,
            enter: noop,
            exit: noop,
            do_checks: noop,
            logic_update: stay,
            physics_update: noop,
            animation_trigger: noop,
            animation_action_trigger: noop,
        }
    }

    pub fn on_enter(mut self, hook: StateHook) -> Self {
        self.enter = hook;
        self
    }

    pub fn on_exit(mut self, hook: StateHook) -> Self {
        self.exit = hook;
        self
    }

    pub fn checks(mut self, hook: StateHook) -> Self {
        self.do_checks = hook;
        self
    }

    pub fn logic(mut self, hook: LogicHook) -> Self {
        self.logic_update = hook;
        self
    }

    pub fn physics(mut self, hook: StateHook) -> Self {
        self.physics_update = hook;
        self
    }

    pub fn on_trigger(mut self, hook: StateHook) -> Self {
        self.animation_trigger = hook;
        self
    }

    pub fn on_action_trigger(mut self, hook: StateHook) -> Self {
        self.animation_action_trigger = hook;
        self
    }
}

impl std::fmt::Debug for StateHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateHandlers")
            .field("animation", &self.animation)
            .finish_non_exhaustive()
    }
}

/// Набор состояний одного archetype
#[derive(Debug)]
pub struct StateTable {
    pub name: &'static str,
    pub initial: StateId,
    /// Цель damage interrupt
    pub hurt: Option<StateId>,
    /// Цель health-zero interrupt (terminal по соглашению)
    pub death: Option<StateId>,
    /// Цель parried interrupt
    pub stun: Option<StateId>,
    states: HashMap<StateId, StateHandlers>,
}

impl StateTable {
    pub fn new(name: &'static str, initial: StateId) -> Self {
        Self {
            name,
            initial,
            hurt: None,
            death: None,
            stun: None,
            states: HashMap::new(),
        }
    }

    pub fn state(mut self, id: StateId, handlers: StateHandlers) -> Self {
        self.states.insert(id, handlers);
        self
    }

    pub fn hurt(mut self, id: StateId, handlers: StateHandlers) -> Self {
        self.hurt = Some(id);
        self.state(id, handlers)
    }

    pub fn death(mut self, id: StateId, handlers: StateHandlers) -> Self {
        self.death = Some(id);
        self.state(id, handlers)
    }

    pub fn stun(mut self, id: StateId, handlers: StateHandlers) -> Self {
        self.stun = Some(id);
        self.state(id, handlers)
    }

    pub fn handlers(&self, id: StateId) -> Option<&StateHandlers> {
        self.states.get(&id)
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    /// Состояния в стабильном порядке (для логов и тестов)
    pub fn state_ids(&self) -> Vec<StateId> {
        let mut ids: Vec<StateId> = self.states.keys().copied().collect();
        ids.sort();
        ids
    }
}
