//! Behavior core: State / StateMachine
//!
//! Организация:
//! - state: StateId, StateHandlers (fn pointers), StateTable (per-archetype)
//! - context: StateContext (view на актора для одного вызова), StateMemory, ActorCommand
//! - machine: StateMachine (одно активное состояние, Exit → Enter), FsmError
//!
//! Lifecycle состояния:
//! - Enter: DoChecks, animation flag = true, сброс флагов, start_time, подписка
//! - Exit: animation flag = false, is_exiting_state = true, отписка
//! - LogicUpdate (logic phase) решает переход
//! - PhysicsUpdate (physics phase): DoChecks, потом непрерывные силы

pub mod context;
pub mod machine;
pub mod state;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod machine_tests;

pub use context::{ActorCommand, StateContext, StateMemory};
pub use machine::{report_invalid_transition, FsmError, StateMachine};
pub use state::{LogicHook, StateHandlers, StateHook, StateId, StateTable};
