//! StateMachine — ровно одно активное состояние на актора
//!
//! Переход = синхронный Exit(current) → current = next → Enter(next).
//! Без промежуточного "transitioning" состояния и без очереди.
//! ChangeState(A) из A — тоже полный цикл Exit → Enter.
//!
//! Interrupts (damage / health zero / parried) доставляются только пока
//! текущее состояние подписано: подписка ставится в Enter, снимается в Exit.

use bevy::prelude::*;
use thiserror::Error;

use super::{StateContext, StateHandlers, StateId, StateTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsmError {
    #[error("state machine accessed before initialize")]
    NotInitialized,
    #[error("transition to {0:?} requested while exiting state")]
    TransitionWhileExiting(StateId),
    #[error("state {0:?} is not part of this archetype")]
    UnknownState(StateId),
}

/// InvalidTransition: programmer error.
/// Debug build — паника, release — лог и no-op.
pub fn report_invalid_transition(entity: Entity, error: FsmError) {
    crate::logger::log_error(&format!("❌ FSM {:?}: {}", entity, error));
    debug_assert!(false, "FSM {:?}: {}", entity, error);
}

#[derive(Component, Debug)]
pub struct StateMachine {
    table: &'static StateTable,
    current: Option<StateId>,
    previous: Option<StateId>,
    subscribed: bool,
    transitions: u32,
}

impl StateMachine {
    pub fn new(table: &'static StateTable) -> Self {
        Self {
            table,
            current: None,
            previous: None,
            subscribed: false,
            transitions: 0,
        }
    }

    pub fn table(&self) -> &'static StateTable {
        self.table
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Текущее состояние (ошибка до initialize)
    pub fn current(&self) -> Result<StateId, FsmError> {
        self.current.ok_or(FsmError::NotInitialized)
    }

    pub fn previous(&self) -> Option<StateId> {
        self.previous
    }

    /// Подписано ли текущее состояние на combat interrupts
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Число выполненных ChangeState
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn is_in(&self, id: StateId) -> bool {
        self.current == Some(id)
    }

    /// Вход в initial state archetype. Повторный вызов — no-op.
    pub fn initialize(&mut self, ctx: &mut StateContext) -> Result<StateId, FsmError> {
        if let Some(current) = self.current {
            crate::logger::log_warning(&format!(
                "⚠️ FSM {:?}: already initialized in {:?}",
                ctx.entity, current
            ));
            return Ok(current);
        }

        let initial = self.table.initial;
        let handlers = self.handlers(initial)?;
        self.current = Some(initial);
        self.enter(&handlers, ctx);

        crate::logger::log(&format!("🧠 FSM {:?} ({}): initialized in {:?}", ctx.entity, self.table.name, initial));
        Ok(initial)
    }

    /// ChangeState(next): Exit → reassign → Enter
    pub fn change_state(&mut self, next: StateId, ctx: &mut StateContext) -> Result<(), FsmError> {
        let current = self.current()?;
        if ctx.memory.is_exiting_state {
            return Err(FsmError::TransitionWhileExiting(next));
        }
        let next_handlers = self.handlers(next)?;
        let current_handlers = self.handlers(current)?;

        self.exit(&current_handlers, ctx);
        self.previous = Some(current);
        self.current = Some(next);
        self.transitions += 1;

        crate::logger::log(&format!("🔄 FSM {:?}: {:?} → {:?}", ctx.entity, current, next));

        self.enter(&next_handlers, ctx);
        Ok(())
    }

    /// Damage interrupt → Hurt (если он есть и мы не в Hurt/Death)
    pub fn handle_damage(&mut self, ctx: &mut StateContext) -> Result<bool, FsmError> {
        let current = self.current()?;
        let Some(hurt) = self.table.hurt else {
            return Ok(false);
        };
        if !self.subscribed || current == hurt || Some(current) == self.table.death {
            return Ok(false);
        }

        self.change_state(hurt, ctx)?;
        Ok(true)
    }

    /// Health-zero interrupt → Death
    pub fn handle_health_zero(&mut self, ctx: &mut StateContext) -> Result<bool, FsmError> {
        let current = self.current()?;
        let Some(death) = self.table.death else {
            return Ok(false);
        };
        if !self.subscribed || current == death {
            return Ok(false);
        }

        self.change_state(death, ctx)?;
        Ok(true)
    }

    /// Parried interrupt (атакующему) → Stun
    pub fn handle_parried(&mut self, ctx: &mut StateContext) -> Result<bool, FsmError> {
        let current = self.current()?;
        let Some(stun) = self.table.stun else {
            return Ok(false);
        };
        if !self.subscribed || Some(current) == self.table.death {
            return Ok(false);
        }

        self.change_state(stun, ctx)?;
        Ok(true)
    }

    /// Logic phase: LogicUpdate текущего состояния + переход по его решению
    pub fn logic_update(&mut self, ctx: &mut StateContext) -> Result<Option<StateId>, FsmError> {
        let current = self.current()?;
        if ctx.memory.is_exiting_state {
            return Ok(None);
        }
        let handlers = self.handlers(current)?;

        match (handlers.logic_update)(ctx) {
            Some(next) => {
                self.change_state(next, ctx)?;
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }

    /// Physics phase: DoChecks → PhysicsUpdate
    pub fn physics_update(&mut self, ctx: &mut StateContext) -> Result<(), FsmError> {
        let current = self.current()?;
        let handlers = self.handlers(current)?;

        (handlers.do_checks)(ctx);
        (handlers.physics_update)(ctx);
        Ok(())
    }

    /// AnimationFinishTrigger()
    pub fn animation_finished(&mut self, ctx: &mut StateContext) -> Result<(), FsmError> {
        self.current()?;
        ctx.memory.is_animation_finished = true;
        Ok(())
    }

    /// AnimationTrigger()
    pub fn animation_trigger(&mut self, ctx: &mut StateContext) -> Result<(), FsmError> {
        let handlers = self.handlers(self.current()?)?;
        (handlers.animation_trigger)(ctx);
        Ok(())
    }

    /// AnimationActionTrigger()
    pub fn animation_action_trigger(&mut self, ctx: &mut StateContext) -> Result<(), FsmError> {
        let handlers = self.handlers(self.current()?)?;
        (handlers.animation_action_trigger)(ctx);
        Ok(())
    }

    fn handlers(&self, id: StateId) -> Result<StateHandlers, FsmError> {
        self.table.handlers(id).copied().ok_or(FsmError::UnknownState(id))
    }

    fn enter(&mut self, handlers: &StateHandlers, ctx: &mut StateContext) {
        (handlers.do_checks)(ctx);
        ctx.animator.set_flag(handlers.animation, true);
        ctx.memory.reset_for_enter(ctx.now);
        self.subscribed = true;
        (handlers.enter)(ctx);
    }

    fn exit(&mut self, handlers: &StateHandlers, ctx: &mut StateContext) {
        ctx.animator.set_flag(handlers.animation, false);
        ctx.memory.is_exiting_state = true;
        self.subscribed = false;
        (handlers.exit)(ctx);
    }
}
