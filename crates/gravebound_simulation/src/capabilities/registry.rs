//! Core — per-entity реестр capability компонентов
//!
//! Инварианты:
//! - не больше одного экземпляра каждого типа capability на Core
//! - состав фиксирован после сборки актора (remove нет)
//! - lookup по TypeId: индекс строится при `add`, дальше O(1)

use bevy::prelude::*;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use thiserror::Error;

/// Ошибки реестра
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Запрошенная capability не была добавлена в Core
    #[error("missing capability: {capability}")]
    MissingCapability { capability: &'static str },
}

/// Downcast helper (blanket impl для всех 'static типов)
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Базовая capability: узкий модуль поведения, принадлежащий одному Core
pub trait CoreComponent: AsAny + Send + Sync + 'static {
    /// Имя для логов
    fn name(&self) -> &'static str;

    /// Per-tick bookkeeping (logic phase, до LogicUpdate активного State)
    fn logic_update(&mut self, _now: f32) {}

    /// Подписка на "damage received" внутри Core (hurt VFX, hit-stop)
    fn on_damage_taken(&mut self, _amount: f32, _now: f32) {}
}

#[derive(Component, Default)]
pub struct Core {
    components: Vec<Box<dyn CoreComponent>>,
    index: HashMap<TypeId, usize>,
}

impl Core {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-вариант `add` для сборки актора
    pub fn with<T: CoreComponent>(mut self, component: T) -> Self {
        self.add(component);
        self
    }

    /// Регистрирует capability.
    ///
    /// Повторное добавление того же типа — no-op (первый экземпляр остаётся),
    /// возвращает false.
    pub fn add<T: CoreComponent>(&mut self, component: T) -> bool {
        let type_id = TypeId::of::<T>();
        if self.index.contains_key(&type_id) {
            crate::logger::log(&format!(
                "Core: {} already registered, add ignored",
                component.name()
            ));
            return false;
        }

        self.index.insert(type_id, self.components.len());
        self.components.push(Box::new(component));
        true
    }

    /// Hard-fail lookup
    pub fn get<T: CoreComponent>(&self) -> Result<&T, CoreError> {
        self.lookup::<T>().ok_or(CoreError::MissingCapability {
            capability: short_type_name::<T>(),
        })
    }

    /// Hard-fail lookup (mutable)
    pub fn get_mut<T: CoreComponent>(&mut self) -> Result<&mut T, CoreError> {
        self.lookup_mut::<T>().ok_or(CoreError::MissingCapability {
            capability: short_type_name::<T>(),
        })
    }

    /// Log-and-default lookup: отсутствие capability → debug лог + None
    pub fn find<T: CoreComponent>(&self) -> Option<&T> {
        let found = self.lookup::<T>();
        if found.is_none() {
            log_missing::<T>();
        }
        found
    }

    /// Log-and-default lookup (mutable)
    pub fn find_mut<T: CoreComponent>(&mut self) -> Option<&mut T> {
        let found = self.lookup_mut::<T>();
        if found.is_none() {
            log_missing::<T>();
        }
        found
    }

    pub fn contains<T: CoreComponent>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Имена capability в порядке регистрации
    pub fn names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// Logic phase bookkeeping всех capability (порядок = порядок регистрации)
    pub fn logic_update(&mut self, now: f32) {
        for component in self.components.iter_mut() {
            component.logic_update(now);
        }
    }

    /// Рассылает "damage taken" подписчикам внутри Core
    pub fn notify_damage_taken(&mut self, amount: f32, now: f32) {
        for component in self.components.iter_mut() {
            component.on_damage_taken(amount, now);
        }
    }

    fn lookup<T: CoreComponent>(&self) -> Option<&T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        let component: &dyn CoreComponent = self.components.get(slot)?.as_ref();
        component.as_any().downcast_ref::<T>()
    }

    fn lookup_mut<T: CoreComponent>(&mut self) -> Option<&mut T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        let component: &mut dyn CoreComponent = self.components.get_mut(slot)?.as_mut();
        component.as_any_mut().downcast_mut::<T>()
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("components", &self.names())
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

fn log_missing<T>() {
    crate::logger::log(&format!(
        "Core: optional capability {} is absent, skipping",
        short_type_name::<T>()
    ));
}
