// Shared state registry
//
// Every Clauto "singleton" (Log, Config, Validator) can be constructed any number of times,
// from any call site. All of those instances read and write one state record per logical
// type, held here and handed out as SharedState handles.

use crate::error::{ClautoError, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Identifies one logical singleton type
///
/// Keys are unique per type and stable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey(&'static str);

impl StateKey {
    pub const LOG: StateKey = StateKey("Log");
    pub const CONFIG: StateKey = StateKey("Config");
    pub const VALIDATOR: StateKey = StateKey("Validator");

    /// Key for a singleton type defined outside this crate
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

type Slot = Arc<dyn Any + Send + Sync>;

/// Process-wide table of shared state records
///
/// The first [`acquire()`](Self::acquire) of a key allocates an empty record; every later
/// acquisition of the same key returns a handle to that same record. Records are never
/// removed.
///
/// Components take the registry as a parameter. Production code passes
/// [`StateRegistry::global()`]; tests build an isolated registry with
/// [`StateRegistry::new()`] so they don't observe each other.
#[derive(Default)]
pub struct StateRegistry {
    slots: RwLock<HashMap<StateKey, Slot>>,
}

impl StateRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process
    pub fn global() -> &'static StateRegistry {
        static GLOBAL: OnceLock<StateRegistry> = OnceLock::new();
        GLOBAL.get_or_init(StateRegistry::new)
    }

    /// Get a handle to the state record for `key`, allocating an empty one on first use
    ///
    /// # Errors
    /// [`ClautoError::StateTypeMismatch`] if `key` was first acquired with a different `T`.
    pub fn acquire<T>(&self, key: StateKey) -> Result<SharedState<T>>
    where
        T: Send + Sync + 'static,
    {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Self::downcast(key, Arc::clone(slot));
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have allocated between the two locks
        let slot = slots
            .entry(key)
            .or_insert_with(|| {
                tracing::trace!("Allocating shared state for <{}>", key);
                Arc::new(RwLock::new(None::<T>)) as Slot
            })
            .clone();

        Self::downcast(key, slot)
    }

    /// Whether some earlier construction already filled in the state for `key`
    pub fn is_initialized<T>(&self, key: StateKey) -> bool
    where
        T: Send + Sync + 'static,
    {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&key)
            .and_then(|slot| slot.downcast_ref::<RwLock<Option<T>>>())
            .is_some_and(|cell| cell.read().unwrap_or_else(PoisonError::into_inner).is_some())
    }

    /// Keys that have been acquired so far, in no particular order
    pub fn keys(&self) -> Vec<StateKey> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    fn downcast<T>(key: StateKey, slot: Slot) -> Result<SharedState<T>>
    where
        T: Send + Sync + 'static,
    {
        slot.downcast::<RwLock<Option<T>>>()
            .map(|cell| SharedState { key, cell })
            .map_err(|_| ClautoError::StateTypeMismatch {
                key: key.name().to_string(),
            })
    }
}

impl fmt::Debug for StateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Handle to one shared state record
///
/// Cloning a handle never copies the state: every clone, and every handle returned by
/// [`StateRegistry::acquire()`] for the same key, reads and writes the same record.
/// `None` inside means the record was allocated but no constructor has filled it in yet.
pub struct SharedState<T> {
    key: StateKey,
    cell: Arc<RwLock<Option<T>>>,
}

impl<T> SharedState<T> {
    pub fn key(&self) -> StateKey {
        self.key
    }

    /// Whether a constructor has filled in this record
    pub fn is_initialized(&self) -> bool {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Fill the record if it is still empty
    ///
    /// `init` only runs for the first-ever construction. Returns `true` if it ran and
    /// succeeded, `false` if the record was already populated (re-entry).
    ///
    /// # Errors
    /// Whatever `init` returns; the record stays empty in that case.
    pub fn initialize<F>(&self, init: F) -> Result<bool>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut state = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_some() {
            return Ok(false);
        }
        *state = Some(init()?);
        Ok(true)
    }

    /// Execute a function with read access to the state
    ///
    /// Returns `None` if the record has not been initialized.
    pub fn read<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.cell.read().unwrap_or_else(PoisonError::into_inner);
        state.as_ref().map(f)
    }

    /// Execute a function with write access to the state
    ///
    /// Returns `None` if the record has not been initialized.
    pub fn update<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut state = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        state.as_mut().map(f)
    }

    /// Whether two handles point at the same record
    pub fn same_state(&self, other: &SharedState<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: Clone> SharedState<T> {
    /// Clone the current contents out of the record
    pub fn snapshot(&self) -> Option<T> {
        self.read(T::clone)
    }
}

impl<T> Clone for SharedState<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for SharedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("key", &self.key)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        hits: u32,
    }

    const COUNTER: StateKey = StateKey::new("Counter");

    #[test]
    fn test_first_acquire_is_empty() {
        let registry = StateRegistry::new();
        let state = registry.acquire::<Counter>(COUNTER).unwrap();

        assert!(!state.is_initialized());
        assert!(!registry.is_initialized::<Counter>(COUNTER));
        assert_eq!(state.read(|c| c.hits), None);
    }

    #[test]
    fn test_acquisitions_share_one_record() {
        let registry = StateRegistry::new();
        let first = registry.acquire::<Counter>(COUNTER).unwrap();
        let second = registry.acquire::<Counter>(COUNTER).unwrap();

        first.initialize(|| Ok(Counter::default())).unwrap();
        second.update(|c| c.hits += 3);

        assert!(first.same_state(&second));
        assert_eq!(first.snapshot(), Some(Counter { hits: 3 }));
        assert!(registry.is_initialized::<Counter>(COUNTER));
    }

    #[test]
    fn test_initialize_runs_once() {
        let registry = StateRegistry::new();
        let state = registry.acquire::<Counter>(COUNTER).unwrap();

        assert!(state.initialize(|| Ok(Counter { hits: 1 })).unwrap());
        assert!(!state.initialize(|| Ok(Counter { hits: 99 })).unwrap());
        assert_eq!(state.read(|c| c.hits), Some(1));
    }

    #[test]
    fn test_failed_initialize_leaves_record_empty() {
        let registry = StateRegistry::new();
        let state = registry.acquire::<Counter>(COUNTER).unwrap();

        let result = state.initialize(|| Err(ClautoError::EmptyConfigInstantiation));

        assert!(result.is_err());
        assert!(!state.is_initialized());
    }

    #[test]
    fn test_type_mismatch() {
        let registry = StateRegistry::new();
        registry.acquire::<Counter>(COUNTER).unwrap();

        let result = registry.acquire::<String>(COUNTER);
        assert!(matches!(result, Err(ClautoError::StateTypeMismatch { .. })));
    }

    #[test]
    fn test_registries_are_isolated() {
        let a = StateRegistry::new();
        let b = StateRegistry::new();

        a.acquire::<Counter>(COUNTER)
            .unwrap()
            .initialize(|| Ok(Counter::default()))
            .unwrap();

        assert!(a.is_initialized::<Counter>(COUNTER));
        assert!(!b.is_initialized::<Counter>(COUNTER));
    }

    #[test]
    fn test_global_is_one_instance() {
        assert!(std::ptr::eq(StateRegistry::global(), StateRegistry::global()));
    }
}
