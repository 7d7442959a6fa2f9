//! `(type name, logical id)` index of shared records.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::shared::Shared;

type Handle = Arc<dyn Any + Send + Sync>;

/// Index of identifiable shared records.
///
/// Ids are scoped by type name, so two record types may use the same id
/// space without colliding. Registering a different record under an
/// existing key replaces it (last write wins).
#[derive(Clone, Default)]
pub struct IdentityRegistry {
    by_type: HashMap<&'static str, HashMap<String, Handle>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `(type_name, id)`.
    ///
    /// Returns `true` if a different record was replaced.
    pub fn insert(&mut self, type_name: &'static str, id: impl Into<String>, handle: Handle) -> bool {
        let id = id.into();
        let slot = self.by_type.entry(type_name).or_default();
        match slot.insert(id.clone(), Arc::clone(&handle)) {
            Some(previous) if !Arc::ptr_eq(&previous, &handle) => {
                debug!(type_name, id = %id, "identity re-registered with a different record");
                true
            }
            _ => false,
        }
    }

    /// Register a shared record under its own type and the given id.
    pub fn insert_shared<T>(&mut self, id: impl Into<String>, record: &Shared<T>) -> bool
    where
        T: Send + Sync + 'static,
    {
        let handle: Handle = record.arc().clone();
        self.insert(type_name::<T>(), id, handle)
    }

    /// The type-erased handle registered under `(type_name, id)`.
    pub fn get(&self, type_name: &str, id: &str) -> Option<Handle> {
        self.by_type.get(type_name)?.get(id).cloned()
    }

    /// The record of type `T` registered under `id`.
    pub fn lookup<T>(&self, id: &str) -> Option<Shared<T>>
    where
        T: Send + Sync + 'static,
    {
        let handle = self.get(type_name::<T>(), id)?;
        handle.downcast::<RwLock<T>>().ok().map(Shared::from_arc)
    }

    pub fn contains(&self, type_name: &str, id: &str) -> bool {
        self.by_type
            .get(type_name)
            .is_some_and(|ids| ids.contains_key(id))
    }

    /// Registered ids for one type, sorted.
    pub fn ids(&self, type_name: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .by_type
            .get(type_name)
            .map(|ids| ids.keys().map(String::as_str).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Total number of registered records.
    pub fn len(&self) -> usize {
        self.by_type.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
    }
}

impl std::fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<(&str, usize)> =
            self.by_type.iter().map(|(t, ids)| (*t, ids.len())).collect();
        types.sort_unstable();
        f.debug_struct("IdentityRegistry")
            .field("types", &types)
            .finish()
    }
}
