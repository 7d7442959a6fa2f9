//! Records shared between owners and reachable by reference.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tether_bind::walker::{bind_slot, unbind_slot};
use tether_bind::{BindResult, Bindable, Context, LinkNode, LinkVisitor, Value};

use crate::traits::Identifiable;

/// An identifiable record behind `Arc<RwLock<_>>`.
///
/// Cloning shares the record. Binding into a `Shared` binds the inner
/// record in place, so handles held elsewhere observe the new values.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub(crate) fn from_arc(inner: Arc<RwLock<T>>) -> Self {
        Self(inner)
    }

    pub(crate) fn arc(&self) -> &Arc<RwLock<T>> {
        &self.0
    }

    /// Read access. A poisoned lock still yields the value.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access. A poisoned lock still yields the value.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles point at the same record.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.read()).finish()
    }
}

impl<T> Bindable for Shared<T>
where
    T: Bindable + Identifiable,
{
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        let mut inner = self.write();
        bind_slot(&mut *inner, raw, cx)
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        let inner = self.read();
        unbind_slot(&*inner, cx)
    }

    fn clear(&mut self) {
        self.write().clear();
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        visitor.visit_node(&*self);
    }
}

impl<T> LinkNode for Shared<T>
where
    T: Bindable + Identifiable,
{
    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    fn identity(&self) -> Option<(&'static str, String)> {
        let inner = self.read();
        let id = inner.logical_id().filter(|id| !id.is_empty())?.to_string();
        Some((type_name::<T>(), id))
    }

    fn handle(&self) -> Arc<dyn Any + Send + Sync> {
        self.0.clone()
    }

    fn descend(&self, visitor: &mut dyn LinkVisitor) {
        self.write().visit_links(visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tether_bind::{bind_new, record, unbind, Options};

    record! {
        #[derive(Debug, Default)]
        struct Team {
            name: String,
        }
    }

    impl Identifiable for Team {
        fn logical_id(&self) -> Option<&str> {
            Some(&self.name)
        }
    }

    record! {
        #[derive(Debug, Default)]
        struct Org {
            team: Shared<Team>,
        }
    }

    #[test]
    fn binds_in_place_through_clones() {
        let options = Options::default();
        let mut org: Org = bind_new(&json!({"team": {"name": "core"}}), &options).unwrap();
        let held = org.team.clone();

        tether_bind::merge(&mut org, &json!({"team": {"name": "infra"}}), &options).unwrap();
        assert_eq!(held.read().name, "infra");
        assert!(held.ptr_eq(&org.team));

        let raw = unbind(&org, &options).unwrap();
        assert_eq!(raw["team"], json!({"name": "infra"}));
    }

    #[test]
    fn identity_uses_type_and_id() {
        let team = Shared::new(Team {
            name: "core".into(),
        });
        let (type_name, id) = team.identity().unwrap();
        assert!(type_name.ends_with("Team"));
        assert_eq!(id, "core");

        assert!(Shared::new(Team::default()).identity().is_none());
    }
}
