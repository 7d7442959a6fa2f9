//! Reference placeholders.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use tether_bind::{
    BindResult, Bindable, Context, LinkReference, LinkVisitor, RawMap, Value, REF_KEY,
};

use crate::shared::Shared;
use crate::traits::Identifiable;

/// Where a [`Pointer`] stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerState {
    /// No reference set.
    Empty,
    /// A reference id is set but no live target is attached.
    Unresolved,
    /// Attached to a live target.
    Resolved,
}

/// A typed reference to a [`Shared`] record by logical id.
///
/// Raw form is `{"$ref": "<id>"}`. The target is held weakly: a pointer
/// never keeps its target alive, and reverts to
/// [`PointerState::Unresolved`] once every [`Shared`] handle is gone.
pub struct Pointer<T> {
    ref_id: String,
    resolved: Weak<RwLock<T>>,
}

impl<T> Pointer<T> {
    /// An unresolved pointer to `id`.
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            ref_id: id.into(),
            resolved: Weak::new(),
        }
    }

    pub fn ref_id(&self) -> &str {
        &self.ref_id
    }

    pub fn is_empty(&self) -> bool {
        self.ref_id.is_empty()
    }

    pub fn state(&self) -> PointerState {
        if self.ref_id.is_empty() {
            PointerState::Empty
        } else if self.resolved.strong_count() > 0 {
            PointerState::Resolved
        } else {
            PointerState::Unresolved
        }
    }

    /// The target, if resolved and still alive.
    pub fn get(&self) -> Option<Shared<T>> {
        self.resolved.upgrade().map(Shared::from_arc)
    }

    /// Drop the reference and any resolution.
    pub fn reset(&mut self) {
        self.ref_id.clear();
        self.resolved = Weak::new();
    }
}

impl<T: Identifiable> Pointer<T> {
    /// A resolved pointer to `target`, referenced by its logical id.
    pub fn to_shared(target: &Shared<T>) -> Self {
        let ref_id = target.read().logical_id().unwrap_or_default().to_string();
        Self {
            ref_id,
            resolved: Arc::downgrade(target.arc()),
        }
    }
}

impl<T> Default for Pointer<T> {
    fn default() -> Self {
        Self::to(String::new())
    }
}

impl<T> Clone for Pointer<T> {
    fn clone(&self) -> Self {
        Self {
            ref_id: self.ref_id.clone(),
            resolved: self.resolved.clone(),
        }
    }
}

impl<T> fmt::Debug for Pointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointer")
            .field("ref", &self.ref_id)
            .field("state", &self.state())
            .finish()
    }
}

impl<T> Bindable for Pointer<T>
where
    T: Bindable + Identifiable,
{
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        let id = match raw {
            Value::Null => {
                self.reset();
                return Ok(());
            }
            Value::Object(map) if map.len() == 1 => map.get(REF_KEY).and_then(Value::as_str),
            _ => None,
        };
        let id = id.ok_or_else(|| cx.type_mismatch(format!("{{\"{REF_KEY}\": id}} mapping"), raw))?;
        if id != self.ref_id {
            *self = Self::to(id);
        }
        Ok(())
    }

    fn unbind_value(&self, _cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut map = RawMap::new();
        map.insert(REF_KEY.to_string(), Value::String(self.ref_id.clone()));
        Ok(Some(Value::Object(map)))
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        if !self.is_empty() {
            visitor.visit_reference(self);
        }
    }
}

impl<T> LinkReference for Pointer<T>
where
    T: Bindable + Identifiable,
{
    fn target_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn reference(&self) -> &str {
        &self.ref_id
    }

    fn is_resolved(&self) -> bool {
        self.state() == PointerState::Resolved
    }

    fn attach(&mut self, handle: Arc<dyn Any + Send + Sync>) -> bool {
        match handle.downcast::<RwLock<T>>() {
            Ok(target) => {
                self.resolved = Arc::downgrade(&target);
                true
            }
            Err(_) => false,
        }
    }
}
