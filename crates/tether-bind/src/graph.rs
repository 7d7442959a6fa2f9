//! Traversal seam used by the reference linker.
//!
//! Binding never follows references. The linker walks a bound record tree
//! through [`Bindable::visit_links`](crate::Bindable::visit_links), which
//! reports shared record nodes and reference placeholders to a
//! [`LinkVisitor`].

use std::any::Any;
use std::sync::Arc;

/// Receives the nodes and references found while walking a record tree.
pub trait LinkVisitor {
    /// A shared record. Call [`LinkNode::descend`] to walk its fields.
    fn visit_node(&mut self, node: &dyn LinkNode);

    /// A reference placeholder.
    fn visit_reference(&mut self, reference: &mut dyn LinkReference);
}

/// A shared, possibly identifiable record.
pub trait LinkNode {
    /// Stable address of the shared allocation.
    fn address(&self) -> usize;

    /// `(type name, logical id)` when the record reports an identifier.
    fn identity(&self) -> Option<(&'static str, String)>;

    /// Type-erased handle to the shared allocation.
    fn handle(&self) -> Arc<dyn Any + Send + Sync>;

    /// Walk the record's own fields.
    fn descend(&self, visitor: &mut dyn LinkVisitor);
}

/// A typed reference to another record by logical id.
pub trait LinkReference {
    /// Type name the reference targets.
    fn target_type(&self) -> &'static str;

    /// The logical id referred to. Empty when the reference is unset.
    fn reference(&self) -> &str;

    fn is_resolved(&self) -> bool;

    /// Point the reference at `handle`. Returns `false` if the handle is not
    /// of the target type.
    fn attach(&mut self, handle: Arc<dyn Any + Send + Sync>) -> bool;
}
