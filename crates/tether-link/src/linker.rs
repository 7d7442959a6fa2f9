//! Two-pass reference resolution over bound record graphs.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tether_bind::{Bindable, LinkNode, LinkReference, LinkVisitor};

use crate::config::LinkerConfig;
use crate::error::{LinkError, LinkResult};
use crate::registry::IdentityRegistry;
use crate::shared::Shared;

/// A reference left unresolved by a partial link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedRef {
    pub type_name: String,
    pub reference: String,
}

/// Outcome of a register/resolve pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReport {
    /// Identifiable records registered.
    pub registered: usize,
    /// References resolved by this pass.
    pub resolved: usize,
    /// References that found no target (partial resolution only).
    pub unresolved: Vec<UnresolvedRef>,
}

impl LinkReport {
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }

    /// Whether every reference seen was resolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    fn absorb(&mut self, other: LinkReport) {
        self.registered += other.registered;
        self.resolved += other.resolved;
        self.unresolved.extend(other.unresolved);
    }
}

/// Resolves [`Pointer`](crate::Pointer) fields against an
/// [`IdentityRegistry`].
///
/// The registry lives as long as the linker, so roots registered by one
/// call can satisfy references in a later one. A linker is meant for one
/// caller at a time; every operation takes `&mut self`.
#[derive(Debug, Default)]
pub struct Linker {
    config: LinkerConfig,
    registry: IdentityRegistry,
    /// Shared records already scanned, kept alive so addresses stay unique.
    scanned: HashMap<usize, Arc<dyn Any + Send + Sync>>,
}

impl Linker {
    pub fn new(config: LinkerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// The registered record of type `T` with the given id.
    pub fn lookup<T>(&self, id: &str) -> Option<Shared<T>>
    where
        T: Send + Sync + 'static,
    {
        self.registry.lookup(id)
    }

    /// Index every identifiable shared record reachable from `root`.
    ///
    /// Returns the number of records registered.
    pub fn register(&mut self, root: &mut dyn Bindable) -> usize {
        let mut local = HashMap::new();
        let seen = if self.config.enable_caching {
            &mut self.scanned
        } else {
            &mut local
        };
        let mut registrar = Registrar {
            registry: &mut self.registry,
            seen,
            registered: 0,
        };
        root.visit_links(&mut registrar);
        let registered = registrar.registered;
        debug!(registered, total = self.registry.len(), "registered identities");
        registered
    }

    /// Resolve every unresolved pointer reachable from `root`.
    ///
    /// Pointers already resolved are left alone. With partial resolution
    /// disabled the first dangling reference fails the call; pointers
    /// resolved before it stay resolved.
    pub fn resolve_references(&mut self, root: &mut dyn Bindable) -> LinkResult<LinkReport> {
        let mut resolver = Resolver {
            registry: &self.registry,
            partial: self.config.allow_partial_resolution,
            seen: HashSet::new(),
            report: LinkReport::default(),
            error: None,
        };
        root.visit_links(&mut resolver);
        if let Some(err) = resolver.error {
            return Err(err);
        }
        debug!(
            resolved = resolver.report.resolved,
            unresolved = resolver.report.unresolved.len(),
            "resolved references"
        );
        Ok(resolver.report)
    }

    /// Register every root, then resolve references in every root.
    ///
    /// Registering all roots first lets a record bound from one source
    /// reference a record bound from another.
    pub fn link(&mut self, roots: &mut [&mut dyn Bindable]) -> LinkResult<LinkReport> {
        let mut report = LinkReport::default();
        for root in roots.iter_mut() {
            report.registered += self.register(&mut **root);
        }
        for root in roots.iter_mut() {
            report.absorb(self.resolve_references(&mut **root)?);
        }
        Ok(report)
    }
}

/// Link `roots` with a throwaway [`Linker`].
pub fn link(roots: &mut [&mut dyn Bindable], config: LinkerConfig) -> LinkResult<LinkReport> {
    Linker::new(config).link(roots)
}

struct Registrar<'a> {
    registry: &'a mut IdentityRegistry,
    seen: &'a mut HashMap<usize, Arc<dyn Any + Send + Sync>>,
    registered: usize,
}

impl LinkVisitor for Registrar<'_> {
    fn visit_node(&mut self, node: &dyn LinkNode) {
        let address = node.address();
        if self.seen.contains_key(&address) {
            return;
        }
        self.seen.insert(address, node.handle());
        if let Some((type_name, id)) = node.identity() {
            self.registry.insert(type_name, id, node.handle());
            self.registered += 1;
        }
        node.descend(self);
    }

    fn visit_reference(&mut self, _reference: &mut dyn LinkReference) {}
}

struct Resolver<'a> {
    registry: &'a IdentityRegistry,
    partial: bool,
    seen: HashSet<usize>,
    report: LinkReport,
    error: Option<LinkError>,
}

impl LinkVisitor for Resolver<'_> {
    fn visit_node(&mut self, node: &dyn LinkNode) {
        if self.error.is_some() || !self.seen.insert(node.address()) {
            return;
        }
        node.descend(self);
    }

    fn visit_reference(&mut self, reference: &mut dyn LinkReference) {
        if self.error.is_some() || reference.is_resolved() {
            return;
        }
        let type_name = reference.target_type();
        let attached = self
            .registry
            .get(type_name, reference.reference())
            .is_some_and(|handle| reference.attach(handle));
        if attached {
            self.report.resolved += 1;
            return;
        }
        if self.partial {
            warn!(type_name, reference = reference.reference(), "reference left unresolved");
            self.report.unresolved.push(UnresolvedRef {
                type_name: type_name.to_string(),
                reference: reference.reference().to_string(),
            });
        } else {
            self.error = Some(LinkError::Unresolved {
                type_name,
                reference: reference.reference().to_string(),
            });
        }
    }
}
