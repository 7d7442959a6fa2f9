//! Typed, possibly cyclic references between bound records.
//!
//! Records that other records point at are held in [`Shared`] and report a
//! logical id through [`Identifiable`]. References are [`Pointer`] fields,
//! bound from `{"$ref": "<id>"}` and left unresolved by binding. A
//! [`Linker`] then runs two flat passes over one or more bound roots:
//!
//! 1. **register**: every identifiable shared record is indexed in an
//!    [`IdentityRegistry`] under `(type name, id)`;
//! 2. **resolve**: every unresolved pointer looks up its own target type
//!    and id in the registry.
//!
//! Pointers hold weak handles, so cycles of any length resolve without
//! recursion through the cycle and without leaking.

pub mod config;
pub mod error;
pub mod linker;
pub mod pointer;
pub mod registry;
pub mod shared;
pub mod traits;

pub use config::LinkerConfig;
pub use error::{LinkError, LinkResult};
pub use linker::{link, LinkReport, Linker, UnresolvedRef};
pub use pointer::{Pointer, PointerState};
pub use registry::IdentityRegistry;
pub use shared::Shared;
pub use traits::Identifiable;
