//! Foundation types for tether.
//!
//! This crate provides the leaf building blocks the binding and linking
//! crates share. Every other tether crate depends on `tether-types`.
//!
//! # Key Types
//!
//! - [`Value`] / [`RawMap`]: Decoder-agnostic raw data (scalar, sequence, mapping)
//! - [`Annotation`]: Parsed per-field directive (`name,+required,+secret,...`)
//! - [`external_name`]: Default external key for a field name
//! - [`parse_duration`] / [`format_duration`]: Compact duration text

pub mod annotation;
pub mod duration;
pub mod error;
pub mod naming;
pub mod value;

pub use annotation::Annotation;
pub use duration::{format_duration, parse_duration};
pub use error::{TypeError, TypeResult};
pub use naming::external_name;
pub use value::{kind_name, scalar_text, RawMap, Value, DISCRIMINATOR_KEY, REF_KEY};
