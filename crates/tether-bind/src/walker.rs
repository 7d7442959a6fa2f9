//! Recursive field walking shared by bind, unbind, merge, and inspect.
//!
//! Embedded records are walked as if their fields were declared on the
//! parent: they share the parent's key namespace and its overflow field.
//! Overflow is collected per record level, never from a descendant.

use std::collections::HashSet;

use tether_types::{scalar_text, RawMap, Value};
use tracing::trace;

use crate::bindable::Bindable;
use crate::context::{Context, Mode};
use crate::error::{BindError, BindResult};
use crate::graph::LinkVisitor;
use crate::record::{FieldSpec, Record, Schema};

/// Bind one slot: a registered converter for the slot's exact type wins,
/// otherwise the slot's own [`Bindable`] implementation runs.
pub fn bind_slot(slot: &mut dyn Bindable, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
    let options = cx.options();
    if let Some(converter) = options.converters.get((*slot).as_any().type_id()) {
        trace!(target_type = converter.type_name(), path = %cx.path(), "custom converter");
        return converter
            .bind(raw, slot.as_any_mut())
            .map_err(|source| cx.conversion(converter.type_name(), source));
    }
    slot.bind_value(raw, cx)
}

/// Unbind one slot, preferring a registered converter.
pub fn unbind_slot(slot: &dyn Bindable, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
    let options = cx.options();
    if let Some(converter) = options.converters.get(slot.as_any().type_id()) {
        return converter
            .unbind(slot.as_any())
            .map(Some)
            .map_err(|source| cx.conversion(converter.type_name(), source));
    }
    slot.unbind_value(cx)
}

/// Bind (or merge, per the context mode) a raw mapping into a record.
pub fn bind_record(record: &mut dyn Record, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
    let owner = record.schema().name();
    let map = match raw {
        Value::Object(map) => map,
        Value::Null => {
            if cx.mode() == Mode::Bind {
                clear_record(record);
            }
            return Ok(());
        }
        other => return Err(cx.type_mismatch(format!("mapping for {owner}"), other)),
    };

    let mut consumed: HashSet<&'static str> = HashSet::new();
    let mut overflow: Option<&mut RawMap> = None;
    bind_level(record, map, &mut consumed, &mut overflow, owner, cx)?;

    let extra: RawMap = map
        .iter()
        .filter(|(key, _)| !consumed.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    match overflow {
        Some(slot) => match cx.mode() {
            Mode::Bind => *slot = extra,
            Mode::Merge => slot.extend(extra),
        },
        None => {
            for key in extra.keys() {
                trace!(record = owner, key = %key, path = %cx.path(), "unmatched key dropped");
            }
        }
    }
    Ok(())
}

fn bind_level<'r>(
    record: &'r mut dyn Record,
    map: &RawMap,
    consumed: &mut HashSet<&'static str>,
    overflow: &mut Option<&'r mut RawMap>,
    owner: &'static str,
    cx: &mut Context<'_>,
) -> BindResult<()> {
    let schema = record.schema();
    for (spec, field) in schema.fields().iter().zip(record.fields_mut()) {
        if spec.annotation.skip {
            continue;
        }
        if spec.embedded {
            let label = field.type_label();
            let inner = field
                .as_record_mut()
                .ok_or_else(|| not_a_record(schema, spec, label))?;
            bind_level(inner, map, consumed, overflow, owner, cx)?;
            continue;
        }
        if spec.is_overflow() {
            let label = field.type_label();
            let slot = field
                .as_any_mut()
                .downcast_mut::<RawMap>()
                .ok_or_else(|| bad_overflow(schema, spec, label))?;
            if overflow.is_some() {
                return Err(BindError::MultipleExtra { record: owner });
            }
            *overflow = Some(slot);
            continue;
        }

        consumed.insert(spec.key.as_str());
        match map.get(&spec.key) {
            Some(raw) => bind_field(schema, spec, field, raw, cx)?,
            None if cx.mode() == Mode::Merge => {}
            None if spec.annotation.required => {
                let path = cx.with_key(&spec.key, |cx| cx.path());
                return Err(BindError::RequiredField {
                    record: schema.name(),
                    field: spec.name,
                    key: spec.key.clone(),
                    path,
                });
            }
            None => field.clear(),
        }
    }
    Ok(())
}

fn bind_field(
    schema: &'static Schema,
    spec: &'static FieldSpec,
    field: &mut dyn Bindable,
    raw: &Value,
    cx: &mut Context<'_>,
) -> BindResult<()> {
    let scope = schema.field_scope(spec.name);
    cx.with_key(&spec.key, |cx| {
        cx.with_field(scope, |cx| {
            bind_slot(field, raw, cx).map_err(|err| wrap_binding(schema, spec, err))?;

            if let Some(expected) = &spec.annotation.fixed_value {
                let found = unbind_slot(field, cx)
                    .map_err(|err| wrap_binding(schema, spec, err))?
                    .as_ref()
                    .and_then(scalar_text)
                    .unwrap_or_default();
                if found != *expected {
                    return Err(BindError::ValueMismatch {
                        record: schema.name(),
                        field: spec.name,
                        expected: expected.clone(),
                        found,
                    });
                }
            }
            Ok(())
        })
    })
}

/// Unbind a record to a raw mapping.
///
/// Overflow entries are appended after the declared fields; an overflow key
/// equal to a declared key is ambiguous and rejected.
pub fn unbind_record(record: &dyn Record, cx: &mut Context<'_>) -> BindResult<RawMap> {
    let owner = record.schema().name();
    let mut out = RawMap::new();
    let mut declared: HashSet<&'static str> = HashSet::new();
    let mut overflow: Option<&RawMap> = None;
    unbind_level(record, &mut out, &mut declared, &mut overflow, owner, cx)?;

    if let Some(extra) = overflow {
        for (key, value) in extra {
            if declared.contains(key.as_str()) {
                return Err(BindError::Validation(format!(
                    "overflow key {key:?} of {owner} collides with a declared field at {}",
                    cx.path()
                )));
            }
            out.insert(key.clone(), value.clone());
        }
    }
    Ok(out)
}

fn unbind_level<'r>(
    record: &'r dyn Record,
    out: &mut RawMap,
    declared: &mut HashSet<&'static str>,
    overflow: &mut Option<&'r RawMap>,
    owner: &'static str,
    cx: &mut Context<'_>,
) -> BindResult<()> {
    let schema = record.schema();
    for (spec, field) in schema.fields().iter().zip(record.fields()) {
        if spec.annotation.skip {
            continue;
        }
        if spec.embedded {
            let inner = field
                .as_record()
                .ok_or_else(|| not_a_record(schema, spec, field.type_label()))?;
            unbind_level(inner, out, declared, overflow, owner, cx)?;
            continue;
        }
        if spec.is_overflow() {
            let slot = field
                .as_any()
                .downcast_ref::<RawMap>()
                .ok_or_else(|| bad_overflow(schema, spec, field.type_label()))?;
            if overflow.is_some() {
                return Err(BindError::MultipleExtra { record: owner });
            }
            *overflow = Some(slot);
            continue;
        }

        declared.insert(spec.key.as_str());
        if spec.annotation.secret && cx.hides_secrets() {
            continue;
        }
        let scope = schema.field_scope(spec.name);
        let raw = cx
            .with_key(&spec.key, |cx| cx.with_field(scope, |cx| unbind_slot(field, cx)))
            .map_err(|err| wrap_unbinding(schema, spec, err))?;
        if let Some(raw) = raw {
            out.insert(spec.key.clone(), raw);
        }
    }
    Ok(())
}

/// Reset every non-skipped field to its zero value.
pub fn clear_record(record: &mut dyn Record) {
    let schema = record.schema();
    for (spec, field) in schema.fields().iter().zip(record.fields_mut()) {
        if !spec.annotation.skip {
            field.clear();
        }
    }
}

/// Walk every field for the linker.
pub fn visit_record(record: &mut dyn Record, visitor: &mut dyn LinkVisitor) {
    for field in record.fields_mut() {
        field.visit_links(visitor);
    }
}

fn wrap_binding(schema: &Schema, spec: &FieldSpec, err: BindError) -> BindError {
    if !err.is_leaf() {
        return err;
    }
    BindError::Binding {
        record: schema.name(),
        field: spec.name,
        key: spec.key.clone(),
        source: Box::new(err),
    }
}

fn wrap_unbinding(schema: &Schema, spec: &FieldSpec, err: BindError) -> BindError {
    if !err.is_leaf() {
        return err;
    }
    BindError::Unbinding {
        record: schema.name(),
        field: spec.name,
        key: spec.key.clone(),
        source: Box::new(err),
    }
}

fn not_a_record(schema: &Schema, spec: &FieldSpec, label: &str) -> BindError {
    BindError::Unsupported(format!(
        "{}.{} is declared embedded but {label} is not a record",
        schema.name(),
        spec.name
    ))
}

fn bad_overflow(schema: &Schema, spec: &FieldSpec, label: &str) -> BindError {
    BindError::Unsupported(format!(
        "{}.{} is declared +extra but {label} is not a mapping of string to raw value",
        schema.name(),
        spec.name
    ))
}
