//! Entry points: bind, merge, unbind and the inspection view.

use tether_types::{kind_name, RawMap, Value};
use tracing::debug;

use crate::context::{Context, InspectOptions, Mode};
use crate::error::{BindError, BindResult};
use crate::options::Options;
use crate::record::Record;
use crate::walker::{bind_record, unbind_record};

fn expect_mapping<'v>(raw: &'v Value, op: &str, record: &str) -> BindResult<&'v Value> {
    if raw.is_object() {
        Ok(raw)
    } else {
        Err(BindError::Validation(format!(
            "{op} into {record} needs a mapping, got a {}",
            kind_name(raw)
        )))
    }
}

/// Bind `raw` into `record`.
///
/// Fields whose key is absent are reset to their zero value and `+required`
/// fields must be present. Fields written before a failing field stay
/// written; bind into a fresh record when that matters (see [`bind_new`]).
pub fn bind<R: Record>(record: &mut R, raw: &Value, options: &Options) -> BindResult<()> {
    let name = record.schema().name();
    let raw = expect_mapping(raw, "bind", name)?;
    let mut cx = Context::new(options, Mode::Bind);
    bind_record(record, raw, &mut cx)?;
    debug!(record = name, "bound record");
    Ok(())
}

/// Bind `raw` into a default-constructed record.
pub fn bind_new<R: Record + Default>(raw: &Value, options: &Options) -> BindResult<R> {
    let mut record = R::default();
    bind(&mut record, raw, options)?;
    Ok(record)
}

/// Apply a partial mapping over an existing record.
///
/// Only fields whose key is present are touched. Containers present in the
/// mapping are replaced in full; overflow keys are added to the existing
/// overflow mapping.
pub fn merge<R: Record>(record: &mut R, raw: &Value, options: &Options) -> BindResult<()> {
    let name = record.schema().name();
    let raw = expect_mapping(raw, "merge", name)?;
    let mut cx = Context::new(options, Mode::Merge);
    bind_record(record, raw, &mut cx)?;
    debug!(record = name, keys = raw.as_object().map_or(0, |m| m.len()), "merged record");
    Ok(())
}

/// Convert a record to a raw mapping. Secret fields are included.
pub fn unbind<R: Record>(record: &R, options: &Options) -> BindResult<RawMap> {
    let mut cx = Context::new(options, Mode::Bind);
    unbind_record(record, &mut cx)
}

/// The human-readable view of a record: like [`unbind`], but `+secret`
/// fields are left out unless `inspect.show_secrets` is set.
pub fn inspect<R: Record>(
    record: &R,
    options: &Options,
    inspect: InspectOptions,
) -> BindResult<RawMap> {
    let mut cx = Context::inspecting(options, inspect);
    unbind_record(record, &mut cx)
}
