//! One configuration, one registry: bind, load and link together.

use tether_bind::{bind_new, unbind, Options, RawMap, Record, Value};
use tether_config::{ConfigPath, Loader, Source};
use tether_link::{LinkReport, Linker, LinkerConfig};
use tracing::debug;

use crate::error::TetherResult;

/// Binds records with shared [`Options`] and registers them with one
/// [`Linker`], so records bound from different sources can reference each
/// other.
///
/// Records are registered as they are bound; [`Session::link`] resolves a
/// record's references against everything registered so far.
#[derive(Debug)]
pub struct Session {
    options: Options,
    linker: Linker,
}

impl Session {
    pub fn new(options: Options, config: LinkerConfig) -> Self {
        Self {
            options,
            linker: Linker::new(config),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn linker(&self) -> &Linker {
        &self.linker
    }

    /// Bind a new record from `raw` and register its identities.
    pub fn bind<R: Record + Default>(&mut self, raw: &Value) -> TetherResult<R> {
        let mut record: R = bind_new(raw, &self.options)?;
        let registered = self.linker.register(&mut record);
        debug!(record = record.schema().name(), registered, "session bound record");
        Ok(record)
    }

    /// Load a record from configuration layers and register its identities.
    pub fn load<R, S>(&mut self, source: S, paths: &[ConfigPath]) -> TetherResult<R>
    where
        R: Record + Default,
        S: Source,
    {
        let loader = Loader::new(source).with_options(self.options.clone());
        let mut record: R = loader.load(paths)?;
        let registered = self.linker.register(&mut record);
        debug!(record = record.schema().name(), registered, "session loaded record");
        Ok(record)
    }

    /// Register `record`, then resolve its references against everything
    /// this session has registered.
    pub fn link<R: Record>(&mut self, record: &mut R) -> TetherResult<LinkReport> {
        Ok(self.linker.link(&mut [record])?)
    }

    pub fn unbind<R: Record>(&self, record: &R) -> TetherResult<RawMap> {
        Ok(unbind(record, &self.options)?)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Options::default(), LinkerConfig::default())
    }
}

/// Load a record from configuration layers and resolve its references.
pub fn load_linked<R, S>(
    source: S,
    paths: &[ConfigPath],
    options: Options,
    config: LinkerConfig,
) -> TetherResult<R>
where
    R: Record + Default,
    S: Source,
{
    let mut session = Session::new(options, config);
    let mut record: R = session.load(source, paths)?;
    session.link(&mut record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::{BindError, LinkerConfig, MemorySource, PointerState, TetherError};
    use serde_json::json;

    record! {
        #[derive(Debug, Default)]
        struct Service {
            name: String => "name,+required",
            port: u16,
            depends_on: Vec<Pointer<Service>>,
            token: String => "+secret",
        }
    }

    impl Identifiable for Service {
        fn logical_id(&self) -> Option<&str> {
            Some(&self.name)
        }
    }

    record! {
        #[derive(Debug, Default)]
        struct Stack {
            services: Vec<Shared<Service>>,
            extra: RawMap => "+extra",
        }
    }

    #[test]
    fn bind_link_unbind() {
        let raw = json!({
            "services": [
                {"name": "api", "port": 8080, "depends_on": [{"$ref": "db"}], "token": "t0k"},
                {"name": "db", "port": 5432},
            ],
            "owner": "platform",
        });
        let mut session = Session::default();
        let mut stack: Stack = session.bind(&raw).unwrap();
        let report = session.link(&mut stack).unwrap();
        assert_eq!(report.resolved, 1);

        let api = stack.services[0].read();
        let db = api.depends_on[0].get().unwrap();
        assert_eq!(db.read().port, 5432);
        drop(api);

        let out = session.unbind(&stack).unwrap();
        assert_eq!(Value::Object(out), {
            let mut expected = raw.clone();
            expected["services"][1]["depends_on"] = json!([]);
            expected["services"][1]["token"] = json!("");
            expected
        });

        let view = inspect(&stack, session.options(), InspectOptions::default()).unwrap();
        assert!(view["services"][0].get("token").is_none());
    }

    #[test]
    fn references_resolve_across_sources() {
        let source = MemorySource::new()
            .with_file("core.yaml", "services:\n  - name: db\n    port: 5432\n")
            .with_file(
                "apps.json",
                r#"{"services": [{"name": "api", "depends_on": [{"$ref": "db"}]}]}"#,
            );
        let mut session = Session::new(Options::default(), LinkerConfig::strict());
        let _core: Stack = session
            .load(&source, &[ConfigPath::required("core.yaml")])
            .unwrap();
        let mut apps: Stack = session
            .load(&source, &[ConfigPath::required("apps.json")])
            .unwrap();
        session.link(&mut apps).unwrap();

        let api = apps.services[0].read();
        assert_eq!(api.depends_on[0].state(), PointerState::Resolved);
        assert!(session.linker().lookup::<Service>("db").is_some());
    }

    #[test]
    fn dangling_reference_surfaces_as_link_error() {
        let source = MemorySource::new().with_file(
            "apps.json",
            r#"{"services": [{"name": "api", "depends_on": [{"$ref": "cache"}]}]}"#,
        );
        let err = load_linked::<Stack, _>(
            &source,
            &[ConfigPath::required("apps.json")],
            Options::default(),
            LinkerConfig::strict(),
        )
        .unwrap_err();
        assert!(matches!(err, TetherError::Link(_)));

        let stack: Stack = load_linked(
            &source,
            &[ConfigPath::required("apps.json")],
            Options::default(),
            LinkerConfig::partial(),
        )
        .unwrap();
        assert_eq!(
            stack.services[0].read().depends_on[0].state(),
            PointerState::Unresolved
        );
    }

    #[test]
    fn bind_errors_are_wrapped() {
        let mut session = Session::default();
        let err = session
            .bind::<Stack>(&json!({"services": [{"port": 1}]}))
            .unwrap_err();
        assert!(matches!(err, TetherError::Bind(BindError::RequiredField { .. })));
    }
}
