//! Record descriptions and the macros that produce them.
//!
//! A record is described once by a [`Schema`]: its name and, per field, the
//! field name, the directive string and whether the field is an embedded
//! record whose fields are flattened into the parent. Directives are parsed
//! the first time the schema is requested and cached for the life of the
//! process.

use tether_types::{external_name, Annotation};

use crate::bindable::Bindable;

/// Static description of one field, as written in the record declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub directive: &'static str,
    pub embedded: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, directive: &'static str) -> Self {
        Self {
            name,
            directive,
            embedded: false,
        }
    }

    /// A field whose record fields are flattened into the parent.
    pub const fn embedded(name: &'static str) -> Self {
        Self {
            name,
            directive: "",
            embedded: true,
        }
    }
}

/// A field with its directive parsed and its external key resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub key: String,
    pub annotation: Annotation,
    pub embedded: bool,
}

impl FieldSpec {
    fn from_def(def: &FieldDef) -> Self {
        let annotation = Annotation::parse(def.directive);
        let default = external_name(def.name);
        let key = annotation.key_or(&default).to_string();
        Self {
            name: def.name,
            key,
            annotation,
            embedded: def.embedded,
        }
    }

    /// Whether unmatched keys at this record's level land in this field.
    pub fn is_overflow(&self) -> bool {
        !self.annotation.skip && self.annotation.overflow
    }
}

/// Parsed description of a record type.
#[derive(Clone, Debug)]
pub struct Schema {
    name: &'static str,
    module: &'static str,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(name: &'static str, defs: &[FieldDef]) -> Self {
        Self {
            name,
            module: "",
            fields: defs.iter().map(FieldSpec::from_def).collect(),
        }
    }

    /// Record the module path the type is declared in.
    pub fn in_module(mut self, module: &'static str) -> Self {
        self.module = module;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Scope of a field for field-level polymorphic constructors:
    /// `module::Record.field`, or `Record.field` without a module.
    pub fn field_scope(&self, field: &str) -> String {
        if self.module.is_empty() {
            format!("{}.{field}", self.name)
        } else {
            format!("{}::{}.{field}", self.module, self.name)
        }
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by its declared name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A record type: a schema plus access to its field slots.
///
/// `fields` and `fields_mut` return the slots in the same order as
/// [`Schema::fields`]. Implementations are normally generated by
/// [`record!`](crate::record) or [`impl_record!`](crate::impl_record).
pub trait Record: Bindable {
    fn schema(&self) -> &'static Schema;
    fn fields(&self) -> Vec<&dyn Bindable>;
    fn fields_mut(&mut self) -> Vec<&mut dyn Bindable>;
}

/// Implement [`Record`] and [`Bindable`] for an existing struct.
///
/// Each field is listed by name, optionally followed by `=> "directive"` or
/// `=> embed`:
///
/// ```
/// use tether_bind::impl_record;
///
/// #[derive(Default)]
/// struct Limits {
///     max_conns: u32,
/// }
/// impl_record!(Limits { max_conns });
///
/// #[derive(Default)]
/// struct Listener {
///     addr: String,
///     limits: Limits,
///     internal: u8,
/// }
/// impl_record!(Listener {
///     addr => "address,+required",
///     limits => embed,
///     internal => "-",
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ident { $($field:ident $(=> $how:tt)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn schema(&self) -> &'static $crate::Schema {
                static SCHEMA: ::std::sync::OnceLock<$crate::Schema> = ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::Schema::new(
                        ::std::stringify!($ty),
                        &[$($crate::__field_def!($field $(, $how)?)),*],
                    )
                    .in_module(::std::module_path!())
                })
            }

            fn fields(&self) -> ::std::vec::Vec<&dyn $crate::Bindable> {
                ::std::vec![$(&self.$field as &dyn $crate::Bindable),*]
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<&mut dyn $crate::Bindable> {
                ::std::vec![$(&mut self.$field as &mut dyn $crate::Bindable),*]
            }
        }

        impl $crate::Bindable for $ty {
            fn bind_value(
                &mut self,
                raw: &$crate::Value,
                cx: &mut $crate::Context<'_>,
            ) -> $crate::BindResult<()> {
                $crate::walker::bind_record(self, raw, cx)
            }

            fn unbind_value(
                &self,
                cx: &mut $crate::Context<'_>,
            ) -> $crate::BindResult<::std::option::Option<$crate::Value>> {
                $crate::walker::unbind_record(self, cx)
                    .map(|map| ::std::option::Option::Some($crate::Value::Object(map)))
            }

            fn clear(&mut self) {
                $crate::walker::clear_record(self)
            }

            fn visit_links(&mut self, visitor: &mut dyn $crate::LinkVisitor) {
                $crate::walker::visit_record(self, visitor)
            }

            fn as_record(&self) -> ::std::option::Option<&dyn $crate::Record> {
                ::std::option::Option::Some(self)
            }

            fn as_record_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::Record> {
                ::std::option::Option::Some(self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_def {
    ($field:ident) => {
        $crate::FieldDef::new(::std::stringify!($field), "")
    };
    ($field:ident, embed) => {
        $crate::FieldDef::embedded(::std::stringify!($field))
    };
    ($field:ident, $directive:literal) => {
        $crate::FieldDef::new(::std::stringify!($field), $directive)
    };
}

/// Declare a struct and implement [`Record`] for it in one step.
///
/// Field directives follow the field type after `=>`:
///
/// ```
/// use tether_bind::record;
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct Credentials {
///         /// Login name.
///         pub user: String => "username,+required",
///         pub token: String => "+secret",
///         pub extra: tether_bind::RawMap => "+extra",
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $(=> $how:tt)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        $crate::impl_record!($name { $($field $(=> $how)?),* });
    };
}
