//! Field registration and the resulting per-type descriptor.

use std::fmt;

use crate::binder::{Binder, clone_previous};
use crate::config::Config;
use crate::convert::StringConverter;
use crate::error::ValidationError;
use crate::field::{
    Accessor, Binding, DictSlot, Field, FieldKind, NodeListSlot, NodeSlot, ParamListSlot,
};
use crate::validator::Validator;

type DefaultFn<C> = Box<dyn Fn(&mut C)>;
type ValidatorFn<C> = Box<dyn Fn(&mut C) -> Result<(), ValidationError>>;

/// One declared field of a config type.
pub struct FieldDescriptor<C> {
    name: String,
    kind: FieldKind,
    optional: bool,
    default: Option<DefaultFn<C>>,
    validators: Vec<ValidatorFn<C>>,
    binder: Binder<C>,
}

impl<C> FieldDescriptor<C> {
    /// The name as declared, before any name format is applied.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn binder(&self) -> &Binder<C> {
        &self.binder
    }

    pub(crate) fn validators(&self) -> &[ValidatorFn<C>] {
        &self.validators
    }
}

impl<C> fmt::Debug for FieldDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("has_default", &self.default.is_some())
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// The ordered field list of a config type, as produced by
/// [`Config::describe`].
#[derive(Debug)]
pub struct ConfigDescriptor<C> {
    fields: Vec<FieldDescriptor<C>>,
}

impl<C: Config> ConfigDescriptor<C> {
    pub fn of() -> Self {
        let mut fields = Fields { fields: Vec::new() };
        C::describe(&mut fields);
        Self {
            fields: fields.fields,
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor<C>] {
        &self.fields
    }

    pub(crate) fn instantiate(&self) -> C {
        let mut cfg = C::default();
        self.apply_defaults(&mut cfg);
        cfg
    }

    /// Write registered defaults into `cfg`. Nested configs without an
    /// explicit default get their own registered defaults.
    pub(crate) fn apply_defaults(&self, cfg: &mut C) {
        for field in &self.fields {
            match (&field.default, &field.binder) {
                (Some(apply), _) => apply(cfg),
                (None, Binder::Node(binder)) => binder.apply_defaults(cfg),
                (None, Binder::Param(_)) => {}
            }
        }
    }
}

/// `C::default()` with every registered default applied, recursively.
pub(crate) fn instantiate<C: Config>() -> C {
    ConfigDescriptor::<C>::of().instantiate()
}

/// Registration builder handed to [`Config::describe`].
///
/// Fields are bound through accessors, plain non-capturing closures that
/// project the config to one of its fields:
///
/// ```
/// use figbind::{Config, Fields};
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
///     aliases: Vec<String>,
/// }
///
/// impl Config for Server {
///     fn describe(fields: &mut Fields<Self>) {
///         fields.param("host", |s| &mut s.host);
///         fields.param("port", |s| &mut s.port).with_default(8080);
///         fields.field("aliases", |s| &mut s.aliases).optional();
///     }
/// }
/// ```
///
/// [`field`](Fields::field) infers the binding from the field's type; the
/// other methods state it. Registration order is the order validators run
/// in.
pub struct Fields<C> {
    fields: Vec<FieldDescriptor<C>>,
}

impl<C: Config> Fields<C> {
    /// Register a field whose binding is inferred from its type.
    pub fn field<F: Field<M>, M>(
        &mut self,
        name: impl Into<String>,
        access: Accessor<C, F>,
    ) -> FieldHandle<'_, C, F> {
        self.push(name.into(), F::KIND, F::OPTIONAL, F::binding(access), access)
    }

    /// A single converted value.
    pub fn param<T: StringConverter + 'static>(
        &mut self,
        name: impl Into<String>,
        access: Accessor<C, T>,
    ) -> FieldHandle<'_, C, T> {
        self.push(
            name.into(),
            FieldKind::Param,
            T::OPTIONAL,
            Binding::param(access),
            access,
        )
    }

    /// A list of converted values.
    pub fn param_list<L: ParamListSlot>(
        &mut self,
        name: impl Into<String>,
        access: Accessor<C, L>,
    ) -> FieldHandle<'_, C, L> {
        self.push(
            name.into(),
            FieldKind::ParamList,
            L::OPTIONAL,
            Binding::param_list(access),
            access,
        )
    }

    /// A node whose params become map entries, keyed verbatim.
    pub fn dict<D: DictSlot>(
        &mut self,
        name: impl Into<String>,
        access: Accessor<C, D>,
    ) -> FieldHandle<'_, C, D> {
        self.push(
            name.into(),
            FieldKind::Dict,
            D::OPTIONAL,
            Binding::dict(access),
            access,
        )
    }

    /// A nested config, or an optional one.
    pub fn node<N: NodeSlot<M>, M: 'static>(
        &mut self,
        name: impl Into<String>,
        access: Accessor<C, N>,
    ) -> FieldHandle<'_, C, N> {
        self.push(
            name.into(),
            FieldKind::Node,
            N::OPTIONAL,
            Binding::node::<N, M>(access),
            access,
        )
    }

    /// A list of nested configs.
    pub fn node_list<L: NodeListSlot>(
        &mut self,
        name: impl Into<String>,
        access: Accessor<C, L>,
    ) -> FieldHandle<'_, C, L> {
        let kind = if L::COPY {
            FieldKind::NodeListCopy
        } else {
            FieldKind::NodeList
        };
        self.push(
            name.into(),
            kind,
            L::OPTIONAL,
            Binding::node_list(access, L::inherit),
            access,
        )
    }

    /// A list of nested configs where each entry starts as a copy of the
    /// entry before it.
    pub fn copy_node_list<E: Config + Clone>(
        &mut self,
        name: impl Into<String>,
        access: Accessor<C, Vec<E>>,
    ) -> FieldHandle<'_, C, Vec<E>> {
        self.push(
            name.into(),
            FieldKind::NodeListCopy,
            false,
            Binding::node_list(access, clone_previous::<E>),
            access,
        )
    }

    fn push<T: 'static>(
        &mut self,
        name: String,
        kind: FieldKind,
        optional: bool,
        binding: Binding<C>,
        access: Accessor<C, T>,
    ) -> FieldHandle<'_, C, T> {
        assert!(!name.is_empty(), "config field name can't be empty");
        assert!(
            !self
                .fields
                .iter()
                .any(|field| field.name == name && field.kind.is_param() == kind.is_param()),
            "config field '{name}' is declared more than once"
        );
        self.fields.push(FieldDescriptor {
            name,
            kind,
            optional,
            default: None,
            validators: Vec::new(),
            binder: binding.0,
        });
        let index = self.fields.len() - 1;
        FieldHandle {
            field: &mut self.fields[index],
            access,
        }
    }
}

/// Options for a field that was just registered.
pub struct FieldHandle<'f, C, T> {
    field: &'f mut FieldDescriptor<C>,
    access: Accessor<C, T>,
}

impl<C: 'static, T: 'static> FieldHandle<'_, C, T> {
    /// Absence from the document is not an error.
    pub fn optional(self) -> Self {
        self.field.optional = true;
        self
    }

    /// Value used when the document doesn't set the field. Implies
    /// [`optional`](Self::optional).
    pub fn with_default(self, value: T) -> Self
    where
        T: Clone,
    {
        let access = self.access;
        self.field.default = Some(Box::new(move |cfg: &mut C| *access(cfg) = value.clone()));
        self.field.optional = true;
        self
    }

    /// Attach a check that runs on the bound value once every field is
    /// loaded.
    pub fn ensure<F>(self, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), ValidationError> + 'static,
    {
        let access = self.access;
        self.field
            .validators
            .push(Box::new(move |cfg: &mut C| check(&*access(cfg))));
        self
    }

    /// Attach a reusable [`Validator`].
    pub fn ensure_with<V: Validator<T> + 'static>(self, validator: V) -> Self {
        self.ensure(move |value| validator.validate(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{C, Fleet, Service};
    use crate::validator::NotEmpty;

    #[test]
    fn descriptor_keeps_declaration_order() {
        let descriptor = ConfigDescriptor::<C>::of();
        let names: Vec<&str> = descriptor.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["test_int", "test_double", "b"]);
    }

    #[test]
    fn defaults_mark_fields_optional() {
        let descriptor = ConfigDescriptor::<C>::of();
        let fields = descriptor.fields();
        assert!(fields[0].is_optional());
        assert!(fields[0].has_default());
        assert!(!fields[2].is_optional());
        assert_eq!(fields[2].kind(), FieldKind::Node);
    }

    #[test]
    fn instantiate_applies_defaults_recursively() {
        let cfg: C = instantiate();
        assert_eq!(cfg.test_int, 9);
        assert_eq!(cfg.test_double, 9.0);

        let service: Service = instantiate();
        assert_eq!(service.address.protocol, "tcp");
    }

    #[test]
    fn explicit_and_inferred_registration_agree() {
        let descriptor = ConfigDescriptor::<Fleet>::of();
        let kinds: Vec<(&str, FieldKind)> = descriptor
            .fields()
            .iter()
            .map(|f| (f.name(), f.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("name", FieldKind::Param),
                ("tags", FieldKind::ParamList),
                ("labels", FieldKind::Dict),
                ("endpoints", FieldKind::NodeList),
                ("shapes", FieldKind::NodeListCopy),
                ("backup", FieldKind::Node),
            ]
        );
    }

    #[test]
    fn validators_run_against_bound_value() {
        #[derive(Default)]
        struct Named {
            name: String,
        }
        impl Config for Named {
            fn describe(fields: &mut Fields<Self>) {
                fields.param("name", |n| &mut n.name).ensure_with(NotEmpty);
            }
        }

        let descriptor = ConfigDescriptor::<Named>::of();
        let validators = descriptor.fields()[0].validators();
        let mut cfg = Named::default();
        assert!(validators[0](&mut cfg).is_err());
        cfg.name = "x".into();
        assert!(validators[0](&mut cfg).is_ok());
    }

    #[test]
    #[should_panic(expected = "config field name can't be empty")]
    fn empty_name_is_rejected() {
        #[derive(Default)]
        struct Nameless {
            value: i32,
        }
        impl Config for Nameless {
            fn describe(fields: &mut Fields<Self>) {
                fields.param("", |n| &mut n.value);
            }
        }
        ConfigDescriptor::<Nameless>::of();
    }

    #[test]
    #[should_panic(expected = "config field 'port' is declared more than once")]
    fn duplicate_name_is_rejected() {
        #[derive(Default)]
        struct Twice {
            port: u16,
            backup_port: u16,
        }
        impl Config for Twice {
            fn describe(fields: &mut Fields<Self>) {
                fields.param("port", |t| &mut t.port);
                fields.param("port", |t| &mut t.backup_port);
            }
        }
        ConfigDescriptor::<Twice>::of();
    }
}
