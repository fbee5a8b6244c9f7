use crate::descriptor::Fields;
use crate::error::{ConfigError, ValidationError};
use crate::field::FieldType;
use crate::tree::StreamPosition;

/// A type that can be bound from a config tree.
///
/// [`describe`](Config::describe) registers the fields; the other two
/// methods are optional hooks. Loading starts from `Default::default()` with
/// registered defaults applied on top, so fields that are never registered
/// keep their `Default` value.
pub trait Config: Default + 'static {
    fn describe(fields: &mut Fields<Self>);

    /// Called for every tree entry that matches no registered field. Return
    /// `Ok(())` to ignore the entry; the default rejects it.
    fn handle_unregistered_field(
        kind: FieldType,
        name: &str,
        position: StreamPosition,
    ) -> Result<(), ConfigError> {
        Err(ConfigError::unknown_field(kind, name, position))
    }

    /// Runs after every field is loaded and validated.
    fn post_process(&mut self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Implement [`Config::describe`] by registering the listed struct fields
/// under their own names, with bindings inferred from their types.
///
/// ```
/// use figbind::{Config, ConfigReader, NameFormat, fields};
///
/// #[derive(Default)]
/// struct Limits {
///     max_connections: u32,
///     burst: Option<u32>,
/// }
///
/// impl Config for Limits {
///     fields!(max_connections, burst);
/// }
///
/// # #[cfg(feature = "toml")] {
/// let limits: Limits = ConfigReader::new()
///     .name_format(NameFormat::CamelCase)
///     .read_toml("maxConnections = 64")
///     .unwrap();
/// assert_eq!(limits.max_connections, 64);
/// assert_eq!(limits.burst, None);
/// # }
/// ```
#[macro_export]
macro_rules! fields {
    ($($field:ident),* $(,)?) => {
        fn describe(fields: &mut $crate::Fields<Self>) {
            $(
                fields.field(::core::stringify!($field), |cfg| &mut cfg.$field);
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ConfigDescriptor;
    use crate::field::FieldKind;

    #[derive(Default)]
    struct Plain {
        level: u8,
        names: Vec<String>,
    }

    impl Config for Plain {
        fields!(level, names);
    }

    #[test]
    fn macro_registers_fields_in_order() {
        let descriptor = ConfigDescriptor::<Plain>::of();
        let fields: Vec<(&str, FieldKind)> = descriptor
            .fields()
            .iter()
            .map(|f| (f.name(), f.kind()))
            .collect();
        assert_eq!(
            fields,
            vec![("level", FieldKind::Param), ("names", FieldKind::ParamList)]
        );
    }

    #[test]
    fn default_handler_rejects_unknown_entries() {
        let err = Plain::handle_unregistered_field(
            FieldType::Node,
            "extra",
            StreamPosition::new(2, 1),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "[line:2, column:1] Unknown node 'extra'");
    }

    #[test]
    fn default_post_process_accepts() {
        let mut plain = Plain::default();
        assert!(plain.post_process().is_ok());
        plain.level = 1;
        assert!(plain.names.is_empty());
    }
}
