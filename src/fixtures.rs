#[cfg(test)]
pub mod test {
    use std::collections::BTreeMap;

    use crate::config::Config;
    use crate::descriptor::Fields;
    use crate::error::{ConfigError, ValidationError};
    use crate::field::{CopyNodeList, FieldType};
    use crate::parser::Parser;
    use crate::tree::{StreamPosition, Tree};
    use crate::validator::NotEmpty;

    pub fn pos(line: usize, column: usize) -> StreamPosition {
        StreamPosition::new(line, column)
    }

    /// Parser that ignores its input and hands out a prepared tree.
    pub struct TreeProvider {
        tree: Option<Tree>,
        last_content: Option<String>,
    }

    impl TreeProvider {
        pub fn new(tree: Tree) -> Self {
            Self {
                tree: Some(tree),
                last_content: None,
            }
        }

        /// A provider with nothing to provide; every parse fails.
        pub fn empty() -> Self {
            Self {
                tree: None,
                last_content: None,
            }
        }

        pub fn last_content(&self) -> Option<&str> {
            self.last_content.as_deref()
        }
    }

    impl Parser for TreeProvider {
        fn parse(&mut self, content: &str) -> Result<Tree, ConfigError> {
            self.last_content = Some(content.to_string());
            self.tree
                .clone()
                .ok_or_else(|| ConfigError::parse("no tree to provide", None))
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct A {
        pub foo: i32,
        pub bar: String,
        pub b: B,
    }

    impl Config for A {
        crate::fields!(foo, bar, b);
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct B {
        pub test_int: i32,
        pub test_string: String,
    }

    impl Config for B {
        fn describe(fields: &mut Fields<Self>) {
            fields.field("test_int", |b| &mut b.test_int);
            fields
                .field("test_string", |b| &mut b.test_string)
                .with_default(String::new());
        }

        fn handle_unregistered_field(
            _kind: FieldType,
            _name: &str,
            _position: StreamPosition,
        ) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct C {
        pub test_int: i32,
        pub test_double: f64,
        pub b: B,
    }

    impl Config for C {
        fn describe(fields: &mut Fields<Self>) {
            fields.field("test_int", |c| &mut c.test_int).with_default(9);
            fields
                .field("test_double", |c| &mut c.test_double)
                .with_default(9.0);
            fields.node("b", |c| &mut c.b);
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Endpoint {
        pub host: String,
        pub port: u16,
        pub protocol: String,
    }

    impl Config for Endpoint {
        fn describe(fields: &mut Fields<Self>) {
            fields.param("host", |e| &mut e.host);
            fields.param("port", |e| &mut e.port).ensure(|port| {
                if *port == 0 {
                    Err(ValidationError::new("port must be positive"))
                } else {
                    Ok(())
                }
            });
            fields
                .param("protocol", |e| &mut e.protocol)
                .with_default("tcp".to_string());
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Service {
        pub name: String,
        pub address: Endpoint,
    }

    impl Config for Service {
        fn describe(fields: &mut Fields<Self>) {
            fields.param("name", |s| &mut s.name);
            fields.node("address", |s| &mut s.address);
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Shape {
        pub kind: String,
        pub color: String,
        pub size: Option<u32>,
    }

    impl Config for Shape {
        crate::fields!(kind, color, size);
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Fleet {
        pub name: String,
        pub tags: Vec<String>,
        pub labels: BTreeMap<String, String>,
        pub endpoints: Vec<Endpoint>,
        pub shapes: CopyNodeList<Shape>,
        pub backup: Option<Endpoint>,
    }

    impl Config for Fleet {
        fn describe(fields: &mut Fields<Self>) {
            fields.field("name", |f| &mut f.name).ensure_with(NotEmpty);
            fields.param_list("tags", |f| &mut f.tags).optional();
            fields.dict("labels", |f| &mut f.labels).optional();
            fields.field("endpoints", |f| &mut f.endpoints);
            fields.field("shapes", |f| &mut f.shapes).optional();
            fields.node("backup", |f| &mut f.backup);
        }

        fn post_process(&mut self) -> Result<(), ValidationError> {
            match &self.backup {
                Some(backup) if self.endpoints.iter().any(|e| e.host == backup.host) => Err(
                    ValidationError::new(format!(
                        "backup host '{}' is also a primary endpoint",
                        backup.host
                    )),
                ),
                _ => Ok(()),
            }
        }
    }

    #[cfg(feature = "toml")]
    mod toml_documents {
        use super::*;
        use crate::name_format::NameFormat;
        use crate::reader::ConfigReader;

        const FLEET: &str = r#"name = "edge"
tags = ["eu", "prod"]

[labels]
team = "infra"
tier = "1"

[[endpoints]]
host = "a.example"
port = 443

[[endpoints]]
host = "b.example"
port = 8443
protocol = "udp"

[[shapes]]
kind = "circle"
color = "red"
size = 3

[[shapes]]
kind = "square"

[backup]
host = "c.example"
port = 80
"#;

        fn camel() -> ConfigReader {
            ConfigReader::new().name_format(NameFormat::CamelCase)
        }

        #[test]
        fn unregistered_field_in_suppressing_node_is_ignored() {
            let cfg: A = camel()
                .read_toml("foo = 5\nbar = \"test\"\n\n[b]\ntestInt = 9\nunregisteredField = 42\n")
                .unwrap();
            assert_eq!(cfg.foo, 5);
            assert_eq!(cfg.bar, "test");
            assert_eq!(cfg.b.test_int, 9);
            assert_eq!(cfg.b.test_string, "");
        }

        #[test]
        fn unregistered_top_level_field_is_an_error() {
            let err = camel()
                .read_toml::<A>(
                    "foo = 5\nbar = \"test\"\n  unregisteredField = 42\n\n[b]\ntestInt = 9\n",
                )
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "[line:3, column:3] Unknown param 'unregisteredField'"
            );
        }

        #[test]
        fn every_field_shape_binds() {
            let fleet: Fleet = ConfigReader::new().read_toml(FLEET).unwrap();
            assert_eq!(fleet.name, "edge");
            assert_eq!(fleet.tags, vec!["eu", "prod"]);
            assert_eq!(fleet.labels.get("tier").map(String::as_str), Some("1"));
            assert_eq!(fleet.endpoints.len(), 2);
            assert_eq!(fleet.endpoints[0].protocol, "tcp");
            assert_eq!(fleet.endpoints[1].protocol, "udp");
            assert_eq!(fleet.backup.as_ref().map(|b| b.port), Some(80));
            assert_eq!(
                fleet.backup.as_ref().map(|b| b.protocol.as_str()),
                Some("tcp")
            );
        }

        #[test]
        fn copy_node_list_entries_inherit_previous() {
            let fleet: Fleet = ConfigReader::new().read_toml(FLEET).unwrap();
            assert_eq!(fleet.shapes.len(), 2);
            assert_eq!(
                fleet.shapes[1],
                Shape {
                    kind: "square".into(),
                    color: "red".into(),
                    size: Some(3),
                }
            );
        }

        #[test]
        fn optional_fields_may_be_absent() {
            let fleet: Fleet = ConfigReader::new()
                .read_toml("name = \"x\"\n\n[[endpoints]]\nhost = \"h\"\nport = 1\n")
                .unwrap();
            assert!(fleet.tags.is_empty());
            assert!(fleet.labels.is_empty());
            assert!(fleet.shapes.is_empty());
            assert_eq!(fleet.backup, None);
        }

        #[test]
        fn empty_arrays_bind_as_empty_node_lists() {
            let fleet: Fleet = ConfigReader::new()
                .read_toml("name = \"x\"\nendpoints = []\nshapes = []\n")
                .unwrap();
            assert!(fleet.endpoints.is_empty());
            assert!(fleet.shapes.is_empty());
        }

        #[test]
        fn node_table_for_a_node_list_is_rejected() {
            let err = ConfigReader::new()
                .read_toml::<Fleet>("name = \"x\"\n\n[endpoints]\nhost = \"h\"\nport = 1\n")
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "[line:3, column:1] Node list 'endpoints': config node must be a list."
            );
        }

        #[test]
        fn array_of_tables_for_a_node_is_rejected() {
            let err = ConfigReader::new()
                .read_toml::<Service>("name = \"x\"\n\n[[address]]\nhost = \"h\"\nport = 1\n")
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "[line:3, column:3] Node 'address': config node can't be a list."
            );
        }

        #[test]
        fn missing_field_in_node_list_names_the_list() {
            let err = ConfigReader::new()
                .read_toml::<Fleet>("name = \"x\"\n\n[[endpoints]]\nhost = \"h\"\n")
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "[line:3, column:1] Node list 'endpoints': Parameter 'port' is missing."
            );
        }

        #[test]
        fn conversion_error_points_at_the_value() {
            let err = ConfigReader::new()
                .read_toml::<Fleet>("name = \"x\"\n\n[[endpoints]]\nhost = \"h\"\nport = \"http\"\n")
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "[line:5, column:1] Couldn't set parameter 'port' value from 'http': invalid digit found in string"
            );
        }

        #[test]
        fn validator_rejects_empty_name() {
            let err = ConfigReader::new()
                .read_toml::<Fleet>("name = \"\"\n\n[[endpoints]]\nhost = \"h\"\nport = 1\n")
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "[line:1, column:1] Config is invalid: Parameter 'name': value can't be empty"
            );
        }

        #[test]
        fn post_process_runs_last() {
            let err = ConfigReader::new()
                .read_toml::<Fleet>(
                    "name = \"x\"\n\n[[endpoints]]\nhost = \"h\"\nport = 1\n\n[backup]\nhost = \"h\"\nport = 2\n",
                )
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Config is invalid: backup host 'h' is also a primary endpoint"
            );
        }

        #[test]
        fn missing_required_list_is_reported_at_root() {
            let err = ConfigReader::new()
                .read_toml::<Fleet>("name = \"x\"\n")
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "[line:1, column:1] Root node: Node 'endpoints' is missing."
            );
        }

        #[test]
        fn reads_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("fleet.toml");
            std::fs::write(&path, FLEET).unwrap();
            let fleet: Fleet = ConfigReader::new().read_toml_file(&path).unwrap();
            assert_eq!(fleet.name, "edge");
        }
    }
}
