//! Bind parsed config documents to typed Rust structs, with errors that
//! point at the line and column that caused them.
//!
//! Figbind sits between a format parser and your config types. A parser
//! turns text into a format-agnostic [`Tree`]; figbind walks the fields each
//! config type declares, matches them against the tree, converts the raw
//! strings, checks that nothing required is missing and nothing unknown is
//! present, runs validators, and hands back the typed value.
//!
//! ```
//! use figbind::{Config, ConfigReader, Fields, NameFormat};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     workers: Option<u32>,
//! }
//!
//! impl Config for Server {
//!     fn describe(fields: &mut Fields<Self>) {
//!         fields.param("host", |s| &mut s.host);
//!         fields.param("port", |s| &mut s.port).with_default(8080);
//!         fields.param("workers", |s| &mut s.workers);
//!     }
//! }
//!
//! # #[cfg(feature = "toml")] {
//! let server: Server = ConfigReader::new()
//!     .name_format(NameFormat::CamelCase)
//!     .read_toml("host = \"0.0.0.0\"")
//!     .unwrap();
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.workers, None);
//! # }
//! ```
//!
//! # Declaring fields
//!
//! A config type implements [`Config`], whose only required method,
//! [`describe`](Config::describe), registers fields on a [`Fields`]
//! builder. Each registration pairs a name with an accessor, a
//! non-capturing closure that projects the struct onto the field.
//!
//! There are two ways to register:
//!
//! - **Inferred**: [`Fields::field`] works out how to bind a field from its
//!   Rust type. The [`fields!`] macro goes one step further and registers a
//!   list of struct fields under their own names.
//! - **Explicit**: [`param`](Fields::param),
//!   [`param_list`](Fields::param_list), [`dict`](Fields::dict),
//!   [`node`](Fields::node), [`node_list`](Fields::node_list) and
//!   [`copy_node_list`](Fields::copy_node_list) state the binding directly.
//!
//! Both produce the same [`ConfigDescriptor`], and they can be mixed within
//! one type.
//!
//! # Field shapes
//!
//! | Rust type | Document shape |
//! |---|---|
//! | any [`StringConverter`] (`u16`, `String`, `bool`, `PathBuf`, ...) | a single value |
//! | `Vec<T>` with `T: StringConverter` | a list of values |
//! | `BTreeMap<String, V>` / `HashMap<String, V>` | a node whose params become entries, keys verbatim |
//! | `C: Config` | a nested node |
//! | `Vec<C>` | a list of nested nodes |
//! | [`CopyNodeList<C>`] | a list of nested nodes, each inheriting from the one before |
//!
//! Wrapping any of these in `Option` makes the field optional. So do
//! [`optional()`](FieldHandle::optional) and
//! [`with_default()`](FieldHandle::with_default). Absent optional fields
//! keep their default value; absent required fields fail the load.
//!
//! Your own scalar types become params by implementing [`StringConverter`].
//!
//! # Names
//!
//! Fields are declared with their Rust names. [`NameFormat`] decides how
//! those names are spelled in documents: with
//! [`NameFormat::CamelCase`], a field registered as `pool_size` matches
//! `poolSize`. Dictionary keys are never converted.
//!
//! # Loading order
//!
//! For each config object, nested nodes are loaded first, then params, both
//! in document order. After that:
//!
//! 1. Required fields are checked, params before nodes, each in name order.
//!    The first missing one fails the load.
//! 2. Validators attached with [`ensure`](FieldHandle::ensure) or
//!    [`ensure_with`](FieldHandle::ensure_with) run in registration order.
//! 3. [`Config::post_process`] runs.
//!
//! Nested configs go through the same steps before their parent continues.
//! The first failure anywhere ends the read; there are no partial results.
//!
//! # Unknown entries
//!
//! A tree entry that matches no registered field is an error:
//!
//! ```text
//! [line:3, column:3] Unknown param 'unregisteredField'
//! ```
//!
//! Override [`Config::handle_unregistered_field`] to ignore such entries
//! for one type. The override applies to that type only; nested types keep
//! their own behavior.
//!
//! # Document shape
//!
//! A document whose root is an item reads into one config with
//! [`ConfigReader::read`]. A root list reads into a `Vec` with
//! [`ConfigReader::read_list`]. Calling `read` on a list-rooted document
//! fails with [`ConfigError::RootShape`] rather than silently picking one
//! element.
//!
//! # Parsers
//!
//! Any [`Parser`] can feed the reader. The `toml` feature (on by default)
//! provides [`TomlParser`] plus the [`read_toml`](ConfigReader::read_toml)
//! shortcuts.
//!
//! # Error handling
//!
//! Every fallible operation returns [`ConfigError`]. File access problems
//! (`FileNotFound`, `NotARegularFile`, `Io`) are reported before parsing.
//! Everything else carries a message chain, outer context first, and the
//! position of the entry that caused it:
//!
//! ```text
//! [line:4, column:1] Node 'database': Parameter 'url' is missing.
//! [line:9, column:1] Couldn't set parameter 'port' value from 'http': invalid digit found in string
//! ```
//!
//! With the `rich-errors` feature, [`ConfigError`] also implements
//! `miette::Diagnostic`.
//!
//! # Logging
//!
//! Figbind emits `tracing` events at `debug` and `trace` level (tree shape,
//! each config object loaded, unregistered entries that were ignored). It
//! never installs a subscriber.

pub mod error;
pub mod tree;
pub mod validator;

mod binder;
mod config;
mod convert;
mod descriptor;
mod field;
mod loader;
mod name_format;
mod parser;
mod reader;
#[cfg(feature = "toml")]
mod toml;

#[cfg(test)]
mod fixtures;

pub use config::Config;
pub use convert::{StringConversionError, StringConverter};
pub use descriptor::{ConfigDescriptor, FieldDescriptor, FieldHandle, Fields};
pub use error::{ConfigError, ValidationError};
pub use field::{
    Accessor, CopyNodeList, DictSlot, Field, FieldKind, FieldType, NodeListSlot, NodeSlot,
    ParamListSlot, marker,
};
pub use name_format::{NameFormat, convert_name};
pub use parser::Parser;
pub use reader::ConfigReader;
#[cfg(feature = "toml")]
pub use toml::TomlParser;
pub use tree::{StreamPosition, Tree, TreeItem, TreeNode, TreeParam};
pub use validator::{InRange, NotEmpty, Validator};
