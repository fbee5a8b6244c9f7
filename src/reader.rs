//! Top-level entry point: parse a document and bind it.
//!
//! A document whose root is an item binds to one config; a root list binds
//! to one config per element. File and stream access is checked before any
//! parsing happens.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::config::Config;
use crate::error::ConfigError;
use crate::loader::{LoadFailure, Loader};
use crate::name_format::NameFormat;
use crate::parser::Parser;
use crate::tree::{Tree, TreeNode};

/// Reads config documents into [`Config`] types.
///
/// ```
/// use figbind::{ConfigReader, NameFormat};
///
/// let reader = ConfigReader::new().name_format(NameFormat::CamelCase);
/// # let _ = reader;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigReader {
    name_format: NameFormat,
}

impl ConfigReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// How declared field names are spelled in documents. Defaults to
    /// [`NameFormat::Original`]. Dictionary keys are never converted.
    pub fn name_format(mut self, name_format: NameFormat) -> Self {
        self.name_format = name_format;
        self
    }

    /// Bind a single-root document.
    pub fn read<C: Config>(
        &self,
        content: &str,
        parser: &mut impl Parser,
    ) -> Result<C, ConfigError> {
        let tree = parser.parse(content)?;
        self.read_tree(&tree)
    }

    /// Bind every element of a list-root document. An item root yields one
    /// config.
    pub fn read_list<C: Config>(
        &self,
        content: &str,
        parser: &mut impl Parser,
    ) -> Result<Vec<C>, ConfigError> {
        let tree = parser.parse(content)?;
        self.read_list_tree(&tree)
    }

    pub fn read_from<C: Config>(
        &self,
        source: impl Read,
        parser: &mut impl Parser,
    ) -> Result<C, ConfigError> {
        let content = read_stream(source)?;
        self.read(&content, parser)
    }

    pub fn read_list_from<C: Config>(
        &self,
        source: impl Read,
        parser: &mut impl Parser,
    ) -> Result<Vec<C>, ConfigError> {
        let content = read_stream(source)?;
        self.read_list(&content, parser)
    }

    pub fn read_file<C: Config>(
        &self,
        path: impl AsRef<Path>,
        parser: &mut impl Parser,
    ) -> Result<C, ConfigError> {
        let content = read_config_file(path.as_ref())?;
        self.read(&content, parser)
    }

    pub fn read_list_file<C: Config>(
        &self,
        path: impl AsRef<Path>,
        parser: &mut impl Parser,
    ) -> Result<Vec<C>, ConfigError> {
        let content = read_config_file(path.as_ref())?;
        self.read_list(&content, parser)
    }

    /// Bind an already parsed single-root tree.
    pub fn read_tree<C: Config>(&self, tree: &Tree) -> Result<C, ConfigError> {
        let root = tree.root();
        tracing::debug!(
            config = std::any::type_name::<C>(),
            list = root.is_list(),
            "binding config tree"
        );
        if root.is_list() {
            return Err(ConfigError::RootShape);
        }
        let mut loader = Loader::new(self.name_format);
        read_config(&mut loader, root)
    }

    /// Bind an already parsed tree, one config per root element.
    pub fn read_list_tree<C: Config>(&self, tree: &Tree) -> Result<Vec<C>, ConfigError> {
        let root = tree.root();
        tracing::debug!(
            config = std::any::type_name::<C>(),
            list = root.is_list(),
            "binding config tree list"
        );
        let mut loader = Loader::new(self.name_format);
        match root.as_list() {
            Some(nodes) => nodes
                .iter()
                .map(|node| read_config(&mut loader, node))
                .collect(),
            None => Ok(vec![read_config(&mut loader, root)?]),
        }
    }

    #[cfg(feature = "toml")]
    pub fn read_toml<C: Config>(&self, content: &str) -> Result<C, ConfigError> {
        self.read(content, &mut crate::toml::TomlParser::new())
    }

    #[cfg(feature = "toml")]
    pub fn read_toml_file<C: Config>(&self, path: impl AsRef<Path>) -> Result<C, ConfigError> {
        self.read_file(path, &mut crate::toml::TomlParser::new())
    }
}

fn read_config<C: Config>(loader: &mut Loader<C>, node: &TreeNode) -> Result<C, ConfigError> {
    let mut cfg = loader.instantiate();
    loader.load(&mut cfg, node).map_err(|failure| match failure {
        LoadFailure::Incomplete(message) => {
            ConfigError::load(format!("Root node: {message}"), node.position())
        }
        LoadFailure::Fatal(err) => err,
    })?;
    Ok(cfg)
}

fn read_stream(mut source: impl Read) -> Result<String, ConfigError> {
    let mut content = String::new();
    source
        .read_to_string(&mut content)
        .map_err(ConfigError::Stream)?;
    Ok(content)
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ConfigError::NotARegularFile(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
