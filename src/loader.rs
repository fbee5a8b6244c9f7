//! Per-object loading.
//!
//! A [`Loader`] binds one tree item to one config value:
//!
//! 1. **Registration**: every declared field goes into the param table or
//!    the node table under its name-formatted key. Optional fields (and, for
//!    inherited list entries, every field) start out as having a value.
//! 2. **Resolution**: the item's nodes, then its params, are matched against
//!    the tables and handed to their binders. Entries with no field go to
//!    [`Config::handle_unregistered_field`].
//! 3. **Completeness**: the first table entry still without a value fails
//!    the load.
//! 4. **Validation**: field validators run in declaration order.
//! 5. **Post-processing**: [`Config::post_process`] runs last.
//!
//! The first failure ends the load.

use std::any::type_name;
use std::collections::BTreeMap;

use crate::binder::Binder;
use crate::config::Config;
use crate::descriptor::ConfigDescriptor;
use crate::error::ConfigError;
use crate::field::{FieldKind, FieldType};
use crate::name_format::{NameFormat, convert_name};
use crate::tree::{StreamPosition, TreeItem, TreeNode, TreeParam};

/// How a load ended when it did not succeed.
#[derive(Debug)]
pub(crate) enum LoadFailure {
    /// A required field is missing. Carries no position; the caller that
    /// knows which node was being loaded adds it.
    Incomplete(String),
    Fatal(ConfigError),
}

impl From<ConfigError> for LoadFailure {
    fn from(err: ConfigError) -> Self {
        LoadFailure::Fatal(err)
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldState {
    has_value: bool,
    position: Option<StreamPosition>,
}

pub(crate) struct Loader<C: Config> {
    descriptor: ConfigDescriptor<C>,
    name_format: NameFormat,
    params: BTreeMap<String, usize>,
    nodes: BTreeMap<String, usize>,
    states: Vec<FieldState>,
}

impl<C: Config> Loader<C> {
    pub(crate) fn new(name_format: NameFormat) -> Self {
        Self {
            descriptor: ConfigDescriptor::of(),
            name_format,
            params: BTreeMap::new(),
            nodes: BTreeMap::new(),
            states: Vec::new(),
        }
    }

    /// A fresh value with every registered default applied.
    pub(crate) fn instantiate(&self) -> C {
        self.descriptor.instantiate()
    }

    pub(crate) fn load(&mut self, cfg: &mut C, node: &TreeNode) -> Result<(), LoadFailure> {
        self.run(cfg, node, false)
    }

    /// Load over a value copied from a previous list entry. Every field is
    /// already considered set, so the entry only overrides what it names.
    pub(crate) fn load_inherited(
        &mut self,
        cfg: &mut C,
        node: &TreeNode,
    ) -> Result<(), LoadFailure> {
        self.run(cfg, node, true)
    }

    fn run(&mut self, cfg: &mut C, node: &TreeNode, inherited: bool) -> Result<(), LoadFailure> {
        let Some(item) = node.as_item() else {
            return Err(ConfigError::load("Config node can't be a list.", node.position()).into());
        };
        tracing::trace!(
            config = type_name::<C>(),
            params = item.param_count(),
            nodes = item.node_count(),
            inherited,
            "loading config node"
        );

        self.clear();
        self.register(inherited)?;
        self.resolve(cfg, item)?;
        self.check_completeness()?;
        self.validate(cfg)?;
        cfg.post_process()
            .map_err(|err| ConfigError::validation(format!("Config is invalid: {err}"), None))?;
        Ok(())
    }

    fn clear(&mut self) {
        self.params.clear();
        self.nodes.clear();
        self.states.clear();
    }

    fn register(&mut self, inherited: bool) -> Result<(), ConfigError> {
        for (index, field) in self.descriptor.fields().iter().enumerate() {
            let name = convert_name(self.name_format, field.name());
            let table = match field.binder() {
                Binder::Param(_) => &mut self.params,
                Binder::Node(_) => &mut self.nodes,
            };
            // Distinct declared names can still collide once converted.
            if let Some(&previous) = table.get(&name) {
                return Err(ConfigError::load(
                    format!(
                        "{} clashes with field '{}'.",
                        field.kind().describe(&name),
                        self.descriptor.fields()[previous].name()
                    ),
                    None,
                ));
            }
            table.insert(name, index);
            self.states.push(FieldState {
                has_value: inherited || field.is_optional(),
                position: None,
            });
        }
        Ok(())
    }

    fn resolve(&mut self, cfg: &mut C, item: &TreeItem) -> Result<(), LoadFailure> {
        for (name, child) in item.nodes() {
            let binder = self.nodes.get(name).and_then(|&index| {
                match self.descriptor.fields()[index].binder() {
                    Binder::Node(binder) => Some((index, binder)),
                    Binder::Param(_) => None,
                }
            });
            let Some((index, binder)) = binder else {
                unregistered::<C>(FieldType::Node, name, child.position())?;
                continue;
            };
            binder
                .load(cfg, name, child, self.name_format)
                .map_err(|failure| match failure {
                    LoadFailure::Incomplete(message) => LoadFailure::Fatal(ConfigError::load(
                        format!("Node '{name}': {message}"),
                        child.position(),
                    )),
                    fatal => fatal,
                })?;
            self.states[index] = FieldState {
                has_value: true,
                position: Some(child.position()),
            };
        }

        for (name, param) in item.params() {
            let binder = self.params.get(name).and_then(|&index| {
                match self.descriptor.fields()[index].binder() {
                    Binder::Param(binder) => Some((index, binder)),
                    Binder::Node(_) => None,
                }
            });
            let Some((index, binder)) = binder else {
                if self.bind_empty_node_list(cfg, name, param)? {
                    continue;
                }
                unregistered::<C>(FieldType::Param, name, param.position())?;
                continue;
            };
            binder.load(cfg, name, param)?;
            self.states[index] = FieldState {
                has_value: true,
                position: Some(param.position()),
            };
        }
        Ok(())
    }

    /// Formats without a typed empty list (TOML's `key = []`) hand an empty
    /// node list over as an empty param list.
    fn bind_empty_node_list(
        &mut self,
        cfg: &mut C,
        name: &str,
        param: &TreeParam,
    ) -> Result<bool, LoadFailure> {
        if !param.as_list().is_some_and(<[TreeParam]>::is_empty) {
            return Ok(false);
        }
        let Some(&index) = self.nodes.get(name) else {
            return Ok(false);
        };
        let field = &self.descriptor.fields()[index];
        let (FieldKind::NodeList | FieldKind::NodeListCopy, Binder::Node(binder)) =
            (field.kind(), field.binder())
        else {
            return Ok(false);
        };
        binder.load(cfg, name, &TreeNode::list(param.position()), self.name_format)?;
        self.states[index] = FieldState {
            has_value: true,
            position: Some(param.position()),
        };
        Ok(true)
    }

    fn check_completeness(&self) -> Result<(), LoadFailure> {
        if let Some(name) = self.first_missing(&self.params) {
            return Err(LoadFailure::Incomplete(format!("Parameter '{name}' is missing.")));
        }
        if let Some(name) = self.first_missing(&self.nodes) {
            return Err(LoadFailure::Incomplete(format!("Node '{name}' is missing.")));
        }
        Ok(())
    }

    fn first_missing<'t>(&self, table: &'t BTreeMap<String, usize>) -> Option<&'t str> {
        table
            .iter()
            .find(|&(_, &index)| !self.states[index].has_value)
            .map(|(name, _)| name.as_str())
    }

    fn validate(&self, cfg: &mut C) -> Result<(), ConfigError> {
        for (field, state) in self.descriptor.fields().iter().zip(&self.states) {
            for validator in field.validators() {
                validator(&mut *cfg).map_err(|err| {
                    ConfigError::validation(
                        format!(
                            "Config is invalid: {}: {err}",
                            field.kind().describe(&convert_name(self.name_format, field.name()))
                        ),
                        state.position,
                    )
                })?;
            }
        }
        Ok(())
    }
}

fn unregistered<C: Config>(
    kind: FieldType,
    name: &str,
    position: StreamPosition,
) -> Result<(), ConfigError> {
    C::handle_unregistered_field(kind, name, position)?;
    tracing::debug!(
        config = type_name::<C>(),
        %kind,
        name,
        %position,
        "ignoring unregistered field"
    );
    Ok(())
}
