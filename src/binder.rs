//! Per-field binders.
//!
//! A binder knows how to pull one field's entry out of a tree item, convert
//! or recurse, and store the result through the field's accessor. Binders
//! are stateless: whether a field has been seen, and where, is tracked by the
//! loader that drives them.

use std::marker::PhantomData;

use crate::config::Config;
use crate::convert::{StringConversionError, StringConverter};
use crate::descriptor::ConfigDescriptor;
use crate::error::ConfigError;
use crate::field::{Accessor, Binding, DictSlot, NodeListSlot, NodeSlot, ParamListSlot};
use crate::loader::{LoadFailure, Loader};
use crate::name_format::NameFormat;
use crate::tree::{TreeNode, TreeParam};

/// Binds a field to a tree param.
pub(crate) trait ParamBinder<C> {
    fn load(&self, cfg: &mut C, name: &str, param: &TreeParam) -> Result<(), ConfigError>;
}

/// Binds a field to a tree node.
pub(crate) trait NodeBinder<C> {
    fn load(
        &self,
        cfg: &mut C,
        name: &str,
        node: &TreeNode,
        name_format: NameFormat,
    ) -> Result<(), LoadFailure>;

    /// Apply registered defaults inside the nested value, if there is one.
    fn apply_defaults(&self, cfg: &mut C) {
        let _ = cfg;
    }
}

pub(crate) enum Binder<C> {
    Param(Box<dyn ParamBinder<C>>),
    Node(Box<dyn NodeBinder<C>>),
}

impl<C: Config> Binding<C> {
    pub(crate) fn param<T: StringConverter + 'static>(access: Accessor<C, T>) -> Self {
        Binding(Binder::Param(Box::new(ParamBinding { access })))
    }

    pub(crate) fn param_list<L: ParamListSlot>(access: Accessor<C, L>) -> Self {
        Binding(Binder::Param(Box::new(ParamListBinding { access })))
    }

    pub(crate) fn dict<D: DictSlot>(access: Accessor<C, D>) -> Self {
        Binding(Binder::Node(Box::new(DictBinding { access })))
    }

    pub(crate) fn node<N: NodeSlot<M>, M: 'static>(access: Accessor<C, N>) -> Self {
        Binding(Binder::Node(Box::new(NodeBinding {
            access,
            marker: PhantomData,
        })))
    }

    pub(crate) fn node_list<L: NodeListSlot>(
        access: Accessor<C, L>,
        inherit: fn(&L::Element) -> Option<L::Element>,
    ) -> Self {
        Binding(Binder::Node(Box::new(NodeListBinding { access, inherit })))
    }
}

fn conversion_failure(subject: &str, raw: &str, err: StringConversionError) -> String {
    if err.message.is_empty() {
        format!("Couldn't set {subject} value from '{raw}'")
    } else {
        format!("Couldn't set {subject} value from '{raw}': {}", err.message)
    }
}

struct ParamBinding<C, T> {
    access: Accessor<C, T>,
}

impl<C, T: StringConverter> ParamBinder<C> for ParamBinding<C, T> {
    fn load(&self, cfg: &mut C, name: &str, param: &TreeParam) -> Result<(), ConfigError> {
        let Some(raw) = param.as_str() else {
            return Err(ConfigError::load(
                format!("Parameter '{name}': config parameter can't be a list."),
                param.position(),
            ));
        };
        let value = T::from_config_str(raw).map_err(|err| {
            ConfigError::load(
                conversion_failure(&format!("parameter '{name}'"), raw, err),
                param.position(),
            )
        })?;
        *(self.access)(cfg) = value;
        Ok(())
    }
}

struct ParamListBinding<C, L> {
    access: Accessor<C, L>,
}

impl<C, L: ParamListSlot> ParamBinder<C> for ParamListBinding<C, L> {
    fn load(&self, cfg: &mut C, name: &str, param: &TreeParam) -> Result<(), ConfigError> {
        let Some(elements) = param.as_list() else {
            return Err(ConfigError::load(
                format!("Parameter list '{name}': config parameter must be a list."),
                param.position(),
            ));
        };

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let Some(raw) = element.as_str() else {
                return Err(ConfigError::load(
                    format!("Parameter list '{name}': list element can't be a list."),
                    element.position(),
                ));
            };
            let value = L::Element::from_config_str(raw).map_err(|err| {
                ConfigError::load(
                    conversion_failure(&format!("parameter list '{name}' element"), raw, err),
                    element.position(),
                )
            })?;
            values.push(value);
        }
        (self.access)(cfg).assign(values);
        Ok(())
    }
}

struct DictBinding<C, D> {
    access: Accessor<C, D>,
}

impl<C, D: DictSlot> NodeBinder<C> for DictBinding<C, D> {
    fn load(
        &self,
        cfg: &mut C,
        name: &str,
        node: &TreeNode,
        _name_format: NameFormat,
    ) -> Result<(), LoadFailure> {
        let Some(item) = node.as_item() else {
            return Err(ConfigError::load(
                format!("Dictionary '{name}': config node can't be a list."),
                node.position(),
            )
            .into());
        };
        if let Some((key, child)) = item.nodes().next() {
            return Err(ConfigError::load(
                format!("Dictionary '{name}': nested node '{key}' isn't allowed."),
                child.position(),
            )
            .into());
        }

        let mut entries = Vec::with_capacity(item.param_count());
        for (key, param) in item.params() {
            let Some(raw) = param.as_str() else {
                return Err(ConfigError::load(
                    format!("Dictionary '{name}': element '{key}' can't be a list."),
                    param.position(),
                )
                .into());
            };
            let value = D::Value::from_config_str(raw).map_err(|err| {
                ConfigError::load(
                    conversion_failure(&format!("dictionary '{name}' element '{key}'"), raw, err),
                    param.position(),
                )
            })?;
            entries.push((key.to_string(), value));
        }
        (self.access)(cfg).assign(entries);
        Ok(())
    }
}

struct NodeBinding<C, N, M> {
    access: Accessor<C, N>,
    marker: PhantomData<fn() -> M>,
}

impl<C, N: NodeSlot<M>, M> NodeBinder<C> for NodeBinding<C, N, M> {
    fn load(
        &self,
        cfg: &mut C,
        name: &str,
        node: &TreeNode,
        name_format: NameFormat,
    ) -> Result<(), LoadFailure> {
        if !node.is_item() {
            return Err(ConfigError::load(
                format!("Node '{name}': config node can't be a list."),
                node.position(),
            )
            .into());
        }
        let target = (self.access)(cfg).target_mut();
        Loader::<N::Target>::new(name_format).load(target, node)
    }

    fn apply_defaults(&self, cfg: &mut C) {
        if let Some(target) = (self.access)(cfg).present_mut() {
            ConfigDescriptor::<N::Target>::of().apply_defaults(target);
        }
    }
}

struct NodeListBinding<C, L: NodeListSlot> {
    access: Accessor<C, L>,
    inherit: fn(&L::Element) -> Option<L::Element>,
}

impl<C, L: NodeListSlot> NodeBinder<C> for NodeListBinding<C, L> {
    fn load(
        &self,
        cfg: &mut C,
        name: &str,
        node: &TreeNode,
        name_format: NameFormat,
    ) -> Result<(), LoadFailure> {
        let Some(entries) = node.as_list() else {
            return Err(ConfigError::load(
                format!("Node list '{name}': config node must be a list."),
                node.position(),
            )
            .into());
        };

        let mut loader = Loader::<L::Element>::new(name_format);
        let mut items: Vec<L::Element> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_item() {
                return Err(ConfigError::load(
                    format!("Node list '{name}': list element must be a node."),
                    entry.position(),
                )
                .into());
            }
            let loaded = match items.last().and_then(self.inherit) {
                Some(mut item) => loader.load_inherited(&mut item, entry).map(|()| item),
                None => {
                    let mut item = loader.instantiate();
                    loader.load(&mut item, entry).map(|()| item)
                }
            };
            let item = loaded.map_err(|failure| match failure {
                LoadFailure::Incomplete(message) => LoadFailure::Fatal(ConfigError::load(
                    format!("Node list '{name}': {message}"),
                    entry.position(),
                )),
                fatal => fatal,
            })?;
            items.push(item);
        }
        (self.access)(cfg).assign(items);
        Ok(())
    }
}

/// Copy-mode inheritance for explicitly registered `Vec` node lists.
pub(crate) fn clone_previous<E: Clone>(previous: &E) -> Option<E> {
    Some(previous.clone())
}
