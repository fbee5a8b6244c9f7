//! Format-agnostic document tree handed from parsers to the loader.
//!
//! A [`TreeNode`] is either an item (named params and named child nodes) or a
//! list of nodes. Params hold a single raw string or a list of params. Every
//! node, param and list element remembers where it came from, so binding
//! errors can point at the exact spot in the source.
//!
//! Entries keep insertion order, which for parsers means document order.

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A 1-based `(line, column)` location in the config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct StreamPosition {
    pub line: usize,
    pub column: usize,
}

impl StreamPosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for StreamPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line:{}, column:{}]", self.line, self.column)
    }
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Tree {
    root: TreeNode,
}

impl Tree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut TreeNode {
        &mut self.root
    }

    pub fn into_root(self) -> TreeNode {
        self.root
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum NodeContent {
    Item(TreeItem),
    List(Vec<TreeNode>),
}

/// An item or a list of nodes, with its source position.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TreeNode {
    position: StreamPosition,
    content: NodeContent,
}

impl TreeNode {
    /// An empty item node.
    pub fn item(position: StreamPosition) -> Self {
        Self {
            position,
            content: NodeContent::Item(TreeItem::default()),
        }
    }

    /// An empty list node.
    pub fn list(position: StreamPosition) -> Self {
        Self {
            position,
            content: NodeContent::List(Vec::new()),
        }
    }

    pub fn position(&self) -> StreamPosition {
        self.position
    }

    pub fn is_item(&self) -> bool {
        matches!(self.content, NodeContent::Item(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.content, NodeContent::List(_))
    }

    pub fn as_item(&self) -> Option<&TreeItem> {
        match &self.content {
            NodeContent::Item(item) => Some(item),
            NodeContent::List(_) => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut TreeItem> {
        match &mut self.content {
            NodeContent::Item(item) => Some(item),
            NodeContent::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TreeNode]> {
        match &self.content {
            NodeContent::List(nodes) => Some(nodes),
            NodeContent::Item(_) => None,
        }
    }

    /// Append a node to a list node. Returns `None` if this node is an item.
    pub fn push(&mut self, node: TreeNode) -> Option<&mut TreeNode> {
        match &mut self.content {
            NodeContent::List(nodes) => {
                nodes.push(node);
                nodes.last_mut()
            }
            NodeContent::Item(_) => None,
        }
    }

    /// Append an empty item to a list node. Returns `None` if this node is an item.
    pub fn push_item(&mut self, position: StreamPosition) -> Option<&mut TreeNode> {
        self.push(TreeNode::item(position))
    }
}

/// Named params and named child nodes of an item node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeItem {
    params: Vec<(String, TreeParam)>,
    nodes: Vec<(String, TreeNode)>,
}

impl TreeItem {
    pub fn params(&self) -> impl Iterator<Item = (&str, &TreeParam)> {
        self.params.iter().map(|(name, param)| (name.as_str(), param))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn param(&self, name: &str) -> Option<&TreeParam> {
        self.params
            .iter()
            .find_map(|(key, param)| (key == name).then_some(param))
    }

    pub fn node(&self, name: &str) -> Option<&TreeNode> {
        self.nodes
            .iter()
            .find_map(|(key, node)| (key == name).then_some(node))
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a param, replacing any earlier param with the same name.
    pub fn insert_param(&mut self, name: impl Into<String>, param: TreeParam) -> &mut TreeParam {
        let index = upsert(&mut self.params, name.into(), param);
        &mut self.params[index].1
    }

    /// Insert a child node, replacing any earlier node with the same name.
    pub fn insert_node(&mut self, name: impl Into<String>, node: TreeNode) -> &mut TreeNode {
        let index = upsert(&mut self.nodes, name.into(), node);
        &mut self.nodes[index].1
    }

    /// Shorthand for inserting a single-value param.
    pub fn add_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        position: StreamPosition,
    ) -> &mut TreeParam {
        self.insert_param(name, TreeParam::value(value, position))
    }

    /// Shorthand for inserting a list param whose elements are single values.
    pub fn add_param_list<I, S>(
        &mut self,
        name: impl Into<String>,
        values: I,
        position: StreamPosition,
    ) -> &mut TreeParam
    where
        I: IntoIterator<Item = (S, StreamPosition)>,
        S: Into<String>,
    {
        let elements = values
            .into_iter()
            .map(|(value, position)| TreeParam::value(value, position))
            .collect();
        self.insert_param(name, TreeParam::list(elements, position))
    }

    /// Shorthand for inserting an empty item child node.
    pub fn add_node(&mut self, name: impl Into<String>, position: StreamPosition) -> &mut TreeNode {
        self.insert_node(name, TreeNode::item(position))
    }

    /// Shorthand for inserting an empty list child node.
    pub fn add_node_list(
        &mut self,
        name: impl Into<String>,
        position: StreamPosition,
    ) -> &mut TreeNode {
        self.insert_node(name, TreeNode::list(position))
    }
}

fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) -> usize {
    match entries.iter().position(|(key, _)| *key == name) {
        Some(index) => {
            entries[index].1 = value;
            index
        }
        None => {
            entries.push((name, value));
            entries.len() - 1
        }
    }
}

impl Serialize for TreeItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TreeItem", 2)?;
        state.serialize_field("params", &Entries(&self.params))?;
        state.serialize_field("nodes", &Entries(&self.nodes))?;
        state.end()
    }
}

/// Serializes named entries as a map, keeping their order.
struct Entries<'a, T>(&'a [(String, T)]);

impl<T: Serialize> Serialize for Entries<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, value)| (name, value)))
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum ParamValue {
    Item(String),
    List(Vec<TreeParam>),
}

/// A raw param value: one string, or a list of params.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TreeParam {
    position: StreamPosition,
    value: ParamValue,
}

impl TreeParam {
    pub fn value(value: impl Into<String>, position: StreamPosition) -> Self {
        Self {
            position,
            value: ParamValue::Item(value.into()),
        }
    }

    pub fn list(elements: Vec<TreeParam>, position: StreamPosition) -> Self {
        Self {
            position,
            value: ParamValue::List(elements),
        }
    }

    pub fn position(&self) -> StreamPosition {
        self.position
    }

    pub fn is_item(&self) -> bool {
        matches!(self.value, ParamValue::Item(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.value, ParamValue::List(_))
    }

    /// The raw string of a single-value param.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ParamValue::Item(value) => Some(value),
            ParamValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TreeParam]> {
        match &self.value {
            ParamValue::List(elements) => Some(elements),
            ParamValue::Item(_) => None,
        }
    }
}
