//! TOML front end built on `toml_edit`.
//!
//! `toml_edit` keeps byte spans for keys, tables and values when a document
//! is parsed without being made mutable. Those spans become
//! [`StreamPosition`]s on the tree:
//!
//! | TOML | Tree |
//! |---|---|
//! | `key = "value"` (string, integer, float, bool, datetime) | param, positioned at the key |
//! | `key = [1, 2]` | list param, each element positioned at itself |
//! | `[table]`, dotted keys, `{ inline = "table" }` | item node |
//! | `[[array]]`, `[{ a = 1 }, { a = 2 }]` | list node of items |
//!
//! Strings are handed over unquoted and unescaped; other scalars use their
//! canonical text form.

use std::ops::Range;

use toml_edit::{ImDocument, InlineTable, Item, Table, TomlError, Value};

use crate::error::ConfigError;
use crate::parser::Parser;
use crate::tree::{StreamPosition, Tree, TreeItem, TreeNode, TreeParam};

/// [`Parser`] for TOML documents. The root is always a single item.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlParser;

impl TomlParser {
    pub fn new() -> Self {
        TomlParser
    }
}

impl Parser for TomlParser {
    fn parse(&mut self, content: &str) -> Result<Tree, ConfigError> {
        let index = LineIndex::new(content);
        let document = ImDocument::parse(content).map_err(|err| syntax_error(&index, &err))?;

        let root_position = StreamPosition::new(1, 1);
        let mut root = TreeNode::item(root_position);
        if let Some(item) = root.as_item_mut() {
            index.fill_table(document.as_table(), item, root_position)?;
        }
        Ok(Tree::new(root))
    }
}

fn syntax_error(index: &LineIndex<'_>, err: &TomlError) -> ConfigError {
    let position = err.span().map(|span| index.position(span.start));
    ConfigError::parse(err.message().trim_end(), position)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(v) => Some(v.value().clone()),
        Value::Integer(v) => Some(v.value().to_string()),
        Value::Float(v) => Some(v.value().to_string()),
        Value::Boolean(v) => Some(v.value().to_string()),
        Value::Datetime(v) => Some(v.value().to_string()),
        Value::Array(_) | Value::InlineTable(_) => None,
    }
}

/// Byte offset to line/column translation over the source text.
struct LineIndex<'a> {
    content: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(content: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            content,
            line_starts,
        }
    }

    fn position(&self, offset: usize) -> StreamPosition {
        let offset = offset.min(self.content.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        let column = self
            .content
            .get(start..offset)
            .map_or(offset - start, |text| text.chars().count());
        StreamPosition::new(line, column + 1)
    }

    fn span_position(&self, span: Option<Range<usize>>, fallback: StreamPosition) -> StreamPosition {
        span.map_or(fallback, |span| self.position(span.start))
    }

    fn fill_table(
        &self,
        table: &Table,
        item: &mut TreeItem,
        fallback: StreamPosition,
    ) -> Result<(), ConfigError> {
        for (name, entry) in table.iter() {
            let key_position = self.span_position(
                table.get_key_value(name).and_then(|(key, _)| key.span()),
                fallback,
            );
            match entry {
                Item::None => {}
                Item::Value(value) => self.add_value(item, name, value, key_position)?,
                Item::Table(child) => {
                    let position = self.span_position(child.span(), key_position);
                    let node = item.add_node(name, position);
                    if let Some(child_item) = node.as_item_mut() {
                        self.fill_table(child, child_item, position)?;
                    }
                }
                Item::ArrayOfTables(tables) => {
                    let list = item.add_node_list(name, key_position);
                    for child in tables.iter() {
                        let position = self.span_position(child.span(), key_position);
                        if let Some(element) = list.push_item(position).and_then(TreeNode::as_item_mut) {
                            self.fill_table(child, element, position)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn fill_inline_table(
        &self,
        table: &InlineTable,
        item: &mut TreeItem,
        fallback: StreamPosition,
    ) -> Result<(), ConfigError> {
        for (name, value) in table.iter() {
            let key_position = self.span_position(
                table.get_key_value(name).and_then(|(key, _)| key.span()),
                self.span_position(value.span(), fallback),
            );
            self.add_value(item, name, value, key_position)?;
        }
        Ok(())
    }

    fn add_value(
        &self,
        item: &mut TreeItem,
        name: &str,
        value: &Value,
        key_position: StreamPosition,
    ) -> Result<(), ConfigError> {
        match value {
            Value::InlineTable(table) => {
                let position = self.span_position(value.span(), key_position);
                let node = item.add_node(name, position);
                if let Some(child) = node.as_item_mut() {
                    self.fill_inline_table(table, child, position)?;
                }
            }
            Value::Array(array) => {
                let tables = array
                    .iter()
                    .filter(|element| element.is_inline_table())
                    .count();
                if tables > 0 && tables == array.len() {
                    let list = item.add_node_list(name, key_position);
                    for element in array.iter() {
                        let position = self.span_position(element.span(), key_position);
                        if let (Value::InlineTable(table), Some(child)) = (
                            element,
                            list.push_item(position).and_then(TreeNode::as_item_mut),
                        ) {
                            self.fill_inline_table(table, child, position)?;
                        }
                    }
                } else if tables > 0 {
                    return Err(ConfigError::parse(
                        format!("Array '{name}' mixes tables with plain values"),
                        key_position,
                    ));
                } else {
                    let elements = self.param_elements(name, array.iter(), key_position)?;
                    item.insert_param(name, TreeParam::list(elements, key_position));
                }
            }
            scalar_value => {
                let raw = scalar(scalar_value).unwrap_or_default();
                item.add_param(name, raw, key_position);
            }
        }
        Ok(())
    }

    fn param_elements<'v>(
        &self,
        name: &str,
        values: impl Iterator<Item = &'v Value>,
        fallback: StreamPosition,
    ) -> Result<Vec<TreeParam>, ConfigError> {
        values
            .map(|value| {
                let position = self.span_position(value.span(), fallback);
                match value {
                    Value::Array(nested) => Ok(TreeParam::list(
                        self.param_elements(name, nested.iter(), position)?,
                        position,
                    )),
                    Value::InlineTable(_) => Err(ConfigError::parse(
                        format!("Array '{name}' mixes tables with plain values"),
                        position,
                    )),
                    other => Ok(TreeParam::value(scalar(other).unwrap_or_default(), position)),
                }
            })
            .collect()
    }
}
