//! Field classification: which binder a declared Rust type gets.
//!
//! Each supported shape implements [`Field`] under its own marker type, so
//! the impls never overlap and the compiler settles on exactly one kind for
//! a given field type:
//!
//! | Declared type | Kind |
//! |---|---|
//! | `T: StringConverter` (incl. `Option<T>`) | [`FieldKind::Param`] |
//! | `BTreeMap<String, V>` / `HashMap<String, V>` (or `Option` thereof) | [`FieldKind::Dict`] |
//! | `Vec<T>` / `Option<Vec<T>>` with `T: StringConverter` | [`FieldKind::ParamList`] |
//! | `Vec<C>` / `Option<Vec<C>>` with `C: Config` | [`FieldKind::NodeList`] |
//! | [`CopyNodeList<C>`] | [`FieldKind::NodeListCopy`] |
//! | `C: Config` / `Option<C>` | [`FieldKind::Node`] |
//!
//! The slot traits ([`ParamListSlot`], [`DictSlot`], [`NodeSlot`],
//! [`NodeListSlot`]) describe how a bound value is stored into a field,
//! looking through `Option` where present.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::ops::{Deref, DerefMut};

use crate::binder::Binder;
use crate::config::Config;
use crate::convert::StringConverter;
use crate::descriptor::instantiate;

/// Projection from a config value to one of its fields.
pub type Accessor<C, T> = fn(&mut C) -> &mut T;

/// Binding strategy of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Param,
    ParamList,
    Dict,
    Node,
    NodeList,
    NodeListCopy,
}

impl FieldKind {
    /// Whether the field binds to a tree param (as opposed to a tree node).
    pub fn is_param(self) -> bool {
        matches!(self, FieldKind::Param | FieldKind::ParamList)
    }

    /// Human-readable field description used in error messages.
    pub fn describe(self, name: &str) -> String {
        let label = match self {
            FieldKind::Param => "Parameter",
            FieldKind::ParamList => "Parameter list",
            FieldKind::Dict => "Dictionary",
            FieldKind::Node => "Node",
            FieldKind::NodeList | FieldKind::NodeListCopy => "Node list",
        };
        format!("{label} '{name}'")
    }
}

/// Kind of a tree entry, as passed to unregistered-field handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Param,
    Node,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Param => write!(f, "param"),
            FieldType::Node => write!(f, "node"),
        }
    }
}

/// Marker types that keep the [`Field`] and [`NodeSlot`] impls disjoint.
pub mod marker {
    pub struct Param;
    pub struct ParamList;
    pub struct Dict;
    pub struct Node;
    pub struct OptionalNode;
    pub struct NodeList;

    pub struct Required;
    pub struct Optional;
}

/// A list of nested configs where each entry inherits the fields of the
/// entry before it and only overrides what differs.
///
/// ```toml
/// [[shapes]]
/// kind = "circle"
/// color = "red"
///
/// [[shapes]]
/// kind = "square"   # color = "red" is inherited
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CopyNodeList<C>(pub Vec<C>);

impl<C> CopyNodeList<C> {
    pub fn into_inner(self) -> Vec<C> {
        self.0
    }
}

impl<C> Default for CopyNodeList<C> {
    fn default() -> Self {
        CopyNodeList(Vec::new())
    }
}

impl<C> From<Vec<C>> for CopyNodeList<C> {
    fn from(items: Vec<C>) -> Self {
        CopyNodeList(items)
    }
}

impl<C> Deref for CopyNodeList<C> {
    type Target = Vec<C>;

    fn deref(&self) -> &Vec<C> {
        &self.0
    }
}

impl<C> DerefMut for CopyNodeList<C> {
    fn deref_mut(&mut self) -> &mut Vec<C> {
        &mut self.0
    }
}

impl<'a, C> IntoIterator for &'a CopyNodeList<C> {
    type Item = &'a C;
    type IntoIter = std::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Storage for a param-list field.
pub trait ParamListSlot: 'static {
    type Element: StringConverter;
    const OPTIONAL: bool;

    fn assign(&mut self, elements: Vec<Self::Element>);
}

impl<T: StringConverter + 'static> ParamListSlot for Vec<T> {
    type Element = T;
    const OPTIONAL: bool = false;

    fn assign(&mut self, elements: Vec<T>) {
        *self = elements;
    }
}

impl<T: StringConverter + 'static> ParamListSlot for Option<Vec<T>> {
    type Element = T;
    const OPTIONAL: bool = true;

    fn assign(&mut self, elements: Vec<T>) {
        *self = Some(elements);
    }
}

/// Storage for a dictionary field.
pub trait DictSlot: 'static {
    type Value: StringConverter;
    const OPTIONAL: bool;

    fn assign(&mut self, entries: Vec<(String, Self::Value)>);
}

impl<V: StringConverter + 'static> DictSlot for BTreeMap<String, V> {
    type Value = V;
    const OPTIONAL: bool = false;

    fn assign(&mut self, entries: Vec<(String, V)>) {
        *self = entries.into_iter().collect();
    }
}

impl<V: StringConverter + 'static> DictSlot for Option<BTreeMap<String, V>> {
    type Value = V;
    const OPTIONAL: bool = true;

    fn assign(&mut self, entries: Vec<(String, V)>) {
        *self = Some(entries.into_iter().collect());
    }
}

impl<V, S> DictSlot for HashMap<String, V, S>
where
    V: StringConverter + 'static,
    S: BuildHasher + Default + 'static,
{
    type Value = V;
    const OPTIONAL: bool = false;

    fn assign(&mut self, entries: Vec<(String, V)>) {
        *self = entries.into_iter().collect();
    }
}

impl<V, S> DictSlot for Option<HashMap<String, V, S>>
where
    V: StringConverter + 'static,
    S: BuildHasher + Default + 'static,
{
    type Value = V;
    const OPTIONAL: bool = true;

    fn assign(&mut self, entries: Vec<(String, V)>) {
        *self = Some(entries.into_iter().collect());
    }
}

/// Storage for a nested config field; `M` is [`marker::Required`] or
/// [`marker::Optional`].
pub trait NodeSlot<M>: 'static {
    type Target: Config;
    const OPTIONAL: bool;

    /// The nested value to load into, created first if absent.
    fn target_mut(&mut self) -> &mut Self::Target;

    /// The nested value, if one exists.
    fn present_mut(&mut self) -> Option<&mut Self::Target>;
}

impl<C: Config> NodeSlot<marker::Required> for C {
    type Target = C;
    const OPTIONAL: bool = false;

    fn target_mut(&mut self) -> &mut C {
        self
    }

    fn present_mut(&mut self) -> Option<&mut C> {
        Some(self)
    }
}

impl<C: Config> NodeSlot<marker::Optional> for Option<C> {
    type Target = C;
    const OPTIONAL: bool = true;

    fn target_mut(&mut self) -> &mut C {
        self.get_or_insert_with(instantiate::<C>)
    }

    fn present_mut(&mut self) -> Option<&mut C> {
        self.as_mut()
    }
}

/// Storage for a list of nested configs.
pub trait NodeListSlot: 'static {
    type Element: Config;
    const OPTIONAL: bool;
    /// Whether entries inherit from the previous entry.
    const COPY: bool = false;

    fn assign(&mut self, elements: Vec<Self::Element>);

    /// Starting value for an entry that follows `previous`, in copy mode.
    fn inherit(previous: &Self::Element) -> Option<Self::Element> {
        let _ = previous;
        None
    }
}

impl<C: Config> NodeListSlot for Vec<C> {
    type Element = C;
    const OPTIONAL: bool = false;

    fn assign(&mut self, elements: Vec<C>) {
        *self = elements;
    }
}

impl<C: Config> NodeListSlot for Option<Vec<C>> {
    type Element = C;
    const OPTIONAL: bool = true;

    fn assign(&mut self, elements: Vec<C>) {
        *self = Some(elements);
    }
}

impl<C: Config + Clone> NodeListSlot for CopyNodeList<C> {
    type Element = C;
    const OPTIONAL: bool = false;
    const COPY: bool = true;

    fn assign(&mut self, elements: Vec<C>) {
        self.0 = elements;
    }

    fn inherit(previous: &C) -> Option<C> {
        Some(previous.clone())
    }
}

/// Opaque binder produced by [`Field::binding`].
pub struct Binding<C>(pub(crate) Binder<C>);

/// Compile-time classification of a field type.
///
/// Implemented by figbind for every supported shape (see the module docs);
/// `M` is one of the [`marker`] types and is inferred at the call site.
pub trait Field<M>: Sized + 'static {
    const KIND: FieldKind;
    const OPTIONAL: bool;

    fn binding<C: Config>(access: Accessor<C, Self>) -> Binding<C>;
}

impl<T: StringConverter + 'static> Field<marker::Param> for T {
    const KIND: FieldKind = FieldKind::Param;
    const OPTIONAL: bool = <T as StringConverter>::OPTIONAL;

    fn binding<C: Config>(access: Accessor<C, Self>) -> Binding<C> {
        Binding::param(access)
    }
}

impl<L: ParamListSlot> Field<marker::ParamList> for L {
    const KIND: FieldKind = FieldKind::ParamList;
    const OPTIONAL: bool = <L as ParamListSlot>::OPTIONAL;

    fn binding<C: Config>(access: Accessor<C, Self>) -> Binding<C> {
        Binding::param_list(access)
    }
}

impl<D: DictSlot> Field<marker::Dict> for D {
    const KIND: FieldKind = FieldKind::Dict;
    const OPTIONAL: bool = <D as DictSlot>::OPTIONAL;

    fn binding<C: Config>(access: Accessor<C, Self>) -> Binding<C> {
        Binding::dict(access)
    }
}

impl<N: Config> Field<marker::Node> for N {
    const KIND: FieldKind = FieldKind::Node;
    const OPTIONAL: bool = false;

    fn binding<C: Config>(access: Accessor<C, Self>) -> Binding<C> {
        Binding::node::<N, marker::Required>(access)
    }
}

impl<N: Config> Field<marker::OptionalNode> for Option<N> {
    const KIND: FieldKind = FieldKind::Node;
    const OPTIONAL: bool = true;

    fn binding<C: Config>(access: Accessor<C, Self>) -> Binding<C> {
        Binding::node::<Option<N>, marker::Optional>(access)
    }
}

impl<L: NodeListSlot> Field<marker::NodeList> for L {
    const KIND: FieldKind = if L::COPY {
        FieldKind::NodeListCopy
    } else {
        FieldKind::NodeList
    };
    const OPTIONAL: bool = <L as NodeListSlot>::OPTIONAL;

    fn binding<C: Config>(access: Accessor<C, Self>) -> Binding<C> {
        Binding::node_list(access, L::inherit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{A, Shape};

    fn kind<F: Field<M>, M>() -> (FieldKind, bool) {
        (F::KIND, F::OPTIONAL)
    }

    #[test]
    fn scalars_are_params() {
        assert_eq!(kind::<i32, _>(), (FieldKind::Param, false));
        assert_eq!(kind::<String, _>(), (FieldKind::Param, false));
        assert_eq!(kind::<Option<String>, _>(), (FieldKind::Param, true));
    }

    #[test]
    fn scalar_vectors_are_param_lists() {
        assert_eq!(kind::<Vec<u16>, _>(), (FieldKind::ParamList, false));
        assert_eq!(kind::<Option<Vec<u16>>, _>(), (FieldKind::ParamList, true));
    }

    #[test]
    fn string_keyed_maps_are_dicts() {
        assert_eq!(kind::<BTreeMap<String, i64>, _>(), (FieldKind::Dict, false));
        assert_eq!(kind::<HashMap<String, String>, _>(), (FieldKind::Dict, false));
        assert_eq!(
            kind::<Option<BTreeMap<String, bool>>, _>(),
            (FieldKind::Dict, true)
        );
    }

    #[test]
    fn configs_are_nodes() {
        assert_eq!(kind::<A, _>(), (FieldKind::Node, false));
        assert_eq!(kind::<Option<A>, _>(), (FieldKind::Node, true));
    }

    #[test]
    fn config_vectors_are_node_lists() {
        assert_eq!(kind::<Vec<A>, _>(), (FieldKind::NodeList, false));
        assert_eq!(kind::<Option<Vec<A>>, _>(), (FieldKind::NodeList, true));
        assert_eq!(
            kind::<CopyNodeList<Shape>, _>(),
            (FieldKind::NodeListCopy, false)
        );
    }

    #[test]
    fn descriptions_name_the_field() {
        assert_eq!(FieldKind::Param.describe("port"), "Parameter 'port'");
        assert_eq!(FieldKind::Dict.describe("env"), "Dictionary 'env'");
        assert_eq!(
            FieldKind::NodeListCopy.describe("shapes"),
            "Node list 'shapes'"
        );
        assert!(FieldKind::ParamList.is_param());
        assert!(!FieldKind::Dict.is_param());
    }

    #[test]
    fn copy_node_list_derefs_to_vec() {
        let list: CopyNodeList<i32> = vec![1, 2].into();
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().sum::<i32>(), 3);
        assert_eq!(list.into_inner(), vec![1, 2]);
    }
}
