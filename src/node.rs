use serde_json::{Map, Value};
use std::sync::Arc;

use crate::context::Origin;

static NULL: Value = Value::Null;

/// The three shapes a decoded value can take, detected once per node.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Map(&'a Map<String, Value>),
    List(&'a [Value]),
    Scalar(&'a Value),
}

impl<'a> Shape<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(m) => Shape::Map(m),
            Value::Array(a) => Shape::List(a.as_slice()),
            other => Shape::Scalar(other),
        }
    }
}

/// Immutable view over one position in a decoded tree.
///
/// A node borrows the tree; it never owns its parent. The optional origin
/// records how the node was reached so failures further down can name the
/// steps that led there.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    value: &'a Value,
    shape: Shape<'a>,
    origin: Option<Arc<Origin>>,
}

impl<'a> Node<'a> {
    /// Wrap the root of a decoded tree.
    pub fn new(value: &'a Value) -> Self {
        Self {
            value,
            shape: Shape::of(value),
            origin: None,
        }
    }

    pub(crate) fn derived(value: &'a Value, origin: Arc<Origin>) -> Self {
        Self {
            value,
            shape: Shape::of(value),
            origin: Some(origin),
        }
    }

    pub fn raw_value(&self) -> &'a Value {
        self.value
    }

    pub fn shape(&self) -> Shape<'a> {
        self.shape
    }

    pub fn as_map(&self) -> Option<&'a Map<String, Value>> {
        match self.shape {
            Shape::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&'a [Value]> {
        match self.shape {
            Shape::List(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self.shape, Shape::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.shape, Shape::List(_))
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// The last step taken to reach this node, if it was not the root.
    pub fn origin(&self) -> Option<&Arc<Origin>> {
        self.origin.as_ref()
    }
}

impl Default for Node<'_> {
    fn default() -> Self {
        Node::new(&NULL)
    }
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        Node::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Argument;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn probes_follow_value_shape() {
        let map = json!({"a": 1});
        let list = json!([1, 2]);
        let text = json!("x");

        let n = Node::new(&map);
        assert!(n.as_map().is_some());
        assert!(n.as_list().is_none());

        let n = Node::new(&list);
        assert!(n.as_map().is_none());
        assert_eq!(n.as_list().map(<[Value]>::len), Some(2));

        let n = Node::new(&text);
        assert!(!n.is_map() && !n.is_list());
        assert_eq!(n.raw_value(), &json!("x"));
    }

    #[test]
    fn default_node_is_null_without_origin() {
        let n = Node::default();
        assert!(n.is_null());
        assert!(n.origin().is_none());
        assert!(matches!(n.shape(), Shape::Scalar(Value::Null)));
    }

    #[test]
    fn derived_node_keeps_its_origin() {
        let v = json!(true);
        let origin = Origin::new("at_index", vec![Argument::Index(3)], None);
        let n = Node::derived(&v, origin);
        assert_eq!(n.origin().map(|o| o.method()), Some("at_index"));
    }
}
