use serde_json::Value;

use crate::errors::PinataError;
use crate::navigator::Navigator;
use crate::node::Node;

/// A node and its own navigator in one value.
///
/// Calls that fail record the error on this pinata; children returned by
/// [`pinata_at_index`](Pinata::pinata_at_index) and
/// [`pinata_at_path`](Pinata::pinata_at_path) start with a clean navigator of
/// their own, so their failures never show up here. Not thread safe.
#[derive(Debug, Clone)]
pub struct Pinata<'a> {
    node: Node<'a>,
    nav: Navigator,
}

impl<'a> Pinata<'a> {
    pub fn new(contents: &'a Value) -> Self {
        Node::new(contents).into()
    }

    pub fn contents(&self) -> &'a Value {
        self.node.raw_value()
    }

    pub fn node(&self) -> &Node<'a> {
        &self.node
    }

    pub fn error(&self) -> Option<&PinataError> {
        self.nav.error()
    }

    pub fn clear_error(&mut self) -> Option<PinataError> {
        self.nav.clear_error()
    }

    pub fn check<T>(&self, value: T) -> Result<T, PinataError> {
        self.nav.check(value)
    }

    pub fn string(&mut self) -> &'a str {
        self.nav.as_string(&self.node)
    }

    pub fn float(&mut self) -> f64 {
        self.nav.as_float(&self.node)
    }

    pub fn bool(&mut self) -> bool {
        self.nav.as_bool(&self.node)
    }

    pub fn nil(&mut self) {
        self.nav.assert_nil(&self.node)
    }

    pub fn string_at_index(&mut self, index: i64) -> &'a str {
        self.nav.at_index_string(&self.node, index)
    }

    pub fn float_at_index(&mut self, index: i64) -> f64 {
        self.nav.at_index_float(&self.node, index)
    }

    pub fn bool_at_index(&mut self, index: i64) -> bool {
        self.nav.at_index_bool(&self.node, index)
    }

    pub fn nil_at_index(&mut self, index: i64) {
        self.nav.at_index_nil(&self.node, index)
    }

    pub fn string_at_path<S: AsRef<str>>(&mut self, path: &[S]) -> &'a str {
        self.nav.at_path_string(&self.node, path)
    }

    pub fn float_at_path<S: AsRef<str>>(&mut self, path: &[S]) -> f64 {
        self.nav.at_path_float(&self.node, path)
    }

    pub fn bool_at_path<S: AsRef<str>>(&mut self, path: &[S]) -> bool {
        self.nav.at_path_bool(&self.node, path)
    }

    pub fn nil_at_path<S: AsRef<str>>(&mut self, path: &[S]) {
        self.nav.at_path_nil(&self.node, path)
    }

    /// The element at `index`, or `None` if this pinata has (or now gets) an error.
    pub fn pinata_at_index(&mut self, index: i64) -> Option<Pinata<'a>> {
        let child = self.nav.at_index(&self.node, index);
        self.child(child)
    }

    /// The value at `path`, or `None` if this pinata has (or now gets) an error.
    pub fn pinata_at_path<S: AsRef<str>>(&mut self, path: &[S]) -> Option<Pinata<'a>> {
        let child = self.nav.at_path(&self.node, path);
        self.child(child)
    }

    fn child(&self, node: Node<'a>) -> Option<Pinata<'a>> {
        self.nav.is_clean().then(|| node.into())
    }
}

impl<'a> From<Node<'a>> for Pinata<'a> {
    fn from(node: Node<'a>) -> Self {
        Self {
            node,
            nav: Navigator::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorReason;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn valid_string() {
        let v = json!("test string");
        let mut p = Pinata::new(&v);
        assert_eq!(p.string(), "test string");
        assert!(p.error().is_none());
    }

    #[test]
    fn invalid_string() {
        let v = json!(1);
        let mut p = Pinata::new(&v);
        assert_eq!(p.string(), "");
        assert_eq!(p.error().map(PinataError::reason), Some(ErrorReason::IncompatibleType));
    }

    #[test]
    fn child_failures_stay_with_the_child() {
        let v = json!({"a": {"b": 1}});
        let mut parent = Pinata::new(&v);
        let mut child = parent.pinata_at_path(&["a"]).expect("child");

        child.string_at_path(&["missing"]);
        assert!(child.error().is_some());
        assert!(parent.error().is_none());
        assert_eq!(parent.contents(), &v);
    }

    #[test]
    fn failed_step_returns_none_and_records_error() {
        let v = json!([1, 2]);
        let mut p = Pinata::new(&v);
        assert!(p.pinata_at_index(5).is_none());
        assert_eq!(p.error().map(PinataError::method), Some("at_index"));

        // pending error blocks even valid steps
        assert!(p.pinata_at_index(0).is_none());
        assert_eq!(p.clear_error().map(|e| e.reason()), Some(ErrorReason::InvalidInput));
        assert_eq!(p.float_at_index(1), 2.0);
    }

    #[test]
    fn nested_getters() {
        let v = json!({"Address": {"City": null, "Zip": "12345", "Geo": [51.5, true]}});
        let mut p = Pinata::new(&v);
        p.nil_at_path(&["Address", "City"]);
        assert_eq!(p.string_at_path(&["Address", "Zip"]), "12345");
        let mut geo = p.pinata_at_path(&["Address", "Geo"]).unwrap();
        assert_eq!(geo.float_at_index(0), 51.5);
        assert!(geo.bool_at_index(1));
        assert!(p.check(()).is_ok());
        assert!(geo.check(()).is_ok());
    }

    #[test]
    fn clone_copies_pending_error() {
        let v = json!(null);
        let mut p = Pinata::new(&v);
        p.bool();
        let copy = p.clone();
        assert_eq!(copy.error(), p.error());
    }
}
