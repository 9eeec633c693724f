use itertools::Itertools;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::context::{Argument, Origin};
use crate::errors::{ErrorReason, PinataError};
use crate::node::{Node, Shape};

/// Typed, chainable extraction over [`Node`]s.
///
/// A navigator holds at most one pending error. The first failing call sets
/// it; every call after that is a no-op returning the zero value of its
/// result type (`""`, `0.0`, `false`, `()` or an empty node) until
/// [`clear_error`](Navigator::clear_error) is called. Callers can therefore
/// chain several calls and check once at the end.
///
/// A navigator is not meant to be shared between threads: keep one per call
/// chain. The tree it reads is never mutated and may be read by any number of
/// navigators at once.
#[derive(Debug, Default, Clone)]
pub struct Navigator {
    err: Option<PinataError>,
}

/// A public call as seen by the error it may produce.
struct Call<'n, 'a> {
    method: &'static str,
    args: Vec<Argument>,
    node: &'n Node<'a>,
}

impl<'n, 'a> Call<'n, 'a> {
    fn new(method: &'static str, args: Vec<Argument>, node: &'n Node<'a>) -> Self {
        Self { method, args, node }
    }

    fn frame(&self) -> Arc<Origin> {
        Origin::new(self.method, self.args.clone(), self.node.origin().cloned())
    }
}

fn index_args(index: i64) -> Vec<Argument> {
    vec![Argument::Index(index)]
}

fn path_args(path: &[&str]) -> Vec<Argument> {
    path.iter().map(|s| Argument::from(*s)).collect()
}

fn quoted(path: &[&str]) -> String {
    format!("\"{}\"", path.iter().join("\", \""))
}

/// Why `node` is not the scalar that was asked for.
fn mismatch(node: &Node<'_>, wanted: &str) -> String {
    match node.shape() {
        Shape::Map(_) => "this is a map".to_string(),
        Shape::List(_) => "this is a list".to_string(),
        Shape::Scalar(_) => format!("this is not {wanted}"),
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending error, if any.
    pub fn error(&self) -> Option<&PinataError> {
        self.err.as_ref()
    }

    pub fn is_clean(&self) -> bool {
        self.err.is_none()
    }

    /// Discard the pending error and return it, resuming normal operation.
    pub fn clear_error(&mut self) -> Option<PinataError> {
        let err = self.err.take();
        if let Some(e) = &err {
            debug!(method = e.method(), reason = %e.reason(), "navigator error cleared");
        }
        err
    }

    /// `Ok(value)` when no error is pending, otherwise a copy of the error.
    /// The navigator keeps its state either way.
    pub fn check<T>(&self, value: T) -> Result<T, PinataError> {
        match &self.err {
            None => Ok(value),
            Some(e) => Err(e.clone()),
        }
    }

    fn skip(&self, method: &'static str) -> bool {
        if self.err.is_some() {
            trace!(method, "skipped, error pending");
            return true;
        }
        false
    }

    fn fail(&mut self, call: &Call<'_, '_>, reason: ErrorReason, advice: impl Into<String>) {
        let err = PinataError::new(
            reason,
            call.method,
            call.args.clone(),
            advice,
            call.node.origin().cloned(),
        );
        debug!(
            method = call.method,
            reason = %reason,
            advice = err.advice(),
            "navigation failed"
        );
        self.err = Some(err);
    }

    // ---- scalar getters ----

    pub fn as_string<'a>(&mut self, node: &Node<'a>) -> &'a str {
        if self.skip("as_string") {
            return "";
        }
        self.string_of(node, &Call::new("as_string", Vec::new(), node))
    }

    pub fn as_float(&mut self, node: &Node<'_>) -> f64 {
        if self.skip("as_float") {
            return 0.0;
        }
        self.float_of(node, &Call::new("as_float", Vec::new(), node))
    }

    pub fn as_bool(&mut self, node: &Node<'_>) -> bool {
        if self.skip("as_bool") {
            return false;
        }
        self.bool_of(node, &Call::new("as_bool", Vec::new(), node))
    }

    /// Succeeds only when the node holds JSON `null`.
    pub fn assert_nil(&mut self, node: &Node<'_>) {
        if self.skip("assert_nil") {
            return;
        }
        self.nil_of(node, &Call::new("assert_nil", Vec::new(), node))
    }

    fn string_of<'a>(&mut self, node: &Node<'a>, call: &Call<'_, '_>) -> &'a str {
        match node.shape() {
            Shape::Scalar(Value::String(s)) => s.as_str(),
            _ => {
                self.fail(call, ErrorReason::IncompatibleType, mismatch(node, "a string"));
                ""
            }
        }
    }

    fn float_of(&mut self, node: &Node<'_>, call: &Call<'_, '_>) -> f64 {
        match node.shape() {
            Shape::Scalar(Value::Number(n)) => n.as_f64().unwrap_or_default(),
            _ => {
                self.fail(call, ErrorReason::IncompatibleType, mismatch(node, "a number"));
                0.0
            }
        }
    }

    fn bool_of(&mut self, node: &Node<'_>, call: &Call<'_, '_>) -> bool {
        match node.shape() {
            Shape::Scalar(Value::Bool(b)) => *b,
            _ => {
                self.fail(call, ErrorReason::IncompatibleType, mismatch(node, "a bool"));
                false
            }
        }
    }

    fn nil_of(&mut self, node: &Node<'_>, call: &Call<'_, '_>) {
        let advice = match node.shape() {
            Shape::Scalar(Value::Null) => return,
            Shape::Map(_) => "this is a map, not null",
            Shape::List(_) => "this is a list, not null",
            Shape::Scalar(_) => "this is not null",
        };
        self.fail(call, ErrorReason::IncompatibleType, advice);
    }

    // ---- indexed access ----

    /// The element at `index` of a list-shaped node.
    ///
    /// An out-of-range index fails with advice naming the valid range,
    /// `specify an index from 0 to {len-1}`; on an empty list the advice is
    /// `the list is empty` instead.
    pub fn at_index<'a>(&mut self, node: &Node<'a>, index: i64) -> Node<'a> {
        if self.skip("at_index") {
            return Node::default();
        }
        let call = Call::new("at_index", index_args(index), node);
        self.index_step(&call, index).unwrap_or_default()
    }

    pub fn at_index_string<'a>(&mut self, node: &Node<'a>, index: i64) -> &'a str {
        if self.skip("at_index_string") {
            return "";
        }
        let call = Call::new("at_index_string", index_args(index), node);
        match self.index_step(&call, index) {
            Some(child) => self.string_of(&child, &call),
            None => "",
        }
    }

    pub fn at_index_float(&mut self, node: &Node<'_>, index: i64) -> f64 {
        if self.skip("at_index_float") {
            return 0.0;
        }
        let call = Call::new("at_index_float", index_args(index), node);
        match self.index_step(&call, index) {
            Some(child) => self.float_of(&child, &call),
            None => 0.0,
        }
    }

    pub fn at_index_bool(&mut self, node: &Node<'_>, index: i64) -> bool {
        if self.skip("at_index_bool") {
            return false;
        }
        let call = Call::new("at_index_bool", index_args(index), node);
        match self.index_step(&call, index) {
            Some(child) => self.bool_of(&child, &call),
            None => false,
        }
    }

    pub fn at_index_nil(&mut self, node: &Node<'_>, index: i64) {
        if self.skip("at_index_nil") {
            return;
        }
        let call = Call::new("at_index_nil", index_args(index), node);
        if let Some(child) = self.index_step(&call, index) {
            self.nil_of(&child, &call);
        }
    }

    fn index_step<'a>(&mut self, call: &Call<'_, 'a>, index: i64) -> Option<Node<'a>> {
        let Some(list) = call.node.as_list() else {
            self.fail(call, ErrorReason::IncompatibleType, "use a list-shaped value");
            return None;
        };
        let element = usize::try_from(index).ok().and_then(|i| list.get(i));
        match element {
            Some(v) => {
                trace!(method = call.method, index, "index resolved");
                Some(Node::derived(v, call.frame()))
            }
            None if list.is_empty() => {
                self.fail(call, ErrorReason::InvalidInput, "the list is empty");
                None
            }
            None => {
                let advice = format!("specify an index from 0 to {}", list.len() - 1);
                self.fail(call, ErrorReason::InvalidInput, advice);
                None
            }
        }
    }

    // ---- path access ----

    /// The value reached by looking up each key of `path` in turn, starting
    /// from a map-shaped node. Every value but the last must itself be a map.
    pub fn at_path<'a, S: AsRef<str>>(&mut self, node: &Node<'a>, path: &[S]) -> Node<'a> {
        if self.skip("at_path") {
            return Node::default();
        }
        let path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        let call = Call::new("at_path", path_args(&path), node);
        self.path_step(&call, &path).unwrap_or_default()
    }

    pub fn at_path_string<'a, S: AsRef<str>>(&mut self, node: &Node<'a>, path: &[S]) -> &'a str {
        if self.skip("at_path_string") {
            return "";
        }
        let path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        let call = Call::new("at_path_string", path_args(&path), node);
        match self.path_step(&call, &path) {
            Some(child) => self.string_of(&child, &call),
            None => "",
        }
    }

    pub fn at_path_float<S: AsRef<str>>(&mut self, node: &Node<'_>, path: &[S]) -> f64 {
        if self.skip("at_path_float") {
            return 0.0;
        }
        let path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        let call = Call::new("at_path_float", path_args(&path), node);
        match self.path_step(&call, &path) {
            Some(child) => self.float_of(&child, &call),
            None => 0.0,
        }
    }

    pub fn at_path_bool<S: AsRef<str>>(&mut self, node: &Node<'_>, path: &[S]) -> bool {
        if self.skip("at_path_bool") {
            return false;
        }
        let path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        let call = Call::new("at_path_bool", path_args(&path), node);
        match self.path_step(&call, &path) {
            Some(child) => self.bool_of(&child, &call),
            None => false,
        }
    }

    pub fn at_path_nil<S: AsRef<str>>(&mut self, node: &Node<'_>, path: &[S]) {
        if self.skip("at_path_nil") {
            return;
        }
        let path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        let call = Call::new("at_path_nil", path_args(&path), node);
        if let Some(child) = self.path_step(&call, &path) {
            self.nil_of(&child, &call);
        }
    }

    fn path_step<'a>(&mut self, call: &Call<'_, 'a>, path: &[&str]) -> Option<Node<'a>> {
        let Some(root) = call.node.as_map() else {
            self.fail(call, ErrorReason::IncompatibleType, "use a map-shaped value");
            return None;
        };
        let Some((last, parents)) = path.split_last() else {
            self.fail(call, ErrorReason::InvalidInput, "specify a path");
            return None;
        };

        let mut current: &'a Map<String, Value> = root;
        for (i, key) in parents.iter().enumerate() {
            match current.get(*key) {
                Some(Value::Object(next)) => current = next,
                Some(_) => {
                    let advice = format!("{} does not hold a map", quoted(&path[..=i]));
                    self.fail(call, ErrorReason::IncompatibleType, advice);
                    return None;
                }
                None => {
                    let advice = format!("{} does not exist", quoted(&path[..=i]));
                    self.fail(call, ErrorReason::NotFound, advice);
                    return None;
                }
            }
        }

        match current.get(*last) {
            Some(v) => {
                trace!(method = call.method, depth = path.len(), "path resolved");
                Some(Node::derived(v, call.frame()))
            }
            None => {
                let advice = format!("{} does not exist", quoted(path));
                self.fail(call, ErrorReason::NotFound, advice);
                None
            }
        }
    }
}
