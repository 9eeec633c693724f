//! Diagnostic context: which calls were made, with what arguments.

use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A snapshot of one argument passed to a navigation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Argument {
    Index(i64),
    Key(String),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Index(i) => write!(f, "{i}"),
            Argument::Key(k) => write!(f, "{k:?}"),
        }
    }
}

impl From<i64> for Argument {
    fn from(i: i64) -> Self {
        Argument::Index(i)
    }
}

impl From<&str> for Argument {
    fn from(k: &str) -> Self {
        Argument::Key(k.to_string())
    }
}

/// Render an argument list the way it was written at the call site: `"a", "b"`.
pub(crate) fn render_args(args: &[Argument]) -> String {
    args.iter().join(", ")
}

/// One frame of a navigation trail.
///
/// Frames are immutable and only ever point at an older frame, so a chain
/// always ends at the root step.
#[derive(Debug, PartialEq, Eq)]
pub struct Origin {
    method: &'static str,
    args: Vec<Argument>,
    parent: Option<Arc<Origin>>,
}

impl Origin {
    pub fn new(method: &'static str, args: Vec<Argument>, parent: Option<Arc<Origin>>) -> Arc<Self> {
        Arc::new(Self { method, args, parent })
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    pub fn parent(&self) -> Option<&Arc<Origin>> {
        self.parent.as_ref()
    }

    /// Walk the trail from this frame back to the first step taken from the root.
    pub fn iter(&self) -> Trail<'_> {
        Trail { next: Some(self) }
    }

    pub fn depth(&self) -> usize {
        self.iter().count()
    }
}

/// Renders only this frame: `at_path("a", "b")`.
impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.method, render_args(&self.args))
    }
}

/// Iterator over an origin chain, innermost frame first.
#[derive(Debug, Clone)]
pub struct Trail<'a> {
    next: Option<&'a Origin>,
}

impl<'a> Iterator for Trail<'a> {
    type Item = &'a Origin;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = cur.parent.as_deref();
        Some(cur)
    }
}

/// ` <- `-joined rendering of a whole trail, innermost first.
pub(crate) fn render_trail(origin: &Origin) -> String {
    origin.iter().join(" <- ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arguments_render_like_call_sites() {
        let args = vec![Argument::from("a"), Argument::Index(2), Argument::from("say \"hi\"")];
        assert_eq!(render_args(&args), r#""a", 2, "say \"hi\"""#);
        assert_eq!(render_args(&[]), "");
    }

    #[test]
    fn trail_runs_innermost_to_outermost() {
        let root_step = Origin::new("at_path", vec!["items".into()], None);
        let second = Origin::new("at_index", vec![Argument::Index(0)], Some(root_step));
        let third = Origin::new("at_path", vec!["name".into(), "first".into()], Some(second));

        let methods: Vec<_> = third.iter().map(Origin::method).collect();
        assert_eq!(methods, vec!["at_path", "at_index", "at_path"]);
        assert_eq!(third.depth(), 3);
        assert_eq!(
            render_trail(&third),
            r#"at_path("name", "first") <- at_index(0) <- at_path("items")"#
        );
    }
}
