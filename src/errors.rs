use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::context::{render_args, render_trail, Argument, Origin};

/// Why a navigation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorReason {
    /// The value's shape or kind does not fit the call.
    IncompatibleType,
    /// A map key along the path does not exist.
    NotFound,
    /// The caller's argument is outside the valid domain.
    InvalidInput,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorReason::IncompatibleType => "incompatible type",
            ErrorReason::NotFound => "not found",
            ErrorReason::InvalidInput => "invalid input",
        })
    }
}

/// The failure a [`Navigator`](crate::Navigator) holds once a call goes wrong.
///
/// Every part is queryable on its own; `Display` joins them into one line,
/// followed by the trail of calls that produced the node (innermost first).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "pinata: {}({}) - {} ({}){}",
    .method,
    render_args(.args),
    .reason,
    .advice,
    ReachedVia(.origin.as_deref())
)]
pub struct PinataError {
    reason: ErrorReason,
    method: &'static str,
    args: Vec<Argument>,
    advice: String,
    origin: Option<Arc<Origin>>,
}

impl PinataError {
    pub(crate) fn new(
        reason: ErrorReason,
        method: &'static str,
        args: Vec<Argument>,
        advice: impl Into<String>,
        origin: Option<Arc<Origin>>,
    ) -> Self {
        Self {
            reason,
            method,
            args,
            advice: advice.into(),
            origin,
        }
    }

    pub fn reason(&self) -> ErrorReason {
        self.reason
    }

    /// Name of the public call that failed.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Arguments the failing call was given.
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Human readable hint on how to fix the call.
    pub fn advice(&self) -> &str {
        &self.advice
    }

    /// The last step that produced the node the failing call ran on.
    pub fn origin(&self) -> Option<&Arc<Origin>> {
        self.origin.as_ref()
    }

    /// Every step from the failing node back to the root, innermost first.
    pub fn trail(&self) -> impl Iterator<Item = &Origin> {
        self.origin.iter().flat_map(|o| o.iter())
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            reason: self.reason,
            method: self.method,
            args: self.args.clone(),
            advice: self.advice.clone(),
            trail: self
                .trail()
                .map(|o| Frame {
                    method: o.method(),
                    args: o.args().to_vec(),
                })
                .collect(),
            message: self.to_string(),
        }
    }
}

struct ReachedVia<'a>(Option<&'a Origin>);

impl fmt::Display for ReachedVia<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(origin) => write!(f, "; reached via {}", render_trail(origin)),
            None => Ok(()),
        }
    }
}

/// Serializable snapshot of a [`PinataError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub reason: ErrorReason,
    pub method: &'static str,
    pub args: Vec<Argument>,
    pub advice: String,
    pub trail: Vec<Frame>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub method: &'static str,
    pub args: Vec<Argument>,
}

/// Errors raised while reading a selector string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("selector syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("selector is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, SelectorError>;
