//! Beat typed values out of decoded JSON without a type check at every step.
//!
//! ```
//! use pinata::{Navigator, Node};
//! use serde_json::json;
//!
//! let doc = json!({"user": {"name": "Ada", "tags": ["admin"]}});
//! let root = Node::new(&doc);
//! let mut nav = Navigator::new();
//!
//! let name = nav.at_path_string(&root, &["user", "name"]);
//! let tags = nav.at_path(&root, &["user", "tags"]);
//! let first_tag = nav.at_index_string(&tags, 0);
//! assert!(nav.check(()).is_ok());
//! assert_eq!((name, first_tag), ("Ada", "admin"));
//! ```
pub mod context;
pub mod errors;
pub mod navigator;
pub mod node;
pub mod pinata;
pub mod selector;

pub use context::{Argument, Origin};
pub use errors::{ErrorReason, ErrorReport, PinataError, SelectorError};
pub use navigator::Navigator;
pub use node::{Node, Shape};
pub use pinata::Pinata;
pub use selector::{Selector, Step};
