//! `rainbow-config` parses the configuration text format used by rainbow into a
//! tree of positioned nodes.
//!
//! The format knows three shapes: association lists (`{ key: value }`), lists
//! (`[ a b c ]`) and strings (bare words or `"quoted"`). Keys may repeat and
//! every node remembers where it started so that readers can report errors
//! against the source.
//!
//! ```rust
//! let nodes = rainbow_config::parse("{ filter: { name: ts regexp: \"^(\\d+)\" } }").unwrap();
//! let root = nodes[0].expect_assoc().unwrap();
//!
//! assert_eq!(root.pairs[0].key.as_str(), "filter");
//! assert_eq!(root.pos.to_string(), "1:1");
//! ```
mod error;
mod node;
mod parser;
mod range;

pub use error::{ParseError, TypeError};
pub use node::{Assoc, Kind, List, Node, Pair, Str};
pub use parser::parse;
pub use range::Position;
