//! The match and compose engine of rainbow.
//!
//! A [`Program`] is loaded once from a configuration and applied to every
//! line of a stream through a reused [`LineComposer`]:
//!
//! ```
//! use rainbow_lang::{LineComposer, Program, encoder};
//!
//! let mut program: Program = r#"{
//!     filter: {
//!         name: ts
//!         regexp: "^(\d{2}:\d{2}:\d{2})"
//!         properties: { 1: { color: cyan modifiers: [bold] } }
//!     }
//!     apply: { filters: ts }
//! }"#.parse().unwrap();
//!
//! let mut line = LineComposer::new();
//! let mut out = Vec::new();
//! for text in ["12:55:33 hello", "no time"] {
//!     line.init(text.as_bytes().to_vec());
//!     line.apply_program(&mut program).unwrap();
//!     line.output(&mut out, Box::new(encoder::Ansi)).unwrap();
//! }
//!
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "\x1b[1;36m12:55:33\x1b[0m hello\nno time\n"
//! );
//! ```
mod arena;
pub mod encoder;
mod error;
mod filter;
pub mod igor;
mod interval;
mod line;
mod load;
mod program;
mod properties;
mod state;

pub use arena::{Arena, ArenaId};
pub use encoder::Encoder;
pub use error::{CompileError, ConfigError, Error, InnerError};
pub use filter::{Filter, FilterId, FilterSet, PATH_SEPARATOR, Pattern, PatternId, Source};
pub use interval::Interval;
pub use line::{LineComposer, Segment, SegmentId, SegmentPool};
pub use program::{Apply, Program};
pub use properties::{Color, Modifier, Modifiers, Properties};
pub use state::{GENERATIONS, Groups, MatchState};
