use std::fmt::{self, Display, Formatter};

use crate::error::TypeError;
use crate::range::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Assoc,
    List,
    String,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Assoc => write!(f, "association list"),
            Kind::List => write!(f, "list"),
            Kind::String => write!(f, "string"),
        }
    }
}

/// A string with the position where it started in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    pub value: String,
    pub pos: Position,
}

impl Str {
    pub fn new(value: impl Into<String>, pos: Position) -> Self {
        Self {
            value: value.into(),
            pos,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Display for Str {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: Str,
    pub value: Node,
}

/// An ordered list of key/value pairs. Keys may repeat; the reader decides
/// what a repeated key means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assoc {
    pub pairs: Vec<Pair>,
    pub pos: Position,
}

impl Assoc {
    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub items: Vec<Node>,
    pub pos: Position,
}

impl List {
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Assoc(Assoc),
    List(List),
    String(Str),
}

impl Node {
    pub fn pos(&self) -> Position {
        match self {
            Node::Assoc(assoc) => assoc.pos,
            Node::List(list) => list.pos,
            Node::String(s) => s.pos,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Node::Assoc(_) => Kind::Assoc,
            Node::List(_) => Kind::List,
            Node::String(_) => Kind::String,
        }
    }

    pub fn as_assoc(&self) -> Option<&Assoc> {
        match self {
            Node::Assoc(assoc) => Some(assoc),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&Str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn expect_assoc(&self) -> Result<&Assoc, TypeError> {
        self.as_assoc().ok_or_else(|| self.type_error(Kind::Assoc))
    }

    pub fn expect_list(&self) -> Result<&List, TypeError> {
        self.as_list().ok_or_else(|| self.type_error(Kind::List))
    }

    pub fn expect_string(&self) -> Result<&Str, TypeError> {
        self.as_string().ok_or_else(|| self.type_error(Kind::String))
    }

    /// Accepts either a single string or a list made only of strings.
    pub fn expect_string_list(&self) -> Result<Vec<&Str>, TypeError> {
        match self {
            Node::String(s) => Ok(vec![s]),
            Node::List(list) => list.iter().map(Node::expect_string).collect(),
            Node::Assoc(_) => Err(self.type_error(Kind::List)),
        }
    }

    fn type_error(&self, expected: Kind) -> TypeError {
        TypeError {
            pos: self.pos(),
            expected,
            found: self.kind(),
        }
    }
}
