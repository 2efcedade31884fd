use thiserror::Error;

use crate::node::Kind;
use crate::range::Position;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("{0}: unexpected character {1:?}")]
    UnexpectedChar(Position, char),
    #[error("{0}: unexpected end of input")]
    UnexpectedEof(Position),
    #[error("{0}: unterminated string")]
    UnterminatedString(Position),
    #[error("{0}: unterminated association list")]
    UnterminatedAssoc(Position),
    #[error("{0}: unterminated list")]
    UnterminatedList(Position),
    #[error("{0}: expected key")]
    ExpectedKey(Position),
    #[error("{0}: expected ':' after key")]
    ExpectedColon(Position),
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedChar(pos, _)
            | ParseError::UnexpectedEof(pos)
            | ParseError::UnterminatedString(pos)
            | ParseError::UnterminatedAssoc(pos)
            | ParseError::UnterminatedList(pos)
            | ParseError::ExpectedKey(pos)
            | ParseError::ExpectedColon(pos) => *pos,
        }
    }
}

/// Raised by the typed accessors of [`crate::Node`] when a node has another shape.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("{pos}: expected {expected}, found {found}")]
pub struct TypeError {
    pub pos: Position,
    pub expected: Kind,
    pub found: Kind,
}
