use std::fmt::{self, Display, Formatter};

use nom_locate::LocatedSpan;

pub type Span<'a> = LocatedSpan<&'a str>;

/// A location in the configuration source.
///
/// `line` and `column` are 1-based and meant for humans, `offset` is the byte
/// offset from the start of the source and meant for diagnostics.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub struct Position {
    pub line: u32,
    pub column: usize,
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Position {
    pub fn new(line: u32, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl<'a> From<Span<'a>> for Position {
    fn from(span: Span<'a>) -> Self {
        Position {
            line: span.location_line(),
            column: span.get_utf8_column(),
            offset: span.location_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::Parser;
    use rstest::rstest;

    #[rstest]
    #[case(Position::new(1, 1, 0), "1:1")]
    #[case(Position::new(12, 7, 200), "12:7")]
    fn test_display(#[case] position: Position, #[case] expected: &str) {
        assert_eq!(position.to_string(), expected);
    }

    #[test]
    fn test_from_span() {
        let span = Span::new("ab\ncd");
        let (rest, _) = nom::bytes::complete::tag::<_, _, nom::error::Error<Span>>("ab\nc")
            .parse(span)
            .unwrap();
        assert_eq!(Position::from(rest), Position::new(2, 2, 4));
    }
}
