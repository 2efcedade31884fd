use nom::bytes::complete::{is_not, take, take_while1};
use nom::character::complete::char;
use nom::combinator::{map, opt, value};
use nom::multi::many0_count;
use nom::sequence::preceded;
use nom::{IResult, Parser, branch::alt};
use nom_locate::position;

use crate::error::ParseError;
use crate::node::{Assoc, List, Node, Pair, Str};
use crate::range::{Position, Span};

const DELIMITERS: &str = "{}[]:\"#,";

#[derive(Debug, Clone, Copy, PartialEq)]
enum SyntaxErrorKind {
    Unexpected,
    UnterminatedString,
    UnterminatedAssoc,
    UnterminatedList,
    ExpectedKey,
    ExpectedColon,
}

#[derive(Debug, Clone, PartialEq)]
struct SyntaxError<'a> {
    span: Span<'a>,
    kind: SyntaxErrorKind,
}

impl<'a> SyntaxError<'a> {
    fn failure<T>(span: Span<'a>, kind: SyntaxErrorKind) -> Result<T, nom::Err<Self>> {
        Err(nom::Err::Failure(SyntaxError { span, kind }))
    }
}

impl<'a> nom::error::ParseError<Span<'a>> for SyntaxError<'a> {
    fn from_error_kind(span: Span<'a>, _: nom::error::ErrorKind) -> Self {
        SyntaxError {
            span,
            kind: SyntaxErrorKind::Unexpected,
        }
    }

    fn append(_: Span<'a>, _: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl SyntaxError<'_> {
    fn into_parse_error(self) -> ParseError {
        let pos = Position::from(self.span);
        match self.kind {
            SyntaxErrorKind::Unexpected => match self.span.fragment().chars().next() {
                Some(c) => ParseError::UnexpectedChar(pos, c),
                None => ParseError::UnexpectedEof(pos),
            },
            SyntaxErrorKind::UnterminatedString => ParseError::UnterminatedString(pos),
            SyntaxErrorKind::UnterminatedAssoc => ParseError::UnterminatedAssoc(pos),
            SyntaxErrorKind::UnterminatedList => ParseError::UnterminatedList(pos),
            SyntaxErrorKind::ExpectedKey => ParseError::ExpectedKey(pos),
            SyntaxErrorKind::ExpectedColon => ParseError::ExpectedColon(pos),
        }
    }
}

type ParseResult<'a, T> = IResult<Span<'a>, T, SyntaxError<'a>>;

/// Parses a whole configuration document into its top level elements.
pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    let mut rest = Span::new(input);
    let mut nodes = Vec::new();

    loop {
        rest = trivia(rest).map_err(to_parse_error)?.0;
        if rest.fragment().is_empty() {
            break;
        }
        let (next, node) = element(rest).map_err(to_parse_error)?;
        nodes.push(node);
        rest = next;
    }

    Ok(nodes)
}

fn to_parse_error(err: nom::Err<SyntaxError<'_>>) -> ParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.into_parse_error(),
        nom::Err::Incomplete(_) => unreachable!("complete parsers never report incomplete input"),
    }
}

fn comment(input: Span) -> ParseResult<()> {
    value((), preceded(char('#'), opt(is_not("\n")))).parse(input)
}

fn separator(input: Span) -> ParseResult<()> {
    value((), take_while1(|c: char| c.is_whitespace() || c == ',')).parse(input)
}

fn trivia(input: Span) -> ParseResult<()> {
    value((), many0_count(alt((separator, comment)))).parse(input)
}

fn bare_string(input: Span) -> ParseResult<Str> {
    let (rest, start) = position(input)?;
    let (rest, text) =
        take_while1(|c: char| !c.is_whitespace() && !DELIMITERS.contains(c)).parse(rest)?;
    Ok((rest, Str::new(*text.fragment(), start.into())))
}

fn quoted_string(input: Span) -> ParseResult<Str> {
    let (rest, start) = position(input)?;
    let (rest, _) = char('"').parse(rest)?;

    let mut text = String::new();
    let mut consumed = 0usize;
    let mut chars = rest.fragment().chars();

    loop {
        match chars.next() {
            Some('"') => {
                consumed += 1;
                break;
            }
            Some('\\') => {
                let escaped = match chars.next() {
                    Some(c) => c,
                    None => return SyntaxError::failure(start, SyntaxErrorKind::UnterminatedString),
                };
                match escaped {
                    '"' => text.push('"'),
                    '\\' => text.push('\\'),
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    c => {
                        // Unknown escapes stay verbatim so regular expressions read naturally.
                        text.push('\\');
                        text.push(c);
                    }
                }
                consumed += 2;
            }
            Some(c) => {
                text.push(c);
                consumed += 1;
            }
            None => return SyntaxError::failure(start, SyntaxErrorKind::UnterminatedString),
        }
    }

    let (rest, _) = take(consumed).parse(rest)?;
    Ok((rest, Str::new(text, start.into())))
}

fn string(input: Span) -> ParseResult<Str> {
    alt((quoted_string, bare_string)).parse(input)
}

fn assoc(input: Span) -> ParseResult<Node> {
    let (mut rest, start) = position(input)?;
    rest = char('{').parse(rest)?.0;
    let mut pairs = Vec::new();

    loop {
        rest = trivia(rest)?.0;
        if let Ok((next, _)) = char::<Span, SyntaxError>('}').parse(rest) {
            rest = next;
            break;
        }
        if rest.fragment().is_empty() {
            return SyntaxError::failure(start, SyntaxErrorKind::UnterminatedAssoc);
        }

        let (next, key) = match string(rest) {
            Ok(ok) => ok,
            Err(nom::Err::Error(_)) => {
                return SyntaxError::failure(rest, SyntaxErrorKind::ExpectedKey);
            }
            Err(err) => return Err(err),
        };
        let next = trivia(next)?.0;
        let next = match char::<Span, SyntaxError>(':').parse(next) {
            Ok((next, _)) => next,
            Err(_) => return SyntaxError::failure(next, SyntaxErrorKind::ExpectedColon),
        };
        let next = trivia(next)?.0;
        let (next, value) = required_element(next)?;

        pairs.push(Pair { key, value });
        rest = next;
    }

    Ok((
        rest,
        Node::Assoc(Assoc {
            pairs,
            pos: start.into(),
        }),
    ))
}

fn list(input: Span) -> ParseResult<Node> {
    let (mut rest, start) = position(input)?;
    rest = char('[').parse(rest)?.0;
    let mut items = Vec::new();

    loop {
        rest = trivia(rest)?.0;
        if let Ok((next, _)) = char::<Span, SyntaxError>(']').parse(rest) {
            rest = next;
            break;
        }
        if rest.fragment().is_empty() {
            return SyntaxError::failure(start, SyntaxErrorKind::UnterminatedList);
        }

        let (next, item) = required_element(rest)?;
        items.push(item);
        rest = next;
    }

    Ok((
        rest,
        Node::List(List {
            items,
            pos: start.into(),
        }),
    ))
}

fn element(input: Span) -> ParseResult<Node> {
    alt((assoc, list, map(string, Node::String))).parse(input)
}

fn required_element(input: Span) -> ParseResult<Node> {
    match element(input) {
        Err(nom::Err::Error(_)) => SyntaxError::failure(input, SyntaxErrorKind::Unexpected),
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pos(line: u32, column: usize, offset: usize) -> Position {
        Position::new(line, column, offset)
    }

    fn s(value: &str, pos: Position) -> Node {
        Node::String(Str::new(value, pos))
    }

    #[rstest]
    #[case::empty("", vec![])]
    #[case::comment_only("  # nothing here\n", vec![])]
    #[case::bare("cyan", vec![s("cyan", pos(1, 1, 0))])]
    #[case::quoted(r#""a b""#, vec![s("a b", pos(1, 1, 0))])]
    #[case::escapes(r#""\"\\\n\t""#, vec![s("\"\\\n\t", pos(1, 1, 0))])]
    #[case::regex_escape_kept(r#""^(\d{2}:\d{2})""#, vec![s(r"^(\d{2}:\d{2})", pos(1, 1, 0))])]
    #[case::quoted_then_bare(r#""é:" x"#, vec![s("é:", pos(1, 1, 0)), s("x", pos(1, 6, 6))])]
    #[case::several("a b,c", vec![s("a", pos(1, 1, 0)), s("b", pos(1, 3, 2)), s("c", pos(1, 5, 4))])]
    #[case::list("[bold underline]", vec![Node::List(List {
        items: vec![s("bold", pos(1, 2, 1)), s("underline", pos(1, 7, 6))],
        pos: pos(1, 1, 0),
    })])]
    #[case::assoc("{ color: cyan }", vec![Node::Assoc(Assoc {
        pairs: vec![Pair { key: Str::new("color", pos(1, 3, 2)), value: s("cyan", pos(1, 10, 9)) }],
        pos: pos(1, 1, 0),
    })])]
    #[case::nested("{\n  1: {modifiers: [bold]}\n}", vec![Node::Assoc(Assoc {
        pairs: vec![Pair {
            key: Str::new("1", pos(2, 3, 4)),
            value: Node::Assoc(Assoc {
                pairs: vec![Pair {
                    key: Str::new("modifiers", pos(2, 7, 8)),
                    value: Node::List(List { items: vec![s("bold", pos(2, 19, 20))], pos: pos(2, 18, 19) }),
                }],
                pos: pos(2, 6, 7),
            }),
        }],
        pos: pos(1, 1, 0),
    })])]
    fn test_parse(#[case] input: &str, #[case] expected: Vec<Node>) {
        assert_eq!(parse(input), Ok(expected));
    }

    #[test]
    fn test_parse_repeated_keys_keep_order() {
        let nodes = parse("{ filter: a filter: b apply: c }").unwrap();
        let keys = nodes[0]
            .expect_assoc()
            .unwrap()
            .iter()
            .map(|pair| pair.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["filter", "filter", "apply"]);
    }

    #[test]
    fn test_parse_condition_list() {
        let nodes = parse("[and [filter-match? ts] [not [equal? a b]]]").unwrap();
        let list = nodes[0].expect_list().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.items[0].expect_string().unwrap().as_str(), "and");
        assert_eq!(
            list.items[1].expect_list().unwrap().items[0]
                .expect_string()
                .unwrap()
                .as_str(),
            "filter-match?"
        );
    }

    #[rstest]
    #[case::unterminated_string("\"abc", ParseError::UnterminatedString(pos(1, 1, 0)))]
    #[case::unterminated_escape("\"abc\\", ParseError::UnterminatedString(pos(1, 1, 0)))]
    #[case::unterminated_assoc("{ a: b", ParseError::UnterminatedAssoc(pos(1, 1, 0)))]
    #[case::unterminated_list("x [a b", ParseError::UnterminatedList(pos(1, 3, 2)))]
    #[case::missing_colon("{ a b }", ParseError::ExpectedColon(pos(1, 5, 4)))]
    #[case::missing_key("{ [a]: b }", ParseError::ExpectedKey(pos(1, 3, 2)))]
    #[case::missing_value("{ a: }", ParseError::UnexpectedChar(pos(1, 6, 5), '}'))]
    #[case::value_at_eof("{ a:", ParseError::UnexpectedEof(pos(1, 5, 4)))]
    #[case::stray_close("a ]", ParseError::UnexpectedChar(pos(1, 3, 2), ']'))]
    fn test_parse_errors(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse(input), Err(expected));
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            parse("{\n  a b\n}").unwrap_err().to_string(),
            "2:5: expected ':' after key"
        );
    }
}
