use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use miette::{Diagnostic, SourceOffset, SourceSpan};
use rainbow_config::{ParseError, Position, TypeError};
use strum::IntoEnumIterator;

use crate::igor::EvalError;
use crate::properties::{Color, Modifier};

/// The configuration does not describe a valid program.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, strum::IntoStaticStr)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("{source} when parsing {param:?}")]
    Parameter {
        source: TypeError,
        param: &'static str,
    },
    #[error("{0}: unknown parameter {1:?}")]
    UnknownParameter(Position, String),
    #[error("{0}: missing parameter {1:?}")]
    MissingParameter(Position, &'static str),
    #[error("{0}: duplicate parameter {1:?}")]
    DuplicateParameter(Position, String),
    #[error("{0}: parameters {1:?} and {2:?} are mutually exclusive")]
    ExclusiveParameters(Position, &'static str, &'static str),
    #[error("{0}: filter name must not contain \"/\"")]
    InvalidFilterName(Position),
    #[error("{0}: duplicate filter {1:?}")]
    DuplicateFilter(Position, String),
    #[error("{0}: referenced filter {1:?} does not exist")]
    UnknownFilter(Position, String),
    #[error("{0}: invalid regexp group {1:?}")]
    InvalidGroup(Position, String),
    #[error("{0}: unknown color {1:?}")]
    UnknownColor(Position, String),
    #[error("{0}: unknown modifier {1:?}")]
    UnknownModifier(Position, String),
    #[error("expected one association list")]
    ExpectedOneAssoc,
    #[error("{0}: trailing data")]
    TrailingData(Position),
}

impl ConfigError {
    pub fn position(&self) -> Option<Position> {
        match self {
            ConfigError::Parse(err) => Some(err.position()),
            ConfigError::Type(err) | ConfigError::Parameter { source: err, .. } => Some(err.pos),
            ConfigError::UnknownParameter(pos, _)
            | ConfigError::MissingParameter(pos, _)
            | ConfigError::DuplicateParameter(pos, _)
            | ConfigError::ExclusiveParameters(pos, _, _)
            | ConfigError::InvalidFilterName(pos)
            | ConfigError::DuplicateFilter(pos, _)
            | ConfigError::UnknownFilter(pos, _)
            | ConfigError::InvalidGroup(pos, _)
            | ConfigError::UnknownColor(pos, _)
            | ConfigError::UnknownModifier(pos, _)
            | ConfigError::TrailingData(pos) => Some(*pos),
            ConfigError::ExpectedOneAssoc => None,
        }
    }
}

/// A well formed configuration refers to something that cannot be built.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, strum::IntoStaticStr)]
pub enum CompileError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("{0}: invalid regexp: {1}")]
    InvalidRegex(Position, String),
    #[error("{0}: referenced filter {1:?} does not exist")]
    DanglingReference(Position, String),
    #[error("{0}: referenced filter {1:?} has no regexp")]
    MissingRegexp(Position, String),
    #[error("{0}: missing function name")]
    MissingFunctionName(Position),
    #[error("{0}: expected function name")]
    ExpectedFunctionName(Position),
    #[error("{0}: unknown function {1:?}")]
    UnknownFunction(Position, String),
    #[error("{0}: expected string or function call")]
    ExpectedStringOrCall(Position),
}

impl CompileError {
    pub fn position(&self) -> Position {
        match self {
            CompileError::Type(err) => err.pos,
            CompileError::InvalidRegex(pos, _)
            | CompileError::DanglingReference(pos, _)
            | CompileError::MissingRegexp(pos, _)
            | CompileError::MissingFunctionName(pos)
            | CompileError::ExpectedFunctionName(pos)
            | CompileError::UnknownFunction(pos, _)
            | CompileError::ExpectedStringOrCall(pos) => *pos,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum InnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<ParseError> for InnerError {
    fn from(err: ParseError) -> Self {
        InnerError::Config(err.into())
    }
}

impl From<TypeError> for InnerError {
    fn from(err: TypeError) -> Self {
        InnerError::Config(err.into())
    }
}

impl InnerError {
    pub fn position(&self) -> Option<Position> {
        match self {
            InnerError::Config(err) => err.position(),
            InnerError::Compile(err) => Some(err.position()),
            InnerError::Eval(err) => Some(err.pos),
        }
    }

    fn code(&self) -> String {
        match self {
            InnerError::Config(err) => format!("ConfigError::{}", <&str>::from(err)),
            InnerError::Compile(err) => format!("CompileError::{}", <&str>::from(err)),
            InnerError::Eval(_) => "EvalError".to_string(),
        }
    }
}

/// An error tied to a configuration source, ready to be reported to the user.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Error {
    /// The underlying cause of the error.
    pub cause: InnerError,
    /// Name of the configuration, usually its path.
    pub source_name: String,
    /// The configuration text the error points into.
    pub source_code: String,
    /// The location in the source code for diagnostics.
    pub location: SourceSpan,
}

impl Error {
    pub fn from_error(
        source_name: impl Into<String>,
        source_code: impl Into<String>,
        cause: impl Into<InnerError>,
    ) -> Self {
        let cause = cause.into();
        let source_code = source_code.into();
        let location = match cause.position() {
            Some(pos) => {
                let offset = pos.offset.min(source_code.len());
                let len = if offset < source_code.len() { 1 } else { 0 };
                SourceSpan::new(SourceOffset::from(offset), len)
            }
            None => SourceSpan::new(SourceOffset::from(0), 0),
        };

        Self {
            cause,
            source_name: source_name.into(),
            source_code,
            location,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.cause.position().is_some() {
            write!(f, "{}:{}", self.source_name, self.cause)
        } else {
            write!(f, "{}: {}", self.source_name, self.cause)
        }
    }
}

impl std::error::Error for Error {}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.cause.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Config(ConfigError::Parse(_)) => {
                "Check for unbalanced brackets, braces or quotes.".to_string()
            }
            InnerError::Config(ConfigError::UnknownParameter(..)) => {
                "Known parameters are \"filter\" and \"apply\" at the top level, \"name\", \"regexp\", \"regexpFrom\", \"properties\" and \"filter\" in filters, \"cond\" and \"filters\" in apply statements.".to_string()
            }
            InnerError::Config(ConfigError::UnknownColor(..)) => format!(
                "Known colors are: none, {}.",
                Color::iter().map(Color::name).join(", ")
            ),
            InnerError::Config(ConfigError::UnknownModifier(..)) => format!(
                "Known modifiers are: {}.",
                Modifier::iter().map(Modifier::name).join(", ")
            ),
            InnerError::Config(ConfigError::InvalidGroup(..)) => {
                "Properties are keyed by capture group numbers starting at 1.".to_string()
            }
            InnerError::Config(ConfigError::UnknownFilter(..))
            | InnerError::Compile(CompileError::DanglingReference(..)) => {
                "Filters are referenced by \"/\" separated paths of names starting at a top level filter, and must be declared before use.".to_string()
            }
            InnerError::Compile(CompileError::InvalidRegex(..)) => {
                "Patterns use the syntax of the regex crate.".to_string()
            }
            InnerError::Compile(CompileError::UnknownFunction(..)) => {
                "Known functions are: not, and, or, equal?, filter-match?, filter-result.".to_string()
            }
            InnerError::Eval(_) => {
                "The condition failed while processing this line.".to_string()
            }
            _ => return None,
        };

        Some(Box::new(msg))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            miette::LabeledSpan::new_with_span(Some(format!("{}", self.cause)), self.location),
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use smol_str::SmolStr;

    use crate::igor::CallError;

    #[rstest]
    #[case::config(
        ConfigError::UnknownParameter(Position::new(2, 3, 5), "colour".to_string()),
        "rules.rainbow:2:3: unknown parameter \"colour\""
    )]
    #[case::without_position(ConfigError::ExpectedOneAssoc, "rules.rainbow: expected one association list")]
    #[case::exclusive(
        ConfigError::ExclusiveParameters(Position::new(1, 1, 0), "regexp", "regexpFrom"),
        "rules.rainbow:1:1: parameters \"regexp\" and \"regexpFrom\" are mutually exclusive"
    )]
    fn test_display(#[case] cause: ConfigError, #[case] expected: &str) {
        let err = Error::from_error("rules.rainbow", "{\n  colour: red\n}", cause);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_eval_error_display() {
        let cause = EvalError {
            pos: Position::new(4, 10, 40),
            name: SmolStr::new("filter-match?"),
            source: CallError::missing_filter(0, "nope"),
        };
        let err = Error::from_error("x", "", cause);
        assert_eq!(
            err.to_string(),
            "x:4:10: filter-match?: invalid argument: 0, missing filter \"nope\""
        );
    }

    #[rstest]
    #[case::inside(Position::new(1, 3, 2), "abcd", SourceSpan::new(2.into(), 1))]
    #[case::at_end(Position::new(1, 5, 4), "abcd", SourceSpan::new(4.into(), 0))]
    fn test_location(#[case] pos: Position, #[case] source: &str, #[case] expected: SourceSpan) {
        let err = Error::from_error("x", source, ConfigError::TrailingData(pos));
        assert_eq!(err.location, expected);
    }

    #[rstest]
    #[case(
        InnerError::Config(ConfigError::TrailingData(Position::default())),
        "ConfigError::TrailingData"
    )]
    #[case(
        InnerError::Compile(CompileError::MissingFunctionName(Position::default())),
        "CompileError::MissingFunctionName"
    )]
    fn test_code(#[case] cause: InnerError, #[case] expected: &str) {
        let err = Error::from_error("x", "", cause);
        assert_eq!(err.code().unwrap().to_string(), expected);
    }

    #[rstest]
    #[case::color(
        ConfigError::UnknownColor(Position::default(), "pink".to_string()),
        "Known colors are: none, black, red, green, yellow, blue, magenta, cyan, white, iblack, ired, igreen, iyellow, iblue, imagenta, icyan, iwhite."
    )]
    #[case::modifier(
        ConfigError::UnknownModifier(Position::default(), "italic".to_string()),
        "Known modifiers are: bold, underline, reverse, blink."
    )]
    fn test_help(#[case] cause: ConfigError, #[case] expected: &str) {
        let err = Error::from_error("x", "", cause);
        assert_eq!(err.help().unwrap().to_string(), expected);
    }
}
