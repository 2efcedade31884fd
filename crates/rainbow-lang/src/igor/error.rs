use rainbow_config::Position;
use smol_str::SmolStr;
use thiserror::Error;

use super::builtin::ParamNum;
use super::value::{Type, Value};

/// Why a function refused its arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("invalid number of arguments: {0}, expected: {1}")]
    InvalidNumberOfArguments(usize, ParamNum),
    #[error("invalid argument: {0}, {1}")]
    InvalidArgument(usize, String),
    #[error("type error: argument {index} ({found}) is not {expected}")]
    TypeError {
        index: usize,
        found: Type,
        expected: Type,
    },
}

impl CallError {
    pub fn type_error(index: usize, arg: &Value, expected: Type) -> Self {
        CallError::TypeError {
            index,
            found: arg.type_of(),
            expected,
        }
    }

    pub fn missing_filter(index: usize, path: &str) -> Self {
        CallError::InvalidArgument(index, format!("missing filter {:?}", path))
    }
}

/// A failed call, located at the list that spelled it out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{pos}: {name}: {source}")]
pub struct EvalError {
    pub pos: Position,
    pub name: SmolStr,
    #[source]
    pub source: CallError,
}
