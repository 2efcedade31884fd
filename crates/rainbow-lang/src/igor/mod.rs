//! igor, the condition language of apply statements.
//!
//! A condition is a list whose head names a function and whose tail holds
//! string literals or nested calls:
//!
//! ```text
//! [and [filter-match? level] [not [equal? [filter-result ts 0] [filter-result ts 1]]]]
//! ```
//!
//! Functions are resolved when a condition is compiled. Host functions
//! receive the host value given to [`Cond::eval`], so conditions always see
//! the live state of the line being processed.
mod builtin;
mod error;
mod value;

use rainbow_config::{Node, Position};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

pub use builtin::{BuiltinFunction, NativeFunction, ParamNum};
pub use error::{CallError, EvalError};
pub use value::{Type, Value};

use crate::error::CompileError;

#[derive(Debug)]
enum Function<H> {
    And,
    Or,
    Builtin(BuiltinFunction<H>),
}

impl<H> Clone for Function<H> {
    fn clone(&self) -> Self {
        match self {
            Function::And => Function::And,
            Function::Or => Function::Or,
            Function::Builtin(f) => Function::Builtin(*f),
        }
    }
}

#[derive(Debug)]
enum Expr<H> {
    Literal(Value),
    Call(Call<H>),
}

#[derive(Debug)]
struct Call<H> {
    pos: Position,
    name: SmolStr,
    function: Function<H>,
    args: Vec<Expr<H>>,
}

impl<H> Expr<H> {
    fn eval(&self, host: &H) -> Result<Value, EvalError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Call(call) => call.eval(host),
        }
    }
}

impl<H> Call<H> {
    fn eval(&self, host: &H) -> Result<Value, EvalError> {
        match &self.function {
            Function::And => {
                let mut result = Value::Bool(true);
                for arg in &self.args {
                    result = arg.eval(host)?;
                    if !result.is_truthy() {
                        break;
                    }
                }
                Ok(result)
            }
            Function::Or => {
                let mut result = Value::Bool(false);
                for arg in &self.args {
                    result = arg.eval(host)?;
                    if result.is_truthy() {
                        break;
                    }
                }
                Ok(result)
            }
            Function::Builtin(f) => {
                let args = self
                    .args
                    .iter()
                    .map(|arg| arg.eval(host))
                    .collect::<Result<Vec<_>, _>>()?;
                f.call(host, &args).map_err(|source| EvalError {
                    pos: self.pos,
                    name: self.name.clone(),
                    source,
                })
            }
        }
    }
}

/// A compiled condition.
#[derive(Debug)]
pub struct Cond<H> {
    call: Call<H>,
}

impl<H> Cond<H> {
    pub fn eval(&self, host: &H) -> Result<bool, EvalError> {
        self.eval_value(host).map(|value| value.is_truthy())
    }

    pub fn eval_value(&self, host: &H) -> Result<Value, EvalError> {
        self.call.eval(host)
    }
}

/// Function table used to compile conditions for host `H`.
#[derive(Debug)]
pub struct Interp<H> {
    functions: FxHashMap<SmolStr, Function<H>>,
}

impl<H> Default for Interp<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Interp<H> {
    /// Creates an interpreter knowing the host independent functions
    /// `not`, `and`, `or` and `equal?`.
    pub fn new() -> Self {
        let mut functions = FxHashMap::default();
        functions.insert(SmolStr::new_static("and"), Function::And);
        functions.insert(SmolStr::new_static("or"), Function::Or);
        functions.insert(
            SmolStr::new_static("not"),
            Function::Builtin(BuiltinFunction::new(ParamNum::Fixed(1), builtin::not::<H>)),
        );
        functions.insert(
            SmolStr::new_static("equal?"),
            Function::Builtin(BuiltinFunction::new(ParamNum::Fixed(2), builtin::equal::<H>)),
        );
        Interp { functions }
    }

    pub fn register(&mut self, name: &str, num_params: ParamNum, func: NativeFunction<H>) {
        self.functions.insert(
            SmolStr::new(name),
            Function::Builtin(BuiltinFunction::new(num_params, func)),
        );
    }

    pub fn compile(&self, node: &Node) -> Result<Cond<H>, CompileError> {
        self.compile_call(node).map(|call| Cond { call })
    }

    fn compile_call(&self, node: &Node) -> Result<Call<H>, CompileError> {
        let list = node.expect_list()?;

        let Some((head, tail)) = list.items.split_first() else {
            return Err(CompileError::MissingFunctionName(list.pos));
        };
        let Some(name) = head.as_string() else {
            return Err(CompileError::ExpectedFunctionName(head.pos()));
        };
        let function = self
            .functions
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| CompileError::UnknownFunction(name.pos, name.value.clone()))?;

        let args = tail
            .iter()
            .map(|arg| match arg {
                Node::String(s) => Ok(Expr::Literal(Value::from(s.as_str()))),
                Node::List(_) => self.compile_call(arg).map(Expr::Call),
                Node::Assoc(assoc) => Err(CompileError::ExpectedStringOrCall(assoc.pos)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Call {
            pos: list.pos,
            name: SmolStr::new(name.as_str()),
            function,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use rstest::rstest;

    /// Host counting how often `count` was called.
    #[derive(Debug, Default)]
    struct Counter {
        calls: Cell<usize>,
    }

    fn count(host: &Counter, args: &[Value]) -> Result<Value, CallError> {
        host.calls.set(host.calls.get() + 1);
        Ok(args.first().cloned().unwrap_or_default())
    }

    fn fail(_: &Counter, _: &[Value]) -> Result<Value, CallError> {
        Err(CallError::InvalidArgument(0, "boom".to_string()))
    }

    fn interp() -> Interp<Counter> {
        let mut interp = Interp::new();
        interp.register("count", ParamNum::Range(0, 1), count);
        interp.register("fail", ParamNum::Any, fail);
        interp
    }

    fn compile(source: &str) -> Result<Cond<Counter>, CompileError> {
        let nodes = rainbow_config::parse(source).unwrap();
        interp().compile(&nodes[0])
    }

    fn eval(source: &str) -> Result<Value, EvalError> {
        compile(source).unwrap().eval_value(&Counter::default())
    }

    #[rstest]
    #[case::not_none("[not [count]]", Value::Bool(true))]
    #[case::not_string("[not a]", Value::Bool(false))]
    #[case::and_empty("[and]", Value::Bool(true))]
    #[case::or_empty("[or]", Value::Bool(false))]
    #[case::and_returns_last("[and a b]", Value::from("b"))]
    #[case::and_stops_at_falsy("[and a [count] b]", Value::None)]
    #[case::or_returns_first_truthy("[or [count] x y]", Value::from("x"))]
    #[case::or_all_falsy("[or [count] [not a]]", Value::Bool(false))]
    #[case::equal_strings("[equal? a a]", Value::Bool(true))]
    #[case::equal_mixed("[equal? a [not a]]", Value::Bool(false))]
    #[case::nested("[and [equal? x x] [not [equal? x y]]]", Value::Bool(true))]
    fn test_eval(#[case] source: &str, #[case] expected: Value) {
        assert_eq!(eval(source), Ok(expected));
    }

    #[rstest]
    #[case::and("[and [not a] [fail]]")]
    #[case::or("[or a [fail]]")]
    fn test_short_circuit_skips_errors(#[case] source: &str) {
        assert!(eval(source).is_ok());
    }

    #[test]
    fn test_short_circuit_skips_evaluation() {
        let cond = compile("[or [count x] [count y] [count z]]").unwrap();
        let host = Counter::default();
        assert_eq!(cond.eval(&host), Ok(true));
        assert_eq!(host.calls.get(), 1);
    }

    #[rstest]
    #[case::arity("[not]", "1:1: not: invalid number of arguments: 0, expected: 1")]
    #[case::arity_nested("[and [equal? a]]", "1:6: equal?: invalid number of arguments: 1, expected: 2")]
    #[case::host("[and a [fail]]", "1:8: fail: invalid argument: 0, boom")]
    fn test_eval_errors(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(eval(source).unwrap_err().to_string(), expected);
    }

    #[rstest]
    #[case::not_a_list("true", "1:1: expected list, found string")]
    #[case::empty("[]", "1:1: missing function name")]
    #[case::head_is_list("[[not a]]", "1:2: expected function name")]
    #[case::unknown("[nope a]", "1:2: unknown function \"nope\"")]
    #[case::nested_unknown("[not [nope]]", "1:7: unknown function \"nope\"")]
    #[case::assoc_argument("[not {a: b}]", "1:6: expected string or function call")]
    fn test_compile_errors(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(compile(source).unwrap_err().to_string(), expected);
    }
}
