use std::fmt::{self, Display, Formatter};

use super::error::CallError;
use super::value::Value;

pub type NativeFunction<H> = fn(&H, &[Value]) -> Result<Value, CallError>;

/// A function implemented in Rust, evaluated against the host `H` it is called for.
pub struct BuiltinFunction<H> {
    pub num_params: ParamNum,
    pub func: NativeFunction<H>,
}

impl<H> Clone for BuiltinFunction<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for BuiltinFunction<H> {}

impl<H> fmt::Debug for BuiltinFunction<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("num_params", &self.num_params)
            .finish_non_exhaustive()
    }
}

impl<H> BuiltinFunction<H> {
    pub fn new(num_params: ParamNum, func: NativeFunction<H>) -> Self {
        BuiltinFunction { num_params, func }
    }

    pub fn call(&self, host: &H, args: &[Value]) -> Result<Value, CallError> {
        if !self.num_params.is_valid(args.len()) {
            return Err(CallError::InvalidNumberOfArguments(
                args.len(),
                self.num_params,
            ));
        }
        (self.func)(host, args)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamNum {
    None,
    Fixed(u8),
    Range(u8, u8),
    Any,
}

impl ParamNum {
    #[inline(always)]
    pub fn is_valid(&self, num_args: usize) -> bool {
        match self {
            ParamNum::None => num_args == 0,
            ParamNum::Fixed(n) => num_args == *n as usize,
            ParamNum::Range(min, max) => num_args >= *min as usize && num_args <= *max as usize,
            ParamNum::Any => true,
        }
    }
}

impl Display for ParamNum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParamNum::None => write!(f, "0"),
            ParamNum::Fixed(n) => write!(f, "{}", n),
            ParamNum::Range(min, max) => write!(f, "{}-{}", min, max),
            ParamNum::Any => write!(f, "any"),
        }
    }
}

pub(super) fn not<H>(_: &H, args: &[Value]) -> Result<Value, CallError> {
    match args {
        [arg] => Ok(Value::Bool(!arg.is_truthy())),
        _ => unreachable!(),
    }
}

pub(super) fn equal<H>(_: &H, args: &[Value]) -> Result<Value, CallError> {
    match args {
        [a, b] => Ok(Value::Bool(a.is_equal(b))),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ParamNum::None, 0, true)]
    #[case(ParamNum::None, 1, false)]
    #[case(ParamNum::Fixed(2), 2, true)]
    #[case(ParamNum::Fixed(2), 3, false)]
    #[case(ParamNum::Range(1, 3), 0, false)]
    #[case(ParamNum::Range(1, 3), 3, true)]
    #[case(ParamNum::Any, 300, true)]
    fn test_param_num_is_valid(#[case] num: ParamNum, #[case] args: usize, #[case] expected: bool) {
        assert_eq!(num.is_valid(args), expected);
    }

    #[test]
    fn test_call_checks_arity() {
        let f = BuiltinFunction::<()>::new(ParamNum::Fixed(1), not);
        assert_eq!(f.call(&(), &[Value::None]), Ok(Value::Bool(true)));
        assert_eq!(
            f.call(&(), &[]).unwrap_err().to_string(),
            "invalid number of arguments: 0, expected: 1"
        );
    }

    #[rstest]
    #[case(Value::from("a"), Value::from("a"), true)]
    #[case(Value::from("a"), Value::Bool(true), false)]
    fn test_equal(#[case] a: Value, #[case] b: Value, #[case] expected: bool) {
        assert_eq!(equal(&(), &[a, b]), Ok(Value::Bool(expected)));
    }
}
