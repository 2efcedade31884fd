use std::str::FromStr;

use rainbow_config::Node;
use smol_str::SmolStr;

use crate::error::{ConfigError, Error, InnerError};
use crate::filter::{FilterId, FilterSet};
use crate::igor::{CallError, Cond, EvalError, Interp, ParamNum, Type, Value};
use crate::line::LineComposer;
use crate::load::{self, *};
use crate::state::GENERATIONS;

/// Filters to apply to a line, guarded by an optional condition.
#[derive(Debug)]
pub struct Apply {
    pub cond: Option<Cond<FilterSet>>,
    pub filters: Vec<FilterId>,
}

/// A loaded configuration, reused for every line of a stream.
#[derive(Debug)]
pub struct Program {
    name: String,
    source: String,
    filters: FilterSet,
    statements: Vec<Apply>,
}

impl FromStr for Program {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Program::new("<stream>", source)
    }
}

impl Program {
    /// Loads the program described by `source`. `name` is only used in error messages.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let source = source.into();

        match load_program(&source) {
            Ok((filters, statements)) => {
                tracing::debug!(
                    program = %name,
                    filters = filters.len(),
                    statements = statements.len(),
                    "program loaded"
                );
                Ok(Program {
                    name,
                    source,
                    filters,
                    statements,
                })
            }
            Err(cause) => Err(Error::from_error(name, source, cause)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn statements(&self) -> &[Apply] {
        &self.statements
    }

    /// Applies the statements to the current line of `line`, then moves every
    /// match state on to the next line, even when a condition failed.
    pub(crate) fn run(&mut self, line: &mut LineComposer) -> Result<(), Error> {
        let result = self.apply_statements(line);
        self.filters.rotate();
        result.map_err(|err| Error::from_error(self.name.as_str(), self.source.as_str(), err))
    }

    fn apply_statements(&mut self, line: &mut LineComposer) -> Result<(), EvalError> {
        for (index, statement) in self.statements.iter().enumerate() {
            let apply = match &statement.cond {
                Some(cond) => cond.eval(&self.filters)?,
                None => true,
            };
            tracing::trace!(statement = index, apply, "statement evaluated");
            if apply {
                for &id in &statement.filters {
                    self.filters.apply(id, line);
                }
            }
        }
        Ok(())
    }
}

fn interp() -> Interp<FilterSet> {
    let mut interp = Interp::new();
    interp.register("filter-match?", ParamNum::Any, filter_match);
    interp.register("filter-result", ParamNum::Fixed(2), filter_result);
    interp
}

fn load_program(source: &str) -> Result<(FilterSet, Vec<Apply>), InnerError> {
    let nodes = rainbow_config::parse(source)?;
    let root = match nodes.as_slice() {
        [] => return Err(ConfigError::ExpectedOneAssoc.into()),
        [root] => root.expect_assoc()?,
        [_, trailing, ..] => return Err(ConfigError::TrailingData(trailing.pos()).into()),
    };

    let interp = interp();
    let mut filters = FilterSet::new();
    let mut statements = Vec::new();

    for pair in root.iter() {
        match pair.key.as_str() {
            FILTER => {
                filters.load_root(&pair.value)?;
            }
            APPLY => statements.push(load_apply(&pair.value, &filters, &interp)?),
            _ => return Err(load::unknown_parameter(pair).into()),
        }
    }

    if filters.roots().is_empty() {
        return Err(load::missing_parameter(root, FILTER).into());
    }
    if statements.is_empty() {
        return Err(load::missing_parameter(root, APPLY).into());
    }

    Ok((filters, statements))
}

fn load_apply(
    node: &Node,
    filters: &FilterSet,
    interp: &Interp<FilterSet>,
) -> Result<Apply, InnerError> {
    let assoc = node.expect_assoc()?;
    load::check_duplicates(assoc, &[APPLY_COND, APPLY_FILTERS])?;

    let mut apply = Apply {
        cond: None,
        filters: Vec::new(),
    };

    for pair in assoc.iter() {
        match pair.key.as_str() {
            APPLY_COND => apply.cond = Some(interp.compile(&pair.value)?),
            APPLY_FILTERS => {
                for path in load::expect_string_list(&pair.value, APPLY_FILTERS)? {
                    let id = filters.find(path.as_str()).ok_or_else(|| {
                        ConfigError::UnknownFilter(path.pos, path.value.clone())
                    })?;
                    apply.filters.push(id);
                }
            }
            _ => return Err(load::unknown_parameter(pair).into()),
        }
    }

    if apply.filters.is_empty() {
        return Err(load::missing_parameter(assoc, APPLY_FILTERS).into());
    }

    Ok(apply)
}

fn expect_path(index: usize, arg: &Value) -> Result<&str, CallError> {
    arg.as_str()
        .ok_or_else(|| CallError::type_error(index, arg, Type::String))
}

/// `filter-match? path...`: whether any of the named filters matched the current line.
fn filter_match(filters: &FilterSet, args: &[Value]) -> Result<Value, CallError> {
    for (index, arg) in args.iter().enumerate() {
        let path = expect_path(index, arg)?;
        let id = filters
            .find(path)
            .ok_or_else(|| CallError::missing_filter(index, path))?;
        if filters.matched(id) {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

/// `filter-result path generation`: the groups matched by a filter on the
/// current (0) or previous (1) line, separated by NUL bytes.
fn filter_result(filters: &FilterSet, args: &[Value]) -> Result<Value, CallError> {
    let [path, generation] = args else {
        unreachable!()
    };
    let path = expect_path(0, path)?;
    let generation = expect_path(1, generation)?;
    let id = filters
        .find(path)
        .ok_or_else(|| CallError::missing_filter(0, path))?;

    let Ok(generation) = generation.parse::<i64>() else {
        return Ok(Value::StringList(Vec::new()));
    };
    let history = usize::try_from(generation)
        .ok()
        .filter(|generation| *generation < GENERATIONS)
        .map(|generation| filters.history(id, generation))
        .unwrap_or_default();

    Ok(Value::String(SmolStr::from(history)))
}
