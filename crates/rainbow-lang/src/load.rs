use rainbow_config::{Assoc, Node, Pair, Str};

use crate::error::ConfigError;

pub const FILTER: &str = "filter";
pub const FILTER_NAME: &str = "name";
pub const FILTER_REGEXP: &str = "regexp";
pub const FILTER_REGEXP_FROM: &str = "regexpFrom";
pub const FILTER_PROPERTIES: &str = "properties";
pub const PROPERTY_COLOR: &str = "color";
pub const PROPERTY_BGCOLOR: &str = "bgcolor";
pub const PROPERTY_MODIFIERS: &str = "modifiers";
pub const APPLY: &str = "apply";
pub const APPLY_COND: &str = "cond";
pub const APPLY_FILTERS: &str = "filters";

/// Fails on the second occurrence of any of `keys`.
pub fn check_duplicates(assoc: &Assoc, keys: &[&str]) -> Result<(), ConfigError> {
    let mut seen = Vec::with_capacity(keys.len());
    for pair in assoc.iter().filter(|pair| keys.contains(&pair.key.as_str())) {
        if seen.contains(&pair.key.as_str()) {
            return Err(ConfigError::DuplicateParameter(
                pair.key.pos,
                pair.key.value.clone(),
            ));
        }
        seen.push(pair.key.as_str());
    }
    Ok(())
}

/// Fails when more than one of `keys` is present.
pub fn check_exclusive(assoc: &Assoc, keys: &[&'static str]) -> Result<(), ConfigError> {
    let mut seen: Option<&'static str> = None;
    for pair in assoc.iter() {
        let Some(&key) = keys.iter().find(|key| **key == pair.key.as_str()) else {
            continue;
        };
        match seen {
            Some(first) => {
                return Err(ConfigError::ExclusiveParameters(pair.key.pos, key, first));
            }
            None => seen = Some(key),
        }
    }
    Ok(())
}

pub fn expect_assoc<'a>(node: &'a Node, param: &'static str) -> Result<&'a Assoc, ConfigError> {
    node.expect_assoc()
        .map_err(|source| ConfigError::Parameter { source, param })
}

pub fn expect_string<'a>(node: &'a Node, param: &'static str) -> Result<&'a Str, ConfigError> {
    node.expect_string()
        .map_err(|source| ConfigError::Parameter { source, param })
}

pub fn expect_string_list<'a>(
    node: &'a Node,
    param: &'static str,
) -> Result<Vec<&'a Str>, ConfigError> {
    node.expect_string_list()
        .map_err(|source| ConfigError::Parameter { source, param })
}

pub fn unknown_parameter(pair: &Pair) -> ConfigError {
    ConfigError::UnknownParameter(pair.key.pos, pair.key.value.clone())
}

pub fn missing_parameter(assoc: &Assoc, param: &'static str) -> ConfigError {
    ConfigError::MissingParameter(assoc.pos, param)
}
