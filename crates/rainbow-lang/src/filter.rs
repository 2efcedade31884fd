use rainbow_config::Node;
use regex::bytes::Regex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::arena::{Arena, ArenaId};
use crate::error::{CompileError, ConfigError, InnerError};
use crate::line::LineComposer;
use crate::load::{self, *};
use crate::properties::{Color, Modifier, Properties};
use crate::state::MatchState;

pub type FilterId = ArenaId<Filter>;
pub type PatternId = ArenaId<Pattern>;

pub const PATH_SEPARATOR: char = '/';

/// A compiled regexp together with its match history.
#[derive(Debug)]
pub struct Pattern {
    regex: Regex,
    state: MatchState,
}

impl Pattern {
    pub fn new(regex: Regex) -> Self {
        Self {
            regex,
            state: MatchState::new(),
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }
}

/// Where a filter takes its matches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Only children are applied.
    None,
    /// Declared with `regexp`.
    Own(PatternId),
    /// Declared with `regexpFrom`: the pattern and its state belong to another filter.
    From(PatternId),
}

#[derive(Debug)]
pub struct Filter {
    pub name: SmolStr,
    pub source: Source,
    pub properties: FxHashMap<usize, Properties>,
    pub children: Vec<FilterId>,
}

/// The filter forest of a program.
#[derive(Debug, Default)]
pub struct FilterSet {
    filters: Arena<Filter>,
    patterns: Arena<Pattern>,
    roots: Vec<FilterId>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn roots(&self) -> &[FilterId] {
        &self.roots
    }

    pub fn get(&self, id: FilterId) -> &Filter {
        &self.filters[id]
    }

    /// Resolves a `/` separated path of filter names starting at the roots.
    pub fn find(&self, path: &str) -> Option<FilterId> {
        let mut siblings = self.roots.as_slice();
        let mut found = None;
        for name in path.split(PATH_SEPARATOR) {
            let id = self.find_child(siblings, name)?;
            siblings = &self.filters[id].children;
            found = Some(id);
        }
        found
    }

    fn find_child(&self, siblings: &[FilterId], name: &str) -> Option<FilterId> {
        if name.is_empty() {
            return None;
        }
        siblings
            .iter()
            .copied()
            .find(|id| self.filters[*id].name == name)
    }

    /// Whether the filter's own pattern matched the current line.
    /// Always false for filters borrowing another filter's pattern.
    pub fn matched(&self, id: FilterId) -> bool {
        match self.filters[id].source {
            Source::Own(pattern) => self.patterns[pattern].state.matched(),
            Source::From(_) | Source::None => false,
        }
    }

    /// Match history of the filter's own pattern, see [`MatchState::history`].
    pub fn history(&self, id: FilterId, generation: usize) -> String {
        match self.filters[id].source {
            Source::Own(pattern) => self.patterns[pattern].state.history(generation),
            Source::From(_) | Source::None => String::new(),
        }
    }

    pub fn rotate(&mut self) {
        for pattern in self.patterns.iter_mut() {
            pattern.state.rotate();
        }
    }

    /// Splices the properties of filter `id` and of its descendants over `line`.
    pub fn apply(&mut self, id: FilterId, line: &mut LineComposer) {
        apply_filter(&self.filters, &mut self.patterns, id, line);
    }

    /// Loads a top level filter.
    pub fn load_root(&mut self, node: &Node) -> Result<FilterId, InnerError> {
        let id = self.load(node)?;
        let name = &self.filters[id].name;
        if self.find_child(&self.roots, name).is_some() {
            return Err(ConfigError::DuplicateFilter(node.pos(), name.to_string()).into());
        }
        self.roots.push(id);
        Ok(id)
    }

    fn load(&mut self, node: &Node) -> Result<FilterId, InnerError> {
        let assoc = node.expect_assoc()?;
        load::check_duplicates(assoc, &[FILTER_NAME, FILTER_REGEXP, FILTER_REGEXP_FROM])?;
        load::check_exclusive(assoc, &[FILTER_REGEXP, FILTER_REGEXP_FROM])?;

        let mut name = SmolStr::default();
        let mut source = Source::None;
        let mut properties = FxHashMap::default();
        let mut children = Vec::new();

        for pair in assoc.iter() {
            match pair.key.as_str() {
                FILTER_NAME => {
                    let s = load::expect_string(&pair.value, FILTER_NAME)?;
                    if s.as_str().contains(PATH_SEPARATOR) {
                        return Err(ConfigError::InvalidFilterName(s.pos).into());
                    }
                    name = SmolStr::new(s.as_str());
                }
                FILTER_REGEXP => {
                    let s = load::expect_string(&pair.value, FILTER_REGEXP)?;
                    let regex = Regex::new(s.as_str())
                        .map_err(|err| CompileError::InvalidRegex(s.pos, err.to_string()))?;
                    source = Source::Own(self.patterns.alloc(Pattern::new(regex)));
                }
                FILTER_REGEXP_FROM => {
                    let s = load::expect_string(&pair.value, FILTER_REGEXP_FROM)?;
                    let referenced = self
                        .find(s.as_str())
                        .ok_or_else(|| CompileError::DanglingReference(s.pos, s.value.clone()))?;
                    match self.filters[referenced].source {
                        Source::Own(pattern) => source = Source::From(pattern),
                        Source::From(_) | Source::None => {
                            return Err(CompileError::MissingRegexp(s.pos, s.value.clone()).into());
                        }
                    }
                }
                FILTER_PROPERTIES => load_group_properties(&pair.value, &mut properties)?,
                FILTER => {
                    let child = self.load(&pair.value)?;
                    let child_name = &self.filters[child].name;
                    if self.find_child(&children, child_name).is_some() {
                        return Err(ConfigError::DuplicateFilter(
                            pair.value.pos(),
                            child_name.to_string(),
                        )
                        .into());
                    }
                    children.push(child);
                }
                _ => return Err(load::unknown_parameter(pair).into()),
            }
        }

        Ok(self.filters.alloc(Filter {
            name,
            source,
            properties,
            children,
        }))
    }
}

fn apply_filter(
    filters: &Arena<Filter>,
    patterns: &mut Arena<Pattern>,
    id: FilterId,
    line: &mut LineComposer,
) {
    let filter = &filters[id];
    let (pattern, flag) = match filter.source {
        Source::Own(pattern) => (Some(pattern), true),
        Source::From(pattern) => (Some(pattern), false),
        Source::None => (None, false),
    };

    if let Some(pattern) = pattern {
        let text = line.shared_line();
        let Pattern { regex, state } = &mut patterns[pattern];
        for groups in state.matches(regex, &text, flag) {
            for (index, group) in groups.iter().enumerate() {
                let (Some(interval), Some(properties)) = (group, filter.properties.get(&(index + 1)))
                else {
                    continue;
                };
                if !interval.is_empty() {
                    line.splice(*interval, properties);
                }
            }
        }
    }

    for &child in &filter.children {
        apply_filter(filters, patterns, child, line);
    }
}

fn load_group_properties(
    node: &Node,
    properties: &mut FxHashMap<usize, Properties>,
) -> Result<(), ConfigError> {
    let assoc = load::expect_assoc(node, FILTER_PROPERTIES)?;
    for pair in assoc.iter() {
        let group = pair
            .key
            .as_str()
            .parse::<usize>()
            .ok()
            .filter(|group| *group > 0)
            .ok_or_else(|| ConfigError::InvalidGroup(pair.key.pos, pair.key.value.clone()))?;
        properties.insert(group, load_properties(&pair.value)?);
    }
    Ok(())
}

fn load_properties(node: &Node) -> Result<Properties, ConfigError> {
    let assoc = node.expect_assoc()?;
    load::check_duplicates(assoc, &[PROPERTY_COLOR, PROPERTY_BGCOLOR, PROPERTY_MODIFIERS])?;

    let mut properties = Properties::default();
    for pair in assoc.iter() {
        match pair.key.as_str() {
            PROPERTY_COLOR => properties.fg = load_color(&pair.value, PROPERTY_COLOR)?,
            PROPERTY_BGCOLOR => properties.bg = load_color(&pair.value, PROPERTY_BGCOLOR)?,
            PROPERTY_MODIFIERS => {
                for s in load::expect_string_list(&pair.value, PROPERTY_MODIFIERS)? {
                    let modifier = s
                        .as_str()
                        .parse::<Modifier>()
                        .map_err(|_| ConfigError::UnknownModifier(s.pos, s.value.clone()))?;
                    properties.modifiers |= modifier.into();
                }
            }
            _ => return Err(load::unknown_parameter(pair)),
        }
    }
    Ok(properties)
}

fn load_color(node: &Node, param: &'static str) -> Result<Option<Color>, ConfigError> {
    let s = load::expect_string(node, param)?;
    Color::parse(s.as_str()).map_err(|_| ConfigError::UnknownColor(s.pos, s.value.clone()))
}
