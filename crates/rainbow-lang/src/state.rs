use std::rc::Rc;

use regex::bytes::Regex;
use smallvec::SmallVec;

use crate::interval::Interval;

/// Spans of capture groups 1.. of one match; `None` for groups that did not participate.
pub type Groups = SmallVec<[Option<Interval>; 4]>;

pub const GENERATIONS: usize = 2;

#[derive(Debug, Clone, Default)]
struct Generation {
    line: Option<Rc<[u8]>>,
    matches: Vec<Groups>,
}

impl Generation {
    fn render(&self) -> String {
        let Some(line) = &self.line else {
            return String::new();
        };

        let mut out = Vec::with_capacity(line.len());
        for (i, group) in self.matches.iter().flatten().enumerate() {
            if i > 0 {
                out.push(0);
            }
            if let Some(interval) = group {
                out.extend_from_slice(&line[interval.range()]);
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Match results of a pattern over the current and the previous line.
///
/// Results of the current line are computed at most once. [`MatchState::rotate`]
/// is called once per line by the driver and moves the current generation
/// to the previous one, whether or not it matched.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    matched: bool,
    computed: bool,
    generations: [Generation; GENERATIONS],
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the owning filter matched the current line.
    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Returns every match of `regex` over `line`, running the regex only on
    /// the first call of the line. `flag` marks the state as matched if
    /// anything matched; filters borrowing the pattern pass `false`.
    pub fn matches(&mut self, regex: &Regex, line: &Rc<[u8]>, flag: bool) -> &[Groups] {
        if !self.computed {
            let matches = regex
                .captures_iter(line)
                .map(|caps| {
                    (1..caps.len())
                        .map(|i| caps.get(i).map(|m| Interval::new(m.start(), m.end())))
                        .collect::<Groups>()
                })
                .collect::<Vec<_>>();

            self.generations[0] = Generation {
                line: (!matches.is_empty()).then(|| Rc::clone(line)),
                matches,
            };
            self.computed = true;
        }

        if flag && !self.generations[0].matches.is_empty() {
            self.matched = true;
        }

        &self.generations[0].matches
    }

    /// Renders the groups of generation `n` (0 current, 1 previous) joined by NUL bytes.
    pub fn history(&self, n: usize) -> String {
        self.generations
            .get(n)
            .map(Generation::render)
            .unwrap_or_default()
    }

    pub fn rotate(&mut self) {
        self.generations[1] = std::mem::take(&mut self.generations[0]);
        self.matched = false;
        self.computed = false;
    }
}
