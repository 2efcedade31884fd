#![no_main]

use arbitrary::Arbitrary;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use rainbow_lang::{LineComposer, Program, encoder};

const COLORS: [&str; 5] = ["red", "icyan", "none", "black", "iwhite"];
const PATTERNS: [&str; 6] = ["(\\w+)", "(a)(b)?", "^(.)", "(x*)", "(\\d+)-(\\d+)", "()"];

#[derive(Debug, Clone, Arbitrary)]
struct ArbitraryFilter {
    pattern: u8,
    group: u8,
    color: u8,
    bold: bool,
    reference: Option<u8>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Cond {
    Match(u8),
    Changed(u8),
    Not(Box<Cond>),
}

#[derive(Debug, Clone, Arbitrary)]
struct ArbitraryApply {
    cond: Option<Cond>,
    filters: Vec<u8>,
}

#[derive(Debug, Clone, Arbitrary)]
struct Context {
    filters: Vec<ArbitraryFilter>,
    statements: Vec<ArbitraryApply>,
    lines: Vec<Vec<u8>>,
}

fn name(filters: usize, index: u8) -> String {
    format!("f{}", index as usize % filters)
}

fn cond(filters: usize, cond: &Cond) -> String {
    match cond {
        Cond::Match(i) => format!("[filter-match? {}]", name(filters, *i)),
        Cond::Changed(i) => format!(
            "[not [equal? [filter-result {0} 0] [filter-result {0} 1]]]",
            name(filters, *i)
        ),
        Cond::Not(inner) => format!("[not {}]", self::cond(filters, inner)),
    }
}

impl Context {
    fn to_config(&self) -> Option<String> {
        let count = self.filters.len();
        if count == 0 {
            return None;
        }

        let filters = self.filters.iter().enumerate().map(|(i, f)| {
            let source = match f.reference {
                Some(r) if (r as usize % count) < i => format!("regexpFrom: f{}", r as usize % count),
                _ => format!("regexp: {:?}", PATTERNS[f.pattern as usize % PATTERNS.len()]),
            };
            format!(
                "filter: {{ name: f{} {} properties: {{ {}: {{ color: {} modifiers: [{}] }} }} }}",
                i,
                source,
                f.group % 3 + 1,
                COLORS[f.color as usize % COLORS.len()],
                if f.bold { "bold" } else { "" }
            )
        });
        let statements = self.statements.iter().filter(|s| !s.filters.is_empty()).map(|s| {
            format!(
                "apply: {{ {} filters: [{}] }}",
                s.cond.as_ref().map(|c| format!("cond: {}", cond(count, c))).unwrap_or_default(),
                s.filters.iter().map(|i| name(count, *i)).join(" ")
            )
        });

        Some(format!("{{ {} }}", filters.chain(statements).join("\n")))
    }
}

fuzz_target!(|context: Context| {
    let Some(config) = context.to_config() else {
        return;
    };
    let Ok(mut program) = Program::new("fuzz.rainbow", config) else {
        return;
    };

    let mut line = LineComposer::new();
    for text in context.lines {
        line.init(text.clone());
        let _ = line.apply_program(&mut program);

        let mut out = Vec::new();
        line.output(&mut out, Box::new(encoder::Plain)).unwrap();
        assert_eq!(&out[..out.len() - 1], text.as_slice());
    }
});
