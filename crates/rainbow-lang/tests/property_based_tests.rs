//! Property-based tests for line composition and program loading.
use proptest::prelude::*;
use rainbow_lang::{Color, Interval, LineComposer, Modifiers, Program, Properties, encoder};
use strum::IntoEnumIterator;

mod strategies {
    use super::*;

    pub fn color() -> impl Strategy<Value = Option<Color>> {
        prop::option::of(prop::sample::select(Color::iter().collect::<Vec<_>>()))
    }

    pub fn properties() -> impl Strategy<Value = Properties> {
        (color(), color(), any::<u8>())
            .prop_map(|(fg, bg, bits)| Properties::new(fg, bg, Modifiers::from_bits_truncate(bits)))
    }

    /// A line and splices whose intervals lie inside it.
    pub fn line_and_splices() -> impl Strategy<Value = (Vec<u8>, Vec<(Interval, Properties)>)> {
        prop::collection::vec(any::<u8>(), 0..48).prop_flat_map(|line| {
            let len = line.len();
            let splice = (0..=len, 0..=len, properties()).prop_map(|(a, b, props)| {
                (Interval::new(a.min(b), a.max(b)), props)
            });
            (Just(line), prop::collection::vec(splice, 0..12))
        })
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_segments_tile_the_line((text, splices) in strategies::line_and_splices()) {
        let mut line = LineComposer::new();
        line.init(text.clone());

        // Properties of every byte, merged one splice at a time.
        let mut expected = vec![Properties::default(); text.len()];
        for (interval, props) in &splices {
            line.splice(*interval, props);
            for byte in &mut expected[interval.range()] {
                byte.merge(props);
            }
        }

        let mut offset = 0;
        let mut joined = Vec::new();
        for segment in line.segments() {
            prop_assert_eq!(segment.interval.beg, offset);
            prop_assert!(!segment.interval.is_empty() || text.is_empty());
            for byte in &expected[segment.interval.range()] {
                prop_assert_eq!(byte, &segment.properties);
            }
            joined.extend_from_slice(&line.line()[segment.interval.range()]);
            offset = segment.interval.end;
        }
        prop_assert_eq!(offset, text.len());
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn test_plain_output_is_the_line((text, splices) in strategies::line_and_splices()) {
        let mut line = LineComposer::new();
        line.init(text.clone());
        for (interval, props) in &splices {
            line.splice(*interval, props);
        }

        let mut out = Vec::new();
        line.output(&mut out, Box::new(encoder::Plain)).unwrap();
        let mut expected = text;
        expected.push(b'\n');
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn test_merge_is_idempotent(a in strategies::properties(), b in strategies::properties()) {
        let mut once = a;
        once.merge(&b);
        let mut twice = once;
        twice.merge(&b);
        prop_assert_eq!(once, twice);
        prop_assert!(once.modifiers.contains(a.modifiers | b.modifiers));
        prop_assert_eq!(once.fg, b.fg.or(a.fg));
        prop_assert_eq!(once.bg, b.bg.or(a.bg));
    }

    #[test]
    fn test_parse_never_panics(source in "[{}\\[\\]:\"#, a-z0-9\\\\\n-]{0,64}") {
        let _ = rainbow_config::parse(&source);
        let _ = Program::new("fuzz.rainbow", source);
    }
}
