//! Renderers turning line segments into bytes.
//!
//! An encoder consumes itself for every segment and returns the encoder to
//! use for the next one, so stateful encodings carry their state in the
//! returned value.
use std::io::{self, Write};

use crate::properties::{Color, Modifier, Properties};

pub trait Encoder {
    fn encode(
        self: Box<Self>,
        w: &mut dyn Write,
        props: &Properties,
        text: &[u8],
    ) -> io::Result<Box<dyn Encoder>>;
}

const ESC_RESET: &[u8] = b"\x1b[0m";

/// Writes the text only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Encoder for Plain {
    fn encode(
        self: Box<Self>,
        w: &mut dyn Write,
        _: &Properties,
        text: &[u8],
    ) -> io::Result<Box<dyn Encoder>> {
        w.write_all(text)?;
        Ok(self)
    }
}

/// Surrounds every segment having properties with SGR escape codes and a reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ansi;

impl Encoder for Ansi {
    fn encode(
        self: Box<Self>,
        w: &mut dyn Write,
        props: &Properties,
        text: &[u8],
    ) -> io::Result<Box<dyn Encoder>> {
        if props.is_empty() {
            w.write_all(text)?;
        } else {
            write_codes(w, props)?;
            w.write_all(text)?;
            w.write_all(ESC_RESET)?;
        }
        Ok(self)
    }
}

/// Emits escape codes only when the properties change between segments.
///
/// The terminating newline of a line always starts from a reset terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDelta {
    current: Properties,
}

impl Encoder for AnsiDelta {
    fn encode(
        self: Box<Self>,
        w: &mut dyn Write,
        props: &Properties,
        text: &[u8],
    ) -> io::Result<Box<dyn Encoder>> {
        if *props != self.current {
            if !self.current.is_empty() {
                w.write_all(ESC_RESET)?;
            }
            if !props.is_empty() {
                write_codes(w, props)?;
            }
        }
        w.write_all(text)?;
        Ok(Box::new(AnsiDelta { current: *props }))
    }
}

/// Writes one line of `fg:..,bg:..,mod:[..]` padded to 40 columns per segment,
/// followed by the text in braces.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debug;

impl Encoder for Debug {
    fn encode(
        self: Box<Self>,
        w: &mut dyn Write,
        props: &Properties,
        text: &[u8],
    ) -> io::Result<Box<dyn Encoder>> {
        write!(w, "{:<40}{{", props.to_string())?;
        w.write_all(text)?;
        w.write_all(b"}\n")?;
        Ok(self)
    }
}

fn modifier_code(modifier: Modifier) -> u8 {
    match modifier {
        Modifier::Bold => 1,
        Modifier::Underline => 4,
        Modifier::Blink => 5,
        Modifier::Reverse => 7,
    }
}

fn color_code(color: Color, base: u8, intense_base: u8) -> u8 {
    let base = if color.is_intense() { intense_base } else { base };
    base + color.palette_index()
}

fn sgr_codes(props: &Properties) -> Vec<u8> {
    props
        .modifiers
        .modifiers()
        .map(modifier_code)
        .chain(props.fg.map(|c| color_code(c, 30, 90)))
        .chain(props.bg.map(|c| color_code(c, 40, 100)))
        .collect()
}

fn write_codes(w: &mut dyn Write, props: &Properties) -> io::Result<()> {
    let codes = sgr_codes(props);
    let mut out = Vec::with_capacity(2 + codes.len() * 4);
    out.extend_from_slice(b"\x1b[");
    for (i, code) in codes.iter().enumerate() {
        if i > 0 {
            out.push(b';');
        }
        out.extend_from_slice(code.to_string().as_bytes());
    }
    out.push(b'm');
    w.write_all(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::properties::Modifiers;

    fn encode_all(encoder: Box<dyn Encoder>, records: &[(Properties, &str)]) -> String {
        let mut out = Vec::new();
        let mut encoder = encoder;
        for (props, text) in records {
            encoder = encoder.encode(&mut out, props, text.as_bytes()).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    fn red_bold() -> Properties {
        Properties::new(Some(Color::Red), None, Modifiers::BOLD)
    }

    #[rstest]
    #[case::fg(Properties::new(Some(Color::Black), None, Modifiers::empty()), vec![30])]
    #[case::intense_fg(Properties::new(Some(Color::IWhite), None, Modifiers::empty()), vec![97])]
    #[case::bg(Properties::new(None, Some(Color::Cyan), Modifiers::empty()), vec![46])]
    #[case::intense_bg(Properties::new(None, Some(Color::IRed), Modifiers::empty()), vec![101])]
    #[case::modifiers_first(
        Properties::new(Some(Color::Yellow), Some(Color::Blue), Modifiers::all()),
        vec![1, 4, 7, 5, 33, 44]
    )]
    fn test_sgr_codes(#[case] props: Properties, #[case] expected: Vec<u8>) {
        assert_eq!(sgr_codes(&props), expected);
    }

    #[test]
    fn test_plain() {
        let out = encode_all(
            Box::new(Plain),
            &[(red_bold(), "a"), (Properties::default(), "b\n")],
        );
        assert_eq!(out, "ab\n");
    }

    #[test]
    fn test_ansi() {
        let out = encode_all(
            Box::new(Ansi),
            &[
                (Properties::default(), "x "),
                (red_bold(), "a"),
                (red_bold(), "b"),
                (Properties::default(), "\n"),
            ],
        );
        assert_eq!(out, "x \x1b[1;31ma\x1b[0m\x1b[1;31mb\x1b[0m\n");
    }

    #[test]
    fn test_ansi_delta() {
        let blue = Properties::new(Some(Color::Blue), None, Modifiers::empty());
        let out = encode_all(
            Box::new(AnsiDelta::default()),
            &[
                (Properties::default(), "x "),
                (red_bold(), "a"),
                (red_bold(), "b"),
                (blue, "c"),
                (Properties::default(), "\n"),
            ],
        );
        assert_eq!(out, "x \x1b[1;31mab\x1b[0m\x1b[34mc\x1b[0m\n");
    }

    #[test]
    fn test_debug() {
        let out = encode_all(
            Box::new(Debug),
            &[(red_bold(), "a"), (Properties::default(), "\n")],
        );
        assert_eq!(
            out,
            format!(
                "{:<40}{{a}}\n{:<40}{{\n}}\n",
                "fg:red,bg:none,mod:[bold]", "fg:none,bg:none,mod:[]"
            )
        );
    }
}
