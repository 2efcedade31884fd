use std::fmt::{self, Display, Formatter};

use bitflags::bitflags;
use itertools::Itertools;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A terminal color. The `I` prefixed variants are the intense ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    IBlack,
    IRed,
    IGreen,
    IYellow,
    IBlue,
    IMagenta,
    ICyan,
    IWhite,
}

impl Color {
    /// Parses a configuration color name. `none` is the absent color.
    pub fn parse(name: &str) -> Result<Option<Color>, strum::ParseError> {
        if name == "none" {
            return Ok(None);
        }
        name.parse::<Color>().map(Some)
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn is_intense(self) -> bool {
        self as u8 >= Color::IBlack as u8
    }

    /// Position of the color within its palette of eight.
    pub fn palette_index(self) -> u8 {
        self as u8 % 8
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Modifier {
    Bold,
    Underline,
    Reverse,
    Blink,
}

impl Modifier {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl Display for Modifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const BOLD = 1;
        const UNDERLINE = 1 << 1;
        const REVERSE = 1 << 2;
        const BLINK = 1 << 3;
    }
}

impl From<Modifier> for Modifiers {
    fn from(modifier: Modifier) -> Self {
        match modifier {
            Modifier::Bold => Modifiers::BOLD,
            Modifier::Underline => Modifiers::UNDERLINE,
            Modifier::Reverse => Modifiers::REVERSE,
            Modifier::Blink => Modifiers::BLINK,
        }
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Modifiers::empty(), |set, m| set | m.into())
    }
}

impl Modifiers {
    /// Members of the set in `bold, underline, reverse, blink` order.
    pub fn modifiers(self) -> impl Iterator<Item = Modifier> {
        Modifier::iter().filter(move |m| self.contains((*m).into()))
    }
}

/// Visual attributes of a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Properties {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub modifiers: Modifiers,
}

impl Properties {
    pub fn new(fg: Option<Color>, bg: Option<Color>, modifiers: Modifiers) -> Self {
        Self { fg, bg, modifiers }
    }

    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.modifiers.is_empty()
    }

    /// Colors set in `other` win, modifiers accumulate.
    pub fn merge(&mut self, other: &Properties) {
        if other.fg.is_some() {
            self.fg = other.fg;
        }
        if other.bg.is_some() {
            self.bg = other.bg;
        }
        self.modifiers |= other.modifiers;
    }
}

impl Display for Properties {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let color = |c: Option<Color>| c.map_or("none", Color::name);
        write!(
            f,
            "fg:{},bg:{},mod:[{}]",
            color(self.fg),
            color(self.bg),
            self.modifiers.modifiers().map(Modifier::name).join(",")
        )
    }
}
