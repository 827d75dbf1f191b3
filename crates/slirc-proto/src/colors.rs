//! mIRC text formatting.
//!
//! Formatting is carried in-band by control characters:
//! - 0x02 (^B): Bold
//! - 0x03 (^C): Color, followed by `FG[,BG]` two-digit codes
//! - 0x0F (^O): Reset all formatting
//! - 0x16 (^V): Reverse
//! - 0x1F (^_): Underline
//!
//! # Example
//!
//! ```
//! use slirc_proto::colors::{Color, FormattedStringExt, Style};
//!
//! assert_eq!("hi".colorize(Color::Red), "\x0304hi\x0F");
//! let styled = Style::new().fg(Color::White).bg(Color::Blue).bold().apply("alert");
//! assert_eq!(styled, "\x02\x0300,02alert\x0F");
//! assert_eq!(styled.as_str().strip_formatting(), "alert");
//! ```

use std::borrow::Cow;

const BOLD: char = '\x02';
const COLOR: char = '\x03';
const RESET: char = '\x0F';
const REVERSE: char = '\x16';
const UNDERLINE: char = '\x1F';

const FORMAT_CHARS: &[char] = &[BOLD, COLOR, RESET, REVERSE, UNDERLINE];

/// The 16 standard mIRC colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Color {
    White = 0,
    Black = 1,
    Blue = 2,
    Green = 3,
    Red = 4,
    Brown = 5,
    Purple = 6,
    Orange = 7,
    Yellow = 8,
    LightGreen = 9,
    Cyan = 10,
    LightCyan = 11,
    LightBlue = 12,
    Pink = 13,
    Grey = 14,
    LightGrey = 15,
}

impl Color {
    /// Two-digit wire code.
    pub fn code(self) -> String {
        format!("{:02}", self as u8)
    }
}

/// A combination of formatting attributes applied to a piece of text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    underline: bool,
    reverse: bool,
}

impl Style {
    /// No formatting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Foreground color.
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Background color. Only emitted together with a foreground.
    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Bold text.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Underlined text.
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Reversed foreground and background.
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Wrap `text` in this style, closing with a reset.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 10);
        if self.bold {
            out.push(BOLD);
        }
        if self.underline {
            out.push(UNDERLINE);
        }
        if self.reverse {
            out.push(REVERSE);
        }
        if let Some(fg) = self.fg {
            out.push(COLOR);
            out.push_str(&fg.code());
            if let Some(bg) = self.bg {
                out.push(',');
                out.push_str(&bg.code());
            }
        }
        if out.is_empty() {
            return text.to_owned();
        }
        out.push_str(text);
        out.push(RESET);
        out
    }
}

/// Formatting helpers for string slices.
pub trait FormattedStringExt {
    /// True if the text contains any formatting control character.
    fn is_formatted(&self) -> bool;

    /// Remove every formatting control character and color code.
    fn strip_formatting(&self) -> Cow<'_, str>;

    /// Wrap in a foreground color.
    fn colorize(&self, color: Color) -> String;

    /// Wrap in bold.
    fn bold(&self) -> String;

    /// Wrap in underline.
    fn underline(&self) -> String;

    /// Wrap in reverse.
    fn reverse(&self) -> String;
}

impl FormattedStringExt for str {
    fn is_formatted(&self) -> bool {
        self.contains(FORMAT_CHARS)
    }

    fn strip_formatting(&self) -> Cow<'_, str> {
        if !self.is_formatted() {
            return Cow::Borrowed(self);
        }

        let mut out = String::with_capacity(self.len());
        let mut chars = self.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                COLOR => {
                    let mut digits = 0;
                    while digits < 2 && chars.next_if(char::is_ascii_digit).is_some() {
                        digits += 1;
                    }
                    if digits > 0 && chars.peek() == Some(&',') {
                        let mut lookahead = chars.clone();
                        lookahead.next();
                        if lookahead.peek().is_some_and(char::is_ascii_digit) {
                            chars.next();
                            let mut bg = 0;
                            while bg < 2 && chars.next_if(char::is_ascii_digit).is_some() {
                                bg += 1;
                            }
                        }
                    }
                }
                c if FORMAT_CHARS.contains(&c) => {}
                c => out.push(c),
            }
        }
        Cow::Owned(out)
    }

    fn colorize(&self, color: Color) -> String {
        Style::new().fg(color).apply(self)
    }

    fn bold(&self) -> String {
        Style::new().bold().apply(self)
    }

    fn underline(&self) -> String {
        Style::new().underline().apply(self)
    }

    fn reverse(&self) -> String {
        Style::new().reverse().apply(self)
    }
}
