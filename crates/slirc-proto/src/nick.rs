//! Nickname validation, comparison, and collision rotation.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format (nickname definition)
//! - RFC 1459 Section 2.2: Character codes (case mapping)

use crate::error::ProtocolError;

/// Default maximum nickname length.
pub const DEFAULT_NICK_MAX_LEN: usize = 30;

/// Highest suffix tried by [`NickRotation`] before giving up.
pub const MAX_ROTATIONS: u32 = 999;

const SUFFIX_LEN: usize = 4; // "_NNN"

#[inline]
fn is_special(c: char) -> bool {
    matches!(c, '[' | ']' | '\\' | '`' | '_' | '^' | '{' | '|' | '}')
}

/// RFC 1459 lower-casing: ASCII letters plus `[]\~` to `{}|^`.
#[inline]
const fn irc_lower(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c.to_ascii_lowercase(),
    }
}

/// Nickname helpers for string types.
pub trait NickExt {
    /// Valid per RFC 2812 with the default length limit.
    ///
    /// ```
    /// use slirc_proto::NickExt;
    ///
    /// assert!("nick".is_valid_nick());
    /// assert!("[cool]".is_valid_nick());
    /// assert!(!"123nick".is_valid_nick());
    /// assert!(!"nick name".is_valid_nick());
    /// ```
    fn is_valid_nick(&self) -> bool {
        self.is_valid_nick_len(DEFAULT_NICK_MAX_LEN)
    }

    /// Valid per RFC 2812 with a custom length limit.
    fn is_valid_nick_len(&self, max_len: usize) -> bool;

    /// Case-insensitive comparison under RFC 1459 case mapping.
    ///
    /// ```
    /// use slirc_proto::NickExt;
    ///
    /// assert!("Bot[1]".eq_nick("bot{1}"));
    /// assert!(!"bot".eq_nick("bot_"));
    /// ```
    fn eq_nick(&self, other: &str) -> bool;

    /// Fold under RFC 1459 case mapping, for use as a lookup key.
    ///
    /// ```
    /// use slirc_proto::NickExt;
    ///
    /// assert_eq!("Alice[1]".to_irc_lowercase(), "alice{1}");
    /// ```
    fn to_irc_lowercase(&self) -> String;
}

impl NickExt for str {
    fn is_valid_nick_len(&self, max_len: usize) -> bool {
        if self.is_empty() || self.len() > max_len {
            return false;
        }
        let mut chars = self.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || is_special(first) => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
    }

    fn eq_nick(&self, other: &str) -> bool {
        self.len() == other.len()
            && self
                .chars()
                .zip(other.chars())
                .all(|(a, b)| irc_lower(a) == irc_lower(b))
    }

    fn to_irc_lowercase(&self) -> String {
        self.chars().map(irc_lower).collect()
    }
}

impl NickExt for String {
    fn is_valid_nick_len(&self, max_len: usize) -> bool {
        self.as_str().is_valid_nick_len(max_len)
    }

    fn eq_nick(&self, other: &str) -> bool {
        self.as_str().eq_nick(other)
    }

    fn to_irc_lowercase(&self) -> String {
        self.as_str().to_irc_lowercase()
    }
}

/// Derives replacement nicknames after nickname-in-use replies.
///
/// Every candidate is `<base>_<NNN>` with a three-digit counter starting at
/// `001`, derived from the same base each time, so the sequence is
/// deterministic and no two candidates are equal. The base is shortened
/// when needed to keep candidates within the length limit.
///
/// ```
/// use slirc_proto::NickRotation;
///
/// let mut nicks = NickRotation::new("slircbot");
/// assert_eq!(nicks.next_nick().unwrap(), "slircbot_001");
/// assert_eq!(nicks.next_nick().unwrap(), "slircbot_002");
/// ```
#[derive(Clone, Debug)]
pub struct NickRotation {
    base: String,
    max_len: usize,
    attempt: u32,
}

impl NickRotation {
    /// Rotation for `base` under the default length limit.
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_max_len(base, DEFAULT_NICK_MAX_LEN)
    }

    /// Rotation for `base` under a server-specific length limit.
    pub fn with_max_len(base: impl Into<String>, max_len: usize) -> Self {
        Self {
            base: base.into(),
            max_len: max_len.max(SUFFIX_LEN + 1),
            attempt: 0,
        }
    }

    /// The configured base nickname.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Number of candidates produced so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Produce the next candidate.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::NicknamesExhausted`] once all suffixes are used.
    pub fn next_nick(&mut self) -> Result<String, ProtocolError> {
        if self.attempt >= MAX_ROTATIONS {
            return Err(ProtocolError::NicknamesExhausted {
                base: self.base.clone(),
                attempts: self.attempt,
            });
        }
        self.attempt += 1;

        let room = self.max_len - SUFFIX_LEN;
        let stem: String = self.base.chars().take(room).collect();
        Ok(format!("{stem}_{:03}", self.attempt))
    }

    /// Start over from the first suffix.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
