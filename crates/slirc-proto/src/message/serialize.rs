use std::fmt;

use super::Message;

/// A message displays as the line it was parsed from.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
