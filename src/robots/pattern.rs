//! Robots.txt rule patterns
//!
//! Patterns are compiled once when robots.txt is parsed. A pattern matches a
//! URL when it occurs anywhere in the full URL string:
//!
//! - a plain pattern such as `/private` is a substring match
//! - `*` matches any run of characters (including none)
//! - a trailing `$` requires the match to end at the end of the URL

/// A compiled robots.txt path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePattern {
    raw: String,
    pieces: Vec<String>,
    anchored_end: bool,
}

impl RulePattern {
    pub fn new(raw: &str) -> Self {
        let (body, anchored_end) = match raw.strip_suffix('$') {
            Some(body) => (body, true),
            None => (raw, false),
        };

        Self {
            raw: raw.to_string(),
            pieces: body.split('*').map(str::to_string).collect(),
            anchored_end,
        }
    }

    /// The pattern as written in robots.txt
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true when the pattern occurs in `url`
    pub fn matches(&self, url: &str) -> bool {
        let Some((last, leading)) = self.pieces.split_last() else {
            return true;
        };

        // Leftmost placement of each piece leaves the most room for the rest
        let mut position = 0;
        for piece in leading {
            match url[position..].find(piece.as_str()) {
                Some(offset) => position += offset + piece.len(),
                None => return false,
            }
        }

        let rest = &url[position..];
        if self.anchored_end {
            rest.ends_with(last.as_str())
        } else {
            rest.contains(last.as_str())
        }
    }
}
