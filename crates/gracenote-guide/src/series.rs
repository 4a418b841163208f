//! Force-series title matching.

use anyhow::{Context, Result};
use glob::Pattern;

/// Case-sensitive glob matcher over program titles.
///
/// Titles that match are treated as an ongoing series even when the grid
/// carries no season/episode data (news, morning shows). Patterns follow
/// `fnmatch` rules: runs of `*` act as one `*` and an unclosed `[` is a
/// literal character.
#[derive(Debug, Clone, Default)]
pub struct SeriesMatcher {
    patterns: Vec<Pattern>,
}

impl SeriesMatcher {
    /// Compiles the given glob patterns.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first pattern that is not a valid glob.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(&normalize(p))
                    .with_context(|| format!("invalid force-series pattern: {p:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns `true` if `title` matches any pattern.
    #[must_use]
    pub fn matches(&self, title: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(title))
    }

    /// Number of compiled patterns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if no patterns are configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Rewrites an `fnmatch` pattern into one `glob::Pattern` accepts with the
/// same meaning.
///
/// `glob` reserves `**` for whole path components and rejects unclosed
/// character classes; titles have no path structure.
fn normalize(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut rest = chars.as_slice();

    while let Some((&c, tail)) = rest.split_first() {
        match c {
            '*' => {
                out.push('*');
                let stars = tail.iter().take_while(|&&t| t == '*').count();
                rest = tail.get(stars..).unwrap_or_default();
            }
            '[' => {
                if let Some(len) = class_len(tail) {
                    out.push('[');
                    out.extend(tail.iter().take(len));
                    rest = tail.get(len..).unwrap_or_default();
                } else {
                    out.push_str(&Pattern::escape("["));
                    rest = tail;
                }
            }
            _ => {
                out.push(c);
                rest = tail;
            }
        }
    }
    out
}

/// Length of a character class body after `[`, closing `]` included.
///
/// A leading `!` and a `]` right after the opening (or after `!`) belong to
/// the class. Returns `None` when the class is never closed.
fn class_len(tail: &[char]) -> Option<usize> {
    let mut skip = usize::from(tail.first() == Some(&'!'));
    if tail.get(skip) == Some(&']') {
        skip = skip.saturating_add(1);
    }
    tail.iter()
        .skip(skip)
        .position(|&c| c == ']')
        .map(|pos| skip.saturating_add(pos).saturating_add(1))
}
