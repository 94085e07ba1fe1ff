//! Glob patterns used by pointcut atoms.

use std::fmt;

/// A case-sensitive glob where `*` matches any sequence, including the empty
/// one and sequences containing dots. Every other character is literal.
///
/// An empty pattern matches only the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    source: String,
}

impl Pattern {
    /// Create a pattern from its source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// A pattern matching everything.
    pub fn any() -> Self {
        Self::new("*")
    }

    /// The source text of this pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether this pattern is a lone `*`.
    pub fn is_any(&self) -> bool {
        self.source == "*"
    }

    /// Test `text` against the pattern.
    pub fn matches(&self, text: &str) -> bool {
        let pattern = self.source.as_bytes();
        let text = text.as_bytes();

        let (mut p, mut t) = (0, 0);
        // Position of the last `*` seen and the text offset it currently absorbs up to.
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            if p < pattern.len() && pattern[p] == b'*' {
                backtrack = Some((p, t));
                p += 1;
            } else if p < pattern.len() && pattern[p] == text[t] {
                p += 1;
                t += 1;
            } else if let Some((star, absorbed)) = backtrack {
                p = star + 1;
                t = absorbed + 1;
                backtrack = Some((star, absorbed + 1));
            } else {
                return false;
            }
        }

        pattern[p..].iter().all(|&c| c == b'*')
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern() {
        let p = Pattern::new("findAccounts");
        assert!(p.matches("findAccounts"));
        assert!(!p.matches("findAccount"));
        assert!(!p.matches("FindAccounts"));
    }

    #[test]
    fn test_star_at_any_position() {
        assert!(Pattern::new("get*").matches("getName"));
        assert!(Pattern::new("get*").matches("get"));
        assert!(!Pattern::new("get*").matches("setName"));
        assert!(Pattern::new("*Name").matches("getName"));
        assert!(Pattern::new("g*N*e").matches("getName"));
        assert!(!Pattern::new("g*N*x").matches("getName"));
    }

    #[test]
    fn test_star_spans_dots() {
        let p = Pattern::new("com.*.dao");
        assert!(p.matches("com.luv2code.aopdemo.dao"));
        assert!(!p.matches("com.luv2code.aopdemo.service"));
    }

    #[test]
    fn test_backtracking() {
        assert!(Pattern::new("*ab*ab").matches("abxabab"));
        assert!(Pattern::new("a*a*a").matches("aaa"));
        assert!(!Pattern::new("a*a*a").matches("aa"));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty() {
        let p = Pattern::new("");
        assert!(p.matches(""));
        assert!(!p.matches("dao"));
        assert!(Pattern::any().matches(""));
    }
}
