//! Case-insensitive end-of-string suffix matcher.
//!
//! [`SuffixMatcher`] compiles a fixed set of literal suffixes into one
//! anchored alternation, `(?i)(?:s1|s2|...)$`. Each suffix is escaped, so
//! regex metacharacters in the set are matched literally.

use regex::Regex;

/// Suffixes compiled into the matcher at startup.
pub const DEFAULT_SUFFIXES: [&str; 10] = [
    "draft",
    "drafted",
    "soldraft",
    "soldrafted",
    "cs2draft",
    "cs2drafted",
    "draftcs2",
    "draftedcs2",
    "draftsol",
    "draftfun",
];

/// Compiled suffix matcher.
///
/// Immutable after construction and safe to share across tasks.
#[derive(Debug, Clone)]
pub struct SuffixMatcher {
    /// `None` when the suffix set is empty; nothing matches then.
    pattern: Option<Regex>,
    suffixes: Vec<String>,
}

impl SuffixMatcher {
    /// Compiles `suffixes` into a single matcher. Empty strings are ignored.
    #[must_use]
    pub fn compile<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes: Vec<String> = suffixes
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let pattern = if suffixes.is_empty() {
            None
        } else {
            let alternation = suffixes
                .iter()
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|");
            // Escaped literals always form a valid pattern.
            Regex::new(&format!("(?i)(?:{alternation})$")).ok()
        };

        Self { pattern, suffixes }
    }

    /// Compiles [`DEFAULT_SUFFIXES`].
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::compile(DEFAULT_SUFFIXES)
    }

    /// Returns `true` iff `candidate` ends with one of the suffixes,
    /// ignoring case. Empty candidates never match.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(candidate))
    }

    /// The suffixes this matcher was compiled from.
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}

impl Default for SuffixMatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
