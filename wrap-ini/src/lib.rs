//! Reader for the key/value section format used by wrap declaration files.
//!
//! The accepted grammar is the subset that wrap files actually use:
//!
//! ```text
//! # comment
//! [wrap-git]
//! url = https://example.org/lib.git
//! revision: v1.2.0
//! patch_directory = lib
//!     continued value line
//! ```
//!
//! Keys are case-insensitive and stored lowercased. Values are trimmed.
//! Duplicate sections and duplicate keys within one section are errors.

use std::str::FromStr;

use thiserror::Error;

/// Characters that start a full-line comment.
pub const COMMENT_PREFIXES: &[char] = &['#', ';'];

/// Characters that separate a key from its value. The first one on the line wins.
pub const KEY_VALUE_DELIMITERS: &[char] = &['=', ':'];

/// Errors from parsing a section document. Line numbers are 1-based.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum IniError {
    /// A `key = value` line appeared before the first `[section]` header.
    #[error("line {line}: entry appears before any section header")]
    EntryOutsideSection {
        /// Line of the offending entry.
        line: usize,
    },

    /// A line starting with `[` that is not a well-formed header.
    #[error("line {line}: malformed section header '{text}'")]
    MalformedHeader {
        /// Line of the header.
        line: usize,
        /// The raw (trimmed) header text.
        text: String,
    },

    /// A non-comment line inside a section without a `=` or `:` delimiter.
    #[error("line {line}: expected 'key = value', found '{text}'")]
    MissingDelimiter {
        /// Line of the entry.
        line: usize,
        /// The raw (trimmed) line text.
        text: String,
    },

    /// The same section name appeared twice.
    #[error("line {line}: section [{name}] already defined")]
    DuplicateSection {
        /// Line of the second header.
        line: usize,
        /// Section name.
        name: String,
    },

    /// The same key appeared twice within one section.
    #[error("line {line}: key '{key}' already defined in section [{section}]")]
    DuplicateKey {
        /// Line of the second definition.
        line: usize,
        /// Enclosing section name.
        section: String,
        /// Lowercased key.
        key: String,
    },
}

/// One `[name]` block and its entries, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Section name as written between the brackets.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value by key. Matching is case-insensitive.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(key, value)` pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries in this section.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this section has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed document: an ordered list of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Parse a document from text.
    ///
    /// # Errors
    /// Returns an [`IniError`] carrying the line number of the first problem.
    pub fn parse(text: &str) -> Result<Self, IniError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut sections: Vec<Section> = Vec::new();
        // Whether the last entry of the current section may take continuation lines.
        let mut continuing = false;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                continuing = false;
                continue;
            }
            if trimmed.starts_with(COMMENT_PREFIXES) {
                continue;
            }

            let indented = raw.starts_with([' ', '\t']);
            if indented
                && continuing
                && let Some((_, value)) = sections.last_mut().and_then(|s| s.entries.last_mut())
            {
                value.push('\n');
                value.push_str(trimmed);
                continue;
            }

            if trimmed.starts_with('[') {
                let name = parse_header(trimmed).ok_or_else(|| IniError::MalformedHeader {
                    line,
                    text: trimmed.to_owned(),
                })?;
                if sections.iter().any(|s| s.name == name) {
                    return Err(IniError::DuplicateSection {
                        line,
                        name: name.to_owned(),
                    });
                }
                sections.push(Section {
                    name: name.to_owned(),
                    entries: Vec::new(),
                });
                continuing = false;
                continue;
            }

            let Some(section) = sections.last_mut() else {
                return Err(IniError::EntryOutsideSection { line });
            };
            let (key, value) =
                split_entry(trimmed).ok_or_else(|| IniError::MissingDelimiter {
                    line,
                    text: trimmed.to_owned(),
                })?;
            if section.entries.iter().any(|(k, _)| *k == key) {
                return Err(IniError::DuplicateKey {
                    line,
                    section: section.name.clone(),
                    key,
                });
            }
            section.entries.push((key, value.to_owned()));
            continuing = true;
        }

        Ok(Self { sections })
    }

    /// Find a section by exact name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Iterate over all sections in file order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }
}

impl FromStr for Document {
    type Err = IniError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Extract the name from `[name]`. The name runs up to the last `]`.
fn parse_header(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix('[')?;
    let close = inner.rfind(']')?;
    let name = inner[..close].trim();
    if name.is_empty() { None } else { Some(name) }
}

/// Split `key = value` at the first delimiter. Returns the lowercased key.
fn split_entry(trimmed: &str) -> Option<(String, &str)> {
    let pos = trimmed.find(KEY_VALUE_DELIMITERS)?;
    let key = trimmed[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), trimmed[pos + 1..].trim()))
}
