//! Library search path.
//!
//! Read once from `ORI_LIB_PATH`: a `;`-separated list of directories where an
//! entry may contain `"quoted spans"` to embed the delimiter literally.
//!
//! Splitting is lexical. Quote characters stay in the emitted entries; only
//! the delimiter is consumed.

use std::sync::OnceLock;

/// Environment variable holding the library search path.
pub const LIB_PATH_VAR: &str = "ORI_LIB_PATH";

/// Entry separator.
pub const DELIMITER: u8 = b';';

/// Opens and closes a span in which the delimiter is literal.
pub const QUOTE: u8 = b'"';

static GLOBAL_SEARCH_PATH: OnceLock<SearchPath> = OnceLock::new();

/// Ordered list of directories probed for units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<String>,
}

impl SearchPath {
    /// No search directories.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Search path from a `;`-separated configuration string.
    pub fn parse(config: &str) -> Self {
        SearchPath {
            dirs: split_search_path(config),
        }
    }

    /// Search path from already split directories.
    pub fn from_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchPath {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `ORI_LIB_PATH`; empty if unset or not valid Unicode.
    pub fn from_env() -> Self {
        match std::env::var(LIB_PATH_VAR) {
            Ok(config) => Self::parse(&config),
            Err(_) => Self::empty(),
        }
    }

    /// Process-wide search path, read from the environment on first call.
    pub fn global() -> &'static SearchPath {
        GLOBAL_SEARCH_PATH.get_or_init(|| {
            let path = Self::from_env();
            tracing::debug!(entries = path.len(), "library search path initialized");
            path
        })
    }

    /// Directories in probe order.
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Iterate directories in probe order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Split a search-path string into entries.
///
/// An entry is a maximal run of characters that are either neither delimiter
/// nor quote, or a closed quoted span. Empty entries are never produced, and a
/// quote without a closing partner belongs to no entry.
pub fn split_search_path(config: &str) -> Vec<String> {
    let bytes = config.as_bytes();
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let end = entry_end(bytes, pos);
        if end > pos {
            entries.push(config[pos..end].to_string());
            pos = end;
        } else {
            // A delimiter or an unclosed quote; neither can start an entry.
            pos += 1;
        }
    }

    entries
}

/// End of the longest entry starting at `start` (equal to `start` if none).
///
/// Entries only ever end next to an ASCII delimiter or quote, so the returned
/// offset is always a char boundary.
fn entry_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while let Some(&byte) = bytes.get(end) {
        match byte {
            DELIMITER => break,
            QUOTE => match bytes[end + 1..].iter().position(|&b| b == QUOTE) {
                Some(offset) => end += offset + 2,
                None => break,
            },
            _ => end += 1,
        }
    }
    end
}
