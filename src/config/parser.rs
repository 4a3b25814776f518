// Flat `key = value` config file syntax
//
// One pair per line. `=`, `:` or plain whitespace separates key from value, a
// whitespace-prefixed `#` or `;` starts a trailing comment, and a bare key means "true".
// Comment lines, blank lines, `[section]` headers and `---` markers are skipped.

use crate::error::{ClautoError, Result};
use camino::Utf8Path;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static KEY_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[^:=;#\s]+?)\s*(?:\s[;#].*)?$").expect("Invalid key-only regex")
});

static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[^:=;#\s]+?)\s*[:=\s]\s*(?P<value>.+?)\s*(?:\s[;#].*)?$")
        .expect("Invalid key-value regex")
});

/// Value given to keys that appear without one
pub const FLAG_VALUE: &str = "true";

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with(&['#', ';', '['][..]) || line.starts_with("---")
}

/// Parse config file contents into ordered pairs
///
/// A key seen twice keeps its first position and takes the last value.
///
/// # Errors
/// [`ClautoError::ConfigParse`] on the first line that is neither skippable nor a pair.
pub fn parse(contents: &str, source: &Utf8Path) -> Result<IndexMap<String, String>> {
    let mut pairs = IndexMap::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if is_skipped(line) {
            continue;
        }

        if let Some(caps) = KEY_ONLY.captures(line) {
            pairs.insert(caps["key"].to_string(), FLAG_VALUE.to_string());
        } else if let Some(caps) = KEY_VALUE.captures(line) {
            pairs.insert(caps["key"].to_string(), caps["value"].to_string());
        } else {
            return Err(ClautoError::ConfigParse {
                path: source.to_path_buf(),
                line_number: index + 1,
                line: line.to_string(),
            });
        }
    }

    Ok(pairs)
}
