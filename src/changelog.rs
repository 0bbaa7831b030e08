//! Release notes taken from the running changelog.

use crate::error::{ReleaseError, Result};
use std::path::Path;

/// Marker that opens the newest changelog section
pub const HEADING_MARKER: &str = "###";

/// Text from the first heading marker to the end, verbatim.
///
/// Anything above the marker (title, badges, intro prose) is dropped. A
/// changelog without any marker is returned whole.
pub fn excerpt(text: &str) -> &str {
    match text.find(HEADING_MARKER) {
        Some(idx) => &text[idx..],
        None => text,
    }
}

/// Read `path` and return its excerpt
pub fn read_excerpt(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|source| ReleaseError::Changelog {
        path: path.to_path_buf(),
        source,
    })?;
    if !text.contains(HEADING_MARKER) {
        log::warn!(
            "{} has no '{}' heading; using the whole file as release notes",
            path.display(),
            HEADING_MARKER
        );
    }
    Ok(excerpt(&text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_starts_at_first_heading() {
        let text = "# Changelog\n\nAll notable changes.\n\n### 1.2.4 (2016-03-01)\n* fix\n\n### 1.2.3\n* old\n";
        let body = excerpt(text);
        assert!(body.starts_with("### 1.2.4"));
        assert!(body.ends_with("* old\n"));
        assert!(!body.contains("All notable changes"));
    }

    #[test]
    fn test_excerpt_without_marker_is_whole_text() {
        assert_eq!(excerpt("just notes"), "just notes");
    }

    #[test]
    fn test_deeper_heading_counts_as_marker() {
        assert_eq!(excerpt("intro\n#### deep\n"), "#### deep\n");
    }
}
