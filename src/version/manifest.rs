//! Reading and rewriting the version field of JSON and XML manifests.
//!
//! Edits are textual: only the version value changes, so indentation,
//! key order and comments in the manifest survive a bump.

use crate::error::{Result, VersionError};
use regex::Regex;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static JSON_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""version"\s*:\s*"([^"\\]*)""#).expect("static regex is valid")
});

/// Manifest format, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// `package.json`, `bower.json`, ...
    Json,
    /// `config.xml` and friends
    Xml,
}

impl ManifestKind {
    /// Classify a path; `None` for unsupported extensions
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ManifestKind::Json),
            "xml" => Some(ManifestKind::Xml),
            _ => None,
        }
    }
}

/// A manifest loaded into memory
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    kind: ManifestKind,
    content: String,
}

impl Manifest {
    /// Read a manifest from disk
    pub fn open(path: &Path) -> Result<Self> {
        let kind = ManifestKind::from_path(path).ok_or_else(|| VersionError::ManifestReadFailed {
            path: path.to_path_buf(),
            reason: "unsupported manifest extension".to_string(),
        })?;
        let content =
            std::fs::read_to_string(path).map_err(|e| VersionError::ManifestReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_content(path, kind, content))
    }

    /// Build from in-memory text
    pub fn from_content(path: &Path, kind: ManifestKind, content: String) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            content,
        }
    }

    /// Manifest path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current version string
    pub fn version(&self) -> Result<String> {
        match self.kind {
            ManifestKind::Json => json_version(&self.content, &self.path),
            ManifestKind::Xml => xml_version(&self.content)
                .ok_or_else(|| VersionError::MissingVersion {
                    path: self.path.clone(),
                }
                .into()),
        }
    }

    /// Replace the version value in memory
    pub fn set_version(&mut self, version: &str) -> Result<()> {
        self.content = match self.kind {
            ManifestKind::Json => set_json_version(&self.content, version).ok_or_else(|| {
                VersionError::MissingVersion {
                    path: self.path.clone(),
                }
            })?,
            ManifestKind::Xml => set_xml_version(&self.content, version).ok_or_else(|| {
                VersionError::ManifestUpdateFailed {
                    path: self.path.clone(),
                    reason: "no root element found".to_string(),
                }
            })?,
        };
        Ok(())
    }

    /// Write the current text to `dest`, creating parent directories
    pub fn write_to(&self, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| VersionError::ManifestUpdateFailed {
                path: dest.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        std::fs::write(dest, &self.content).map_err(|e| VersionError::ManifestUpdateFailed {
            path: dest.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::debug!("wrote {}", dest.display());
        Ok(())
    }
}

/// Read the top-level `version` of a JSON document that may carry comments
pub fn json_version(content: &str, path: &Path) -> Result<String> {
    let cleaned = blank_json_comments(content);
    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| VersionError::ManifestReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    value
        .get("version")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            VersionError::MissingVersion {
                path: path.to_path_buf(),
            }
            .into()
        })
}

/// Rewrite the top-level `version` value, leaving every other byte intact.
///
/// Returns `None` when the root object has no string `version` key.
pub fn set_json_version(content: &str, version: &str) -> Option<String> {
    let cleaned = blank_json_comments(content);
    let roots = root_string_offsets(&cleaned);

    let value = JSON_VERSION
        .captures_iter(&cleaned)
        .find(|caps| caps.get(0).is_some_and(|m| roots.binary_search(&m.start()).is_ok()))
        .and_then(|caps| caps.get(1))?;

    let mut out = String::with_capacity(content.len() + version.len());
    out.push_str(&content[..value.start()]);
    out.push_str(version);
    out.push_str(&content[value.end()..]);
    Some(out)
}

/// Replace `//` and `/* */` comments with spaces.
///
/// Byte offsets are preserved so positions found in the result index the
/// original text. Newlines inside block comments are kept.
pub fn blank_json_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                out.push_str("  ");
                chars.next();
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    blank(&mut out, n);
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                out.push_str("  ");
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    blank(&mut out, n);
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn blank(out: &mut String, c: char) {
    if c == '\n' || c == '\r' {
        out.push(c);
    } else {
        out.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

/// Byte offsets of the opening quote of every string directly inside the root object
fn root_string_offsets(content: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in content.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            '"' => {
                in_string = true;
                if depth == 1 {
                    offsets.push(i);
                }
            }
            _ => {}
        }
    }

    offsets
}

/// Version attribute of the root element
pub fn xml_version(content: &str) -> Option<String> {
    let tag = root_start_tag(content)?;
    let tag_text = &content[tag];
    let value = attribute_value(tag_text, "version")?;
    Some(tag_text[value].to_string())
}

/// Set the root element's `version` attribute, adding it when absent
pub fn set_xml_version(content: &str, version: &str) -> Option<String> {
    let tag = root_start_tag(content)?;
    let tag_text = &content[tag.clone()];

    let mut out = String::with_capacity(content.len() + version.len() + 12);
    match attribute_value(tag_text, "version") {
        Some(value) => {
            out.push_str(&content[..tag.start + value.start]);
            out.push_str(&escape_attr(version));
            out.push_str(&content[tag.start + value.end..]);
        }
        None => {
            let name_end = element_name_end(tag_text);
            out.push_str(&content[..tag.start + name_end]);
            out.push_str(&format!(" version=\"{}\"", escape_attr(version)));
            out.push_str(&content[tag.start + name_end..]);
        }
    }
    Some(out)
}

fn element_name_end(tag_text: &str) -> usize {
    tag_text[1..]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .map_or(tag_text.len(), |i| i + 1)
}

/// Byte range of the value of attribute `name` in a start tag.
///
/// Attributes are walked one by one, so text inside another attribute's
/// quoted value never matches.
fn attribute_value(tag_text: &str, name: &str) -> Option<Range<usize>> {
    let bytes = tag_text.as_bytes();
    let skip_ws = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let mut i = element_name_end(tag_text);
    loop {
        i = skip_ws(i);
        if i >= bytes.len() || bytes[i] == b'>' || bytes[i] == b'/' {
            return None;
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let attr_name = &tag_text[name_start..i];

        i = skip_ws(i);
        if bytes.get(i) != Some(&b'=') {
            // Valueless attribute; not well-formed XML but keep walking.
            continue;
        }
        i = skip_ws(i + 1);

        let quote = *bytes.get(i)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = i + 1;
        let value_end = value_start + tag_text[value_start..].find(quote as char)?;
        if attr_name == name {
            return Some(value_start..value_end);
        }
        i = value_end + 1;
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Byte range of the root element's start tag, skipping the prolog
fn root_start_tag(content: &str) -> Option<Range<usize>> {
    let mut pos = 0;
    loop {
        let start = pos + content[pos..].find('<')?;
        let rest = &content[start..];

        if rest.starts_with("<?") {
            pos = start + rest.find("?>")? + 2;
            continue;
        }
        if rest.starts_with("<!--") {
            pos = start + rest.find("-->")? + 3;
            continue;
        }
        if rest.starts_with("<!") {
            pos = start + rest.find('>')? + 1;
            continue;
        }

        let mut quote: Option<char> = None;
        for (i, c) in rest.char_indices() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c == '>' => return Some(start..start + i + 1),
                None => {}
            }
        }
        return None;
    }
}
