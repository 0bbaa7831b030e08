//! Version management for JSON and XML manifests.
//!
//! This module provides semantic version bumping and format-preserving
//! manifest edits.

mod bumper;
mod manifest;
mod updater;

pub use bumper::{BumpRequest, VersionBump, VersionBumper, parse_version};
pub use manifest::{
    Manifest, ManifestKind, blank_json_comments, json_version, set_json_version,
    set_xml_version, xml_version,
};
pub use updater::{UpdateResult, VersionUpdater};

use crate::error::Result;
use std::path::Path;

/// Read the version a release step should use from `manifest_path`.
///
/// Commit, tag and release all read it back from disk after the bump
/// rather than trusting an in-memory value.
pub fn read_release_version(manifest_path: &Path) -> Result<String> {
    let manifest = Manifest::open(manifest_path)?;
    let version = manifest.version()?;
    parse_version(&version)?;
    Ok(version)
}
