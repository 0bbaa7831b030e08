//! Version synchronization across every configured manifest.
//!
//! JSON manifests are processed first. The version computed for the first one
//! is canonical and is written verbatim into every other manifest, so all
//! files agree after a bump even if they disagreed before it.

use crate::error::{Result, VersionError};
use crate::version::{BumpRequest, Manifest, ManifestKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result of a version update operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Version of the first processed manifest before the bump
    pub previous_version: String,
    /// Canonical version now carried by every manifest
    pub new_version: String,
    /// Files that were written
    pub modified_files: Vec<PathBuf>,
    /// Configured files skipped for having an unknown extension
    pub skipped_files: Vec<PathBuf>,
}

/// Coordinates version updates across a project's manifests
#[derive(Debug, Clone)]
pub struct VersionUpdater {
    /// Project root that relative manifest paths resolve against
    root: PathBuf,
    /// Manifests in configured order
    files: Vec<PathBuf>,
    /// Output directory for XML manifests, relative to `root`
    client_folder: Option<PathBuf>,
}

impl VersionUpdater {
    /// Create an updater for `files` under `root`
    pub fn new(root: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files,
            client_folder: None,
        }
    }

    /// Write XML manifests into this folder instead of in place
    pub fn with_client_folder(mut self, folder: Option<PathBuf>) -> Self {
        self.client_folder = folder;
        self
    }

    /// Apply `request` to every manifest
    pub fn update(&self, request: &BumpRequest) -> Result<UpdateResult> {
        let mut json = Vec::new();
        let mut xml = Vec::new();
        let mut skipped_files = Vec::new();

        for file in &self.files {
            match ManifestKind::from_path(file) {
                Some(ManifestKind::Json) => json.push(file),
                Some(ManifestKind::Xml) => xml.push(file),
                None => {
                    log::warn!("ignoring {}: not a JSON or XML manifest", file.display());
                    skipped_files.push(file.clone());
                }
            }
        }

        // Load everything up front so a malformed manifest fails the bump
        // before anything is written.
        let json: Vec<Manifest> = json
            .into_iter()
            .map(|f| Manifest::open(&self.root.join(f)))
            .collect::<Result<_>>()?;
        let xml: Vec<Manifest> = xml
            .into_iter()
            .map(|f| Manifest::open(&self.root.join(f)))
            .collect::<Result<_>>()?;

        let first = json.first().or(xml.first()).ok_or(VersionError::NoManifests)?;
        let previous_version = first.version().or_else(|e| match request {
            BumpRequest::Explicit(_) => Ok(String::new()),
            BumpRequest::Increment(_) => Err(e),
        })?;
        let new_version = request.apply(&previous_version)?.to_string();
        log::info!(
            "{} -> {} ({}, from {})",
            if previous_version.is_empty() { "<none>" } else { previous_version.as_str() },
            new_version,
            request,
            first.path().display()
        );

        // Rewrite every manifest in memory before touching disk.
        let mut pending = Vec::with_capacity(json.len() + xml.len());
        for mut manifest in json {
            manifest.set_version(&new_version)?;
            let dest = manifest.path().to_path_buf();
            pending.push((manifest, dest));
        }
        for mut manifest in xml {
            manifest.set_version(&new_version)?;
            let dest = self.xml_destination(manifest.path());
            pending.push((manifest, dest));
        }

        let mut modified_files = Vec::with_capacity(pending.len());
        for (manifest, dest) in pending {
            manifest.write_to(&dest)?;
            modified_files.push(dest);
        }

        Ok(UpdateResult {
            previous_version,
            new_version,
            modified_files,
            skipped_files,
        })
    }

    fn xml_destination(&self, source: &Path) -> PathBuf {
        match (&self.client_folder, source.file_name()) {
            (Some(folder), Some(name)) => self.root.join(folder).join(name),
            _ => source.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionBump;
    use std::fs;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_patch_bump_reaches_every_manifest() {
        let dir = project(&[
            ("package.json", "{\n  \"name\": \"app\",\n  \"version\": \"1.2.3\"\n}\n"),
            ("bower.json", "{\"version\": \"0.0.1\"}"),
            ("client/config.xml", "<widget version=\"1.2.3\"></widget>"),
        ]);
        let updater = VersionUpdater::new(
            dir.path(),
            vec![
                PathBuf::from("client/config.xml"),
                PathBuf::from("package.json"),
                PathBuf::from("bower.json"),
            ],
        );

        let result = updater
            .update(&BumpRequest::Increment(VersionBump::Patch))
            .unwrap();

        assert_eq!(result.previous_version, "1.2.3");
        assert_eq!(result.new_version, "1.2.4");
        assert_eq!(result.modified_files.len(), 3);
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "{\n  \"name\": \"app\",\n  \"version\": \"1.2.4\"\n}\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("bower.json")).unwrap(),
            "{\"version\": \"1.2.4\"}"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("client/config.xml")).unwrap(),
            "<widget version=\"1.2.4\"></widget>"
        );
    }

    #[test]
    fn test_explicit_version_everywhere() {
        let dir = project(&[
            ("package.json", "{\"version\": \"1.2.3\"}"),
            ("config.xml", "<widget version=\"0.9.0\"/>"),
        ]);
        let updater = VersionUpdater::new(
            dir.path(),
            vec![PathBuf::from("package.json"), PathBuf::from("config.xml")],
        );

        let result = updater
            .update(&BumpRequest::Explicit("5.0.0-rc.1".to_string()))
            .unwrap();

        assert_eq!(result.new_version, "5.0.0-rc.1");
        assert!(fs::read_to_string(dir.path().join("config.xml")).unwrap().contains("5.0.0-rc.1"));
        assert!(fs::read_to_string(dir.path().join("package.json")).unwrap().contains("5.0.0-rc.1"));
    }

    #[test]
    fn test_xml_written_into_client_folder() {
        let dir = project(&[
            ("package.json", "{\"version\": \"0.1.0\"}"),
            ("config.xml", "<widget version=\"0.1.0\"/>"),
        ]);
        let updater = VersionUpdater::new(
            dir.path(),
            vec![PathBuf::from("package.json"), PathBuf::from("config.xml")],
        )
        .with_client_folder(Some(PathBuf::from("www")));

        let result = updater
            .update(&BumpRequest::Increment(VersionBump::Minor))
            .unwrap();

        assert!(result.modified_files.contains(&dir.path().join("www/config.xml")));
        assert_eq!(
            fs::read_to_string(dir.path().join("www/config.xml")).unwrap(),
            "<widget version=\"0.2.0\"/>"
        );
    }

    #[test]
    fn test_xml_only_project_bumps_from_xml() {
        let dir = project(&[("config.xml", "<widget version=\"2.0.0\"/>")]);
        let updater = VersionUpdater::new(dir.path(), vec![PathBuf::from("config.xml")]);
        let result = updater
            .update(&BumpRequest::Increment(VersionBump::Major))
            .unwrap();
        assert_eq!(result.new_version, "3.0.0");
    }

    #[test]
    fn test_unknown_extensions_skipped_and_empty_set_rejected() {
        let dir = project(&[("Cargo.toml", "[package]\nversion = \"1.0.0\"\n")]);
        let updater = VersionUpdater::new(dir.path(), vec![PathBuf::from("Cargo.toml")]);
        let err = updater
            .update(&BumpRequest::Increment(VersionBump::Patch))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Version(VersionError::NoManifests)
        ));
    }

    #[test]
    fn test_nothing_written_when_a_manifest_is_missing() {
        let dir = project(&[("package.json", "{\"version\": \"1.0.0\"}")]);
        let updater = VersionUpdater::new(
            dir.path(),
            vec![PathBuf::from("package.json"), PathBuf::from("missing.xml")],
        );
        assert!(updater.update(&BumpRequest::default()).is_err());
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "{\"version\": \"1.0.0\"}"
        );
    }

    #[test]
    fn test_nothing_written_when_a_later_manifest_lacks_version() {
        let dir = project(&[
            ("package.json", "{\"version\": \"1.2.3\"}"),
            ("bower.json", "{\"name\": \"x\"}"),
            ("config.xml", "<widget version=\"1.2.3\"/>"),
        ]);
        let updater = VersionUpdater::new(
            dir.path(),
            vec![
                PathBuf::from("package.json"),
                PathBuf::from("bower.json"),
                PathBuf::from("config.xml"),
            ],
        );

        let err = updater.update(&BumpRequest::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Version(VersionError::MissingVersion { .. })
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "{\"version\": \"1.2.3\"}"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("config.xml")).unwrap(),
            "<widget version=\"1.2.3\"/>"
        );
    }
}
