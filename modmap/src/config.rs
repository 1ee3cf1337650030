//! The configuration of a [`crate::Registry`]: which reference sources to read, in which order.

use std::path::{Path, PathBuf};

use context_error::*;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::{MapperError, MapperIssue, ReferenceSource, SourceRole};

/// The file name of the primary reference source in a data directory
pub const PRIMARY_FILE_NAME: &str = "unimod.xml";
/// The file name of the user defined modifications in a data directory
pub const USER_FILE_NAME: &str = "usermod.xml";

/// The ordered list of reference sources. Records from earlier sources get lower record
/// positions and so win all 'first' lookups.
///
/// ```rust
/// use modmap::{MapperConfig, SourceRole};
/// let config = MapperConfig::from_json(
///     r#"{"sources": [{"path": "data/unimod.xml", "role": "primary"}, {"path": "data/usermod.xml", "role": "optional"}]}"#,
/// ).unwrap();
/// assert_eq!(config, MapperConfig::in_directory("data"));
/// assert_eq!(config.sources[1].role, SourceRole::Optional);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MapperConfig {
    /// All sources, in order
    pub sources: Vec<ReferenceSource>,
}

impl MapperConfig {
    /// Create a configuration from the given sources
    pub fn new(sources: impl IntoIterator<Item = ReferenceSource>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
        }
    }

    /// The default layout of a data directory: the primary `unimod.xml` followed by the optional
    /// `usermod.xml`.
    pub fn in_directory(directory: impl AsRef<Path>) -> Self {
        let directory = directory.as_ref();
        Self::new([
            ReferenceSource::primary(directory.join(PRIMARY_FILE_NAME)),
            ReferenceSource::optional(directory.join(USER_FILE_NAME)),
        ])
    }

    /// The default data directory layout ([`Self::in_directory`]) in the platform specific data
    /// directory of the current user. Returns `None` if no suitable directory could be found.
    pub fn user_data_dir() -> Option<Self> {
        ProjectDirs::from("org", "modmap", "modmap")
            .map(|p| p.data_dir().to_owned())
            .or_else(|| BaseDirs::new().map(|b| b.home_dir().join(".modmap")))
            .map(Self::in_directory)
    }

    /// Read a configuration from JSON.
    /// # Errors
    /// If the JSON is not valid or does not describe a configuration.
    pub fn from_json(json: &str) -> Result<Self, MapperIssue> {
        serde_json::from_str(json).map_err(|e| {
            BoxedError::new(
                MapperError::InvalidConfiguration,
                "Invalid configuration",
                e.to_string(),
                Context::show(json.to_string()),
            )
        })
    }

    /// Add a source at the end
    #[must_use]
    pub fn with_source(mut self, source: ReferenceSource) -> Self {
        self.sources.push(source);
        self
    }

    /// The source user defined records are written to by default, the first optional source.
    pub fn user_source(&self) -> Option<&Path> {
        self.sources
            .iter()
            .find(|s| s.role == SourceRole::Optional)
            .map(|s| s.path.as_path())
    }

    /// See if the given path is one of the sources
    pub fn contains(&self, path: &Path) -> bool {
        self.sources.iter().any(|s| s.path == path)
    }

    /// All source paths in order
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.sources.iter().map(|s| &s.path)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn data_directory_layout() {
        let config = MapperConfig::in_directory("/data");
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].role, SourceRole::Primary);
        assert_eq!(config.sources[0].path, Path::new("/data/unimod.xml"));
        assert_eq!(config.user_source(), Some(Path::new("/data/usermod.xml")));
    }

    #[test]
    fn default_role_is_required() {
        let config = MapperConfig::from_json(r#"{"sources": [{"path": "a.xml"}]}"#).unwrap();
        assert_eq!(config.sources[0].role, SourceRole::Required);
        assert_eq!(config.user_source(), None);
    }

    #[test]
    fn invalid_json() {
        let error = MapperConfig::from_json(r#"{"sources": [{"role": "primary"}]}"#).unwrap_err();
        assert!(matches!(
            error.get_kind(),
            MapperError::InvalidConfiguration
        ));
        assert!(MapperConfig::from_json(r#"{"sources": [{"path": "a", "role": "main"}]}"#).is_err());
    }

    #[test]
    fn json_round_trip() {
        let config = MapperConfig::in_directory("data").with_source(ReferenceSource::required("extra.xml.gz"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""role":"optional""#));
        assert_eq!(MapperConfig::from_json(&json).unwrap(), config);
        assert!(config.contains(Path::new("extra.xml.gz")));
        assert_eq!(config.paths().count(), 3);
    }
}
