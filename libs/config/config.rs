use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_PROFILE_NAME: &str = "default";
const DEFAULT_LOGIN_ROUTE: &str = "/login";
const DEFAULT_STORAGE_LOCATION: &str = "~/.local/share/taskboard";
const DEFAULT_COLLECTION: &str = "tasks";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub profile: HashMap<String, ProfileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct CoreConfig {
    /// Profile used by default when none are specified
    pub default_profile_name: Option<String>,

    /// Where unauthenticated users are sent (default: "/login")
    pub login_route: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProfileConfig {
    /// Where accounts, session and documents are kept (default: ~/.local/share/taskboard/)
    pub storage_location: Option<String>,

    /// Backend holding the documents (default: file)
    pub storage_type: Option<StorageType>,

    /// On-disk format of each document for the file backend (default: json)
    pub document_format: Option<DocumentFormat>,

    /// Name of the collection holding the tasks (default: "tasks")
    pub collection: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StorageType {
    #[default]
    File,
    InMemory,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

impl Config {
    /// Gets the profile named `profile_name`, or the default profile when
    /// `None`. The default profile doesn't need to be declared.
    pub fn get_profile(&self, profile_name: Option<&str>) -> eyre::Result<ProfileConfig> {
        let profile_name = profile_name
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| self.core.get_default_profile_name());

        match self.profile.get(&profile_name) {
            Some(profile) => Ok(profile.clone()),
            None if profile_name == DEFAULT_PROFILE_NAME => Ok(ProfileConfig::default()),
            None => Err(eyre::eyre!("Profile '{profile_name}' not found in config")),
        }
    }
}

impl CoreConfig {
    /// Return the default profile name is set or "default"
    pub fn get_default_profile_name(&self) -> String {
        self.default_profile_name
            .clone()
            .unwrap_or(DEFAULT_PROFILE_NAME.to_owned())
    }

    pub fn get_login_route(&self) -> String {
        self.login_route
            .clone()
            .unwrap_or(DEFAULT_LOGIN_ROUTE.to_owned())
    }
}

impl ProfileConfig {
    /// Gets the storage location for this profile, with `~` and env vars expanded.
    pub fn get_storage_location(&self) -> eyre::Result<PathBuf> {
        let path_str = self
            .storage_location
            .as_deref()
            .unwrap_or(DEFAULT_STORAGE_LOCATION);
        let expanded_path = shellexpand::full(path_str)
            .map_err(|e| eyre::eyre!("couldn't expand storage location '{path_str}': {e}"))?;
        Ok(PathBuf::from(expanded_path.as_ref()))
    }

    pub fn get_storage_type(&self) -> StorageType {
        self.storage_type.unwrap_or_default()
    }

    pub fn get_document_format(&self) -> DocumentFormat {
        self.document_format.unwrap_or_default()
    }

    pub fn get_collection(&self) -> String {
        self.collection
            .clone()
            .unwrap_or(DEFAULT_COLLECTION.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() -> eyre::Result<()> {
        let config = Config::default();
        let profile = config.get_profile(None)?;

        assert_eq!(config.core.get_login_route(), "/login");
        assert_eq!(profile.get_storage_type(), StorageType::File);
        assert_eq!(profile.get_document_format(), DocumentFormat::Json);
        assert_eq!(profile.get_collection(), "tasks");
        Ok(())
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(config.get_profile(Some("work")).is_err());
    }

    #[test]
    fn default_profile_name_is_honored() -> eyre::Result<()> {
        let mut config = Config::default();
        config.core.default_profile_name = Some("work".to_owned());
        config.profile.insert(
            "work".to_owned(),
            ProfileConfig {
                collection: Some("work-tasks".to_owned()),
                ..Default::default()
            },
        );

        assert_eq!(config.get_profile(None)?.get_collection(), "work-tasks");
        Ok(())
    }

    #[test]
    fn storage_location_is_expanded() -> eyre::Result<()> {
        let profile = ProfileConfig {
            storage_location: Some("/tmp/taskboard".to_owned()),
            ..Default::default()
        };
        assert_eq!(profile.get_storage_location()?, PathBuf::from("/tmp/taskboard"));
        Ok(())
    }
}
