use std::path::Path;

use crate::Config;

pub fn load(config_path: &str) -> eyre::Result<Config> {
    load_if_exists(config_path)?
        .ok_or_else(|| eyre::eyre!("config path '{config_path}' was not found"))
}

/// `None` when there is no file at `config_path`, a file that can't be read
/// or parsed is an error
pub fn load_if_exists(config_path: &str) -> eyre::Result<Option<Config>> {
    match read_file_content_if_exist(config_path)? {
        Some(content) => Ok(Some(parse(&content)?)),
        None => Ok(None),
    }
}

pub fn parse(content: &str) -> eyre::Result<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

fn read_file_content_if_exist(file_path: &str) -> eyre::Result<Option<String>> {
    let path = Path::new(file_path);

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    Ok(Some(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentFormat, StorageType};

    #[test]
    fn parse_full_config() -> eyre::Result<()> {
        let config = parse(
            r#"
            [core]
            default_profile_name = "personal"
            login_route = "/sign-in"

            [profile.personal]
            storage_location = "/var/lib/taskboard"
            storage_type = "file"
            document_format = "yaml"
            collection = "todos"

            [profile.scratch]
            storage_type = "in-memory"
            "#,
        )?;

        assert_eq!(config.core.get_login_route(), "/sign-in");

        let personal = config.get_profile(None)?;
        assert_eq!(personal.get_document_format(), DocumentFormat::Yaml);
        assert_eq!(personal.get_collection(), "todos");

        let scratch = config.get_profile(Some("scratch"))?;
        assert_eq!(scratch.get_storage_type(), StorageType::InMemory);
        Ok(())
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let path = path.to_str().unwrap();

        assert!(load(path).is_err());
        assert!(load_if_exists(path).unwrap().is_none());
    }

    #[test]
    fn invalid_file_is_an_error() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profile.work]\nstorage_type = \"memory\"\n")?;
        let path = path.to_str().unwrap();

        assert!(load_if_exists(path).is_err());
        assert!(load(path).is_err());
        Ok(())
    }

    #[test]
    fn existing_file_is_loaded() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profile.work]\nstorage_type = \"in-memory\"\n")?;

        let config = load_if_exists(path.to_str().unwrap())?.unwrap();
        assert_eq!(
            config.get_profile(Some("work"))?.get_storage_type(),
            StorageType::InMemory
        );
        Ok(())
    }
}
