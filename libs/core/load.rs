use std::sync::Arc;

use eyre::WrapErr;
use taskboard_config::{Config, DocumentFormat, StorageType};
use taskboard_document_store::{
    stores::{file::FileStore, in_memory::InMemoryStore},
    AccessRule, AccessRules, Collection, DocumentParser, DocumentStore, DocumentStoreBox,
    JsonParser, SecuredStore, TomlParser, YamlParser,
};
use taskboard_identity::{IdentityProviderBox, LocalIdentityProvider};
use tracing::debug;

use crate::{
    entities::task::OWNER_FIELD, App, PromptBox, ProviderAuthContext, TaskSynchronizer,
};

/// Build the app from the config file at `config_path`, falling back to the
/// default configuration when there is no such file.
pub async fn load(
    config_path: &str,
    profile_name: Option<&str>,
    prompt: PromptBox,
) -> eyre::Result<App> {
    let (config, found_config_file) = resolve_config(config_path)?;

    let mut app = load_from_config(&config, profile_name, prompt).await?;
    app.found_config_file = found_config_file;
    Ok(app)
}

fn resolve_config(config_path: &str) -> eyre::Result<(Config, eyre::Result<()>)> {
    let config = taskboard_config::load_if_exists(config_path)
        .wrap_err_with(|| format!("invalid config file '{config_path}'"))?;

    Ok(match config {
        Some(config) => (config, Ok(())),
        None => {
            debug!(config_path, "no config file, using defaults");
            (
                Config::default(),
                Err(eyre::eyre!("config path '{config_path}' was not found")),
            )
        }
    })
}

pub async fn load_from_config(
    config: &Config,
    profile_name: Option<&str>,
    prompt: PromptBox,
) -> eyre::Result<App> {
    let profile = config.get_profile(profile_name)?;
    let collection = profile.get_collection();

    let (store, identity_provider) = match profile.get_storage_type() {
        StorageType::File => {
            let location = profile.get_storage_location()?;
            debug!(location = ?location, "using file storage");

            let identity_provider = LocalIdentityProvider::open(location.join("identity"))
                .await
                .wrap_err_with(|| format!("couldn't open accounts in '{}'", location.display()))?;
            let identity_provider = IdentityProviderBox::new(identity_provider);

            let parser = get_parser(profile.get_document_format());
            let store = FileStore::try_new(location.join("documents"), parser)
                .await
                .wrap_err_with(|| format!("couldn't open documents in '{}'", location.display()))?;

            (
                secure(store, &collection, &identity_provider),
                identity_provider,
            )
        }
        StorageType::InMemory => {
            let identity_provider = IdentityProviderBox::new(LocalIdentityProvider::in_memory());
            (
                secure(InMemoryStore::new(), &collection, &identity_provider),
                identity_provider,
            )
        }
    };

    let login_route = config.core.get_login_route();
    let synchronizer = TaskSynchronizer::builder()
        .collection(Collection::new(store, collection))
        .identity_provider(identity_provider.clone())
        .prompt(prompt)
        .login_route(login_route.clone())
        .build();

    Ok(App {
        synchronizer,
        identity_provider,
        login_route,
        found_config_file: Ok(()),
    })
}

fn get_parser(format: DocumentFormat) -> DocumentParser {
    match format {
        DocumentFormat::Json => JsonParser::get(),
        DocumentFormat::Yaml => YamlParser::get(),
        DocumentFormat::Toml => TomlParser::get(),
    }
}

/// Tasks of `collection` are only reachable by the signed-in owner
fn secure<S: DocumentStore + 'static>(
    store: S,
    collection: &str,
    identity_provider: &IdentityProviderBox,
) -> DocumentStoreBox {
    let rules = AccessRules::new().with_rule(collection, AccessRule::owner_field(OWNER_FIELD));
    let auth = Arc::new(ProviderAuthContext::new(identity_provider.clone()));
    DocumentStoreBox::new(SecuredStore::new(store, rules, auth))
}
