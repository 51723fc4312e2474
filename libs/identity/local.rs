use std::path::{Path, PathBuf};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_derive::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::{
    normalize_email, EventEmitter, Identity, IdentityError, IdentityProvider, IdentityResult,
    PinFuture, SessionEvent, SessionListener,
};

const MIN_PASSWORD_LENGTH: usize = 6;
const ACCOUNTS_FILE: &str = "accounts.json";
const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    salt: String,
    password_digest: String,
}

impl Account {
    fn new(email: String, password: &str) -> Self {
        let salt = Ulid::new().to_string();
        let password_digest = digest(&salt, password);
        Self {
            uid: Ulid::new().to_string(),
            email,
            salt,
            password_digest,
        }
    }

    fn verify(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.password_digest
    }

    fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }
}

fn digest(salt: &str, password: &str) -> String {
    hex::encode(
        Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(password.as_bytes())
            .finalize(),
    )
}

/// Identity provider keeping accounts and the current session in process,
/// optionally mirrored to `accounts.json` / `session.json` in a directory so
/// that a session outlives the process that opened it.
pub struct LocalIdentityProvider {
    accounts: DashMap<String, Account>,
    session: RwLock<Option<Identity>>,
    emitter: EventEmitter<SessionEvent>,
    data_dir: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl LocalIdentityProvider {
    pub fn in_memory() -> Self {
        Self {
            accounts: DashMap::new(),
            session: RwLock::new(None),
            emitter: EventEmitter::new(),
            data_dir: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Load accounts and the persisted session from `data_dir`
    pub async fn open(data_dir: impl AsRef<Path>) -> IdentityResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;

        let accounts: Vec<Account> = read_json(&data_dir.join(ACCOUNTS_FILE))
            .await?
            .unwrap_or_default();
        let session: Option<Identity> = read_json(&data_dir.join(SESSION_FILE)).await?;

        let provider = Self {
            data_dir: Some(data_dir),
            ..Self::in_memory()
        };
        for account in accounts {
            provider.accounts.insert(account.email.clone(), account);
        }

        // a session is only restored while its account still exists
        let session = session.filter(|identity| {
            provider
                .accounts
                .get(&identity.email)
                .is_some_and(|account| account.uid == identity.uid)
        });
        debug!(
            accounts = provider.accounts.len(),
            restored_session = session.is_some(),
            "local identity provider opened"
        );
        *provider.session.write() = session;

        Ok(provider)
    }

    /// Write the known accounts plus `added` to disk
    async fn persist_accounts(&self, added: &Account) -> IdentityResult<()> {
        let Some(data_dir) = &self.data_dir else {
            return Ok(());
        };
        let mut accounts = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .chain(std::iter::once(added.clone()))
            .collect::<Vec<_>>();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        write_json(&data_dir.join(ACCOUNTS_FILE), &accounts).await
    }

    async fn persist_session(&self, session: Option<&Identity>) -> IdentityResult<()> {
        let Some(data_dir) = &self.data_dir else {
            return Ok(());
        };
        let path = data_dir.join(SESSION_FILE);
        match session {
            Some(identity) => write_json(&path, identity).await,
            None => match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }

    async fn open_session(&self, identity: Identity) -> IdentityResult<Identity> {
        self.persist_session(Some(&identity)).await?;
        *self.session.write() = Some(identity.clone());

        info!(email = %identity.email, "session opened");
        self.emitter.notify(&SessionEvent::SignedIn(identity.clone()));
        Ok(identity)
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.session.read().clone()
    }

    fn subscribe(&self) -> SessionListener {
        // read lock held so no session change slips between the snapshot and the registration
        let session = self.session.read();
        self.emitter
            .subscribe_with(Some(SessionEvent::from_session(session.clone())))
    }

    fn unsubscribe(&self, listener_id: u64) {
        self.emitter.unsubscribe(listener_id);
    }

    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> PinFuture<'a, IdentityResult<Identity>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            let email = normalize_email(email)?;
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(IdentityError::WeakPassword(MIN_PASSWORD_LENGTH));
            }
            if self.accounts.contains_key(&email) {
                return Err(IdentityError::AccountExists(email));
            }

            let account = Account::new(email.clone(), password);
            let identity = account.identity();
            self.persist_accounts(&account).await?;
            self.accounts.insert(email, account);

            info!(email = %identity.email, "account created");
            self.open_session(identity).await
        })
    }

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> PinFuture<'a, IdentityResult<Identity>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            let email = normalize_email(email).map_err(|_| IdentityError::InvalidCredentials)?;
            let identity = match self.accounts.get(&email) {
                Some(account) if account.verify(password) => account.identity(),
                _ => {
                    warn!(email = %email, "rejected sign in");
                    return Err(IdentityError::InvalidCredentials);
                }
            };

            self.open_session(identity).await
        })
    }

    fn sign_out(&self) -> PinFuture<'_, IdentityResult<()>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            if self.current_identity().is_none() {
                return Ok(());
            }

            self.persist_session(None).await?;
            let previous = self.session.write().take();

            if let Some(identity) = previous {
                info!(email = %identity.email, "session closed");
            }
            self.emitter.notify(&SessionEvent::SignedOut);
            Ok(())
        })
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> IdentityResult<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Written next to `path` then renamed over it
async fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> IdentityResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");

    tokio::fs::write(&tmp_path, content).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}
