//! # Command Context
//!
//! Opens everything a command needs, in order:
//!
//! ```text
//! 1. ShopConfig::load (file + SHOP_* env), then --db override
//! 2. SQLite local storage (created with its parent directory)
//! 3. Remote API client (offline stand-in when no base_url is set)
//! 4. ShopSession as guest, load both collections
//! 5. --account given: switch owner (runs the sign-in merge)
//! ```

use shop_core::{AccountId, OwnerContext, PricingEngine};
use shop_db::{Database, DbConfig};
use shop_store::{HttpRemoteApi, InMemoryRemoteApi, OwnerChange, RemoteApi, ShopConfig, ShopSession};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::{ApiError, ErrorCode};

/// Loads configuration and applies command line overrides.
pub fn load_config(cli: &Cli) -> Result<ShopConfig, ApiError> {
    let mut config = ShopConfig::load(cli.config.clone())?;

    if let Some(ref db) = cli.db {
        config.storage.database_path = Some(db.clone());
    }

    Ok(config)
}

fn ensure_parent_dir(path: &Path) -> Result<(), ApiError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::new(
                ErrorCode::StorageError,
                format!("Could not create {}: {}", parent.display(), e),
            )
        }),
        _ => Ok(()),
    }
}

pub struct AppContext {
    pub config: ShopConfig,
    pub session: ShopSession,
    /// Set when `--account` changed the owner during startup.
    pub owner_change: Option<OwnerChange>,
    db: Database,
}

impl AppContext {
    pub async fn open(cli: &Cli) -> Result<Self, ApiError> {
        let config = load_config(cli)?;

        let db_path = config.database_path();
        ensure_parent_dir(&db_path)?;
        debug!(?db_path, "Opening local storage");
        let db = Database::new(DbConfig::new(&db_path)).await?;

        let remote: Arc<dyn RemoteApi> = if config.remote.base_url.is_some() {
            Arc::new(HttpRemoteApi::from_settings(&config.remote)?)
        } else {
            // Guests never reach the remote; signing in is rejected below
            let offline = InMemoryRemoteApi::new();
            offline.set_offline(true);
            Arc::new(offline)
        };

        let pricing = Arc::new(PricingEngine::new(config.pricing.clone()));
        let mut session = ShopSession::new(Arc::new(db.local_storage()), remote, pricing);
        session.load().await;

        let owner_change = match cli.account {
            Some(ref account) => {
                let account = AccountId::parse(account).map_err(|e| ApiError::validation(e.to_string()))?;
                if config.remote.base_url.is_none() {
                    return Err(ApiError::config(
                        "remote.base_url (or SHOP_REMOTE_URL) is required to sign in",
                    ));
                }
                let owner = OwnerContext::Authenticated(account);
                info!(owner = %owner, "Switching session owner");
                Some(session.switch_owner(owner).await?)
            }
            None => None,
        };

        Ok(AppContext {
            config,
            session,
            owner_change,
            db,
        })
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}
