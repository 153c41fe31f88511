//! # Identity Watcher
//!
//! Bridges the auth provider to a shared [`ShopSession`]. The provider
//! publishes the current [`OwnerContext`] on a `tokio::sync::watch`
//! channel; the watcher applies every change in order.
//!
//! ```text
//! auth provider ──watch::Sender<OwnerContext>──► SessionWatcher::run()
//!                                                   │
//!                                                   ▼
//!                                  session.lock().switch_owner(owner)
//! ```
//!
//! A watch channel only keeps the latest value, so a burst of changes
//! collapses to the last one. Repeats of the current owner are ignored by
//! the session, so a merge runs at most once per sign-in.

use shop_core::OwnerContext;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::session::{OwnerChange, ShopSession};

pub struct SessionWatcher {
    session: Arc<Mutex<ShopSession>>,
    owners: watch::Receiver<OwnerContext>,
}

impl SessionWatcher {
    pub fn new(session: Arc<Mutex<ShopSession>>, owners: watch::Receiver<OwnerContext>) -> Self {
        SessionWatcher { session, owners }
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Applies the current owner, then every change until the sender drops.
    pub async fn run(mut self) {
        info!("Session watcher started");

        let initial = self.owners.borrow_and_update().clone();
        self.apply(initial).await;

        while self.owners.changed().await.is_ok() {
            let owner = self.owners.borrow_and_update().clone();
            self.apply(owner).await;
        }

        info!("Session watcher stopped");
    }

    async fn apply(&self, owner: OwnerContext) {
        let mut session = self.session.lock().await;

        match session.switch_owner(owner.clone()).await {
            Ok(OwnerChange::Ignored) => {}
            Ok(change) => info!(owner = %owner, ?change, "Owner change applied"),
            Err(e) => {
                // Session stays on its previous owner; the next change retries
                error!(owner = %owner, error = %e, retryable = e.is_retryable(), "Owner change failed");
            }
        }
    }
}
