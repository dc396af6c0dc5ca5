//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::config::StorefrontConfig;
use crate::session::CartSession;
use crate::storage::FileStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The cart session sits behind
/// an async mutex: each handler holds the lock for one complete interaction,
/// so interactions are applied one at a time.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    session: Mutex<CartSession<FileStorage>>,
}

impl AppState {
    /// Create a new application state, loading the cart from the configured slot.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storage = FileStorage::new(&config.cart.data_dir, config.cart.slot.clone());
        tracing::info!(path = %storage.path().display(), "Using cart slot");
        let session = CartSession::open(storage, &config.cart, config.payment.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                session: Mutex::new(session),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Lock the cart session for one interaction.
    pub async fn session(&self) -> MutexGuard<'_, CartSession<FileStorage>> {
        self.inner.session.lock().await
    }

    /// Whether checkout can reach the payment gateway.
    #[must_use]
    pub fn gateway_available(&self) -> bool {
        self.inner.config.payment.key_id.is_some()
    }
}
