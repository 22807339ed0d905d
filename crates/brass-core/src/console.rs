//! Console data services.
//!
//! A presentation layer (web console, TUI) shows named values that adapters
//! publish. Adapters register a [`DataService`] under a name and call
//! [`Console::refresh`] whenever the value changes; subscribers then re-read
//! it with [`Console::get`].
//!
//! ```rust,ignore
//! console.add_service("tanebi.qrcode", Arc::new(QrCodeService::new(cell)));
//!
//! let mut updates = console.subscribe();
//! while let Ok(name) = updates.recv().await {
//!     render(&name, console.get(&name).await);
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

/// A value the console can display.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Returns the current value; `Value::Null` means "nothing to show".
    async fn get(&self) -> Value;
}

/// Registry of data services plus a change feed.
pub struct Console {
    services: RwLock<HashMap<String, Arc<dyn DataService>>>,
    updates: broadcast::Sender<String>,
}

impl Console {
    /// Creates an empty console.
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            services: RwLock::new(HashMap::new()),
            updates,
        }
    }

    /// Registers a data service, replacing any previous one with the same name.
    pub fn add_service(&self, name: impl Into<String>, service: Arc<dyn DataService>) {
        self.services.write().insert(name.into(), service);
    }

    /// Removes a data service.
    pub fn remove_service(&self, name: &str) -> bool {
        self.services.write().remove(name).is_some()
    }

    /// Returns whether a data service is registered under `name`.
    pub fn has_service(&self, name: &str) -> bool {
        self.services.read().contains_key(name)
    }

    /// Reads the current value of a data service.
    pub async fn get(&self, name: &str) -> Option<Value> {
        let service = self.services.read().get(name).cloned()?;
        Some(service.get().await)
    }

    /// Tells subscribers that `name` changed.
    pub fn refresh(&self, name: &str) {
        // Nobody listening is fine.
        let receivers = self.updates.send(name.to_string()).unwrap_or(0);
        trace!(service = %name, receivers, "Console refresh");
    }

    /// Subscribes to refresh notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.updates.subscribe()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
