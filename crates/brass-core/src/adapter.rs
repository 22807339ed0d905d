//! Adapter trait and adapter context.
//!
//! This module defines the adapter interface that binds a protocol client
//! library to the Brass host.
//!
//! # Host Services
//!
//! Adapters receive an [`AdapterContext`] when they start. It hands out the
//! host services an adapter may need:
//!
//! ```rust,ignore
//! impl Adapter for MyAdapter {
//!     async fn on_start(&self, ctx: &mut AdapterContext) -> AdapterResult<()> {
//!         // Persist credentials
//!         ctx.database().extend("my.session").await?;
//!
//!         // Publish a value to the console
//!         ctx.console().add_service("my.status", Arc::new(StatusService));
//!
//!         // Bring a bot online
//!         ctx.bot_manager().register(Self::name(), Arc::new(bot)).await?;
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::bot::BotManager;
use crate::console::Console;
use crate::database::Database;
use crate::error::AdapterResult;

/// Context provided to adapters during startup and shutdown.
///
/// Provides access to:
/// - Key-value database for persistent adapter state
/// - Console for publishing displayable values
/// - Bot manager for tracking active bots
pub struct AdapterContext {
    /// Persistent key-value storage.
    database: Arc<dyn Database>,
    /// Console data services.
    console: Arc<Console>,
    /// Bot manager shared by all adapters.
    bot_manager: Arc<BotManager>,
}

impl AdapterContext {
    /// Creates a new adapter context.
    pub fn new(
        database: Arc<dyn Database>,
        console: Arc<Console>,
        bot_manager: Arc<BotManager>,
    ) -> Self {
        Self {
            database,
            console,
            bot_manager,
        }
    }

    /// Returns a reference to the database.
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    /// Returns a reference to the console.
    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    /// Returns a reference to the bot manager.
    pub fn bot_manager(&self) -> &Arc<BotManager> {
        &self.bot_manager
    }
}

/// The core adapter trait.
///
/// Adapters bridge protocol-specific client libraries with the Brass host.
/// They are responsible for:
///
/// - Logging the client in (and persisting whatever it needs to log in again)
/// - Registering a [`Bot`](crate::Bot) for each account they bring online
/// - Tearing the client down on shutdown
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Returns the adapter name (e.g., "tanebi").
    ///
    /// This name is used to:
    /// - Identify the adapter in logs
    /// - Locate the adapter's configuration in `brass.toml` (via `ConfigurableAdapter`)
    ///
    /// ```toml
    /// [adapters.tanebi]  # <- returned by Adapter::name()
    /// uin = 10001
    /// ```
    fn name() -> &'static str
    where
        Self: Sized;

    /// Called when the adapter should start.
    ///
    /// An error here means the adapter failed to start; the host logs it and
    /// still calls [`on_shutdown`](Adapter::on_shutdown) when it stops.
    async fn on_start(&self, ctx: &mut AdapterContext) -> AdapterResult<()>;

    /// Called when the adapter is shutting down.
    ///
    /// Must tolerate a previous [`on_start`](Adapter::on_start) having failed
    /// part-way, and being called more than once.
    async fn on_shutdown(&self, _ctx: &mut AdapterContext) -> AdapterResult<()> {
        Ok(())
    }
}

/// A boxed adapter trait object.
pub type BoxedAdapter = Arc<dyn Adapter>;

/// Trait for adapters that can be created from configuration.
///
/// This is a separate trait to avoid the associated type problem with trait objects.
/// Adapters implement both `Adapter` and `ConfigurableAdapter`.
pub trait ConfigurableAdapter: Adapter {
    /// The configuration type for this adapter.
    type Config: serde::de::DeserializeOwned + Default;

    /// Creates an adapter from its configuration.
    ///
    /// The runtime extracts the config from `brass.toml` and calls this method.
    fn from_config(config: Self::Config) -> AdapterResult<Arc<Self>>
    where
        Self: Sized;
}
