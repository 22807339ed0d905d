//! Main runtime orchestration.
//!
//! The runtime owns the host services (database, console, bot manager),
//! starts every registered adapter with an [`AdapterContext`] over them, and
//! shuts the adapters down again on Ctrl+C or SIGTERM.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use brass_runtime::BrassRuntime;
//!
//! // Simplest way - auto-loads config from current directory
//! let runtime = BrassRuntime::new();
//!
//! // Custom configuration path
//! let runtime = BrassRuntime::builder()
//!     .config_file("config/brass.toml")
//!     .build()?;
//!
//! runtime.register_adapter::<TanebiAdapter<MyClient>>().await?;
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use brass_core::{
    AdapterContext, BotManager, BoxedAdapter, ConfigurableAdapter, Console, Database,
    FileDatabase,
};
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::{BrassConfig, ConfigLoader, ConfigResult};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The main Brass runtime that hosts adapters.
pub struct BrassRuntime {
    /// The configuration.
    config: BrassConfig,
    /// Adapters in registration order.
    adapters: RwLock<Vec<(String, BoxedAdapter)>>,
    /// Persistent storage handed to adapters.
    database: Arc<dyn Database>,
    /// Console data services.
    console: Arc<Console>,
    /// Bots brought online by adapters.
    bot_manager: Arc<BotManager>,
    /// Whether the runtime is running.
    running: RwLock<bool>,
}

impl BrassRuntime {
    /// Creates a new runtime with automatic configuration loading.
    ///
    /// Searches the working directory and the user config directory,
    /// falling back to defaults if loading fails.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                BrassConfig::default()
            });

        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a new runtime from configuration.
    ///
    /// Initializes logging and opens a [`FileDatabase`] under
    /// `storage.data_dir`.
    pub fn from_config(config: &BrassConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            data_dir = %config.storage.data_dir.display(),
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            adapters: RwLock::new(Vec::new()),
            database: Arc::new(FileDatabase::new(config.storage.data_dir.clone())),
            console: Arc::new(Console::new()),
            bot_manager: Arc::new(BotManager::new()),
            running: RwLock::new(false),
        }
    }

    /// Replaces the database handed to adapters.
    pub fn with_database(mut self, database: Arc<dyn Database>) -> Self {
        self.database = database;
        self
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &BrassConfig {
        &self.config
    }

    /// Returns the console shared with adapters.
    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    /// Returns the bot manager shared with adapters.
    pub fn bot_manager(&self) -> &Arc<BotManager> {
        &self.bot_manager
    }

    /// Returns the database shared with adapters.
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    /// Returns whether the runtime is currently running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Returns the number of registered adapters.
    pub async fn adapter_count(&self) -> usize {
        self.adapters.read().await.len()
    }

    // =========================================================================
    // Adapter Management
    // =========================================================================

    /// Registers an adapter configured from `adapters.<name>`.
    ///
    /// This will:
    /// 1. Look for configuration under `adapters.<A::name()>`
    /// 2. If found, deserialize it into `A::Config`
    /// 3. If not found, use `A::Config::default()`
    /// 4. Call `A::from_config(config)` and register the result
    pub async fn register_adapter<A>(&self) -> RuntimeResult<()>
    where
        A: ConfigurableAdapter + 'static,
    {
        let adapter_name = A::name();

        let config: A::Config = if let Some(config_value) = self.config.adapters.get(adapter_name) {
            config_value.deserialize().map_err(|e| {
                RuntimeError::AdapterConfigDeserialize(format!(
                    "Failed to deserialize config for adapter '{adapter_name}': {e}"
                ))
            })?
        } else {
            warn!(
                adapter = adapter_name,
                "No configuration found for adapter, using default"
            );
            Default::default()
        };

        let adapter = A::from_config(config)?;
        self.add_adapter(adapter_name, adapter).await
    }

    /// Registers an already constructed adapter under `name`.
    pub async fn add_adapter(
        &self,
        name: impl Into<String>,
        adapter: BoxedAdapter,
    ) -> RuntimeResult<()> {
        let name = name.into();
        let mut adapters = self.adapters.write().await;
        if adapters.iter().any(|(n, _)| *n == name) {
            return Err(RuntimeError::AdapterExists(name));
        }
        info!(adapter = %name, "Registered adapter");
        adapters.push((name, adapter));
        Ok(())
    }

    fn context(&self) -> AdapterContext {
        AdapterContext::new(
            Arc::clone(&self.database),
            Arc::clone(&self.console),
            Arc::clone(&self.bot_manager),
        )
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Starts every adapter.
    ///
    /// An adapter that fails to start is logged and skipped; the others
    /// still start.
    pub async fn start(&self) -> RuntimeResult<()> {
        {
            let mut running = self.running.write().await;
            if *running {
                warn!("Runtime is already running");
                return Ok(());
            }
            *running = true;
        }

        info!("Starting Brass runtime");

        let adapters = self.adapters.read().await;
        for (name, adapter) in adapters.iter() {
            let mut ctx = self.context();
            if let Err(e) = adapter.on_start(&mut ctx).await {
                error!(adapter = %name, error = %e, "Failed to start adapter");
                continue;
            }
            info!(adapter = %name, "Adapter started");
        }

        info!("Runtime started");
        Ok(())
    }

    /// Stops the runtime, shutting down every adapter in reverse order.
    ///
    /// Adapters that failed to start are shut down too.
    pub async fn stop(&self) -> RuntimeResult<()> {
        {
            let mut running = self.running.write().await;
            if !*running {
                warn!("Runtime is not running");
                return Ok(());
            }
            *running = false;
        }

        info!("Stopping Brass runtime");

        let adapters = self.adapters.read().await;
        for (name, adapter) in adapters.iter().rev() {
            let mut ctx = self.context();
            if let Err(e) = adapter.on_shutdown(&mut ctx).await {
                error!(adapter = %name, error = %e, "Error during adapter shutdown");
            }
        }

        info!("Runtime stopped");
        Ok(())
    }

    /// Runs the runtime until a shutdown signal is received.
    pub async fn run(&self) -> RuntimeResult<()> {
        info!("Brass runtime is starting. Press Ctrl+C to stop.");
        self.run_until(wait_for_shutdown()).await
    }

    /// Runs the runtime with a custom shutdown future.
    ///
    /// The shutdown future is watched while adapters are still starting, so
    /// a login that never completes can be interrupted. Adapters are always
    /// shut down before this returns.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let started = tokio::select! {
            biased;
            result = self.start() => Some(result),
            () = &mut shutdown => None,
        };

        match started {
            Some(Ok(())) => shutdown.await,
            Some(Err(e)) => {
                self.stop().await?;
                return Err(e);
            }
            None => warn!("Shutdown requested while adapters were starting"),
        }

        self.stop().await
    }
}

impl Default for BrassRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!("Failed to register SIGTERM handler: {e}"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!("Failed to listen for Ctrl+C: {e}"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `BrassRuntime` with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = BrassRuntime::builder()
///     .config_file("config/brass.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Replaces the built-in defaults.
    pub fn defaults(mut self, config: BrassConfig) -> Self {
        self.config_loader = self.config_loader.defaults(config);
        self
    }

    /// Overrides one dotted key, e.g. `"adapters.tanebi.uin"`.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<BrassRuntime> {
        let config = self.config_loader.load()?;
        Ok(BrassRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
