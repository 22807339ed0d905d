//! Brass Runtime - host for Brass adapters.
//!
//! This crate provides:
//! - Configuration loading (`brass.toml`, `BRASS_*` environment variables)
//! - Logging setup over `tracing-subscriber`
//! - Adapter lifecycle (`BrassRuntime`): start, shutdown on Ctrl+C or SIGTERM
//! - The host services adapters receive: a file-backed database, the console
//!   and the bot manager
//!
//! ```ignore
//! use brass_runtime::BrassRuntime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = BrassRuntime::new();
//!
//!     // Configured from `[adapters.tanebi]`
//!     runtime.register_adapter::<TanebiAdapter<MyClient>>().await?;
//!
//!     // Run until Ctrl+C
//!     runtime.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{BrassConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{BrassRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
