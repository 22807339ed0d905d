//! # Brass Adapter for QQ (tanebi)
//!
//! This crate binds a tanebi-style QQ protocol client to the Brass host.
//!
//! ## Overview
//!
//! The adapter does not speak the QQ protocol itself. It:
//!
//! - Fetches application metadata from a signing service
//! - Restores the account's device identity and keystore from the database,
//!   or logs in by QR code on first use and stores them
//! - Shows the login QR code on the console while a scan is pending
//! - Logs library records, messages and events through `tracing`
//! - Exposes the account as a [`brass_core::Bot`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brass_runtime::BrassRuntime;
//! use brass_adapter_tanebi::TanebiAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = BrassRuntime::new();
//!     runtime.register_adapter::<TanebiAdapter<MyClient>>().await?;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Entity Mapping
//!
//! | QQ | Brass |
//! |----|-------|
//! | group | guild, and its single text channel |
//! | friend | user |
//! | group member | guild member (roles `owner`/`admin`) |

pub mod adapter;
pub mod bootstrap;
pub mod bot;
pub mod client;
pub mod config;
pub mod credentials;
pub mod logger;
pub mod qrcode;
pub mod sign;
pub mod transform;

#[cfg(test)]
mod testing;

pub use adapter::TanebiAdapter;
pub use bot::TanebiBot;
pub use client::{
    AppInfo, ClientError, ClientEvent, ClientListener, ClientResult, Friend, Group, GroupMember,
    GroupMemberPermission, LogLevel, ProtocolClient, QrCodeCallback, SignProvider, SignResult,
};
pub use config::{DEFAULT_SIGN_API_URL, LoggingToggles, TanebiConfig};
pub use credentials::{DEVICE_INFO_TABLE, KEYSTORE_TABLE};
pub use logger::EventLogger;
pub use qrcode::{QR_CODE_SERVICE, QrCodeCell, QrCodeService};
pub use sign::{SignService, UrlSignService};
