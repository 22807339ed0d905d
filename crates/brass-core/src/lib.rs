//! # Brass Core
//!
//! The host contract of the Brass bot framework.
//!
//! Adapters bind an external protocol client to the host. This crate declares
//! everything the two sides agree on:
//!
//! - **Entities**: canonical [`User`], [`Guild`], [`Channel`], [`GuildMember`]
//!   shapes every adapter maps its native records into
//! - **Lifecycle**: the [`Adapter`] trait and the [`AdapterContext`] it starts in
//! - **Bots**: the [`Bot`] query/action trait and the [`BotManager`] registry
//! - **Storage**: the key-value [`Database`] with memory and file backends
//! - **Console**: named [`DataService`]s with refresh notifications
//!
//! ```text
//! ┌────────────────┐  on_start   ┌─────────────┐  register  ┌────────────┐
//! │    Runtime     │────────────▶│   Adapter   │───────────▶│ BotManager │
//! └────────────────┘             └─────────────┘            └────────────┘
//!                                  │        │
//!                        Database ◀┘        └▶ Console
//! ```

pub mod adapter;
pub mod bot;
pub mod console;
pub mod database;
pub mod entity;
pub mod error;

pub use adapter::{Adapter, AdapterContext, BoxedAdapter, ConfigurableAdapter};
pub use bot::{Bot, BotManager, BoxedBot, downcast_bot};
pub use console::{Console, DataService};
pub use database::{Database, FileDatabase, MemoryDatabase, Record};
pub use entity::{Channel, ChannelType, Guild, GuildMember, List, User};
pub use error::{
    AdapterError, AdapterResult, ApiError, ApiResult, StoreError, StoreResult,
};
