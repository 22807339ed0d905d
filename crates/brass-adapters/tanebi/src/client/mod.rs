//! Contract of the tanebi protocol client.
//!
//! The adapter never speaks the QQ protocol itself. Everything below the
//! [`ProtocolClient`] trait (packet codec, session handshake, login state
//! machine) belongs to the client library; the adapter only creates the
//! client, logs it in, listens to it and forwards queries.
//!
//! # Lifecycle
//!
//! ```text
//! create(app_info, device, keystore, signer)
//!     │
//!     ├── add_listener(..)              log records + events
//!     │
//!     ├── qr_code_login(on_qr_code)     first use
//!     │   └── device_info() / keystore()  → persisted
//!     └── fast_login()                  credentials already stored
//!     │
//!     ⋮   queries and actions
//!     │
//! dispose()
//! ```

pub mod event;
pub mod model;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use brass_core::ApiError;

pub use event::{ClientEvent, LogLevel};
pub use model::{AppInfo, Friend, Group, GroupMember, GroupMemberPermission, SignResult};

/// Errors reported by the protocol client or the signing service.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The signing service failed.
    #[error("sign request failed: {0}")]
    Sign(String),

    /// Login was rejected, timed out or was abandoned.
    #[error("login failed: {0}")]
    Login(String),

    /// The group does not exist or the bot is not in it.
    #[error("group {0} not found")]
    GroupNotFound(i64),

    /// The member is not in the group.
    #[error("member {member} not found in group {group}")]
    MemberNotFound {
        /// The group number.
        group: i64,
        /// The member's QQ number.
        member: i64,
    },

    /// The user is not a friend.
    #[error("friend {0} not found")]
    FriendNotFound(i64),

    /// The server refused an operation.
    #[error("operation failed: {0}")]
    Operation(String),

    /// The client was already torn down.
    #[error("client disposed")]
    Disposed,
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        ApiError::Client(Box::new(err))
    }
}

/// Result type for protocol client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Callback receiving the login QR code as `(url, png)`.
pub type QrCodeCallback = Box<dyn Fn(&str, &[u8]) + Send + Sync>;

/// Signs outgoing packets on behalf of the protocol client.
#[async_trait]
pub trait SignProvider: Send + Sync {
    /// Signs one packet.
    async fn sign(&self, cmd: &str, seq: u32, src: &[u8]) -> ClientResult<SignResult>;
}

/// Receives log records and events from the protocol client.
///
/// Both methods run on the client's own task and must not block.
pub trait ClientListener: Send + Sync {
    /// Called for every log record.
    fn on_log(&self, _level: LogLevel, _module: &str, _message: &str) {}

    /// Called for every event.
    fn on_event(&self, _event: &ClientEvent) {}
}

/// A live protocol client.
///
/// `DeviceInfo` and `Keystore` are opaque to the adapter: it only creates
/// fresh ones, serializes them for storage, and hands stored ones back.
#[async_trait]
pub trait ProtocolClient: Send + Sync + Sized + 'static {
    /// Identity of this client instance.
    type DeviceInfo: Serialize + DeserializeOwned + Send + Sync;

    /// Session secrets.
    type Keystore: Serialize + DeserializeOwned + Send + Sync;

    /// Creates a device identity for a new account.
    fn new_device_info() -> Self::DeviceInfo;

    /// Creates an empty keystore for a new account.
    fn new_keystore() -> Self::Keystore;

    /// Creates a client. Does not log in.
    async fn create(
        app_info: AppInfo,
        device_info: Self::DeviceInfo,
        keystore: Self::Keystore,
        signer: Arc<dyn SignProvider>,
    ) -> ClientResult<Self>;

    /// Returns the logged-in account number.
    fn uin(&self) -> i64;

    /// Returns the current device identity.
    fn device_info(&self) -> Self::DeviceInfo;

    /// Returns the current keystore.
    fn keystore(&self) -> Self::Keystore;

    /// Registers a listener for log records and events.
    fn add_listener(&self, listener: Arc<dyn ClientListener>);

    /// Logs in by QR code, calling `on_qr_code` each time a code is issued.
    ///
    /// Resolves once the code is scanned and confirmed, or fails.
    async fn qr_code_login(&self, on_qr_code: QrCodeCallback) -> ClientResult<()>;

    /// Logs in with the stored keystore.
    async fn fast_login(&self) -> ClientResult<()>;

    /// Lists groups.
    async fn get_groups(&self) -> ClientResult<Vec<Group>>;

    /// Looks up a group.
    async fn get_group(&self, group_uin: i64) -> ClientResult<Group>;

    /// Lists friends.
    async fn get_friends(&self) -> ClientResult<Vec<Friend>>;

    /// Lists the members of a group.
    async fn get_group_members(&self, group_uin: i64) -> ClientResult<Vec<GroupMember>>;

    /// Looks up a group member.
    async fn get_group_member(&self, group_uin: i64, member_uin: i64)
    -> ClientResult<GroupMember>;

    /// Kicks a member; `allow_rejoin` controls whether they may apply again.
    async fn kick_member(
        &self,
        group_uin: i64,
        member_uin: i64,
        allow_rejoin: bool,
    ) -> ClientResult<()>;

    /// Mutes a member for `duration` seconds (0 unmutes).
    async fn mute_member(&self, group_uin: i64, member_uin: i64, duration: u32)
    -> ClientResult<()>;

    /// Sends a text message to a group, returning its sequence number.
    async fn send_group_message(&self, group_uin: i64, text: &str) -> ClientResult<u32>;

    /// Sends a text message to a friend, returning its sequence number.
    async fn send_private_message(&self, friend_uin: i64, text: &str) -> ClientResult<u32>;

    /// Logs out and releases the connection.
    async fn dispose(&self) -> ClientResult<()>;
}
