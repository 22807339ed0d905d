//! Bot trait and bot registry.
//!
//! A [`Bot`] is a live account an adapter has logged in. It answers entity
//! queries (guilds, channels, friends, members) in the host's canonical
//! shapes and carries out moderation actions.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::entity::{Channel, Guild, GuildMember, List, User};
use crate::error::{AdapterError, AdapterResult, ApiResult};

/// The core Bot trait.
///
/// Identifiers cross this boundary as strings; each adapter parses them into
/// whatever its protocol uses. Durations follow the host convention of
/// milliseconds.
///
/// Concrete implementations (e.g., `TanebiBot`) may offer protocol-specific
/// methods on top; reach them with [`downcast_bot`].
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns the bot's unique identifier.
    fn id(&self) -> &str;

    /// Returns the adapter name this bot uses.
    fn adapter_name(&self) -> &str;

    /// Returns the bot's own account.
    async fn get_login(&self) -> ApiResult<User>;

    /// Lists all guilds the bot is in.
    async fn get_guild_list(&self) -> ApiResult<List<Guild>>;

    /// Looks up a single guild.
    async fn get_guild(&self, guild_id: &str) -> ApiResult<Guild>;

    /// Lists the channels of a guild.
    async fn get_channel_list(&self, guild_id: &str) -> ApiResult<List<Channel>>;

    /// Looks up a single channel.
    async fn get_channel(&self, channel_id: &str, guild_id: Option<&str>) -> ApiResult<Channel>;

    /// Lists the bot's friends.
    async fn get_friend_list(&self) -> ApiResult<List<User>>;

    /// Lists the members of a guild.
    async fn get_guild_member_list(&self, guild_id: &str) -> ApiResult<List<GuildMember>>;

    /// Looks up a single guild member.
    async fn get_guild_member(&self, guild_id: &str, user_id: &str) -> ApiResult<GuildMember>;

    /// Removes a member from a guild.
    ///
    /// A `permanent` kick keeps the user from rejoining.
    async fn kick_guild_member(
        &self,
        guild_id: &str,
        user_id: &str,
        permanent: bool,
    ) -> ApiResult<()>;

    /// Mutes a member for `duration_ms` milliseconds (0 lifts the mute).
    async fn mute_guild_member(
        &self,
        guild_id: &str,
        user_id: &str,
        duration_ms: u64,
    ) -> ApiResult<()>;

    /// Sends a plain text message to a channel, returning the message ID.
    async fn send_message(&self, channel_id: &str, content: &str) -> ApiResult<String>;

    /// Sends a plain text message to a user, returning the message ID.
    async fn send_private_message(&self, user_id: &str, content: &str) -> ApiResult<String>;

    /// Returns self as an `Arc<dyn Any>` for safe downcasting.
    ///
    /// Implementors should simply return `self`.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A boxed Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;

/// Attempts to downcast a BoxedBot to a specific concrete type.
///
/// ```rust,ignore
/// if let Some(tanebi) = downcast_bot::<TanebiBot<MyClient>>(bot) {
///     tanebi.client().fast_login().await?;
/// }
/// ```
pub fn downcast_bot<T: Bot + 'static>(bot: BoxedBot) -> Option<Arc<T>> {
    Arc::downcast::<T>(bot.as_any()).ok()
}

/// Entry for a managed bot.
struct BotEntry {
    /// Adapter name that owns this bot.
    adapter: String,
    /// Bot instance.
    bot: BoxedBot,
}

/// Tracks the bots that adapters have brought online.
#[derive(Default)]
pub struct BotManager {
    bots: RwLock<HashMap<String, BotEntry>>,
}

impl BotManager {
    /// Creates an empty bot manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bot under its ID.
    pub async fn register(&self, adapter: impl Into<String>, bot: BoxedBot) -> AdapterResult<()> {
        let id = bot.id().to_string();
        let mut bots = self.bots.write().await;
        if bots.contains_key(&id) {
            return Err(AdapterError::BotExists { id });
        }
        let adapter = adapter.into();
        debug!(bot_id = %id, adapter = %adapter, "Bot registered");
        bots.insert(id, BotEntry { adapter, bot });
        Ok(())
    }

    /// Removes a bot, returning it if it was registered.
    pub async fn unregister(&self, id: &str) -> Option<BoxedBot> {
        let entry = self.bots.write().await.remove(id)?;
        debug!(bot_id = %id, adapter = %entry.adapter, "Bot unregistered");
        Some(entry.bot)
    }

    /// Gets a bot by ID.
    pub async fn get_bot(&self, id: &str) -> Option<BoxedBot> {
        self.bots.read().await.get(id).map(|e| Arc::clone(&e.bot))
    }

    /// Returns the IDs of all bots owned by an adapter.
    pub async fn bots_of(&self, adapter: &str) -> Vec<String> {
        self.bots
            .read()
            .await
            .iter()
            .filter(|(_, e)| e.adapter == adapter)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Returns the number of registered bots.
    pub async fn len(&self) -> usize {
        self.bots.read().await.len()
    }

    /// Returns whether no bot is registered.
    pub async fn is_empty(&self) -> bool {
        self.bots.read().await.is_empty()
    }
}
