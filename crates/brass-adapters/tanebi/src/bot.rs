//! [`Bot`] implementation over a logged-in protocol client.
//!
//! Brass identifies everything with strings; QQ uses numbers. Every call
//! parses its identifiers first and fails with [`ApiError::InvalidId`] before
//! touching the client. Client errors are passed through unchanged.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use brass_core::{ApiError, ApiResult, Bot, Channel, Guild, GuildMember, List, User};

use crate::client::ProtocolClient;
use crate::transform::{avatar_url, to_channel, to_guild, to_guild_member, to_user};

/// A QQ account exposed as a Brass bot.
pub struct TanebiBot<C> {
    id: String,
    client: Arc<C>,
}

impl<C: ProtocolClient> TanebiBot<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            id: client.uin().to_string(),
            client,
        }
    }

    /// Returns the underlying protocol client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

fn parse_id(kind: &'static str, id: &str) -> ApiResult<i64> {
    id.parse().map_err(|_| ApiError::invalid_id(kind, id))
}

/// Converts a mute length in milliseconds to whole seconds, rounding half up.
fn mute_duration_secs(duration_ms: u64) -> u32 {
    let secs = duration_ms.saturating_add(500) / 1000;
    u32::try_from(secs).unwrap_or(u32::MAX)
}

#[async_trait]
impl<C: ProtocolClient> Bot for TanebiBot<C> {
    fn id(&self) -> &str {
        &self.id
    }

    fn adapter_name(&self) -> &str {
        "tanebi"
    }

    async fn get_login(&self) -> ApiResult<User> {
        Ok(User {
            id: self.id.clone(),
            name: None,
            avatar: Some(avatar_url(self.client.uin())),
        })
    }

    async fn get_guild_list(&self) -> ApiResult<List<Guild>> {
        let groups = self.client.get_groups().await?;
        Ok(groups.iter().map(to_guild).collect())
    }

    async fn get_guild(&self, guild_id: &str) -> ApiResult<Guild> {
        let group = self.client.get_group(parse_id("guild", guild_id)?).await?;
        Ok(to_guild(&group))
    }

    async fn get_channel_list(&self, guild_id: &str) -> ApiResult<List<Channel>> {
        let group = self.client.get_group(parse_id("guild", guild_id)?).await?;
        Ok(List::complete(vec![to_channel(&group)]))
    }

    async fn get_channel(&self, channel_id: &str, guild_id: Option<&str>) -> ApiResult<Channel> {
        let uin = match guild_id {
            Some(guild_id) => parse_id("guild", guild_id)?,
            None => parse_id("channel", channel_id)?,
        };
        let group = self.client.get_group(uin).await?;
        Ok(to_channel(&group))
    }

    async fn get_friend_list(&self) -> ApiResult<List<User>> {
        let friends = self.client.get_friends().await?;
        Ok(friends.iter().map(to_user).collect())
    }

    async fn get_guild_member_list(&self, guild_id: &str) -> ApiResult<List<GuildMember>> {
        let members = self
            .client
            .get_group_members(parse_id("guild", guild_id)?)
            .await?;
        Ok(members.iter().map(to_guild_member).collect())
    }

    async fn get_guild_member(&self, guild_id: &str, user_id: &str) -> ApiResult<GuildMember> {
        let group_uin = parse_id("guild", guild_id)?;
        let member_uin = parse_id("user", user_id)?;
        let member = self.client.get_group_member(group_uin, member_uin).await?;
        Ok(to_guild_member(&member))
    }

    async fn kick_guild_member(
        &self,
        guild_id: &str,
        user_id: &str,
        permanent: bool,
    ) -> ApiResult<()> {
        let group_uin = parse_id("guild", guild_id)?;
        let member_uin = parse_id("user", user_id)?;
        self.client
            .kick_member(group_uin, member_uin, !permanent)
            .await?;
        Ok(())
    }

    async fn mute_guild_member(
        &self,
        guild_id: &str,
        user_id: &str,
        duration_ms: u64,
    ) -> ApiResult<()> {
        let group_uin = parse_id("guild", guild_id)?;
        let member_uin = parse_id("user", user_id)?;
        self.client
            .mute_member(group_uin, member_uin, mute_duration_secs(duration_ms))
            .await?;
        Ok(())
    }

    async fn send_message(&self, channel_id: &str, content: &str) -> ApiResult<String> {
        let seq = self
            .client
            .send_group_message(parse_id("channel", channel_id)?, content)
            .await?;
        Ok(seq.to_string())
    }

    async fn send_private_message(&self, user_id: &str, content: &str) -> ApiResult<String> {
        let seq = self
            .client
            .send_private_message(parse_id("user", user_id)?, content)
            .await?;
        Ok(seq.to_string())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
