//! Events and log records emitted by the protocol client.

use super::model::{Friend, Group, GroupMember};

/// Severity of a log record from the protocol client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Packet-level chatter.
    Debug,
    /// Normal progress.
    Info,
    /// Something went wrong but the client carries on.
    Warning,
}

/// An event pushed by the protocol client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A private message was received or sent.
    PrivateMessage {
        /// The other side of the conversation.
        friend: Friend,
        /// Whether the bot sent it.
        is_self: bool,
        /// Plain-text preview of the content.
        preview: String,
    },

    /// A group message was received or sent.
    GroupMessage {
        /// The group.
        group: Group,
        /// Who sent it.
        sender: GroupMember,
        /// Plain-text preview of the content.
        preview: String,
    },

    /// A friend poked the bot, or the bot poked a friend.
    FriendPoke {
        /// The friend.
        friend: Friend,
        /// Whether the bot is the one poking.
        is_self: bool,
        /// Custom action text (empty for the default).
        action: String,
        /// Text appended after the action.
        suffix: String,
    },

    /// A friend recalled a private message.
    FriendRecall {
        /// The friend.
        friend: Friend,
        /// Server-provided tip text.
        tip: String,
    },

    /// Someone asked to become the bot's friend.
    FriendRequest {
        /// Who is asking.
        from_uin: i64,
        /// Their message.
        message: String,
        /// Where they found the bot.
        via: String,
    },

    /// A member was promoted to or demoted from admin.
    GroupAdminChange {
        /// The group.
        group: Group,
        /// The member.
        member: GroupMember,
        /// `true` for promotion.
        is_promote: bool,
    },

    /// A message was added to or removed from the group's essence list.
    GroupEssenceMessageChange {
        /// The group.
        group: Group,
        /// Sequence number of the message.
        sequence: u32,
        /// Who changed it.
        operator: GroupMember,
        /// `true` when added.
        is_add: bool,
    },

    /// A friend invited the bot into a group.
    GroupInvitationRequest {
        /// The inviting friend.
        invitor: Friend,
        /// The group number.
        group_uin: i64,
    },

    /// A member invited someone else into a group the bot manages.
    GroupInvitedJoinRequest {
        /// The group.
        group: Group,
        /// The inviting member.
        invitor: GroupMember,
        /// The invited account.
        target_uin: i64,
    },

    /// Someone applied to join a group the bot manages.
    GroupJoinRequest {
        /// The group.
        group: Group,
        /// The applicant.
        request_uin: i64,
        /// The applicant's comment.
        comment: String,
    },

    /// A member joined a group.
    GroupMemberIncrease {
        /// The group.
        group: Group,
        /// The new member.
        member: GroupMember,
        /// Who approved the join.
        operator: GroupMember,
    },

    /// A member left a group on their own.
    GroupMemberLeave {
        /// The group.
        group: Group,
        /// The member who left.
        member_uin: i64,
    },

    /// A member was kicked from a group.
    GroupMemberKick {
        /// The group.
        group: Group,
        /// The kicked member.
        member_uin: i64,
        /// Who kicked them.
        operator: GroupMember,
    },

    /// A member was muted.
    GroupMute {
        /// The group.
        group: Group,
        /// The muted member.
        member: GroupMember,
        /// Who muted them.
        operator: GroupMember,
        /// Mute length in seconds.
        duration: u32,
    },

    /// A member's mute was lifted.
    GroupUnmute {
        /// The group.
        group: Group,
        /// The member.
        member: GroupMember,
        /// Who lifted it.
        operator: GroupMember,
    },

    /// The whole group was muted or unmuted.
    GroupMuteAll {
        /// The group.
        group: Group,
        /// Who toggled it.
        operator: GroupMember,
        /// `true` when muted.
        is_set: bool,
    },

    /// A reaction was added to or removed from a group message.
    GroupReaction {
        /// The group.
        group: Group,
        /// Sequence number of the message.
        sequence: u32,
        /// Who reacted.
        operator: GroupMember,
        /// Face code.
        code: String,
        /// Human-readable face description, when the client knows it.
        face: Option<String>,
        /// `true` when added.
        is_add: bool,
    },

    /// A group message was recalled.
    GroupRecall {
        /// The group.
        group: Group,
        /// Sequence number of the message.
        sequence: u32,
        /// Server-provided tip text.
        tip: String,
        /// Who recalled it.
        operator: GroupMember,
    },

    /// A member poked another member.
    GroupPoke {
        /// The group.
        group: Group,
        /// Who poked.
        sender: GroupMember,
        /// Who was poked.
        receiver: GroupMember,
        /// Custom action text (empty for the default).
        action: String,
        /// Text appended after the action.
        suffix: String,
    },
}
