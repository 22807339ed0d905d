//! Forwards the protocol client's log records and events to `tracing`.
//!
//! Library records keep their severity and are prefixed with the emitting
//! module. Events become one human-readable line each:
//!
//! | Event | Line |
//! |-------|------|
//! | private message | `-> [Alice (20002)] hello` |
//! | group message | `<- [Test (123)] [Bobby (42)] hi` |
//! | notice / request | `[group-mute] [Test (123)] Bobby (42) was muted by ...` |
//!
//! Messages and other events can be switched off independently through
//! [`LoggingToggles`].

use std::sync::atomic::{AtomicI64, Ordering};

use tracing::{debug, info, warn};

use crate::client::{ClientEvent, ClientListener, Friend, Group, GroupMember, LogLevel};
use crate::config::LoggingToggles;

const DEFAULT_POKE_ACTION: &str = "戳了戳";

/// Whether a line is a chat message or any other event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    Message,
    Event,
}

/// A formatted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLine {
    pub category: EventCategory,
    /// Short event name, e.g. `group-mute`.
    pub kind: &'static str,
    /// Group the event happened in.
    pub group: Option<i64>,
    pub text: String,
}

/// [`ClientListener`] that writes to the log.
pub struct EventLogger {
    toggles: LoggingToggles,
    self_uin: AtomicI64,
}

impl EventLogger {
    pub fn new(toggles: LoggingToggles) -> Self {
        Self {
            toggles,
            self_uin: AtomicI64::new(0),
        }
    }

    /// Sets the account used to tell outgoing group messages apart.
    pub fn set_self_uin(&self, uin: i64) {
        self.self_uin.store(uin, Ordering::Relaxed);
    }

    pub fn self_uin(&self) -> i64 {
        self.self_uin.load(Ordering::Relaxed)
    }

    fn enabled(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::Message => self.toggles.message,
            EventCategory::Event => self.toggles.event,
        }
    }
}

impl ClientListener for EventLogger {
    fn on_log(&self, level: LogLevel, module: &str, message: &str) {
        match level {
            LogLevel::Debug => debug!(target: "tanebi", "[{module}] {message}"),
            LogLevel::Info => info!(target: "tanebi", "[{module}] {message}"),
            LogLevel::Warning => warn!(target: "tanebi", "[{module}] {message}"),
        }
    }

    fn on_event(&self, event: &ClientEvent) {
        if !self.enabled(category_of(event)) {
            return;
        }
        let line = describe(event, self.self_uin());
        info!(target: "tanebi", kind = line.kind, group = line.group, "{}", line.text);
    }
}

fn friend(f: &Friend) -> String {
    format!("{} ({})", f.display_name(), f.uin)
}

fn group(g: &Group) -> String {
    format!("[{} ({})]", g.name, g.uin)
}

fn member(m: &GroupMember) -> String {
    format!("{} ({})", m.display_name(), m.uin)
}

fn poke_action(action: &str) -> &str {
    if action.is_empty() {
        DEFAULT_POKE_ACTION
    } else {
        action
    }
}

fn direction(outgoing: bool) -> &'static str {
    if outgoing { "->" } else { "<-" }
}

/// Tells chat messages from the other events without formatting anything.
pub fn category_of(event: &ClientEvent) -> EventCategory {
    match event {
        ClientEvent::PrivateMessage { .. } | ClientEvent::GroupMessage { .. } => {
            EventCategory::Message
        }
        _ => EventCategory::Event,
    }
}

/// Formats an event. `self_uin` is the bot's own account.
pub fn describe(event: &ClientEvent, self_uin: i64) -> EventLine {
    use ClientEvent::*;

    let (kind, text) = match event {
        PrivateMessage {
            friend: f,
            is_self,
            preview,
        } => (
            "private-message",
            format!("{} [{}] {preview}", direction(*is_self), friend(f)),
        ),
        GroupMessage {
            group: g,
            sender,
            preview,
        } => (
            "group-message",
            format!(
                "{} {} [{}] {preview}",
                direction(sender.uin == self_uin),
                group(g),
                member(sender)
            ),
        ),
        FriendPoke {
            friend: f,
            is_self,
            action,
            suffix,
        } => {
            let action = poke_action(action);
            let text = if *is_self {
                format!("你{action}{} {suffix}", friend(f))
            } else {
                format!("{} {action}你{suffix}", friend(f))
            };
            ("friend-poke", text)
        }
        FriendRecall { friend: f, tip } => (
            "friend-recall",
            format!("[{}] {tip}", friend(f)),
        ),
        FriendRequest {
            from_uin,
            message,
            via,
        } => (
            "friend-request",
            format!("({from_uin}) with message {message} via {via}"),
        ),
        GroupAdminChange {
            group: g,
            member: m,
            is_promote,
        } => (
            "group-admin-change",
            format!(
                "{} {} {}",
                group(g),
                member(m),
                if *is_promote { "promoted" } else { "demoted" }
            ),
        ),
        GroupEssenceMessageChange {
            group: g,
            sequence,
            operator,
            is_add,
        } => (
            "group-essence-message-change",
            format!(
                "{} [sequence={sequence}] {} {}",
                group(g),
                if *is_add {
                    "added to essence by"
                } else {
                    "removed from essence by"
                },
                member(operator)
            ),
        ),
        GroupInvitationRequest { invitor, group_uin } => (
            "group-invitation-request",
            format!("[{}] invited you to join group {group_uin}", friend(invitor)),
        ),
        GroupInvitedJoinRequest {
            group: g,
            invitor,
            target_uin,
        } => (
            "group-invited-join-request",
            format!("{} {} invited ({target_uin}) to join", group(g), member(invitor)),
        ),
        GroupJoinRequest {
            group: g,
            request_uin,
            comment,
        } => (
            "group-join-request",
            format!("{} ({request_uin}) applied to join with comment {comment}", group(g)),
        ),
        GroupMemberIncrease {
            group: g,
            member: m,
            operator,
        } => (
            "group-member-increase",
            format!(
                "{} {} joined [handled by {}]",
                group(g),
                member(m),
                member(operator)
            ),
        ),
        GroupMemberLeave { group: g, member_uin } => (
            "group-member-decrease",
            format!("{} ({member_uin}) left", group(g)),
        ),
        GroupMemberKick {
            group: g,
            member_uin,
            operator,
        } => (
            "group-member-kick",
            format!("{} ({member_uin}) was kicked by {}", group(g), member(operator)),
        ),
        GroupMute {
            group: g,
            member: m,
            operator,
            duration,
        } => (
            "group-mute",
            format!(
                "{} {} was muted by {} for {duration} seconds",
                group(g),
                member(m),
                member(operator)
            ),
        ),
        GroupUnmute {
            group: g,
            member: m,
            operator,
        } => (
            "group-unmute",
            format!("{} {} was unmuted by {}", group(g), member(m), member(operator)),
        ),
        GroupMuteAll {
            group: g,
            operator,
            is_set,
        } => (
            "group-mute-all",
            format!(
                "{} {} {}",
                group(g),
                if *is_set { "was muted by" } else { "was unmuted by" },
                member(operator)
            ),
        ),
        GroupReaction {
            group: g,
            operator,
            code,
            face,
            is_add,
            ..
        } => (
            "group-reaction",
            format!(
                "{} {} {} {} ({code})",
                group(g),
                member(operator),
                if *is_add {
                    "added reaction"
                } else {
                    "removed reaction"
                },
                face.as_deref().unwrap_or_default()
            ),
        ),
        GroupRecall {
            group: g,
            tip,
            operator,
            ..
        } => (
            "group-recall",
            format!("{} {} {tip}", group(g), member(operator)),
        ),
        GroupPoke {
            group: g,
            sender,
            receiver,
            action,
            suffix,
        } => (
            "group-poke",
            format!(
                "{} {} {}{} {suffix}",
                group(g),
                member(sender),
                poke_action(action),
                member(receiver)
            ),
        ),
    };

    EventLine {
        category: category_of(event),
        kind,
        group: group_of(event),
        text: text.trim_end().to_string(),
    }
}

fn group_of(event: &ClientEvent) -> Option<i64> {
    use ClientEvent::*;

    match event {
        PrivateMessage { .. }
        | FriendPoke { .. }
        | FriendRecall { .. }
        | FriendRequest { .. } => None,
        GroupInvitationRequest { group_uin, .. } => Some(*group_uin),
        GroupMessage { group, .. }
        | GroupAdminChange { group, .. }
        | GroupEssenceMessageChange { group, .. }
        | GroupInvitedJoinRequest { group, .. }
        | GroupJoinRequest { group, .. }
        | GroupMemberIncrease { group, .. }
        | GroupMemberLeave { group, .. }
        | GroupMemberKick { group, .. }
        | GroupMute { group, .. }
        | GroupUnmute { group, .. }
        | GroupMuteAll { group, .. }
        | GroupReaction { group, .. }
        | GroupRecall { group, .. }
        | GroupPoke { group, .. } => Some(group.uin),
    }
}
