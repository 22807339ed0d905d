//! Projections from tanebi records to Brass entities.
//!
//! A QQ group is both the guild and its only text channel, so both
//! [`to_guild`] and [`to_channel`] take a [`Group`].

use brass_core::{Channel, ChannelType, Guild, GuildMember, User};

use crate::client::{Friend, Group, GroupMember, GroupMemberPermission};

/// Returns the avatar URL of a QQ account.
pub fn avatar_url(uin: i64) -> String {
    format!("https://q.qlogo.cn/headimg_dl?dst_uin={uin}&spec=640&img_type=jpg")
}

pub fn to_user(friend: &Friend) -> User {
    User {
        id: friend.uin.to_string(),
        name: Some(friend.nickname.clone()),
        avatar: Some(avatar_url(friend.uin)),
    }
}

pub fn to_guild(group: &Group) -> Guild {
    Guild {
        id: group.uin.to_string(),
        name: Some(group.name.clone()),
    }
}

pub fn to_channel(group: &Group) -> Channel {
    Channel {
        id: group.uin.to_string(),
        name: Some(group.name.clone()),
        kind: ChannelType::Text,
    }
}

pub fn to_guild_member(member: &GroupMember) -> GuildMember {
    let avatar = avatar_url(member.uin);
    GuildMember {
        user: Some(User {
            id: member.uin.to_string(),
            name: Some(member.nickname.clone()),
            avatar: Some(avatar.clone()),
        }),
        name: Some(member.card.clone()),
        nick: Some(member.nickname.clone()),
        avatar: Some(avatar),
        title: Some(member.special_title.clone()),
        roles: roles(member.permission),
    }
}

/// Owners also count as admins.
pub fn roles(permission: GroupMemberPermission) -> Vec<String> {
    match permission {
        GroupMemberPermission::Owner => vec!["owner".to_string(), "admin".to_string()],
        GroupMemberPermission::Admin => vec!["admin".to_string()],
        GroupMemberPermission::Member => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Group {
        Group {
            uin: 123,
            name: "Test".into(),
        }
    }

    #[test]
    fn test_group_to_guild_and_channel() {
        let guild = to_guild(&group());
        assert_eq!(
            guild,
            Guild {
                id: "123".into(),
                name: Some("Test".into()),
            }
        );

        let channel = to_channel(&group());
        assert_eq!(channel.id, "123");
        assert_eq!(channel.name.as_deref(), Some("Test"));
        assert_eq!(channel.kind, ChannelType::Text);

        // Pure: same input, same output.
        assert_eq!(to_guild(&group()), guild);
        assert_eq!(to_channel(&group()), channel);
    }

    #[test]
    fn test_friend_to_user() {
        let friend = Friend {
            uin: 10001,
            nickname: "Alice".into(),
            remark: "work".into(),
        };
        let user = to_user(&friend);
        assert_eq!(user.id, "10001");
        assert_eq!(user.name.as_deref(), Some("Alice"));
        assert_eq!(
            user.avatar.as_deref(),
            Some("https://q.qlogo.cn/headimg_dl?dst_uin=10001&spec=640&img_type=jpg")
        );
    }

    #[test]
    fn test_member_fields() {
        let member = GroupMember {
            uin: 42,
            nickname: "Bob".into(),
            card: "Bobby".into(),
            special_title: "Helper".into(),
            permission: GroupMemberPermission::Admin,
        };
        let gm = to_guild_member(&member);

        let user = gm.user.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.name.as_deref(), Some("Bob"));
        assert_eq!(gm.name.as_deref(), Some("Bobby"));
        assert_eq!(gm.nick.as_deref(), Some("Bob"));
        assert_eq!(gm.title.as_deref(), Some("Helper"));
        assert_eq!(gm.avatar, user.avatar);
        assert_eq!(gm.roles, vec!["admin"]);
    }

    #[test]
    fn test_roles_for_every_permission() {
        assert_eq!(roles(GroupMemberPermission::Owner), vec!["owner", "admin"]);
        assert_eq!(roles(GroupMemberPermission::Admin), vec!["admin"]);
        assert!(roles(GroupMemberPermission::Member).is_empty());
    }
}
