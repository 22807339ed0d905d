//! Records the protocol client hands out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A friend of the logged-in account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// The friend's QQ number.
    pub uin: i64,
    /// The friend's own nickname.
    pub nickname: String,
    /// The remark the bot gave this friend (empty if none).
    #[serde(default)]
    pub remark: String,
}

impl Friend {
    /// Returns the remark if set, otherwise the nickname.
    pub fn display_name(&self) -> &str {
        if self.remark.is_empty() {
            &self.nickname
        } else {
            &self.remark
        }
    }
}

/// A group the logged-in account is in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// The group number.
    pub uin: i64,
    /// The group name.
    pub name: String,
}

/// Permission level of a group member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMemberPermission {
    /// Regular member.
    #[default]
    Member,
    /// Administrator.
    Admin,
    /// Owner (creator) of the group.
    Owner,
}

/// A member of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// The member's QQ number.
    pub uin: i64,
    /// The member's account nickname.
    pub nickname: String,
    /// The member's group card (empty if none).
    #[serde(default)]
    pub card: String,
    /// Special title granted by the owner (empty if none).
    #[serde(default)]
    pub special_title: String,
    /// Permission level.
    #[serde(default)]
    pub permission: GroupMemberPermission,
}

impl GroupMember {
    /// Returns the group card if set, otherwise the nickname.
    pub fn display_name(&self) -> &str {
        if self.card.is_empty() {
            &self.nickname
        } else {
            &self.card
        }
    }
}

/// Application metadata served by the signing service.
///
/// Only the fields the adapter logs are typed; the rest travel untouched to
/// the protocol client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Operating system the client pretends to run on.
    #[serde(rename = "Os", default)]
    pub os: String,
    /// Client version string.
    #[serde(rename = "CurrentVersion", default)]
    pub current_version: String,
    /// Sub-application ID.
    #[serde(rename = "SubAppId", default)]
    pub sub_app_id: u32,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signature returned by the signing service for one outgoing packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignResult {
    /// Packet signature.
    pub sign: Vec<u8>,
    /// Security token.
    pub token: Vec<u8>,
    /// Extra data.
    pub extra: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let mut friend = Friend {
            uin: 1,
            nickname: "nick".into(),
            remark: String::new(),
        };
        assert_eq!(friend.display_name(), "nick");
        friend.remark = "remark".into();
        assert_eq!(friend.display_name(), "remark");

        let mut member = GroupMember {
            uin: 2,
            nickname: "nick".into(),
            ..Default::default()
        };
        assert_eq!(member.display_name(), "nick");
        member.card = "card".into();
        assert_eq!(member.display_name(), "card");
    }

    #[test]
    fn test_app_info_keeps_unknown_fields() {
        let json = r#"{"Os":"Linux","CurrentVersion":"3.2.10-25765","SubAppId":537234773,"AppId":1600001615}"#;
        let info: AppInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.os, "Linux");
        assert_eq!(info.sub_app_id, 537234773);
        assert_eq!(info.extra["AppId"], 1600001615);

        let back = serde_json::to_value(&info).unwrap();
        assert_eq!(back["AppId"], 1600001615);
        assert_eq!(back["Os"], "Linux");
    }
}
