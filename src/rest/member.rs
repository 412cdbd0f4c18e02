use serde::{Deserialize, Serialize};

use crate::rest::{
    permissions::{PermissionBits, aggregate_permissions},
    resource::Resource,
    role::Role,
    snowflake::Snowflake,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialUser {
    pub id: Snowflake,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

/// A user's membership in one guild. Holds role ids only; role data is
/// fetched separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<PartialUser>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<String>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(skip)]
    pub guild_id: Snowflake,
}

impl Member {
    pub fn user_id(&self) -> Snowflake {
        self.user.as_ref().map(|user| user.id).unwrap_or(Snowflake::ZERO)
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id())
    }

    pub fn permissions(&self, guild_roles: &[Role]) -> PermissionBits {
        aggregate_permissions(&self.roles, guild_roles)
    }
}

impl Resource for Member {
    type Id = Snowflake;

    fn id(&self) -> Snowflake {
        self.user_id()
    }
}
