use std::{cmp::Ordering, fmt};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::rest::{
    client::{Client, Flag},
    error::{RestError, missing_identifier},
    permissions::PermissionBits,
    resource::{Deleter, Resource},
    snowflake::Snowflake,
};

/// A guild role. `guild_id` is not part of the wire payload; the client
/// restores it after every fetch or mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    /// May be negative.
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permissions: PermissionBits,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
    #[serde(skip)]
    pub guild_id: Snowflake,
}

impl Role {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links the role to a guild before it is created or deleted remotely.
    pub fn set_guild_id(&mut self, guild_id: Snowflake) {
        self.guild_id = guild_id;
    }

    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Resource for Role {
    type Id = Snowflake;

    fn id(&self) -> Snowflake {
        self.id
    }
}

#[async_trait]
impl Deleter for Role {
    async fn delete_from_remote(&self, client: &Client, flags: &[Flag]) -> Result<(), RestError> {
        if self.id.is_zero() {
            return Err(missing_identifier("role has no id"));
        }
        if self.guild_id.is_zero() {
            return Err(missing_identifier("role has no guild id"));
        }

        client.delete_guild_role(self.guild_id, self.id, flags).await
    }
}

/// Order in which the platform's settings UI lists roles: highest position
/// first, lower id first among equal positions.
pub fn display_order(a: &Role, b: &Role) -> Ordering {
    b.position.cmp(&a.position).then_with(|| a.id.cmp(&b.id))
}

pub fn sort_roles(roles: &mut [Role]) {
    roles.sort_by(display_order);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGuildRoleParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionBits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
    /// Sent as the audit log reason header, never in the body.
    #[serde(skip)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGuildRoleParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionBits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
    #[serde(skip)]
    pub reason: Option<String>,
}
