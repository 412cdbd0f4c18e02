use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::rest::{
    client::{Client, Flag},
    error::{RestError, missing_identifier},
    member::PartialUser,
    resource::{Deleter, Resource},
    snowflake::Snowflake,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialChannel {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: u8,
}

/// A code that adds a user to a guild when used. Identified by its code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub code: String,
    #[serde(default)]
    pub guild: Option<PartialGuild>,
    #[serde(default)]
    pub channel: Option<PartialChannel>,
    #[serde(default)]
    pub inviter: Option<PartialUser>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Seconds until expiry; zero never expires.
    #[serde(default)]
    pub max_age: u32,
    #[serde(default)]
    pub max_uses: u32,
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub uses: u32,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_presence_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_member_count: Option<u32>,
}

impl Resource for Invite {
    type Id = String;

    fn id(&self) -> String {
        self.code.clone()
    }
}

#[async_trait]
impl Deleter for Invite {
    async fn delete_from_remote(&self, client: &Client, flags: &[Flag]) -> Result<(), RestError> {
        if self.code.trim().is_empty() {
            return Err(missing_identifier("invite has no code"));
        }

        client.delete_invite(&self.code, flags).await.map(|_| ())
    }
}
