use std::{any::Any, fmt};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::rest::{
    error::{RestError, missing_identifier, unsupported_type},
    resource::Cacheable,
    snowflake::Snowflake,
};

/// Namespace partitioning cache keys by resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryTag {
    GuildRole,
    GuildRoles,
    GuildMember,
    Invite,
}

impl fmt::Display for RegistryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistryTag::GuildRole => "guild_role",
            RegistryTag::GuildRoles => "guild_roles",
            RegistryTag::GuildMember => "guild_member",
            RegistryTag::Invite => "invite",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// All roles of one guild.
    pub fn guild(guild_id: Snowflake) -> Self {
        Self(guild_id.to_string())
    }

    pub fn guild_role(guild_id: Snowflake, role_id: Snowflake) -> Self {
        Self(format!("{guild_id}:{role_id}"))
    }

    pub fn guild_member(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self(format!("{guild_id}:{user_id}"))
    }

    pub fn invite(code: &str) -> Self {
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct CacheEntry {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Concurrent store of the most recently observed server state.
///
/// Entries live in a sharded lock table, so operations on one key are
/// linearizable while distinct keys proceed independently. Values are copied
/// on the way in and on the way out; callers never hold a reference into the
/// registry. Nothing is evicted unless a caller deletes it.
#[derive(Default)]
pub struct CacheRegistry {
    entries: DashMap<(RegistryTag, CacheKey), CacheEntry>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Cacheable>(
        &self,
        tag: RegistryTag,
        key: &CacheKey,
    ) -> Result<Option<T>, RestError> {
        let Some(entry) = self.entries.get(&(tag, key.clone())) else {
            return Ok(None);
        };

        match entry.value.downcast_ref::<T>() {
            Some(value) => Ok(Some(value.clone())),
            None => Err(unsupported_type(format!(
                "{tag} entry '{key}' holds {}, not {}",
                entry.type_name,
                std::any::type_name::<T>()
            ))),
        }
    }

    pub fn put<T: Cacheable>(
        &self,
        tag: RegistryTag,
        key: &CacheKey,
        value: &T,
    ) -> Result<(), RestError> {
        if key.is_empty() {
            return Err(missing_identifier(format!("{tag} cache key cannot be empty")));
        }

        self.entries.insert(
            (tag, key.clone()),
            CacheEntry {
                type_name: std::any::type_name::<T>(),
                value: Box::new(value.clone()),
            },
        );
        Ok(())
    }

    /// Returns whether an entry was removed.
    pub fn delete(&self, tag: RegistryTag, key: &CacheKey) -> bool {
        self.entries.remove(&(tag, key.clone())).is_some()
    }

    pub fn contains(&self, tag: RegistryTag, key: &CacheKey) -> bool {
        self.entries.contains_key(&(tag, key.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
