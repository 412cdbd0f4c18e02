use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result as AnyResult};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ClientConfig,
    rest::{
        cache::{CacheKey, CacheRegistry, RegistryTag},
        credentials::CredentialProvider,
        endpoint,
        error::{RestError, missing_identifier},
        invite::Invite,
        member::Member,
        permissions::{PermissionBits, aggregate_permissions},
        pipeline::{Executed, Pipeline},
        query::QueryString,
        request::{Hooks, RestRequest},
        resource::Cacheable,
        role::{CreateGuildRoleParams, Role, UpdateGuildRoleParams},
        snowflake::Snowflake,
        transport::{ReqwestTransport, Transport},
    },
};

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Skip the cache read; the result is still cached.
    IgnoreCache,
}

/// Typed operations for roles, members and invites on top of a [`Pipeline`].
///
/// Cloning is cheap and clones share the transport and cache registry.
#[derive(Clone)]
pub struct Client {
    pipeline: Pipeline,
    cancel: CancellationToken,
    deadline: Option<Duration>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<CacheRegistry>) -> Self {
        Self {
            pipeline: Pipeline::new(transport, cache),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    pub async fn from_config(
        config: &ClientConfig,
        credentials: &dyn CredentialProvider,
    ) -> AnyResult<Self> {
        let auth_header = credentials
            .resolve(&config.credential)
            .await
            .context("failed to resolve client credential")?;
        let transport = ReqwestTransport::new(
            config.base_url.clone(),
            auth_header,
            &config.user_agent,
            Duration::from_millis(config.request_timeout_ms.max(1)),
            Duration::from_millis(config.pool_idle_timeout_ms),
        )
        .context("failed to construct http transport")?;

        tracing::info!(
            target: "rest",
            base_url = %transport.base_url(),
            request_timeout_ms = config.request_timeout_ms,
            "client_initialized"
        );

        let mut client = Self::new(Arc::new(transport), Arc::new(CacheRegistry::new()));
        client.deadline = config.call_deadline_ms.map(Duration::from_millis);
        Ok(client)
    }

    /// Returns a clone whose calls abort with
    /// [`RestError::Canceled`] once `token` is cancelled.
    pub fn scoped(&self, token: CancellationToken) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            cancel: token,
            deadline: self.deadline,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cache(&self) -> &Arc<CacheRegistry> {
        self.pipeline.cache()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    async fn execute<T>(
        &self,
        request: RestRequest,
        hooks: Hooks<T>,
        flags: &[Flag],
    ) -> Result<Executed<T>, RestError>
    where
        T: DeserializeOwned + Cacheable,
    {
        let mut request = request.with_cancellation(self.cancel.clone());
        if let Some(deadline) = self.deadline {
            request = request.with_deadline(deadline);
        }
        if flags.contains(&Flag::IgnoreCache) {
            request = request.ignore_cache();
        }
        self.pipeline.execute(request, hooks).await
    }

    /// POST `/guilds/{guild.id}/roles`. Every JSON param is optional.
    pub async fn create_guild_role(
        &self,
        guild_id: Snowflake,
        params: &CreateGuildRoleParams,
        flags: &[Flag],
    ) -> Result<Role, RestError> {
        require_id(guild_id, "guild id")?;
        let request = RestRequest::post(endpoint::guild_roles(guild_id))
            .with_json_body(params)?
            .with_reason(params.reason.as_deref())
            .with_cache_tag(RegistryTag::GuildRole);
        let hooks = Hooks::new()
            .before_cache_write(move |role: &mut Role| role.guild_id = guild_id)
            .cache_key(|role: &Role| CacheKey::guild_role(role.guild_id, role.id));

        let role = self.execute(request, hooks, flags).await?.into_resource()?;
        self.forget_role_list(guild_id);
        Ok(role)
    }

    /// PATCH `/guilds/{guild.id}/roles/{role.id}`. Never served from cache.
    pub async fn update_guild_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        params: &UpdateGuildRoleParams,
        flags: &[Flag],
    ) -> Result<Role, RestError> {
        require_id(guild_id, "guild id")?;
        require_id(role_id, "role id")?;
        let request = RestRequest::patch(endpoint::guild_role(guild_id, role_id))
            .with_json_body(params)?
            .with_reason(params.reason.as_deref())
            .with_cache(RegistryTag::GuildRole, CacheKey::guild_role(guild_id, role_id))
            .ignore_cache();
        let hooks =
            Hooks::new().before_cache_write(move |role: &mut Role| role.guild_id = guild_id);

        let role = self.execute(request, hooks, flags).await?.into_resource()?;
        self.forget_role_list(guild_id);
        Ok(role)
    }

    /// DELETE `/guilds/{guild.id}/roles/{role.id}`; the service answers 204.
    pub async fn delete_guild_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        flags: &[Flag],
    ) -> Result<(), RestError> {
        require_id(guild_id, "guild id")?;
        require_id(role_id, "role id")?;
        let request = RestRequest::delete(endpoint::guild_role(guild_id, role_id))
            .with_expected_status(204)
            .with_cache(RegistryTag::GuildRole, CacheKey::guild_role(guild_id, role_id));

        self.execute::<Role>(request, Hooks::new(), flags).await?;
        self.forget_role_list(guild_id);
        Ok(())
    }

    /// GET `/guilds/{guild.id}/roles`, in the order the service returns them.
    pub async fn get_guild_roles(
        &self,
        guild_id: Snowflake,
        flags: &[Flag],
    ) -> Result<Vec<Role>, RestError> {
        require_id(guild_id, "guild id")?;
        let request = RestRequest::get(endpoint::guild_roles(guild_id))
            .with_cache(RegistryTag::GuildRoles, CacheKey::guild(guild_id));
        let hooks = Hooks::new().before_cache_write(move |roles: &mut Vec<Role>| {
            for role in roles.iter_mut() {
                role.guild_id = guild_id;
            }
        });

        self.execute(request, hooks, flags).await?.into_resource()
    }

    /// GET `/guilds/{guild.id}/members/{user.id}`.
    pub async fn get_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        flags: &[Flag],
    ) -> Result<Member, RestError> {
        require_id(guild_id, "guild id")?;
        require_id(user_id, "user id")?;
        let request = RestRequest::get(endpoint::guild_member(guild_id, user_id))
            .with_cache(RegistryTag::GuildMember, CacheKey::guild_member(guild_id, user_id));
        let hooks = Hooks::new().before_cache_write(move |member: &mut Member| {
            member.guild_id = guild_id;
        });

        self.execute(request, hooks, flags).await?.into_resource()
    }

    /// Combined permissions granted by the member's roles. Roles the member
    /// references but the guild list lacks are ignored.
    pub async fn get_member_permissions(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        flags: &[Flag],
    ) -> Result<PermissionBits, RestError> {
        let (roles, member) = tokio::try_join!(
            self.get_guild_roles(guild_id, flags),
            self.get_member(guild_id, user_id, flags),
        )?;

        Ok(aggregate_permissions(&member.roles, &roles))
    }

    /// GET `/invites/{invite.code}`. `params` defaults to no query options.
    ///
    /// A cached entry may lack the fields a query asks for, so calls with a
    /// non-empty query always reach the service. The fresher result replaces
    /// the cached one.
    pub async fn get_invite(
        &self,
        code: &str,
        params: Option<&dyn QueryString>,
        flags: &[Flag],
    ) -> Result<Invite, RestError> {
        require_code(code)?;
        let query = params.map(|params| params.query_string()).unwrap_or_default();
        let mut request = RestRequest::get(format!("{}{}", endpoint::invite(code), query))
            .with_cache(RegistryTag::Invite, CacheKey::invite(code));
        if !query.is_empty() {
            request = request.ignore_cache();
        }

        self.execute(request, Hooks::new(), flags).await?.into_resource()
    }

    /// DELETE `/invites/{invite.code}`; returns the deleted invite.
    pub async fn delete_invite(&self, code: &str, flags: &[Flag]) -> Result<Invite, RestError> {
        require_code(code)?;
        let request = RestRequest::delete(endpoint::invite(code))
            .with_cache(RegistryTag::Invite, CacheKey::invite(code));

        self.execute(request, Hooks::new(), flags).await?.into_resource()
    }

    fn forget_role_list(&self, guild_id: Snowflake) {
        if self
            .cache()
            .delete(RegistryTag::GuildRoles, &CacheKey::guild(guild_id))
        {
            tracing::debug!(target: "rest", guild_id = %guild_id, "role_list_evicted");
        }
    }
}

fn require_id(id: Snowflake, what: &str) -> Result<(), RestError> {
    if id.is_zero() {
        return Err(missing_identifier(format!("{what} is unset")));
    }
    Ok(())
}

fn require_code(code: &str) -> Result<(), RestError> {
    if code.trim().is_empty() {
        return Err(missing_identifier("invite code is empty"));
    }
    // Codes are placed in the path verbatim.
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(missing_identifier(format!("invalid invite code '{code}'")));
    }
    Ok(())
}
