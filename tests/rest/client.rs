use concord::rest::{
    CacheKey, Flag, RegistryTag, RestErrorKind,
    invite::Invite,
    permissions::PermissionBits,
    query::GetInviteParams,
    request::AUDIT_LOG_REASON_HEADER,
    role::{CreateGuildRoleParams, Role, UpdateGuildRoleParams, sort_roles},
    snowflake::Snowflake,
    transport::Method,
};

use crate::support::{GUILD, MEMBER_BODY, ROLES_BODY, ScriptedTransport, client_with};

const USER: u64 = 80_351_110_224_678_912;

fn guild() -> Snowflake {
    Snowflake::new(GUILD)
}

fn roles_path() -> String {
    format!("/guilds/{GUILD}/roles")
}

#[tokio::test]
async fn given_guild_roles_when_fetched_twice_then_second_read_is_served_from_cache() {
    let (client, transport) =
        client_with(ScriptedTransport::new().respond(Method::Get, &roles_path(), 200, ROLES_BODY));

    let first = client.get_guild_roles(guild(), &[]).await.unwrap();
    let second = client.get_guild_roles(guild(), &[]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|role| role.guild_id == guild()));
    assert_eq!(transport.calls(), 1);

    client
        .get_guild_roles(guild(), &[Flag::IgnoreCache])
        .await
        .unwrap();
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn given_fetched_roles_when_sorted_then_highest_position_comes_first() {
    let (client, _transport) =
        client_with(ScriptedTransport::new().respond(Method::Get, &roles_path(), 200, ROLES_BODY));

    let mut roles = client.get_guild_roles(guild(), &[]).await.unwrap();
    sort_roles(&mut roles);

    let names: Vec<&str> = roles.iter().map(|role| role.name.as_str()).collect();
    assert_eq!(names, vec!["admins", "mods", "@everyone"]);
}

#[tokio::test]
async fn given_member_with_roles_when_computing_permissions_then_union_of_known_roles() {
    let member_path = format!("/guilds/{GUILD}/members/{USER}");
    let (client, transport) = client_with(
        ScriptedTransport::new()
            .respond(Method::Get, &roles_path(), 200, ROLES_BODY)
            .respond(Method::Get, &member_path, 200, MEMBER_BODY),
    );

    let permissions = client
        .get_member_permissions(guild(), Snowflake::new(USER), &[])
        .await
        .unwrap();

    assert_eq!(
        permissions,
        PermissionBits::MANAGE_ROLES | PermissionBits::ADMINISTRATOR
    );
    assert!(!permissions.contains(PermissionBits::SEND_MESSAGES));
    assert_eq!(transport.calls(), 2);

    let member = client
        .get_member(guild(), Snowflake::new(USER), &[])
        .await
        .unwrap();
    assert_eq!(member.guild_id, guild());
    assert_eq!(member.user_id(), Snowflake::new(USER));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn given_create_params_when_creating_role_then_reason_header_and_cache_entry() {
    let (client, transport) = client_with(ScriptedTransport::new().respond(
        Method::Post,
        &roles_path(),
        200,
        r#"{"id": "555", "name": "helpers", "position": 1, "permissions": "0"}"#,
    ));
    let params = CreateGuildRoleParams {
        name: Some("helpers".to_string()),
        reason: Some("onboarding".to_string()),
        ..Default::default()
    };

    let role = client
        .create_guild_role(guild(), &params, &[])
        .await
        .unwrap();

    assert_eq!(role.id, Snowflake::new(555));
    assert_eq!(role.guild_id, guild());
    let cached: Option<Role> = client
        .cache()
        .get(
            RegistryTag::GuildRole,
            &CacheKey::guild_role(guild(), Snowflake::new(555)),
        )
        .unwrap();
    assert_eq!(cached, Some(role));

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert!(
        sent[0]
            .headers
            .iter()
            .any(|(name, value)| name == AUDIT_LOG_REASON_HEADER && value == "onboarding")
    );
    let body: serde_json::Value = serde_json::from_slice(sent[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, serde_json::json!({"name": "helpers"}));
}

#[tokio::test]
async fn given_cached_role_list_when_role_is_updated_then_list_is_refetched() {
    let role_path = format!("/guilds/{GUILD}/roles/41771983423143938");
    let (client, transport) = client_with(
        ScriptedTransport::new()
            .respond(Method::Get, &roles_path(), 200, ROLES_BODY)
            .respond(
                Method::Patch,
                &role_path,
                200,
                r#"{"id": "41771983423143938", "name": "moderators", "position": 3}"#,
            ),
    );
    client.get_guild_roles(guild(), &[]).await.unwrap();

    let updated = client
        .update_guild_role(
            guild(),
            Snowflake::new(41_771_983_423_143_938),
            &UpdateGuildRoleParams {
                name: Some("moderators".to_string()),
                ..Default::default()
            },
            &[],
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "moderators");
    assert_eq!(updated.guild_id, guild());
    assert!(
        !client
            .cache()
            .contains(RegistryTag::GuildRoles, &CacheKey::guild(guild()))
    );

    client.get_guild_roles(guild(), &[]).await.unwrap();
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn given_role_deleted_when_service_answers_no_content_then_entries_are_evicted() {
    let role_id = Snowflake::new(555);
    let (client, _transport) = client_with(ScriptedTransport::new().respond(
        Method::Delete,
        &format!("/guilds/{GUILD}/roles/555"),
        204,
        "",
    ));
    let key = CacheKey::guild_role(guild(), role_id);
    client
        .cache()
        .put(RegistryTag::GuildRole, &key, &Role::default())
        .unwrap();

    client.delete_guild_role(guild(), role_id, &[]).await.unwrap();

    assert!(!client.cache().contains(RegistryTag::GuildRole, &key));
}

#[tokio::test]
async fn given_with_count_when_fetching_invite_then_query_is_sent_and_counts_decoded() {
    let (client, transport) = client_with(ScriptedTransport::new().respond(
        Method::Get,
        "/invites/0vCdhLbwjZZTWZLD?with_count=true",
        200,
        r#"{"code": "0vCdhLbwjZZTWZLD", "approximate_member_count": 120, "approximate_presence_count": 40}"#,
    ));
    let params = GetInviteParams { with_count: true };

    let invite = client
        .get_invite("0vCdhLbwjZZTWZLD", Some(&params), &[])
        .await
        .unwrap();

    assert_eq!(invite.approximate_member_count, Some(120));
    assert_eq!(invite.approximate_presence_count, Some(40));
    assert_eq!(
        transport.requests()[0].endpoint,
        "/invites/0vCdhLbwjZZTWZLD?with_count=true"
    );
}

#[tokio::test]
async fn given_cached_invite_when_deleted_then_returned_and_evicted() {
    let (client, _transport) = client_with(ScriptedTransport::new().respond(
        Method::Delete,
        "/invites/abc",
        200,
        r#"{"code": "abc", "uses": 4}"#,
    ));
    let key = CacheKey::invite("abc");
    client
        .cache()
        .put(RegistryTag::Invite, &key, &Invite::default())
        .unwrap();

    let deleted = client.delete_invite("abc", &[]).await.unwrap();

    assert_eq!(deleted.code, "abc");
    assert_eq!(deleted.uses, 4);
    assert!(!client.cache().contains(RegistryTag::Invite, &key));
}

#[tokio::test]
async fn given_unset_identifiers_when_calling_then_missing_identifier_without_remote_call() {
    let (client, transport) = client_with(ScriptedTransport::new());

    let err = client
        .get_guild_roles(Snowflake::ZERO, &[])
        .await
        .expect_err("zero guild id must fail");
    assert_eq!(err.kind(), RestErrorKind::MissingIdentifier);

    let err = client
        .get_invite("  ", None, &[])
        .await
        .expect_err("blank code must fail");
    assert_eq!(err.kind(), RestErrorKind::MissingIdentifier);

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn given_missing_member_when_fetching_then_not_found_status_is_exposed() {
    let (client, _transport) = client_with(ScriptedTransport::new().respond(
        Method::Get,
        &format!("/guilds/{GUILD}/members/1"),
        404,
        r#"{"message": "Unknown Member", "code": 10007}"#,
    ));

    let err = client
        .get_member(guild(), Snowflake::new(1), &[])
        .await
        .expect_err("404 must fail");

    assert!(err.is_not_found());
}

#[tokio::test]
async fn given_cached_plain_invite_when_counts_requested_then_remote_is_called() {
    let (client, transport) = client_with(
        ScriptedTransport::new()
            .respond(Method::Get, "/invites/abc", 200, r#"{"code": "abc", "uses": 1}"#)
            .respond(
                Method::Get,
                "/invites/abc?with_count=true",
                200,
                r#"{"code": "abc", "uses": 1, "approximate_member_count": 120, "approximate_presence_count": 40}"#,
            ),
    );

    let plain = client.get_invite("abc", None, &[]).await.unwrap();
    assert_eq!(plain.approximate_member_count, None);

    let counted = client
        .get_invite("abc", Some(&GetInviteParams { with_count: true }), &[])
        .await
        .unwrap();
    assert_eq!(counted.approximate_member_count, Some(120));
    assert_eq!(transport.calls(), 2);

    let cached: Option<Invite> = client
        .cache()
        .get(RegistryTag::Invite, &CacheKey::invite("abc"))
        .unwrap();
    assert_eq!(cached.and_then(|invite| invite.approximate_member_count), Some(120));
}

#[tokio::test]
async fn given_code_with_route_characters_when_calling_then_rejected_without_remote_call() {
    let (client, transport) = client_with(ScriptedTransport::new());

    for code in ["abc?with_count=true", "../guilds/1", "abc#frag", "a b"] {
        let err = client
            .get_invite(code, None, &[])
            .await
            .expect_err("reserved characters must fail");
        assert_eq!(err.kind(), RestErrorKind::MissingIdentifier);

        let err = client
            .delete_invite(code, &[])
            .await
            .expect_err("reserved characters must fail");
        assert_eq!(err.kind(), RestErrorKind::MissingIdentifier);
    }

    assert_eq!(transport.calls(), 0);
}
