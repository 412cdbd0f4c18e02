use crate::rest::snowflake::Snowflake;

pub fn guild_roles(guild_id: Snowflake) -> String {
    format!("/guilds/{guild_id}/roles")
}

pub fn guild_role(guild_id: Snowflake, role_id: Snowflake) -> String {
    format!("/guilds/{guild_id}/roles/{role_id}")
}

pub fn guild_member(guild_id: Snowflake, user_id: Snowflake) -> String {
    format!("/guilds/{guild_id}/members/{user_id}")
}

pub fn invite(code: &str) -> String {
    format!("/invites/{code}")
}
