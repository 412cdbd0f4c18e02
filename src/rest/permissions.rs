use std::{
    collections::HashSet,
    fmt,
    ops::{BitOr, BitOrAssign},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::rest::{
    role::Role,
    snowflake::{Snowflake, U64Visitor},
};

/// 64-bit set of capability flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionBits(u64);

impl PermissionBits {
    pub const NONE: PermissionBits = PermissionBits(0);
    pub const CREATE_INSTANT_INVITE: PermissionBits = PermissionBits(1 << 0);
    pub const KICK_MEMBERS: PermissionBits = PermissionBits(1 << 1);
    pub const BAN_MEMBERS: PermissionBits = PermissionBits(1 << 2);
    pub const ADMINISTRATOR: PermissionBits = PermissionBits(1 << 3);
    pub const MANAGE_CHANNELS: PermissionBits = PermissionBits(1 << 4);
    pub const MANAGE_GUILD: PermissionBits = PermissionBits(1 << 5);
    pub const ADD_REACTIONS: PermissionBits = PermissionBits(1 << 6);
    pub const VIEW_AUDIT_LOG: PermissionBits = PermissionBits(1 << 7);
    pub const VIEW_CHANNEL: PermissionBits = PermissionBits(1 << 10);
    pub const SEND_MESSAGES: PermissionBits = PermissionBits(1 << 11);
    pub const MANAGE_MESSAGES: PermissionBits = PermissionBits(1 << 13);
    pub const MENTION_EVERYONE: PermissionBits = PermissionBits(1 << 17);
    pub const CHANGE_NICKNAME: PermissionBits = PermissionBits(1 << 26);
    pub const MANAGE_NICKNAMES: PermissionBits = PermissionBits(1 << 27);
    pub const MANAGE_ROLES: PermissionBits = PermissionBits(1 << 28);
    pub const MANAGE_WEBHOOKS: PermissionBits = PermissionBits(1 << 29);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: PermissionBits) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PermissionBits {
    type Output = PermissionBits;

    fn bitor(self, rhs: Self) -> Self::Output {
        PermissionBits(self.0 | rhs.0)
    }
}

impl BitOrAssign for PermissionBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u64> for PermissionBits {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Display for PermissionBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl Serialize for PermissionBits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PermissionBits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(U64Visitor).map(Self)
    }
}

/// ORs together the permissions of every role in `available_roles` whose id
/// appears in `member_role_ids`.
///
/// Ids with no matching role contribute nothing: role lists and member role
/// assignments are fetched separately and may briefly disagree. Each role is
/// counted once regardless of duplicates in either input.
pub fn aggregate_permissions(
    member_role_ids: &[Snowflake],
    available_roles: &[Role],
) -> PermissionBits {
    let mut remaining: HashSet<Snowflake> = member_role_ids.iter().copied().collect();
    let mut permissions = PermissionBits::NONE;

    for role in available_roles {
        if remaining.is_empty() {
            break;
        }
        if remaining.remove(&role.id) {
            permissions |= role.permissions;
        }
    }

    permissions
}
