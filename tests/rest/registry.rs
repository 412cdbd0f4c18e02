use std::sync::Arc;

use concord::rest::{
    CacheKey, CacheRegistry, RegistryTag, Resource, role::Role, snowflake::Snowflake,
};
use futures_util::future::join_all;

fn role(id: u64, name: &str) -> Role {
    Role {
        id: Snowflake::new(id),
        name: name.to_string(),
        ..Role::default()
    }
}

#[test]
fn given_stored_role_when_caller_mutates_copies_then_registry_is_unaffected() {
    let registry = CacheRegistry::new();
    let key = CacheKey::guild_role(Snowflake::new(1), Snowflake::new(2));
    let mut original = role(2, "mods");
    registry.put(RegistryTag::GuildRole, &key, &original).unwrap();

    original.name = "changed before read".to_string();
    let mut fetched: Role = registry.get(RegistryTag::GuildRole, &key).unwrap().unwrap();
    fetched.name = "changed after read".to_string();

    let again: Role = registry.get(RegistryTag::GuildRole, &key).unwrap().unwrap();
    assert_eq!(again.name, "mods");
    assert_ne!(again.name, original.name);
}

#[test]
fn given_deep_copy_when_copied_over_then_destination_matches_source() {
    let source = role(2, "mods");
    let copy = source.deep_copy();
    let mut destination = role(3, "other");

    copy.copy_over_to(&mut destination);

    assert_eq!(destination, source);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_writers_when_each_owns_a_key_then_every_entry_survives() {
    let registry = Arc::new(CacheRegistry::new());

    let writers = (1..=64_u64).map(|id| {
        let registry = registry.clone();
        tokio::spawn(async move {
            let key = CacheKey::guild_role(Snowflake::new(1), Snowflake::new(id));
            registry
                .put(RegistryTag::GuildRole, &key, &role(id, &format!("role-{id}")))
                .unwrap();
            let read: Role = registry.get(RegistryTag::GuildRole, &key).unwrap().unwrap();
            read.id
        })
    });
    let ids: Vec<Snowflake> = join_all(writers)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(ids.len(), 64);
    assert_eq!(registry.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_writers_on_one_key_when_done_then_a_complete_value_remains() {
    let registry = Arc::new(CacheRegistry::new());
    let key = CacheKey::invite("shared");

    let writers = (0..32_u64).map(|n| {
        let registry = registry.clone();
        let key = key.clone();
        tokio::spawn(async move {
            registry
                .put(RegistryTag::GuildRole, &key, &role(n, &format!("writer-{n}")))
                .unwrap();
        })
    });
    join_all(writers).await;

    let survivor: Role = registry.get(RegistryTag::GuildRole, &key).unwrap().unwrap();
    assert_eq!(survivor.name, format!("writer-{}", survivor.id));
    assert_eq!(registry.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_mixed_put_delete_get_on_one_key_then_reads_see_nothing_or_a_complete_value() {
    let registry = Arc::new(CacheRegistry::new());
    let key = CacheKey::guild_role(Snowflake::new(1), Snowflake::new(2));

    let workers = (0..48_u64).map(|n| {
        let registry = registry.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let mut observed = Vec::new();
            for round in 0..50_u64 {
                let id = n * 1_000 + round;
                match (n + round) % 3 {
                    0 => registry
                        .put(RegistryTag::GuildRole, &key, &role(id, &format!("writer-{id}")))
                        .unwrap(),
                    1 => {
                        registry.delete(RegistryTag::GuildRole, &key);
                    }
                    _ => observed.push(registry.get::<Role>(RegistryTag::GuildRole, &key).unwrap()),
                }
                tokio::task::yield_now().await;
            }
            observed
        })
    });

    for observed in join_all(workers).await {
        for read in observed.unwrap().into_iter().flatten() {
            assert_eq!(read.name, format!("writer-{}", read.id));
        }
    }
    assert!(registry.len() <= 1);
}
