use std::{fmt, hash::Hash};

use async_trait::async_trait;

use crate::rest::{
    client::{Client, Flag},
    error::RestError,
};

/// Anything the cache registry can hold: single resources as well as
/// collections of them.
pub trait Cacheable: Clone + Send + Sync + 'static {}

impl<T> Cacheable for T where T: Clone + Send + Sync + 'static {}

/// Contract every domain object must satisfy to flow through the pipeline.
///
/// Implementors own all of their data, so `deep_copy` never shares mutable
/// storage with the source and `copy_over_to` replaces every field of the
/// destination, relational back-references included.
pub trait Resource: Cacheable + fmt::Debug {
    type Id: Clone + Eq + Hash + fmt::Display;

    fn id(&self) -> Self::Id;

    fn deep_copy(&self) -> Self {
        self.clone()
    }

    fn copy_over_to(&self, other: &mut Self) {
        other.clone_from(self);
    }
}

/// Resources that know how to remove themselves from the remote service.
#[async_trait]
pub trait Deleter: Resource {
    async fn delete_from_remote(&self, client: &Client, flags: &[Flag]) -> Result<(), RestError>;
}
