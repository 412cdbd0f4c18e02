pub mod cache;
pub mod client;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod invite;
pub mod member;
pub mod permissions;
pub mod pipeline;
pub mod query;
pub mod request;
pub mod resource;
pub mod role;
pub mod snowflake;
pub mod transport;

pub use cache::{CacheKey, CacheRegistry, RegistryTag};
pub use client::{Client, Flag};
pub use error::{RestError, RestErrorKind, TransportError};
pub use pipeline::{Executed, Pipeline};
pub use request::{Hooks, RestRequest};
pub use resource::{Cacheable, Deleter, Resource};
pub use snowflake::Snowflake;
