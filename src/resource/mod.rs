//! Resource cache: content-hash and identity keying, LRU eviction, and
//! frame-based expiration over GPU objects.

pub mod cache;
pub mod key;
pub mod resource;

pub use cache::ResourceCache;
pub use key::{ScratchKey, UniqueKey};
pub use resource::{Resource, ResourceKind};
