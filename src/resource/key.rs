//! Resource key model: content-hash scratch keys for transient/reusable
//! resources, and stable-identity unique keys that pin a resource.

use std::sync::atomic::{AtomicU64, Ordering};

/// A content hash over (type tag, dimensions, format, sample count, mipmap
/// flag, ...). Two resources with equal `ScratchKey`s are interchangeable
/// from the cache's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScratchKey(Vec<u8>);

impl ScratchKey {
    pub fn builder(type_tag: u32) -> ScratchKeyBuilder {
        let mut bytes = Vec::with_capacity(16);
        bytes.extend_from_slice(&type_tag.to_le_bytes());
        ScratchKeyBuilder { bytes }
    }
}

pub struct ScratchKeyBuilder {
    bytes: Vec<u8>,
}

impl ScratchKeyBuilder {
    pub fn add_u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn add_bool(mut self, v: bool) -> Self {
        self.bytes.push(v as u8);
        self
    }

    pub fn build(self) -> ScratchKey {
        ScratchKey(self.bytes)
    }
}

static NEXT_UNIQUE_ID: AtomicU64 = AtomicU64::new(1);

/// A stable, externally held identity. Proxies address resources by
/// `UniqueKey`; holding one pins the resource against purge (invariant I1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    id: u64,
    /// Optional discriminator bytes, e.g. a clip path's content hash plus
    /// an AA flag for clip-mask textures.
    tail: Vec<u8>,
}

impl UniqueKey {
    /// Allocates a fresh, globally unique id. Single-threaded use is
    /// assumed by the rest of this crate, but the counter itself is atomic
    /// so it is safe to call from a `Semaphore`-synchronized second thread
    /// that also happens to mint keys.
    pub fn next() -> Self {
        let id = NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed);
        Self { id, tail: Vec::new() }
    }

    pub fn with_tail(tail: Vec<u8>) -> Self {
        let mut key = Self::next();
        key.tail = tail;
        key
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}
