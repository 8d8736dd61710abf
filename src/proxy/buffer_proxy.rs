//! Deferred handle to a GPU buffer (vertex, index, or readback).

use std::cell::RefCell;
use std::rc::Rc;

use crate::pixel::BufferUsage;
use crate::resource::{Resource, ResourceCache, UniqueKey};

pub struct BufferProxy {
    pub unique_key: UniqueKey,
    pub size: u64,
    pub usage: BufferUsage,
    resolved: RefCell<Option<Rc<Resource>>>,
}

impl BufferProxy {
    pub fn new(size: u64, usage: BufferUsage) -> Rc<Self> {
        Rc::new(Self {
            unique_key: UniqueKey::next(),
            size,
            usage,
            resolved: RefCell::new(None),
        })
    }

    pub fn resolve(&self, cache: &ResourceCache) -> Option<Rc<Resource>> {
        if let Some(r) = self.resolved.borrow().as_ref() {
            return Some(r.clone());
        }
        let found = cache.find_by_unique_key(&self.unique_key)?;
        *self.resolved.borrow_mut() = Some(found.clone());
        Some(found)
    }

    pub fn set_resolved(&self, resource: Rc<Resource>) {
        *self.resolved.borrow_mut() = Some(resource);
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.borrow().is_some()
    }
}
