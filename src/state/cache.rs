//! Cached collection patching shared by every domain store.
//!
//! DESIGN
//! ======
//! Collections are `Option<Vec<T>>`: `None` means "never fetched", which is
//! different from an empty list. Only `replace_all` turns `None` into `Some`;
//! mutations patch a present collection and leave an absent one absent, so a
//! create before the first fetch does not fabricate a one-item list.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use crate::net::types::{Shelter, Subscription};

/// Anything cached by numeric id.
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for Shelter {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Subscription {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Replace the whole collection with a fresh fetch. Never merges.
pub fn replace_all<T>(cache: &mut Option<Vec<T>>, items: Vec<T>) {
    *cache = Some(items);
}

/// Append a created record to a present collection.
pub fn append_if_present<T>(cache: &mut Option<Vec<T>>, item: T) {
    if let Some(items) = cache.as_mut() {
        items.push(item);
    }
}

/// Swap in `item` wherever an entry has the same id. Returns the number of
/// entries replaced.
pub fn replace_matching<T: Identified + Clone>(cache: &mut Option<Vec<T>>, item: &T) -> usize {
    let Some(items) = cache.as_mut() else {
        return 0;
    };
    let id = item.id();
    let mut replaced = 0;
    for slot in items.iter_mut().filter(|slot| slot.id() == id) {
        *slot = item.clone();
        replaced += 1;
    }
    replaced
}

/// Drop entries with `id`, keeping the rest in order. Returns the number removed.
pub fn remove_by_id<T: Identified>(cache: &mut Option<Vec<T>>, id: i64) -> usize {
    let Some(items) = cache.as_mut() else {
        return 0;
    };
    let before = items.len();
    items.retain(|item| item.id() != id);
    before - items.len()
}
