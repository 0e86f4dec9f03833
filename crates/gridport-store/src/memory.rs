#![forbid(unsafe_code)]

//! In-memory document store.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gridport_core::{ListenerGuard, Listeners, StorageItem};

use crate::document::{DocumentStore, FindQuery, compare_items};
use crate::error::StoreError;

struct MemoryStoreInner<T: 'static> {
    docs: RefCell<BTreeMap<String, T>>,
    feed: Listeners<T>,
}

/// A [`DocumentStore`] holding its documents in process memory.
///
/// Documents live in a `BTreeMap` keyed by id, so an unsorted query
/// returns them in id order. `find` evaluates the selector, sort, skip,
/// and limit in process; `put` upserts and fans the document out on the
/// change feed synchronously. Cloning the store clones a handle to the
/// same table.
pub struct MemoryStore<T: StorageItem> {
    inner: Rc<MemoryStoreInner<T>>,
}

impl<T: StorageItem> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: StorageItem> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StorageItem> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(MemoryStoreInner {
                docs: RefCell::new(BTreeMap::new()),
                feed: Listeners::new(),
            }),
        }
    }

    /// Seeds the table without firing the change feed, for pre-populated
    /// fixtures and migration imports.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let store = Self::new();
        {
            let mut docs = store.inner.docs.borrow_mut();
            for item in items {
                docs.insert(item.id().to_string(), item);
            }
        }
        store
    }

    /// Number of documents in the table, system rows included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.docs.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: StorageItem> DocumentStore for MemoryStore<T> {
    type Item = T;

    async fn find(&self, query: FindQuery) -> Result<Vec<T>, StoreError> {
        let mut matched: Vec<T> = {
            let docs = self.inner.docs.borrow();
            docs.values()
                .filter(|item| query.selector.matches(*item))
                .cloned()
                .collect()
        };
        // Stable sort: documents equal under the key list keep id order.
        matched.sort_by(|a, b| compare_items(a, b, &query.sort));
        let page = matched
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(page)
    }

    async fn put(&self, item: T) -> Result<T, StoreError> {
        self.inner
            .docs
            .borrow_mut()
            .insert(item.id().to_string(), item.clone());
        self.inner.feed.notify(&item);
        Ok(item)
    }

    fn on_change(&self, listener: impl Fn(&T) + 'static) -> ListenerGuard {
        self.inner.feed.add(listener)
    }
}
