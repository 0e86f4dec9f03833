#![forbid(unsafe_code)]

//! Document store contract and query vocabulary.
//!
//! # Design
//!
//! The query store talks to its backing storage through [`DocumentStore`],
//! an indexed keyed document table with a live change feed. Queries are
//! described by [`FindQuery`]: a [`Selector`] picking documents, a sort
//! key list applied in order, and skip/limit paging. The contract is
//! single-threaded: futures returned by `find` and `put` are not `Send`
//! and run on the embedding application's local executor.

use std::cmp::Ordering;

use gridport_core::{FilterConfig, ListenerGuard, SortSpec, StorageItem};

use crate::error::StoreError;

/// Which documents a [`FindQuery`] addresses.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Exactly the document with this id, system rows included.
    Id(String),
    /// Every user document matching the search term and all filter
    /// configs. Ids with a leading underscore are reserved for internal
    /// bookkeeping rows and never match.
    Query {
        search: Option<String>,
        filters: Vec<FilterConfig>,
    },
}

impl Selector {
    /// Evaluates the selector against one document.
    ///
    /// The search term is a case-insensitive literal substring match on
    /// the document's name; an empty or absent term matches every name.
    #[must_use]
    pub fn matches<T: StorageItem>(&self, item: &T) -> bool {
        match self {
            Selector::Id(id) => item.id() == id,
            Selector::Query { search, filters } => {
                if item.id().starts_with('_') {
                    return false;
                }
                if let Some(term) = search.as_deref()
                    && !term.is_empty()
                    && !item
                        .name()
                        .to_lowercase()
                        .contains(&term.to_lowercase())
                {
                    return false;
                }
                filters.iter().all(|config| config.matches(item))
            }
        }
    }
}

/// One indexed page request against a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub selector: Selector,
    pub sort: Vec<SortSpec>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindQuery {
    /// Unsorted, unpaged query: every match, in the store's own order.
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            sort: Vec::new(),
            skip: 0,
            limit: None,
        }
    }

    /// Orders results by `sort`, applied left to right.
    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    /// Skips the first `skip` matches after sorting.
    #[must_use]
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Caps the result at `limit` documents.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Orders two documents by a sort key list, first non-equal key wins.
#[must_use]
pub fn compare_items<T: StorageItem>(a: &T, b: &T, sorts: &[SortSpec]) -> Ordering {
    for sort in sorts {
        let ord = sort.compare(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// A keyed document table with a live change feed.
///
/// Implementations answer indexed [`find`](DocumentStore::find) queries,
/// upsert whole documents, and fan every upserted document out on the
/// change feed, including the store's own writes. [`crate::MemoryStore`]
/// is the provided implementation; a persistent embedded store satisfies
/// the same contract.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    type Item: StorageItem;

    /// Runs one query and resolves to the matching page of documents.
    async fn find(&self, query: FindQuery) -> Result<Vec<Self::Item>, StoreError>;

    /// Upserts one document and resolves to the stored value. The change
    /// feed fires for the written document.
    async fn put(&self, item: Self::Item) -> Result<Self::Item, StoreError>;

    /// Subscribes to the change feed. Dropping the guard unsubscribes.
    fn on_change(&self, listener: impl Fn(&Self::Item) + 'static) -> ListenerGuard;
}
