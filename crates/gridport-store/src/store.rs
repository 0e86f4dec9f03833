#![forbid(unsafe_code)]

//! Reactive query store over a keyed document store.
//!
//! # Design
//!
//! [`QueryStore`] serves the same size/viewport/update contract as the
//! live engine, but against a local [`DocumentStore`] with a change
//! feed. It keeps one viewport, a search-filtered document count, and a
//! cached page of rows. Every write to the backing store, its own or
//! anyone else's, arrives back through the feed and re-triggers the
//! size and page refreshes, so callers observe writes eventually rather
//! than synchronously.
//!
//! # Staleness
//!
//! Refreshes run as background tasks on the embedding application's
//! local executor and may resolve out of order. Each refresh kind
//! carries a monotonic request serial captured at issue time; a response
//! only lands if its serial is still the latest and the store is still
//! active. The last *request* wins, never the last response.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::executor::LocalSpawner;
use futures::future::try_join_all;
use futures::task::LocalSpawnExt;
use gridport_core::{
    CoreError, FilterConfig, KeyedListeners, ListenerGuard, Listeners, SortSpec, StorageItem,
    Viewport,
};
use tracing::{debug, error, trace};

use crate::document::{DocumentStore, FindQuery, Selector};
use crate::error::StoreError;
use crate::snapshot::Snapshot;

/// One fetched page of rows, tagged with the viewport that requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportData<T> {
    pub viewport: Viewport,
    pub items: Vec<T>,
}

/// Payload delivered to [`QueryStore::on_update`] listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryUpdate<T> {
    /// Count of documents matching the current search and filters.
    pub size: usize,
    /// The cached page, if one has been fetched for the current viewport.
    pub page: Option<ViewportData<T>>,
}

struct QueryState<T> {
    size: usize,
    viewport: Option<Viewport>,
    page: Option<ViewportData<T>>,
    filters: Vec<FilterConfig>,
    sorts: Vec<SortSpec>,
    reversed: bool,
    info_serial: u64,
    data_serial: u64,
    active: bool,
}

impl<T> QueryState<T> {
    fn new() -> Self {
        Self {
            size: 0,
            viewport: None,
            page: None,
            filters: Vec::new(),
            sorts: Vec::new(),
            reversed: false,
            info_serial: 0,
            data_serial: 0,
            active: true,
        }
    }

    fn selector(&self) -> Selector {
        Selector::Query {
            search: self.viewport.as_ref().and_then(|v| v.search.clone()),
            filters: self.filters.clone(),
        }
    }

    /// Full sort key list: configured sorts first, id last so the order
    /// is total even when every configured key ties.
    fn sort(&self) -> Vec<SortSpec> {
        let mut sort = self.sorts.clone();
        sort.push(if self.reversed {
            SortSpec::desc("id")
        } else {
            SortSpec::asc("id")
        });
        sort
    }
}

struct QueryStoreInner<S: DocumentStore> {
    name: String,
    store: S,
    spawner: LocalSpawner,
    state: RefCell<QueryState<S::Item>>,
    listeners: Listeners<QueryUpdate<S::Item>>,
    item_listeners: KeyedListeners<S::Item>,
}

impl<S: DocumentStore + 'static> QueryStoreInner<S> {
    fn spawn(inner: &Rc<Self>, task: impl Future<Output = ()> + 'static) {
        if let Err(err) = inner.spawner.spawn_local(task) {
            debug!(store = %inner.name, %err, "executor gone, refresh not spawned");
        }
    }

    fn spawn_refresh_info(inner: &Rc<Self>) {
        let weak = Rc::downgrade(inner);
        Self::spawn(inner, async move {
            if let Some(inner) = weak.upgrade() {
                inner.refresh_info().await;
            }
        });
    }

    fn spawn_refresh_data(inner: &Rc<Self>) {
        let weak = Rc::downgrade(inner);
        Self::spawn(inner, async move {
            if let Some(inner) = weak.upgrade() {
                inner.refresh_data().await;
            }
        });
    }

    fn spawn_refresh_item(inner: &Rc<Self>, id: String) {
        let weak = Rc::downgrade(inner);
        Self::spawn(inner, async move {
            if let Some(inner) = weak.upgrade()
                && let Err(err) = inner.find_item(&id).await
            {
                error!(store = %inner.name, %id, %err, "item backfill failed");
            }
        });
    }

    /// Recounts the documents matching the current search and filters.
    async fn refresh_info(&self) {
        let (serial, query) = {
            let mut state = self.state.borrow_mut();
            state.info_serial += 1;
            (state.info_serial, FindQuery::new(state.selector()))
        };

        let count = match self.store.find(query).await {
            Ok(docs) => docs.len(),
            Err(err) => {
                error!(store = %self.name, %err, "unable to refresh size");
                return;
            }
        };

        let update = {
            let mut state = self.state.borrow_mut();
            if !state.active || state.info_serial != serial {
                trace!(store = %self.name, "size response superseded, dropping");
                return;
            }
            state.size = count;
            QueryUpdate {
                size: count,
                page: state.page.clone(),
            }
        };
        self.listeners.notify(&update);
    }

    /// Refetches the page for the current viewport. The fetched page is
    /// returned even when it lost the race to a newer request; only the
    /// cache write and the fan-out are skipped then.
    async fn refresh_data(&self) -> Option<ViewportData<S::Item>> {
        let (serial, viewport, query) = {
            let mut state = self.state.borrow_mut();
            let viewport = state.viewport.clone()?;
            state.data_serial += 1;
            let query = FindQuery::new(state.selector())
                .with_sort(state.sort())
                .with_skip(viewport.top)
                .with_limit(viewport.row_count());
            (state.data_serial, viewport, query)
        };

        let items = match self.store.find(query).await {
            Ok(items) => items,
            Err(err) => {
                error!(store = %self.name, %err, "unable to refresh viewport data");
                return None;
            }
        };
        let page = ViewportData { viewport, items };

        let update = {
            let mut state = self.state.borrow_mut();
            if !state.active || state.data_serial != serial {
                trace!(store = %self.name, "viewport changed before page response, dropping");
                return Some(page);
            }
            state.page = Some(page.clone());
            QueryUpdate {
                size: state.size,
                page: state.page.clone(),
            }
        };
        self.listeners.notify(&update);
        Some(page)
    }

    /// Looks one document up by id and fans it out to its item listeners.
    async fn find_item(&self, id: &str) -> Result<Option<S::Item>, StoreError> {
        let query = FindQuery::new(Selector::Id(id.to_string())).with_limit(1);
        let item = self.store.find(query).await?.into_iter().next();
        if let Some(item) = &item
            && self.state.borrow().active
        {
            self.item_listeners.notify(item.id(), item);
        }
        Ok(item)
    }
}

/// A live, search- and filter-aware table over a [`DocumentStore`].
pub struct QueryStore<S: DocumentStore> {
    inner: Rc<QueryStoreInner<S>>,
    _feed: ListenerGuard,
}

impl<S: DocumentStore + 'static> QueryStore<S> {
    /// Opens a store named `name` (log context only) over `store`,
    /// subscribing to its change feed and spawning background refreshes
    /// on `spawner`. The initial size count is issued immediately.
    pub fn new(name: impl Into<String>, store: S, spawner: LocalSpawner) -> Self {
        let inner = Rc::new(QueryStoreInner {
            name: name.into(),
            store,
            spawner,
            state: RefCell::new(QueryState::new()),
            listeners: Listeners::new(),
            item_listeners: KeyedListeners::new(),
        });

        // The feed callback holds a weak handle so the document store's
        // registry never keeps this store alive.
        let weak = Rc::downgrade(&inner);
        let feed = inner.store.on_change(move |item: &S::Item| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.state.borrow().active {
                return;
            }
            debug!(store = %inner.name, id = %item.id(), "change received");
            QueryStoreInner::spawn_refresh_info(&inner);
            inner.item_listeners.notify(item.id(), item);
            QueryStoreInner::spawn_refresh_data(&inner);
        });

        QueryStoreInner::spawn_refresh_info(&inner);
        Self {
            inner,
            _feed: feed,
        }
    }

    /// Registers a table-level listener fired on size and page changes.
    pub fn on_update(
        &self,
        listener: impl Fn(&QueryUpdate<S::Item>) + 'static,
    ) -> ListenerGuard {
        self.inner.listeners.add(listener)
    }

    /// Registers an item-level listener and backfills it: the item's
    /// current value, if it exists, is looked up in the background and
    /// delivered once.
    pub fn on_item_update(
        &self,
        id: &str,
        listener: impl Fn(&S::Item) + 'static,
    ) -> ListenerGuard {
        let guard = self.inner.item_listeners.add(id, listener);
        QueryStoreInner::spawn_refresh_item(&self.inner, id.to_string());
        guard
    }

    /// Applies a new viewport and resolves to the freshly fetched page.
    ///
    /// Changing the search term invalidates the cached page before the
    /// size refresh is issued, so no reader ever observes data from the
    /// previous search. Resolves to `Ok(None)` for the `(0, 0)` sentinel
    /// and on a closed store.
    pub async fn set_viewport(
        &self,
        viewport: Viewport,
    ) -> Result<Option<ViewportData<S::Item>>, StoreError> {
        viewport.validate()?;
        if viewport.is_empty_sentinel() {
            trace!(store = %self.inner.name, "empty viewport sentinel ignored");
            return Ok(None);
        }
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.active {
                debug!(store = %self.inner.name, "set_viewport on closed store ignored");
                return Ok(None);
            }
            if viewport.search_differs(state.viewport.as_ref()) {
                state.page = None;
            }
            state.viewport = Some(viewport);
        }
        QueryStoreInner::spawn_refresh_info(&self.inner);
        Ok(self.inner.refresh_data().await)
    }

    /// Upserts one document. Visible state catches up through the change
    /// feed, not synchronously with this call.
    pub async fn put(&self, item: S::Item) -> Result<S::Item, StoreError> {
        if !self.inner.state.borrow().active {
            debug!(store = %self.inner.name, id = %item.id(), "put on closed store ignored");
            return Ok(item);
        }
        self.inner.store.put(item).await
    }

    /// Fetches several disjoint inclusive index ranges concurrently,
    /// waits for all of them, and assembles one [`Snapshot`]. Requires
    /// an established viewport for its search and sort context.
    pub async fn get_snapshot(
        &self,
        ranges: &[(usize, usize)],
    ) -> Result<Snapshot<S::Item>, StoreError> {
        let (selector, sort) = {
            let state = self.inner.state.borrow();
            if state.viewport.is_none() {
                return Err(StoreError::NoViewport);
            }
            (state.selector(), state.sort())
        };
        for &(from, to) in ranges {
            if to < from {
                return Err(CoreError::InvalidViewport {
                    top: from,
                    bottom: to,
                }
                .into());
            }
        }

        let fetches = ranges.iter().map(|&(from, to)| {
            self.inner.store.find(
                FindQuery::new(selector.clone())
                    .with_sort(sort.clone())
                    .with_skip(from)
                    .with_limit(to - from + 1),
            )
        });
        let pages = try_join_all(fetches).await?;
        Ok(Snapshot::assemble(ranges, pages))
    }

    /// Re-reads one document and fans it out to its item listeners.
    pub async fn refresh_item(&self, id: &str) -> Result<Option<S::Item>, StoreError> {
        self.inner.find_item(id).await
    }

    /// Flips between ascending and descending id order. Always clears
    /// the cached page and refetches, regardless of the search term.
    pub fn set_reversed(&self, reversed: bool) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.active {
                debug!(store = %self.inner.name, "set_reversed on closed store ignored");
                return;
            }
            state.reversed = reversed;
            state.page = None;
        }
        QueryStoreInner::spawn_refresh_data(&self.inner);
    }

    /// Replaces the configured sort keys and refetches the page.
    pub fn set_sorts(&self, sorts: Vec<SortSpec>) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.active {
                debug!(store = %self.inner.name, "set_sorts on closed store ignored");
                return;
            }
            state.sorts = sorts;
            state.page = None;
        }
        QueryStoreInner::spawn_refresh_data(&self.inner);
    }

    /// Replaces the filter configs; both the size and the page refetch.
    pub fn set_filters(&self, filters: Vec<FilterConfig>) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.active {
                debug!(store = %self.inner.name, "set_filters on closed store ignored");
                return;
            }
            state.filters = filters;
            state.page = None;
        }
        QueryStoreInner::spawn_refresh_info(&self.inner);
        QueryStoreInner::spawn_refresh_data(&self.inner);
    }

    /// Count of documents matching the current search and filters.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.state.borrow().size
    }

    /// The last applied viewport.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.inner.state.borrow().viewport.clone()
    }

    /// The cached page for the current viewport, if a fetch has landed.
    #[must_use]
    pub fn data(&self) -> Option<ViewportData<S::Item>> {
        self.inner.state.borrow().page.clone()
    }

    /// Drops all listeners and makes the store inert. In-flight refresh
    /// responses are discarded when they land.
    pub fn close(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.active {
                return;
            }
            state.active = false;
            state.viewport = None;
            state.page = None;
        }
        self.inner.listeners.clear();
        self.inner.item_listeners.clear();
        debug!(store = %self.inner.name, "store closed");
    }
}
