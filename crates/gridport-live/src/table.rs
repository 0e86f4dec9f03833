#![forbid(unsafe_code)]

//! Backend table contract.
//!
//! The transport layer implements these traits; the controller drives
//! them. A [`TableSource`] owns structural state (filters, sorts, custom
//! columns) and opens streaming viewport subscriptions. A
//! [`TableSubscription`] is one open stream whose window can be moved in
//! place, without the server cost of closing and reopening.
//!
//! Methods take `&self`: implementations are expected to use interior
//! mutability (the whole engine is single-threaded), which lets a table
//! handle be shared between the controller and event consumers.

use std::rc::Rc;

use gridport_core::{FilterConfig, ListenerGuard, SortSpec};

/// Structural configuration pushed onto a table before subscribing.
///
/// `revision` is bumped by the caller whenever filters, sorts, or custom
/// columns change. The controller compares revisions to detect
/// structural changes; it never compares the collections themselves, so
/// callers stay in control of what counts as a change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableConfig {
    pub filters: Vec<FilterConfig>,
    pub sorts: Vec<SortSpec>,
    pub custom_columns: Vec<String>,
    pub revision: u64,
}

impl TableConfig {
    /// Marks the config structurally changed.
    pub fn bump(&mut self) {
        self.revision += 1;
    }
}

/// Events a live table emits while a subscription is open.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent<R> {
    /// A block of rows landed, starting at absolute row `offset`.
    Updated { offset: usize, rows: Vec<R> },
    /// The server-side filter set changed.
    FilterChanged,
}

/// One open streaming viewport.
pub trait TableSubscription {
    /// Moves the stream's window. `columns: None` keeps every column.
    fn set_viewport(&self, top: usize, bottom: usize, columns: Option<&[usize]>);

    /// Closes the stream. Consuming: a closed subscription cannot be
    /// touched again.
    fn close(self);
}

/// A live backing table.
pub trait TableSource {
    type Row;
    type Subscription: TableSubscription;

    fn apply_filters(&self, filters: &[FilterConfig]);

    fn apply_sorts(&self, sorts: &[SortSpec]);

    fn apply_custom_columns(&self, columns: &[String]);

    /// Column count after custom columns are applied.
    fn column_count(&self) -> usize;

    /// Opens a streaming subscription over the given buffered window.
    fn set_viewport(&self, top: usize, bottom: usize, columns: Option<&[usize]>)
    -> Self::Subscription;

    /// Registers for row delivery and filter-change events.
    fn on_event(&self, listener: impl Fn(&TableEvent<Self::Row>) + 'static) -> ListenerGuard;
}

// A shared handle drives the same table; lets UI code keep listening on
// the table while the controller owns the Rc.
impl<T: TableSource> TableSource for Rc<T> {
    type Row = T::Row;
    type Subscription = T::Subscription;

    fn apply_filters(&self, filters: &[FilterConfig]) {
        (**self).apply_filters(filters);
    }

    fn apply_sorts(&self, sorts: &[SortSpec]) {
        (**self).apply_sorts(sorts);
    }

    fn apply_custom_columns(&self, columns: &[String]) {
        (**self).apply_custom_columns(columns);
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn set_viewport(
        &self,
        top: usize,
        bottom: usize,
        columns: Option<&[usize]>,
    ) -> Self::Subscription {
        (**self).set_viewport(top, bottom, columns)
    }

    fn on_event(&self, listener: impl Fn(&TableEvent<Self::Row>) + 'static) -> ListenerGuard {
        (**self).on_event(listener)
    }
}
