#![forbid(unsafe_code)]

//! Viewport subscription lifecycle.
//!
//! # Design
//!
//! One controller owns zero or one live subscription against one table.
//! Structural changes (filters, sorts, custom columns, table identity)
//! close the subscription and push the new config onto the table before
//! the next viewport opens a fresh one; pure scrolls reuse the open
//! subscription's own viewport update. All viewport traffic funnels
//! through the trailing-edge [`Throttle`], so a scroll burst costs one
//! backend call.
//!
//! The controller is pumped, not timer-driven: owners call
//! [`ViewportController::pump`] from their tick loop (or
//! [`ViewportController::flush`] when they cannot wait) and the due
//! request is applied there.
//!
//! # Invariants
//!
//! 1. Structural handling happens-before viewport (re)application in the
//!    same update cycle.
//! 2. A pure scroll never closes or recreates the subscription.
//! 3. The `(0, 0)` sentinel and inverted windows never reach the
//!    backend.
//! 4. `Closed` is terminal; disposal cancels pending work exactly once.

use gridport_core::{
    COLUMN_BUFFER_PAGES, ColumnMove, ListenerGuard, Listeners, ROW_BUFFER_PAGES, column_range,
    row_range,
};
use tracing::{debug, error, trace};
use web_time::{Duration, Instant};

use crate::table::{TableConfig, TableSource, TableSubscription};
use crate::throttle::{DEFAULT_THROTTLE_WINDOW, Throttle};

/// A viewport change routed through the controller.
///
/// Row bounds are inclusive visible rows; column bounds are optional
/// (absent means subscribe to every column). `moves` is the user's
/// column-drag history, applied when resolving visible columns to model
/// columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewportRequest {
    pub top: usize,
    pub bottom: usize,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub moves: Vec<ColumnMove>,
}

impl ViewportRequest {
    /// Row-only request.
    #[must_use]
    pub fn rows(top: usize, bottom: usize) -> Self {
        Self {
            top,
            bottom,
            ..Self::default()
        }
    }

    /// Request with visible column bounds.
    #[must_use]
    pub fn with_columns(top: usize, bottom: usize, left: usize, right: usize) -> Self {
        Self {
            top,
            bottom,
            left: Some(left),
            right: Some(right),
            ..Self::default()
        }
    }

    /// Attaches the column-drag history.
    #[must_use]
    pub fn with_moves(mut self, moves: Vec<ColumnMove>) -> Self {
        self.moves = moves;
        self
    }
}

/// Tuning knobs. Defaults: 150 ms window, 3 row buffer pages, 1 column
/// buffer page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub throttle_window: Duration,
    pub row_buffer_pages: usize,
    pub column_buffer_pages: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            throttle_window: DEFAULT_THROTTLE_WINDOW,
            row_buffer_pages: ROW_BUFFER_PAGES,
            column_buffer_pages: COLUMN_BUFFER_PAGES,
        }
    }
}

/// Emitted when the live subscription opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Opened,
    Closed,
}

enum SubscriptionState<S> {
    /// No live subscription; the next applied viewport opens one.
    None,
    /// One live subscription; pure scrolls move its window in place.
    Active(S),
    /// Disposed. Terminal.
    Closed,
}

impl<S> SubscriptionState<S> {
    fn take_active(&mut self) -> Option<S> {
        match std::mem::replace(self, SubscriptionState::None) {
            SubscriptionState::Active(subscription) => Some(subscription),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Owns the one live subscription for a single backing table.
pub struct ViewportController<T: TableSource> {
    table: T,
    config: ControllerConfig,
    state: SubscriptionState<T::Subscription>,
    throttle: Throttle<ViewportRequest>,
    /// Revision of the last config pushed onto the table. `None` forces
    /// a config push on the next update (fresh controller, new table).
    pushed_revision: Option<u64>,
    subscription_listeners: Listeners<SubscriptionEvent>,
}

impl<T: TableSource> ViewportController<T> {
    #[must_use]
    pub fn new(table: T) -> Self {
        Self::with_config(table, ControllerConfig::default())
    }

    #[must_use]
    pub fn with_config(table: T, config: ControllerConfig) -> Self {
        let throttle = Throttle::new(config.throttle_window);
        Self {
            table,
            config,
            state: SubscriptionState::None,
            throttle,
            pushed_revision: None,
            subscription_listeners: Listeners::new(),
        }
    }

    /// Registers for open/close notifications on the live subscription.
    pub fn on_subscription(
        &self,
        listener: impl Fn(&SubscriptionEvent) + 'static,
    ) -> ListenerGuard {
        self.subscription_listeners.add(listener)
    }

    /// Applies one update cycle: structural config first, then the
    /// viewport request through the throttle.
    ///
    /// A revision change is structural. The live subscription closes and
    /// the new filters, sorts, and custom columns are pushed onto the
    /// table here, synchronously, so the subscription that eventually
    /// opens sees the new shape. The viewport request itself lands when
    /// [`pump`](Self::pump) or [`flush`](Self::flush) drains the
    /// throttle.
    pub fn update(&mut self, table_config: &TableConfig, request: ViewportRequest, now: Instant) {
        if matches!(self.state, SubscriptionState::Closed) {
            debug!("update on disposed controller ignored");
            return;
        }
        if self.pushed_revision != Some(table_config.revision) {
            debug!(
                revision = table_config.revision,
                "structural change, closing subscription"
            );
            self.close_active();
            self.table.apply_filters(&table_config.filters);
            self.table.apply_sorts(&table_config.sorts);
            self.table.apply_custom_columns(&table_config.custom_columns);
            self.pushed_revision = Some(table_config.revision);
        }
        self.throttle.schedule(now, request);
    }

    /// Drains the throttle if its window elapsed, applying the due
    /// request to the backend.
    pub fn pump(&mut self, now: Instant) {
        if let Some(request) = self.throttle.poll(now) {
            self.apply(request);
        }
    }

    /// Applies any pending request immediately.
    pub fn flush(&mut self) {
        if let Some(request) = self.throttle.flush() {
            self.apply(request);
        }
    }

    /// Swaps the backing table. Structural by definition: the old
    /// subscription closes now, and the next update re-pushes the
    /// current config onto the new table before subscribing.
    pub fn replace_table(&mut self, table: T) {
        if matches!(self.state, SubscriptionState::Closed) {
            debug!("replace_table on disposed controller ignored");
            return;
        }
        debug!("table replaced, closing subscription");
        self.close_active();
        self.table = table;
        self.pushed_revision = None;
    }

    /// Cancels pending work, closes any live subscription, and makes the
    /// controller inert. Terminal and idempotent.
    pub fn dispose(&mut self) {
        if matches!(self.state, SubscriptionState::Closed) {
            return;
        }
        self.close_active();
        self.state = SubscriptionState::Closed;
        debug!("controller disposed");
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, SubscriptionState::Active(_))
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, SubscriptionState::Closed)
    }

    /// True when a scheduled request is waiting for its window.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.throttle.is_pending()
    }

    /// When the pending request becomes due, for owners scheduling their
    /// next pump.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    #[must_use]
    pub fn table(&self) -> &T {
        &self.table
    }

    fn close_active(&mut self) {
        self.throttle.cancel();
        if let Some(subscription) = self.state.take_active() {
            subscription.close();
            self.subscription_listeners.notify(&SubscriptionEvent::Closed);
        }
    }

    fn apply(&mut self, request: ViewportRequest) {
        if matches!(self.state, SubscriptionState::Closed) {
            debug!("viewport update on disposed controller ignored");
            return;
        }
        if request.bottom < request.top {
            error!(
                top = request.top,
                bottom = request.bottom,
                "invalid viewport"
            );
            return;
        }
        if request.top == 0 && request.bottom == 0 {
            trace!("ignoring empty viewport sentinel");
            return;
        }

        let (top, bottom) = row_range(request.top, request.bottom, self.config.row_buffer_pages);
        let columns = column_range(
            request.left,
            request.right,
            self.table.column_count(),
            &request.moves,
            self.config.column_buffer_pages,
        );
        trace!(top, bottom, "applying buffered viewport");

        if let SubscriptionState::Active(subscription) = &self.state {
            subscription.set_viewport(top, bottom, columns.as_deref());
            return;
        }
        let subscription = self.table.set_viewport(top, bottom, columns.as_deref());
        self.state = SubscriptionState::Active(subscription);
        self.subscription_listeners.notify(&SubscriptionEvent::Opened);
    }
}
