//! E2E tests for the viewport controller against a fake streaming
//! backend.
//!
//! Exercises the full lifecycle: config push, subscription open, row
//! delivery through the table's event channel, pure-scroll reuse,
//! structural close-and-recreate, backend clamping of the padded bottom,
//! and disposal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gridport_core::{FilterConfig, FilterOp, FilterSpec, ListenerGuard, Listeners, SortSpec};
use gridport_live::{
    ControllerConfig, TableConfig, TableEvent, TableSource, TableSubscription, ViewportController,
    ViewportRequest,
};
use web_time::{Duration, Instant};

const WINDOW: Duration = Duration::from_millis(150);

// ============================================================================
// Fake backend
// ============================================================================

type Window = (usize, usize, Option<Vec<usize>>);

struct FakeInner {
    rows: Vec<String>,
    filters: RefCell<Vec<FilterConfig>>,
    sorts: RefCell<Vec<SortSpec>>,
    custom_columns: RefCell<Vec<String>>,
    events: Listeners<TableEvent<String>>,
    opened: Cell<usize>,
    closed: Cell<usize>,
    last_window: RefCell<Option<Window>>,
}

impl FakeInner {
    /// Emits the requested rows, clamping the bottom to the rows that
    /// exist, the way a real table service answers an over-long request.
    fn deliver(&self, top: usize, bottom: usize) {
        let Some(last) = self.rows.len().checked_sub(1) else {
            return;
        };
        let bottom = bottom.min(last);
        if top > bottom {
            return;
        }
        self.events.notify(&TableEvent::Updated {
            offset: top,
            rows: self.rows[top..=bottom].to_vec(),
        });
    }
}

/// Cheap-clone handle, like a real transport's table handle.
#[derive(Clone)]
struct FakeTable {
    inner: Rc<FakeInner>,
}

impl FakeTable {
    fn with_rows(count: usize) -> Self {
        Self {
            inner: Rc::new(FakeInner {
                rows: (0..count).map(|i| format!("row-{i}")).collect(),
                filters: RefCell::new(Vec::new()),
                sorts: RefCell::new(Vec::new()),
                custom_columns: RefCell::new(Vec::new()),
                events: Listeners::new(),
                opened: Cell::new(0),
                closed: Cell::new(0),
                last_window: RefCell::new(None),
            }),
        }
    }
}

struct FakeSubscription {
    inner: Rc<FakeInner>,
}

impl TableSubscription for FakeSubscription {
    fn set_viewport(&self, top: usize, bottom: usize, columns: Option<&[usize]>) {
        *self.inner.last_window.borrow_mut() = Some((top, bottom, columns.map(<[usize]>::to_vec)));
        self.inner.deliver(top, bottom);
    }

    fn close(self) {
        self.inner.closed.set(self.inner.closed.get() + 1);
    }
}

impl TableSource for FakeTable {
    type Row = String;
    type Subscription = FakeSubscription;

    fn apply_filters(&self, filters: &[FilterConfig]) {
        *self.inner.filters.borrow_mut() = filters.to_vec();
        self.inner.events.notify(&TableEvent::FilterChanged);
    }

    fn apply_sorts(&self, sorts: &[SortSpec]) {
        *self.inner.sorts.borrow_mut() = sorts.to_vec();
    }

    fn apply_custom_columns(&self, columns: &[String]) {
        *self.inner.custom_columns.borrow_mut() = columns.to_vec();
    }

    fn column_count(&self) -> usize {
        8
    }

    fn set_viewport(
        &self,
        top: usize,
        bottom: usize,
        columns: Option<&[usize]>,
    ) -> FakeSubscription {
        self.inner.opened.set(self.inner.opened.get() + 1);
        *self.inner.last_window.borrow_mut() = Some((top, bottom, columns.map(<[usize]>::to_vec)));
        self.inner.deliver(top, bottom);
        FakeSubscription {
            inner: Rc::clone(&self.inner),
        }
    }

    fn on_event(&self, listener: impl Fn(&TableEvent<String>) + 'static) -> ListenerGuard {
        self.inner.events.add(listener)
    }
}

/// Collects delivered row batches as (offset, first, len) triples.
fn collect_batches(table: &FakeTable) -> (Rc<RefCell<Vec<(usize, String, usize)>>>, ListenerGuard) {
    let batches = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&batches);
    let guard = table.on_event(move |event| {
        if let TableEvent::Updated { offset, rows } = event {
            sink.borrow_mut()
                .push((*offset, rows[0].clone(), rows.len()));
        }
    });
    (batches, guard)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn full_lifecycle_open_scroll_restructure_dispose() {
    let table = FakeTable::with_rows(1000);
    let handle = table.clone();
    let mut controller = ViewportController::new(table);
    let t0 = Instant::now();

    // Open: 0..=50 visible pads to 0..=200 with the default three pages.
    controller.update(&TableConfig::default(), ViewportRequest::rows(0, 50), t0);
    controller.pump(t0 + WINDOW);
    assert_eq!(handle.inner.opened.get(), 1);
    assert_eq!(
        *handle.inner.last_window.borrow(),
        Some((0, 200, None))
    );

    // Pure scroll: reuse, never reopen.
    let t1 = t0 + WINDOW;
    controller.update(&TableConfig::default(), ViewportRequest::rows(100, 150), t1);
    controller.pump(t1 + WINDOW);
    assert_eq!(handle.inner.opened.get(), 1);
    assert_eq!(handle.inner.closed.get(), 0);
    assert_eq!(
        *handle.inner.last_window.borrow(),
        Some((0, 300, None))
    );

    // Structural change: close, re-push, reopen.
    let mut config = TableConfig::default();
    config.filters = vec![FilterConfig::new(FilterSpec::new(
        "name",
        FilterOp::Contains,
        "row",
    ))];
    config.bump();
    let t2 = t1 + WINDOW;
    controller.update(&config, ViewportRequest::rows(100, 150), t2);
    assert_eq!(handle.inner.closed.get(), 1);
    controller.pump(t2 + WINDOW);
    assert_eq!(handle.inner.opened.get(), 2);
    assert_eq!(handle.inner.filters.borrow().len(), 1);

    // Dispose: close the live subscription, refuse further work.
    controller.dispose();
    assert_eq!(handle.inner.closed.get(), 2);
    controller.update(&config, ViewportRequest::rows(0, 50), t2 + WINDOW);
    controller.flush();
    assert_eq!(handle.inner.opened.get(), 2);
}

#[test]
fn rows_flow_through_the_event_channel() {
    let table = FakeTable::with_rows(1000);
    let handle = table.clone();
    let (batches, _guard) = collect_batches(&handle);
    let mut controller = ViewportController::new(table);
    let t0 = Instant::now();

    controller.update(&TableConfig::default(), ViewportRequest::rows(0, 50), t0);
    controller.flush();

    assert_eq!(
        *batches.borrow(),
        vec![(0, "row-0".to_string(), 201)]
    );

    controller.update(&TableConfig::default(), ViewportRequest::rows(100, 150), t0);
    controller.flush();

    assert_eq!(
        batches.borrow().last().cloned(),
        Some((0, "row-0".to_string(), 301))
    );
}

#[test]
fn filter_push_reaches_event_consumers() {
    let table = FakeTable::with_rows(100);
    let handle = table.clone();
    let filter_changes = Rc::new(Cell::new(0));
    let sink = Rc::clone(&filter_changes);
    let _guard = handle.on_event(move |event| {
        if matches!(event, TableEvent::FilterChanged) {
            sink.set(sink.get() + 1);
        }
    });
    let mut controller = ViewportController::new(table);
    let t0 = Instant::now();

    // Initial config push applies the (empty) filter set once.
    controller.update(&TableConfig::default(), ViewportRequest::rows(0, 20), t0);
    controller.flush();
    assert_eq!(filter_changes.get(), 1);

    let mut config = TableConfig::default();
    config.filters = vec![FilterConfig::new(FilterSpec::new(
        "name",
        FilterOp::ContainsIgnoreCase,
        "ROW",
    ))];
    config.bump();
    controller.update(&config, ViewportRequest::rows(0, 20), t0);
    controller.flush();
    assert_eq!(filter_changes.get(), 2);
}

// ============================================================================
// Backend clamping
// ============================================================================

#[test]
fn padded_bottom_is_clamped_by_the_backend() {
    let table = FakeTable::with_rows(1000);
    let handle = table.clone();
    let (batches, _guard) = collect_batches(&handle);
    let mut controller = ViewportController::new(table);
    let t0 = Instant::now();

    // 950..=999 visible: height 49, padded to 803..=1146. The request
    // goes out unclamped; the backend serves only rows that exist.
    controller.update(&TableConfig::default(), ViewportRequest::rows(950, 999), t0);
    controller.flush();

    assert_eq!(
        *handle.inner.last_window.borrow(),
        Some((803, 1146, None))
    );
    assert_eq!(
        *batches.borrow(),
        vec![(803, "row-803".to_string(), 197)]
    );
}

// ============================================================================
// Tick-loop pacing
// ============================================================================

#[test]
fn deadline_guides_the_owners_next_pump() {
    let table = FakeTable::with_rows(100);
    let handle = table.clone();
    let mut controller = ViewportController::with_config(
        table,
        ControllerConfig {
            throttle_window: Duration::from_millis(40),
            ..ControllerConfig::default()
        },
    );
    let t0 = Instant::now();

    controller.update(&TableConfig::default(), ViewportRequest::rows(0, 20), t0);
    let deadline = controller.next_deadline().expect("request pending");
    assert_eq!(deadline, t0 + Duration::from_millis(40));

    controller.pump(deadline - Duration::from_millis(1));
    assert_eq!(handle.inner.opened.get(), 0);

    controller.pump(deadline);
    assert_eq!(handle.inner.opened.get(), 1);
    assert!(controller.next_deadline().is_none());
}
