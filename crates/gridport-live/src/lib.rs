#![forbid(unsafe_code)]

//! Live viewport subscription engine.
//!
//! # Role in Gridport
//! `gridport-live` keeps one streaming backend subscription synchronized
//! with whatever window of a table the user is looking at. Scroll events
//! arrive per frame; backend resubscription costs a server round trip.
//! This crate sits between the two: it coalesces viewport changes
//! through a trailing-edge throttle and reuses the open subscription for
//! pure scrolls, recreating it only when the table's structure (filters,
//! sorts, custom columns, table identity) actually changes.
//!
//! # Primary responsibilities
//! - **[`Throttle`]**: trailing-edge coalescing with a fixed burst
//!   deadline, driven by explicit `now` instants.
//! - **[`TableSource`] / [`TableSubscription`]**: the contract a
//!   transport layer implements to be driven by the controller.
//! - **[`ViewportController`]**: the subscription lifecycle state
//!   machine.
//!
//! # How it fits in the system
//! UI code feeds visible ranges and a [`TableConfig`] into
//! [`ViewportController::update`] and pumps the controller from its tick
//! loop. Row delivery flows through the table's own event channel; the
//! controller only manages the subscription's lifetime and window.

pub mod controller;
pub mod table;
pub mod throttle;

pub use controller::{
    ControllerConfig, SubscriptionEvent, ViewportController, ViewportRequest,
};
pub use table::{TableConfig, TableEvent, TableSource, TableSubscription};
pub use throttle::{DEFAULT_THROTTLE_WINDOW, Throttle};
