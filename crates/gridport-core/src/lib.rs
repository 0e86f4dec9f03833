#![forbid(unsafe_code)]

//! Core vocabulary for the Gridport viewport engine.
//!
//! # Role in Gridport
//! `gridport-core` holds the pure, dependency-light pieces every other
//! crate builds on: viewport geometry, buffered range math, column
//! move-map resolution, the typed filter/sort vocabulary, the storage
//! item contract, and the listener registries used for change fan-out.
//!
//! # Primary responsibilities
//! - **Viewport**: the requested row/column window, with its validity
//!   rules and the `(0, 0)` "no viewport" sentinel.
//! - **Range buffering**: padding a visible range by whole pages so
//!   nearby scrolls land inside already-subscribed data.
//! - **Column resolution**: mapping visual column indices back to model
//!   indices through a list of user column drags.
//! - **Filters and sorts**: a Mango-flavored operator set evaluated in
//!   process against item fields.
//! - **Listener registries**: append-ordered callback sets with RAII
//!   unsubscription and snapshot-copy fan-out.
//!
//! # How it fits in the system
//! `gridport-live` drives a remote backing table through this vocabulary;
//! `gridport-store` implements the same storage-table contract over a
//! local document store. Neither adds geometry or predicate logic of its
//! own; it all lives here.

pub mod columns;
pub mod error;
pub mod filter;
pub mod item;
pub mod notify;
pub mod range;
pub mod viewport;

pub use columns::{ColumnMove, model_index};
pub use error::CoreError;
pub use filter::{FilterConfig, FilterJoin, FilterOp, FilterSpec, SortDirection, SortSpec};
pub use item::{Field, StorageItem};
pub use notify::{KeyedListeners, ListenerGuard, Listeners};
pub use range::{COLUMN_BUFFER_PAGES, ROW_BUFFER_PAGES, column_range, row_range};
pub use viewport::Viewport;
