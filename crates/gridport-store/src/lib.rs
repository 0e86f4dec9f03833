#![forbid(unsafe_code)]

//! Reactive local-storage implementation of the table contract.
//!
//! # Role in Gridport
//! Where `gridport-live` windows a remote streaming table,
//! `gridport-store` serves the same contract (size, viewport page,
//! table- and item-level update notification) from a local keyed
//! document store with a live change feed. It backs surfaces like a
//! command history panel that want table semantics without a server.
//!
//! # Primary responsibilities
//! - **[`DocumentStore`] / [`MemoryStore`]**: the storage collaborator
//!   contract (indexed `find`, `put`, change feed) and its in-memory
//!   implementation.
//! - **[`QueryStore`]**: viewport and search state, background size and
//!   page refreshes with last-request-wins staleness protection, change
//!   feed fan-out, and item listeners with lazy backfill.
//! - **[`Snapshot`]**: multi-range page assembly for sparse selections.
//!
//! # How it fits in the system
//! Everything runs on the embedding application's single-threaded
//! executor; `QueryStore` takes a `LocalSpawner` at construction and
//! spawns its background refreshes there. Writes become visible through
//! the change feed, eventually, never synchronously with `put`.

pub mod document;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use document::{DocumentStore, FindQuery, Selector, compare_items};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
pub use store::{QueryStore, QueryUpdate, ViewportData};
