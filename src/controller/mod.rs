//! Controller module - paged loading, reordering and persistence scheduling
//!
//! This module contains the engine logic that sits between the data source
//! and the UI-bound model state. It is organized into submodules by
//! responsibility:
//!
//! - `dispatch`: Single-context dispatcher for UI-bound mutations
//! - `paged_list`: Refresh, explicit paging, background prefetch, moves
//! - `order_key`: Fractional order-key assignment
//! - `reorder`: Immediate and debounced reorder persistence

mod dispatch;
mod order_key;
mod paged_list;
mod reorder;

pub use dispatch::UiDispatcher;

pub use order_key::{assign_order_key, OrderKey};

pub use paged_list::{ListConfig, PagedListController, RefreshOutcome};

pub use reorder::ReorderScheduler;
