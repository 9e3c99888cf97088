//! Bulk price grid: optimistic local edits with debounced, per-row autosave.

pub mod controller;
pub mod registry;

pub use controller::{GridController, GridTimings};
pub use registry::{RowRegistry, SaveStatus};
