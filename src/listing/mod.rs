//! Paged list screens: filter query building and debounced reloads.

pub mod controller;
pub mod query;

pub use controller::{ListController, ListTimings, ListView};
pub use query::{ListQuery, Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
