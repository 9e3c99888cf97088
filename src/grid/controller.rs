use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, PriceSource};
use crate::dtos::price::PricePatch;
use crate::grid::registry::{RowRegistry, SaveOutcome, SaveStatus};
use crate::listing::ListQuery;
use crate::models::price::{PriceField, PriceId, PriceRow, RatioSet};
use crate::pricing::parse_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTimings {
    /// Quiet period after the last edit before a row is saved.
    pub save_debounce: Duration,
    /// How long a row shows the saved confirmation.
    pub success_display: Duration,
}

impl Default for GridTimings {
    fn default() -> Self {
        Self {
            save_debounce: Duration::from_secs(2),
            success_display: Duration::from_secs(2),
        }
    }
}

#[derive(Default)]
struct GridState {
    rows: Vec<PriceRow>,
    index: HashMap<PriceId, usize>,
    ratios: RatioSet,
    registry: RowRegistry,
    page_error: Option<String>,
    load_seq: u64,
}

impl GridState {
    fn row_mut(&mut self, price_id: PriceId) -> Option<&mut PriceRow> {
        let idx = *self.index.get(&price_id)?;
        self.rows.get_mut(idx)
    }
}

struct GridInner<S> {
    source: S,
    timings: GridTimings,
    state: Mutex<GridState>,
}

impl<S> GridInner<S> {
    fn lock(&self) -> MutexGuard<'_, GridState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the rows of one loaded price page and their autosave pipeline.
///
/// Cloning is cheap; clones share the same grid. Edits spawn tokio timers, so
/// they must be made from within a runtime.
pub struct GridController<S> {
    inner: Arc<GridInner<S>>,
}

impl<S> Clone for GridController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PriceSource> GridController<S> {
    pub fn new(source: S) -> Self {
        Self::with_timings(source, GridTimings::default())
    }

    pub fn with_timings(source: S, timings: GridTimings) -> Self {
        Self {
            inner: Arc::new(GridInner {
                source,
                timings,
                state: Mutex::new(GridState::default()),
            }),
        }
    }

    /// Fetches a page and replaces every row with it.
    ///
    /// On failure the previous rows stay on screen and the error becomes the
    /// page banner. A response that arrives after a newer `load` was started
    /// is dropped.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn load(&self, query: &ListQuery) -> Result<(), ApiError> {
        let seq = {
            let mut state = self.inner.lock();
            state.load_seq += 1;
            state.load_seq
        };

        let result = self.inner.source.fetch_page(query).await;

        let mut state = self.inner.lock();
        if state.load_seq != seq {
            debug!(seq, "discarding stale price page");
            return Ok(());
        }

        match result {
            Ok(page) => {
                let ratios = page.ratios();
                let mut rows = page.items;
                for row in &mut rows {
                    state.registry.overlay(row);
                    row.recompute(&ratios);
                }
                state.index = rows
                    .iter()
                    .enumerate()
                    .map(|(idx, row)| (row.price_id, idx))
                    .collect();
                state.rows = rows;
                state.ratios = ratios;
                let GridState { registry, index, .. } = &mut *state;
                registry.prune(|price_id| index.contains_key(&price_id));
                state.page_error = None;
                info!(rows = state.rows.len(), total = page.total, "price page loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load price page");
                state.page_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Applies an edit locally and (re)starts the row's save timer.
    ///
    /// Returns the recomputed row, or `None` when the row is not on the
    /// current page.
    pub fn edit(&self, price_id: PriceId, field: PriceField, value: Option<f64>) -> Option<PriceRow> {
        let mut state = self.inner.lock();
        let ratios = state.ratios;
        let row = state.row_mut(price_id)?;
        field.set(row, value);
        row.recompute(&ratios);
        let updated = row.clone();

        let generation = state.registry.record_edit(price_id, field, value);
        let this = self.clone();
        let delay = self.inner.timings.save_debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.on_timer(price_id, generation);
        });
        state.registry.set_debounce(price_id, handle);

        debug!(price_id, field = field.as_str(), "row edited");
        Some(updated)
    }

    /// Like [`edit`](Self::edit) but takes the raw text of the input box.
    /// Unparseable text clears the field.
    pub fn edit_text(&self, price_id: PriceId, field: PriceField, text: &str) -> Option<PriceRow> {
        self.edit(price_id, field, parse_decimal(text))
    }

    /// Saves the row's buffered edits now instead of waiting for the timer.
    pub fn flush(&self, price_id: PriceId) {
        let patch = self.inner.lock().registry.flush(price_id);
        if let Some(patch) = patch {
            self.spawn_save(patch);
        }
    }

    fn on_timer(&self, price_id: PriceId, generation: u64) {
        let patch = self.inner.lock().registry.timer_fired(price_id, generation);
        if let Some(patch) = patch {
            self.spawn_save(patch);
        }
    }

    fn spawn_save(&self, patch: PricePatch) {
        let this = self.clone();
        tokio::spawn(async move { this.run_save(patch).await });
    }

    #[instrument(skip(self, patch), fields(price_id = patch.price_id))]
    async fn run_save(&self, mut patch: PricePatch) {
        loop {
            let price_id = patch.price_id;
            let result = self.inner.source.save_patch(&patch).await;

            let mut state = self.inner.lock();
            let result = match result {
                Ok(()) => {
                    info!(fields = patch.fields.len(), "price row saved");
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "price row save failed");
                    let message = e.user_message();
                    state.page_error = Some(message.clone());
                    Err(message)
                }
            };

            match state.registry.finish_save(price_id, result) {
                SaveOutcome::FollowUp(next) => {
                    patch = next;
                }
                SaveOutcome::ShowSuccess => {
                    let this = self.clone();
                    let delay = self.inner.timings.success_display;
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        this.inner.lock().registry.clear_success(price_id);
                    });
                    state.registry.set_clear(price_id, handle);
                    return;
                }
                SaveOutcome::Nothing => return,
            }
        }
    }
}

impl<S> GridController<S> {
    pub fn rows(&self) -> Vec<PriceRow> {
        self.inner.lock().rows.clone()
    }

    pub fn row(&self, price_id: PriceId) -> Option<PriceRow> {
        let state = self.inner.lock();
        state.index.get(&price_id).and_then(|idx| state.rows.get(*idx)).cloned()
    }

    pub fn status(&self, price_id: PriceId) -> SaveStatus {
        self.inner.lock().registry.status(price_id)
    }

    pub fn ratios(&self) -> RatioSet {
        self.inner.lock().ratios
    }

    pub fn page_error(&self) -> Option<String> {
        self.inner.lock().page_error.clone()
    }

    pub fn dismiss_error(&self) {
        self.inner.lock().page_error = None;
    }

    pub fn failed_rows(&self) -> Vec<PriceId> {
        self.inner.lock().registry.failed_rows()
    }
}
