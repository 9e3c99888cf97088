//! Keyed save-state registry for the price grid.
//!
//! One [`RowSlot`] per row identity. The registry is plain data: timers are
//! started by the controller, which hands their handles back here so that a
//! later edit can cancel them.

use std::collections::HashMap;

use tokio::task::JoinHandle;

use crate::dtos::price::PricePatch;
use crate::models::price::{PriceField, PriceId, PriceRow};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Dirty,
    Saving,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Default)]
struct RowSlot {
    buffer: Option<PricePatch>,
    in_flight: Option<PricePatch>,
    status: SaveStatus,
    debounce: Option<JoinHandle<()>>,
    debounce_generation: u64,
    clear: Option<JoinHandle<()>>,
    resave_requested: bool,
}

impl RowSlot {
    fn cancel_timers(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
        if let Some(handle) = self.clear.take() {
            handle.abort();
        }
    }
}

/// What the caller has to do after a save settled.
#[derive(Debug, PartialEq)]
pub enum SaveOutcome {
    /// Newer edits were waiting for the in-flight save; send them now.
    FollowUp(PricePatch),
    /// Row is clean; schedule the return from `Succeeded` to `Idle`.
    ShowSuccess,
    Nothing,
}

#[derive(Debug, Default)]
pub struct RowRegistry {
    slots: HashMap<PriceId, RowSlot>,
}

impl RowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, price_id: PriceId) -> SaveStatus {
        self.slots
            .get(&price_id)
            .map(|slot| slot.status.clone())
            .unwrap_or_default()
    }

    /// Merges an edit into the row's buffer and cancels its timers.
    ///
    /// Returns the generation the new debounce timer must present when it
    /// fires.
    pub fn record_edit(&mut self, price_id: PriceId, field: PriceField, value: Option<f64>) -> u64 {
        let slot = self.slots.entry(price_id).or_default();
        slot.cancel_timers();
        slot.buffer
            .get_or_insert_with(|| PricePatch::new(price_id))
            .set(field, value);
        slot.status = if slot.in_flight.is_some() {
            SaveStatus::Saving
        } else {
            SaveStatus::Dirty
        };
        slot.debounce_generation += 1;
        slot.debounce_generation
    }

    pub fn set_debounce(&mut self, price_id: PriceId, handle: JoinHandle<()>) {
        if let Some(slot) = self.slots.get_mut(&price_id) {
            if let Some(old) = slot.debounce.replace(handle) {
                old.abort();
            }
        }
    }

    pub fn set_clear(&mut self, price_id: PriceId, handle: JoinHandle<()>) {
        if let Some(slot) = self.slots.get_mut(&price_id) {
            if let Some(old) = slot.clear.replace(handle) {
                old.abort();
            }
        }
    }

    /// Called when a debounce timer fires. `None` means there is nothing to
    /// send now: the timer was superseded, the buffer is empty, or a save is
    /// already in flight (the follow-up is then sent once it settles).
    pub fn timer_fired(&mut self, price_id: PriceId, generation: u64) -> Option<PricePatch> {
        let slot = self.slots.get_mut(&price_id)?;
        if slot.debounce_generation != generation {
            return None;
        }
        slot.debounce = None;
        Self::begin(slot)
    }

    /// Sends the buffer right away, skipping the debounce.
    pub fn flush(&mut self, price_id: PriceId) -> Option<PricePatch> {
        let slot = self.slots.get_mut(&price_id)?;
        if let Some(handle) = slot.debounce.take() {
            handle.abort();
        }
        slot.debounce_generation += 1;
        Self::begin(slot)
    }

    fn begin(slot: &mut RowSlot) -> Option<PricePatch> {
        if slot.in_flight.is_some() {
            if slot.buffer.is_some() {
                slot.resave_requested = true;
            }
            return None;
        }
        let patch = slot.buffer.take().filter(|p| !p.is_empty())?;
        slot.in_flight = Some(patch.clone());
        slot.status = SaveStatus::Saving;
        Some(patch)
    }

    pub fn finish_save(&mut self, price_id: PriceId, result: Result<(), String>) -> SaveOutcome {
        let Some(slot) = self.slots.get_mut(&price_id) else {
            return SaveOutcome::Nothing;
        };
        slot.in_flight = None;

        let follow_up = std::mem::take(&mut slot.resave_requested);
        match result {
            Ok(()) => {
                if follow_up {
                    return Self::begin(slot).map_or(SaveOutcome::Nothing, SaveOutcome::FollowUp);
                }
                if slot.buffer.is_some() {
                    // newer edits still debouncing
                    slot.status = SaveStatus::Dirty;
                    return SaveOutcome::Nothing;
                }
                slot.status = SaveStatus::Succeeded;
                SaveOutcome::ShowSuccess
            }
            Err(message) => {
                slot.status = SaveStatus::Failed(message);
                if follow_up {
                    if let Some(patch) = Self::begin(slot) {
                        return SaveOutcome::FollowUp(patch);
                    }
                }
                SaveOutcome::Nothing
            }
        }
    }

    /// Returns `Succeeded` rows to `Idle`; any other status is left alone.
    pub fn clear_success(&mut self, price_id: PriceId) {
        if let Some(slot) = self.slots.get_mut(&price_id) {
            slot.clear = None;
            if slot.status == SaveStatus::Succeeded {
                slot.status = SaveStatus::Idle;
            }
        }
    }

    /// Writes unsaved and in-flight edits over a freshly fetched row.
    pub fn overlay(&self, row: &mut PriceRow) -> bool {
        let Some(slot) = self.slots.get(&row.price_id) else {
            return false;
        };
        let mut touched = false;
        for patch in [&slot.in_flight, &slot.buffer].into_iter().flatten() {
            patch.apply_to(row);
            touched = true;
        }
        touched
    }

    /// Forgets rows that have nothing left to do. Rows with buffered,
    /// debouncing or in-flight edits are always kept; a settled status is kept
    /// only while `on_page` still holds the row.
    pub fn prune(&mut self, on_page: impl Fn(PriceId) -> bool) {
        self.slots.retain(|price_id, slot| {
            let busy = slot.buffer.is_some() || slot.in_flight.is_some() || slot.debounce.is_some();
            let keep = busy || (slot.status != SaveStatus::Idle && on_page(*price_id));
            if !keep {
                slot.cancel_timers();
            }
            keep
        });
    }

    pub fn failed_rows(&self) -> Vec<PriceId> {
        let mut ids: Vec<PriceId> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot.status, SaveStatus::Failed(_)))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
