//! Per-resource resolution state.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::resource::ResourceId;

/// Where a resource is in its resolution lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Idle,
    Resolving,
    RetryScheduled,
    Succeeded,
    Failed,
}

impl ResolutionState {
    /// Resolving or waiting for its retry pass.
    pub fn in_flight(self) -> bool {
        matches!(self, Self::Resolving | Self::RetryScheduled)
    }
}

/// What the resource looked like before a fast swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRecord {
    pub address: String,
    pub variants: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceRecord {
    pub state: ResolutionState,
    pub swapped_from: Option<SwapRecord>,
}

/// Records for every resource the engine has seen. Every check-and-set runs
/// under one lock acquisition.
#[derive(Debug, Default)]
pub(crate) struct Tracker {
    records: Mutex<HashMap<ResourceId, ResourceRecord>>,
}

impl Tracker {
    pub(crate) fn state(&self, id: ResourceId) -> ResolutionState {
        self.records
            .lock()
            .get(&id)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    pub(crate) fn set(&self, id: ResourceId, state: ResolutionState) {
        self.records.lock().entry(id).or_default().state = state;
    }

    /// Settle on success. A pending fast swap is void once a working
    /// address has been applied.
    pub(crate) fn succeed(&self, id: ResourceId) {
        let mut records = self.records.lock();
        let record = records.entry(id).or_default();
        record.state = ResolutionState::Succeeded;
        record.swapped_from = None;
    }

    /// Entry guard: move to `Resolving` unless in flight or already succeeded.
    /// A full resolution supersedes any unverified fast swap.
    pub(crate) fn try_begin(&self, id: ResourceId) -> bool {
        let mut records = self.records.lock();
        let record = records.entry(id).or_default();
        if record.state.in_flight() || record.state == ResolutionState::Succeeded {
            return false;
        }
        record.state = ResolutionState::Resolving;
        record.swapped_from = None;
        true
    }

    /// `RetryScheduled` -> `Resolving`; false if the retry is no longer wanted.
    pub(crate) fn begin_retry(&self, id: ResourceId) -> bool {
        let mut records = self.records.lock();
        match records.get_mut(&id) {
            Some(r) if r.state == ResolutionState::RetryScheduled => {
                r.state = ResolutionState::Resolving;
                true
            }
            _ => false,
        }
    }

    /// Remember the pre-swap address. Refuses if the resource is busy,
    /// settled, or already swapped.
    pub(crate) fn record_swap(&self, id: ResourceId, original: SwapRecord) -> bool {
        let mut records = self.records.lock();
        let record = records.entry(id).or_default();
        if record.state != ResolutionState::Idle || record.swapped_from.is_some() {
            return false;
        }
        record.swapped_from = Some(original);
        true
    }

    /// Claim a pending swap for verification: only from `Idle`, moving to
    /// `Resolving` in the same step so no resolution can interleave.
    pub(crate) fn take_swap_for_verify(&self, id: ResourceId) -> Option<SwapRecord> {
        let mut records = self.records.lock();
        let record = records.get_mut(&id)?;
        if record.state != ResolutionState::Idle {
            return None;
        }
        let original = record.swapped_from.take()?;
        record.state = ResolutionState::Resolving;
        Some(original)
    }
}
