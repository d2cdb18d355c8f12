//! Ordering guard for concurrent requests against the same form slot.
//!
//! Every request takes a [`RequestTicket`] for its slot before it is sent.
//! When a response arrives it is only applied if its ticket is still the
//! newest issued for that slot, so the last-issued request wins regardless
//! of the order responses come back in.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    slot: String,
    id: u64,
}

impl RequestTicket {
    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sequenced<T> {
    Fresh(T),
    Stale,
}

impl<T> Sequenced<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Sequenced::Fresh(_))
    }

    pub fn into_fresh(self) -> Option<T> {
        match self {
            Sequenced::Fresh(v) => Some(v),
            Sequenced::Stale => None,
        }
    }
}

#[derive(Debug, Default)]
struct SequencerState {
    latest: HashMap<String, u64>,
    next_id: u64,
    in_flight: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    state: Arc<Mutex<SequencerState>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SequencerState> {
        // Poisoning is ignored: no critical section leaves the maps half-updated.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue a ticket that supersedes every earlier ticket for `slot`.
    pub fn issue(&self, slot: impl Into<String>) -> RequestTicket {
        let slot = slot.into();
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.latest.insert(slot.clone(), id);
        RequestTicket { slot, id }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.lock().latest.get(&ticket.slot) == Some(&ticket.id)
    }

    pub fn accept<T>(&self, ticket: &RequestTicket, value: T) -> Sequenced<T> {
        if self.is_current(ticket) {
            Sequenced::Fresh(value)
        } else {
            tracing::warn!(slot = %ticket.slot, id = ticket.id, "discarding stale response");
            Sequenced::Stale
        }
    }

    /// Claim `slot` for a pending request. Returns `None` while another
    /// request for the same slot holds the guard.
    pub fn try_begin(&self, slot: impl Into<String>) -> Option<InFlightGuard> {
        let slot = slot.into();
        let mut state = self.lock();
        if !state.in_flight.insert(slot.clone()) {
            return None;
        }
        Some(InFlightGuard {
            sequencer: self.clone(),
            slot,
        })
    }

    pub fn is_in_flight(&self, slot: &str) -> bool {
        self.lock().in_flight.contains(slot)
    }
}

/// Releases its slot when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    sequencer: RequestSequencer,
    slot: String,
}

impl InFlightGuard {
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.sequencer.lock().in_flight.remove(&self.slot);
    }
}
